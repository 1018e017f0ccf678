//! SOAP fault detection and classification.

use crate::error::{Error, Result};
use crate::namespaces::ENVELOPE_NS;
use crate::response::XmlNode;

/// Return an error if `body` carries a `Fault`, otherwise `Ok(())`.
///
/// The fault code loses its namespace prefix (everything up to the last
/// `:`); `INVALID_SESSION_ID` maps to the recoverable session-expired kind.
pub fn check_fault(body: &XmlNode) -> Result<()> {
    let Some(fault) = body.child(Some(ENVELOPE_NS), "Fault") else {
        return Ok(());
    };

    let raw_code = fault.child_text("faultcode").unwrap_or_default();
    let fault_code = raw_code.rsplit(':').next().unwrap_or(raw_code);
    let fault_string = fault.child_text("faultstring").unwrap_or_default();

    Err(Error::from_fault(fault_code, fault_string))
}
