//! SOAP envelope framing around an operation.

use crate::error::Result;
use crate::namespaces::{
    ENVELOPE_NS, ENVELOPE_PREFIX, PARTNER_NS, PARTNER_PREFIX, SOBJECT_NS, SOBJECT_PREFIX,
};
use crate::operation::{Operation, Request};
use crate::writer::XmlWriter;

/// Serialize a complete envelope for `request`.
///
/// Layout:
///
/// ```text
/// <s:Envelope xmlns:s=.. xmlns:p=.. xmlns:o=..>
///   <s:Header>
///     <p:CallOptions><p:client>{client_id}</p:client></p:CallOptions>
///     {request headers}
///   </s:Header>
///   <s:Body>
///     <p:{operation}>{operation body}</p:{operation}>
///   </s:Body>
/// </s:Envelope>
/// ```
pub fn build<O: Operation>(request: &Request<O>, client_id: &str, compress: bool) -> Result<Vec<u8>> {
    let mut w = XmlWriter::new(compress);
    w.start_document()?;

    w.start_prefix_mapping(ENVELOPE_PREFIX, ENVELOPE_NS);
    w.start_prefix_mapping(PARTNER_PREFIX, PARTNER_NS);
    w.start_prefix_mapping(SOBJECT_PREFIX, SOBJECT_NS);
    w.start_element(Some(ENVELOPE_NS), "Envelope")?;

    w.start_element(Some(ENVELOPE_NS), "Header")?;
    w.start_element(Some(PARTNER_NS), "CallOptions")?;
    w.write_text_element(Some(PARTNER_NS), "client", client_id)?;
    w.end_element()?;
    for header in request.headers() {
        header.write_header(&mut w)?;
    }
    w.end_element()?;

    w.start_element(Some(ENVELOPE_NS), "Body")?;
    w.start_element(Some(PARTNER_NS), request.operation().name())?;
    request.operation().write_body(&mut w)?;
    w.end_element()?;
    w.end_element()?;

    w.end_element()?;
    w.end_prefix_mapping(SOBJECT_PREFIX)?;
    w.end_prefix_mapping(PARTNER_PREFIX)?;
    w.end_prefix_mapping(ENVELOPE_PREFIX)?;

    w.end_document()
}
