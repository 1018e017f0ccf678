//! XML namespaces and wire constants of the Partner API.

/// SOAP 1.1 envelope namespace.
pub const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Operation parameters and result wrappers.
pub const PARTNER_NS: &str = "urn:partner.soap.sforce.com";

/// Record (sObject) payload fields.
pub const SOBJECT_NS: &str = "urn:sobject.partner.soap.sforce.com";

/// XML Schema instance namespace (`xsi:nil`, `xsi:type` in responses).
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub(crate) const ENVELOPE_PREFIX: &str = "s";
pub(crate) const PARTNER_PREFIX: &str = "p";
pub(crate) const SOBJECT_PREFIX: &str = "o";

/// Default authentication endpoint.
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com/services/Soap/u/30.0";

/// Fault code signalling that the session must be renewed.
pub const INVALID_SESSION_ID: &str = "INVALID_SESSION_ID";

/// Default value of the CallOptions `client` element.
pub const DEFAULT_CLIENT_ID: &str = concat!("busbar-sf-soap/", env!("CARGO_PKG_VERSION"));

/// Default query page size.
pub const DEFAULT_BATCH_SIZE: u32 = 500;
