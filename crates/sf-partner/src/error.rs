//! Error types for sf-partner.

use crate::namespaces::INVALID_SESSION_ID;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Build the error for a SOAP fault. `fault_code` must already have its
    /// namespace prefix stripped.
    pub fn from_fault(fault_code: impl Into<String>, fault_string: impl Into<String>) -> Self {
        let fault_code = fault_code.into();
        let fault_string = fault_string.into();
        if fault_code == INVALID_SESSION_ID {
            Self::new(ErrorKind::SessionExpired {
                fault_code,
                fault_string,
            })
        } else {
            Self::new(ErrorKind::SoapFault {
                fault_code,
                fault_string,
            })
        }
    }

    /// Returns true if the session must be renewed before retrying the call.
    pub fn is_session_expired(&self) -> bool {
        matches!(self.kind, ErrorKind::SessionExpired { .. })
    }

    /// Returns true if every transport attempt failed without a response.
    pub fn is_no_response(&self) -> bool {
        match &self.kind {
            ErrorKind::Client(_) => self
                .source
                .as_ref()
                .and_then(|s| s.downcast_ref::<busbar_sf_client::Error>())
                .is_some_and(|e| e.is_no_response()),
            _ => false,
        }
    }

    /// The fault code of a SOAP fault, if this error carries one.
    pub fn fault_code(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::SessionExpired { fault_code, .. } | ErrorKind::SoapFault { fault_code, .. } => {
                Some(fault_code)
            }
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Client error: {0}")]
    Client(String),
    #[error("Session expired: {fault_code} - {fault_string}")]
    SessionExpired {
        fault_code: String,
        fault_string: String,
    },
    #[error("SOAP fault: {fault_code} - {fault_string}")]
    SoapFault {
        fault_code: String,
        fault_string: String,
    },
    #[error("XML error: {0}")]
    Xml(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Not logged in: call login or use_session first")]
    NotLoggedIn,
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<busbar_sf_client::Error> for Error {
    fn from(err: busbar_sf_client::Error) -> Self {
        Error {
            kind: ErrorKind::Client(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error {
            kind: ErrorKind::Xml(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Xml(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}
