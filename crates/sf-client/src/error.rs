//! Error types for sf-client.

/// Result type alias for sf-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this error is a transport failure worth another attempt.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns false only when the request provably never left the client.
    pub fn request_sent(&self) -> bool {
        !matches!(self.kind, ErrorKind::Connection(_))
    }

    /// Returns true if every transport attempt failed and no response was received.
    pub fn is_no_response(&self) -> bool {
        matches!(self.kind, ErrorKind::RetriesExhausted { .. })
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Could not establish a connection; nothing was sent.
    #[error("Connection error: {0}")]
    Connection(String),

    /// I/O failure after the request was sent, or a malformed HTTP response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// HTTP response that carried no usable SOAP payload.
    #[error("HTTP error: {status} {message}")]
    Http { status: u16, message: String },

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Gzip encoding or decoding failed.
    #[error("Compression error: {0}")]
    Compression(String),

    /// All transport attempts failed without a response.
    #[error("No response after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ErrorKind {
    /// Returns true if this error kind is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Connection(_) | ErrorKind::Transport(_) | ErrorKind::Timeout
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // a connect-phase timeout is also a timeout; nothing was sent
        let kind = if err.is_connect() || failed_before_send(&err) {
            ErrorKind::Connection(err.to_string())
        } else if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_builder() {
            ErrorKind::Config(err.to_string())
        } else {
            ErrorKind::Transport(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

/// Walk the source chain for a socket error that can only happen while connecting.
fn failed_before_send(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if is_connect_io_kind(io.kind()) {
                return true;
            }
        }
        source = std::error::Error::source(cause);
    }
    false
}

fn is_connect_io_kind(kind: std::io::ErrorKind) -> bool {
    use std::io::ErrorKind as Io;
    matches!(
        kind,
        Io::ConnectionRefused | Io::NetworkUnreachable | Io::HostUnreachable | Io::AddrNotAvailable
    )
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}
