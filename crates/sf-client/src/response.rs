//! HTTP response values.

use bytes::Bytes;

use crate::compression;
use crate::error::Result;

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl HttpResponse {
    /// Create a response from its parts. Header names are matched case-insensitively.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get the Content-Encoding header.
    pub fn content_encoding(&self) -> Option<&str> {
        self.header("content-encoding")
    }

    /// Returns true if the body is declared as gzip-encoded.
    pub fn is_gzip(&self) -> bool {
        self.content_encoding().is_some_and(compression::is_gzip)
    }

    /// Raw body bytes, exactly as received.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body bytes with any gzip content coding removed.
    pub fn into_decoded_body(self) -> Result<Bytes> {
        if self.is_gzip() {
            Ok(Bytes::from(compression::gunzip(&self.body)?))
        } else {
            Ok(self.body)
        }
    }
}
