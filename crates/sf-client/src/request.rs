//! Outbound HTTP request values.

use bytes::Bytes;
use url::Url;

use crate::error::Result;

/// A fully-built POST request.
///
/// The body is already encoded (and compressed, if the caller chose to), so
/// the same request can be replayed verbatim on every attempt.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub(crate) url: Url,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
}

impl HttpRequest {
    /// Create a POST request to the given URL.
    pub fn post(url: &str) -> Result<Self> {
        Ok(Self::post_url(Url::parse(url)?))
    }

    /// Create a POST request to an already parsed URL.
    pub fn post_url(url: Url) -> Self {
        Self {
            url,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Add a header. Later values for the same name replace earlier ones.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Look up a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Request body bytes.
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }
}
