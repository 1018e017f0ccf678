//! Connections scoped to a single scheme and host.
//!
//! A [`Connector`] opens connections; a [`Connection`] performs one exchange
//! at a time. Dropping a connection closes it.

use std::future::Future;

use tracing::{debug, info};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::HttpRequest;
use crate::response::HttpResponse;

/// An open connection able to carry requests to one origin.
///
/// Not meant for concurrent use by several in-flight operations; callers
/// serialize requests per connection.
pub trait Connection: Send + Sync {
    /// POST the request and read the full response.
    fn send(&self, request: &HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// Factory for connections.
pub trait Connector: Send + Sync {
    /// Connection type produced by this connector.
    type Connection: Connection;

    /// Open a connection scoped to the endpoint's scheme and host.
    fn connect(&self, endpoint: &Url) -> Result<Self::Connection>;
}

/// Connector producing reqwest-backed connections.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    config: ClientConfig,
}

impl HttpConnector {
    /// Create a connector with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Get the connector configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Connector for HttpConnector {
    type Connection = HttpConnection;

    fn connect(&self, endpoint: &Url) -> Result<HttpConnection> {
        if endpoint.host_str().is_none() {
            return Err(Error::new(ErrorKind::InvalidUrl(format!(
                "{} has no host",
                endpoint
            ))));
        }

        let inner = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .connect_timeout(self.config.connect_timeout)
            .pool_max_idle_per_host(1)
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        let origin = endpoint.origin().ascii_serialization();
        if self.config.enable_tracing {
            debug!(origin = %origin, "Opened connection");
        }

        Ok(HttpConnection {
            inner,
            origin,
            enable_tracing: self.config.enable_tracing,
        })
    }
}

/// A reqwest client pinned to one origin.
#[derive(Debug, Clone)]
pub struct HttpConnection {
    inner: reqwest::Client,
    origin: String,
    enable_tracing: bool,
}

impl HttpConnection {
    /// The `scheme://host[:port]` this connection serves.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl Connection for HttpConnection {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let target = request.url.origin().ascii_serialization();
        if target != self.origin {
            return Err(Error::new(ErrorKind::Config(format!(
                "connection to {} cannot serve {}",
                self.origin, target
            ))));
        }

        let mut req = self.inner.post(request.url.clone());
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        req = req.body(request.body.clone());

        if self.enable_tracing {
            debug!(
                url = %request.url,
                body_len = request.body.len(),
                "Sending request"
            );
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        if self.enable_tracing {
            if (200..300).contains(&status) {
                debug!(status, body_len = body.len(), "Response received");
            } else {
                info!(status, body_len = body.len(), "Non-success response");
            }
        }

        Ok(HttpResponse::new(status, headers, body))
    }
}
