//! Client configuration.

use crate::error::{Error, ErrorKind, Result};
use crate::retry::RetryConfig;
use std::time::Duration;
use url::Url;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Retry configuration. `None` means a single attempt.
    pub retry: Option<RetryConfig>,
    /// Compression configuration.
    pub compression: CompressionConfig,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
    /// Rewrite `https` endpoints to plain `http` (debugging aid).
    pub force_http: bool,
    /// Whether to enable request/response tracing.
    pub enable_tracing: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry: Some(RetryConfig::default()),
            compression: CompressionConfig::default(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(30),
            user_agent: crate::USER_AGENT.to_string(),
            force_http: false,
            enable_tracing: true,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse an endpoint URL, applying `force_http` when set.
    pub fn endpoint(&self, url: &str) -> Result<Url> {
        let mut parsed = Url::parse(url)?;
        if self.force_http && parsed.scheme() == "https" {
            parsed.set_scheme("http").map_err(|_| {
                Error::new(ErrorKind::InvalidUrl(format!(
                    "cannot downgrade {} to http",
                    parsed
                )))
            })?;
        }
        Ok(parsed)
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = Some(retry);
        self
    }

    /// Disable retries.
    pub fn without_retry(mut self) -> Self {
        self.config.retry = None;
        self
    }

    /// Enable or disable compression in both directions.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.config.compression = if enabled {
            CompressionConfig::full()
        } else {
            CompressionConfig::disabled()
        };
        self
    }

    /// Set compression configuration.
    pub fn with_compression_config(mut self, config: CompressionConfig) -> Self {
        self.config.compression = config;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Force plain HTTP for every endpoint.
    pub fn with_force_http(mut self, force: bool) -> Self {
        self.config.force_http = force;
        self
    }

    /// Enable or disable request/response tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Configuration for request/response compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionConfig {
    /// Gzip request bodies and declare `content-encoding: gzip`.
    pub compress_requests: bool,
    /// Send `accept-encoding: gzip` and decode gzip responses.
    pub accept_compressed: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl CompressionConfig {
    /// Disable all compression.
    pub fn disabled() -> Self {
        Self {
            compress_requests: false,
            accept_compressed: false,
        }
    }

    /// Full compression (both requests and responses).
    pub fn full() -> Self {
        Self {
            compress_requests: true,
            accept_compressed: true,
        }
    }
}
