//! Partner client configuration.

use busbar_sf_client::ClientConfig;

use crate::error::{Error, ErrorKind, Result};
use crate::namespaces::{DEFAULT_BATCH_SIZE, DEFAULT_CLIENT_ID, DEFAULT_LOGIN_URL};

/// Configuration for a [`PartnerClient`](crate::PartnerClient).
#[derive(Debug, Clone)]
pub struct PartnerConfig {
    /// Endpoint used by `login`.
    pub login_url: String,
    /// Value of the CallOptions `client` element.
    pub client_id: String,
    /// Page size requested by query, queryMore and search.
    pub batch_size: u32,
    /// HTTP transport settings.
    pub http: ClientConfig,
}

impl Default for PartnerConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            http: ClientConfig::default(),
        }
    }
}

impl PartnerConfig {
    pub fn builder() -> PartnerConfigBuilder {
        PartnerConfigBuilder::default()
    }

    /// Load from environment variables.
    ///
    /// - `SF_LOGIN_URL` (or `SALESFORCE_LOGIN_URL`)
    /// - `SF_SOAP_CLIENT_ID`
    /// - `SF_BATCH_SIZE`
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(url) = get("SF_LOGIN_URL").or_else(|| get("SALESFORCE_LOGIN_URL")) {
            builder = builder.with_login_url(url);
        }
        if let Some(client_id) = get("SF_SOAP_CLIENT_ID") {
            builder = builder.with_client_id(client_id);
        }
        if let Some(size) = get("SF_BATCH_SIZE") {
            let size = size.trim().parse::<u32>().map_err(|e| {
                Error::with_source(
                    ErrorKind::Config(format!("SF_BATCH_SIZE must be a positive integer, got {size:?}")),
                    e,
                )
            })?;
            builder = builder.with_batch_size(size);
        }

        builder.build()
    }
}

/// Builder for [`PartnerConfig`].
#[derive(Debug, Default)]
pub struct PartnerConfigBuilder {
    config: PartnerConfig,
}

impl PartnerConfigBuilder {
    /// Use a custom authentication endpoint, e.g. `test.salesforce.com` for sandboxes.
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.config.login_url = url.into();
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.client_id = client_id.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn with_http(mut self, http: ClientConfig) -> Self {
        self.config.http = http;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<PartnerConfig> {
        check_batch_size(self.config.batch_size)?;
        self.config.http.endpoint(&self.config.login_url)?;
        Ok(self.config)
    }
}

/// Reject a zero page size.
pub(crate) fn check_batch_size(batch_size: u32) -> Result<u32> {
    if batch_size == 0 {
        return Err(Error::new(ErrorKind::Config(
            "batch size must be at least 1".to_string(),
        )));
    }
    Ok(batch_size)
}
