//! Request execution with bounded transport retry.

use tracing::{instrument, warn};

use crate::config::ClientConfig;
use crate::connection::{Connection, Connector, HttpConnector};
use crate::error::{Error, ErrorKind, Result};
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::retry::{RetryConfig, RetryPolicy};

/// HTTP client that posts one request at a time and retries transport failures.
///
/// Each attempt that is not served by a caller-retained connection opens a
/// fresh connection and closes it before returning, on every path.
#[derive(Debug, Clone)]
pub struct SfHttpClient<C = HttpConnector> {
    connector: C,
    config: ClientConfig,
}

impl SfHttpClient<HttpConnector> {
    /// Create a client backed by reqwest connections.
    pub fn from_config(config: ClientConfig) -> Self {
        Self::new(HttpConnector::new(config.clone()), config)
    }
}

impl<C: Connector> SfHttpClient<C> {
    /// Create a client with a custom connector.
    pub fn new(connector: C, config: ClientConfig) -> Self {
        Self { connector, config }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the connector used for fresh connections.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Execute a request with automatic retry of transport failures.
    ///
    /// `retained` is tried first when given; after it fails, every further
    /// attempt runs on a freshly opened connection. When `resend` is false the
    /// request is only retried if the failure happened before anything was
    /// sent. Once the attempt budget is spent the result is
    /// [`ErrorKind::RetriesExhausted`], carrying the last failure as source.
    #[instrument(skip(self, request, retained), fields(url = %request.url))]
    pub async fn execute(
        &self,
        request: &HttpRequest,
        retained: Option<&C::Connection>,
        resend: bool,
    ) -> Result<HttpResponse> {
        let mut policy = RetryPolicy::new(
            self.config
                .retry
                .clone()
                .unwrap_or_else(RetryConfig::no_retry),
        );
        let mut retained = retained;

        loop {
            let result = match retained.take() {
                Some(conn) => conn.send(request).await,
                None => self.execute_once(request).await,
            };

            let err = match result {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }
            if !resend && err.request_sent() {
                warn!(error = %err, "Request may have reached the server, not resending");
                return Err(err);
            }

            match policy.next_delay() {
                Some(delay) => {
                    warn!(
                        attempt = policy.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transport failure, retrying on a fresh connection"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                None => {
                    return Err(Error::with_source(
                        ErrorKind::RetriesExhausted {
                            attempts: policy.attempts(),
                        },
                        err,
                    ));
                }
            }
        }
    }

    /// Open a connection, send once, and drop the connection.
    async fn execute_once(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let conn = self.connector.connect(&request.url)?;
        let result = conn.send(request).await;
        drop(conn);
        result
    }
}
