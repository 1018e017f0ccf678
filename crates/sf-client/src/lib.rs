//! # sf-client
//!
//! HTTP transport infrastructure for the Salesforce SOAP APIs.
//!
//! This crate provides the plumbing underneath the SOAP envelope layer:
//! - Bounded retry of transport failures with backoff and jitter
//! - Gzip compression of request bodies and transparent decompression of responses
//! - Connections scoped to a single scheme and host, optionally retained by a session
//! - Request/response tracing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │  (sf-partner: envelopes, operations, fault handling)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SfHttpClient                             │
//! │  - One POST in flight per call                              │
//! │  - Retry loop over fresh connections                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │               Connector / Connection                        │
//! │  - HttpConnector opens reqwest-backed connections           │
//! │  - Tests plug in scripted connectors                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use busbar_sf_client::{ClientConfig, HttpConnector, HttpRequest, SfHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), busbar_sf_client::Error> {
//!     let config = ClientConfig::default();
//!     let client = SfHttpClient::new(HttpConnector::new(config.clone()), config);
//!
//!     let request = HttpRequest::post("https://login.salesforce.com/services/Soap/u/30.0")?
//!         .header("Content-Type", "text/xml; charset=utf-8")
//!         .body(envelope_bytes);
//!
//!     let response = client.execute(&request, None, true).await?;
//!     let xml = response.into_decoded_body()?;
//!     Ok(())
//! }
//! ```

mod client;
pub mod compression;
mod config;
mod connection;
mod error;
mod request;
mod response;
mod retry;

pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder, CompressionConfig};
pub use connection::{Connection, Connector, HttpConnection, HttpConnector};
pub use error::{Error, ErrorKind, Result};
pub use request::HttpRequest;
pub use response::HttpResponse;
pub use retry::{BackoffStrategy, RetryConfig, RetryPolicy};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("busbar-sf-soap/", env!("CARGO_PKG_VERSION"));
