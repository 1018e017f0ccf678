//! # busbar-sf-soap
//!
//! Salesforce SOAP Partner API client library for Rust.
//!
//! ## Security
//!
//! - Session ids and passwords are redacted in Debug output
//! - Tracing skips credential parameters
//!
//! ## Crates
//!
//! - **busbar-sf-client** - HTTP transport: retry, gzip, scoped connections
//! - **busbar-sf-partner** - SOAP envelopes, operations, fault classification, session facade
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use busbar_sf_soap::{PartnerClient, PartnerConfig, SObject};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = PartnerClient::new(PartnerConfig::from_env()?);
//!     client.login("user@example.com", "password+token").await?;
//!
//!     let page = client.query("SELECT Id, Name FROM Account LIMIT 10").await?;
//!     for account in page.records {
//!         println!("{:?}", account.get_str("Name"));
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
pub use busbar_sf_client as client;
pub use busbar_sf_partner as partner;

// Re-export commonly used types at the top level
pub use busbar_sf_client::{ClientConfig, CompressionConfig, RetryConfig};
pub use busbar_sf_partner::{
    Error, ErrorKind, FieldValue, PartnerClient, PartnerConfig, QueryResult, SObject, SoapResult,
    XmlNode,
};
