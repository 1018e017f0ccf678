//! # busbar-sf-partner
//!
//! Salesforce SOAP Partner API client.
//!
//! ## Features
//!
//! - **Envelopes** - Namespaced SOAP envelopes written by a streaming XML writer, optionally gzipped
//! - **Operations** - login, query, queryMore, search, getUpdated, getDeleted, retrieve,
//!   create, update, upsert, delete, describe*, getServerTimestamp, resetPassword,
//!   setPassword, getUserInfo
//! - **Records** - `SObject` values serialized with their `type` first, at any depth
//! - **Faults** - `INVALID_SESSION_ID` surfaces as a recoverable error; other faults are fatal
//! - **Transport** - Bounded retry on transport failure, transparent gzip in both directions
//!
//! ## Example
//!
//! ```rust,ignore
//! use busbar_sf_partner::{PartnerClient, PartnerConfig, SObject};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), busbar_sf_partner::Error> {
//!     let mut client = PartnerClient::new(PartnerConfig::from_env()?);
//!     client.login("user@example.com", "password+token").await?;
//!
//!     let saved = client
//!         .create(SObject::new("Account").with("Name", "Acme"))
//!         .await?;
//!
//!     let page = client.query("SELECT Id, Name FROM Account").await?;
//!     for account in &page.records {
//!         println!("{:?} {:?}", account.id(), account.get_str("Name"));
//!     }
//!
//!     match client.get_user_info().await {
//!         Err(e) if e.is_session_expired() => {
//!             // log in again and retry
//!         }
//!         other => println!("{:?}", other?),
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
pub mod envelope;
mod error;
pub mod fault;
pub mod namespaces;
pub mod operation;
pub mod pipeline;
mod response;
mod sobject;
mod types;
pub mod writer;

pub use client::PartnerClient;
pub use config::{PartnerConfig, PartnerConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use operation::{HeaderBlock, IntoRecords, IntoStrings, Operation, QueryOptions, Request, SessionHeader};
pub use pipeline::{extract_result, SoapTransport};
pub use response::{parse, SoapResult, XmlNode};
pub use sobject::{FieldValue, SObject};
pub use types::{
    DeleteResult, DeletedRecord, GetDeletedResult, GetUpdatedResult, LoginResult, QueryResult,
    SalesforceError, SaveResult, UpsertResult, UserInfo,
};
pub use writer::{XmlValue, XmlWriter};
