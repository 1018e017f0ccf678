//! Typed results decoded from response nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};
use crate::response::XmlNode;
use crate::sobject::SObject;

fn missing(node: &XmlNode, name: &str) -> Error {
    Error::new(ErrorKind::InvalidResponse(format!(
        "<{}> is missing <{}>",
        node.name(),
        name
    )))
}

fn required_text(node: &XmlNode, name: &str) -> Result<String> {
    optional_text(node, name).ok_or_else(|| missing(node, name))
}

/// Text of a child; `None` when absent or nil.
fn optional_text(node: &XmlNode, name: &str) -> Option<String> {
    node.child_local(name)
        .filter(|c| !c.is_nil())
        .map(|c| c.text().to_string())
}

fn bool_field(node: &XmlNode, name: &str) -> bool {
    node.child_text(name) == Some("true")
}

fn datetime(node: &XmlNode, name: &str) -> Result<Option<DateTime<Utc>>> {
    optional_text(node, name)
        .map(|text| {
            DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    Error::with_source(
                        ErrorKind::InvalidResponse(format!("<{name}> is not a timestamp: {text}")),
                        e,
                    )
                })
        })
        .transpose()
}

fn errors(node: &XmlNode) -> Result<Vec<SalesforceError>> {
    node.children()
        .iter()
        .filter(|c| c.name() == "errors")
        .map(SalesforceError::try_from)
        .collect()
}

/// Result of `login`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub server_url: String,
    #[serde(skip_serializing)]
    pub session_id: String,
    pub user_id: String,
    pub metadata_server_url: Option<String>,
    pub password_expired: bool,
    pub sandbox: bool,
}

impl std::fmt::Debug for LoginResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResult")
            .field("server_url", &self.server_url)
            .field("session_id", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("metadata_server_url", &self.metadata_server_url)
            .field("password_expired", &self.password_expired)
            .field("sandbox", &self.sandbox)
            .finish()
    }
}

impl TryFrom<&XmlNode> for LoginResult {
    type Error = Error;

    fn try_from(node: &XmlNode) -> Result<Self> {
        Ok(Self {
            server_url: required_text(node, "serverUrl")?,
            session_id: required_text(node, "sessionId")?,
            user_id: optional_text(node, "userId").unwrap_or_default(),
            metadata_server_url: optional_text(node, "metadataServerUrl"),
            password_expired: bool_field(node, "passwordExpired"),
            sandbox: bool_field(node, "sandbox"),
        })
    }
}

/// An error entry of a per-record result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesforceError {
    pub status_code: String,
    pub message: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl TryFrom<&XmlNode> for SalesforceError {
    type Error = Error;

    fn try_from(node: &XmlNode) -> Result<Self> {
        Ok(Self {
            status_code: required_text(node, "statusCode")?,
            message: optional_text(node, "message").unwrap_or_default(),
            fields: node
                .children()
                .iter()
                .filter(|c| c.name() == "fields")
                .map(|c| c.text().to_string())
                .collect(),
        })
    }
}

/// Result of `create` or `update` for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResult {
    pub id: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<SalesforceError>,
}

impl TryFrom<&XmlNode> for SaveResult {
    type Error = Error;

    fn try_from(node: &XmlNode) -> Result<Self> {
        Ok(Self {
            id: optional_text(node, "id"),
            success: bool_field(node, "success"),
            errors: errors(node)?,
        })
    }
}

/// Result of `upsert` for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertResult {
    pub id: Option<String>,
    pub success: bool,
    /// True when the record was inserted rather than updated.
    pub created: bool,
    #[serde(default)]
    pub errors: Vec<SalesforceError>,
}

impl TryFrom<&XmlNode> for UpsertResult {
    type Error = Error;

    fn try_from(node: &XmlNode) -> Result<Self> {
        Ok(Self {
            id: optional_text(node, "id"),
            success: bool_field(node, "success"),
            created: bool_field(node, "created"),
            errors: errors(node)?,
        })
    }
}

/// Result of `delete` for one id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub id: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<SalesforceError>,
}

impl TryFrom<&XmlNode> for DeleteResult {
    type Error = Error;

    fn try_from(node: &XmlNode) -> Result<Self> {
        Ok(Self {
            id: optional_text(node, "id"),
            success: bool_field(node, "success"),
            errors: errors(node)?,
        })
    }
}

/// One page of a `query` or `queryMore`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub done: bool,
    /// Locator for the next page; `None` once `done`.
    pub query_locator: Option<String>,
    /// Total number of matching records, not the page length.
    pub size: u64,
    pub records: Vec<SObject>,
}

impl TryFrom<&XmlNode> for QueryResult {
    type Error = Error;

    fn try_from(node: &XmlNode) -> Result<Self> {
        let size = match optional_text(node, "size") {
            Some(text) => text.parse::<u64>().map_err(|e| {
                Error::with_source(
                    ErrorKind::InvalidResponse(format!("bad query size: {text}")),
                    e,
                )
            })?,
            None => 0,
        };

        Ok(Self {
            done: bool_field(node, "done"),
            query_locator: optional_text(node, "queryLocator"),
            size,
            records: node
                .children()
                .iter()
                .filter(|c| c.name() == "records")
                .map(SObject::try_from)
                .collect::<Result<_>>()?,
        })
    }
}

/// Result of `getUpdated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUpdatedResult {
    pub ids: Vec<String>,
    pub latest_date_covered: Option<DateTime<Utc>>,
}

impl TryFrom<&XmlNode> for GetUpdatedResult {
    type Error = Error;

    fn try_from(node: &XmlNode) -> Result<Self> {
        Ok(Self {
            ids: node
                .children()
                .iter()
                .filter(|c| c.name() == "ids")
                .map(|c| c.text().to_string())
                .collect(),
            latest_date_covered: datetime(node, "latestDateCovered")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedRecord {
    pub id: String,
    pub deleted_date: Option<DateTime<Utc>>,
}

/// Result of `getDeleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDeletedResult {
    pub deleted_records: Vec<DeletedRecord>,
    pub earliest_date_available: Option<DateTime<Utc>>,
    pub latest_date_covered: Option<DateTime<Utc>>,
}

impl TryFrom<&XmlNode> for GetDeletedResult {
    type Error = Error;

    fn try_from(node: &XmlNode) -> Result<Self> {
        let deleted_records = node
            .children()
            .iter()
            .filter(|c| c.name() == "deletedRecords")
            .map(|c| -> Result<DeletedRecord> {
                Ok(DeletedRecord {
                    id: required_text(c, "id")?,
                    deleted_date: datetime(c, "deletedDate")?,
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            deleted_records,
            earliest_date_available: datetime(node, "earliestDateAvailable")?,
            latest_date_covered: datetime(node, "latestDateCovered")?,
        })
    }
}

/// Result of `getUserInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub user_name: String,
    pub user_full_name: Option<String>,
    pub user_email: Option<String>,
    pub organization_id: String,
    pub organization_name: Option<String>,
    pub profile_id: Option<String>,
    pub user_time_zone: Option<String>,
    pub user_language: Option<String>,
    pub user_locale: Option<String>,
}

impl TryFrom<&XmlNode> for UserInfo {
    type Error = Error;

    fn try_from(node: &XmlNode) -> Result<Self> {
        Ok(Self {
            user_id: required_text(node, "userId")?,
            user_name: required_text(node, "userName")?,
            user_full_name: optional_text(node, "userFullName"),
            user_email: optional_text(node, "userEmail"),
            organization_id: required_text(node, "organizationId")?,
            organization_name: optional_text(node, "organizationName"),
            profile_id: optional_text(node, "profileId"),
            user_time_zone: optional_text(node, "userTimeZone"),
            user_language: optional_text(node, "userLanguage"),
            user_locale: optional_text(node, "userLocale"),
        })
    }
}
