//! Operation descriptors.
//!
//! An operation only captures its inputs; nothing here performs I/O. Header
//! capabilities are composed onto a [`Request`] rather than inherited: login
//! carries none, every other call carries a [`SessionHeader`], and paged calls
//! additionally carry [`QueryOptions`].

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::namespaces::{PARTNER_NS, SOBJECT_NS};
use crate::sobject::SObject;
use crate::writer::XmlWriter;

/// A remote operation able to render its own body.
pub trait Operation {
    /// Element name of the operation inside `Body`.
    fn name(&self) -> &'static str;

    /// Write the children of the operation element.
    fn write_body(&self, writer: &mut XmlWriter) -> Result<()>;

    /// Return the result as a list even when it has a single entry.
    fn always_list(&self) -> bool {
        false
    }

    /// Whether resending after an ambiguous transport failure is harmless.
    fn idempotent(&self) -> bool {
        true
    }

    /// Paged operations carry the `QueryOptions` header.
    fn paged(&self) -> bool {
        false
    }
}

/// A block written inside `Header`.
pub trait HeaderBlock {
    fn write_header(&self, writer: &mut XmlWriter) -> Result<()>;
}

/// `SessionHeader` carrying the session id.
#[derive(Clone)]
pub struct SessionHeader {
    session_id: String,
}

impl SessionHeader {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

impl std::fmt::Debug for SessionHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHeader")
            .field("session_id", &"[REDACTED]")
            .finish()
    }
}

impl HeaderBlock for SessionHeader {
    fn write_header(&self, w: &mut XmlWriter) -> Result<()> {
        w.start_element(Some(PARTNER_NS), "SessionHeader")?;
        w.write_text_element(Some(PARTNER_NS), "sessionId", &self.session_id)?;
        w.end_element()
    }
}

/// `QueryOptions` carrying the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub batch_size: u32,
}

impl HeaderBlock for QueryOptions {
    fn write_header(&self, w: &mut XmlWriter) -> Result<()> {
        w.start_element(Some(PARTNER_NS), "QueryOptions")?;
        w.write_element(Some(PARTNER_NS), "batchSize", &self.batch_size)?;
        w.end_element()
    }
}

/// One call: the endpoint, its headers and the operation.
#[derive(Debug, Clone)]
pub struct Request<O> {
    endpoint: String,
    session: Option<SessionHeader>,
    query_options: Option<QueryOptions>,
    operation: O,
}

impl<O: Operation> Request<O> {
    /// A request without session, as used by login.
    pub fn new(endpoint: impl Into<String>, operation: O) -> Self {
        Self {
            endpoint: endpoint.into(),
            session: None,
            query_options: None,
            operation,
        }
    }

    /// A request bound to a session. `batch_size` is only sent for paged
    /// operations.
    pub fn authenticated(
        endpoint: impl Into<String>,
        session_id: impl Into<String>,
        batch_size: u32,
        operation: O,
    ) -> Self {
        let query_options = operation.paged().then_some(QueryOptions { batch_size });
        Self {
            endpoint: endpoint.into(),
            session: Some(SessionHeader::new(session_id)),
            query_options,
            operation,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn operation(&self) -> &O {
        &self.operation
    }

    /// Header blocks in emission order.
    pub fn headers(&self) -> Vec<&dyn HeaderBlock> {
        let mut headers: Vec<&dyn HeaderBlock> = Vec::new();
        if let Some(session) = &self.session {
            headers.push(session);
        }
        if let Some(options) = &self.query_options {
            headers.push(options);
        }
        headers
    }
}

/// One or many identifiers.
pub trait IntoStrings {
    fn into_strings(self) -> Vec<String>;
}

impl IntoStrings for &str {
    fn into_strings(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoStrings for String {
    fn into_strings(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoStrings for Vec<String> {
    fn into_strings(self) -> Vec<String> {
        self
    }
}

impl IntoStrings for Vec<&str> {
    fn into_strings(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoStrings for &[&str] {
    fn into_strings(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoStrings for &[String] {
    fn into_strings(self) -> Vec<String> {
        self.to_vec()
    }
}

impl<const N: usize> IntoStrings for [&str; N] {
    fn into_strings(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

/// One or many records.
pub trait IntoRecords {
    fn into_records(self) -> Vec<SObject>;
}

impl IntoRecords for SObject {
    fn into_records(self) -> Vec<SObject> {
        vec![self]
    }
}

impl IntoRecords for Vec<SObject> {
    fn into_records(self) -> Vec<SObject> {
        self
    }
}

impl IntoRecords for &[SObject] {
    fn into_records(self) -> Vec<SObject> {
        self.to_vec()
    }
}

impl<const N: usize> IntoRecords for [SObject; N] {
    fn into_records(self) -> Vec<SObject> {
        self.into()
    }
}

fn write_sobjects(w: &mut XmlWriter, records: &[SObject]) -> Result<()> {
    for record in records {
        w.start_element(Some(PARTNER_NS), "sObjects")?;
        w.write_record_fields(Some(SOBJECT_NS), record)?;
        w.end_element()?;
    }
    Ok(())
}

// Authentication

#[derive(Clone)]
pub struct Login {
    username: String,
    password: String,
}

impl Login {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Login")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Operation for Login {
    fn name(&self) -> &'static str {
        "login"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        w.write_text_element(Some(PARTNER_NS), "username", &self.username)?;
        w.write_text_element(Some(PARTNER_NS), "password", &self.password)
    }
}

// Query family

#[derive(Debug, Clone)]
pub struct Query {
    query: String,
}

impl Query {
    pub fn new(soql: impl Into<String>) -> Self {
        Self { query: soql.into() }
    }
}

impl Operation for Query {
    fn name(&self) -> &'static str {
        "query"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        w.write_text_element(Some(PARTNER_NS), "queryString", &self.query)
    }

    fn paged(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct QueryMore {
    query_locator: String,
}

impl QueryMore {
    pub fn new(query_locator: impl Into<String>) -> Self {
        Self {
            query_locator: query_locator.into(),
        }
    }
}

impl Operation for QueryMore {
    fn name(&self) -> &'static str {
        "queryMore"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        w.write_text_element(Some(PARTNER_NS), "queryLocator", &self.query_locator)
    }

    fn paged(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct Search {
    search: String,
}

impl Search {
    pub fn new(sosl: impl Into<String>) -> Self {
        Self {
            search: sosl.into(),
        }
    }
}

impl Operation for Search {
    fn name(&self) -> &'static str {
        "search"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        w.write_text_element(Some(PARTNER_NS), "searchString", &self.search)
    }

    fn paged(&self) -> bool {
        true
    }
}

// Replication

fn write_window(
    w: &mut XmlWriter,
    sobject_type: &str,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
) -> Result<()> {
    w.write_text_element(Some(PARTNER_NS), "sObjectType", sobject_type)?;
    w.write_element(Some(PARTNER_NS), "startDate", start)?;
    w.write_element(Some(PARTNER_NS), "endDate", end)
}

/// Ids of records of one type changed within a time window.
#[derive(Debug, Clone)]
pub struct GetUpdated {
    sobject_type: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl GetUpdated {
    pub fn new(sobject_type: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            sobject_type: sobject_type.into(),
            start,
            end,
        }
    }
}

impl Operation for GetUpdated {
    fn name(&self) -> &'static str {
        "getUpdated"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        write_window(w, &self.sobject_type, &self.start, &self.end)
    }
}

/// Records of one type deleted within a time window.
#[derive(Debug, Clone)]
pub struct GetDeleted {
    sobject_type: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl GetDeleted {
    pub fn new(sobject_type: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            sobject_type: sobject_type.into(),
            start,
            end,
        }
    }
}

impl Operation for GetDeleted {
    fn name(&self) -> &'static str {
        "getDeleted"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        write_window(w, &self.sobject_type, &self.start, &self.end)
    }
}

// Records

#[derive(Debug, Clone)]
pub struct Create {
    records: Vec<SObject>,
}

impl Create {
    pub fn new(records: impl IntoRecords) -> Self {
        Self {
            records: records.into_records(),
        }
    }
}

impl Operation for Create {
    fn name(&self) -> &'static str {
        "create"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        write_sobjects(w, &self.records)
    }

    fn idempotent(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct Update {
    records: Vec<SObject>,
}

impl Update {
    pub fn new(records: impl IntoRecords) -> Self {
        Self {
            records: records.into_records(),
        }
    }
}

impl Operation for Update {
    fn name(&self) -> &'static str {
        "update"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        write_sobjects(w, &self.records)
    }

    fn idempotent(&self) -> bool {
        false
    }
}

/// Insert or update keyed on an external id field.
#[derive(Debug, Clone)]
pub struct Upsert {
    external_id_field: String,
    records: Vec<SObject>,
}

impl Upsert {
    pub fn new(external_id_field: impl Into<String>, records: impl IntoRecords) -> Self {
        Self {
            external_id_field: external_id_field.into(),
            records: records.into_records(),
        }
    }
}

impl Operation for Upsert {
    fn name(&self) -> &'static str {
        "upsert"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        w.write_text_element(Some(PARTNER_NS), "externalIDFieldName", &self.external_id_field)?;
        write_sobjects(w, &self.records)
    }
}

#[derive(Debug, Clone)]
pub struct Delete {
    ids: Vec<String>,
}

impl Delete {
    pub fn new(ids: impl IntoStrings) -> Self {
        Self {
            ids: ids.into_strings(),
        }
    }
}

impl Operation for Delete {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        w.write_element(Some(PARTNER_NS), "ids", &self.ids)
    }
}

#[derive(Debug, Clone)]
pub struct Retrieve {
    fields: Vec<String>,
    sobject_type: String,
    ids: Vec<String>,
}

impl Retrieve {
    pub fn new(fields: impl IntoStrings, sobject_type: impl Into<String>, ids: impl IntoStrings) -> Self {
        Self {
            fields: fields.into_strings(),
            sobject_type: sobject_type.into(),
            ids: ids.into_strings(),
        }
    }
}

impl Operation for Retrieve {
    fn name(&self) -> &'static str {
        "retrieve"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        // fieldList is a single comma separated value
        w.write_text_element(Some(PARTNER_NS), "fieldList", &self.fields.join(", "))?;
        w.write_text_element(Some(PARTNER_NS), "sObjectType", &self.sobject_type)?;
        w.write_element(Some(PARTNER_NS), "ids", &self.ids)
    }
}

// Describe

#[derive(Debug, Clone)]
pub struct DescribeSObjects {
    sobject_types: Vec<String>,
}

impl DescribeSObjects {
    pub fn new(sobject_types: impl IntoStrings) -> Self {
        Self {
            sobject_types: sobject_types.into_strings(),
        }
    }
}

impl Operation for DescribeSObjects {
    fn name(&self) -> &'static str {
        "describeSObjects"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        w.write_element(Some(PARTNER_NS), "sObjectType", &self.sobject_types)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DescribeGlobal;

impl Operation for DescribeGlobal {
    fn name(&self) -> &'static str {
        "describeGlobal"
    }

    fn write_body(&self, _w: &mut XmlWriter) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DescribeLayout {
    sobject_type: String,
}

impl DescribeLayout {
    pub fn new(sobject_type: impl Into<String>) -> Self {
        Self {
            sobject_type: sobject_type.into(),
        }
    }
}

impl Operation for DescribeLayout {
    fn name(&self) -> &'static str {
        "describeLayout"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        w.write_text_element(Some(PARTNER_NS), "sObjectType", &self.sobject_type)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DescribeTabs;

impl Operation for DescribeTabs {
    fn name(&self) -> &'static str {
        "describeTabs"
    }

    fn write_body(&self, _w: &mut XmlWriter) -> Result<()> {
        Ok(())
    }

    fn always_list(&self) -> bool {
        true
    }
}

// Utility

#[derive(Debug, Clone, Copy, Default)]
pub struct GetServerTimestamp;

impl Operation for GetServerTimestamp {
    fn name(&self) -> &'static str {
        "getServerTimestamp"
    }

    fn write_body(&self, _w: &mut XmlWriter) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetUserInfo;

impl Operation for GetUserInfo {
    fn name(&self) -> &'static str {
        "getUserInfo"
    }

    fn write_body(&self, _w: &mut XmlWriter) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ResetPassword {
    user_id: String,
}

impl ResetPassword {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl Operation for ResetPassword {
    fn name(&self) -> &'static str {
        "resetPassword"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        w.write_text_element(Some(PARTNER_NS), "userId", &self.user_id)
    }

    fn idempotent(&self) -> bool {
        false
    }
}

#[derive(Clone)]
pub struct SetPassword {
    user_id: String,
    password: String,
}

impl SetPassword {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for SetPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetPassword")
            .field("user_id", &self.user_id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Operation for SetPassword {
    fn name(&self) -> &'static str {
        "setPassword"
    }

    fn write_body(&self, w: &mut XmlWriter) -> Result<()> {
        w.write_text_element(Some(PARTNER_NS), "userId", &self.user_id)?;
        w.write_text_element(Some(PARTNER_NS), "password", &self.password)
    }
}
