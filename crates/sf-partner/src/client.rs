//! Session-bound Partner API client.

use busbar_sf_client::{Connector, HttpConnector, SfHttpClient};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::config::{check_batch_size, PartnerConfig};
use crate::error::{Error, ErrorKind, Result};
use crate::operation::{
    Create, Delete, DescribeGlobal, DescribeLayout, DescribeSObjects, DescribeTabs, GetDeleted,
    GetServerTimestamp, GetUpdated, GetUserInfo, IntoRecords, IntoStrings, Login, Operation,
    Query, QueryMore, Request, ResetPassword, Retrieve, Search, SetPassword, Update, Upsert,
};
use crate::pipeline::SoapTransport;
use crate::response::{SoapResult, XmlNode};
use crate::sobject::SObject;
use crate::types::{
    DeleteResult, GetDeletedResult, GetUpdatedResult, LoginResult, QueryResult, SaveResult,
    UpsertResult, UserInfo,
};

struct Session<K> {
    server_url: String,
    session_id: String,
    connection: K,
}

/// Partner API client holding one session.
///
/// The retained connection carries one operation at a time. Share a client
/// across tasks behind a lock, or create one client per task.
///
/// # Example
///
/// ```rust,ignore
/// use busbar_sf_partner::{PartnerClient, PartnerConfig, SObject};
///
/// let mut client = PartnerClient::new(PartnerConfig::from_env()?);
/// client.login("user@example.com", "password+token").await?;
///
/// let saved = client
///     .create(SObject::new("Account").with("Name", "Acme"))
///     .await?;
/// println!("{:?}", saved[0].id);
/// ```
pub struct PartnerClient<C: Connector = HttpConnector> {
    transport: SoapTransport<C>,
    config: PartnerConfig,
    session: Option<Session<C::Connection>>,
}

impl<C: Connector> std::fmt::Debug for PartnerClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerClient")
            .field("login_url", &self.config.login_url)
            .field("batch_size", &self.config.batch_size)
            .field("server_url", &self.server_url())
            .field(
                "session_id",
                &self.session.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl PartnerClient<HttpConnector> {
    /// Create a client using reqwest connections.
    pub fn new(config: PartnerConfig) -> Self {
        let connector = HttpConnector::new(config.http.clone());
        Self::with_connector(connector, config)
    }
}

impl<C: Connector> PartnerClient<C> {
    /// Create a client with a custom connector.
    pub fn with_connector(connector: C, config: PartnerConfig) -> Self {
        let http = SfHttpClient::new(connector, config.http.clone());
        Self {
            transport: SoapTransport::new(http, config.client_id.clone()),
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &PartnerConfig {
        &self.config
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Service endpoint of the current session.
    pub fn server_url(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.server_url.as_str())
    }

    /// Session id of the current session.
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_id.as_str())
    }

    pub fn batch_size(&self) -> u32 {
        self.config.batch_size
    }

    /// Change the page size for later query, queryMore and search calls.
    ///
    /// Zero is rejected, as it is by [`PartnerConfigBuilder::build`](crate::PartnerConfigBuilder::build).
    pub fn set_batch_size(&mut self, batch_size: u32) -> Result<()> {
        self.config.batch_size = check_batch_size(batch_size)?;
        Ok(())
    }

    /// Authenticate and adopt the returned session.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResult> {
        let request = Request::new(self.config.login_url.clone(), Login::new(username, password));
        let node = self.transport.post(&request, None).await?.into_single()?;
        let result = LoginResult::try_from(&node)?;

        self.use_session(&result.session_id, &result.server_url)?;
        info!(server_url = %result.server_url, "Logged in");
        Ok(result)
    }

    /// Adopt an existing session, e.g. one handed over by another process.
    ///
    /// Opens the connection reused by later calls; a previous session and
    /// its connection are dropped.
    pub fn use_session(&mut self, session_id: &str, server_url: &str) -> Result<()> {
        let url = self.config.http.endpoint(server_url)?;
        let connection = self.transport.http().connector().connect(&url)?;
        self.session = Some(Session {
            server_url: server_url.to_string(),
            session_id: session_id.to_string(),
            connection,
        });
        Ok(())
    }

    async fn call<O: Operation>(&self, operation: O) -> Result<SoapResult> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::NotLoggedIn))?;
        let request = Request::authenticated(
            session.server_url.clone(),
            session.session_id.clone(),
            self.config.batch_size,
            operation,
        );
        self.transport.post(&request, Some(&session.connection)).await
    }

    async fn call_single<O: Operation>(&self, operation: O) -> Result<XmlNode> {
        self.call(operation).await?.into_single()
    }

    async fn call_each<O, T>(&self, operation: O) -> Result<Vec<T>>
    where
        O: Operation,
        T: for<'a> TryFrom<&'a XmlNode, Error = Error>,
    {
        self.call(operation)
            .await?
            .into_vec()
            .iter()
            .map(T::try_from)
            .collect()
    }

    /// Run a SOQL query and return the first page.
    pub async fn query(&self, soql: &str) -> Result<QueryResult> {
        QueryResult::try_from(&self.call_single(Query::new(soql)).await?)
    }

    /// Fetch the page following `query_locator`.
    pub async fn query_more(&self, query_locator: &str) -> Result<QueryResult> {
        QueryResult::try_from(&self.call_single(QueryMore::new(query_locator)).await?)
    }

    /// Run a SOSL search.
    pub async fn search(&self, sosl: &str) -> Result<SoapResult> {
        self.call(Search::new(sosl)).await
    }

    pub async fn get_updated(
        &self,
        sobject_type: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<GetUpdatedResult> {
        GetUpdatedResult::try_from(&self.call_single(GetUpdated::new(sobject_type, start, end)).await?)
    }

    pub async fn get_deleted(
        &self,
        sobject_type: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<GetDeletedResult> {
        GetDeletedResult::try_from(&self.call_single(GetDeleted::new(sobject_type, start, end)).await?)
    }

    /// Fetch records by id. Ids that match nothing come back as `None`,
    /// positionally aligned with `ids`.
    pub async fn retrieve(
        &self,
        fields: impl IntoStrings,
        sobject_type: &str,
        ids: impl IntoStrings,
    ) -> Result<Vec<Option<SObject>>> {
        self.call(Retrieve::new(fields, sobject_type, ids))
            .await?
            .into_vec()
            .iter()
            .map(|node| {
                if node.is_nil() {
                    Ok(None)
                } else {
                    SObject::try_from(node).map(Some)
                }
            })
            .collect()
    }

    pub async fn create(&self, records: impl IntoRecords) -> Result<Vec<SaveResult>> {
        self.call_each(Create::new(records)).await
    }

    pub async fn update(&self, records: impl IntoRecords) -> Result<Vec<SaveResult>> {
        self.call_each(Update::new(records)).await
    }

    pub async fn upsert(
        &self,
        external_id_field: &str,
        records: impl IntoRecords,
    ) -> Result<Vec<UpsertResult>> {
        self.call_each(Upsert::new(external_id_field, records)).await
    }

    pub async fn delete(&self, ids: impl IntoStrings) -> Result<Vec<DeleteResult>> {
        self.call_each(Delete::new(ids)).await
    }

    pub async fn describe_sobjects(&self, sobject_types: impl IntoStrings) -> Result<SoapResult> {
        self.call(DescribeSObjects::new(sobject_types)).await
    }

    pub async fn describe_global(&self) -> Result<SoapResult> {
        self.call(DescribeGlobal).await
    }

    pub async fn describe_layout(&self, sobject_type: &str) -> Result<SoapResult> {
        self.call(DescribeLayout::new(sobject_type)).await
    }

    /// Describe the app tabs; always a list, possibly empty.
    pub async fn describe_tabs(&self) -> Result<Vec<XmlNode>> {
        Ok(self.call(DescribeTabs).await?.into_vec())
    }

    /// Current server time, as sent by the server.
    pub async fn get_server_timestamp(&self) -> Result<String> {
        let node = self.call_single(GetServerTimestamp).await?;
        node.child_text("timestamp")
            .map(str::to_string)
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidResponse(
                    "getServerTimestamp result has no timestamp".to_string(),
                ))
            })
    }

    /// Reset a user's password and return the generated one.
    pub async fn reset_password(&self, user_id: &str) -> Result<String> {
        let node = self.call_single(ResetPassword::new(user_id)).await?;
        node.child_text("password")
            .map(str::to_string)
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidResponse(
                    "resetPassword result has no password".to_string(),
                ))
            })
    }

    pub async fn set_password(&self, user_id: &str, password: &str) -> Result<()> {
        self.call(SetPassword::new(user_id, password)).await?;
        Ok(())
    }

    pub async fn get_user_info(&self) -> Result<UserInfo> {
        UserInfo::try_from(&self.call_single(GetUserInfo).await?)
    }
}
