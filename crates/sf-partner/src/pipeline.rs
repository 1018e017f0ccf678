//! Request/response pipeline: envelope, HTTP exchange, decode, fault check,
//! result extraction.

use busbar_sf_client::{ClientConfig, Connector, HttpConnector, HttpRequest, SfHttpClient};
use tracing::{debug, instrument};

use crate::envelope;
use crate::error::{Error, ErrorKind, Result};
use crate::fault::check_fault;
use crate::namespaces::ENVELOPE_NS;
use crate::operation::{Operation, Request};
use crate::response::{self, SoapResult, XmlNode};

const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Posts operations and turns replies into [`SoapResult`]s.
#[derive(Debug, Clone)]
pub struct SoapTransport<C = HttpConnector> {
    http: SfHttpClient<C>,
    client_id: String,
}

impl SoapTransport<HttpConnector> {
    pub fn from_config(config: ClientConfig, client_id: impl Into<String>) -> Self {
        Self::new(SfHttpClient::from_config(config), client_id)
    }
}

impl<C: Connector> SoapTransport<C> {
    pub fn new(http: SfHttpClient<C>, client_id: impl Into<String>) -> Self {
        Self {
            http,
            client_id: client_id.into(),
        }
    }

    pub fn http(&self) -> &SfHttpClient<C> {
        &self.http
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Send one operation and return its result payload.
    ///
    /// `connection` is used for the first attempt when given. Non-idempotent
    /// operations are only resent when the failed attempt never reached the
    /// server.
    #[instrument(skip(self, request, connection), fields(operation = request.operation().name()))]
    pub async fn post<O: Operation>(
        &self,
        request: &Request<O>,
        connection: Option<&C::Connection>,
    ) -> Result<SoapResult> {
        let config = self.http.config();
        let compression = config.compression;
        let url = config.endpoint(request.endpoint())?;

        let envelope = envelope::build(request, &self.client_id, compression.compress_requests)?;
        debug!(
            bytes = envelope.len(),
            gzip = compression.compress_requests,
            "Built envelope"
        );

        let mut http_request = HttpRequest::post_url(url)
            .header("User-Agent", config.user_agent.as_str())
            .header("SOAPAction", "\"\"")
            .header("Content-Type", CONTENT_TYPE);
        if compression.accept_compressed {
            http_request = http_request.header("Accept-Encoding", "gzip");
        }
        if compression.compress_requests {
            http_request = http_request.header("Content-Encoding", "gzip");
        }
        let http_request = http_request.body(envelope);

        let response = self
            .http
            .execute(&http_request, connection, request.operation().idempotent())
            .await?;

        let status = response.status();
        let success = response.is_success();
        debug!(
            status,
            bytes = response.body().len(),
            gzip = response.is_gzip(),
            "Received reply"
        );

        let xml = response.into_decoded_body()?;
        let body = match response::parse(&xml).and_then(envelope_body) {
            Ok(body) => body,
            Err(err) if !success => {
                return Err(Error::from(busbar_sf_client::Error::with_source(
                    busbar_sf_client::ErrorKind::Http {
                        status,
                        message: "response carried no SOAP envelope".to_string(),
                    },
                    err,
                )))
            }
            Err(err) => return Err(err),
        };

        check_fault(&body)?;
        extract_result(body, request.operation().always_list())
    }
}

fn envelope_body(root: XmlNode) -> Result<XmlNode> {
    if root.name() != "Envelope" || root.namespace() != Some(ENVELOPE_NS) {
        return Err(Error::new(ErrorKind::InvalidResponse(format!(
            "expected a SOAP Envelope, got <{}>",
            root.name()
        ))));
    }
    root.into_children()
        .into_iter()
        .find(|c| c.name() == "Body" && c.namespace() == Some(ENVELOPE_NS))
        .ok_or_else(|| Error::new(ErrorKind::InvalidResponse("Envelope has no Body".to_string())))
}

/// Pick the result out of a response `Body`.
///
/// The first child of `Body` is the operation's response wrapper. Its
/// children are returned as a list when `always_list` is set or there are
/// several, otherwise the single child is returned alone.
pub fn extract_result(body: XmlNode, always_list: bool) -> Result<SoapResult> {
    let wrapper = body
        .into_children()
        .into_iter()
        .next()
        .ok_or_else(|| Error::new(ErrorKind::InvalidResponse("empty Body".to_string())))?;
    let wrapper_name = wrapper.name().to_string();
    let mut children = wrapper.into_children();

    if always_list || children.len() > 1 {
        return Ok(SoapResult::List(children));
    }
    children.pop().map(SoapResult::Single).ok_or_else(|| {
        Error::new(ErrorKind::InvalidResponse(format!(
            "<{wrapper_name}> has no result"
        )))
    })
}
