use busbar_sf_soap::{ClientConfig, PartnerClient, PartnerConfig, RetryConfig};
use wiremock::MockServer;

pub const LOGIN_PATH: &str = "/services/Soap/u/30.0";
pub const SERVICE_PATH: &str = "/services/Soap/u/30.0/00Dxx0000001gEF";

/// Wrap body content in a response envelope with the usual prefixes.
pub fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="urn:partner.soap.sforce.com" xmlns:sf="urn:sobject.partner.soap.sforce.com" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"#
    )
}

pub fn fault(code: &str, message: &str) -> String {
    envelope(&format!(
        "<soapenv:Fault><faultcode>{code}</faultcode><faultstring>{message}</faultstring></soapenv:Fault>"
    ))
}

pub fn login_response(server: &MockServer, session_id: &str) -> String {
    envelope(&format!(
        "<loginResponse><result>\
         <passwordExpired>false</passwordExpired><sandbox>false</sandbox>\
         <serverUrl>{}{SERVICE_PATH}</serverUrl>\
         <sessionId>{session_id}</sessionId><userId>005xx000001Sv6AAAS</userId>\
         </result></loginResponse>",
        server.uri()
    ))
}

/// Configuration pointing at the mock server, uncompressed, with immediate retries.
pub fn config(server: &MockServer) -> PartnerConfig {
    PartnerConfig::builder()
        .with_login_url(format!("{}{LOGIN_PATH}", server.uri()))
        .with_client_id("integration-tests/1.0")
        .with_http(
            ClientConfig::builder()
                .with_retry(RetryConfig::immediate(3))
                .with_compression(false)
                .build(),
        )
        .build()
        .expect("mock config should be valid")
}

/// A client already bound to a session on the mock server.
pub fn session_client(server: &MockServer) -> PartnerClient {
    let mut client = PartnerClient::new(config(server));
    client
        .use_session("00Dxx!SESSION", &format!("{}{SERVICE_PATH}", server.uri()))
        .expect("use_session should connect");
    client
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("busbar_sf_partner=debug,busbar_sf_client=debug")
        .with_test_writer()
        .try_init();
}
