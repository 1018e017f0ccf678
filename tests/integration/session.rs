//! Login, session reuse and session expiry.

use super::common::{
    config, envelope, fault, init_tracing, login_response, session_client, LOGIN_PATH,
    SERVICE_PATH,
};
use busbar_sf_soap::{ClientConfig, ErrorKind, PartnerClient, PartnerConfig, RetryConfig};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_INFO: &str = "<getUserInfoResponse><result>\
    <organizationId>00Dxx0000001gEF</organizationId>\
    <userFullName>Ada Lovelace</userFullName>\
    <userId>005xx000001Sv6AAAS</userId>\
    <userName>ada@example.com</userName>\
    </result></getUserInfoResponse>";

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_then_call_uses_server_url() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_string_contains("<p:login>"))
        .and(body_string_contains("<p:client>integration-tests/1.0</p:client>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_response(&server, "00Dxx!NEW")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .and(body_string_contains("<p:sessionId>00Dxx!NEW</p:sessionId>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(USER_INFO)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = PartnerClient::new(config(&server));
    let login = client
        .login("ada@example.com", "secret")
        .await
        .expect("login should succeed");
    assert!(!login.password_expired);
    assert!(client.is_logged_in());

    let info = client.get_user_info().await.expect("getUserInfo should succeed");
    assert_eq!(info.user_name, "ada@example.com");
    assert_eq!(info.user_full_name.as_deref(), Some("Ada Lovelace"));
}

#[tokio::test]
async fn test_login_fault_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string(fault(
            "INVALID_LOGIN",
            "INVALID_LOGIN: Invalid username, password, security token; or user locked out.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = PartnerClient::new(config(&server));
    let err = client
        .login("ada@example.com", "wrong")
        .await
        .expect_err("login should fail");

    assert!(!err.is_session_expired());
    assert_eq!(err.fault_code(), Some("INVALID_LOGIN"));
    assert!(!client.is_logged_in());
}

// ============================================================================
// Session expiry
// ============================================================================

#[tokio::test]
async fn test_expired_session_recovered_by_login() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .and(body_string_contains("<p:sessionId>00Dxx!SESSION</p:sessionId>"))
        .respond_with(ResponseTemplate::new(500).set_body_string(fault(
            "sf:INVALID_SESSION_ID",
            "INVALID_SESSION_ID: Invalid Session ID found in SessionHeader: Illegal Session",
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_response(&server, "00Dxx!NEW")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .and(body_string_contains("<p:sessionId>00Dxx!NEW</p:sessionId>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(USER_INFO)))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = session_client(&server);

    let err = client.get_user_info().await.expect_err("stale session should fail");
    match &err.kind {
        ErrorKind::SessionExpired {
            fault_code,
            fault_string,
        } => {
            assert_eq!(fault_code, "INVALID_SESSION_ID");
            assert!(fault_string.ends_with("Illegal Session"));
        }
        other => panic!("expected SessionExpired, got {other:?}"),
    }

    client
        .login("ada@example.com", "secret")
        .await
        .expect("re-login should succeed");
    let info = client.get_user_info().await.expect("retry should succeed");
    assert_eq!(info.organization_id, "00Dxx0000001gEF");
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_unreachable_login_endpoint_reports_no_response() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let config = PartnerConfig::builder()
        .with_login_url(format!("http://127.0.0.1:{port}{LOGIN_PATH}"))
        .with_http(
            ClientConfig::builder()
                .with_retry(RetryConfig::immediate(3))
                .build(),
        )
        .build()
        .expect("config");
    let mut client = PartnerClient::new(config);

    let err = client
        .login("ada@example.com", "secret")
        .await
        .expect_err("nothing is listening");
    assert!(err.is_no_response());
}

#[tokio::test]
async fn test_force_http_downgrades_server_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(USER_INFO)))
        .expect(1)
        .mount(&server)
        .await;

    let config = PartnerConfig::builder()
        .with_http(
            ClientConfig::builder()
                .with_force_http(true)
                .with_compression(false)
                .build(),
        )
        .build()
        .expect("config");
    let mut client = PartnerClient::new(config);

    let https_url = format!("{}{SERVICE_PATH}", server.uri()).replacen("http://", "https://", 1);
    client
        .use_session("00Dxx!SESSION", &https_url)
        .expect("use_session");

    client
        .get_user_info()
        .await
        .expect("request should go out over plain http");
}
