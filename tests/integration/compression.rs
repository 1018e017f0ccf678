//! Gzip request bodies and transparent response decoding.

use super::common::{envelope, SERVICE_PATH};
use busbar_sf_soap::client::compression::{gunzip, gzip};
use busbar_sf_soap::{ClientConfig, CompressionConfig, PartnerClient, PartnerConfig, SObject};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREATED: &str =
    "<createResponse><result><id>001xx01</id><success>true</success></result></createResponse>";

fn client(server: &MockServer, compression: CompressionConfig) -> PartnerClient {
    let config = PartnerConfig::builder()
        .with_http(
            ClientConfig::builder()
                .with_compression_config(compression)
                .build(),
        )
        .build()
        .expect("config");
    let mut client = PartnerClient::new(config);
    client
        .use_session("00Dxx!SESSION", &format!("{}{SERVICE_PATH}", server.uri()))
        .expect("use_session");
    client
}

#[tokio::test]
async fn test_gzip_request_and_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .and(header("Content-Encoding", "gzip"))
        .and(header("Accept-Encoding", "gzip"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Encoding", "gzip")
                .set_body_bytes(gzip(envelope(CREATED).as_bytes()).expect("gzip")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server, CompressionConfig::full())
        .create(SObject::new("Account").with("Name", "Acme"))
        .await
        .expect("create over gzip");
    assert_eq!(results[0].id.as_deref(), Some("001xx01"));

    let requests = server.received_requests().await.expect("recording enabled");
    let body = gunzip(&requests[0].body).expect("request body is gzip");
    let body = String::from_utf8(body).expect("utf-8");
    assert!(body.contains("<o:type>Account</o:type><o:Name>Acme</o:Name>"));
}

#[tokio::test]
async fn test_plain_response_when_gzip_accepted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(CREATED)))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server, CompressionConfig::full())
        .create(SObject::new("Account").with("Name", "Acme"))
        .await
        .expect("plain response parsed as-is");
    assert_eq!(results[0].id.as_deref(), Some("001xx01"));
}

#[tokio::test]
async fn test_compression_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(CREATED)))
        .expect(1)
        .mount(&server)
        .await;

    client(&server, CompressionConfig::disabled())
        .create(SObject::new("Account").with("Name", "Acme"))
        .await
        .expect("create");

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(!requests[0].headers.contains_key("content-encoding"));
    assert!(!requests[0].headers.contains_key("accept-encoding"));
    assert!(requests[0].body.starts_with(b"<?xml"));
}
