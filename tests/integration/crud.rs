//! Record operations and describe calls.

use super::common::{envelope, session_client, SERVICE_PATH};
use busbar_sf_soap::{FieldValue, SObject, SoapResult};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn sent_body(server: &MockServer) -> String {
    let requests = server.received_requests().await.expect("recording enabled");
    String::from_utf8(requests.last().expect("a request").body.clone()).expect("utf-8 body")
}

// ============================================================================
// Create / Update / Upsert / Delete
// ============================================================================

#[tokio::test]
async fn test_create_account_acme() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<createResponse><result><id>001xx000003DGb2AAG</id><success>true</success></result></createResponse>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = session_client(&server);
    let results = client
        .create(SObject::new("Account").with("Name", "Acme"))
        .await
        .expect("create should succeed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id.as_deref(), Some("001xx000003DGb2AAG"));

    let body = sent_body(&server).await;
    assert_eq!(body.matches("<p:sObjects>").count(), 1);
    let record = body
        .split("<p:sObjects>")
        .nth(1)
        .and_then(|rest| rest.split("</p:sObjects>").next())
        .expect("sObjects element");
    assert_eq!(record, "<o:type>Account</o:type><o:Name>Acme</o:Name>");
}

#[tokio::test]
async fn test_create_many_mixed_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            r#"<createResponse>
                 <result><id>003xx01</id><success>true</success></result>
                 <result>
                   <errors>
                     <fields>LastName</fields>
                     <message>Required fields are missing: [LastName]</message>
                     <statusCode>REQUIRED_FIELD_MISSING</statusCode>
                   </errors>
                   <id xsi:nil="true"/>
                   <success>false</success>
                 </result>
               </createResponse>"#,
        )))
        .mount(&server)
        .await;

    let client = session_client(&server);
    let results = client
        .create(vec![
            SObject::new("Contact").with("LastName", "Smith"),
            SObject::new("Contact").with("FirstName", "Nobody"),
        ])
        .await
        .expect("create should return per-record results");

    assert!(results[0].success);
    assert!(!results[1].success);
    assert_eq!(results[1].errors[0].status_code, "REQUIRED_FIELD_MISSING");

    let body = sent_body(&server).await;
    assert_eq!(body.matches("<p:sObjects><o:type>Contact</o:type>").count(), 2);
}

#[tokio::test]
async fn test_update_clears_null_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:update>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<updateResponse><result><id>003xx01</id><success>true</success></result></updateResponse>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = session_client(&server);
    let record = SObject::new("Contact")
        .with("Id", "003xx01")
        .with("Phone", "555-0100")
        .with("Fax", FieldValue::Null);
    client.update(record.clone()).await.expect("update should succeed");

    let body = sent_body(&server).await;
    assert!(body.contains(
        "<o:type>Contact</o:type><o:fieldsToNull>Fax</o:fieldsToNull><o:Id>003xx01</o:Id>"
    ));
    // caller's record untouched
    assert_eq!(record.get("Fax"), Some(&FieldValue::Null));
    assert_eq!(record.object_type(), "Contact");
}

#[tokio::test]
async fn test_upsert_with_relationship() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:externalIDFieldName>Email</p:externalIDFieldName><p:sObjects>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<upsertResponse><result><created>true</created><id>003xx02</id><success>true</success></result></upsertResponse>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = session_client(&server);
    let contact = SObject::try_from(serde_json::json!({
        "type": "Contact",
        "Email": "ada@example.com",
        "Account": {"type": "Account", "ExternalId__c": "ACME-1"}
    }))
    .expect("valid record");

    let results = client.upsert("Email", contact).await.expect("upsert should succeed");
    assert!(results[0].created);

    let body = sent_body(&server).await;
    assert!(body.contains(
        "<o:Account><o:type>Account</o:type><o:ExternalId__c>ACME-1</o:ExternalId__c></o:Account>"
    ));
}

#[tokio::test]
async fn test_delete_single_and_many() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:delete>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<deleteResponse><result><id>001xx01</id><success>true</success></result></deleteResponse>",
        )))
        .mount(&server)
        .await;

    let client = session_client(&server);

    let results = client.delete("001xx01").await.expect("delete one");
    assert_eq!(results.len(), 1);
    assert!(sent_body(&server).await.contains("<p:delete><p:ids>001xx01</p:ids></p:delete>"));

    client
        .delete(vec!["001xx01".to_string(), "001xx02".to_string()])
        .await
        .expect("delete many");
    assert!(sent_body(&server)
        .await
        .contains("<p:ids>001xx01</p:ids><p:ids>001xx02</p:ids>"));
}

// ============================================================================
// Describe / utility
// ============================================================================

#[tokio::test]
async fn test_describe_sobjects_arity() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:sObjectType>Contact</p:sObjectType>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<describeSObjectsResponse>\
               <result><name>Account</name></result>\
               <result><name>Contact</name></result>\
             </describeSObjectsResponse>",
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:describeSObjects><p:sObjectType>Account</p:sObjectType></p:describeSObjects>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<describeSObjectsResponse><result><name>Account</name></result></describeSObjectsResponse>",
        )))
        .mount(&server)
        .await;

    let client = session_client(&server);

    match client.describe_sobjects(["Account", "Contact"]).await.expect("describe two") {
        SoapResult::List(items) => {
            let names: Vec<_> = items.iter().filter_map(|n| n.child_text("name")).collect();
            assert_eq!(names, ["Account", "Contact"]);
        }
        other => panic!("expected a list, got {other:?}"),
    }

    match client.describe_sobjects("Account").await.expect("describe one") {
        SoapResult::Single(node) => assert_eq!(node.child_text("name"), Some("Account")),
        other => panic!("expected a single result, got {other:?}"),
    }
}

#[tokio::test]
async fn test_describe_tabs_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:describeTabs>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<describeTabsResponse/>",
        )))
        .mount(&server)
        .await;

    let client = session_client(&server);
    let tabs = client.describe_tabs().await.expect("describeTabs");
    assert!(tabs.is_empty());
}

#[tokio::test]
async fn test_reset_password_returns_new_password() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:resetPassword><p:userId>005xx01</p:userId></p:resetPassword>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<resetPasswordResponse><result><password>Xy7#kq</password></result></resetPasswordResponse>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = session_client(&server);
    let password = client.reset_password("005xx01").await.expect("resetPassword");
    assert_eq!(password, "Xy7#kq");
}
