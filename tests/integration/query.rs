//! Query family, replication and retrieve.

use super::common::{envelope, session_client};
use busbar_sf_soap::FieldValue;
use chrono::{TimeZone, Utc};
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_query_then_query_more() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:query><p:queryString>SELECT Id, Name, Account.Name FROM Contact</p:queryString></p:query>"))
        .and(body_string_contains("<p:QueryOptions><p:batchSize>500</p:batchSize></p:QueryOptions>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            r#"<queryResponse><result xsi:type="QueryResult">
                 <done>false</done>
                 <queryLocator>01gxx0000002Tia-500</queryLocator>
                 <records xsi:type="sf:sObject">
                   <sf:type>Contact</sf:type>
                   <sf:Id>003xx01</sf:Id>
                   <sf:Id>003xx01</sf:Id>
                   <sf:Name>Ada Lovelace</sf:Name>
                   <sf:Account xsi:type="sf:sObject">
                     <sf:type>Account</sf:type>
                     <sf:Id xsi:nil="true"/>
                     <sf:Name>Acme</sf:Name>
                   </sf:Account>
                 </records>
                 <size>2</size>
               </result></queryResponse>"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:queryMore><p:queryLocator>01gxx0000002Tia-500</p:queryLocator></p:queryMore>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            r#"<queryMoreResponse><result xsi:type="QueryResult">
                 <done>true</done>
                 <queryLocator xsi:nil="true"/>
                 <records xsi:type="sf:sObject">
                   <sf:type>Contact</sf:type>
                   <sf:Id>003xx02</sf:Id>
                   <sf:Name>Grace Hopper</sf:Name>
                   <sf:Account xsi:nil="true"/>
                 </records>
                 <size>2</size>
               </result></queryMoreResponse>"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = session_client(&server);

    let first = client
        .query("SELECT Id, Name, Account.Name FROM Contact")
        .await
        .expect("query");
    assert!(!first.done);
    assert_eq!(first.size, 2);

    let ada = &first.records[0];
    assert_eq!(ada.id(), Some("003xx01"));
    let account = ada
        .get("Account")
        .and_then(FieldValue::as_record)
        .expect("nested account");
    assert_eq!(account.get_str("Name"), Some("Acme"));

    let locator = first.query_locator.expect("more pages");
    let second = client.query_more(&locator).await.expect("queryMore");
    assert!(second.done);
    assert_eq!(second.records[0].get("Account"), Some(&FieldValue::Null));
}

#[tokio::test]
async fn test_search_carries_query_options() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:searchString>FIND {Acme}</p:searchString>"))
        .and(body_string_contains("<p:QueryOptions>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            r#"<searchResponse><result><searchRecords><record xsi:type="sf:sObject">
                 <sf:type>Account</sf:type><sf:Id>001xx01</sf:Id>
               </record></searchRecords></result></searchResponse>"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = session_client(&server);
    let result = client.search("FIND {Acme}").await.expect("search");
    let result = result.into_single().expect("one result");
    assert!(result.child_local("searchRecords").is_some());
}

#[tokio::test]
async fn test_get_updated_and_get_deleted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:getUpdated><p:sObjectType>Account</p:sObjectType><p:startDate>2024-01-01T00:00:00Z</p:startDate><p:endDate>2024-01-02T00:00:00Z</p:endDate></p:getUpdated>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<getUpdatedResponse><result><ids>001xx01</ids><ids>001xx02</ids>\
             <latestDateCovered>2024-01-01T23:59:00.000Z</latestDateCovered></result></getUpdatedResponse>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("<p:getDeleted><p:sObjectType>Account</p:sObjectType>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            "<getDeletedResponse><result>\
             <deletedRecords><deletedDate>2024-01-01T08:00:00.000Z</deletedDate><id>001xx03</id></deletedRecords>\
             <earliestDateAvailable>2023-11-01T00:00:00.000Z</earliestDateAvailable>\
             <latestDateCovered>2024-01-01T23:59:00.000Z</latestDateCovered>\
             </result></getDeletedResponse>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = session_client(&server);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

    let updated = client.get_updated("Account", start, end).await.expect("getUpdated");
    assert_eq!(updated.ids, ["001xx01", "001xx02"]);

    let deleted = client.get_deleted("Account", start, end).await.expect("getDeleted");
    assert_eq!(deleted.deleted_records[0].id, "001xx03");
    assert!(deleted.earliest_date_available.is_some());
}

#[tokio::test]
async fn test_retrieve() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains(
            "<p:retrieve><p:fieldList>Id, Name</p:fieldList><p:sObjectType>Account</p:sObjectType><p:ids>001xx01</p:ids></p:retrieve>",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(envelope(
            r#"<retrieveResponse><result xsi:type="sf:sObject">
                 <sf:type>Account</sf:type><sf:Id>001xx01</sf:Id><sf:Name>Acme</sf:Name>
               </result></retrieveResponse>"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = session_client(&server);
    let records = client
        .retrieve(["Id", "Name"], "Account", "001xx01")
        .await
        .expect("retrieve");

    let acme = records[0].as_ref().expect("found");
    assert_eq!(acme.get_str("Name"), Some("Acme"));
}
