//! Partner API walkthrough
//!
//! This example logs in with a username and password, then:
//! - Reads the current user and server time
//! - Creates, queries and deletes an Account
//! - Recovers from an expired session by logging in again
//!
//! Required environment variables:
//! - SF_USERNAME
//! - SF_PASSWORD (password with the security token appended)
//! Optional:
//! - SF_LOGIN_URL (e.g. https://test.salesforce.com/services/Soap/u/30.0 for sandboxes)
//! - SF_SOAP_CLIENT_ID
//! - SF_BATCH_SIZE
//!
//! Run with: cargo run --example partner_basics

use busbar_sf_soap::{PartnerClient, PartnerConfig, SObject};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    println!("=== Salesforce Partner API Examples ===\n");

    let username = std::env::var("SF_USERNAME")?;
    let password = std::env::var("SF_PASSWORD")?;

    let mut client = PartnerClient::new(PartnerConfig::from_env()?);
    let login = client.login(&username, &password).await?;
    println!("✓ Logged in");
    println!("  Server URL: {}", login.server_url);
    println!("  Sandbox: {}", login.sandbox);
    println!();

    example_user_info(&mut client, &username, &password).await?;
    example_crud(&client).await?;

    Ok(())
}

/// Example 1: User info, retrying once if the session expired
async fn example_user_info(
    client: &mut PartnerClient,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Example 1: User Info");
    println!("--------------------");

    let info = match client.get_user_info().await {
        Err(e) if e.is_session_expired() => {
            println!("  Session expired, logging in again");
            client.login(username, password).await?;
            client.get_user_info().await?
        }
        other => other?,
    };
    println!("✓ {} ({})", info.user_name, info.organization_id);
    println!("  Server time: {}", client.get_server_timestamp().await?);
    println!();

    Ok(())
}

/// Example 2: Create, query, delete
async fn example_crud(client: &PartnerClient) -> Result<(), Box<dyn std::error::Error>> {
    println!("Example 2: Create / Query / Delete");
    println!("----------------------------------");

    let name = format!("Partner Example {}", chrono::Utc::now().timestamp_millis());
    let saved = client
        .create(
            SObject::new("Account")
                .with("Name", name.as_str())
                .with("Industry", "Technology"),
        )
        .await?;

    let Some(id) = saved.first().and_then(|r| r.id.clone()) else {
        println!("✗ Create failed: {:?}", saved.first().map(|r| &r.errors));
        return Ok(());
    };
    println!("✓ Created Account {id}");

    let page = client
        .query(&format!("SELECT Id, Name, Industry FROM Account WHERE Id = '{id}'"))
        .await?;
    for account in &page.records {
        println!(
            "  {} | {} | {}",
            account.id().unwrap_or_default(),
            account.get_str("Name").unwrap_or_default(),
            account.get_str("Industry").unwrap_or_default()
        );
    }

    let deleted = client.delete(id.as_str()).await?;
    println!("✓ Deleted: {}", deleted.iter().all(|r| r.success));
    println!();

    Ok(())
}
