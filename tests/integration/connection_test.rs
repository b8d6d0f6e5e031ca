//! Connection integration tests.
//!
//! Tests database connectivity and error handling.

use db_report::config::ConnectionConfig;
use db_report::db::{DatabaseClient, PostgresClient, QueryExecutor};
use db_report::error::ReportError;

/// Helper to get test connection parameters from the environment.
fn get_test_config() -> Option<ConnectionConfig> {
    let url = std::env::var("DATABASE_URL").ok()?;
    ConnectionConfig::from_connection_string(&url).ok()
}

#[tokio::test]
async fn test_connect_with_valid_credentials() {
    let Some(config) = get_test_config() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let mut client = PostgresClient::connect(&config).await.unwrap();
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_executor_connects() {
    let Some(config) = get_test_config() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    assert!(QueryExecutor::connect(&config).await.is_ok());
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_invalid_port() {
    let config = ConnectionConfig {
        host: Some("127.0.0.1".to_string()),
        port: Some(1),
        database: Some("testdb".to_string()),
        user: Some("testuser".to_string()),
        password: Some("testpass".to_string()),
    };

    let result = PostgresClient::connect(&config).await;
    assert!(matches!(result, Err(ReportError::Connection(_))));
}

#[tokio::test]
async fn test_connect_with_wrong_password() {
    let Some(mut config) = get_test_config() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    config.password = Some("definitely-not-the-password".to_string());

    // Trust-authenticated servers accept any password
    if let Err(e) = PostgresClient::connect(&config).await {
        assert!(matches!(e, ReportError::Connection(_)));
    }
}
