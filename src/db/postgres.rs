//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! over a single sqlx connection. Statements run in autocommit mode.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::{Column as SqlxColumn, Connection, Executor, Row as SqlxRow, TypeInfo, ValueRef};
use std::time::Instant;
use tracing::{debug, warn};

/// PostgreSQL database client owning one connection.
#[derive(Debug)]
pub struct PostgresClient {
    conn: Option<PgConnection>,
}

impl PostgresClient {
    /// Opens a connection with the given parameters.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = connect_options(config)?;

        debug!("Connecting to {}", config.display_string());
        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(|e| map_connection_error(e, config))?;
        debug!("Successfully connected to database");

        Ok(Self { conn: Some(conn) })
    }

    fn connection(&mut self) -> Result<&mut PgConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| ReportError::connection("Connection is already closed"))
    }

    /// Fetches column metadata for a statement without reading rows.
    async fn describe_columns(&mut self, sql: &str) -> Result<Vec<ColumnInfo>> {
        let conn = self.connection()?;
        let describe = conn
            .describe(sql)
            .await
            .map_err(|e| ReportError::query(format_query_error(e)))?;

        Ok(describe
            .columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect())
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        let conn = self.connection()?;
        // Simple query protocol: results come back as text
        let rows = conn
            .fetch_all(sqlx::raw_sql(sql))
            .await
            .map_err(|e| ReportError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let columns: Vec<ColumnInfo> = match rows.first() {
            Some(first_row) => first_row
                .columns()
                .iter()
                .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                .collect(),
            // Empty result: ask the server for the row description instead
            None => match self.describe_columns(sql).await {
                Ok(columns) => columns,
                Err(e) => {
                    warn!("Could not describe columns of empty result: {}", e);
                    Vec::new()
                }
            },
        };

        let rows: Vec<Row> = rows.iter().map(convert_row).collect::<Result<_>>()?;
        debug!("Query returned {} rows in {:?}", rows.len(), execution_time);

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .await
                .map_err(|e| ReportError::connection(format!("Failed to close connection: {e}")))?;
            debug!("Database connection closed");
        }
        Ok(())
    }
}

/// Builds sqlx connect options; the database name is required.
fn connect_options(config: &ConnectionConfig) -> Result<PgConnectOptions> {
    let database = config
        .database
        .as_deref()
        .ok_or_else(|| ReportError::config("Database name is required"))?;

    let mut options = PgConnectOptions::new()
        .host(config.host.as_deref().unwrap_or("localhost"))
        .port(config.port())
        .database(database);

    if let Some(user) = &config.user {
        options = options.username(user);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }

    Ok(options)
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Result<Row> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| {
            convert_value(row, i, col.type_info().name()).map_err(|e| {
                ReportError::query(format!(
                    "Cannot decode column '{}' ({}): {e}",
                    col.name(),
                    col.type_info().name()
                ))
            })
        })
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
///
/// Rows arrive in the text format, so any type the server can print is
/// readable even when sqlx has no Rust mapping for it.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> std::result::Result<Value, BoxDynError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => Value::Bool(row.try_get::<bool, _>(index)?),
        "INT2" | "SMALLINT" | "INT4" | "INT" | "INTEGER" | "INT8" | "BIGINT" | "OID" => {
            Value::Int(raw.as_str()?.parse::<i64>()?)
        }
        // f64 parsing accepts NaN and Infinity as printed by the server
        "FLOAT4" | "REAL" | "FLOAT8" | "DOUBLE PRECISION" => {
            Value::Float(raw.as_str()?.parse::<f64>()?)
        }
        // Exact decimals become floats when they fit, text otherwise
        "NUMERIC" | "DECIMAL" => {
            let text = raw.as_str()?;
            text.parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::String(text.to_string()))
        }
        "BYTEA" => Value::Bytes(row.try_get::<Vec<u8>, _>(index)?),
        "TIMESTAMPTZ" => Value::String(row.try_get::<DateTime<Utc>, _>(index)?.to_rfc3339()),
        // Everything else keeps the server's text form
        _ => Value::String(raw.as_str()?.to_string()),
    };

    Ok(value)
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ReportError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port();
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ReportError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        ReportError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        ReportError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        ReportError::connection("Server requires SSL. Set sslmode=require.".to_string())
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ReportError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ReportError::connection(error.to_string())
    }
}

/// Formats a query error with server-side detail and hint when available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }
        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
        if let Some(table) = pg_error.table() {
            result.push_str("\n  TABLE: ");
            result.push_str(table);
        }
        if let Some(column) = pg_error.column() {
            result.push_str("\n  COLUMN: ");
            result.push_str(column);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str) -> ConnectionConfig {
        ConnectionConfig {
            host: Some(host.to_string()),
            port: Some(6432),
            database: Some("bi".to_string()),
            user: Some("reporter".to_string()),
            password: Some("secret".to_string()),
        }
    }

    #[test]
    fn test_connect_options_require_database() {
        let mut cfg = config("localhost");
        cfg.database = None;
        let err = connect_options(&cfg).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_connect_options_carry_parameters() {
        let options = connect_options(&config("db.internal")).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6432);
        assert_eq!(options.get_database(), Some("bi"));
        assert_eq!(options.get_username(), "reporter");
    }

    #[test]
    fn test_map_connection_error_fallback() {
        let err = map_connection_error(sqlx::Error::PoolClosed, &config("localhost"));
        assert!(matches!(err, ReportError::Connection(_)));
    }

    #[test]
    fn test_format_non_database_error() {
        let msg = format_query_error(sqlx::Error::RowNotFound);
        assert!(msg.contains("no rows"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_connect_to_unreachable_host() {
        let result = PostgresClient::connect(&config("invalid.host.that.does.not.exist.local")).await;
        assert!(matches!(result, Err(ReportError::Connection(_))));
    }

    #[tokio::test]
    async fn test_execute_after_close_fails() {
        let mut client = PostgresClient { conn: None };
        let result = client.execute_query("SELECT 1").await;
        assert!(matches!(result, Err(ReportError::Connection(_))));
        client.close().await.unwrap();
    }
}
