//! Single-use query execution.
//!
//! A `QueryExecutor` owns one database connection for exactly one enquiry.
//! `enquiry` consumes the executor and closes the connection on every path.

use crate::config::ConnectionConfig;
use crate::db::{DatabaseClient, PostgresClient, QueryResult, QuerySource};
use crate::error::Result;
use tracing::{info, warn};

/// Runs one query over a dedicated connection.
pub struct QueryExecutor {
    client: Box<dyn DatabaseClient>,
}

impl QueryExecutor {
    /// Connects to PostgreSQL with the given parameters.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        info!("Connecting to database: {}", config.display_string());
        let client = PostgresClient::connect(config).await?;
        info!("Connected to database");
        Ok(Self::new(Box::new(client)))
    }

    /// Wraps an already-open client.
    pub fn new(client: Box<dyn DatabaseClient>) -> Self {
        Self { client }
    }

    /// Executes `query` and closes the connection.
    ///
    /// File sources have `{0}` replaced by `schema` and `{1}` by `table`.
    /// A failure to close is logged and never replaces the query outcome.
    pub async fn enquiry(
        mut self,
        schema: &str,
        table: &str,
        query: &QuerySource,
    ) -> Result<QueryResult> {
        let result = self.run(schema, table, query).await;

        if let Err(e) = self.client.close().await {
            warn!("Failed to close database connection: {e}");
        }

        result
    }

    async fn run(&mut self, schema: &str, table: &str, query: &QuerySource) -> Result<QueryResult> {
        let sql = query.resolve(schema, table)?;

        info!("Executing query");
        let result = self.client.execute_query(&sql).await?;
        info!(
            "Fetched {} rows x {} columns in {:?}",
            result.row_count(),
            result.column_count(),
            result.execution_time
        );

        Ok(result)
    }
}
