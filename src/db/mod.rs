//! Database access for db-report.
//!
//! Provides a trait-based client interface so the executor can run against
//! PostgreSQL or an in-memory mock.

mod executor;
mod mock;
mod postgres;
mod query;
mod types;

pub use executor::QueryExecutor;
pub use mock::{ClientTracker, FailingDatabaseClient, MockDatabaseClient};
pub use postgres::PostgresClient;
pub use query::{substitute_positional, QuerySource};
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface for database clients.
///
/// A client owns at most one connection; after `close` it rejects queries.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Executes a SQL statement and returns its rows.
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Closes the connection. Closing twice is a no-op.
    async fn close(&mut self) -> Result<()>;
}
