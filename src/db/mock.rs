//! Mock database clients for testing.
//!
//! Return canned results and record what was executed, so pipeline code can
//! be exercised without a PostgreSQL server.

use super::{DatabaseClient, QueryResult};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Shared view of what a mock client saw, readable after the client is consumed.
#[derive(Debug, Clone, Default)]
pub struct ClientTracker {
    executed: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl ClientTracker {
    /// SQL statements executed so far.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|sql| sql.clone())
            .unwrap_or_default()
    }

    /// Whether `close` was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn record(&self, sql: &str) {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }
    }

    fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A mock database client that returns a predefined result.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    result: QueryResult,
    tracker: ClientTracker,
}

impl MockDatabaseClient {
    /// Creates a mock returning an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock returning `result` for every query.
    pub fn with_result(result: QueryResult) -> Self {
        Self {
            result,
            tracker: ClientTracker::default(),
        }
    }

    pub fn tracker(&self) -> ClientTracker {
        self.tracker.clone()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        if self.tracker.is_closed() {
            return Err(ReportError::connection("Connection is already closed"));
        }
        self.tracker.record(sql);
        Ok(self.result.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.tracker.mark_closed();
        Ok(())
    }
}

/// A mock client whose queries always fail.
#[derive(Debug)]
pub struct FailingDatabaseClient {
    message: String,
    tracker: ClientTracker,
}

impl FailingDatabaseClient {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tracker: ClientTracker::default(),
        }
    }

    pub fn tracker(&self) -> ClientTracker {
        self.tracker.clone()
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        self.tracker.record(sql);
        Err(ReportError::query(format!("ERROR: {}", self.message)))
    }

    async fn close(&mut self) -> Result<()> {
        self.tracker.mark_closed();
        Ok(())
    }
}
