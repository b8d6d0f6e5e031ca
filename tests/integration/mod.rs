//! Integration tests for db-report.
//!
//! Database tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable to run them.

pub mod connection_test;
pub mod export_test;
pub mod pipeline_test;
pub mod query_test;
