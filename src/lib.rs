//! db-report - query PostgreSQL, export the result and mail it as a report.
//!
//! The binary is a thin wrapper around [`pipeline::run`]; the modules are
//! public so integration tests can drive each stage on its own.

pub mod config;
pub mod db;
pub mod error;
pub mod html;
pub mod logging;
pub mod mail;
pub mod pipeline;
pub mod storage;
