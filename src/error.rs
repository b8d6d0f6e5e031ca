//! Error types for db-report.
//!
//! Every pipeline stage returns one of these so the orchestrator can decide
//! whether to skip or abort the stages that follow.

use thiserror::Error;

/// Main error type for reporting operations.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query errors (unreadable SQL file, bad placeholder, server-side failure)
    #[error("Query error: {0}")]
    Query(String),

    /// File serialization errors for any export format
    #[error("Export error: {0}")]
    Export(String),

    /// Invalid input caught before any side effect (bad address, missing key)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Template parsing or rendering errors
    #[error("Template error: {0}")]
    Template(String),

    /// SMTP authentication rejected
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// SMTP transport errors (connect, TLS, send)
    #[error("Mail error: {0}")]
    Mail(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReportError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an export error with the given message.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a template error with the given message.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    /// Creates an authentication error with the given message.
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Creates a mail transport error with the given message.
    pub fn mail(msg: impl Into<String>) -> Self {
        Self::Mail(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Export(_) => "Export Error",
            Self::Validation(_) => "Validation Error",
            Self::Template(_) => "Template Error",
            Self::Authentication(_) => "Authentication Error",
            Self::Mail(_) => "Mail Error",
            Self::Config(_) => "Configuration Error",
        }
    }
}

impl From<minijinja::Error> for ReportError {
    fn from(e: minijinja::Error) -> Self {
        Self::Template(e.to_string())
    }
}

/// Result type alias using ReportError.
pub type Result<T> = std::result::Result<T, ReportError>;
