//! Report delivery over SMTP.
//!
//! `Mailer` authenticates once, then sends one message per valid recipient
//! over the same session. A failed recipient is recorded and the run moves on;
//! the session is always closed with QUIT.

mod mailer;
mod message;
pub mod mock;
mod smtp;
mod validation;

pub use mailer::{Mailer, SmtpEndpoint};
pub use message::{build_message, AttachmentFile, MessageParts};
pub use smtp::SmtpSession;
pub use validation::{is_valid_address, parse_address, partition_recipients};

use crate::error::Result;
use async_trait::async_trait;
use lettre::Message;
use std::path::PathBuf;

/// An authenticated SMTP session.
#[async_trait]
pub trait MailTransport: Send {
    /// Sends one message to the recipients in its envelope.
    async fn send(&mut self, message: &Message) -> Result<()>;

    /// Ends the session.
    async fn quit(&mut self) -> Result<()>;
}

/// What to send and to whom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailRequest {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
    pub attachment: Option<PathBuf>,
    pub html: Option<String>,
}

/// A recipient whose message could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRecipient {
    pub address: String,
    pub error: String,
}

/// Outcome of a mailing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailingReport {
    /// Recipients the server accepted.
    pub sent: Vec<String>,
    /// Addresses skipped as malformed.
    pub rejected: Vec<String>,
    pub failed: Vec<FailedRecipient>,
}

impl MailingReport {
    /// True when every recipient was valid and delivered.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty() && self.failed.is_empty()
    }
}
