//! In-memory transport for tests.

use super::MailTransport;
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use lettre::Message;
use std::sync::{Arc, Mutex};

/// A message as the transport saw it.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub to: Vec<String>,
    pub raw: String,
}

#[derive(Debug, Default)]
struct Log {
    sent: Vec<SentMessage>,
    quits: usize,
}

/// Shared view of what a `RecordingTransport` did, usable after the
/// transport has been moved into a mailer.
#[derive(Debug, Clone, Default)]
pub struct TransportTracker {
    log: Arc<Mutex<Log>>,
}

impl TransportTracker {
    pub fn sent(&self) -> Vec<SentMessage> {
        self.log.lock().map(|log| log.sent.clone()).unwrap_or_default()
    }

    pub fn quit_count(&self) -> usize {
        self.log.lock().map(|log| log.quits).unwrap_or_default()
    }
}

/// Transport that records messages instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    tracker: TransportTracker,
    refuse: Vec<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `send` fail for messages addressed to `address`.
    pub fn refusing(mut self, address: impl Into<String>) -> Self {
        self.refuse.push(address.into());
        self
    }

    pub fn tracker(&self) -> TransportTracker {
        self.tracker.clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&mut self, message: &Message) -> Result<()> {
        let to: Vec<String> = message.envelope().to().iter().map(ToString::to_string).collect();
        if let Some(address) = to.iter().find(|a| self.refuse.contains(a)) {
            return Err(ReportError::mail(format!("550 mailbox unavailable: {address}")));
        }

        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        if let Ok(mut log) = self.tracker.log.lock() {
            log.sent.push(SentMessage { to, raw });
        }
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        if let Ok(mut log) = self.tracker.log.lock() {
            log.quits += 1;
        }
        Ok(())
    }
}
