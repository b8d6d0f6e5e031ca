use super::message::{build_message, AttachmentFile, MessageParts};
use super::validation::{parse_address, partition_recipients};
use super::{FailedRecipient, MailRequest, MailTransport, MailingReport, SmtpSession};
use crate::config::MailConfig;
use crate::error::{ReportError, Result};
use lettre::message::Mailbox;
use lettre::Address;
use std::future::Future;
use tracing::{info, warn};

/// Where and as whom to log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpEndpoint {
    pub host: String,
    pub port: u16,
    pub login: String,
    pub password: String,
}

impl SmtpEndpoint {
    /// The relay is `smtp.<sender domain>` unless configured explicitly.
    pub fn for_sender(sender: &Address, config: &MailConfig) -> Result<Self> {
        let password = config.password.clone().ok_or_else(|| {
            ReportError::config("mail.password is not set (or export SMTP_PASSWORD)")
        })?;
        let host = config
            .smtp_host
            .clone()
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| format!("smtp.{}", sender.domain()));

        Ok(Self {
            host,
            port: config.port,
            login: sender.to_string(),
            password,
        })
    }
}

/// Sends reports from one sender over one authenticated session.
pub struct Mailer<T: MailTransport> {
    sender: Mailbox,
    transport: T,
}

impl Mailer<SmtpSession> {
    /// Validates the sender and opens an authenticated SMTP session.
    pub async fn connect(config: &MailConfig) -> Result<Self> {
        Self::establish(config, |endpoint| async move { SmtpSession::open(&endpoint).await }).await
    }
}

impl<T: MailTransport> Mailer<T> {
    /// Validates the sender, then hands the endpoint to `open` for the session.
    pub async fn establish<F, Fut>(config: &MailConfig, open: F) -> Result<Self>
    where
        F: FnOnce(SmtpEndpoint) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let sender = parse_address(&config.sender)?;
        let endpoint = SmtpEndpoint::for_sender(&sender, config)?;

        info!(
            "Authorizing as {} at {}:{}",
            endpoint.login, endpoint.host, endpoint.port
        );
        let transport = open(endpoint).await?;
        info!("Authorized");

        Ok(Self {
            sender: Mailbox::new(None, sender),
            transport,
        })
    }

    pub fn sender(&self) -> &Mailbox {
        &self.sender
    }

    /// Sends one message per valid recipient, then ends the session.
    ///
    /// Malformed addresses are skipped and failed deliveries recorded; only
    /// an unreadable attachment aborts the run.
    pub async fn run_mailing(mut self, request: &MailRequest) -> Result<MailingReport> {
        let outcome = self.deliver(request).await;

        if let Err(e) = self.transport.quit().await {
            warn!("Failed to close SMTP session: {}", e);
        }

        outcome
    }

    async fn deliver(&mut self, request: &MailRequest) -> Result<MailingReport> {
        let (valid, rejected) = partition_recipients(&request.recipients);
        for address in &rejected {
            warn!("Skipping invalid recipient address: {}", address);
        }

        let attachment = request
            .attachment
            .as_deref()
            .map(AttachmentFile::load)
            .transpose()?;
        let parts = MessageParts {
            subject: &request.subject,
            body: &request.body,
            attachment: attachment.as_ref(),
            html: request.html.as_deref(),
        };

        let mut report = MailingReport {
            rejected,
            ..MailingReport::default()
        };

        for recipient in valid {
            let sent = match build_message(&self.sender, &recipient, parts) {
                Ok(message) => self.transport.send(&message).await,
                Err(e) => Err(e),
            };

            match sent {
                Ok(()) => {
                    info!("Message sent to {}", recipient);
                    report.sent.push(recipient.to_string());
                }
                Err(e) => {
                    warn!("Failed to send to {}: {}", recipient, e);
                    report.failed.push(FailedRecipient {
                        address: recipient.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}
