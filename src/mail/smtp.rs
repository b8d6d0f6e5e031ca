//! SMTP session over lettre's async client connection.

use super::{MailTransport, SmtpEndpoint};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{AsyncSmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::Message;
use std::time::Duration;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Port on which the server expects TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

/// How the connection is encrypted.
#[derive(Clone)]
enum Security {
    Starttls(TlsParameters),
    Implicit(TlsParameters),
    #[cfg(test)]
    Plaintext,
}

/// Connected, encrypted and authenticated SMTP session.
///
/// lettre drops the connection after any rejected command, so a failed
/// send reopens the session before the next recipient is tried.
pub struct SmtpSession {
    conn: AsyncSmtpConnection,
    endpoint: SmtpEndpoint,
    security: Security,
}

impl SmtpSession {
    /// Connects, upgrades with STARTTLS (or implicit TLS on 465) and logs in.
    pub async fn open(endpoint: &SmtpEndpoint) -> Result<Self> {
        let tls = TlsParameters::new(endpoint.host.clone())
            .map_err(|e| ReportError::mail(format!("TLS setup failed: {e}")))?;
        let security = if endpoint.port == IMPLICIT_TLS_PORT {
            Security::Implicit(tls)
        } else {
            Security::Starttls(tls)
        };

        Self::start(endpoint.clone(), security).await
    }

    /// Unencrypted session, for talking to a local test server.
    #[cfg(test)]
    pub(crate) async fn open_plaintext(endpoint: &SmtpEndpoint) -> Result<Self> {
        Self::start(endpoint.clone(), Security::Plaintext).await
    }

    async fn start(endpoint: SmtpEndpoint, security: Security) -> Result<Self> {
        let conn = connect(&endpoint, &security).await?;
        Ok(Self {
            conn,
            endpoint,
            security,
        })
    }

    async fn reconnect(&mut self) {
        warn!(
            "SMTP session to {}:{} was closed, reconnecting",
            self.endpoint.host, self.endpoint.port
        );
        match connect(&self.endpoint, &self.security).await {
            Ok(conn) => self.conn = conn,
            Err(e) => warn!("Reconnect failed: {}", e),
        }
    }
}

async fn connect(endpoint: &SmtpEndpoint, security: &Security) -> Result<AsyncSmtpConnection> {
    let hello = ClientId::default();
    let implicit = match security {
        Security::Implicit(tls) => Some(tls.clone()),
        _ => None,
    };

    debug!("Connecting to {}:{}", endpoint.host, endpoint.port);
    let mut conn = AsyncSmtpConnection::connect_tokio1(
        (endpoint.host.as_str(), endpoint.port),
        Some(CONNECT_TIMEOUT),
        &hello,
        implicit,
        None,
    )
    .await
    .map_err(|e| {
        ReportError::mail(format!(
            "Cannot connect to {}:{}: {e}",
            endpoint.host, endpoint.port
        ))
    })?;

    if let Security::Starttls(tls) = security {
        conn.starttls(tls.clone(), &hello)
            .await
            .map_err(|e| ReportError::mail(format!("STARTTLS failed: {e}")))?;
    }

    let credentials = Credentials::new(endpoint.login.clone(), endpoint.password.clone());
    conn.auth(&[Mechanism::Plain, Mechanism::Login], &credentials)
        .await
        .map_err(|e| {
            ReportError::authentication(format!("Login as {} failed: {e}", endpoint.login))
        })?;

    Ok(conn)
}

#[async_trait]
impl MailTransport for SmtpSession {
    async fn send(&mut self, message: &Message) -> Result<()> {
        let sent = self
            .conn
            .send(message.envelope(), &message.formatted())
            .await;

        match sent {
            Ok(_) => Ok(()),
            Err(e) => {
                if self.conn.has_broken() {
                    self.reconnect().await;
                }
                Err(ReportError::mail(e.to_string()))
            }
        }
    }

    async fn quit(&mut self) -> Result<()> {
        if self.conn.has_broken() {
            debug!("SMTP session already closed");
            return Ok(());
        }
        self.conn
            .quit()
            .await
            .map(|_| ())
            .map_err(|e| ReportError::mail(format!("QUIT failed: {e}")))
    }
}
