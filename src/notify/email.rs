//! Email channel: one plain-text message per report through an SMTP relay.
//!
//! Port 465 (the default) uses implicit TLS; port 587 upgrades with STARTTLS.
//! The transport is built per send, so a bad relay setting only fails the
//! email channel when it is actually used.

use super::{Notification, Notifier};
use crate::config::MailConfig;
use crate::error::WatchError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, instrument};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);
const STARTTLS_PORT: u16 = 587;

#[derive(Debug)]
pub struct EmailNotifier {
    config: MailConfig,
}

impl EmailNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// The message that [`Notifier::send`] would deliver.
    pub fn build_message(&self, notification: &Notification) -> Result<Message, WatchError> {
        let from: Mailbox = self.config.user.parse()?;
        let to: Mailbox = self.config.recipient.parse()?;
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())?;
        Ok(message)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, WatchError> {
        let builder = if self.config.smtp_port == STARTTLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)?
        };
        Ok(builder
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.user.clone(),
                self.config.app_password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build())
    }
}

impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    #[instrument(level = "info", skip_all, fields(to = %self.config.recipient, host = %self.config.smtp_host))]
    async fn send(&self, notification: &Notification) -> Result<(), WatchError> {
        let message = self.build_message(notification)?;
        let response = self.transport()?.send(message).await?;
        debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}
