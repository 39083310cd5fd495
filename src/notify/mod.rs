//! Report composition and delivery.
//!
//! # Submodules
//!
//! - [`telegram`]: Telegram Bot API `sendMessage`
//! - [`email`]: plain-text mail through an SMTP relay
//!
//! A [`Dispatcher`] owns whichever channels are configured and fans each
//! [`Notification`] out to all of them. A failing channel is logged and never
//! stops the other channel or the rest of the cycle.

use crate::config::Config;
use crate::error::WatchError;
use crate::models::{CheckResult, FindingKind};
use crate::utils::site_label;
use chrono::{DateTime, Local};
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

pub mod email;
pub mod telegram;

pub use email::EmailNotifier;
pub use telegram::TelegramNotifier;

/// A rendered report for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    /// Whether the report announces at least one finding.
    pub has_offers: bool,
}

/// A delivery channel.
pub trait Notifier {
    /// Short channel name for logs.
    fn channel(&self) -> &'static str;

    async fn send(&self, notification: &Notification) -> Result<(), WatchError>;
}

/// Build the report for one check result.
pub fn compose(result: &CheckResult, subject_prefix: &str, now: DateTime<Local>) -> Notification {
    let stamp = now.format("%Y-%m-%d %H:%M:%S");
    let site = site_label(result.url());

    if !result.has_findings() {
        return Notification {
            subject: format!("{subject_prefix} - no offers on {site}"),
            body: format!(
                "🔎 Check: {stamp}\nURL: {}\nNo active discounts found in the top banner.",
                result.url()
            ),
            has_offers: false,
        };
    }

    let mut sections = vec![format!(
        "🚨 Offer detected ({stamp})\nURL: {}\nDetected by: {}",
        result.url(),
        result.method()
    )];

    let offers = result
        .findings_of(FindingKind::Offer)
        .map(|f| format!("- Offer: {}\n  snippet: {}", f.matched_text, f.context))
        .join("\n");
    if !offers.is_empty() {
        sections.push(format!("Offers found:\n{offers}"));
    }

    let countdowns = result
        .findings_of(FindingKind::Countdown)
        .map(|f| format!("- Time detected: {}\n  snippet: {}", f.matched_text, f.context))
        .join("\n");
    if !countdowns.is_empty() {
        sections.push(format!("Timers / countdowns:\n{countdowns}"));
    }

    Notification {
        subject: format!("{subject_prefix} - offer detected on {site}"),
        body: sections.join("\n\n"),
        has_offers: true,
    }
}

/// Fans a notification out to the configured channels.
#[derive(Debug)]
pub struct Dispatcher<M = TelegramNotifier, E = EmailNotifier> {
    messaging: Option<M>,
    email: Option<E>,
}

impl Dispatcher {
    /// Build the real channels from configuration.
    pub fn from_config(config: &Config) -> Result<Self, WatchError> {
        let messaging = config
            .telegram
            .clone()
            .map(TelegramNotifier::new)
            .transpose()?;
        let email = config.mail.clone().map(EmailNotifier::new);
        Ok(Self::new(messaging, email))
    }
}

impl<M: Notifier, E: Notifier> Dispatcher<M, E> {
    /// Missing channels are reported here, once per cycle.
    pub fn new(messaging: Option<M>, email: Option<E>) -> Self {
        if messaging.is_none() {
            warn!("Messaging channel disabled: bot token or chat id not configured");
        }
        if email.is_none() {
            warn!("Email channel disabled: mail account or app password not configured");
        }
        Self { messaging, email }
    }

    /// Number of channels that will receive notifications.
    pub fn channel_count(&self) -> usize {
        usize::from(self.messaging.is_some()) + usize::from(self.email.is_some())
    }
}

impl<M: Notifier, E: Notifier> Notifier for Dispatcher<M, E> {
    fn channel(&self) -> &'static str {
        "dispatcher"
    }

    /// Never fails: channel errors are logged and swallowed.
    #[instrument(level = "info", skip_all, fields(subject = %notification.subject))]
    async fn send(&self, notification: &Notification) -> Result<(), WatchError> {
        if self.channel_count() == 0 {
            debug!("No notification channels configured; report only logged");
            info!(body = %notification.body, "Report");
            return Ok(());
        }
        if let Some(messaging) = &self.messaging {
            deliver(messaging, notification).await;
        }
        if let Some(email) = &self.email {
            deliver(email, notification).await;
        }
        Ok(())
    }
}

async fn deliver<N: Notifier>(notifier: &N, notification: &Notification) {
    match notifier.send(notification).await {
        Ok(()) => info!(channel = notifier.channel(), "Notification sent"),
        Err(e) => warn!(channel = notifier.channel(), error = %e, "Notification failed"),
    }
}
