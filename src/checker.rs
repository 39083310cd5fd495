//! Two-tier check orchestration.
//!
//! For each target the [`Checker`] runs the basic tier, and only if its text
//! matches nothing, the rendered tier. The first tier with findings wins; if
//! neither finds anything the result's method is `none`.
//!
//! Targets are processed one at a time. Whatever goes wrong with one target,
//! including a panic, is logged at the per-target boundary and the cycle moves
//! on to the next.

use crate::error::WatchError;
use crate::models::{CheckResult, CycleReport};
use crate::notify::{Notifier, compose};
use crate::patterns::find_offers;
use crate::scrapers::TextExtractor;
use chrono::Local;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, instrument, warn};

/// Per-cycle behaviour switches.
#[derive(Debug, Clone)]
pub struct CycleOptions {
    /// Send a report even when a page shows no offers.
    pub notify_when_empty: bool,
    pub subject_prefix: String,
}

/// Drives both extraction tiers and the matcher.
#[derive(Debug)]
pub struct Checker<B, R> {
    basic: B,
    rendered: R,
}

impl<B, R> Checker<B, R>
where
    B: TextExtractor,
    R: TextExtractor,
{
    pub fn new(basic: B, rendered: R) -> Self {
        Self { basic, rendered }
    }

    /// Check one page; never fails.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn check_site(&self, url: &str) -> CheckResult {
        info!(method = %self.basic.method(), "Checking page");
        let text = self.basic.extract(url).await;
        let findings = find_offers(&text);
        if !findings.is_empty() {
            info!(count = findings.len(), method = %self.basic.method(), "Findings");
            return CheckResult::found(url, self.basic.method(), findings);
        }

        info!(method = %self.rendered.method(), "Nothing found; trying fallback tier");
        let text = self.rendered.extract(url).await;
        let findings = find_offers(&text);
        if !findings.is_empty() {
            info!(count = findings.len(), method = %self.rendered.method(), "Findings");
            return CheckResult::found(url, self.rendered.method(), findings);
        }

        info!("No offers detected by any tier");
        CheckResult::nothing(url)
    }

    /// One pass over every target: check, compose, notify.
    ///
    /// A target counts as completed once its check ran and delivery was
    /// attempted; channel failures are the notifier's concern.
    #[instrument(level = "info", skip_all, fields(targets = targets.len()))]
    pub async fn run_cycle<N: Notifier>(
        &self,
        targets: &[String],
        notifier: &N,
        options: &CycleOptions,
    ) -> CycleReport {
        let mut report = CycleReport::default();

        for url in targets {
            let outcome = AssertUnwindSafe(self.process_target(url, notifier, options))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(result)) => {
                    report.completed += 1;
                    report.results.push(result);
                }
                Ok(Err(e)) => {
                    report.failed += 1;
                    error!(%url, error = %e, "Target check failed; moving on");
                }
                Err(panic) => {
                    report.failed += 1;
                    error!(%url, panic = %panic_message(panic.as_ref()), "Target check panicked; moving on");
                }
            }
        }

        info!(
            completed = report.completed,
            failed = report.failed,
            with_offers = report.offers_found(),
            "Cycle finished"
        );
        report
    }

    async fn process_target<N: Notifier>(
        &self,
        url: &str,
        notifier: &N,
        options: &CycleOptions,
    ) -> Result<CheckResult, WatchError> {
        url::Url::parse(url).map_err(|source| WatchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let result = self.check_site(url).await;
        if result.has_findings() || options.notify_when_empty {
            let notification = compose(&result, &options.subject_prefix, Local::now());
            if let Err(e) = notifier.send(&notification).await {
                warn!(%url, channel = notifier.channel(), error = %e, "Notification failed");
            }
        } else {
            info!(%url, "No offers and quiet mode on; skipping notification");
        }
        Ok(result)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
