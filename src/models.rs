//! Data models for one check cycle.
//!
//! This module defines the values that flow through the pipeline:
//! - [`Finding`]: one located pattern match with its surrounding text
//! - [`CheckResult`]: all findings for one target plus the tier that found them
//! - [`CycleReport`]: the outcome of a full pass over every target
//!
//! Nothing here outlives a cycle; there is no memory of earlier runs, so an
//! unchanged offer is reported again on every cycle.

use serde::Serialize;
use std::fmt;

/// Category of a matched pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    /// Discount wording: percentages, currency amounts, free shipping, "sale".
    Offer,
    /// Time-bound wording: HH:MM:SS timers, "ends in", "expires", "N days".
    Countdown,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::Offer => f.write_str("offer"),
            FindingKind::Countdown => f.write_str("countdown"),
        }
    }
}

/// A single pattern match inside extracted page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// The exact substring the pattern matched.
    pub matched_text: String,
    /// Up to 80 characters either side of the match, trimmed, at most 200 characters.
    pub context: String,
}

/// Which extraction tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMethod {
    /// Plain HTTP GET + HTML parse.
    Basic,
    /// Headless browser render.
    Rendered,
    /// Neither tier found anything.
    None,
}

impl fmt::Display for ExtractMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractMethod::Basic => f.write_str("basic"),
            ExtractMethod::Rendered => f.write_str("rendered"),
            ExtractMethod::None => f.write_str("none"),
        }
    }
}

/// Outcome of checking one target.
///
/// Only constructible through [`CheckResult::found`] and
/// [`CheckResult::nothing`], so `method == None` if and only if the findings
/// are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    url: String,
    method: ExtractMethod,
    findings: Vec<Finding>,
}

impl CheckResult {
    /// Result for a tier that matched something.
    ///
    /// Falls back to [`CheckResult::nothing`] when `findings` is empty or the
    /// method given is `None`.
    pub fn found(url: impl Into<String>, method: ExtractMethod, findings: Vec<Finding>) -> Self {
        if findings.is_empty() || method == ExtractMethod::None {
            return Self::nothing(url);
        }
        Self {
            url: url.into(),
            method,
            findings,
        }
    }

    /// Result for a target where neither tier matched.
    pub fn nothing(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: ExtractMethod::None,
            findings: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> ExtractMethod {
        self.method
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

    /// Findings of one kind, in their original order.
    pub fn findings_of(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }
}

/// Summary of one pass over all configured targets.
#[derive(Debug, Default, Serialize)]
pub struct CycleReport {
    /// Results for targets that ran to completion, in target order.
    pub results: Vec<CheckResult>,
    pub completed: usize,
    pub failed: usize,
}

impl CycleReport {
    pub fn any_completed(&self) -> bool {
        self.completed > 0
    }

    pub fn offers_found(&self) -> usize {
        self.results.iter().filter(|r| r.has_findings()).count()
    }
}
