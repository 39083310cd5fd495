//! Offer and countdown pattern matching.
//!
//! The pattern set is fixed and compiled once. [`find_offers`] walks the
//! offer patterns first and then the countdown patterns, each in declaration
//! order, and reports every non-overlapping match of each pattern from left to
//! right. Patterns are independent: "expires in 2 days" yields both an
//! `expir*` finding and a `2 days` finding.

use crate::models::{Finding, FindingKind};
use crate::utils::{chars_back, chars_forward, truncate_chars};
use once_cell::sync::Lazy;
use regex::Regex;

/// Characters of context kept on each side of a match.
pub const CONTEXT_RADIUS: usize = 80;

/// Upper bound on a finding's context, in characters.
pub const MAX_CONTEXT_CHARS: usize = 200;

/// A compiled pattern and the category it reports under.
#[derive(Debug)]
pub struct Pattern {
    pub kind: FindingKind,
    pub regex: Regex,
}

fn compile(kind: FindingKind, source: &str) -> Pattern {
    Pattern {
        kind,
        regex: Regex::new(source).expect("built-in pattern must compile"),
    }
}

static OFFER_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    [
        r"(?i)\b\d{1,2}%\s*off\b",
        r"(?i)\b\d{1,2}\s*%",
        r"(?i)\$ ?\d{1,4}(?:\s*(?:off|discount|de descuento))?",
        r"(?i)\bfree shipping\b",
        r"(?i)\benv[ií]o gratis\b",
        r"(?i)\bsale\b",
        r"(?i)\bdiscount\b",
        r"(?i)\boff\b",
        r"(?i)\bpromo\b",
    ]
    .into_iter()
    .map(|source| compile(FindingKind::Offer, source))
    .collect()
});

static COUNTDOWN_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    [
        r"\b\d{1,2}:\d{2}:\d{2}\b",
        r"(?i)\bends in\b",
        r"(?i)\bexpir\w+\b",
        r"(?i)\b\d+\s*days?\b",
        r"(?i)\b\d+\s*horas?\b",
    ]
    .into_iter()
    .map(|source| compile(FindingKind::Countdown, source))
    .collect()
});

/// Every pattern in match order: offers, then countdowns.
pub fn patterns() -> impl Iterator<Item = &'static Pattern> {
    OFFER_PATTERNS.iter().chain(COUNTDOWN_PATTERNS.iter())
}

/// Locate every offer and countdown pattern in `text`.
///
/// Empty input yields an empty vector. The result is deterministic for a given
/// input.
pub fn find_offers(text: &str) -> Vec<Finding> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut findings = Vec::new();
    for pattern in patterns() {
        for m in pattern.regex.find_iter(text) {
            findings.push(Finding {
                kind: pattern.kind,
                matched_text: m.as_str().to_string(),
                context: context_around(text, m.start(), m.end()),
            });
        }
    }
    tracing::debug!(count = findings.len(), "Pattern scan complete");
    findings
}

/// The trimmed window of [`CONTEXT_RADIUS`] characters around `start..end`.
fn context_around(text: &str, start: usize, end: usize) -> String {
    let from = chars_back(text, start, CONTEXT_RADIUS);
    let to = chars_forward(text, end, CONTEXT_RADIUS);
    truncate_chars(text[from..to].trim(), MAX_CONTEXT_CHARS).to_string()
}
