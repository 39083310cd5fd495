//! Page-text extractors for the two fetch tiers.
//!
//! Both tiers follow the same recipe:
//!
//! 1. **Fetch**: get the page, either as raw HTML ([`basic`]) or as a live DOM
//!    in a headless browser ([`rendered`])
//! 2. **Select**: evaluate an ordered list of [`Region`] rules, each of which
//!    yields the text of one heuristic "top of page" area if it exists
//! 3. **Assemble**: drop absent regions, normalize whitespace, join with
//!    single spaces and lowercase ([`assemble_text`])
//!
//! | Tier | Module | Fetch | Catch-all cap |
//! |------|--------|-------|---------------|
//! | Basic | [`basic`] | `reqwest` GET + `scraper` parse | 4000 chars |
//! | Rendered | [`rendered`] | `chromiumoxide` headless Chromium | 8000 chars |
//!
//! Extractors never fail outward: any error is logged and surfaces as empty
//! text, which the orchestrator treats as "nothing found".

use crate::models::ExtractMethod;
use crate::utils::normalize_whitespace;

pub mod basic;
pub mod rendered;

pub use basic::BasicExtractor;
pub use rendered::RenderedExtractor;

/// One extraction tier.
pub trait TextExtractor {
    /// The method recorded on results this tier produces.
    fn method(&self) -> ExtractMethod;

    /// Lowercased, whitespace-normalized text from the top of `url`'s page,
    /// or an empty string when the page could not be fetched.
    async fn extract(&self, url: &str) -> String;
}

/// A heuristic page region to pull text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Text of the first element matching a CSS selector.
    First(&'static str),
    /// Visible text of the whole page, cut to `max_chars`.
    PageText { max_chars: usize },
}

/// Region rules for the basic tier, in evaluation order.
pub const BASIC_REGIONS: &[Region] = &[
    Region::First("header"),
    Region::First(".hero"),
    Region::First(".banner"),
    Region::First(".top-bar"),
    Region::First(".promo"),
    Region::First(".specials"),
    Region::First(".site-banner"),
    Region::PageText { max_chars: 4000 },
];

/// Region rules for the rendered tier, in evaluation order.
pub const RENDERED_REGIONS: &[Region] = &[
    Region::First("header"),
    Region::First("div[class*='banner']"),
    Region::First("div[class*='promo']"),
    Region::First("div[class*='hero']"),
    Region::First("div[class*='top']"),
    Region::First("section[class*='banner']"),
    Region::First("section[class*='promo']"),
    Region::PageText { max_chars: 8000 },
];

/// Join the present region fragments into one lowercase text blob.
pub fn assemble_text<I>(fragments: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    fragments
        .into_iter()
        .flatten()
        .map(|fragment| normalize_whitespace(&fragment))
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
