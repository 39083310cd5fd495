//! Basic tier: one HTTP GET and a static HTML parse.
//!
//! Cheap and usually enough, but blind to banners injected by JavaScript.
//! When this tier's text matches nothing the orchestrator falls back to
//! [`super::rendered`].

use super::{BASIC_REGIONS, Region, TextExtractor, assemble_text};
use crate::config::FetchConfig;
use crate::error::WatchError;
use crate::models::ExtractMethod;
use crate::utils::{normalize_whitespace, truncate_chars, truncate_for_log};
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, info, instrument, warn};

/// Elements whose text is never shown to a visitor.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// HTTP + static HTML extractor.
#[derive(Debug, Clone)]
pub struct BasicExtractor {
    client: Client,
}

impl BasicExtractor {
    /// Build the extractor with its own HTTP client.
    ///
    /// The client sends `config.user_agent` and gives up after
    /// `config.timeout`; redirects follow reqwest's default policy.
    pub fn new(config: &FetchConfig) -> Result<Self, WatchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Use a pre-built client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_html(&self, url: &str) -> Result<String, WatchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

impl TextExtractor for BasicExtractor {
    fn method(&self) -> ExtractMethod {
        ExtractMethod::Basic
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn extract(&self, url: &str) -> String {
        match self.fetch_html(url).await {
            Ok(html) => {
                let text = extract_top_text(&html);
                info!(
                    html_bytes = html.len(),
                    chars = text.chars().count(),
                    "Extracted top-of-page text"
                );
                debug!(preview = %truncate_for_log(&text, 300), "Basic text");
                text
            }
            Err(e) => {
                warn!(error = %e, "Basic fetch failed; continuing with empty text");
                String::new()
            }
        }
    }
}

/// Pull the heuristic top-of-page text out of an HTML document.
///
/// Evaluates every rule in [`BASIC_REGIONS`]; regions that are absent simply
/// contribute nothing.
pub fn extract_top_text(html: &str) -> String {
    let document = Html::parse_document(html);
    assemble_text(
        BASIC_REGIONS
            .iter()
            .map(|region| region_text(&document, region)),
    )
}

fn region_text(document: &Html, region: &Region) -> Option<String> {
    match region {
        Region::First(css) => {
            let selector = match Selector::parse(css) {
                Ok(selector) => selector,
                Err(e) => {
                    debug!(selector = %css, error = %e, "Skipping unparsable selector");
                    return None;
                }
            };
            document.select(&selector).next().map(visible_text)
        }
        Region::PageText { max_chars } => {
            let body = Selector::parse("body").expect("static selector");
            let root = document
                .select(&body)
                .next()
                .unwrap_or_else(|| document.root_element());
            let text = normalize_whitespace(&visible_text(root));
            Some(truncate_chars(&text, *max_chars).to_string())
        }
    }
}

/// Text under `element`, skipping script/style content, space separated.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if INVISIBLE_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}
