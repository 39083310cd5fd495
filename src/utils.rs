//! Small string helpers shared by the extractors, matcher and notifiers.
//!
//! Everything here counts in `char`s rather than bytes: scraped storefront
//! text is routinely non-ASCII ("envío gratis"), and slicing on a byte index
//! would panic mid-character.

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// a count of the dropped characters appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 chars)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        format!("{}…(+{} chars)", truncate_chars(s, max), total - max)
    }
}

/// The first `max` characters of `s`, borrowed.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte index `n` characters before `idx`, clamped to the start of `s`.
///
/// `idx` must lie on a char boundary.
pub fn chars_back(s: &str, idx: usize, n: usize) -> usize {
    s[..idx]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(idx)
}

/// Byte index `n` characters after `idx`, clamped to the end of `s`.
///
/// `idx` must lie on a char boundary.
pub fn chars_forward(s: &str, idx: usize, n: usize) -> usize {
    s[idx..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| idx + i)
        .unwrap_or(s.len())
}

/// Short human label for a target URL, used in subject lines.
///
/// For example: `"https://shop.example.com/deals"` -> `"shop.example.com"`.
/// Falls back to the raw input when it does not parse as a URL with a host.
pub fn site_label(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| url.to_string())
}
