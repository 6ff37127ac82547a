//! Filename derivation for generated documents
//!
//! Pure function of (title, query, timestamp): no clock or filesystem access
//! here, so callers control the instant and tests are deterministic.

use chrono::{DateTime, Local};
use regex::Regex;

/// Maximum characters kept from the cleaned title.
const MAX_TITLE_CHARS: usize = 50;

/// Maximum characters kept from the cleaned query.
const MAX_QUERY_CHARS: usize = 30;

/// Derive the document filename from the selected title, the research query
/// and a timestamp.
///
/// Both components are reduced to word characters and underscores; the query
/// segment is omitted when it cleans down to nothing, and a generic
/// `NotebookLM_Content` name stands in when the title does too.
pub fn generate_filename(title: &str, query: &str, timestamp: DateTime<Local>) -> String {
    let clean_title = truncate_chars(&sanitize_component(title), MAX_TITLE_CHARS);
    let clean_query = truncate_chars(&sanitize_component(query), MAX_QUERY_CHARS);
    let stamp = timestamp.format("%Y%m%d_%H%M%S");

    if !clean_title.is_empty() && !clean_query.is_empty() {
        format!("NotebookLM_{clean_title}_{clean_query}_{stamp}.pdf")
    } else if !clean_title.is_empty() {
        format!("NotebookLM_{clean_title}_{stamp}.pdf")
    } else {
        format!("NotebookLM_Content_{stamp}.pdf")
    }
}

/// Strip everything but word characters, spaces and hyphens, then collapse
/// hyphen/space runs to single underscores.
fn sanitize_component(raw: &str) -> String {
    let strip = Regex::new(r"[^\w\s-]").unwrap();
    let collapse = Regex::new(r"[-\s]+").unwrap();

    let stripped = strip.replace_all(raw, "");
    let collapsed = collapse.replace_all(&stripped, "_");
    collapsed.trim_matches('_').to_string()
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
