//! HTML content extraction
//!
//! Extracts candidate text blocks from web pages using ordered fallback
//! strategies. The first strategy that yields at least one qualifying
//! candidate wins; later strategies are not attempted.
//!
//! 1. `<article>` elements (up to the first 10), one candidate each
//! 2. A single `<main>`/`<article>` container, or the first `<div>` whose
//!    class looks content-like (.content, .post, .entry, .article)
//! 3. Fallback: every substantial `<p>` in the document, as one candidate
//!
//! When no strategy produces content above the minimum threshold, a single
//! sentinel candidate is returned so callers never see an empty list.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Minimum content length for a candidate to qualify.
pub const MIN_CONTENT_CHARS: usize = 200;

/// Minimum paragraph length considered in the whole-document fallback.
const MIN_PARAGRAPH_CHARS: usize = 50;

/// Maximum number of `<article>` elements examined by the first strategy.
const MAX_ARTICLES: usize = 10;

/// Title used when a page offers nothing better.
const FALLBACK_TITLE: &str = "Web Content";

/// An extracted (title, content) text block considered for selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub content: String,
}

impl Candidate {
    /// The sentinel candidate returned when nothing qualifying was found.
    pub fn sentinel() -> Self {
        Self {
            title: "No Content Found".to_string(),
            content: "Unable to extract meaningful content from this URL.".to_string(),
        }
    }

    /// Whether this candidate is the no-content sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.title == "No Content Found"
    }
}

/// Extract candidate text blocks from raw HTML.
///
/// Always returns at least one candidate; the sentinel stands in when the
/// page has no qualifying content.
pub fn extract_candidates(html: &str) -> Vec<Candidate> {
    let mut document = Html::parse_document(html);
    strip_noise(&mut document);

    // Ordered strategy list; each strategy is a pure view over the stripped
    // parse tree and the first non-empty result wins.
    let strategies: [fn(&Html) -> Option<Vec<Candidate>>; 3] = [
        article_candidates,
        main_content_candidate,
        whole_document_candidate,
    ];

    for strategy in strategies {
        if let Some(candidates) = strategy(&document) {
            return candidates;
        }
    }

    vec![Candidate::sentinel()]
}

/// Remove structural noise elements from the parse tree so none of the
/// strategies picks up navigation chrome or inline scripts.
fn strip_noise(document: &mut Html) {
    if let Ok(selector) = Selector::parse("script, style, nav, footer, header") {
        let ids: Vec<_> = document.select(&selector).map(|el| el.id()).collect();
        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

/// Strategy 1: one candidate per `<article>` element.
fn article_candidates(document: &Html) -> Option<Vec<Candidate>> {
    let article_sel = Selector::parse("article").ok()?;
    let heading_sel = Selector::parse("h1, h2, h3").ok()?;
    let para_sel = Selector::parse("p").ok()?;

    let mut candidates = Vec::new();
    for (idx, article) in document.select(&article_sel).take(MAX_ARTICLES).enumerate() {
        let title = article
            .select(&heading_sel)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("Article {}", idx + 1));

        let content = join_paragraphs(article.select(&para_sel));
        if content.chars().count() > MIN_CONTENT_CHARS {
            candidates.push(Candidate { title, content });
        }
    }

    if candidates.is_empty() {
        None
    } else {
        Some(candidates)
    }
}

/// Strategy 2: a single main-content container.
fn main_content_candidate(document: &Html) -> Option<Vec<Candidate>> {
    let container_sel = Selector::parse("main, article").ok()?;
    let heading_sel = Selector::parse("h1, h2").ok()?;
    let para_sel = Selector::parse("p").ok()?;

    let container = document
        .select(&container_sel)
        .next()
        .or_else(|| classed_container(document))?;

    let title = container
        .select(&heading_sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .or_else(|| document_title(document))
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    let content = join_paragraphs(container.select(&para_sel));
    if content.chars().count() > MIN_CONTENT_CHARS {
        Some(vec![Candidate { title, content }])
    } else {
        None
    }
}

/// First `<div>` whose class attribute looks content-like.
fn classed_container(document: &Html) -> Option<ElementRef<'_>> {
    let div_sel = Selector::parse("div[class]").ok()?;
    let pattern = Regex::new(r"(?i)(content|post|entry|article)").unwrap();

    document.select(&div_sel).find(|el| {
        el.value()
            .attr("class")
            .is_some_and(|class| pattern.is_match(class))
    })
}

/// Strategy 3: every substantial paragraph in the document.
fn whole_document_candidate(document: &Html) -> Option<Vec<Candidate>> {
    let para_sel = Selector::parse("p").ok()?;

    let title = document_title(document).unwrap_or_else(|| FALLBACK_TITLE.to_string());
    let paragraphs: Vec<String> = document
        .select(&para_sel)
        .map(element_text)
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect();

    let content = paragraphs.join(" ");
    if content.chars().count() > MIN_CONTENT_CHARS {
        Some(vec![Candidate { title, content }])
    } else {
        None
    }
}

fn document_title(document: &Html) -> Option<String> {
    let title_sel = Selector::parse("title").ok()?;
    document
        .select(&title_sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

/// Extract text from an element with whitespace normalized.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Concatenate paragraph texts, skipping empty ones.
fn join_paragraphs<'a>(paragraphs: impl Iterator<Item = ElementRef<'a>>) -> String {
    paragraphs
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
