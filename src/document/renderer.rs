// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! PDF document rendering
//!
//! Renders a selected candidate into a single-column A4 document: centered
//! bold title, muted metadata block (source URL, generation time, research
//! query), then the word-wrapped body. Pages are added as the write position
//! passes the bottom margin.
//!
//! Uses the PDF built-in Helvetica faces so no font assets are required on
//! disk. Writes are not atomic; a crash mid-write can leave a truncated file.

use chrono::{DateTime, Local};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rgb,
};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::SelectedCandidate;

/// Document rendering error types
#[derive(Debug, Error)]
pub enum RenderError {
    /// Filesystem failure while creating the storage directory or file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failure inside the PDF library
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 15.0;

const TITLE_SIZE_PT: f64 = 16.0;
const META_SIZE_PT: f64 = 10.0;
const BODY_SIZE_PT: f64 = 11.0;

const TITLE_LEADING_MM: f64 = 10.0;
const META_LEADING_MM: f64 = 7.0;
const BODY_LEADING_MM: f64 = 7.0;
const BLOCK_GAP_MM: f64 = 5.0;

const PT_TO_MM: f64 = 0.352_778;

/// Average Helvetica glyph width as a fraction of the font size, used for
/// wrapping and centering.
const AVG_CHAR_WIDTH_EM: f64 = 0.5;

/// Renders selected candidates into PDFs under a flat storage directory.
pub struct PdfRenderer {
    storage_dir: PathBuf,
}

impl PdfRenderer {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Render `selected` into `{storage_dir}/{filename}` and return the path.
    ///
    /// The storage directory is created if absent.
    pub fn render(
        &self,
        selected: &SelectedCandidate,
        source_url: &str,
        filename: &str,
        generated_at: DateTime<Local>,
    ) -> Result<PathBuf, RenderError> {
        fs::create_dir_all(&self.storage_dir)?;

        let title = collapse_whitespace(&selected.candidate.title);
        let body = collapse_whitespace(&selected.candidate.content);

        let (doc, page, layer) =
            PdfDocument::new(&title, mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM), "Layer 1");

        let regular = add_font(&doc, BuiltinFont::Helvetica)?;
        let bold = add_font(&doc, BuiltinFont::HelveticaBold)?;
        let italic = add_font(&doc, BuiltinFont::HelveticaOblique)?;

        let mut writer = PageWriter::new(&doc, doc.get_page(page).get_layer(layer));

        // Title: centered, bold, wrapped when long
        for line in wrap_text(&title, max_chars_per_line(TITLE_SIZE_PT)) {
            writer.write_centered(&line, TITLE_SIZE_PT, &bold, TITLE_LEADING_MM);
        }
        writer.gap(BLOCK_GAP_MM);

        // Metadata block, muted
        writer.set_color(Color::Rgb(Rgb::new(0.39, 0.39, 0.39, None)));
        writer.write_line(
            &format!("Source: {source_url}"),
            META_SIZE_PT,
            &italic,
            META_LEADING_MM,
        );
        writer.write_line(
            &format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
            META_SIZE_PT,
            &italic,
            META_LEADING_MM,
        );
        if let Some(query) = selected.query_used.as_deref().filter(|q| !q.is_empty()) {
            writer.gap(BLOCK_GAP_MM);
            writer.write_line(
                &format!("Research Query: {query}"),
                META_SIZE_PT,
                &italic,
                META_LEADING_MM,
            );
        }
        writer.gap(BLOCK_GAP_MM);

        // Body
        writer.set_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        for line in wrap_text(&body, max_chars_per_line(BODY_SIZE_PT)) {
            writer.write_line(&line, BODY_SIZE_PT, &regular, BODY_LEADING_MM);
        }

        let path = self.storage_dir.join(filename);
        let file = File::create(&path)?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        info!("PDF saved: {}", path.display());

        Ok(path)
    }
}

fn mm(value: f64) -> Mm {
    Mm(value as _)
}

fn add_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, RenderError> {
    doc.add_builtin_font(font)
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

/// Cursor over the current page; adds pages as writes pass the bottom margin.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f64,
    color: Color,
}

impl<'a> PageWriter<'a> {
    fn new(doc: &'a PdfDocumentReference, layer: PdfLayerReference) -> Self {
        let color = Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None));
        layer.set_fill_color(color.clone());
        Self {
            doc,
            layer,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
            color,
        }
    }

    fn set_color(&mut self, color: Color) {
        self.color = color.clone();
        self.layer.set_fill_color(color);
    }

    fn write_line(&mut self, text: &str, size: f64, font: &IndirectFontRef, leading: f64) {
        self.ensure_room(leading);
        self.layer.use_text(text, size as _, mm(MARGIN_MM), mm(self.y), font);
        self.y -= leading;
    }

    fn write_centered(&mut self, text: &str, size: f64, font: &IndirectFontRef, leading: f64) {
        self.ensure_room(leading);
        let width = text.chars().count() as f64 * size * AVG_CHAR_WIDTH_EM * PT_TO_MM;
        let x = ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_MM);
        self.layer.use_text(text, size as _, mm(x), mm(self.y), font);
        self.y -= leading;
    }

    fn gap(&mut self, amount: f64) {
        self.y -= amount;
    }

    fn ensure_room(&mut self, leading: f64) {
        if self.y - leading < MARGIN_MM {
            let (page, layer) =
                self.doc
                    .add_page(mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            // Fill color is per-page graphics state; carry it over
            self.layer.set_fill_color(self.color.clone());
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }
}

/// How many average-width characters fit between the margins at `size`.
fn max_chars_per_line(size: f64) -> usize {
    let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let char_width = size * AVG_CHAR_WIDTH_EM * PT_TO_MM;
    (usable / char_width).floor() as usize
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Greedy word wrap; words longer than the line are hard-split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
            continue;
        }

        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len <= max_chars {
            current.push_str(word);
            current_len = word_len;
        } else {
            // Hard-split an oversized word into full lines
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(max_chars) {
                let piece: String = chunk.iter().collect();
                if chunk.len() == max_chars {
                    lines.push(piece);
                } else {
                    current_len = chunk.len();
                    current = piece;
                }
            }
        }
    }

    if current_len > 0 {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Candidate;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 8, 5, 14, 30, 9).unwrap()
    }

    fn selected(content: &str) -> SelectedCandidate {
        SelectedCandidate {
            candidate: Candidate {
                title: "My Title".to_string(),
                content: content.to_string(),
            },
            query_used: Some("machine learning".to_string()),
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("A   B\n\nC"), "A B C");
        assert_eq!(collapse_whitespace("  leading and trailing  "), "leading and trailing");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_wrap_text_basic() {
        let lines = wrap_text("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_wrap_text_exact_fit() {
        let lines = wrap_text("ab cd", 5);
        assert_eq!(lines, vec!["ab cd"]);
    }

    #[test]
    fn test_wrap_text_hard_splits_long_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_text_empty() {
        assert!(wrap_text("", 10).is_empty());
    }

    #[test]
    fn test_render_writes_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(tmp.path().join("pdfs"));

        let path = renderer
            .render(
                &selected("Body text for the document. ".repeat(20).as_str()),
                "https://example.com/essays",
                "NotebookLM_My_Title_machine_learning_20250805_143009.pdf",
                fixed_time(),
            )
            .unwrap();

        assert!(path.exists());
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_render_creates_storage_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        let renderer = PdfRenderer::new(&nested);

        renderer
            .render(
                &selected(&"content ".repeat(40)),
                "https://example.com",
                "out.pdf",
                fixed_time(),
            )
            .unwrap();

        assert!(nested.join("out.pdf").exists());
    }

    #[test]
    fn test_render_long_content_paginates() {
        let tmp = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(tmp.path());

        let short = renderer
            .render(
                &selected(&"short body ".repeat(10)),
                "https://example.com",
                "short.pdf",
                fixed_time(),
            )
            .unwrap();
        let long = renderer
            .render(
                &selected(&"a much longer body of text that flows across pages ".repeat(400)),
                "https://example.com",
                "long.pdf",
                fixed_time(),
            )
            .unwrap();

        let short_len = std::fs::metadata(&short).unwrap().len();
        let long_len = std::fs::metadata(&long).unwrap().len();
        assert!(long_len > short_len + 2000);
    }

    #[test]
    fn test_render_without_query_omits_query_line() {
        let tmp = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(tmp.path());

        let mut sel = selected(&"content ".repeat(40));
        sel.query_used = None;

        let path = renderer
            .render(&sel, "https://example.com", "noquery.pdf", fixed_time())
            .unwrap();
        assert!(path.exists());
    }
}
