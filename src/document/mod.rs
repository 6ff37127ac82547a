//! Document generation
//!
//! Renders the selected candidate to a PDF in a flat storage directory.
//! The directory listing is the only inventory; there is no index or
//! database record for generated files.

pub mod filename;
pub mod renderer;

pub use filename::generate_filename;
pub use renderer::{PdfRenderer, RenderError};

use crate::content::Candidate;

/// A candidate joined with the query that selected it. Exists only between
/// ranking and rendering.
#[derive(Debug, Clone)]
pub struct SelectedCandidate {
    pub candidate: Candidate,
    pub query_used: Option<String>,
}
