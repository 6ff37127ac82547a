//! Content fetching and extraction
//!
//! Turns a URL into a list of candidate text blocks for the relevance
//! ranker.
//!
//! ## Architecture
//!
//! ```text
//! URL → ContentFetcher → HTML → extract_candidates → Vec<Candidate>
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let config = ContentFetchConfig::from_env();
//! let fetcher = ContentFetcher::new(config);
//!
//! let candidates = fetcher.fetch_candidates("https://example.com/essays").await?;
//! ```

pub mod config;
pub mod extractor;
pub mod fetcher;

pub use config::ContentFetchConfig;
pub use extractor::{extract_candidates, Candidate};
pub use fetcher::{ContentFetcher, FetchError};
