// Version information for the Fabstir Curation Node

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-local-storage-2025-08-05";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Build date
pub const BUILD_DATE: &str = "2025-08-05";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "article-extraction",
    "semantic-ranking",
    "pdf-generation",
    "local-storage",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir Curation Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
