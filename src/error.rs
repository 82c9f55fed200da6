//! Error types for table generation

use std::path::PathBuf;

use thiserror::Error;

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Fatal generation errors.
///
/// Per-record problems (unresolvable regions, malformed codes) are never
/// reported through this type; they end up in [`crate::Diagnostics`].
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Catalogue not found: {}", path.display())]
    MissingCatalogue { path: PathBuf },

    #[error("Invalid catalogue format: {0}")]
    CatalogueFormat(String),

    #[error("Cannot read allow-list {}: {source}", path.display())]
    AllowList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid namespace '{0}': every segment must be an identifier")]
    InvalidNamespace(String),

    #[error("Ambiguous name in {family}: '{symbol}' is claimed by both '{first}' and '{second}'")]
    AmbiguousName {
        family: String,
        symbol: String,
        first: String,
        second: String,
    },

    #[error("Duplicate identifier in {family}: {id} is claimed by both '{first}' and '{second}'")]
    DuplicateIdentifier {
        family: String,
        id: i32,
        first: String,
        second: String,
    },

    #[error("Inconsistent tables: {0}")]
    Inconsistent(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
