use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, saving or sharing a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file is missing or unreadable
    #[error("Failed to read catalog file '{}': {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    /// The file is not a valid string catalog
    #[error("Failed to parse catalog file '{}': {source}", .path.display())]
    Format { path: PathBuf, source: serde_json::Error },

    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Writing or replacing the catalog file failed; the previous file is untouched
    #[error("Failed to write catalog file '{}': {source}", .path.display())]
    Persist { path: PathBuf, source: std::io::Error },

    #[error("Catalog actor is no longer running")]
    ActorClosed,
}
