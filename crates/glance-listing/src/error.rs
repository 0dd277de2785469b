//! Error types for listing parsing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that make a whole listing unusable.
///
/// Problems with single entries are not errors; they end up in
/// [`Listing::skipped`](crate::Listing::skipped).
#[derive(Debug, Error)]
pub enum ListingError {
    /// Reading a captured listing failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A summary line the tool always prints did not have the expected shape.
    #[error("Malformed summary line: {line:?}")]
    MalformedSummary { line: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ListingError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<globset::Error> for ListingError {
    fn from(err: globset::Error) -> Self {
        Self::InvalidConfig {
            message: err.to_string(),
        }
    }
}

/// A listing line that was recognized as an entry but not added to the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    /// Raw line from the listing.
    pub line: String,
    /// Human-readable reason.
    pub reason: String,
}

impl SkippedEntry {
    /// Create a new skipped entry record.
    pub fn new(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            reason: reason.into(),
        }
    }
}
