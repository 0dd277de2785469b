//! Error types for tree construction.

use thiserror::Error;

use crate::node::NodeKind;

/// Errors that can occur when inserting an entry into a [`FileTree`].
///
/// Every variant is local to the failed call: the tree stays usable and
/// callers are expected to log the error and move on to the next entry.
///
/// [`FileTree`]: crate::FileTree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A segment that has to be descended into is a file.
    #[error("Cannot create file tree node with path \"{path}\": \"{segment}\" is not a directory")]
    NotADirectory {
        /// Full path of the rejected entry.
        path: String,
        /// Zero-based index of the offending segment.
        segment_index: usize,
        /// Name of the offending segment.
        segment: String,
    },

    /// The entry's kind disagrees with the node already at its path.
    #[error("Cannot create file tree node with path \"{path}\": it already exists as a {existing}")]
    KindConflict {
        /// Full path of the rejected entry.
        path: String,
        /// Kind of the node that is already in the tree.
        existing: NodeKind,
    },

    /// The path has no non-empty segments.
    #[error("Cannot create file tree node from an empty path")]
    EmptyPath,
}

impl TreeError {
    /// Create a not-a-directory error for segment `segment_index` of `path`.
    pub fn not_a_directory(path: &str, segment_index: usize, segment: &str) -> Self {
        Self::NotADirectory {
            path: path.to_string(),
            segment_index,
            segment: segment.to_string(),
        }
    }

    /// Full path of the rejected entry, if there was one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::NotADirectory { path, .. } | Self::KindConflict { path, .. } => Some(path),
            Self::EmptyPath => None,
        }
    }
}
