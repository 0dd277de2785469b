//! Core types for glance.
//!
//! This crate turns the flat, unordered entry lists printed by archive and
//! package listing tools (`tar`, `zipinfo`, `lsbom`) into a directory tree.
//!
//! Entries may arrive in any order. Parents that are listed after their
//! children, or never listed at all, are created as implicit directories and
//! get their date once their own entry shows up:
//!
//! ```rust
//! use glance_core::FileTree;
//!
//! let mut tree = FileTree::new();
//! tree.insert("docs/readme.md", false, 642, None).unwrap();
//! tree.insert("docs", true, 0, None).unwrap();
//!
//! let docs = tree.get("docs").unwrap();
//! assert!(docs.is_dir());
//! assert_eq!(docs.child_count(), 1);
//! ```

mod config;
mod error;
mod node;
mod tree;

pub use config::{Exclusions, ListingConfig, ListingConfigBuilder, ListingConfigBuilderError};
pub use error::TreeError;
pub use node::{FileNode, NodeKind, Timestamp};
pub use tree::{Entry, FileTree, ROOT_NAME, TreeStats, Walk, WalkItem, normalize_path, split_path};
