//! File tree container, insertion and traversal.

use std::collections::btree_map::Entry as MapEntry;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::node::{FileNode, NodeKind, Timestamp};

/// Name of the synthetic root node. The root is never shown as an entry.
pub const ROOT_NAME: &str = "Root";

/// Split a `/`-separated path into its non-empty segments.
///
/// `"a//b/"` and `"a/b"` both yield `["a", "b"]`.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Rejoin the non-empty segments of `path` with single slashes.
pub fn normalize_path(path: &str) -> String {
    split_path(path).join("/")
}

/// One entry of an archive or package listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Relative `/`-separated path inside the archive.
    pub path: String,
    /// Entry type.
    pub kind: NodeKind,
    /// Size in bytes (ignored for directories).
    pub size: u64,
    /// Modification time, if the listing provides one.
    pub date_modified: Option<Timestamp>,
}

impl Entry {
    /// Create a file entry.
    pub fn file(path: impl Into<String>, size: u64, date_modified: Option<Timestamp>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::File,
            size,
            date_modified,
        }
    }

    /// Create a directory entry.
    pub fn directory(path: impl Into<String>, date_modified: Option<Timestamp>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::Directory,
            size: 0,
            date_modified,
        }
    }
}

/// Summary statistics for a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Number of file nodes.
    pub total_files: u64,
    /// Number of directory nodes, implicit ones included.
    pub total_dirs: u64,
    /// Sum of all file sizes in bytes.
    pub total_size: u64,
    /// Deepest level reached (top-level entries are depth 0).
    pub max_depth: usize,
}

/// Directory tree assembled from an unordered stream of listing entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTree {
    root: FileNode,
}

impl FileTree {
    /// Create an empty tree holding only the synthetic root.
    pub fn new() -> Self {
        Self {
            root: FileNode::new_directory(ROOT_NAME, None),
        }
    }

    /// Synthetic root node. Its children are the top-level entries.
    pub fn root(&self) -> &FileNode {
        &self.root
    }

    /// Top-level nodes, ordered for display.
    pub fn root_nodes(&self) -> Vec<&FileNode> {
        self.root.children_sorted()
    }

    /// Take ownership of the top-level nodes.
    pub fn into_root_nodes(self) -> Vec<FileNode> {
        self.root.children.into_values().collect()
    }

    /// Check if nothing has been inserted yet.
    pub fn is_empty(&self) -> bool {
        !self.root.has_children()
    }

    /// Number of visible nodes (the root is not counted).
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    /// Look up a node by path. Empty segments are ignored as in [`insert`].
    ///
    /// An empty path resolves to the root.
    ///
    /// [`insert`]: FileTree::insert
    pub fn get(&self, path: &str) -> Option<&FileNode> {
        split_path(path)
            .into_iter()
            .try_fold(&self.root, |node, segment| node.child(segment))
    }

    /// Insert one entry.
    ///
    /// Missing parent directories are created as implicit placeholders
    /// without a date. When the path already exists (because a deeper entry
    /// created it), only its date is taken from the new entry.
    ///
    /// Placeholders created for a valid prefix stay in the tree even when a
    /// later segment of the same path fails.
    pub fn insert(
        &mut self,
        path: &str,
        is_dir: bool,
        size: u64,
        date_modified: Option<Timestamp>,
    ) -> Result<(), TreeError> {
        let kind = NodeKind::from_is_dir(is_dir);
        let segments = split_path(path);
        let Some((last, parents)) = segments.split_last() else {
            return Err(TreeError::EmptyPath);
        };

        let mut node = &mut self.root;
        for (index, segment) in parents.iter().enumerate() {
            let child = node
                .children
                .entry(CompactString::from(*segment))
                .or_insert_with(|| FileNode::new_directory(*segment, None));
            if !child.is_dir() {
                return Err(TreeError::not_a_directory(path, index, segment));
            }
            node = child;
        }

        match node.children.entry(CompactString::from(*last)) {
            MapEntry::Vacant(slot) => {
                slot.insert(FileNode::new(*last, kind, size, date_modified));
            }
            MapEntry::Occupied(slot) => {
                let existing = slot.into_mut();
                if existing.kind != kind {
                    return Err(TreeError::KindConflict {
                        path: path.to_string(),
                        existing: existing.kind,
                    });
                }
                // A dateless duplicate never erases a known date.
                if date_modified.is_some() {
                    existing.date_modified = date_modified;
                }
            }
        }

        Ok(())
    }

    /// Insert a listing entry. See [`insert`](FileTree::insert).
    pub fn insert_entry(&mut self, entry: &Entry) -> Result<(), TreeError> {
        self.insert(
            &entry.path,
            entry.kind.is_dir(),
            entry.size,
            entry.date_modified,
        )
    }

    /// Depth-first, pre-order walk over every visible node in display order.
    pub fn walk(&self) -> Walk<'_> {
        let mut stack = Vec::new();
        push_children(&mut stack, &self.root, "", 0);
        Walk { stack }
    }

    /// Count files and directories and sum file sizes.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        for item in self.walk() {
            if item.node.is_dir() {
                stats.total_dirs += 1;
            } else {
                stats.total_files += 1;
                stats.total_size += item.node.size;
            }
            stats.max_depth = stats.max_depth.max(item.depth);
        }
        stats
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Node visited by [`Walk`].
#[derive(Debug, Clone)]
pub struct WalkItem<'a> {
    /// Nesting level, 0 for top-level nodes.
    pub depth: usize,
    /// Normalized path from the root.
    pub path: String,
    /// The node itself.
    pub node: &'a FileNode,
}

/// Iterator returned by [`FileTree::walk`].
pub struct Walk<'a> {
    stack: Vec<WalkItem<'a>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = WalkItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.stack.pop()?;
        push_children(&mut self.stack, item.node, &item.path, item.depth + 1);
        Some(item)
    }
}

fn push_children<'a>(
    stack: &mut Vec<WalkItem<'a>>,
    node: &'a FileNode,
    prefix: &str,
    depth: usize,
) {
    // Reversed so the first child in display order is popped first.
    for child in node.children_sorted().into_iter().rev() {
        let path = if prefix.is_empty() {
            child.name.to_string()
        } else {
            format!("{prefix}/{}", child.name)
        };
        stack.push(WalkItem {
            depth,
            path,
            node: child,
        });
    }
}
