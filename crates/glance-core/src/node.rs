//! File and directory node types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Modification time as printed by listing tools (wall-clock, no zone).
pub type Timestamp = NaiveDateTime;

/// Type of tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Regular file (or anything else that cannot hold children).
    File,
    /// Directory.
    Directory,
}

impl NodeKind {
    /// Map the `is_dir` flag reported by a listing to a kind.
    pub fn from_is_dir(is_dir: bool) -> Self {
        if is_dir {
            NodeKind::Directory
        } else {
            NodeKind::File
        }
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => f.write_str("file"),
            NodeKind::Directory => f.write_str("directory"),
        }
    }
}

/// A single file or directory in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Final path segment (never contains `/`).
    pub name: CompactString,

    /// Node type.
    pub kind: NodeKind,

    /// Size in bytes as reported by the listing. Always 0 for directories.
    pub size: u64,

    /// Modification time, `None` while a directory is only known implicitly.
    pub date_modified: Option<Timestamp>,

    /// Children keyed by name.
    pub children: BTreeMap<CompactString, FileNode>,
}

impl FileNode {
    /// Create a node of the given kind.
    pub fn new(
        name: impl Into<CompactString>,
        kind: NodeKind,
        size: u64,
        date_modified: Option<Timestamp>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            size: if kind.is_dir() { 0 } else { size },
            date_modified,
            children: BTreeMap::new(),
        }
    }

    /// Create a new file node.
    pub fn new_file(
        name: impl Into<CompactString>,
        size: u64,
        date_modified: Option<Timestamp>,
    ) -> Self {
        Self::new(name, NodeKind::File, size, date_modified)
    }

    /// Create a new directory node.
    pub fn new_directory(name: impl Into<CompactString>, date_modified: Option<Timestamp>) -> Self {
        Self::new(name, NodeKind::Directory, 0, date_modified)
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        !self.kind.is_dir()
    }

    /// A directory whose own entry has not been seen, only entries below it.
    pub fn is_implicit(&self) -> bool {
        self.is_dir() && self.date_modified.is_none()
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&FileNode> {
        self.children.get(name)
    }

    /// Iterate over direct children in name order.
    pub fn children(&self) -> impl Iterator<Item = &FileNode> {
        self.children.values()
    }

    /// Direct children ordered for display: directories first, then by name.
    pub fn children_sorted(&self) -> Vec<&FileNode> {
        let mut children: Vec<&FileNode> = self.children.values().collect();
        children.sort_by(|a, b| b.is_dir().cmp(&a.is_dir()).then_with(|| a.name.cmp(&b.name)));
        children
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Check if the node has any children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
