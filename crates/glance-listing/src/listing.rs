//! Parsed listing container and the parser trait.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use glance_core::{Entry, Exclusions, FileTree, ListingConfig};

use crate::error::{ListingError, SkippedEntry};

/// Listing tool whose output is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingFormat {
    /// `tar --list --verbose`, optionally gzipped.
    Tar,
    /// `zipinfo`.
    Zip,
    /// `lsbom -p fMst` on the bill of materials of an installer package.
    Package,
}

impl ListingFormat {
    /// Guess the format from an archive's file name.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_lowercase();
        let extension = name.rsplit_once('.')?.1;
        match extension {
            "tar" | "tgz" => Some(Self::Tar),
            "gz" if name.ends_with(".tar.gz") => Some(Self::Tar),
            "zip" | "jar" | "war" | "ear" => Some(Self::Zip),
            "pkg" => Some(Self::Package),
            _ => None,
        }
    }

    /// Tool that produces this listing.
    pub fn tool(&self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::Zip => "zipinfo",
            Self::Package => "lsbom",
        }
    }
}

/// Size information shown next to the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSummary {
    /// Size on disk of an archive that is not compressed (plain tarballs).
    pub archive_size: Option<u64>,
    /// Size of the archive on disk.
    pub compressed_size: Option<u64>,
    /// Size of all entries once extracted.
    pub uncompressed_size: Option<u64>,
    /// Compression ratio in percent. Space saved for tarballs and zip files,
    /// archive size relative to the payload for packages.
    pub compression_ratio: Option<f64>,
    /// Signature status (packages only).
    pub signature: Option<String>,
}

impl ArchiveSummary {
    /// Account for the size of the archive file the listing came from.
    ///
    /// `gzipped` only matters for tarballs: a plain tarball is not
    /// compressed, so it gets a size and no ratio.
    pub fn with_archive_size(mut self, format: ListingFormat, size: u64, gzipped: bool) -> Self {
        match format {
            ListingFormat::Tar if !gzipped => {
                self.archive_size = Some(size);
                self.compressed_size = None;
                self.compression_ratio = None;
            }
            ListingFormat::Tar | ListingFormat::Zip => {
                let compressed = *self.compressed_size.get_or_insert(size);
                if self.compression_ratio.is_none() {
                    self.compression_ratio =
                        percent_of(compressed, self.uncompressed_size).map(|kept| 100.0 - kept);
                }
            }
            ListingFormat::Package => {
                self.compressed_size = Some(size);
                self.compression_ratio = percent_of(size, self.uncompressed_size);
            }
        }
        self
    }
}

fn percent_of(part: u64, whole: Option<u64>) -> Option<f64> {
    whole
        .filter(|&whole| whole > 0)
        .map(|whole| part as f64 / whole as f64 * 100.0)
}

/// Result of parsing one listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Format that was parsed.
    pub format: ListingFormat,
    /// Assembled tree.
    pub tree: FileTree,
    /// Sizes and signature.
    pub summary: ArchiveSummary,
    /// Entry lines that could not be added to the tree.
    pub skipped: Vec<SkippedEntry>,
}

/// Parser for the captured output of one listing tool.
pub trait ListingParser {
    /// Format handled by this parser.
    fn format(&self) -> ListingFormat;

    /// Parse captured tool output.
    fn parse(&self, output: &str) -> Result<Listing, ListingError>;

    /// Read captured tool output from a file and parse it.
    fn parse_file(&self, path: &Path) -> Result<Listing, ListingError> {
        let output = std::fs::read_to_string(path).map_err(|e| ListingError::io(path, e))?;
        self.parse(&output)
    }
}

/// Feeds entries into a tree, applying exclusions and recording failures.
pub(crate) struct EntryCollector<'a> {
    exclusions: &'a Exclusions,
    tree: FileTree,
    skipped: Vec<SkippedEntry>,
    inserted_size: u64,
}

impl<'a> EntryCollector<'a> {
    pub(crate) fn new(exclusions: &'a Exclusions) -> Self {
        Self {
            exclusions,
            tree: FileTree::new(),
            skipped: Vec::new(),
            inserted_size: 0,
        }
    }

    /// Insert an entry that is not backed by a listing line.
    pub(crate) fn seed(&mut self, entry: &Entry) {
        if let Err(err) = self.tree.insert_entry(entry) {
            warn!(target: "glance::listing", "{err}");
        }
    }

    /// Insert the entry parsed from `line`. Returns whether it was added.
    pub(crate) fn add(&mut self, line: &str, entry: Entry) -> bool {
        if self.exclusions.is_excluded(&entry.path) {
            debug!(target: "glance::listing", path = %entry.path, "excluded");
            return false;
        }
        match self.tree.insert_entry(&entry) {
            Ok(()) => {
                self.inserted_size += entry.size;
                true
            }
            Err(err) => {
                warn!(target: "glance::listing", "{err}");
                self.skipped.push(SkippedEntry::new(line, err.to_string()));
                false
            }
        }
    }

    /// Record a line that looked like an entry but could not be read.
    pub(crate) fn skip(&mut self, line: &str, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(target: "glance::listing", line, "{reason}");
        self.skipped.push(SkippedEntry::new(line, reason));
    }

    /// Sum of the sizes of all inserted entries.
    pub(crate) fn inserted_size(&self) -> u64 {
        self.inserted_size
    }

    pub(crate) fn finish(self, format: ListingFormat, summary: ArchiveSummary) -> Listing {
        debug!(
            target: "glance::listing",
            format = format.tool(),
            nodes = self.tree.len(),
            skipped = self.skipped.len(),
            "listing parsed"
        );
        Listing {
            format,
            tree: self.tree,
            summary,
            skipped: self.skipped,
        }
    }
}

/// Compile a config's exclusions, mapping failures to a listing error.
pub(crate) fn compile_exclusions(config: &ListingConfig) -> Result<Exclusions, ListingError> {
    Ok(config.exclusions()?)
}
