//! Parser for `lsbom -p fMst` and `pkgutil --check-signature` output.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use tracing::warn;

use glance_core::{Entry, Exclusions, ListingConfig, NodeKind, Timestamp};

use crate::error::ListingError;
use crate::listing::{ArchiveSummary, EntryCollector, Listing, ListingFormat, ListingParser};

/// `./hello-world.txt\t-rw-r--r-- \t13\t1587628964`
///
/// Columns: path, symbolic mode, size and Unix mtime (both empty for
/// directories).
static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\t]+)\t+(.{10})[ \t]*(\d*)\t*(\d*)$").expect("static regex")
});

static SIGNATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Status: (.*)$").expect("static regex"));

/// Mode printed for root directories that do not exist in the payload.
const MISSING_MODE: &str = "?---------";

/// Fallback when `pkgutil` output has no usable status line.
pub const UNKNOWN_SIGNATURE: &str = "Could not obtain package signature";

/// Parser for bill-of-materials listings of installer packages.
#[derive(Debug, Clone)]
pub struct BomParser {
    exclusions: Exclusions,
    signature_output: Option<String>,
}

impl BomParser {
    /// Create a parser with the given configuration.
    pub fn new(config: &ListingConfig) -> Result<Self, ListingError> {
        Ok(Self {
            exclusions: crate::listing::compile_exclusions(config)?,
            signature_output: None,
        })
    }

    /// Attach captured `pkgutil --check-signature` output for the summary.
    pub fn with_signature(mut self, output: impl Into<String>) -> Self {
        self.signature_output = Some(output.into());
        self
    }
}

impl ListingParser for BomParser {
    fn format(&self) -> ListingFormat {
        ListingFormat::Package
    }

    fn parse(&self, output: &str) -> Result<Listing, ListingError> {
        let mut collector = EntryCollector::new(&self.exclusions);

        for line in output.lines() {
            let Some(captures) = ENTRY_RE.captures(line) else {
                continue;
            };

            let mode = &captures[2];
            if mode == MISSING_MODE {
                continue;
            }

            // Paths are relative to the payload root "."
            let path = captures[1].trim_start_matches("./");
            if path == "." || path.is_empty() {
                continue;
            }

            let date_modified = match &captures[4] {
                "" => None,
                secs => {
                    let date = parse_unix_time(secs);
                    if date.is_none() {
                        warn!(
                            target: "glance::listing",
                            path,
                            "Invalid modification time {secs:?}"
                        );
                    }
                    date
                }
            };

            collector.add(
                line,
                Entry {
                    path: path.to_string(),
                    kind: NodeKind::from_is_dir(mode.starts_with('d')),
                    size: captures[3].parse().unwrap_or(0),
                    date_modified,
                },
            );
        }

        // The BOM has no totals, so the payload size is the sum of its files
        let summary = ArchiveSummary {
            uncompressed_size: Some(collector.inserted_size()),
            signature: self.signature_output.as_deref().map(parse_signature),
            ..Default::default()
        };

        Ok(collector.finish(ListingFormat::Package, summary))
    }
}

fn parse_unix_time(secs: &str) -> Option<Timestamp> {
    let secs: i64 = secs.parse().ok()?;
    DateTime::from_timestamp(secs, 0).map(|date| date.naive_utc())
}

/// Extract the signature status from `pkgutil --check-signature` output,
/// e.g. `"Status: signed by a certificate trusted by macOS"` becomes
/// `"Signed by a certificate trusted by macOS"`.
pub fn parse_signature(output: &str) -> String {
    let statuses: Vec<&str> = SIGNATURE_RE
        .captures_iter(output)
        .filter_map(|captures| captures.get(1))
        .map(|status| status.as_str().trim())
        .collect();

    match statuses.as_slice() {
        [status] if !status.is_empty() => capitalize_first(status),
        _ => {
            warn!(
                target: "glance::listing",
                matches = statuses.len(),
                "Could not obtain package signature from {output:?}"
            );
            UNKNOWN_SIGNATURE.to_string()
        }
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
