//! Parser for `zipinfo` output.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::warn;

use glance_core::{Entry, Exclusions, ListingConfig, NodeKind, Timestamp};

use crate::error::ListingError;
use crate::listing::{ArchiveSummary, EntryCollector, Listing, ListingFormat, ListingParser};

/// `drwxr-xr-x  2.0 unx        0 bx stor 20-Jan-13 19:38 my-zip/dir/`
///
/// Columns: permissions, version, host OS, size, text/binary flags,
/// method, date, time, path.
static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\S{10})\s+\S+\s+\S+\s+(\d+)\s+\S+\s+\S+\s+(\d{2}-\w{3}-\d{2}\s+\d{2}:\d{2})\s(.+)$",
    )
    .expect("static regex")
});

/// `Zip file size: 65536 bytes, number of entries: 152`
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Zip file size: (\d+) bytes?").expect("static regex")
});

/// `152 files, 192919 bytes uncompressed, 65061 bytes compressed:  66.3%`
static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) files?, (\d+) bytes? uncompressed, (\d+) bytes? compressed: +(-?[\d.]+)%")
        .expect("static regex")
});

const EMPTY_ZIPFILE: &str = "Empty zipfile.";

/// Parser for `zipinfo` listings.
#[derive(Debug, Clone)]
pub struct ZipInfoParser {
    exclusions: Exclusions,
}

impl ZipInfoParser {
    /// Create a parser with the given configuration.
    pub fn new(config: &ListingConfig) -> Result<Self, ListingError> {
        Ok(Self {
            exclusions: crate::listing::compile_exclusions(config)?,
        })
    }
}

impl ListingParser for ZipInfoParser {
    fn format(&self) -> ListingFormat {
        ListingFormat::Zip
    }

    fn parse(&self, output: &str) -> Result<Listing, ListingError> {
        let lines: Vec<&str> = output.lines().filter(|line| !line.trim().is_empty()).collect();
        let mut collector = EntryCollector::new(&self.exclusions);

        // Two header lines, the entries, then one summary line
        let Some((&last, rest)) = lines.split_last() else {
            return Ok(collector.finish(ListingFormat::Zip, ArchiveSummary::default()));
        };

        let archive_size = lines
            .iter()
            .take(2)
            .find_map(|line| HEADER_RE.captures(line))
            .and_then(|captures| captures[1].parse().ok());

        for &line in rest.iter().skip(2) {
            match parse_entry_line(line) {
                Some(entry) => {
                    collector.add(line, entry);
                }
                None => collector.skip(line, "Unrecognized entry line"),
            }
        }

        let summary = if last.trim() == EMPTY_ZIPFILE {
            ArchiveSummary {
                compressed_size: archive_size,
                uncompressed_size: Some(0),
                compression_ratio: Some(0.0),
                ..Default::default()
            }
        } else {
            let captures = SUMMARY_RE
                .captures(last)
                .ok_or_else(|| ListingError::MalformedSummary {
                    line: last.to_string(),
                })?;
            ArchiveSummary {
                compressed_size: archive_size.or_else(|| captures[3].parse().ok()),
                uncompressed_size: captures[2].parse().ok(),
                compression_ratio: captures[4].parse().ok(),
                ..Default::default()
            }
        };

        Ok(collector.finish(ListingFormat::Zip, summary))
    }
}

fn parse_entry_line(line: &str) -> Option<Entry> {
    let captures = ENTRY_RE.captures(line)?;
    let path = &captures[4];

    let date = &captures[3];
    let date_modified = parse_zipinfo_date(date);
    if date_modified.is_none() {
        warn!(target: "glance::listing", path, "Unrecognized date {date:?}");
    }

    Some(Entry {
        path: path.to_string(),
        kind: NodeKind::from_is_dir(captures[1].starts_with('d')),
        size: captures[2].parse().unwrap_or(0),
        date_modified,
    })
}

/// Parse a `zipinfo` date such as `"20-Jan-13 19:38"` (`yy-Mmm-dd HH:MM`).
pub fn parse_zipinfo_date(date: &str) -> Option<Timestamp> {
    let date = date.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&date, "%y-%b-%d %H:%M").ok()
}
