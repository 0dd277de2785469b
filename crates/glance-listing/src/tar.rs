//! Parser for `tar --list --verbose` and `gzip --list` output.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::warn;

use glance_core::{Entry, Exclusions, ListingConfig, NodeKind, Timestamp};

use crate::error::ListingError;
use crate::listing::{ArchiveSummary, EntryCollector, Listing, ListingFormat, ListingParser};

/// bsdtar: `-rw-r--r--  0 user staff     642 Dec 29  2018 my-tar/file.ext`
static BSD_ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([\w-]{10})[@+.]?\s+\d+\s+\S+\s+\S+\s+(\d+)\s+(\w{3}\s+\d{1,2}\s+(?:\d{1,2}:\d{2}|\d{4}))\s(.+)$",
    )
    .expect("static regex")
});

/// GNU tar: `-rw-r--r-- user/staff 642 2018-12-29 10:00 my-tar/file.ext`
static GNU_ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([\w-]{10})[@+.]?\s+\S+/\S+\s+(\d+)\s+(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}(?::\d{2})?)\s(.+)$",
    )
    .expect("static regex")
});

/// `gzip --list` data row: `  65061  192919  66.3% my-tar.tar`
static GZIP_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(\d+)\s+(\d+)\s+(-?[\d.]+)%\s+\S.*$").expect("static regex")
});

/// Parser for verbose `tar` listings.
#[derive(Debug, Clone)]
pub struct TarParser {
    config: ListingConfig,
    exclusions: Exclusions,
    gzip_list: Option<String>,
}

impl TarParser {
    /// Create a parser with the given configuration.
    pub fn new(config: ListingConfig) -> Result<Self, ListingError> {
        let exclusions = crate::listing::compile_exclusions(&config)?;
        Ok(Self {
            config,
            exclusions,
            gzip_list: None,
        })
    }

    /// Attach captured `gzip --list` output for the summary.
    pub fn with_gzip_list(mut self, output: impl Into<String>) -> Self {
        self.gzip_list = Some(output.into());
        self
    }

    /// Parse one entry line, `None` if the line is not an entry.
    fn parse_line(&self, line: &str) -> Option<Entry> {
        let captures = BSD_ENTRY_RE
            .captures(line)
            .or_else(|| GNU_ENTRY_RE.captures(line))?;

        let mode = &captures[1];
        let size = captures[2].parse().unwrap_or(0);
        let path = strip_link_target(mode, size, &captures[4]);

        let date = &captures[3];
        let date_modified = parse_tar_date(date, self.config.reference_year);
        if date_modified.is_none() {
            warn!(target: "glance::listing", path, "Unrecognized date {date:?}");
        }

        Some(Entry {
            path: path.to_string(),
            kind: NodeKind::from_is_dir(mode.starts_with('d')),
            size,
            date_modified,
        })
    }
}

impl ListingParser for TarParser {
    fn format(&self) -> ListingFormat {
        ListingFormat::Tar
    }

    fn parse(&self, output: &str) -> Result<Listing, ListingError> {
        let mut collector = EntryCollector::new(&self.exclusions);

        // The archive's own directory is not part of the listing
        if let Some(ref root) = self.config.archive_root {
            collector.seed(&Entry::directory(root.as_str(), self.config.archive_root_modified));
        }

        for line in output.lines() {
            if let Some(entry) = self.parse_line(line) {
                collector.add(line, entry);
            }
        }

        let summary = match self.gzip_list {
            Some(ref gzip_output) => parse_gzip_list(gzip_output)?,
            None => ArchiveSummary {
                uncompressed_size: Some(collector.inserted_size()),
                ..Default::default()
            },
        };

        Ok(collector.finish(ListingFormat::Tar, summary))
    }
}

/// Symlinks are listed as `name -> target`, hardlinks as `name link to target`.
///
/// Hardlinks carry an `h` mode (GNU tar) or no data (bsdtar), so an empty
/// regular file whose name contains `" link to "` is cut at that point.
fn strip_link_target<'a>(mode: &str, size: u64, path: &'a str) -> &'a str {
    let split = match mode.chars().next() {
        Some('l') => " -> ",
        Some('h') => " link to ",
        Some('-') if size == 0 => " link to ",
        _ => return path,
    };
    path.split_once(split).map_or(path, |(name, _)| name)
}

/// Parse the date column of a verbose `tar` listing.
///
/// bsdtar prints `"Mar 28 15:36"` for recent files (year omitted, taken from
/// `reference_year`) and `"Dec 29  2018"` otherwise. GNU tar prints
/// `"2018-12-29 10:00"`.
pub fn parse_tar_date(date: &str, reference_year: i32) -> Option<Timestamp> {
    let date = date.split_whitespace().collect::<Vec<_>>().join(" ");

    if date.contains('-') {
        return NaiveDateTime::parse_from_str(&date, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(&date, "%Y-%m-%d %H:%M"))
            .ok();
    }
    if date.contains(':') {
        return NaiveDateTime::parse_from_str(&format!("{reference_year} {date}"), "%Y %b %d %H:%M")
            .ok();
    }
    NaiveDate::parse_from_str(&date, "%b %d %Y")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
}

/// Parse `gzip --list` output into compressed/uncompressed sizes and ratio.
pub fn parse_gzip_list(output: &str) -> Result<ArchiveSummary, ListingError> {
    let captures = GZIP_SIZE_RE
        .captures(output)
        .ok_or_else(|| ListingError::MalformedSummary {
            line: output.trim().to_string(),
        })?;

    Ok(ArchiveSummary {
        compressed_size: captures[1].parse().ok(),
        uncompressed_size: captures[2].parse().ok(),
        compression_ratio: captures[3].parse().ok(),
        ..Default::default()
    })
}

/// Name of the directory a tarball usually unpacks into: the file name up
/// to its first dot (`"my-tar.tar.gz"` → `"my-tar"`).
pub fn archive_stem(file_name: &str) -> Option<&str> {
    let stem = file_name.split('.').next()?;
    (!stem.is_empty() && !stem.contains('/')).then_some(stem)
}

/// Whether a tarball's file name marks it as gzipped.
pub fn is_gzipped(file_name: &str) -> bool {
    let name = file_name.to_lowercase();
    name.ends_with(".tar.gz") || name.ends_with(".tgz")
}
