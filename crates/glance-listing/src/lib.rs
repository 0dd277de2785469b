//! Parsers for archive and package listings.
//!
//! Each parser takes the captured text output of one listing tool and feeds
//! every recognized entry line into a [`FileTree`]. Entries that conflict
//! with the tree built so far are logged and reported in
//! [`Listing::skipped`]; they never abort the listing.
//!
//! | Format | Tool output |
//! |---|---|
//! | [`TarParser`] | `tar --list --verbose` (+ `gzip --list`) |
//! | [`ZipInfoParser`] | `zipinfo` |
//! | [`BomParser`] | `lsbom -p fMst` (+ `pkgutil --check-signature`) |
//!
//! # Example
//!
//! ```rust
//! use glance_listing::{ListingConfig, ListingParser, ZipInfoParser};
//!
//! let output = "\
//! Archive:  my-zip.zip
//! Zip file size: 520 bytes, number of entries: 2
//! drwxr-xr-x  3.0 unx        0 bx stor 20-Jan-13 19:38 my-zip/
//! -rw-r--r--  3.0 unx       13 tx stor 20-Jan-13 19:38 my-zip/file.txt
//! 2 files, 13 bytes uncompressed, 13 bytes compressed:  0.0%
//! ";
//!
//! let parser = ZipInfoParser::new(&ListingConfig::default()).unwrap();
//! let listing = parser.parse(output).unwrap();
//!
//! assert_eq!(listing.tree.get("my-zip/file.txt").unwrap().size, 13);
//! assert_eq!(listing.summary.uncompressed_size, Some(13));
//! ```

mod error;
mod listing;
mod pkg;
mod tar;
mod zip;

pub use error::{ListingError, SkippedEntry};
pub use listing::{ArchiveSummary, Listing, ListingFormat, ListingParser};
pub use pkg::{BomParser, UNKNOWN_SIGNATURE, parse_signature};
pub use tar::{TarParser, archive_stem, is_gzipped, parse_gzip_list, parse_tar_date};
pub use zip::{ZipInfoParser, parse_zipinfo_date};

// Re-export core types for convenience
pub use glance_core::{
    Entry, FileNode, FileTree, ListingConfig, ListingConfigBuilder, NodeKind, Timestamp, TreeError,
    TreeStats,
};

/// Create the parser for `format`.
pub fn parser_for(
    format: ListingFormat,
    config: ListingConfig,
) -> Result<Box<dyn ListingParser>, ListingError> {
    Ok(match format {
        ListingFormat::Tar => Box::new(TarParser::new(config)?),
        ListingFormat::Zip => Box::new(ZipInfoParser::new(&config)?),
        ListingFormat::Package => Box::new(BomParser::new(&config)?),
    })
}
