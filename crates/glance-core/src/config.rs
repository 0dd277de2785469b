//! Listing configuration types.

use chrono::{Datelike, Local};
use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::node::Timestamp;
use crate::tree::normalize_path;

/// Configuration shared by the listing parsers.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ListingConfig {
    /// Glob patterns of entry paths to leave out of the tree.
    #[builder(default = "default_exclude_patterns()")]
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Year assumed for dates printed without one (`tar` shows
    /// `"Mar 28 15:36"` for recent files).
    #[builder(default = "default_reference_year()")]
    #[serde(default = "default_reference_year")]
    pub reference_year: i32,

    /// Directory inserted before any `tar` entry, named after the archive.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub archive_root: Option<String>,

    /// Modification time of the archive itself, used for `archive_root`.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub archive_root_modified: Option<Timestamp>,
}

fn default_exclude_patterns() -> Vec<String> {
    // Resource forks added to ZIP files by the macOS archiver
    vec!["__MACOSX".to_string(), "__MACOSX/**".to_string()]
}

fn default_reference_year() -> i32 {
    Local::now().year()
}

impl ListingConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref patterns) = self.exclude_patterns {
            for pattern in patterns {
                Glob::new(pattern).map_err(|e| format!("Invalid exclude pattern: {e}"))?;
            }
        }
        if let Some(Some(ref root)) = self.archive_root {
            if root.is_empty() {
                return Err("Archive root cannot be empty".to_string());
            }
            if root.contains('/') {
                return Err(format!("Archive root cannot contain '/': {root}"));
            }
        }
        Ok(())
    }
}

impl ListingConfig {
    /// Create a new listing config builder.
    pub fn builder() -> ListingConfigBuilder {
        ListingConfigBuilder::default()
    }

    /// Compile the exclusion patterns.
    pub fn exclusions(&self) -> Result<Exclusions, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Exclusions {
            set: builder.build()?,
        })
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: default_exclude_patterns(),
            reference_year: default_reference_year(),
            archive_root: None,
            archive_root_modified: None,
        }
    }
}

/// Compiled form of [`ListingConfig::exclude_patterns`].
#[derive(Debug, Clone)]
pub struct Exclusions {
    set: GlobSet,
}

impl Exclusions {
    /// Check if an entry path should be left out. The path is normalized
    /// first, so `"__MACOSX/"` matches `"__MACOSX"`.
    pub fn is_excluded(&self, path: &str) -> bool {
        !self.set.is_empty() && self.set.is_match(normalize_path(path))
    }
}
