//! Text rendering of listings.

use glance_listing::{ArchiveSummary, FileNode, Listing, Timestamp};

/// Placeholder for values the listing did not provide.
pub const MISSING: &str = "--";

const NAME_WIDTH: usize = 48;

/// Format size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Size column: directories carry no size of their own.
pub fn display_size(node: &FileNode) -> String {
    if node.is_dir() && node.size == 0 {
        MISSING.to_string()
    } else {
        format_size(node.size)
    }
}

/// Date column, `--` for implicit directories.
pub fn display_date(date: Option<Timestamp>) -> String {
    date.map_or_else(|| MISSING.to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string())
}

/// Summary label shown above the tree. Uncompressed archives only show
/// their size.
pub fn summary_label(summary: &ArchiveSummary) -> String {
    let size = |bytes: Option<u64>| bytes.map_or_else(|| MISSING.to_string(), format_size);
    let mut label = match summary.archive_size {
        Some(archive_size) => format!("Size: {}", format_size(archive_size)),
        None => format!(
            "Compressed: {}\nUncompressed: {}\nCompression ratio: {}",
            size(summary.compressed_size),
            size(summary.uncompressed_size),
            summary
                .compression_ratio
                .map_or_else(|| MISSING.to_string(), |ratio| format!("{ratio:.1} %")),
        ),
    };
    if let Some(ref signature) = summary.signature {
        label.push('\n');
        label.push_str(signature);
    }
    label
}

/// Render the tree as an outline, down to `max_depth` levels below the top.
pub fn render_outline(listing: &Listing, max_depth: Option<usize>) -> String {
    let mut out = String::new();
    for item in listing.tree.walk() {
        if max_depth.is_some_and(|max| item.depth > max) {
            continue;
        }
        let indent = "  ".repeat(item.depth);
        let marker = if item.node.is_dir() { "▼ " } else { "  " };
        let suffix = if item.node.is_dir() { "/" } else { "" };
        let name = truncate(
            &format!("{indent}{marker}{}{suffix}", item.node.name),
            NAME_WIDTH,
        );
        out.push_str(&format!(
            "{name:<NAME_WIDTH$} {:>10}  {}\n",
            display_size(item.node),
            display_date(item.node.date_modified),
        ));
    }
    out
}

/// Truncate a string to `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}
