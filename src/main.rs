//! glance - Browse archive and package listings as a file tree.
//!
//! Usage:
//!   tar --list --verbose --file my.tar.gz | glance tar -
//!   zipinfo my.zip > listing.txt && glance zip listing.txt --archive my.zip
//!   lsbom -p fMst Bom > bom.txt && glance pkg bom.txt --signature sig.txt
//!   glance --help

mod render;

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use glance_listing::{
    BomParser, Listing, ListingConfig, ListingConfigBuilder, ListingFormat, ListingParser,
    TarParser, ZipInfoParser, archive_stem, is_gzipped,
};

#[derive(Parser)]
#[command(
    name = "glance",
    version,
    about = "Show archive and package listings as a file tree",
    long_about = "glance reads the captured output of `tar --list --verbose`, `zipinfo` \
                  or `lsbom -p fMst` and prints the archive's contents as a tree, \
                  with missing parent directories filled in."
)]
struct Cli {
    /// Log skipped entries and parser details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse `tar --list --verbose` output
    Tar {
        #[command(flatten)]
        common: CommonArgs,

        /// Captured `gzip --list` output for compression information
        #[arg(long)]
        gzip_list: Option<PathBuf>,
    },

    /// Parse `zipinfo` output
    Zip {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Parse `lsbom -p fMst` output
    Pkg {
        #[command(flatten)]
        common: CommonArgs,

        /// Captured `pkgutil --check-signature` output
        #[arg(long)]
        signature: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Captured listing output ("-" for stdin)
    listing: PathBuf,

    /// The archive the listing was produced from (name, size, date)
    #[arg(short, long)]
    archive: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Maximum depth to display
    #[arg(short, long)]
    depth: Option<usize>,

    /// Glob pattern of entry paths to hide (repeatable, replaces the defaults)
    #[arg(short, long = "exclude")]
    exclude: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Size and modification time of the archive file itself.
struct ArchiveInfo {
    name: Option<String>,
    size: u64,
    modified: Option<DateTime<Local>>,
}

impl ArchiveInfo {
    fn is_gzipped(&self) -> bool {
        self.name.as_deref().is_some_and(is_gzipped)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Tar { common, gzip_list } => {
            let archive = archive_info(common.archive.as_deref(), ListingFormat::Tar)?;
            let mut builder = ListingConfig::builder();
            apply_common(&mut builder, &common);
            if let Some(root) = archive
                .as_ref()
                .and_then(|info| info.name.as_deref())
                .and_then(archive_stem)
            {
                builder.archive_root(root);
            }
            if let Some(modified) = archive.as_ref().and_then(|info| info.modified) {
                builder.archive_root_modified(modified.naive_local());
            }
            let config = builder.build().context("Invalid configuration")?;

            let gzipped =
                gzip_list.is_some() || archive.as_ref().is_some_and(ArchiveInfo::is_gzipped);
            let mut parser = TarParser::new(config)?;
            if let Some(path) = gzip_list {
                parser = parser.with_gzip_list(read_input(&path)?);
            }
            run(&parser, &common, archive, gzipped)?;
        }
        Command::Zip { common } => {
            let archive = archive_info(common.archive.as_deref(), ListingFormat::Zip)?;
            let mut builder = ListingConfig::builder();
            apply_common(&mut builder, &common);
            let config = builder.build().context("Invalid configuration")?;

            run(&ZipInfoParser::new(&config)?, &common, archive, true)?;
        }
        Command::Pkg { common, signature } => {
            let archive = archive_info(common.archive.as_deref(), ListingFormat::Package)?;
            let mut builder = ListingConfig::builder();
            apply_common(&mut builder, &common);
            let config = builder.build().context("Invalid configuration")?;

            let mut parser = BomParser::new(&config)?;
            if let Some(path) = signature {
                parser = parser.with_signature(read_input(&path)?);
            }
            run(&parser, &common, archive, true)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_common(builder: &mut ListingConfigBuilder, common: &CommonArgs) {
    if !common.exclude.is_empty() {
        builder.exclude_patterns(common.exclude.clone());
    }
}

/// Parse the listing and print it. `compressed` is false for plain tarballs.
fn run(
    parser: &dyn ListingParser,
    common: &CommonArgs,
    archive: Option<ArchiveInfo>,
    compressed: bool,
) -> Result<()> {
    let output = read_input(&common.listing)?;
    tracing::debug!(
        listing = %common.listing.display(),
        bytes = output.len(),
        tool = parser.format().tool(),
        "parsing listing"
    );
    let mut listing = parser
        .parse(&output)
        .with_context(|| format!("Failed to parse {} listing", parser.format().tool()))?;

    if let Some(ref info) = archive {
        listing.summary = listing
            .summary
            .with_archive_size(listing.format, info.size, compressed);
    }

    match common.format {
        OutputFormat::Text => print_listing(&listing, archive.as_ref(), common.depth),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
    }

    if !listing.skipped.is_empty() {
        eprintln!();
        eprintln!(
            "{} entries skipped (run with --verbose for details)",
            listing.skipped.len()
        );
    }

    Ok(())
}

fn print_listing(listing: &Listing, archive: Option<&ArchiveInfo>, depth: Option<usize>) {
    let stats = listing.tree.stats();
    let title = archive
        .and_then(|info| info.name.clone())
        .unwrap_or_else(|| format!("{} listing", listing.format.tool()));

    println!();
    println!("{}", "─".repeat(70));
    println!(" {title}");
    println!(" {} files, {} directories", stats.total_files, stats.total_dirs);
    for line in render::summary_label(&listing.summary).lines() {
        println!(" {line}");
    }
    println!("{}", "─".repeat(70));
    println!();

    if listing.tree.is_empty() {
        println!(" (empty)");
    } else {
        print!("{}", render::render_outline(listing, depth));
    }
}

/// Read a file, or stdin for "-".
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        return Ok(input);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn archive_info(path: Option<&Path>, format: ListingFormat) -> Result<Option<ArchiveInfo>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let metadata =
        std::fs::metadata(path).with_context(|| format!("Invalid archive {}", path.display()))?;
    if metadata.is_dir() {
        bail!("Archive {} is a directory", path.display());
    }
    if let Some(detected) = ListingFormat::detect(path).filter(|detected| *detected != format) {
        tracing::warn!(
            archive = %path.display(),
            "Archive looks like a {} archive, not {}",
            detected.tool(),
            format.tool()
        );
    }
    Ok(Some(ArchiveInfo {
        name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        size: metadata.len(),
        modified: metadata.modified().ok().map(DateTime::<Local>::from),
    }))
}
