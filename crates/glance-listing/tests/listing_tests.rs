use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use glance_listing::{
    BomParser, ListingConfig, ListingError, ListingFormat, ListingParser, TarParser,
    UNKNOWN_SIGNATURE, ZipInfoParser, parser_for,
};
use tempfile::TempDir;

const TAR_OUTPUT: &str = "\
-rw-r--r--  0 user   staff     642 Dec 29  2018 my-tar/file.ext
drwxr-xr-x  0 user   staff       0 Mar 28 15:36 my-tar/
-rw-r--r--  0 user   staff      12 Mar 28 15:36 my-tar/sub/nested.txt
drwxr-xr-x  0 user   staff       0 Mar  8 09:05 my-tar/sub/
-rw-r--r--  0 user   staff       5 Mar 28 15:36 my-tar/file.ext/inner
";

const GZIP_OUTPUT: &str = "\
  compressed uncompressed  ratio uncompressed_name
         330         2048  85.1% my-tar.tar
";

const ZIPINFO_OUTPUT: &str = "\
Archive:  my-zip.zip
Zip file size: 1520 bytes, number of entries: 6
-rw-r--r--  3.0 unx     1200 tx defN 20-Jan-13 19:38 my-zip/dir/file-2.txt
drwxr-xr-x  3.0 unx        0 bx stor 20-Jan-13 19:37 my-zip/
-rw-r--r--  3.0 unx      300 tx defN 20-Jan-13 19:38 my-zip/file-1.txt
drwxr-xr-x  3.0 unx        0 bx stor 20-Jan-14 08:00 my-zip/dir/
drwxrwxr-x  2.1 unx        0 bx stor 20-Jan-13 19:39 __MACOSX/
-rw-r--r--  2.1 unx      176 bX defN 20-Jan-13 19:38 __MACOSX/my-zip/._file-1.txt
6 files, 1676 bytes uncompressed, 1480 bytes compressed:  11.7%
";

fn bom_output() -> String {
    [
        ".\tdrwxr-xr-x\t",
        "./missing\t?---------\t",
        "./Applications/Hello.app/Contents/Info.plist\t-rw-r--r-- \t1024\t1587628964",
        "./Applications\tdrwxrwxr-x\t",
        "./Applications/Hello.app\tdrwxr-xr-x\t",
        "./hello-world.txt\t-rw-r--r-- \t13\t1587628964",
    ]
    .join("\n")
}

fn config() -> ListingConfig {
    ListingConfig::builder().reference_year(2020).build().unwrap()
}

#[test]
fn test_tar_listing() {
    let parser = TarParser::new(config()).unwrap();
    let listing = parser.parse(TAR_OUTPUT).unwrap();
    let tree = &listing.tree;

    let root = tree.get("my-tar").unwrap();
    assert!(root.is_dir());
    assert_eq!(
        root.date_modified,
        NaiveDate::from_ymd_opt(2020, 3, 28)
            .unwrap()
            .and_hms_opt(15, 36, 0)
    );

    let file = tree.get("my-tar/file.ext").unwrap();
    assert_eq!(file.size, 642);
    assert_eq!(
        file.date_modified,
        NaiveDate::from_ymd_opt(2018, 12, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
    );

    // Directory listed after its child gets its date backfilled
    let sub = tree.get("my-tar/sub").unwrap();
    assert_eq!(
        sub.date_modified,
        NaiveDate::from_ymd_opt(2020, 3, 8)
            .unwrap()
            .and_hms_opt(9, 5, 0)
    );
    assert_eq!(sub.child_count(), 1);

    // Entry below a file is reported, not fatal
    assert_eq!(listing.skipped.len(), 1);
    assert!(listing.skipped[0].line.ends_with("my-tar/file.ext/inner"));
    assert!(listing.skipped[0].reason.contains("is not a directory"));

    assert_eq!(listing.format, ListingFormat::Tar);
    assert_eq!(listing.summary.uncompressed_size, Some(654));
    assert!(listing.summary.compression_ratio.is_none());
}

#[test]
fn test_tar_archive_root_and_gzip_summary() {
    let date = NaiveDate::from_ymd_opt(2021, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let config = ListingConfig::builder()
        .reference_year(2020)
        .archive_root("archive")
        .archive_root_modified(date)
        .build()
        .unwrap();

    let parser = TarParser::new(config).unwrap().with_gzip_list(GZIP_OUTPUT);
    let listing = parser.parse(TAR_OUTPUT).unwrap();

    let archive = listing.tree.get("archive").unwrap();
    assert!(archive.is_dir());
    assert_eq!(archive.date_modified, Some(date));
    assert_eq!(listing.tree.root().child_count(), 2);

    assert_eq!(listing.summary.compressed_size, Some(330));
    assert_eq!(listing.summary.uncompressed_size, Some(2048));
    assert_eq!(listing.summary.compression_ratio, Some(85.1));
}

#[test]
fn test_gnu_tar_listing() {
    let output = "\
drwxr-xr-x user/staff        0 2018-12-29 10:00 project/
-rw-r--r-- user/staff      642 2018-12-29 10:01 project/README.md
lrwxrwxrwx user/staff        0 2018-12-29 10:02 project/latest -> README.md
";
    let listing = TarParser::new(config()).unwrap().parse(output).unwrap();

    assert_eq!(listing.tree.get("project/README.md").unwrap().size, 642);
    assert!(listing.tree.get("project/latest").unwrap().is_file());
    assert!(listing.skipped.is_empty());
}

#[test]
fn test_tar_bad_gzip_summary() {
    let parser = TarParser::new(config())
        .unwrap()
        .with_gzip_list("gzip: my-tar.tar: not in gzip format");
    let err = parser.parse(TAR_OUTPUT).unwrap_err();
    assert!(matches!(err, ListingError::MalformedSummary { .. }));
}

#[test]
fn test_tar_leap_day_without_year() {
    let config = ListingConfig::builder().reference_year(2021).build().unwrap();
    let output = "\
-rw-r--r--  0 user   staff       5 Feb 29 10:00 a/leap.txt
-rw-r--r--  0 user   staff       3 Mar  1 10:00 a/next.txt
";
    let listing = TarParser::new(config).unwrap().parse(output).unwrap();

    let leap = listing.tree.get("a/leap.txt").unwrap();
    assert!(leap.date_modified.is_none());
    assert!(listing.tree.get("a/next.txt").unwrap().date_modified.is_some());
    assert!(listing.skipped.is_empty());
    assert_eq!(listing.summary.uncompressed_size, Some(8));
}

#[test]
fn test_zipinfo_listing() {
    let parser = ZipInfoParser::new(&config()).unwrap();
    let listing = parser.parse(ZIPINFO_OUTPUT).unwrap();
    let tree = &listing.tree;

    // Resource forks are excluded by default
    assert!(tree.get("__MACOSX").is_none());
    assert_eq!(tree.root().child_count(), 1);

    let dir = tree.get("my-zip/dir").unwrap();
    assert_eq!(
        dir.date_modified,
        NaiveDate::from_ymd_opt(2020, 1, 14)
            .unwrap()
            .and_hms_opt(8, 0, 0)
    );
    assert_eq!(tree.get("my-zip/dir/file-2.txt").unwrap().size, 1200);
    assert_eq!(tree.get("my-zip/file-1.txt").unwrap().size, 300);

    let stats = tree.stats();
    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.total_dirs, 2);

    assert_eq!(listing.summary.compressed_size, Some(1520));
    assert_eq!(listing.summary.uncompressed_size, Some(1676));
    assert_eq!(listing.summary.compression_ratio, Some(11.7));
    assert!(listing.skipped.is_empty());
}

#[test]
fn test_zipinfo_custom_exclusions() {
    let config = ListingConfig::builder()
        .exclude_patterns(vec!["**/*.txt".to_string()])
        .build()
        .unwrap();
    let listing = ZipInfoParser::new(&config)
        .unwrap()
        .parse(ZIPINFO_OUTPUT)
        .unwrap();

    assert!(listing.tree.get("__MACOSX").is_some());
    assert!(listing.tree.get("my-zip/file-1.txt").is_none());
    assert!(listing.tree.get("my-zip/dir").is_some());
}

#[test]
fn test_empty_zipfile() {
    let output = "\
Archive:  empty.zip
Zip file size: 22 bytes, number of entries: 0
Empty zipfile.
";
    let listing = ZipInfoParser::new(&config()).unwrap().parse(output).unwrap();

    assert!(listing.tree.is_empty());
    assert_eq!(listing.summary.compressed_size, Some(22));
    assert_eq!(listing.summary.uncompressed_size, Some(0));
    assert_eq!(listing.summary.compression_ratio, Some(0.0));
}

#[test]
fn test_zipinfo_entry_with_bad_date() {
    let output = "\
Archive:  dos.zip
Zip file size: 200 bytes, number of entries: 1
-rw-r--r--  2.0 fat       42 t- stor 80-000-00 00:00 old/file.txt
1 file, 42 bytes uncompressed, 42 bytes compressed:  0.0%
";
    let listing = ZipInfoParser::new(&config()).unwrap().parse(output).unwrap();

    let file = listing.tree.get("old/file.txt").unwrap();
    assert_eq!(file.size, 42);
    assert!(file.date_modified.is_none());
    assert!(listing.skipped.is_empty());
}

#[test]
fn test_zipinfo_malformed_summary() {
    let output = "\
Archive:  broken.zip
Zip file size: 1520 bytes, number of entries: 1
-rw-r--r--  3.0 unx      300 tx defN 20-Jan-13 19:38 file.txt
(truncated)
";
    let err = ZipInfoParser::new(&config())
        .unwrap()
        .parse(output)
        .unwrap_err();
    assert!(matches!(err, ListingError::MalformedSummary { ref line } if line == "(truncated)"));
}

#[test]
fn test_bom_listing() {
    let parser = BomParser::new(&config())
        .unwrap()
        .with_signature("Package \"Hello.pkg\":\n   Status: no signature\n");
    let listing = parser.parse(&bom_output()).unwrap();
    let tree = &listing.tree;

    // "." is the payload root, "?---------" rows don't exist
    assert!(tree.get(".").is_none());
    assert!(tree.get("missing").is_none());
    assert_eq!(tree.root().child_count(), 2);

    let app = tree.get("Applications/Hello.app").unwrap();
    assert!(app.is_dir());
    assert!(app.date_modified.is_none());

    let plist = tree
        .get("Applications/Hello.app/Contents/Info.plist")
        .unwrap();
    assert_eq!(plist.size, 1024);
    assert_eq!(
        plist.date_modified,
        NaiveDate::from_ymd_opt(2020, 4, 23)
            .unwrap()
            .and_hms_opt(8, 2, 44)
    );

    assert_eq!(listing.summary.uncompressed_size, Some(1037));
    assert_eq!(listing.summary.signature.as_deref(), Some("No signature"));
}

#[test]
fn test_bom_archive_ratio() {
    let listing = BomParser::new(&config()).unwrap().parse(&bom_output()).unwrap();
    let summary = listing
        .summary
        .with_archive_size(ListingFormat::Package, 2074, false);

    assert_eq!(summary.compressed_size, Some(2074));
    assert_eq!(summary.uncompressed_size, Some(1037));
    assert_eq!(summary.compression_ratio, Some(200.0));
}

#[test]
fn test_bom_unknown_signature() {
    let parser = BomParser::new(&config()).unwrap().with_signature("");
    let listing = parser.parse(&bom_output()).unwrap();
    assert_eq!(listing.summary.signature.as_deref(), Some(UNKNOWN_SIGNATURE));
}

#[test]
fn test_parse_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("zipinfo.txt");
    fs::write(&path, ZIPINFO_OUTPUT).unwrap();

    let parser = parser_for(ListingFormat::Zip, config()).unwrap();
    assert_eq!(parser.format(), ListingFormat::Zip);

    let listing = parser.parse_file(&path).unwrap();
    assert_eq!(listing.tree.stats().total_size, 1500);

    let err = parser
        .parse_file(Path::new("/nonexistent/zipinfo.txt"))
        .unwrap_err();
    assert!(matches!(err, ListingError::Io { .. }));
}

#[test]
fn test_invalid_exclusion_pattern() {
    let config = ListingConfig {
        exclude_patterns: vec!["[unclosed".to_string()],
        ..ListingConfig::default()
    };
    assert!(matches!(
        TarParser::new(config),
        Err(ListingError::InvalidConfig { .. })
    ));
}
