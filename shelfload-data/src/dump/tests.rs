//! Unit tests for dump access and line parsing.

use super::{Compression, LineParseError, open_dump, parse_line};
use crate::load::LoadError;
use bzip2::write::BzEncoder;
use camino::{Utf8Path, Utf8PathBuf};
use flate2::write::GzEncoder;
use rstest::{fixture, rstest};
use serde_json::json;
use std::{
    fs,
    io::{BufRead, Write},
};
use tempfile::TempDir;

const AUTHOR_LINE: &str =
    "/type/author\t/authors/OL1A\t3\t2008-04-01T03:28:50.625462\t{\"key\":\"/authors/OL1A\",\"name\":\"Jane Doe\"}";

#[fixture]
fn workspace() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
    (dir, root)
}

fn read_all_lines(path: &Utf8Path) -> Vec<String> {
    open_dump(path)
        .expect("open dump")
        .lines()
        .collect::<Result<_, _>>()
        .expect("read lines")
}

#[rstest]
fn strips_prefix_before_first_brace() {
    let line = parse_line(AUTHOR_LINE).expect("line should parse");

    assert_eq!(line.text("key").as_deref(), Some("/authors/OL1A"));
    assert_eq!(line.text("name").as_deref(), Some("Jane Doe"));
    assert_eq!(line.len(), 2);
}

#[rstest]
fn parses_line_without_prefix() {
    let line = parse_line(r#"{"key":"/works/OL1W"}"#).expect("line should parse");
    assert_eq!(line.text("key").as_deref(), Some("/works/OL1W"));
}

#[rstest]
fn tolerates_trailing_line_terminator() {
    let line = parse_line("W\t{\"key\":\"/works/OL1W\"}\r\n").expect("line should parse");
    assert_eq!(line.text("key").as_deref(), Some("/works/OL1W"));
}

#[rstest]
#[case("")]
#[case("/type/author\t/authors/OL1A\t3")]
fn lines_without_braces_are_rejected(#[case] input: &str) {
    let err = parse_line(input).expect_err("no object to parse");
    assert!(matches!(err, LineParseError::NoJsonObject));
}

#[rstest]
#[case("W\t{\"key\": ")]
#[case("{\"key\":\"/works/OL1W\"")]
#[case("{not json}")]
fn malformed_objects_are_rejected(#[case] input: &str) {
    let err = parse_line(input).expect_err("malformed JSON should fail");
    assert!(matches!(err, LineParseError::Json { .. }), "got {err:?}");
}

#[rstest]
fn text_renders_scalars_only() {
    let line = parse_line(r#"{"s":"x","n":42,"b":true,"a":[1],"o":{},"z":null}"#)
        .expect("line should parse");

    assert_eq!(line.text("s").as_deref(), Some("x"));
    assert_eq!(line.text("n").as_deref(), Some("42"));
    assert_eq!(line.text("b").as_deref(), Some("true"));
    assert_eq!(line.text("a"), None);
    assert_eq!(line.text("o"), None);
    assert_eq!(line.text("z"), None);
    assert_eq!(line.text("missing"), None);
}

#[rstest]
fn follows_nested_paths() {
    let line = parse_line(
        r#"{"created":{"type":"/type/datetime","value":"2009-10-15T11:34:21.437031"}}"#,
    )
    .expect("line should parse");

    assert_eq!(
        line.path(&["created", "value"]),
        Some(&json!("2009-10-15T11:34:21.437031"))
    );
    assert_eq!(line.path(&["created", "missing"]), None);
    assert_eq!(line.path(&[]), None);
}

#[rstest]
fn list_ignores_non_arrays() {
    let line = parse_line(r#"{"covers":[1,2],"authors":"nobody"}"#).expect("line should parse");

    assert_eq!(line.list("covers").map(<[_]>::len), Some(2));
    assert_eq!(line.list("authors"), None);
}

#[rstest]
#[case("authors.txt", Compression::Plain)]
#[case("ol_dump_authors_latest.txt.gz", Compression::Gzip)]
#[case("dump.GZ", Compression::Gzip)]
#[case("dump.json.bz2", Compression::Bzip2)]
#[case("dump.BZ2", Compression::Bzip2)]
#[case("dumpgz", Compression::Plain)]
fn compression_follows_extension(#[case] name: &str, #[case] expected: Compression) {
    assert_eq!(Compression::from_path(Utf8Path::new(name)), expected);
}

#[rstest]
fn opens_plain_dumps(workspace: (TempDir, Utf8PathBuf)) {
    let (_dir, root) = workspace;
    let path = root.join("authors.txt");
    fs::write(&path, format!("{AUTHOR_LINE}\n{AUTHOR_LINE}\n")).expect("write dump");

    assert_eq!(read_all_lines(&path), vec![AUTHOR_LINE, AUTHOR_LINE]);
}

#[rstest]
fn opens_gzip_dumps(workspace: (TempDir, Utf8PathBuf)) {
    let (_dir, root) = workspace;
    let path = root.join("authors.txt.gz");
    let file = fs::File::create(&path).expect("create gz file");
    let mut encoder = GzEncoder::new(file, flate2::Compression::default());
    writeln!(encoder, "{AUTHOR_LINE}").expect("compress dump");
    encoder.finish().expect("finish compression");

    assert_eq!(read_all_lines(&path), vec![AUTHOR_LINE]);
}

#[rstest]
fn opens_bzip2_dumps(workspace: (TempDir, Utf8PathBuf)) {
    let (_dir, root) = workspace;
    let path = root.join("authors.txt.bz2");
    let file = fs::File::create(&path).expect("create bz2 file");
    let mut encoder = BzEncoder::new(file, bzip2::Compression::default());
    writeln!(encoder, "{AUTHOR_LINE}").expect("compress dump");
    encoder.finish().expect("finish compression");

    assert_eq!(read_all_lines(&path), vec![AUTHOR_LINE]);
}

#[rstest]
fn missing_dump_is_unavailable(workspace: (TempDir, Utf8PathBuf)) {
    let (_dir, root) = workspace;
    let missing = root.join("absent.txt");

    let Err(err) = open_dump(&missing) else {
        panic!("expected missing dump to fail");
    };
    match err {
        LoadError::SourceUnavailable { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn directory_is_unavailable(workspace: (TempDir, Utf8PathBuf)) {
    let (_dir, root) = workspace;

    let Err(err) = open_dump(&root) else {
        panic!("expected directory to be rejected");
    };
    assert!(matches!(err, LoadError::SourceUnavailable { .. }));
}
