use std::fs;
use std::path::PathBuf;

use loris_ingest::{InspectError, count_rows, inspect_csv, validate_instrument_file};
use proptest::prelude::*;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn inspects_header_size_and_rows() {
    let dir = TempDir::new().unwrap();
    let contents = "PSCID,Visit_label,weight\nMTL001,V1,70\nMTL002,V1,80\n";
    let path = write_file(&dir, "bmi.csv", contents);

    let inspection = validate_instrument_file(&path).expect("valid file");
    assert_eq!(inspection.headers, vec!["PSCID", "Visit_label", "weight"]);
    assert_eq!(inspection.row_count, 2);
    assert_eq!(inspection.size_bytes, contents.len() as u64);
    assert!(inspection.missing_columns().is_empty());
}

#[test]
fn header_with_bom_still_matches() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bmi.csv", "\u{feff}PSCID,Visit_label\nMTL001,V1\n");
    assert!(validate_instrument_file(&path).is_ok());
}

#[test]
fn missing_visit_label_is_reported_by_name() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bmi.csv", "PSCID,weight\nMTL001,70\n");

    match validate_instrument_file(&path) {
        Err(InspectError::MissingColumns { columns, .. }) => {
            assert_eq!(columns, vec!["Visit_label"]);
        }
        other => panic!("expected missing columns, got {other:?}"),
    }
}

#[test]
fn empty_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "empty.csv", "");
    assert!(matches!(
        inspect_csv(&path),
        Err(InspectError::EmptyCsv { .. })
    ));
}

#[test]
fn absent_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        inspect_csv(&dir.path().join("nope.csv")),
        Err(InspectError::FileRead { .. })
    ));
}

#[test]
fn quoted_newlines_count_as_one_row() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "notes.csv",
        "PSCID,Visit_label,comment\nMTL001,V1,\"line one\nline two\"\n",
    );
    assert_eq!(count_rows(&path).unwrap(), 1);
}

#[test]
fn latin1_cells_do_not_fail_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("address.csv");
    fs::write(
        &path,
        b"PSCID,Visit_label,city\nMTL001,V1,Montr\xE9al\nMTL002,V1,Laval\n",
    )
    .unwrap();

    let inspection = validate_instrument_file(&path).expect("latin-1 file validates");

    assert_eq!(inspection.row_count, 2);
    assert!(inspection.missing_columns().is_empty());
}

proptest! {
    #[test]
    fn row_count_is_lines_minus_header(rows in 0usize..200) {
        let dir = TempDir::new().unwrap();
        let mut contents = String::from("PSCID,Visit_label,score\n");
        for idx in 0..rows {
            contents.push_str(&format!("MTL{idx:04},V{},{}\n", idx % 3, idx * 7));
        }
        let path = write_file(&dir, "scores.csv", &contents);

        let line_count = contents.lines().count() as u64;
        let first = count_rows(&path).unwrap();
        let second = count_rows(&path).unwrap();
        prop_assert_eq!(first, line_count - 1);
        prop_assert_eq!(first, second);
        prop_assert_eq!(fs::read_to_string(&path).unwrap(), contents);
    }
}
