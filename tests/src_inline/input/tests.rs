use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

use super::meta::{ClinicalIndex, find_id_column};
use super::reader::{delimiter_for, is_gzip};
use super::*;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

fn write_gz(path: &Path, contents: &str) {
    let mut enc = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    enc.write_all(contents.as_bytes()).unwrap();
    enc.finish().unwrap();
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_load_table_tsv() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("BRCA_expr.tsv");
    write_file(&path, "Gene\tP1\tP2\nTP53\t5.0\t1\nEGFR\tn/a\t2.5\n");

    let table = load_table(&path, None).unwrap();
    assert_eq!(table.columns, strings(&["Gene", "P1", "P2"]));
    assert_eq!(table.n_rows(), 2);
    assert_eq!(table.cell(1, 1), "n/a");
    assert_eq!(table.cell(5, 5), "");
    assert!(table.index.is_none());
}

#[test]
fn test_load_table_gz_matches_plain() {
    let dir = TempDir::new().unwrap();
    let contents = "Gene\tP1\nTP53\t5.0\nKRAS\t0.25\n";
    let plain = dir.path().join("LUAD_expr.tsv");
    let gz = dir.path().join("LUAD_expr.tsv.gz");
    write_file(&plain, contents);
    write_gz(&gz, contents);

    assert_eq!(load_table(&plain, None).unwrap(), load_table(&gz, None).unwrap());
}

#[test]
fn test_load_table_csv_and_bom() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clinical.csv");
    write_file(&path, "\u{feff}patient_id,age\nTCGA-01,61\n");

    let table = load_table(&path, None).unwrap();
    assert_eq!(table.columns, strings(&["patient_id", "age"]));
    assert_eq!(table.cell(0, 1), "61");
}

#[test]
fn test_load_table_row_cap() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.tsv");
    let mut contents = String::from("Gene\tP1\n");
    for i in 0..50 {
        contents.push_str(&format!("G{i}\t{i}\n"));
    }
    write_file(&path, &contents);

    assert_eq!(load_table(&path, Some(10)).unwrap().n_rows(), 10);
    assert_eq!(load_table(&path, None).unwrap().n_rows(), 50);
}

#[test]
fn test_load_table_pads_short_rows_and_skips_blank() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.tsv");
    write_file(&path, "Gene\tP1\tP2\nTP53\t1\n\t\t\nMYC\t2\t3\n");

    let table = load_table(&path, None).unwrap();
    assert_eq!(table.n_rows(), 2);
    assert_eq!(table.rows[0], strings(&["TP53", "1", ""]));
    assert_eq!(table.cell(1, 0), "MYC");
}

#[test]
fn test_load_table_rejects_long_row() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.tsv");
    write_file(&path, "Gene\tP1\nTP53\t1\t2\t3\n");

    let err = load_table(&path, None).unwrap_err();
    assert!(matches!(err, InputError::Parse(_)), "{err}");
}

#[test]
fn test_load_table_missing_file_and_corrupt_gz() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        load_table(&dir.path().join("nope.tsv"), None),
        Err(InputError::Io(_))
    ));

    let gz = dir.path().join("broken.tsv.gz");
    write_file(&gz, "this is not gzip\n");
    assert!(load_table(&gz, None).is_err());
}

#[test]
fn test_with_index_promotes_column() {
    let table = RawTable::new(
        strings(&["Gene", "P1", "P2"]),
        vec![strings(&["TP53", "1", "2"]), strings(&["MYC", "3", "4"])],
    );
    let indexed = table.with_index(0);
    assert_eq!(indexed.columns, strings(&["P1", "P2"]));
    assert_eq!(indexed.index, Some(strings(&["TP53", "MYC"])));
    assert_eq!(indexed.cell(1, 0), "3");

    let again = indexed.clone().with_index(0);
    assert_eq!(again, indexed);
}

#[test]
fn test_coerce_cell() {
    assert_eq!(coerce_cell(" 5 "), Cell::Number(5.0));
    assert_eq!(coerce_cell("-1.5e2"), Cell::Number(-150.0));
    assert_eq!(coerce_cell("n/a"), Cell::Missing);
    assert_eq!(coerce_cell("NaN"), Cell::Missing);
    assert_eq!(coerce_cell("inf"), Cell::Missing);
    assert_eq!(coerce_cell(""), Cell::Missing);
    assert_eq!(coerce_cell("high"), Cell::Text("high"));
    assert_eq!(coerce_cell("2").to_json(), serde_json::json!(2.0));
    assert_eq!(Cell::Missing.to_json(), serde_json::Value::Null);
}

#[test]
fn test_cohort_from_path() {
    assert_eq!(cohort_from_path(Path::new("/data/BRCA_expression.tsv.gz")), "BRCA");
    assert_eq!(cohort_from_path(Path::new("TCGA-LUAD_x_y.tsv")), "TCGA-LUAD");
    assert_eq!(cohort_from_path(Path::new("LAML.tsv.gz")), "LAML");
    assert_eq!(cohort_from_path(Path::new("LAML")), "LAML");
}

#[test]
fn test_reader_helpers() {
    assert!(is_gzip(Path::new("a.tsv.gz")));
    assert!(!is_gzip(Path::new("a.tsv")));
    assert_eq!(delimiter_for(Path::new("a.CSV.gz")), b',');
    assert_eq!(delimiter_for(Path::new("a.txt")), b'\t');
    assert!(is_table_file(Path::new("x.tsv.gz")));
    assert!(!is_table_file(Path::new("x.json")));
}

#[test]
fn test_discover_inputs() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("b_expr.tsv"), "Gene\tP1\n");
    write_file(&dir.path().join("a_expr.csv"), "Gene,P1\n");
    write_file(&dir.path().join("notes.md"), "x");

    let found = discover_inputs(&[dir.path().to_path_buf()]).unwrap();
    let names: Vec<String> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, strings(&["a_expr.csv", "b_expr.tsv"]));

    let missing = discover_inputs(&[PathBuf::from("/definitely/not/here.tsv")]);
    assert!(matches!(missing, Err(InputError::MissingInput(_))));

    let empty = TempDir::new().unwrap();
    assert!(discover_inputs(&[empty.path().to_path_buf()]).is_err());
}

#[test]
fn test_clinical_index_priority_and_duplicates() {
    let candidates = strings(&["patient_id", "sample", "bcr_patient_barcode"]);
    let columns = strings(&["bcr_patient_barcode", "sample", "age"]);
    assert_eq!(find_id_column(&columns, &candidates), Some("sample"));

    let table = RawTable::new(
        strings(&["bcr_patient_barcode", "age"]),
        vec![
            strings(&["TCGA-01", "60"]),
            strings(&["", "70"]),
            strings(&["TCGA-01", "80"]),
            strings(&["TCGA-02", "50"]),
        ],
    );
    let index = ClinicalIndex::build(&table, &candidates).unwrap();
    assert_eq!(index.id_column, "bcr_patient_barcode");
    assert_eq!(index.ids, strings(&["TCGA-01", "TCGA-02"]));
    assert_eq!(index.position_of("TCGA-01"), Some(0));
    assert_eq!(index.rows[0][1], "80");
    assert_eq!(index.rows[1][1], "50");

    let no_id = RawTable::new(strings(&["age"]), vec![strings(&["1"])]);
    assert!(ClinicalIndex::build(&no_id, &candidates).is_none());
}
