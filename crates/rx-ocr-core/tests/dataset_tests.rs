//! Loading the reference dataset from disk.

use std::fs;

use rx_ocr_core::dataset::{DatasetError, DatasetIndex};
use rx_ocr_core::Extractor;

const SAMPLE_CSV: &str = include_str!("fixtures/medicines_sample.csv");

fn write_dataset(contents: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("A_Z_medicines_dataset_of_India.csv");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_load_sample_dataset() {
    let (_dir, path) = write_dataset(SAMPLE_CSV.as_bytes());
    let index = DatasetIndex::load(&path).unwrap();

    // 17 full rows: one stopword name, one duplicate after suffix stripping
    assert_eq!(index.len(), 15);
    assert!(index.get("morning").is_none());
    assert!(index.get("truncated row").is_none());
    assert_eq!(index.get("dolo 650").unwrap().uses, "Paracetamol (650mg)");
    assert_eq!(index.get("pan d").unwrap().canonical_name, "Pan D");
    assert_eq!(
        index.get("paracetamol 500mg").unwrap().canonical_name,
        "Paracetamol 500mg"
    );
}

#[test]
fn test_records_keep_dataset_order() {
    let index = DatasetIndex::from_reader(SAMPLE_CSV.as_bytes()).unwrap();

    let first: Vec<_> = index
        .records()
        .iter()
        .take(4)
        .map(|r| r.canonical_name.as_str())
        .collect();
    assert_eq!(first, ["Augmentin 625", "Azithral 500", "Ascoril LS", "Pan 40"]);
    assert_eq!(index.bucket('a').unwrap(), ["augmentin 625", "azithral 500", "ascoril ls", "acyclovir 800"]);
}

#[test]
fn test_bucket_sizes_sum_to_index_size() {
    let index = DatasetIndex::from_reader(SAMPLE_CSV.as_bytes()).unwrap();

    let total: usize = index
        .records()
        .iter()
        .filter_map(|r| r.key().chars().next())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .map(|c| index.bucket(c).unwrap().len())
        .sum();
    assert_eq!(total, index.len());
    assert_eq!(index.bucket_count(), 8);
}

#[test]
fn test_missing_dataset_degrades_to_empty_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.csv");

    assert!(matches!(DatasetIndex::load(&path), Err(DatasetError::Io(_))));

    let index = DatasetIndex::load_or_empty(&path);
    assert!(index.is_empty());

    let extractor = Extractor::new(&index);
    let result = extractor.extract("Tab. Augmentin 625 1-0-1\nTab. Pan 40 1-0-0");
    assert!(result.medicines.is_empty());
}

#[test]
fn test_header_only_file() {
    let header = SAMPLE_CSV.lines().next().unwrap();
    let (_dir, path) = write_dataset(format!("{header}\n").as_bytes());

    let index = DatasetIndex::load_or_empty(&path);
    assert!(index.is_empty());
}

#[test]
fn test_empty_file() {
    let (_dir, path) = write_dataset(b"");
    let index = DatasetIndex::load(&path).unwrap();
    assert!(index.is_empty());
}

#[test]
fn test_quoted_fields_with_commas() {
    let csv = "id,name,price,disc,maker,type,pack,comp1,comp2\n\
               1,\"Becosules Z, Capsule\",40,FALSE,\"Pfizer, Ltd\",allopathy,strip,\"Vitamin B, Zinc\",\n";
    let (_dir, path) = write_dataset(csv.as_bytes());

    let index = DatasetIndex::load(&path).unwrap();
    let record = index.get("becosules z,").unwrap();
    assert_eq!(record.canonical_name, "Becosules Z,");
    assert_eq!(record.uses, "Vitamin B, Zinc");
}
