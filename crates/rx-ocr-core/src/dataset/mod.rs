//! In-memory index over the reference medicine dataset.
//!
//! Built once at startup and shared read-only by every request:
//! - exact lookup: lowercased canonical name → record
//! - buckets: first character → lowercased names, to bound fuzzy search

mod builder;
mod loader;
mod stopwords;

pub use builder::*;
pub use stopwords::*;

use std::collections::HashMap;

use thiserror::Error;

use crate::models::MedicineRecord;

/// Dataset loading errors.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type DatasetResult<T> = Result<T, DatasetError>;

/// Immutable lookup structure over the reference dataset.
#[derive(Debug, Default, Clone)]
pub struct DatasetIndex {
    /// Accepted records in dataset order
    records: Vec<MedicineRecord>,
    /// Lowercased canonical name → position in `records`
    lookup: HashMap<String, usize>,
    /// First character → lowercased names in insertion order
    buckets: HashMap<char, Vec<String>>,
}

impl DatasetIndex {
    /// An index with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of unique medicines.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All accepted records in dataset order.
    pub fn records(&self) -> &[MedicineRecord] {
        &self.records
    }

    /// Exact lookup by lowercased canonical name.
    pub fn get(&self, key: &str) -> Option<&MedicineRecord> {
        self.lookup.get(key).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup.contains_key(key)
    }

    /// Names sharing a first character, in dataset order.
    pub fn bucket(&self, first: char) -> Option<&[String]> {
        self.buckets.get(&first).map(Vec::as_slice)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
