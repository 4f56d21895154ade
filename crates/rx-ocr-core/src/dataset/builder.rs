//! Row-by-row construction of a [`DatasetIndex`].

use once_cell::sync::Lazy;
use regex::Regex;

use super::{is_stopword, DatasetIndex};
use crate::models::MedicineRecord;

/// Rows shorter than this are malformed and skipped.
pub const MIN_ROW_FIELDS: usize = 8;

/// Column holding the display name.
const NAME_FIELD: usize = 1;
/// Columns holding the composition parts.
const COMPOSITION_FIELDS: (usize, usize) = (7, 8);

/// A dosage-form or unit word and everything after it.
static FORM_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s+(?:Tablet|Capsule|Syrup|Injection|Duo|Liquid|Drops|Suspension|mg|gm|mcg)\b.*",
    )
    .expect("form suffix pattern is valid")
});

/// Strip the trailing dosage form / unit from a display name.
///
/// `"Dolo 650 Tablet"` → `"Dolo 650"`, `"Calpol 500mg"` stays as-is because
/// the unit is not a separate word.
pub fn canonical_name(display_name: &str) -> String {
    FORM_SUFFIX.replace_all(display_name, "").trim().to_string()
}

/// Join the two composition parts, dropping separators at either end.
fn join_composition(first: &str, second: &str) -> String {
    format!("{}, {}", first.trim(), second.trim())
        .trim_matches(|c| c == ',' || c == ' ')
        .to_string()
}

/// Accumulates dataset rows into an index.
///
/// First occurrence of a canonical name wins; later duplicates are dropped.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: DatasetIndex,
    skipped: usize,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one row. Returns whether it was accepted.
    pub fn push_row<S: AsRef<str>>(&mut self, fields: &[S]) -> bool {
        if fields.len() < MIN_ROW_FIELDS {
            self.skipped += 1;
            return false;
        }

        let name = canonical_name(fields[NAME_FIELD].as_ref());
        let uses = join_composition(
            fields[COMPOSITION_FIELDS.0].as_ref(),
            fields.get(COMPOSITION_FIELDS.1).map_or("", |f| f.as_ref()),
        );

        if self.insert(MedicineRecord::new(name, uses)) {
            true
        } else {
            self.skipped += 1;
            false
        }
    }

    /// Insert a record unless its key is empty, a stopword, or already taken.
    pub fn insert(&mut self, record: MedicineRecord) -> bool {
        let key = record.key();
        let Some(first) = key.chars().next() else {
            return false;
        };
        if is_stopword(&key) || self.index.lookup.contains_key(&key) {
            return false;
        }

        let idx = self.index.records.len();
        self.index.records.push(record);
        self.index.buckets.entry(first).or_default().push(key.clone());
        self.index.lookup.insert(key, idx);
        true
    }

    /// Rows rejected so far (malformed, empty, stopword or duplicate).
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> DatasetIndex {
        self.index
    }
}

impl DatasetIndex {
    /// Build an index from dataset rows (header already removed).
    pub fn build<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut builder = IndexBuilder::new();
        for row in rows {
            builder.push_row(row.as_ref());
        }
        builder.finish()
    }
}
