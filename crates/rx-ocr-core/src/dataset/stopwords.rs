//! Words that look drug-like to the matcher but never are.
//!
//! Applied identically when building the index and when walking tokens.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Frequent false positives on prescriptions and lab reports.
pub const STOPWORDS: &[&str] = &[
    "doctor", "patient", "hospital", "clinic", "date", "morning", "afternoon",
    "evening", "night", "before", "after", "food", "daily", "days", "weeks",
    "years", "yrs", "male", "female", "age", "weight", "height", "address",
    "report", "result", "normal", "range", "medicine", "prescription",
    "name", "sex", "dr.", "hosp", "med", "total", "count", "value",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORDS.iter().copied().collect());

/// Check an already-lowercased word against the stopword set.
pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}
