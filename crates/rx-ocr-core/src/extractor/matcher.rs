//! Token matching against the dataset index.
//!
//! Left to right, one cursor, no backtracking. At each position:
//! 1. skip short tokens and stopwords
//! 2. exact two-token name (`pan 40`)
//! 3. exact single-token name
//! 4. fuzzy match inside the first-character bucket

use tracing::trace;

use crate::dataset::{is_stopword, DatasetIndex};
use crate::models::{MatchedMedicine, MedicineRecord};

use super::similarity::BlockMatcher;

/// Minimum similarity for a fuzzy match to be accepted.
pub const SIMILARITY_CUTOFF: f64 = 0.82;

/// Tokens shorter than this (in characters) are never matched.
pub const MIN_TOKEN_CHARS: usize = 3;

/// How a medicine was recognized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    TwoToken,
    Exact,
    Fuzzy { score: f64 },
}

/// A best fuzzy candidate and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyCandidate<'a> {
    pub key: &'a str,
    pub score: f64,
}

/// Walks normalized tokens and resolves each position to at most one medicine.
pub struct TokenMatcher<'a> {
    index: &'a DatasetIndex,
}

impl<'a> TokenMatcher<'a> {
    /// Create a matcher over an index.
    pub fn new(index: &'a DatasetIndex) -> Self {
        Self { index }
    }

    /// Match every position of the normalized text, in order.
    ///
    /// Doses are left at the default; see [`super::DosageExtractor`].
    pub fn match_text(&self, normalized: &str) -> Vec<MatchedMedicine> {
        self.match_records(normalized)
            .into_iter()
            .map(|(record, _)| MatchedMedicine::from_record(record))
            .collect()
    }

    /// Like [`match_text`](Self::match_text), keeping the matched record and how it matched.
    pub fn match_records(&self, normalized: &str) -> Vec<(&'a MedicineRecord, MatchKind)> {
        let tokens: Vec<String> = normalized.split_whitespace().map(str::to_lowercase).collect();
        let mut found = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            let word = &tokens[i];
            if word.chars().count() < MIN_TOKEN_CHARS || is_stopword(word) {
                i += 1;
                continue;
            }

            if let Some(next) = tokens.get(i + 1) {
                let pair = format!("{word} {next}");
                if let Some(record) = self.index.get(&pair) {
                    found.push((record, MatchKind::TwoToken));
                    i += 2;
                    continue;
                }
            }

            if let Some(record) = self.index.get(word) {
                found.push((record, MatchKind::Exact));
            } else if let Some(candidate) = self.best_fuzzy(word) {
                trace!(token = %word, candidate = candidate.key, score = candidate.score, "Fuzzy match");
                if let Some(record) = self.index.get(candidate.key) {
                    found.push((record, MatchKind::Fuzzy { score: candidate.score }));
                }
            }
            i += 1;
        }

        found
    }

    /// Best bucket candidate scoring at least [`SIMILARITY_CUTOFF`].
    ///
    /// Ties go to the lexicographically greatest key.
    pub fn best_fuzzy(&self, word: &str) -> Option<FuzzyCandidate<'a>> {
        let first = word.chars().next()?;
        let bucket = self.index.bucket(first)?;
        let matcher = BlockMatcher::new(word);

        let mut best: Option<FuzzyCandidate<'a>> = None;
        for key in bucket {
            if matcher.real_quick_ratio(key) < SIMILARITY_CUTOFF
                || matcher.quick_ratio(key) < SIMILARITY_CUTOFF
            {
                continue;
            }
            let score = matcher.ratio(key);
            if score < SIMILARITY_CUTOFF {
                continue;
            }

            let better = match &best {
                None => true,
                Some(current) => {
                    score > current.score || (score == current.score && key.as_str() > current.key)
                }
            };
            if better {
                best = Some(FuzzyCandidate { key, score });
            }
        }
        best
    }
}
