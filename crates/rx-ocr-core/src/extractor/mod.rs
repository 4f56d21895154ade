//! Medicine extraction from OCR text.
//!
//! Pipeline: Normalization → Token matching → Dose extraction → Deduplication

mod dedup;
mod dosage;
mod matcher;
mod normalizer;
mod similarity;

pub use dedup::*;
pub use dosage::*;
pub use matcher::*;
pub use normalizer::*;
pub use similarity::*;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::DatasetIndex;
use crate::models::MatchedMedicine;

/// Output of one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Extraction {
    /// Text after normalization, as scanned for names and doses
    pub normalized_text: String,
    /// Distinct medicines in order of first appearance
    pub medicines: Vec<MatchedMedicine>,
}

/// Main extractor that coordinates the full pipeline.
///
/// Borrows the index read-only, so one index can serve any number of
/// extractors on any number of threads.
pub struct Extractor<'a> {
    normalizer: TextNormalizer,
    matcher: TokenMatcher<'a>,
    dosage: DosageExtractor,
}

impl<'a> Extractor<'a> {
    /// Create a new extractor over a built index.
    pub fn new(index: &'a DatasetIndex) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            matcher: TokenMatcher::new(index),
            dosage: DosageExtractor::new(),
        }
    }

    /// Extract medicines and doses from raw OCR text.
    pub fn extract(&self, raw_text: &str) -> Extraction {
        // Step 1: Repair OCR glyphs and word boundaries
        let normalized_text = self.normalizer.normalize(raw_text);

        // Step 2: Resolve token positions to medicines
        let mut medicines = self.matcher.match_text(&normalized_text);

        // Step 3: Recover doses from the normalized text
        self.dosage.fill_doses(&normalized_text, &mut medicines);

        // Step 4: Keep first occurrence of each medicine
        let medicines = dedup_medicines(medicines);
        debug!(count = medicines.len(), "Extracted medicines");

        Extraction {
            normalized_text,
            medicines,
        }
    }

    /// Shorthand for `extract(raw_text).medicines`.
    pub fn extract_medicines(&self, raw_text: &str) -> Vec<MatchedMedicine> {
        self.extract(raw_text).medicines
    }

    /// Get the normalizer for direct access.
    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Get the token matcher for direct access.
    pub fn matcher(&self) -> &TokenMatcher<'a> {
        &self.matcher
    }
}
