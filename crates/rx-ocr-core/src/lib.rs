//! Rx-OCR Core Library
//!
//! Medicine extraction from OCR'd handwritten prescriptions, backed by an
//! in-memory index over a reference dataset of medicine names.
//!
//! # Architecture
//!
//! ```text
//!  Reference CSV ──► DatasetIndex (built once, read-only)
//!                         │
//!                         │  exact lookup + first-char buckets
//!                         ▼
//! Raw OCR text ──► TextNormalizer ──► TokenMatcher ──► DosageExtractor ──► Dedup
//!                  glyph fixes        two-token       40-char window      first-seen
//!                  cleaning           exact           after the name      order
//!                  word splits        fuzzy ≥ 0.82
//! ```
//!
//! # Modules
//!
//! - [`dataset`]: CSV loading and the immutable lookup index
//! - [`models`]: Domain types (MedicineRecord, MatchedMedicine)
//! - [`extractor`]: Normalization, matching, dose extraction and dedup

pub mod dataset;
pub mod extractor;
pub mod models;

// Re-export commonly used types
pub use dataset::{DatasetError, DatasetIndex, DatasetResult};
pub use extractor::{Extraction, Extractor, TextNormalizer, TokenMatcher};
pub use models::{MatchedMedicine, MedicineRecord, DEFAULT_DOSE};
