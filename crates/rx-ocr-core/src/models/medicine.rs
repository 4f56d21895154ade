//! Medicine models shared by the dataset index and the extractor.

use serde::{Deserialize, Serialize};

/// Dose reported when nothing usable follows a medicine name.
pub const DEFAULT_DOSE: &str = "As directed";

/// One entry of the reference dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicineRecord {
    /// Display name with dosage-form and unit suffixes stripped
    pub canonical_name: String,
    /// Composition fields joined with ", "
    pub uses: String,
}

impl MedicineRecord {
    /// Create a record from its canonical name and composition.
    pub fn new(canonical_name: impl Into<String>, uses: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            uses: uses.into(),
        }
    }

    /// Lowercased canonical name, used as the lookup key.
    pub fn key(&self) -> String {
        self.canonical_name.to_lowercase()
    }
}

/// A medicine recognized in a prescription.
///
/// Serializes as `{name, uses, dose}`, the shape returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchedMedicine {
    pub name: String,
    pub uses: String,
    pub dose: String,
}

impl MatchedMedicine {
    /// Create a match for a record, with the dose not yet extracted.
    pub fn from_record(record: &MedicineRecord) -> Self {
        Self {
            name: record.canonical_name.clone(),
            uses: record.uses.clone(),
            dose: DEFAULT_DOSE.to_string(),
        }
    }

    /// Whether the dose is still the fallback value.
    pub fn has_default_dose(&self) -> bool {
        self.dose == DEFAULT_DOSE
    }
}
