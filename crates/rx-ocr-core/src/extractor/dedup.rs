//! Collapse repeated medicines, keeping first-seen order.

use std::collections::HashSet;

use crate::models::MatchedMedicine;

/// Keep the first occurrence of each medicine name.
///
/// The result is in order of first appearance, not sorted.
pub fn dedup_medicines(medicines: Vec<MatchedMedicine>) -> Vec<MatchedMedicine> {
    let mut seen = HashSet::new();
    medicines
        .into_iter()
        .filter(|m| seen.insert(m.name.clone()))
        .collect()
}
