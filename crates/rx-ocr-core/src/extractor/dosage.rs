//! Dose recovery from the text following a matched name.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::models::{MatchedMedicine, DEFAULT_DOSE};

/// Characters after the name scanned for a dose.
pub const CONTEXT_WINDOW_CHARS: usize = 40;

/// End of the dose: a line break or the next drug-form word.
static DOSE_TERMINATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\r\n]|(?:\b(?:Tab|Cap|Syp|Injection)\b)").expect("terminator pattern is valid")
});

/// A number with a unit, e.g. `500 mg`, `2.5ml`, `1 tab`.
static NUMBER_WITH_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d*\.?\d+\s*(?:mg|g|mcg|ml|iu|tab|cap|caps))").expect("dose pattern is valid")
});

/// Finds the dose written after each medicine in normalized text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DosageExtractor;

impl DosageExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Fill in `dose` for every medicine.
    ///
    /// Each distinct name is searched once; repeats reuse its dose.
    pub fn fill_doses(&self, normalized: &str, medicines: &mut [MatchedMedicine]) {
        let mut doses: HashMap<String, String> = HashMap::new();
        for medicine in medicines {
            let dose = doses
                .entry(medicine.name.clone())
                .or_insert_with(|| self.extract(normalized, &medicine.name));
            medicine.dose.clone_from(dose);
        }
    }

    /// Dose for `name` taken from its first occurrence in `normalized`.
    pub fn extract(&self, normalized: &str, name: &str) -> String {
        self.context_window(normalized, name)
            .and_then(dose_from_window)
            .unwrap_or_else(|| DEFAULT_DOSE.to_string())
    }

    /// Up to [`CONTEXT_WINDOW_CHARS`] characters after the first occurrence of `name`.
    ///
    /// Matching is case-insensitive and any space in `name` also matches zero
    /// or more whitespace characters.
    pub fn context_window<'t>(&self, normalized: &'t str, name: &str) -> Option<&'t str> {
        let pattern = name_pattern(name)?;
        let found = pattern.find(normalized)?;
        let rest = &normalized[found.end()..];
        let end = rest
            .char_indices()
            .nth(CONTEXT_WINDOW_CHARS)
            .map_or(rest.len(), |(idx, _)| idx);
        Some(&rest[..end])
    }
}

fn name_pattern(name: &str) -> Option<Regex> {
    let pattern = name
        .to_lowercase()
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*");
    RegexBuilder::new(&pattern).case_insensitive(true).build().ok()
}

fn dose_from_window(window: &str) -> Option<String> {
    let after = window.trim();
    let segment = DOSE_TERMINATOR.split(after).next().unwrap_or("").trim();

    if segment.chars().any(|c| c.is_ascii_digit()) {
        return Some(segment.to_string());
    }

    NUMBER_WITH_UNIT
        .captures(after)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
