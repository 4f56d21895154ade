//! Property tests for the extraction building blocks.

use std::collections::HashSet;

use proptest::prelude::*;
use rx_ocr_core::dataset::DatasetIndex;
use rx_ocr_core::extractor::{dedup_medicines, similarity, TextNormalizer};
use rx_ocr_core::{Extractor, MatchedMedicine};

fn med(name: &str) -> MatchedMedicine {
    MatchedMedicine {
        name: name.to_string(),
        uses: String::new(),
        dose: String::new(),
    }
}

proptest! {
    #[test]
    fn normalized_text_has_only_allowed_chars(raw in "\\PC{0,80}") {
        let normalized = TextNormalizer::new().normalize(&raw);
        prop_assert!(normalized.chars().all(|c| {
            c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '/' | '.' | '-')
        }), "unexpected char in {:?}", normalized);
    }

    #[test]
    fn similarity_is_a_ratio(a in "[a-z ]{0,20}", b in "[a-z ]{0,20}") {
        let score = similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn similarity_of_identical_strings_is_one(a in "[a-z0-9 ]{0,30}") {
        prop_assert_eq!(similarity(&a, &a), 1.0);
    }

    #[test]
    fn dedup_keeps_first_appearance_order(names in prop::collection::vec("[a-e]{1,2}", 0..30)) {
        let input: Vec<_> = names.iter().map(|n| med(n)).collect();
        let output = dedup_medicines(input);

        let mut seen = HashSet::new();
        let expected: Vec<&String> = names.iter().filter(|n| seen.insert(n.as_str())).collect();
        let actual: Vec<&String> = output.iter().map(|m| &m.name).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn accepted_records_round_trip(names in prop::collection::vec("[A-Za-z]{1,10}( [A-Za-z0-9]{1,4})?", 0..40)) {
        let index = DatasetIndex::build(names.iter().map(|n| {
            vec!["0", n.as_str(), "1", "false", "m", "allopathy", "strip", "comp", ""]
        }));

        for record in index.records() {
            prop_assert_eq!(index.get(&record.key()), Some(record));
        }

        let bucketed: usize = index
            .records()
            .iter()
            .filter_map(|r| r.key().chars().next())
            .collect::<HashSet<_>>()
            .into_iter()
            .map(|c| index.bucket(c).map_or(0, |b| b.len()))
            .sum();
        prop_assert_eq!(bucketed, index.len());
    }

    #[test]
    fn empty_index_never_matches(raw in "\\PC{0,80}") {
        let index = DatasetIndex::empty();
        prop_assert!(Extractor::new(&index).extract_medicines(&raw).is_empty());
    }
}
