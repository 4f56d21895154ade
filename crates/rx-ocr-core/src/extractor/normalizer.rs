//! OCR text normalizer.
//!
//! Runs an ordered list of named passes:
//! - glyph correction (`8zodon` → `Szodon`)
//! - character-class cleaning (punctuation → space)
//! - word-boundary repair (`Acyclovir800mg` → `Acyclovir 800 mg`)

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// How a pass rewrites each match.
#[derive(Debug, Clone, Copy)]
pub enum Rewrite {
    /// Expand a `$N` replacement template.
    Template(&'static str),
    /// Compute the replacement from the captures.
    With(fn(&Captures) -> String),
}

/// A single named rewrite over the whole text.
#[derive(Debug)]
pub struct NormalizationPass {
    pub name: &'static str,
    pattern: &'static Lazy<Regex>,
    rewrite: Rewrite,
}

impl NormalizationPass {
    /// Apply this pass to `text`.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.rewrite {
            Rewrite::Template(template) => self.pattern.replace_all(text, template),
            Rewrite::With(rewrite) => self.pattern.replace_all(text, |caps: &Captures| rewrite(caps)),
        }
    }
}

/// `8` opening a word, optionally separated from the next letter by spaces.
///
/// Any letter, number or `_` before the `8` makes it part of a word, so
/// `½8DOLO` is left alone; group 1 captures that character since there is no
/// look-behind. The letter class includes `İ`, `ı`, `ſ` and Kelvin `K`, which
/// fold case onto ASCII letters.
static EIGHT_AS_S: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([\p{L}\p{N}_])?8\s*([a-zA-Z\x{130}\x{131}\x{17F}\x{212A}])")
        .expect("glyph pattern is valid")
});

fn eight_as_s(caps: &Captures) -> String {
    if caps.get(1).is_some() {
        // Inside a word: keep as is
        return caps[0].to_string();
    }
    format!("S{}", &caps[2])
}

static DISALLOWED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s/.\-]").expect("class pattern is valid"));

static LETTERS_THEN_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z]{3,})(\d+)").expect("split pattern is valid"));

static DIGITS_THEN_LETTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)([a-zA-Z]{2,})").expect("split pattern is valid"));

/// Misread `S` at the start of a drug-like word.
pub static GLYPH_CORRECTION: NormalizationPass = NormalizationPass {
    name: "glyph-correction",
    pattern: &EIGHT_AS_S,
    rewrite: Rewrite::With(eight_as_s),
};

/// Everything but letters, digits, whitespace, `/`, `.` and `-` becomes a space.
pub static CHARACTER_CLEANING: NormalizationPass = NormalizationPass {
    name: "character-cleaning",
    pattern: &DISALLOWED_CHARS,
    rewrite: Rewrite::Template(" "),
};

/// `Acyclovir800` → `Acyclovir 800`.
pub static SPLIT_NAME_FROM_NUMBER: NormalizationPass = NormalizationPass {
    name: "split-name-from-number",
    pattern: &LETTERS_THEN_DIGITS,
    rewrite: Rewrite::Template("${1} ${2}"),
};

/// `800mg` → `800 mg`.
pub static SPLIT_NUMBER_FROM_UNIT: NormalizationPass = NormalizationPass {
    name: "split-number-from-unit",
    pattern: &DIGITS_THEN_LETTERS,
    rewrite: Rewrite::Template("${1} ${2}"),
};

/// Normalizer for raw OCR text.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    passes: Vec<&'static NormalizationPass>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    /// Create a normalizer with the standard pass order.
    pub fn new() -> Self {
        Self {
            passes: vec![
                &GLYPH_CORRECTION,
                &CHARACTER_CLEANING,
                &SPLIT_NAME_FROM_NUMBER,
                &SPLIT_NUMBER_FROM_UNIT,
            ],
        }
    }

    /// Names of the passes, in the order they run.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name).collect()
    }

    /// Normalize raw OCR text.
    pub fn normalize(&self, raw: &str) -> String {
        self.passes
            .iter()
            .fold(raw.to_string(), |text, pass| pass.apply(&text).into_owned())
    }
}
