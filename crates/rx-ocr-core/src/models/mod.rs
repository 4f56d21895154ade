//! Domain models for the rx-ocr system.

mod medicine;

pub use medicine::*;
