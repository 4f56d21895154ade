//! Request boundary for Rx-OCR.
//!
//! Accepts prescription images over HTTP, runs them through an [`OcrEngine`]
//! and returns the medicines that [`rx_ocr_core`] finds in the recognized
//! text.

pub mod api;
pub mod config;
pub mod logging;
pub mod ocr;
pub mod payload;
pub mod service;

pub use api::{build_router, AppState, UPLOAD_FIELD};
pub use config::ServerConfig;
pub use logging::init_logging;
pub use ocr::{CommandOcrEngine, MockOcrEngine, OcrEngine, OcrError, OcrResult};
pub use payload::{decode_image, validate_image, DecodedImage, ImageFormat};
pub use service::{HealthResponse, ScanResponse, ScanService};
