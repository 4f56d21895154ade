//! Per-request prescription scanning.
//!
//! A scan validates the upload, runs OCR under a timeout, and hands the
//! joined text to the core extractor on the blocking pool. Every failure is
//! folded into the `status: "error"` envelope.

use std::sync::Arc;
use std::time::Duration;

use rx_ocr_core::{DatasetIndex, Extractor, MatchedMedicine};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::ocr::{CommandOcrEngine, OcrEngine, OcrError};
use crate::payload::{decode_image, DecodedImage};

/// Response envelope for a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScanResponse {
    Success {
        raw_text: String,
        medicines: Vec<MatchedMedicine>,
    },
    Error {
        message: String,
    },
}

impl ScanResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Liveness probe body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok(port: u16) -> Self {
        Self {
            status: "ok".to_string(),
            message: format!("OCR backend is running on port {port}"),
        }
    }
}

/// Runs OCR and medicine extraction for uploaded images.
#[derive(Clone)]
pub struct ScanService {
    index: Arc<DatasetIndex>,
    engine: Arc<dyn OcrEngine>,
    ocr_timeout: Duration,
}

impl ScanService {
    /// Create a new scan service.
    pub fn new(index: Arc<DatasetIndex>, engine: Arc<dyn OcrEngine>, ocr_timeout: Duration) -> Self {
        Self {
            index,
            engine,
            ocr_timeout,
        }
    }

    /// Build the production service: dataset from disk, command OCR engine.
    ///
    /// Blocks while the dataset loads. A missing dataset gives an empty index.
    pub fn from_config(config: &ServerConfig) -> Self {
        let index = DatasetIndex::load_or_empty(&config.dataset_path);
        let engine = CommandOcrEngine::new(config.ocr_command.clone(), config.ocr_args.clone());
        Self::new(Arc::new(index), Arc::new(engine), config.ocr_timeout)
    }

    pub fn index(&self) -> &DatasetIndex {
        &self.index
    }

    /// Scan one uploaded image.
    pub async fn scan(&self, image: &[u8]) -> ScanResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!("scan", %request_id, bytes = image.len());

        async {
            match self.run(image).await {
                Ok((raw_text, medicines)) => {
                    info!(medicines = medicines.len(), "scan complete");
                    ScanResponse::Success { raw_text, medicines }
                }
                Err(message) => {
                    error!(%message, "scan failed");
                    ScanResponse::Error { message }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, image: &[u8]) -> Result<(String, Vec<MatchedMedicine>), String> {
        // Step 1: Reject payloads that do not decode as images
        let decoded = self.decode(image).await?;
        debug!(
            format = decoded.format.mime_type(),
            width = decoded.width,
            height = decoded.height,
            "image accepted"
        );

        // Step 2: OCR
        let raw_text = self.recognize(image).await.map_err(|e| e.to_string())?;
        debug!(%raw_text, "OCR text");

        // Step 3: Extraction on the blocking pool
        let medicines = self.extract(raw_text.clone()).await?;
        debug!(?medicines, "matched medicines");

        Ok((raw_text, medicines))
    }

    /// Decode the upload on the blocking pool.
    pub async fn decode(&self, image: &[u8]) -> Result<DecodedImage, String> {
        let bytes = image.to_vec();
        tokio::task::spawn_blocking(move || decode_image(&bytes))
            .await
            .map_err(|e| format!("image decoding task failed: {e}"))?
            .map_err(|e| e.to_string())
    }

    /// Run the OCR engine and join its fragments with single spaces.
    pub async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        debug!(engine = self.engine.name(), "running OCR");
        let fragments = tokio::time::timeout(self.ocr_timeout, self.engine.recognize(image))
            .await
            .map_err(|_| OcrError::Timeout(self.ocr_timeout))??;
        Ok(fragments.join(" "))
    }

    /// Extract medicines from OCR text without blocking the runtime.
    pub async fn extract(&self, raw_text: String) -> Result<Vec<MatchedMedicine>, String> {
        let index = Arc::clone(&self.index);
        tokio::task::spawn_blocking(move || Extractor::new(&index).extract_medicines(&raw_text))
            .await
            .map_err(|e| format!("extraction task failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::MockOcrEngine;

    const PNG: &[u8] = include_bytes!("../tests/fixtures/blank.png");

    fn index() -> Arc<DatasetIndex> {
        Arc::new(DatasetIndex::build(vec![
            vec!["1", "Crocin Advance Tablet", "", "", "", "", "", "Paracetamol (500mg)", ""],
            vec!["2", "Dolo 650 Tablet", "", "", "", "", "", "Paracetamol (650mg)", ""],
        ]))
    }

    fn service(engine: MockOcrEngine) -> ScanService {
        ScanService::new(index(), Arc::new(engine), Duration::from_secs(5))
    }

    #[test]
    fn test_response_serialization() {
        let response = ScanResponse::Success {
            raw_text: "Tab Crocin".to_string(),
            medicines: Vec::new(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["raw_text"], "Tab Crocin");
        assert!(json["medicines"].as_array().unwrap().is_empty());

        let json = serde_json::to_value(ScanResponse::error("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "error", "message": "boom"}));
    }

    #[test]
    fn test_health_response() {
        let health = HealthResponse::ok(8001);
        assert_eq!(health.status, "ok");
        assert_eq!(health.message, "OCR backend is running on port 8001");
    }

    #[tokio::test]
    async fn test_scan_success() {
        let service = service(MockOcrEngine::with_fragments(["Tab Crocin Advance", "500mg 1-0-1"]));
        match service.scan(PNG).await {
            ScanResponse::Success { raw_text, medicines } => {
                assert_eq!(raw_text, "Tab Crocin Advance 500mg 1-0-1");
                assert_eq!(medicines.len(), 1);
                assert_eq!(medicines[0].name, "Crocin Advance");
                assert_eq!(medicines[0].uses, "Paracetamol (500mg)");
                assert_eq!(medicines[0].dose, "500 mg 1-0-1");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_scan_rejects_non_image() {
        let service = service(MockOcrEngine::with_fragments(["Crocin"]));
        assert_eq!(
            service.scan(b"not an image").await,
            ScanResponse::error("cannot identify image file")
        );
        assert!(!service.scan(b"").await.is_success());
    }

    #[tokio::test]
    async fn test_scan_rejects_corrupt_image_before_ocr() {
        // The engine would report text if it were ever called
        let service = service(MockOcrEngine::with_fragments(["Tab Crocin Advance 500mg"]));

        assert_eq!(
            service.scan(&PNG[..PNG.len() / 2]).await,
            ScanResponse::error("cannot identify image file")
        );
        assert_eq!(
            service.scan(b"\x89PNG\r\n\x1a\nthis is not a png at all").await,
            ScanResponse::error("cannot identify image file")
        );
        assert_eq!(service.scan(b"BM").await, ScanResponse::error("cannot identify image file"));
    }

    #[tokio::test]
    async fn test_scan_reports_engine_failure() {
        let service = service(MockOcrEngine::failing("tessdata missing"));
        assert_eq!(
            service.scan(PNG).await,
            ScanResponse::error("OCR engine failed: tessdata missing")
        );
    }

    #[tokio::test]
    async fn test_scan_times_out() {
        let engine = MockOcrEngine::with_fragments(["Crocin"]).with_delay(Duration::from_secs(10));
        let service = ScanService::new(index(), Arc::new(engine), Duration::from_millis(20));
        match service.scan(PNG).await {
            ScanResponse::Error { message } => assert!(message.contains("timed out")),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_scan_without_text() {
        let service = service(MockOcrEngine::with_fragments(Vec::<String>::new()));
        assert_eq!(
            service.scan(PNG).await,
            ScanResponse::Success {
                raw_text: String::new(),
                medicines: Vec::new(),
            }
        );
    }
}
