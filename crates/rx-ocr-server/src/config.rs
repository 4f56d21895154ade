//! Server configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Rx-OCR server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Reference medicine dataset (CSV)
    pub dataset_path: PathBuf,
    /// OCR engine executable
    pub ocr_command: String,
    /// Arguments passed to the OCR engine
    pub ocr_args: Vec<String>,
    /// Upper bound on one OCR call
    pub ocr_timeout: Duration,
    /// Request body limit for uploads
    pub max_upload_bytes: usize,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8001,
            dataset_path: PathBuf::from("A_Z_medicines_dataset_of_India.csv"),
            ocr_command: "tesseract".to_string(),
            ocr_args: vec!["stdin".to_string(), "stdout".to_string()],
            ocr_timeout: Duration::from_secs(30),
            max_upload_bytes: 10 * 1024 * 1024,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source (useful for testing).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            bind_address: lookup("RX_OCR_BIND").unwrap_or(defaults.bind_address),
            port: lookup("RX_OCR_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            dataset_path: lookup("RX_OCR_DATASET")
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_path),
            ocr_command: lookup("RX_OCR_ENGINE").unwrap_or(defaults.ocr_command),
            ocr_args: lookup("RX_OCR_ENGINE_ARGS")
                .map(|args| args.split_whitespace().map(str::to_string).collect())
                .unwrap_or(defaults.ocr_args),
            ocr_timeout: lookup("RX_OCR_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.ocr_timeout),
            max_upload_bytes: lookup("RX_OCR_MAX_UPLOAD_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_json: lookup("RX_OCR_LOG_JSON")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.log_json),
        }
    }

    /// `bind_address:port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.listen_addr(), "0.0.0.0:8001");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("RX_OCR_PORT", "9000"),
            ("RX_OCR_DATASET", "/data/meds.csv"),
            ("RX_OCR_ENGINE", "/usr/bin/tesseract"),
            ("RX_OCR_ENGINE_ARGS", "stdin stdout --psm 6"),
            ("RX_OCR_TIMEOUT_SECS", "5"),
            ("RX_OCR_LOG_JSON", "true"),
        ]));

        assert_eq!(config.port, 9000);
        assert_eq!(config.dataset_path, PathBuf::from("/data/meds.csv"));
        assert_eq!(config.ocr_command, "/usr/bin/tesseract");
        assert_eq!(config.ocr_args, ["stdin", "stdout", "--psm", "6"]);
        assert_eq!(config.ocr_timeout, Duration::from_secs(5));
        assert!(config.log_json);
    }

    #[test]
    fn test_unparseable_numbers_fall_back() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("RX_OCR_PORT", "eighty"),
            ("RX_OCR_TIMEOUT_SECS", "-1"),
        ]));
        assert_eq!(config.port, 8001);
        assert_eq!(config.ocr_timeout, Duration::from_secs(30));
    }
}
