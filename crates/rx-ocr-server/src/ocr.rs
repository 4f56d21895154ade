//! OCR engines that turn an image payload into text fragments.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// OCR errors.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("uploaded file is empty")]
    EmptyPayload,

    #[error("cannot identify image file")]
    UnrecognizedImage,

    #[error("failed to start OCR engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine failed: {0}")]
    EngineFailed(String),

    #[error("OCR engine timed out after {0:?}")]
    Timeout(Duration),

    #[error("OCR engine produced invalid output: {0}")]
    InvalidOutput(String),
}

pub type OcrResult<T> = Result<T, OcrError>;

/// Recognizes text in an image.
///
/// Implementations return the detected text fragments in reading order;
/// callers join them with single spaces.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Recognize the text fragments in `image`.
    async fn recognize(&self, image: &[u8]) -> OcrResult<Vec<String>>;
}

/// OCR engine backed by an external command.
///
/// The image is written to the child's stdin and every non-empty stdout line
/// becomes one fragment. With the default `tesseract stdin stdout` this is
/// the Tesseract CLI.
#[derive(Debug, Clone)]
pub struct CommandOcrEngine {
    program: String,
    args: Vec<String>,
}

impl CommandOcrEngine {
    /// Create a new command engine.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl OcrEngine for CommandOcrEngine {
    fn name(&self) -> &str {
        &self.program
    }

    async fn recognize(&self, image: &[u8]) -> OcrResult<Vec<String>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OcrError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin while stdout is drained.
        let writer = child.stdin.take().map(|mut stdin| {
            let payload = image.to_vec();
            tokio::spawn(async move {
                let result = stdin.write_all(&payload).await;
                drop(stdin);
                result
            })
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| OcrError::EngineFailed(e.to_string()))?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(error = %e, "OCR engine closed stdin early"),
                Err(e) => warn!(error = %e, "stdin writer task failed"),
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::EngineFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| OcrError::InvalidOutput(e.to_string()))?;

        Ok(split_fragments(&stdout))
    }
}

/// Split engine output into trimmed, non-empty lines.
pub fn split_fragments(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Mock engine for testing without an installed OCR engine.
#[derive(Debug, Clone)]
pub struct MockOcrEngine {
    outcome: Result<Vec<String>, String>,
    delay: Option<Duration>,
}

impl MockOcrEngine {
    /// Engine that always recognizes `fragments`.
    pub fn with_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outcome: Ok(fragments.into_iter().map(Into::into).collect()),
            delay: None,
        }
    }

    /// Engine that always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            delay: None,
        }
    }

    /// Sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl OcrEngine for MockOcrEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn recognize(&self, _image: &[u8]) -> OcrResult<Vec<String>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone().map_err(OcrError::EngineFailed)
    }
}
