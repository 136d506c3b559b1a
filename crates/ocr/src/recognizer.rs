use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OcrError {
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR transport error: {0}")]
    Transport(String),
    #[error("OCR service returned status {0}")]
    Status(u16),
    #[error("No text detected in the image")]
    NoText,
    #[error("No OCR credential configured")]
    NoCredential,
}

impl From<reqwest::Error> for OcrError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            OcrError::Engine(e.to_string())
        } else {
            OcrError::Transport(e.to_string())
        }
    }
}

/// Recognized text plus the backend's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrText {
    pub text: String,
    pub confidence: f32,
}

/// Abstraction over an OCR backend.
/// Implementations accept encoded image bytes and return the recognized text.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    async fn recognize(&self, image_bytes: &[u8]) -> Result<OcrText, OcrError>;
}

/// Returns a preset result regardless of the image.
pub struct MockRecognizer {
    result: Result<OcrText, OcrError>,
}

impl MockRecognizer {
    pub const CONFIDENCE: f32 = 0.8;

    pub fn new(text: impl Into<String>) -> Self {
        Self { result: Ok(OcrText { text: text.into(), confidence: Self::CONFIDENCE }) }
    }

    pub fn failing(error: OcrError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl OcrBackend for MockRecognizer {
    async fn recognize(&self, _image_bytes: &[u8]) -> Result<OcrText, OcrError> {
        match &self.result {
            Ok(t) if t.text.trim().is_empty() => Err(OcrError::NoText),
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_preset_text() {
        let r = MockRecognizer::new("NAIVAS\nTotal 350");
        let out = r.recognize(b"fake image data").await.unwrap();
        assert_eq!(out.text, "NAIVAS\nTotal 350");
        assert_eq!(out.confidence, MockRecognizer::CONFIDENCE);
    }

    #[tokio::test]
    async fn blank_text_is_no_text() {
        let r = MockRecognizer::new("  \n");
        assert_eq!(r.recognize(b"").await, Err(OcrError::NoText));
    }

    #[tokio::test]
    async fn failing_mock_propagates() {
        let r = MockRecognizer::failing(OcrError::Status(403));
        assert_eq!(r.recognize(b"x").await, Err(OcrError::Status(403)));
    }
}
