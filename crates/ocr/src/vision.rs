use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::OcrConfig;
use crate::recognizer::{OcrBackend, OcrError, OcrText};

/// Reported for every successful annotation; the service gives no overall score.
pub const VISION_CONFIDENCE: f32 = 0.8;
const LANGUAGE_HINTS: [&str; 2] = ["en", "sw"];

#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    requests: [ImageRequest<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageRequest<'a> {
    image: ImageContent,
    features: [Feature<'a>; 2],
    image_context: ImageContext<'a>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    max_results: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageContext<'a> {
    language_hints: [&'a str; 2],
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

fn annotate_body(image_bytes: &[u8]) -> AnnotateRequest<'static> {
    AnnotateRequest {
        requests: [ImageRequest {
            image: ImageContent { content: STANDARD.encode(image_bytes) },
            features: [
                Feature { kind: "TEXT_DETECTION", max_results: 1 },
                Feature { kind: "DOCUMENT_TEXT_DETECTION", max_results: 1 },
            ],
            image_context: ImageContext { language_hints: LANGUAGE_HINTS },
        }],
    }
}

/// The first annotation holds the full text block.
fn extract_text(response: AnnotateResponse) -> Result<OcrText, OcrError> {
    let first = response.responses.into_iter().next().ok_or(OcrError::NoText)?;
    if let Some(err) = first.error {
        return Err(OcrError::Engine(err.message));
    }
    let text = first
        .text_annotations
        .into_iter()
        .next()
        .map(|a| a.description)
        .filter(|t| !t.trim().is_empty())
        .ok_or(OcrError::NoText)?;
    Ok(OcrText { text, confidence: VISION_CONFIDENCE })
}

/// Google Cloud Vision `images:annotate` client.
pub struct VisionRecognizer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl VisionRecognizer {
    pub fn new(api_key: impl Into<String>, config: &OcrConfig) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/v1/images:annotate", config.base_url.trim_end_matches('/')),
        })
    }

    /// Fails with `NoCredential` when the key variable is unset; there is no
    /// local OCR to fall back to.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let key = config.api_key().ok_or(OcrError::NoCredential)?;
        Self::new(key, config)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OcrBackend for VisionRecognizer {
    async fn recognize(&self, image_bytes: &[u8]) -> Result<OcrText, OcrError> {
        tracing::debug!(bytes = image_bytes.len(), "sending image to vision service");

        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&annotate_body(image_bytes))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OcrError::Status(status.as_u16()));
        }

        let body: AnnotateResponse = resp.json().await?;
        let text = extract_text(body)?;
        tracing::debug!(chars = text.text.len(), "vision service returned text");
        Ok(text)
    }
}
