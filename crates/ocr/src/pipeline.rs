use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use tradetracker_assist::{AssistedParser, CompletionService};
use tradetracker_core::Category;
use tradetracker_parse::{validate_receipt, ParsedReceipt, ValidationReport};

use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError, OcrText};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Outcome of one receipt scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub ocr: OcrText,
    pub receipt: ParsedReceipt,
    pub report: ValidationReport,
}

/// validate → compress → OCR → parse → validate.
pub struct ReceiptPipeline<R, C> {
    recognizer: R,
    parser: AssistedParser<C>,
}

impl<R: OcrBackend, C: CompletionService> ReceiptPipeline<R, C> {
    pub fn new(recognizer: R, parser: AssistedParser<C>) -> Self {
        Self { recognizer, parser }
    }

    pub async fn scan_file(&self, path: &Path, categories: &[Category]) -> Result<ScanResult, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.scan(&bytes, categories).await
    }

    /// Image problems and OCR failures are errors. A receipt that parses
    /// poorly is still returned, with the validation report saying why.
    pub async fn scan(&self, data: &[u8], categories: &[Category]) -> Result<ScanResult, PipelineError> {
        let image = preprocess::prepare_for_upload(data)?;
        tracing::info!(original = data.len(), compressed = image.len(), "receipt image prepared");

        let ocr = self.recognizer.recognize(&image).await.map_err(|e| {
            tracing::warn!(error = %e, "receipt OCR failed");
            e
        })?;

        Ok(self.scan_text(ocr, categories).await)
    }

    pub async fn scan_text(&self, ocr: OcrText, categories: &[Category]) -> ScanResult {
        parse_ocr_text(&self.parser, ocr, categories).await
    }
}

/// The parse and validate half of a scan, for text recognized elsewhere.
pub async fn parse_ocr_text<C: CompletionService>(
    parser: &AssistedParser<C>,
    ocr: OcrText,
    categories: &[Category],
) -> ScanResult {
    let receipt = parser.parse_receipt(&ocr.text, categories).await;
    let report = validate_receipt(&receipt);
    if !report.valid {
        tracing::info!(reasons = ?report.messages(), "receipt needs review");
    }
    ScanResult { ocr, receipt, report }
}
