pub mod config;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod vision;

pub use config::OcrConfig;
pub use pipeline::{parse_ocr_text, PipelineError, ReceiptPipeline, ScanResult};
pub use preprocess::{compress, prepare_for_upload, validate_image, ImageIssue, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, OcrText};
pub use vision::VisionRecognizer;
