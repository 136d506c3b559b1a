use serde::Serialize;

use tradetracker_assist::{AssistedParser, CompletionService};
use tradetracker_core::{Category, ParsedTransaction};
use tradetracker_parse::{validate, ValidationReport};

use crate::feedback::voice_feedback;
use crate::recorder::Transcript;

/// A transcript after parsing, ready for the user to confirm or retry.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceReview {
    pub transcript: Transcript,
    pub parsed: ParsedTransaction,
    pub report: ValidationReport,
    /// Confirmation sentence; only set when the result is valid.
    pub feedback: Option<String>,
}

impl VoiceReview {
    pub fn is_confirmable(&self) -> bool {
        self.report.valid
    }
}

pub async fn review_transcript<C: CompletionService>(
    parser: &AssistedParser<C>,
    transcript: Transcript,
    categories: &[Category],
) -> VoiceReview {
    let parsed = parser.parse_voice(&transcript.text, categories).await;
    let report = validate(&parsed);
    let feedback = report.valid.then(|| voice_feedback(&parsed));
    if !report.valid {
        tracing::info!(reasons = ?report.messages(), "voice result rejected");
    }
    VoiceReview { transcript, parsed, report, feedback }
}
