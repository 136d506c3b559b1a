//! Voice capture as an explicit state machine, plus the confirmation
//! feedback read back to the user.

pub mod feedback;
pub mod recorder;
pub mod review;

pub use feedback::{format_amount_for_voice, voice_feedback};
pub use recorder::{
    capture, error_message, RecorderError, RecorderEvent, RecorderState, SpeechEvent, SpeechSource,
    Transcript, VoiceRecorder,
};
pub use review::{review_transcript, VoiceReview};
