use std::future::Future;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 16;
const NO_SPEECH: &str = "no-speech";

/// A final recognition result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub text: String,
    pub confidence: f32,
}

impl Transcript {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self { text: text.into(), confidence }
    }
}

/// idle → recording → completed | failed. `stop()` returns to idle.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
    Completed(Transcript),
    Failed(String),
}

/// What a speech engine reports while listening.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Partial(String),
    Final(Transcript),
    /// Engine error code such as `no-speech` or `not-allowed`.
    Error(String),
    Ended,
}

/// Published on every transition.
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    Started,
    Partial(String),
    Completed(Transcript),
    Failed(String),
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecorderError {
    #[error("already recording")]
    AlreadyRecording,
    #[error("not recording")]
    NotRecording,
    #[error("recording was cancelled")]
    Cancelled,
    #[error("{0}")]
    Failed(String),
}

/// User-facing text for an engine error code.
pub fn error_message(code: &str) -> String {
    match code {
        NO_SPEECH => "No speech detected. Please try speaking again.".to_string(),
        "audio-capture" => "Microphone access denied. Please allow microphone access.".to_string(),
        "not-allowed" => "Microphone permission denied. Please enable microphone access.".to_string(),
        "network" => "Network error. Please check your internet connection.".to_string(),
        "aborted" => "Recording was cancelled.".to_string(),
        other => format!("Voice recognition error: {other}"),
    }
}

pub struct VoiceRecorder {
    state: RecorderState,
    events: broadcast::Sender<RecorderEvent>,
}

impl Default for VoiceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceRecorder {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { state: RecorderState::Idle, events }
    }

    pub fn state(&self) -> &RecorderState {
        &self.state
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecorderEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: RecorderEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn transition(&mut self, state: RecorderState, event: RecorderEvent) -> &RecorderState {
        tracing::debug!(from = ?self.state, to = ?state, "recorder transition");
        self.state = state;
        self.publish(event);
        &self.state
    }

    /// Allowed from any state except `Recording`; a finished result is discarded.
    pub fn start(&mut self) -> Result<(), RecorderError> {
        if self.state == RecorderState::Recording {
            tracing::warn!("start requested while already recording");
            return Err(RecorderError::AlreadyRecording);
        }
        self.transition(RecorderState::Recording, RecorderEvent::Started);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), RecorderError> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::NotRecording);
        }
        self.transition(RecorderState::Idle, RecorderEvent::Stopped);
        Ok(())
    }

    pub fn handle(&mut self, event: SpeechEvent) -> Result<&RecorderState, RecorderError> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::NotRecording);
        }

        let state = match event {
            SpeechEvent::Partial(text) => {
                self.publish(RecorderEvent::Partial(text));
                return Ok(&self.state);
            }
            SpeechEvent::Final(t) if t.text.trim().is_empty() => {
                let msg = error_message(NO_SPEECH);
                self.transition(RecorderState::Failed(msg.clone()), RecorderEvent::Failed(msg))
            }
            SpeechEvent::Final(t) => {
                tracing::info!(confidence = t.confidence, "voice transcript received");
                self.transition(RecorderState::Completed(t.clone()), RecorderEvent::Completed(t))
            }
            // The engine stopped without a final result.
            SpeechEvent::Ended => {
                let msg = error_message(NO_SPEECH);
                self.transition(RecorderState::Failed(msg.clone()), RecorderEvent::Failed(msg))
            }
            SpeechEvent::Error(code) => {
                tracing::warn!(code = %code, "voice recognition error");
                let msg = error_message(&code);
                self.transition(RecorderState::Failed(msg.clone()), RecorderEvent::Failed(msg))
            }
        };
        Ok(state)
    }
}

/// A speech engine yielding events until it is exhausted.
#[async_trait]
pub trait SpeechSource: Send {
    async fn next_event(&mut self) -> Option<SpeechEvent>;
}

/// Drives one recording until the source completes, fails, or `stop` resolves.
/// An exhausted source counts as `Ended`.
pub async fn capture<S, F>(
    recorder: &mut VoiceRecorder,
    source: &mut S,
    stop: F,
) -> Result<Transcript, RecorderError>
where
    S: SpeechSource + ?Sized,
    F: Future<Output = ()>,
{
    recorder.start()?;
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => {
                recorder.stop()?;
                return Err(RecorderError::Cancelled);
            }
            event = source.next_event() => {
                let event = event.unwrap_or(SpeechEvent::Ended);
                match recorder.handle(event)? {
                    RecorderState::Completed(t) => return Ok(t.clone()),
                    RecorderState::Failed(msg) => return Err(RecorderError::Failed(msg.clone())),
                    RecorderState::Recording | RecorderState::Idle => {}
                }
            }
        }
    }
}
