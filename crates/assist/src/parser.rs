use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use tradetracker_core::{Category, ParsedTransaction};
use tradetracker_parse::{parse_receipt, voice, ParsedReceipt};

use crate::client::{CompletionError, CompletionRequest, CompletionService};
use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::prompt;
use crate::reply;

/// Why a remote result was not used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FallbackReason {
    #[error("no completion credential configured")]
    NoCredential,
    #[error("completion request timed out")]
    Timeout,
    #[error("completion request aborted by caller")]
    Aborted,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service returned status {0}")]
    Status(u16),
    #[error("service returned no completion")]
    EmptyCompletion,
    #[error("reply is not valid JSON: {0}")]
    MalformedReply(String),
    #[error("reply is unusable: {0}")]
    UnusableReply(String),
}

impl From<CompletionError> for FallbackReason {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::Timeout => FallbackReason::Timeout,
            CompletionError::Transport(msg) => FallbackReason::Transport(msg),
            CompletionError::Status { status, .. } => FallbackReason::Status(status),
            CompletionError::Decode(msg) => FallbackReason::MalformedReply(msg),
            CompletionError::Empty => FallbackReason::EmptyCompletion,
        }
    }
}

/// Result of the remote stage alone: either a parsed value or the reason the
/// deterministic parser has to take over.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistOutcome<T> {
    Parsed(T),
    Fallback(FallbackReason),
}

impl<T> AssistOutcome<T> {
    fn from_result(result: Result<T, FallbackReason>) -> Self {
        match result {
            Ok(v) => AssistOutcome::Parsed(v),
            Err(reason) => AssistOutcome::Fallback(reason),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, AssistOutcome::Parsed(_))
    }

    /// The remote value, or whatever `fallback` produces.
    pub fn or_else(self, fallback: impl FnOnce(&FallbackReason) -> T) -> T {
        match self {
            AssistOutcome::Parsed(v) => v,
            AssistOutcome::Fallback(reason) => {
                match &reason {
                    FallbackReason::NoCredential => {
                        tracing::debug!("assistance offline, using pattern parser")
                    }
                    other => tracing::warn!(reason = %other, "remote parse failed, falling back"),
                }
                fallback(&reason)
            }
        }
    }
}

/// Remote-assisted parsing with a deterministic fallback. Holding `None`
/// means no credential is configured; every call then takes the offline path.
pub struct AssistedParser<C> {
    service: Option<C>,
    timeout: Duration,
}

impl<C: CompletionService> AssistedParser<C> {
    pub fn new(service: Option<C>) -> Self {
        Self { service, timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS) }
    }

    pub fn offline() -> Self {
        Self::new(None)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_online(&self) -> bool {
        self.service.is_some()
    }

    /// One outbound call, bounded by the timeout and by `abort`. Dropping the
    /// in-flight future closes the request.
    async fn complete<A>(&self, request: CompletionRequest, abort: A) -> Result<String, FallbackReason>
    where
        A: Future<Output = ()>,
    {
        let Some(service) = &self.service else {
            return Err(FallbackReason::NoCredential);
        };

        tokio::select! {
            res = tokio::time::timeout(self.timeout, service.complete(&request)) => match res {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(e)) => Err(e.into()),
                Err(_) => Err(FallbackReason::Timeout),
            },
            _ = abort => Err(FallbackReason::Aborted),
        }
    }

    pub async fn try_voice_until<A>(
        &self,
        text: &str,
        categories: &[Category],
        abort: A,
    ) -> AssistOutcome<ParsedTransaction>
    where
        A: Future<Output = ()>,
    {
        let result = match self.complete(prompt::voice_request(text, categories), abort).await {
            Ok(raw) => reply::voice_from_reply(&raw, text, categories),
            Err(reason) => Err(reason),
        };
        AssistOutcome::from_result(result)
    }

    pub async fn try_voice(&self, text: &str, categories: &[Category]) -> AssistOutcome<ParsedTransaction> {
        self.try_voice_until(text, categories, std::future::pending()).await
    }

    /// Always produces a result: remote when possible, pattern matching otherwise.
    pub async fn parse_voice(&self, text: &str, categories: &[Category]) -> ParsedTransaction {
        self.parse_voice_until(text, categories, std::future::pending()).await
    }

    pub async fn parse_voice_until<A>(&self, text: &str, categories: &[Category], abort: A) -> ParsedTransaction
    where
        A: Future<Output = ()>,
    {
        tracing::info!(online = self.is_online(), "parsing voice input");
        self.try_voice_until(text, categories, abort)
            .await
            .or_else(|_| voice::parse(text, categories))
    }

    pub async fn try_receipt_until<A>(
        &self,
        ocr_text: &str,
        categories: &[Category],
        abort: A,
    ) -> AssistOutcome<ParsedReceipt>
    where
        A: Future<Output = ()>,
    {
        let result = match self.complete(prompt::receipt_request(ocr_text, categories), abort).await {
            Ok(raw) => reply::receipt_from_reply(&raw, categories),
            Err(reason) => Err(reason),
        };
        AssistOutcome::from_result(result)
    }

    pub async fn try_receipt(&self, ocr_text: &str, categories: &[Category]) -> AssistOutcome<ParsedReceipt> {
        self.try_receipt_until(ocr_text, categories, std::future::pending()).await
    }

    pub async fn parse_receipt(&self, ocr_text: &str, categories: &[Category]) -> ParsedReceipt {
        self.parse_receipt_until(ocr_text, categories, std::future::pending()).await
    }

    pub async fn parse_receipt_until<A>(&self, ocr_text: &str, categories: &[Category], abort: A) -> ParsedReceipt
    where
        A: Future<Output = ()>,
    {
        tracing::info!(online = self.is_online(), "parsing receipt text");
        self.try_receipt_until(ocr_text, categories, abort)
            .await
            .or_else(|_| parse_receipt(ocr_text, categories))
    }
}
