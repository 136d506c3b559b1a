//! Remote-assisted parsing of voice notes and receipt text.
//!
//! Every entry point degrades to the deterministic parsers in
//! `tradetracker-parse` when the completion service is missing, slow,
//! failing or returns something unusable.

pub mod client;
pub mod config;
pub mod parser;
pub mod prompt;
pub mod reply;

pub use client::{CompletionError, CompletionRequest, CompletionService, OpenAiCompleter};
pub use config::AssistConfig;
pub use parser::{AssistOutcome, AssistedParser, FallbackReason};
