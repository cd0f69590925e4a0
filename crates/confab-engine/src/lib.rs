//! confab-engine: Headless engine for the confab streaming chat client
//!
//! This crate provides everything below the terminal UI:
//! - Wire types for the answer and feedback endpoints
//! - A frame decoder for the streamed answer body
//! - The HTTP client
//! - The transcript state machine that applies streamed frames to messages
//! - Configuration loading and saving

pub mod client;
pub mod config;
pub mod protocol;
pub mod stream;
pub mod transcript;

// Re-export commonly used types
pub use client::{AnswerStream, ApiClient, ClientError};
pub use config::{ClientConfig, ConfigError};
pub use protocol::{AnswerFrame, Feedback, FeedbackRequest, FeedbackResponse, QuestionRequest};
pub use stream::decode_frames;
pub use transcript::{
    BotPhase, Exchange, Message, MessageKind, Transcript, TurnId, ANSWER_ERROR_TEXT,
    SESSION_LIMIT_NOTICE,
};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
