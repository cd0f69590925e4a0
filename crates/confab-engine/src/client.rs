//! HTTP client for the answer service.
//!
//! [`ApiClient`] wraps a shared [`reqwest::Client`] and speaks the two
//! endpoints of the service: a streaming ask and a fire-and-forget feedback
//! submission. There is no retry or backoff; a failed request surfaces
//! immediately and the caller decides what to show.

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use tracing::debug;

use crate::config::ClientConfig;
use crate::protocol::{AnswerFrame, Feedback, FeedbackRequest, FeedbackResponse, QuestionRequest};
use crate::stream::decode_frames;

/// Boxed stream of decoded answer frames for one turn.
pub type AnswerStream = Pin<Box<dyn Stream<Item = Result<AnswerFrame, ClientError>> + Send>>;

/// Errors from talking to the answer service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (connect, DNS, invalid URL, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// The answer stream broke mid-turn.
    #[error("answer stream failed: {0}")]
    Stream(String),

    /// The server refused to store the feedback.
    #[error("feedback was not accepted by the server")]
    FeedbackRejected,
}

/// Client for the answer service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// The timeout covers connection establishment only; streamed answer
    /// bodies are unbounded in duration.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The configured server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Ask a question, returning the stream of answer frames.
    ///
    /// A non-success status fails the whole turn before any frame is
    /// yielded; mid-stream transport errors surface as stream items.
    pub async fn ask(&self, question: &str) -> Result<AnswerStream, ClientError> {
        debug!(question_len = question.len(), "asking question");

        let response = self
            .http
            .post(self.endpoint("get_answer"))
            .json(&QuestionRequest { question })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        Ok(Box::pin(decode_frames(Box::pin(response.bytes_stream()))))
    }

    /// Submit feedback for a completed exchange.
    ///
    /// Returns an error both for transport failures and for a server
    /// response with `success: false`.
    pub async fn send_feedback(
        &self,
        question: &str,
        answer: &str,
        feedback: Feedback,
    ) -> Result<(), ClientError> {
        debug!(?feedback, "submitting feedback");

        let response = self
            .http
            .post(self.endpoint("store_feedback"))
            .json(&FeedbackRequest {
                question,
                answer,
                feedback,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body: FeedbackResponse = response.json().await?;
        if body.success {
            Ok(())
        } else {
            Err(ClientError::FeedbackRejected)
        }
    }
}
