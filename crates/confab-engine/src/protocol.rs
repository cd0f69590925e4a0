//! Wire types for the answer service.
//!
//! The client speaks two endpoints: `POST /get_answer`, which streams the
//! answer back as `data: <json>` frames, and `POST /store_feedback`, which
//! records a rating for a completed exchange.

use serde::{Deserialize, Serialize};

/// Request body for `POST /get_answer`.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionRequest<'a> {
    /// The user's question.
    pub question: &'a str,
}

/// One decoded frame from the answer stream.
///
/// The server sends cumulative text: each `partial_answer` carries the full
/// answer-so-far, not a delta. Fields the client does not consume (the server
/// also echoes its chat history on the final frame) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerFrame {
    /// Cumulative answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_answer: Option<String>,

    /// Set on the final frame of a turn.
    #[serde(default)]
    pub complete: bool,

    /// Number of questions asked this session, reported alongside `complete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_count: Option<u32>,
}

impl AnswerFrame {
    /// Create a frame carrying only a cumulative partial answer.
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            partial_answer: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create a completion frame with the session's question count.
    pub fn completion(question_count: u32) -> Self {
        Self {
            complete: true,
            question_count: Some(question_count),
            ..Self::default()
        }
    }
}

/// Rating attached to a completed exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Positive,
    Negative,
}

/// Request body for `POST /store_feedback`.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRequest<'a> {
    /// The question that started the exchange.
    pub question: &'a str,
    /// The completed answer text.
    pub answer: &'a str,
    /// The user's rating.
    pub feedback: Feedback,
}

/// Response body from `POST /store_feedback`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackResponse {
    /// Whether the server stored the feedback.
    #[serde(default)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_request_serializes() {
        let request = QuestionRequest {
            question: "What is X?",
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"question":"What is X?"}"#);
    }

    #[test]
    fn test_answer_frame_partial_only() {
        let frame: AnswerFrame = serde_json::from_str(r#"{"partial_answer":"X is"}"#).unwrap();
        assert_eq!(frame.partial_answer.as_deref(), Some("X is"));
        assert!(!frame.complete);
        assert_eq!(frame.question_count, None);
    }

    #[test]
    fn test_answer_frame_completion() {
        let frame: AnswerFrame =
            serde_json::from_str(r#"{"complete":true,"question_count":3}"#).unwrap();
        assert!(frame.complete);
        assert_eq!(frame.question_count, Some(3));
        assert_eq!(frame.partial_answer, None);
    }

    #[test]
    fn test_answer_frame_ignores_unknown_fields() {
        // The final server frame also carries the session chat history.
        let json = r#"{"complete":true,"chat_history":[{"question":"q","answer":"a"}],"question_count":1}"#;
        let frame: AnswerFrame = serde_json::from_str(json).unwrap();
        assert!(frame.complete);
        assert_eq!(frame.question_count, Some(1));
    }

    #[test]
    fn test_feedback_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Feedback::Positive).unwrap(),
            r#""positive""#
        );
        assert_eq!(
            serde_json::to_string(&Feedback::Negative).unwrap(),
            r#""negative""#
        );
    }

    #[test]
    fn test_feedback_request_shape() {
        let request = FeedbackRequest {
            question: "What is X?",
            answer: "X is a concept.",
            feedback: Feedback::Positive,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["question"], "What is X?");
        assert_eq!(value["answer"], "X is a concept.");
        assert_eq!(value["feedback"], "positive");
    }

    #[test]
    fn test_feedback_response_defaults_to_failure() {
        let response: FeedbackResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.success);

        let response: FeedbackResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(response.success);
    }
}
