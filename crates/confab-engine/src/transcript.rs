//! Transcript state machine.
//!
//! A [`Transcript`] owns the ordered list of messages in a chat session and
//! applies the streaming protocol to it: each question opens a turn with a
//! user message and a thinking placeholder, streamed frames replace the bot
//! text in place, and the end of the stream marks the answer complete so
//! feedback controls become available.
//!
//! The transcript is deliberately free of any rendering or I/O so the
//! streaming semantics can be tested headlessly.

use chrono::{DateTime, Local, Utc};

use crate::protocol::AnswerFrame;

/// Fixed text shown in place of an answer when the request or stream fails.
pub const ANSWER_ERROR_TEXT: &str = "An error occurred. Please try again later.";

/// Fixed notice appended when the server reports the session question limit.
pub const SESSION_LIMIT_NOTICE: &str =
    "You have reached the chat limit of this session. Restart confab to start a new session.";

/// Lifecycle of a bot message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotPhase {
    /// Placeholder shown before the first frame arrives.
    Thinking,
    /// At least one partial answer has been applied; more may follow.
    Streaming,
    /// The stream ended; the text is final and feedback is available.
    Complete,
    /// The request or stream failed; the text is the fixed error string.
    Failed,
}

/// Message content by speaker.
#[derive(Debug, Clone)]
pub enum MessageKind {
    /// A question typed by the user.
    User(String),
    /// An answer under construction or finished.
    Bot { text: String, phase: BotPhase },
    /// A system notice (session limit).
    Notice(String),
}

/// A single message in the transcript.
#[derive(Debug, Clone)]
pub struct Message {
    /// Unique message ID (sequential).
    pub id: u64,
    /// When the message was created (UTC).
    pub timestamp: DateTime<Utc>,
    /// Speaker and content.
    pub kind: MessageKind,
}

impl Message {
    fn new(id: u64, kind: MessageKind) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            kind,
        }
    }

    /// The timestamp formatted for display (HH:MM in local time).
    pub fn time_str(&self) -> String {
        let local: DateTime<Local> = self.timestamp.into();
        local.format("%H:%M").to_string()
    }

    /// The message text as displayed.
    pub fn text(&self) -> &str {
        match &self.kind {
            MessageKind::User(text) | MessageKind::Notice(text) => text,
            MessageKind::Bot { text, .. } => text,
        }
    }

    /// Whether this is a user message.
    pub fn is_user(&self) -> bool {
        matches!(self.kind, MessageKind::User(_))
    }

    /// The bot phase, if this is a bot message.
    pub fn bot_phase(&self) -> Option<BotPhase> {
        match &self.kind {
            MessageKind::Bot { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Whether feedback controls apply to this message.
    ///
    /// Only completed bot answers carry feedback controls; placeholders,
    /// streaming answers and failed turns never do.
    pub fn feedback_available(&self) -> bool {
        self.bot_phase() == Some(BotPhase::Complete)
    }
}

/// Handle for one question/answer turn.
///
/// Wraps the ID of the bot message the turn streams into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnId(u64);

/// A completed question/answer pair, as submitted with feedback.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub question: &'a str,
    pub answer: &'a str,
}

/// Ordered transcript of a chat session.
#[derive(Debug)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
    session_limit: u32,
    question_count: Option<u32>,
}

impl Transcript {
    /// Create an empty transcript with the given session question limit.
    pub fn new(session_limit: u32) -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
            session_limit,
            question_count: None,
        }
    }

    /// All messages in chronological order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Latest question count reported by the server, if any.
    pub fn question_count(&self) -> Option<u32> {
        self.question_count
    }

    /// Look up a message by ID.
    pub fn message(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Open a turn: append the user's question and a thinking placeholder.
    ///
    /// Returns the handle used to apply frames to this turn. The placeholder
    /// text stays empty; the thinking state is carried by [`BotPhase`].
    pub fn begin_turn(&mut self, question: impl Into<String>) -> TurnId {
        self.push(MessageKind::User(question.into()));
        let bot_id = self.push(MessageKind::Bot {
            text: String::new(),
            phase: BotPhase::Thinking,
        });
        TurnId(bot_id)
    }

    /// Apply one decoded frame to a turn.
    ///
    /// A `partial_answer` replaces the bot text (the server sends cumulative
    /// text). A completion frame records the question count and, once the
    /// session limit is reached, appends the limit notice. Frames arriving
    /// after the turn settled are ignored.
    pub fn apply_frame(&mut self, turn: TurnId, frame: &AnswerFrame) {
        if let Some(partial) = &frame.partial_answer {
            if let Some((text, phase)) = self.bot_message_mut(turn) {
                if matches!(*phase, BotPhase::Thinking | BotPhase::Streaming) {
                    text.clear();
                    text.push_str(partial);
                    *phase = BotPhase::Streaming;
                }
            }
        }

        if frame.complete {
            if let Some(count) = frame.question_count {
                self.question_count = Some(count);
                if count >= self.session_limit {
                    self.push(MessageKind::Notice(SESSION_LIMIT_NOTICE.to_string()));
                }
            }
        }
    }

    /// Mark a turn's answer complete; feedback controls become available.
    pub fn finish_turn(&mut self, turn: TurnId) {
        if let Some((_, phase)) = self.bot_message_mut(turn) {
            if matches!(*phase, BotPhase::Thinking | BotPhase::Streaming) {
                *phase = BotPhase::Complete;
            }
        }
    }

    /// Mark a turn failed, replacing whatever text it had with the fixed
    /// error string. Failed turns never gain feedback controls.
    pub fn fail_turn(&mut self, turn: TurnId) {
        if let Some((text, phase)) = self.bot_message_mut(turn) {
            if *phase != BotPhase::Complete {
                text.clear();
                text.push_str(ANSWER_ERROR_TEXT);
                *phase = BotPhase::Failed;
            }
        }
    }

    /// The turn handle for a bot message, if the ID names one.
    pub fn turn_for_message(&self, id: u64) -> Option<TurnId> {
        self.message(id)
            .filter(|m| matches!(m.kind, MessageKind::Bot { .. }))
            .map(|m| TurnId(m.id))
    }

    /// The question/answer pair for a turn's bot message.
    ///
    /// The question is the nearest user message preceding the bot message.
    pub fn exchange(&self, turn: TurnId) -> Option<Exchange<'_>> {
        let position = self.messages.iter().position(|m| m.id == turn.0)?;
        let answer = match &self.messages[position].kind {
            MessageKind::Bot { text, .. } => text.as_str(),
            _ => return None,
        };
        let question = self.messages[..position]
            .iter()
            .rev()
            .find_map(|m| match &m.kind {
                MessageKind::User(text) => Some(text.as_str()),
                _ => None,
            })?;
        Some(Exchange { question, answer })
    }

    fn push(&mut self, kind: MessageKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message::new(id, kind));
        id
    }

    fn bot_message_mut(&mut self, turn: TurnId) -> Option<(&mut String, &mut BotPhase)> {
        self.messages
            .iter_mut()
            .find(|m| m.id == turn.0)
            .and_then(|m| match &mut m.kind {
                MessageKind::Bot { text, phase } => Some((text, phase)),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: u32 = 50;

    fn notice_count(transcript: &Transcript) -> usize {
        transcript
            .messages()
            .iter()
            .filter(|m| matches!(m.kind, MessageKind::Notice(_)))
            .count()
    }

    #[test]
    fn test_begin_turn_appends_user_and_placeholder() {
        let mut transcript = Transcript::new(LIMIT);
        transcript.begin_turn("What is X?");

        assert_eq!(transcript.len(), 2);
        assert!(transcript.messages()[0].is_user());
        assert_eq!(transcript.messages()[0].text(), "What is X?");
        assert_eq!(
            transcript.messages()[1].bot_phase(),
            Some(BotPhase::Thinking)
        );
        assert_eq!(transcript.messages()[1].text(), "");
    }

    #[test]
    fn test_partial_answers_replace_not_append() {
        let mut transcript = Transcript::new(LIMIT);
        let turn = transcript.begin_turn("What is X?");

        transcript.apply_frame(turn, &AnswerFrame::partial("X is"));
        assert_eq!(transcript.messages()[1].text(), "X is");
        assert_eq!(
            transcript.messages()[1].bot_phase(),
            Some(BotPhase::Streaming)
        );

        transcript.apply_frame(turn, &AnswerFrame::partial("X is a concept."));
        assert_eq!(transcript.messages()[1].text(), "X is a concept.");
    }

    #[test]
    fn test_worked_example() {
        // input "What is X?" -> two frames -> complete answer, no notice
        let mut transcript = Transcript::new(LIMIT);
        let turn = transcript.begin_turn("What is X?");

        transcript.apply_frame(turn, &AnswerFrame::partial("X is"));
        transcript.apply_frame(
            turn,
            &AnswerFrame {
                partial_answer: Some("X is a concept.".into()),
                complete: true,
                question_count: Some(3),
            },
        );
        transcript.finish_turn(turn);

        assert_eq!(transcript.messages()[1].text(), "X is a concept.");
        assert!(transcript.messages()[1].feedback_available());
        assert_eq!(transcript.question_count(), Some(3));
        assert_eq!(notice_count(&transcript), 0);
    }

    #[test]
    fn test_limit_notice_at_threshold() {
        let mut transcript = Transcript::new(LIMIT);
        let turn = transcript.begin_turn("q");

        transcript.apply_frame(turn, &AnswerFrame::completion(50));
        assert_eq!(notice_count(&transcript), 1);
    }

    #[test]
    fn test_no_limit_notice_below_threshold() {
        let mut transcript = Transcript::new(LIMIT);
        let turn = transcript.begin_turn("q");

        transcript.apply_frame(turn, &AnswerFrame::completion(49));
        assert_eq!(notice_count(&transcript), 0);
        assert_eq!(transcript.question_count(), Some(49));
    }

    #[test]
    fn test_feedback_only_after_finish() {
        let mut transcript = Transcript::new(LIMIT);
        let turn = transcript.begin_turn("q");

        assert!(!transcript.messages()[1].feedback_available());

        transcript.apply_frame(turn, &AnswerFrame::partial("answer"));
        assert!(!transcript.messages()[1].feedback_available());

        transcript.finish_turn(turn);
        assert!(transcript.messages()[1].feedback_available());
    }

    #[test]
    fn test_failed_turn_shows_error_text_without_feedback() {
        let mut transcript = Transcript::new(LIMIT);
        let turn = transcript.begin_turn("q");

        transcript.apply_frame(turn, &AnswerFrame::partial("half an ans"));
        transcript.fail_turn(turn);

        let bot = &transcript.messages()[1];
        assert_eq!(bot.text(), ANSWER_ERROR_TEXT);
        assert_eq!(bot.bot_phase(), Some(BotPhase::Failed));
        assert!(!bot.feedback_available());
    }

    #[test]
    fn test_fail_after_complete_is_ignored() {
        let mut transcript = Transcript::new(LIMIT);
        let turn = transcript.begin_turn("q");

        transcript.apply_frame(turn, &AnswerFrame::partial("done"));
        transcript.finish_turn(turn);
        transcript.fail_turn(turn);

        assert_eq!(transcript.messages()[1].text(), "done");
        assert!(transcript.messages()[1].feedback_available());
    }

    #[test]
    fn test_frames_after_settled_turn_are_ignored() {
        let mut transcript = Transcript::new(LIMIT);
        let turn = transcript.begin_turn("q");

        transcript.apply_frame(turn, &AnswerFrame::partial("final"));
        transcript.finish_turn(turn);
        transcript.apply_frame(turn, &AnswerFrame::partial("late"));

        assert_eq!(transcript.messages()[1].text(), "final");
    }

    #[test]
    fn test_exchange_pairs_question_with_answer() {
        let mut transcript = Transcript::new(LIMIT);
        let turn = transcript.begin_turn("What is X?");
        transcript.apply_frame(turn, &AnswerFrame::partial("X is a concept."));
        transcript.finish_turn(turn);

        let exchange = transcript.exchange(turn).unwrap();
        assert_eq!(exchange.question, "What is X?");
        assert_eq!(exchange.answer, "X is a concept.");
    }

    #[test]
    fn test_concurrent_turns_update_independently() {
        let mut transcript = Transcript::new(LIMIT);
        let first = transcript.begin_turn("first");
        let second = transcript.begin_turn("second");

        transcript.apply_frame(second, &AnswerFrame::partial("answer two"));
        transcript.apply_frame(first, &AnswerFrame::partial("answer one"));

        assert_eq!(transcript.messages()[1].text(), "answer one");
        assert_eq!(transcript.messages()[3].text(), "answer two");

        let first_exchange = transcript.exchange(first).unwrap();
        assert_eq!(first_exchange.question, "first");
        assert_eq!(first_exchange.answer, "answer one");
    }

    #[test]
    fn test_finish_without_frames_completes_empty_answer() {
        let mut transcript = Transcript::new(LIMIT);
        let turn = transcript.begin_turn("q");

        transcript.finish_turn(turn);
        assert_eq!(
            transcript.messages()[1].bot_phase(),
            Some(BotPhase::Complete)
        );
        assert_eq!(transcript.messages()[1].text(), "");
    }

    #[test]
    fn test_turn_for_message() {
        let mut transcript = Transcript::new(LIMIT);
        let turn = transcript.begin_turn("q");

        let user_id = transcript.messages()[0].id;
        let bot_id = transcript.messages()[1].id;

        assert_eq!(transcript.turn_for_message(bot_id), Some(turn));
        assert_eq!(transcript.turn_for_message(user_id), None);
        assert_eq!(transcript.turn_for_message(999), None);
    }

    #[test]
    fn test_time_str_format() {
        let mut transcript = Transcript::new(LIMIT);
        transcript.begin_turn("q");
        let time_str = transcript.messages()[0].time_str();
        assert_eq!(time_str.len(), 5);
        assert!(time_str.contains(':'));
    }
}
