//! Application state and update logic for the confab TUI.
//!
//! [`App`] owns the transcript, the input, and all transient UI state. It
//! never performs I/O itself: submissions and feedback are queued as
//! [`Outbound`] work for the runtime loop to spawn, and results come back
//! through the [`UiUpdate`] channel drained on ticks. That keeps every state
//! transition testable without a terminal or a server.

use tokio::sync::mpsc;
use tracing::{error, warn};

use confab_engine::{AnswerFrame, ClientConfig, Feedback, Message, Transcript, TurnId};

use crate::clipboard;
use crate::event::Action;
use crate::theme::Theme;
use crate::transcript::{FeedbackControl, Flash, TranscriptView};
use crate::widgets::{InputState, Tooltip};

/// Alert shown when the server answers feedback with `success: false`.
pub const FEEDBACK_REJECTED_ALERT: &str = "Failed to store feedback. Please try again.";

/// Alert shown when the feedback request fails outright.
pub const FEEDBACK_FAILED_ALERT: &str = "An error occurred while storing feedback.";

const TOOLTIP_THANKS: &str = "Thanks for your feedback!";
const TOOLTIP_COPIED: &str = "Copied to clipboard!";

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Transcript,
    Menu,
}

/// Results delivered back to the UI from spawned tasks.
#[derive(Debug)]
pub enum UiUpdate {
    /// A decoded frame arrived for a turn.
    Frame { turn: TurnId, frame: AnswerFrame },
    /// A turn's answer stream ended normally.
    StreamClosed { turn: TurnId },
    /// A turn's request or stream failed.
    StreamFailed { turn: TurnId, error: String },
    /// A feedback submission failed.
    FeedbackFailed { alert: String },
}

/// Network work queued by state transitions, spawned by the runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Ask a question and stream the answer into `turn`.
    Ask { turn: TurnId, question: String },
    /// Submit feedback for a completed exchange.
    Feedback {
        question: String,
        answer: String,
        feedback: Feedback,
    },
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Which pane has keyboard focus.
    pub focus: Focus,

    /// Whether the side menu is open.
    pub menu_open: bool,

    /// Selected sample question in the side menu.
    pub menu_selected: usize,

    /// Tick counter for animations and expirations.
    pub tick: usize,

    /// Client configuration.
    pub config: ClientConfig,

    /// Active color theme.
    pub theme: Theme,

    /// The chat transcript.
    pub transcript: Transcript,

    /// Transcript scroll/selection state.
    pub view: TranscriptView,

    /// Question input state.
    pub input: InputState,

    /// Active confirmation tooltip, if any.
    pub tooltip: Option<Tooltip>,

    /// Active feedback-control highlight, if any.
    pub flash: Option<Flash>,

    /// Blocking alert text, if any. Dismissed by the next key.
    pub alert: Option<String>,

    /// Number of answer streams currently in flight.
    turns_in_flight: usize,

    /// Queued network work for the runtime loop.
    pending: Vec<Outbound>,

    update_tx: mpsc::UnboundedSender<UiUpdate>,
    update_rx: mpsc::UnboundedReceiver<UiUpdate>,
}

impl App {
    /// Create a new app instance.
    pub fn new(config: ClientConfig, theme: Theme) -> Self {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let transcript = Transcript::new(config.session_limit);

        Self {
            should_quit: false,
            focus: Focus::Input,
            menu_open: false,
            menu_selected: 0,
            tick: 0,
            config,
            theme,
            transcript,
            view: TranscriptView::new(),
            input: InputState::new(),
            tooltip: None,
            flash: None,
            alert: None,
            turns_in_flight: 0,
            pending: Vec::new(),
            update_tx,
            update_rx,
        }
    }

    /// Sender for delivering task results back to this app.
    pub fn update_sender(&self) -> mpsc::UnboundedSender<UiUpdate> {
        self.update_tx.clone()
    }

    /// Whether any answer stream is in flight.
    pub fn streaming(&self) -> bool {
        self.turns_in_flight > 0
    }

    /// Drain the queued network work.
    pub fn take_pending(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.pending)
    }

    /// The message currently selected in the transcript, if any.
    pub fn selected_message(&self) -> Option<&Message> {
        self.view
            .selected()
            .and_then(|idx| self.transcript.messages().get(idx))
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        // A blocking alert swallows the next key.
        if self.alert.is_some() {
            if action != Action::None {
                self.alert = None;
            }
            return;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::ToggleMenu => {
                self.toggle_menu();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Input => self.handle_input_focus_action(action),
            Focus::Transcript => self.handle_transcript_action(action),
            Focus::Menu => self.handle_menu_action(action),
        }
    }

    fn handle_input_focus_action(&mut self, action: Action) {
        match action {
            Action::ToggleFocus => self.focus = Focus::Transcript,
            Action::PageUp => self.view.page_up(),
            Action::PageDown => self.view.page_down(),
            _ => {}
        }
    }

    fn handle_transcript_action(&mut self, action: Action) {
        let len = self.transcript.len();
        match action {
            Action::ToggleFocus | Action::Back => self.focus = Focus::Input,
            Action::Up => self.view.select_prev(len),
            Action::Down => self.view.select_next(len),
            Action::Top => self.view.jump_to_top(),
            Action::Bottom => self.view.jump_to_latest(len),
            Action::PageUp => self.view.page_up(),
            Action::PageDown => self.view.page_down(),
            Action::Helpful => self.press_feedback(FeedbackControl::Helpful),
            Action::Unhelpful => self.press_feedback(FeedbackControl::Unhelpful),
            Action::Copy => self.press_feedback(FeedbackControl::Copy),
            _ => {}
        }
    }

    fn handle_menu_action(&mut self, action: Action) {
        match action {
            Action::Back | Action::ToggleFocus => {
                self.menu_open = false;
                self.focus = Focus::Input;
            }
            Action::Up => {
                self.menu_selected = self.menu_selected.saturating_sub(1);
            }
            Action::Down => {
                let last = self.config.sample_questions.len().saturating_sub(1);
                self.menu_selected = (self.menu_selected + 1).min(last);
            }
            Action::Select => self.ask_sample(),
            _ => {}
        }
    }

    /// Toggle the side menu open or closed.
    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
        self.focus = if self.menu_open {
            Focus::Menu
        } else {
            Focus::Input
        };
    }

    /// Submit the current input as a question.
    ///
    /// Blank or whitespace-only input is rejected and left in place.
    pub fn submit_question(&mut self) {
        if self.input.is_blank() {
            return;
        }
        let question = self.input.submit();
        self.start_turn(question);
    }

    /// Send the selected sample question and close the menu.
    fn ask_sample(&mut self) {
        let Some(question) = self.config.sample_questions.get(self.menu_selected) else {
            return;
        };
        self.input.set_content(question.clone());
        self.submit_question();
        self.menu_open = false;
        self.focus = Focus::Input;
    }

    fn start_turn(&mut self, question: String) {
        let turn = self.transcript.begin_turn(question.as_str());
        self.view.on_message_appended(self.transcript.len());
        self.turns_in_flight += 1;
        self.pending.push(Outbound::Ask { turn, question });
    }

    /// Press a feedback control on the selected message.
    ///
    /// Only completed answers respond; placeholders, streaming answers and
    /// failed turns ignore the press.
    pub fn press_feedback(&mut self, control: FeedbackControl) {
        let Some(message) = self.selected_message() else {
            return;
        };
        if !message.feedback_available() {
            return;
        }
        let message_id = message.id;
        let answer = message.text().to_string();

        self.flash = Some(Flash::new(message_id, control, self.tick));

        match control {
            FeedbackControl::Copy => match clipboard::copy_text(&answer) {
                Ok(_) => {
                    self.tooltip = Some(Tooltip::new(TOOLTIP_COPIED, self.tick));
                }
                Err(e) => {
                    warn!(error = %e, "copy failed");
                }
            },
            FeedbackControl::Helpful | FeedbackControl::Unhelpful => {
                let Some(turn) = self.transcript.turn_for_message(message_id) else {
                    return;
                };
                let Some(exchange) = self.transcript.exchange(turn) else {
                    return;
                };
                let feedback = if control == FeedbackControl::Helpful {
                    Feedback::Positive
                } else {
                    Feedback::Negative
                };
                self.pending.push(Outbound::Feedback {
                    question: exchange.question.to_string(),
                    answer: exchange.answer.to_string(),
                    feedback,
                });
                self.tooltip = Some(Tooltip::new(TOOLTIP_THANKS, self.tick));
            }
        }
    }

    /// Advance animations and expire transient UI state.
    pub fn tick(&mut self) {
        self.tick += 1;
        if self.tooltip.as_ref().is_some_and(|t| t.is_expired(self.tick)) {
            self.tooltip = None;
        }
        if self.flash.is_some_and(|f| f.is_expired(self.tick)) {
            self.flash = None;
        }
        self.process_updates();
    }

    /// Apply any task results waiting on the update channel.
    pub fn process_updates(&mut self) {
        while let Ok(update) = self.update_rx.try_recv() {
            match update {
                UiUpdate::Frame { turn, frame } => {
                    self.transcript.apply_frame(turn, &frame);
                    // A completion frame may have appended the limit notice.
                    self.view.on_message_appended(self.transcript.len());
                }
                UiUpdate::StreamClosed { turn } => {
                    self.transcript.finish_turn(turn);
                    self.turns_in_flight = self.turns_in_flight.saturating_sub(1);
                }
                UiUpdate::StreamFailed { turn, error } => {
                    error!(%error, "answer stream failed");
                    self.transcript.fail_turn(turn);
                    self.turns_in_flight = self.turns_in_flight.saturating_sub(1);
                }
                UiUpdate::FeedbackFailed { alert } => {
                    self.alert = Some(alert);
                }
            }
        }
    }
}
