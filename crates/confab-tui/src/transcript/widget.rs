//! Transcript pane widget.
//!
//! Renders the message history: user questions, streamed answers (markdown),
//! the thinking indicator, failed-turn errors, session notices, and the
//! feedback controls row under completed answers.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, StatefulWidget, Widget},
};

use confab_engine::{BotPhase, Message, MessageKind, Transcript};

use crate::text::{render_markdown, visual_width, wrap_text};
use crate::theme::Theme;

use super::state::TranscriptView;
use super::{FeedbackControl, Flash};

/// Indent for message bodies under their header line.
const BODY_INDENT: &str = "  ";

/// Animated thinking indicator frames, cycled by tick.
const THINKING_FRAMES: [&str; 3] = ["\u{25cf}", "\u{25cf} \u{25cf}", "\u{25cf} \u{25cf} \u{25cf}"];

/// Transcript pane widget.
pub struct TranscriptPane<'a> {
    transcript: &'a Transcript,
    theme: &'a Theme,
    focused: bool,
    tick: usize,
    flash: Option<Flash>,
}

impl<'a> TranscriptPane<'a> {
    /// Create a transcript pane.
    pub fn new(transcript: &'a Transcript, theme: &'a Theme) -> Self {
        Self {
            transcript,
            theme,
            focused: false,
            tick: 0,
            flash: None,
        }
    }

    /// Set whether the pane is focused.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set the animation tick.
    #[must_use]
    pub fn tick(mut self, tick: usize) -> Self {
        self.tick = tick;
        self
    }

    /// Set the active feedback-control highlight, if any.
    #[must_use]
    pub fn flash(mut self, flash: Option<Flash>) -> Self {
        self.flash = flash;
        self
    }

    fn header_line(&self, message: &Message, selected: bool) -> Line<'static> {
        let marker = if selected && self.focused {
            "\u{25b8} " // ▸
        } else {
            "  "
        };
        let (symbol, name, color) = match &message.kind {
            MessageKind::User(_) => ("\u{203a}", "you", self.theme.user), // ›
            MessageKind::Bot { .. } => ("\u{25cf}", "confab", self.theme.bot), // ●
            MessageKind::Notice(_) => ("!", "notice", self.theme.warning),
        };

        Line::from(vec![
            Span::styled(marker.to_string(), Style::default().fg(self.theme.primary)),
            Span::styled(message.time_str(), Style::default().fg(self.theme.muted)),
            Span::raw("  "),
            Span::styled(
                format!("{symbol} {name}"),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ])
    }

    fn body_lines(&self, message: &Message, width: usize) -> Vec<Line<'static>> {
        let body_width = width.saturating_sub(BODY_INDENT.len());
        match &message.kind {
            MessageKind::User(text) => plain_lines(text, body_width, self.theme.text),
            MessageKind::Notice(text) => wrap_text(text, body_width)
                .into_iter()
                .map(|l| {
                    indented(Span::styled(
                        l,
                        Style::default()
                            .fg(self.theme.warning)
                            .add_modifier(Modifier::ITALIC),
                    ))
                })
                .collect(),
            MessageKind::Bot { text, phase } => match phase {
                BotPhase::Thinking => {
                    let frame = THINKING_FRAMES[self.tick % THINKING_FRAMES.len()];
                    vec![indented(Span::styled(
                        frame.to_string(),
                        Style::default().fg(self.theme.muted),
                    ))]
                }
                BotPhase::Failed => plain_lines(text, body_width, self.theme.error),
                BotPhase::Streaming | BotPhase::Complete => {
                    if text.is_empty() {
                        vec![indented(Span::styled(
                            "(no answer)".to_string(),
                            Style::default().fg(self.theme.muted),
                        ))]
                    } else {
                        render_markdown(text, body_width, self.theme)
                            .into_iter()
                            .map(|line| {
                                let mut spans = vec![Span::raw(BODY_INDENT.to_string())];
                                spans.extend(line.spans);
                                Line::from(spans)
                            })
                            .collect()
                    }
                }
            },
        }
    }

    /// Build the feedback controls row for a completed answer.
    fn feedback_line(&self, message: &Message, selected: bool) -> Line<'static> {
        let base = Style::default().fg(if selected && self.focused {
            self.theme.subtext
        } else {
            self.theme.muted
        });

        let control_style = |control: FeedbackControl, color| {
            let flashed = self
                .flash
                .is_some_and(|f| f.message_id == message.id && f.control == control);
            if flashed {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else {
                base
            }
        };

        Line::from(vec![
            Span::raw(BODY_INDENT.to_string()),
            Span::styled(
                "[u] helpful".to_string(),
                control_style(FeedbackControl::Helpful, self.theme.success),
            ),
            Span::styled("  ".to_string(), base),
            Span::styled(
                "[d] unhelpful".to_string(),
                control_style(FeedbackControl::Unhelpful, self.theme.error),
            ),
            Span::styled("  ".to_string(), base),
            Span::styled(
                "[y] copy".to_string(),
                control_style(FeedbackControl::Copy, self.theme.info),
            ),
        ])
    }

    fn render_intro(&self, inner: Rect, buf: &mut Buffer) {
        let lines: Vec<Line<'_>> = [
            "Welcome to confab.",
            "",
            "Ask anything about your documents.",
            "Press ctrl+b for sample questions.",
        ]
        .iter()
        .map(|l| {
            Line::from(Span::styled(
                *l,
                Style::default().fg(self.theme.muted),
            ))
            .centered()
        })
        .collect();

        #[allow(clippy::cast_possible_truncation)]
        let top = inner.y + inner.height.saturating_sub(lines.len() as u16) / 2;
        let area = Rect::new(
            inner.x,
            top,
            inner.width,
            (lines.len() as u16).min(inner.height),
        );
        Paragraph::new(lines).render(area, buf);
    }
}

impl StatefulWidget for TranscriptPane<'_> {
    type State = TranscriptView;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let border_style = if self.focused {
            Style::default().fg(self.theme.border_focused)
        } else {
            Style::default().fg(self.theme.border)
        };
        let block = Block::default()
            .title(" Transcript ")
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(self.theme.base));

        let inner = block.inner(area);
        block.render(area, buf);
        state.feedback_anchor = None;
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        if self.transcript.is_empty() {
            self.render_intro(inner, buf);
            state.apply_layout(0, inner.height as usize, None);
            return;
        }

        // Lay out every message into lines, tracking where each block starts
        // and where the selected message's feedback row lands.
        let width = inner.width as usize;
        let selected_idx = state.selected();
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut selected_range = None;
        let mut selected_feedback_row = None;

        for (idx, message) in self.transcript.messages().iter().enumerate() {
            let selected = selected_idx == Some(idx);
            let start = lines.len();

            lines.push(self.header_line(message, selected));
            lines.extend(self.body_lines(message, width));
            if message.feedback_available() {
                if selected {
                    selected_feedback_row = Some(lines.len());
                }
                lines.push(self.feedback_line(message, selected));
            }
            lines.push(Line::from(""));

            if selected {
                selected_range = Some((start, lines.len() - start));
            }
        }

        let viewport = inner.height as usize;
        let scroll = state.apply_layout(lines.len(), viewport, selected_range);

        let visible: Vec<Line<'static>> = lines
            .into_iter()
            .skip(scroll)
            .take(viewport)
            .collect();
        Paragraph::new(visible).render(inner, buf);

        // Tooltip anchor for the selected answer's controls, if on screen.
        if let Some(row) = selected_feedback_row {
            if row >= scroll && row < scroll + viewport {
                #[allow(clippy::cast_possible_truncation)]
                let y = inner.y + (row - scroll) as u16;
                state.feedback_anchor = Some(Rect::new(
                    inner.x + BODY_INDENT.len() as u16,
                    y,
                    inner.width.saturating_sub(BODY_INDENT.len() as u16),
                    1,
                ));
            }
        }

        // Jump hint when scrolled away from the latest messages.
        if state.has_more_below() {
            let hint = " \u{2193} G latest ";
            #[allow(clippy::cast_possible_truncation)]
            let hint_width = visual_width(hint) as u16;
            if hint_width < inner.width {
                buf.set_stringn(
                    inner.x + inner.width - hint_width,
                    inner.y + inner.height - 1,
                    hint,
                    hint_width as usize,
                    Style::default().fg(self.theme.base).bg(self.theme.primary),
                );
            }
        }
    }
}

fn indented(span: Span<'static>) -> Line<'static> {
    Line::from(vec![Span::raw(BODY_INDENT.to_string()), span])
}

fn plain_lines(
    text: &str,
    width: usize,
    color: ratatui::style::Color,
) -> Vec<Line<'static>> {
    text.lines()
        .flat_map(|raw| {
            if raw.is_empty() {
                vec![String::new()]
            } else {
                wrap_text(raw, width)
            }
        })
        .map(|l| indented(Span::styled(l, Style::default().fg(color))))
        .collect()
}
