//! Bottom status bar with contextual key hints.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::app::Focus;
use crate::text::visual_width;
use crate::theme::Theme;

/// Single-line status bar.
pub struct StatusBar<'a> {
    focus: Focus,
    streaming: bool,
    question_count: Option<u32>,
    session_limit: u32,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Create a status bar for the current focus.
    pub fn new(focus: Focus, theme: &'a Theme) -> Self {
        Self {
            focus,
            streaming: false,
            question_count: None,
            session_limit: 0,
            theme,
        }
    }

    /// Set whether any answer stream is in flight.
    #[must_use]
    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Set the session usage shown on the right.
    #[must_use]
    pub fn session(mut self, question_count: Option<u32>, session_limit: u32) -> Self {
        self.question_count = question_count;
        self.session_limit = session_limit;
        self
    }

    fn hints(&self) -> &'static str {
        match self.focus {
            Focus::Input => {
                "enter send \u{b7} shift+enter newline \u{b7} tab transcript \u{b7} ctrl+b menu \u{b7} ctrl+c quit"
            }
            Focus::Transcript => {
                "\u{2191}/\u{2193} select \u{b7} u helpful \u{b7} d unhelpful \u{b7} y copy \u{b7} G latest \u{b7} tab input"
            }
            Focus::Menu => "\u{2191}/\u{2193} choose \u{b7} enter ask \u{b7} esc close",
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let mut spans = vec![Span::styled(
            self.hints(),
            Style::default().fg(self.theme.muted),
        )];
        if self.streaming {
            spans.push(Span::styled(
                "  \u{25cf} streaming",
                Style::default().fg(self.theme.secondary),
            ));
        }
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(self.theme.surface))
            .render(area, buf);

        // Right-aligned session usage.
        if let Some(count) = self.question_count {
            let usage = format!("{count}/{}", self.session_limit);
            let width = visual_width(&usage);
            if (width as u16) < area.width {
                #[allow(clippy::cast_possible_truncation)]
                let x = area.x + area.width - width as u16;
                buf.set_stringn(
                    x,
                    area.y,
                    &usage,
                    width,
                    Style::default().fg(self.theme.subtext).bg(self.theme.surface),
                );
            }
        }
    }
}
