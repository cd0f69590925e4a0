//! Collapsible side menu with sample questions.
//!
//! The menu toggles open and closed; while open it takes a fixed width on
//! the left of the layout and captures up/down/enter for choosing a sample
//! question to send. Nothing here is persisted.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::text::truncate_to_width;
use crate::theme::Theme;

/// Width of the open side menu in terminal cells.
pub const MENU_WIDTH: u16 = 34;

/// The side menu widget.
pub struct SideMenu<'a> {
    questions: &'a [String],
    selected: usize,
    question_count: Option<u32>,
    session_limit: u32,
    theme: &'a Theme,
}

impl<'a> SideMenu<'a> {
    /// Create a side menu over the configured sample questions.
    pub fn new(questions: &'a [String], theme: &'a Theme) -> Self {
        Self {
            questions,
            selected: 0,
            question_count: None,
            session_limit: 0,
            theme,
        }
    }

    /// Set the selected question index.
    #[must_use]
    pub fn selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }

    /// Set the session usage shown at the bottom of the menu.
    #[must_use]
    pub fn session(mut self, question_count: Option<u32>, session_limit: u32) -> Self {
        self.question_count = question_count;
        self.session_limit = session_limit;
        self
    }
}

impl Widget for SideMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Menu ")
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused));

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height < 2 {
            return;
        }

        let mut lines = vec![
            Line::from(Span::styled(
                "Sample questions",
                Style::default()
                    .fg(self.theme.subtext)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        let item_width = (inner.width as usize).saturating_sub(2);
        for (i, question) in self.questions.iter().enumerate() {
            let marker = if i == self.selected { "\u{25b8} " } else { "  " }; // ▸
            let style = if i == self.selected {
                Style::default().fg(self.theme.primary)
            } else {
                Style::default().fg(self.theme.text)
            };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(self.theme.primary)),
                Span::styled(truncate_to_width(question, item_width), style),
            ]));
        }

        if self.questions.is_empty() {
            lines.push(Line::from(Span::styled(
                "No sample questions configured",
                Style::default().fg(self.theme.muted),
            )));
        }

        Paragraph::new(lines).render(inner, buf);

        // Session usage pinned to the bottom row of the menu.
        if let Some(count) = self.question_count {
            let usage = format!("{count}/{} questions", self.session_limit);
            let y = inner.y + inner.height - 1;
            buf.set_stringn(
                inner.x,
                y,
                &usage,
                inner.width as usize,
                Style::default().fg(self.theme.muted),
            );
        }
    }
}
