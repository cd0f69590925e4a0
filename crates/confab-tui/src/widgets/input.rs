//! Multi-line question input.
//!
//! [`InputState`] owns the text and cursor; [`InputBar`] renders it. The bar
//! grows with the content (Shift+Enter inserts newlines) up to
//! [`INPUT_MAX_LINES`], and shrinks back when the input is cleared on
//! submission.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::theme::Theme;

/// Maximum visible input lines before the input scrolls internally.
pub const INPUT_MAX_LINES: u16 = 6;

/// State for the question input: content, cursor and submission history.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// The text content.
    content: String,
    /// Cursor position as a byte offset, always on a char boundary.
    cursor: usize,
    /// Previously submitted questions, oldest first.
    history: Vec<String>,
    /// Current history index (-1 = editing a fresh input).
    history_index: isize,
    /// Saved fresh input while navigating history.
    saved_input: String,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Check if the content is blank (empty or whitespace-only).
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Number of content lines (at least 1).
    pub fn line_count(&self) -> usize {
        self.content.split('\n').count().max(1)
    }

    /// Height of the input bar in terminal rows, borders included.
    #[allow(clippy::cast_possible_truncation)]
    pub fn bar_height(&self) -> u16 {
        (self.line_count() as u16).min(INPUT_MAX_LINES) + 2
    }

    /// Replace the content, placing the cursor at the end.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.len();
    }

    /// Clear the content.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        self.content.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        self.content.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if let Some(prev) = self.content[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
            self.content.remove(self.cursor);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.content.len() {
            self.content.remove(self.cursor);
        }
    }

    /// Move cursor left one character.
    pub fn move_left(&mut self) {
        if let Some(prev) = self.content[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
        }
    }

    /// Move cursor right one character.
    pub fn move_right(&mut self) {
        if let Some(next) = self.content[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    /// Move cursor to the start of the content.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to the end of the content.
    pub fn move_end(&mut self) {
        self.cursor = self.content.len();
    }

    /// Take the content as a submission, recording it in history.
    ///
    /// Clearing the content also resets the bar height.
    pub fn submit(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        if !content.trim().is_empty() {
            self.history.push(content.clone());
        }
        self.history_index = -1;
        self.saved_input.clear();
        content
    }

    /// Navigate to the previous history entry.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }

        if self.history_index == -1 {
            self.saved_input = self.content.clone();
        }

        let new_index = self.history_index + 1;
        #[allow(clippy::cast_sign_loss)]
        if (new_index as usize) < self.history.len() {
            self.history_index = new_index;
            #[allow(clippy::cast_sign_loss)]
            let entry = self.history[self.history.len() - 1 - new_index as usize].clone();
            self.set_content(entry);
        }
    }

    /// Navigate to the next history entry, restoring the fresh input at the
    /// bottom.
    pub fn history_next(&mut self) {
        if self.history_index <= 0 {
            if self.history_index == 0 {
                let saved = std::mem::take(&mut self.saved_input);
                self.set_content(saved);
            }
            self.history_index = -1;
            return;
        }

        self.history_index -= 1;
        #[allow(clippy::cast_sign_loss)]
        let entry = self.history[self.history.len() - 1 - self.history_index as usize].clone();
        self.set_content(entry);
    }

    /// Cursor line index and column (in characters) within that line.
    fn cursor_position(&self) -> (usize, usize) {
        let before = &self.content[..self.cursor];
        let line = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count());
        (line, col)
    }
}

/// The input bar widget.
pub struct InputBar<'a> {
    input: &'a InputState,
    theme: &'a Theme,
    focused: bool,
    placeholder: &'a str,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar.
    pub fn new(input: &'a InputState, theme: &'a Theme) -> Self {
        Self {
            input,
            theme,
            focused: false,
            placeholder: "Ask a question...",
        }
    }

    /// Set whether the input bar is focused.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set the placeholder text shown when empty.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Build the display lines and the line index holding the cursor.
    fn build_lines(&self) -> (Vec<Line<'static>>, usize) {
        let (cursor_line, cursor_col) = self.input.cursor_position();
        let text_style = Style::default().fg(self.theme.text);
        let prompt_style = Style::default().fg(self.theme.primary);

        let mut lines = Vec::new();
        for (line_idx, line_text) in self.input.content().split('\n').enumerate() {
            let prefix = if line_idx == 0 { "> " } else { "  " };
            let mut spans = vec![Span::styled(prefix.to_string(), prompt_style)];

            if self.focused && line_idx == cursor_line {
                let chars: Vec<char> = line_text.chars().collect();
                let before: String = chars[..cursor_col.min(chars.len())].iter().collect();
                let after: String = chars[cursor_col.min(chars.len())..].iter().collect();
                spans.push(Span::styled(before, text_style));
                spans.push(Span::styled("█".to_string(), text_style));
                spans.push(Span::styled(after, text_style));
            } else {
                spans.push(Span::styled(line_text.to_string(), text_style));
            }
            lines.push(Line::from(spans));
        }

        (lines, cursor_line)
    }
}

#[allow(clippy::cast_possible_truncation)]
impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(self.theme.border_focused)
        } else {
            Style::default().fg(self.theme.border)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner_height = area.height.saturating_sub(2) as usize;

        let paragraph = if self.input.is_empty() {
            let mut spans = vec![Span::styled("> ", Style::default().fg(self.theme.primary))];
            if self.focused {
                spans.push(Span::styled(
                    "█".to_string(),
                    Style::default().fg(self.theme.text),
                ));
            }
            spans.push(Span::styled(
                self.placeholder.to_string(),
                Style::default().fg(self.theme.muted),
            ));
            Paragraph::new(vec![Line::from(spans)]).block(block)
        } else {
            let (lines, cursor_line) = self.build_lines();
            // Keep the cursor line visible when content exceeds the bar.
            let scroll = if lines.len() <= inner_height {
                0
            } else {
                cursor_line.saturating_sub(inner_height.saturating_sub(1))
            };
            Paragraph::new(lines)
                .block(block)
                .scroll((scroll as u16, 0))
        };

        paragraph.render(area, buf);
    }
}
