//! Transcript scroll and selection state.
//!
//! Scrolling is line-based because messages have very different heights.
//! Follow mode keeps the view pinned to the bottom while answers stream in
//! (the auto-scroll behavior); any upward movement disables it, and jumping
//! to the latest message re-enables it.

use ratatui::layout::Rect;

/// Lines scrolled per mouse wheel tick.
pub const SCROLL_SPEED: usize = 3;

/// Scroll and selection state for the transcript pane.
#[derive(Debug)]
pub struct TranscriptView {
    /// First visible line.
    scroll: usize,
    /// Whether to stay pinned to the bottom as content grows.
    follow: bool,
    /// Selected message index, if any.
    selected: Option<usize>,
    /// Bring the selection into view on the next render.
    ensure_visible: bool,
    /// Total content lines at the last render.
    total_lines: usize,
    /// Viewport height at the last render.
    viewport: usize,
    /// Screen position of the selected message's feedback row, if visible.
    /// Recorded by the widget; consumed by the tooltip overlay.
    pub feedback_anchor: Option<Rect>,
}

impl Default for TranscriptView {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptView {
    /// Create a view pinned to the bottom.
    pub fn new() -> Self {
        Self {
            scroll: 0,
            follow: true,
            selected: None,
            ensure_visible: false,
            total_lines: 0,
            viewport: 0,
            feedback_anchor: None,
        }
    }

    /// Whether follow mode is on.
    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// First visible line.
    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    /// Selected message index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Move selection to the previous message. Disables follow mode.
    pub fn select_prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.follow = false;
        self.ensure_visible = true;
        self.selected = match self.selected {
            Some(0) => Some(0),
            Some(i) => Some(i - 1),
            None => Some(len - 1),
        };
    }

    /// Move selection to the next message. Stops at the last message.
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.ensure_visible = true;
        self.selected = match self.selected {
            Some(i) if i + 1 >= len => Some(len - 1),
            Some(i) => Some(i + 1),
            None => Some(0),
        };
    }

    /// Jump to the first message. Disables follow mode.
    pub fn jump_to_top(&mut self) {
        self.follow = false;
        self.scroll = 0;
        self.selected = Some(0);
        self.ensure_visible = true;
    }

    /// Jump to the latest message and re-enable follow mode.
    pub fn jump_to_latest(&mut self, len: usize) {
        self.follow = true;
        if len > 0 {
            self.selected = Some(len - 1);
        }
    }

    /// Track a newly appended message while following.
    pub fn on_message_appended(&mut self, len: usize) {
        if self.follow && len > 0 {
            self.selected = Some(len - 1);
        }
    }

    /// Scroll up by `amount` lines. Disables follow mode.
    pub fn scroll_up(&mut self, amount: usize) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(amount);
    }

    /// Scroll down by `amount` lines. Clamped at render time.
    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll += amount;
    }

    /// Scroll up by one viewport.
    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport.max(1));
    }

    /// Scroll down by one viewport.
    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport.max(1));
    }

    /// Whether content continues below the viewport (shows the jump hint).
    pub fn has_more_below(&self) -> bool {
        !self.follow && self.scroll + self.viewport < self.total_lines
    }

    /// Reconcile scroll position with the rendered layout.
    ///
    /// Called by the widget once per render with the full content height,
    /// the viewport height, and the line range of the selected message.
    /// Returns the scroll offset to draw at.
    pub(crate) fn apply_layout(
        &mut self,
        total_lines: usize,
        viewport: usize,
        selected_range: Option<(usize, usize)>,
    ) -> usize {
        self.total_lines = total_lines;
        self.viewport = viewport;

        let max_scroll = total_lines.saturating_sub(viewport);
        if self.follow {
            self.scroll = max_scroll;
        } else {
            if self.ensure_visible {
                if let Some((start, height)) = selected_range {
                    if start < self.scroll {
                        self.scroll = start;
                    } else if start + height > self.scroll + viewport {
                        self.scroll = (start + height).saturating_sub(viewport);
                    }
                }
            }
            self.scroll = self.scroll.min(max_scroll);
        }
        self.ensure_visible = false;
        self.scroll
    }
}
