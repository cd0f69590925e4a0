//! Transient confirmation tooltip.
//!
//! Shown above the feedback controls of the selected answer to confirm an
//! action ("Thanks for your feedback!", "Copied to clipboard!"). Only one
//! tooltip exists at a time; triggering a new one replaces it. Expiry is
//! tick-driven rather than pointer-driven.

use ratatui::{buffer::Buffer, layout::Rect, style::Style};

use crate::text::visual_width;
use crate::theme::Theme;

/// Ticks a tooltip stays visible (2 seconds at the 250ms tick rate).
pub const TOOLTIP_TTL_TICKS: usize = 8;

/// A transient tooltip anchored to a feedback row.
#[derive(Debug, Clone)]
pub struct Tooltip {
    /// Message shown in the tooltip.
    pub text: String,
    /// Tick at which the tooltip disappears.
    pub expires_tick: usize,
}

impl Tooltip {
    /// Create a tooltip expiring [`TOOLTIP_TTL_TICKS`] after `now_tick`.
    pub fn new(text: impl Into<String>, now_tick: usize) -> Self {
        Self {
            text: text.into(),
            expires_tick: now_tick + TOOLTIP_TTL_TICKS,
        }
    }

    /// Whether the tooltip has expired at the given tick.
    pub fn is_expired(&self, tick: usize) -> bool {
        tick >= self.expires_tick
    }
}

/// Render a tooltip centered above its anchor row, clamped to the frame.
#[allow(clippy::cast_possible_truncation)]
pub fn render_tooltip(
    tooltip: &Tooltip,
    anchor: Rect,
    frame: Rect,
    theme: &Theme,
    buf: &mut Buffer,
) {
    if frame.height == 0 || frame.width == 0 {
        return;
    }

    let label = format!(" {} ", tooltip.text);
    let width = (visual_width(&label) as u16).min(frame.width);

    // One row above the anchor; fall back to the anchor row at the top edge.
    let y = if anchor.y > frame.y {
        anchor.y - 1
    } else {
        anchor.y
    };

    let centered = anchor.x + anchor.width.saturating_sub(width) / 2;
    let max_x = frame.x + frame.width - width;
    let x = centered.clamp(frame.x, max_x);

    let style = Style::default().fg(theme.text).bg(theme.overlay);
    buf.set_stringn(x, y, &label, width as usize, style);
}
