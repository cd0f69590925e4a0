//! Theme support for the confab TUI.

mod colors;

pub use colors::Theme;
