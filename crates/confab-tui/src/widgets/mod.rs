//! Shared widgets for the confab TUI.

mod input;
mod side_menu;
mod status_bar;
mod tooltip;

pub use input::{InputBar, InputState, INPUT_MAX_LINES};
pub use side_menu::{SideMenu, MENU_WIDTH};
pub use status_bar::StatusBar;
pub use tooltip::{render_tooltip, Tooltip, TOOLTIP_TTL_TICKS};
