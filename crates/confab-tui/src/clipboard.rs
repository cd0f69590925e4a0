//! Clipboard access with a terminal fallback.
//!
//! Copy goes through the system clipboard (arboard). When no clipboard
//! provider is available, such as over SSH or on a headless box, the text is
//! sent as an OSC 52 escape sequence and the hosting terminal handles the
//! copy instead.

use std::io::Write;

use base64::Engine as _;
use tracing::{debug, warn};

/// How a copy was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    /// The system clipboard took the text.
    System,
    /// The text was sent to the terminal as an OSC 52 sequence.
    Terminal,
}

/// Errors from copying text.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// The OSC 52 fallback could not be written to the terminal.
    #[error("failed to write clipboard escape sequence: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Copy `text`, preferring the system clipboard.
pub fn copy_text(text: &str) -> Result<CopyMethod, ClipboardError> {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string()))
    {
        Ok(()) => {
            debug!(len = text.len(), "copied via system clipboard");
            Ok(CopyMethod::System)
        }
        Err(e) => {
            warn!(error = %e, "system clipboard unavailable, falling back to OSC 52");
            copy_via_osc52(text)?;
            Ok(CopyMethod::Terminal)
        }
    }
}

/// Send the text to the terminal's clipboard via OSC 52.
fn copy_via_osc52(text: &str) -> Result<(), std::io::Error> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    let mut stdout = std::io::stdout();
    write!(stdout, "\x1b]52;c;{encoded}\x07")?;
    stdout.flush()
}
