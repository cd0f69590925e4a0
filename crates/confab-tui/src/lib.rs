//! confab-tui: Terminal UI for the confab streaming chat client
//!
//! This crate provides the TUI layer for confab, including:
//! - The transcript pane with streamed answer rendering
//! - The multi-line question input
//! - Feedback controls, tooltips and the blocking alert modal
//! - The collapsible side menu with sample questions

mod app;
mod clipboard;
mod event;
#[cfg(test)]
mod test_utils;
mod text;
mod theme;
mod transcript;
mod widgets;

pub use app::{App, Focus, Outbound, UiUpdate};
pub use event::{Action, Event, EventHandler};
pub use theme::Theme;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame, Terminal,
};
use std::io::{self, stdout};
use tokio::sync::mpsc::UnboundedSender;

use confab_engine::{ApiClient, ClientConfig, ClientError};

use crate::app::{FEEDBACK_FAILED_ALERT, FEEDBACK_REJECTED_ALERT};
use crate::event::key_to_action;
use crate::text::{visual_width, wrap_text};
use crate::transcript::{TranscriptPane, SCROLL_SPEED};
use crate::widgets::{render_tooltip, InputBar, SideMenu, StatusBar, MENU_WIDTH};

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(config: ClientConfig, theme: Theme) -> Result<(), Box<dyn std::error::Error>> {
    let client = ApiClient::new(&config)?;

    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, theme);

    // Create event handler (4 Hz tick rate = 250ms)
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events, &client).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    client: &ApiClient,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => handle_key(app, key),
                Event::Mouse(mouse) => {
                    use crossterm::event::MouseEventKind;
                    match mouse.kind {
                        MouseEventKind::ScrollUp => app.view.scroll_up(SCROLL_SPEED),
                        MouseEventKind::ScrollDown => app.view.scroll_down(SCROLL_SPEED),
                        _ => {}
                    }
                }
                Event::Tick => app.tick(),
                Event::Resize(_, _) => {
                    // Terminal will handle resize automatically
                }
            }
        }

        // Spawn any network work queued by the handlers above.
        for outbound in app.take_pending() {
            spawn_outbound(client.clone(), app.update_sender(), outbound);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Dispatch a key event according to the current focus.
fn handle_key(app: &mut App, key: KeyEvent) {
    // A blocking alert swallows the next key.
    if app.alert.is_some() {
        app.handle_action(Action::Back);
        return;
    }

    if app.focus == Focus::Input {
        if let Some(action) = handle_input_key(app, key) {
            app.handle_action(action);
        }
    } else {
        app.handle_action(key_to_action(key));
    }
}

/// Handle a key while the input bar is focused.
///
/// Editing keys are consumed here; returns the action for keys that fall
/// through to the global handler. Plain Enter submits; Shift+Enter inserts a
/// newline at the cursor (Ctrl+Enter is accepted too, for terminals that do
/// not report shifted Enter).
fn handle_input_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Enter
        && (key.modifiers.contains(KeyModifiers::SHIFT)
            || key.modifiers.contains(KeyModifiers::CONTROL))
    {
        app.input.insert('\n');
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('b') => Some(Action::ToggleMenu),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Enter => {
            app.submit_question();
            None
        }
        KeyCode::Tab | KeyCode::Esc => Some(Action::ToggleFocus),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::Char(c) => {
            app.input.insert(c);
            None
        }
        KeyCode::Backspace => {
            app.input.backspace();
            None
        }
        KeyCode::Delete => {
            app.input.delete();
            None
        }
        KeyCode::Left => {
            app.input.move_left();
            None
        }
        KeyCode::Right => {
            app.input.move_right();
            None
        }
        KeyCode::Home => {
            app.input.move_home();
            None
        }
        KeyCode::End => {
            app.input.move_end();
            None
        }
        KeyCode::Up => {
            // History navigation when the input is empty.
            if app.input.is_empty() {
                app.input.history_prev();
            }
            None
        }
        KeyCode::Down => {
            if app.input.is_empty() {
                app.input.history_next();
            }
            None
        }
        _ => None,
    }
}

/// Spawn a queued network task, reporting back over the update channel.
fn spawn_outbound(client: ApiClient, tx: UnboundedSender<UiUpdate>, outbound: Outbound) {
    match outbound {
        Outbound::Ask { turn, question } => {
            tokio::spawn(async move {
                match client.ask(&question).await {
                    Ok(mut frames) => {
                        while let Some(item) = frames.next().await {
                            match item {
                                Ok(frame) => {
                                    if tx.send(UiUpdate::Frame { turn, frame }).is_err() {
                                        return;
                                    }
                                }
                                Err(e) => {
                                    let _ = tx.send(UiUpdate::StreamFailed {
                                        turn,
                                        error: e.to_string(),
                                    });
                                    return;
                                }
                            }
                        }
                        let _ = tx.send(UiUpdate::StreamClosed { turn });
                    }
                    Err(e) => {
                        let _ = tx.send(UiUpdate::StreamFailed {
                            turn,
                            error: e.to_string(),
                        });
                    }
                }
            });
        }
        Outbound::Feedback {
            question,
            answer,
            feedback,
        } => {
            tokio::spawn(async move {
                if let Err(e) = client.send_feedback(&question, &answer, feedback).await {
                    let alert = match e {
                        ClientError::FeedbackRejected => FEEDBACK_REJECTED_ALERT,
                        _ => FEEDBACK_FAILED_ALERT,
                    };
                    let _ = tx.send(UiUpdate::FeedbackFailed {
                        alert: alert.to_string(),
                    });
                }
            });
        }
    }
}

/// Draw one frame.
fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();
    let input_height = app.input.bar_height().min(area.height.saturating_sub(4));

    let [main_area, input_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(input_height),
        Constraint::Length(1),
    ])
    .areas(area);

    let transcript_area = if app.menu_open {
        let [menu_area, rest] =
            Layout::horizontal([Constraint::Length(MENU_WIDTH), Constraint::Min(1)])
                .areas(main_area);
        let menu = SideMenu::new(&app.config.sample_questions, &app.theme)
            .selected(app.menu_selected)
            .session(app.transcript.question_count(), app.config.session_limit);
        frame.render_widget(menu, menu_area);
        rest
    } else {
        main_area
    };

    let pane = TranscriptPane::new(&app.transcript, &app.theme)
        .focused(app.focus == Focus::Transcript)
        .tick(app.tick)
        .flash(app.flash);
    frame.render_stateful_widget(pane, transcript_area, &mut app.view);

    let input_bar = InputBar::new(&app.input, &app.theme).focused(app.focus == Focus::Input);
    frame.render_widget(input_bar, input_area);

    let status_bar = StatusBar::new(app.focus, &app.theme)
        .streaming(app.streaming())
        .session(app.transcript.question_count(), app.config.session_limit);
    frame.render_widget(status_bar, status_area);

    if let (Some(tooltip), Some(anchor)) = (&app.tooltip, app.view.feedback_anchor) {
        render_tooltip(tooltip, anchor, area, &app.theme, frame.buffer_mut());
    }

    if let Some(alert) = &app.alert {
        draw_alert(frame, alert, &app.theme);
    }
}

/// Draw the blocking alert modal centered over everything else.
#[allow(clippy::cast_possible_truncation)]
fn draw_alert(frame: &mut Frame<'_>, alert: &str, theme: &Theme) {
    let area = frame.area();
    if area.width < 8 || area.height < 5 {
        return;
    }

    let width = ((visual_width(alert) as u16) + 4)
        .max(24)
        .min(area.width.saturating_sub(4));
    let text_lines = wrap_text(alert, (width as usize).saturating_sub(4));
    let height = (text_lines.len() as u16 + 4).min(area.height);

    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    let rect = Rect::new(x, y, width, height);

    Clear.render(rect, frame.buffer_mut());

    let block = Block::default()
        .title(" Feedback ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.error))
        .style(Style::default().bg(theme.surface));

    let mut lines: Vec<Line<'_>> = text_lines
        .into_iter()
        .map(|l| Line::styled(l, Style::default().fg(theme.text)).centered())
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::styled("press any key", Style::default().fg(theme.muted)).centered());

    Paragraph::new(lines)
        .block(block)
        .render(rect, frame.buffer_mut());
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}


/// Key handling tests for the input bar, including the Enter contract.
#[cfg(test)]
mod input_key_tests {
    use super::*;
    use crate::test_utils::create_test_app;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shifted(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    fn type_str(app: &mut App, text: &str) {
        for ch in text.chars() {
            handle_key(app, key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn test_typing_fills_input() {
        let mut app = create_test_app();
        type_str(&mut app, "hello");
        assert_eq!(app.input.content(), "hello");
    }

    #[test]
    fn test_plain_enter_submits_and_clears() {
        let mut app = create_test_app();
        type_str(&mut app, "What is X?");

        handle_key(&mut app, key(KeyCode::Enter));

        assert!(app.input.is_empty());
        assert_eq!(app.transcript.len(), 2);
        assert!(app.transcript.messages()[0].is_user());
    }

    #[test]
    fn test_shift_enter_inserts_newline_without_submitting() {
        let mut app = create_test_app();
        type_str(&mut app, "ab");
        handle_key(&mut app, key(KeyCode::Left));

        handle_key(&mut app, shifted(KeyCode::Enter));

        // Newline lands at the cursor; nothing was submitted.
        assert_eq!(app.input.content(), "a\nb");
        assert!(app.transcript.is_empty());
        assert!(app.take_pending().is_empty());

        // The input grows with the extra line.
        assert_eq!(app.input.bar_height(), 4);
    }

    #[test]
    fn test_ctrl_enter_also_inserts_newline() {
        let mut app = create_test_app();
        type_str(&mut app, "x");
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL),
        );
        assert_eq!(app.input.content(), "x\n");
        assert!(app.transcript.is_empty());
    }

    #[test]
    fn test_enter_on_blank_input_does_nothing() {
        let mut app = create_test_app();
        type_str(&mut app, "   ");
        handle_key(&mut app, key(KeyCode::Enter));

        assert!(app.transcript.is_empty());
        assert_eq!(app.input.content(), "   ");
    }

    #[test]
    fn test_tab_moves_focus_to_transcript_and_back() {
        let mut app = create_test_app();
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Transcript);

        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Input);
    }

    #[test]
    fn test_ctrl_c_quits_from_input() {
        let mut app = create_test_app();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_b_opens_menu_from_input() {
        let mut app = create_test_app();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('b'), KeyModifiers::CONTROL),
        );
        assert!(app.menu_open);
        assert_eq!(app.focus, Focus::Menu);
    }

    #[test]
    fn test_any_key_dismisses_alert() {
        let mut app = create_test_app();
        app.alert = Some("Failed to store feedback. Please try again.".into());

        handle_key(&mut app, key(KeyCode::Char('x')));
        assert!(app.alert.is_none());
        // The key did not leak into the input.
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_history_recall_with_arrow_keys() {
        let mut app = create_test_app();
        type_str(&mut app, "first question");
        handle_key(&mut app, key(KeyCode::Enter));

        handle_key(&mut app, key(KeyCode::Up));
        assert_eq!(app.input.content(), "first question");

        handle_key(&mut app, key(KeyCode::Down));
        assert_eq!(app.input.content(), "");
    }
}
