//! Wrapping and width utilities for styled text.
//!
//! Answers arrive as free-form markdown and must fit the transcript pane, so
//! everything rendered there goes through these helpers. Width calculations
//! are unicode-aware (CJK and emoji take two cells).

use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Get the visual width of a string in terminal cells.
pub fn visual_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within a maximum visual width.
///
/// Appends "..." when truncation occurred. Unicode-safe: never splits a
/// character.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if visual_width(s) <= max_width {
        return s.to_string();
    }

    let target_width = max_width.saturating_sub(3);
    if target_width == 0 {
        return "...".to_string();
    }

    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.push_str("...");
    result
}

/// Wrap a plain text string to the specified width.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    textwrap::wrap(text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

/// Wrap styled lines to fit within the specified width.
///
/// Lines that exceed the width are split; span styling is preserved across
/// the break.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }

    let mut result = Vec::new();
    for line in lines {
        result.extend(wrap_line(line, width));
    }
    result
}

fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    let total_width: usize = line
        .spans
        .iter()
        .map(|s| visual_width(s.content.as_ref()))
        .sum();
    if total_width <= width {
        return vec![line];
    }

    // Flatten to characters with their styles, wrap the plain text, then
    // rebuild styled lines along the wrap points.
    let mut chars_with_styles: Vec<(char, ratatui::style::Style)> = Vec::new();
    for span in &line.spans {
        for ch in span.content.chars() {
            chars_with_styles.push((ch, span.style));
        }
    }

    let plain_text: String = chars_with_styles.iter().map(|(ch, _)| ch).collect();
    let wrapped: Vec<String> = wrap_text(&plain_text, width);

    let mut result = Vec::new();
    let mut char_idx = 0;

    for wrapped_str in wrapped {
        // textwrap trims the whitespace it breaks on; skip past it.
        while char_idx < chars_with_styles.len() {
            let (ch, _) = chars_with_styles[char_idx];
            if !wrapped_str.starts_with(ch) && ch.is_whitespace() {
                char_idx += 1;
            } else {
                break;
            }
        }

        let mut spans = Vec::new();
        let mut current_style = None;
        let mut current_text = String::new();

        for expected_char in wrapped_str.chars() {
            if char_idx >= chars_with_styles.len() {
                current_text.push(expected_char);
                continue;
            }

            let (ch, style) = chars_with_styles[char_idx];
            char_idx += 1;

            match current_style {
                None => {
                    current_style = Some(style);
                    current_text.push(ch);
                }
                Some(s) if s == style => current_text.push(ch),
                Some(s) => {
                    if !current_text.is_empty() {
                        spans.push(Span::styled(std::mem::take(&mut current_text), s));
                    }
                    current_style = Some(style);
                    current_text.push(ch);
                }
            }
        }

        if !current_text.is_empty() {
            match current_style {
                Some(s) => spans.push(Span::styled(current_text, s)),
                None => spans.push(Span::raw(current_text)),
            }
        }

        if !spans.is_empty() {
            result.push(Line::from(spans));
        }
    }

    if result.is_empty() {
        result.push(Line::from(""));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Style};

    #[test]
    fn test_visual_width() {
        assert_eq!(visual_width("hello"), 5);
        assert_eq!(visual_width(""), 0);
        // CJK characters are 2 cells wide
        assert_eq!(visual_width("你好"), 4);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 8), "hello...");
        assert_eq!(truncate_to_width("hello", 2), "...");
    }

    #[test]
    fn test_wrap_text_short() {
        assert_eq!(wrap_text("Hello", 10), vec!["Hello"]);
    }

    #[test]
    fn test_wrap_text_long() {
        let lines = wrap_text("Hello world this is a long line", 10);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= 10);
        }
    }

    #[test]
    fn test_wrap_line_preserves_style() {
        let line = Line::from(vec![
            Span::styled("Hello ", Style::default().fg(Color::Red)),
            Span::styled("world", Style::default().fg(Color::Blue)),
        ]);
        let wrapped = wrap_lines(vec![line], 100);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].spans.len(), 2);
    }

    #[test]
    fn test_wrap_lines_splits_long_line() {
        let lines = vec![
            Line::from("Short line"),
            Line::from("This is a very long line that should definitely be wrapped to fit"),
        ];
        let wrapped = wrap_lines(lines, 20);
        assert!(wrapped.len() > 2);
    }

    #[test]
    fn test_wrap_line_styled_unicode() {
        let line = Line::from(vec![
            Span::styled("Hello 🎉 ", Style::default().fg(Color::Red)),
            Span::styled("你好世界", Style::default().fg(Color::Blue)),
        ]);
        let wrapped = wrap_lines(vec![line], 10);
        assert!(!wrapped.is_empty());
        let all_text: String = wrapped
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.as_ref()))
            .collect();
        assert!(all_text.contains("🎉"));
        assert!(all_text.contains("你好"));
    }
}
