use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::Theme;
use crate::ui::{Component, Handled, Result};

pub enum TextInputEvent {
    Submitted(String),
    Cancelled,
}

pub struct TextInputComponent {
    label: String,
    value: String,
    /// Cursor position in chars; byte offsets are derived on demand so
    /// multi-byte input never lands inside a char boundary.
    cursor: usize,
    placeholder: Option<String>,
}

impl TextInputComponent {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    /// Byte offset of the given char position, or the end of the string.
    fn byte_at(&self, pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(pos)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_at(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_at(self.cursor);
            self.value.remove(at);
        }
    }

    const fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_cursor_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    const fn move_cursor_start(&mut self) {
        self.cursor = 0;
    }

    fn move_cursor_end(&mut self) {
        self.cursor = self.char_count();
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        // Skip trailing spaces, then the word itself
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        let start = self.byte_at(pos);
        let end = self.byte_at(self.cursor);
        self.value.drain(start..end);
        self.cursor = pos;
    }

    fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

impl Component for TextInputComponent {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled<Self::Output>> {
        Ok(match (key.code, key.modifiers) {
            // Submit
            (KeyCode::Enter, _) => TextInputEvent::Submitted(self.value.clone()).into(),

            // Cancel
            (KeyCode::Esc, _) => TextInputEvent::Cancelled.into(),

            // Delete
            (KeyCode::Backspace, KeyModifiers::ALT) => {
                self.delete_word_before_cursor();
                Handled::Consumed
            }
            (KeyCode::Backspace, _) => {
                self.delete_char_before_cursor();
                Handled::Consumed
            }
            (KeyCode::Delete, _) => {
                self.delete_char_at_cursor();
                Handled::Consumed
            }

            // Navigation
            (KeyCode::Left, _) => {
                self.move_cursor_left();
                Handled::Consumed
            }
            (KeyCode::Right, _) => {
                self.move_cursor_right();
                Handled::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.move_cursor_start();
                Handled::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.move_cursor_end();
                Handled::Consumed
            }

            // Clear line
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear_line();
                Handled::Consumed
            }

            // Character input
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                Handled::Consumed
            }

            _ => Handled::Consumed, // Consume all keys to prevent propagation
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        // Calculate centered popup area - smaller for single input
        let popup_area = area.centered(Constraint::Percentage(50), Constraint::Length(5));

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        // Create the input line with cursor
        let (before_cursor, after_cursor) = self.value.split_at(self.byte_at(self.cursor));

        let cursor_char = after_cursor.chars().next().unwrap_or(' ');
        let after_cursor_rest: String = after_cursor.chars().skip(1).collect();

        let input_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);
        let placeholder_style = Style::default().fg(theme.overlay0());

        let line = if self.value.is_empty()
            && let Some(placeholder) = &self.placeholder
        {
            // Show placeholder with cursor at start
            Line::from(vec![
                Span::styled(" ", cursor_style),
                Span::styled(placeholder.clone(), placeholder_style),
            ])
        } else {
            Line::from(vec![
                Span::styled(before_cursor.to_string(), input_style),
                Span::styled(cursor_char.to_string(), cursor_style),
                Span::styled(after_cursor_rest, input_style),
            ])
        };

        let title = format!(" {} (Enter to confirm, Esc to cancel) ", self.label);
        let block = Block::default()
            .title(title)
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.lavender()))
            .style(Style::default().bg(theme.base()));

        let paragraph = Paragraph::new(line).block(block);

        frame.render_widget(paragraph, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut TextInputComponent, s: &str) {
        for c in s.chars() {
            input.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_typing_and_submit() {
        let mut input = TextInputComponent::new("Realm name");
        type_str(&mut input, "staging");

        let handled = input.handle_key(key(KeyCode::Enter)).unwrap();
        match handled {
            Handled::Event(TextInputEvent::Submitted(value)) => assert_eq!(value, "staging"),
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_cursor_editing() {
        let mut input = TextInputComponent::new("Group name");
        type_str(&mut input, "develpers");

        // Fix the typo: move left over "ers", insert 'o'
        for _ in 0..3 {
            input.handle_key(key(KeyCode::Left)).unwrap();
        }
        input.handle_key(key(KeyCode::Char('o'))).unwrap();
        assert_eq!(input.value(), "developers");
    }

    #[test]
    fn test_clear_line() {
        let mut input = TextInputComponent::new("Name");
        type_str(&mut input, "something");
        input
            .handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_multibyte_input() {
        let mut input = TextInputComponent::new("New realm");
        type_str(&mut input, "é");
        type_str(&mut input, "x");
        assert_eq!(input.value(), "éx");

        input.handle_key(key(KeyCode::Backspace)).unwrap();
        input.handle_key(key(KeyCode::Backspace)).unwrap();
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_multibyte_cursor_editing() {
        let mut input = TextInputComponent::new("Group name");
        type_str(&mut input, "naïve");

        // Insert between the multi-byte char and 'v'
        input.handle_key(key(KeyCode::Left)).unwrap();
        input.handle_key(key(KeyCode::Left)).unwrap();
        input.handle_key(key(KeyCode::Char('x'))).unwrap();
        assert_eq!(input.value(), "naïxve");

        input.handle_key(key(KeyCode::End)).unwrap();
        input
            .handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::ALT))
            .unwrap();
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_cancel() {
        let mut input = TextInputComponent::new("Name");
        let handled = input.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(matches!(handled, Handled::Event(TextInputEvent::Cancelled)));
    }
}
