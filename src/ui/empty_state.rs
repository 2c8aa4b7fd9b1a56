use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::ui::Component;

/// Placeholder shown when a listing loaded successfully but has no entries.
///
/// Shows a headline, an explanation, and the key that creates the first
/// entry (when the listing supports creation).
pub struct EmptyState {
    message: String,
    instructions: String,
    primary_hint: Option<String>,
}

impl EmptyState {
    pub fn new(message: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            instructions: instructions.into(),
            primary_hint: None,
        }
    }

    pub fn with_primary_hint(mut self, hint: impl Into<String>) -> Self {
        self.primary_hint = Some(hint.into());
        self
    }
}

impl Component for EmptyState {
    type Output = ();

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut lines = vec![
            Line::styled(
                self.message.clone(),
                Style::default()
                    .fg(theme.text())
                    .add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
            Line::styled(
                self.instructions.clone(),
                Style::default().fg(theme.subtext0()),
            ),
        ];

        if let Some(hint) = &self.primary_hint {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                hint.clone(),
                Style::default().fg(theme.lavender()),
            ));
        }

        let height = lines.len() as u16;
        let area = area.centered(Constraint::Percentage(80), Constraint::Length(height));

        let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }
}
