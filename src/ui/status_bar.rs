use crate::Theme;
use crate::config::{GlobalAction, KeyResolver, NavAction};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use std::sync::Arc;

/// ASCII art logo for the status bar.
const LOGO: &[&str] = &[
    r#"   .-----.            "#,
    r#"   | o o |   zZ       "#,
    r#"   |  ~  |-.          "#,
    r#"   '-----'  )         "#,
    r#"    /|key|\           "#,
    r#"   lazyrealm          "#,
];

pub struct Keybinding {
    pub key: String,
    pub description: String,
    /// Whether this keybinding should be shown in the hints area.
    pub hint: bool,
}

impl Keybinding {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            hint: false,
        }
    }

    /// Create a keybinding that is also shown as a hint in the status bar.
    pub fn hint(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            hint: true,
        }
    }
}

pub struct StatusBarView {
    server: Option<String>,
    realm: Option<String>,
    resolver: Arc<KeyResolver>,
}

impl StatusBarView {
    pub fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            server: None,
            realm: None,
            resolver,
        }
    }

    pub fn set_server(&mut self, server: impl Into<String>) {
        self.server = Some(server.into());
    }

    pub fn set_realm(&mut self, realm: impl Into<String>) {
        self.realm = Some(realm.into());
    }

    pub fn clear_realm(&mut self) {
        self.realm = None;
    }

    pub fn render_with_keybindings(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
    ) {
        // Draw outer block
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface1()));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        // Split into three columns: status (left), keybindings (middle), logo (right)
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(24), // Left: connection info
                Constraint::Min(30),    // Middle: keybindings (flexible)
                Constraint::Length(24), // Right: logo
            ])
            .split(inner_area);

        self.render_connection_info(frame, chunks[0], theme);
        self.render_keybindings(frame, chunks[1], theme, local_keybindings);
        self.render_logo(frame, chunks[2], theme);
    }

    fn render_connection_info(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let max_width = (area.width as usize).saturating_sub(1);
        let mut lines = vec![Line::from(Span::styled(
            "Server",
            Style::default()
                .fg(theme.subtext0())
                .add_modifier(Modifier::BOLD),
        ))];

        match &self.server {
            Some(server) => lines.push(Line::from(Span::styled(
                truncate_str(server, max_width),
                Style::default().fg(theme.blue()),
            ))),
            None => lines.push(Line::from(Span::styled(
                "Not connected",
                Style::default().fg(theme.overlay0()),
            ))),
        }

        lines.push(Line::from(Span::styled(
            "Realm",
            Style::default()
                .fg(theme.subtext0())
                .add_modifier(Modifier::BOLD),
        )));
        match &self.realm {
            Some(realm) => lines.push(Line::from(Span::styled(
                truncate_str(realm, max_width),
                Style::default().fg(theme.text()),
            ))),
            None => lines.push(Line::from(Span::styled(
                "None",
                Style::default().fg(theme.overlay0()),
            ))),
        }

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, area);
    }

    fn render_keybindings(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
    ) {
        // Generate global keybindings from resolver
        let global_keybindings = self.global_keybindings();

        // Collect all hint keybindings (local first, then global)
        let hints: Vec<&Keybinding> = local_keybindings
            .iter()
            .filter(|kb| kb.hint)
            .chain(global_keybindings.iter().filter(|kb| kb.hint))
            .collect();

        if hints.is_empty() {
            return;
        }

        // Calculate how many columns we can fit
        // Each keybinding takes roughly: key(5) + space(1) + desc(10) + padding(2) = ~18 chars
        let col_width = 16_u16;
        let num_cols = (area.width / col_width).max(1) as usize;
        let num_rows = area.height as usize;

        // Distribute keybindings across columns (fill column by column)
        let mut columns: Vec<Vec<Line>> = vec![Vec::new(); num_cols];

        for (i, kb) in hints.iter().enumerate() {
            let col_idx = i / num_rows.max(1);
            if col_idx >= num_cols {
                break; // No more space
            }

            let line = Line::from(vec![
                Span::styled(format!("{:>5}", kb.key), Style::default().fg(theme.peach())),
                Span::raw(" "),
                Span::styled(
                    kb.description.clone(),
                    Style::default().fg(theme.subtext0()),
                ),
            ]);
            columns[col_idx].push(line);
        }

        // Create column areas
        let col_constraints: Vec<Constraint> = vec![Constraint::Length(col_width); num_cols];
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints)
            .split(area);

        // Render each column
        for (col_idx, col_lines) in columns.into_iter().enumerate() {
            if col_idx < col_areas.len() {
                let paragraph = Paragraph::new(col_lines);
                frame.render_widget(paragraph, col_areas[col_idx]);
            }
        }
    }

    fn render_logo(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let logo_lines: Vec<Line> = LOGO
            .iter()
            .map(|line| {
                Line::from(Span::styled(
                    *line,
                    Style::default()
                        .fg(theme.mauve())
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect();

        let paragraph = Paragraph::new(logo_lines);
        frame.render_widget(paragraph, area);
    }

    /// Global keybindings shown alongside page-local ones.
    pub fn global_keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::hint(self.resolver.display_global(GlobalAction::Back), "Back"),
            Keybinding::hint(self.resolver.display_global(GlobalAction::Theme), "Theme"),
            Keybinding::hint(self.resolver.display_global(GlobalAction::Quit), "Quit"),
            Keybinding::hint(self.resolver.display_nav(NavAction::Select), "Select"),
            Keybinding::hint(
                format!(
                    "{}/{}",
                    self.resolver.display_nav(NavAction::Up),
                    self.resolver.display_nav(NavAction::Down)
                ),
                "Navigate",
            ),
        ]
    }
}

/// Truncate a string to fit within a given width, adding "..." if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.len() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        format!("{}...", &s[..max_width - 3])
    } else {
        s[..max_width.min(s.len())].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("master", 10), "master");
        assert_eq!(truncate_str("a-very-long-realm-name", 10), "a-very-...");
        assert_eq!(truncate_str("abc", 2), "ab");
    }
}
