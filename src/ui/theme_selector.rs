//! Popup for switching the color theme at runtime.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, ListItem};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver};
use crate::theme::{ThemeInfo, available_themes};
use crate::ui::{Component, Handled, ListComponent, ListEvent, ListRow, Result};

impl ListRow for ThemeInfo {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        ListItem::new(self.name.to_string()).style(Style::default().fg(theme.text()))
    }
}

pub enum ThemeEvent {
    Cancelled,
    Selected(ThemeInfo),
}

/// Modal list over [`available_themes`]. Selection is reported upward;
/// applying and persisting the choice is the app's job.
pub struct ThemeSelectorView {
    list: ListComponent<ThemeInfo>,
    resolver: Arc<KeyResolver>,
}

impl ThemeSelectorView {
    pub fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            list: ListComponent::new(available_themes(), Arc::clone(&resolver)),
            resolver,
        }
    }
}

impl Component for ThemeSelectorView {
    type Output = ThemeEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled<Self::Output>> {
        // The key that opened the selector also closes it.
        if key.code == KeyCode::Esc || self.resolver.matches_global(&key, GlobalAction::Theme) {
            return Ok(ThemeEvent::Cancelled.into());
        }

        Ok(match self.list.handle_key(key)? {
            Handled::Event(ListEvent::Activated(info)) => ThemeEvent::Selected(info).into(),
            Handled::Consumed | Handled::Event(_) => Handled::Consumed,
            Handled::Ignored => Handled::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Percentage(40), Constraint::Percentage(50));
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Select Theme (Enter to confirm, Esc to cancel) ")
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.lavender()))
            .style(Style::default().bg(theme.base()));

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);
        self.list.render(frame, inner, theme);
    }
}
