use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Modifier, Style};
use ratatui::widgets::{List as RatatuiList, ListItem, ListState};

use crate::Theme;
use crate::config::{KeyResolver, NavAction};
use crate::ui::{Component, Handled, Result};

pub enum ListEvent<T> {
    Changed(T),
    Activated(T),
}

pub trait ListRow {
    fn render_row(&self, theme: &Theme) -> ListItem<'static>;
}

pub struct ListComponent<T: ListRow + Clone> {
    items: Vec<T>,
    state: ListState,
    resolver: Arc<KeyResolver>,
}

impl<T: ListRow + Clone> ListComponent<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self {
            items,
            state,
            resolver,
        }
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;

        if self.items.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.items.len() {
                self.state.select(Some(self.items.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    fn get_change_event(&self, before: Option<usize>) -> Handled<ListEvent<T>> {
        if let Some(selected) = self.state.selected()
            && Some(selected) != before
            && let Some(item) = self.items.get(selected)
        {
            return ListEvent::Changed(item.clone()).into();
        }
        Handled::Consumed
    }
}

impl<T: ListRow + Clone> Component for ListComponent<T> {
    type Output = ListEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled<Self::Output>> {
        if self.items.is_empty() {
            return Ok(Handled::Ignored);
        }

        let before = self.state.selected();
        // Clamp eagerly; ListState only clamps on the next render.
        let last = self.items.len() - 1;

        if self.resolver.matches_nav(&key, NavAction::Down) {
            let next = before.map_or(0, |i| usize::min(i + 1, last));
            self.state.select(Some(next));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Up) {
            let next = before.map_or(0, |i| i.saturating_sub(1));
            self.state.select(Some(next));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Home) {
            self.state.select(Some(0));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::End) {
            self.state.select(Some(last));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageDown) {
            let step = 5;
            let next = before.map_or(0, |i| usize::min(i + step, last));
            self.state.select(Some(next));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageUp) {
            let step = 5;
            let next = before.map_or(0, |i| i.saturating_sub(step));
            self.state.select(Some(next));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            if let Some(item) = before.and_then(|i| self.items.get(i)) {
                return Ok(ListEvent::Activated(item.clone()).into());
            }
            return Ok(Handled::Ignored);
        }

        Ok(Handled::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let items: Vec<ListItem> = self.items.iter().map(|i| i.render_row(theme)).collect();

        let list = RatatuiList::new(items)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keybindings::KeybindingsConfig;
    use crossterm::event::{KeyCode, KeyModifiers};

    impl ListRow for &'static str {
        fn render_row(&self, _theme: &Theme) -> ListItem<'static> {
            ListItem::new(*self)
        }
    }

    fn list(items: Vec<&'static str>) -> ListComponent<&'static str> {
        let resolver = Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())));
        ListComponent::new(items, resolver)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_down_stops_at_last_item() {
        let mut list = list(vec!["clients", "groups"]);

        assert!(matches!(
            list.handle_key(key(KeyCode::Down)).unwrap(),
            Handled::Event(ListEvent::Changed("groups"))
        ));
        // Already on the last item: consumed, no change, no panic.
        assert!(matches!(
            list.handle_key(key(KeyCode::Down)).unwrap(),
            Handled::Consumed
        ));
        assert_eq!(list.selected(), Some(&"groups"));
    }

    #[test]
    fn test_page_down_clamps_to_end() {
        let mut list = list(vec!["a", "b", "c"]);

        list.handle_key(key(KeyCode::PageDown)).unwrap();
        assert_eq!(list.selected(), Some(&"c"));

        assert!(matches!(
            list.handle_key(key(KeyCode::Enter)).unwrap(),
            Handled::Event(ListEvent::Activated("c"))
        ));
    }

    #[test]
    fn test_empty_list_ignores_navigation() {
        let mut list = list(vec![]);

        assert!(matches!(
            list.handle_key(key(KeyCode::Down)).unwrap(),
            Handled::Ignored
        ));
        assert!(matches!(
            list.handle_key(key(KeyCode::Enter)).unwrap(),
            Handled::Ignored
        ));
    }

    #[test]
    fn test_home_and_end() {
        let mut list = list(vec!["a", "b", "c"]);

        list.handle_key(key(KeyCode::End)).unwrap();
        assert_eq!(list.selected(), Some(&"c"));
        list.handle_key(key(KeyCode::Home)).unwrap();
        assert_eq!(list.selected(), Some(&"a"));
    }
}
