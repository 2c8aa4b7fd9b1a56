//! Section selector shown after a realm is chosen.

use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, ListItem};

use crate::Theme;
use crate::core::message::AppMessage;
use crate::core::page::{Page, UpdateResult};
use crate::pages::{PageContext, Section};
use crate::tui::Event;
use crate::ui::status_bar::Keybinding;
use crate::ui::{Component, Handled, ListComponent, ListEvent, ListRow};

impl ListRow for Section {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        ListItem::new(vec![
            Line::from(Span::styled(
                self.title(),
                Style::default()
                    .fg(theme.text())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("  {}", self.description()),
                Style::default().fg(theme.subtext0()),
            )),
            Line::from(""),
        ])
    }
}

pub struct SectionsPage {
    ctx: PageContext,
    list: ListComponent<Section>,
}

impl SectionsPage {
    pub fn new(ctx: PageContext) -> Self {
        let list = ListComponent::new(Section::all().to_vec(), Arc::clone(&ctx.resolver));
        Self { ctx, list }
    }
}

impl Page for SectionsPage {
    fn handle_input(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };

        match self.list.handle_key(*key) {
            Ok(Handled::Event(ListEvent::Activated(section))) => {
                let _ = self.ctx.app_tx.send(AppMessage::OpenSection(section));
                true
            }
            Ok(Handled::Event(_) | Handled::Consumed) => true,
            _ => false,
        }
    }

    fn update(&mut self) -> UpdateResult {
        UpdateResult::Idle
    }

    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(format!(" {} ", self.ctx.realm))
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        // Keep the list readable on wide terminals
        let list_area = inner.centered(Constraint::Max(70), Constraint::Percentage(100));
        self.list.render(frame, list_area, theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec![self.ctx.realm.clone()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        Vec::new()
    }
}
