//! User listing for the active realm.

use std::sync::{Arc, Mutex};

use chrono::DateTime;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::Cell;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::Theme;
use crate::client::UserRepresentation;
use crate::config::{ListAction, SearchAction};
use crate::core::page::{Page, UpdateResult};
use crate::pages::{PAGE_SIZE, PageContext};
use crate::tui::Event;
use crate::ui::confirm_dialog::ConfirmAction;
use crate::ui::status_bar::Keybinding;
use crate::ui::toast::Severity;
use crate::ui::{
    ColumnDef, Component, ConfirmDialog, DataTable, EmptyState, HandledResultExt, LoadOutcome,
    RowLoader, TableRow,
};

impl TableRow for UserRepresentation {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "username" => Some(self.username.clone()),
            "email" => self.email.clone(),
            "first_name" => self.first_name.clone(),
            "last_name" => self.last_name.clone(),
            "enabled" => self.enabled.map(|e| e.to_string()),
            _ => None,
        }
    }
}

fn created_cell(user: &UserRepresentation, theme: &Theme) -> Cell<'static> {
    let formatted = user
        .created_timestamp
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    Cell::from(formatted).style(Style::default().fg(theme.subtext0()))
}

fn enabled_cell(user: &UserRepresentation, theme: &Theme) -> Cell<'static> {
    match user.enabled {
        Some(true) => Cell::from("enabled").style(Style::default().fg(theme.success())),
        Some(false) => Cell::from("disabled").style(Style::default().fg(theme.error())),
        None => Cell::from(""),
    }
}

fn columns() -> Vec<ColumnDef<UserRepresentation>> {
    vec![
        ColumnDef::new("Username", "username", Constraint::Fill(2)),
        ColumnDef::new("Email", "email", Constraint::Fill(2)),
        ColumnDef::new("First name", "first_name", Constraint::Fill(1)),
        ColumnDef::new("Last name", "last_name", Constraint::Fill(1)),
        ColumnDef::new("Created", "created", Constraint::Length(17)).with_renderer(created_cell),
        ColumnDef::new("Enabled", "enabled", Constraint::Length(10)).with_renderer(enabled_cell),
    ]
}

enum UsersMsg {
    Reload,
    DeleteSelected,
}

pub struct UsersPage {
    ctx: PageContext,
    table: DataTable<UserRepresentation>,
    confirm: ConfirmDialog,
    pending: Arc<Mutex<Option<UserRepresentation>>>,
    msg_tx: UnboundedSender<UsersMsg>,
    msg_rx: UnboundedReceiver<UsersMsg>,
}

impl UsersPage {
    pub fn new(ctx: PageContext) -> Self {
        let (msg_tx, msg_rx) = unbounded_channel();

        let admin = Arc::clone(&ctx.admin);
        let realm = ctx.realm.clone();
        let loader: RowLoader<UserRepresentation> = Arc::new(move |first, max| {
            let admin = Arc::clone(&admin);
            let realm = realm.clone();
            Box::pin(async move { admin.list_users(&realm, first, max).await })
        });

        let table = DataTable::new(loader, columns(), Arc::clone(&ctx.resolver))
            .with_title(" Users ")
            .paginated(PAGE_SIZE)
            .with_empty_state(EmptyState::new(
                "No users in this realm",
                "Users appear here once they register or are created by an administrator.",
            ));

        let pending: Arc<Mutex<Option<UserRepresentation>>> = Arc::new(Mutex::new(None));
        let on_confirm: ConfirmAction = {
            let admin = Arc::clone(&ctx.admin);
            let realm = ctx.realm.clone();
            let alerts = ctx.alerts.clone();
            let pending = Arc::clone(&pending);
            let msg_tx = msg_tx.clone();
            Arc::new(move || {
                let admin = Arc::clone(&admin);
                let realm = realm.clone();
                let alerts = alerts.clone();
                let pending = Arc::clone(&pending);
                let msg_tx = msg_tx.clone();
                Box::pin(async move {
                    let Some(user) = pending.lock().ok().and_then(|mut p| p.take()) else {
                        return;
                    };
                    let Some(id) = user.id.as_deref() else {
                        return;
                    };
                    match admin.delete_user(&realm, id).await {
                        Ok(()) => {
                            alerts.add_alert(
                                format!("Deleted user {}", user.username),
                                Severity::Success,
                            );
                            let _ = msg_tx.send(UsersMsg::Reload);
                        }
                        Err(e) => alerts.add_alert(
                            format!("Failed to delete user {}: {e}", user.username),
                            Severity::Error,
                        ),
                    }
                })
            })
        };

        let confirm = ConfirmDialog::new("", on_confirm, Arc::clone(&ctx.resolver))
            .with_title("Delete user")
            .with_confirm_text("Delete")
            .with_cancel_text("Keep")
            .danger();

        Self {
            ctx,
            table,
            confirm,
            pending,
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: UsersMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn open_delete_dialog(&mut self) {
        let Some(user) = self.table.selected_item().cloned() else {
            return;
        };
        self.confirm
            .set_message(format!("Delete user \"{}\"?", user.username));
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(user);
        }
        self.confirm.toggle();
    }
}

impl Page for UsersPage {
    fn init(&mut self) {
        self.queue(UsersMsg::Reload);
    }

    fn handle_tick(&mut self) {
        self.table.on_tick();
    }

    fn handle_input(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };

        if self.confirm.is_open() {
            return self.confirm.handle_key(*key).process().0;
        }

        let (consumed, _) = self.table.handle_key(*key).process();
        if consumed {
            return true;
        }

        let resolver = &self.ctx.resolver;
        if resolver.matches_list(key, ListAction::Reload) {
            self.queue(UsersMsg::Reload);
            return true;
        }
        if resolver.matches_list(key, ListAction::Delete) {
            self.queue(UsersMsg::DeleteSelected);
            return true;
        }

        false
    }

    fn update(&mut self) -> UpdateResult {
        if let Some(LoadOutcome::Failed { error }) = self.table.poll() {
            self.ctx
                .alerts
                .add_alert(format!("Failed to load users: {error}"), Severity::Error);
        }

        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                UsersMsg::Reload => self.table.refresh(),
                UsersMsg::DeleteSelected => self.open_delete_dialog(),
            }
        }
        UpdateResult::Idle
    }

    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.table.render(frame, area, theme);
        self.confirm.render(frame, area, theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec![self.ctx.realm.clone(), "Users".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let resolver = &self.ctx.resolver;
        vec![
            Keybinding::hint(resolver.display_list(ListAction::Reload), "Reload"),
            Keybinding::hint(resolver.display_list(ListAction::Delete), "Delete"),
            Keybinding::hint(resolver.display_search(SearchAction::Toggle), "Search"),
            Keybinding::hint(
                format!(
                    "{}/{}",
                    resolver.display_list(ListAction::PrevPage),
                    resolver.display_list(ListAction::NextPage)
                ),
                "Page",
            ),
        ]
    }
}
