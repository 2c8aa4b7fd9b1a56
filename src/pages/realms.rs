//! Realm selector: the entry page of the application.

use std::sync::{Arc, Mutex};

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::Cell;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::Theme;
use crate::client::{AdminClient, RealmRepresentation};
use crate::config::{KeyResolver, ListAction, SearchAction};
use crate::core::message::AppMessage;
use crate::core::page::{Page, UpdateResult};
use crate::tui::Event;
use crate::ui::confirm_dialog::ConfirmAction;
use crate::ui::status_bar::Keybinding;
use crate::ui::text_input::{TextInputComponent, TextInputEvent};
use crate::ui::toast::{Alerts, Severity};
use crate::ui::{
    ColumnDef, Component, ConfirmDialog, DataTable, EmptyState, Handled, HandledResultExt,
    LoadOutcome, RowLoader, TableEvent, TableRow,
};

impl TableRow for RealmRepresentation {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "realm" => Some(self.realm.clone()),
            "display_name" => self.display_name.clone(),
            "enabled" => self.enabled.map(|e| e.to_string()),
            _ => None,
        }
    }
}

fn enabled_cell(realm: &RealmRepresentation, theme: &Theme) -> Cell<'static> {
    match realm.enabled {
        Some(true) => Cell::from("enabled").style(Style::default().fg(theme.success())),
        Some(false) => Cell::from("disabled").style(Style::default().fg(theme.error())),
        None => Cell::from(""),
    }
}

fn columns() -> Vec<ColumnDef<RealmRepresentation>> {
    vec![
        ColumnDef::new("Realm", "realm", Constraint::Fill(1)),
        ColumnDef::new("Display name", "display_name", Constraint::Fill(2)),
        ColumnDef::new("Enabled", "enabled", Constraint::Length(10)).with_renderer(enabled_cell),
    ]
}

enum RealmsMsg {
    Reload,
    DeleteSelected,
    CreateSubmitted(String),
}

pub struct RealmsPage {
    alerts: Alerts,
    admin: Arc<AdminClient>,
    resolver: Arc<KeyResolver>,
    app_tx: UnboundedSender<AppMessage>,
    table: DataTable<RealmRepresentation>,
    confirm: ConfirmDialog,
    create_input: Option<TextInputComponent>,
    pending: Arc<Mutex<Option<RealmRepresentation>>>,
    msg_tx: UnboundedSender<RealmsMsg>,
    msg_rx: UnboundedReceiver<RealmsMsg>,
}

impl RealmsPage {
    pub fn new(
        admin: Arc<AdminClient>,
        alerts: Alerts,
        resolver: Arc<KeyResolver>,
        app_tx: UnboundedSender<AppMessage>,
    ) -> Self {
        let (msg_tx, msg_rx) = unbounded_channel();

        let loader: RowLoader<RealmRepresentation> = {
            let admin = Arc::clone(&admin);
            Arc::new(move |_first, _max| {
                let admin = Arc::clone(&admin);
                Box::pin(async move { admin.list_realms().await })
            })
        };

        let table = DataTable::new(loader, columns(), Arc::clone(&resolver))
            .with_title(" Realms ")
            .with_empty_state(
                EmptyState::new(
                    "No realms visible",
                    "The admin account may lack permission to list realms.",
                )
                .with_primary_hint("Press c to create a realm"),
            );

        let pending: Arc<Mutex<Option<RealmRepresentation>>> = Arc::new(Mutex::new(None));
        let on_confirm: ConfirmAction = {
            let admin = Arc::clone(&admin);
            let alerts = alerts.clone();
            let pending = Arc::clone(&pending);
            let msg_tx = msg_tx.clone();
            Arc::new(move || {
                let admin = Arc::clone(&admin);
                let alerts = alerts.clone();
                let pending = Arc::clone(&pending);
                let msg_tx = msg_tx.clone();
                Box::pin(async move {
                    let Some(realm) = pending.lock().ok().and_then(|mut p| p.take()) else {
                        return;
                    };
                    match admin.delete_realm(&realm.realm).await {
                        Ok(()) => {
                            alerts.add_alert(
                                format!("Deleted realm {}", realm.realm),
                                Severity::Success,
                            );
                            let _ = msg_tx.send(RealmsMsg::Reload);
                        }
                        Err(e) => alerts.add_alert(
                            format!("Failed to delete realm {}: {e}", realm.realm),
                            Severity::Error,
                        ),
                    }
                })
            })
        };

        let confirm = ConfirmDialog::new("", on_confirm, Arc::clone(&resolver))
            .with_title("Delete realm")
            .with_confirm_text("Delete")
            .with_cancel_text("Keep")
            .danger();

        Self {
            alerts,
            admin,
            resolver,
            app_tx,
            table,
            confirm,
            create_input: None,
            pending,
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: RealmsMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn open_delete_dialog(&mut self) {
        let Some(realm) = self.table.selected_item().cloned() else {
            return;
        };
        self.confirm.set_message(format!(
            "Delete realm \"{}\" and everything in it?",
            realm.realm
        ));
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(realm);
        }
        self.confirm.toggle();
    }

    fn create_realm(&self, name: String) {
        let admin = Arc::clone(&self.admin);
        let alerts = self.alerts.clone();
        let msg_tx = self.msg_tx.clone();
        tokio::spawn(async move {
            match admin.create_realm(&name).await {
                Ok(()) => {
                    alerts.add_alert(format!("Created realm {name}"), Severity::Success);
                    let _ = msg_tx.send(RealmsMsg::Reload);
                }
                Err(e) if e.is_conflict() => {
                    alerts.add_alert(format!("Realm {name} already exists"), Severity::Warning);
                }
                Err(e) => {
                    alerts.add_alert(format!("Failed to create realm {name}: {e}"), Severity::Error);
                }
            }
        });
    }
}

impl Page for RealmsPage {
    fn init(&mut self) {
        self.queue(RealmsMsg::Reload);
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

        if let Some(input) = &mut self.create_input {
            match input.handle_key(*key) {
                Ok(Handled::Event(TextInputEvent::Submitted(name))) => {
                    self.create_input = None;
                    let name = name.trim().to_string();
                    if !name.is_empty() {
                        self.queue(RealmsMsg::CreateSubmitted(name));
                    }
                }
                Ok(Handled::Event(TextInputEvent::Cancelled)) => {
                    self.create_input = None;
                }
                _ => {}
            }
            return true;
        }

        let (consumed, table_event) = self.table.handle_key(*key).process();
        if let Some(TableEvent::Activated(realm)) = table_event {
            let _ = self.app_tx.send(AppMessage::SelectRealm(realm));
            return true;
        }
        if consumed {
            return true;
        }

        let resolver = &self.resolver;
        if resolver.matches_list(key, ListAction::Reload) {
            self.queue(RealmsMsg::Reload);
            return true;
        }
        if resolver.matches_list(key, ListAction::Create) {
            self.create_input =
                Some(TextInputComponent::new("New realm").with_placeholder("realm name"));
            return true;
        }
        if resolver.matches_list(key, ListAction::Delete) {
            self.queue(RealmsMsg::DeleteSelected);
            return true;
        }

        false
    }

    fn update(&mut self) -> UpdateResult {
        if let Some(LoadOutcome::Failed { error }) = self.table.poll() {
            self.alerts
                .add_alert(format!("Failed to load realms: {error}"), Severity::Error);
        }

        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                RealmsMsg::Reload => self.table.refresh(),
                RealmsMsg::DeleteSelected => self.open_delete_dialog(),
                RealmsMsg::CreateSubmitted(name) => self.create_realm(name),
            }
        }
        UpdateResult::Idle
    }

    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.table.render(frame, area, theme);
        if let Some(input) = &mut self.create_input {
            input.render(frame, area, theme);
        }
        self.confirm.render(frame, area, theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec!["Realms".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let resolver = &self.resolver;
        vec![
            Keybinding::hint(resolver.display_list(ListAction::Create), "Create"),
            Keybinding::hint(resolver.display_list(ListAction::Delete), "Delete"),
            Keybinding::hint(resolver.display_list(ListAction::Reload), "Reload"),
            Keybinding::hint(resolver.display_search(SearchAction::Toggle), "Search"),
        ]
    }
}
