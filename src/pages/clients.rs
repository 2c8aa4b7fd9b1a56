//! Client listing for the active realm, with an initial-access token view.
//!
//! The client list is the entry view; the initial-access key opens the
//! realm's registration tokens, which can be revoked with confirmation.

use std::sync::{Arc, Mutex};

use chrono::DateTime;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::Cell;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::Theme;
use crate::client::{ClientInitialAccessRepresentation, ClientRepresentation};
use crate::config::{ClientsAction, GlobalAction, ListAction, SearchAction};
use crate::core::command::CopyToClipboardCmd;
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

impl TableRow for ClientRepresentation {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "client_id" => Some(self.client_id.clone()),
            "name" => self.name.clone(),
            "protocol" => self.protocol.clone(),
            "base_url" => self.base_url.clone(),
            "enabled" => self.enabled.map(|e| e.to_string()),
            _ => None,
        }
    }
}

impl TableRow for ClientInitialAccessRepresentation {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "count" => self.count.map(|c| c.to_string()),
            "remaining" => self.remaining_count.map(|c| c.to_string()),
            _ => None,
        }
    }
}

fn base_url_cell(client: &ClientRepresentation, theme: &Theme) -> Cell<'static> {
    Cell::from(client.base_url.clone().unwrap_or_default())
        .style(Style::default().fg(theme.blue()))
}

fn enabled_label(raw: String) -> String {
    match raw.as_str() {
        "true" => "enabled".to_string(),
        "false" => "disabled".to_string(),
        _ => raw,
    }
}

fn client_columns() -> Vec<ColumnDef<ClientRepresentation>> {
    vec![
        ColumnDef::new("Client ID", "client_id", Constraint::Fill(2)),
        ColumnDef::new("Name", "name", Constraint::Fill(2)),
        ColumnDef::new("Base URL", "base_url", Constraint::Fill(2)).with_renderer(base_url_cell),
        ColumnDef::new("Protocol", "protocol", Constraint::Length(14)),
        ColumnDef::new("Enabled", "enabled", Constraint::Length(10))
            .with_formatters(&[enabled_label]),
    ]
}

fn format_epoch_secs(secs: Option<i64>) -> String {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn created_cell(token: &ClientInitialAccessRepresentation, theme: &Theme) -> Cell<'static> {
    Cell::from(format_epoch_secs(token.timestamp)).style(Style::default().fg(theme.subtext0()))
}

fn expires_cell(token: &ClientInitialAccessRepresentation, theme: &Theme) -> Cell<'static> {
    let expires = match (token.timestamp, token.expiration) {
        (Some(ts), Some(lifetime)) => Some(ts + lifetime),
        _ => None,
    };
    Cell::from(format_epoch_secs(expires)).style(Style::default().fg(theme.subtext0()))
}

fn token_columns() -> Vec<ColumnDef<ClientInitialAccessRepresentation>> {
    vec![
        ColumnDef::new("ID", "id", Constraint::Fill(2)),
        ColumnDef::new("Created", "created", Constraint::Length(17)).with_renderer(created_cell),
        ColumnDef::new("Expires", "expires", Constraint::Length(17)).with_renderer(expires_cell),
        ColumnDef::new("Count", "count", Constraint::Length(7)),
        ColumnDef::new("Remaining", "remaining", Constraint::Length(11)),
    ]
}

enum State {
    Clients,
    InitialAccess {
        table: DataTable<ClientInitialAccessRepresentation>,
    },
}

enum ClientsMsg {
    Reload,
    DeleteSelected,
    CopyId(String),
    OpenInitialAccess,
    BackToClients,
    DeleteSelectedToken,
}

pub struct ClientsPage {
    ctx: PageContext,
    clients: DataTable<ClientRepresentation>,
    state: State,
    confirm_delete: ConfirmDialog,
    confirm_revoke: ConfirmDialog,
    pending_delete: Arc<Mutex<Option<ClientRepresentation>>>,
    pending_revoke: Arc<Mutex<Option<ClientInitialAccessRepresentation>>>,
    msg_tx: UnboundedSender<ClientsMsg>,
    msg_rx: UnboundedReceiver<ClientsMsg>,
}

impl ClientsPage {
    pub fn new(ctx: PageContext) -> Self {
        let (msg_tx, msg_rx) = unbounded_channel();

        let admin = Arc::clone(&ctx.admin);
        let realm = ctx.realm.clone();
        let loader: RowLoader<ClientRepresentation> = Arc::new(move |first, max| {
            let admin = Arc::clone(&admin);
            let realm = realm.clone();
            Box::pin(async move { admin.list_clients(&realm, first, max).await })
        });

        let clients = DataTable::new(loader, client_columns(), Arc::clone(&ctx.resolver))
            .with_title(" Clients ")
            .paginated(PAGE_SIZE)
            .with_empty_state(EmptyState::new(
                "No clients in this realm",
                "Clients are created by registering applications with the server.",
            ));

        let pending_delete: Arc<Mutex<Option<ClientRepresentation>>> = Arc::new(Mutex::new(None));
        let on_delete: ConfirmAction = {
            let admin = Arc::clone(&ctx.admin);
            let realm = ctx.realm.clone();
            let alerts = ctx.alerts.clone();
            let pending = Arc::clone(&pending_delete);
            let msg_tx = msg_tx.clone();
            Arc::new(move || {
                let admin = Arc::clone(&admin);
                let realm = realm.clone();
                let alerts = alerts.clone();
                let pending = Arc::clone(&pending);
                let msg_tx = msg_tx.clone();
                Box::pin(async move {
                    let Some(client) = pending.lock().ok().and_then(|mut p| p.take()) else {
                        return;
                    };
                    let Some(id) = client.id.as_deref() else {
                        return;
                    };
                    match admin.delete_client(&realm, id).await {
                        Ok(()) => {
                            alerts.add_alert(
                                format!("Deleted client {}", client.client_id),
                                Severity::Success,
                            );
                            let _ = msg_tx.send(ClientsMsg::Reload);
                        }
                        Err(e) => alerts.add_alert(
                            format!("Failed to delete client {}: {e}", client.client_id),
                            Severity::Error,
                        ),
                    }
                })
            })
        };

        let confirm_delete = ConfirmDialog::new("", on_delete, Arc::clone(&ctx.resolver))
            .with_title("Delete client")
            .with_confirm_text("Delete")
            .with_cancel_text("Keep")
            .danger();

        let pending_revoke: Arc<Mutex<Option<ClientInitialAccessRepresentation>>> =
            Arc::new(Mutex::new(None));
        let on_revoke: ConfirmAction = {
            let admin = Arc::clone(&ctx.admin);
            let realm = ctx.realm.clone();
            let alerts = ctx.alerts.clone();
            let pending = Arc::clone(&pending_revoke);
            let msg_tx = msg_tx.clone();
            Arc::new(move || {
                let admin = Arc::clone(&admin);
                let realm = realm.clone();
                let alerts = alerts.clone();
                let pending = Arc::clone(&pending);
                let msg_tx = msg_tx.clone();
                Box::pin(async move {
                    let Some(token) = pending.lock().ok().and_then(|mut p| p.take()) else {
                        return;
                    };
                    let Some(id) = token.id.as_deref() else {
                        return;
                    };
                    match admin.delete_client_initial_access(&realm, id).await {
                        Ok(()) => {
                            alerts.add_alert("Revoked initial access token", Severity::Success);
                            let _ = msg_tx.send(ClientsMsg::Reload);
                        }
                        Err(e) => alerts
                            .add_alert(format!("Failed to revoke token: {e}"), Severity::Error),
                    }
                })
            })
        };

        let confirm_revoke = ConfirmDialog::new("", on_revoke, Arc::clone(&ctx.resolver))
            .with_title("Revoke token")
            .with_confirm_text("Revoke")
            .with_cancel_text("Keep")
            .danger();

        Self {
            ctx,
            clients,
            state: State::Clients,
            confirm_delete,
            confirm_revoke,
            pending_delete,
            pending_revoke,
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: ClientsMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn token_table(&self) -> DataTable<ClientInitialAccessRepresentation> {
        let admin = Arc::clone(&self.ctx.admin);
        let realm = self.ctx.realm.clone();
        let loader: RowLoader<ClientInitialAccessRepresentation> = Arc::new(move |_first, _max| {
            let admin = Arc::clone(&admin);
            let realm = realm.clone();
            Box::pin(async move { admin.list_client_initial_access(&realm).await })
        });

        DataTable::new(loader, token_columns(), Arc::clone(&self.ctx.resolver))
            .with_title(" Initial access tokens ")
            .with_empty_state(EmptyState::new(
                "No initial access tokens",
                "Tokens authorize dynamic client registration against this realm.",
            ))
    }

    fn open_initial_access(&mut self) {
        let mut table = self.token_table();
        table.refresh();
        self.state = State::InitialAccess { table };
    }

    fn open_delete_dialog(&mut self) {
        let Some(client) = self.clients.selected_item().cloned() else {
            return;
        };
        self.confirm_delete
            .set_message(format!("Delete client \"{}\"?", client.client_id));
        if let Ok(mut pending) = self.pending_delete.lock() {
            *pending = Some(client);
        }
        self.confirm_delete.toggle();
    }

    fn open_revoke_dialog(&mut self) {
        let State::InitialAccess { table } = &self.state else {
            return;
        };
        let Some(token) = table.selected_item().cloned() else {
            return;
        };
        let id = token.id.clone().unwrap_or_default();
        self.confirm_revoke
            .set_message(format!("Revoke initial access token \"{id}\"?"));
        if let Ok(mut pending) = self.pending_revoke.lock() {
            *pending = Some(token);
        }
        self.confirm_revoke.toggle();
    }
}

impl Page for ClientsPage {
    fn init(&mut self) {
        self.queue(ClientsMsg::Reload);
    }

    fn handle_tick(&mut self) {
        match &mut self.state {
            State::Clients => self.clients.on_tick(),
            State::InitialAccess { table } => table.on_tick(),
        }
    }

    fn handle_input(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };

        if self.confirm_delete.is_open() {
            return self.confirm_delete.handle_key(*key).process().0;
        }
        if self.confirm_revoke.is_open() {
            return self.confirm_revoke.handle_key(*key).process().0;
        }

        let resolver = Arc::clone(&self.ctx.resolver);
        match &mut self.state {
            State::Clients => {
                let (consumed, _) = self.clients.handle_key(*key).process();
                if consumed {
                    return true;
                }
                if resolver.matches_clients(key, ClientsAction::InitialAccess) {
                    self.queue(ClientsMsg::OpenInitialAccess);
                    return true;
                }
                if resolver.matches_list(key, ListAction::Reload) {
                    self.queue(ClientsMsg::Reload);
                    return true;
                }
                if resolver.matches_list(key, ListAction::Delete) {
                    self.queue(ClientsMsg::DeleteSelected);
                    return true;
                }
                if resolver.matches_list(key, ListAction::CopyId) {
                    if let Some(id) = self.clients.selected_item().and_then(|c| c.id.clone()) {
                        self.queue(ClientsMsg::CopyId(id));
                    }
                    return true;
                }
                false
            }
            State::InitialAccess { table } => {
                let (consumed, _) = table.handle_key(*key).process();
                if consumed {
                    return true;
                }
                if resolver.matches_global(key, GlobalAction::Back) {
                    self.queue(ClientsMsg::BackToClients);
                    return true;
                }
                if resolver.matches_list(key, ListAction::Reload) {
                    self.queue(ClientsMsg::Reload);
                    return true;
                }
                if resolver.matches_list(key, ListAction::Delete) {
                    self.queue(ClientsMsg::DeleteSelectedToken);
                    return true;
                }
                false
            }
        }
    }

    fn update(&mut self) -> UpdateResult {
        let outcome = match &mut self.state {
            State::Clients => self.clients.poll(),
            State::InitialAccess { table } => table.poll(),
        };
        if let Some(LoadOutcome::Failed { error }) = outcome {
            self.ctx
                .alerts
                .add_alert(format!("Failed to load clients: {error}"), Severity::Error);
        }

        let mut result = UpdateResult::Idle;
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                ClientsMsg::Reload => match &mut self.state {
                    State::Clients => self.clients.refresh(),
                    State::InitialAccess { table } => table.refresh(),
                },
                ClientsMsg::DeleteSelected => self.open_delete_dialog(),
                ClientsMsg::CopyId(id) => {
                    result = CopyToClipboardCmd::new(id, "client ID", self.ctx.env.clone()).into();
                }
                ClientsMsg::OpenInitialAccess => self.open_initial_access(),
                ClientsMsg::BackToClients => self.state = State::Clients,
                ClientsMsg::DeleteSelectedToken => self.open_revoke_dialog(),
            }
        }
        result
    }

    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match &mut self.state {
            State::Clients => self.clients.render(frame, area, theme),
            State::InitialAccess { table } => table.render(frame, area, theme),
        }
        self.confirm_delete.render(frame, area, theme);
        self.confirm_revoke.render(frame, area, theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        let mut bc = vec![self.ctx.realm.clone(), "Clients".to_string()];
        if matches!(self.state, State::InitialAccess { .. }) {
            bc.push("Initial access".to_string());
        }
        bc
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let resolver = &self.ctx.resolver;
        match self.state {
            State::Clients => vec![
                Keybinding::hint(
                    resolver.display_clients(ClientsAction::InitialAccess),
                    "Tokens",
                ),
                Keybinding::hint(resolver.display_list(ListAction::Reload), "Reload"),
                Keybinding::hint(resolver.display_list(ListAction::Delete), "Delete"),
                Keybinding::hint(resolver.display_list(ListAction::CopyId), "Copy ID"),
                Keybinding::hint(resolver.display_search(SearchAction::Toggle), "Search"),
                Keybinding::hint(
                    format!(
                        "{}/{}",
                        resolver.display_list(ListAction::PrevPage),
                        resolver.display_list(ListAction::NextPage)
                    ),
                    "Page",
                ),
            ],
            State::InitialAccess { .. } => vec![
                Keybinding::hint(resolver.display_list(ListAction::Delete), "Revoke"),
                Keybinding::hint(resolver.display_list(ListAction::Reload), "Reload"),
                Keybinding::hint(resolver.display_search(SearchAction::Toggle), "Search"),
            ],
        }
    }
}
