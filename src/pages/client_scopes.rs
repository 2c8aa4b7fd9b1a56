//! Client scope listing for the active realm.

use std::sync::{Arc, Mutex};

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::Theme;
use crate::client::ClientScopeRepresentation;
use crate::config::{ListAction, SearchAction};
use crate::core::page::{Page, UpdateResult};
use crate::pages::PageContext;
use crate::tui::Event;
use crate::ui::confirm_dialog::ConfirmAction;
use crate::ui::status_bar::Keybinding;
use crate::ui::toast::Severity;
use crate::ui::{
    ColumnDef, Component, ConfirmDialog, DataTable, EmptyState, HandledResultExt, LoadOutcome,
    RowLoader, TableRow,
};

impl TableRow for ClientScopeRepresentation {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "name" => Some(self.name.clone()),
            "description" => self.description.clone(),
            "protocol" => self.protocol.clone(),
            _ => None,
        }
    }
}

fn columns() -> Vec<ColumnDef<ClientScopeRepresentation>> {
    vec![
        ColumnDef::new("Name", "name", Constraint::Fill(1)),
        ColumnDef::new("Description", "description", Constraint::Fill(2)),
        ColumnDef::new("Protocol", "protocol", Constraint::Length(14)),
    ]
}

enum ScopesMsg {
    Reload,
    DeleteSelected,
}

pub struct ClientScopesPage {
    ctx: PageContext,
    table: DataTable<ClientScopeRepresentation>,
    confirm: ConfirmDialog,
    pending: Arc<Mutex<Option<ClientScopeRepresentation>>>,
    msg_tx: UnboundedSender<ScopesMsg>,
    msg_rx: UnboundedReceiver<ScopesMsg>,
}

impl ClientScopesPage {
    pub fn new(ctx: PageContext) -> Self {
        let (msg_tx, msg_rx) = unbounded_channel();

        let admin = Arc::clone(&ctx.admin);
        let realm = ctx.realm.clone();
        let loader: RowLoader<ClientScopeRepresentation> = Arc::new(move |_first, _max| {
            let admin = Arc::clone(&admin);
            let realm = realm.clone();
            Box::pin(async move { admin.list_client_scopes(&realm).await })
        });

        let table = DataTable::new(loader, columns(), Arc::clone(&ctx.resolver))
            .with_title(" Client scopes ")
            .with_empty_state(EmptyState::new(
                "No client scopes in this realm",
                "Client scopes are usually seeded when a realm is created.",
            ));

        let pending: Arc<Mutex<Option<ClientScopeRepresentation>>> = Arc::new(Mutex::new(None));
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
                    let Some(scope) = pending.lock().ok().and_then(|mut p| p.take()) else {
                        return;
                    };
                    let Some(id) = scope.id.as_deref() else {
                        return;
                    };
                    match admin.delete_client_scope(&realm, id).await {
                        Ok(()) => {
                            alerts.add_alert(
                                format!("Deleted client scope {}", scope.name),
                                Severity::Success,
                            );
                            let _ = msg_tx.send(ScopesMsg::Reload);
                        }
                        Err(e) => alerts.add_alert(
                            format!("Failed to delete client scope {}: {e}", scope.name),
                            Severity::Error,
                        ),
                    }
                })
            })
        };

        let confirm = ConfirmDialog::new("", on_confirm, Arc::clone(&ctx.resolver))
            .with_title("Delete client scope")
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

    fn queue(&self, msg: ScopesMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn open_delete_dialog(&mut self) {
        let Some(scope) = self.table.selected_item().cloned() else {
            return;
        };
        self.confirm
            .set_message(format!("Delete client scope \"{}\"?", scope.name));
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(scope);
        }
        self.confirm.toggle();
    }
}

impl Page for ClientScopesPage {
    fn init(&mut self) {
        self.queue(ScopesMsg::Reload);
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
            self.queue(ScopesMsg::Reload);
            return true;
        }
        if resolver.matches_list(key, ListAction::Delete) {
            self.queue(ScopesMsg::DeleteSelected);
            return true;
        }

        false
    }

    fn update(&mut self) -> UpdateResult {
        if let Some(LoadOutcome::Failed { error }) = self.table.poll() {
            self.ctx.alerts.add_alert(
                format!("Failed to load client scopes: {error}"),
                Severity::Error,
            );
        }

        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                ScopesMsg::Reload => self.table.refresh(),
                ScopesMsg::DeleteSelected => self.open_delete_dialog(),
            }
        }
        UpdateResult::Idle
    }

    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.table.render(frame, area, theme);
        self.confirm.render(frame, area, theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec![self.ctx.realm.clone(), "Client scopes".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let resolver = &self.ctx.resolver;
        vec![
            Keybinding::hint(resolver.display_list(ListAction::Reload), "Reload"),
            Keybinding::hint(resolver.display_list(ListAction::Delete), "Delete"),
            Keybinding::hint(resolver.display_search(SearchAction::Toggle), "Search"),
        ]
    }
}
