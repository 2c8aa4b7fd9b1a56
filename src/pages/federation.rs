//! User federation: storage providers and their LDAP attribute mappers.
//!
//! Two-level drill-down: the provider list is the entry view, selecting a
//! provider (or pressing the mappers key) opens its mapper list.

use std::sync::{Arc, Mutex};

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::Cell;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::Theme;
use crate::client::{ComponentRepresentation, LdapMapper, MapperKind};
use crate::config::{FederationAction, GlobalAction, ListAction, SearchAction};
use crate::core::page::{Page, UpdateResult};
use crate::pages::PageContext;
use crate::tui::Event;
use crate::ui::confirm_dialog::ConfirmAction;
use crate::ui::status_bar::Keybinding;
use crate::ui::toast::Severity;
use crate::ui::{
    ColumnDef, Component, ConfirmDialog, DataTable, EmptyState, HandledResultExt, LoadOutcome,
    RowLoader, TableEvent, TableRow,
};

impl TableRow for ComponentRepresentation {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "name" => self.name.clone(),
            "provider" => self.provider_id.clone(),
            _ => None,
        }
    }
}

impl TableRow for LdapMapper {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "name" => Some(self.name.clone()),
            "kind" => Some(self.kind.label()),
            _ => None,
        }
    }
}

fn provider_columns() -> Vec<ColumnDef<ComponentRepresentation>> {
    vec![
        ColumnDef::new("Name", "name", Constraint::Fill(2)),
        ColumnDef::new("Provider", "provider", Constraint::Fill(1)),
    ]
}

fn kind_cell(mapper: &LdapMapper, theme: &Theme) -> Cell<'static> {
    let color = match mapper.kind {
        MapperKind::Role => theme.mauve(),
        MapperKind::Group => theme.blue(),
        MapperKind::UserAttribute { .. } => theme.green(),
        MapperKind::FullName => theme.peach(),
        MapperKind::Other(_) => theme.overlay1(),
    };
    Cell::from(mapper.kind.label()).style(Style::default().fg(color))
}

fn mapper_columns() -> Vec<ColumnDef<LdapMapper>> {
    vec![
        ColumnDef::new("Name", "name", Constraint::Fill(1)),
        ColumnDef::new("Kind", "kind", Constraint::Fill(1)).with_renderer(kind_cell),
    ]
}

enum State {
    Providers,
    Mappers {
        provider: ComponentRepresentation,
        table: DataTable<LdapMapper>,
    },
}

enum FederationMsg {
    Reload,
    OpenMappers(ComponentRepresentation),
    BackToProviders,
    DeleteSelectedMapper,
}

pub struct FederationPage {
    ctx: PageContext,
    providers: DataTable<ComponentRepresentation>,
    state: State,
    confirm: ConfirmDialog,
    pending: Arc<Mutex<Option<LdapMapper>>>,
    msg_tx: UnboundedSender<FederationMsg>,
    msg_rx: UnboundedReceiver<FederationMsg>,
}

impl FederationPage {
    pub fn new(ctx: PageContext) -> Self {
        let (msg_tx, msg_rx) = unbounded_channel();

        let admin = Arc::clone(&ctx.admin);
        let realm = ctx.realm.clone();
        let loader: RowLoader<ComponentRepresentation> = Arc::new(move |_first, _max| {
            let admin = Arc::clone(&admin);
            let realm = realm.clone();
            Box::pin(async move { admin.list_user_federation(&realm).await })
        });

        let providers = DataTable::new(loader, provider_columns(), Arc::clone(&ctx.resolver))
            .with_title(" User federation ")
            .with_empty_state(EmptyState::new(
                "No user federation providers",
                "Connect an LDAP directory to this realm to federate its users.",
            ));

        let pending: Arc<Mutex<Option<LdapMapper>>> = Arc::new(Mutex::new(None));
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
                    let Some(mapper) = pending.lock().ok().and_then(|mut p| p.take()) else {
                        return;
                    };
                    match admin.delete_component(&realm, &mapper.id).await {
                        Ok(()) => {
                            alerts.add_alert(
                                format!("Deleted mapper {}", mapper.name),
                                Severity::Success,
                            );
                            let _ = msg_tx.send(FederationMsg::Reload);
                        }
                        Err(e) => alerts.add_alert(
                            format!("Failed to delete mapper {}: {e}", mapper.name),
                            Severity::Error,
                        ),
                    }
                })
            })
        };

        let confirm = ConfirmDialog::new("", on_confirm, Arc::clone(&ctx.resolver))
            .with_title("Delete mapper")
            .with_confirm_text("Delete")
            .with_cancel_text("Keep")
            .danger();

        Self {
            ctx,
            providers,
            state: State::Providers,
            confirm,
            pending,
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: FederationMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn mapper_table(&self, provider_id: String) -> DataTable<LdapMapper> {
        let admin = Arc::clone(&self.ctx.admin);
        let realm = self.ctx.realm.clone();
        let loader: RowLoader<LdapMapper> = Arc::new(move |_first, _max| {
            let admin = Arc::clone(&admin);
            let realm = realm.clone();
            let provider_id = provider_id.clone();
            Box::pin(async move { admin.list_ldap_mappers(&realm, &provider_id).await })
        });

        DataTable::new(loader, mapper_columns(), Arc::clone(&self.ctx.resolver))
            .with_title(" Mappers ")
            .with_empty_state(EmptyState::new(
                "No mappers on this provider",
                "Mappers translate LDAP entries into realm roles, groups and attributes.",
            ))
    }

    fn open_mappers(&mut self, provider: ComponentRepresentation) {
        let Some(provider_id) = provider.id.clone() else {
            return;
        };
        let mut table = self.mapper_table(provider_id);
        table.refresh();
        self.state = State::Mappers { provider, table };
    }

    fn open_delete_dialog(&mut self) {
        let State::Mappers { table, .. } = &self.state else {
            return;
        };
        let Some(mapper) = table.selected_item().cloned() else {
            return;
        };
        self.confirm
            .set_message(format!("Delete mapper \"{}\"?", mapper.name));
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(mapper);
        }
        self.confirm.toggle();
    }
}

impl Page for FederationPage {
    fn init(&mut self) {
        self.queue(FederationMsg::Reload);
    }

    fn handle_tick(&mut self) {
        match &mut self.state {
            State::Providers => self.providers.on_tick(),
            State::Mappers { table, .. } => table.on_tick(),
        }
    }

    fn handle_input(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };

        if self.confirm.is_open() {
            return self.confirm.handle_key(*key).process().0;
        }

        let resolver = Arc::clone(&self.ctx.resolver);
        match &mut self.state {
            State::Providers => {
                let (consumed, table_event) = self.providers.handle_key(*key).process();
                if let Some(TableEvent::Activated(provider)) = table_event {
                    self.queue(FederationMsg::OpenMappers(provider));
                    return true;
                }
                if consumed {
                    return true;
                }
                if resolver.matches_federation(key, FederationAction::Mappers) {
                    if let Some(provider) = self.providers.selected_item().cloned() {
                        self.queue(FederationMsg::OpenMappers(provider));
                    }
                    return true;
                }
                if resolver.matches_list(key, ListAction::Reload) {
                    self.queue(FederationMsg::Reload);
                    return true;
                }
                false
            }
            State::Mappers { table, .. } => {
                let (consumed, _) = table.handle_key(*key).process();
                if consumed {
                    return true;
                }
                if resolver.matches_global(key, GlobalAction::Back) {
                    self.queue(FederationMsg::BackToProviders);
                    return true;
                }
                if resolver.matches_list(key, ListAction::Reload) {
                    self.queue(FederationMsg::Reload);
                    return true;
                }
                if resolver.matches_list(key, ListAction::Delete) {
                    self.queue(FederationMsg::DeleteSelectedMapper);
                    return true;
                }
                false
            }
        }
    }

    fn update(&mut self) -> UpdateResult {
        let outcome = match &mut self.state {
            State::Providers => self.providers.poll(),
            State::Mappers { table, .. } => table.poll(),
        };
        if let Some(LoadOutcome::Failed { error }) = outcome {
            self.ctx.alerts.add_alert(
                format!("Failed to load federation data: {error}"),
                Severity::Error,
            );
        }

        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                FederationMsg::Reload => match &mut self.state {
                    State::Providers => self.providers.refresh(),
                    State::Mappers { table, .. } => table.refresh(),
                },
                FederationMsg::OpenMappers(provider) => self.open_mappers(provider),
                FederationMsg::BackToProviders => {
                    self.state = State::Providers;
                    self.providers.refresh();
                }
                FederationMsg::DeleteSelectedMapper => self.open_delete_dialog(),
            }
        }
        UpdateResult::Idle
    }

    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match &mut self.state {
            State::Providers => self.providers.render(frame, area, theme),
            State::Mappers { table, .. } => table.render(frame, area, theme),
        }
        self.confirm.render(frame, area, theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        let mut bc = vec![self.ctx.realm.clone(), "User federation".to_string()];
        if let State::Mappers { provider, .. } = &self.state {
            bc.push(provider.name.clone().unwrap_or_else(|| "provider".to_string()));
            bc.push("Mappers".to_string());
        }
        bc
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let resolver = &self.ctx.resolver;
        match self.state {
            State::Providers => vec![
                Keybinding::hint(
                    resolver.display_federation(FederationAction::Mappers),
                    "Mappers",
                ),
                Keybinding::hint(resolver.display_list(ListAction::Reload), "Reload"),
                Keybinding::hint(resolver.display_search(SearchAction::Toggle), "Search"),
            ],
            State::Mappers { .. } => vec![
                Keybinding::hint(resolver.display_list(ListAction::Delete), "Delete"),
                Keybinding::hint(resolver.display_list(ListAction::Reload), "Reload"),
                Keybinding::hint(resolver.display_search(SearchAction::Toggle), "Search"),
            ],
        }
    }
}
