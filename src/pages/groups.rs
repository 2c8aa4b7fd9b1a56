//! Group listing with bulk delete, group creation and a member drill-down.
//!
//! Two-level page: the group list is the entry view, activating a group
//! opens its member list. Members can be marked and removed from the group
//! in bulk behind one confirmation.

use std::sync::{Arc, Mutex};

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::Theme;
use crate::client::{GroupRepresentation, UserRepresentation};
use crate::config::{GlobalAction, ListAction, NavAction, SearchAction};
use crate::core::page::{Page, UpdateResult};
use crate::pages::{PAGE_SIZE, PageContext};
use crate::tui::Event;
use crate::ui::confirm_dialog::ConfirmAction;
use crate::ui::status_bar::Keybinding;
use crate::ui::text_input::{TextInputComponent, TextInputEvent};
use crate::ui::toast::Severity;
use crate::ui::{
    ColumnDef, Component, ConfirmDialog, DataTable, EmptyState, Handled, HandledResultExt,
    LoadOutcome, RowLoader, TableEvent, TableRow,
};

impl TableRow for GroupRepresentation {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "name" => Some(self.name.clone()),
            "path" => self.path.clone(),
            "sub_groups" => self.sub_group_count.map(|c| c.to_string()),
            _ => None,
        }
    }
}

fn group_columns() -> Vec<ColumnDef<GroupRepresentation>> {
    vec![
        ColumnDef::new("Name", "name", Constraint::Fill(1)),
        ColumnDef::new("Path", "path", Constraint::Fill(2)),
        ColumnDef::new("Subgroups", "sub_groups", Constraint::Length(10)),
    ]
}

fn member_columns() -> Vec<ColumnDef<UserRepresentation>> {
    vec![
        ColumnDef::new("Username", "username", Constraint::Fill(2)),
        ColumnDef::new("Email", "email", Constraint::Fill(2)),
        ColumnDef::new("First name", "first_name", Constraint::Fill(1)),
        ColumnDef::new("Last name", "last_name", Constraint::Fill(1)),
    ]
}

enum State {
    Groups,
    Members {
        group: GroupRepresentation,
        table: DataTable<UserRepresentation>,
    },
}

enum GroupsMsg {
    Reload,
    DeleteMarkedOrSelected,
    CreateSubmitted(String),
    OpenMembers(GroupRepresentation),
    BackToGroups,
    RemoveMarkedOrSelectedMembers,
}

pub struct GroupsPage {
    ctx: PageContext,
    groups: DataTable<GroupRepresentation>,
    state: State,
    confirm_delete: ConfirmDialog,
    confirm_remove: ConfirmDialog,
    create_input: Option<TextInputComponent>,
    /// Groups staged for deletion while the dialog is open.
    pending_delete: Arc<Mutex<Vec<GroupRepresentation>>>,
    /// Group id and members staged for removal while the dialog is open.
    pending_removal: Arc<Mutex<Option<(String, Vec<UserRepresentation>)>>>,
    msg_tx: UnboundedSender<GroupsMsg>,
    msg_rx: UnboundedReceiver<GroupsMsg>,
}

impl GroupsPage {
    pub fn new(ctx: PageContext) -> Self {
        let (msg_tx, msg_rx) = unbounded_channel();

        let admin = Arc::clone(&ctx.admin);
        let realm = ctx.realm.clone();
        let loader: RowLoader<GroupRepresentation> = Arc::new(move |first, max| {
            let admin = Arc::clone(&admin);
            let realm = realm.clone();
            Box::pin(async move { admin.list_groups(&realm, first, max).await })
        });

        let groups = DataTable::new(loader, group_columns(), Arc::clone(&ctx.resolver))
            .with_title(" Groups ")
            .paginated(PAGE_SIZE)
            .multi_select()
            .with_empty_state(
                EmptyState::new(
                    "No groups in this realm",
                    "Groups let you manage attributes and role mappings for sets of users.",
                )
                .with_primary_hint("Press c to create the first group"),
            );

        let pending_delete: Arc<Mutex<Vec<GroupRepresentation>>> = Arc::new(Mutex::new(Vec::new()));
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
                    let groups = pending
                        .lock()
                        .map(|mut p| std::mem::take(&mut *p))
                        .unwrap_or_default();
                    if groups.is_empty() {
                        return;
                    }

                    let mut deleted = 0usize;
                    for group in &groups {
                        let Some(id) = group.id.as_deref() else {
                            continue;
                        };
                        match admin.delete_group(&realm, id).await {
                            Ok(()) => deleted += 1,
                            Err(e) => alerts.add_alert(
                                format!("Failed to delete group {}: {e}", group.name),
                                Severity::Error,
                            ),
                        }
                    }
                    if deleted > 0 {
                        let message = if deleted == 1 {
                            format!("Deleted group {}", groups[0].name)
                        } else {
                            format!("Deleted {deleted} groups")
                        };
                        alerts.add_alert(message, Severity::Success);
                        let _ = msg_tx.send(GroupsMsg::Reload);
                    }
                })
            })
        };

        let confirm_delete = ConfirmDialog::new("", on_delete, Arc::clone(&ctx.resolver))
            .with_title("Delete groups")
            .with_confirm_text("Delete")
            .with_cancel_text("Keep")
            .danger();

        let pending_removal: Arc<Mutex<Option<(String, Vec<UserRepresentation>)>>> =
            Arc::new(Mutex::new(None));
        let on_remove: ConfirmAction = {
            let admin = Arc::clone(&ctx.admin);
            let realm = ctx.realm.clone();
            let alerts = ctx.alerts.clone();
            let pending = Arc::clone(&pending_removal);
            let msg_tx = msg_tx.clone();
            Arc::new(move || {
                let admin = Arc::clone(&admin);
                let realm = realm.clone();
                let alerts = alerts.clone();
                let pending = Arc::clone(&pending);
                let msg_tx = msg_tx.clone();
                Box::pin(async move {
                    let Some((group_id, members)) =
                        pending.lock().ok().and_then(|mut p| p.take())
                    else {
                        return;
                    };

                    let mut removed = 0usize;
                    for member in &members {
                        let Some(user_id) = member.id.as_deref() else {
                            continue;
                        };
                        match admin.remove_user_from_group(&realm, user_id, &group_id).await {
                            Ok(()) => removed += 1,
                            Err(e) => alerts.add_alert(
                                format!("Failed to remove {}: {e}", member.username),
                                Severity::Error,
                            ),
                        }
                    }
                    if removed > 0 {
                        let message = if removed == 1 {
                            format!("Removed {} from the group", members[0].username)
                        } else {
                            format!("Removed {removed} members from the group")
                        };
                        alerts.add_alert(message, Severity::Success);
                        let _ = msg_tx.send(GroupsMsg::Reload);
                    }
                })
            })
        };

        let confirm_remove = ConfirmDialog::new("", on_remove, Arc::clone(&ctx.resolver))
            .with_title("Remove members")
            .with_confirm_text("Remove")
            .with_cancel_text("Keep")
            .danger();

        Self {
            ctx,
            groups,
            state: State::Groups,
            confirm_delete,
            confirm_remove,
            create_input: None,
            pending_delete,
            pending_removal,
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: GroupsMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn member_table(&self, group_id: String) -> DataTable<UserRepresentation> {
        let admin = Arc::clone(&self.ctx.admin);
        let realm = self.ctx.realm.clone();
        let loader: RowLoader<UserRepresentation> = Arc::new(move |first, max| {
            let admin = Arc::clone(&admin);
            let realm = realm.clone();
            let group_id = group_id.clone();
            Box::pin(async move { admin.list_group_members(&realm, &group_id, first, max).await })
        });

        DataTable::new(loader, member_columns(), Arc::clone(&self.ctx.resolver))
            .with_title(" Members ")
            .paginated(PAGE_SIZE)
            .multi_select()
            .with_empty_state(EmptyState::new(
                "No members in this group",
                "Users join groups through the admin API or their group mappings.",
            ))
    }

    fn open_members(&mut self, group: GroupRepresentation) {
        let Some(group_id) = group.id.clone() else {
            return;
        };
        let mut table = self.member_table(group_id);
        table.refresh();
        self.state = State::Members { group, table };
    }

    fn open_delete_dialog(&mut self) {
        let marked = self.groups.marked_items();
        let targets = if marked.is_empty() {
            match self.groups.selected_item().cloned() {
                Some(group) => vec![group],
                None => return,
            }
        } else {
            marked
        };

        let message = if targets.len() == 1 {
            format!("Delete group \"{}\"?", targets[0].name)
        } else {
            format!("Delete {} groups?", targets.len())
        };
        self.confirm_delete.set_message(message);
        if let Ok(mut pending) = self.pending_delete.lock() {
            *pending = targets;
        }
        self.confirm_delete.toggle();
    }

    fn open_remove_dialog(&mut self) {
        let State::Members { group, table } = &self.state else {
            return;
        };
        let Some(group_id) = group.id.clone() else {
            return;
        };

        let marked = table.marked_items();
        let targets = if marked.is_empty() {
            match table.selected_item().cloned() {
                Some(member) => vec![member],
                None => return,
            }
        } else {
            marked
        };

        let message = if targets.len() == 1 {
            format!("Remove \"{}\" from {}?", targets[0].username, group.name)
        } else {
            format!("Remove {} members from {}?", targets.len(), group.name)
        };
        self.confirm_remove.set_message(message);
        if let Ok(mut pending) = self.pending_removal.lock() {
            *pending = Some((group_id, targets));
        }
        self.confirm_remove.toggle();
    }

    fn create_group(&self, name: String) {
        let admin = Arc::clone(&self.ctx.admin);
        let realm = self.ctx.realm.clone();
        let alerts = self.ctx.alerts.clone();
        let msg_tx = self.msg_tx.clone();
        tokio::spawn(async move {
            match admin.create_group(&realm, &name).await {
                Ok(()) => {
                    alerts.add_alert(format!("Created group {name}"), Severity::Success);
                    let _ = msg_tx.send(GroupsMsg::Reload);
                }
                Err(e) if e.is_conflict() => {
                    alerts.add_alert(format!("Group {name} already exists"), Severity::Warning);
                }
                Err(e) => {
                    alerts.add_alert(format!("Failed to create group {name}: {e}"), Severity::Error);
                }
            }
        });
    }
}

impl Page for GroupsPage {
    fn init(&mut self) {
        self.queue(GroupsMsg::Reload);
    }

    fn handle_tick(&mut self) {
        match &mut self.state {
            State::Groups => self.groups.on_tick(),
            State::Members { table, .. } => table.on_tick(),
        }
    }

    fn handle_input(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };

        if self.confirm_delete.is_open() {
            return self.confirm_delete.handle_key(*key).process().0;
        }
        if self.confirm_remove.is_open() {
            return self.confirm_remove.handle_key(*key).process().0;
        }

        if let Some(input) = &mut self.create_input {
            match input.handle_key(*key) {
                Ok(Handled::Event(TextInputEvent::Submitted(name))) => {
                    self.create_input = None;
                    let name = name.trim().to_string();
                    if !name.is_empty() {
                        self.queue(GroupsMsg::CreateSubmitted(name));
                    }
                }
                Ok(Handled::Event(TextInputEvent::Cancelled)) => {
                    self.create_input = None;
                }
                _ => {}
            }
            return true;
        }

        let resolver = Arc::clone(&self.ctx.resolver);
        match &mut self.state {
            State::Groups => {
                let (consumed, table_event) = self.groups.handle_key(*key).process();
                if let Some(TableEvent::Activated(group)) = table_event {
                    self.queue(GroupsMsg::OpenMembers(group));
                    return true;
                }
                if consumed {
                    return true;
                }
                if resolver.matches_list(key, ListAction::Reload) {
                    self.queue(GroupsMsg::Reload);
                    return true;
                }
                if resolver.matches_list(key, ListAction::Create) {
                    self.create_input =
                        Some(TextInputComponent::new("New group").with_placeholder("group name"));
                    return true;
                }
                if resolver.matches_list(key, ListAction::Delete) {
                    self.queue(GroupsMsg::DeleteMarkedOrSelected);
                    return true;
                }
                false
            }
            State::Members { table, .. } => {
                let (consumed, _) = table.handle_key(*key).process();
                if consumed {
                    return true;
                }
                if resolver.matches_global(key, GlobalAction::Back) {
                    self.queue(GroupsMsg::BackToGroups);
                    return true;
                }
                if resolver.matches_list(key, ListAction::Reload) {
                    self.queue(GroupsMsg::Reload);
                    return true;
                }
                if resolver.matches_list(key, ListAction::Delete) {
                    self.queue(GroupsMsg::RemoveMarkedOrSelectedMembers);
                    return true;
                }
                false
            }
        }
    }

    fn update(&mut self) -> UpdateResult {
        let outcome = match &mut self.state {
            State::Groups => self.groups.poll(),
            State::Members { table, .. } => table.poll(),
        };
        if let Some(LoadOutcome::Failed { error }) = outcome {
            self.ctx
                .alerts
                .add_alert(format!("Failed to load groups: {error}"), Severity::Error);
        }

        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                GroupsMsg::Reload => match &mut self.state {
                    State::Groups => self.groups.refresh(),
                    State::Members { table, .. } => table.refresh(),
                },
                GroupsMsg::DeleteMarkedOrSelected => self.open_delete_dialog(),
                GroupsMsg::CreateSubmitted(name) => self.create_group(name),
                GroupsMsg::OpenMembers(group) => self.open_members(group),
                GroupsMsg::BackToGroups => {
                    self.state = State::Groups;
                    self.groups.refresh();
                }
                GroupsMsg::RemoveMarkedOrSelectedMembers => self.open_remove_dialog(),
            }
        }
        UpdateResult::Idle
    }

    fn view(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match &mut self.state {
            State::Groups => self.groups.render(frame, area, theme),
            State::Members { table, .. } => table.render(frame, area, theme),
        }
        if let Some(input) = &mut self.create_input {
            input.render(frame, area, theme);
        }
        self.confirm_delete.render(frame, area, theme);
        self.confirm_remove.render(frame, area, theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        let mut bc = vec![self.ctx.realm.clone(), "Groups".to_string()];
        if let State::Members { group, .. } = &self.state {
            bc.push(group.name.clone());
            bc.push("Members".to_string());
        }
        bc
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let resolver = &self.ctx.resolver;
        match self.state {
            State::Groups => vec![
                Keybinding::hint(resolver.display_nav(NavAction::Select), "Members"),
                Keybinding::hint(resolver.display_list(ListAction::Create), "Create"),
                Keybinding::hint(resolver.display_list(ListAction::Delete), "Delete"),
                Keybinding::hint(resolver.display_list(ListAction::Mark), "Mark"),
                Keybinding::hint(resolver.display_list(ListAction::MarkAll), "Mark all"),
                Keybinding::hint(resolver.display_list(ListAction::Reload), "Reload"),
                Keybinding::hint(resolver.display_search(SearchAction::Toggle), "Search"),
            ],
            State::Members { .. } => vec![
                Keybinding::hint(resolver.display_list(ListAction::Delete), "Remove"),
                Keybinding::hint(resolver.display_list(ListAction::Mark), "Mark"),
                Keybinding::hint(resolver.display_list(ListAction::MarkAll), "Mark all"),
                Keybinding::hint(resolver.display_list(ListAction::Reload), "Reload"),
                Keybinding::hint(resolver.display_search(SearchAction::Toggle), "Search"),
            ],
        }
    }
}
