use crate::config::actions::*;
use crate::config::keybindings::KeybindingsConfig;
use crossterm::event::KeyEvent;
use std::sync::Arc;

pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Theme => kb.theme.matches(event),
            GlobalAction::Back => kb.back.matches(event),
            GlobalAction::Suspend => kb.suspend.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::Theme => kb.theme.display(),
            GlobalAction::Back => kb.back.display(),
            GlobalAction::Suspend => kb.suspend.display(),
        }
    }

    // Navigation actions
    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.matches(event),
            NavAction::Down => kb.down.matches(event),
            NavAction::PageUp => kb.page_up.matches(event),
            NavAction::PageDown => kb.page_down.matches(event),
            NavAction::Home => kb.home.matches(event),
            NavAction::End => kb.end.matches(event),
            NavAction::Select => kb.select.matches(event),
        }
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.display(),
            NavAction::Down => kb.down.display(),
            NavAction::PageUp => kb.page_up.display(),
            NavAction::PageDown => kb.page_down.display(),
            NavAction::Home => kb.home.display(),
            NavAction::End => kb.end.display(),
            NavAction::Select => kb.select.display(),
        }
    }

    // Search actions
    pub fn matches_search(&self, event: &KeyEvent, action: SearchAction) -> bool {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => kb.toggle.matches(event),
            SearchAction::Exit => kb.exit.matches(event),
        }
    }

    pub fn display_search(&self, action: SearchAction) -> String {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => kb.toggle.display(),
            SearchAction::Exit => kb.exit.display(),
        }
    }

    // List actions
    pub fn matches_list(&self, event: &KeyEvent, action: ListAction) -> bool {
        let kb = &self.keybindings.list;
        match action {
            ListAction::Reload => kb.reload.matches(event),
            ListAction::Create => kb.create.matches(event),
            ListAction::Delete => kb.delete.matches(event),
            ListAction::Mark => kb.mark.matches(event),
            ListAction::MarkAll => kb.mark_all.matches(event),
            ListAction::NextPage => kb.next_page.matches(event),
            ListAction::PrevPage => kb.prev_page.matches(event),
            ListAction::CopyId => kb.copy_id.matches(event),
        }
    }

    pub fn display_list(&self, action: ListAction) -> String {
        let kb = &self.keybindings.list;
        match action {
            ListAction::Reload => kb.reload.display(),
            ListAction::Create => kb.create.display(),
            ListAction::Delete => kb.delete.display(),
            ListAction::Mark => kb.mark.display(),
            ListAction::MarkAll => kb.mark_all.display(),
            ListAction::NextPage => kb.next_page.display(),
            ListAction::PrevPage => kb.prev_page.display(),
            ListAction::CopyId => kb.copy_id.display(),
        }
    }

    // Federation actions
    pub fn matches_federation(&self, event: &KeyEvent, action: FederationAction) -> bool {
        let kb = &self.keybindings.federation;
        match action {
            FederationAction::Mappers => kb.mappers.matches(event),
        }
    }

    pub fn display_federation(&self, action: FederationAction) -> String {
        let kb = &self.keybindings.federation;
        match action {
            FederationAction::Mappers => kb.mappers.display(),
        }
    }

    // Clients actions
    pub fn matches_clients(&self, event: &KeyEvent, action: ClientsAction) -> bool {
        let kb = &self.keybindings.clients;
        match action {
            ClientsAction::InitialAccess => kb.initial_access.matches(event),
        }
    }

    pub fn display_clients(&self, action: ClientsAction) -> String {
        let kb = &self.keybindings.clients;
        match action {
            ClientsAction::InitialAccess => kb.initial_access.display(),
        }
    }

    // Dialog actions
    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => kb.confirm.matches(event),
            DialogAction::Cancel => kb.cancel.matches(event),
            DialogAction::Dismiss => kb.dismiss.matches(event),
        }
    }
}
