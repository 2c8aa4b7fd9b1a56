use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub theme: KeyBinding,
    pub back: KeyBinding,
    pub suspend: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationKeybindings {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub home: KeyBinding,
    pub end: KeyBinding,
    pub select: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchKeybindings {
    pub toggle: KeyBinding,
    pub exit: KeyBinding,
}

/// Keybindings shared by all entity list pages (clients, groups, users, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListKeybindings {
    pub reload: KeyBinding,
    pub create: KeyBinding,
    pub delete: KeyBinding,
    pub mark: KeyBinding,
    pub mark_all: KeyBinding,
    pub next_page: KeyBinding,
    pub prev_page: KeyBinding,
    pub copy_id: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationKeybindings {
    pub mappers: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientsKeybindings {
    pub initial_access: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogKeybindings {
    pub confirm: KeyBinding,
    pub cancel: KeyBinding,
    pub dismiss: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub navigation: NavigationKeybindings,
    pub search: SearchKeybindings,
    pub list: ListKeybindings,
    pub federation: FederationKeybindings,
    pub clients: ClientsKeybindings,
    pub dialog: DialogKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            theme: Key::new(KeyCode::Char('t')).into(),
            back: Key::new(KeyCode::Esc).into(),
            suspend: Key::with_ctrl(KeyCode::Char('z')).into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::multiple(vec![Key::new(KeyCode::Char('k')), Key::new(KeyCode::Up)]),
            down: KeyBinding::multiple(vec![Key::new(KeyCode::Char('j')), Key::new(KeyCode::Down)]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: KeyBinding::multiple(vec![Key::new(KeyCode::Char('g')), Key::new(KeyCode::Home)]),
            end: KeyBinding::multiple(vec![Key::new(KeyCode::Char('G')), Key::new(KeyCode::End)]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for SearchKeybindings {
    fn default() -> Self {
        Self {
            toggle: Key::new(KeyCode::Char('/')).into(),
            exit: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for ListKeybindings {
    fn default() -> Self {
        Self {
            reload: Key::new(KeyCode::Char('r')).into(),
            create: Key::new(KeyCode::Char('c')).into(),
            delete: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('d')),
                Key::new(KeyCode::Delete),
            ]),
            mark: Key::new(KeyCode::Char(' ')).into(),
            mark_all: Key::new(KeyCode::Char('a')).into(),
            next_page: Key::new(KeyCode::Char(']')).into(),
            prev_page: Key::new(KeyCode::Char('[')).into(),
            copy_id: Key::new(KeyCode::Char('y')).into(),
        }
    }
}

impl Default for FederationKeybindings {
    fn default() -> Self {
        Self {
            mappers: Key::new(KeyCode::Char('m')).into(),
        }
    }
}

impl Default for ClientsKeybindings {
    fn default() -> Self {
        Self {
            initial_access: Key::new(KeyCode::Char('i')).into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            confirm: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('y')),
                Key::new(KeyCode::Char('Y')),
                Key::new(KeyCode::Enter),
            ]),
            cancel: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('n')),
                Key::new(KeyCode::Char('N')),
                Key::new(KeyCode::Esc),
            ]),
            dismiss: KeyBinding::multiple(vec![
                Key::new(KeyCode::Enter),
                Key::new(KeyCode::Esc),
                Key::new(KeyCode::Char('q')),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    #[test]
    fn test_default_suspend_binding() {
        let kb = KeybindingsConfig::default();
        let ctrl_z = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL);
        assert!(kb.global.suspend.matches(&ctrl_z));

        // Plain z must not suspend.
        let z = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE);
        assert!(!kb.global.suspend.matches(&z));
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = KeybindingsConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: KeybindingsConfig = toml::from_str(&serialized).unwrap();
        assert!(
            parsed
                .clients
                .initial_access
                .matches(&KeyEvent::new(KeyCode::Char('i'), KeyModifiers::NONE))
        );
    }
}
