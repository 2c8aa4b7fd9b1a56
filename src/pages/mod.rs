//! Admin console pages.
//!
//! Each page wires a [`crate::ui::DataTable`] (or list) to one admin API
//! listing, plus the dialogs for creating and deleting entries.

pub mod client_scopes;
pub mod clients;
pub mod federation;
pub mod groups;
pub mod realms;
pub mod sections;
pub mod users;

use std::sync::Arc;

pub use client_scopes::ClientScopesPage;
pub use clients::ClientsPage;
pub use federation::FederationPage;
pub use groups::GroupsPage;
pub use realms::RealmsPage;
pub use sections::SectionsPage;
use tokio::sync::mpsc::UnboundedSender;
pub use users::UsersPage;

use crate::client::AdminClient;
use crate::config::KeyResolver;
use crate::core::command::CommandEnv;
use crate::core::message::AppMessage;
use crate::ui::toast::Alerts;

/// Default page size for paginated listings.
pub const PAGE_SIZE: usize = 20;

/// The sections available inside a realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Clients,
    ClientScopes,
    Groups,
    Users,
    Federation,
}

impl Section {
    pub const fn all() -> [Self; 5] {
        [
            Self::Clients,
            Self::ClientScopes,
            Self::Groups,
            Self::Users,
            Self::Federation,
        ]
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Clients => "Clients",
            Self::ClientScopes => "Client scopes",
            Self::Groups => "Groups",
            Self::Users => "Users",
            Self::Federation => "User federation",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Clients => "Applications and services that can request authentication",
            Self::ClientScopes => "Shared scope definitions clients can map to",
            Self::Groups => "Group hierarchy for managing user attributes and role mappings",
            Self::Users => "User accounts in this realm",
            Self::Federation => "LDAP storage providers and their attribute mappers",
        }
    }
}

/// Shared handles every page needs.
///
/// Clone is cheap (Arc-based); the context is built once per realm and
/// passed to the active page.
#[derive(Clone)]
pub struct PageContext {
    pub admin: Arc<AdminClient>,
    pub realm: String,
    pub alerts: Alerts,
    pub resolver: Arc<KeyResolver>,
    pub app_tx: UnboundedSender<AppMessage>,
    pub env: CommandEnv,
}

impl PageContext {
    /// Build the page for the given section.
    pub fn open(&self, section: Section) -> Box<dyn crate::core::Page> {
        match section {
            Section::Clients => Box::new(ClientsPage::new(self.clone())),
            Section::ClientScopes => Box::new(ClientScopesPage::new(self.clone())),
            Section::Groups => Box::new(GroupsPage::new(self.clone())),
            Section::Users => Box::new(UsersPage::new(self.clone())),
            Section::Federation => Box::new(FederationPage::new(self.clone())),
        }
    }
}
