//! Application-level messages.
//!
//! Messages represent internal communication within the application.
//!
//! # Terminology
//! - **Event**: Input from the world (keyboard, timer) - see [`crate::tui::Event`]
//! - **Message**: Internal communication driving state transitions
//! - **Command**: Async side effect operations - see [`crate::core::command::Command`]
//!
//! # Design
//! This enum only contains app-level messages for state transitions.
//! Page-specific messages are handled locally within each page using
//! their own message channels (e.g., `ClientsMsg`).

use crate::client::RealmRepresentation;
use crate::pages::Section;
use crate::theme::Theme;
use crate::ui::toast::Severity;

/// Application-level messages for state transitions and global state.
#[derive(Debug, Clone)]
pub enum AppMessage {
    // === Lifecycle ===
    /// Periodic tick for animations and polling
    Tick,
    /// Render the UI
    Render,
    /// Terminal resized
    Resize(u16, u16),
    /// Suspend the application (Ctrl+Z)
    Suspend,
    /// Resume from suspension
    Resume,
    /// Quit the application
    Quit,
    /// Clear and redraw the screen
    ClearScreen,

    // === Feedback ===
    /// Display an error to the user
    DisplayError(String),
    /// Display theme selector overlay
    DisplayThemeSelector,
    /// Show a transient notification toast
    Notify { message: String, severity: Severity },

    // === Phase Transitions ===
    /// User selected a realm, transition to section selection
    SelectRealm(RealmRepresentation),
    /// User selected a section, transition to the entity page
    OpenSection(Section),
    /// User selected a theme
    SelectTheme(Theme),
    /// Return to the previous state (entity page → sections, sections → realms)
    GoBack,
}
