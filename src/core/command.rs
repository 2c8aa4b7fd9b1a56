//! Async command pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Pages return commands, and the App spawns them with automatic completion
//! detection and error reporting.

mod clipboard;
mod env;

use async_trait::async_trait;
pub use clipboard::CopyToClipboardCmd;
pub use env::CommandEnv;

/// Async command that performs side effects.
///
/// Commands are spawned by the App. They typically send results back to the
/// page via a channel.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logging and error display.
    /// Include context like client IDs, group names, etc.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>) -> color_eyre::Result<()>;
}
