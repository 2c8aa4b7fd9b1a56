//! Modal confirmation dialog with an owned open/closed state.
//!
//! The dialog holds the action to run on confirmation. Confirming spawns the
//! action as a fire-and-forget task and closes the dialog immediately; the
//! action reports its own outcome (e.g. via [`crate::ui::toast::Alerts`]).
//! The dialog always ends up closed, whether the action succeeds or not.

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::ui::{Component, Handled, Result};
use crossterm::event::KeyEvent;
use futures::future::BoxFuture;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::sync::Arc;

/// Async action executed when the user confirms.
pub type ConfirmAction = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

pub enum ConfirmEvent {
    Confirmed,
    Cancelled,
}

#[derive(Default, Clone, Copy)]
pub enum ConfirmStyle {
    #[default]
    Normal,
    /// Shows red warning styling.
    Danger,
}

pub struct ConfirmDialog {
    title: String,
    message: String,
    confirm_text: String,
    cancel_text: String,
    style: ConfirmStyle,
    open: bool,
    on_confirm: ConfirmAction,
    on_cancel: Option<Box<dyn Fn() + Send>>,
    resolver: Arc<KeyResolver>,
}

impl ConfirmDialog {
    pub fn new(
        message: impl Into<String>,
        on_confirm: ConfirmAction,
        resolver: Arc<KeyResolver>,
    ) -> Self {
        Self {
            title: "Confirm".to_string(),
            message: message.into(),
            confirm_text: "Yes".to_string(),
            cancel_text: "No".to_string(),
            style: ConfirmStyle::Normal,
            open: false,
            on_confirm,
            on_cancel: None,
            resolver,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = text.into();
        self
    }

    pub fn with_cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = text.into();
        self
    }

    pub fn with_on_cancel(mut self, on_cancel: impl Fn() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(on_cancel));
        self
    }

    pub fn danger(mut self) -> Self {
        self.style = ConfirmStyle::Danger;
        self
    }

    /// Flip between open and closed. An even number of toggles always
    /// returns the dialog to its original state.
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Update the message shown next time the dialog opens. The caller
    /// typically stashes the pending subject alongside this.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }
}

impl Component for ConfirmDialog {
    type Output = ConfirmEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled<Self::Output>> {
        if !self.open {
            return Ok(Handled::Ignored);
        }

        if self.resolver.matches_dialog(&key, DialogAction::Confirm) {
            // The action runs detached; the dialog closes no matter how
            // the action turns out.
            tokio::spawn((self.on_confirm)());
            self.open = false;
            return Ok(ConfirmEvent::Confirmed.into());
        }
        if self.resolver.matches_dialog(&key, DialogAction::Cancel) {
            if let Some(on_cancel) = &self.on_cancel {
                on_cancel();
            }
            self.open = false;
            return Ok(ConfirmEvent::Cancelled.into());
        }
        // Consume all other keys to prevent propagation
        Ok(Handled::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.open {
            return;
        }

        // Calculate centered popup area
        let popup_area = area.centered(Constraint::Percentage(50), Constraint::Length(7));

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        // Choose colors based on style
        let (title_color, border_color, confirm_color) = match self.style {
            ConfirmStyle::Normal => (theme.mauve(), theme.lavender(), theme.green()),
            ConfirmStyle::Danger => (theme.red(), theme.red(), theme.red()),
        };

        // Build the content
        let message_style = Style::default().fg(theme.text());
        let key_style = Style::default()
            .fg(theme.peach())
            .add_modifier(Modifier::BOLD);
        let confirm_style = Style::default()
            .fg(confirm_color)
            .add_modifier(Modifier::BOLD);
        let cancel_style = Style::default()
            .fg(theme.overlay1())
            .add_modifier(Modifier::BOLD);

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.message.clone(), message_style)),
            Line::from(""),
            Line::from(vec![
                Span::styled("[y]", key_style),
                Span::raw(" "),
                Span::styled(self.confirm_text.clone(), confirm_style),
                Span::raw("    "),
                Span::styled("[n]", key_style),
                Span::raw(" "),
                Span::styled(self.cancel_text.clone(), cancel_style),
            ]),
        ];

        let title = format!(" {} ", self.title);
        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(title_color).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme.base()));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center);

        frame.render_widget(paragraph, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keybindings::KeybindingsConfig;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    fn resolver() -> Arc<KeyResolver> {
        Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn counting_action() -> (ConfirmAction, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let action: ConfirmAction = Arc::new(move || {
            let tx = tx.clone();
            Box::pin(async move {
                let _ = tx.send(());
            })
        });
        (action, rx)
    }

    #[tokio::test]
    async fn test_toggle_is_its_own_inverse() {
        let (action, _rx) = counting_action();
        let mut dialog = ConfirmDialog::new("Delete realm?", action, resolver());

        assert!(!dialog.is_open());
        dialog.toggle();
        assert!(dialog.is_open());
        dialog.toggle();
        assert!(!dialog.is_open());
    }

    #[tokio::test]
    async fn test_confirm_runs_action_once_and_closes() {
        let (action, mut rx) = counting_action();
        let mut dialog = ConfirmDialog::new("Delete group?", action, resolver());
        dialog.toggle();

        let handled = dialog.handle_key(key(KeyCode::Char('y'))).unwrap();
        assert!(matches!(handled, Handled::Event(ConfirmEvent::Confirmed)));
        assert!(!dialog.is_open());

        rx.recv().await.expect("action should run");
        // Exactly once: no second invocation queued.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_never_runs_action() {
        let (action, mut rx) = counting_action();
        let cancelled = Arc::new(AtomicUsize::new(0));
        let cancelled_clone = Arc::clone(&cancelled);
        let mut dialog = ConfirmDialog::new("Delete user?", action, resolver())
            .with_on_cancel(move || {
                cancelled_clone.fetch_add(1, Ordering::SeqCst);
            });
        dialog.toggle();

        let handled = dialog.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(matches!(handled, Handled::Event(ConfirmEvent::Cancelled)));
        assert!(!dialog.is_open());
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);

        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_dialog_ignores_keys() {
        let (action, mut rx) = counting_action();
        let mut dialog = ConfirmDialog::new("Delete client?", action, resolver());

        let handled = dialog.handle_key(key(KeyCode::Char('y'))).unwrap();
        assert!(matches!(handled, Handled::Ignored));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failing_action_still_leaves_dialog_closed() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let action: ConfirmAction = Arc::new(move || {
            let tx = tx.clone();
            Box::pin(async move {
                // Simulates a failed delete: the action reports and returns.
                let _ = tx.send("deletion failed");
            })
        });
        let mut dialog = ConfirmDialog::new("Delete scope?", action, resolver());
        dialog.toggle();

        dialog.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(!dialog.is_open());
        assert_eq!(rx.recv().await, Some("deletion failed"));
        assert!(!dialog.is_open());
    }

    #[tokio::test]
    async fn test_other_keys_are_consumed_while_open() {
        let (action, _rx) = counting_action();
        let mut dialog = ConfirmDialog::new("Delete mapper?", action, resolver());
        dialog.toggle();

        let handled = dialog.handle_key(key(KeyCode::Char('x'))).unwrap();
        assert!(matches!(handled, Handled::Consumed));
        assert!(dialog.is_open());
    }
}
