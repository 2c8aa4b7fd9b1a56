//! Contract shared by the reusable UI widgets.

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Theme;
use crate::ui::{Handled, Result};

/// A focusable widget that turns key presses into typed outputs.
///
/// Components stay domain-free: a [`crate::ui::DataTable`] knows how to
/// page and mark rows, not what a realm or a client is. Pages translate
/// the emitted outputs into admin actions.
pub trait Component {
    /// What the component emits (`TableEvent<T>`, `TextInputEvent`, ...).
    type Output;

    /// Feed one key press.
    ///
    /// `Ignored` lets the parent try its own bindings, `Consumed` swallows
    /// the key, `Event` carries an output for the parent to act on.
    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled<Self::Output>> {
        _ = key;
        Ok(Handled::Ignored)
    }

    /// Advance animations; driven by the app tick, not by input.
    fn on_tick(&mut self) {}

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}
