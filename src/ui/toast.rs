//! Transient notification toasts and the page-facing alert handle.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use crate::Theme;
use crate::core::message::AppMessage;
use crate::ui::Component;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Handle for raising alerts from anywhere in the application.
///
/// Clone is cheap; the handle is captured inside confirm actions and load
/// callbacks, so every outcome surfaces as a toast regardless of which task
/// produced it.
#[derive(Clone)]
pub struct Alerts {
    tx: UnboundedSender<AppMessage>,
}

impl Alerts {
    pub fn new(tx: UnboundedSender<AppMessage>) -> Self {
        Self { tx }
    }

    pub fn add_alert(&self, message: impl Into<String>, severity: Severity) {
        let _ = self.tx.send(AppMessage::Notify {
            message: message.into(),
            severity,
        });
    }
}

pub struct Toast {
    message: String,
    severity: Severity,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            created_at: Instant::now(),
            duration: Duration::from_secs(3),
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    max_visible: usize,
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            max_visible: 3,
        }
    }

    pub fn show(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
        // Keep only max_visible toasts
        while self.toasts.len() > self.max_visible {
            self.toasts.pop_front();
        }
    }
}

impl Component for ToastManager {
    type Output = ();

    fn on_tick(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if self.toasts.is_empty() {
            return;
        }

        let toast_height = 3u16;
        let toast_width = 50u16.min(area.width.saturating_sub(4));
        let spacing = 1u16;

        // Stack toasts from bottom-right, going upward
        for (i, toast) in self.toasts.iter().enumerate() {
            let y_offset = (i as u16) * (toast_height + spacing);
            let y = area.y + area.height.saturating_sub(toast_height + y_offset + 1);
            let x = area.x + area.width.saturating_sub(toast_width + 2);

            if y < area.y {
                break; // No more room
            }

            let toast_area = Rect::new(x, y, toast_width, toast_height);

            let (border_color, icon) = match toast.severity {
                Severity::Success => (theme.success(), "✓"),
                Severity::Info => (theme.info(), "ℹ"),
                Severity::Warning => (theme.warning(), "!"),
                Severity::Error => (theme.error(), "✗"),
            };

            frame.render_widget(Clear, toast_area);

            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .style(Style::default().bg(theme.surface0()));

            let inner = block.inner(toast_area);
            frame.render_widget(block, toast_area);

            let content_area = Layout::default()
                .constraints([Constraint::Fill(1)])
                .split(inner)[0];

            let text = format!("{} {}", icon, toast.message);
            let paragraph = Paragraph::new(text)
                .style(
                    Style::default()
                        .fg(theme.text())
                        .add_modifier(Modifier::BOLD),
                )
                .alignment(Alignment::Center);

            frame.render_widget(paragraph, content_area);
        }
    }
}
