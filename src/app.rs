//! Application shell: routing, the message loop, and global chrome.
//!
//! The app owns the terminal, the active route (realm selector → section
//! selector → entity page), any modal overlay, and the toast stack. All
//! state transitions flow through [`AppMessage`]s drained in
//! `handle_messages`.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::Theme;
use crate::cli::Args;
use crate::client::AdminClient;
use crate::config::{self, GlobalAction, KeyResolver};
use crate::core::command::{Command, CommandEnv};
use crate::core::message::AppMessage;
use crate::core::page::{Page, UpdateResult};
use crate::pages::{PageContext, RealmsPage, Section, SectionsPage};
use crate::tui::{Event, Tui};
use crate::ui::error_dialog::ErrorDialogEvent;
use crate::ui::theme_selector::ThemeEvent;
use crate::ui::{
    Component, ErrorDialog, HandledResultExt, StatusBarView, ThemeSelectorView, Toast,
    ToastManager,
};

enum Route {
    Realms(RealmsPage),
    Sections(SectionsPage),
    Active(Box<dyn Page>),
}

enum Overlay {
    None,
    Error(ErrorDialog),
    ThemeSelector(ThemeSelectorView),
}

pub struct App {
    admin: Arc<AdminClient>,
    resolver: Arc<KeyResolver>,
    theme: Theme,
    route: Route,
    overlay: Overlay,
    toasts: ToastManager,
    status_bar: StatusBarView,
    /// Set once a realm is selected; cleared when returning to the selector.
    context: Option<PageContext>,
    env: CommandEnv,
    msg_tx: UnboundedSender<AppMessage>,
    msg_rx: UnboundedReceiver<AppMessage>,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(admin: Arc<AdminClient>, resolver: Arc<KeyResolver>, theme: Theme) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let alerts = crate::ui::Alerts::new(msg_tx.clone());
        let env = CommandEnv::new(alerts.clone());

        let realms = RealmsPage::new(
            Arc::clone(&admin),
            alerts,
            Arc::clone(&resolver),
            msg_tx.clone(),
        );

        let mut status_bar = StatusBarView::new(Arc::clone(&resolver));
        status_bar.set_server(admin.server_url());

        Self {
            admin,
            resolver,
            theme,
            route: Route::Realms(realms),
            overlay: Overlay::None,
            toasts: ToastManager::new(),
            status_bar,
            context: None,
            env,
            msg_tx,
            msg_rx,
            should_quit: false,
            should_suspend: false,
        }
    }

    /// Apply startup flags: `--realm` jumps straight into a realm.
    pub fn apply_cli_args(&mut self, args: &Args) {
        if let Some(realm) = &args.realm {
            self.enter_realm(realm);
        }
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new(60.0, 4.0)?;
        tui.enter()?;

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_messages(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                self.msg_tx.send(AppMessage::Resume)?;
                self.msg_tx.send(AppMessage::ClearScreen)?;
                tui.enter()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    fn page_mut(&mut self) -> &mut dyn Page {
        match &mut self.route {
            Route::Realms(page) => page,
            Route::Sections(page) => page,
            Route::Active(page) => page.as_mut(),
        }
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };

        match event {
            Event::Init => {
                self.page_mut().init();
                self.run_update();
            }
            Event::Quit => self.msg_tx.send(AppMessage::Quit)?,
            Event::Tick => self.msg_tx.send(AppMessage::Tick)?,
            Event::Render => self.msg_tx.send(AppMessage::Render)?,
            Event::Resize(width, height) => self.msg_tx.send(AppMessage::Resize(width, height))?,
            Event::Error(error) => self.msg_tx.send(AppMessage::DisplayError(error))?,
            Event::Key(key) => self.handle_key_event(key, &event),
            _ => {}
        }

        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent, event: &Event) {
        // Overlays are modal: they see every key until dismissed.
        match &mut self.overlay {
            Overlay::Error(dialog) => {
                if let (_, Some(ErrorDialogEvent::Dismissed)) = dialog.handle_key(key).process() {
                    self.overlay = Overlay::None;
                }
                return;
            }
            Overlay::ThemeSelector(selector) => {
                match selector.handle_key(key).process().1 {
                    Some(ThemeEvent::Cancelled) => self.overlay = Overlay::None,
                    Some(ThemeEvent::Selected(info)) => {
                        if let Err(e) = config::save_theme(info.name) {
                            warn!("Failed to persist theme selection: {e}");
                        }
                        let _ = self.msg_tx.send(AppMessage::SelectTheme(info.theme));
                        self.overlay = Overlay::None;
                    }
                    None => {}
                }
                return;
            }
            Overlay::None => {}
        }

        if self.page_mut().handle_input(event) {
            self.run_update();
            return;
        }

        // Keys the page ignored fall through to the global bindings.
        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            let _ = self.msg_tx.send(AppMessage::Quit);
        } else if self.resolver.matches_global(&key, GlobalAction::Theme) {
            let _ = self.msg_tx.send(AppMessage::DisplayThemeSelector);
        } else if self.resolver.matches_global(&key, GlobalAction::Back) {
            let _ = self.msg_tx.send(AppMessage::GoBack);
        } else if self.resolver.matches_global(&key, GlobalAction::Suspend) {
            let _ = self.msg_tx.send(AppMessage::Suspend);
        }
    }

    fn handle_messages(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        while let Ok(message) = self.msg_rx.try_recv() {
            if !matches!(message, AppMessage::Tick | AppMessage::Render) {
                debug!("Handling message: {:?}", message);
            }

            match message {
                AppMessage::Tick => {
                    self.toasts.on_tick();
                    self.page_mut().handle_tick();
                    // Applies pending load results even without user input.
                    self.run_update();
                }
                AppMessage::Render => self.render(tui)?,
                AppMessage::Resize(width, height) => {
                    tui.resize(Rect::new(0, 0, width, height))?;
                    self.render(tui)?;
                }
                AppMessage::Suspend => self.should_suspend = true,
                AppMessage::Resume => self.should_suspend = false,
                AppMessage::Quit => self.should_quit = true,
                AppMessage::ClearScreen => tui.clear()?,
                AppMessage::DisplayError(error) => {
                    self.overlay =
                        Overlay::Error(ErrorDialog::new(error, Arc::clone(&self.resolver)));
                }
                AppMessage::DisplayThemeSelector => {
                    self.overlay =
                        Overlay::ThemeSelector(ThemeSelectorView::new(Arc::clone(&self.resolver)));
                }
                AppMessage::Notify { message, severity } => {
                    self.toasts.show(Toast::new(message, severity));
                }
                AppMessage::SelectRealm(realm) => {
                    if let Err(e) = config::save_last_realm(&realm.realm) {
                        warn!("Failed to persist last realm: {e}");
                    }
                    self.enter_realm(&realm.realm);
                }
                AppMessage::OpenSection(section) => self.open_section(section),
                AppMessage::SelectTheme(theme) => self.theme = theme,
                AppMessage::GoBack => self.go_back(),
            }
        }
        Ok(())
    }

    fn run_update(&mut self) {
        let result = self.page_mut().update();
        match result {
            UpdateResult::Idle => {}
            UpdateResult::Commands(commands) => self.spawn_commands(commands),
            UpdateResult::Close => {
                let _ = self.msg_tx.send(AppMessage::GoBack);
            }
            UpdateResult::Error(error) => {
                let _ = self.msg_tx.send(AppMessage::DisplayError(error));
            }
        }
    }

    fn spawn_commands(&self, commands: Vec<Box<dyn Command>>) {
        for command in commands {
            let tx = self.msg_tx.clone();
            tokio::spawn(async move {
                let name = command.name();
                debug!("Executing command: {name}");
                if let Err(e) = command.execute().await {
                    let _ = tx.send(AppMessage::DisplayError(format!("{name} failed: {e}")));
                }
            });
        }
    }

    fn enter_realm(&mut self, realm: &str) {
        let alerts = crate::ui::Alerts::new(self.msg_tx.clone());
        let ctx = PageContext {
            admin: Arc::clone(&self.admin),
            realm: realm.to_string(),
            alerts,
            resolver: Arc::clone(&self.resolver),
            app_tx: self.msg_tx.clone(),
            env: self.env.clone(),
        };
        self.status_bar.set_realm(realm);
        self.route = Route::Sections(SectionsPage::new(ctx.clone()));
        self.context = Some(ctx);
    }

    fn open_section(&mut self, section: Section) {
        let Some(ctx) = self.context.clone() else {
            return;
        };
        let mut page = ctx.open(section);
        page.init();
        self.route = Route::Active(page);
        self.run_update();
    }

    fn go_back(&mut self) {
        match &mut self.route {
            Route::Active(page) => {
                page.destroy();
                if let Some(ctx) = self.context.clone() {
                    self.route = Route::Sections(SectionsPage::new(ctx));
                }
            }
            Route::Sections(_) => {
                self.context = None;
                self.status_bar.clear_realm();
                let mut realms = RealmsPage::new(
                    Arc::clone(&self.admin),
                    crate::ui::Alerts::new(self.msg_tx.clone()),
                    Arc::clone(&self.resolver),
                    self.msg_tx.clone(),
                );
                realms.init();
                self.route = Route::Realms(realms);
                self.run_update();
            }
            Route::Realms(_) => {}
        }
    }

    fn render(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let theme = self.theme;
        let Self {
            route,
            overlay,
            toasts,
            status_bar,
            ..
        } = self;
        let page: &mut dyn Page = match route {
            Route::Realms(page) => page,
            Route::Sections(page) => page,
            Route::Active(page) => page.as_mut(),
        };

        tui.draw(|frame| {
            let area = frame.area();
            let chunks = Layout::vertical([
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(8),
            ])
            .split(area);

            let crumbs = page.breadcrumbs().join(" ▸ ");
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    format!(" {crumbs}"),
                    Style::default().fg(theme.subtext0()),
                ))),
                chunks[0],
            );

            page.view(frame, chunks[1], &theme);

            let bindings = page.keybindings();
            status_bar.render_with_keybindings(frame, chunks[2], &theme, &bindings);

            match overlay {
                Overlay::Error(dialog) => dialog.render(frame, area, &theme),
                Overlay::ThemeSelector(selector) => selector.render(frame, area, &theme),
                Overlay::None => {}
            }

            toasts.render(frame, chunks[1], &theme);
        })?;
        Ok(())
    }
}
