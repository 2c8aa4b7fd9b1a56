//! Async-loading data table with pagination, row marking and search.
//!
//! The table owns its loading lifecycle: pages hand it a [`RowLoader`] and a
//! refresh key, and the table spawns loads, discards stale results, and
//! renders whichever state it is in (loading spinner, error banner, empty
//! placeholder, or the rows themselves).
//!
//! Loads are keyed by a monotonically increasing generation. Every spawned
//! load captures the generation it was started with; results arriving with
//! an older generation are dropped, so a slow first page can never
//! overwrite a newer reload.

use std::collections::BTreeSet;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use futures::future::BoxFuture;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::prelude::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::Theme;
use crate::client::ApiError;
use crate::config::{KeyResolver, ListAction, NavAction, SearchAction};
use crate::search::Matcher;
use crate::ui::empty_state::EmptyState;
use crate::ui::spinner::SpinnerWidget;
use crate::ui::{Component, Handled, Result};

/// Fetches one page of rows. Arguments are the offset of the first row and
/// the maximum number of rows, both `None` for unpaginated listings.
pub type RowLoader<T> = Arc<
    dyn Fn(Option<usize>, Option<usize>) -> BoxFuture<'static, std::result::Result<Vec<T>, ApiError>>
        + Send
        + Sync,
>;

/// A row the table knows how to display and search.
pub trait TableRow {
    /// Raw string value for the named field, if the row has one.
    fn field(&self, name: &str) -> Option<String>;
}

/// Column description: which field to show, how to label and size it, and
/// optionally how to turn the row into a styled cell.
///
/// Cell content is resolved in order: a `renderer` wins over `formatters`,
/// which win over the raw field value. A missing field renders empty.
pub struct ColumnDef<T> {
    pub header: &'static str,
    pub field: &'static str,
    pub constraint: Constraint,
    pub renderer: Option<fn(&T, &Theme) -> Cell<'static>>,
    pub formatters: &'static [fn(String) -> String],
}

impl<T: TableRow> ColumnDef<T> {
    pub const fn new(header: &'static str, field: &'static str, constraint: Constraint) -> Self {
        Self {
            header,
            field,
            constraint,
            renderer: None,
            formatters: &[],
        }
    }

    pub const fn with_renderer(mut self, renderer: fn(&T, &Theme) -> Cell<'static>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub const fn with_formatters(mut self, formatters: &'static [fn(String) -> String]) -> Self {
        self.formatters = formatters;
        self
    }

    fn cell(&self, row: &T, theme: &Theme) -> Cell<'static> {
        if let Some(renderer) = self.renderer {
            return renderer(row, theme);
        }
        let raw = row.field(self.field).unwrap_or_default();
        let formatted = self.formatters.iter().fold(raw, |value, f| f(value));
        Cell::from(formatted)
    }
}

pub enum TableEvent<T> {
    /// Cursor moved to a different row.
    Changed(T),
    /// Row activated (Enter).
    Activated(T),
    /// The set of marked rows changed. Carries a snapshot in row order.
    SelectionChanged(Vec<T>),
    SearchChanged(String),
}

/// Outcome of a finished load, surfaced to the page via [`DataTable::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { count: usize },
    Failed { error: String },
}

enum LoadState<T> {
    NotLoaded,
    Loading,
    Loaded(Vec<T>),
    Failed(String),
}

pub struct DataTable<T: TableRow + Clone + Send + 'static> {
    loader: RowLoader<T>,
    columns: Vec<ColumnDef<T>>,
    state: LoadState<T>,
    table_state: TableState,
    title: Option<String>,
    filtered_indices: Vec<usize>,
    searching: bool,
    query: String,
    matcher: Matcher,
    /// Marked rows as absolute indices into the loaded page. BTreeSet keeps
    /// snapshots in row order.
    marked: BTreeSet<usize>,
    multi_select: bool,
    page_size: Option<usize>,
    page: usize,
    has_next: bool,
    key: u64,
    generation: u64,
    result_tx: UnboundedSender<(u64, std::result::Result<Vec<T>, ApiError>)>,
    result_rx: UnboundedReceiver<(u64, std::result::Result<Vec<T>, ApiError>)>,
    spinner: SpinnerWidget,
    empty_state: Option<EmptyState>,
    resolver: Arc<KeyResolver>,
}

impl<T: TableRow + Clone + Send + 'static> DataTable<T> {
    pub fn new(loader: RowLoader<T>, columns: Vec<ColumnDef<T>>, resolver: Arc<KeyResolver>) -> Self {
        assert!(!columns.is_empty(), "a table needs at least one column");
        let (result_tx, result_rx) = unbounded_channel();
        let mut spinner = SpinnerWidget::new();
        spinner.set_label("Loading");
        Self {
            loader,
            columns,
            state: LoadState::NotLoaded,
            table_state: TableState::default(),
            title: None,
            filtered_indices: Vec::new(),
            searching: false,
            query: String::new(),
            matcher: Matcher::new(),
            marked: BTreeSet::new(),
            multi_select: false,
            page_size: None,
            page: 0,
            has_next: false,
            key: 0,
            generation: 0,
            result_tx,
            result_rx,
            spinner,
            empty_state: None,
            resolver,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enable server-side pagination with the given page size.
    pub fn paginated(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Allow marking multiple rows for bulk actions.
    pub fn multi_select(mut self) -> Self {
        self.multi_select = true;
        self
    }

    pub fn with_empty_state(mut self, empty_state: EmptyState) -> Self {
        self.empty_state = Some(empty_state);
        self
    }

    /// Change the refresh key. A changed key triggers exactly one load;
    /// setting the same key again does nothing (except for the very first
    /// load, before anything has been fetched).
    pub fn set_key(&mut self, key: u64) {
        if key == self.key && !matches!(self.state, LoadState::NotLoaded) {
            return;
        }
        self.key = key;
        self.page = 0;
        self.start_load();
    }

    /// Reload the current listing from the first page.
    pub fn refresh(&mut self) {
        let next = self.key.wrapping_add(1);
        self.set_key(next);
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn selected_item(&self) -> Option<&T> {
        let rows = self.rows()?;
        let selected = self.table_state.selected()?;
        let &idx = self.filtered_indices.get(selected)?;
        rows.get(idx)
    }

    /// Snapshot of the marked rows, in row order.
    pub fn marked_items(&self) -> Vec<T> {
        let Some(rows) = self.rows() else {
            return Vec::new();
        };
        self.marked
            .iter()
            .filter_map(|&idx| rows.get(idx).cloned())
            .collect()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    fn rows(&self) -> Option<&Vec<T>> {
        match &self.state {
            LoadState::Loaded(rows) => Some(rows),
            _ => None,
        }
    }

    fn start_load(&mut self) {
        self.state = LoadState::Loading;
        // Any pending marks belong to rows that are about to be replaced.
        // Cleared silently: the reload itself tells the page the world
        // changed, an extra selection event would be noise.
        self.marked.clear();
        self.generation += 1;

        let generation = self.generation;
        let tx = self.result_tx.clone();
        let loader = Arc::clone(&self.loader);
        let (first, max) = match self.page_size {
            Some(size) => (Some(self.page * size), Some(size)),
            None => (None, None),
        };

        tokio::spawn(async move {
            let result = loader(first, max).await;
            let _ = tx.send((generation, result));
        });
    }

    /// Drain finished loads and apply the newest one.
    ///
    /// Called by the page on every tick. Returns the outcome of the applied
    /// load so the page can alert on failures.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        let mut latest = None;
        while let Ok((generation, result)) = self.result_rx.try_recv() {
            if generation != self.generation {
                tracing::debug!(
                    "Dropping stale load result (generation {} != {})",
                    generation,
                    self.generation
                );
                continue;
            }
            latest = Some(result);
        }

        let result = latest?;
        Some(match result {
            Ok(rows) => {
                let count = rows.len();
                self.has_next = self.page_size.is_some_and(|size| count == size);
                self.state = LoadState::Loaded(rows);
                self.update_filter();
                self.table_state.select(if self.filtered_indices.is_empty() {
                    None
                } else {
                    Some(0)
                });
                LoadOutcome::Loaded { count }
            }
            Err(error) => {
                let error = error.to_string();
                self.state = LoadState::Failed(error.clone());
                self.filtered_indices.clear();
                self.table_state.select(None);
                LoadOutcome::Failed { error }
            }
        })
    }

    fn row_matches(&self, row: &T) -> bool {
        self.columns.iter().any(|column| {
            row.field(column.field)
                .is_some_and(|value| self.matcher.matches(&value, &self.query))
        })
    }

    fn update_filter(&mut self) {
        let row_count = self.rows().map_or(0, Vec::len);
        self.filtered_indices = (0..row_count)
            .filter(|&i| {
                self.query.is_empty()
                    || self
                        .rows()
                        .and_then(|rows| rows.get(i))
                        .is_some_and(|row| self.row_matches(row))
            })
            .collect();

        // Reset selection to first item if current selection is invalid
        if self.filtered_indices.is_empty() {
            self.table_state.select(None);
        } else if self
            .table_state
            .selected()
            .is_none_or(|i| i >= self.filtered_indices.len())
        {
            self.table_state.select(Some(0));
        }
    }

    fn select_next(&mut self) {
        if self.filtered_indices.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => i.saturating_add(1).min(self.filtered_indices.len() - 1),
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn select_previous(&mut self) {
        if self.filtered_indices.is_empty() {
            return;
        }
        let i = self.table_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.table_state.select(Some(i));
    }

    fn select_first(&mut self) {
        if !self.filtered_indices.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        if !self.filtered_indices.is_empty() {
            self.table_state.select(Some(self.filtered_indices.len() - 1));
        }
    }

    fn get_change_event(&self, before: Option<usize>) -> Handled<TableEvent<T>> {
        if let Some(selected) = self.table_state.selected()
            && Some(selected) != before
            && let Some(&idx) = self.filtered_indices.get(selected)
            && let Some(rows) = self.rows()
        {
            return TableEvent::Changed(rows[idx].clone()).into();
        }
        Handled::Consumed
    }

    fn toggle_mark(&mut self) -> Handled<TableEvent<T>> {
        let Some(selected) = self.table_state.selected() else {
            return Handled::Consumed;
        };
        let Some(&idx) = self.filtered_indices.get(selected) else {
            return Handled::Consumed;
        };
        if !self.marked.remove(&idx) {
            self.marked.insert(idx);
        }
        TableEvent::SelectionChanged(self.marked_items()).into()
    }

    fn toggle_mark_all(&mut self) -> Handled<TableEvent<T>> {
        let row_count = self.rows().map_or(0, Vec::len);
        if row_count == 0 {
            return Handled::Consumed;
        }
        if self.marked.len() == row_count {
            self.marked.clear();
        } else {
            self.marked = (0..row_count).collect();
        }
        TableEvent::SelectionChanged(self.marked_items()).into()
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<Handled<TableEvent<T>>> {
        // Check for search exit key (Esc)
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            // Exit search mode and clear filter
            self.searching = false;
            let had_query = !self.query.is_empty();
            self.query.clear();
            self.update_filter();
            return Ok(if had_query {
                TableEvent::SearchChanged(String::new()).into()
            } else {
                Handled::Consumed
            });
        }

        // Check for select (Enter) to exit search but keep filter
        if self.resolver.matches_nav(&key, NavAction::Select) {
            self.searching = false;
            return Ok(Handled::Consumed);
        }

        Ok(match key.code {
            KeyCode::Backspace => {
                self.query.pop();
                self.update_filter();
                TableEvent::SearchChanged(self.query.clone()).into()
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.update_filter();
                TableEvent::SearchChanged(self.query.clone()).into()
            }
            // Consume all other keys in search mode
            _ => Handled::Consumed,
        })
    }

    fn handle_navigation_key(&mut self, key: KeyEvent) -> Result<Handled<TableEvent<T>>> {
        let before = self.table_state.selected();

        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.select_next();
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Up) {
            self.select_previous();
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Home) {
            self.select_first();
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::End) {
            self.select_last();
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageDown) {
            let step = 10;
            if !self.filtered_indices.is_empty() {
                let new_index = self
                    .table_state
                    .selected()
                    .map_or(0, |i| usize::min(i + step, self.filtered_indices.len() - 1));
                self.table_state.select(Some(new_index));
            }
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageUp) {
            let step = 10;
            if !self.filtered_indices.is_empty() {
                let new_index = self.table_state.selected().map_or(0, |i| i.saturating_sub(step));
                self.table_state.select(Some(new_index));
            }
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            return Ok(self
                .selected_item()
                .cloned()
                .map_or(Handled::Ignored, |item| TableEvent::Activated(item).into()));
        }
        if self.resolver.matches_search(&key, SearchAction::Toggle) {
            self.searching = true;
            return Ok(Handled::Consumed);
        }
        if self.resolver.matches_search(&key, SearchAction::Exit) && !self.query.is_empty() {
            // Clear filter when not searching
            self.query.clear();
            self.update_filter();
            return Ok(Handled::Consumed);
        }
        if self.multi_select && self.resolver.matches_list(&key, ListAction::Mark) {
            return Ok(self.toggle_mark());
        }
        if self.multi_select && self.resolver.matches_list(&key, ListAction::MarkAll) {
            return Ok(self.toggle_mark_all());
        }
        if self.page_size.is_some() && self.resolver.matches_list(&key, ListAction::NextPage) {
            if self.has_next {
                self.page += 1;
                self.start_load();
            }
            return Ok(Handled::Consumed);
        }
        if self.page_size.is_some() && self.resolver.matches_list(&key, ListAction::PrevPage) {
            if self.page > 0 {
                self.page -= 1;
                self.start_load();
            }
            return Ok(Handled::Consumed);
        }

        Ok(Handled::Ignored)
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let header_cells: Vec<Cell> = self
            .columns
            .iter()
            .map(|c| {
                Cell::from(c.header).style(
                    Style::default()
                        .fg(theme.header())
                        .add_modifier(Modifier::BOLD),
                )
            })
            .collect();
        let header = Row::new(header_cells)
            .height(1)
            .style(Style::default().bg(theme.surface0()));

        let rows_data = match &self.state {
            LoadState::Loaded(rows) => rows,
            _ => return,
        };

        let rows: Vec<Row> = self
            .filtered_indices
            .iter()
            .map(|&idx| {
                let row = &rows_data[idx];
                let marked = self.marked.contains(&idx);
                let cells = self.columns.iter().map(|c| c.cell(row, theme));
                let cells: Vec<Cell> = if self.multi_select {
                    let mark = if marked { "●" } else { " " };
                    std::iter::once(Cell::from(mark).style(Style::default().fg(theme.peach())))
                        .chain(cells)
                        .collect()
                } else {
                    cells.collect()
                };
                let style = if marked {
                    Style::default()
                        .fg(theme.peach())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text())
                };
                Row::new(cells).style(style)
            })
            .collect();

        let mut widths: Vec<Constraint> = self.columns.iter().map(|c| c.constraint).collect();
        let header = if self.multi_select {
            widths.insert(0, Constraint::Length(1));
            let mut cells = vec![Cell::from(" ")];
            cells.extend(self.columns.iter().map(|c| {
                Cell::from(c.header).style(
                    Style::default()
                        .fg(theme.header())
                        .add_modifier(Modifier::BOLD),
                )
            }));
            Row::new(cells)
                .height(1)
                .style(Style::default().bg(theme.surface0()))
        } else {
            header
        };

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn footer_line(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.page_size.is_some() {
            let next = if self.has_next { " ▸" } else { "" };
            parts.push(format!("page {}{}", self.page + 1, next));
        }
        if self.multi_select && !self.marked.is_empty() {
            parts.push(format!("{} marked", self.marked.len()));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("  ·  "))
        }
    }
}

impl<T: TableRow + Clone + Send + 'static> Component for DataTable<T> {
    type Output = TableEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<Handled<Self::Output>> {
        // While a load is in flight the rows are about to be replaced, so
        // navigation and marking would act on vanishing state.
        if self.is_loading() {
            return Ok(Handled::Ignored);
        }
        if self.searching {
            self.handle_search_key(key)
        } else {
            self.handle_navigation_key(key)
        }
    }

    fn on_tick(&mut self) {
        self.spinner.on_tick();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let area = if let Some(title) = &self.title {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.border()))
                .title(title.as_str())
                .title_style(
                    Style::default()
                        .fg(theme.mauve())
                        .add_modifier(Modifier::BOLD),
                );
            let inner = block.inner(area);
            frame.render_widget(block, area);
            inner
        } else {
            area
        };

        match &self.state {
            LoadState::NotLoaded | LoadState::Loading => {
                self.spinner.render(frame, area, theme);
                return;
            }
            LoadState::Failed(error) => {
                let lines = vec![
                    format!("Failed to load: {error}"),
                    String::new(),
                    "Press r to retry".to_string(),
                ];
                let paragraph = Paragraph::new(lines.join("\n"))
                    .style(Style::default().fg(theme.red()))
                    .alignment(Alignment::Center);
                let centered = area.centered(Constraint::Percentage(80), Constraint::Length(3));
                frame.render_widget(paragraph, centered);
                return;
            }
            LoadState::Loaded(rows) => {
                if rows.is_empty() && self.query.is_empty() && self.page == 0 {
                    if let Some(empty_state) = &mut self.empty_state {
                        empty_state.render(frame, area, theme);
                        return;
                    }
                }
            }
        }

        // Reserve a bottom line for the search bar or the footer
        let has_search_bar = self.searching || !self.query.is_empty();
        let footer = self.footer_line();
        let (table_area, bottom_area) = if has_search_bar || footer.is_some() {
            let chunks = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(area);
            (chunks[0], Some(chunks[1]))
        } else {
            (area, None)
        };

        self.render_table(frame, table_area, theme);

        if let Some(bottom_area) = bottom_area {
            if has_search_bar {
                let search_text = if self.searching {
                    format!("/{}_", self.query)
                } else {
                    format!("/{} ({} matches)", self.query, self.filtered_indices.len())
                };
                let search_style = if self.searching {
                    Style::default().fg(theme.yellow())
                } else {
                    Style::default().fg(theme.subtext0())
                };
                frame.render_widget(Paragraph::new(search_text).style(search_style), bottom_area);
            } else if let Some(footer) = footer {
                frame.render_widget(
                    Paragraph::new(footer)
                        .style(Style::default().fg(theme.subtext0()))
                        .alignment(Alignment::Right),
                    bottom_area,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keybindings::KeybindingsConfig;
    use crossterm::event::KeyModifiers;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Entry {
        id: String,
        name: String,
    }

    impl Entry {
        fn new(id: &str, name: &str) -> Self {
            Self {
                id: id.to_string(),
                name: name.to_string(),
            }
        }
    }

    impl TableRow for Entry {
        fn field(&self, name: &str) -> Option<String> {
            match name {
                "id" => Some(self.id.clone()),
                "name" => Some(self.name.clone()),
                _ => None,
            }
        }
    }

    fn columns() -> Vec<ColumnDef<Entry>> {
        vec![
            ColumnDef::new("Name", "name", Constraint::Fill(1)),
            ColumnDef::new("ID", "id", Constraint::Length(12)),
        ]
    }

    fn resolver() -> Arc<KeyResolver> {
        Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn fixed_loader(entries: Vec<Entry>, calls: Arc<AtomicUsize>) -> RowLoader<Entry> {
        Arc::new(move |_first, _max| {
            calls.fetch_add(1, Ordering::SeqCst);
            let entries = entries.clone();
            Box::pin(async move { Ok(entries) })
        })
    }

    async fn wait_outcome(table: &mut DataTable<Entry>) -> LoadOutcome {
        for _ in 0..1000 {
            if let Some(outcome) = table.poll() {
                return outcome;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("load never completed");
    }

    #[tokio::test]
    async fn test_loads_rows_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let entries = vec![
            Entry::new("1", "account-console"),
            Entry::new("2", "admin-cli"),
            Entry::new("3", "broker"),
        ];
        let mut table = DataTable::new(fixed_loader(entries.clone(), calls), columns(), resolver());
        table.refresh();

        let outcome = wait_outcome(&mut table).await;
        assert_eq!(outcome, LoadOutcome::Loaded { count: 3 });
        assert_eq!(table.selected_item(), Some(&entries[0]));

        table.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(table.selected_item(), Some(&entries[1]));
        table.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(table.selected_item(), Some(&entries[2]));
    }

    #[tokio::test]
    async fn test_set_key_loads_exactly_once_per_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = DataTable::new(
            fixed_loader(vec![Entry::new("1", "a")], Arc::clone(&calls)),
            columns(),
            resolver(),
        );

        table.set_key(1);
        wait_outcome(&mut table).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Same key again: no new load
        table.set_key(1);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(table.poll().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // New key: one more load
        table.set_key(2);
        wait_outcome(&mut table).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_reports_and_clears_selection() {
        let loader: RowLoader<Entry> = Arc::new(|_, _| {
            Box::pin(async {
                Err(ApiError::Http {
                    status: 403,
                    message: "forbidden".to_string(),
                })
            })
        });
        let mut table = DataTable::new(loader, columns(), resolver()).multi_select();
        table.refresh();

        let outcome = wait_outcome(&mut table).await;
        assert!(matches!(outcome, LoadOutcome::Failed { .. }));
        assert!(table.selected_item().is_none());
        assert!(table.marked_items().is_empty());
    }

    #[tokio::test]
    async fn test_mark_and_mark_all_snapshots_in_row_order() {
        let entries = vec![
            Entry::new("1", "alpha"),
            Entry::new("2", "beta"),
            Entry::new("3", "gamma"),
        ];
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = DataTable::new(fixed_loader(entries.clone(), calls), columns(), resolver())
            .multi_select();
        table.refresh();
        wait_outcome(&mut table).await;

        // Mark the second row, then the first: snapshot stays in row order
        table.handle_key(key(KeyCode::Down)).unwrap();
        table.handle_key(key(KeyCode::Char(' '))).unwrap();
        table.handle_key(key(KeyCode::Up)).unwrap();
        let handled = table.handle_key(key(KeyCode::Char(' '))).unwrap();
        match handled {
            Handled::Event(TableEvent::SelectionChanged(snapshot)) => {
                assert_eq!(snapshot, vec![entries[0].clone(), entries[1].clone()]);
            }
            _ => panic!("expected selection event"),
        }

        // Mark all, then unmark all
        let handled = table.handle_key(key(KeyCode::Char('a'))).unwrap();
        match handled {
            Handled::Event(TableEvent::SelectionChanged(snapshot)) => {
                assert_eq!(snapshot.len(), 3);
            }
            _ => panic!("expected selection event"),
        }
        let handled = table.handle_key(key(KeyCode::Char('a'))).unwrap();
        match handled {
            Handled::Event(TableEvent::SelectionChanged(snapshot)) => {
                assert!(snapshot.is_empty());
            }
            _ => panic!("expected selection event"),
        }
    }

    #[tokio::test]
    async fn test_reload_clears_marks_silently() {
        let entries = vec![Entry::new("1", "alpha"), Entry::new("2", "beta")];
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = DataTable::new(fixed_loader(entries, calls), columns(), resolver())
            .multi_select();
        table.refresh();
        wait_outcome(&mut table).await;

        table.handle_key(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(table.marked_items().len(), 1);

        table.refresh();
        wait_outcome(&mut table).await;
        assert!(table.marked_items().is_empty());
    }

    #[tokio::test]
    async fn test_pagination_requests_next_offset_and_infers_has_next() {
        let requests: Arc<std::sync::Mutex<Vec<(Option<usize>, Option<usize>)>>> =
            Arc::new(std::sync::Mutex::new(Vec::new()));
        let requests_clone = Arc::clone(&requests);
        // Full first page, short second page
        let loader: RowLoader<Entry> = Arc::new(move |first, max| {
            requests_clone.lock().unwrap().push((first, max));
            Box::pin(async move {
                let count = if first == Some(0) { 2 } else { 1 };
                Ok((0..count)
                    .map(|i| Entry::new(&format!("{i}"), &format!("row-{i}")))
                    .collect())
            })
        });
        let mut table = DataTable::new(loader, columns(), resolver()).paginated(2);
        table.refresh();
        let outcome = wait_outcome(&mut table).await;
        assert_eq!(outcome, LoadOutcome::Loaded { count: 2 });
        assert!(table.has_next());

        table.handle_key(key(KeyCode::Char(']'))).unwrap();
        let outcome = wait_outcome(&mut table).await;
        assert_eq!(outcome, LoadOutcome::Loaded { count: 1 });
        assert!(!table.has_next());
        assert_eq!(table.page(), 1);

        // Paging past the end does nothing
        table.handle_key(key(KeyCode::Char(']'))).unwrap();
        assert_eq!(table.page(), 1);

        let seen = requests.lock().unwrap().clone();
        assert_eq!(seen, vec![(Some(0), Some(2)), (Some(2), Some(2))]);
    }

    #[tokio::test]
    async fn test_stale_results_are_dropped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let loader: RowLoader<Entry> = Arc::new(move |_, _| {
            let call = calls_clone.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if call == 0 {
                    // First load is slow and must not win
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(vec![Entry::new("old", "old")])
                } else {
                    Ok(vec![Entry::new("new", "new")])
                }
            })
        });
        let mut table = DataTable::new(loader, columns(), resolver());
        table.refresh();
        table.refresh();

        let outcome = wait_outcome(&mut table).await;
        assert_eq!(outcome, LoadOutcome::Loaded { count: 1 });
        assert_eq!(table.selected_item().map(|e| e.id.as_str()), Some("new"));

        // The slow result eventually arrives and is discarded
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(table.poll().is_none());
        assert_eq!(table.selected_item().map(|e| e.id.as_str()), Some("new"));
    }

    #[tokio::test]
    async fn test_search_filters_rows() {
        let entries = vec![
            Entry::new("1", "account-console"),
            Entry::new("2", "admin-cli"),
            Entry::new("3", "broker"),
        ];
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = DataTable::new(fixed_loader(entries, calls), columns(), resolver());
        table.refresh();
        wait_outcome(&mut table).await;

        table.handle_key(key(KeyCode::Char('/'))).unwrap();
        for c in "brok".chars() {
            table.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(table.selected_item().map(|e| e.name.as_str()), Some("broker"));

        // Esc clears the filter entirely
        table.handle_key(key(KeyCode::Esc)).unwrap();
        assert_eq!(table.query(), "");
    }

    #[tokio::test]
    async fn test_keys_ignored_while_loading() {
        let loader: RowLoader<Entry> = Arc::new(|_, _| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(vec![])
            })
        });
        let mut table = DataTable::new(loader, columns(), resolver());
        table.refresh();
        assert!(table.is_loading());

        let handled = table.handle_key(key(KeyCode::Down)).unwrap();
        assert!(matches!(handled, Handled::Ignored));
    }

    #[test]
    fn test_cell_precedence() {
        let theme = crate::theme::Theme::catppuccin_mocha();
        let entry = Entry::new("1", "alpha");

        // Raw field value
        let column = ColumnDef::new("Name", "name", Constraint::Fill(1));
        assert_eq!(column.cell(&entry, &theme), Cell::from("alpha".to_string()));

        // Formatters refine the raw value
        let column = ColumnDef::new("Name", "name", Constraint::Fill(1))
            .with_formatters(&[|v| v.to_uppercase()]);
        assert_eq!(column.cell(&entry, &theme), Cell::from("ALPHA".to_string()));

        // A renderer wins over formatters
        let column = ColumnDef::new("Name", "name", Constraint::Fill(1))
            .with_formatters(&[|v| v.to_uppercase()])
            .with_renderer(|_, _| Cell::from("rendered"));
        assert_eq!(column.cell(&entry, &theme), Cell::from("rendered"));

        // Missing field renders empty
        let column = ColumnDef::new("Missing", "missing", Constraint::Fill(1));
        assert_eq!(column.cell(&entry, &theme), Cell::from(String::new()));
    }
}
