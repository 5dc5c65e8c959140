// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ledgerdesk_app::{
    AppCommand, AppState, ColumnDef, EmptyState, EntityKind, ErrorKind, FieldValue, FormMode,
    ListCommand, ListRequest, ListResponse, ListView, Outbound, PickerEntry, RecordForm, RecordId,
    RenderModel, ScreenEpoch, SortDirection,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const PAGE_SIZES: [u32; 4] = [10, 25, 50, 100];
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const SORT_ASC_MARK: &str = " ↑";
const SORT_DESC_MARK: &str = " ↓";

/// Executes list requests for the terminal loop. Responses come back
/// through the internal channel tagged with the screen that asked.
pub trait AppRuntime {
    fn execute(&mut self, entity: EntityKind, request: &ListRequest) -> ListResponse;

    /// Runs inline by default. Runtimes backed by slow I/O override this to
    /// hand the request to a worker thread.
    fn spawn_request(&mut self, outbound: Outbound, tx: Sender<InternalEvent>) -> Result<()> {
        let response = self.execute(outbound.entity, &outbound.request);
        tx.send(InternalEvent::Response {
            epoch: outbound.epoch,
            response,
        })
        .map_err(|_| anyhow!("response channel closed"))
    }
}

#[derive(Debug)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    Response {
        epoch: ScreenEpoch,
        response: ListResponse,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowRef {
    Active(RecordId),
    Inactive(RecordId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ViewData {
    selected_row: usize,
    selected_col: usize,
    search_input: Option<String>,
    picker_cursor: usize,
    form_field: usize,
    form_buffer: Option<String>,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let entity = state.active;
    open_screen(
        state,
        runtime,
        &mut view_data,
        &internal_tx,
        AppCommand::Open(entity),
    );

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Response { epoch, response } => {
                state.deliver(epoch, response);
                pump_requests(state, runtime, view_data, tx);
            }
        }
    }
    sync_view_data(state, view_data);
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn pump_requests<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    for outbound in state.take_requests() {
        let entity = outbound.entity;
        if let Err(error) = runtime.spawn_request(outbound, tx.clone()) {
            tracing::warn!(entity = entity.as_str(), error = %format!("{error:#}"), "request not sent");
            emit_status(state, view_data, tx, format!("request failed: {error:#}"));
        }
    }
}

fn open_screen<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    tracing::debug!(?events, "screen command");
    *view_data = ViewData {
        status_token: view_data.status_token,
        help_visible: view_data.help_visible,
        ..ViewData::default()
    };
    pump_requests(state, runtime, view_data, tx);
}

fn dispatch_list<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: ListCommand,
) {
    state.dispatch(AppCommand::List(command));
    pump_requests(state, runtime, view_data, tx);
    sync_view_data(state, view_data);
}

fn sync_view_data(state: &AppState, view_data: &mut ViewData) {
    let Some(model) = state.view().map(ListView::render) else {
        return;
    };
    let rows = model.visible_records.len() + model.visible_inactive.len();
    view_data.selected_row = view_data.selected_row.min(rows.saturating_sub(1));
    view_data.selected_col = view_data
        .selected_col
        .min(model.columns.len().saturating_sub(1));
    if model.form.is_none() {
        view_data.form_field = 0;
        view_data.form_buffer = None;
    }
    match &model.picker {
        Some(entries) => {
            view_data.picker_cursor = view_data
                .picker_cursor
                .min(entries.len().saturating_sub(1));
        }
        None => view_data.picker_cursor = 0,
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    let Some(model) = state.view().map(ListView::render) else {
        let entity = state.active;
        open_screen(
            state,
            runtime,
            view_data,
            internal_tx,
            AppCommand::Open(entity),
        );
        return false;
    };

    if let Some(form) = &model.form {
        handle_form_key(state, runtime, view_data, internal_tx, form, key);
        return false;
    }

    if let Some(entries) = &model.picker {
        handle_picker_key(state, runtime, view_data, internal_tx, entries, key);
        return false;
    }

    if view_data.search_input.is_some() {
        handle_search_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    handle_nav_key(state, runtime, view_data, internal_tx, &model, key);
    false
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    model: &RenderModel,
    key: KeyEvent,
) {
    let screen_command = match (key.code, key.modifiers) {
        (KeyCode::Char('f'), KeyModifiers::NONE) => Some(AppCommand::NextTab),
        (KeyCode::Char('b'), KeyModifiers::NONE) => Some(AppCommand::PrevTab),
        (KeyCode::Char('F'), _) => Some(AppCommand::NextModule),
        (KeyCode::Char('B'), _) => Some(AppCommand::PrevModule),
        _ => None,
    };
    if let Some(command) = screen_command {
        open_screen(state, runtime, view_data, tx, command);
        return;
    }

    let rows = model.visible_records.len() + model.visible_inactive.len();
    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('j') | KeyCode::Down, _) => {
            view_data.selected_row = (view_data.selected_row + 1).min(rows.saturating_sub(1));
            None
        }
        (KeyCode::Char('k') | KeyCode::Up, _) => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
            None
        }
        (KeyCode::Char('l') | KeyCode::Right, _) => {
            view_data.selected_col =
                (view_data.selected_col + 1).min(model.columns.len().saturating_sub(1));
            None
        }
        (KeyCode::Char('h') | KeyCode::Left, _) => {
            view_data.selected_col = view_data.selected_col.saturating_sub(1);
            None
        }
        (KeyCode::Char('n') | KeyCode::PageDown, _) => Some(ListCommand::NextPage),
        (KeyCode::Char('p') | KeyCode::PageUp, _) => Some(ListCommand::PrevPage),
        (KeyCode::Char('<') | KeyCode::Home, _) => Some(ListCommand::FirstPage),
        (KeyCode::Char('>') | KeyCode::End, _) => Some(ListCommand::LastPage),
        (KeyCode::Char('+'), _) => Some(ListCommand::SetLimit(step_page_size(model.limit, 1))),
        (KeyCode::Char('-'), _) => Some(ListCommand::SetLimit(step_page_size(model.limit, -1))),
        (KeyCode::Char('s'), KeyModifiers::NONE) => match model.columns.get(view_data.selected_col)
        {
            Some(column) => Some(ListCommand::ClickHeader(column.key.to_owned())),
            None => {
                emit_status(state, view_data, tx, "no column selected");
                None
            }
        },
        (KeyCode::Char('/'), _) => {
            view_data.search_input = Some(model.query.clone());
            emit_status(state, view_data, tx, "search: type to filter | enter keep | esc clear");
            None
        }
        (KeyCode::Char('c'), KeyModifiers::NONE) => Some(ListCommand::OpenColumnPicker),
        (KeyCode::Char('x'), KeyModifiers::NONE) => Some(ListCommand::ToggleInactive),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(ListCommand::OpenCreate),
        (KeyCode::Char('e'), KeyModifiers::NONE) | (KeyCode::Enter, _) => {
            match selected_row(model, view_data) {
                Some(RowRef::Active(id)) => Some(ListCommand::OpenEdit(id)),
                Some(RowRef::Inactive(id)) => Some(ListCommand::OpenInactive(id)),
                None => {
                    emit_status(state, view_data, tx, "nothing selected");
                    None
                }
            }
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => match selected_row(model, view_data) {
            Some(RowRef::Active(id)) => Some(ListCommand::DeleteRecord(id)),
            Some(RowRef::Inactive(_)) => {
                emit_status(state, view_data, tx, "already inactive -- press R to restore");
                None
            }
            None => None,
        },
        (KeyCode::Char('R'), _) => match selected_row(model, view_data) {
            Some(RowRef::Inactive(id)) => Some(ListCommand::RestoreRecord(id)),
            Some(RowRef::Active(_)) => {
                emit_status(state, view_data, tx, "only inactive rows can be restored");
                None
            }
            None => None,
        },
        (KeyCode::Char('r'), KeyModifiers::NONE) => Some(ListCommand::Refresh),
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            emit_status(state, view_data, tx, "help open");
            None
        }
        (KeyCode::Esc, _) => Some(ListCommand::DismissError),
        _ => None,
    };

    if let Some(command) = command {
        dispatch_list(state, runtime, view_data, tx, command);
    }
}

fn handle_search_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(buffer) = view_data.search_input.as_mut() else {
        return;
    };
    let query = match key.code {
        KeyCode::Esc => {
            view_data.search_input = None;
            String::new()
        }
        KeyCode::Enter => {
            view_data.search_input = None;
            return;
        }
        KeyCode::Backspace => {
            buffer.pop();
            buffer.clone()
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.push(ch);
            buffer.clone()
        }
        _ => return,
    };
    dispatch_list(state, runtime, view_data, tx, ListCommand::SetQuery(query));
}

fn handle_picker_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    entries: &[PickerEntry],
    key: KeyEvent,
) {
    let command = match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.picker_cursor =
                (view_data.picker_cursor + 1).min(entries.len().saturating_sub(1));
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.picker_cursor = view_data.picker_cursor.saturating_sub(1);
            None
        }
        KeyCode::Char(' ') | KeyCode::Char('x') => entries
            .get(view_data.picker_cursor)
            .map(|entry| ListCommand::ToggleColumn(entry.key.to_owned())),
        KeyCode::Char('r') => Some(ListCommand::RestoreDefaultColumns),
        KeyCode::Enter => Some(ListCommand::CommitColumns),
        KeyCode::Esc => Some(ListCommand::CancelColumns),
        _ => None,
    };
    if let Some(command) = command {
        dispatch_list(state, runtime, view_data, tx, command);
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    form: &RecordForm,
    key: KeyEvent,
) {
    let columns = form.kind.schema().columns;
    let field_count = columns.len().max(1);
    let read_only = form.is_read_only();
    let submit = key.code == KeyCode::Enter
        || (key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL));

    match key.code {
        KeyCode::Esc => {
            view_data.form_buffer = None;
            dispatch_list(state, runtime, view_data, tx, ListCommand::CloseForm);
        }
        KeyCode::Tab | KeyCode::Down => {
            flush_form_buffer(state, runtime, view_data, tx, columns);
            view_data.form_field = (view_data.form_field + 1) % field_count;
        }
        KeyCode::BackTab | KeyCode::Up => {
            flush_form_buffer(state, runtime, view_data, tx, columns);
            view_data.form_field = (view_data.form_field + field_count - 1) % field_count;
        }
        KeyCode::Char('R') if read_only => {
            if let FormMode::Restore(id) = form.mode {
                dispatch_list(state, runtime, view_data, tx, ListCommand::RestoreRecord(id));
            }
        }
        _ if submit => {
            if read_only {
                emit_status(state, view_data, tx, "inactive record is read-only -- press R to restore");
                return;
            }
            flush_form_buffer(state, runtime, view_data, tx, columns);
            dispatch_list(state, runtime, view_data, tx, ListCommand::SubmitForm);
        }
        KeyCode::Backspace | KeyCode::Char(_) if read_only => {
            emit_status(state, view_data, tx, "inactive record is read-only -- press R to restore");
        }
        KeyCode::Backspace => {
            let mut buffer = current_form_input(form, view_data, columns);
            buffer.pop();
            view_data.form_buffer = Some(buffer);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut buffer = current_form_input(form, view_data, columns);
            buffer.push(ch);
            view_data.form_buffer = Some(buffer);
        }
        _ => {}
    }
}

fn current_form_input(form: &RecordForm, view_data: &mut ViewData, columns: &[ColumnDef]) -> String {
    if let Some(buffer) = view_data.form_buffer.take() {
        return buffer;
    }
    columns
        .get(view_data.form_field)
        .and_then(|column| form.value(column.key))
        .map(FieldValue::display)
        .unwrap_or_default()
}

fn flush_form_buffer<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    columns: &[ColumnDef],
) {
    let Some(raw) = view_data.form_buffer.take() else {
        return;
    };
    let Some(column) = columns.get(view_data.form_field) else {
        return;
    };
    let field = view_data.form_field;
    dispatch_list(
        state,
        runtime,
        view_data,
        tx,
        ListCommand::SetFormInput {
            key: column.key.to_owned(),
            raw,
        },
    );
    view_data.form_field = field;
}

fn selected_row(model: &RenderModel, view_data: &ViewData) -> Option<RowRef> {
    let active = model.visible_records.len();
    if view_data.selected_row < active {
        return model
            .visible_records
            .get(view_data.selected_row)
            .map(|record| RowRef::Active(record.id));
    }
    model
        .visible_inactive
        .get(view_data.selected_row - active)
        .map(|record| RowRef::Inactive(record.id))
}

fn step_page_size(current: u32, delta: isize) -> u32 {
    let index = PAGE_SIZES
        .iter()
        .position(|size| *size >= current)
        .unwrap_or(PAGE_SIZES.len() - 1) as isize;
    let next = (index + delta).clamp(0, PAGE_SIZES.len() as isize - 1) as usize;
    PAGE_SIZES[next]
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = EntityKind::ALL
        .iter()
        .position(|entity| *entity == state.active)
        .unwrap_or(0);
    let tabs = Tabs::new(EntityKind::ALL.iter().map(|entity| entity.label()).collect::<Vec<_>>())
        .block(
            Block::default()
                .title(format!("ledgerdesk | {}", state.active.module().label()))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let model = state.view().map(ListView::render);
    match &model {
        Some(model) => render_table(frame, layout[1], model, view_data),
        None => {
            let empty = Paragraph::new("opening…").block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, layout[1]);
        }
    }

    let status_style = match model.as_ref().and_then(|model| model.error.as_ref()) {
        Some(_) => Style::default().fg(Color::Red),
        None => Style::default().fg(Color::Yellow),
    };
    let status = Paragraph::new(status_text(state, view_data, model.as_ref()))
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(entries) = model.as_ref().and_then(|model| model.picker.as_ref()) {
        let area = centered_rect(50, 60, frame.area());
        frame.render_widget(Clear, area);
        let picker = Paragraph::new(render_picker_text(entries, view_data.picker_cursor))
            .block(Block::default().title("columns").borders(Borders::ALL));
        frame.render_widget(picker, area);
    }

    if let Some(form) = model.as_ref().and_then(|model| model.form.as_ref()) {
        let area = centered_rect(64, 70, frame.area());
        frame.render_widget(Clear, area);
        let title = format!("{} {}", form.mode.label(), form.kind.label());
        let body = Paragraph::new(render_form_text(form, view_data)).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(body, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    model: &RenderModel,
    view_data: &ViewData,
) {
    let block = Block::default()
        .title(table_title(model))
        .borders(Borders::ALL);

    if let Some(empty) = model.empty_state {
        let message = Paragraph::new(empty_state_text(empty, &model.query)).block(block);
        frame.render_widget(message, area);
        return;
    }

    let widths = vec![Constraint::Min(8); model.columns.len().max(1)];
    let header = Row::new(model.columns.iter().map(|column| {
        Cell::from(header_label(model, column)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let active_rows = model.visible_records.iter().map(|record| (record, false));
    let inactive_rows = model.visible_inactive.iter().map(|record| (record, true));
    let rows = active_rows
        .chain(inactive_rows)
        .enumerate()
        .map(|(row_index, (record, inactive))| {
            let selected_row = row_index == view_data.selected_row;
            let cells = model
                .columns
                .iter()
                .enumerate()
                .map(|(column_index, column)| {
                    let mut style = Style::default();
                    if inactive {
                        style = style
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT);
                    }
                    if selected_row {
                        style = style.bg(Color::DarkGray);
                    }
                    if selected_row && column_index == view_data.selected_col {
                        style = Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD);
                    }
                    Cell::from(record.display(column.key)).style(style)
                })
                .collect::<Vec<_>>();
            Row::new(cells)
        });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn header_label(model: &RenderModel, column: &ColumnDef) -> String {
    let mut label = column.label.to_owned();
    match model.sort.active() {
        Some((key, SortDirection::Asc)) if key == column.key => label.push_str(SORT_ASC_MARK),
        Some((key, SortDirection::Desc)) if key == column.key => label.push_str(SORT_DESC_MARK),
        _ => {}
    }
    label
}

fn table_title(model: &RenderModel) -> String {
    let mut parts = vec![model.entity.label().to_owned()];
    if model.pagination_enabled {
        parts.push(format!("page {}/{}", model.page, model.total_pages));
        parts.push(format!("{} rows", model.total));
    } else {
        parts.push(format!("search {:?}", model.query));
        parts.push(format!("{} matches", model.total));
    }
    if model.inactive_expanded {
        parts.push(format!("{} inactive", model.visible_inactive.len()));
    }
    if model.loading {
        parts.push("loading…".to_owned());
    }
    parts.join(" | ")
}

fn empty_state_text(empty: EmptyState, query: &str) -> String {
    match empty {
        EmptyState::NoColumns => "no columns visible -- press c to pick columns".to_owned(),
        EmptyState::NoRecords => "no records yet -- press a to add one".to_owned(),
        EmptyState::NoMatches => format!("no matches for {query:?} -- esc clears the search"),
    }
}

fn render_picker_text(entries: &[PickerEntry], cursor: usize) -> String {
    let mut lines = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let prefix = if index == cursor { "> " } else { "  " };
            let mark = if entry.checked { "[x]" } else { "[ ]" };
            format!("{prefix}{mark} {}", entry.label)
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push("j/k move | space toggle | r defaults | enter apply | esc cancel".to_owned());
    lines.join("\n")
}

fn render_form_text(form: &RecordForm, view_data: &ViewData) -> String {
    let columns = form.kind.schema().columns;
    let mut lines = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let focused = index == view_data.form_field;
            let prefix = if focused { "> " } else { "  " };
            let required = if column.required { "*" } else { "" };
            let value = match (&view_data.form_buffer, focused) {
                (Some(buffer), true) => format!("{buffer}_"),
                _ => form
                    .value(column.key)
                    .map(FieldValue::display)
                    .unwrap_or_default(),
            };
            format!("{prefix}{}{required}: {value}", column.label)
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push(if form.is_read_only() {
        "read-only | R restore | esc close".to_owned()
    } else {
        "tab/shift+tab field | type to edit | enter save | esc cancel".to_owned()
    });
    lines.join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData, model: Option<&RenderModel>) -> String {
    let mode = match model {
        Some(model) if model.form.is_some() => "FORM",
        Some(model) if model.picker.is_some() => "COLS",
        _ if view_data.search_input.is_some() => "SEARCH",
        _ => "NAV",
    };

    let message = model
        .and_then(|model| model.error.as_ref())
        .map(|error| match error.kind {
            ErrorKind::Fetch => format!("error: {}", error.message),
            ErrorKind::Validation => format!("invalid: {}", error.message),
        })
        .or_else(|| state.status_line.clone())
        .or_else(|| model.and_then(|model| model.status.clone()));

    let hints = match mode {
        "SEARCH" => format!(
            "/{} | enter keep | esc clear",
            view_data.search_input.as_deref().unwrap_or_default()
        ),
        "FORM" | "COLS" => "esc close".to_owned(),
        _ => "j/k/h/l | n/p page | s sort | / search | c cols | a/e/d add/edit/del | x inactive | ? help | ctrl+q".to_owned(),
    };

    match message {
        Some(message) => format!("{mode} | {message} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
nav: j/k rows | h/l columns | b/f tabs | B/F modules\n\
pages: n/p next/prev | </> first/last | +/- page size\n\
list: s sort selected column | / search | c columns | x inactive | r refresh | esc dismiss error\n\
records: a add | e or enter edit | d delete | R restore inactive\n\
form: tab/shift+tab field | type to edit | enter or ctrl+s save | esc cancel\n\
columns: j/k move | space toggle | r defaults | enter apply | esc cancel"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
