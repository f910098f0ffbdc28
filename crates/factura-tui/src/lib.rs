// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use factura_app::{
    AppCommand, AppEvent, CreateForm, DetailLine, DetailsPanel, EntityKind, FieldView, FormView,
    Gateway, InvoiceDetailsView, InvoiceSearchForm, ListView, NewInvoiceForm, Notice,
    NoticeLevel, PaginationView, RecordId, RowAction, RowSlot, RowView, TextForm, Workspace,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use std::io;
use std::time::Duration;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const CURSOR: &str = "▸ ";
const NO_CURSOR: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Filter,
    PageJump,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Prompt {
    kind: PromptKind,
    input: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingDelete {
    kind: EntityKind,
    record_id: RecordId,
    label: String,
}

/// Terminal-only state: what is selected and focused, and which transient
/// overlays are up. Everything else is read from the workspace each frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    selected: usize,
    field: usize,
    prompt: Option<Prompt>,
    search: Option<InvoiceSearchForm>,
    pending_delete: Option<PendingDelete>,
    help_visible: bool,
    status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormKey {
    Submit,
    Cancel,
    Handled,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DraftFocus {
    Client,
    Date,
    Product(usize),
    Quantity(usize),
}

impl DraftFocus {
    const fn from_field(field: usize) -> Self {
        match field {
            0 => Self::Client,
            1 => Self::Date,
            n if n % 2 == 0 => Self::Product((n - 2) / 2),
            n => Self::Quantity((n - 2) / 2),
        }
    }
}

pub fn run_app<G: Gateway>(workspace: &mut Workspace<G>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let result = match Terminal::new(backend).context("create terminal") {
        Ok(mut terminal) => event_loop(&mut terminal, workspace),
        Err(error) => Err(error),
    };

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn event_loop<B: Backend, G: Gateway>(
    terminal: &mut Terminal<B>,
    workspace: &mut Workspace<G>,
) -> Result<()> {
    let mut view_data = ViewData::default();
    dispatch(workspace, &mut view_data, AppCommand::ReloadAll);

    loop {
        terminal
            .draw(|frame| render(frame, workspace, &view_data))
            .context("draw frame")?;

        if !event::poll(POLL_INTERVAL).context("poll event")? {
            continue;
        }
        if let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(workspace, &mut view_data, key)
        {
            return Ok(());
        }
    }
}

fn dispatch<G: Gateway>(
    workspace: &mut Workspace<G>,
    view_data: &mut ViewData,
    command: AppCommand,
) -> Vec<AppEvent> {
    debug!(?command, "dispatch");
    let events = workspace.dispatch(command);
    for event in &events {
        apply_event(view_data, event);
    }
    clamp_selection(workspace, view_data);
    events
}

fn apply_event(view_data: &mut ViewData, event: &AppEvent) {
    match event {
        AppEvent::PageChanged(_) | AppEvent::PageMoved { .. } => {
            view_data.selected = 0;
        }
        AppEvent::Filtered { count, .. } => {
            view_data.selected = 0;
            view_data.status = Some(format!("{count} résultat(s)"));
        }
        AppEvent::FormOpened(_)
        | AppEvent::FormClosed(_)
        | AppEvent::EditStarted { .. }
        | AppEvent::EditCancelled { .. }
        | AppEvent::DetailsShown(_)
        | AppEvent::DetailsClosed => {
            view_data.field = 0;
        }
        AppEvent::EditsDiscarded { count, .. } => {
            view_data.status = Some(format!("{count} modification(s) en cours abandonnée(s)"));
        }
        AppEvent::CatalogRefreshed { problems } if !problems.is_empty() => {
            view_data.status = Some(format!(
                "{} ligne(s) sans produit après mise à jour du catalogue",
                problems.len()
            ));
        }
        _ => {}
    }
}

fn clamp_selection<G: Gateway>(workspace: &Workspace<G>, view_data: &mut ViewData) {
    let rows = workspace.list_view(workspace.state().page).rows.len();
    view_data.selected = view_data.selected.min(rows.saturating_sub(1));
}

fn selected_slot<G: Gateway>(workspace: &Workspace<G>, view_data: &ViewData) -> Option<RowSlot> {
    workspace
        .list_view(workspace.state().page)
        .rows
        .get(view_data.selected)
        .cloned()
}

fn current_term<G: Gateway>(workspace: &Workspace<G>, kind: EntityKind) -> String {
    let state = workspace.state();
    match kind {
        EntityKind::Invoice => state.invoices.term(),
        EntityKind::Client => state.clients.term(),
        EntityKind::Product => state.products.term(),
    }
    .to_owned()
}

/// Returns `true` when the app should quit.
fn handle_key_event<G: Gateway>(
    workspace: &mut Workspace<G>,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if workspace.state().notice.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            dispatch(workspace, view_data, AppCommand::DismissNotice);
        }
        return false;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.pending_delete.is_some() {
        handle_delete_confirm_key(workspace, view_data, key);
        return false;
    }

    if view_data.prompt.is_some() {
        handle_prompt_key(workspace, view_data, key);
        return false;
    }

    if view_data.search.is_some() {
        handle_search_key(workspace, view_data, key);
        return false;
    }

    if workspace.state().create.is_some() {
        handle_create_key(workspace, view_data, key);
        return false;
    }

    if workspace.state().draft.is_some() {
        handle_draft_key(workspace, view_data, key);
        return false;
    }

    if workspace.state().details.is_some() {
        handle_details_key(workspace, view_data, key);
        return false;
    }

    if let Some(RowSlot::Editing(form)) = selected_slot(workspace, view_data)
        && handle_row_edit_key(workspace, view_data, form.record_id, key)
    {
        return false;
    }

    view_data.status = None;
    handle_nav_key(workspace, view_data, key)
}

fn edit_text(value: &mut String, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            value.push(ch);
            true
        }
        KeyCode::Backspace => value.pop().is_some(),
        _ => false,
    }
}

fn handle_form_key(form: &mut impl TextForm, field: &mut usize, key: KeyEvent) -> FormKey {
    let count = form.field_count().max(1);
    match key.code {
        KeyCode::Enter => FormKey::Submit,
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => FormKey::Submit,
        KeyCode::Esc => FormKey::Cancel,
        KeyCode::Tab => {
            *field = (*field + 1) % count;
            FormKey::Handled
        }
        KeyCode::BackTab => {
            *field = (*field + count - 1) % count;
            FormKey::Handled
        }
        _ => match form.field_mut(*field) {
            Some(value) => {
                if edit_text(value, key) {
                    FormKey::Handled
                } else {
                    FormKey::Ignored
                }
            }
            None => FormKey::Ignored,
        },
    }
}

fn handle_row_edit_key<G: Gateway>(
    workspace: &mut Workspace<G>,
    view_data: &mut ViewData,
    record_id: RecordId,
    key: KeyEvent,
) -> bool {
    let kind = workspace.state().page;
    let outcome = match workspace.edit_form_mut(kind, &record_id) {
        Some(form) => handle_form_key(form, &mut view_data.field, key),
        None => FormKey::Ignored,
    };
    match outcome {
        FormKey::Submit => {
            dispatch(workspace, view_data, AppCommand::SubmitEdit { kind, record_id });
        }
        FormKey::Cancel => {
            dispatch(workspace, view_data, AppCommand::CancelEdit { kind, record_id });
        }
        FormKey::Handled => {}
        FormKey::Ignored => return false,
    }
    true
}

fn handle_nav_key<G: Gateway>(
    workspace: &mut Workspace<G>,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    let page = workspace.state().page;
    match key.code {
        KeyCode::Char('q') if key.modifiers.is_empty() => return true,
        KeyCode::Tab => {
            dispatch(workspace, view_data, AppCommand::SwitchPage(next_page(page, true)));
        }
        KeyCode::BackTab => {
            dispatch(workspace, view_data, AppCommand::SwitchPage(next_page(page, false)));
        }
        KeyCode::Char(digit @ '1'..='3') => {
            let index = (digit as usize) - ('1' as usize);
            dispatch(
                workspace,
                view_data,
                AppCommand::SwitchPage(EntityKind::ALL[index]),
            );
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.selected = view_data.selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_data.selected = view_data.selected.saturating_add(1);
            clamp_selection(workspace, view_data);
        }
        KeyCode::Right | KeyCode::Char('n') => {
            dispatch(workspace, view_data, AppCommand::NextPage(page));
        }
        KeyCode::Left | KeyCode::Char('p') => {
            dispatch(workspace, view_data, AppCommand::PrevPage(page));
        }
        KeyCode::Char('g') => {
            view_data.prompt = Some(Prompt {
                kind: PromptKind::PageJump,
                input: String::new(),
            });
        }
        KeyCode::Char('/') => {
            view_data.prompt = Some(Prompt {
                kind: PromptKind::Filter,
                input: current_term(workspace, page),
            });
        }
        KeyCode::Esc if !current_term(workspace, page).is_empty() => {
            dispatch(
                workspace,
                view_data,
                AppCommand::SetFilter {
                    kind: page,
                    term: String::new(),
                },
            );
        }
        KeyCode::Char('r') => {
            dispatch(workspace, view_data, AppCommand::Reload(page));
        }
        KeyCode::Char('a') => {
            dispatch(workspace, view_data, AppCommand::OpenCreate(page));
        }
        KeyCode::Char('s') if page == EntityKind::Invoice => {
            view_data.search = Some(InvoiceSearchForm::default());
            view_data.field = 0;
        }
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Enter => {
            if let Some(RowSlot::Display(row)) = selected_slot(workspace, view_data)
                && let Some(action) = row.actions.first().copied()
            {
                run_row_action(workspace, view_data, &row, action);
            }
        }
        KeyCode::Char('e') => {
            if let Some(RowSlot::Display(row)) = selected_slot(workspace, view_data) {
                run_row_action(workspace, view_data, &row, RowAction::Edit);
            }
        }
        KeyCode::Char('d') => {
            if let Some(RowSlot::Display(row)) = selected_slot(workspace, view_data) {
                run_row_action(workspace, view_data, &row, RowAction::Delete);
            }
        }
        _ => {}
    }
    false
}

fn next_page(page: EntityKind, forward: bool) -> EntityKind {
    let count = EntityKind::ALL.len();
    let index = EntityKind::ALL
        .iter()
        .position(|kind| *kind == page)
        .unwrap_or(0);
    let next = if forward {
        (index + 1) % count
    } else {
        (index + count - 1) % count
    };
    EntityKind::ALL[next]
}

/// Invoice rows edit through their details, so `Edit` is accepted there even
/// though the row itself only offers details and delete.
fn run_row_action<G: Gateway>(
    workspace: &mut Workspace<G>,
    view_data: &mut ViewData,
    row: &RowView,
    action: RowAction,
) {
    let allowed = row.has_action(action)
        || (row.kind == EntityKind::Invoice && action == RowAction::Edit);
    if !allowed {
        view_data.status = Some(format!("« {} » indisponible ici", action.label()));
        return;
    }
    let record_id = row.record_id.clone();
    match action {
        RowAction::ShowDetails => {
            dispatch(workspace, view_data, AppCommand::ShowDetails(record_id));
        }
        RowAction::Edit => {
            dispatch(
                workspace,
                view_data,
                AppCommand::BeginEdit {
                    kind: row.kind,
                    record_id,
                },
            );
        }
        RowAction::Delete => {
            view_data.pending_delete = Some(PendingDelete {
                kind: row.kind,
                record_id,
                label: row.title.clone(),
            });
        }
    }
}

fn handle_delete_confirm_key<G: Gateway>(
    workspace: &mut Workspace<G>,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    let Some(pending) = view_data.pending_delete.take() else {
        return;
    };
    match key.code {
        KeyCode::Char('o' | 'O' | 'y' | 'Y') => {
            dispatch(
                workspace,
                view_data,
                AppCommand::Delete {
                    kind: pending.kind,
                    record_id: pending.record_id,
                },
            );
        }
        KeyCode::Char('n' | 'N') | KeyCode::Esc => {
            view_data.status = Some("Suppression annulée".to_owned());
        }
        _ => view_data.pending_delete = Some(pending),
    }
}

/// Filter input applies on every keystroke; the page jump applies on enter.
fn handle_prompt_key<G: Gateway>(
    workspace: &mut Workspace<G>,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    let page = workspace.state().page;
    let Some(prompt) = view_data.prompt.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => view_data.prompt = None,
        KeyCode::Enter => {
            let Some(prompt) = view_data.prompt.take() else {
                return;
            };
            if prompt.kind == PromptKind::PageJump {
                let target = prompt.input.trim().parse::<usize>().unwrap_or(0);
                dispatch(
                    workspace,
                    view_data,
                    AppCommand::GoToPage { kind: page, page: target },
                );
            }
        }
        _ => {
            if !edit_text(&mut prompt.input, key) || prompt.kind != PromptKind::Filter {
                return;
            }
            let term = prompt.input.clone();
            dispatch(workspace, view_data, AppCommand::SetFilter { kind: page, term });
        }
    }
}

fn handle_search_key<G: Gateway>(
    workspace: &mut Workspace<G>,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    let Some(form) = view_data.search.as_mut() else {
        return;
    };
    match handle_form_key(form, &mut view_data.field, key) {
        FormKey::Submit => {
            let Some(form) = view_data.search.take() else {
                return;
            };
            let events = dispatch(workspace, view_data, AppCommand::Search(form.clone()));
            if events
                .iter()
                .any(|event| matches!(event, AppEvent::Failed(_)))
            {
                view_data.search = Some(form);
            } else {
                view_data.field = 0;
            }
        }
        FormKey::Cancel => {
            view_data.search = None;
            view_data.field = 0;
        }
        FormKey::Handled | FormKey::Ignored => {}
    }
}

fn handle_create_key<G: Gateway>(
    workspace: &mut Workspace<G>,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    let Some(kind) = workspace.state().create.as_ref().map(CreateForm::kind) else {
        return;
    };
    let outcome = match workspace.create_form_mut() {
        Some(CreateForm::Client(form)) => handle_form_key(form, &mut view_data.field, key),
        Some(CreateForm::Product(form)) => handle_form_key(form, &mut view_data.field, key),
        None => return,
    };
    match outcome {
        FormKey::Submit => {
            dispatch(workspace, view_data, AppCommand::SubmitCreate(kind));
        }
        FormKey::Cancel => {
            dispatch(workspace, view_data, AppCommand::CloseCreate(kind));
        }
        FormKey::Handled | FormKey::Ignored => {}
    }
}

fn handle_draft_key<G: Gateway>(
    workspace: &mut Workspace<G>,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Enter => {
            dispatch(
                workspace,
                view_data,
                AppCommand::SubmitCreate(EntityKind::Invoice),
            );
            return;
        }
        KeyCode::Esc => {
            dispatch(
                workspace,
                view_data,
                AppCommand::CloseCreate(EntityKind::Invoice),
            );
            return;
        }
        _ => {}
    }

    let Some(draft) = workspace.draft_mut() else {
        return;
    };
    let count = 2 + 2 * draft.lines.lines().len();
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    let focus = DraftFocus::from_field(view_data.field);
    let outcome: Result<(), String> = match (key.code, focus) {
        (KeyCode::Tab, _) => {
            view_data.field = (view_data.field + 1) % count;
            Ok(())
        }
        (KeyCode::BackTab, _) => {
            view_data.field = (view_data.field + count - 1) % count;
            Ok(())
        }
        (KeyCode::Char('n'), _) if control => {
            let index = draft.lines.add_line();
            view_data.field = 2 + 2 * index;
            Ok(())
        }
        (KeyCode::Char('d'), DraftFocus::Product(line) | DraftFocus::Quantity(line)) if control => {
            let removed = draft.lines.remove_line(line).map_err(|error| error.to_string());
            let remaining = draft.lines.lines().len();
            view_data.field = if remaining == 0 {
                1
            } else {
                2 + 2 * line.min(remaining - 1)
            };
            removed.map(drop)
        }
        (KeyCode::Left | KeyCode::Right, DraftFocus::Client) => {
            draft.cycle_client(key.code == KeyCode::Right);
            Ok(())
        }
        (_, DraftFocus::Date) => {
            edit_text(&mut draft.invoice_date, key);
            Ok(())
        }
        (KeyCode::Left | KeyCode::Right, DraftFocus::Product(line)) => draft
            .lines
            .cycle_product(line, key.code == KeyCode::Right)
            .map_err(|error| error.to_string()),
        (code, DraftFocus::Quantity(line)) => {
            let current = draft.lines.lines().get(line).map_or(1, |entry| entry.quantity);
            let next = match code {
                KeyCode::Right | KeyCode::Char('+') => Some(current.saturating_add(1)),
                KeyCode::Left | KeyCode::Char('-') => Some(current.saturating_sub(1)),
                KeyCode::Backspace => Some(current / 10),
                KeyCode::Char(digit) if digit.is_ascii_digit() => digit
                    .to_digit(10)
                    .and_then(|value| current.checked_mul(10)?.checked_add(value)),
                _ => None,
            };
            match next {
                Some(quantity) => draft
                    .lines
                    .set_quantity(line, quantity)
                    .map_err(|error| error.to_string()),
                None => Ok(()),
            }
        }
        _ => Ok(()),
    };
    if let Err(message) = outcome {
        view_data.status = Some(message);
    }
}

fn handle_details_key<G: Gateway>(
    workspace: &mut Workspace<G>,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    let Some(details) = workspace.state().details.as_ref() else {
        return;
    };
    let record_id = details.invoice.id.clone();
    let title = details.view.title.clone();
    let kind = EntityKind::Invoice;

    if details.edit.is_some() {
        let outcome = match workspace.edit_form_mut(kind, &record_id) {
            Some(form) => handle_form_key(form, &mut view_data.field, key),
            None => FormKey::Ignored,
        };
        match outcome {
            FormKey::Submit => {
                dispatch(workspace, view_data, AppCommand::SubmitEdit { kind, record_id });
            }
            FormKey::Cancel => {
                dispatch(workspace, view_data, AppCommand::CancelEdit { kind, record_id });
            }
            FormKey::Handled | FormKey::Ignored => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            dispatch(workspace, view_data, AppCommand::CloseDetails);
        }
        KeyCode::Char('e') => {
            dispatch(workspace, view_data, AppCommand::BeginEdit { kind, record_id });
        }
        KeyCode::Char('d') => {
            view_data.pending_delete = Some(PendingDelete {
                kind,
                record_id,
                label: title,
            });
        }
        _ => {}
    }
}

fn render<G: Gateway>(
    frame: &mut ratatui::Frame<'_>,
    workspace: &Workspace<G>,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let state = workspace.state();
    let selected = EntityKind::ALL
        .iter()
        .position(|kind| *kind == state.page)
        .unwrap_or(0);
    let titles = EntityKind::ALL
        .iter()
        .map(|kind| tab_title(workspace, *kind))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("factura").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let list = workspace.list_view(state.page);
    let body = Paragraph::new(render_list_text(&list, view_data.selected, view_data.field))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(state.page.label()),
        );
    frame.render_widget(body, layout[1]);

    let status = Paragraph::new(status_text(workspace, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(panel) = workspace.details_panel() {
        let text = match &panel {
            DetailsPanel::Display(view) => render_details_text(view),
            DetailsPanel::Editing(form) => render_form_text(form, view_data.field),
        };
        render_overlay(frame, 70, 60, "facture", &text, Color::Cyan);
    }

    if let Some(draft) = &state.draft {
        let text = render_draft_text(draft, view_data.field);
        render_overlay(frame, 76, 70, "nouvelle facture", &text, Color::Cyan);
    }

    if let Some(form) = &state.create {
        let text = match form {
            CreateForm::Client(form) => render_text_form(form, view_data.field),
            CreateForm::Product(form) => render_text_form(form, view_data.field),
        };
        render_overlay(frame, 60, 50, "ajout", &text, Color::Cyan);
    }

    if let Some(form) = &view_data.search {
        let text = render_text_form(form, view_data.field);
        render_overlay(frame, 60, 40, "recherche", &text, Color::Cyan);
    }

    if let Some(pending) = &view_data.pending_delete {
        let text = render_delete_confirm_text(pending);
        render_overlay(frame, 50, 20, "confirmation", &text, Color::Yellow);
    }

    if view_data.help_visible {
        render_overlay(frame, 80, 60, "aide", help_overlay_text(), Color::White);
    }

    if let Some(notice) = &state.notice {
        let color = match notice.level {
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        render_overlay(frame, 56, 24, "message", &render_notice_text(notice), color);
    }
}

fn render_overlay(
    frame: &mut ratatui::Frame<'_>,
    percent_x: u16,
    percent_y: u16,
    title: &str,
    text: &str,
    color: Color,
) {
    let area = centered_rect(percent_x, percent_y, frame.area());
    frame.render_widget(Clear, area);
    let widget = Paragraph::new(text.to_owned())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(title.to_owned())
                .borders(Borders::ALL)
                .style(Style::default().fg(color)),
        );
    frame.render_widget(widget, area);
}

fn tab_title<G: Gateway>(workspace: &Workspace<G>, kind: EntityKind) -> String {
    let state = workspace.state();
    let (shown, fetched) = match kind {
        EntityKind::Invoice => (state.invoices.store().len(), state.invoices.source().len()),
        EntityKind::Client => (state.clients.store().len(), state.clients.source().len()),
        EntityKind::Product => (state.products.store().len(), state.products.source().len()),
    };
    if shown == fetched {
        format!("{} ({fetched})", kind.label())
    } else {
        format!("{} ({shown}/{fetched})", kind.label())
    }
}

const fn empty_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Invoice => "Aucune facture",
        EntityKind::Client => "Aucun client",
        EntityKind::Product => "Aucun produit",
    }
}

fn render_list_text(view: &ListView, selected: usize, field: usize) -> String {
    let mut lines = Vec::new();
    if !view.term.is_empty() {
        lines.push(format!("Filtre: {} ({} résultat(s))", view.term, view.total));
        lines.push(String::new());
    }
    if view.rows.is_empty() {
        lines.push(empty_label(view.kind).to_owned());
    }
    for (index, slot) in view.rows.iter().enumerate() {
        let is_selected = index == selected;
        let marker = if is_selected { CURSOR } else { NO_CURSOR };
        match slot {
            RowSlot::Display(row) => {
                lines.push(format!("{marker}{}", row.title));
                lines.extend(row.lines.iter().map(|line| format!("    {line}")));
                lines.push(format!("    {}", actions_text(&row.actions)));
            }
            RowSlot::Editing(form) => {
                lines.push(format!("{marker}{}", form.title));
                for (position, field_view) in form.fields.iter().enumerate() {
                    let focused = is_selected && position == field;
                    lines.push(format!("  {}", field_text(field_view, focused)));
                }
                if let Some(error) = &form.error {
                    lines.push(format!("    ! {error}"));
                }
                lines.push("    [Entrée] Enregistrer  [Échap] Annuler".to_owned());
            }
        }
    }
    lines.push(String::new());
    lines.push(pagination_text(&view.pagination));
    lines.join("\n")
}

fn actions_text(actions: &[RowAction]) -> String {
    actions
        .iter()
        .map(|action| format!("[{}]", action.label()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn pagination_text(pagination: &PaginationView) -> String {
    let button = |label: &str, enabled: bool| {
        if enabled {
            format!("[{label}]")
        } else {
            format!("({label})")
        }
    };
    format!(
        "{} {} {}",
        button("Précédent", pagination.has_prev),
        pagination.label(),
        button("Suivant", pagination.has_next)
    )
}

fn field_text(field: &FieldView, focused: bool) -> String {
    let cursor = if focused { CURSOR } else { NO_CURSOR };
    let caret = if focused && !field.readonly { "_" } else { "" };
    let text = format!("{cursor}{}: {}{caret}", field.label, field.value);
    match field.hint {
        Some(hint) => format!("{text}  ({hint})"),
        None => text,
    }
}

fn fields_text(title: &str, fields: &[FieldView], focus: usize) -> Vec<String> {
    let mut lines = vec![title.to_owned(), String::new()];
    lines.extend(
        fields
            .iter()
            .enumerate()
            .map(|(index, field)| field_text(field, index == focus)),
    );
    lines
}

fn render_form_text(form: &FormView, focus: usize) -> String {
    let mut lines = fields_text(&form.title, &form.fields, focus);
    if let Some(error) = &form.error {
        lines.push(String::new());
        lines.push(format!("! {error}"));
    }
    if form.saving {
        lines.push("Enregistrement…".to_owned());
    }
    lines.push(String::new());
    lines.push("[Entrée] Enregistrer  [Échap] Annuler".to_owned());
    lines.join("\n")
}

fn render_text_form(form: &impl TextForm, focus: usize) -> String {
    let mut lines = fields_text(&form.title(), &form.fields(), focus);
    lines.push(String::new());
    lines.push("tab champ suivant | entrée valider | échap fermer".to_owned());
    lines.join("\n")
}

fn render_details_text(view: &InvoiceDetailsView) -> String {
    let mut lines = vec![
        view.title.clone(),
        String::new(),
        format!("Date: {}", view.date),
        format!("Client: {}", view.client),
        format!("Montant total: {}", view.total),
        String::new(),
        "Produits:".to_owned(),
    ];
    if view.lines.is_empty() {
        lines.push("  (aucun)".to_owned());
    }
    lines.extend(view.lines.iter().map(|line| match line {
        DetailLine::Product(text) => format!("  - {text}"),
        DetailLine::Degraded(text) => format!("  ! {text}"),
    }));
    lines.push(String::new());
    lines.push(format!("{}  [Échap] Fermer", actions_text(&view.actions)));
    lines.join("\n")
}

fn render_draft_text(draft: &NewInvoiceForm, field: usize) -> String {
    let focus = DraftFocus::from_field(field);
    let marker = |focused: bool| if focused { CURSOR } else { NO_CURSOR };

    let client = draft
        .selected_client()
        .map_or_else(|| "Sélectionnez un client".to_owned(), |choice| choice.label());
    let date_caret = if focus == DraftFocus::Date { "_" } else { "" };
    let mut lines = vec![
        "Nouvelle facture".to_owned(),
        String::new(),
        format!(
            "{}Client: {client}  (←/→)",
            marker(focus == DraftFocus::Client)
        ),
        format!(
            "{}Date: {}{date_caret}  (aaaa-mm-jj)",
            marker(focus == DraftFocus::Date),
            draft.invoice_date
        ),
        String::new(),
        "Produits:".to_owned(),
    ];
    for (index, entry) in draft.lines.lines().iter().enumerate() {
        let product = entry
            .product_id
            .and_then(|product_id| draft.lines.choice(product_id))
            .map_or_else(|| "Sélectionnez un produit".to_owned(), |choice| choice.label());
        let subtotal = draft.lines.subtotal_label(index).unwrap_or_default();
        lines.push(format!(
            "  {}. {}Produit: {product}  {}Quantité: {}  Sous-total: {subtotal}",
            index + 1,
            marker(focus == DraftFocus::Product(index)),
            marker(focus == DraftFocus::Quantity(index)),
            entry.quantity
        ));
    }
    lines.push(String::new());
    lines.push(format!("Total: {}", draft.lines.total_label()));
    lines.push(String::new());
    lines.push(
        "tab champ | ←/→ choisir | ctrl+n ajouter une ligne | ctrl+d retirer | entrée créer | échap fermer"
            .to_owned(),
    );
    lines.join("\n")
}

fn render_delete_confirm_text(pending: &PendingDelete) -> String {
    format!(
        "Êtes-vous sûr de vouloir supprimer {} ?\n\n[o] Oui  [n] Non",
        pending.label
    )
}

fn render_notice_text(notice: &Notice) -> String {
    format!("{}\n\n[Entrée] OK", notice.message)
}

fn status_text<G: Gateway>(workspace: &Workspace<G>, view_data: &ViewData) -> String {
    if let Some(prompt) = &view_data.prompt {
        return match prompt.kind {
            PromptKind::Filter => format!("Filtrer: {}_  (entrée/échap fermer)", prompt.input),
            PromptKind::PageJump => format!("Aller à la page: {}_  (entrée valider)", prompt.input),
        };
    }
    if status_hidden_by_overlay(workspace, view_data) {
        return String::new();
    }
    let page = workspace.state().page;
    let search = if page == EntityKind::Invoice {
        " | s rechercher"
    } else {
        ""
    };
    let hints = format!(
        "j/k sélection | ←/→ page | g aller à | / filtrer | a ajouter | e modifier | d supprimer{search} | r recharger | tab onglet | ? aide | q quitter"
    );
    match &view_data.status {
        Some(status) => format!("{status} | {hints}"),
        None => hints,
    }
}

fn status_hidden_by_overlay<G: Gateway>(workspace: &Workspace<G>, view_data: &ViewData) -> bool {
    let state = workspace.state();
    state.notice.is_some()
        || state.details.is_some()
        || state.draft.is_some()
        || state.create.is_some()
        || view_data.search.is_some()
        || view_data.pending_delete.is_some()
        || view_data.help_visible
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quitter | ? aide\n\
nav: j/k ou ↑/↓ sélection | ←/→ ou p/n page | g aller à la page | tab/1-3 onglet\n\
nav: / filtrer (échap efface le filtre) | r recharger | s rechercher (factures)\n\
ligne: entrée action principale | e modifier | d supprimer | a ajouter\n\
formulaire: tab/shift+tab champ | entrée ou ctrl+s valider | échap annuler\n\
facture: ←/→ client ou produit | +/- ou chiffres quantité | ctrl+n ligne | ctrl+d retirer\n\
message: entrée pour fermer"
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

#[cfg(test)]
mod tests {
    use super::{
        DraftFocus, PromptKind, ViewData, centered_rect, handle_key_event, help_overlay_text,
        render_details_text, render_draft_text, render_list_text, render_notice_text,
        status_text,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use factura_api::{MemoryGateway, Operation};
    use factura_app::{
        AppCommand, ClientId, DetailsPanel, EntityKind, Notice, NoticeLevel, NetworkError,
        ProductId, RowSlot, Workspace,
    };
    use factura_testkit::{fixture_client, fixture_invoice, fixture_invoices, fixture_product};
    use ratatui::layout::Rect;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn press(
        workspace: &mut Workspace<MemoryGateway>,
        view_data: &mut ViewData,
        keys: &[KeyEvent],
    ) {
        for key in keys {
            assert!(!handle_key_event(workspace, view_data, *key), "{key:?} quit");
        }
    }

    fn type_text(workspace: &mut Workspace<MemoryGateway>, view_data: &mut ViewData, text: &str) {
        let keys: Vec<KeyEvent> = text.chars().map(|ch| key(KeyCode::Char(ch))).collect();
        press(workspace, view_data, &keys);
    }

    fn workspace_on(page: EntityKind, gateway: MemoryGateway) -> Workspace<MemoryGateway> {
        let mut workspace = Workspace::new(gateway, page);
        workspace.dispatch(AppCommand::ReloadAll);
        workspace
    }

    fn sample_workspace(page: EntityKind) -> Workspace<MemoryGateway> {
        workspace_on(
            page,
            MemoryGateway::with_data(
                fixture_invoices(7),
                (1..=3).map(fixture_client).collect(),
                vec![fixture_product(10), fixture_product(5)],
            ),
        )
    }

    #[test]
    fn quit_keys() {
        let mut workspace = sample_workspace(EntityKind::Invoice);
        let mut view_data = ViewData::default();
        assert!(handle_key_event(&mut workspace, &mut view_data, ctrl('q')));
        assert!(handle_key_event(
            &mut workspace,
            &mut view_data,
            key(KeyCode::Char('q'))
        ));
    }

    #[test]
    fn list_text_marks_selection_and_pagination() {
        let workspace = sample_workspace(EntityKind::Invoice);
        let text = render_list_text(&workspace.list_view(EntityKind::Invoice), 1, 0);
        assert!(text.contains("  Facture FAC-1\n"));
        assert!(text.contains("▸ Facture FAC-2\n"));
        assert!(text.contains("    Date: 15/01/2024"));
        assert!(text.contains("[Détails] [Supprimer]"));
        assert!(text.ends_with("(Précédent) Page 1 sur 2 [Suivant]"));
        assert!(!text.contains("FAC-6"));
    }

    #[test]
    fn empty_list_text_names_the_collection() {
        let workspace = workspace_on(EntityKind::Product, MemoryGateway::new());
        let text = render_list_text(&workspace.list_view(EntityKind::Product), 0, 0);
        assert!(text.starts_with("Aucun produit"));
        assert!(text.ends_with("(Précédent) Page 0 sur 0 (Suivant)"));
    }

    #[test]
    fn selection_moves_and_clamps_to_the_page() {
        let mut workspace = sample_workspace(EntityKind::Invoice);
        let mut view_data = ViewData::default();
        press(&mut workspace, &mut view_data, &[key(KeyCode::Up)]);
        assert_eq!(view_data.selected, 0);
        for _ in 0..9 {
            press(&mut workspace, &mut view_data, &[key(KeyCode::Char('j'))]);
        }
        assert_eq!(view_data.selected, 4);

        press(&mut workspace, &mut view_data, &[key(KeyCode::Right)]);
        assert_eq!(workspace.state().invoices.store().current_page(), 2);
        assert_eq!(view_data.selected, 0);
    }

    #[test]
    fn filter_prompt_filters_while_typing() {
        let mut workspace = sample_workspace(EntityKind::Client);
        let mut view_data = ViewData::default();
        press(&mut workspace, &mut view_data, &[key(KeyCode::Char('/'))]);
        assert_eq!(
            view_data.prompt.as_ref().map(|prompt| prompt.kind),
            Some(PromptKind::Filter)
        );
        type_text(&mut workspace, &mut view_data, "3");
        assert!(status_text(&workspace, &view_data).starts_with("Filtrer: 3_"));
        assert_eq!(workspace.list_view(EntityKind::Client).total, 1);

        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        assert!(view_data.prompt.is_none());
        assert_eq!(workspace.state().clients.term(), "3");

        press(&mut workspace, &mut view_data, &[key(KeyCode::Esc)]);
        assert_eq!(workspace.list_view(EntityKind::Client).total, 3);
    }

    #[test]
    fn page_jump_and_blocking_notice() {
        let mut workspace = workspace_on(
            EntityKind::Invoice,
            MemoryGateway::with_data(fixture_invoices(12), Vec::new(), Vec::new()),
        );
        let mut view_data = ViewData::default();
        press(&mut workspace, &mut view_data, &[key(KeyCode::Char('g'))]);
        type_text(&mut workspace, &mut view_data, "3");
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        assert_eq!(workspace.state().invoices.store().current_page(), 3);

        press(&mut workspace, &mut view_data, &[key(KeyCode::Char('g'))]);
        type_text(&mut workspace, &mut view_data, "x");
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        assert!(workspace.state().notice.is_some());
        assert_eq!(workspace.state().invoices.store().current_page(), 3);

        press(&mut workspace, &mut view_data, &[key(KeyCode::Left)]);
        assert_eq!(
            workspace.state().invoices.store().current_page(),
            3,
            "navigation is blocked while a notice is shown"
        );
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        assert!(workspace.state().notice.is_none());
        press(&mut workspace, &mut view_data, &[key(KeyCode::Left)]);
        assert_eq!(workspace.state().invoices.store().current_page(), 2);
    }

    #[test]
    fn client_row_edits_in_place() {
        let mut workspace = sample_workspace(EntityKind::Client);
        let mut view_data = ViewData::default();
        press(&mut workspace, &mut view_data, &[key(KeyCode::Char('e'))]);
        let view = workspace.list_view(EntityKind::Client);
        assert!(matches!(view.rows[0], RowSlot::Editing(_)));
        let text = render_list_text(&view, view_data.selected, view_data.field);
        assert!(text.contains("▸ Nom: Client 1_"));
        assert!(text.contains("ID Client: 1  (L'ID client ne peut pas être modifié)"));

        for _ in 0.."Client 1".len() {
            press(&mut workspace, &mut view_data, &[key(KeyCode::Backspace)]);
        }
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        assert_eq!(workspace.gateway().mutation_count(), 0);
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        let text = render_list_text(
            &workspace.list_view(EntityKind::Client),
            view_data.selected,
            view_data.field,
        );
        assert!(text.contains("! le champ nom est requis"));

        type_text(&mut workspace, &mut view_data, "Alice");
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        assert_eq!(workspace.gateway().clients()[0].name, "Alice");
        assert_eq!(
            workspace.state().notice.as_ref().map(|notice| notice.level),
            Some(NoticeLevel::Success)
        );
    }

    #[test]
    fn read_only_client_id_ignores_typing() {
        let mut workspace = sample_workspace(EntityKind::Client);
        let mut view_data = ViewData::default();
        press(
            &mut workspace,
            &mut view_data,
            &[key(KeyCode::Char('e')), key(KeyCode::Tab)],
        );
        assert_eq!(view_data.field, 1);
        type_text(&mut workspace, &mut view_data, "9");
        press(&mut workspace, &mut view_data, &[key(KeyCode::Backspace)]);

        let view = workspace.list_view(EntityKind::Client);
        assert!(matches!(view.rows[0], RowSlot::Editing(_)));
        let text = render_list_text(&view, view_data.selected, view_data.field);
        assert!(text.contains("ID Client: 1  (L'ID client ne peut pas être modifié)"));
        assert!(text.contains("Nom: Client 1"));

        press(&mut workspace, &mut view_data, &[key(KeyCode::BackTab)]);
        type_text(&mut workspace, &mut view_data, "x");
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        assert_eq!(workspace.gateway().clients()[0].name, "Client 1x");
        assert_eq!(workspace.gateway().clients()[0].client_id.get(), 1);
    }

    #[test]
    fn escape_cancels_a_row_edit() {
        let mut workspace = sample_workspace(EntityKind::Product);
        let mut view_data = ViewData::default();
        press(
            &mut workspace,
            &mut view_data,
            &[key(KeyCode::Char('e')), key(KeyCode::Tab)],
        );
        type_text(&mut workspace, &mut view_data, "99");
        press(&mut workspace, &mut view_data, &[key(KeyCode::Esc)]);
        assert!(matches!(
            workspace.list_view(EntityKind::Product).rows[0],
            RowSlot::Display(_)
        ));
        assert_eq!(workspace.gateway().count(Operation::UpdateProduct), 0);
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let mut workspace = sample_workspace(EntityKind::Client);
        let mut view_data = ViewData::default();
        press(
            &mut workspace,
            &mut view_data,
            &[key(KeyCode::Char('d')), key(KeyCode::Char('n'))],
        );
        assert_eq!(workspace.gateway().clients().len(), 3);
        assert_eq!(view_data.status.as_deref(), Some("Suppression annulée"));

        press(
            &mut workspace,
            &mut view_data,
            &[key(KeyCode::Char('d')), key(KeyCode::Char('o'))],
        );
        assert_eq!(workspace.gateway().clients().len(), 2);
        assert_eq!(workspace.list_view(EntityKind::Client).total, 2);
    }

    #[test]
    fn invoice_draft_builds_lines_from_keys() {
        let mut workspace = sample_workspace(EntityKind::Invoice);
        let mut view_data = ViewData::default();
        press(&mut workspace, &mut view_data, &[key(KeyCode::Char('a'))]);
        assert!(workspace.state().draft.is_some());

        press(
            &mut workspace,
            &mut view_data,
            &[
                key(KeyCode::Right),
                key(KeyCode::Tab),
            ],
        );
        type_text(&mut workspace, &mut view_data, "2024-05-02");
        press(
            &mut workspace,
            &mut view_data,
            &[key(KeyCode::Tab), key(KeyCode::Right), key(KeyCode::Tab), key(KeyCode::Char('+'))],
        );
        press(&mut workspace, &mut view_data, &[ctrl('n'), key(KeyCode::Right), key(KeyCode::Right)]);
        assert_eq!(DraftFocus::from_field(view_data.field), DraftFocus::Product(1));

        let draft = workspace.state().draft.clone().expect("draft open");
        assert_eq!(draft.client_id, Some(ClientId::new(1)));
        assert_eq!(draft.lines.lines()[0].product_id, Some(ProductId::new(10)));
        assert_eq!(draft.lines.lines()[0].quantity, 2);
        assert_eq!(draft.lines.lines()[1].product_id, Some(ProductId::new(5)));
        let text = render_draft_text(&draft, view_data.field);
        assert!(text.contains("Total: 25,00 €"));
        assert!(text.contains("Client: Client 1  (←/→)"));
        assert!(text.contains("2. ▸ Produit: Produit 5 - 5,00€"));

        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        assert!(workspace.state().draft.is_none());
        assert_eq!(workspace.gateway().count(Operation::CreateInvoice), 1);
        assert_eq!(workspace.list_view(EntityKind::Invoice).total, 8);
    }

    #[test]
    fn zero_quantity_is_refused() {
        let mut workspace = sample_workspace(EntityKind::Invoice);
        let mut view_data = ViewData::default();
        press(
            &mut workspace,
            &mut view_data,
            &[
                key(KeyCode::Char('a')),
                key(KeyCode::Tab),
                key(KeyCode::Tab),
                key(KeyCode::Tab),
                key(KeyCode::Char('-')),
            ],
        );
        assert_eq!(
            view_data.status.as_deref(),
            Some("la quantité doit être au moins 1 (ligne 1)")
        );
        let draft = workspace.state().draft.clone().expect("draft open");
        assert_eq!(draft.lines.lines()[0].quantity, 1);
    }

    #[test]
    fn details_open_edit_and_close() {
        let mut workspace = sample_workspace(EntityKind::Invoice);
        let mut view_data = ViewData::default();
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        let Some(DetailsPanel::Display(view)) = workspace.details_panel() else {
            panic!("details should be open");
        };
        let text = render_details_text(&view);
        assert!(text.starts_with("Détails de la Facture FAC-1"));
        assert!(text.contains("Client: Client 1 (ID: 1)"));
        assert!(text.contains("  (aucun)"));
        assert!(status_text(&workspace, &view_data).is_empty());

        press(
            &mut workspace,
            &mut view_data,
            &[
                key(KeyCode::Char('e')),
                key(KeyCode::Tab),
                key(KeyCode::Tab),
            ],
        );
        for _ in 0..8 {
            press(&mut workspace, &mut view_data, &[key(KeyCode::Backspace)]);
        }
        type_text(&mut workspace, &mut view_data, "42");
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        assert_eq!(
            workspace.gateway().invoices()[0].total_amount.value(),
            Some(42.0)
        );
        press(
            &mut workspace,
            &mut view_data,
            &[key(KeyCode::Enter), key(KeyCode::Esc)],
        );
        assert!(workspace.details_panel().is_none());
    }

    #[test]
    fn failed_search_keeps_the_form_open() {
        let mut workspace = sample_workspace(EntityKind::Invoice);
        let mut view_data = ViewData::default();
        press(&mut workspace, &mut view_data, &[key(KeyCode::Char('s'))]);
        type_text(&mut workspace, &mut view_data, "1");
        workspace
            .gateway_mut()
            .fail_next(Operation::SearchInvoices, NetworkError::status(500, "boom"));
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        assert!(view_data.search.is_some());

        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        assert!(view_data.search.is_none());
        assert_eq!(workspace.list_view(EntityKind::Invoice).total, 7);
    }

    #[test]
    fn detail_of_unknown_client_still_renders() {
        let mut workspace = workspace_on(
            EntityKind::Invoice,
            MemoryGateway::with_data(
                vec![fixture_invoice(1, ClientId::new(42))],
                Vec::new(),
                Vec::new(),
            ),
        );
        let mut view_data = ViewData::default();
        press(&mut workspace, &mut view_data, &[key(KeyCode::Enter)]);
        let Some(DetailsPanel::Display(view)) = workspace.details_panel() else {
            panic!("details should be open");
        };
        assert!(render_details_text(&view).contains("Client: Client inconnu (ID: 42)"));
    }

    #[test]
    fn notice_text_and_help() {
        let notice = Notice {
            level: NoticeLevel::Error,
            message: "Erreur lors du chargement des factures".to_owned(),
        };
        assert_eq!(
            render_notice_text(&notice),
            "Erreur lors du chargement des factures\n\n[Entrée] OK"
        );
        assert!(help_overlay_text().contains("ctrl+q"));
    }

    #[test]
    fn status_text_offers_search_only_on_invoices() {
        let workspace = sample_workspace(EntityKind::Invoice);
        let view_data = ViewData::default();
        assert!(status_text(&workspace, &view_data).contains("s rechercher"));
        let workspace = sample_workspace(EntityKind::Product);
        assert!(!status_text(&workspace, &view_data).contains("s rechercher"));
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 50, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 10);
    }
}
