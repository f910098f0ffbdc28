// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::details::{InvoiceDetailsView, render_invoice_details};
use crate::editor::{EditForm, EditPhase, EditSession, UpdatePayload};
use crate::error::{ConsistencyError, NetworkError, UiError, ValidationError};
use crate::filter::Searchable;
use crate::forms::{
    InvoiceSearchForm, NewClientForm, NewInvoiceForm, NewProductForm, client_choices,
    generate_invoice_number, next_client_id, next_product_id, random_invoice_suffix,
};
use crate::gateway::{Gateway, GatewayResult};
use crate::line_items::catalog_choices;
use crate::store::{CollectionStore, Listing};
use crate::view::{FormView, ListView, Rendered, RowView, render_list};
use crate::{
    Client, ClientId, EntityKind, Invoice, NewClient, NewProduct, Product, ProductId, RecordId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message the user has to acknowledge before doing anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDetails {
    pub invoice: Invoice,
    pub view: InvoiceDetailsView,
    pub edit: Option<EditSession<InvoiceDetailsView>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailsPanel {
    Display(InvoiceDetailsView),
    Editing(FormView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateForm {
    Client(NewClientForm),
    Product(NewProductForm),
}

impl CreateForm {
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Client(_) => EntityKind::Client,
            Self::Product(_) => EntityKind::Product,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub page: EntityKind,
    pub invoices: Listing<Invoice>,
    pub clients: Listing<Client>,
    pub products: Listing<Product>,
    pub details: Option<InvoiceDetails>,
    pub create: Option<CreateForm>,
    pub draft: Option<NewInvoiceForm>,
    pub notice: Option<Notice>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            page: EntityKind::Invoice,
            invoices: Listing::default(),
            clients: Listing::default(),
            products: Listing::default(),
            details: None,
            create: None,
            draft: None,
            notice: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    ReloadAll,
    Reload(EntityKind),
    SwitchPage(EntityKind),
    SetFilter { kind: EntityKind, term: String },
    GoToPage { kind: EntityKind, page: usize },
    NextPage(EntityKind),
    PrevPage(EntityKind),
    ShowDetails(RecordId),
    CloseDetails,
    BeginEdit { kind: EntityKind, record_id: RecordId },
    SubmitEdit { kind: EntityKind, record_id: RecordId },
    CancelEdit { kind: EntityKind, record_id: RecordId },
    OpenCreate(EntityKind),
    SubmitCreate(EntityKind),
    CloseCreate(EntityKind),
    Delete { kind: EntityKind, record_id: RecordId },
    Search(InvoiceSearchForm),
    DismissNotice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    PageChanged(EntityKind),
    Loaded { kind: EntityKind, count: usize },
    EditsDiscarded { kind: EntityKind, count: usize },
    Filtered { kind: EntityKind, count: usize },
    PageMoved { kind: EntityKind, page: usize },
    DetailsShown(RecordId),
    DetailsClosed,
    EditStarted { kind: EntityKind, record_id: RecordId },
    EditCancelled { kind: EntityKind, record_id: RecordId },
    EditRolledBack { kind: EntityKind, row: RowView },
    DetailsRestored(InvoiceDetailsView),
    Saved { kind: EntityKind, record_id: RecordId },
    FormOpened(EntityKind),
    FormClosed(EntityKind),
    Created(EntityKind),
    Deleted { kind: EntityKind, record_id: RecordId },
    CatalogRefreshed { problems: Vec<ConsistencyError> },
    Notified(Notice),
    NoticeDismissed,
    Failed(UiError),
}

struct Failure {
    context: Option<&'static str>,
    error: UiError,
}

impl Failure {
    fn message(&self) -> String {
        match self.context {
            Some(context) => format!("{context}: {}", self.error),
            None => self.error.to_string(),
        }
    }
}

impl From<ValidationError> for Failure {
    fn from(error: ValidationError) -> Self {
        Self {
            context: None,
            error: error.into(),
        }
    }
}

impl From<NetworkError> for Failure {
    fn from(error: NetworkError) -> Self {
        Self {
            context: None,
            error: error.into(),
        }
    }
}

impl From<ConsistencyError> for Failure {
    fn from(error: ConsistencyError) -> Self {
        Self {
            context: None,
            error: error.into(),
        }
    }
}

fn during<E: Into<UiError>>(context: &'static str) -> impl FnOnce(E) -> Failure {
    move |error| Failure {
        context: Some(context),
        error: error.into(),
    }
}

enum SaveOutcome<S> {
    Saved,
    RolledBack { snapshot: S, error: NetworkError },
}

fn finish_save<S>(mut session: EditSession<S>, outcome: GatewayResult<()>) -> SaveOutcome<S> {
    match outcome {
        Ok(()) => {
            session.succeed();
            SaveOutcome::Saved
        }
        Err(error) => {
            session.fail(error.to_string());
            SaveOutcome::RolledBack {
                snapshot: session.restore(),
                error,
            }
        }
    }
}

fn begin_row_edit<T: Rendered + Searchable>(
    listing: &mut Listing<T>,
    record_id: &RecordId,
    form: impl FnOnce(&T) -> EditForm,
) -> Result<(), ConsistencyError> {
    if listing.session(record_id).is_some() {
        return Ok(());
    }
    let item = listing
        .find(record_id)
        .ok_or_else(|| ConsistencyError::UnknownRecord {
            kind: T::KIND,
            record_id: record_id.clone(),
        })?;
    let session = EditSession::begin(record_id.clone(), item.row_view(), form(item));
    listing.open_session(session);
    Ok(())
}

fn submit_row_edit<T: Rendered + Searchable>(
    listing: &mut Listing<T>,
    record_id: &RecordId,
    save: impl FnOnce(UpdatePayload) -> GatewayResult<()>,
) -> Result<SaveOutcome<RowView>, ValidationError> {
    let session = listing
        .session_mut(record_id)
        .ok_or(ValidationError::NotEditing)?;
    let payload = session.submit()?;
    let outcome = save(payload);
    let session = listing
        .take_session(record_id)
        .ok_or(ValidationError::NotEditing)?;
    Ok(finish_save(session, outcome))
}

fn apply_update<G: Gateway>(
    gateway: &mut G,
    record_id: &RecordId,
    payload: UpdatePayload,
) -> GatewayResult<()> {
    match payload {
        UpdatePayload::Client(update) => gateway.update_client(record_id, &update).map(drop),
        UpdatePayload::Product(update) => gateway.update_product(record_id, &update).map(drop),
        UpdatePayload::Invoice(update) => gateway.update_invoice(record_id, &update).map(drop),
    }
}

const fn update_failure(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Invoice => "Erreur lors de la mise à jour de la facture",
        EntityKind::Client => "Erreur lors de la mise à jour du client",
        EntityKind::Product => "Erreur lors de la mise à jour du produit",
    }
}

const fn update_success(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Invoice => "Facture mise à jour avec succès",
        EntityKind::Client => "Client mis à jour avec succès",
        EntityKind::Product => "Produit mis à jour avec succès",
    }
}

const fn load_failure(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Invoice => "Erreur lors du chargement des factures",
        EntityKind::Client => "Erreur lors du chargement des clients",
        EntityKind::Product => "Erreur lors du chargement des produits",
    }
}

const fn create_failure(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Invoice => "Erreur lors de la création de la facture",
        EntityKind::Client => "Erreur lors de la création du client",
        EntityKind::Product => "Erreur lors de la création du produit",
    }
}

const fn create_success(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Invoice => "Facture créée avec succès",
        EntityKind::Client => "Client créé avec succès",
        EntityKind::Product => "Produit créé avec succès",
    }
}

const fn delete_failure(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Invoice => "Erreur lors de la suppression de la facture",
        EntityKind::Client => "Erreur lors de la suppression du client",
        EntityKind::Product => "Erreur lors de la suppression du produit",
    }
}

const fn delete_success(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Invoice => "Facture supprimée avec succès",
        EntityKind::Client => "Client supprimé avec succès",
        EntityKind::Product => "Produit supprimé avec succès",
    }
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn editable<S>(session: &mut EditSession<S>) -> Option<&mut EditForm> {
    (session.phase() == EditPhase::Editing).then(|| session.form_mut())
}

/// Owns the three listings and the gateway. Every user action goes through
/// [`Workspace::dispatch`]; failures end up as a notice, never as a panic or
/// an error returned to the caller.
pub struct Workspace<G> {
    gateway: G,
    state: AppState,
}

impl<G: Gateway> Workspace<G> {
    pub fn new(gateway: G, page: EntityKind) -> Self {
        Self {
            gateway,
            state: AppState {
                page,
                ..AppState::default()
            },
        }
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn list_view(&self, kind: EntityKind) -> ListView {
        match kind {
            EntityKind::Invoice => render_list(&self.state.invoices),
            EntityKind::Client => render_list(&self.state.clients),
            EntityKind::Product => render_list(&self.state.products),
        }
    }

    pub fn details_panel(&self) -> Option<DetailsPanel> {
        let details = self.state.details.as_ref()?;
        Some(match &details.edit {
            Some(session) => DetailsPanel::Editing(session.form_view()),
            None => DetailsPanel::Display(details.view.clone()),
        })
    }

    /// The editable form of a row or of the open invoice, while it is still
    /// being edited.
    pub fn edit_form_mut(&mut self, kind: EntityKind, record_id: &RecordId) -> Option<&mut EditForm> {
        match kind {
            EntityKind::Client => self.state.clients.session_mut(record_id).and_then(editable),
            EntityKind::Product => self.state.products.session_mut(record_id).and_then(editable),
            EntityKind::Invoice => self
                .state
                .details
                .as_mut()
                .filter(|details| &details.invoice.id == record_id)
                .and_then(|details| details.edit.as_mut())
                .and_then(editable),
        }
    }

    pub fn create_form_mut(&mut self) -> Option<&mut CreateForm> {
        self.state.create.as_mut()
    }

    pub fn draft_mut(&mut self) -> Option<&mut NewInvoiceForm> {
        self.state.draft.as_mut()
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        let mut events = Vec::new();
        if let Err(failure) = self.run(command, &mut events) {
            let message = failure.message();
            warn!(error = %failure.error, %message, "command failed");
            events.push(self.notify(NoticeLevel::Error, message));
            events.push(AppEvent::Failed(failure.error));
        }
        events
    }

    fn run(&mut self, command: AppCommand, events: &mut Vec<AppEvent>) -> Result<(), Failure> {
        match command {
            AppCommand::ReloadAll => {
                let mut failures = Vec::new();
                for kind in EntityKind::ALL {
                    if let Err(failure) = self.reload(kind, events) {
                        failures.push(failure);
                    }
                }
                self.report_failures(failures, events);
                Ok(())
            }
            AppCommand::Reload(kind) => self.reload(kind, events),
            AppCommand::SwitchPage(kind) => {
                self.state.page = kind;
                events.push(AppEvent::PageChanged(kind));
                Ok(())
            }
            AppCommand::SetFilter { kind, term } => {
                let count = match kind {
                    EntityKind::Invoice => self.state.invoices.apply_filter(&term),
                    EntityKind::Client => self.state.clients.apply_filter(&term),
                    EntityKind::Product => self.state.products.apply_filter(&term),
                };
                debug!(%kind, %term, count, "filter applied");
                events.push(AppEvent::Filtered { kind, count });
                Ok(())
            }
            AppCommand::GoToPage { kind, page } => {
                self.move_page(kind, PageStep::To(page), events)
            }
            AppCommand::NextPage(kind) => self.move_page(kind, PageStep::Next, events),
            AppCommand::PrevPage(kind) => self.move_page(kind, PageStep::Prev, events),
            AppCommand::ShowDetails(record_id) => self.show_details(&record_id, events),
            AppCommand::CloseDetails => {
                if self.state.details.take().is_some() {
                    events.push(AppEvent::DetailsClosed);
                }
                Ok(())
            }
            AppCommand::BeginEdit { kind, record_id } => self.begin_edit(kind, record_id, events),
            AppCommand::SubmitEdit { kind, record_id } => {
                self.submit_edit(kind, record_id, events)
            }
            AppCommand::CancelEdit { kind, record_id } => {
                self.cancel_edit(kind, record_id, events)
            }
            AppCommand::OpenCreate(kind) => self.open_create(kind, events),
            AppCommand::SubmitCreate(kind) => self.submit_create(kind, events),
            AppCommand::CloseCreate(kind) => {
                let closed = match kind {
                    EntityKind::Invoice => self.state.draft.take().is_some(),
                    EntityKind::Client | EntityKind::Product => self
                        .state
                        .create
                        .take_if(|form| form.kind() == kind)
                        .is_some(),
                };
                if closed {
                    events.push(AppEvent::FormClosed(kind));
                }
                Ok(())
            }
            AppCommand::Delete { kind, record_id } => self.delete(kind, record_id, events),
            AppCommand::Search(form) => self.search(&form, events),
            AppCommand::DismissNotice => {
                if self.state.notice.take().is_some() {
                    events.push(AppEvent::NoticeDismissed);
                }
                Ok(())
            }
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) -> AppEvent {
        let notice = Notice {
            level,
            message: message.into(),
        };
        self.state.notice = Some(notice.clone());
        AppEvent::Notified(notice)
    }

    /// One notice for all of them, one `Failed` event each.
    fn report_failures(&mut self, failures: Vec<Failure>, events: &mut Vec<AppEvent>) {
        if failures.is_empty() {
            return;
        }
        let message = failures
            .iter()
            .map(Failure::message)
            .collect::<Vec<_>>()
            .join("\n");
        for failure in &failures {
            warn!(error = %failure.error, "load failed");
        }
        events.push(self.notify(NoticeLevel::Error, message));
        events.extend(failures.into_iter().map(|failure| AppEvent::Failed(failure.error)));
    }

    fn reload(&mut self, kind: EntityKind, events: &mut Vec<AppEvent>) -> Result<(), Failure> {
        let context = load_failure(kind);
        let (count, dropped) = match kind {
            EntityKind::Invoice => {
                let items = self.gateway.list_invoices().map_err(during(context))?;
                (items.len(), self.state.invoices.load(items))
            }
            EntityKind::Client => {
                let items = self.gateway.list_clients().map_err(during(context))?;
                (items.len(), self.state.clients.load(items))
            }
            EntityKind::Product => {
                let items = self.gateway.list_products().map_err(during(context))?;
                let count = items.len();
                let dropped = self.state.products.load(items);
                self.refresh_draft_catalog(events);
                (count, dropped)
            }
        };
        debug!(%kind, count, "collection loaded");
        events.push(AppEvent::Loaded { kind, count });
        if dropped > 0 {
            warn!(%kind, dropped, "reload discarded edits in progress");
            events.push(AppEvent::EditsDiscarded {
                kind,
                count: dropped,
            });
        }
        Ok(())
    }

    fn refresh_draft_catalog(&mut self, events: &mut Vec<AppEvent>) {
        let Some(draft) = self.state.draft.as_mut() else {
            return;
        };
        let problems = draft
            .lines
            .refresh_catalog(catalog_choices(self.state.products.source()));
        for problem in &problems {
            warn!(%problem, "invoice line lost its product");
        }
        events.push(AppEvent::CatalogRefreshed { problems });
    }

    fn move_page(
        &mut self,
        kind: EntityKind,
        step: PageStep,
        events: &mut Vec<AppEvent>,
    ) -> Result<(), Failure> {
        let page = match kind {
            EntityKind::Invoice => step_page(self.state.invoices.store_mut(), step),
            EntityKind::Client => step_page(self.state.clients.store_mut(), step),
            EntityKind::Product => step_page(self.state.products.store_mut(), step),
        }?;
        events.push(AppEvent::PageMoved { kind, page });
        Ok(())
    }

    fn show_details(
        &mut self,
        record_id: &RecordId,
        events: &mut Vec<AppEvent>,
    ) -> Result<(), Failure> {
        let invoice = self
            .gateway
            .get_invoice(record_id)
            .map_err(during("Erreur lors du chargement des détails"))?;
        let (view, problems) = render_invoice_details(
            &invoice,
            self.state.clients.source(),
            self.state.products.source(),
        );
        for problem in &problems {
            warn!(%problem, invoice = %record_id, "invoice details degraded");
        }
        debug!(invoice = %record_id, lines = view.lines.len(), "invoice details loaded");
        self.state.details = Some(InvoiceDetails {
            invoice,
            view,
            edit: None,
        });
        events.push(AppEvent::DetailsShown(record_id.clone()));
        Ok(())
    }

    fn begin_edit(
        &mut self,
        kind: EntityKind,
        record_id: RecordId,
        events: &mut Vec<AppEvent>,
    ) -> Result<(), Failure> {
        match kind {
            EntityKind::Client => {
                begin_row_edit(&mut self.state.clients, &record_id, EditForm::for_client)?;
            }
            EntityKind::Product => {
                begin_row_edit(&mut self.state.products, &record_id, EditForm::for_product)?;
            }
            EntityKind::Invoice => {
                let open = self
                    .state
                    .details
                    .as_ref()
                    .is_some_and(|details| details.invoice.id == record_id);
                if !open {
                    self.show_details(&record_id, events)?;
                }
                if let Some(details) = self.state.details.as_mut()
                    && details.edit.is_none()
                {
                    details.edit = Some(EditSession::begin(
                        record_id.clone(),
                        details.view.clone(),
                        EditForm::for_invoice(&details.invoice),
                    ));
                }
            }
        }
        debug!(%kind, record = %record_id, "edit started");
        events.push(AppEvent::EditStarted { kind, record_id });
        Ok(())
    }

    fn submit_edit(
        &mut self,
        kind: EntityKind,
        record_id: RecordId,
        events: &mut Vec<AppEvent>,
    ) -> Result<(), Failure> {
        if kind == EntityKind::Invoice {
            return self.submit_invoice_edit(record_id, events);
        }
        let context = update_failure(kind);
        let gateway = &mut self.gateway;
        let save = |payload| apply_update(gateway, &record_id, payload);
        let outcome = match kind {
            EntityKind::Client => submit_row_edit(&mut self.state.clients, &record_id, save),
            EntityKind::Product | EntityKind::Invoice => {
                submit_row_edit(&mut self.state.products, &record_id, save)
            }
        }
        .map_err(during(context))?;

        match outcome {
            SaveOutcome::Saved => {
                info!(%kind, record = %record_id, "record updated");
                events.push(AppEvent::Saved { kind, record_id });
                self.reload(kind, events)?;
                events.push(self.notify(NoticeLevel::Success, update_success(kind)));
                Ok(())
            }
            SaveOutcome::RolledBack { snapshot, error } => {
                events.push(AppEvent::EditRolledBack {
                    kind,
                    row: snapshot,
                });
                Err(during(context)(error))
            }
        }
    }

    fn submit_invoice_edit(
        &mut self,
        record_id: RecordId,
        events: &mut Vec<AppEvent>,
    ) -> Result<(), Failure> {
        let context = update_failure(EntityKind::Invoice);
        let details = self
            .state
            .details
            .as_mut()
            .filter(|details| details.invoice.id == record_id)
            .ok_or(ValidationError::NotEditing)?;
        let session = details.edit.as_mut().ok_or(ValidationError::NotEditing)?;
        let payload = session.submit().map_err(during(context))?;
        let outcome = apply_update(&mut self.gateway, &record_id, payload);
        let session = details.edit.take().ok_or(ValidationError::NotEditing)?;

        match finish_save(session, outcome) {
            SaveOutcome::Saved => {
                info!(invoice = %record_id, "invoice updated");
                events.push(AppEvent::Saved {
                    kind: EntityKind::Invoice,
                    record_id: record_id.clone(),
                });
                self.show_details(&record_id, events)?;
                self.reload(EntityKind::Invoice, events)?;
                events.push(self.notify(
                    NoticeLevel::Success,
                    update_success(EntityKind::Invoice),
                ));
                Ok(())
            }
            SaveOutcome::RolledBack { snapshot, error } => {
                details.view = snapshot.clone();
                events.push(AppEvent::DetailsRestored(snapshot));
                Err(during(context)(error))
            }
        }
    }

    fn cancel_edit(
        &mut self,
        kind: EntityKind,
        record_id: RecordId,
        events: &mut Vec<AppEvent>,
    ) -> Result<(), Failure> {
        match kind {
            EntityKind::Client => {
                let session = self
                    .state
                    .clients
                    .take_session(&record_id)
                    .ok_or(ValidationError::NotEditing)?;
                session.cancel();
            }
            EntityKind::Product => {
                let session = self
                    .state
                    .products
                    .take_session(&record_id)
                    .ok_or(ValidationError::NotEditing)?;
                session.cancel();
            }
            EntityKind::Invoice => {
                let details = self
                    .state
                    .details
                    .as_mut()
                    .filter(|details| details.invoice.id == record_id)
                    .ok_or(ValidationError::NotEditing)?;
                let session = details.edit.take().ok_or(ValidationError::NotEditing)?;
                details.view = session.cancel();
            }
        }
        debug!(%kind, record = %record_id, "edit cancelled");
        events.push(AppEvent::EditCancelled { kind, record_id });
        Ok(())
    }

    fn open_create(&mut self, kind: EntityKind, events: &mut Vec<AppEvent>) -> Result<(), Failure> {
        match kind {
            EntityKind::Invoice => {
                let clients = self
                    .gateway
                    .list_clients()
                    .map_err(during(load_failure(EntityKind::Client)))?;
                let products = self
                    .gateway
                    .list_products()
                    .map_err(during(load_failure(EntityKind::Product)))?;
                self.state.draft = Some(NewInvoiceForm::new(
                    client_choices(&clients),
                    catalog_choices(&products),
                ));
            }
            EntityKind::Client => {
                self.state.create = Some(CreateForm::Client(NewClientForm::default()));
            }
            EntityKind::Product => {
                self.state.create = Some(CreateForm::Product(NewProductForm::default()));
            }
        }
        events.push(AppEvent::FormOpened(kind));
        Ok(())
    }

    fn submit_create(&mut self, kind: EntityKind, events: &mut Vec<AppEvent>) -> Result<(), Failure> {
        let context = create_failure(kind);
        match kind {
            EntityKind::Invoice => {
                let draft = self
                    .state
                    .draft
                    .as_ref()
                    .ok_or(ValidationError::NotEditing)?;
                let number = generate_invoice_number(today(), random_invoice_suffix());
                let payload = draft.validate(number).map_err(during(context))?;
                let created = self
                    .gateway
                    .create_invoice(&payload)
                    .map_err(during(context))?;
                info!(
                    invoice = %created.invoice_number,
                    total = payload.total_amount,
                    lines = payload.products.len(),
                    "invoice created"
                );
                self.state.draft = None;
            }
            EntityKind::Client => {
                let Some(CreateForm::Client(form)) = &self.state.create else {
                    return Err(ValidationError::NotEditing.into());
                };
                let payload = form.validate(ClientId::new(0)).map_err(during(context))?;
                let client_id = match self.gateway.list_clients() {
                    Ok(clients) => next_client_id(&clients),
                    Err(error) => {
                        warn!(%error, "client list unavailable, numbering from 1");
                        ClientId::new(1)
                    }
                };
                let created = self
                    .gateway
                    .create_client(&NewClient {
                        client_id,
                        ..payload
                    })
                    .map_err(during(context))?;
                info!(client = %created.client_id, "client created");
                self.state.create = None;
            }
            EntityKind::Product => {
                let Some(CreateForm::Product(form)) = &self.state.create else {
                    return Err(ValidationError::NotEditing.into());
                };
                let payload = form.validate(ProductId::new(0)).map_err(during(context))?;
                let products = self
                    .gateway
                    .list_products()
                    .map_err(during("Impossible de générer un nouvel ID de produit"))?;
                let created = self
                    .gateway
                    .create_product(&NewProduct {
                        product_id: next_product_id(&products),
                        ..payload
                    })
                    .map_err(during(context))?;
                info!(product = ?created.product_id, "product created");
                self.state.create = None;
            }
        }
        events.push(AppEvent::FormClosed(kind));
        events.push(AppEvent::Created(kind));
        self.reload(kind, events)?;
        events.push(self.notify(NoticeLevel::Success, create_success(kind)));
        Ok(())
    }

    fn delete(
        &mut self,
        kind: EntityKind,
        record_id: RecordId,
        events: &mut Vec<AppEvent>,
    ) -> Result<(), Failure> {
        self.gateway
            .delete(kind, &record_id)
            .map_err(during(delete_failure(kind)))?;
        info!(%kind, record = %record_id, "record deleted");
        if kind == EntityKind::Invoice
            && self
                .state
                .details
                .take_if(|details| details.invoice.id == record_id)
                .is_some()
        {
            events.push(AppEvent::DetailsClosed);
        }
        events.push(AppEvent::Deleted { kind, record_id });
        self.reload(kind, events)?;
        events.push(self.notify(NoticeLevel::Success, delete_success(kind)));
        Ok(())
    }

    fn search(&mut self, form: &InvoiceSearchForm, events: &mut Vec<AppEvent>) -> Result<(), Failure> {
        let context = "Erreur lors de la recherche";
        let query = form.validate().map_err(during(context))?;
        let items = self
            .gateway
            .search_invoices(&query)
            .map_err(during(context))?;
        let count = items.len();
        self.state.invoices.load(items);
        self.state.invoices.store_mut().reset_page();
        debug!(count, ?query, "invoice search loaded");
        events.push(AppEvent::Loaded {
            kind: EntityKind::Invoice,
            count,
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageStep {
    To(usize),
    Next,
    Prev,
}

fn step_page<T>(store: &mut CollectionStore<T>, step: PageStep) -> Result<usize, ValidationError> {
    match step {
        PageStep::To(page) => store.set_page(page),
        PageStep::Next => store.next_page(),
        PageStep::Prev => store.prev_page(),
    }?;
    Ok(store.current_page())
}
