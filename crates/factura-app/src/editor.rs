// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::error::ValidationError;
use crate::format::{format_input_date, format_iso_date, parse_decimal, parse_input_date};
use crate::view::{FieldView, FormView, escape_text};
use crate::{
    Client, ClientId, ClientUpdate, EntityKind, Invoice, InvoiceUpdate, Product, ProductUpdate,
    RecordId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Viewing,
    Editing,
    Saving,
    Error,
}

/// Editable copy of an entity's fields, prefilled from the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditForm {
    Client {
        name: String,
        client_id: ClientId,
    },
    Product {
        name: String,
        price: String,
        category: String,
    },
    Invoice {
        invoice_number: String,
        invoice_date: String,
        client_id: String,
        total_amount: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePayload {
    Client(ClientUpdate),
    Product(ProductUpdate),
    Invoice(InvoiceUpdate),
}

impl EditForm {
    pub fn for_client(client: &Client) -> Self {
        Self::Client {
            name: client.name.clone(),
            client_id: client.client_id,
        }
    }

    pub fn for_product(product: &Product) -> Self {
        Self::Product {
            name: product.name.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
        }
    }

    pub fn for_invoice(invoice: &Invoice) -> Self {
        Self::Invoice {
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: format_input_date(&invoice.invoice_date),
            client_id: invoice.client_id.to_string(),
            total_amount: invoice.total_amount.to_string().replacen(',', ".", 1),
        }
    }

    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Client { .. } => EntityKind::Client,
            Self::Product { .. } => EntityKind::Product,
            Self::Invoice { .. } => EntityKind::Invoice,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::Client { .. } => "Modifier le client".to_owned(),
            Self::Product { .. } => "Modifier le produit".to_owned(),
            Self::Invoice { invoice_number, .. } => {
                format!("Modifier la facture {}", escape_text(invoice_number))
            }
        }
    }

    pub fn fields(&self) -> Vec<FieldView> {
        match self {
            Self::Client { name, client_id } => vec![
                editable("Nom", name),
                FieldView {
                    label: "ID Client",
                    value: client_id.to_string(),
                    readonly: true,
                    hint: Some("L'ID client ne peut pas être modifié"),
                },
            ],
            Self::Product {
                name,
                price,
                category,
            } => vec![
                editable("Nom", name),
                editable("Prix", price),
                editable("Catégorie", category),
            ],
            Self::Invoice {
                invoice_date,
                client_id,
                total_amount,
                ..
            } => vec![
                editable("Date", invoice_date),
                editable("Client ID", client_id),
                editable("Montant total", total_amount),
            ],
        }
    }

    pub const fn field_count(&self) -> usize {
        match self {
            Self::Client { .. } => 2,
            Self::Product { .. } | Self::Invoice { .. } => 3,
        }
    }

    /// Mutable access to an editable field; read-only fields yield `None`.
    pub fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match (self, index) {
            (Self::Client { name, .. }, 0) => Some(name),
            (Self::Product { name, .. }, 0) => Some(name),
            (Self::Product { price, .. }, 1) => Some(price),
            (Self::Product { category, .. }, 2) => Some(category),
            (Self::Invoice { invoice_date, .. }, 0) => Some(invoice_date),
            (Self::Invoice { client_id, .. }, 1) => Some(client_id),
            (Self::Invoice { total_amount, .. }, 2) => Some(total_amount),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<UpdatePayload, ValidationError> {
        match self {
            Self::Client { name, client_id } => Ok(UpdatePayload::Client(ClientUpdate {
                name: required_text("nom", name)?,
                client_id: *client_id,
            })),
            Self::Product {
                name,
                price,
                category,
            } => Ok(UpdatePayload::Product(ProductUpdate {
                name: required_text("nom", name)?,
                price: required_decimal("prix", price)?,
                category: category.trim().to_owned(),
            })),
            Self::Invoice {
                invoice_date,
                client_id,
                total_amount,
                ..
            } => {
                let date = parse_input_date("date", invoice_date)?;
                Ok(UpdatePayload::Invoice(InvoiceUpdate {
                    invoice_date: format_iso_date(date),
                    client_id: required_client_id(client_id)?,
                    total_amount: required_decimal("montant total", total_amount)?,
                }))
            }
        }
    }
}

fn editable(label: &'static str, value: &str) -> FieldView {
    FieldView {
        label,
        value: escape_text(value),
        readonly: false,
        hint: None,
    }
}

pub(crate) fn required_text(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn required_decimal(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    parse_decimal(raw).ok_or_else(|| ValidationError::Unparseable {
        field,
        value: raw.trim().to_owned(),
    })
}

pub(crate) fn required_client_id(raw: &str) -> Result<ClientId, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field: "client" });
    }
    trimmed
        .parse::<i64>()
        .map(ClientId::new)
        .map_err(|_| ValidationError::Unparseable {
            field: "client",
            value: trimmed.to_owned(),
        })
}

/// One in-place edit. `S` is whatever the row showed before editing began; it
/// is handed back unchanged on cancel or failure.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession<S> {
    record_id: RecordId,
    phase: EditPhase,
    snapshot: S,
    form: EditForm,
    error: Option<String>,
}

impl<S> EditSession<S> {
    pub fn begin(record_id: RecordId, snapshot: S, form: EditForm) -> Self {
        Self {
            record_id,
            phase: EditPhase::Editing,
            snapshot,
            form,
            error: None,
        }
    }

    pub const fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    pub const fn phase(&self) -> EditPhase {
        self.phase
    }

    pub const fn snapshot(&self) -> &S {
        &self.snapshot
    }

    pub const fn form(&self) -> &EditForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EditForm {
        &mut self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate the form and move to `Saving`. A validation failure keeps the
    /// session in `Editing` with the message attached to the form.
    pub fn submit(&mut self) -> Result<UpdatePayload, ValidationError> {
        if self.phase != EditPhase::Editing {
            return Err(ValidationError::NotEditing);
        }
        match self.form.validate() {
            Ok(payload) => {
                self.error = None;
                self.phase = EditPhase::Saving;
                Ok(payload)
            }
            Err(error) => {
                self.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// The save went through; the snapshot is dropped.
    pub fn succeed(self) -> EditPhase {
        EditPhase::Viewing
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = EditPhase::Error;
        self.error = Some(message.into());
    }

    /// Leave the session and hand back the pre-edit snapshot.
    pub fn restore(self) -> S {
        self.snapshot
    }

    pub fn cancel(self) -> S {
        self.restore()
    }

    pub fn form_view(&self) -> FormView {
        FormView {
            record_id: self.record_id.clone(),
            title: self.form.title(),
            fields: self.form.fields(),
            error: self.error.as_ref().map(|message| escape_text(message)),
            saving: self.phase == EditPhase::Saving,
        }
    }
}
