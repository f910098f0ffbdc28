// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::Date;
use tracing::warn;

use crate::editor::{EditForm, required_client_id, required_decimal, required_text};
use crate::error::ValidationError;
use crate::format::{format_compact_date, format_iso_date, parse_input_date, round_cents};
use crate::line_items::{LineItemBuilder, ProductChoice};
use crate::view::{FieldView, escape_text};
use crate::{Client, ClientId, NewClient, NewInvoice, NewProduct, Product, ProductId, SearchQuery};

/// Forms made of labelled text inputs, edited one field at a time.
pub trait TextForm {
    fn title(&self) -> String;

    fn fields(&self) -> Vec<FieldView>;

    fn field_mut(&mut self, index: usize) -> Option<&mut String>;

    fn field_count(&self) -> usize {
        self.fields().len()
    }
}

impl TextForm for EditForm {
    fn title(&self) -> String {
        EditForm::title(self)
    }

    fn fields(&self) -> Vec<FieldView> {
        EditForm::fields(self)
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        EditForm::field_mut(self, index)
    }

    fn field_count(&self) -> usize {
        EditForm::field_count(self)
    }
}

fn input(label: &'static str, value: &str) -> FieldView {
    FieldView {
        label,
        value: escape_text(value),
        readonly: false,
        hint: None,
    }
}

fn hinted(label: &'static str, value: &str, hint: &'static str) -> FieldView {
    FieldView {
        hint: Some(hint),
        ..input(label, value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewClientForm {
    pub name: String,
    pub address: String,
    pub tel: String,
    pub email: String,
    pub sex: String,
    pub date_birth: String,
}

impl NewClientForm {
    pub fn validate(&self, client_id: ClientId) -> Result<NewClient, ValidationError> {
        let date_birth = match self.date_birth.trim() {
            "" => String::new(),
            raw => format_iso_date(parse_input_date("date de naissance", raw)?),
        };
        Ok(NewClient {
            client_id,
            name: required_text("nom", &self.name)?,
            address: self.address.trim().to_owned(),
            tel: self.tel.trim().to_owned(),
            email: self.email.trim().to_owned(),
            sex: self.sex.trim().to_owned(),
            date_birth,
        })
    }
}

impl TextForm for NewClientForm {
    fn title(&self) -> String {
        "Nouveau client".to_owned()
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            input("Nom", &self.name),
            input("Adresse", &self.address),
            input("Téléphone", &self.tel),
            input("Email", &self.email),
            input("Sexe", &self.sex),
            hinted("Date de naissance", &self.date_birth, "aaaa-mm-jj"),
        ]
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.name),
            1 => Some(&mut self.address),
            2 => Some(&mut self.tel),
            3 => Some(&mut self.email),
            4 => Some(&mut self.sex),
            5 => Some(&mut self.date_birth),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProductForm {
    pub name: String,
    pub category: String,
    pub price: String,
}

impl NewProductForm {
    pub fn validate(&self, product_id: ProductId) -> Result<NewProduct, ValidationError> {
        Ok(NewProduct {
            product_id,
            name: required_text("nom", &self.name)?,
            category: self.category.trim().to_owned(),
            price: required_decimal("prix", &self.price)?,
        })
    }
}

impl TextForm for NewProductForm {
    fn title(&self) -> String {
        "Nouveau produit".to_owned()
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            input("Nom", &self.name),
            input("Catégorie", &self.category),
            input("Prix", &self.price),
        ]
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.name),
            1 => Some(&mut self.category),
            2 => Some(&mut self.price),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceSearchForm {
    pub client_id: String,
    pub date_start: String,
    pub date_end: String,
}

impl InvoiceSearchForm {
    /// Blank inputs are left out of the query.
    pub fn validate(&self) -> Result<SearchQuery, ValidationError> {
        let client_id = match self.client_id.trim() {
            "" => None,
            raw => Some(required_client_id(raw)?),
        };
        Ok(SearchQuery {
            client_id,
            date_start: optional_date("date de début", &self.date_start)?,
            date_end: optional_date("date de fin", &self.date_end)?,
        })
    }
}

fn optional_date(field: &'static str, raw: &str) -> Result<Option<String>, ValidationError> {
    match raw.trim() {
        "" => Ok(None),
        trimmed => parse_input_date(field, trimmed).map(|date| Some(format_iso_date(date))),
    }
}

impl TextForm for InvoiceSearchForm {
    fn title(&self) -> String {
        "Rechercher des factures".to_owned()
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            input("Client ID", &self.client_id),
            hinted("Date de début", &self.date_start, "aaaa-mm-jj"),
            hinted("Date de fin", &self.date_end, "aaaa-mm-jj"),
        ]
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.client_id),
            1 => Some(&mut self.date_start),
            2 => Some(&mut self.date_end),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientChoice {
    pub client_id: ClientId,
    pub name: String,
}

impl ClientChoice {
    pub fn label(&self) -> String {
        escape_text(&self.name)
    }
}

pub fn client_choices(clients: &[Client]) -> Vec<ClientChoice> {
    clients
        .iter()
        .map(|client| ClientChoice {
            client_id: client.client_id,
            name: client.name.clone(),
        })
        .collect()
}

/// Draft of a new invoice: a client picked from a freshly fetched list, a
/// date, and line items priced from the product catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoiceForm {
    pub clients: Vec<ClientChoice>,
    pub client_id: Option<ClientId>,
    pub invoice_date: String,
    pub lines: LineItemBuilder,
}

impl NewInvoiceForm {
    /// Opens with one empty line, ready for a product.
    pub fn new(clients: Vec<ClientChoice>, catalog: Vec<ProductChoice>) -> Self {
        let mut lines = LineItemBuilder::new(catalog);
        lines.add_line();
        Self {
            clients,
            client_id: None,
            invoice_date: String::new(),
            lines,
        }
    }

    pub fn selected_client(&self) -> Option<&ClientChoice> {
        let client_id = self.client_id?;
        self.clients
            .iter()
            .find(|choice| choice.client_id == client_id)
    }

    pub fn cycle_client(&mut self, forward: bool) {
        if self.clients.is_empty() {
            return;
        }
        let slots = self.clients.len() + 1;
        let position = self
            .client_id
            .and_then(|id| self.clients.iter().position(|choice| choice.client_id == id))
            .map_or(0, |position| position + 1);
        let next = if forward {
            (position + 1) % slots
        } else {
            (position + slots - 1) % slots
        };
        self.client_id = next
            .checked_sub(1)
            .map(|position| self.clients[position].client_id);
    }

    pub fn validate(&self, invoice_number: String) -> Result<NewInvoice, ValidationError> {
        let client_id = self
            .client_id
            .ok_or(ValidationError::Required { field: "client" })?;
        let date = parse_input_date("date", &self.invoice_date)?;
        let products = self.lines.build_lines()?;
        Ok(NewInvoice {
            invoice_number,
            invoice_date: format_iso_date(date),
            client_id,
            products,
            total_amount: round_cents(self.lines.total()),
        })
    }
}

/// `FAC/yyyymmdd/nnn`
pub fn generate_invoice_number(date: Date, suffix: u16) -> String {
    format!("FAC/{}/{:03}", format_compact_date(date), suffix % 1000)
}

pub fn random_invoice_suffix() -> u16 {
    use rand::Rng;

    rand::thread_rng().gen_range(0..1000)
}

pub fn next_client_id(clients: &[Client]) -> ClientId {
    let max = clients
        .iter()
        .map(|client| client.client_id.get())
        .max()
        .unwrap_or(0)
        .max(0);
    ClientId::new(max + 1)
}

/// Only positive product ids count towards the next one.
pub fn next_product_id(products: &[Product]) -> ProductId {
    let max = products
        .iter()
        .filter_map(|product| {
            if product.product_id.is_none() {
                warn!(record = %product.id, "product without an id ignored for the next id");
            }
            product.product_id.map(ProductId::get)
        })
        .filter(|id| *id > 0)
        .max()
        .unwrap_or(0);
    ProductId::new(max + 1)
}
