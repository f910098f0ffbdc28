// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! View-models produced from collection state. Front ends draw these and
//! nothing else; every entity field is escaped on the way in.

use crate::filter::Searchable;
use crate::format::format_display_date;
use crate::store::Listing;
use crate::{Client, Entity, EntityKind, Invoice, Product, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowAction {
    ShowDetails,
    Edit,
    Delete,
}

impl RowAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ShowDetails => "Détails",
            Self::Edit => "Modifier",
            Self::Delete => "Supprimer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub record_id: RecordId,
    pub kind: EntityKind,
    pub title: String,
    pub lines: Vec<String>,
    pub actions: Vec<RowAction>,
}

impl RowView {
    pub fn has_action(&self, action: RowAction) -> bool {
        self.actions.contains(&action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub label: &'static str,
    pub value: String,
    pub readonly: bool,
    pub hint: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub record_id: RecordId,
    pub title: String,
    pub fields: Vec<FieldView>,
    pub error: Option<String>,
    pub saving: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSlot {
    Display(RowView),
    Editing(FormView),
}

impl RowSlot {
    pub const fn record_id(&self) -> &RecordId {
        match self {
            Self::Display(row) => &row.record_id,
            Self::Editing(form) => &form.record_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationView {
    pub current_page: usize,
    pub page_count: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PaginationView {
    pub fn new(current_page: usize, page_count: usize) -> Self {
        if page_count == 0 {
            return Self {
                current_page: 0,
                page_count: 0,
                has_prev: false,
                has_next: false,
            };
        }
        Self {
            current_page,
            page_count,
            has_prev: current_page > 1,
            has_next: current_page < page_count,
        }
    }

    pub fn label(&self) -> String {
        format!("Page {} sur {}", self.current_page, self.page_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub kind: EntityKind,
    pub rows: Vec<RowSlot>,
    pub pagination: PaginationView,
    pub term: String,
    pub total: usize,
}

pub trait Rendered: Entity {
    fn row_view(&self) -> RowView;
}

impl Rendered for Invoice {
    fn row_view(&self) -> RowView {
        RowView {
            record_id: self.id.clone(),
            kind: EntityKind::Invoice,
            title: format!("Facture {}", escape_text(&self.invoice_number)),
            lines: vec![
                format!(
                    "Date: {}",
                    escape_text(&format_display_date(&self.invoice_date))
                ),
                format!("Client ID: {}", self.client_id),
                format!("Montant: {}€", escape_text(&self.total_amount.to_string())),
            ],
            actions: vec![RowAction::ShowDetails, RowAction::Delete],
        }
    }
}

impl Rendered for Client {
    fn row_view(&self) -> RowView {
        RowView {
            record_id: self.id.clone(),
            kind: EntityKind::Client,
            title: escape_text(&self.name),
            lines: vec![format!("ID: {}", self.client_id)],
            actions: vec![RowAction::Edit, RowAction::Delete],
        }
    }
}

impl Rendered for Product {
    fn row_view(&self) -> RowView {
        RowView {
            record_id: self.id.clone(),
            kind: EntityKind::Product,
            title: escape_text(&self.name),
            lines: vec![format!(
                "Prix: {}€ - Catégorie: {}",
                escape_text(&self.price.to_string()),
                escape_text(&self.category)
            )],
            actions: vec![RowAction::Edit, RowAction::Delete],
        }
    }
}

/// Render the current page of a listing. Rows with an open edit session are
/// rendered as their form.
pub fn render_list<T: Rendered + Searchable>(listing: &Listing<T>) -> ListView {
    let store = listing.store();
    let rows = store
        .visible()
        .iter()
        .map(|item| match listing.session(item.record_id()) {
            Some(session) => RowSlot::Editing(session.form_view()),
            None => RowSlot::Display(item.row_view()),
        })
        .collect();
    ListView {
        kind: T::KIND,
        rows,
        pagination: PaginationView::new(store.current_page(), store.page_count()),
        term: escape_text(listing.term()),
        total: store.len(),
    }
}

/// Make control characters visible so entity text cannot drive the terminal.
pub fn escape_text(text: &str) -> String {
    if !text.chars().any(char::is_control) {
        return text.to_owned();
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        if ch.is_control() {
            escaped.extend(ch.escape_default());
        } else {
            escaped.push(ch);
        }
    }
    escaped
}
