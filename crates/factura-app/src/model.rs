// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::format::parse_decimal;
use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Invoice,
    Client,
    Product,
}

impl EntityKind {
    pub const ALL: [Self; 3] = [Self::Invoice, Self::Client, Self::Product];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Client => "client",
            Self::Product => "product",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "invoice" | "invoices" => Some(Self::Invoice),
            "client" | "clients" => Some(Self::Client),
            "product" | "products" => Some(Self::Product),
            _ => None,
        }
    }

    pub const fn collection_path(self) -> &'static str {
        match self {
            Self::Invoice => "invoices",
            Self::Client => "clients",
            Self::Product => "products",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Invoice => "Factures",
            Self::Client => "Clients",
            Self::Product => "Produits",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A number the backend may send either as JSON number or as text, possibly
/// with a comma decimal separator. Displayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Number(_) => None,
            Self::Text(text) => parse_decimal(text),
        }
    }
}

impl Default for Numeric {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Records that live in one of the three collections.
pub trait Entity: Clone {
    const KIND: EntityKind;

    fn record_id(&self) -> &RecordId;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub product_id: ProductId,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(deserialize_with = "text_or_number")]
    pub invoice_number: String,
    #[serde(default)]
    pub invoice_date: Numeric,
    pub client_id: ClientId,
    #[serde(default)]
    pub total_amount: Numeric,
    #[serde(default)]
    pub products: Vec<InvoiceLine>,
}

impl Entity for Invoice {
    const KIND: EntityKind = EntityKind::Invoice;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub client_id: ClientId,
    #[serde(deserialize_with = "text_or_number")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub tel: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub sex: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_birth: Option<String>,
}

impl Entity for Client {
    const KIND: EntityKind = EntityKind::Client;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// `None` when the server sent no usable numeric id.
    #[serde(
        default,
        deserialize_with = "loose_product_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_id: Option<ProductId>,
    #[serde(deserialize_with = "text_or_number")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub category: String,
    #[serde(default)]
    pub price: Numeric,
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub invoice_date: String,
    pub client_id: ClientId,
    pub products: Vec<InvoiceLine>,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceUpdate {
    pub invoice_date: String,
    pub client_id: ClientId,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewClient {
    pub client_id: ClientId,
    pub name: String,
    pub address: String,
    pub tel: String,
    pub email: String,
    pub sex: String,
    pub date_birth: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientUpdate {
    pub name: String,
    pub client_id: ClientId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductUpdate {
    pub name: String,
    pub price: f64,
    pub category: String,
}

/// Server-side invoice search; `None` parameters are omitted from the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub client_id: Option<ClientId>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

impl SearchQuery {
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(client_id) = self.client_id {
            pairs.push(("client_id", client_id.to_string()));
        }
        if let Some(start) = &self.date_start {
            pairs.push(("date_start", start.clone()));
        }
        if let Some(end) = &self.date_end {
            pairs.push(("date_end", end.clone()));
        }
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.client_id.is_none() && self.date_start.is_none() && self.date_end.is_none()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseText {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl LooseText {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    LooseText::deserialize(deserializer).map(LooseText::into_text)
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<LooseText>::deserialize(deserializer).map(|value| value.map(LooseText::into_text))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseId {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LooseId {
    fn into_id(self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(value),
            Self::Float(value) if value.is_finite() && value.fract() == 0.0 => Some(value as i64),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Float(_) | Self::Other(_) => None,
        }
    }
}

fn loose_product_id<'de, D>(deserializer: D) -> Result<Option<ProductId>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<LooseId>::deserialize(deserializer)
        .map(|value| value.and_then(LooseId::into_id).map(ProductId::new))
}
