// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::format::format_display_date;
use crate::{Client, Invoice, Product};

/// Text a listing filter matches against. Invoice fields are one per line so
/// a term never matches across two of them.
pub trait Searchable {
    fn search_text(&self) -> String;
}

impl Searchable for Client {
    fn search_text(&self) -> String {
        format!("{} {}", self.name, self.client_id)
    }
}

impl Searchable for Product {
    fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.price, self.category)
    }
}

impl Searchable for Invoice {
    fn search_text(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}",
            self.invoice_number,
            format_display_date(&self.invoice_date),
            self.client_id,
            self.total_amount
        )
    }
}

/// The term is used as typed, surrounding whitespace included.
pub fn matches<T: Searchable>(item: &T, term: &str) -> bool {
    let needle = term.to_lowercase();
    needle.is_empty() || item.search_text().to_lowercase().contains(&needle)
}

pub fn filter_items<T: Searchable + Clone>(items: &[T], term: &str) -> Vec<T> {
    items
        .iter()
        .filter(|item| matches(*item, term))
        .cloned()
        .collect()
}
