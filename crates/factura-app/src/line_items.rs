// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::error::{ConsistencyError, UiError, ValidationError};
use crate::format::{format_euros, format_price, round_cents};
use crate::view::escape_text;
use crate::{InvoiceLine, Product, ProductId};
use tracing::warn;

/// A product the line selector offers, with its price already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductChoice {
    pub product_id: ProductId,
    pub name: String,
    pub price: f64,
}

impl ProductChoice {
    pub fn label(&self) -> String {
        format!("{} - {}€", escape_text(&self.name), format_price(self.price))
    }
}

/// Products that can be put on an invoice: a positive id and a readable price.
pub fn catalog_choices(products: &[Product]) -> Vec<ProductChoice> {
    products
        .iter()
        .filter_map(|product| {
            let Some(product_id) = product.product_id.filter(|id| id.get() > 0) else {
                warn!(record = %product.id, "product without a valid id left out of the catalog");
                return None;
            };
            product.price.value().map(|price| ProductChoice {
                product_id,
                name: product.name.clone(),
                price,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineEntry {
    pub product_id: Option<ProductId>,
    pub quantity: u32,
    pub unit_price: Option<f64>,
}

impl Default for LineEntry {
    fn default() -> Self {
        Self {
            product_id: None,
            quantity: 1,
            unit_price: None,
        }
    }
}

impl LineEntry {
    pub fn subtotal(&self) -> f64 {
        self.unit_price
            .map_or(0.0, |price| price * f64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemBuilder {
    catalog: Vec<ProductChoice>,
    lines: Vec<LineEntry>,
}

impl LineItemBuilder {
    pub fn new(catalog: Vec<ProductChoice>) -> Self {
        Self {
            catalog,
            lines: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &[ProductChoice] {
        &self.catalog
    }

    pub fn lines(&self) -> &[LineEntry] {
        &self.lines
    }

    pub fn choice(&self, product_id: ProductId) -> Option<&ProductChoice> {
        self.catalog
            .iter()
            .find(|choice| choice.product_id == product_id)
    }

    pub fn add_line(&mut self) -> usize {
        self.lines.push(LineEntry::default());
        self.lines.len() - 1
    }

    pub fn remove_line(&mut self, index: usize) -> Result<LineEntry, ConsistencyError> {
        if index >= self.lines.len() {
            return Err(ConsistencyError::UnknownLine { line: index + 1 });
        }
        Ok(self.lines.remove(index))
    }

    pub fn select_product(
        &mut self,
        index: usize,
        product_id: Option<ProductId>,
    ) -> Result<(), ConsistencyError> {
        let unit_price = match product_id {
            Some(product_id) => Some(
                self.choice(product_id)
                    .map(|choice| choice.price)
                    .ok_or(ConsistencyError::UnknownProduct { product_id })?,
            ),
            None => None,
        };
        let line = self
            .lines
            .get_mut(index)
            .ok_or(ConsistencyError::UnknownLine { line: index + 1 })?;
        line.product_id = product_id;
        line.unit_price = unit_price;
        Ok(())
    }

    /// Step the selection through "none" and then every catalog entry.
    pub fn cycle_product(&mut self, index: usize, forward: bool) -> Result<(), ConsistencyError> {
        let current = self
            .lines
            .get(index)
            .ok_or(ConsistencyError::UnknownLine { line: index + 1 })?
            .product_id;
        if self.catalog.is_empty() {
            return Ok(());
        }
        let slots = self.catalog.len() + 1;
        let position = current
            .and_then(|id| {
                self.catalog
                    .iter()
                    .position(|choice| choice.product_id == id)
            })
            .map_or(0, |position| position + 1);
        let next = if forward {
            (position + 1) % slots
        } else {
            (position + slots - 1) % slots
        };
        let product_id = next
            .checked_sub(1)
            .map(|position| self.catalog[position].product_id);
        self.select_product(index, product_id)
    }

    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> Result<(), UiError> {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(ConsistencyError::UnknownLine { line: index + 1 })?;
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity { line: index + 1 }.into());
        }
        line.quantity = quantity;
        Ok(())
    }

    pub fn subtotal_label(&self, index: usize) -> Option<String> {
        self.lines.get(index).map(|line| format_euros(line.subtotal()))
    }

    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(LineEntry::subtotal)
            .fold(0.0, |total, subtotal| total + subtotal)
    }

    pub fn total_label(&self) -> String {
        format_euros(self.total())
    }

    /// Swap in a fresh catalog, keeping each line's selection and re-reading
    /// its price. Selections whose product disappeared are cleared and
    /// reported.
    pub fn refresh_catalog(&mut self, catalog: Vec<ProductChoice>) -> Vec<ConsistencyError> {
        self.catalog = catalog;
        let mut problems = Vec::new();
        for line in &mut self.lines {
            let Some(product_id) = line.product_id else {
                continue;
            };
            match self
                .catalog
                .iter()
                .find(|choice| choice.product_id == product_id)
            {
                Some(choice) => line.unit_price = Some(choice.price),
                None => {
                    line.product_id = None;
                    line.unit_price = None;
                    problems.push(ConsistencyError::UnknownProduct { product_id });
                }
            }
        }
        problems
    }

    pub fn build_lines(&self) -> Result<Vec<InvoiceLine>, ValidationError> {
        if self.lines.is_empty() {
            return Err(ValidationError::EmptyInvoice);
        }
        self.lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let (Some(product_id), Some(price)) = (line.product_id, line.unit_price) else {
                    return Err(ValidationError::MissingProduct { line: index + 1 });
                };
                if line.quantity == 0 {
                    return Err(ValidationError::InvalidQuantity { line: index + 1 });
                }
                Ok(InvoiceLine {
                    product_id,
                    quantity: i64::from(line.quantity),
                    price: round_cents(price),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{LineItemBuilder, ProductChoice, catalog_choices};
    use crate::error::{ConsistencyError, UiError, ValidationError};
    use crate::{Numeric, Product, ProductId, RecordId};

    fn choice(id: i64, name: &str, price: f64) -> ProductChoice {
        ProductChoice {
            product_id: ProductId::new(id),
            name: name.to_owned(),
            price,
        }
    }

    fn builder() -> LineItemBuilder {
        LineItemBuilder::new(vec![choice(1, "Stylo", 10.0), choice(2, "Carnet", 5.0)])
    }

    #[test]
    fn total_sums_price_times_quantity() {
        let mut builder = builder();
        let first = builder.add_line();
        let second = builder.add_line();
        builder
            .select_product(first, Some(ProductId::new(1)))
            .expect("known product");
        builder.set_quantity(first, 2).expect("valid quantity");
        builder
            .select_product(second, Some(ProductId::new(2)))
            .expect("known product");

        assert_eq!(builder.total_label(), "25,00 €");
        assert_eq!(builder.subtotal_label(first).as_deref(), Some("20,00 €"));
    }

    #[test]
    fn unselected_line_blocks_submission() {
        let mut builder = builder();
        builder.add_line();
        assert_eq!(builder.total_label(), "0,00 €");
        assert_eq!(
            builder.build_lines(),
            Err(ValidationError::MissingProduct { line: 1 })
        );
    }

    #[test]
    fn no_lines_is_an_empty_invoice() {
        assert_eq!(builder().build_lines(), Err(ValidationError::EmptyInvoice));
    }

    #[test]
    fn duplicate_products_are_allowed() {
        let mut builder = builder();
        for _ in 0..2 {
            let line = builder.add_line();
            builder
                .select_product(line, Some(ProductId::new(2)))
                .expect("known product");
        }
        assert_eq!(builder.build_lines().expect("two lines").len(), 2);
        assert_eq!(builder.total(), 10.0);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut builder = builder();
        let line = builder.add_line();
        assert!(matches!(
            builder.set_quantity(line, 0),
            Err(UiError::Validation(ValidationError::InvalidQuantity { line: 1 }))
        ));
        assert_eq!(builder.lines()[line].quantity, 1);
    }

    #[test]
    fn removing_a_line_updates_total() {
        let mut builder = builder();
        let line = builder.add_line();
        builder
            .select_product(line, Some(ProductId::new(1)))
            .expect("known product");
        builder.remove_line(line).expect("line exists");
        assert_eq!(builder.total_label(), "0,00 €");
        assert!(builder.remove_line(4).is_err());
    }

    #[test]
    fn refresh_keeps_selection_and_rereads_price() {
        let mut builder = builder();
        let first = builder.add_line();
        let second = builder.add_line();
        builder
            .select_product(first, Some(ProductId::new(1)))
            .expect("known product");
        builder
            .select_product(second, Some(ProductId::new(2)))
            .expect("known product");

        let problems = builder.refresh_catalog(vec![choice(1, "Stylo", 12.5), choice(3, "Gomme", 1.0)]);

        assert_eq!(
            problems,
            vec![ConsistencyError::UnknownProduct {
                product_id: ProductId::new(2)
            }]
        );
        assert_eq!(builder.lines()[first].unit_price, Some(12.5));
        assert_eq!(builder.lines()[second].product_id, None);
        assert_eq!(builder.total_label(), "12,50 €");
    }

    #[test]
    fn cycling_walks_through_none_and_catalog() {
        let mut builder = builder();
        let line = builder.add_line();
        builder.cycle_product(line, true).expect("line exists");
        assert_eq!(builder.lines()[line].product_id, Some(ProductId::new(1)));
        builder.cycle_product(line, true).expect("line exists");
        builder.cycle_product(line, true).expect("line exists");
        assert_eq!(builder.lines()[line].product_id, None);
        builder.cycle_product(line, false).expect("line exists");
        assert_eq!(builder.lines()[line].product_id, Some(ProductId::new(2)));
    }

    #[test]
    fn catalog_skips_unpriced_products() {
        let products = vec![
            Product {
                id: RecordId::from("a"),
                product_id: Some(ProductId::new(1)),
                name: "Stylo".to_owned(),
                category: String::new(),
                price: Numeric::from("1,20"),
            },
            Product {
                id: RecordId::from("b"),
                product_id: Some(ProductId::new(2)),
                name: "Mystère".to_owned(),
                category: String::new(),
                price: Numeric::from("?"),
            },
        ];
        let choices = catalog_choices(&products);
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].label(), "Stylo - 1,20€");
    }

    #[test]
    fn catalog_skips_products_without_an_id() {
        let product = |id: &str, product_id: Option<i64>| Product {
            id: RecordId::from(id),
            product_id: product_id.map(ProductId::new),
            name: format!("Produit {id}"),
            category: String::new(),
            price: Numeric::Number(4.0),
        };
        let products = vec![product("a", None), product("b", Some(0)), product("c", Some(3))];
        let choices = catalog_choices(&products);
        assert_eq!(choices, vec![choice(3, "Produit c", 4.0)]);
    }
}
