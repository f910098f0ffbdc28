// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::error::ConsistencyError;
use crate::format::format_display_date;
use crate::view::{RowAction, escape_text};
use crate::{Client, Invoice, Product, RecordId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailLine {
    Product(String),
    Degraded(String),
}

impl DetailLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Product(text) | Self::Degraded(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDetailsView {
    pub record_id: RecordId,
    pub title: String,
    pub date: String,
    pub client: String,
    pub total: String,
    pub lines: Vec<DetailLine>,
    pub actions: Vec<RowAction>,
}

/// Resolve an invoice's client and product references against the loaded
/// collections. Unresolvable product lines are rendered degraded and reported.
pub fn render_invoice_details(
    invoice: &Invoice,
    clients: &[Client],
    products: &[Product],
) -> (InvoiceDetailsView, Vec<ConsistencyError>) {
    let client_name = clients
        .iter()
        .find(|client| client.client_id == invoice.client_id)
        .map_or_else(|| "Client inconnu".to_owned(), |client| escape_text(&client.name));

    let mut problems = Vec::new();
    let lines = invoice
        .products
        .iter()
        .map(|line| {
            match products
                .iter()
                .find(|product| product.product_id == Some(line.product_id))
            {
                Some(product) => DetailLine::Product(format!(
                    "{} - Quantité: {} - Prix: {}€",
                    escape_text(&product.name),
                    line.quantity,
                    line.price
                )),
                None => {
                    problems.push(ConsistencyError::UnknownProduct {
                        product_id: line.product_id,
                    });
                    DetailLine::Degraded(format!(
                        "Produit #{} introuvable - Quantité: {} - Prix: {}€",
                        line.product_id, line.quantity, line.price
                    ))
                }
            }
        })
        .collect();

    let view = InvoiceDetailsView {
        record_id: invoice.id.clone(),
        title: format!(
            "Détails de la Facture {}",
            escape_text(&invoice.invoice_number)
        ),
        date: escape_text(&format_display_date(&invoice.invoice_date)),
        client: format!("{client_name} (ID: {})", invoice.client_id),
        total: format!(
            "{}€",
            escape_text(&invoice.total_amount.to_string().replacen(',', ".", 1))
        ),
        lines,
        actions: vec![RowAction::Edit, RowAction::Delete],
    };
    (view, problems)
}

#[cfg(test)]
mod tests {
    use super::{DetailLine, render_invoice_details};
    use crate::error::ConsistencyError;
    use crate::{
        Client, ClientId, Invoice, InvoiceLine, Numeric, Product, ProductId, RecordId,
    };

    fn invoice() -> Invoice {
        Invoice {
            id: RecordId::from("i1"),
            invoice_number: "FAC/20240116/007".to_owned(),
            invoice_date: Numeric::Number(45306.0),
            client_id: ClientId::new(5),
            total_amount: Numeric::from("25,5"),
            products: vec![
                InvoiceLine {
                    product_id: ProductId::new(1),
                    quantity: 2,
                    price: 10.0,
                },
                InvoiceLine {
                    product_id: ProductId::new(9),
                    quantity: 1,
                    price: 5.5,
                },
            ],
        }
    }

    fn product() -> Product {
        Product {
            id: RecordId::from("p1"),
            product_id: Some(ProductId::new(1)),
            name: "Stylo".to_owned(),
            category: "Bureau".to_owned(),
            price: Numeric::Number(10.0),
        }
    }

    #[test]
    fn unknown_client_is_named_as_such() {
        let (view, _) = render_invoice_details(&invoice(), &[], &[product()]);
        assert_eq!(view.client, "Client inconnu (ID: 5)");
        assert_eq!(view.date, "16/01/2024");
        assert_eq!(view.total, "25.5€");
    }

    #[test]
    fn known_client_is_resolved_by_domain_id() {
        let client = Client {
            id: RecordId::from("c5"),
            client_id: ClientId::new(5),
            name: "Claire Martin".to_owned(),
            address: None,
            tel: None,
            email: None,
            sex: None,
            date_birth: None,
        };
        let (view, _) = render_invoice_details(&invoice(), &[client], &[product()]);
        assert_eq!(view.client, "Claire Martin (ID: 5)");
    }

    #[test]
    fn missing_product_degrades_the_line() {
        let (view, problems) = render_invoice_details(&invoice(), &[], &[product()]);
        assert_eq!(
            view.lines[0],
            DetailLine::Product("Stylo - Quantité: 2 - Prix: 10€".to_owned())
        );
        assert!(matches!(view.lines[1], DetailLine::Degraded(_)));
        assert!(view.lines[1].text().starts_with("Produit #9 introuvable"));
        assert_eq!(
            problems,
            vec![ConsistencyError::UnknownProduct {
                product_id: ProductId::new(9)
            }]
        );
    }
}
