// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use factura_app::format::{parse_input_date, resolve_date};
use factura_app::{
    Client, ClientUpdate, EntityKind, Gateway, GatewayResult, Invoice, InvoiceUpdate, NetworkError,
    NewClient, NewInvoice, NewProduct, Numeric, Product, ProductUpdate, RecordId, SearchQuery,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListInvoices,
    GetInvoice,
    SearchInvoices,
    CreateInvoice,
    UpdateInvoice,
    ListClients,
    CreateClient,
    UpdateClient,
    ListProducts,
    CreateProduct,
    UpdateProduct,
    Delete(EntityKind),
}

impl Operation {
    pub const fn is_mutation(self) -> bool {
        !matches!(
            self,
            Self::ListInvoices
                | Self::GetInvoice
                | Self::SearchInvoices
                | Self::ListClients
                | Self::ListProducts
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCall {
    pub operation: Operation,
    pub record_id: Option<RecordId>,
}

/// Backend stand-in that keeps the three collections in memory and answers
/// with the same status codes as the real server. Every call is logged, and
/// failures can be injected per operation.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    invoices: Vec<Invoice>,
    clients: Vec<Client>,
    products: Vec<Product>,
    next_record: u64,
    calls: Vec<GatewayCall>,
    failures: Vec<(Operation, NetworkError)>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(invoices: Vec<Invoice>, clients: Vec<Client>, products: Vec<Product>) -> Self {
        Self {
            invoices,
            clients,
            products,
            ..Self::default()
        }
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn calls(&self) -> &[GatewayCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.calls
            .iter()
            .filter(|call| call.operation == operation)
            .count()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| call.operation.is_mutation())
            .count()
    }

    /// The next call of `operation` fails with `error` instead of running.
    pub fn fail_next(&mut self, operation: Operation, error: NetworkError) {
        self.failures.push((operation, error));
    }

    fn record(&mut self, operation: Operation, record_id: Option<&RecordId>) -> GatewayResult<()> {
        debug!(?operation, record = ?record_id, "memory gateway call");
        self.calls.push(GatewayCall {
            operation,
            record_id: record_id.cloned(),
        });
        if let Some(position) = self
            .failures
            .iter()
            .position(|(failing, _)| *failing == operation)
        {
            return Err(self.failures.remove(position).1);
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> RecordId {
        self.next_record += 1;
        RecordId::new(format!("{:024x}", self.next_record))
    }
}

fn not_found(kind: EntityKind) -> NetworkError {
    let message = match kind {
        EntityKind::Invoice => "Facture non trouvée",
        EntityKind::Client => "Client non trouvé",
        EntityKind::Product => "Produit non trouvé",
    };
    NetworkError::status(404, message)
}

fn find_mut<'a, T>(
    items: &'a mut [T],
    record_id: &RecordId,
    id_of: impl Fn(&T) -> &RecordId,
) -> Option<&'a mut T> {
    items.iter_mut().find(|item| id_of(item) == record_id)
}

fn within_range(invoice: &Invoice, start: Option<time::Date>, end: Option<time::Date>) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    let Some(date) = resolve_date(&invoice.invoice_date) else {
        return false;
    };
    start.is_none_or(|start| date >= start) && end.is_none_or(|end| date <= end)
}

impl Gateway for MemoryGateway {
    fn list_invoices(&mut self) -> GatewayResult<Vec<Invoice>> {
        self.record(Operation::ListInvoices, None)?;
        Ok(self.invoices.clone())
    }

    fn get_invoice(&mut self, record_id: &RecordId) -> GatewayResult<Invoice> {
        self.record(Operation::GetInvoice, Some(record_id))?;
        self.invoices
            .iter()
            .find(|invoice| &invoice.id == record_id)
            .cloned()
            .ok_or_else(|| not_found(EntityKind::Invoice))
    }

    fn search_invoices(&mut self, query: &SearchQuery) -> GatewayResult<Vec<Invoice>> {
        self.record(Operation::SearchInvoices, None)?;
        let parse = |field: &'static str, raw: &Option<String>| {
            raw.as_deref()
                .map(|raw| parse_input_date(field, raw))
                .transpose()
                .map_err(|error| NetworkError::status(422, error.to_string()))
        };
        let start = parse("date_start", &query.date_start)?;
        let end = parse("date_end", &query.date_end)?;
        Ok(self
            .invoices
            .iter()
            .filter(|invoice| query.client_id.is_none_or(|id| invoice.client_id == id))
            .filter(|invoice| within_range(invoice, start, end))
            .cloned()
            .collect())
    }

    fn create_invoice(&mut self, invoice: &NewInvoice) -> GatewayResult<Invoice> {
        self.record(Operation::CreateInvoice, None)?;
        let created = Invoice {
            id: self.allocate_id(),
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: Numeric::Text(invoice.invoice_date.clone()),
            client_id: invoice.client_id,
            total_amount: Numeric::Number(invoice.total_amount),
            products: invoice.products.clone(),
        };
        self.invoices.push(created.clone());
        Ok(created)
    }

    fn update_invoice(
        &mut self,
        record_id: &RecordId,
        update: &InvoiceUpdate,
    ) -> GatewayResult<Invoice> {
        self.record(Operation::UpdateInvoice, Some(record_id))?;
        let invoice = find_mut(&mut self.invoices, record_id, |invoice| &invoice.id)
            .ok_or_else(|| not_found(EntityKind::Invoice))?;
        invoice.invoice_date = Numeric::Text(update.invoice_date.clone());
        invoice.client_id = update.client_id;
        invoice.total_amount = Numeric::Number(update.total_amount);
        Ok(invoice.clone())
    }

    fn list_clients(&mut self) -> GatewayResult<Vec<Client>> {
        self.record(Operation::ListClients, None)?;
        Ok(self.clients.clone())
    }

    fn create_client(&mut self, client: &NewClient) -> GatewayResult<Client> {
        self.record(Operation::CreateClient, None)?;
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_owned());
        let created = Client {
            id: self.allocate_id(),
            client_id: client.client_id,
            name: client.name.clone(),
            address: optional(&client.address),
            tel: optional(&client.tel),
            email: optional(&client.email),
            sex: optional(&client.sex),
            date_birth: optional(&client.date_birth),
        };
        self.clients.push(created.clone());
        Ok(created)
    }

    fn update_client(
        &mut self,
        record_id: &RecordId,
        update: &ClientUpdate,
    ) -> GatewayResult<Client> {
        self.record(Operation::UpdateClient, Some(record_id))?;
        let client = find_mut(&mut self.clients, record_id, |client| &client.id)
            .ok_or_else(|| not_found(EntityKind::Client))?;
        client.name = update.name.clone();
        client.client_id = update.client_id;
        Ok(client.clone())
    }

    fn list_products(&mut self) -> GatewayResult<Vec<Product>> {
        self.record(Operation::ListProducts, None)?;
        Ok(self.products.clone())
    }

    fn create_product(&mut self, product: &NewProduct) -> GatewayResult<Product> {
        self.record(Operation::CreateProduct, None)?;
        if product.product_id.get() <= 0 {
            return Err(NetworkError::status(
                422,
                "L'ID du produit doit être un entier positif",
            ));
        }
        if !product.price.is_finite() {
            return Err(NetworkError::status(422, "Le prix doit être un nombre valide"));
        }
        if self
            .products
            .iter()
            .any(|existing| existing.product_id == Some(product.product_id))
        {
            return Err(NetworkError::status(
                409,
                format!("Un produit avec l'ID {} existe déjà", product.product_id),
            ));
        }
        let created = Product {
            id: self.allocate_id(),
            product_id: Some(product.product_id),
            name: product.name.clone(),
            category: product.category.clone(),
            price: Numeric::Number(product.price),
        };
        self.products.push(created.clone());
        Ok(created)
    }

    fn update_product(
        &mut self,
        record_id: &RecordId,
        update: &ProductUpdate,
    ) -> GatewayResult<Product> {
        self.record(Operation::UpdateProduct, Some(record_id))?;
        let product = find_mut(&mut self.products, record_id, |product| &product.id)
            .ok_or_else(|| not_found(EntityKind::Product))?;
        product.name = update.name.clone();
        product.price = Numeric::Number(update.price);
        product.category = update.category.clone();
        Ok(product.clone())
    }

    fn delete(&mut self, kind: EntityKind, record_id: &RecordId) -> GatewayResult<()> {
        self.record(Operation::Delete(kind), Some(record_id))?;
        let before;
        let after;
        match kind {
            EntityKind::Invoice => {
                before = self.invoices.len();
                self.invoices.retain(|invoice| &invoice.id != record_id);
                after = self.invoices.len();
            }
            EntityKind::Client => {
                before = self.clients.len();
                self.clients.retain(|client| &client.id != record_id);
                after = self.clients.len();
            }
            EntityKind::Product => {
                before = self.products.len();
                self.products.retain(|product| &product.id != record_id);
                after = self.products.len();
            }
        }
        if before == after {
            return Err(not_found(kind));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryGateway, Operation};
    use factura_app::{
        ClientId, EntityKind, Gateway, NetworkError, NewProduct, Numeric, ProductId, RecordId,
        SearchQuery,
    };
    use factura_testkit::{fixture_invoice, fixture_product};

    #[test]
    fn unknown_record_is_not_found() {
        let mut gateway = MemoryGateway::new();
        let error = gateway
            .get_invoice(&RecordId::from("missing"))
            .expect_err("no such invoice");
        assert_eq!(error.status_code(), Some(404));
        assert!(gateway.delete(EntityKind::Client, &RecordId::from("x")).is_err());
    }

    #[test]
    fn duplicate_product_id_conflicts() {
        let mut gateway = MemoryGateway::with_data(Vec::new(), Vec::new(), vec![fixture_product(3)]);
        let error = gateway
            .create_product(&NewProduct {
                product_id: ProductId::new(3),
                name: "Doublon".to_owned(),
                category: String::new(),
                price: 1.0,
            })
            .expect_err("duplicate id");
        assert_eq!(error.status_code(), Some(409));
    }

    #[test]
    fn non_positive_product_id_is_rejected() {
        let mut gateway = MemoryGateway::new();
        let error = gateway
            .create_product(&NewProduct {
                product_id: ProductId::new(0),
                name: "Zéro".to_owned(),
                category: String::new(),
                price: 1.0,
            })
            .expect_err("invalid id");
        assert_eq!(error.status_code(), Some(422));
    }

    #[test]
    fn injected_failure_fires_once() {
        let mut gateway = MemoryGateway::new();
        gateway.fail_next(Operation::ListClients, NetworkError::status(500, "boom"));
        assert!(gateway.list_clients().is_err());
        assert!(gateway.list_clients().is_ok());
        assert_eq!(gateway.count(Operation::ListClients), 2);
        assert_eq!(gateway.mutation_count(), 0);
    }

    #[test]
    fn search_filters_by_client_and_date() {
        let mut first = fixture_invoice(1, ClientId::new(1));
        first.invoice_date = Numeric::Number(45306.0);
        let mut second = fixture_invoice(2, ClientId::new(2));
        second.invoice_date = Numeric::Number(45400.0);
        let mut gateway = MemoryGateway::with_data(vec![first, second], Vec::new(), Vec::new());

        let by_client = gateway
            .search_invoices(&SearchQuery {
                client_id: Some(ClientId::new(2)),
                ..SearchQuery::default()
            })
            .expect("search");
        assert_eq!(by_client.len(), 1);

        let by_date = gateway
            .search_invoices(&SearchQuery {
                date_end: Some("2024-01-31".to_owned()),
                ..SearchQuery::default()
            })
            .expect("search");
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[0].client_id, ClientId::new(1));
    }

    #[test]
    fn allocated_ids_look_like_object_ids() {
        let mut gateway = MemoryGateway::new();
        let created = gateway
            .create_product(&NewProduct {
                product_id: ProductId::new(1),
                name: "Stylo".to_owned(),
                category: "Bureau".to_owned(),
                price: 1.5,
            })
            .expect("create");
        assert_eq!(created.id.as_str().len(), 24);
        assert_eq!(gateway.mutation_count(), 1);
    }
}
