// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::error::NetworkError;
use crate::{
    Client, ClientUpdate, EntityKind, Invoice, InvoiceUpdate, NewClient, NewInvoice, NewProduct,
    Product, ProductUpdate, RecordId, SearchQuery,
};

pub type GatewayResult<T> = Result<T, NetworkError>;

/// The REST backend as seen by the workspace. Every call blocks until the
/// server answers; non-2xx responses are errors.
pub trait Gateway {
    fn list_invoices(&mut self) -> GatewayResult<Vec<Invoice>>;

    fn get_invoice(&mut self, record_id: &RecordId) -> GatewayResult<Invoice>;

    fn search_invoices(&mut self, query: &SearchQuery) -> GatewayResult<Vec<Invoice>>;

    fn create_invoice(&mut self, invoice: &NewInvoice) -> GatewayResult<Invoice>;

    fn update_invoice(
        &mut self,
        record_id: &RecordId,
        update: &InvoiceUpdate,
    ) -> GatewayResult<Invoice>;

    fn list_clients(&mut self) -> GatewayResult<Vec<Client>>;

    fn create_client(&mut self, client: &NewClient) -> GatewayResult<Client>;

    fn update_client(&mut self, record_id: &RecordId, update: &ClientUpdate)
    -> GatewayResult<Client>;

    fn list_products(&mut self) -> GatewayResult<Vec<Product>>;

    fn create_product(&mut self, product: &NewProduct) -> GatewayResult<Product>;

    fn update_product(
        &mut self,
        record_id: &RecordId,
        update: &ProductUpdate,
    ) -> GatewayResult<Product>;

    fn delete(&mut self, kind: EntityKind, record_id: &RecordId) -> GatewayResult<()>;
}
