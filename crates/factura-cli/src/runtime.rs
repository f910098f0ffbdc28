// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use factura_api::{HttpGateway, MemoryGateway};
use factura_app::{
    Client, ClientUpdate, EntityKind, Gateway, GatewayResult, Invoice, InvoiceUpdate, NewClient,
    NewInvoice, NewProduct, Product, ProductUpdate, RecordId, SearchQuery,
};
use factura_testkit::demo_data;
use std::time::Duration;
use tracing::info;

const DEMO_SEED: u64 = 2024;

/// The gateway the terminal UI runs against: the real backend, or an
/// in-memory one seeded with demo records.
#[derive(Debug)]
pub enum Backend {
    Http(HttpGateway),
    Memory(MemoryGateway),
}

impl Backend {
    pub fn http(base_url: &str, timeout: Duration) -> Result<Self> {
        let gateway = HttpGateway::new(base_url, timeout).with_context(|| {
            format!("invalid [api] config for {base_url:?} -- fix base_url/timeout values")
        })?;
        info!(base_url = gateway.base_url(), ?timeout, "using HTTP backend");
        Ok(Self::Http(gateway))
    }

    pub fn demo() -> Self {
        let data = demo_data(DEMO_SEED);
        info!(
            invoices = data.invoices.len(),
            clients = data.clients.len(),
            products = data.products.len(),
            "using in-memory demo backend"
        );
        Self::Memory(MemoryGateway::with_data(
            data.invoices,
            data.clients,
            data.products,
        ))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http(gateway) => gateway.base_url().to_owned(),
            Self::Memory(_) => "demo (in-memory)".to_owned(),
        }
    }

    fn gateway(&mut self) -> &mut dyn Gateway {
        match self {
            Self::Http(gateway) => gateway,
            Self::Memory(gateway) => gateway,
        }
    }
}

impl Gateway for Backend {
    fn list_invoices(&mut self) -> GatewayResult<Vec<Invoice>> {
        self.gateway().list_invoices()
    }

    fn get_invoice(&mut self, record_id: &RecordId) -> GatewayResult<Invoice> {
        self.gateway().get_invoice(record_id)
    }

    fn search_invoices(&mut self, query: &SearchQuery) -> GatewayResult<Vec<Invoice>> {
        self.gateway().search_invoices(query)
    }

    fn create_invoice(&mut self, invoice: &NewInvoice) -> GatewayResult<Invoice> {
        self.gateway().create_invoice(invoice)
    }

    fn update_invoice(
        &mut self,
        record_id: &RecordId,
        update: &InvoiceUpdate,
    ) -> GatewayResult<Invoice> {
        self.gateway().update_invoice(record_id, update)
    }

    fn list_clients(&mut self) -> GatewayResult<Vec<Client>> {
        self.gateway().list_clients()
    }

    fn create_client(&mut self, client: &NewClient) -> GatewayResult<Client> {
        self.gateway().create_client(client)
    }

    fn update_client(
        &mut self,
        record_id: &RecordId,
        update: &ClientUpdate,
    ) -> GatewayResult<Client> {
        self.gateway().update_client(record_id, update)
    }

    fn list_products(&mut self) -> GatewayResult<Vec<Product>> {
        self.gateway().list_products()
    }

    fn create_product(&mut self, product: &NewProduct) -> GatewayResult<Product> {
        self.gateway().create_product(product)
    }

    fn update_product(
        &mut self,
        record_id: &RecordId,
        update: &ProductUpdate,
    ) -> GatewayResult<Product> {
        self.gateway().update_product(record_id, update)
    }

    fn delete(&mut self, kind: EntityKind, record_id: &RecordId) -> GatewayResult<()> {
        self.gateway().delete(kind, record_id)
    }
}

/// Fetches every collection once. Used by `--check` to prove the backend
/// answers with records this client can decode.
pub fn check_backend(backend: &mut Backend) -> Result<Vec<(EntityKind, usize)>> {
    let target = backend.describe();
    let invoices = backend
        .list_invoices()
        .with_context(|| format!("list invoices from {target}"))?;
    let clients = backend
        .list_clients()
        .with_context(|| format!("list clients from {target}"))?;
    let products = backend
        .list_products()
        .with_context(|| format!("list products from {target}"))?;
    Ok(vec![
        (EntityKind::Invoice, invoices.len()),
        (EntityKind::Client, clients.len()),
        (EntityKind::Product, products.len()),
    ])
}
