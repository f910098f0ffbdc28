// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use factura_app::{
    Client, ClientUpdate, EntityKind, Gateway, GatewayResult, Invoice, InvoiceUpdate, NetworkError,
    NewClient, NewInvoice, NewProduct, Product, ProductUpdate, RecordId, SearchQuery,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Talks to the invoicing backend under `{base_url}/api`.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty -- set it to the backend address, e.g. http://localhost:8000");
        }
        let base_url = Url::parse(trimmed)
            .with_context(|| format!("parse api.base_url {trimmed:?} -- expected http://host:port"))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            bail!("api.base_url {trimmed:?} must be an http or https URL");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    fn execute(&self, method: &'static str, url: &Url, request: RequestBuilder) -> GatewayResult<Response> {
        debug!(method, %url, "sending request");
        let response = request
            .send()
            .map_err(|error| connection_error(url, &error))?;

        let status = response.status();
        debug!(method, %url, status = status.as_u16(), "response received");
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }

    fn get<T: DeserializeOwned>(&self, url: Url) -> GatewayResult<T> {
        let response = self.execute("GET", &url, self.http.get(url.clone()))?;
        decode(response)
    }

    fn post<T: DeserializeOwned>(&self, url: Url, body: &impl serde::Serialize) -> GatewayResult<T> {
        let response = self.execute("POST", &url, self.http.post(url.clone()).json(body))?;
        decode(response)
    }

    fn put<T: DeserializeOwned>(&self, url: Url, body: &impl serde::Serialize) -> GatewayResult<T> {
        let response = self.execute("PUT", &url, self.http.put(url.clone()).json(body))?;
        decode(response)
    }
}

impl Gateway for HttpGateway {
    fn list_invoices(&mut self) -> GatewayResult<Vec<Invoice>> {
        self.get(self.endpoint(&[EntityKind::Invoice.collection_path()]))
    }

    fn get_invoice(&mut self, record_id: &RecordId) -> GatewayResult<Invoice> {
        self.get(self.endpoint(&[EntityKind::Invoice.collection_path(), record_id.as_str()]))
    }

    fn search_invoices(&mut self, query: &SearchQuery) -> GatewayResult<Vec<Invoice>> {
        let mut url = self.endpoint(&[EntityKind::Invoice.collection_path(), "search"]);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        self.get(url)
    }

    fn create_invoice(&mut self, invoice: &NewInvoice) -> GatewayResult<Invoice> {
        self.post(self.endpoint(&[EntityKind::Invoice.collection_path()]), invoice)
    }

    fn update_invoice(
        &mut self,
        record_id: &RecordId,
        update: &InvoiceUpdate,
    ) -> GatewayResult<Invoice> {
        self.put(
            self.endpoint(&[EntityKind::Invoice.collection_path(), record_id.as_str()]),
            update,
        )
    }

    fn list_clients(&mut self) -> GatewayResult<Vec<Client>> {
        self.get(self.endpoint(&[EntityKind::Client.collection_path()]))
    }

    fn create_client(&mut self, client: &NewClient) -> GatewayResult<Client> {
        self.post(self.endpoint(&[EntityKind::Client.collection_path()]), client)
    }

    fn update_client(
        &mut self,
        record_id: &RecordId,
        update: &ClientUpdate,
    ) -> GatewayResult<Client> {
        self.put(
            self.endpoint(&[EntityKind::Client.collection_path(), record_id.as_str()]),
            update,
        )
    }

    fn list_products(&mut self) -> GatewayResult<Vec<Product>> {
        self.get(self.endpoint(&[EntityKind::Product.collection_path()]))
    }

    fn create_product(&mut self, product: &NewProduct) -> GatewayResult<Product> {
        self.post(self.endpoint(&[EntityKind::Product.collection_path()]), product)
    }

    fn update_product(
        &mut self,
        record_id: &RecordId,
        update: &ProductUpdate,
    ) -> GatewayResult<Product> {
        self.put(
            self.endpoint(&[EntityKind::Product.collection_path(), record_id.as_str()]),
            update,
        )
    }

    fn delete(&mut self, kind: EntityKind, record_id: &RecordId) -> GatewayResult<()> {
        let url = self.endpoint(&[kind.collection_path(), record_id.as_str()]);
        self.execute("DELETE", &url, self.http.delete(url.clone()))?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    response.json().map_err(|error| NetworkError::Decode {
        message: error.to_string(),
    })
}

fn connection_error(url: &Url, error: &reqwest::Error) -> NetworkError {
    let message = if error.is_timeout() {
        "délai d'attente dépassé -- vérifiez que le serveur répond".to_owned()
    } else {
        format!("{error} -- vérifiez que le serveur est démarré")
    };
    NetworkError::Transport {
        url: url.to_string(),
        message,
    }
}

#[derive(Deserialize)]
struct DetailEnvelope {
    detail: Option<Value>,
}

fn clean_error_response(status: StatusCode, body: &str) -> NetworkError {
    let code = status.as_u16();
    if let Ok(parsed) = serde_json::from_str::<DetailEnvelope>(body)
        && let Some(detail) = parsed.detail
        && let Some(message) = detail_message(&detail)
    {
        return NetworkError::status(code, message);
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return NetworkError::status(code, trimmed);
    }

    NetworkError::status(
        code,
        status.canonical_reason().unwrap_or("réponse inattendue"),
    )
}

/// FastAPI-style `detail`: a message, or a list of validation errors each
/// carrying a `msg`.
fn detail_message(detail: &Value) -> Option<String> {
    match detail {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
