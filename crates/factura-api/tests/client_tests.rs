// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use factura_api::HttpGateway;
use factura_app::{
    ClientId, EntityKind, Gateway, NetworkError, NewProduct, ProductId, ProductUpdate, RecordId,
    SearchQuery,
};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};

fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    let mut gateway = HttpGateway::new("http://127.0.0.1:1", Duration::from_millis(50))
        .expect("gateway should initialize");

    let error = gateway
        .list_clients()
        .expect_err("listing should fail for unreachable endpoint");
    assert!(matches!(error, NetworkError::Transport { .. }));
    assert!(error.to_string().contains("vérifiez"));
}

#[test]
fn list_clients_decodes_loose_records() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Get);
        assert_eq!(request.url(), "/api/clients");
        let body = r#"[
            {"_id": "c1", "client_id": 1, "name": "Ana", "tel": 612345678},
            {"_id": "c2", "client_id": 2, "name": 42, "email": null}
        ]"#;
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let mut gateway = HttpGateway::new(&addr, Duration::from_secs(1))?;
    let clients = gateway.list_clients()?;
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0].tel.as_deref(), Some("612345678"));
    assert_eq!(clients[1].name, "42");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn list_products_keeps_rows_without_a_numeric_id() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/products");
        let body = r#"[
            {"_id": "p1", "product_id": 1, "name": "Stylo", "price": 1.5},
            {"_id": "p2", "product_id": "n/a", "name": "Cahier", "price": 2},
            {"_id": "p3", "name": "Gomme", "price": 0.5}
        ]"#;
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let mut gateway = HttpGateway::new(&addr, Duration::from_secs(1))?;
    let products = gateway.list_products()?;
    assert_eq!(products.len(), 3);
    assert_eq!(products[0].product_id, Some(ProductId::new(1)));
    assert_eq!(products[1].product_id, None);
    assert_eq!(products[2].product_id, None);
    assert_eq!(products[2].name, "Gomme");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn search_sends_only_filled_parameters() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(
            request.url(),
            "/api/invoices/search?client_id=3&date_end=2024-02-01"
        );
        request
            .respond(json_response("[]", 200))
            .expect("response should succeed");
    });

    let mut gateway = HttpGateway::new(&addr, Duration::from_secs(1))?;
    let found = gateway.search_invoices(&SearchQuery {
        client_id: Some(ClientId::new(3)),
        date_start: None,
        date_end: Some("2024-02-01".to_owned()),
    })?;
    assert!(found.is_empty());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn conflict_detail_reaches_the_caller() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/api/products");
        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("request body should be readable");
        let sent: serde_json::Value = serde_json::from_str(&body).expect("json body");
        assert_eq!(sent["product_id"], 3);
        assert_eq!(sent["price"], 2.5);
        request
            .respond(json_response(
                r#"{"detail":"Un produit avec l'ID 3 existe déjà"}"#,
                409,
            ))
            .expect("response should succeed");
    });

    let mut gateway = HttpGateway::new(&addr, Duration::from_secs(1))?;
    let error = gateway
        .create_product(&NewProduct {
            product_id: ProductId::new(3),
            name: "Stylo".to_owned(),
            category: "Bureau".to_owned(),
            price: 2.5,
        })
        .expect_err("duplicate product should be rejected");
    assert_eq!(error.status_code(), Some(409));
    assert!(error.to_string().contains("existe déjà"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn update_puts_json_to_the_record_path() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Put);
        assert_eq!(request.url(), "/api/products/p42");
        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("request body should be readable");
        let sent: serde_json::Value = serde_json::from_str(&body).expect("json body");
        assert_eq!(
            sent,
            serde_json::json!({"name": "Clavier", "price": 19.9, "category": "Informatique"})
        );
        request
            .respond(json_response(
                r#"{"_id":"p42","product_id":4,"name":"Clavier","category":"Informatique","price":19.9}"#,
                200,
            ))
            .expect("response should succeed");
    });

    let mut gateway = HttpGateway::new(&addr, Duration::from_secs(1))?;
    let updated = gateway.update_product(
        &RecordId::from("p42"),
        &ProductUpdate {
            name: "Clavier".to_owned(),
            price: 19.9,
            category: "Informatique".to_owned(),
        },
    )?;
    assert_eq!(updated.product_id, Some(ProductId::new(4)));
    assert_eq!(updated.price.value(), Some(19.9));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn delete_failure_is_reported() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        for status in [200, 404] {
            let request = server.recv().expect("request expected");
            assert_eq!(request.method(), &Method::Delete);
            assert_eq!(request.url(), "/api/invoices/abc");
            let body = if status == 200 {
                r#"{"message":"Facture supprimée"}"#
            } else {
                r#"{"detail":"Facture non trouvée"}"#
            };
            request
                .respond(json_response(body, status))
                .expect("response should succeed");
        }
    });

    let mut gateway = HttpGateway::new(&addr, Duration::from_secs(1))?;
    let record_id = RecordId::from("abc");
    gateway.delete(EntityKind::Invoice, &record_id)?;
    let error = gateway
        .delete(EntityKind::Invoice, &record_id)
        .expect_err("second delete should fail");
    assert_eq!(error.status_code(), Some(404));
    assert!(error.to_string().contains("Facture non trouvée"));

    handle.join().expect("server thread should join");
    Ok(())
}
