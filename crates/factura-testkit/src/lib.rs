// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use factura_app::format::{date_to_serial, round_cents};
use factura_app::{
    Client, ClientId, Invoice, InvoiceLine, Numeric, Product, ProductId, RecordId,
    generate_invoice_number,
};
use time::macros::date;
use time::{Date, Duration};

const FIRST_NAMES: [&str; 16] = [
    "Camille", "Louise", "Jules", "Léa", "Hugo", "Manon", "Lucas", "Chloé", "Nathan", "Inès",
    "Arthur", "Zoé", "Gabriel", "Emma", "Paul", "Sarah",
];
const LAST_NAMES: [&str; 16] = [
    "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit", "Durand", "Leroy",
    "Moreau", "Simon", "Laurent", "Lefèvre", "Michel", "Garcia", "Fournier",
];
const COMPANY_SUFFIXES: [&str; 5] = ["SARL", "SAS", "& Fils", "Conseil", "Services"];
const CITIES: [&str; 10] = [
    "Paris",
    "Lyon",
    "Marseille",
    "Toulouse",
    "Nantes",
    "Lille",
    "Bordeaux",
    "Rennes",
    "Grenoble",
    "Dijon",
];
const STREETS: [&str; 8] = [
    "rue de la République",
    "avenue Jean Jaurès",
    "boulevard Victor Hugo",
    "rue Pasteur",
    "place de la Gare",
    "rue des Lilas",
    "chemin du Moulin",
    "allée des Tilleuls",
];

const CATALOG: [(&str, &[&str]); 4] = [
    (
        "Bureau",
        &["Stylo", "Cahier A4", "Classeur", "Agrafeuse", "Ramette papier"],
    ),
    (
        "Informatique",
        &["Clavier", "Souris", "Écran 24 pouces", "Câble HDMI", "Clé USB"],
    ),
    ("Mobilier", &["Chaise", "Bureau d'angle", "Étagère", "Lampe"]),
    (
        "Service",
        &["Installation", "Maintenance", "Formation", "Déplacement"],
    ),
];

const BASE_DATE: Date = date!(2024 - 01 - 01);

const INVOICE_TAG: u32 = 0x6661_6301;
const CLIENT_TAG: u32 = 0x6661_6302;
const PRODUCT_TAG: u32 = 0x6661_6303;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// A seeded collection of invoices with the clients and products they refer to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoData {
    pub invoices: Vec<Invoice>,
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
}

/// Deterministic generator of believable invoicing records.
#[derive(Debug, Clone)]
pub struct InvoiceFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl InvoiceFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn client(&mut self, n: i64) -> Client {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let name = if self.int_n(4) == 0 {
            format!("{last} {}", self.pick(&COMPANY_SUFFIXES))
        } else {
            format!("{first} {last}")
        };
        let street_number = self.int_range(1, 120);
        let address = format!(
            "{street_number} {}, {}",
            self.pick(&STREETS),
            self.pick(&CITIES)
        );
        let tel = format!(
            "0{}{:08}",
            self.int_range(1, 7),
            self.rng.next_u64() % 100_000_000
        );
        let email = format!(
            "{}.{}@exemple.fr",
            ascii_slug(first),
            ascii_slug(last)
        );
        let sex = if self.rng.bool() { "F" } else { "M" };
        let birth = BASE_DATE - Duration::days(self.int_range(18 * 365, 70 * 365));

        Client {
            id: object_id(CLIENT_TAG, n),
            client_id: ClientId::new(n),
            name,
            address: Some(address),
            tel: Some(tel),
            email: Some(email),
            sex: Some(sex.to_owned()),
            date_birth: Some(factura_app::format::format_iso_date(birth)),
        }
    }

    pub fn product(&mut self, n: i64) -> Product {
        let (category, names) = CATALOG[self.int_n(CATALOG.len())];
        let name = self.pick(names);
        let cents = self.int_range(150, 45_000);
        Product {
            id: object_id(PRODUCT_TAG, n),
            product_id: Some(ProductId::new(n)),
            name: name.to_owned(),
            category: category.to_owned(),
            price: Numeric::Number(cents as f64 / 100.0),
        }
    }

    /// An invoice for one of `clients` billing one to four of `products`.
    /// Falls back to client 1 and no lines when the inputs are empty.
    pub fn invoice(&mut self, n: i64, clients: &[Client], products: &[Product]) -> Invoice {
        let client_id = if clients.is_empty() {
            ClientId::new(1)
        } else {
            clients[self.int_n(clients.len())].client_id
        };

        let mut lines = Vec::new();
        if !products.is_empty() {
            let count = self.int_range(1, 4);
            for _ in 0..count {
                let product = &products[self.int_n(products.len())];
                let Some(product_id) = product.product_id else {
                    continue;
                };
                lines.push(InvoiceLine {
                    product_id,
                    quantity: self.int_range(1, 5),
                    price: product.price.value().unwrap_or_default(),
                });
            }
        }
        let total = round_cents(
            lines
                .iter()
                .map(|line| line.price * line.quantity as f64)
                .sum(),
        );

        let date = self.date_in_2024();
        let suffix = self.int_range(0, 999) as u16;
        Invoice {
            id: object_id(INVOICE_TAG, n),
            invoice_number: generate_invoice_number(date, suffix),
            invoice_date: Numeric::Number(date_to_serial(date) as f64),
            client_id,
            total_amount: Numeric::Number(total),
            products: lines,
        }
    }

    pub fn date_in_2024(&mut self) -> Date {
        BASE_DATE + Duration::days(self.int_range(0, 365))
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

/// Seeded demo dataset: 8 clients, 14 products and 23 invoices between them.
pub fn demo_data(seed: u64) -> DemoData {
    let mut faker = InvoiceFaker::new(seed);
    let clients: Vec<Client> = (1..=8).map(|n| faker.client(n)).collect();
    let products: Vec<Product> = (1..=14).map(|n| faker.product(n)).collect();
    let invoices = (1..=23)
        .map(|n| faker.invoice(n, &clients, &products))
        .collect();
    DemoData {
        invoices,
        clients,
        products,
    }
}

/// `Client {n}` with client id `n` and no optional fields.
pub fn fixture_client(n: i64) -> Client {
    Client {
        id: object_id(CLIENT_TAG, n),
        client_id: ClientId::new(n),
        name: format!("Client {n}"),
        address: None,
        tel: None,
        email: None,
        sex: None,
        date_birth: None,
    }
}

/// `Produit {n}` priced at `n` euros in category `Divers`.
pub fn fixture_product(n: i64) -> Product {
    Product {
        id: object_id(PRODUCT_TAG, n),
        product_id: Some(ProductId::new(n)),
        name: format!("Produit {n}"),
        category: "Divers".to_owned(),
        price: Numeric::Number(n as f64),
    }
}

/// Invoice `FAC-{n}` dated 2024-01-15 with a total of `n * 10` and no lines.
pub fn fixture_invoice(n: i64, client_id: ClientId) -> Invoice {
    Invoice {
        id: object_id(INVOICE_TAG, n),
        invoice_number: format!("FAC-{n}"),
        invoice_date: Numeric::Number(date_to_serial(date!(2024 - 01 - 15)) as f64),
        client_id,
        total_amount: Numeric::Number((n * 10) as f64),
        products: Vec::new(),
    }
}

/// `count` fixture invoices numbered from 1, all for client 1.
pub fn fixture_invoices(count: i64) -> Vec<Invoice> {
    (1..=count)
        .map(|n| fixture_invoice(n, ClientId::new(1)))
        .collect()
}

fn object_id(tag: u32, n: i64) -> RecordId {
    RecordId::new(format!("{tag:08x}{n:016x}"))
}

fn ascii_slug(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' => 'e',
            'ç' => 'c',
            other => other,
        })
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{
        InvoiceFaker, demo_data, fixture_client, fixture_invoice, fixture_invoices,
        fixture_product,
    };
    use factura_app::format::format_display_date;
    use factura_app::{ClientId, ProductId};
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let mut left = InvoiceFaker::new(42);
        let mut right = InvoiceFaker::new(42);
        assert_eq!(left.client(1), right.client(1));
        assert_eq!(left.product(1), right.product(1));
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(InvoiceFaker::new(0).seed(), 1);
    }

    #[test]
    fn client_fields_are_filled() {
        let mut faker = InvoiceFaker::new(3);
        let client = faker.client(5);
        assert_eq!(client.client_id, ClientId::new(5));
        assert!(!client.name.is_empty());
        let email = client.email.expect("email");
        assert!(email.ends_with("@exemple.fr"));
        assert!(email.is_ascii());
        assert_eq!(client.tel.expect("tel").len(), 10);
    }

    #[test]
    fn product_price_is_positive() {
        let mut faker = InvoiceFaker::new(9);
        for n in 1..20 {
            let product = faker.product(n);
            let price = product.price.value().expect("numeric price");
            assert!((1.5..=450.0).contains(&price), "got {price}");
        }
    }

    #[test]
    fn invoice_total_matches_lines() {
        let data = demo_data(7);
        for invoice in &data.invoices {
            let sum: f64 = invoice
                .products
                .iter()
                .map(|line| line.price * line.quantity as f64)
                .sum();
            let total = invoice.total_amount.value().expect("numeric total");
            assert!((total - sum).abs() < 0.01, "{total} vs {sum}");
            assert!(invoice.invoice_number.starts_with("FAC/2024"));
            assert!(
                data.clients
                    .iter()
                    .any(|client| client.client_id == invoice.client_id)
            );
        }
    }

    #[test]
    fn demo_data_has_unique_record_ids() {
        let data = demo_data(11);
        let mut ids = BTreeSet::new();
        for id in data
            .invoices
            .iter()
            .map(|invoice| &invoice.id)
            .chain(data.clients.iter().map(|client| &client.id))
            .chain(data.products.iter().map(|product| &product.id))
        {
            assert_eq!(id.as_str().len(), 24);
            assert!(ids.insert(id.clone()), "duplicate id {id}");
        }
        assert_eq!(data.invoices.len(), 23);
    }

    #[test]
    fn fixtures_are_predictable() {
        assert_eq!(fixture_client(2).name, "Client 2");
        assert_eq!(fixture_product(4).product_id, Some(ProductId::new(4)));
        assert_eq!(fixture_product(4).price.value(), Some(4.0));
        let invoice = fixture_invoice(3, ClientId::new(9));
        assert_eq!(invoice.invoice_number, "FAC-3");
        assert_eq!(format_display_date(&invoice.invoice_date), "15/01/2024");
        assert_eq!(fixture_invoices(12).len(), 12);
    }

    #[test]
    fn variety_across_seeds() {
        let mut names = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let mut faker = InvoiceFaker::new(seed);
            names.insert(faker.client(1).name);
        }
        assert!(names.len() >= 10, "got {}", names.len());
    }
}
