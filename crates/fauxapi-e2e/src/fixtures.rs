//! Fake request data for scenarios.
//!
//! `Fixtures` plays the part of a faker: it hands out plausible users,
//! products and orders. Seed it to make a run's request bodies
//! reproducible alongside the client's own seed.

use fauxapi_core::{Order, OrderLine, OrderStatus, Product, User};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::{Map, Value};

const FIRST_NAMES: &[&str] = &[
    "Avery", "Jordan", "Riley", "Morgan", "Casey", "Quinn", "Harper", "Rowan",
];
const LAST_NAMES: &[&str] = &[
    "Nguyen", "Okafor", "Larsen", "Moreau", "Tanaka", "Silva", "Kowalski", "Reyes",
];
const PHRASES: &[&str] = &[
    "Adaptive Widget",
    "Ergonomic Desk",
    "Wireless Speaker",
    "Trail Runner",
    "Cast Iron Skillet",
    "Field Notebook",
];
const STREETS: &[&str] = &["Maple Ave", "Harbor St", "Cedar Ln", "Mill Rd", "Sunset Blvd"];
const CITIES: &[&str] = &["Portland", "Austin", "Raleigh", "Boise", "Madison"];
const BLURBS: &[&str] = &[
    "Built to last through daily use.",
    "A customer favourite this season.",
    "Lightweight and easy to carry.",
    "Backed by a two-year warranty.",
];
const CATEGORIES: &[&str] = &["Electronics", "Clothing", "Books", "Home", "Sports"];
const STATUSES: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
];

/// Seedable generator of request data.
#[derive(Debug)]
pub struct Fixtures {
    rng: StdRng,
}

impl Fixtures {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    pub fn user(&mut self) -> User {
        let id = self.rng.gen_range(1..=10_000);
        let first = self.choose(FIRST_NAMES);
        let last = self.choose(LAST_NAMES);
        let username = format!("{}_{}{}", first, last, self.rng.gen_range(10..100)).to_lowercase();
        User {
            id,
            email: format!("{}@example.org", username),
            username,
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: Some(self.phone()),
            address: Some(self.address()),
        }
    }

    pub fn product(&mut self) -> Product {
        Product {
            id: self.rng.gen_range(1..=1_000),
            name: self.choose(PHRASES).to_string(),
            price: cents(self.rng.gen_range(10.0..1_000.0)),
            stock: self.rng.gen_range(0..=500),
            category: self.choose(CATEGORIES).to_string(),
            description: Some(self.choose(BLURBS).to_string()),
        }
    }

    pub fn order(&mut self) -> Order {
        let line_count = self.rng.gen_range(1..=5);
        let items = (0..line_count)
            .map(|_| OrderLine {
                product_id: self.rng.gen_range(1..=1_000),
                quantity: self.rng.gen_range(1..=5),
                price: cents(self.rng.gen_range(10.0..500.0)),
            })
            .collect();
        Order {
            id: self.rng.gen_range(1..=50_000),
            user_id: self.rng.gen_range(1..=10_000),
            items,
            total: cents(self.rng.gen_range(50.0..5_000.0)),
            status: STATUSES
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(OrderStatus::Pending),
        }
    }

    fn phone(&mut self) -> String {
        format!(
            "+1-{:03}-{:03}-{:04}",
            self.rng.gen_range(200..1_000),
            self.rng.gen_range(200..1_000),
            self.rng.gen_range(0..10_000)
        )
    }

    fn address(&mut self) -> String {
        let number = self.rng.gen_range(1..10_000);
        format!("{} {}, {}", number, self.choose(STREETS), self.choose(CITIES))
    }

    fn choose(&mut self, options: &[&'static str]) -> &'static str {
        options.choose(&mut self.rng).copied().unwrap_or_default()
    }
}

/// Serializes a fixture into a request body.
pub fn to_body<T: Serialize>(value: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            Ok(map)
        }
    }
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
