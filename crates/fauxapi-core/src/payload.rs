//! Typed response payloads and their synthesis.
//!
//! Successful calls carry one [`Payload`] variant per resource kind. Bodies
//! sent with create/update/patch are overlaid on a synthesized entity, so a
//! response echoes whatever fields the caller supplied and fills the rest.

use crate::operation::{OperationKind, OperationRequest, Resource, Verb};
use crate::random::{DrawExt, RandomSource, round_cents};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Linus", "Margaret", "Dennis", "Barbara", "Ken", "Frances",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Torvalds", "Hamilton", "Ritchie", "Liskov", "Thompson", "Allen",
];
const ADJECTIVES: &[&str] = &[
    "Compact", "Ergonomic", "Rugged", "Wireless", "Premium", "Portable",
];
const NOUNS: &[&str] = &["Laptop", "Keyboard", "Backpack", "Lamp", "Jacket", "Novel"];
const CATEGORIES: &[&str] = &["Electronics", "Clothing", "Books", "Home", "Sports"];
const OPEN_STATUSES: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: u64,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub user_id: u64,
    pub items: Vec<OrderLine>,
    pub total: f64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: u64,
    pub quantity: u32,
}

/// The cart is a singleton resource: listing or fetching it returns the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

/// Data returned by a successful call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Payload {
    User(User),
    Users(Vec<User>),
    Product(Product),
    Products(Vec<Product>),
    Order(Order),
    Orders(Vec<Order>),
    Cart(Cart),
    Deleted { id: u64 },
}

/// Structural shape of a payload, independent of its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Entity(Resource),
    Collection(Resource),
    Deleted,
}

impl PayloadShape {
    /// The shape a successful call of `kind` must return.
    pub fn expected_for(kind: OperationKind) -> Self {
        match (kind.resource, kind.verb) {
            (_, Verb::Delete) => PayloadShape::Deleted,
            (Resource::Cart, _) => PayloadShape::Entity(Resource::Cart),
            (resource, Verb::List) => PayloadShape::Collection(resource),
            (resource, _) => PayloadShape::Entity(resource),
        }
    }
}

impl Payload {
    pub fn shape(&self) -> PayloadShape {
        match self {
            Payload::User(_) => PayloadShape::Entity(Resource::User),
            Payload::Users(_) => PayloadShape::Collection(Resource::User),
            Payload::Product(_) => PayloadShape::Entity(Resource::Product),
            Payload::Products(_) => PayloadShape::Collection(Resource::Product),
            Payload::Order(_) => PayloadShape::Entity(Resource::Order),
            Payload::Orders(_) => PayloadShape::Collection(Resource::Order),
            Payload::Cart(_) => PayloadShape::Entity(Resource::Cart),
            Payload::Deleted { .. } => PayloadShape::Deleted,
        }
    }

    /// Identifier of a single-entity payload. Carts and collections have none.
    pub fn id(&self) -> Option<u64> {
        match self {
            Payload::User(u) => Some(u.id),
            Payload::Product(p) => Some(p.id),
            Payload::Order(o) => Some(o.id),
            Payload::Deleted { id } => Some(*id),
            Payload::Users(_)
            | Payload::Products(_)
            | Payload::Orders(_)
            | Payload::Cart(_) => None,
        }
    }

    /// Number of items in a collection payload.
    pub fn item_count(&self) -> Option<usize> {
        match self {
            Payload::Users(v) => Some(v.len()),
            Payload::Products(v) => Some(v.len()),
            Payload::Orders(v) => Some(v.len()),
            Payload::Cart(c) => Some(c.items.len()),
            _ => None,
        }
    }
}

/// Builds the success payload for `request`, drawing any missing data from
/// `source`.
pub fn synthesize<S: RandomSource + ?Sized>(request: &OperationRequest, source: &mut S) -> Payload {
    let resource = request.resource();
    let body = request.body();

    match request.verb() {
        Verb::Delete => Payload::Deleted {
            id: request.id().unwrap_or(0),
        },
        Verb::List => list(resource, request, source),
        Verb::Get => entity(resource, request.id(), None, source),
        Verb::Create => {
            if resource == Resource::Cart {
                let mut cart = cart(source);
                let item = overlay(cart_item(source), body, None);
                cart.items.push(item);
                return Payload::Cart(cart);
            }
            entity(resource, None, body, source)
        }
        Verb::Update | Verb::Patch => entity(resource, request.id(), body, source),
    }
}

fn list<S: RandomSource + ?Sized>(
    resource: Resource,
    request: &OperationRequest,
    source: &mut S,
) -> Payload {
    let count = source.range_u64(1, 5) as usize;
    match resource {
        Resource::User => Payload::Users((0..count).map(|_| user(None, source)).collect()),
        Resource::Product => {
            let query = request.field("q").and_then(Value::as_str);
            let products = (0..count)
                .map(|_| {
                    let mut product = product(None, source);
                    if let Some(q) = query {
                        product.name = format!("{} {}", source.pick(ADJECTIVES), q);
                    }
                    product
                })
                .collect();
            Payload::Products(products)
        }
        Resource::Order => {
            let owner = request.field("user_id").and_then(Value::as_u64);
            let orders = (0..count)
                .map(|_| {
                    let mut order = order(None, source);
                    if let Some(user_id) = owner {
                        order.user_id = user_id;
                    }
                    order
                })
                .collect();
            Payload::Orders(orders)
        }
        Resource::Cart => Payload::Cart(cart(source)),
    }
}

fn entity<S: RandomSource + ?Sized>(
    resource: Resource,
    id: Option<u64>,
    body: Option<&Map<String, Value>>,
    source: &mut S,
) -> Payload {
    match resource {
        Resource::User => Payload::User(overlay(user(id, source), body, id)),
        Resource::Product => Payload::Product(overlay(product(id, source), body, id)),
        Resource::Order => Payload::Order(overlay(order(id, source), body, id)),
        Resource::Cart => Payload::Cart(overlay(cart(source), body, None)),
    }
}

/// Overlays `body` on `base`, then pins `id` when given. Falls back to `base`
/// when the merged object no longer fits the type.
fn overlay<T>(base: T, body: Option<&Map<String, Value>>, id: Option<u64>) -> T
where
    T: Serialize + DeserializeOwned,
{
    let Ok(Value::Object(mut merged)) = serde_json::to_value(&base) else {
        return base;
    };
    if let Some(body) = body {
        for (key, value) in body {
            if merged.contains_key(key) {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    if let Some(id) = id
        && merged.contains_key("id")
    {
        merged.insert("id".to_string(), Value::from(id));
    }
    serde_json::from_value(Value::Object(merged)).unwrap_or(base)
}

fn user<S: RandomSource + ?Sized>(id: Option<u64>, source: &mut S) -> User {
    let id = id.unwrap_or_else(|| source.range_u64(1, 10_000));
    let first = *source.pick(FIRST_NAMES);
    let last = *source.pick(LAST_NAMES);
    let username = format!("{}.{}{}", first, last, id).to_lowercase();
    User {
        id,
        email: format!("{}@example.com", username),
        username,
        first_name: first.to_string(),
        last_name: last.to_string(),
        phone: None,
        address: None,
    }
}

fn product<S: RandomSource + ?Sized>(id: Option<u64>, source: &mut S) -> Product {
    let id = id.unwrap_or_else(|| source.range_u64(1, 1_000));
    Product {
        id,
        name: format!("{} {}", source.pick(ADJECTIVES), source.pick(NOUNS)),
        price: source.price(10.0, 1_000.0),
        stock: source.range_u64(0, 500) as u32,
        category: (*source.pick(CATEGORIES)).to_string(),
        description: None,
    }
}

fn order<S: RandomSource + ?Sized>(id: Option<u64>, source: &mut S) -> Order {
    let id = id.unwrap_or_else(|| source.range_u64(1, 50_000));
    let line_count = source.range_u64(1, 5);
    let items: Vec<OrderLine> = (0..line_count)
        .map(|_| OrderLine {
            product_id: source.range_u64(1, 1_000),
            quantity: source.range_u64(1, 5) as u32,
            price: source.price(10.0, 500.0),
        })
        .collect();
    let total = round_cents(
        items
            .iter()
            .map(|line| line.price * f64::from(line.quantity))
            .sum(),
    );
    Order {
        id,
        user_id: source.range_u64(1, 10_000),
        items,
        total,
        status: *source.pick(OPEN_STATUSES),
    }
}

fn cart_item<S: RandomSource + ?Sized>(source: &mut S) -> CartItem {
    CartItem {
        product_id: source.range_u64(1, 1_000),
        quantity: source.range_u64(1, 5) as u32,
    }
}

fn cart<S: RandomSource + ?Sized>(source: &mut S) -> Cart {
    let count = source.range_u64(0, 3);
    Cart {
        items: (0..count).map(|_| cart_item(source)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::body;
    use crate::random::{FixedSequence, RngSource};
    use serde_json::json;

    #[test]
    fn test_expected_shapes() {
        let shape = |s: &str| PayloadShape::expected_for(s.parse().unwrap());
        assert_eq!(shape("user.list"), PayloadShape::Collection(Resource::User));
        assert_eq!(shape("user.create"), PayloadShape::Entity(Resource::User));
        assert_eq!(shape("order.delete"), PayloadShape::Deleted);
        assert_eq!(shape("cart.list"), PayloadShape::Entity(Resource::Cart));
        assert_eq!(shape("cart.create"), PayloadShape::Entity(Resource::Cart));
    }

    #[test]
    fn test_synthesized_shape_matches_expectation_for_every_operation() {
        let mut source = RngSource::seeded(11);
        for resource in Resource::all() {
            for verb in Verb::all() {
                let kind = OperationKind::new(*resource, *verb);
                let request = OperationRequest::new(kind).with_id(5);
                let payload = synthesize(&request, &mut source);
                assert_eq!(
                    payload.shape(),
                    PayloadShape::expected_for(kind),
                    "shape mismatch for {}",
                    kind
                );
            }
        }
    }

    #[test]
    fn test_get_uses_requested_id() {
        let mut source = FixedSequence::constant(0.4);
        let payload = synthesize(&OperationRequest::get(Resource::User, 77), &mut source);
        let Payload::User(user) = payload else {
            panic!("expected user payload");
        };
        assert_eq!(user.id, 77);
        assert!(user.email.contains('@'));
    }

    #[test]
    fn test_create_echoes_body() {
        let mut source = FixedSequence::constant(0.4);
        let request = OperationRequest::create(
            Resource::User,
            body([
                ("id", json!(4242)),
                ("username", json!("grace")),
                ("email", json!("grace@navy.mil")),
            ]),
        );
        let Payload::User(user) = synthesize(&request, &mut source) else {
            panic!("expected user payload");
        };
        assert_eq!(user.id, 4242);
        assert_eq!(user.username, "grace");
        assert_eq!(user.email, "grace@navy.mil");
        assert!(!user.first_name.is_empty());
    }

    #[test]
    fn test_patch_overlays_fields_and_pins_id() {
        let mut source = FixedSequence::constant(0.4);
        let request = OperationRequest::patch(
            Resource::Product,
            456,
            body([("price", json!(99.99)), ("id", json!(1))]),
        );
        let Payload::Product(product) = synthesize(&request, &mut source) else {
            panic!("expected product payload");
        };
        assert_eq!(product.id, 456);
        assert_eq!(product.price, 99.99);
    }

    #[test]
    fn test_patch_with_ill_typed_field_falls_back() {
        let mut source = FixedSequence::constant(0.4);
        let request = OperationRequest::patch(
            Resource::Product,
            9,
            body([("price", json!("cheap"))]),
        );
        let Payload::Product(product) = synthesize(&request, &mut source) else {
            panic!("expected product payload");
        };
        assert_eq!(product.id, 9);
        assert!(product.price >= 10.0);
    }

    #[test]
    fn test_order_status_patch() {
        let mut source = FixedSequence::constant(0.1);
        let request =
            OperationRequest::patch(Resource::Order, 789, body([("status", json!("shipped"))]));
        let Payload::Order(order) = synthesize(&request, &mut source) else {
            panic!("expected order payload");
        };
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.id, 789);
    }

    #[test]
    fn test_search_results_match_query() {
        let mut source = RngSource::seeded(3);
        let request = OperationRequest::list(Resource::Product).with_body(body([("q", json!("laptop"))]));
        let Payload::Products(products) = synthesize(&request, &mut source) else {
            panic!("expected product collection");
        };
        assert!(!products.is_empty());
        assert!(products.iter().all(|p| p.name.ends_with("laptop")));
    }

    #[test]
    fn test_orders_filtered_by_user() {
        let mut source = RngSource::seeded(4);
        let request = OperationRequest::list(Resource::Order).with_body(body([("user_id", json!(555))]));
        let Payload::Orders(orders) = synthesize(&request, &mut source) else {
            panic!("expected order collection");
        };
        assert!(orders.iter().all(|o| o.user_id == 555));
    }

    #[test]
    fn test_cart_create_appends_item() {
        let mut source = FixedSequence::constant(0.0);
        let request = OperationRequest::create(
            Resource::Cart,
            body([("product_id", json!(123)), ("quantity", json!(2))]),
        );
        let Payload::Cart(cart) = synthesize(&request, &mut source) else {
            panic!("expected cart payload");
        };
        assert_eq!(
            cart.items.last(),
            Some(&CartItem {
                product_id: 123,
                quantity: 2
            })
        );
    }

    #[test]
    fn test_delete_acknowledges_id() {
        let mut source = FixedSequence::default();
        let payload = synthesize(&OperationRequest::delete(Resource::User, 123), &mut source);
        assert_eq!(payload, Payload::Deleted { id: 123 });
        assert_eq!(payload.id(), Some(123));
    }

    #[test]
    fn test_order_total_matches_lines() {
        let mut source = RngSource::seeded(8);
        let order = order(None, &mut source);
        let expected: f64 = order
            .items
            .iter()
            .map(|l| l.price * f64::from(l.quantity))
            .sum();
        assert!((order.total - expected).abs() < 0.01);
    }

    #[test]
    fn test_payload_serializes_tagged() {
        let value = serde_json::to_value(Payload::Deleted { id: 3 }).unwrap();
        assert_eq!(value, json!({"type": "deleted", "data": {"id": 3}}));
    }
}
