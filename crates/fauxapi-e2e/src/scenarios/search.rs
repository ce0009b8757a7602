//! Search and filter catalog.

use super::{AssertionBuilder, Catalog, CatalogScenario, Marker};
use crate::models::Assertion;
use fauxapi_core::{OperationRequest, Payload, Resource, body};
use serde_json::json;

const QUERY: &str = "laptop";
const ORDER_OWNER: u64 = 555;

pub(super) fn scenarios() -> Vec<CatalogScenario> {
    vec![
        CatalogScenario::new(
            "search_products",
            "GET /products?q= searches products by query",
            Catalog::Search,
            |_| {
                Ok(OperationRequest::list(Resource::Product).with_body(body([("q", json!(QUERY))])))
            },
        )
        .with_markers(&[Marker::Regression])
        .with_check(products_match_query),
        CatalogScenario::new(
            "get_user_orders",
            "GET /orders?user_id= lists orders for a specific user",
            Catalog::Search,
            |_| {
                Ok(OperationRequest::list(Resource::Order)
                    .with_body(body([("user_id", json!(ORDER_OWNER))])))
            },
        )
        .with_markers(&[Marker::Regression])
        .with_check(orders_belong_to_owner),
    ]
}

fn products_match_query(request: &OperationRequest, payload: &Payload) -> Assertion {
    let query = request
        .field("q")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_lowercase();
    let (matching, total) = match payload {
        Payload::Products(products) => (
            products
                .iter()
                .filter(|p| p.name.to_lowercase().contains(&query))
                .count(),
            products.len(),
        ),
        _ => (0, 0),
    };
    AssertionBuilder::new("Results match query")
        .expected(format!("every name contains '{}'", query))
        .actual(format!("{}/{} match", matching, total))
        .passed_if(total > 0 && matching == total)
        .build()
}

fn orders_belong_to_owner(request: &OperationRequest, payload: &Payload) -> Assertion {
    let owner = request.field("user_id").and_then(|v| v.as_u64());
    let (owned, total) = match payload {
        Payload::Orders(orders) => (
            orders
                .iter()
                .filter(|o| Some(o.user_id) == owner)
                .count(),
            orders.len(),
        ),
        _ => (0, 0),
    };
    AssertionBuilder::new("Orders belong to user")
        .expected(format!("every order has user_id {:?}", owner))
        .actual(format!("{}/{} match", owned, total))
        .passed_if(owner.is_some() && owned == total)
        .build()
}
