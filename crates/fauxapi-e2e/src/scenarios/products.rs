//! Product catalog: list, get, create, update and re-price products.

use super::users::requested_id;
use super::{Assertions, Catalog, CatalogScenario, Marker, ScenarioError};
use crate::fixtures::{Fixtures, to_body};
use crate::models::Assertion;
use fauxapi_core::{OperationRequest, Payload, Resource, body};
use serde_json::json;

const PATCHED_PRODUCT_ID: u64 = 456;
const PATCHED_PRICE: f64 = 99.99;

pub(super) fn scenarios() -> Vec<CatalogScenario> {
    vec![
        CatalogScenario::new(
            "get_product_list",
            "GET /products retrieves a list of products",
            Catalog::Product,
            |_| Ok(OperationRequest::list(Resource::Product)),
        )
        .with_markers(&[Marker::Smoke])
        .with_check(|_, payload| Assertions::non_empty(payload)),
        CatalogScenario::new(
            "get_product_by_id",
            "GET /products/{id} retrieves a specific product",
            Catalog::Product,
            |fixtures| {
                Ok(OperationRequest::get(
                    Resource::Product,
                    fixtures.product().id,
                ))
            },
        )
        .with_check(requested_id),
        CatalogScenario::new(
            "create_product",
            "POST /products creates a new product",
            Catalog::Product,
            create_product,
        )
        .with_check(name_echoed),
        CatalogScenario::new(
            "update_product",
            "PUT /products/{id} updates an existing product",
            Catalog::Product,
            update_product,
        )
        .with_check(price_echoed),
        CatalogScenario::new(
            "patch_product_price",
            "PATCH /products/{id} partially updates a product's price",
            Catalog::Product,
            |_| {
                Ok(OperationRequest::patch(
                    Resource::Product,
                    PATCHED_PRODUCT_ID,
                    body([("price", json!(PATCHED_PRICE))]),
                ))
            },
        )
        .with_check(price_echoed),
    ]
}

fn create_product(fixtures: &mut Fixtures) -> Result<OperationRequest, ScenarioError> {
    let product = fixtures.product();
    Ok(OperationRequest::create(
        Resource::Product,
        to_body(&product)?,
    ))
}

fn update_product(fixtures: &mut Fixtures) -> Result<OperationRequest, ScenarioError> {
    let product = fixtures.product();
    Ok(OperationRequest::update(
        Resource::Product,
        product.id,
        to_body(&product)?,
    ))
}

fn name_echoed(request: &OperationRequest, payload: &Payload) -> Assertion {
    let sent = request
        .field("name")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let got = match payload {
        Payload::Product(product) => product.name.as_str(),
        _ => "",
    };
    Assertions::field_echoed("name", sent, got, !sent.is_empty() && sent == got)
}

fn price_echoed(request: &OperationRequest, payload: &Payload) -> Assertion {
    let sent = request.field("price").and_then(|v| v.as_f64());
    let got = match payload {
        Payload::Product(product) => Some(product.price),
        _ => None,
    };
    Assertions::field_echoed(
        "price",
        fmt_price(sent),
        fmt_price(got),
        sent.is_some() && sent == got,
    )
}

fn fmt_price(price: Option<f64>) -> String {
    price.map_or_else(|| "none".to_string(), |p| format!("{:.2}", p))
}
