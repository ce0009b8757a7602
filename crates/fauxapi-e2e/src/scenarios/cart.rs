//! Cart catalog: add an item, read the cart, check out.

use super::orders::{create_order, owner_echoed};
use super::{AssertionBuilder, Catalog, CatalogScenario};
use crate::models::Assertion;
use fauxapi_core::{OperationRequest, Payload, Resource, body};
use serde_json::json;

const CART_PRODUCT_ID: u64 = 123;
const CART_QUANTITY: u64 = 2;

pub(super) fn scenarios() -> Vec<CatalogScenario> {
    vec![
        CatalogScenario::new(
            "add_product_to_cart",
            "POST /cart adds a product to the shopping cart",
            Catalog::Cart,
            |_| {
                Ok(OperationRequest::create(
                    Resource::Cart,
                    body([
                        ("product_id", json!(CART_PRODUCT_ID)),
                        ("quantity", json!(CART_QUANTITY)),
                    ]),
                ))
            },
        )
        .with_check(item_in_cart),
        CatalogScenario::new(
            "get_cart_contents",
            "GET /cart retrieves the shopping cart contents",
            Catalog::Cart,
            |_| Ok(OperationRequest::list(Resource::Cart)),
        ),
        // Checkout turns the cart into an order.
        CatalogScenario::new(
            "checkout_cart",
            "POST /orders completes the checkout process",
            Catalog::Cart,
            create_order,
        )
        .with_check(owner_echoed),
    ]
}

fn item_in_cart(_request: &OperationRequest, payload: &Payload) -> Assertion {
    let found = match payload {
        Payload::Cart(cart) => cart.items.iter().any(|item| {
            item.product_id == CART_PRODUCT_ID && u64::from(item.quantity) == CART_QUANTITY
        }),
        _ => false,
    };
    AssertionBuilder::new("Item in cart")
        .expected(format!(
            "product {} x{}",
            CART_PRODUCT_ID, CART_QUANTITY
        ))
        .actual(if found { "present" } else { "missing" })
        .passed_if(found)
        .build()
}
