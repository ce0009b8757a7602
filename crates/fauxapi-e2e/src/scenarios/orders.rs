//! Order catalog: list, get, create, move along and cancel orders.

use super::users::requested_id;
use super::{Assertions, Catalog, CatalogScenario, Marker, ScenarioError};
use crate::fixtures::{Fixtures, to_body};
use crate::models::Assertion;
use fauxapi_core::{OperationRequest, OrderStatus, Payload, Resource, body};
use serde_json::json;

const SHIPPED_ORDER_ID: u64 = 789;
const CANCELLED_ORDER_ID: u64 = 101;

pub(super) fn scenarios() -> Vec<CatalogScenario> {
    vec![
        CatalogScenario::new(
            "get_order_list",
            "GET /orders retrieves a list of orders",
            Catalog::Order,
            |_| Ok(OperationRequest::list(Resource::Order)),
        )
        .with_markers(&[Marker::Smoke])
        .with_check(|_, payload| Assertions::non_empty(payload)),
        CatalogScenario::new(
            "get_order_by_id",
            "GET /orders/{id} retrieves a specific order",
            Catalog::Order,
            |fixtures| Ok(OperationRequest::get(Resource::Order, fixtures.order().id)),
        )
        .with_check(requested_id),
        CatalogScenario::new(
            "create_order",
            "POST /orders creates a new order",
            Catalog::Order,
            create_order,
        )
        .with_check(owner_echoed),
        CatalogScenario::new(
            "update_order_status",
            "PATCH /orders/{id} moves an order to shipped",
            Catalog::Order,
            |_| {
                Ok(OperationRequest::patch(
                    Resource::Order,
                    SHIPPED_ORDER_ID,
                    body([("status", json!("shipped"))]),
                ))
            },
        )
        .with_check(shipped),
        CatalogScenario::new(
            "cancel_order",
            "DELETE /orders/{id} cancels an order",
            Catalog::Order,
            |_| Ok(OperationRequest::delete(Resource::Order, CANCELLED_ORDER_ID)),
        )
        .with_check(|_, payload| Assertions::id_matches(payload, CANCELLED_ORDER_ID)),
    ]
}

pub(super) fn create_order(fixtures: &mut Fixtures) -> Result<OperationRequest, ScenarioError> {
    let order = fixtures.order();
    Ok(OperationRequest::create(Resource::Order, to_body(&order)?))
}

/// The created order belongs to the user the request named.
pub(super) fn owner_echoed(request: &OperationRequest, payload: &Payload) -> Assertion {
    let sent = request.field("user_id").and_then(|v| v.as_u64());
    let got = match payload {
        Payload::Order(order) => Some(order.user_id),
        _ => None,
    };
    Assertions::field_echoed(
        "user_id",
        format!("{:?}", sent),
        format!("{:?}", got),
        sent.is_some() && sent == got,
    )
}

fn shipped(_request: &OperationRequest, payload: &Payload) -> Assertion {
    let got = match payload {
        Payload::Order(order) => Some(order.status),
        _ => None,
    };
    Assertions::field_echoed(
        "status",
        format!("{:?}", Some(OrderStatus::Shipped)),
        format!("{:?}", got),
        got == Some(OrderStatus::Shipped),
    )
}
