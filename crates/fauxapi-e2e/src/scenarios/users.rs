//! User catalog: list, get, create, update and delete users.

use super::{Assertions, Catalog, CatalogScenario, Marker, ScenarioError};
use crate::fixtures::{Fixtures, to_body};
use crate::models::Assertion;
use fauxapi_core::{OperationRequest, Payload, Resource};

const DELETED_USER_ID: u64 = 123;

pub(super) fn scenarios() -> Vec<CatalogScenario> {
    vec![
        CatalogScenario::new(
            "get_user_list",
            "GET /users retrieves a list of users",
            Catalog::User,
            |_| Ok(OperationRequest::list(Resource::User)),
        )
        .with_markers(&[Marker::Smoke])
        .with_check(|_, payload| Assertions::non_empty(payload)),
        CatalogScenario::new(
            "get_user_by_id",
            "GET /users/{id} retrieves a specific user",
            Catalog::User,
            |fixtures| Ok(OperationRequest::get(Resource::User, fixtures.user().id)),
        )
        .with_check(requested_id),
        CatalogScenario::new(
            "create_user",
            "POST /users creates a new user",
            Catalog::User,
            create_user,
        )
        .with_check(username_echoed),
        CatalogScenario::new(
            "update_user",
            "PUT /users/{id} updates an existing user",
            Catalog::User,
            update_user,
        )
        .with_check(requested_id),
        CatalogScenario::new(
            "delete_user",
            "DELETE /users/{id} deletes a user",
            Catalog::User,
            |_| Ok(OperationRequest::delete(Resource::User, DELETED_USER_ID)),
        )
        .with_check(|_, payload| Assertions::id_matches(payload, DELETED_USER_ID)),
    ]
}

fn create_user(fixtures: &mut Fixtures) -> Result<OperationRequest, ScenarioError> {
    let user = fixtures.user();
    Ok(OperationRequest::create(Resource::User, to_body(&user)?))
}

fn update_user(fixtures: &mut Fixtures) -> Result<OperationRequest, ScenarioError> {
    let user = fixtures.user();
    Ok(OperationRequest::update(
        Resource::User,
        user.id,
        to_body(&user)?,
    ))
}

pub(super) fn requested_id(request: &OperationRequest, payload: &Payload) -> Assertion {
    Assertions::id_matches(payload, request.id().unwrap_or_default())
}

fn username_echoed(request: &OperationRequest, payload: &Payload) -> Assertion {
    let sent = request
        .field("username")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let got = match payload {
        Payload::User(user) => user.username.as_str(),
        _ => "",
    };
    Assertions::field_echoed("username", sent, got, !sent.is_empty() && sent == got)
}
