//! Operation requests.
//!
//! A request names a resource kind and a verb (`"user.create"`), optionally
//! targets a single resource id, and optionally carries a body of fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Resource kinds exposed by the fake API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    User,
    Product,
    Order,
    Cart,
}

impl Resource {
    pub fn all() -> &'static [Resource] {
        &[
            Resource::User,
            Resource::Product,
            Resource::Order,
            Resource::Cart,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::User => "user",
            Resource::Product => "product",
            Resource::Order => "order",
            Resource::Cart => "cart",
        }
    }

    /// Collection path segment used when rendering endpoints.
    fn path(self) -> &'static str {
        match self {
            Resource::User => "/users",
            Resource::Product => "/products",
            Resource::Order => "/orders",
            Resource::Cart => "/cart",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CRUD verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    List,
    Get,
    Create,
    Update,
    Patch,
    Delete,
}

impl Verb {
    pub fn all() -> &'static [Verb] {
        &[
            Verb::List,
            Verb::Get,
            Verb::Create,
            Verb::Update,
            Verb::Patch,
            Verb::Delete,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::List => "list",
            Verb::Get => "get",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
        }
    }

    /// HTTP method the verb maps onto.
    pub fn method(self) -> &'static str {
        match self {
            Verb::List | Verb::Get => "GET",
            Verb::Create => "POST",
            Verb::Update => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }

    /// Status code returned when the call succeeds.
    pub fn success_status(self) -> u16 {
        match self {
            Verb::Create => 201,
            Verb::Delete => 204,
            Verb::List | Verb::Get | Verb::Update | Verb::Patch => 200,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical call identifier, e.g. `user.create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationKind {
    pub resource: Resource,
    pub verb: Verb,
}

impl OperationKind {
    pub fn new(resource: Resource, verb: Verb) -> Self {
        Self { resource, verb }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.verb)
    }
}

/// Error parsing an operation identifier.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown operation {0:?}, expected <resource>.<verb>")]
pub struct ParseOperationError(String);

impl FromStr for OperationKind {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseOperationError(s.to_string());
        let (resource, verb) = s.split_once('.').ok_or_else(err)?;

        let resource = Resource::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == resource)
            .ok_or_else(err)?;
        let verb = Verb::all()
            .iter()
            .copied()
            .find(|v| v.as_str() == verb)
            .ok_or_else(err)?;

        Ok(Self { resource, verb })
    }
}

/// An immutable call against the fake API.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    kind: OperationKind,
    id: Option<u64>,
    body: Option<Map<String, Value>>,
}

impl OperationRequest {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            id: None,
            body: None,
        }
    }

    pub fn list(resource: Resource) -> Self {
        Self::new(OperationKind::new(resource, Verb::List))
    }

    pub fn get(resource: Resource, id: u64) -> Self {
        Self::new(OperationKind::new(resource, Verb::Get)).with_id(id)
    }

    pub fn create(resource: Resource, body: Map<String, Value>) -> Self {
        Self::new(OperationKind::new(resource, Verb::Create)).with_body(body)
    }

    pub fn update(resource: Resource, id: u64, body: Map<String, Value>) -> Self {
        Self::new(OperationKind::new(resource, Verb::Update))
            .with_id(id)
            .with_body(body)
    }

    pub fn patch(resource: Resource, id: u64, body: Map<String, Value>) -> Self {
        Self::new(OperationKind::new(resource, Verb::Patch))
            .with_id(id)
            .with_body(body)
    }

    pub fn delete(resource: Resource, id: u64) -> Self {
        Self::new(OperationKind::new(resource, Verb::Delete)).with_id(id)
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn resource(&self) -> Resource {
        self.kind.resource
    }

    pub fn verb(&self) -> Verb {
        self.kind.verb
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn body(&self) -> Option<&Map<String, Value>> {
        self.body.as_ref()
    }

    /// Returns a body field, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.get(name))
    }

    /// Renders the REST-style endpoint, e.g. `PUT /users/42`.
    pub fn endpoint(&self) -> String {
        let base = self.kind.resource.path();
        match self.id {
            Some(id) => format!("{} {}/{}", self.kind.verb.method(), base, id),
            None => format!("{} {}", self.kind.verb.method(), base),
        }
    }
}

/// Builds a JSON object body from `(field, value)` pairs.
pub fn body<I, K>(fields: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_kind_roundtrip_display() {
        let kind: OperationKind = "user.create".parse().unwrap();
        assert_eq!(kind, OperationKind::new(Resource::User, Verb::Create));
        assert_eq!(kind.to_string(), "user.create");
    }

    #[test]
    fn test_operation_kind_rejects_garbage() {
        assert!("user".parse::<OperationKind>().is_err());
        assert!("widget.get".parse::<OperationKind>().is_err());
        assert!("user.fly".parse::<OperationKind>().is_err());
    }

    #[test]
    fn test_success_status_per_verb() {
        assert_eq!(Verb::List.success_status(), 200);
        assert_eq!(Verb::Create.success_status(), 201);
        assert_eq!(Verb::Delete.success_status(), 204);
        assert_eq!(Verb::Patch.success_status(), 200);
    }

    #[test]
    fn test_endpoint_rendering() {
        assert_eq!(
            OperationRequest::list(Resource::User).endpoint(),
            "GET /users"
        );
        assert_eq!(
            OperationRequest::delete(Resource::Order, 101).endpoint(),
            "DELETE /orders/101"
        );
    }

    #[test]
    fn test_request_fields() {
        let request = OperationRequest::patch(
            Resource::Product,
            456,
            body([("price", json!(99.99))]),
        );
        assert_eq!(request.id(), Some(456));
        assert_eq!(request.field("price"), Some(&json!(99.99)));
        assert!(request.field("stock").is_none());
        assert_eq!(request.kind().to_string(), "product.patch");
    }
}
