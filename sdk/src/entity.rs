//! Entity shaping layer: ergonomic views over generic RPC results.
//!
//! # Design
//! The backend returns single business objects under a generic `element`
//! field and collections under `elements` + `totalElements`. These
//! conversions republish them at the top level as `entity`, or `entities`
//! plus `total_entities`, while preserving the full envelope (with the
//! renamed fields inside `data`) for callers that need it.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::envelope::ApiResponse;

/// Envelope for a single-entity call.
#[derive(Debug, Clone, Serialize)]
pub struct EntityResponse {
    /// The extracted entity. An empty object when the result carried no
    /// `element`, so callers can read nested fields without null checks.
    pub entity: Value,
    /// The underlying envelope; `data` holds `{entity, ...other result
    /// fields}`.
    pub response: ApiResponse,
}

impl EntityResponse {
    pub fn is_ok(&self) -> bool {
        self.response.is_ok()
    }

    /// Deserialize the entity into a typed value.
    pub fn entity_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.entity.clone())
    }
}

/// Envelope for an entity-list call.
#[derive(Debug, Clone, Serialize)]
pub struct EntityListResponse {
    /// The extracted page of entities, empty when the result carried none.
    pub entities: Vec<Value>,
    pub total_entities: u64,
    /// The underlying envelope; `data` holds `{entities, totalElements,
    /// ...other result fields}`.
    pub response: ApiResponse,
}

impl EntityListResponse {
    pub fn is_ok(&self) -> bool {
        self.response.is_ok()
    }

    /// Deserialize the page into typed values.
    pub fn entities_as<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        serde_json::from_value(Value::Array(self.entities.clone()))
    }
}

/// Promote `element` out of an RPC result envelope.
pub fn into_entity_response(mut response: ApiResponse) -> EntityResponse {
    let (element, rest) = split_field(std::mem::take(&mut response.data), "element");
    let entity = match element {
        Some(Value::Null) | None => Value::Object(Map::new()),
        Some(value) => value,
    };

    let mut data = Map::new();
    data.insert("entity".to_string(), entity.clone());
    data.extend(rest);
    response.data = Value::Object(data);

    EntityResponse { entity, response }
}

/// Promote `elements` and `totalElements` out of an RPC result envelope.
pub fn into_entity_list_response(mut response: ApiResponse) -> EntityListResponse {
    let (elements, rest) = split_field(std::mem::take(&mut response.data), "elements");
    let entities = match elements {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let total_entities = rest
        .get("totalElements")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let mut data = Map::new();
    data.insert("entities".to_string(), Value::Array(entities.clone()));
    data.extend(rest);
    response.data = Value::Object(data);

    EntityListResponse {
        entities,
        total_entities,
        response,
    }
}

/// Pull one field out of an object value; non-object data yields nothing.
fn split_field(data: Value, field: &str) -> (Option<Value>, Map<String, Value>) {
    match data {
        Value::Object(mut map) => {
            let value = map.remove(field);
            (value, map)
        }
        _ => (None, Map::new()),
    }
}
