//! Endpoint factories: specialized callers for one service + method pair.
//!
//! # Design
//! An [`Endpoint`] bakes a service and method name into a small value so
//! call sites pass only the method's params. The optional override request
//! can change anything else; per-call params take precedence over params
//! baked into the override. This is a convenience layer, not new behavior.

use serde_json::Value;

use crate::bull::BullRequest;
use crate::client::BullClient;
use crate::entity::{EntityListResponse, EntityResponse};
use crate::envelope::{merge_params, ApiResponse};

/// A fixed service/method pair, callable with just params.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub service: String,
    pub method: String,
}

impl Endpoint {
    pub fn new(service: &str, method: &str) -> Self {
        Self {
            service: service.to_string(),
            method: method.to_string(),
        }
    }

    /// Compose the full request from per-call params and an optional
    /// override. Empty service/method fields on the override fall back to
    /// the endpoint's own.
    fn compose(&self, params: Option<Value>, overrides: Option<BullRequest>) -> BullRequest {
        let mut req = overrides.unwrap_or_default();
        if req.service.is_empty() {
            req.service = self.service.clone();
        }
        if req.rpc.method.is_empty() {
            req.rpc.method = self.method.clone();
        }
        req.rpc.params = merge_params(req.rpc.params.take(), params);
        req
    }

    /// Call the endpoint, returning the RPC-shaped envelope.
    pub async fn call(
        &self,
        client: &BullClient,
        params: Option<Value>,
        overrides: Option<BullRequest>,
    ) -> ApiResponse {
        client.fetch_bull(self.compose(params, overrides)).await
    }

    /// Call the endpoint and shape the result as a single entity.
    pub async fn call_entity(
        &self,
        client: &BullClient,
        params: Option<Value>,
        overrides: Option<BullRequest>,
    ) -> EntityResponse {
        client.fetch_entity(self.compose(params, overrides)).await
    }

    /// Call the endpoint and shape the result as an entity list.
    pub async fn call_list(
        &self,
        client: &BullClient,
        params: Option<Value>,
        overrides: Option<BullRequest>,
    ) -> EntityListResponse {
        client
            .fetch_entity_list(self.compose(params, overrides))
            .await
    }
}
