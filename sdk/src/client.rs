//! The Bull API client: one value composing all four layers.
//!
//! # Design
//! `BullClient` holds only the reqwest client (with its cookie jar) and
//! the service-layer configuration; it carries no mutable state between
//! calls. Each method is a single-shot round trip: compose the request for
//! the layer below, await the transport, reshape the response. Concurrent
//! calls share nothing mutable, so no coordination is needed.

use reqwest::Client;

use crate::api;
use crate::bull::{bull_to_rpc_request, BullConfig, BullRequest};
use crate::endpoint::Endpoint;
use crate::entity::{
    into_entity_list_response, into_entity_response, EntityListResponse, EntityResponse,
};
use crate::envelope::{ApiRequest, ApiResponse};
use crate::rpc::{api_to_rpc_response, rpc_to_api_request, RpcRequest};

/// Client for the Bull backend and for raw transport calls.
#[derive(Debug, Clone)]
pub struct BullClient {
    http: Client,
    config: BullConfig,
}

impl Default for BullClient {
    fn default() -> Self {
        Self::new(BullConfig::default())
    }
}

impl BullClient {
    /// Build a client for the configured backend. The cookie store is
    /// enabled so service-layer calls participate in the ambient cookie
    /// context.
    pub fn new(config: BullConfig) -> Self {
        // The builder only fails on a broken TLS backend; a fallback
        // client would come without the cookie jar.
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .expect("reqwest client");
        Self { http, config }
    }

    pub fn config(&self) -> &BullConfig {
        &self.config
    }

    /// Transport layer: execute one request envelope. Never fails past the
    /// envelope boundary.
    pub async fn fetch_api(&self, req: ApiRequest) -> ApiResponse {
        api::fetch_api(&self.http, req).await
    }

    /// RPC layer: wrap params in the JSON-RPC envelope, promote `result`
    /// into `data` on the way back.
    pub async fn fetch_rpc(&self, req: RpcRequest) -> ApiResponse {
        let res = self.fetch_api(rpc_to_api_request(req)).await;
        api_to_rpc_response(res)
    }

    /// Service-call layer: default the URL from the configured base and
    /// the service name, then delegate to the RPC layer.
    pub async fn fetch_bull(&self, req: BullRequest) -> ApiResponse {
        self.fetch_rpc(bull_to_rpc_request(&self.config, req)).await
    }

    /// Single-entity call: `element` promoted to a top-level `entity`.
    pub async fn fetch_entity(&self, req: BullRequest) -> EntityResponse {
        into_entity_response(self.fetch_bull(req).await)
    }

    /// Entity-list call: `elements`/`totalElements` promoted to top-level
    /// `entities`/`total_entities`.
    pub async fn fetch_entity_list(&self, req: BullRequest) -> EntityListResponse {
        into_entity_list_response(self.fetch_bull(req).await)
    }

    /// Specialized caller for a fixed service/method pair.
    pub fn endpoint(&self, service: &str, method: &str) -> Endpoint {
        Endpoint::new(service, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_client_targets_the_default_backend() {
        let client = BullClient::default();
        assert_eq!(client.config().base_url, "https://api.bullbitcoin.com/");
    }

    #[test]
    fn endpoint_carries_service_and_method() {
        let client = BullClient::default();
        let endpoint = client.endpoint("users", "getUser");
        assert_eq!(endpoint.service, "users");
        assert_eq!(endpoint.method, "getUser");
    }
}
