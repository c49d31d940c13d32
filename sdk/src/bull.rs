//! Service-call layer: targets one named Bull backend service.
//!
//! # Design
//! The only responsibilities here are URL defaulting and marking the call
//! as authenticated. Params are forwarded unchanged; the RPC layer does the
//! envelope wrapping. Configuration is an explicit value handed to the
//! client, not ambient process state.

use url::Url;

use crate::rpc::RpcRequest;

/// Default backend when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.bullbitcoin.com/";

/// Configuration for the service-call layer.
#[derive(Debug, Clone)]
pub struct BullConfig {
    /// Base URL the per-service endpoint path is joined onto.
    pub base_url: String,
}

impl Default for BullConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl BullConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

/// Request envelope for a Bull service call.
#[derive(Debug, Clone, Default)]
pub struct BullRequest {
    /// Target service; the endpoint path is `api-<service>`. An empty
    /// service name targets the bare base URL.
    pub service: String,
    pub rpc: RpcRequest,
}

/// Resolve the target URL and mark the call as authenticated.
///
/// An explicit URL on the request is used verbatim. Otherwise the
/// configured base URL is joined with the service path; if the base fails
/// to parse, the unresolvable string is passed through so the transport
/// layer reports it as an invalid-URL envelope instead of this layer
/// failing.
pub fn bull_to_rpc_request(config: &BullConfig, bull: BullRequest) -> RpcRequest {
    let BullRequest { service, mut rpc } = bull;

    // This call always participates in the ambient cookie context.
    rpc.api.credentials = true;

    let explicit = rpc.api.url.as_deref().is_some_and(|url| !url.is_empty());
    if !explicit {
        rpc.api.url = Some(resolve_url(&config.base_url, &service));
    }

    rpc
}

fn resolve_url(base_url: &str, service: &str) -> String {
    let joined = Url::parse(base_url).and_then(|base| {
        if service.is_empty() {
            Ok(base)
        } else {
            base.join(&format!("api-{service}"))
        }
    });
    match joined {
        Ok(url) => url.to_string(),
        Err(_) => base_url.to_string(),
    }
}
