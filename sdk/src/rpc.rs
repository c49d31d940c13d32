//! RPC layer: speaks the JSON-RPC-flavored convention over the transport.
//!
//! # Design
//! A pair of pure conversions around [`fetch_api`](crate::api):
//! `rpc_to_api_request` wraps the outgoing params under
//! `{jsonrpc, id, method, params}` and `api_to_rpc_response` promotes the
//! nested `result` field into the envelope's `data` slot. Errors are not
//! reclassified here — they pass through untouched while `data` is
//! reshaped.

use serde_json::{Map, Value};

use crate::envelope::{ApiRequest, ApiResponse, Method, Payload};

/// Request envelope for an RPC call: the method name and params, plus
/// everything the transport layer accepts.
#[derive(Debug, Clone, Default)]
pub struct RpcRequest {
    /// Request identifier, defaults to 1 when unset.
    pub id: Option<u64>,
    pub method: String,
    pub params: Option<Value>,
    pub api: ApiRequest,
}

/// Build the transport request for an RPC call.
///
/// The HTTP verb is forced to POST unless the caller set one explicitly.
/// Caller-supplied body fields are kept but the reserved `id`, `method`
/// and `params` keys always win. An absent or empty `params` is omitted
/// from the encoded body entirely, so no spurious `"params":{}` goes over
/// the wire.
pub fn rpc_to_api_request(rpc: RpcRequest) -> ApiRequest {
    let RpcRequest {
        id,
        method,
        params,
        mut api,
    } = rpc;

    if api.method.is_none() {
        api.method = Some(Method::Post);
    }

    let mut body = Map::new();
    body.insert("jsonrpc".to_string(), Value::String("2.0".to_string()));
    if let Some(Payload::Json(Value::Object(extra))) = api.data.take() {
        body.extend(extra);
    }
    body.insert("id".to_string(), Value::from(id.unwrap_or(1)));
    body.insert("method".to_string(), Value::String(method));
    match params {
        Some(params) if !is_empty_params(&params) => {
            body.insert("params".to_string(), params);
        }
        _ => {
            body.remove("params");
        }
    }

    api.data = Some(Payload::Json(Value::Object(body)));
    api
}

/// Promote the transport envelope's `data.result` into `data`.
///
/// An absent `result` promotes to `Value::Null`; that alone is "no
/// result", not an error.
pub fn api_to_rpc_response(mut api: ApiResponse) -> ApiResponse {
    api.data = api.data.get("result").cloned().unwrap_or(Value::Null);
    api
}

fn is_empty_params(params: &Value) -> bool {
    match params {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
