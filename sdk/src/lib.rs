//! Client SDK for the Bull backend: layered helpers over one HTTP fetch.
//!
//! # Overview
//! Four layers, each consuming the one below it and reshaping its
//! request/response envelope:
//! - transport ([`BullClient::fetch_api`]): URL building, JSON encoding,
//!   response normalization; every failure lands in the envelope's `error`
//!   slot, never as an `Err`;
//! - RPC ([`BullClient::fetch_rpc`]): wraps params under
//!   `{jsonrpc, id, method, params}`, promotes `result` into `data`;
//! - service calls ([`BullClient::fetch_bull`]): base-URL defaulting for a
//!   named service, credentials always included;
//! - entity shaping ([`BullClient::fetch_entity`],
//!   [`BullClient::fetch_entity_list`]): `element`/`elements` republished
//!   as `entity`/`entities` + `total_entities`.
//!
//! # Design
//! - Envelopes are plain data, built fresh per call and threaded through
//!   the stack by value; nothing outlives one invocation.
//! - Layer composition is done by small conversion functions
//!   ([`rpc_to_api_request`], [`bull_to_rpc_request`], ...), each testable
//!   without touching the network.
//! - Payloads and results are `serde_json::Value`, with typed extraction
//!   helpers on the entity envelopes.
//! - No retry, timeout, or cancellation: callers impose those externally.

mod api;

pub mod bull;
pub mod client;
pub mod endpoint;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod rpc;

pub use bull::{bull_to_rpc_request, BullConfig, BullRequest, DEFAULT_BASE_URL};
pub use client::BullClient;
pub use endpoint::Endpoint;
pub use entity::{
    into_entity_list_response, into_entity_response, EntityListResponse, EntityResponse,
};
pub use envelope::{
    merge_params, ApiRequest, ApiResponse, FileUpload, Method, OnFetch, Payload, QueryParams,
    RawExchange, RawRequest, RawResponse, RequestSummary, ResponseSummary, SerializationMode,
};
pub use error::{ApiError, ErrorCode};
pub use rpc::{api_to_rpc_response, rpc_to_api_request, RpcRequest};
