//! Request and response envelopes shared by every layer.
//!
//! # Design
//! These types describe one call as plain data. A layer composes the layer
//! below it by building that layer's request value and reshaping its
//! response value; nothing here is shared or mutated across calls, so
//! arbitrarily many calls can run concurrently without coordination.
//!
//! `ApiResponse::data` is always present (an empty JSON object by default),
//! even on error, so callers never need to null-check before reading nested
//! fields defensively.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::ApiError;

/// HTTP verb for a request. Defaults to GET when unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Delete => "delete",
            Method::Patch => "patch",
            Method::Head => "head",
        }
    }
}

/// Query parameters, accepted in any of the shapes callers commonly have
/// at hand. All variants normalize to one percent-encoded query string that
/// replaces the URL's existing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParams {
    /// An already-built query string, with or without a leading `?`.
    Raw(String),
    /// Ordered key/value pairs (repeated keys allowed).
    Pairs(Vec<(String, String)>),
    /// A plain key/value mapping.
    Map(BTreeMap<String, String>),
}

impl QueryParams {
    pub fn to_query_string(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        match self {
            QueryParams::Raw(s) => {
                let s = s.strip_prefix('?').unwrap_or(s);
                for (key, value) in form_urlencoded::parse(s.as_bytes()) {
                    ser.append_pair(&key, &value);
                }
            }
            QueryParams::Pairs(pairs) => {
                ser.extend_pairs(pairs.iter().map(|(k, v)| (k, v)));
            }
            QueryParams::Map(map) => {
                ser.extend_pairs(map.iter());
            }
        }
        ser.finish()
    }
}

/// Body payload of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Structured value, JSON-encoded by the transport layer.
    Json(Value),
    /// Binary file upload, sent unmodified as multipart form data.
    File(FileUpload),
}

/// A binary file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Multipart field name, conventionally `file`.
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Serialization-safety mode for the response envelope.
///
/// `PlainData` omits the raw response echo and the native error cause, so
/// the whole envelope can be serialized and forwarded across an execution
/// boundary (another process, a different runtime context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SerializationMode {
    #[default]
    Full,
    PlainData,
}

/// Completion callback, invoked synchronously with the final envelope on
/// every path before the call returns it.
pub type OnFetch = Arc<dyn Fn(&ApiResponse) + Send + Sync>;

/// Request envelope consumed by the transport layer.
///
/// Constructed fresh per call and never mutated after the call starts,
/// except by the layer composing it.
#[derive(Clone, Default)]
pub struct ApiRequest {
    pub url: Option<String>,
    pub query_params: Option<QueryParams>,
    pub method: Option<Method>,
    /// Caller headers, layered over computed headers (caller wins).
    pub headers: Vec<(String, String)>,
    pub data: Option<Payload>,
    /// Whether the call participates in the ambient cookie context.
    pub credentials: bool,
    pub serialization: SerializationMode,
    pub on_fetch: Option<OnFetch>,
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("url", &self.url)
            .field("query_params", &self.query_params)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("data", &self.data)
            .field("credentials", &self.credentials)
            .field("serialization", &self.serialization)
            .field("on_fetch", &self.on_fetch.as_ref().map(|_| "..."))
            .finish()
    }
}

/// Echo of the effective request, kept on the response envelope.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestSummary {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub credentials: bool,
}

/// Summarized response metadata.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseSummary {
    pub status: u16,
    pub status_text: String,
    pub body: Value,
    pub is_json: bool,
}

/// Raw request/response references underlying one exchange.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawExchange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RawRequest>,
    /// Omitted in `PlainData` mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<RawResponse>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RawRequest {
    pub method: String,
    pub headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

/// Response envelope returned by every layer.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    /// Primary data value. Always present, `{}` by default, so a populated
    /// `data` alone does not indicate success — check `error`.
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub req: Option<RequestSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub res: Option<ResponseSummary>,
    pub raw: RawExchange,
}

impl Default for ApiResponse {
    fn default() -> Self {
        Self {
            status: 0,
            data: Value::Object(Map::new()),
            error: None,
            req: None,
            res: None,
            raw: RawExchange::default(),
        }
    }
}

impl ApiResponse {
    /// Whether the call completed without any reported error.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Merge two optional JSON object values; keys from `over` win. A non-object
/// `over` replaces `base` wholesale.
pub fn merge_params(base: Option<Value>, over: Option<Value>) -> Option<Value> {
    match (base, over) {
        (Some(Value::Object(mut base)), Some(Value::Object(over))) => {
            base.extend(over);
            Some(Value::Object(base))
        }
        (base, None) => base,
        (_, over) => over,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_string_from_raw() {
        let qp = QueryParams::Raw("?a=1&b=two words".to_string());
        assert_eq!(qp.to_query_string(), "a=1&b=two+words");
    }

    #[test]
    fn query_string_from_pairs_keeps_order_and_repeats() {
        let qp = QueryParams::Pairs(vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
            ("a".to_string(), "3".to_string()),
        ]);
        assert_eq!(qp.to_query_string(), "b=2&a=1&a=3");
    }

    #[test]
    fn query_string_from_map() {
        let mut map = BTreeMap::new();
        map.insert("page".to_string(), "2".to_string());
        map.insert("q".to_string(), "bull".to_string());
        assert_eq!(QueryParams::Map(map).to_query_string(), "page=2&q=bull");
    }

    #[test]
    fn default_response_has_empty_object_data() {
        let res = ApiResponse::default();
        assert_eq!(res.data, json!({}));
        assert!(res.is_ok());
    }

    #[test]
    fn merge_params_over_wins() {
        let merged = merge_params(
            Some(json!({"a": 1, "b": 2})),
            Some(json!({"b": 9, "c": 3})),
        );
        assert_eq!(merged, Some(json!({"a": 1, "b": 9, "c": 3})));
    }

    #[test]
    fn merge_params_passes_through_missing_sides() {
        assert_eq!(merge_params(None, Some(json!({"a": 1}))), Some(json!({"a": 1})));
        assert_eq!(merge_params(Some(json!({"a": 1})), None), Some(json!({"a": 1})));
        assert_eq!(merge_params(None, None), None);
    }

    #[test]
    fn method_defaults_to_get() {
        assert_eq!(Method::default(), Method::Get);
        assert_eq!(Method::default().as_str(), "get");
    }

    #[test]
    fn envelope_serializes_to_plain_json() {
        let res = ApiResponse {
            status: 200,
            data: json!({"ok": true}),
            ..ApiResponse::default()
        };
        let value = serde_json::to_value(&res).unwrap();
        assert_eq!(value["status"], 200);
        assert_eq!(value["data"]["ok"], true);
    }
}
