//! Transport layer: executes one HTTP round trip and normalizes the result.
//!
//! # Design
//! `fetch_api` never fails past its boundary — every failure is captured and
//! reported inside the envelope's `error` slot with a classification code:
//! - missing or empty URL: status 404, `ERR_NO_URL`;
//! - unparseable URL: status 404, `ERR_INVALID_URL`;
//! - the request never completed: status 500, wrapped transport error;
//! - non-2xx response: `ERR_NETWORK` with the real HTTP status, `data`
//!   still populated with whatever body was returned;
//! - body read/parse failure after a completed exchange: status 200 plus
//!   an error (distinguished from the network-failure path by its default
//!   status code).

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::envelope::{
    ApiRequest, ApiResponse, Method, OnFetch, Payload, QueryParams, RawRequest, RawResponse,
    RequestSummary, ResponseSummary, SerializationMode,
};
use crate::error::{ApiError, ErrorCode};

/// Execute a request envelope and return the normalized response envelope.
pub(crate) async fn fetch_api(http: &Client, req: ApiRequest) -> ApiResponse {
    let mode = req.serialization;
    let on_fetch = req.on_fetch.clone();
    let mut envelope = ApiResponse::default();

    // URL handling comes first; both failure modes report 404.
    let url = match build_url(req.url.as_deref(), req.query_params.as_ref()) {
        Ok(url) => url,
        Err(error) => {
            envelope.status = 404;
            envelope.error = Some(error);
            return finish(&on_fetch, envelope);
        }
    };

    let method = req.method.unwrap_or_default();
    let headers = build_headers(req.data.as_ref(), &req.headers);
    let body_text = match encode_body(req.data.as_ref()) {
        Ok(body) => body,
        Err(source) => {
            envelope.status = 500;
            envelope.error = Some(ApiError::from_source(source, mode));
            return finish(&on_fetch, envelope);
        }
    };

    envelope.req = Some(RequestSummary {
        url: url.to_string(),
        method: method.as_str().to_string(),
        headers: headers.clone(),
        credentials: req.credentials,
    });
    envelope.raw.url = Some(url.to_string());
    envelope.raw.request = Some(RawRequest {
        method: method.as_str().to_string(),
        headers: headers.clone(),
        body: body_text.clone(),
    });

    let mut builder = http.request(as_reqwest_method(method), url.clone());
    for (name, value) in &headers {
        builder = builder.header(name, value);
    }
    builder = match (&req.data, body_text) {
        (Some(Payload::File(file)), _) => {
            let part = match Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
            {
                Ok(part) => part,
                Err(source) => {
                    envelope.status = 500;
                    envelope.error = Some(ApiError::from_source(source, mode));
                    return finish(&on_fetch, envelope);
                }
            };
            builder.multipart(Form::new().part(file.field.clone(), part))
        }
        (_, Some(body)) => builder.body(body),
        _ => builder,
    };

    let response = match builder.send().await {
        Ok(response) => response,
        Err(source) => {
            envelope.status = 500;
            envelope.error = Some(ApiError::from_source(source, mode));
            return finish(&on_fetch, envelope);
        }
    };

    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or("").to_string();
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    if mode == SerializationMode::Full {
        envelope.raw.response = Some(RawResponse {
            status: status.as_u16(),
            headers: response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect(),
        });
    }

    let text = match response.text().await {
        Ok(text) => text,
        Err(source) => {
            envelope.status = 200;
            envelope.error = Some(ApiError::from_source(source, mode));
            return finish(&on_fetch, envelope);
        }
    };

    let body: Value = if is_json {
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(source) => {
                envelope.status = 200;
                envelope.error = Some(ApiError::from_source(source, mode));
                return finish(&on_fetch, envelope);
            }
        }
    } else {
        Value::String(text)
    };

    if !status.is_success() {
        envelope.error = Some(
            ApiError::new("Network Error", &status_text, ErrorCode::Network)
                .with_status(status.as_u16()),
        );
    }

    envelope.res = Some(ResponseSummary {
        status: status.as_u16(),
        status_text,
        body: body.clone(),
        is_json,
    });
    envelope.data = body;
    // A body carrying its own numeric status takes precedence over the
    // HTTP status.
    envelope.status = body_status(&envelope.data).unwrap_or_else(|| status.as_u16());

    debug!(url = %url, status = envelope.status, is_json, ok = envelope.is_ok(), "fetch completed");

    finish(&on_fetch, envelope)
}

/// Invoke the completion callback (if any) with the final envelope, then
/// hand the envelope back. A panicking callback propagates to the caller.
fn finish(on_fetch: &Option<OnFetch>, envelope: ApiResponse) -> ApiResponse {
    if let Some(callback) = on_fetch {
        callback(&envelope);
    }
    envelope
}

/// Parse the target URL and splice the query parameters in, replacing any
/// query string already present on the URL.
fn build_url(url: Option<&str>, query: Option<&QueryParams>) -> Result<Url, ApiError> {
    let raw = match url {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(ApiError::new("URL", "Undefined URL", ErrorCode::NoUrl)),
    };
    let mut parsed =
        Url::parse(raw).map_err(|_| ApiError::new("URL", "Invalid URL", ErrorCode::InvalidUrl))?;
    if let Some(query) = query {
        let qs = query.to_query_string();
        parsed.set_query(if qs.is_empty() { None } else { Some(&qs) });
    }
    Ok(parsed)
}

/// Computed headers first, caller headers layered over them (caller wins,
/// names compared case-insensitively). A JSON payload contributes a
/// `content-type` header; a file upload does not (the multipart encoder
/// sets its own).
fn build_headers(data: Option<&Payload>, caller: &[(String, String)]) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();
    if matches!(data, Some(Payload::Json(_))) {
        headers.push(("content-type".to_string(), "application/json".to_string()));
    }
    for (name, value) in caller {
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        headers.push((name.clone(), value.clone()));
    }
    headers
}

/// JSON-encode a structured payload. File uploads carry no text body.
fn encode_body(data: Option<&Payload>) -> Result<Option<String>, serde_json::Error> {
    match data {
        Some(Payload::Json(value)) => Ok(Some(serde_json::to_string(value)?)),
        _ => Ok(None),
    }
}

/// Envelope status prefers a nonzero numeric `status` field inside the
/// parsed body over the HTTP status.
fn body_status(data: &Value) -> Option<u16> {
    data.get("status")
        .and_then(Value::as_u64)
        .filter(|&status| status != 0 && status <= u16::MAX as u64)
        .map(|status| status as u16)
}

fn as_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Head => reqwest::Method::HEAD,
    }
}
