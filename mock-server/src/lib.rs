//! In-memory stand-in for the Bull backend, used by the SDK's tests.
//!
//! Speaks the backend's JSON-RPC convention on `POST /api-users` over an
//! in-memory user store, and exposes a few plain HTTP routes that exercise
//! the transport layer's non-JSON and failure paths.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_nbr: Uuid,
    pub name: String,
    pub email: String,
}

/// One JSON-RPC call as received on the wire.
#[derive(Debug, Deserialize)]
pub struct RpcCall {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, User>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api-users", post(users_rpc))
        .route("/echo", post(echo_rpc))
        .route("/upload", post(upload))
        .route("/text", get(text_body))
        .route("/bad-json", get(bad_json))
        .route("/fail", get(fail))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// JSON-RPC dispatch for the `users` service.
async fn users_rpc(State(db): State<Db>, Json(call): Json<RpcCall>) -> Json<Value> {
    let params = call.params.unwrap_or(Value::Null);
    let result = match call.method.as_str() {
        "createUser" => create_user(&db, &params).await,
        "getUser" => get_user(&db, &params).await,
        "listUsers" => Some(list_users(&db, &params).await),
        _ => None,
    };

    match result {
        Some(result) => Json(json!({"jsonrpc": "2.0", "id": call.id, "result": result})),
        None => Json(json!({
            "jsonrpc": "2.0",
            "id": call.id,
            "error": {"code": -32601, "message": "Method not found"}
        })),
    }
}

async fn create_user(db: &Db, params: &Value) -> Option<Value> {
    let name = params.get("name")?.as_str()?.to_string();
    let email = params.get("email")?.as_str()?.to_string();
    let user = User {
        user_nbr: Uuid::new_v4(),
        name,
        email,
    };
    db.write().await.insert(user.user_nbr, user.clone());
    Some(json!({"element": user}))
}

async fn get_user(db: &Db, params: &Value) -> Option<Value> {
    let user_nbr: Uuid = params.get("userNbr")?.as_str()?.parse().ok()?;
    let users = db.read().await;
    // A missing user still answers with a result, just without an element.
    match users.get(&user_nbr) {
        Some(user) => Some(json!({"element": user})),
        None => Some(json!({})),
    }
}

async fn list_users(db: &Db, params: &Value) -> Value {
    let users = db.read().await;
    let mut all: Vec<User> = users.values().cloned().collect();
    all.sort_by(|a, b| a.name.cmp(&b.name));

    if let Some(name) = params
        .get("filters")
        .and_then(|f| f.get("name"))
        .and_then(Value::as_str)
    {
        all.retain(|user| user.name.contains(name));
    }

    let total = all.len();
    let paginator = params.get("paginator").cloned().unwrap_or(Value::Null);
    let avoid = paginator.get("avoid").and_then(Value::as_bool).unwrap_or(false);
    if !avoid {
        let page = paginator.get("page").and_then(Value::as_u64).unwrap_or(1).max(1) as usize;
        let page_size = paginator.get("pageSize").and_then(Value::as_u64).unwrap_or(10) as usize;
        all = all
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();
    }

    json!({"elements": all, "totalElements": total})
}

/// Echoes the received body back under `result`, letting tests assert the
/// exact outgoing wire shape.
async fn echo_rpc(Json(body): Json<Value>) -> Json<Value> {
    let id = body.get("id").cloned().unwrap_or(Value::Null);
    Json(json!({"jsonrpc": "2.0", "id": id, "result": body}))
}

/// Echoes every received multipart part back, content included, letting
/// tests assert an uploaded file arrived unmodified.
async fn upload(mut multipart: Multipart) -> Json<Value> {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let bytes = field.bytes().await.unwrap_or_default();
        parts.push(json!({
            "field": name,
            "fileName": file_name,
            "contentType": content_type,
            "size": bytes.len(),
            "content": String::from_utf8_lossy(&bytes),
        }));
    }
    Json(json!({"received": parts}))
}

async fn text_body() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "pong")
}

async fn bad_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{not json")
}

async fn fail() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"message": "simulated failure"})),
    )
}
