use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn rpc_request(uri: &str, body: Value) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- users service ---

#[tokio::test]
async fn list_users_empty() {
    let app = app();
    let resp = app
        .oneshot(rpc_request(
            "/api-users",
            json!({"jsonrpc": "2.0", "id": 1, "method": "listUsers"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["elements"], json!([]));
    assert_eq!(body["result"]["totalElements"], 0);
}

#[tokio::test]
async fn unknown_method_answers_with_rpc_error() {
    let app = app();
    let resp = app
        .oneshot(rpc_request(
            "/api-users",
            json!({"jsonrpc": "2.0", "id": 1, "method": "nope"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body.get("result").is_none());
    assert_eq!(body["error"]["code"], -32601);
}

#[tokio::test]
async fn create_then_get_and_list() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(rpc_request(
            "/api-users",
            json!({
                "jsonrpc": "2.0", "id": 1, "method": "createUser",
                "params": {"name": "Ada", "email": "ada@example.com"}
            }),
        ))
        .await
        .unwrap();
    let created = body_json(resp).await;
    let user_nbr = created["result"]["element"]["userNbr"].as_str().unwrap().to_string();
    assert_eq!(created["result"]["element"]["name"], "Ada");

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(rpc_request(
            "/api-users",
            json!({
                "jsonrpc": "2.0", "id": 2, "method": "getUser",
                "params": {"userNbr": user_nbr}
            }),
        ))
        .await
        .unwrap();
    let fetched = body_json(resp).await;
    assert_eq!(fetched["result"]["element"]["email"], "ada@example.com");

    // list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(rpc_request(
            "/api-users",
            json!({"jsonrpc": "2.0", "id": 3, "method": "listUsers"}),
        ))
        .await
        .unwrap();
    let listed = body_json(resp).await;
    assert_eq!(listed["result"]["totalElements"], 1);
    assert_eq!(listed["result"]["elements"][0]["name"], "Ada");
}

#[tokio::test]
async fn get_missing_user_returns_result_without_element() {
    let app = app();
    let resp = app
        .oneshot(rpc_request(
            "/api-users",
            json!({
                "jsonrpc": "2.0", "id": 1, "method": "getUser",
                "params": {"userNbr": "00000000-0000-0000-0000-000000000000"}
            }),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["result"], json!({}));
}

#[tokio::test]
async fn list_users_paginates() {
    use tower::Service;

    let mut app = app().into_service();

    for i in 0..5 {
        let _ = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(rpc_request(
                "/api-users",
                json!({
                    "jsonrpc": "2.0", "id": 1, "method": "createUser",
                    "params": {"name": format!("user-{i}"), "email": format!("u{i}@example.com")}
                }),
            ))
            .await
            .unwrap();
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(rpc_request(
            "/api-users",
            json!({
                "jsonrpc": "2.0", "id": 2, "method": "listUsers",
                "params": {"paginator": {"page": 2, "pageSize": 2}}
            }),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["result"]["totalElements"], 5);
    assert_eq!(body["result"]["elements"].as_array().unwrap().len(), 2);
    assert_eq!(body["result"]["elements"][0]["name"], "user-2");
}

// --- transport exercise routes ---

#[tokio::test]
async fn echo_returns_received_body_as_result() {
    let app = app();
    let resp = app
        .oneshot(rpc_request(
            "/echo",
            json!({"jsonrpc": "2.0", "id": 7, "method": "ping"}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["id"], 7);
    assert_eq!(body["result"]["method"], "ping");
}

#[tokio::test]
async fn upload_echoes_received_file_unmodified() {
    let app = app();
    let boundary = "XBOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         content-disposition: form-data; name=\"file\"; filename=\"report.csv\"\r\n\
         content-type: text/csv\r\n\r\n\
         a,b\n1,2\n\r\n\
         --{boundary}--\r\n"
    );
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    http::header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let part = &body["received"][0];
    assert_eq!(part["field"], "file");
    assert_eq!(part["fileName"], "report.csv");
    assert_eq!(part["contentType"], "text/csv");
    assert_eq!(part["content"], "a,b\n1,2\n");
    assert_eq!(part["size"], 8);
}

#[tokio::test]
async fn text_route_is_plain_text() {
    let app = app();
    let resp = app
        .oneshot(Request::builder().uri("/text").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "text/plain"
    );
    assert_eq!(&body_bytes(resp).await[..], b"pong");
}

#[tokio::test]
async fn bad_json_route_advertises_json_but_is_not() {
    let app = app();
    let resp = app
        .oneshot(Request::builder().uri("/bad-json").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "application/json"
    );
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&bytes).is_err());
}

#[tokio::test]
async fn fail_route_returns_500_with_json_body() {
    let app = app();
    let resp = app
        .oneshot(Request::builder().uri("/fail").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "simulated failure");
}
