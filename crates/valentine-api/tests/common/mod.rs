use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header::CONTENT_TYPE};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use valentine_api::{AppState, AppStateInner, build_router};
use valentine_db::Database;
use valentine_gateway::dispatcher::Dispatcher;

/// Router over a fresh in-memory database. The state is returned so tests
/// can reach the dispatcher.
pub fn build_test_app() -> (Router, AppState) {
    let db = Database::open_in_memory().expect("in-memory database");
    let state = AppStateInner::new(db, Dispatcher::new());
    (build_router(state.clone()), state)
}

pub fn sam_to_lee() -> Value {
    serde_json::json!({
        "sender_name": "Sam",
        "recipient_name": "Lee",
        "message": "Hi",
        "gift": "🌹 Red Rose Bouquet",
        "theme": "classic_romance",
        "music": "midnight_glow",
        "accepted": false
    })
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
