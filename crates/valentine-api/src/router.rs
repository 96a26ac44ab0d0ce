use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};

use valentine_gateway::connection;

use crate::state::AppState;
use crate::{health, requests};

/// All Record Store routes. Transport layers (CORS, tracing) are added by the binary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/requests", axum::routing::post(requests::create_request))
        .route(
            "/requests/{request_id}",
            get(requests::get_request).patch(requests::update_request),
        )
        .route("/requests/{request_id}/status", get(requests::get_status))
        .route("/gateway", get(ws_upgrade))
        .with_state(state)
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let dispatcher = state.dispatcher.clone();
    ws.on_upgrade(move |socket| connection::handle_connection(socket, dispatcher))
}
