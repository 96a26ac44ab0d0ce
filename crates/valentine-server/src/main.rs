use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::{HeaderValue, Method, header::CONTENT_TYPE};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use valentine_api::{AppStateInner, build_router};
use valentine_gateway::dispatcher::Dispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valentine=debug,valentine_api=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("VALENTINE_DB_PATH").unwrap_or_else(|_| "valentine.db".into());
    let host = std::env::var("VALENTINE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("VALENTINE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let cors_origin = std::env::var("VALENTINE_CORS_ORIGIN").ok();

    // Init database
    let db = valentine_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state = AppStateInner::new(db, Dispatcher::new());

    let cors = match cors_origin {
        Some(origin) => {
            info!("CORS restricted to {}", origin);
            CorsLayer::new()
                .allow_origin(AllowOrigin::exact(HeaderValue::from_str(&origin)?))
                .allow_methods([Method::GET, Method::POST, Method::PATCH])
                .allow_headers([CONTENT_TYPE])
        }
        None => CorsLayer::permissive(),
    };

    let app = build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Valentine record store listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
