use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::execution::TradingEngine;

pub mod error;
pub mod handlers;

pub use error::AppError;

/// Shared state handed to every handler.
///
/// The engine sits behind a single mutex so concurrent requests cannot
/// interleave their get-mutate-store sequences on the order book.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<TradingEngine>>,
}

impl AppState {
    pub fn new(engine: TradingEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/connect", post(handlers::connect))
        .route("/disconnect", post(handlers::disconnect))
        .route("/market/:symbol", get(handlers::market_snapshot))
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route("/orders/:order_id", get(handlers::get_order))
        .route("/orders/:order_id/monitor", post(handlers::monitor_order))
        .route("/orders/:order_id/cancel", post(handlers::cancel_order))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve the API until Ctrl+C
pub async fn run_server(addr: SocketAddr, engine: TradingEngine) -> anyhow::Result<()> {
    let app = router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
            tracing::info!("Received Ctrl+C, shutting down...");
        })
        .await?;

    Ok(())
}
