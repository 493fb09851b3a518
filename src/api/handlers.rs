use std::sync::MutexGuard;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::{error::AppError, AppState};
use crate::execution::TradingEngine;
use crate::models::{
    ConnectionRequest, ConnectionResponse, HealthResponse, MarketSnapshot, Order,
    OrderActionResponse, OrderRequest,
};

/// Every handler runs its whole engine call under this one guard.
fn engine(state: &AppState) -> Result<MutexGuard<'_, TradingEngine>, AppError> {
    state
        .engine
        .lock()
        .map_err(|_| AppError::Internal("trading engine lock poisoned".to_string()))
}

/// # GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// # POST /connect
pub async fn connect(
    State(state): State<AppState>,
    Json(payload): Json<ConnectionRequest>,
) -> Result<Json<ConnectionResponse>, AppError> {
    let response = engine(&state)?.connect(&payload)?;
    Ok(Json(response))
}

/// # POST /disconnect
pub async fn disconnect(
    State(state): State<AppState>,
) -> Result<Json<ConnectionResponse>, AppError> {
    Ok(Json(engine(&state)?.disconnect()))
}

/// # GET /market/:symbol
pub async fn market_snapshot(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MarketSnapshot>, AppError> {
    let snapshot = engine(&state)?.analyze_market(&symbol)?;
    Ok(Json(snapshot))
}

/// # POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<OrderRequest>,
) -> Result<Json<OrderActionResponse>, AppError> {
    let order = engine(&state)?.place_order(&payload)?;
    Ok(Json(OrderActionResponse { order }))
}

/// # GET /orders
/// Most recently created first.
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(engine(&state)?.list_orders()))
}

/// # GET /orders/:order_id
pub async fn get_order(
    Path(order_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OrderActionResponse>, AppError> {
    let order = engine(&state)?.get_order(&order_id)?;
    Ok(Json(OrderActionResponse { order }))
}

/// # POST /orders/:order_id/monitor
/// Re-evaluates the order against a fresh snapshot of its own symbol.
pub async fn monitor_order(
    Path(order_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OrderActionResponse>, AppError> {
    let order = engine(&state)?.monitor_order(&order_id)?;
    Ok(Json(OrderActionResponse { order }))
}

/// # POST /orders/:order_id/cancel
pub async fn cancel_order(
    Path(order_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OrderActionResponse>, AppError> {
    let order = engine(&state)?.cancel_order(&order_id)?;
    Ok(Json(OrderActionResponse { order }))
}
