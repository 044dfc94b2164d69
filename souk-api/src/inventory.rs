use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use souk_catalog::Product;
use souk_core::Actor;

use crate::error::ApiError;
use crate::middleware::auth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub adjustment: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateThresholdRequest {
    pub threshold: i64,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let seller = Router::new()
        .route("/{id}/adjustment", post(adjust_stock))
        .route("/{id}/stock", put(set_stock))
        .route("/{id}/low-stock-threshold", put(update_threshold))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::seller_auth_middleware,
        ));

    let reporting = Router::new()
        .route("/low-stock", get(list_low_stock))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::seller_or_operator_auth_middleware,
        ));

    seller.merge(reporting)
}

/// POST /v1/inventory/{id}/adjustment
async fn adjust_stock(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<Product>, ApiError> {
    let product = state.stock.adjust(actor, product_id, req.adjustment).await?;
    Ok(Json(product))
}

/// PUT /v1/inventory/{id}/stock
async fn set_stock(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<SetStockRequest>,
) -> Result<Json<Product>, ApiError> {
    let product = state.stock.set(actor, product_id, req.quantity).await?;
    Ok(Json(product))
}

/// PUT /v1/inventory/{id}/low-stock-threshold
async fn update_threshold(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<UpdateThresholdRequest>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .stock
        .update_low_stock_threshold(actor, product_id, req.threshold)
        .await?;
    Ok(Json(product))
}

/// GET /v1/inventory/low-stock
async fn list_low_stock(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.stock.list_low_stock(actor).await?;
    Ok(Json(products))
}
