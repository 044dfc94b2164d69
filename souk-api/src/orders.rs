use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use souk_core::Actor;
use souk_order::{CartLine, Order, OrderStatus};

use crate::error::ApiError;
use crate::middleware::auth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<CartLine>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let buyer = Router::new()
        .route("/", post(place_order).get(list_my_orders))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::buyer_auth_middleware,
        ));

    // Ownership and the operator plane are enforced by the lifecycle
    // engine; the middleware only establishes identity.
    let shared = Router::new()
        .route("/{id}", get(get_order))
        .route("/{id}/status", patch(update_order_status))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::any_auth_middleware,
        ));

    buyer.merge(shared)
}

pub fn seller_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_seller_orders))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::seller_auth_middleware,
        ))
}

/// POST /v1/orders
///
/// Turns the buyer's cart into one order per seller, reserving stock
/// atomically across all of them.
async fn place_order(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Vec<Order>>), ApiError> {
    let orders = state.placement.place_order(actor.id, &req.items).await?;
    Ok((StatusCode::CREATED, Json(orders)))
}

/// GET /v1/orders
async fn list_my_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.lifecycle.buyer_orders(actor.id).await?;
    Ok(Json(orders))
}

/// GET /v1/orders/{id}
async fn get_order(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let order = state.lifecycle.order_details(actor, order_id).await?;
    Ok(Json(order))
}

/// PATCH /v1/orders/{id}/status
async fn update_order_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .lifecycle
        .update_status(actor, order_id, req.status)
        .await?;
    Ok(Json(order))
}

/// GET /v1/seller/orders
async fn list_seller_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state.lifecycle.seller_orders(actor.id).await?;
    Ok(Json(orders))
}
