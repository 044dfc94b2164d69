use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use souk_catalog::{NewProduct, Product, ProductFilter, ProductPatch, ProductStatus, ReviewVerdict};
use souk_core::Actor;

use crate::error::ApiError;
use crate::middleware::auth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub seller_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let seller = Router::new()
        .route("/", post(create_product))
        .route("/{id}", put(update_product))
        .route("/{id}", delete(delete_product))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::seller_auth_middleware,
        ));

    let review = Router::new()
        .route("/{id}/review", post(review_product))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::operator_auth_middleware,
        ));

    let public = Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::optional_auth_middleware,
        ));

    seller.merge(review).merge(public)
}

/// POST /v1/products
async fn create_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.catalog.create(actor, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /v1/products/{id}
async fn update_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(product_id): Path<Uuid>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    let product = state.catalog.update(actor, product_id, patch).await?;
    Ok(Json(product))
}

/// DELETE /v1/products/{id}
async fn delete_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete(actor, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/products/{id}/review
async fn review_product(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(product_id): Path<Uuid>,
    Json(verdict): Json<ReviewVerdict>,
) -> Result<Json<Product>, ApiError> {
    let product = state.catalog.review(actor, product_id, verdict).await?;
    Ok(Json(product))
}

/// GET /v1/products/{id}
async fn get_product(
    State(state): State<AppState>,
    Extension(auth::MaybeActor(actor)): Extension<auth::MaybeActor>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = state.catalog.get(actor, product_id).await?;
    Ok(Json(product))
}

/// GET /v1/products
async fn list_products(
    State(state): State<AppState>,
    Extension(auth::MaybeActor(actor)): Extension<auth::MaybeActor>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let filter = ProductFilter {
        seller_id: query.seller_id,
        status: query.status,
    };
    let products = state.catalog.list(actor, filter).await?;
    Ok(Json(products))
}
