use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use souk_core::{Actor, Role};

use crate::state::AppState;

/// JWT claims issued by the identity service: subject is the user id,
/// role is one of the marketplace roles.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

fn authenticate(state: &AppState, req: &Request) -> Result<Actor, StatusCode> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| StatusCode::UNAUTHORIZED)?;
    let role = Role::from_str(&token_data.claims.role).map_err(|_| StatusCode::UNAUTHORIZED)?;
    Ok(Actor::new(id, role))
}

pub async fn buyer_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let actor = authenticate(&state, &req)?;
    if actor.role != Role::Buyer {
        return Err(StatusCode::FORBIDDEN);
    }
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

pub async fn seller_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let actor = authenticate(&state, &req)?;
    if actor.role != Role::Seller {
        return Err(StatusCode::FORBIDDEN);
    }
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

pub async fn operator_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let actor = authenticate(&state, &req)?;
    if !actor.is_operator() {
        return Err(StatusCode::FORBIDDEN);
    }
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

/// Sellers manage their own catalog; operators oversee every catalog.
pub async fn seller_or_operator_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let actor = authenticate(&state, &req)?;
    if actor.role != Role::Seller && !actor.is_operator() {
        return Err(StatusCode::FORBIDDEN);
    }
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

/// Any authenticated identity; fine-grained checks live in the engines.
pub async fn any_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let actor = authenticate(&state, &req)?;
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

/// Identity on routes that are public but role-widened: present when the
/// request carried a valid token, `None` otherwise.
#[derive(Debug, Clone, Copy)]
pub struct MaybeActor(pub Option<Actor>);

/// Public routes with role-widened visibility: a valid token enriches the
/// request, an absent or invalid one leaves it anonymous.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let actor = authenticate(&state, &req).ok();
    req.extensions_mut().insert(MaybeActor(actor));
    next.run(req).await
}
