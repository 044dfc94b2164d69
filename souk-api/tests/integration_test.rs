use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use souk_api::middleware::auth::Claims;
use souk_api::{app, AppState, AuthConfig};
use souk_catalog::repository::CatalogStore;
use souk_catalog::{Product, ProductStatus};
use souk_store::MemoryStore;

const SECRET: &str = "integration-test-secret";

struct TestApp {
    router: axum::Router,
    store: Arc<MemoryStore>,
}

fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store.clone(),
        store.clone(),
        AuthConfig {
            secret: SECRET.to_string(),
            expiration: 3600,
        },
    );
    TestApp {
        router: app(state),
        store,
    }
}

fn token(user_id: Uuid, role: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn request(method: &str, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header("Authorization", format!("Bearer {bearer}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn seed_product(store: &MemoryStore, seller_id: Uuid, quantity: i64) -> Product {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        seller_id,
        name: "Seeded product".to_string(),
        description: None,
        price_cents: 2_500,
        quantity,
        low_stock_threshold: 5,
        status: ProductStatus::Approved,
        rejection_reason: None,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    };
    store.insert_product(&product).await.unwrap();
    product
}

#[tokio::test]
async fn placing_a_cart_returns_created_orders() {
    let t = test_app();
    let seller_id = Uuid::new_v4();
    let product = seed_product(&t.store, seller_id, 10).await;
    let buyer_id = Uuid::new_v4();

    let response = t
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/orders",
            Some(&token(buyer_id, "BUYER")),
            Some(json!({ "items": [{ "product_id": product.id, "quantity": 3 }] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["seller_id"], json!(seller_id));
    assert_eq!(orders[0]["status"], "NEW");
    assert_eq!(orders[0]["payment_status"], "PENDING");
    assert_eq!(orders[0]["total_cents"], 7_500);
}

#[tokio::test]
async fn oversized_cart_is_a_conflict_with_a_stable_code() {
    let t = test_app();
    let product = seed_product(&t.store, Uuid::new_v4(), 2).await;

    let response = t
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/orders",
            Some(&token(Uuid::new_v4(), "BUYER")),
            Some(json!({ "items": [{ "product_id": product.id, "quantity": 3 }] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INSUFFICIENT_STOCK");
    assert!(body["error"]["message"].as_str().unwrap().contains("available 2"));
}

#[tokio::test]
async fn order_routes_require_the_buyer_role() {
    let t = test_app();

    let response = t
        .router
        .clone()
        .oneshot(request("POST", "/v1/orders", None, Some(json!({ "items": [] }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = t
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/orders",
            Some(&token(Uuid::new_v4(), "SELLER")),
            Some(json!({ "items": [] })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn inventory_adjustment_drives_status_derivation_end_to_end() {
    let t = test_app();
    let seller_id = Uuid::new_v4();
    let product = seed_product(&t.store, seller_id, 10).await;
    let bearer = token(seller_id, "SELLER");

    let response = t
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/inventory/{}/adjustment", product.id),
            Some(&bearer),
            Some(json!({ "adjustment": -10 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["quantity"], 0);
    assert_eq!(body["status"], "OUT_OF_STOCK");

    let response = t
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/inventory/{}/adjustment", product.id),
            Some(&bearer),
            Some(json!({ "adjustment": 5 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["quantity"], 5);
    assert_eq!(body["status"], "APPROVED");

    // Quantity 5 sits at the default threshold, so the product reports low.
    let response = t
        .router
        .clone()
        .oneshot(request("GET", "/v1/inventory/low-stock", Some(&bearer), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&product.id.to_string().as_str()));
}

#[tokio::test]
async fn inventory_mutation_is_denied_to_non_owners() {
    let t = test_app();
    let product = seed_product(&t.store, Uuid::new_v4(), 10).await;

    let response = t
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/inventory/{}/adjustment", product.id),
            Some(&token(Uuid::new_v4(), "SELLER")),
            Some(json!({ "adjustment": -1 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn seller_and_operator_update_order_status_through_one_route() {
    let t = test_app();
    let seller_id = Uuid::new_v4();
    let product = seed_product(&t.store, seller_id, 10).await;
    let buyer_id = Uuid::new_v4();

    let response = t
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/orders",
            Some(&token(buyer_id, "BUYER")),
            Some(json!({ "items": [{ "product_id": product.id, "quantity": 1 }] })),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let order_id = body[0]["id"].as_str().unwrap().to_string();

    // A different seller is rejected by the lifecycle engine.
    let response = t
        .router
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/v1/orders/{order_id}/status"),
            Some(&token(Uuid::new_v4(), "SELLER")),
            Some(json!({ "status": "SHIPPED" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = t
        .router
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/v1/orders/{order_id}/status"),
            Some(&token(seller_id, "SELLER")),
            Some(json!({ "status": "READY_FOR_WAREHOUSE" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "READY_FOR_WAREHOUSE");

    let response = t
        .router
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/v1/orders/{order_id}/status"),
            Some(&token(Uuid::new_v4(), "ADMIN")),
            Some(json!({ "status": "CANCELLED" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "CANCELLED");
    assert_eq!(body["payment_status"], "PENDING");
}

#[tokio::test]
async fn public_catalog_hides_unapproved_listings() {
    let t = test_app();
    let seller_id = Uuid::new_v4();
    let bearer = token(seller_id, "SELLER");

    let response = t
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/products",
            Some(&bearer),
            Some(json!({
                "name": "Brass teapot",
                "description": "Hand-engraved",
                "price_cents": 12_000,
                "quantity": 4
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["status"], "DRAFT");
    let product_id = created["id"].as_str().unwrap().to_string();

    // Anonymous readers get a 404 for the draft, the owner sees it.
    let response = t
        .router
        .clone()
        .oneshot(request("GET", &format!("/v1/products/{product_id}"), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = t
        .router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/v1/products/{product_id}"),
            Some(&bearer),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Operator review makes it public.
    let response = t
        .router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/v1/products/{product_id}/review"),
            Some(&token(Uuid::new_v4(), "ADMIN")),
            Some(json!({ "status": "APPROVED" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = t
        .router
        .clone()
        .oneshot(request("GET", &format!("/v1/products/{product_id}"), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_cart_is_a_validation_error() {
    let t = test_app();

    let response = t
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/v1/orders",
            Some(&token(Uuid::new_v4(), "BUYER")),
            Some(json!({ "items": [] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].as_str().is_some());
}
