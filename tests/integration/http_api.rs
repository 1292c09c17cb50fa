use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use smart_order_router::api::create_router;
use smart_order_router::config::RoutingConfig;
use smart_order_router::models::pool::FeeTier;
use smart_order_router::models::state::AppState;

use crate::support::*;

fn app() -> axum::Router {
    let a = test_token(0x11, "AAA");
    let b = test_token(0x12, "BBB");
    let registry = registry_with(&[a.clone(), b.clone()]);
    let universe = vec![universe_pool(&a, &b, FeeTier::Low, 1_000.0)];
    let router = build_router(
        universe,
        registry.clone(),
        Box::new(|_route, amount| Some(linear_rate(amount, 99))),
        0,
        RoutingConfig::default(),
    );
    create_router(AppState {
        router: Arc::new(router),
        registry,
        chain_id: 1,
    })
}

async fn body_json(body: Body) -> Value {
    let bytes = to_bytes(body, usize::MAX).await.expect("body read");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn route_endpoint_returns_a_plan() {
    let request = Request::builder()
        .method("POST")
        .uri("/route")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "requestId": "req-1",
                "tokenIn": "AAA",
                "tokenOut": "BBB",
                "amount": "1000000",
                "tradeType": "exactIn",
            })
            .to_string(),
        ))
        .expect("request");

    let response = app().oneshot(request).await.expect("handler runs");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = body_json(response.into_body()).await;
    assert_eq!(payload["requestId"], "req-1");
    let plan = &payload["plan"];
    assert_eq!(plan["quote"], "990000");
    assert_eq!(plan["blockNumber"], TEST_BLOCK);
    assert_eq!(plan["routes"][0]["percent"], 100);
    assert_eq!(plan["routes"][0]["hops"][0]["fee"], 500);
}

#[tokio::test]
async fn unknown_token_maps_to_not_found() {
    let request = Request::builder()
        .method("POST")
        .uri("/route")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "tokenIn": "AAA",
                "tokenOut": "NOPE",
                "amount": "1000000",
                "tradeType": "exactIn",
            })
            .to_string(),
        ))
        .expect("request");

    let response = app().oneshot(request).await.expect("handler runs");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let payload = body_json(response.into_body()).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("NOPE"));
}

#[tokio::test]
async fn bad_amount_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/route")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "tokenIn": "AAA",
                "tokenOut": "BBB",
                "amount": "1.5e18",
                "tradeType": "exactIn",
            })
            .to_string(),
        ))
        .expect("request");

    let response = app().oneshot(request).await.expect("handler runs");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_endpoint_reports_ready() {
    let request = Request::builder()
        .method("GET")
        .uri("/status")
        .body(Body::empty())
        .expect("request");

    let response = app().oneshot(request).await.expect("handler runs");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = body_json(response.into_body()).await;
    assert_eq!(payload["status"], "ready");
    assert_eq!(payload["chain_id"], 1);
}
