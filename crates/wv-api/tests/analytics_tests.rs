use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;
use wv_api::router;
use wv_db::models::Role;

use crate::common::{self, TestClient, TestStateBuilder};

fn forwarded_event(token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analytics/event")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .body(Body::from(r#"{"category":"nav","action":"open"}"#))
        .expect("Failed to build request")
}

#[tokio::test]
async fn test_track_event_records_context() {
    let (state, client, _dir) = common::setup().await;
    let (user, token) = common::create_user(&state, "s@example.com", "10", Role::Student).await;

    let response = client
        .post_json_with_auth(
            "/api/analytics/event",
            &json!({ "category": "resource", "action": "view", "label": "kinematics", "value": 3 }),
            &token,
        )
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Event tracked successfully");

    let events = state.store.get_events(Some("resource")).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].user_id, user.id);
    assert_eq!(events[0].action, "view");
    assert_eq!(events[0].value, 3);
    assert_eq!(events[0].user_agent.as_deref(), Some("wv-test"));
    assert_eq!(events[0].ip.as_deref(), Some("127.0.0.1"));
}

#[tokio::test]
async fn test_track_event_value_defaults_to_zero() {
    let (state, client, _dir) = common::setup().await;
    let (_user, token) = common::create_user(&state, "s@example.com", "10", Role::Student).await;

    client
        .post_json_with_auth(
            "/api/analytics/event",
            &json!({ "category": "nav", "action": "open" }),
            &token,
        )
        .await
        .assert_status(StatusCode::OK);

    let events = state.store.get_events(None).await;
    assert_eq!(events[0].value, 0);
    assert!(events[0].label.is_none());
}

#[tokio::test]
async fn test_track_event_requires_auth() {
    let (state, client, _dir) = common::setup().await;

    client
        .post_json(
            "/api/analytics/event",
            &json!({ "category": "nav", "action": "open" }),
        )
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    assert!(state.store.get_events(None).await.is_empty());
}

#[tokio::test]
async fn test_track_event_requires_category() {
    let (state, client, _dir) = common::setup().await;
    let (_user, token) = common::create_user(&state, "s@example.com", "10", Role::Student).await;

    let response = client
        .post_json_with_auth("/api/analytics/event", &json!({ "action": "open" }), &token)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Category is required");
}

#[tokio::test]
async fn test_forwarded_for_is_ignored_by_default() {
    let (state, client, _dir) = common::setup().await;
    let (_user, token) = common::create_user(&state, "s@example.com", "10", Role::Student).await;

    client
        .request(forwarded_event(&token))
        .await
        .assert_status(StatusCode::OK);

    let events = state.store.get_events(None).await;
    assert_eq!(events[0].ip.as_deref(), Some("127.0.0.1"));
}

#[tokio::test]
async fn test_forwarded_for_is_used_behind_trusted_proxy() {
    let (state, _dir) = TestStateBuilder::new().trust_proxy(true).build().await;
    let client = TestClient::new(router::router().with_state(state.clone()));
    let (_user, token) = common::create_user(&state, "s@example.com", "10", Role::Student).await;

    client
        .request(forwarded_event(&token))
        .await
        .assert_status(StatusCode::OK);

    let events = state.store.get_events(None).await;
    assert_eq!(events[0].ip.as_deref(), Some("203.0.113.9"));
}
