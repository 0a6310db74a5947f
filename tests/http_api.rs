mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{harness, seed_template};
use invitation_service::controllers;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let h = harness().await;
    let app = controllers::app(h.state.clone());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn owner_endpoints_require_a_valid_token() {
    let h = harness().await;
    let app = controllers::app(h.state.clone());

    let (status, _) = send(&app, Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/events", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn event_is_hidden_until_published() {
    let h = harness().await;
    let template_id = seed_template(&h.store, &[0, 1]).await;
    let app = controllers::app(h.state.clone());
    let owner = Uuid::new_v4();
    let token = h.state.tokens.issue(owner, "host@example.com").unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(&token),
        Some(json!({
            "template_id": template_id,
            "title": "Summer Party",
            "event_date": "2030-07-01T18:00:00Z",
            "location_name": "Rooftop",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["is_published"], json!(false));
    assert_eq!(body["data"]["sections"].as_array().map(Vec::len), Some(2));

    let id = body["data"]["id"].as_str().unwrap().to_string();
    let slug = body["data"]["slug"].as_str().unwrap().to_string();
    let public_uri = format!("/api/e/{}", slug);

    let (status, body) = send(&app, Method::GET, &public_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/events/{}/publish", id),
        Some(&token),
        Some(json!({ "publish": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_published"], json!(true));

    let (status, body) = send(&app, Method::GET, &public_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["event"]["slug"], json!(slug));
    assert_eq!(body["data"]["stats"]["total_rsvp"], json!(0));
    assert_eq!(body["data"]["degraded"], json!([]));

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/events/{}/rsvp", id),
        None,
        Some(json!({ "name": "Maria", "status": "yes", "message": "Can't wait" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["rsvp_status"], json!("yes"));

    let (_, body) = send(&app, Method::GET, &public_uri, None, None).await;
    assert_eq!(body["data"]["stats"]["total_rsvp"], json!(1));
    assert_eq!(body["data"]["stats"]["total_attending"], json!(1));
}

#[tokio::test]
async fn other_users_get_forbidden() {
    let h = harness().await;
    let template_id = seed_template(&h.store, &[0]).await;
    let app = controllers::app(h.state.clone());
    let owner_token = h.state.tokens.issue(Uuid::new_v4(), "host@example.com").unwrap();
    let other_token = h.state.tokens.issue(Uuid::new_v4(), "guest@example.com").unwrap();

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(&owner_token),
        Some(json!({
            "template_id": template_id,
            "title": "Team offsite",
            "event_date": "2030-09-15T09:00:00+06:00",
        })),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/events/{}/guests", id),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("FORBIDDEN"));

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/events/{}", id),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn validation_errors_are_bad_requests() {
    let h = harness().await;
    let template_id = seed_template(&h.store, &[0]).await;
    let app = controllers::app(h.state.clone());
    let token = h.state.tokens.issue(Uuid::new_v4(), "host@example.com").unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(&token),
        Some(json!({
            "template_id": template_id,
            "title": "Gala",
            "event_date": "tomorrow evening",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_INPUT"));
}

#[tokio::test]
async fn templates_are_browsable_without_login() {
    let h = harness().await;
    let template_id = seed_template(&h.store, &[0, 1, 2]).await;
    let app = controllers::app(h.state.clone());

    let (status, body) = send(&app, Method::GET, "/api/templates?category=wedding", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (_, body) = send(&app, Method::GET, "/api/templates?category=birthday", None, None).await;
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/templates/{}", template_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sections"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["data"]["sections"][0]["type"], json!("text"));
}
