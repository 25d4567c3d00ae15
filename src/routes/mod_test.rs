use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use super::*;
use crate::state::test_helpers::{test_app_state, test_app_state_with_config, test_config_with};

async fn send(app: Router, method: &str, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn error_message(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    json["error"].as_str().unwrap_or_default().to_owned()
}

#[tokio::test]
async fn healthz_is_ok() {
    let response = send(app(test_app_state()), "GET", "/healthz", "").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn member_routes_require_a_session() {
    for uri in ["/api/dashboard", "/api/account/orders", "/api/library"] {
        let response = send(app(test_app_state()), "GET", uri, "").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(error_message(response).await, "You must be signed in.");
    }
}

#[tokio::test]
async fn booking_without_session_uses_booking_message() {
    let body = r#"{"class_id":"x","booked_date":"2026-10-16"}"#;
    let response = send(app(test_app_state()), "POST", "/api/bookings", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(error_message(response).await, "You must be signed in.");
}

#[tokio::test]
async fn trainer_schedule_requires_a_session() {
    let response = send(app(test_app_state()), "GET", "/api/trainer/today", "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_require_a_session() {
    let response = send(app(test_app_state()), "GET", "/api/admin/overview", "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_ws_without_ticket_is_unauthorized() {
    let response = send(app(test_app_state()), "GET", "/api/admin/ws", "").await;
    // No upgrade headers: the extractor rejects before the ticket check.
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn payment_endpoints_reject_get() {
    for uri in ["/api/payment/initiate", "/api/payment/webhook"] {
        let response = send(app(test_app_state()), "GET", uri, "").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        assert_eq!(error_message(response).await, "Method not allowed.");
    }
}

#[tokio::test]
async fn webhook_without_secret_is_a_server_error() {
    let response = send(app(test_app_state()), "POST", "/api/payment/webhook", "{}").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn webhook_with_bad_signature_is_unauthorized() {
    let state = test_app_state_with_config(test_config_with(&[("CHAPA_SECRET_KEY", "k")]));
    let request = Request::builder()
        .method("POST")
        .uri("/api/payment/webhook")
        .header("chapa-signature", "deadbeef")
        .body(Body::from(r#"{"event":"charge.success"}"#))
        .unwrap();
    let response = app(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn contact_form_validates_before_sending() {
    let response = send(app(test_app_state()), "POST", "/api/contact/class-booking", "{}").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Name is required.");
}

#[tokio::test]
async fn newsletter_without_mailchimp_is_a_server_error() {
    let body = r#"{"email":"runner@example.com"}"#;
    let response = send(app(test_app_state()), "POST", "/api/newsletter", body).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(response).await, "Newsletter is not configured.");
}

#[tokio::test]
async fn newsletter_rejects_malformed_email() {
    let config = test_config_with(&[("MAILCHIMP_API_KEY", "abc-us21"), ("MAILCHIMP_LIST_ID", "list")]);
    let response = send(app(test_app_state_with_config(config)), "POST", "/api/newsletter", r#"{"email":"nope"}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_body_answers_with_error_envelope() {
    let response = send(app(test_app_state()), "POST", "/api/newsletter", "{not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Invalid JSON body.");
}

#[tokio::test]
async fn body_without_json_content_type_answers_with_error_envelope() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/contact/membership-inquiry")
        .body(Body::from(r#"{"name":"Abebe"}"#))
        .unwrap();
    let response = app(test_app_state()).oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
    assert_eq!(error_message(response).await, "Invalid JSON body.");
}

#[tokio::test]
async fn newsletter_signup_answers_success() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mailchimp = Router::new().route(
        "/3.0/lists/{list}/members",
        post(|| async { axum::Json(serde_json::json!({ "status": "subscribed" })) }),
    );
    tokio::spawn(async move { axum::serve(listener, mailchimp).await });

    let base = format!("http://{addr}/3.0");
    let config = test_config_with(&[
        ("MAILCHIMP_API_KEY", "abc-us21"),
        ("MAILCHIMP_LIST_ID", "list"),
        ("MAILCHIMP_BASE_URL", base.as_str()),
    ]);
    let body = r#"{"email":"runner@example.com","name":"Abebe"}"#;
    let response = send(app(test_app_state_with_config(config)), "POST", "/api/newsletter", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json, serde_json::json!({ "success": true }));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let response = send(app(test_app_state()), "GET", "/api/nope", "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
