use http_body_util::BodyExt;

use super::*;

async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn status_mapping() {
    assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
    assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
    assert_eq!(ApiError::Upstream("x".into()).status(), StatusCode::BAD_GATEWAY);
    assert_eq!(ApiError::Config("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ApiError::Database(sqlx::Error::RowNotFound).status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn body_carries_message() {
    let resp = ApiError::BadRequest("Class and date are required.".into()).into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Class and date are required.");
}

#[tokio::test]
async fn database_errors_are_not_leaked() {
    let resp = ApiError::Database(sqlx::Error::PoolTimedOut).into_response();
    let body = body_json(resp).await;
    let msg = body["error"].as_str().unwrap();
    assert!(!msg.contains("pool"));
}

#[test]
fn rate_limit_maps_to_429() {
    let err: ApiError = RateLimitError::PerKeyExceeded { limit: 5, window_secs: 600 }.into();
    assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn json_rejections_become_bad_requests() {
    let request = axum::extract::Request::builder()
        .method("POST")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"email\": 5"))
        .unwrap();
    let rejection = JsonBody::<serde_json::Value>::from_request(request, &()).await.err().unwrap();
    let resp = rejection.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "Invalid JSON body.");
}
