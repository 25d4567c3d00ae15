//! Public contact forms and newsletter signup. Rate limited per client.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{ApiError, ApiResult, JsonBody};
use crate::services::mailer::{self, ClassBookingInquiry, MembershipInquiry};
use crate::services::newsletter::{self, NewsletterError};
use crate::state::AppState;

impl From<NewsletterError> for ApiError {
    fn from(err: NewsletterError) -> Self {
        match err {
            NewsletterError::NotConfigured => Self::Config(err.to_string()),
            NewsletterError::InvalidEmail => Self::BadRequest(err.to_string()),
            NewsletterError::Upstream(msg) => Self::Upstream(msg),
        }
    }
}

/// Rate-limit key for anonymous submitters: the first forwarded address
/// when behind a proxy, otherwise one shared bucket.
pub(crate) fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| "anonymous".to_owned(), |ip| format!("ip:{ip}"))
}

/// `POST /api/contact/class-booking`
pub async fn class_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<ClassBookingInquiry>,
) -> ApiResult<StatusCode> {
    let email = mailer::render_class_booking(&body)?;
    state.rate_limiter.check_and_record(&client_key(&headers))?;
    mailer::send_inquiry(state.config.resend.as_ref(), &email).await?;
    tracing::info!("class booking inquiry sent");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/contact/membership-inquiry`
pub async fn membership_inquiry(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<MembershipInquiry>,
) -> ApiResult<StatusCode> {
    let email = mailer::render_membership_inquiry(&body)?;
    state.rate_limiter.check_and_record(&client_key(&headers))?;
    mailer::send_inquiry(state.config.resend.as_ref(), &email).await?;
    tracing::info!("membership inquiry sent");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct NewsletterBody {
    email: Option<String>,
    name: Option<String>,
}

/// `POST /api/newsletter`
pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<NewsletterBody>,
) -> ApiResult<Json<Value>> {
    state.rate_limiter.check_and_record(&client_key(&headers))?;
    newsletter::subscribe(
        &state.http,
        state.config.mailchimp.as_ref(),
        body.email.as_deref(),
        body.name.as_deref(),
    )
    .await?;
    Ok(Json(json!({ "success": true })))
}
