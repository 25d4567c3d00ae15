//! Chapa checkout initiation and the signed webhook.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};

use super::auth::AuthUser;
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::services::payment::{self, PaymentError};
use crate::services::webhook::{self, WebhookError};
use crate::state::AppState;

const SIGNATURE_HEADERS: [&str; 2] = ["chapa-signature", "x-chapa-signature"];

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotConfigured => Self::Config(err.to_string()),
            PaymentError::MissingPlan | PaymentError::MissingEmail => Self::BadRequest(err.to_string()),
            PaymentError::PlanNotFound | PaymentError::ProfileNotFound => Self::NotFound(err.to_string()),
            PaymentError::Gateway(e) => Self::Upstream(e.to_string()),
            PaymentError::Database(e) => Self::Database(e),
        }
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::NotConfigured => Self::Config(err.to_string()),
            WebhookError::InvalidSignature => Self::Unauthorized(err.to_string()),
            WebhookError::InvalidJson => Self::BadRequest(err.to_string()),
            WebhookError::Database(e) => Self::Database(e),
        }
    }
}

#[derive(Deserialize)]
pub struct InitiateBody {
    plan_id: Option<String>,
}

/// `POST /api/payment/initiate` — open a Chapa checkout for a plan.
pub async fn initiate(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<InitiateBody>,
) -> ApiResult<Json<Value>> {
    let checkout_url = payment::initiate_plan_payment(
        &state.pool,
        &state.http,
        state.config.chapa.as_ref(),
        state.config.app_url.as_deref(),
        auth.user.id,
        body.plan_id.as_deref(),
    )
    .await?;
    Ok(Json(json!({ "checkout_url": checkout_url })))
}

fn signature(headers: &HeaderMap) -> Option<&str> {
    SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|v| v.to_str().ok())
}

/// `POST /api/payment/webhook` — verify, then reconcile.
///
/// Once the signature checks out the gateway always gets `{received: true}`:
/// reconciliation problems are logged, never retried by the sender.
pub async fn chapa_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<Json<Value>> {
    let secret = state.config.chapa.as_ref().map(|c| c.webhook_secret.as_str());
    let event = webhook::authenticate(secret, &body, signature(&headers))?;

    match webhook::reconcile(&state.pool, &state.notifier, &event).await {
        Ok(outcome) => tracing::debug!(?outcome, "chapa webhook handled"),
        Err(e) => tracing::error!(error = %e, tx_ref = ?event.tx_ref, "chapa webhook: reconcile failed"),
    }
    Ok(Json(json!({ "received": true })))
}
