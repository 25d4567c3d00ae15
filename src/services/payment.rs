//! Plan purchase through the Chapa hosted checkout.
//!
//! The subscription itself is only created by the webhook once the charge
//! succeeds; this module just opens the checkout.

use sqlx::PgPool;
use uuid::Uuid;

use crate::config::ChapaConfig;
use crate::services::chapa::{self, ChapaError, InitializeRequest};
use crate::services::membership;

pub const PLAN_RETURN_PATH: &str = "/dashboard";

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment is not configured (missing CHAPA_SECRET_KEY).")]
    NotConfigured,
    #[error("plan_id is required.")]
    MissingPlan,
    #[error("Plan not found.")]
    PlanNotFound,
    #[error("User profile not found.")]
    ProfileNotFound,
    #[error("User email is required for payment.")]
    MissingEmail,
    #[error(transparent)]
    Gateway(#[from] ChapaError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Email and display name sent to the gateway.
#[derive(Debug, Clone)]
pub struct Payer {
    pub email: String,
    pub full_name: Option<String>,
}

/// Load the paying profile. `Ok(None)` when the profile row is missing.
///
/// # Errors
///
/// `MissingEmail` when the profile has no usable email.
pub async fn load_payer(pool: &PgPool, user_id: Uuid) -> Result<Option<Payer>, PaymentError> {
    let row = sqlx::query_as::<_, (Option<String>, Option<String>)>(
        "SELECT email, full_name FROM profiles WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    let Some((email, full_name)) = row else {
        return Ok(None);
    };
    let email = email
        .map(|e| e.trim().to_owned())
        .filter(|e| !e.is_empty())
        .ok_or(PaymentError::MissingEmail)?;
    Ok(Some(Payer { email, full_name }))
}

/// Open a checkout for `plan_id` on behalf of the signed-in user.
///
/// # Errors
///
/// Config, lookup, and gateway failures as [`PaymentError`] variants.
pub async fn initiate_plan_payment(
    pool: &PgPool,
    http: &reqwest::Client,
    cfg: Option<&ChapaConfig>,
    app_url: Option<&str>,
    user_id: Uuid,
    plan_id: Option<&str>,
) -> Result<String, PaymentError> {
    let cfg = cfg.ok_or(PaymentError::NotConfigured)?;
    let plan_id = plan_id.map(str::trim).filter(|s| !s.is_empty()).ok_or(PaymentError::MissingPlan)?;
    let plan_id = Uuid::parse_str(plan_id).map_err(|_| PaymentError::PlanNotFound)?;

    let plan = membership::find_plan(pool, plan_id).await?.ok_or(PaymentError::PlanNotFound)?;
    let payer = load_payer(pool, user_id).await?.ok_or(PaymentError::ProfileNotFound)?;

    let tx_ref = chapa::plan_tx_ref(user_id, plan.id, chrono::Utc::now().timestamp_millis());
    let payload = InitializeRequest::new(
        plan.price_etb.to_string(),
        payer.email,
        payer.full_name.as_deref(),
        tx_ref,
        app_url,
        PLAN_RETURN_PATH,
    );

    let checkout_url = chapa::initialize(http, cfg, &payload).await?;
    tracing::info!(%user_id, %plan_id, tx_ref = %payload.tx_ref, "plan checkout opened");
    Ok(checkout_url)
}

#[cfg(test)]
#[path = "payment_test.rs"]
mod tests;
