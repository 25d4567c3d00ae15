//! Chapa webhook reconciliation.
//!
//! DESIGN
//! ======
//! The gateway calls back once per successful charge, but may retry. Every
//! applied reference is recorded in `payment_events` inside the same
//! transaction as its effects, so a retry finds the row and is acknowledged
//! without touching orders or subscriptions again.
//!
//! ERROR HANDLING
//! ==============
//! Only authentication and parse failures are reported to the caller.
//! Unknown references, missing plans, and failed inserts are logged and
//! acknowledged so the gateway stops retrying a charge we cannot apply.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::services::chapa::{self, TxRef};
use crate::services::membership;
use crate::services::notify::{AdminEvent, Notifier};

const SUCCESS_EVENT: &str = "charge.success";
const SUCCESS_STATUS: &str = "success";

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Webhook is not configured (missing CHAPA_WEBHOOK_SECRET).")]
    NotConfigured,
    #[error("Invalid signature.")]
    InvalidSignature,
    #[error("Invalid JSON.")]
    InvalidJson,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Default, Deserialize)]
pub struct ChapaEvent {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tx_ref: Option<String>,
}

impl ChapaEvent {
    #[must_use]
    pub fn is_successful_charge(&self) -> bool {
        self.event.as_deref() == Some(SUCCESS_EVENT) && self.status.as_deref() == Some(SUCCESS_STATUS)
    }
}

/// What the webhook did. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Not a successful charge.
    Ignored,
    /// Reference already applied.
    Replayed,
    InvalidReference,
    OrderPaid { order_id: Uuid },
    /// Order missing or no longer `pending_payment`.
    OrderUnchanged { order_id: Uuid },
    SubscriptionActivated { user_id: Uuid, plan_id: Uuid },
    PlanNotFound { plan_id: Uuid },
    SubscriptionFailed { user_id: Uuid, plan_id: Uuid },
}

/// Verify and parse a raw webhook body.
///
/// # Errors
///
/// `NotConfigured` without a secret, `InvalidSignature` when the HMAC does
/// not match, `InvalidJson` when the body is not an event object.
pub fn authenticate(secret: Option<&str>, body: &[u8], signature: Option<&str>) -> Result<ChapaEvent, WebhookError> {
    let secret = secret.filter(|s| !s.is_empty()).ok_or(WebhookError::NotConfigured)?;
    if !chapa::verify_signature(body, secret, signature) {
        return Err(WebhookError::InvalidSignature);
    }
    serde_json::from_slice(body).map_err(|_| WebhookError::InvalidJson)
}

/// Apply a verified event.
///
/// # Errors
///
/// `Database` when the transaction itself cannot be opened or committed.
pub async fn reconcile(pool: &PgPool, notifier: &Notifier, event: &ChapaEvent) -> Result<WebhookOutcome, WebhookError> {
    if !event.is_successful_charge() {
        return Ok(WebhookOutcome::Ignored);
    }
    let raw_ref = event.tx_ref.as_deref().unwrap_or_default();
    let Some(tx_ref) = chapa::parse_tx_ref(raw_ref) else {
        warn!(tx_ref = raw_ref, "chapa webhook: invalid or missing tx_ref");
        return Ok(WebhookOutcome::InvalidReference);
    };

    let mut tx = pool.begin().await?;
    let fresh = sqlx::query("INSERT INTO payment_events (tx_ref) VALUES ($1) ON CONFLICT (tx_ref) DO NOTHING")
        .bind(raw_ref)
        .execute(&mut *tx)
        .await?
        .rows_affected()
        == 1;
    if !fresh {
        info!(tx_ref = raw_ref, "chapa webhook: replay ignored");
        return Ok(WebhookOutcome::Replayed);
    }

    let outcome = match tx_ref {
        TxRef::Shop { order_id } => mark_order_paid(&mut tx, order_id).await?,
        TxRef::Plan { user_id, plan_id } => activate_subscription(&mut tx, raw_ref, user_id, plan_id).await?,
    };

    match outcome {
        WebhookOutcome::OrderPaid { .. } | WebhookOutcome::SubscriptionActivated { .. } => {
            tx.commit().await?;
        }
        // Unapplied references stay unrecorded.
        _ => tx.rollback().await?,
    }

    match &outcome {
        WebhookOutcome::OrderPaid { order_id } => info!(%order_id, "chapa webhook: order paid"),
        WebhookOutcome::SubscriptionActivated { user_id, plan_id } => {
            info!(%user_id, %plan_id, "chapa webhook: subscription activated");
            notifier.publish(AdminEvent::new_membership());
        }
        _ => {}
    }
    Ok(outcome)
}

async fn mark_order_paid(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order_id: Uuid,
) -> Result<WebhookOutcome, sqlx::Error> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?;
    if status.as_deref() != Some("pending_payment") {
        return Ok(WebhookOutcome::OrderUnchanged { order_id });
    }

    sqlx::query("UPDATE orders SET status = 'paid', updated_at = now() WHERE id = $1")
        .bind(order_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query(
        r"UPDATE products p
          SET stock = GREATEST(0, p.stock - oi.qty), updated_at = now()
          FROM (
              SELECT product_id, SUM(quantity)::int AS qty
              FROM order_items
              WHERE order_id = $1
              GROUP BY product_id
          ) oi
          WHERE p.id = oi.product_id",
    )
    .bind(order_id)
    .execute(&mut **tx)
    .await?;

    Ok(WebhookOutcome::OrderPaid { order_id })
}

async fn activate_subscription(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    raw_ref: &str,
    user_id: Uuid,
    plan_id: Uuid,
) -> Result<WebhookOutcome, sqlx::Error> {
    let duration: Option<i32> = sqlx::query_scalar("SELECT duration_months FROM plans WHERE id = $1")
        .bind(plan_id)
        .fetch_optional(&mut **tx)
        .await?;
    let Some(duration) = duration else {
        warn!(%plan_id, "chapa webhook: plan not found");
        return Ok(WebhookOutcome::PlanNotFound { plan_id });
    };

    let start = membership::today();
    let end = membership::end_date_for(start, duration);
    let inserted = sqlx::query(
        r"INSERT INTO subscriptions (user_id, plan_id, status, start_date, end_date, tx_ref)
          VALUES ($1, $2, 'active', $3, $4, $5)",
    )
    .bind(user_id)
    .bind(plan_id)
    .bind(start)
    .bind(end)
    .bind(raw_ref)
    .execute(&mut **tx)
    .await;

    match inserted {
        Ok(_) => Ok(WebhookOutcome::SubscriptionActivated { user_id, plan_id }),
        Err(e) => {
            error!(error = %e, %user_id, %plan_id, "chapa webhook: subscription insert failed");
            Ok(WebhookOutcome::SubscriptionFailed { user_id, plan_id })
        }
    }
}

#[cfg(test)]
#[path = "webhook_test.rs"]
mod tests;
