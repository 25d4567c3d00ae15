//! Membership plans, subscription status, and the expiry sweep.
//!
//! DESIGN
//! ======
//! A member's standing is read from their latest subscription by
//! `end_date`. A subscription counts while its status is `active` and the
//! end date has not passed; the end date itself is still a valid day.
//!
//! The sweep task flips lapsed `active` rows to `expired` so admin views
//! and counts agree with the read-side check.

use std::time::Duration;

use chrono::{Months, NaiveDate};
use serde::Serialize;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use uuid::Uuid;

use crate::services::booking::{self, BookingSummary};

#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    #[error("Active membership required.")]
    Inactive,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Calendar date at the gym.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `start + months`, clamped to the last day of a shorter month.
#[must_use]
pub fn end_date_for(start: NaiveDate, duration_months: i32) -> NaiveDate {
    let months = u32::try_from(duration_months.max(0)).unwrap_or(0);
    start.checked_add_months(Months::new(months)).unwrap_or(NaiveDate::MAX)
}

// =============================================================================
// PLANS
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub peak: bool,
    pub duration_months: i32,
    pub price_etb: f64,
}

pub const PLAN_COLUMNS: &str = "id, name, peak, duration_months, price_etb::float8 AS price_etb";

/// All plans, cheapest first.
pub async fn list_plans(pool: &PgPool) -> Result<Vec<Plan>, sqlx::Error> {
    sqlx::query_as::<_, Plan>(&format!("SELECT {PLAN_COLUMNS} FROM plans ORDER BY price_etb, name"))
        .fetch_all(pool)
        .await
}

pub async fn find_plan(pool: &PgPool, plan_id: Uuid) -> Result<Option<Plan>, sqlx::Error> {
    sqlx::query_as::<_, Plan>(&format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = $1"))
        .bind(plan_id)
        .fetch_optional(pool)
        .await
}

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LatestSubscription {
    pub plan_id: Uuid,
    pub status: String,
    pub end_date: NaiveDate,
    pub plan_peak: bool,
    pub plan_name: String,
}

/// Member standing derived from the latest subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipStatus {
    pub is_active: bool,
    pub days_remaining: i64,
    pub end_date: Option<NaiveDate>,
    pub plan_id: Option<Uuid>,
    pub plan_name: Option<String>,
    /// Active on a plan without peak-hour access.
    pub is_off_peak: bool,
}

impl MembershipStatus {
    #[must_use]
    pub fn none() -> Self {
        Self { is_active: false, days_remaining: 0, end_date: None, plan_id: None, plan_name: None, is_off_peak: false }
    }

    #[must_use]
    pub fn evaluate(latest: Option<&LatestSubscription>, today: NaiveDate) -> Self {
        let Some(sub) = latest else {
            return Self::none();
        };
        let is_active = sub.status == "active" && sub.end_date >= today;
        let days_remaining = if sub.end_date >= today { (sub.end_date - today).num_days() } else { 0 };
        Self {
            is_active,
            days_remaining,
            end_date: Some(sub.end_date),
            plan_id: Some(sub.plan_id),
            plan_name: Some(sub.plan_name.clone()),
            is_off_peak: is_active && !sub.plan_peak,
        }
    }
}

pub async fn latest_subscription(pool: &PgPool, user_id: Uuid) -> Result<Option<LatestSubscription>, sqlx::Error> {
    sqlx::query_as::<_, LatestSubscription>(
        r"SELECT s.plan_id, s.status, s.end_date, p.peak AS plan_peak, p.name AS plan_name
          FROM subscriptions s
          JOIN plans p ON p.id = s.plan_id
          WHERE s.user_id = $1
          ORDER BY s.end_date DESC, s.created_at DESC
          LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn status_for(pool: &PgPool, user_id: Uuid) -> Result<MembershipStatus, sqlx::Error> {
    let latest = latest_subscription(pool, user_id).await?;
    Ok(MembershipStatus::evaluate(latest.as_ref(), today()))
}

/// Gate for members-only features.
///
/// # Errors
///
/// `Inactive` when the caller has no active subscription.
pub async fn require_active(pool: &PgPool, user_id: Uuid) -> Result<MembershipStatus, MembershipError> {
    let status = status_for(pool, user_id).await?;
    if !status.is_active {
        return Err(MembershipError::Inactive);
    }
    Ok(status)
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub profile: Option<ProfileSummary>,
    pub membership: MembershipStatus,
    /// Value encoded in the gym check-in QR. Only issued while active.
    pub check_in_code: Option<Uuid>,
    pub bookings: Vec<BookingSummary>,
}

pub async fn dashboard(pool: &PgPool, user_id: Uuid) -> Result<Dashboard, sqlx::Error> {
    let profile = sqlx::query_as::<_, ProfileSummary>(
        "SELECT id, email, full_name, phone, role FROM profiles WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    let membership = status_for(pool, user_id).await?;
    let bookings = booking::list_for_user(pool, user_id).await?;

    Ok(Dashboard {
        profile,
        check_in_code: membership.is_active.then_some(user_id),
        membership,
        bookings,
    })
}

// =============================================================================
// EXPIRY SWEEP
// =============================================================================

/// Mark lapsed `active` subscriptions and memberships as `expired`.
pub async fn expire_lapsed(pool: &PgPool, today: NaiveDate) -> Result<u64, sqlx::Error> {
    let subs = sqlx::query("UPDATE subscriptions SET status = 'expired' WHERE status = 'active' AND end_date < $1")
        .bind(today)
        .execute(pool)
        .await?
        .rows_affected();
    let memberships = sqlx::query("UPDATE memberships SET status = 'expired' WHERE status = 'active' AND end_date < $1")
        .bind(today)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(subs + memberships)
}

/// Spawn the periodic expiry sweep. Returns a handle for shutdown.
pub fn spawn_membership_sweep(pool: PgPool, interval_secs: u64) -> JoinHandle<()> {
    info!(interval_secs, "membership expiry sweep configured");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match expire_lapsed(&pool, today()).await {
                Ok(0) => {}
                Ok(expired) => info!(expired, "membership sweep expired rows"),
                Err(e) => error!(error = %e, "membership sweep failed"),
            }
        }
    })
}

#[cfg(test)]
#[path = "membership_test.rs"]
mod tests;
