//! Members, plans, memberships, bookings, and check-ins.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{AdminError, LIST_LIMIT, LONG_LIST_LIMIT, conflict_on_unique, ensure_affected, optional_id, parse_id, price, required_id, still_in_use};
use crate::services::membership;
use crate::services::notify::{AdminEvent, Notifier};
use crate::services::session::Role;
use crate::services::validate::{required, trimmed};

// =============================================================================
// MEMBERS
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MemberRow {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

pub async fn list_members(pool: &PgPool) -> Result<Vec<MemberRow>, sqlx::Error> {
    sqlx::query_as::<_, MemberRow>(
        "SELECT id, email, full_name, phone, role, created_at FROM profiles ORDER BY full_name NULLS LAST, email",
    )
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// # Errors
///
/// `Invalid("Invalid role.")` for anything outside `member|trainer|admin`.
pub fn member_role(input: &MemberInput) -> Result<Role, AdminError> {
    input
        .role
        .as_deref()
        .map(str::trim)
        .and_then(Role::parse)
        .ok_or(AdminError::Invalid("Invalid role."))
}

pub async fn update_member(pool: &PgPool, id: &str, input: &MemberInput) -> Result<(), AdminError> {
    let id = parse_id(id, "Profile ID is required.", "Member")?;
    let role = member_role(input)?;
    let email = trimmed(input.email.as_deref()).map(|e| e.to_lowercase());
    let result = sqlx::query("UPDATE profiles SET full_name = $2, email = $3, role = $4 WHERE id = $1")
        .bind(id)
        .bind(trimmed(input.full_name.as_deref()))
        .bind(email)
        .bind(role.as_str())
        .execute(pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Another member already uses this email."))?;
    ensure_affected(&result, "Member")?;
    tracing::info!(member_id = %id, role = role.as_str(), "member updated");
    Ok(())
}

// =============================================================================
// PLANS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanInput {
    pub name: Option<String>,
    #[serde(default)]
    pub peak: bool,
    pub duration_months: Option<i64>,
    pub price_etb: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanFields {
    pub name: String,
    pub peak: bool,
    pub duration_months: i32,
    pub price_etb: f64,
}

/// # Errors
///
/// `Invalid` with the first failing field's message.
pub fn plan_input(input: &PlanInput) -> Result<PlanFields, AdminError> {
    let name = required(input.name.as_deref(), "Plan name is required.")?;
    let duration_months = input
        .duration_months
        .filter(|m| *m >= 1)
        .and_then(|m| i32::try_from(m).ok())
        .ok_or(AdminError::Invalid("Duration must be at least 1 month."))?;
    let price_etb = price(input.price_etb)?;
    Ok(PlanFields { name, peak: input.peak, duration_months, price_etb })
}

pub async fn create_plan(pool: &PgPool, input: &PlanInput) -> Result<Uuid, AdminError> {
    let f = plan_input(input)?;
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO plans (name, peak, duration_months, price_etb) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&f.name)
    .bind(f.peak)
    .bind(f.duration_months)
    .bind(f.price_etb)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn update_plan(pool: &PgPool, id: &str, input: &PlanInput) -> Result<(), AdminError> {
    let id = parse_id(id, "Plan ID is required.", "Plan")?;
    let f = plan_input(input)?;
    let result =
        sqlx::query("UPDATE plans SET name = $2, peak = $3, duration_months = $4, price_etb = $5 WHERE id = $1")
            .bind(id)
            .bind(&f.name)
            .bind(f.peak)
            .bind(f.duration_months)
            .bind(f.price_etb)
            .execute(pool)
            .await?;
    ensure_affected(&result, "Plan")
}

pub async fn delete_plan(pool: &PgPool, id: &str) -> Result<(), AdminError> {
    let id = parse_id(id, "Plan ID is required.", "Plan")?;
    let result = sqlx::query("DELETE FROM plans WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| still_in_use(e, "Plan"))?;
    ensure_affected(&result, "Plan")
}

// =============================================================================
// MEMBERSHIPS
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MembershipRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub member_name: Option<String>,
    pub member_email: Option<String>,
    pub plan_id: Uuid,
    pub plan_name: Option<String>,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub async fn list_memberships(pool: &PgPool) -> Result<Vec<MembershipRow>, sqlx::Error> {
    sqlx::query_as::<_, MembershipRow>(
        r"SELECT m.id, m.user_id, p.full_name AS member_name, p.email AS member_email,
                 m.plan_id, pl.name AS plan_name, m.status, m.start_date, m.end_date
          FROM memberships m
          LEFT JOIN profiles p ON p.id = m.user_id
          LEFT JOIN plans pl ON pl.id = m.plan_id
          ORDER BY m.end_date DESC
          LIMIT $1",
    )
    .bind(LONG_LIST_LIMIT)
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipInput {
    pub user_id: Option<String>,
    pub plan_id: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipFields {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// # Errors
///
/// `Invalid` with the first failing field's message.
pub fn membership_input(input: &MembershipInput) -> Result<MembershipFields, AdminError> {
    let user_id = required_id(input.user_id.as_deref(), "Member is required.")?;
    let plan_id = required_id(input.plan_id.as_deref(), "Plan is required.")?;
    let (Some(start), Some(end)) = (trimmed(input.start_date.as_deref()), trimmed(input.end_date.as_deref())) else {
        return Err(AdminError::Invalid("Start and end dates are required."));
    };
    let parse = |raw: &str| NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| AdminError::Invalid("Invalid date."));
    let (start_date, end_date) = (parse(&start)?, parse(&end)?);
    if end_date < start_date {
        return Err(AdminError::Invalid("End date must be on or after the start date."));
    }
    let status = trimmed(input.status.as_deref()).unwrap_or_else(|| "active".to_owned());
    Ok(MembershipFields { user_id, plan_id, status, start_date, end_date })
}

/// Insert a membership record and tell connected admins.
pub async fn create_membership(pool: &PgPool, notifier: &Notifier, input: &MembershipInput) -> Result<Uuid, AdminError> {
    let f = membership_input(input)?;
    let id: Uuid = sqlx::query_scalar(
        r"INSERT INTO memberships (user_id, plan_id, status, start_date, end_date)
          VALUES ($1, $2, $3, $4, $5)
          RETURNING id",
    )
    .bind(f.user_id)
    .bind(f.plan_id)
    .bind(&f.status)
    .bind(f.start_date)
    .bind(f.end_date)
    .fetch_one(pool)
    .await?;
    tracing::info!(membership_id = %id, user_id = %f.user_id, "membership created");
    notifier.publish(AdminEvent::new_membership());
    Ok(id)
}

pub async fn update_membership(pool: &PgPool, id: &str, input: &MembershipInput) -> Result<(), AdminError> {
    let id = parse_id(id, "Membership ID is required.", "Membership")?;
    let f = membership_input(input)?;
    let result = sqlx::query(
        r"UPDATE memberships
          SET user_id = $2, plan_id = $3, status = $4, start_date = $5, end_date = $6
          WHERE id = $1",
    )
    .bind(id)
    .bind(f.user_id)
    .bind(f.plan_id)
    .bind(&f.status)
    .bind(f.start_date)
    .bind(f.end_date)
    .execute(pool)
    .await?;
    ensure_affected(&result, "Membership")
}

pub async fn delete_membership(pool: &PgPool, id: &str) -> Result<(), AdminError> {
    let id = parse_id(id, "Membership ID is required.", "Membership")?;
    let result = sqlx::query("DELETE FROM memberships WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| still_in_use(e, "Membership"))?;
    ensure_affected(&result, "Membership")
}

// =============================================================================
// BOOKINGS
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub member_name: Option<String>,
    pub member_email: Option<String>,
    pub class_id: Uuid,
    pub class_name: Option<String>,
    pub booked_date: NaiveDate,
    pub status: String,
}

pub async fn list_bookings(pool: &PgPool) -> Result<Vec<BookingRow>, sqlx::Error> {
    sqlx::query_as::<_, BookingRow>(
        r"SELECT b.id, b.user_id, p.full_name AS member_name, p.email AS member_email,
                 b.class_id, c.name AS class_name, b.booked_date, b.status
          FROM bookings b
          LEFT JOIN profiles p ON p.id = b.user_id
          LEFT JOIN classes c ON c.id = b.class_id
          ORDER BY b.booked_date DESC
          LIMIT $1",
    )
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await
}

pub async fn update_booking_status(
    pool: &PgPool,
    notifier: &Notifier,
    id: &str,
    status: Option<&str>,
) -> Result<(), AdminError> {
    let id = parse_id(id, "Booking ID is required.", "Booking")?;
    let status = required(status, "Status is required.")?;
    let result = sqlx::query("UPDATE bookings SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(&status)
        .execute(pool)
        .await?;
    ensure_affected(&result, "Booking")?;
    tracing::info!(booking_id = %id, %status, "booking status changed");
    notifier.publish(AdminEvent::booking_updated());
    Ok(())
}

pub async fn delete_booking(pool: &PgPool, id: &str) -> Result<(), AdminError> {
    let id = parse_id(id, "Booking ID is required.", "Booking")?;
    let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| still_in_use(e, "Booking"))?;
    ensure_affected(&result, "Booking")
}

// =============================================================================
// CHECK-INS
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CheckInRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub member_name: Option<String>,
    pub member_email: Option<String>,
    pub class_id: Option<Uuid>,
    pub class_name: Option<String>,
    pub checked_in_at: DateTime<Utc>,
}

pub async fn list_check_ins(pool: &PgPool) -> Result<Vec<CheckInRow>, sqlx::Error> {
    sqlx::query_as::<_, CheckInRow>(
        r"SELECT ci.id, ci.user_id, p.full_name AS member_name, p.email AS member_email,
                 ci.class_id, c.name AS class_name, ci.checked_in_at
          FROM check_ins ci
          LEFT JOIN profiles p ON p.id = ci.user_id
          LEFT JOIN classes c ON c.id = ci.class_id
          ORDER BY ci.checked_in_at DESC
          LIMIT $1",
    )
    .bind(LONG_LIST_LIMIT)
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckInInput {
    /// The member's check-in code, which is their profile id.
    pub user_id: Option<String>,
    pub class_id: Option<String>,
}

/// Record a door check-in for an active member, optionally against a class.
///
/// # Errors
///
/// `Invalid` when the member is missing or has no active membership.
pub async fn record_check_in(pool: &PgPool, input: &CheckInInput) -> Result<Uuid, AdminError> {
    let user_id = required_id(input.user_id.as_deref(), "Member is required.")?;
    let class_id = optional_id(input.class_id.as_deref(), "Class not found.")?;
    membership::require_active(pool, user_id).await?;
    let id: Uuid = sqlx::query_scalar("INSERT INTO check_ins (user_id, class_id) VALUES ($1, $2) RETURNING id")
        .bind(user_id)
        .bind(class_id)
        .fetch_one(pool)
        .await?;
    tracing::info!(%user_id, check_in_id = %id, "member checked in");
    Ok(id)
}

pub async fn delete_check_in(pool: &PgPool, id: &str) -> Result<(), AdminError> {
    let id = parse_id(id, "Check-in ID is required.", "Check-in")?;
    let result = sqlx::query("DELETE FROM check_ins WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| still_in_use(e, "Check-in"))?;
    ensure_affected(&result, "Check-in")
}

#[cfg(test)]
#[path = "members_test.rs"]
mod tests;
