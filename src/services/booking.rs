//! Class booking.
//!
//! A booking pins one weekly class to one calendar date. The date must fall
//! on the class's weekday, off-peak members are kept out of peak classes,
//! and `(user, class, date)` is unique. The unique index is authoritative;
//! the pre-insert lookup only exists to give the friendly message early.

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::services::notify::{AdminEvent, Notifier};
use crate::services::{membership, schedule};

const RECENT_LIMIT: i64 = 20;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("You must be signed in to book a class.")]
    SignedOut,
    #[error("Class and date are required.")]
    MissingFields,
    #[error("Invalid date.")]
    InvalidDate,
    #[error("Class not found.")]
    ClassNotFound,
    #[error("{name} runs on {day}. Please pick a {day} date.")]
    WrongDay { name: String, day: &'static str },
    #[error("Off-Peak members cannot book classes between 4 PM and 8 PM.")]
    PeakRestricted,
    #[error("You already have a booking for this class on this date.")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub id: Uuid,
    pub class_id: Uuid,
    pub booked_date: NaiveDate,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BookingSummary {
    pub id: Uuid,
    pub class_id: Uuid,
    pub class_name: Option<String>,
    pub start_time: Option<String>,
    pub booked_date: NaiveDate,
    pub status: String,
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its date part).
///
/// # Errors
///
/// `MissingFields` for blank input, `InvalidDate` when unparseable.
pub fn parse_booked_date(raw: &str) -> Result<NaiveDate, BookingError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(BookingError::MissingFields);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| BookingError::InvalidDate)
}

/// Reject dates that do not fall on the class's weekday.
///
/// # Errors
///
/// `WrongDay` naming the class and its weekday.
pub fn check_weekday(class_name: &str, class_day: i16, date: NaiveDate) -> Result<(), BookingError> {
    if schedule::iso_weekday(date) == class_day {
        return Ok(());
    }
    Err(BookingError::WrongDay { name: class_name.to_owned(), day: schedule::day_name(class_day) })
}

/// Book a class for the caller and notify admins.
///
/// # Errors
///
/// Validation variants in check order, then `Duplicate` for an existing
/// booking (including a lost insert race).
pub async fn book_class(
    pool: &PgPool,
    notifier: &Notifier,
    user_id: Uuid,
    class_id: Option<&str>,
    booked_date: Option<&str>,
) -> Result<BookingConfirmation, BookingError> {
    let class_id = class_id.map(str::trim).filter(|s| !s.is_empty());
    let booked_date = booked_date.map(str::trim).filter(|s| !s.is_empty());
    let (Some(class_id), Some(booked_date)) = (class_id, booked_date) else {
        return Err(BookingError::MissingFields);
    };
    let date = parse_booked_date(booked_date)?;
    let class_id = Uuid::parse_str(class_id).map_err(|_| BookingError::ClassNotFound)?;

    let class = sqlx::query_as::<_, (String, i16, String)>(
        "SELECT name, day_of_week, start_time FROM classes WHERE id = $1",
    )
    .bind(class_id)
    .fetch_optional(pool)
    .await?
    .ok_or(BookingError::ClassNotFound)?;
    let (name, day_of_week, start_time) = class;

    check_weekday(&name, day_of_week, date)?;

    if schedule::is_peak_time(&start_time) && membership::status_for(pool, user_id).await?.is_off_peak {
        return Err(BookingError::PeakRestricted);
    }

    let existing: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM bookings WHERE user_id = $1 AND class_id = $2 AND booked_date = $3",
    )
    .bind(user_id)
    .bind(class_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;
    if existing.is_some() {
        return Err(BookingError::Duplicate);
    }

    let id: Uuid = sqlx::query_scalar(
        r"INSERT INTO bookings (user_id, class_id, booked_date, status)
          VALUES ($1, $2, $3, 'confirmed')
          RETURNING id",
    )
    .bind(user_id)
    .bind(class_id)
    .bind(date)
    .fetch_one(pool)
    .await
    .map_err(|e| if db::is_unique_violation(&e) { BookingError::Duplicate } else { BookingError::Database(e) })?;

    tracing::info!(%user_id, %class_id, %date, "class booked");
    notifier.publish(AdminEvent::new_booking());

    Ok(BookingConfirmation { id, class_id, booked_date: date, status: "confirmed" })
}

/// Caller's most recent bookings, newest date first.
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<BookingSummary>, sqlx::Error> {
    sqlx::query_as::<_, BookingSummary>(
        r"SELECT b.id, b.class_id, c.name AS class_name, c.start_time, b.booked_date, b.status
          FROM bookings b
          LEFT JOIN classes c ON c.id = b.class_id
          WHERE b.user_id = $1
          ORDER BY b.booked_date DESC, b.created_at DESC
          LIMIT $2",
    )
    .bind(user_id)
    .bind(RECENT_LIMIT)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
#[path = "booking_test.rs"]
mod tests;
