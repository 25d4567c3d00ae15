//! Back-office CRUD over every gym entity.
//!
//! DESIGN
//! ======
//! One submodule per area. Each write validates its input with a pure
//! `*_input` function (so messages are testable without a database), then
//! runs a single statement. Callers are expected to have passed the
//! `AdminUser` extractor already; nothing here re-checks the role.
//!
//! ERROR HANDLING
//! ==============
//! Validation failures are `Invalid` with a user-facing message. Updates
//! and deletes that touch no row are `NotFound`. Unique-constraint hits
//! (slugs) become `Conflict`. A write naming a row that does not exist is
//! `Invalid`; deleting a row other records still point at is `InUse`.

pub mod catalog;
pub mod content;
pub mod members;
pub mod overview;
pub mod schedule;

use sqlx::postgres::PgQueryResult;
use uuid::Uuid;

use crate::db;
use crate::services::membership::MembershipError;

/// Row limit for the bookings list.
pub const LIST_LIMIT: i64 = 300;
/// Row limit for check-ins and memberships.
pub const LONG_LIST_LIMIT: i64 = 500;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error("{0} not found.")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0} is still in use.")]
    InUse(&'static str),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

const MISSING_REFERENCE: &str = "Referenced record does not exist.";

impl From<sqlx::Error> for AdminError {
    fn from(err: sqlx::Error) -> Self {
        if db::is_foreign_key_violation(&err) {
            Self::Invalid(MISSING_REFERENCE)
        } else {
            Self::Database(err)
        }
    }
}

impl From<&'static str> for AdminError {
    fn from(message: &'static str) -> Self {
        Self::Invalid(message)
    }
}

impl From<MembershipError> for AdminError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::Inactive => Self::Invalid("Member does not have an active membership."),
            MembershipError::Database(e) => Self::Database(e),
        }
    }
}

/// Parse a path id. Blank gives `missing`; garbage gives `NotFound(entity)`.
///
/// # Errors
///
/// See above.
pub fn parse_id(raw: &str, missing: &'static str, entity: &'static str) -> Result<Uuid, AdminError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AdminError::Invalid(missing));
    }
    Uuid::parse_str(raw).map_err(|_| AdminError::NotFound(entity))
}

/// Optional foreign key from a form field. Blank means unset.
///
/// # Errors
///
/// `Invalid(message)` when present but not a UUID.
pub fn optional_id(raw: Option<&str>, message: &'static str) -> Result<Option<Uuid>, AdminError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => Uuid::parse_str(s).map(Some).map_err(|_| AdminError::Invalid(message)),
    }
}

/// Required foreign key from a form field.
///
/// # Errors
///
/// `Invalid(message)` when blank or not a UUID.
pub fn required_id(raw: Option<&str>, message: &'static str) -> Result<Uuid, AdminError> {
    optional_id(raw, message)?.ok_or(AdminError::Invalid(message))
}

/// Price in ETB: finite and not negative.
///
/// # Errors
///
/// `Invalid("Price must be 0 or more.")`.
pub fn price(raw: Option<f64>) -> Result<f64, AdminError> {
    match raw {
        Some(p) if p.is_finite() && p >= 0.0 => Ok(p),
        _ => Err(AdminError::Invalid("Price must be 0 or more.")),
    }
}

/// `NotFound(entity)` when a write matched no row.
///
/// # Errors
///
/// See above.
pub fn ensure_affected(result: &PgQueryResult, entity: &'static str) -> Result<(), AdminError> {
    if result.rows_affected() == 0 {
        return Err(AdminError::NotFound(entity));
    }
    Ok(())
}

/// Map a unique violation to `Conflict(message)`, pass other errors through.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &'static str) -> AdminError {
    if db::is_unique_violation(&err) {
        AdminError::Conflict(message)
    } else {
        err.into()
    }
}

/// Map a foreign-key violation on delete to `InUse(entity)`.
pub(crate) fn still_in_use(err: sqlx::Error, entity: &'static str) -> AdminError {
    if db::is_foreign_key_violation(&err) {
        AdminError::InUse(entity)
    } else {
        AdminError::Database(err)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
