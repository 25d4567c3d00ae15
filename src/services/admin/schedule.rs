//! Classes and locations.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{AdminError, conflict_on_unique, ensure_affected, optional_id, parse_id, still_in_use};
use crate::services::validate::{required, slugify, trimmed};

// =============================================================================
// CLASSES
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassInput {
    pub name: Option<String>,
    pub day_of_week: Option<i64>,
    pub start_time: Option<String>,
    pub location_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFields {
    pub name: String,
    pub day_of_week: i16,
    pub start_time: String,
    pub location_id: Option<Uuid>,
}

/// # Errors
///
/// `Invalid` with the first failing field's message.
pub fn class_input(input: &ClassInput) -> Result<ClassFields, AdminError> {
    let name = required(input.name.as_deref(), "Class name is required.")?;
    let day_of_week = input
        .day_of_week
        .filter(|d| (1..=7).contains(d))
        .and_then(|d| i16::try_from(d).ok())
        .ok_or(AdminError::Invalid("Please select a valid day (1–7)."))?;
    let start_time = required(input.start_time.as_deref(), "Start time is required.")?;
    let location_id = optional_id(input.location_id.as_deref(), "Location not found.")?;
    Ok(ClassFields { name, day_of_week, start_time, location_id })
}

pub async fn create_class(pool: &PgPool, input: &ClassInput) -> Result<Uuid, AdminError> {
    let fields = class_input(input)?;
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO classes (name, day_of_week, start_time, location_id) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&fields.name)
    .bind(fields.day_of_week)
    .bind(&fields.start_time)
    .bind(fields.location_id)
    .fetch_one(pool)
    .await?;
    tracing::info!(class_id = %id, name = %fields.name, "class created");
    Ok(id)
}

pub async fn update_class(pool: &PgPool, id: &str, input: &ClassInput) -> Result<(), AdminError> {
    let id = parse_id(id, "Class ID is required.", "Class")?;
    let fields = class_input(input)?;
    let result = sqlx::query(
        "UPDATE classes SET name = $2, day_of_week = $3, start_time = $4, location_id = $5 WHERE id = $1",
    )
    .bind(id)
    .bind(&fields.name)
    .bind(fields.day_of_week)
    .bind(&fields.start_time)
    .bind(fields.location_id)
    .execute(pool)
    .await?;
    ensure_affected(&result, "Class")
}

pub async fn delete_class(pool: &PgPool, id: &str) -> Result<(), AdminError> {
    let id = parse_id(id, "Class ID is required.", "Class")?;
    let result = sqlx::query("DELETE FROM classes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| still_in_use(e, "Class"))?;
    ensure_affected(&result, "Class")
}

// =============================================================================
// LOCATIONS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub maps_query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFields {
    pub name: String,
    pub slug: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub maps_query: Option<String>,
}

/// # Errors
///
/// `Invalid` for a blank name or slug.
pub fn location_input(input: &LocationInput) -> Result<LocationFields, AdminError> {
    let name = required(input.name.as_deref(), "Location name is required.")?;
    let slug = slugify(input.slug.as_deref().unwrap_or_default());
    if slug.is_empty() {
        return Err(AdminError::Invalid("Slug is required."));
    }
    Ok(LocationFields {
        name,
        slug,
        address: trimmed(input.address.as_deref()),
        phone: trimmed(input.phone.as_deref()),
        maps_query: trimmed(input.maps_query.as_deref()),
    })
}

const LOCATION_SLUG_TAKEN: &str = "A location with this slug already exists.";

pub async fn create_location(pool: &PgPool, input: &LocationInput) -> Result<Uuid, AdminError> {
    let f = location_input(input)?;
    sqlx::query_scalar(
        "INSERT INTO locations (name, slug, address, phone, maps_query) VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&f.name)
    .bind(&f.slug)
    .bind(&f.address)
    .bind(&f.phone)
    .bind(&f.maps_query)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, LOCATION_SLUG_TAKEN))
}

pub async fn update_location(pool: &PgPool, id: &str, input: &LocationInput) -> Result<(), AdminError> {
    let id = parse_id(id, "Location ID is required.", "Location")?;
    let f = location_input(input)?;
    let result = sqlx::query(
        "UPDATE locations SET name = $2, slug = $3, address = $4, phone = $5, maps_query = $6 WHERE id = $1",
    )
    .bind(id)
    .bind(&f.name)
    .bind(&f.slug)
    .bind(&f.address)
    .bind(&f.phone)
    .bind(&f.maps_query)
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, LOCATION_SLUG_TAKEN))?;
    ensure_affected(&result, "Location")
}

pub async fn delete_location(pool: &PgPool, id: &str) -> Result<(), AdminError> {
    let id = parse_id(id, "Location ID is required.", "Location")?;
    let result = sqlx::query("DELETE FROM locations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| still_in_use(e, "Location"))?;
    ensure_affected(&result, "Location")
}

#[cfg(test)]
#[path = "schedule_test.rs"]
mod tests;
