//! Snack-bar menu and pickup pre-orders.
//!
//! Pre-orders are paid at pickup, so there is no gateway step: the order is
//! written as `pending` with prices copied from the menu at order time.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::validate::trimmed;

#[derive(Debug, thiserror::Error)]
pub enum SnackError {
    #[error("Invalid items.")]
    InvalidItems,
    #[error("Add at least one item.")]
    NoItems,
    #[error("Invalid or unavailable items.")]
    UnknownItems,
    #[error("No valid items. Check availability.")]
    NoValidItems,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SnackItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_etb: f64,
    pub image_url: Option<String>,
    pub available: bool,
    pub sort_order: i32,
}

pub const SNACK_ITEM_COLUMNS: &str =
    "id, name, description, price_etb::float8 AS price_etb, image_url, available, sort_order";

/// Menu in display order. `include_unavailable` is for the back-office.
pub async fn list_items(pool: &PgPool, include_unavailable: bool) -> Result<Vec<SnackItem>, sqlx::Error> {
    sqlx::query_as::<_, SnackItem>(&format!(
        "SELECT {SNACK_ITEM_COLUMNS} FROM snack_items WHERE $1 OR available ORDER BY sort_order, name"
    ))
    .bind(include_unavailable)
    .fetch_all(pool)
    .await
}

// =============================================================================
// PRE-ORDER
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SnackLineInput {
    #[serde(default)]
    pub snack_item_id: String,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnackOrderInput {
    pub location_id: Option<String>,
    pub pickup_at: Option<String>,
    pub notes: Option<String>,
    /// A JSON array of lines, or the same array encoded as a string.
    #[serde(default)]
    pub items: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuEntry {
    pub price_etb: f64,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnackLine {
    pub snack_item_id: Uuid,
    pub quantity: i32,
    pub price_etb: f64,
}

/// Decode requested lines and drop empty ones.
///
/// # Errors
///
/// `InvalidItems` when the payload is not a line array, `NoItems` when
/// nothing with a positive quantity remains.
pub fn parse_lines(items: &serde_json::Value) -> Result<Vec<SnackLineInput>, SnackError> {
    let lines: Vec<SnackLineInput> = match items {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::String(raw) if raw.trim().is_empty() => Vec::new(),
        serde_json::Value::String(raw) => serde_json::from_str(raw).map_err(|_| SnackError::InvalidItems)?,
        other => serde_json::from_value(other.clone()).map_err(|_| SnackError::InvalidItems)?,
    };
    let lines = lines
        .into_iter()
        .filter(|l| l.quantity > 0 && !l.snack_item_id.trim().is_empty())
        .collect::<Vec<_>>();
    if lines.is_empty() {
        return Err(SnackError::NoItems);
    }
    Ok(lines)
}

/// Keep lines for available menu items, priced from the menu.
#[must_use]
pub fn build_snack_lines(lines: &[SnackLineInput], menu: &HashMap<Uuid, MenuEntry>) -> Vec<SnackLine> {
    lines
        .iter()
        .filter_map(|line| {
            let id = Uuid::parse_str(line.snack_item_id.trim()).ok()?;
            let entry = menu.get(&id).filter(|e| e.available)?;
            let quantity = i32::try_from(line.quantity).ok().filter(|q| *q >= 1)?;
            Some(SnackLine { snack_item_id: id, quantity, price_etb: entry.price_etb })
        })
        .collect()
}

/// RFC 3339, or a `datetime-local` value read in the gym's timezone.
/// Anything else is treated as no pickup time.
#[must_use]
pub fn parse_pickup_at(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = trimmed(raw)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Place a pickup pre-order. Returns the new order id.
///
/// # Errors
///
/// Item validation failures as [`SnackError`] variants.
pub async fn create_order(pool: &PgPool, user_id: Uuid, input: &SnackOrderInput) -> Result<Uuid, SnackError> {
    let requested = parse_lines(&input.items)?;
    let ids = requested
        .iter()
        .filter_map(|l| Uuid::parse_str(l.snack_item_id.trim()).ok())
        .collect::<Vec<_>>();

    let rows = sqlx::query_as::<_, (Uuid, f64, bool)>(
        "SELECT id, price_etb::float8, available FROM snack_items WHERE id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;
    if rows.is_empty() {
        return Err(SnackError::UnknownItems);
    }
    let menu = rows
        .into_iter()
        .map(|(id, price_etb, available)| (id, MenuEntry { price_etb, available }))
        .collect::<HashMap<_, _>>();

    let lines = build_snack_lines(&requested, &menu);
    if lines.is_empty() {
        return Err(SnackError::NoValidItems);
    }

    let location_id = trimmed(input.location_id.as_deref()).and_then(|s| Uuid::parse_str(&s).ok());
    let pickup_at = parse_pickup_at(input.pickup_at.as_deref());
    let notes = trimmed(input.notes.as_deref());

    let mut tx = pool.begin().await?;
    let order_id: Uuid = sqlx::query_scalar(
        r"INSERT INTO snack_orders (user_id, location_id, status, pickup_at, notes)
          VALUES ($1, $2, 'pending', $3, $4)
          RETURNING id",
    )
    .bind(user_id)
    .bind(location_id)
    .bind(pickup_at)
    .bind(notes)
    .fetch_one(&mut *tx)
    .await?;

    for line in &lines {
        sqlx::query(
            "INSERT INTO snack_order_items (snack_order_id, snack_item_id, quantity, price_etb) VALUES ($1, $2, $3, $4)",
        )
        .bind(order_id)
        .bind(line.snack_item_id)
        .bind(line.quantity)
        .bind(line.price_etb)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!(%user_id, %order_id, lines = lines.len(), "snack pre-order placed");
    Ok(order_id)
}

// =============================================================================
// HISTORY
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SnackOrderItemView {
    #[serde(skip)]
    pub snack_order_id: Uuid,
    pub snack_item_id: Uuid,
    pub item_name: Option<String>,
    pub quantity: i32,
    pub price_etb: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SnackOrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub pickup_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub location_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<SnackOrderItemView>,
}

/// Pre-orders with items, newest first. `user_id = None` lists everyone's.
pub async fn list_orders(pool: &PgPool, user_id: Option<Uuid>) -> Result<Vec<SnackOrderView>, sqlx::Error> {
    let mut orders = sqlx::query_as::<_, SnackOrderView>(
        r"SELECT o.id, o.user_id, o.status, o.pickup_at, o.notes, l.name AS location_name, o.created_at
          FROM snack_orders o
          LEFT JOIN locations l ON l.id = o.location_id
          WHERE $1::uuid IS NULL OR o.user_id = $1
          ORDER BY o.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let ids = orders.iter().map(|o| o.id).collect::<Vec<_>>();
    let items = sqlx::query_as::<_, SnackOrderItemView>(
        r"SELECT i.snack_order_id, i.snack_item_id, s.name AS item_name, i.quantity, i.price_etb::float8 AS price_etb
          FROM snack_order_items i
          LEFT JOIN snack_items s ON s.id = i.snack_item_id
          WHERE i.snack_order_id = ANY($1)
          ORDER BY s.name",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<Uuid, Vec<SnackOrderItemView>> = HashMap::new();
    for item in items {
        by_order.entry(item.snack_order_id).or_default().push(item);
    }
    for order in &mut orders {
        order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(orders)
}

#[cfg(test)]
#[path = "snack_test.rs"]
mod tests;
