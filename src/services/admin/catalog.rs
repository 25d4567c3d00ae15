//! Shop products and orders, snack menu and pre-orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use sqlx::PgPool;
use uuid::Uuid;

use super::{AdminError, conflict_on_unique, ensure_affected, parse_id, price, still_in_use};
use crate::services::snack::parse_pickup_at;
use crate::services::validate::{required, slugify, trimmed};

pub const SHOP_ORDER_STATUSES: [&str; 4] = ["pending_payment", "paid", "shipped", "cancelled"];
pub const SNACK_ORDER_STATUSES: [&str; 5] = ["pending", "preparing", "ready", "picked_up", "cancelled"];

const DEFAULT_CATEGORY: &str = "gear";
const PRODUCT_SLUG_TAKEN: &str = "A product with this slug already exists.";

// =============================================================================
// PRODUCTS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_etb: Option<f64>,
    pub image_url: Option<String>,
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category: String,
    pub price_etb: f64,
    pub image_url: Option<String>,
    pub stock: i32,
}

/// # Errors
///
/// `Invalid` with the first failing field's message.
pub fn product_input(input: &ProductInput) -> Result<ProductFields, AdminError> {
    let name = required(input.name.as_deref(), "Product name is required.")?;
    let slug = slugify(input.slug.as_deref().unwrap_or_default());
    if slug.is_empty() {
        return Err(AdminError::Invalid("Slug is required."));
    }
    let price_etb = price(input.price_etb)?;
    let stock = i32::try_from(input.stock.unwrap_or(0).max(0)).unwrap_or(i32::MAX);
    Ok(ProductFields {
        name,
        slug,
        description: trimmed(input.description.as_deref()),
        category: trimmed(input.category.as_deref()).unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
        price_etb,
        image_url: trimmed(input.image_url.as_deref()),
        stock,
    })
}

pub async fn create_product(pool: &PgPool, input: &ProductInput) -> Result<Uuid, AdminError> {
    let f = product_input(input)?;
    sqlx::query_scalar(
        r"INSERT INTO products (name, slug, description, category, price_etb, image_url, stock)
          VALUES ($1, $2, $3, $4, $5, $6, $7)
          RETURNING id",
    )
    .bind(&f.name)
    .bind(&f.slug)
    .bind(&f.description)
    .bind(&f.category)
    .bind(f.price_etb)
    .bind(&f.image_url)
    .bind(f.stock)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, PRODUCT_SLUG_TAKEN))
}

pub async fn update_product(pool: &PgPool, id: &str, input: &ProductInput) -> Result<(), AdminError> {
    let id = parse_id(id, "Product ID is required.", "Product")?;
    let f = product_input(input)?;
    let result = sqlx::query(
        r"UPDATE products
          SET name = $2, slug = $3, description = $4, category = $5, price_etb = $6,
              image_url = $7, stock = $8, updated_at = now()
          WHERE id = $1",
    )
    .bind(id)
    .bind(&f.name)
    .bind(&f.slug)
    .bind(&f.description)
    .bind(&f.category)
    .bind(f.price_etb)
    .bind(&f.image_url)
    .bind(f.stock)
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, PRODUCT_SLUG_TAKEN))?;
    ensure_affected(&result, "Product")
}

pub async fn delete_product(pool: &PgPool, id: &str) -> Result<(), AdminError> {
    let id = parse_id(id, "Product ID is required.", "Product")?;
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| still_in_use(e, "Product"))?;
    ensure_affected(&result, "Product")
}

// =============================================================================
// SHOP ORDERS
// =============================================================================

/// # Errors
///
/// `Invalid("Invalid status.")` outside the shop status set.
pub fn shop_order_status(raw: Option<&str>) -> Result<&'static str, AdminError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    SHOP_ORDER_STATUSES
        .iter()
        .find(|s| **s == raw)
        .copied()
        .ok_or(AdminError::Invalid("Invalid status."))
}

pub async fn update_order_status(pool: &PgPool, id: &str, status: Option<&str>) -> Result<(), AdminError> {
    let id = parse_id(id, "Order ID is required.", "Order")?;
    let status = shop_order_status(status)?;
    let result = sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
    ensure_affected(&result, "Order")?;
    tracing::info!(order_id = %id, status, "order status changed");
    Ok(())
}

// =============================================================================
// SNACK ITEMS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnackItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_etb: Option<f64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub available: bool,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnackItemFields {
    pub name: String,
    pub description: Option<String>,
    pub price_etb: f64,
    pub image_url: Option<String>,
    pub available: bool,
    pub sort_order: i32,
}

/// # Errors
///
/// `Invalid` for a blank name or bad price.
pub fn snack_item_input(input: &SnackItemInput) -> Result<SnackItemFields, AdminError> {
    let name = required(input.name.as_deref(), "Name is required.")?;
    let price_etb = price(input.price_etb)?;
    Ok(SnackItemFields {
        name,
        description: trimmed(input.description.as_deref()),
        price_etb,
        image_url: trimmed(input.image_url.as_deref()),
        available: input.available,
        sort_order: input.sort_order.unwrap_or(0),
    })
}

pub async fn create_snack_item(pool: &PgPool, input: &SnackItemInput) -> Result<Uuid, AdminError> {
    let f = snack_item_input(input)?;
    let id: Uuid = sqlx::query_scalar(
        r"INSERT INTO snack_items (name, description, price_etb, image_url, available, sort_order)
          VALUES ($1, $2, $3, $4, $5, $6)
          RETURNING id",
    )
    .bind(&f.name)
    .bind(&f.description)
    .bind(f.price_etb)
    .bind(&f.image_url)
    .bind(f.available)
    .bind(f.sort_order)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn update_snack_item(pool: &PgPool, id: &str, input: &SnackItemInput) -> Result<(), AdminError> {
    let id = parse_id(id, "Snack item ID is required.", "Snack item")?;
    let f = snack_item_input(input)?;
    let result = sqlx::query(
        r"UPDATE snack_items
          SET name = $2, description = $3, price_etb = $4, image_url = $5, available = $6, sort_order = $7
          WHERE id = $1",
    )
    .bind(id)
    .bind(&f.name)
    .bind(&f.description)
    .bind(f.price_etb)
    .bind(&f.image_url)
    .bind(f.available)
    .bind(f.sort_order)
    .execute(pool)
    .await?;
    ensure_affected(&result, "Snack item")
}

pub async fn delete_snack_item(pool: &PgPool, id: &str) -> Result<(), AdminError> {
    let id = parse_id(id, "Snack item ID is required.", "Snack item")?;
    let result = sqlx::query("DELETE FROM snack_items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| still_in_use(e, "Snack item"))?;
    ensure_affected(&result, "Snack item")
}

// =============================================================================
// SNACK ORDERS
// =============================================================================

/// Partial update. An absent field is left alone; `"pickup_at": null`
/// clears the pickup time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnackOrderPatch {
    pub status: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub pickup_at: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnackOrderChanges {
    pub status: Option<&'static str>,
    /// `Some(None)` clears the pickup time.
    pub pickup_at: Option<Option<DateTime<Utc>>>,
}

impl SnackOrderChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.pickup_at.is_none()
    }
}

/// # Errors
///
/// `Invalid` for an unknown status or an unparseable pickup time.
pub fn snack_order_changes(patch: &SnackOrderPatch) -> Result<SnackOrderChanges, AdminError> {
    let status = match trimmed(patch.status.as_deref()) {
        None => None,
        Some(raw) => Some(
            SNACK_ORDER_STATUSES
                .iter()
                .find(|s| **s == raw)
                .copied()
                .ok_or(AdminError::Invalid("Invalid status."))?,
        ),
    };
    let pickup_at = match &patch.pickup_at {
        None => None,
        Some(raw) => match trimmed(raw.as_deref()) {
            None => Some(None),
            Some(value) => Some(Some(
                parse_pickup_at(Some(&value)).ok_or(AdminError::Invalid("Invalid pickup time."))?,
            )),
        },
    };
    Ok(SnackOrderChanges { status, pickup_at })
}

pub async fn update_snack_order(pool: &PgPool, id: &str, patch: &SnackOrderPatch) -> Result<(), AdminError> {
    let id = parse_id(id, "Order ID is required.", "Order")?;
    let changes = snack_order_changes(patch)?;
    if changes.is_empty() {
        return Ok(());
    }
    let result = sqlx::query(
        r"UPDATE snack_orders
          SET status = COALESCE($2, status),
              pickup_at = CASE WHEN $3 THEN $4 ELSE pickup_at END
          WHERE id = $1",
    )
    .bind(id)
    .bind(changes.status)
    .bind(changes.pickup_at.is_some())
    .bind(changes.pickup_at.flatten())
    .execute(pool)
    .await?;
    ensure_affected(&result, "Order")
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
