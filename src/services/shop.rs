//! Pro-shop catalogue, checkout, and order history.
//!
//! DESIGN
//! ======
//! Checkout trusts only product ids and quantities from the client. Prices
//! and stock are re-read from the database, quantities are clamped to stock,
//! and lines that end up empty are dropped. The order is written as
//! `pending_payment` before the gateway call; the webhook marks it paid and
//! decrements stock.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::ChapaConfig;
use crate::services::chapa::{self, ChapaError, InitializeRequest};
use crate::services::payment::{self, PaymentError};

pub const ORDER_RETURN_PATH: &str = "/account/orders";

#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("Payment is not configured (missing CHAPA_SECRET_KEY).")]
    NotConfigured,
    #[error("At least one item with product_id and quantity is required.")]
    NoItems,
    #[error("Profile email is required for payment.")]
    MissingEmail,
    #[error("Products not found.")]
    ProductsNotFound,
    #[error("Product not found.")]
    ProductNotFound,
    #[error("No valid items or insufficient stock.")]
    NoValidItems,
    #[error(transparent)]
    Gateway(#[from] ChapaError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<PaymentError> for ShopError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Database(e) => Self::Database(e),
            PaymentError::Gateway(e) => Self::Gateway(e),
            PaymentError::NotConfigured => Self::NotConfigured,
            _ => Self::MissingEmail,
        }
    }
}

// =============================================================================
// CATALOGUE
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category: String,
    pub price_etb: f64,
    pub image_url: Option<String>,
    pub stock: i32,
}

pub const PRODUCT_COLUMNS: &str =
    "id, name, slug, description, category, price_etb::float8 AS price_etb, image_url, stock";

pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY category, name"))
        .fetch_all(pool)
        .await
}

/// # Errors
///
/// `ProductNotFound` when no product has the slug.
pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Product, ShopError> {
    sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1"))
        .bind(slug.trim().to_lowercase())
        .fetch_optional(pool)
        .await?
        .ok_or(ShopError::ProductNotFound)
}

// =============================================================================
// CHECKOUT
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItem {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedStock {
    pub price_etb: f64,
    pub stock: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_etb: f64,
}

/// Resolve requested items against current price and stock. Unknown
/// products and non-positive quantities are skipped; quantities above
/// stock are clamped. Returns the kept lines and their total.
#[must_use]
pub fn build_order_lines(items: &[CheckoutItem], products: &HashMap<Uuid, PricedStock>) -> (Vec<OrderLine>, f64) {
    let mut lines = Vec::new();
    let mut total = 0.0;
    for item in items {
        let Ok(product_id) = Uuid::parse_str(item.product_id.trim()) else {
            continue;
        };
        let Some(product) = products.get(&product_id) else {
            continue;
        };
        if item.quantity < 1 {
            continue;
        }
        let quantity = i32::try_from(item.quantity.min(i64::from(product.stock))).unwrap_or(0);
        if quantity < 1 {
            continue;
        }
        total += product.price_etb * f64::from(quantity);
        lines.push(OrderLine { product_id, quantity, price_etb: product.price_etb });
    }
    (lines, total)
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResult {
    pub checkout_url: String,
    pub order_id: Uuid,
}

/// Create a pending order and open a gateway checkout for it.
///
/// # Errors
///
/// Validation failures before any write, `Gateway` when Chapa refuses the
/// initialize call (the order stays `pending_payment`).
pub async fn checkout(
    pool: &PgPool,
    http: &reqwest::Client,
    cfg: Option<&ChapaConfig>,
    app_url: Option<&str>,
    user_id: Uuid,
    items: &[CheckoutItem],
) -> Result<CheckoutResult, ShopError> {
    let cfg = cfg.ok_or(ShopError::NotConfigured)?;
    if items.is_empty() {
        return Err(ShopError::NoItems);
    }
    let payer = payment::load_payer(pool, user_id).await?.ok_or(ShopError::MissingEmail)?;

    let mut ids = items
        .iter()
        .filter_map(|i| Uuid::parse_str(i.product_id.trim()).ok())
        .collect::<Vec<_>>();
    ids.sort_unstable();
    ids.dedup();

    let rows = sqlx::query_as::<_, (Uuid, f64, i32)>(
        "SELECT id, price_etb::float8, stock FROM products WHERE id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;
    if rows.is_empty() {
        return Err(ShopError::ProductsNotFound);
    }
    let products = rows
        .into_iter()
        .map(|(id, price_etb, stock)| (id, PricedStock { price_etb, stock }))
        .collect::<HashMap<_, _>>();

    let (lines, total) = build_order_lines(items, &products);
    if lines.is_empty() || total <= 0.0 {
        return Err(ShopError::NoValidItems);
    }

    let mut tx = pool.begin().await?;
    let order_id: Uuid = sqlx::query_scalar(
        "INSERT INTO orders (user_id, status, total_etb) VALUES ($1, 'pending_payment', $2) RETURNING id",
    )
    .bind(user_id)
    .bind(total)
    .fetch_one(&mut *tx)
    .await?;

    let tx_ref = chapa::shop_tx_ref(order_id);
    sqlx::query("UPDATE orders SET chapa_tx_ref = $2 WHERE id = $1")
        .bind(order_id)
        .bind(&tx_ref)
        .execute(&mut *tx)
        .await?;

    for line in &lines {
        sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, price_etb) VALUES ($1, $2, $3, $4)")
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price_etb)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    let payload = InitializeRequest::new(
        total.round().to_string(),
        payer.email,
        payer.full_name.as_deref(),
        tx_ref,
        app_url,
        ORDER_RETURN_PATH,
    );
    let checkout_url = chapa::initialize(http, cfg, &payload).await?;
    tracing::info!(%user_id, %order_id, lines = lines.len(), "shop checkout opened");

    Ok(CheckoutResult { checkout_url, order_id })
}

// =============================================================================
// ORDER HISTORY
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItemView {
    #[serde(skip)]
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub price_etb: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub total_etb: f64,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<OrderItemView>,
}

/// Orders with their items, newest first. `user_id = None` lists everyone's.
pub async fn list_orders(pool: &PgPool, user_id: Option<Uuid>) -> Result<Vec<OrderView>, sqlx::Error> {
    let mut orders = sqlx::query_as::<_, OrderView>(
        r"SELECT id, user_id, status, total_etb::float8 AS total_etb, created_at
          FROM orders
          WHERE $1::uuid IS NULL OR user_id = $1
          ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let ids = orders.iter().map(|o| o.id).collect::<Vec<_>>();
    let items = sqlx::query_as::<_, OrderItemView>(
        r"SELECT oi.order_id, oi.product_id, p.name AS product_name, oi.quantity, oi.price_etb::float8 AS price_etb
          FROM order_items oi
          LEFT JOIN products p ON p.id = oi.product_id
          WHERE oi.order_id = ANY($1)
          ORDER BY p.name",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    for order in &mut orders {
        order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(orders)
}

#[cfg(test)]
#[path = "shop_test.rs"]
mod tests;
