//! Dashboard counters for the back-office landing page.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Overview {
    pub members: i64,
    pub bookings: i64,
    pub bookings_today: i64,
    pub active_subscriptions: i64,
    pub pending_orders: i64,
    pub pending_snack_orders: i64,
    pub check_ins_today: i64,
}

pub async fn overview(pool: &PgPool, today: NaiveDate) -> Result<Overview, sqlx::Error> {
    sqlx::query_as::<_, Overview>(
        r"SELECT
              (SELECT COUNT(*) FROM profiles) AS members,
              (SELECT COUNT(*) FROM bookings) AS bookings,
              (SELECT COUNT(*) FROM bookings WHERE booked_date = $1) AS bookings_today,
              (SELECT COUNT(*) FROM subscriptions WHERE status = 'active' AND end_date >= $1) AS active_subscriptions,
              (SELECT COUNT(*) FROM orders WHERE status = 'pending_payment') AS pending_orders,
              (SELECT COUNT(*) FROM snack_orders WHERE status IN ('pending', 'preparing')) AS pending_snack_orders,
              (SELECT COUNT(*) FROM check_ins WHERE checked_in_at::date = $1) AS check_ins_today",
    )
    .bind(today)
    .fetch_one(pool)
    .await
}
