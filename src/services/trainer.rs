//! Trainer profiles, member ratings, and the trainer's day view.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::schedule;

#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    #[error("Trainer is required.")]
    TrainerRequired,
    #[error("Rating must be 1-5.")]
    InvalidRating,
    #[error("Trainer not found.")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrainerProfile {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub display_name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub specialties: Vec<String>,
    pub sort_order: i32,
    pub location_id: Option<Uuid>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_url: Option<String>,
    pub tiktok_url: Option<String>,
    pub average_rating: Option<f64>,
    pub rating_count: i32,
}

pub async fn list_trainers(pool: &PgPool) -> Result<Vec<TrainerProfile>, sqlx::Error> {
    sqlx::query_as::<_, TrainerProfile>(
        r"SELECT id, profile_id, display_name, bio, image_url, specialties, sort_order, location_id,
                 instagram_url, facebook_url, twitter_url, tiktok_url, average_rating, rating_count
          FROM trainer_profiles
          ORDER BY sort_order, display_name",
    )
    .fetch_all(pool)
    .await
}

// =============================================================================
// RATINGS
// =============================================================================

/// Whole star rating between 1 and 5.
///
/// # Errors
///
/// `InvalidRating` for missing, fractional, or out-of-range values.
pub fn validate_rating(raw: Option<f64>) -> Result<i16, TrainerError> {
    let value = raw.ok_or(TrainerError::InvalidRating)?;
    if value.fract() != 0.0 || !(1.0..=5.0).contains(&value) {
        return Err(TrainerError::InvalidRating);
    }
    // Range-checked above.
    #[allow(clippy::cast_possible_truncation)]
    let stars = value as i16;
    Ok(stars)
}

/// Upsert the caller's rating, then recompute the trainer's average
/// (two decimals) and count in the same transaction.
///
/// # Errors
///
/// Validation variants, or `NotFound` for an unknown trainer.
pub async fn rate_trainer(
    pool: &PgPool,
    user_id: Uuid,
    trainer_id: &str,
    rating: Option<f64>,
) -> Result<(), TrainerError> {
    let trainer_id = trainer_id.trim();
    if trainer_id.is_empty() {
        return Err(TrainerError::TrainerRequired);
    }
    let rating = validate_rating(rating)?;
    let trainer_id = Uuid::parse_str(trainer_id).map_err(|_| TrainerError::NotFound)?;

    let mut tx = pool.begin().await?;
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM trainer_profiles WHERE id = $1)")
        .bind(trainer_id)
        .fetch_one(&mut *tx)
        .await?;
    if !exists {
        return Err(TrainerError::NotFound);
    }

    sqlx::query(
        r"INSERT INTO trainer_ratings (trainer_profile_id, user_id, rating)
          VALUES ($1, $2, $3)
          ON CONFLICT (trainer_profile_id, user_id) DO UPDATE SET rating = EXCLUDED.rating",
    )
    .bind(trainer_id)
    .bind(user_id)
    .bind(rating)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"UPDATE trainer_profiles t
          SET average_rating = r.avg, rating_count = r.cnt
          FROM (
              SELECT ROUND(AVG(rating)::numeric, 2)::float8 AS avg, COUNT(*)::int AS cnt
              FROM trainer_ratings
              WHERE trainer_profile_id = $1
          ) r
          WHERE t.id = $1",
    )
    .bind(trainer_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(%trainer_id, %user_id, rating, "trainer rated");
    Ok(())
}

// =============================================================================
// TODAY
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TodayClass {
    pub id: Uuid,
    pub name: String,
    pub start_time: String,
    #[sqlx(skip)]
    pub time_label: String,
    pub check_ins: i64,
}

/// Classes running on `today`'s weekday with the number of check-ins
/// recorded against each one today.
pub async fn today_classes(pool: &PgPool, today: NaiveDate) -> Result<Vec<TodayClass>, sqlx::Error> {
    let mut rows = sqlx::query_as::<_, TodayClass>(
        r"SELECT c.id, c.name, c.start_time,
                 (SELECT COUNT(*) FROM check_ins ci
                  WHERE ci.class_id = c.id AND ci.checked_in_at::date = $2) AS check_ins
          FROM classes c
          WHERE c.day_of_week = $1
          ORDER BY c.start_time",
    )
    .bind(schedule::iso_weekday(today))
    .bind(today)
    .fetch_all(pool)
    .await?;
    for row in &mut rows {
        row.time_label = schedule::time_label(&row.start_time);
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "trainer_test.rs"]
mod tests;
