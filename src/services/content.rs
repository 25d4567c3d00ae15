//! Public content (gallery, locations) and the members-only video library.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::membership::{self, MembershipError};

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Active membership required.")]
    MembershipRequired,
    #[error("Video not found.")]
    VideoNotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<MembershipError> for ContentError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::Inactive => Self::MembershipRequired,
            MembershipError::Database(e) => Self::Database(e),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GalleryImage {
    pub id: Uuid,
    pub src: String,
    pub alt: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub maps_query: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WorkoutVideo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: String,
    pub duration_sec: Option<i32>,
    pub tags: Vec<String>,
    pub sort_order: i32,
}

const VIDEO_COLUMNS: &str = "id, title, description, thumbnail_url, video_url, duration_sec, tags, sort_order";

pub async fn list_gallery(pool: &PgPool) -> Result<Vec<GalleryImage>, sqlx::Error> {
    sqlx::query_as::<_, GalleryImage>(
        "SELECT id, src, alt, width, height, sort_order FROM gallery_images ORDER BY sort_order, created_at",
    )
    .fetch_all(pool)
    .await
}

pub async fn list_locations(pool: &PgPool) -> Result<Vec<Location>, sqlx::Error> {
    sqlx::query_as::<_, Location>("SELECT id, name, slug, address, phone, maps_query FROM locations ORDER BY name")
        .fetch_all(pool)
        .await
}

/// Every video, unguarded. Callers gate access.
pub async fn list_videos(pool: &PgPool) -> Result<Vec<WorkoutVideo>, sqlx::Error> {
    sqlx::query_as::<_, WorkoutVideo>(&format!("SELECT {VIDEO_COLUMNS} FROM workout_videos ORDER BY sort_order, title"))
        .fetch_all(pool)
        .await
}

/// Library index for an active member.
///
/// # Errors
///
/// `MembershipRequired` when the caller is not an active member.
pub async fn library(pool: &PgPool, user_id: Uuid) -> Result<Vec<WorkoutVideo>, ContentError> {
    membership::require_active(pool, user_id).await?;
    Ok(list_videos(pool).await?)
}

/// One library video for an active member.
///
/// # Errors
///
/// `MembershipRequired` before `VideoNotFound`, so non-members cannot learn
/// which ids exist.
pub async fn library_video(pool: &PgPool, user_id: Uuid, video_id: Uuid) -> Result<WorkoutVideo, ContentError> {
    membership::require_active(pool, user_id).await?;
    sqlx::query_as::<_, WorkoutVideo>(&format!("SELECT {VIDEO_COLUMNS} FROM workout_videos WHERE id = $1"))
        .bind(video_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ContentError::VideoNotFound)
}
