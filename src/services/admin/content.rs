//! Trainers, gallery images, and workout videos.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{AdminError, ensure_affected, optional_id, parse_id, required_id, still_in_use};
use crate::services::validate::{required, split_csv, trimmed};

/// A string list sent either as a JSON array or as one comma-separated
/// string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListOrCsv {
    List(Vec<String>),
    Csv(String),
}

impl ListOrCsv {
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            Self::Csv(raw) => split_csv(raw),
        }
    }
}

fn list(raw: Option<&ListOrCsv>) -> Vec<String> {
    raw.map(ListOrCsv::to_vec).unwrap_or_default()
}

// =============================================================================
// TRAINERS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainerInput {
    pub profile_id: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub specialties: Option<ListOrCsv>,
    pub sort_order: Option<i32>,
    pub location_id: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_url: Option<String>,
    pub tiktok_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerFields {
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
}

/// # Errors
///
/// `Invalid` for a missing member or display name.
pub fn trainer_input(input: &TrainerInput) -> Result<TrainerFields, AdminError> {
    let profile_id = required_id(input.profile_id.as_deref(), "Member is required.")?;
    let display_name = required(input.display_name.as_deref(), "Display name is required.")?;
    Ok(TrainerFields {
        profile_id,
        display_name,
        bio: trimmed(input.bio.as_deref()),
        image_url: trimmed(input.image_url.as_deref()),
        specialties: list(input.specialties.as_ref()),
        sort_order: input.sort_order.unwrap_or(0),
        location_id: optional_id(input.location_id.as_deref(), "Location not found.")?,
        instagram_url: trimmed(input.instagram_url.as_deref()),
        facebook_url: trimmed(input.facebook_url.as_deref()),
        twitter_url: trimmed(input.twitter_url.as_deref()),
        tiktok_url: trimmed(input.tiktok_url.as_deref()),
    })
}

pub async fn create_trainer(pool: &PgPool, input: &TrainerInput) -> Result<Uuid, AdminError> {
    let f = trainer_input(input)?;
    let id: Uuid = sqlx::query_scalar(
        r"INSERT INTO trainer_profiles
              (profile_id, display_name, bio, image_url, specialties, sort_order, location_id,
               instagram_url, facebook_url, twitter_url, tiktok_url)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
          RETURNING id",
    )
    .bind(f.profile_id)
    .bind(&f.display_name)
    .bind(&f.bio)
    .bind(&f.image_url)
    .bind(&f.specialties)
    .bind(f.sort_order)
    .bind(f.location_id)
    .bind(&f.instagram_url)
    .bind(&f.facebook_url)
    .bind(&f.twitter_url)
    .bind(&f.tiktok_url)
    .fetch_one(pool)
    .await?;
    tracing::info!(trainer_id = %id, profile_id = %f.profile_id, "trainer profile created");
    Ok(id)
}

pub async fn update_trainer(pool: &PgPool, id: &str, input: &TrainerInput) -> Result<(), AdminError> {
    let id = parse_id(id, "Trainer profile ID is required.", "Trainer")?;
    let f = trainer_input(input)?;
    let result = sqlx::query(
        r"UPDATE trainer_profiles
          SET profile_id = $2, display_name = $3, bio = $4, image_url = $5, specialties = $6,
              sort_order = $7, location_id = $8, instagram_url = $9, facebook_url = $10,
              twitter_url = $11, tiktok_url = $12
          WHERE id = $1",
    )
    .bind(id)
    .bind(f.profile_id)
    .bind(&f.display_name)
    .bind(&f.bio)
    .bind(&f.image_url)
    .bind(&f.specialties)
    .bind(f.sort_order)
    .bind(f.location_id)
    .bind(&f.instagram_url)
    .bind(&f.facebook_url)
    .bind(&f.twitter_url)
    .bind(&f.tiktok_url)
    .execute(pool)
    .await?;
    ensure_affected(&result, "Trainer")
}

pub async fn delete_trainer(pool: &PgPool, id: &str) -> Result<(), AdminError> {
    let id = parse_id(id, "Trainer profile ID is required.", "Trainer")?;
    let result = sqlx::query("DELETE FROM trainer_profiles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| still_in_use(e, "Trainer"))?;
    ensure_affected(&result, "Trainer")
}

// =============================================================================
// GALLERY
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryImageInput {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImageFields {
    pub src: String,
    pub alt: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sort_order: i32,
}

/// # Errors
///
/// `Invalid("Image URL is required.")`.
pub fn gallery_image_input(input: &GalleryImageInput) -> Result<GalleryImageFields, AdminError> {
    let src = required(input.src.as_deref(), "Image URL is required.")?;
    Ok(GalleryImageFields {
        src,
        alt: trimmed(input.alt.as_deref()).unwrap_or_default(),
        width: input.width,
        height: input.height,
        sort_order: input.sort_order.unwrap_or(0),
    })
}

pub async fn create_gallery_image(pool: &PgPool, input: &GalleryImageInput) -> Result<Uuid, AdminError> {
    let f = gallery_image_input(input)?;
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO gallery_images (src, alt, width, height, sort_order) VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&f.src)
    .bind(&f.alt)
    .bind(f.width)
    .bind(f.height)
    .bind(f.sort_order)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn update_gallery_image(pool: &PgPool, id: &str, input: &GalleryImageInput) -> Result<(), AdminError> {
    let id = parse_id(id, "Image ID is required.", "Image")?;
    let f = gallery_image_input(input)?;
    let result = sqlx::query(
        "UPDATE gallery_images SET src = $2, alt = $3, width = $4, height = $5, sort_order = $6 WHERE id = $1",
    )
    .bind(id)
    .bind(&f.src)
    .bind(&f.alt)
    .bind(f.width)
    .bind(f.height)
    .bind(f.sort_order)
    .execute(pool)
    .await?;
    ensure_affected(&result, "Image")
}

pub async fn delete_gallery_image(pool: &PgPool, id: &str) -> Result<(), AdminError> {
    let id = parse_id(id, "Image ID is required.", "Image")?;
    let result = sqlx::query("DELETE FROM gallery_images WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| still_in_use(e, "Image"))?;
    ensure_affected(&result, "Image")
}

// =============================================================================
// WORKOUT VIDEOS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkoutVideoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub duration_sec: Option<i32>,
    pub tags: Option<ListOrCsv>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutVideoFields {
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: String,
    pub duration_sec: Option<i32>,
    pub tags: Vec<String>,
    pub sort_order: i32,
}

/// # Errors
///
/// `Invalid` for a blank title or video URL.
pub fn workout_video_input(input: &WorkoutVideoInput) -> Result<WorkoutVideoFields, AdminError> {
    let title = required(input.title.as_deref(), "Title is required.")?;
    let video_url = required(input.video_url.as_deref(), "Video URL is required.")?;
    Ok(WorkoutVideoFields {
        title,
        description: trimmed(input.description.as_deref()),
        thumbnail_url: trimmed(input.thumbnail_url.as_deref()),
        video_url,
        duration_sec: input.duration_sec,
        tags: list(input.tags.as_ref()),
        sort_order: input.sort_order.unwrap_or(0),
    })
}

pub async fn create_workout_video(pool: &PgPool, input: &WorkoutVideoInput) -> Result<Uuid, AdminError> {
    let f = workout_video_input(input)?;
    let id: Uuid = sqlx::query_scalar(
        r"INSERT INTO workout_videos (title, description, thumbnail_url, video_url, duration_sec, tags, sort_order)
          VALUES ($1, $2, $3, $4, $5, $6, $7)
          RETURNING id",
    )
    .bind(&f.title)
    .bind(&f.description)
    .bind(&f.thumbnail_url)
    .bind(&f.video_url)
    .bind(f.duration_sec)
    .bind(&f.tags)
    .bind(f.sort_order)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn update_workout_video(pool: &PgPool, id: &str, input: &WorkoutVideoInput) -> Result<(), AdminError> {
    let id = parse_id(id, "Video ID is required.", "Video")?;
    let f = workout_video_input(input)?;
    let result = sqlx::query(
        r"UPDATE workout_videos
          SET title = $2, description = $3, thumbnail_url = $4, video_url = $5,
              duration_sec = $6, tags = $7, sort_order = $8
          WHERE id = $1",
    )
    .bind(id)
    .bind(&f.title)
    .bind(&f.description)
    .bind(&f.thumbnail_url)
    .bind(&f.video_url)
    .bind(f.duration_sec)
    .bind(&f.tags)
    .bind(f.sort_order)
    .execute(pool)
    .await?;
    ensure_affected(&result, "Video")
}

pub async fn delete_workout_video(pool: &PgPool, id: &str) -> Result<(), AdminError> {
    let id = parse_id(id, "Video ID is required.", "Video")?;
    let result = sqlx::query("DELETE FROM workout_videos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| still_in_use(e, "Video"))?;
    ensure_affected(&result, "Video")
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
