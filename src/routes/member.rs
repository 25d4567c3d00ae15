//! Signed-in member endpoints: bookings, dashboard, account history,
//! profile, video library, trainer ratings, snack pre-orders, shop checkout,
//! and the trainer day view.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::auth::{AuthUser, TrainerUser, require_signed_in};
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::services::booking::{self, BookingConfirmation, BookingError, BookingSummary};
use crate::services::content::{self, ContentError, WorkoutVideo};
use crate::services::membership::{self, Dashboard};
use crate::services::profile::{self, ProfileError};
use crate::services::shop::{self, CheckoutItem, CheckoutResult, OrderView};
use crate::services::snack::{self, SnackError, SnackOrderInput, SnackOrderView};
use crate::services::trainer::{self, TodayClass, TrainerError};
use crate::state::AppState;

// =============================================================================
// ERROR MAPPING
// =============================================================================

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SignedOut => Self::Unauthorized(err.to_string()),
            BookingError::MissingFields
            | BookingError::InvalidDate
            | BookingError::WrongDay { .. }
            | BookingError::PeakRestricted => Self::BadRequest(err.to_string()),
            BookingError::ClassNotFound => Self::NotFound(err.to_string()),
            BookingError::Duplicate => Self::Conflict(err.to_string()),
            BookingError::Database(e) => Self::Database(e),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::MembershipRequired => Self::Forbidden(err.to_string()),
            ContentError::VideoNotFound => Self::NotFound(err.to_string()),
            ContentError::Database(e) => Self::Database(e),
        }
    }
}

impl From<SnackError> for ApiError {
    fn from(err: SnackError) -> Self {
        match err {
            SnackError::Database(e) => Self::Database(e),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<TrainerError> for ApiError {
    fn from(err: TrainerError) -> Self {
        match err {
            TrainerError::TrainerRequired | TrainerError::InvalidRating => Self::BadRequest(err.to_string()),
            TrainerError::NotFound => Self::NotFound(err.to_string()),
            TrainerError::Database(e) => Self::Database(e),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Invalid(msg) => Self::BadRequest(msg.to_owned()),
            ProfileError::Database(e) => Self::Database(e),
        }
    }
}

// =============================================================================
// BOOKINGS
// =============================================================================

#[derive(Deserialize)]
pub struct BookBody {
    class_id: Option<String>,
    booked_date: Option<String>,
}

/// `POST /api/bookings`
pub async fn book(
    State(state): State<AppState>,
    auth: Result<AuthUser, ApiError>,
    JsonBody(body): JsonBody<BookBody>,
) -> ApiResult<(StatusCode, Json<BookingConfirmation>)> {
    let auth = require_signed_in(auth, &BookingError::SignedOut.to_string())?;
    let confirmation = booking::book_class(
        &state.pool,
        &state.notifier,
        auth.user.id,
        body.class_id.as_deref(),
        body.booked_date.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// `GET /api/bookings`
pub async fn my_bookings(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Vec<BookingSummary>>> {
    Ok(Json(booking::list_for_user(&state.pool, auth.user.id).await?))
}

// =============================================================================
// ACCOUNT
// =============================================================================

/// `GET /api/dashboard`
pub async fn dashboard(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Dashboard>> {
    Ok(Json(membership::dashboard(&state.pool, auth.user.id).await?))
}

/// `GET /api/account/orders`
pub async fn my_orders(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Vec<OrderView>>> {
    Ok(Json(shop::list_orders(&state.pool, Some(auth.user.id)).await?))
}

/// `GET /api/account/pre-orders`
pub async fn my_pre_orders(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Vec<SnackOrderView>>> {
    Ok(Json(snack::list_orders(&state.pool, Some(auth.user.id)).await?))
}

#[derive(Deserialize)]
pub struct ProfileBody {
    full_name: Option<String>,
}

/// `PATCH /api/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    auth: Result<AuthUser, ApiError>,
    JsonBody(body): JsonBody<ProfileBody>,
) -> ApiResult<Json<Value>> {
    let auth = require_signed_in(auth, "You must be signed in to update your profile.")?;
    let full_name = profile::update_full_name(&state.pool, auth.user.id, body.full_name.as_deref()).await?;
    Ok(Json(json!({ "full_name": full_name })))
}

// =============================================================================
// LIBRARY
// =============================================================================

/// `GET /api/library`
pub async fn library(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Vec<WorkoutVideo>>> {
    Ok(Json(content::library(&state.pool, auth.user.id).await?))
}

/// `GET /api/library/{id}`
pub async fn library_video(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkoutVideo>> {
    // Membership is checked before the id so non-members learn nothing.
    let video_id = Uuid::parse_str(id.trim()).unwrap_or_else(|_| Uuid::nil());
    Ok(Json(content::library_video(&state.pool, auth.user.id, video_id).await?))
}

// =============================================================================
// TRAINERS
// =============================================================================

#[derive(Deserialize)]
pub struct RatingBody {
    #[serde(default)]
    rating: Value,
}

/// Numbers pass through; numeric strings (form posts) are parsed.
fn rating_value(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `POST /api/trainers/{id}/rating`
pub async fn rate_trainer(
    State(state): State<AppState>,
    auth: Result<AuthUser, ApiError>,
    Path(trainer_id): Path<String>,
    JsonBody(body): JsonBody<RatingBody>,
) -> ApiResult<StatusCode> {
    let auth = require_signed_in(auth, "Sign in to rate.")?;
    trainer::rate_trainer(&state.pool, auth.user.id, &trainer_id, rating_value(&body.rating)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/trainer/today` — today's classes with check-in counts.
pub async fn trainer_today(
    State(state): State<AppState>,
    TrainerUser(trainer): TrainerUser,
) -> ApiResult<Json<Vec<TodayClass>>> {
    let classes = trainer::today_classes(&state.pool, membership::today()).await?;
    tracing::debug!(trainer_id = %trainer.id, classes = classes.len(), "trainer schedule loaded");
    Ok(Json(classes))
}

// =============================================================================
// ORDERS
// =============================================================================

/// `POST /api/snack-orders`
pub async fn create_snack_order(
    State(state): State<AppState>,
    auth: Result<AuthUser, ApiError>,
    JsonBody(body): JsonBody<SnackOrderInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let auth = require_signed_in(auth, "You must be signed in to place an order.")?;
    let order_id = snack::create_order(&state.pool, auth.user.id, &body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": order_id }))))
}

#[derive(Deserialize)]
pub struct CheckoutBody {
    #[serde(default)]
    items: Vec<CheckoutItem>,
}

/// `POST /api/shop/checkout`
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<CheckoutBody>,
) -> ApiResult<Json<CheckoutResult>> {
    let result = shop::checkout(
        &state.pool,
        &state.http,
        state.config.chapa.as_ref(),
        state.config.app_url.as_deref(),
        auth.user.id,
        &body.items,
    )
    .await?;
    Ok(Json(result))
}

#[cfg(test)]
#[path = "member_test.rs"]
mod tests;
