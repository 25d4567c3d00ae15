//! Back-office REST surface. Every handler takes [`AdminUser`].
//!
//! Collections follow one shape: `GET` lists, `POST` creates and answers
//! `201 {"id": ...}`, `PATCH /{id}` updates and `DELETE /{id}` removes, both
//! answering `204`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::auth::AdminUser;
use crate::error::{ApiError, ApiResult, JsonBody};
use crate::services::admin::catalog::{self, ProductInput, SnackItemInput, SnackOrderPatch};
use crate::services::admin::content::{self as admin_content, GalleryImageInput, TrainerInput, WorkoutVideoInput};
use crate::services::admin::members::{
    self, BookingRow, CheckInInput, CheckInRow, MemberInput, MemberRow, MembershipInput, MembershipRow, PlanInput,
};
use crate::services::admin::overview::{self, Overview};
use crate::services::admin::schedule::{self as admin_schedule, ClassInput, LocationInput};
use crate::services::admin::AdminError;
use crate::services::content::{self, GalleryImage, Location, WorkoutVideo};
use crate::services::membership::{self, Plan};
use crate::services::schedule::{self, ClassRow};
use crate::services::shop::{self, OrderView, Product};
use crate::services::snack::{self, SnackItem, SnackOrderView};
use crate::services::trainer::{self, TrainerProfile};
use crate::state::AppState;

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Invalid(msg) => Self::BadRequest(msg.to_owned()),
            AdminError::NotFound(_) => Self::NotFound(err.to_string()),
            AdminError::InUse(_) => Self::Conflict(err.to_string()),
            AdminError::Conflict(msg) => Self::Conflict(msg.to_owned()),
            AdminError::Database(e) => Self::Database(e),
        }
    }
}

type Created = (StatusCode, Json<Value>);

fn created(id: Uuid) -> Created {
    (StatusCode::CREATED, Json(json!({ "id": id })))
}

#[derive(Deserialize)]
pub struct StatusBody {
    status: Option<String>,
}

/// `GET /api/admin/overview`
pub async fn overview(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Overview>> {
    Ok(Json(overview::overview(&state.pool, membership::today()).await?))
}

// =============================================================================
// CLASSES & LOCATIONS
// =============================================================================

pub async fn list_classes(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<ClassRow>>> {
    Ok(Json(schedule::list_classes(&state.pool).await?))
}

pub async fn create_class(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<ClassInput>,
) -> ApiResult<Created> {
    Ok(created(admin_schedule::create_class(&state.pool, &body).await?))
}

pub async fn update_class(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ClassInput>,
) -> ApiResult<StatusCode> {
    admin_schedule::update_class(&state.pool, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_class(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    admin_schedule::delete_class(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_locations(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(content::list_locations(&state.pool).await?))
}

pub async fn create_location(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<LocationInput>,
) -> ApiResult<Created> {
    Ok(created(admin_schedule::create_location(&state.pool, &body).await?))
}

pub async fn update_location(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<LocationInput>,
) -> ApiResult<StatusCode> {
    admin_schedule::update_location(&state.pool, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_location(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    admin_schedule::delete_location(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// MEMBERS, PLANS, MEMBERSHIPS
// =============================================================================

pub async fn list_members(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<MemberRow>>> {
    Ok(Json(members::list_members(&state.pool).await?))
}

pub async fn update_member(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<MemberInput>,
) -> ApiResult<StatusCode> {
    members::update_member(&state.pool, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_plans(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<Plan>>> {
    Ok(Json(membership::list_plans(&state.pool).await?))
}

pub async fn create_plan(State(state): State<AppState>, _admin: AdminUser, JsonBody(body): JsonBody<PlanInput>) -> ApiResult<Created> {
    Ok(created(members::create_plan(&state.pool, &body).await?))
}

pub async fn update_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<PlanInput>,
) -> ApiResult<StatusCode> {
    members::update_plan(&state.pool, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_plan(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    members::delete_plan(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_memberships(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<MembershipRow>>> {
    Ok(Json(members::list_memberships(&state.pool).await?))
}

pub async fn create_membership(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<MembershipInput>,
) -> ApiResult<Created> {
    Ok(created(members::create_membership(&state.pool, &state.notifier, &body).await?))
}

pub async fn update_membership(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<MembershipInput>,
) -> ApiResult<StatusCode> {
    members::update_membership(&state.pool, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_membership(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    members::delete_membership(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// BOOKINGS & CHECK-INS
// =============================================================================

pub async fn list_bookings(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<BookingRow>>> {
    Ok(Json(members::list_bookings(&state.pool).await?))
}

pub async fn update_booking(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StatusBody>,
) -> ApiResult<StatusCode> {
    members::update_booking_status(&state.pool, &state.notifier, &id, body.status.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_booking(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    members::delete_booking(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_check_ins(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<CheckInRow>>> {
    Ok(Json(members::list_check_ins(&state.pool).await?))
}

pub async fn record_check_in(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<CheckInInput>,
) -> ApiResult<Created> {
    Ok(created(members::record_check_in(&state.pool, &body).await?))
}

pub async fn delete_check_in(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    members::delete_check_in(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// SHOP
// =============================================================================

pub async fn list_products(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(shop::list_products(&state.pool).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<ProductInput>,
) -> ApiResult<Created> {
    Ok(created(catalog::create_product(&state.pool, &body).await?))
}

pub async fn update_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ProductInput>,
) -> ApiResult<StatusCode> {
    catalog::update_product(&state.pool, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_product(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    catalog::delete_product(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_orders(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<OrderView>>> {
    Ok(Json(shop::list_orders(&state.pool, None).await?))
}

pub async fn update_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StatusBody>,
) -> ApiResult<StatusCode> {
    catalog::update_order_status(&state.pool, &id, body.status.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// SNACK BAR
// =============================================================================

pub async fn list_snack_items(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<SnackItem>>> {
    Ok(Json(snack::list_items(&state.pool, true).await?))
}

pub async fn create_snack_item(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<SnackItemInput>,
) -> ApiResult<Created> {
    Ok(created(catalog::create_snack_item(&state.pool, &body).await?))
}

pub async fn update_snack_item(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<SnackItemInput>,
) -> ApiResult<StatusCode> {
    catalog::update_snack_item(&state.pool, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_snack_item(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    catalog::delete_snack_item(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_snack_orders(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<SnackOrderView>>> {
    Ok(Json(snack::list_orders(&state.pool, None).await?))
}

pub async fn update_snack_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<SnackOrderPatch>,
) -> ApiResult<StatusCode> {
    catalog::update_snack_order(&state.pool, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// TRAINERS, GALLERY, VIDEOS
// =============================================================================

pub async fn list_trainers(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<TrainerProfile>>> {
    Ok(Json(trainer::list_trainers(&state.pool).await?))
}

pub async fn create_trainer(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<TrainerInput>,
) -> ApiResult<Created> {
    Ok(created(admin_content::create_trainer(&state.pool, &body).await?))
}

pub async fn update_trainer(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<TrainerInput>,
) -> ApiResult<StatusCode> {
    admin_content::update_trainer(&state.pool, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_trainer(State(state): State<AppState>, _admin: AdminUser, Path(id): Path<String>) -> ApiResult<StatusCode> {
    admin_content::delete_trainer(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_gallery(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<GalleryImage>>> {
    Ok(Json(content::list_gallery(&state.pool).await?))
}

pub async fn create_gallery_image(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<GalleryImageInput>,
) -> ApiResult<Created> {
    Ok(created(admin_content::create_gallery_image(&state.pool, &body).await?))
}

pub async fn update_gallery_image(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<GalleryImageInput>,
) -> ApiResult<StatusCode> {
    admin_content::update_gallery_image(&state.pool, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_gallery_image(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    admin_content::delete_gallery_image(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_workout_videos(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<WorkoutVideo>>> {
    Ok(Json(content::list_videos(&state.pool).await?))
}

pub async fn create_workout_video(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<WorkoutVideoInput>,
) -> ApiResult<Created> {
    Ok(created(admin_content::create_workout_video(&state.pool, &body).await?))
}

pub async fn update_workout_video(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<WorkoutVideoInput>,
) -> ApiResult<StatusCode> {
    admin_content::update_workout_video(&state.pool, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_workout_video(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    admin_content::delete_workout_video(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
