//! Public read-only endpoints: schedule, plans, shop, trainers, content.

use axum::Json;
use axum::extract::{Path, State};

use super::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::content::{self, GalleryImage, Location};
use crate::services::membership::{self, Plan};
use crate::services::schedule::{self, Schedule};
use crate::services::shop::{self, Product, ShopError};
use crate::services::snack::{self, SnackItem};
use crate::services::trainer::{self, TrainerProfile};
use crate::state::AppState;

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        match err {
            ShopError::NotConfigured => Self::Config(err.to_string()),
            ShopError::NoItems | ShopError::MissingEmail | ShopError::NoValidItems => Self::BadRequest(err.to_string()),
            ShopError::ProductsNotFound | ShopError::ProductNotFound => Self::NotFound(err.to_string()),
            ShopError::Gateway(e) => Self::Upstream(e.to_string()),
            ShopError::Database(e) => Self::Database(e),
        }
    }
}

/// `GET /api/schedule` — week schedule; bookability reflects the caller
/// when signed in.
pub async fn schedule(State(state): State<AppState>, auth: Result<AuthUser, ApiError>) -> ApiResult<Json<Schedule>> {
    let user_id = auth.ok().map(|a| a.user.id);
    Ok(Json(schedule::load_schedule(&state.pool, user_id).await?))
}

/// `GET /api/plans`
pub async fn plans(State(state): State<AppState>) -> ApiResult<Json<Vec<Plan>>> {
    Ok(Json(membership::list_plans(&state.pool).await?))
}

/// `GET /api/products`
pub async fn products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(shop::list_products(&state.pool).await?))
}

/// `GET /api/products/{slug}`
pub async fn product(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Json<Product>> {
    Ok(Json(shop::find_by_slug(&state.pool, &slug).await?))
}

/// `GET /api/trainers`
pub async fn trainers(State(state): State<AppState>) -> ApiResult<Json<Vec<TrainerProfile>>> {
    Ok(Json(trainer::list_trainers(&state.pool).await?))
}

/// `GET /api/gallery`
pub async fn gallery(State(state): State<AppState>) -> ApiResult<Json<Vec<GalleryImage>>> {
    Ok(Json(content::list_gallery(&state.pool).await?))
}

/// `GET /api/locations`
pub async fn locations(State(state): State<AppState>) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(content::list_locations(&state.pool).await?))
}

/// `GET /api/snack-items` — available menu only.
pub async fn snack_items(State(state): State<AppState>) -> ApiResult<Json<Vec<SnackItem>>> {
    Ok(Json(snack::list_items(&state.pool, false).await?))
}
