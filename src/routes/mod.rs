//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API and the admin websocket under a single
//! Axum router. Public catalog reads need no session; member, trainer and
//! admin routes authenticate through the extractors in [`auth`].

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod contact;
pub mod member;
pub mod payment;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(public_routes())
        .merge(member_routes())
        .merge(admin_routes())
        .route("/healthz", get(healthz))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/email/request-code", post(auth::request_email_code))
        .route("/api/auth/email/verify-code", post(auth::verify_email_code))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/ws-ticket", post(auth::ws_ticket))
        .route("/api/schedule", get(catalog::schedule))
        .route("/api/plans", get(catalog::plans))
        .route("/api/products", get(catalog::products))
        .route("/api/products/{slug}", get(catalog::product))
        .route("/api/trainers", get(catalog::trainers))
        .route("/api/gallery", get(catalog::gallery))
        .route("/api/locations", get(catalog::locations))
        .route("/api/snack-items", get(catalog::snack_items))
        .route("/api/contact/class-booking", post(contact::class_booking))
        .route("/api/contact/membership-inquiry", post(contact::membership_inquiry))
        .route("/api/newsletter", post(contact::subscribe))
        .route("/api/payment/initiate", post(payment::initiate).get(method_not_allowed))
        .route("/api/payment/webhook", post(payment::chapa_webhook).get(method_not_allowed))
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", get(member::my_bookings).post(member::book))
        .route("/api/dashboard", get(member::dashboard))
        .route("/api/profile", patch(member::update_profile))
        .route("/api/library", get(member::library))
        .route("/api/library/{id}", get(member::library_video))
        .route("/api/trainers/{id}/rating", post(member::rate_trainer))
        .route("/api/trainer/today", get(member::trainer_today))
        .route("/api/shop/checkout", post(member::checkout))
        .route("/api/snack-orders", post(member::create_snack_order))
        .route("/api/account/orders", get(member::my_orders))
        .route("/api/account/pre-orders", get(member::my_pre_orders))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/ws", get(ws::handle_ws))
        .route("/api/admin/overview", get(admin::overview))
        .route("/api/admin/classes", get(admin::list_classes).post(admin::create_class))
        .route("/api/admin/classes/{id}", patch(admin::update_class).delete(admin::delete_class))
        .route("/api/admin/locations", get(admin::list_locations).post(admin::create_location))
        .route(
            "/api/admin/locations/{id}",
            patch(admin::update_location).delete(admin::delete_location),
        )
        .route("/api/admin/members", get(admin::list_members))
        .route("/api/admin/members/{id}", patch(admin::update_member))
        .route("/api/admin/plans", get(admin::list_plans).post(admin::create_plan))
        .route("/api/admin/plans/{id}", patch(admin::update_plan).delete(admin::delete_plan))
        .route(
            "/api/admin/memberships",
            get(admin::list_memberships).post(admin::create_membership),
        )
        .route(
            "/api/admin/memberships/{id}",
            patch(admin::update_membership).delete(admin::delete_membership),
        )
        .route("/api/admin/bookings", get(admin::list_bookings))
        .route(
            "/api/admin/bookings/{id}",
            patch(admin::update_booking).delete(admin::delete_booking),
        )
        .route("/api/admin/check-ins", get(admin::list_check_ins).post(admin::record_check_in))
        .route("/api/admin/check-ins/{id}", axum::routing::delete(admin::delete_check_in))
        .route("/api/admin/products", get(admin::list_products).post(admin::create_product))
        .route(
            "/api/admin/products/{id}",
            patch(admin::update_product).delete(admin::delete_product),
        )
        .route("/api/admin/orders", get(admin::list_orders))
        .route("/api/admin/orders/{id}", patch(admin::update_order))
        .route(
            "/api/admin/snack-items",
            get(admin::list_snack_items).post(admin::create_snack_item),
        )
        .route(
            "/api/admin/snack-items/{id}",
            patch(admin::update_snack_item).delete(admin::delete_snack_item),
        )
        .route("/api/admin/snack-orders", get(admin::list_snack_orders))
        .route("/api/admin/snack-orders/{id}", patch(admin::update_snack_order))
        .route("/api/admin/trainers", get(admin::list_trainers).post(admin::create_trainer))
        .route(
            "/api/admin/trainers/{id}",
            patch(admin::update_trainer).delete(admin::delete_trainer),
        )
        .route(
            "/api/admin/gallery",
            get(admin::list_gallery).post(admin::create_gallery_image),
        )
        .route(
            "/api/admin/gallery/{id}",
            patch(admin::update_gallery_image).delete(admin::delete_gallery_image),
        )
        .route(
            "/api/admin/workout-videos",
            get(admin::list_workout_videos).post(admin::create_workout_video),
        )
        .route(
            "/api/admin/workout-videos/{id}",
            patch(admin::update_workout_video).delete(admin::delete_workout_video),
        )
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Explicit 405 with the JSON error body, for POST-only endpoints that
/// browsers or gateways may hit with GET.
async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed.".into())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
