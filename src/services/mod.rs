//! Domain services used by the HTTP and websocket routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business rules and SQL so route handlers stay focused
//! on request decoding, auth extraction, and status mapping. Each service
//! exposes its own error enum; `routes` converts those into `ApiError`.

pub mod admin;
pub mod booking;
pub mod chapa;
pub mod content;
pub mod email_auth;
pub mod mailer;
pub mod membership;
pub mod newsletter;
pub mod notify;
pub mod payment;
pub mod profile;
pub mod schedule;
pub mod session;
pub mod shop;
pub mod snack;
pub mod trainer;
pub mod validate;
pub mod webhook;
