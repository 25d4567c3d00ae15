//! Auth routes: email access-code sign-in, session management, WS tickets.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use time::Duration;

use crate::error::{ApiError, ApiResult, JsonBody};
use crate::services::email_auth::{self, EmailAuthError};
use crate::services::mailer::MailerError;
use crate::services::session::{self, Role};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

const SIGNED_OUT: &str = "You must be signed in.";
const ADMIN_ONLY: &str = "Only admins can perform this action.";
const TRAINER_ONLY: &str = "Only trainers can view this page.";

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(ApiError::Unauthorized(SIGNED_OUT.into()));
        }

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized(SIGNED_OUT.into()))?;

        Ok(Self { user, token: token.to_owned() })
    }
}

/// Swap the generic signed-out message for an endpoint-specific one.
/// Non-auth failures pass through untouched.
pub(crate) fn require_signed_in(auth: Result<AuthUser, ApiError>, message: &str) -> ApiResult<AuthUser> {
    auth.map_err(|e| match e {
        ApiError::Unauthorized(_) => ApiError::Unauthorized(message.to_owned()),
        other => other,
    })
}

/// Signed-in user with the `admin` role.
pub struct AdminUser(pub session::SessionUser);

impl<S> axum::extract::FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if !auth.user.is_admin() {
            return Err(ApiError::Forbidden(ADMIN_ONLY.into()));
        }
        Ok(Self(auth.user))
    }
}

/// Signed-in user with the `trainer` or `admin` role.
pub struct TrainerUser(pub session::SessionUser);

impl<S> axum::extract::FromRequestParts<S> for TrainerUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if !matches!(auth.user.role, Role::Trainer | Role::Admin) {
            return Err(ApiError::Forbidden(TRAINER_ONLY.into()));
        }
        Ok(Self(auth.user))
    }
}

// =============================================================================
// ERRORS
// =============================================================================

impl From<MailerError> for ApiError {
    fn from(err: MailerError) -> Self {
        match err {
            MailerError::NotConfigured => Self::Config(err.to_string()),
            MailerError::Invalid(msg) => Self::BadRequest(msg.to_owned()),
            MailerError::Delivery(detail) => {
                tracing::error!(error = %detail, "email delivery failed");
                Self::Upstream("Failed to send email. Please try again.".into())
            }
        }
    }
}

impl From<EmailAuthError> for ApiError {
    fn from(err: EmailAuthError) -> Self {
        match err {
            EmailAuthError::InvalidEmail | EmailAuthError::InvalidCode => Self::BadRequest(err.to_string()),
            EmailAuthError::VerificationFailed => Self::Unauthorized(err.to_string()),
            EmailAuthError::Db(e) => Self::Database(e),
            EmailAuthError::Mail(e) => e.into(),
        }
    }
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct RequestCodeBody {
    #[serde(default)]
    email: String,
    full_name: Option<String>,
}

/// `POST /api/auth/email/request-code` — issue and email a sign-in code.
pub async fn request_email_code(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RequestCodeBody>,
) -> ApiResult<StatusCode> {
    let email = email_auth::normalize_email(&body.email).ok_or(EmailAuthError::InvalidEmail)?;
    let resend = state.config.resend.as_ref().ok_or(MailerError::NotConfigured)?;
    state.rate_limiter.check_and_record(&email)?;

    let code = email_auth::request_access_code(&state.pool, &email, body.full_name.as_deref()).await?;
    email_auth::send_access_code_email(resend, &email, &code).await?;
    tracing::info!(%email, "access code sent");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct VerifyCodeBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    code: String,
}

/// `POST /api/auth/email/verify-code` — exchange a code for a session cookie.
pub async fn verify_email_code(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(body): JsonBody<VerifyCodeBody>,
) -> ApiResult<impl IntoResponse> {
    let profile = email_auth::verify_access_code(&state.pool, &body.email, &body.code).await?;
    let token = session::create_session(&state.pool, profile.id).await?;
    tracing::info!(user_id = %profile.id, role = profile.role.as_str(), "signed in");

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((jar, Json(json!({ "redirect": profile.role.landing_path(), "role": profile.role }))))
}

/// `GET /api/auth/me` — return current user.
pub async fn me(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout` — delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(error = %e, "session delete failed");
    }

    let cookie = Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .max_age(Duration::ZERO);

    let jar = CookieJar::new().add(cookie);
    (jar, StatusCode::NO_CONTENT)
}

/// `POST /api/auth/ws-ticket` — create a one-time WS ticket.
pub async fn ws_ticket(State(state): State<AppState>, AdminUser(user): AdminUser) -> ApiResult<Json<serde_json::Value>> {
    let ticket = session::create_ws_ticket(&state.pool, user.id).await?;
    Ok(Json(json!({ "ticket": ticket })))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
