//! Email access-code sign-in and sign-up.
//!
//! Creates and verifies short-lived six-character codes linked to an email.
//! Requesting a code for an unknown email creates the member profile, so the
//! same flow covers sign-up and sign-in.

use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::config::ResendConfig;
use crate::services::mailer::{self, MailerError};
use crate::services::session::Role;
use crate::services::validate::{escape_html, trimmed};

const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const MAX_FAILED_ATTEMPTS: i32 = 5;
const ACCESS_CODE_TEMPLATE: &str = include_str!("../../templates/access_code.html");

#[derive(Debug, thiserror::Error)]
pub enum EmailAuthError {
    #[error("A valid email is required.")]
    InvalidEmail,
    #[error("Enter the 6-character code from your email.")]
    InvalidCode,
    #[error("The code is incorrect or has expired.")]
    VerificationFailed,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    Mail(#[from] MailerError),
}

/// Profile returned after a successful verification.
#[derive(Debug, Clone)]
pub struct VerifiedProfile {
    pub id: Uuid,
    pub role: Role,
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return None;
    }
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn normalize_code(code: &str) -> Option<String> {
    let normalized = code.trim().to_ascii_uppercase();
    if normalized.len() != CODE_LEN
        || !normalized
            .chars()
            .all(|c| CODE_ALPHABET.contains(&(c as u8)))
    {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn generate_access_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}

#[must_use]
pub fn hash_access_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    let bytes = hasher.finalize();
    super::session::bytes_to_hex(&bytes)
}

/// Upsert the profile and issue a fresh code. Any unconsumed code for the
/// same email is discarded. The plain code is returned for delivery only.
///
/// # Errors
///
/// `InvalidEmail` for malformed input, `Db` on query failure.
pub async fn request_access_code(
    pool: &PgPool,
    email: &str,
    full_name: Option<&str>,
) -> Result<String, EmailAuthError> {
    let normalized = normalize_email(email).ok_or(EmailAuthError::InvalidEmail)?;
    let full_name = trimmed(full_name);

    sqlx::query(
        r"INSERT INTO profiles (email, full_name)
          VALUES ($1, $2)
          ON CONFLICT (email) DO UPDATE SET full_name = COALESCE(profiles.full_name, EXCLUDED.full_name)",
    )
    .bind(&normalized)
    .bind(full_name)
    .execute(pool)
    .await?;

    sqlx::query("DELETE FROM email_login_codes WHERE email = $1 AND consumed_at IS NULL")
        .bind(&normalized)
        .execute(pool)
        .await?;

    let code = generate_access_code();
    let code_hash = hash_access_code(&code);

    sqlx::query("INSERT INTO email_login_codes (email, code_hash) VALUES ($1, $2)")
        .bind(&normalized)
        .bind(code_hash)
        .execute(pool)
        .await?;

    Ok(code)
}

/// Consume the newest live code for the email. Wrong guesses count toward
/// `MAX_FAILED_ATTEMPTS`, after which the code is burned.
///
/// # Errors
///
/// `InvalidEmail`/`InvalidCode` for malformed input, `VerificationFailed`
/// when no live code matches.
pub async fn verify_access_code(pool: &PgPool, email: &str, code: &str) -> Result<VerifiedProfile, EmailAuthError> {
    let normalized_email = normalize_email(email).ok_or(EmailAuthError::InvalidEmail)?;
    let normalized_code = normalize_code(code).ok_or(EmailAuthError::InvalidCode)?;
    let code_hash = hash_access_code(&normalized_code);

    let update = sqlx::query(
        r"UPDATE email_login_codes
          SET consumed_at = now()
          WHERE id = (
              SELECT id
              FROM email_login_codes
              WHERE email = $1
                AND consumed_at IS NULL
                AND expires_at > now()
              ORDER BY created_at DESC
              LIMIT 1
          )
          AND code_hash = $2
          RETURNING id",
    )
    .bind(&normalized_email)
    .bind(&code_hash)
    .fetch_optional(pool)
    .await?;

    if update.is_none() {
        sqlx::query(
            r"UPDATE email_login_codes
              SET attempts = attempts + 1,
                  consumed_at = CASE WHEN attempts + 1 >= $2 THEN now() ELSE consumed_at END
              WHERE id = (
                  SELECT id
                  FROM email_login_codes
                  WHERE email = $1
                    AND consumed_at IS NULL
                    AND expires_at > now()
                  ORDER BY created_at DESC
                  LIMIT 1
              )",
        )
        .bind(&normalized_email)
        .bind(MAX_FAILED_ATTEMPTS)
        .execute(pool)
        .await?;
        return Err(EmailAuthError::VerificationFailed);
    }

    let row = sqlx::query("SELECT id, role FROM profiles WHERE email = $1")
        .bind(&normalized_email)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Err(EmailAuthError::VerificationFailed);
    };
    let role: String = row.get("role");

    Ok(VerifiedProfile { id: row.get("id"), role: Role::parse(&role).unwrap_or(Role::Member) })
}

/// Email the access code.
///
/// # Errors
///
/// `Mail` when delivery fails.
pub async fn send_access_code_email(cfg: &ResendConfig, to_email: &str, code: &str) -> Result<(), EmailAuthError> {
    let html = render_access_code_template(to_email, code);
    mailer::send_html(cfg, to_email, "Your Sweatbox sign-in code", &html).await?;
    Ok(())
}

#[must_use]
pub fn render_access_code_template(email: &str, code: &str) -> String {
    ACCESS_CODE_TEMPLATE
        .replace("{{EMAIL}}", &escape_html(email))
        .replace("{{CODE}}", code)
}

#[cfg(test)]
#[path = "email_auth_test.rs"]
mod tests;
