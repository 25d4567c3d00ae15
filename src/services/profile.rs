//! Member self-service profile edits.

use sqlx::PgPool;
use uuid::Uuid;

use crate::services::validate::required;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Replace the caller's display name. Returns the stored value.
///
/// # Errors
///
/// `Invalid` when the name is blank.
pub async fn update_full_name(pool: &PgPool, user_id: Uuid, full_name: Option<&str>) -> Result<String, ProfileError> {
    let full_name = required(full_name, "Name is required.").map_err(ProfileError::Invalid)?;
    sqlx::query("UPDATE profiles SET full_name = $2 WHERE id = $1")
        .bind(user_id)
        .bind(&full_name)
        .execute(pool)
        .await?;
    Ok(full_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_helpers::test_app_state;

    #[tokio::test]
    async fn blank_name_is_rejected_without_db() {
        let state = test_app_state();
        for raw in [None, Some(""), Some("   ")] {
            let err = update_full_name(&state.pool, Uuid::new_v4(), raw).await.unwrap_err();
            assert_eq!(err.to_string(), "Name is required.");
        }
    }
}
