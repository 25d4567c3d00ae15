//! Newsletter signup through the Mailchimp marketing API.

use serde::Serialize;
use serde_json::Value;

use crate::config::MailchimpConfig;
use crate::services::validate::{is_plausible_email, trimmed};

#[derive(Debug, thiserror::Error)]
pub enum NewsletterError {
    #[error("Newsletter is not configured.")]
    NotConfigured,
    #[error("A valid email is required.")]
    InvalidEmail,
    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Serialize)]
struct MemberRequest<'a> {
    email_address: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    merge_fields: Option<MergeFields<'a>>,
}

#[derive(Debug, Serialize)]
struct MergeFields<'a> {
    #[serde(rename = "FNAME")]
    fname: &'a str,
}

#[must_use]
pub fn members_url(cfg: &MailchimpConfig) -> String {
    format!("{}/lists/{}/members", cfg.api_base(), cfg.list_id)
}

/// 200/201 subscribe, and 400 "Member Exists" is treated as already done.
///
/// # Errors
///
/// `Upstream` with Mailchimp's `detail`, else `title`, else a generic text.
pub fn interpret_response(status: u16, body: &Value) -> Result<(), NewsletterError> {
    let field = |key: &str| body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());
    match status {
        200 | 201 => Ok(()),
        400 if field("title") == Some("Member Exists") => Ok(()),
        _ => Err(NewsletterError::Upstream(
            field("detail")
                .or_else(|| field("title"))
                .unwrap_or("Subscription failed.")
                .to_owned(),
        )),
    }
}

/// Subscribe an email to the configured audience.
///
/// # Errors
///
/// `NotConfigured` without Mailchimp keys, `InvalidEmail` for a malformed
/// address, `Upstream` when Mailchimp refuses.
pub async fn subscribe(
    http: &reqwest::Client,
    cfg: Option<&MailchimpConfig>,
    email: Option<&str>,
    name: Option<&str>,
) -> Result<(), NewsletterError> {
    let cfg = cfg.ok_or(NewsletterError::NotConfigured)?;
    let email = trimmed(email)
        .filter(|e| is_plausible_email(e))
        .ok_or(NewsletterError::InvalidEmail)?;
    let name = trimmed(name);

    let request = MemberRequest {
        email_address: &email,
        status: "subscribed",
        merge_fields: name.as_deref().map(|fname| MergeFields { fname }),
    };
    let resp = http
        .post(members_url(cfg))
        .basic_auth("anystring", Some(&cfg.api_key))
        .json(&request)
        .send()
        .await
        .map_err(|e| NewsletterError::Upstream(e.to_string()))?;

    let status = resp.status().as_u16();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    let outcome = interpret_response(status, &body);
    if let Err(e) = &outcome {
        tracing::warn!(status, error = %e, "mailchimp subscribe failed");
    }
    outcome
}

#[cfg(test)]
#[path = "newsletter_test.rs"]
mod tests;
