//! Transactional email through Resend.
//!
//! Two inquiry forms (class booking request, membership inquiry) are relayed
//! to the gym inbox. Sign-in codes go through [`send_html`] as well.

use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;
use serde::Deserialize;

use crate::config::ResendConfig;
use crate::services::validate::{escape_html, is_plausible_email, trimmed};

const INQUIRY_TEMPLATE: &str = include_str!("../../templates/inquiry.html");

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Email service is not configured.")]
    NotConfigured,
    #[error("{0}")]
    Invalid(&'static str),
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// Send one HTML email.
///
/// # Errors
///
/// Returns `Delivery` when Resend rejects the request.
pub async fn send_html(cfg: &ResendConfig, to: &str, subject: &str, html: &str) -> Result<(), MailerError> {
    let resend = Resend::new(&cfg.api_key);
    let email = CreateEmailBaseOptions::new(&cfg.from, [to], subject).with_html(html);
    resend
        .emails
        .send(email)
        .await
        .map_err(|e| MailerError::Delivery(e.to_string()))?;
    Ok(())
}

// =============================================================================
// INQUIRIES
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ClassBookingInquiry {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub class_name: Option<String>,
    pub preferred_date: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembershipInquiry {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub preferred_plan: Option<String>,
    pub message: Option<String>,
}

/// Subject line and rendered body, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: &'static str,
    pub html: String,
}

struct Contact {
    name: String,
    email: String,
    phone: String,
}

fn validate_contact(name: Option<&str>, email: Option<&str>, phone: Option<&str>) -> Result<Contact, MailerError> {
    let name = trimmed(name).ok_or(MailerError::Invalid("Name is required."))?;
    let email = trimmed(email).ok_or(MailerError::Invalid("Email is required."))?;
    if !is_plausible_email(&email) {
        return Err(MailerError::Invalid("Invalid email."));
    }
    let phone = trimmed(phone).ok_or(MailerError::Invalid("Phone is required."))?;
    Ok(Contact { name, email, phone })
}

fn render_inquiry(heading: &str, rows: &[(&str, Option<String>)]) -> String {
    let mut body = String::new();
    for (label, value) in rows {
        let Some(value) = value else { continue };
        body.push_str(&format!(
            "<p style=\"font-size:15px;color:#484848;padding:0 24px;\"><strong>{}:</strong> {}</p>\n",
            escape_html(label),
            escape_html(value)
        ));
    }
    INQUIRY_TEMPLATE
        .replace("{{HEADING}}", &escape_html(heading))
        .replace("{{ROWS}}", &body)
}

/// Validate and render a class booking request.
///
/// # Errors
///
/// Returns `Invalid` when name, email, or phone is missing or malformed.
pub fn render_class_booking(input: &ClassBookingInquiry) -> Result<RenderedEmail, MailerError> {
    let contact = validate_contact(input.name.as_deref(), input.email.as_deref(), input.phone.as_deref())?;
    let html = render_inquiry(
        "New class booking request",
        &[
            ("Name", Some(contact.name)),
            ("Email", Some(contact.email)),
            ("Phone", Some(contact.phone)),
            ("Class", trimmed(input.class_name.as_deref())),
            ("Preferred date", trimmed(input.preferred_date.as_deref())),
            ("Message", trimmed(input.message.as_deref())),
        ],
    );
    Ok(RenderedEmail { subject: "New class booking request", html })
}

/// Validate and render a membership inquiry.
///
/// # Errors
///
/// Returns `Invalid` when name, email, or phone is missing or malformed.
pub fn render_membership_inquiry(input: &MembershipInquiry) -> Result<RenderedEmail, MailerError> {
    let contact = validate_contact(input.name.as_deref(), input.email.as_deref(), input.phone.as_deref())?;
    let html = render_inquiry(
        "New membership inquiry",
        &[
            ("Name", Some(contact.name)),
            ("Email", Some(contact.email)),
            ("Phone", Some(contact.phone)),
            ("Preferred plan", trimmed(input.preferred_plan.as_deref())),
            ("Message", trimmed(input.message.as_deref())),
        ],
    );
    Ok(RenderedEmail { subject: "New membership inquiry", html })
}

/// Deliver a rendered inquiry to the gym inbox.
///
/// # Errors
///
/// `NotConfigured` when Resend or the inbox address is missing, `Delivery`
/// when the send fails.
pub async fn send_inquiry(cfg: Option<&ResendConfig>, email: &RenderedEmail) -> Result<(), MailerError> {
    let cfg = cfg.ok_or(MailerError::NotConfigured)?;
    let to = cfg.to.as_deref().ok_or(MailerError::NotConfigured)?;
    send_html(cfg, to, email.subject, &email.html).await
}

#[cfg(test)]
#[path = "mailer_test.rs"]
mod tests;
