//! Chapa payment gateway client.
//!
//! DESIGN
//! ======
//! Two payment kinds share one gateway. The transaction reference (`tx_ref`)
//! is the only state the gateway echoes back, so it encodes what was bought:
//!
//! - plan purchase: `sweatbox|<user_uuid>|<plan_uuid>|<epoch_millis>`
//! - shop order:    `sweatbox|shop|<order_uuid>`
//!
//! Webhooks are authenticated by an HMAC-SHA256 of the raw request body,
//! hex-encoded in the `chapa-signature` (or `x-chapa-signature`) header.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::config::ChapaConfig;

const TX_REF_PREFIX: &str = "sweatbox";
const SHOP_SEGMENT: &str = "shop";
pub const CURRENCY: &str = "ETB";

#[derive(Debug, thiserror::Error)]
pub enum ChapaError {
    #[error("{0}")]
    Gateway(String),
    #[error("Chapa did not return a checkout URL.")]
    MissingCheckoutUrl,
}

// =============================================================================
// TX_REF
// =============================================================================

/// Reference decoded from a webhook payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxRef {
    Plan { user_id: Uuid, plan_id: Uuid },
    Shop { order_id: Uuid },
}

#[must_use]
pub fn plan_tx_ref(user_id: Uuid, plan_id: Uuid, epoch_millis: i64) -> String {
    format!("{TX_REF_PREFIX}|{user_id}|{plan_id}|{epoch_millis}")
}

#[must_use]
pub fn shop_tx_ref(order_id: Uuid) -> String {
    format!("{TX_REF_PREFIX}|{SHOP_SEGMENT}|{order_id}")
}

/// Hyphenated RFC-4122 UUID with version 1-5 and variant `8|9|a|b`.
fn parse_rfc4122(raw: &str) -> Option<Uuid> {
    let bytes = raw.as_bytes();
    if bytes.len() != 36 {
        return None;
    }
    for (i, b) in bytes.iter().enumerate() {
        let ok = match i {
            8 | 13 | 18 | 23 => *b == b'-',
            _ => b.is_ascii_hexdigit(),
        };
        if !ok {
            return None;
        }
    }
    if !matches!(bytes[14], b'1'..=b'5') {
        return None;
    }
    if !matches!(bytes[19].to_ascii_lowercase(), b'8' | b'9' | b'a' | b'b') {
        return None;
    }
    Uuid::parse_str(raw).ok()
}

/// Decode a shop reference. Extra trailing segments are tolerated.
#[must_use]
pub fn parse_shop_tx_ref(raw: &str) -> Option<Uuid> {
    let parts = raw.split('|').collect::<Vec<_>>();
    if parts.len() < 3 || parts[0] != TX_REF_PREFIX || parts[1] != SHOP_SEGMENT {
        return None;
    }
    parse_rfc4122(parts[2])
}

/// Decode a plan-purchase reference. The timestamp segment must be present
/// but is not interpreted.
#[must_use]
pub fn parse_plan_tx_ref(raw: &str) -> Option<(Uuid, Uuid)> {
    let parts = raw.split('|').collect::<Vec<_>>();
    if parts.len() < 4 || parts[0] != TX_REF_PREFIX {
        return None;
    }
    Some((parse_rfc4122(parts[1])?, parse_rfc4122(parts[2])?))
}

/// Shop references are tried first so `sweatbox|shop|...` never reads as a
/// plan purchase.
#[must_use]
pub fn parse_tx_ref(raw: &str) -> Option<TxRef> {
    if let Some(order_id) = parse_shop_tx_ref(raw) {
        return Some(TxRef::Shop { order_id });
    }
    parse_plan_tx_ref(raw).map(|(user_id, plan_id)| TxRef::Plan { user_id, plan_id })
}

// =============================================================================
// SIGNATURE
// =============================================================================

/// Constant-time check of a hex HMAC-SHA256 signature over the raw body.
#[must_use]
pub fn verify_signature(body: &[u8], secret: &str, signature: Option<&str>) -> bool {
    let Some(signature) = signature.map(str::trim).filter(|s| !s.is_empty()) else {
        return false;
    };
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

// =============================================================================
// INITIALIZE
// =============================================================================

/// First/last name for the gateway. Blank names become `Customer`.
#[must_use]
pub fn split_name(full_name: Option<&str>) -> (String, String) {
    let mut parts = full_name.unwrap_or_default().split_whitespace();
    let Some(first) = parts.next() else {
        return ("Customer".to_owned(), String::new());
    };
    (first.to_owned(), parts.collect::<Vec<_>>().join(" "))
}

#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest {
    pub amount: String,
    pub currency: &'static str,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tx_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
}

impl InitializeRequest {
    /// Build a payload; callback/return URLs are only set when `app_url` is.
    #[must_use]
    pub fn new(
        amount: String,
        email: String,
        full_name: Option<&str>,
        tx_ref: String,
        app_url: Option<&str>,
        return_path: &str,
    ) -> Self {
        let (first_name, last_name) = split_name(full_name);
        Self {
            amount,
            currency: CURRENCY,
            email,
            first_name,
            last_name,
            tx_ref,
            callback_url: app_url.map(|base| format!("{base}/api/payment/callback")),
            return_url: app_url.map(|base| format!("{base}{return_path}")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct InitializeResponse {
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    data: Option<InitializeData>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    checkout_url: Option<String>,
}

fn gateway_message(resp: &InitializeResponse) -> String {
    [&resp.message, &resp.error]
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::String(_) | serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| "Chapa request failed.".to_owned())
}

/// Open a hosted checkout and return its URL.
///
/// # Errors
///
/// `Gateway` on transport failure or a non-2xx answer (carrying the gateway's
/// message), `MissingCheckoutUrl` when the answer has no URL.
pub async fn initialize(
    http: &reqwest::Client,
    cfg: &ChapaConfig,
    payload: &InitializeRequest,
) -> Result<String, ChapaError> {
    let resp = http
        .post(format!("{}/transaction/initialize", cfg.base_url))
        .bearer_auth(&cfg.secret_key)
        .json(payload)
        .send()
        .await
        .map_err(|e| ChapaError::Gateway(e.to_string()))?;

    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let body: InitializeResponse = serde_json::from_str(&text).unwrap_or_default();

    if !status.is_success() {
        tracing::warn!(%status, tx_ref = %payload.tx_ref, "chapa initialize rejected");
        return Err(ChapaError::Gateway(gateway_message(&body)));
    }

    body.data
        .and_then(|d| d.checkout_url)
        .filter(|url| !url.is_empty())
        .ok_or(ChapaError::MissingCheckoutUrl)
}

#[cfg(test)]
#[path = "chapa_test.rs"]
mod tests;
