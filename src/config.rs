//! Service configuration parsed from environment variables.
//!
//! Integrations are optional. A missing key disables the matching endpoints
//! (they answer "not configured") instead of failing startup.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CHAPA_BASE_URL: &str = "https://api.chapa.co/v1";
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Chapa payment gateway credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapaConfig {
    pub secret_key: String,
    /// Signing secret for webhooks. Falls back to the secret key.
    pub webhook_secret: String,
    pub base_url: String,
}

/// Resend transactional email settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResendConfig {
    pub api_key: String,
    pub from: String,
    /// Gym inbox receiving inquiry emails. Access-code mail works without it.
    pub to: Option<String>,
}

/// Mailchimp audience settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailchimpConfig {
    pub api_key: String,
    pub list_id: String,
    /// API root override (`MAILCHIMP_BASE_URL`), for proxies and local stubs.
    pub base_url: Option<String>,
}

impl MailchimpConfig {
    /// Data centre encoded as the key suffix (`<key>-us21`), `us1` otherwise.
    #[must_use]
    pub fn data_center(&self) -> &str {
        self.api_key
            .split('-')
            .nth(1)
            .filter(|dc| !dc.is_empty())
            .unwrap_or("us1")
    }

    /// `MAILCHIMP_BASE_URL` when set, else the data centre's API root.
    #[must_use]
    pub fn api_base(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.api.mailchimp.com/3.0", self.data_center()))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Public base URL without trailing slash, used for gateway redirects.
    pub app_url: Option<String>,
    pub cookie_secure: bool,
    pub sweep_interval_secs: u64,
    pub chapa: Option<ChapaConfig>,
    pub resend: Option<ResendConfig>,
    pub mailchimp: Option<MailchimpConfig>,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required: `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error when `DATABASE_URL` is missing or a numeric value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let db_max_connections = parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        let sweep_interval_secs = parse_or(
            get("MEMBERSHIP_SWEEP_INTERVAL_SECS"),
            "MEMBERSHIP_SWEEP_INTERVAL_SECS",
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?;

        let app_url = get("APP_URL").map(|url| url.trim_end_matches('/').to_owned());
        let cookie_secure = get("COOKIE_SECURE")
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or_else(|| app_url.as_deref().is_some_and(|u| u.starts_with("https://")));

        let chapa = get("CHAPA_SECRET_KEY").map(|secret_key| ChapaConfig {
            webhook_secret: get("CHAPA_WEBHOOK_SECRET").unwrap_or_else(|| secret_key.clone()),
            base_url: get("CHAPA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CHAPA_BASE_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            secret_key,
        });

        let resend = match (get("RESEND_API_KEY"), get("RESEND_FROM_EMAIL")) {
            (Some(api_key), Some(from)) => Some(ResendConfig { api_key, from, to: get("RESEND_TO_EMAIL") }),
            _ => None,
        };

        let mailchimp = match (get("MAILCHIMP_API_KEY"), get("MAILCHIMP_LIST_ID")) {
            (Some(api_key), Some(list_id)) => Some(MailchimpConfig {
                api_key,
                list_id,
                base_url: get("MAILCHIMP_BASE_URL").map(|url| url.trim_end_matches('/').to_owned()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            port,
            db_max_connections,
            app_url,
            cookie_secure,
            sweep_interval_secs,
            chapa,
            resend,
            mailchimp,
        })
    }
}

/// Parse `1/true/yes/on` and `0/false/no/off`, case-insensitively.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
