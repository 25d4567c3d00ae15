use std::collections::HashMap;

use super::*;

fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn database_url_is_required() {
    let err = config_from(&[]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
}

#[test]
fn defaults_apply_when_unset() {
    let cfg = config_from(&[("DATABASE_URL", "postgres://localhost/gym")]).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(cfg.sweep_interval_secs, DEFAULT_SWEEP_INTERVAL_SECS);
    assert!(cfg.app_url.is_none());
    assert!(!cfg.cookie_secure);
    assert!(cfg.chapa.is_none());
    assert!(cfg.resend.is_none());
    assert!(cfg.mailchimp.is_none());
}

#[test]
fn invalid_port_is_rejected() {
    let err = config_from(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
}

#[test]
fn app_url_trailing_slash_trimmed_and_drives_cookie_secure() {
    let cfg = config_from(&[("DATABASE_URL", "postgres://x"), ("APP_URL", "https://sweatbox.et/")]).unwrap();
    assert_eq!(cfg.app_url.as_deref(), Some("https://sweatbox.et"));
    assert!(cfg.cookie_secure);
}

#[test]
fn explicit_cookie_secure_wins_over_inference() {
    let cfg = config_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("APP_URL", "https://sweatbox.et"),
        ("COOKIE_SECURE", "off"),
    ])
    .unwrap();
    assert!(!cfg.cookie_secure);
}

#[test]
fn webhook_secret_falls_back_to_secret_key() {
    let cfg = config_from(&[("DATABASE_URL", "postgres://x"), ("CHAPA_SECRET_KEY", "CHASECK-abc")]).unwrap();
    let chapa = cfg.chapa.unwrap();
    assert_eq!(chapa.webhook_secret, "CHASECK-abc");
    assert_eq!(chapa.base_url, DEFAULT_CHAPA_BASE_URL);
}

#[test]
fn dedicated_webhook_secret_is_used() {
    let cfg = config_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("CHAPA_SECRET_KEY", "CHASECK-abc"),
        ("CHAPA_WEBHOOK_SECRET", "whsec"),
    ])
    .unwrap();
    assert_eq!(cfg.chapa.unwrap().webhook_secret, "whsec");
}

#[test]
fn resend_needs_key_and_sender() {
    let cfg = config_from(&[("DATABASE_URL", "postgres://x"), ("RESEND_API_KEY", "re_123")]).unwrap();
    assert!(cfg.resend.is_none());

    let cfg = config_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("RESEND_API_KEY", "re_123"),
        ("RESEND_FROM_EMAIL", "gym@sweatbox.et"),
    ])
    .unwrap();
    let resend = cfg.resend.unwrap();
    assert_eq!(resend.from, "gym@sweatbox.et");
    assert!(resend.to.is_none());
}

#[test]
fn blank_values_count_as_unset() {
    let cfg = config_from(&[("DATABASE_URL", "postgres://x"), ("CHAPA_SECRET_KEY", "   ")]).unwrap();
    assert!(cfg.chapa.is_none());
}

#[test]
fn mailchimp_data_center_from_key_suffix() {
    let mc = MailchimpConfig { api_key: "abc123-us21".into(), list_id: "list".into(), base_url: None };
    assert_eq!(mc.data_center(), "us21");
    let mc = MailchimpConfig { api_key: "abc123".into(), list_id: "list".into(), base_url: None };
    assert_eq!(mc.data_center(), "us1");
}

#[test]
fn parse_bool_variants() {
    for raw in ["1", "true", "YES", " On "] {
        assert_eq!(parse_bool(raw), Some(true), "{raw:?}");
    }
    for raw in ["0", "false", "No", "OFF"] {
        assert_eq!(parse_bool(raw), Some(false), "{raw:?}");
    }
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}
