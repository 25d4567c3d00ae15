use serde_json::json;

use super::*;

fn cfg(api_key: &str) -> MailchimpConfig {
    MailchimpConfig { api_key: api_key.into(), list_id: "abc123".into(), base_url: None }
}

#[test]
fn members_url_uses_key_data_center() {
    assert_eq!(members_url(&cfg("key-us21")), "https://us21.api.mailchimp.com/3.0/lists/abc123/members");
    assert_eq!(members_url(&cfg("key")), "https://us1.api.mailchimp.com/3.0/lists/abc123/members");
}

#[test]
fn created_and_existing_members_succeed() {
    assert!(interpret_response(200, &Value::Null).is_ok());
    assert!(interpret_response(201, &json!({})).is_ok());
    assert!(interpret_response(400, &json!({"title": "Member Exists"})).is_ok());
}

#[test]
fn failures_prefer_detail_then_title() {
    let err = interpret_response(400, &json!({"title": "Invalid Resource", "detail": "Looks fake"})).unwrap_err();
    assert_eq!(err.to_string(), "Looks fake");
    let err = interpret_response(401, &json!({"title": "API Key Invalid"})).unwrap_err();
    assert_eq!(err.to_string(), "API Key Invalid");
    let err = interpret_response(500, &Value::Null).unwrap_err();
    assert_eq!(err.to_string(), "Subscription failed.");
}

#[test]
fn merge_fields_only_sent_with_name() {
    let bare = MemberRequest { email_address: "a@b.co", status: "subscribed", merge_fields: None };
    assert!(serde_json::to_value(&bare).unwrap().get("merge_fields").is_none());
    let named = MemberRequest { email_address: "a@b.co", status: "subscribed", merge_fields: Some(MergeFields { fname: "Abebe" }) };
    assert_eq!(serde_json::to_value(&named).unwrap()["merge_fields"]["FNAME"], "Abebe");
}

#[tokio::test]
async fn subscribe_checks_config_then_email() {
    let http = reqwest::Client::new();
    assert!(matches!(subscribe(&http, None, Some("a@b.co"), None).await, Err(NewsletterError::NotConfigured)));
    let cfg = cfg("key-us1");
    for bad in [None, Some(""), Some("nope"), Some("a@b")] {
        assert!(matches!(subscribe(&http, Some(&cfg), bad, None).await, Err(NewsletterError::InvalidEmail)));
    }
}

#[test]
fn members_url_honours_base_override() {
    let cfg = MailchimpConfig { base_url: Some("http://127.0.0.1:9/3.0".into()), ..cfg("key-us21") };
    assert_eq!(members_url(&cfg), "http://127.0.0.1:9/3.0/lists/abc123/members");
}
