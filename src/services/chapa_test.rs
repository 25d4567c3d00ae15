use super::*;

const USER: &str = "6f1c2a4e-8b3d-4c5e-9a7f-1b2c3d4e5f60";
const PLAN: &str = "0a9b8c7d-6e5f-4a3b-8c1d-2e3f4a5b6c7d";

fn sign(body: &[u8], secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

// =============================================================================
// tx_ref
// =============================================================================

#[test]
fn plan_tx_ref_parses_back() {
    let user = Uuid::parse_str(USER).unwrap();
    let plan = Uuid::parse_str(PLAN).unwrap();
    let raw = plan_tx_ref(user, plan, 1_760_000_000_000);
    assert_eq!(raw, format!("sweatbox|{USER}|{PLAN}|1760000000000"));
    assert_eq!(parse_tx_ref(&raw), Some(TxRef::Plan { user_id: user, plan_id: plan }));
}

#[test]
fn shop_tx_ref_wins_over_plan_shape() {
    let order = Uuid::parse_str(PLAN).unwrap();
    let raw = shop_tx_ref(order);
    assert_eq!(raw, format!("sweatbox|shop|{PLAN}"));
    assert_eq!(parse_tx_ref(&raw), Some(TxRef::Shop { order_id: order }));
    assert_eq!(parse_plan_tx_ref(&raw), None);
}

#[test]
fn plan_tx_ref_requires_timestamp_segment() {
    assert_eq!(parse_plan_tx_ref(&format!("sweatbox|{USER}|{PLAN}")), None);
}

#[test]
fn tx_ref_rejects_wrong_prefix() {
    assert_eq!(parse_tx_ref(&format!("gymco|{USER}|{PLAN}|1")), None);
    assert_eq!(parse_tx_ref(&format!("gymco|shop|{PLAN}")), None);
    assert_eq!(parse_tx_ref(""), None);
}

#[test]
fn tx_ref_rejects_non_rfc4122_uuids() {
    // Version nibble 0 and 6 are outside 1-5.
    let v0 = "6f1c2a4e-8b3d-0c5e-9a7f-1b2c3d4e5f60";
    let v6 = "6f1c2a4e-8b3d-6c5e-9a7f-1b2c3d4e5f60";
    // Variant nibble c is outside 8/9/a/b.
    let bad_variant = "6f1c2a4e-8b3d-4c5e-ca7f-1b2c3d4e5f60";
    for bad in [v0, v6, bad_variant, "not-a-uuid", "6f1c2a4e8b3d4c5e9a7f1b2c3d4e5f60"] {
        assert_eq!(parse_tx_ref(&format!("sweatbox|{bad}|{PLAN}|1")), None, "{bad}");
        assert_eq!(parse_shop_tx_ref(&format!("sweatbox|shop|{bad}")), None, "{bad}");
    }
}

#[test]
fn tx_ref_accepts_uppercase_hex() {
    let upper = USER.to_ascii_uppercase();
    assert!(parse_shop_tx_ref(&format!("sweatbox|shop|{upper}")).is_some());
}

// =============================================================================
// signature
// =============================================================================

#[test]
fn signature_matches_hex_hmac_of_body() {
    let body = br#"{"event":"charge.success","status":"success"}"#;
    let sig = sign(body, "whsec");
    assert!(verify_signature(body, "whsec", Some(&sig)));
    assert!(verify_signature(body, "whsec", Some(&sig.to_ascii_uppercase())));
}

#[test]
fn signature_rejects_tampering_and_absence() {
    let body = br#"{"tx_ref":"a"}"#;
    let sig = sign(body, "whsec");
    assert!(!verify_signature(br#"{"tx_ref":"b"}"#, "whsec", Some(&sig)));
    assert!(!verify_signature(body, "other", Some(&sig)));
    assert!(!verify_signature(body, "whsec", None));
    assert!(!verify_signature(body, "whsec", Some("")));
    assert!(!verify_signature(body, "whsec", Some("zz-not-hex")));
}

// =============================================================================
// initialize payload
// =============================================================================

#[test]
fn split_name_handles_blank_single_and_multi() {
    assert_eq!(split_name(None), ("Customer".to_owned(), String::new()));
    assert_eq!(split_name(Some("   ")), ("Customer".to_owned(), String::new()));
    assert_eq!(split_name(Some("Abebe")), ("Abebe".to_owned(), String::new()));
    assert_eq!(split_name(Some(" Abebe  Kebede Alemu ")), ("Abebe".to_owned(), "Kebede Alemu".to_owned()));
}

#[test]
fn initialize_request_omits_urls_without_app_url() {
    let req = InitializeRequest::new("1500".into(), "a@b.co".into(), None, "ref".into(), None, "/dashboard");
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["currency"], "ETB");
    assert_eq!(json["first_name"], "Customer");
    assert!(json.get("callback_url").is_none());
    assert!(json.get("return_url").is_none());
}

#[test]
fn initialize_request_builds_urls_from_app_url() {
    let req = InitializeRequest::new(
        "1500".into(),
        "a@b.co".into(),
        Some("Abebe Kebede"),
        "ref".into(),
        Some("https://sweatbox.et"),
        "/account/orders",
    );
    assert_eq!(req.callback_url.as_deref(), Some("https://sweatbox.et/api/payment/callback"));
    assert_eq!(req.return_url.as_deref(), Some("https://sweatbox.et/account/orders"));
    assert_eq!(req.last_name, "Kebede");
}

#[test]
fn gateway_message_prefers_message_then_error() {
    let resp: InitializeResponse = serde_json::from_str(r#"{"message":"Invalid currency"}"#).unwrap();
    assert_eq!(gateway_message(&resp), "Invalid currency");

    let resp: InitializeResponse = serde_json::from_str(r#"{"error":"Bad key"}"#).unwrap();
    assert_eq!(gateway_message(&resp), "Bad key");

    let resp: InitializeResponse = serde_json::from_str(r#"{"message":{"email":["required"]}}"#).unwrap();
    assert_eq!(gateway_message(&resp), r#"{"email":["required"]}"#);

    assert_eq!(gateway_message(&InitializeResponse::default()), "Chapa request failed.");
}
