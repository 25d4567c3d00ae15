use super::*;

fn booking(name: &str, email: &str, phone: &str) -> ClassBookingInquiry {
    ClassBookingInquiry {
        name: Some(name.into()),
        email: Some(email.into()),
        phone: Some(phone.into()),
        class_name: None,
        preferred_date: None,
        message: None,
    }
}

#[test]
fn class_booking_requires_name_email_phone() {
    assert!(matches!(
        render_class_booking(&booking("", "a@b.co", "0911")),
        Err(MailerError::Invalid("Name is required."))
    ));
    assert!(matches!(
        render_class_booking(&booking("Abebe", "", "0911")),
        Err(MailerError::Invalid("Email is required."))
    ));
    assert!(matches!(
        render_class_booking(&booking("Abebe", "nope", "0911")),
        Err(MailerError::Invalid("Invalid email."))
    ));
    assert!(matches!(
        render_class_booking(&booking("Abebe", "a@b.co", " ")),
        Err(MailerError::Invalid("Phone is required."))
    ));
}

#[test]
fn class_booking_renders_optional_rows_only_when_present() {
    let mut input = booking("Abebe", "a@b.co", "0911");
    let rendered = render_class_booking(&input).unwrap();
    assert_eq!(rendered.subject, "New class booking request");
    assert!(rendered.html.contains("Abebe"));
    assert!(!rendered.html.contains("Preferred date"));

    input.preferred_date = Some("2026-10-20".into());
    input.class_name = Some("Spin".into());
    let rendered = render_class_booking(&input).unwrap();
    assert!(rendered.html.contains("Preferred date"));
    assert!(rendered.html.contains("Spin"));
    assert!(!rendered.html.contains("{{ROWS}}"));
}

#[test]
fn inquiry_values_are_escaped() {
    let input = MembershipInquiry {
        name: Some("<script>x</script>".into()),
        email: Some("a@b.co".into()),
        phone: Some("0911".into()),
        preferred_plan: Some("Gold".into()),
        message: None,
    };
    let rendered = render_membership_inquiry(&input).unwrap();
    assert_eq!(rendered.subject, "New membership inquiry");
    assert!(!rendered.html.contains("<script>"));
    assert!(rendered.html.contains("&lt;script&gt;"));
    assert!(rendered.html.contains("Preferred plan"));
}

#[tokio::test]
async fn send_inquiry_without_config_is_not_configured() {
    let rendered = render_class_booking(&booking("Abebe", "a@b.co", "0911")).unwrap();
    let err = send_inquiry(None, &rendered).await.unwrap_err();
    assert!(matches!(err, MailerError::NotConfigured));
    assert_eq!(err.to_string(), "Email service is not configured.");
}

#[tokio::test]
async fn send_inquiry_without_inbox_is_not_configured() {
    let cfg = ResendConfig { api_key: "re_x".into(), from: "gym@x.co".into(), to: None };
    let rendered = render_class_booking(&booking("Abebe", "a@b.co", "0911")).unwrap();
    assert!(matches!(send_inquiry(Some(&cfg), &rendered).await, Err(MailerError::NotConfigured)));
}
