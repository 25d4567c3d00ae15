use super::*;

#[test]
fn trimmed_drops_blank() {
    assert_eq!(trimmed(Some("  hi ")), Some("hi".to_owned()));
    assert_eq!(trimmed(Some("   ")), None);
    assert_eq!(trimmed(None), None);
}

#[test]
fn required_reports_message() {
    assert_eq!(required(Some(" Yoga "), "Name is required."), Ok("Yoga".to_owned()));
    assert_eq!(required(Some(""), "Name is required."), Err("Name is required."));
}

#[test]
fn slugify_normalizes_case_and_spaces() {
    assert_eq!(slugify("  Bole  Branch "), "bole-branch");
    assert_eq!(slugify("Lifting\tStraps XL"), "lifting-straps-xl");
    assert_eq!(slugify("   "), "");
}

#[test]
fn split_csv_trims_and_filters() {
    assert_eq!(split_csv("hiit, yoga ,, strength"), vec!["hiit", "yoga", "strength"]);
    assert!(split_csv(" , ").is_empty());
}

#[test]
fn plausible_email_accepts_common_shapes() {
    assert!(is_plausible_email("abebe@sweatbox.et"));
    assert!(is_plausible_email("first.last+tag@mail.example.com"));
}

#[test]
fn plausible_email_only_needs_one_inner_dot_in_the_domain() {
    assert!(is_plausible_email("a@b.c."));
    assert!(is_plausible_email("a@b.."));
    assert!(is_plausible_email("a@b.c"));
}

#[test]
fn plausible_email_rejects_bad_shapes() {
    for bad in ["", "abebe", "abebe@", "@x.com", "a@b", "a@.com", "a@b.", "a b@c.com", "a@b@c.com"] {
        assert!(!is_plausible_email(bad), "{bad:?} should be rejected");
    }
}

#[test]
fn escape_html_escapes_markup() {
    assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
}
