use super::*;

#[test]
fn parse_id_distinguishes_blank_from_garbage() {
    let err = parse_id("  ", "Class ID is required.", "Class").unwrap_err();
    assert_eq!(err.to_string(), "Class ID is required.");
    let err = parse_id("nope", "Class ID is required.", "Class").unwrap_err();
    assert_eq!(err.to_string(), "Class not found.");
    let id = Uuid::new_v4();
    assert_eq!(parse_id(&format!(" {id} "), "x", "y").unwrap(), id);
}

#[test]
fn optional_id_treats_blank_as_unset() {
    assert_eq!(optional_id(None, "bad").unwrap(), None);
    assert_eq!(optional_id(Some("   "), "bad").unwrap(), None);
    assert!(matches!(optional_id(Some("x"), "bad"), Err(AdminError::Invalid("bad"))));
}

#[test]
fn required_id_rejects_blank() {
    assert!(matches!(required_id(Some(""), "Member is required."), Err(AdminError::Invalid(_))));
    let id = Uuid::new_v4();
    assert_eq!(required_id(Some(&id.to_string()), "x").unwrap(), id);
}

#[test]
fn price_rejects_negative_and_non_finite() {
    assert!((price(Some(0.0)).unwrap()).abs() < f64::EPSILON);
    for bad in [Some(-1.0), Some(f64::NAN), Some(f64::INFINITY), None] {
        assert_eq!(price(bad).unwrap_err().to_string(), "Price must be 0 or more.");
    }
}

#[test]
fn inactive_membership_maps_to_invalid() {
    let err = AdminError::from(MembershipError::Inactive);
    assert!(matches!(err, AdminError::Invalid(_)));
}

#[test]
fn in_use_names_the_entity() {
    assert_eq!(AdminError::InUse("Product").to_string(), "Product is still in use.");
}
