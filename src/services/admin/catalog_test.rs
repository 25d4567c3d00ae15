use serde_json::json;

use super::*;

fn product() -> ProductInput {
    ProductInput {
        name: Some("Lifting Belt".into()),
        slug: Some(" Lifting  Belt ".into()),
        price_etb: Some(2400.0),
        ..ProductInput::default()
    }
}

#[test]
fn product_defaults_category_and_floors_stock() {
    let mut input = product();
    input.stock = Some(-4);
    let fields = product_input(&input).unwrap();
    assert_eq!(fields.slug, "lifting-belt");
    assert_eq!(fields.category, "gear");
    assert_eq!(fields.stock, 0);

    input.stock = None;
    input.category = Some(" apparel ".into());
    let fields = product_input(&input).unwrap();
    assert_eq!(fields.category, "apparel");
    assert_eq!(fields.stock, 0);
}

#[test]
fn product_messages() {
    let mut input = product();
    input.name = None;
    assert_eq!(product_input(&input).unwrap_err().to_string(), "Product name is required.");
    let mut input = product();
    input.slug = None;
    assert_eq!(product_input(&input).unwrap_err().to_string(), "Slug is required.");
    let mut input = product();
    input.price_etb = Some(-1.0);
    assert_eq!(product_input(&input).unwrap_err().to_string(), "Price must be 0 or more.");
}

#[test]
fn shop_status_must_be_known() {
    assert_eq!(shop_order_status(Some(" shipped ")).unwrap(), "shipped");
    assert_eq!(shop_order_status(Some("refunded")).unwrap_err().to_string(), "Invalid status.");
    assert!(shop_order_status(None).is_err());
}

#[test]
fn snack_item_requires_name() {
    let err = snack_item_input(&SnackItemInput { price_etb: Some(50.0), ..SnackItemInput::default() }).unwrap_err();
    assert_eq!(err.to_string(), "Name is required.");
    let fields = snack_item_input(&SnackItemInput {
        name: Some("Protein shake".into()),
        price_etb: Some(180.0),
        available: true,
        ..SnackItemInput::default()
    })
    .unwrap();
    assert_eq!(fields.sort_order, 0);
    assert!(fields.available);
}

#[test]
fn snack_patch_distinguishes_absent_from_null_pickup() {
    let absent: SnackOrderPatch = serde_json::from_value(json!({ "status": "ready" })).unwrap();
    let changes = snack_order_changes(&absent).unwrap();
    assert_eq!(changes.status, Some("ready"));
    assert_eq!(changes.pickup_at, None);

    let cleared: SnackOrderPatch = serde_json::from_value(json!({ "pickup_at": null })).unwrap();
    assert_eq!(snack_order_changes(&cleared).unwrap().pickup_at, Some(None));

    let set: SnackOrderPatch = serde_json::from_value(json!({ "pickup_at": "2026-10-16T07:30:00Z" })).unwrap();
    assert!(matches!(snack_order_changes(&set).unwrap().pickup_at, Some(Some(_))));
}

#[test]
fn snack_patch_rejects_bad_values() {
    let bad_status: SnackOrderPatch = serde_json::from_value(json!({ "status": "eaten" })).unwrap();
    assert_eq!(snack_order_changes(&bad_status).unwrap_err().to_string(), "Invalid status.");
    let bad_time: SnackOrderPatch = serde_json::from_value(json!({ "pickup_at": "soon" })).unwrap();
    assert_eq!(snack_order_changes(&bad_time).unwrap_err().to_string(), "Invalid pickup time.");
}

#[test]
fn empty_patch_changes_nothing() {
    let patch: SnackOrderPatch = serde_json::from_value(json!({})).unwrap();
    assert!(snack_order_changes(&patch).unwrap().is_empty());
}
