use axum::http::StatusCode;
use serde_json::json;

use super::*;

#[test]
fn rating_value_accepts_numbers_and_numeric_strings() {
    assert_eq!(rating_value(&json!(4)), Some(4.0));
    assert_eq!(rating_value(&json!(2.5)), Some(2.5));
    assert_eq!(rating_value(&json!(" 5 ")), Some(5.0));
}

#[test]
fn rating_value_rejects_other_shapes() {
    assert_eq!(rating_value(&json!(null)), None);
    assert_eq!(rating_value(&json!("five")), None);
    assert_eq!(rating_value(&json!([3])), None);
    assert_eq!(rating_value(&json!(true)), None);
}

#[test]
fn booking_errors_map_to_statuses() {
    assert_eq!(ApiError::from(BookingError::SignedOut).status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ApiError::from(BookingError::InvalidDate).status(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::from(BookingError::PeakRestricted).status(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::from(BookingError::ClassNotFound).status(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::from(BookingError::Duplicate).status(), StatusCode::CONFLICT);
}

#[test]
fn library_errors_hide_behind_membership() {
    let err = ApiError::from(ContentError::MembershipRequired);
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(err.to_string(), "Active membership required.");
    assert_eq!(ApiError::from(ContentError::VideoNotFound).status(), StatusCode::NOT_FOUND);
}

#[test]
fn snack_validation_errors_are_bad_requests() {
    for err in [SnackError::InvalidItems, SnackError::NoItems, SnackError::UnknownItems, SnackError::NoValidItems] {
        assert_eq!(ApiError::from(err).status(), StatusCode::BAD_REQUEST);
    }
}

#[test]
fn trainer_errors_map_to_statuses() {
    assert_eq!(ApiError::from(TrainerError::InvalidRating).status(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::from(TrainerError::TrainerRequired).status(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::from(TrainerError::NotFound).status(), StatusCode::NOT_FOUND);
}

#[test]
fn profile_validation_keeps_its_message() {
    let err = ApiError::from(ProfileError::Invalid("Name is required."));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "Name is required.");
}
