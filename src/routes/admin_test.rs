use super::*;

#[test]
fn admin_errors_map_to_statuses() {
    assert_eq!(ApiError::from(AdminError::Invalid("Plan name is required.")).status(), StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::from(AdminError::NotFound("Plan")).status(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::from(AdminError::Conflict("Slug taken.")).status(), StatusCode::CONFLICT);
}

#[test]
fn rows_still_referenced_are_conflicts_with_a_message() {
    let err = ApiError::from(AdminError::InUse("Plan"));
    assert_eq!(err.status(), StatusCode::CONFLICT);
    assert_eq!(err.to_string(), "Plan is still in use.");
}

#[test]
fn created_answers_201_with_the_id() {
    let id = Uuid::new_v4();
    let (status, Json(body)) = created(id);
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], json!(id));
}
