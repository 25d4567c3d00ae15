use serde_json::json;

use super::*;

#[test]
fn specialties_accept_array_or_comma_string() {
    let id = Uuid::new_v4();
    let from_list: TrainerInput = serde_json::from_value(json!({
        "profile_id": id.to_string(),
        "display_name": "Abebe",
        "specialties": [" HIIT ", "", "Boxing"],
    }))
    .unwrap();
    assert_eq!(trainer_input(&from_list).unwrap().specialties, vec!["HIIT", "Boxing"]);

    let from_csv: TrainerInput = serde_json::from_value(json!({
        "profile_id": id.to_string(),
        "display_name": "Abebe",
        "specialties": "HIIT, Boxing,,",
    }))
    .unwrap();
    assert_eq!(trainer_input(&from_csv).unwrap().specialties, vec!["HIIT", "Boxing"]);
}

#[test]
fn trainer_requires_member_then_display_name() {
    let err = trainer_input(&TrainerInput::default()).unwrap_err();
    assert_eq!(err.to_string(), "Member is required.");
    let input = TrainerInput { profile_id: Some(Uuid::new_v4().to_string()), ..TrainerInput::default() };
    assert_eq!(trainer_input(&input).unwrap_err().to_string(), "Display name is required.");
}

#[test]
fn trainer_blank_socials_become_none() {
    let input = TrainerInput {
        profile_id: Some(Uuid::new_v4().to_string()),
        display_name: Some("Sara".into()),
        instagram_url: Some("  ".into()),
        tiktok_url: Some(" https://tiktok.com/@sara ".into()),
        ..TrainerInput::default()
    };
    let fields = trainer_input(&input).unwrap();
    assert_eq!(fields.instagram_url, None);
    assert_eq!(fields.tiktok_url.as_deref(), Some("https://tiktok.com/@sara"));
    assert!(fields.specialties.is_empty());
}

#[test]
fn gallery_image_requires_src() {
    let err = gallery_image_input(&GalleryImageInput::default()).unwrap_err();
    assert_eq!(err.to_string(), "Image URL is required.");
    let fields = gallery_image_input(&GalleryImageInput { src: Some("/g/1.jpg".into()), ..GalleryImageInput::default() })
        .unwrap();
    assert_eq!(fields.alt, "");
    assert_eq!(fields.sort_order, 0);
}

#[test]
fn workout_video_requires_title_then_url() {
    let err = workout_video_input(&WorkoutVideoInput::default()).unwrap_err();
    assert_eq!(err.to_string(), "Title is required.");
    let input = WorkoutVideoInput { title: Some("Core".into()), ..WorkoutVideoInput::default() };
    assert_eq!(workout_video_input(&input).unwrap_err().to_string(), "Video URL is required.");

    let input = WorkoutVideoInput {
        title: Some("Core".into()),
        video_url: Some("https://v.example/core.mp4".into()),
        tags: Some(ListOrCsv::Csv("abs, beginner".into())),
        ..WorkoutVideoInput::default()
    };
    assert_eq!(workout_video_input(&input).unwrap().tags, vec!["abs", "beginner"]);
}
