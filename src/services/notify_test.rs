use super::*;

#[tokio::test]
async fn subscribers_receive_published_events() {
    let notifier = Notifier::new();
    let mut rx = notifier.subscribe();
    notifier.publish(AdminEvent::new_booking());

    let event = rx.recv().await.unwrap();
    assert_eq!(event.kind, AdminEventKind::Booking);
    assert_eq!(event.message, "New class booking");
}

#[test]
fn publish_without_subscribers_is_silent() {
    let notifier = Notifier::new();
    notifier.publish(AdminEvent::new_membership());
}

#[tokio::test]
async fn lagging_receiver_skips_oldest() {
    let notifier = Notifier::new();
    let mut rx = notifier.subscribe();
    for _ in 0..(CHANNEL_CAPACITY + 5) {
        notifier.publish(AdminEvent::booking_updated());
    }
    assert!(matches!(rx.recv().await, Err(broadcast::error::RecvError::Lagged(5))));
    assert!(rx.recv().await.is_ok());
}

#[test]
fn event_serializes_kind_snake_case() {
    let json = serde_json::to_value(AdminEvent::new_membership()).unwrap();
    assert_eq!(json["kind"], "membership");
    assert_eq!(json["message"], "New member signup");
    assert!(json["id"].is_string());
    assert!(json["at"].is_string());
}
