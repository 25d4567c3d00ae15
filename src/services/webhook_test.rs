use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::*;
use crate::state::test_helpers::test_app_state;

const SECRET: &str = "whsec_test";

fn sign(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[test]
fn authenticate_requires_secret() {
    let err = authenticate(None, b"{}", Some("00")).unwrap_err();
    assert!(matches!(err, WebhookError::NotConfigured));
    assert!(matches!(authenticate(Some(""), b"{}", Some("00")), Err(WebhookError::NotConfigured)));
}

#[test]
fn authenticate_checks_signature_before_json() {
    let body = b"not json";
    assert!(matches!(authenticate(Some(SECRET), body, Some("deadbeef")), Err(WebhookError::InvalidSignature)));
    assert!(matches!(authenticate(Some(SECRET), body, None), Err(WebhookError::InvalidSignature)));
    assert!(matches!(authenticate(Some(SECRET), body, Some(&sign(body))), Err(WebhookError::InvalidJson)));
}

#[test]
fn authenticate_parses_event_fields() {
    let body = br#"{"event":"charge.success","status":"success","tx_ref":"sweatbox|shop|x","amount":"10"}"#;
    let event = authenticate(Some(SECRET), body, Some(&sign(body))).unwrap();
    assert!(event.is_successful_charge());
    assert_eq!(event.tx_ref.as_deref(), Some("sweatbox|shop|x"));
}

#[test]
fn only_success_event_with_success_status_counts() {
    let event = |e: Option<&str>, s: Option<&str>| ChapaEvent {
        event: e.map(str::to_owned),
        status: s.map(str::to_owned),
        tx_ref: None,
    };
    assert!(event(Some("charge.success"), Some("success")).is_successful_charge());
    assert!(!event(Some("charge.success"), Some("failed")).is_successful_charge());
    assert!(!event(Some("charge.refunded"), Some("success")).is_successful_charge());
    assert!(!event(None, None).is_successful_charge());
}

#[tokio::test]
async fn non_success_events_are_ignored_without_db() {
    let state = test_app_state();
    let event = ChapaEvent { event: Some("charge.failed".into()), status: Some("failed".into()), tx_ref: None };
    assert_eq!(reconcile(&state.pool, &state.notifier, &event).await.unwrap(), WebhookOutcome::Ignored);
}

#[tokio::test]
async fn malformed_reference_is_acknowledged_without_db() {
    let state = test_app_state();
    let event = ChapaEvent {
        event: Some("charge.success".into()),
        status: Some("success".into()),
        tx_ref: Some("sweatbox|not-a-uuid|also-not|1".into()),
    };
    assert_eq!(reconcile(&state.pool, &state.notifier, &event).await.unwrap(), WebhookOutcome::InvalidReference);

    let missing = ChapaEvent { tx_ref: None, ..event };
    assert_eq!(reconcile(&state.pool, &state.notifier, &missing).await.unwrap(), WebhookOutcome::InvalidReference);
}

// =============================================================================
// LIVE DATABASE
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::state::test_helpers::{insert_plan, insert_profile, integration_pool};

    fn success(tx_ref: &str) -> ChapaEvent {
        ChapaEvent {
            event: Some("charge.success".into()),
            status: Some("success".into()),
            tx_ref: Some(tx_ref.to_owned()),
        }
    }

    async fn insert_product(pool: &PgPool, stock: i32) -> Uuid {
        sqlx::query_scalar("INSERT INTO products (name, slug, price_etb, stock) VALUES ('Shaker', $1, 300, $2) RETURNING id")
            .bind(format!("shaker-{}", Uuid::new_v4()))
            .bind(stock)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn insert_pending_order(pool: &PgPool, user_id: Uuid, product_id: Uuid, quantity: i32) -> Uuid {
        let order_id: Uuid =
            sqlx::query_scalar("INSERT INTO orders (user_id, total_etb) VALUES ($1, 300) RETURNING id")
                .bind(user_id)
                .fetch_one(pool)
                .await
                .unwrap();
        sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, price_etb) VALUES ($1, $2, $3, 300)")
            .bind(order_id)
            .bind(product_id)
            .bind(quantity)
            .execute(pool)
            .await
            .unwrap();
        order_id
    }

    async fn subscription_count(pool: &PgPool, user_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn plan_payment_activates_subscription_for_plan_duration() {
        let pool = integration_pool().await;
        let notifier = Notifier::new();
        let mut events = notifier.subscribe();
        let user_id = insert_profile(&pool, "member").await;
        let plan_id = insert_plan(&pool, true, 3).await;
        let tx_ref = chapa::plan_tx_ref(user_id, plan_id, 1_760_000_000_000);

        let outcome = reconcile(&pool, &notifier, &success(&tx_ref)).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::SubscriptionActivated { user_id, plan_id });

        let (status, start, end): (String, chrono::NaiveDate, chrono::NaiveDate) =
            sqlx::query_as("SELECT status, start_date, end_date FROM subscriptions WHERE tx_ref = $1")
                .bind(&tx_ref)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, "active");
        assert_eq!(start, membership::today());
        assert_eq!(end, membership::end_date_for(start, 3));
        assert_eq!(events.recv().await.unwrap().message, "New member signup");
    }

    #[tokio::test]
    async fn replayed_reference_is_applied_once() {
        let pool = integration_pool().await;
        let notifier = Notifier::new();
        let user_id = insert_profile(&pool, "member").await;
        let plan_id = insert_plan(&pool, false, 1).await;
        let event = success(&chapa::plan_tx_ref(user_id, plan_id, 1_760_000_000_001));

        reconcile(&pool, &notifier, &event).await.unwrap();
        let again = reconcile(&pool, &notifier, &event).await.unwrap();
        assert_eq!(again, WebhookOutcome::Replayed);
        assert_eq!(subscription_count(&pool, user_id).await, 1);
    }

    #[tokio::test]
    async fn unknown_plan_is_not_recorded_as_applied() {
        let pool = integration_pool().await;
        let notifier = Notifier::new();
        let user_id = insert_profile(&pool, "member").await;
        let plan_id = Uuid::new_v4();
        let event = success(&chapa::plan_tx_ref(user_id, plan_id, 1_760_000_000_002));

        assert_eq!(reconcile(&pool, &notifier, &event).await.unwrap(), WebhookOutcome::PlanNotFound { plan_id });
        let recorded: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM payment_events WHERE tx_ref = $1)")
            .bind(event.tx_ref.as_deref())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(!recorded);
    }

    #[tokio::test]
    async fn shop_payment_marks_order_paid_and_floors_stock() {
        let pool = integration_pool().await;
        let notifier = Notifier::new();
        let user_id = insert_profile(&pool, "member").await;
        let product_id = insert_product(&pool, 2).await;
        let order_id = insert_pending_order(&pool, user_id, product_id, 5).await;
        let event = success(&chapa::shop_tx_ref(order_id));

        assert_eq!(reconcile(&pool, &notifier, &event).await.unwrap(), WebhookOutcome::OrderPaid { order_id });
        let status: String = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status, "paid");
        let stock: i32 = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stock, 0);

        assert_eq!(reconcile(&pool, &notifier, &event).await.unwrap(), WebhookOutcome::Replayed);
    }

    #[tokio::test]
    async fn paid_order_is_left_unchanged_under_a_new_reference() {
        let pool = integration_pool().await;
        let user_id = insert_profile(&pool, "member").await;
        let product_id = insert_product(&pool, 10).await;
        let order_id = insert_pending_order(&pool, user_id, product_id, 1).await;
        sqlx::query("UPDATE orders SET status = 'shipped' WHERE id = $1")
            .bind(order_id)
            .execute(&pool)
            .await
            .unwrap();

        let outcome = reconcile(&pool, &Notifier::new(), &success(&chapa::shop_tx_ref(order_id))).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::OrderUnchanged { order_id });
    }
}
