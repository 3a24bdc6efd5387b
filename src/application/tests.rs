//! Tests for the payment use-cases

use super::testing::{
    payment_payload, payment_requirements, trip, FakeFacilitator, FakeProvider, Harness,
    InMemoryTrips, RecordingPublisher,
};
use super::{PaymentService, FARE_CURRENCY};
use crate::X402Error;
use rust_decimal::Decimal;
use std::sync::Arc;

#[tokio::test]
async fn test_create_payment_session_publishes_event() {
    let harness = Harness::default_ok();

    let session_id = harness
        .service
        .create_payment_session("trip-123", "user-456", "driver-789", 2500, "eur")
        .await
        .unwrap();

    assert_eq!(session_id, "cs_test_session_456");

    let events = harness.publisher.published();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.user_id, "user-456");
    assert_eq!(event.trip_id, "trip-123");
    assert_eq!(event.session_id, "cs_test_session_456");
    // 2500 cents = 25.00
    assert_eq!(event.amount, Decimal::new(2500, 2));
    assert_eq!(event.currency, "eur");
}

#[tokio::test]
async fn test_create_payment_session_passes_trip_metadata() {
    let harness = Harness::default_ok();

    harness
        .service
        .create_payment_session("trip-1", "user-1", "driver-1", 1000, "usd")
        .await
        .unwrap();

    let calls = harness.provider.calls.lock().unwrap();
    let (amount, currency, metadata) = &calls[0];
    assert_eq!(*amount, 1000);
    assert_eq!(currency, "usd");
    assert_eq!(metadata["trip_id"], "trip-1");
    assert_eq!(metadata["user_id"], "user-1");
    assert_eq!(metadata["driver_id"], "driver-1");
}

#[tokio::test]
async fn test_provider_error_is_returned_and_nothing_published() {
    let harness = Harness::new(
        FakeProvider::failing(),
        RecordingPublisher::default(),
        FakeFacilitator::accepting("0xTX"),
    );

    let error = harness
        .service
        .create_payment_session("trip-1", "user-1", "driver-1", 1000, "usd")
        .await
        .unwrap_err();

    assert!(matches!(error, X402Error::Provider { .. }), "got: {:?}", error);
    assert!(harness.publisher.published().is_empty());
}

#[tokio::test]
async fn test_publisher_error_is_returned() {
    let harness = Harness::new(
        FakeProvider::returning("cs_test_session_123"),
        RecordingPublisher::failing(),
        FakeFacilitator::accepting("0xTX"),
    );

    let error = harness
        .service
        .create_payment_session("trip-1", "user-1", "driver-1", 1000, "usd")
        .await
        .unwrap_err();

    assert!(matches!(error, X402Error::Publish { .. }), "got: {:?}", error);
}

#[tokio::test]
async fn test_card_session_uses_trip_fare() {
    let harness = Harness::default_ok();

    harness
        .service
        .create_payment_session_with_card("trip-123", "user-456")
        .await
        .unwrap();

    let calls = harness.provider.calls.lock().unwrap();
    let (amount, currency, metadata) = &calls[0];
    assert_eq!(*amount, 2500);
    assert_eq!(currency, FARE_CURRENCY);
    assert_eq!(metadata["driver_id"], "driver-789");
}

#[tokio::test]
async fn test_card_session_rejects_other_user() {
    let harness = Harness::default_ok();

    let error = harness
        .service
        .create_payment_session_with_card("trip-123", "someone-else")
        .await
        .unwrap_err();

    assert!(matches!(error, X402Error::Unauthorized { .. }), "got: {:?}", error);
    assert!(harness.provider.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_card_session_for_unknown_trip() {
    let harness = Harness::default_ok();

    let error = harness
        .service
        .create_payment_session_with_card("missing", "user-456")
        .await
        .unwrap_err();

    assert!(matches!(error, X402Error::TripNotFound { .. }), "got: {:?}", error);
}

#[tokio::test]
async fn test_wallet_payment_verifies_then_settles() {
    let harness = Harness::default_ok();

    let settled = harness
        .service
        .settle_wallet_payment(
            "trip-123",
            "user-456",
            &payment_payload(),
            &payment_requirements(),
        )
        .await
        .unwrap();

    assert_eq!(settled.transaction, "0xTX");
    assert_eq!(harness.facilitator.verify_calls(), 1);
    assert_eq!(harness.facilitator.settle_calls(), 1);

    let events = harness.publisher.published();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].session_id, "0xTX");
    assert_eq!(events[0].amount, Decimal::new(2500, 2));
    assert_eq!(events[0].currency, FARE_CURRENCY);
}

#[tokio::test]
async fn test_wallet_payment_rejected_is_never_settled() {
    let mut facilitator = FakeFacilitator::accepting("0xTX");
    facilitator.verify_response.is_valid = false;
    facilitator.verify_response.invalid_reason = Some("invalid_exact_evm_payload_signature".to_string());
    let harness = Harness::new(
        FakeProvider::default(),
        RecordingPublisher::default(),
        facilitator,
    );

    let error = harness
        .service
        .settle_wallet_payment(
            "trip-123",
            "user-456",
            &payment_payload(),
            &payment_requirements(),
        )
        .await
        .unwrap_err();

    match error {
        X402Error::PaymentRejected { reason } => {
            assert_eq!(reason, "invalid_exact_evm_payload_signature")
        }
        other => panic!("Expected PaymentRejected, got: {:?}", other),
    }
    assert_eq!(harness.facilitator.settle_calls(), 0);
    assert!(harness.publisher.published().is_empty());
}

#[tokio::test]
async fn test_wallet_payment_settlement_failure() {
    let mut facilitator = FakeFacilitator::accepting("");
    facilitator.settle_response.success = false;
    facilitator.settle_response.error_reason = Some("insufficient_funds".to_string());
    let harness = Harness::new(
        FakeProvider::default(),
        RecordingPublisher::default(),
        facilitator,
    );

    let error = harness
        .service
        .settle_wallet_payment(
            "trip-123",
            "user-456",
            &payment_payload(),
            &payment_requirements(),
        )
        .await
        .unwrap_err();

    assert!(
        matches!(error, X402Error::SettlementFailed { ref reason } if reason == "insufficient_funds"),
        "got: {:?}",
        error
    );
    assert!(harness.publisher.published().is_empty());
}

#[tokio::test]
async fn test_wallet_payment_checks_trip_owner_first() {
    let harness = Harness::default_ok();

    let error = harness
        .service
        .settle_wallet_payment(
            "trip-123",
            "someone-else",
            &payment_payload(),
            &payment_requirements(),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, X402Error::Unauthorized { .. }));
    assert_eq!(harness.facilitator.verify_calls(), 0);
}

#[tokio::test]
async fn test_wallet_payment_without_facilitator() {
    let service = PaymentService::new(
        Arc::new(FakeProvider::default()),
        Arc::new(RecordingPublisher::default()),
        Arc::new(InMemoryTrips::default().with_trip(trip())),
    );

    let error = service
        .settle_wallet_payment(
            "trip-123",
            "user-456",
            &payment_payload(),
            &payment_requirements(),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, X402Error::Config { .. }));
}
