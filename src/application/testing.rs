//! In-memory port implementations shared by the crate's tests

use super::ports::{
    EventPublisher, PaymentFacilitator, PaymentProvider, PaymentSessionCreatedEvent, Trip,
    TripRepository,
};
use super::PaymentService;
use crate::types::{
    ExactEvmAuthorization, ExactEvmPayload, PaymentPayload, PaymentRequirements, SettleResponse,
    VerifyResponse,
};
use crate::{Result, X402Error};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeProvider {
    pub session_id: String,
    pub fail: bool,
    pub calls: Mutex<Vec<(i64, String, HashMap<String, String>)>>,
}

impl FakeProvider {
    pub fn returning(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl PaymentProvider for FakeProvider {
    async fn create_payment_session(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((amount_cents, currency.to_string(), metadata));
        if self.fail {
            return Err(X402Error::provider("stripe api error"));
        }
        Ok(self.session_id.clone())
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub fail: bool,
    pub events: Mutex<Vec<PaymentSessionCreatedEvent>>,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn published(&self) -> Vec<PaymentSessionCreatedEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish_payment_session_created(
        &self,
        event: &PaymentSessionCreatedEvent,
    ) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            return Err(X402Error::publish("broker unavailable"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryTrips {
    trips: HashMap<String, Trip>,
}

impl InMemoryTrips {
    pub fn with_trip(mut self, trip: Trip) -> Self {
        self.trips.insert(trip.id.clone(), trip);
        self
    }
}

#[async_trait]
impl TripRepository for InMemoryTrips {
    async fn get_trip_by_id(&self, trip_id: &str) -> Result<Trip> {
        self.trips
            .get(trip_id)
            .cloned()
            .ok_or_else(|| X402Error::TripNotFound {
                trip_id: trip_id.to_string(),
            })
    }
}

pub struct FakeFacilitator {
    pub verify_response: VerifyResponse,
    pub settle_response: SettleResponse,
    pub verify_calls: AtomicUsize,
    pub settle_calls: AtomicUsize,
}

impl FakeFacilitator {
    pub fn accepting(transaction: &str) -> Self {
        Self {
            verify_response: VerifyResponse {
                is_valid: true,
                invalid_reason: None,
                payer: Some("0xA".to_string()),
            },
            settle_response: SettleResponse {
                success: true,
                error_reason: None,
                transaction: transaction.to_string(),
                network: "base-sepolia".to_string(),
                payer: Some("0xA".to_string()),
            },
            verify_calls: AtomicUsize::new(0),
            settle_calls: AtomicUsize::new(0),
        }
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn settle_calls(&self) -> usize {
        self.settle_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentFacilitator for FakeFacilitator {
    async fn verify(
        &self,
        _payment_payload: &PaymentPayload,
        _payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.verify_response.clone())
    }

    async fn settle(
        &self,
        _payment_payload: &PaymentPayload,
        _payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        self.settle_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.settle_response.clone())
    }
}

pub fn trip() -> Trip {
    Trip {
        id: "trip-123".to_string(),
        user_id: "user-456".to_string(),
        driver_id: "driver-789".to_string(),
        total_price_in_cents: 2500,
    }
}

pub fn payment_payload() -> PaymentPayload {
    PaymentPayload::exact_evm(
        "base-sepolia",
        ExactEvmPayload {
            signature: "0xsig".to_string(),
            authorization: ExactEvmAuthorization::new(
                "0xA",
                "0xB",
                "25000000",
                "1745323800",
                "1745323985",
                "0xN",
            ),
        },
    )
    .unwrap()
}

pub fn payment_requirements() -> PaymentRequirements {
    PaymentRequirements::new(
        "exact",
        "base-sepolia",
        "25000000",
        "0xUSDC",
        "0x123",
        "https://example.com/trips/trip-123",
        "Trip fare",
    )
}

/// Ports behind a service, kept around so tests can inspect them
pub struct Harness {
    pub provider: Arc<FakeProvider>,
    pub publisher: Arc<RecordingPublisher>,
    pub facilitator: Arc<FakeFacilitator>,
    pub service: PaymentService,
}

impl Harness {
    pub fn new(
        provider: FakeProvider,
        publisher: RecordingPublisher,
        facilitator: FakeFacilitator,
    ) -> Self {
        let provider = Arc::new(provider);
        let publisher = Arc::new(publisher);
        let facilitator = Arc::new(facilitator);
        let service = PaymentService::new(
            provider.clone(),
            publisher.clone(),
            Arc::new(InMemoryTrips::default().with_trip(trip())),
        )
        .with_facilitator(facilitator.clone());

        Self {
            provider,
            publisher,
            facilitator,
            service,
        }
    }

    pub fn default_ok() -> Self {
        Self::new(
            FakeProvider::returning("cs_test_session_456"),
            RecordingPublisher::default(),
            FakeFacilitator::accepting("0xTX"),
        )
    }
}
