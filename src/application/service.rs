//! Payment use-cases

use super::ports::{
    EventPublisher, PaymentFacilitator, PaymentProvider, PaymentSessionCreatedEvent, Trip,
    TripRepository,
};
use crate::types::{PaymentPayload, PaymentRequirements, SettleResponse};
use crate::{Result, X402Error};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// Currency charged for trip fares
pub const FARE_CURRENCY: &str = "USD";

/// Creates payment sessions for trips and publishes the outcome
#[derive(Clone)]
pub struct PaymentService {
    provider: Arc<dyn PaymentProvider>,
    publisher: Arc<dyn EventPublisher>,
    trips: Arc<dyn TripRepository>,
    facilitator: Option<Arc<dyn PaymentFacilitator>>,
}

impl std::fmt::Debug for PaymentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentService")
            .field("facilitator", &self.facilitator.is_some())
            .finish_non_exhaustive()
    }
}

impl PaymentService {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        publisher: Arc<dyn EventPublisher>,
        trips: Arc<dyn TripRepository>,
    ) -> Self {
        Self {
            provider,
            publisher,
            trips,
            facilitator: None,
        }
    }

    /// Enable wallet-signed payments through an x402 facilitator
    pub fn with_facilitator(mut self, facilitator: Arc<dyn PaymentFacilitator>) -> Self {
        self.facilitator = Some(facilitator);
        self
    }

    /// Create a hosted-checkout session and announce it on the bus
    pub async fn create_payment_session(
        &self,
        trip_id: &str,
        user_id: &str,
        driver_id: &str,
        amount_cents: i64,
        currency: &str,
    ) -> Result<String> {
        let metadata = HashMap::from([
            ("trip_id".to_string(), trip_id.to_string()),
            ("user_id".to_string(), user_id.to_string()),
            ("driver_id".to_string(), driver_id.to_string()),
        ]);

        let session_id = self
            .provider
            .create_payment_session(amount_cents, currency, metadata)
            .await?;

        tracing::info!(trip_id, user_id, session_id = %session_id, "Payment session created");

        let event = PaymentSessionCreatedEvent {
            user_id: user_id.to_string(),
            trip_id: trip_id.to_string(),
            session_id: session_id.clone(),
            amount: cents_to_major(amount_cents),
            currency: currency.to_string(),
        };
        self.publisher.publish_payment_session_created(&event).await?;

        Ok(session_id)
    }

    /// Create a checkout session for the fare of a trip owned by `user_id`
    pub async fn create_payment_session_with_card(
        &self,
        trip_id: &str,
        user_id: &str,
    ) -> Result<String> {
        let trip = self.authorized_trip(trip_id, user_id).await?;

        self.create_payment_session(
            trip_id,
            user_id,
            &trip.driver_id,
            trip.total_price_in_cents,
            FARE_CURRENCY,
        )
        .await
    }

    /// Verify then settle a wallet-signed payment for a trip owned by `user_id`.
    ///
    /// Settlement is only attempted once the facilitator has accepted the
    /// authorization. The returned transaction is published as the session id.
    pub async fn settle_wallet_payment(
        &self,
        trip_id: &str,
        user_id: &str,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        let facilitator = self
            .facilitator
            .as_ref()
            .ok_or_else(|| X402Error::config("No facilitator configured for wallet payments"))?;

        let trip = self.authorized_trip(trip_id, user_id).await?;

        if let Some(exact) = payment_payload.as_exact_evm() {
            let now = chrono::Utc::now().timestamp();
            match exact.authorization.is_active_at(now) {
                Ok(true) => {}
                Ok(false) => tracing::warn!(
                    trip_id,
                    valid_after = %exact.authorization.valid_after,
                    valid_before = %exact.authorization.valid_before,
                    "Authorization window does not cover the current time"
                ),
                Err(error) => tracing::warn!(trip_id, %error, "Unreadable authorization window"),
            }
        }

        let verified = facilitator
            .verify(payment_payload, payment_requirements)
            .await?;
        if !verified.is_valid {
            let reason = verified
                .invalid_reason
                .unwrap_or_else(|| "unspecified".to_string());
            tracing::warn!(trip_id, user_id, %reason, "Wallet payment rejected");
            return Err(X402Error::PaymentRejected { reason });
        }

        let settled = facilitator
            .settle(payment_payload, payment_requirements)
            .await?;
        if !settled.success {
            let reason = settled
                .error_reason
                .clone()
                .unwrap_or_else(|| "unspecified".to_string());
            tracing::error!(trip_id, user_id, %reason, "Wallet payment settlement failed");
            return Err(X402Error::SettlementFailed { reason });
        }

        tracing::info!(
            trip_id,
            user_id,
            transaction = %settled.transaction,
            network = %settled.network,
            "Wallet payment settled"
        );

        let event = PaymentSessionCreatedEvent {
            user_id: user_id.to_string(),
            trip_id: trip_id.to_string(),
            session_id: settled.transaction.clone(),
            amount: cents_to_major(trip.total_price_in_cents),
            currency: FARE_CURRENCY.to_string(),
        };
        self.publisher.publish_payment_session_created(&event).await?;

        Ok(settled)
    }

    async fn authorized_trip(&self, trip_id: &str, user_id: &str) -> Result<Trip> {
        let trip = self.trips.get_trip_by_id(trip_id).await?;
        if trip.user_id != user_id {
            tracing::warn!(trip_id, user_id, "Requester does not own the trip");
            return Err(X402Error::Unauthorized {
                trip_id: trip_id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        Ok(trip)
    }
}

fn cents_to_major(amount_cents: i64) -> Decimal {
    Decimal::new(amount_cents, 2)
}
