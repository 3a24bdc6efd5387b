//! Capabilities the payment use-cases depend on
//!
//! Adapters for the checkout provider, the message bus and the trip store live
//! outside this crate; they plug in by implementing these traits.

use crate::types::{PaymentPayload, PaymentRequirements, SettleResponse, VerifyResponse};
use crate::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A trip as stored by the trip service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub user_id: String,
    pub driver_id: String,
    /// Total fare, in cents
    pub total_price_in_cents: i64,
}

/// Published once a payment session exists (hosted checkout or settled wallet payment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSessionCreatedEvent {
    /// Owner of the event on the bus
    pub user_id: String,
    pub trip_id: String,
    /// Checkout session id, or the settlement transaction for wallet payments
    pub session_id: String,
    /// Amount in major currency units
    pub amount: Decimal,
    pub currency: String,
}

/// Hosted-checkout session creator (e.g. Stripe)
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session and return its id
    async fn create_payment_session(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> Result<String>;
}

/// Outbound event bus
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_payment_session_created(
        &self,
        event: &PaymentSessionCreatedEvent,
    ) -> Result<()>;
}

/// Trip lookup, used to authorize the requester
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Fails with [`crate::X402Error::TripNotFound`] when no trip has this id
    async fn get_trip_by_id(&self, trip_id: &str) -> Result<Trip>;
}

/// Two-phase verify-then-settle capability of an x402 facilitator
#[async_trait]
pub trait PaymentFacilitator: Send + Sync {
    async fn verify(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse>;

    async fn settle(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse>;
}
