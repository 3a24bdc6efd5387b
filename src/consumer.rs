//! Inbound message dispatch
//!
//! Decodes bus messages and routes them, by routing key, to the matching
//! [`PaymentService`] use-case. The AMQP consumer loop itself lives outside
//! this crate and calls [`EventHandler::handle`] for every delivery.

use crate::application::PaymentService;
use crate::types::{PaymentPayload, PaymentRequirements};
use crate::{Result, X402Error};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Routing keys understood by [`EventHandler`]
pub mod routing_keys {
    /// Create a hosted-checkout session for a trip
    pub const PAYMENT_CMD_CREATE_SESSION: &str = "payment.cmd.create_session";
    /// Verify and settle a wallet-signed x402 payment for a trip
    pub const PAYMENT_CMD_SETTLE_WALLET_PAYMENT: &str = "payment.cmd.settle_wallet_payment";
}

/// Envelope of every message on the bus
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusMessage {
    #[serde(default)]
    pub owner_id: String,
    pub data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionCommand {
    trip_id: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettleWalletPaymentCommand {
    trip_id: String,
    user_id: String,
    /// Base64 `X-PAYMENT` header value
    payment_header: String,
    payment_requirements: PaymentRequirements,
}

/// Handles incoming bus messages for payment commands
#[derive(Debug, Clone)]
pub struct EventHandler {
    payment_service: PaymentService,
}

impl EventHandler {
    pub fn new(payment_service: PaymentService) -> Self {
        Self { payment_service }
    }

    /// Process one delivery
    pub async fn handle(&self, routing_key: &str, body: &[u8]) -> Result<()> {
        if body.is_empty() {
            return Err(X402Error::invalid_message("message body is empty"));
        }

        let message: BusMessage = serde_json::from_slice(body).map_err(|e| {
            X402Error::invalid_message(format!("failed to unmarshal message: {}", e))
        })?;

        tracing::debug!(routing_key, owner_id = %message.owner_id, "Received message");

        match routing_key {
            routing_keys::PAYMENT_CMD_CREATE_SESSION => self.handle_create_session(message).await,
            routing_keys::PAYMENT_CMD_SETTLE_WALLET_PAYMENT => {
                self.handle_settle_wallet_payment(message).await
            }
            _ => Err(X402Error::UnknownRoutingKey {
                routing_key: routing_key.to_string(),
            }),
        }
    }

    async fn handle_create_session(&self, message: BusMessage) -> Result<()> {
        let command: CreateSessionCommand = decode_data(message.data)?;

        let session_id = self
            .payment_service
            .create_payment_session_with_card(&command.trip_id, &command.user_id)
            .await?;

        tracing::info!(trip_id = %command.trip_id, %session_id, "Checkout session ready");
        Ok(())
    }

    async fn handle_settle_wallet_payment(&self, message: BusMessage) -> Result<()> {
        let command: SettleWalletPaymentCommand = decode_data(message.data)?;
        let payment_payload = PaymentPayload::from_base64(&command.payment_header)?;

        let settled = self
            .payment_service
            .settle_wallet_payment(
                &command.trip_id,
                &command.user_id,
                &payment_payload,
                &command.payment_requirements,
            )
            .await?;

        tracing::info!(
            trip_id = %command.trip_id,
            transaction = %settled.transaction,
            "Wallet payment complete"
        );
        Ok(())
    }
}

fn decode_data<T: DeserializeOwned>(data: Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| X402Error::invalid_message(format!("invalid command data: {}", e)))
}
