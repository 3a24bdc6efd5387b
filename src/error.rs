//! Error types for the payment service

use crate::types::Phase;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for payment service operations
pub type Result<T> = std::result::Result<T, X402Error>;

/// Errors raised by the facilitator client and the payment use-cases
#[derive(Debug, Error)]
pub enum X402Error {
    /// Invalid or missing configuration, fatal at construction
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The deadline elapsed before the facilitator answered
    #[error("Facilitator {phase} timed out after {timeout:?}")]
    Timeout {
        phase: Phase,
        timeout: Duration,
        /// Set when the call's own deadline fired, unset when the HTTP stack gave up first
        #[source]
        source: Option<tokio::time::error::Elapsed>,
    },

    /// Connection-level failure (refused, DNS, TLS)
    #[error("Facilitator {phase} transport error: {source}")]
    Transport {
        phase: Phase,
        #[source]
        source: reqwest::Error,
    },

    /// The facilitator answered with a non-2xx status
    #[error("Facilitator {phase} failed with status: {status}. Response: {body}")]
    HttpStatus {
        phase: Phase,
        status: u16,
        body: String,
    },

    /// The facilitator answered with a body of the wrong shape
    #[error("Facilitator {phase} returned a malformed response: {source}")]
    Decode {
        phase: Phase,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The auth header provider failed or produced unusable headers
    #[error("Auth headers error: {message}")]
    AuthHeaders { message: String },

    #[error("Invalid payment payload: {message}")]
    InvalidPaymentPayload { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Trip not found: {trip_id}")]
    TripNotFound { trip_id: String },

    #[error("User {user_id} is not authorized for trip {trip_id}")]
    Unauthorized { trip_id: String, user_id: String },

    /// The facilitator verified the payment as invalid
    #[error("Payment rejected: {reason}")]
    PaymentRejected { reason: String },

    /// The facilitator could not execute the settlement
    #[error("Settlement failed: {reason}")]
    SettlementFailed { reason: String },

    #[error("Payment provider error: {message}")]
    Provider { message: String },

    #[error("Event publish error: {message}")]
    Publish { message: String },

    #[error("Repository error: {message}")]
    Repository { message: String },

    #[error("Invalid message: {message}")]
    InvalidMessage { message: String },

    #[error("Unknown routing key: {routing_key}")]
    UnknownRoutingKey { routing_key: String },
}

impl X402Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn auth_headers(message: impl Into<String>) -> Self {
        Self::AuthHeaders {
            message: message.into(),
        }
    }

    pub fn invalid_payment_payload(message: impl Into<String>) -> Self {
        Self::InvalidPaymentPayload {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    pub fn publish(message: impl Into<String>) -> Self {
        Self::Publish {
            message: message.into(),
        }
    }

    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
        }
    }

    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::InvalidMessage {
            message: message.into(),
        }
    }

    /// Whether the call was aborted because its deadline elapsed.
    ///
    /// This is the check callers use to tell a slow facilitator apart from
    /// an unreachable one.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the failure happened before a response was received
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status returned by the facilitator, if the failure carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
