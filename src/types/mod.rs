//! Core types for the x402 facilitator protocol
//!
//! This module defines the data exchanged with an x402 facilitator: the signed
//! payment payload, the requirements it has to satisfy, the facilitator's
//! verify/settle answers, and the client configuration.
//!
//! # Architecture
//!
//! - [`payment`] - Payment requirements and payload structures
//! - [`facilitator`] - Facilitator configuration, auth headers and response types
//! - [`constants`] - Protocol constants (networks, schemes)
//!
//! # Examples
//!
//! ## Creating a Payment Payload
//!
//! ```
//! use x402_payment_service::types::{ExactEvmAuthorization, ExactEvmPayload, PaymentPayload};
//!
//! # fn example() -> x402_payment_service::Result<()> {
//! let authorization = ExactEvmAuthorization::new(
//!     "0x857b06519E91e3A54538791bDbb0E22373e36b66",   // from
//!     "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",   // to
//!     "1000000",                                        // value
//!     "1745323800",                                     // validAfter
//!     "1745323985",                                     // validBefore
//!     "0xf3746613c2d920b5fdabc0856f2aeb2d4f88ee6037b8cc5d04a71a4462f13480", // nonce
//! );
//!
//! let payment = PaymentPayload::exact_evm(
//!     "base-sepolia",
//!     ExactEvmPayload {
//!         signature: "0x2d6a...".to_string(),
//!         authorization,
//!     },
//! )?;
//!
//! // Encode for the X-PAYMENT header
//! let encoded = payment.to_base64()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Facilitator Configuration
//!
//! ```
//! use x402_payment_service::types::{FacilitatorConfig, Phase, StaticAuthHeaders};
//! use std::time::Duration;
//!
//! # fn example() -> x402_payment_service::Result<()> {
//! let config = FacilitatorConfig::new("https://x402.org/facilitator")
//!     .with_timeout(Duration::from_secs(3))
//!     .with_auth_headers(
//!         StaticAuthHeaders::new().with_header(Phase::Verify, "Authorization", "Bearer token"),
//!     );
//!
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod facilitator;
pub mod payment;

pub use constants::{networks, schemes};
pub use facilitator::{
    AuthHeaderProvider, FacilitatorConfig, Phase, PhaseHeaders, SettleResponse,
    StaticAuthHeaders, TimeoutFn, VerifyResponse, DEFAULT_FACILITATOR_URL, DEFAULT_TIMEOUT,
};
pub use payment::{
    ExactEvmAuthorization, ExactEvmPayload, PaymentPayload, PaymentRequirements, SchemePayload,
    X402_VERSION,
};
