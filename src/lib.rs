//! # x402 Payment Service
//!
//! Trip payments for a ride-hailing backend, with wallet-signed payments settled
//! through an x402 facilitator.
//!
//! ## Features
//!
//! - **Facilitator client**: `verify` and `settle` calls with per-call timeouts,
//!   caller deadlines and per-phase authentication headers
//! - **Typed payloads**: the `exact` EVM scheme is decoded into concrete types,
//!   anything else is carried verbatim
//! - **CDP support**: JWT-signed headers for the Coinbase Developer Platform facilitator
//! - **Payment use-cases**: hosted checkout sessions and wallet payments for trips
//! - **Message dispatch**: bus commands routed to the matching use-case
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use x402_payment_service::{
//!     types::{FacilitatorConfig, PaymentPayload, PaymentRequirements},
//!     FacilitatorClient,
//! };
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FacilitatorClient::new(
//!         FacilitatorConfig::new("https://x402.org/facilitator")
//!             .with_timeout(Duration::from_secs(5)),
//!     )?;
//!
//!     let payment_payload = PaymentPayload::from_base64("eyJ4NDAy...")?;
//!     let payment_requirements = PaymentRequirements::new(
//!         "exact",
//!         "base-sepolia",
//!         "1000000",
//!         "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
//!         "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
//!         "https://example.com/trips/trip-123",
//!         "Trip fare",
//!     );
//!
//!     let verified = client.verify(&payment_payload, &payment_requirements).await?;
//!     if verified.is_valid {
//!         let settled = client.settle(&payment_payload, &payment_requirements).await?;
//!         println!("Settled in {}", settled.transaction);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`types`**: wire types for payments and facilitator responses
//! - **`facilitator`**: HTTP facilitator client and the CDP auth provider
//! - **`crypto`**: JWT minting for authenticated facilitators
//! - **`application`**: payment use-cases and the ports they depend on
//! - **`consumer`**: routing of bus messages to use-cases
//! - **`config`**: environment configuration

pub mod application;
pub mod config;
pub mod consumer;
pub mod crypto;
pub mod error;
pub mod facilitator;
pub mod types;

pub use application::PaymentService;
pub use error::{Result, X402Error};
pub use facilitator::FacilitatorClient;
pub use types::*;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
