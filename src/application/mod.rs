//! Payment application layer
//!
//! [`PaymentService`] implements the two ways a trip gets paid:
//! - hosted checkout: a [`PaymentProvider`] creates a session for the fare;
//! - wallet-signed x402 payments: a [`PaymentFacilitator`] verifies and then
//!   settles the signed authorization.
//!
//! Either way a [`PaymentSessionCreatedEvent`] is published afterwards.

pub mod ports;
mod service;

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod tests;

pub use ports::{
    EventPublisher, PaymentFacilitator, PaymentProvider, PaymentSessionCreatedEvent, Trip,
    TripRepository,
};
pub use service::{PaymentService, FARE_CURRENCY};
