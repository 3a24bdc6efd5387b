//! Cryptographic utilities
//!
//! Only token minting lives here: the service never verifies payment
//! signatures itself, that is the facilitator's job.
//!
//! - [`jwt`] - JWT bearer tokens for facilitator API authentication

pub mod jwt;

pub use jwt::{create_auth_header_with_method, generate_jwt, JwtOptions};
