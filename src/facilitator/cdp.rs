//! Coinbase CDP facilitator integration

use crate::crypto::jwt;
use crate::types::{AuthHeaderProvider, FacilitatorConfig, Phase, PhaseHeaders};
use crate::{Result, X402Error};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::collections::HashMap;

/// Coinbase facilitator base URL
pub const CDP_FACILITATOR_BASE_URL: &str = "https://api.cdp.coinbase.com";
/// Coinbase facilitator v2 route
pub const CDP_FACILITATOR_V2_ROUTE: &str = "/platform/v2/x402";

/// Mints a fresh bearer token per request for the CDP facilitator
#[derive(Clone)]
pub struct CdpAuthHeaders {
    api_key_id: String,
    api_key_secret: String,
}

impl std::fmt::Debug for CdpAuthHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpAuthHeaders")
            .field("api_key_id", &self.api_key_id)
            .field("api_key_secret", &"<redacted>")
            .finish()
    }
}

impl CdpAuthHeaders {
    pub fn new(api_key_id: impl Into<String>, api_key_secret: impl Into<String>) -> Self {
        Self {
            api_key_id: api_key_id.into(),
            api_key_secret: api_key_secret.into(),
        }
    }
}

impl AuthHeaderProvider for CdpAuthHeaders {
    fn headers_for(&self, phase: Phase) -> Result<Option<PhaseHeaders>> {
        if self.api_key_id.is_empty() || self.api_key_secret.is_empty() {
            return Err(X402Error::auth_headers(
                "Missing credentials: CDP API key id and secret must both be set",
            ));
        }

        let token = jwt::create_auth_header_with_method(
            &self.api_key_id,
            &self.api_key_secret,
            "POST",
            CDP_FACILITATOR_BASE_URL,
            &format!("{}/{}", CDP_FACILITATOR_V2_ROUTE, phase),
        )?;

        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), token);
        headers.insert("Correlation-Context".to_string(), correlation_header());
        Ok(Some(headers))
    }
}

/// Create a facilitator config pointing at the CDP facilitator
pub fn cdp_facilitator_config(
    api_key_id: impl Into<String>,
    api_key_secret: impl Into<String>,
) -> FacilitatorConfig {
    FacilitatorConfig::new(format!(
        "{}{}",
        CDP_FACILITATOR_BASE_URL, CDP_FACILITATOR_V2_ROUTE
    ))
    .with_auth_headers(CdpAuthHeaders::new(api_key_id, api_key_secret))
}

fn correlation_header() -> String {
    let data = [
        ("sdk_version", crate::VERSION),
        ("sdk_language", "rust"),
        ("source", "x402-payment-service"),
    ];

    data.iter()
        .map(|(key, value)| format!("{}={}", key, utf8_percent_encode(value, NON_ALPHANUMERIC)))
        .collect::<Vec<_>>()
        .join(",")
}
