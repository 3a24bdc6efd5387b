//! Facilitator client for payment verification and settlement
//!
//! A facilitator is the trusted third party that checks a signed payment
//! authorization ([`FacilitatorClient::verify`]) and later executes it on-chain
//! ([`FacilitatorClient::settle`]). Both calls share one shape:
//!
//! 1. Build `{x402Version, paymentPayload, paymentRequirements}`
//! 2. Resolve the per-call timeout and derive a deadline
//! 3. Ask the auth header provider (if any) for this phase's headers
//! 4. `POST {url}/verify` or `POST {url}/settle`, exactly once
//! 5. Decode the JSON answer into the typed response
//!
//! The client never retries. Retry, backoff and circuit breaking belong to the
//! caller, which can tell failures apart through [`X402Error`]:
//! [`X402Error::is_timeout`] for an elapsed deadline, `Transport` for connection
//! failures, `HttpStatus` for non-2xx answers and `Decode` for malformed bodies.
//!
//! # Examples
//!
//! ```no_run
//! use x402_payment_service::facilitator::FacilitatorClient;
//! use x402_payment_service::types::{FacilitatorConfig, PaymentPayload, PaymentRequirements};
//! use std::time::Duration;
//!
//! # async fn example() -> x402_payment_service::Result<()> {
//! let config = FacilitatorConfig::new("https://x402.org/facilitator")
//!     .with_timeout(Duration::from_secs(3));
//! let client = FacilitatorClient::new(config)?;
//!
//! # let payment_payload: PaymentPayload = todo!();
//! # let payment_requirements: PaymentRequirements = todo!();
//! let verify_response = client.verify(&payment_payload, &payment_requirements).await?;
//!
//! if verify_response.is_valid {
//!     let settle_response = client.settle(&payment_payload, &payment_requirements).await?;
//!     println!("Payment settled: {}", settle_response.transaction);
//! }
//! # Ok(())
//! # }
//! ```

use crate::application::PaymentFacilitator;
use crate::types::{
    FacilitatorConfig, PaymentPayload, PaymentRequirements, Phase, SettleResponse, VerifyResponse,
};
use crate::{Result, X402Error};
use async_trait::async_trait;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

pub mod cdp;


/// Body of both `/verify` and `/settle` requests
#[derive(Debug, Serialize)]
struct FacilitatorRequest<'a> {
    #[serde(rename = "x402Version")]
    x402_version: u32,
    #[serde(rename = "paymentPayload")]
    payment_payload: &'a PaymentPayload,
    #[serde(rename = "paymentRequirements")]
    payment_requirements: &'a PaymentRequirements,
}

/// Facilitator client for verifying and settling payments
///
/// Cheap to clone; clones share the connection pool and the auth header provider.
#[derive(Clone)]
pub struct FacilitatorClient {
    /// Base URL of the facilitator service, without trailing slash
    url: String,
    /// HTTP client
    client: Client,
    config: FacilitatorConfig,
}

impl std::fmt::Debug for FacilitatorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilitatorClient")
            .field("url", &self.url)
            .field("config", &self.config)
            .finish()
    }
}

impl FacilitatorClient {
    /// Create a new facilitator client
    pub fn new(config: FacilitatorConfig) -> Result<Self> {
        config.validate()?;

        // Timeouts are enforced per call, see `exchange`. A redirect would turn
        // the POST into a second, bodyless request, so 3xx is returned as is.
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| X402Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.trim_end_matches('/').to_string(),
            client,
            config,
        })
    }

    /// Get the base URL of this facilitator
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &FacilitatorConfig {
        &self.config
    }

    /// Verify a payment without executing the transaction
    pub async fn verify(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse> {
        self.exchange(Phase::Verify, payment_payload, payment_requirements, None)
            .await
    }

    /// Like [`Self::verify`], giving up at `deadline` if that comes before the configured timeout
    pub async fn verify_before(
        &self,
        deadline: Instant,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse> {
        self.exchange(
            Phase::Verify,
            payment_payload,
            payment_requirements,
            Some(deadline),
        )
        .await
    }

    /// Settle a verified payment by executing the transaction
    pub async fn settle(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        self.exchange(Phase::Settle, payment_payload, payment_requirements, None)
            .await
    }

    /// Like [`Self::settle`], giving up at `deadline` if that comes before the configured timeout
    pub async fn settle_before(
        &self,
        deadline: Instant,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        self.exchange(
            Phase::Settle,
            payment_payload,
            payment_requirements,
            Some(deadline),
        )
        .await
    }

    /// Headers the configured provider wants on this phase's request
    fn auth_headers_for(&self, phase: Phase) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let Some(provider) = &self.config.auth_headers else {
            return Ok(headers);
        };
        let Some(phase_headers) = provider.headers_for(phase)? else {
            return Ok(headers);
        };

        for (key, value) in phase_headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                X402Error::auth_headers(format!("Invalid {} header name '{}': {}", phase, key, e))
            })?;
            let value = HeaderValue::from_str(&value).map_err(|e| {
                X402Error::auth_headers(format!("Invalid {} header value for '{}': {}", phase, key, e))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    async fn exchange<R>(
        &self,
        phase: Phase,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
        caller_deadline: Option<Instant>,
    ) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let deadline = call_deadline(started, self.config.resolve_timeout(), caller_deadline);
        let budget = deadline.saturating_duration_since(started);

        let headers = self.auth_headers_for(phase)?;

        let request_body = FacilitatorRequest {
            x402_version: payment_payload.x402_version,
            payment_payload,
            payment_requirements,
        };
        let url = format!("{}/{}", self.url, phase);

        tracing::debug!(
            %phase,
            %url,
            scheme = %payment_payload.scheme,
            network = %payment_payload.network,
            timeout = ?budget,
            "Sending facilitator request"
        );

        let request = self.client.post(&url).headers(headers).json(&request_body);

        let send = async {
            let response = request
                .send()
                .await
                .map_err(|e| transport_error(phase, budget, e))?;
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| transport_error(phase, budget, e))?;

            if !status.is_success() {
                return Err(X402Error::HttpStatus {
                    phase,
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
            }

            serde_json::from_slice::<R>(&body).map_err(|source| X402Error::Decode {
                phase,
                body: String::from_utf8_lossy(&body).into_owned(),
                source,
            })
        };

        let result = match tokio::time::timeout_at(deadline, send).await {
            Ok(result) => result,
            Err(elapsed) => Err(X402Error::Timeout {
                phase,
                timeout: budget,
                source: Some(elapsed),
            }),
        };

        match &result {
            Ok(_) => tracing::debug!(
                %phase,
                elapsed = ?started.elapsed(),
                "Facilitator request completed"
            ),
            Err(error) => tracing::warn!(
                %phase,
                %url,
                elapsed = ?started.elapsed(),
                %error,
                "Facilitator request failed"
            ),
        }

        result
    }
}

/// Roughly 30 years, the horizon `tokio::time` uses for "never"
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// The earlier of `started + timeout` and the caller's deadline.
///
/// A timeout too large to represent (e.g. `Duration::MAX`) means no client
/// timeout; the caller's deadline, if any, still applies.
fn call_deadline(
    started: Instant,
    timeout: Duration,
    caller_deadline: Option<Instant>,
) -> Instant {
    let own = started
        .checked_add(timeout)
        .or_else(|| started.checked_add(FAR_FUTURE));
    match (own, caller_deadline) {
        (Some(own), Some(caller)) => own.min(caller),
        (Some(own), None) => own,
        (None, Some(caller)) => caller,
        (None, None) => started,
    }
}

fn transport_error(phase: Phase, timeout: Duration, source: reqwest::Error) -> X402Error {
    if source.is_timeout() {
        X402Error::Timeout {
            phase,
            timeout,
            source: None,
        }
    } else {
        X402Error::Transport { phase, source }
    }
}

#[async_trait]
impl PaymentFacilitator for FacilitatorClient {
    async fn verify(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse> {
        FacilitatorClient::verify(self, payment_payload, payment_requirements).await
    }

    async fn settle(
        &self,
        payment_payload: &PaymentPayload,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        FacilitatorClient::settle(self, payment_payload, payment_requirements).await
    }
}
