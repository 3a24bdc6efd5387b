//! Facilitator configuration and response types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default facilitator URL
pub const DEFAULT_FACILITATOR_URL: &str = "https://x402.org/facilitator";

/// Timeout applied to a call when the configuration supplies none
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The two protocol phases of a facilitator exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Verify,
    Settle,
}

impl Phase {
    /// Name used both as the URL path segment and as the auth header key
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Verify => "verify",
            Phase::Settle => "settle",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header name to value mapping for one phase
pub type PhaseHeaders = HashMap<String, String>;

/// Produces the extra headers to attach to a facilitator request.
///
/// Invoked once per call and never cached, so implementations may mint
/// short-lived credentials. `Ok(None)` means no extra headers for that phase.
/// An error aborts the call before any network I/O and is returned unchanged.
pub trait AuthHeaderProvider: Send + Sync {
    fn headers_for(&self, phase: Phase) -> crate::Result<Option<PhaseHeaders>>;
}

impl<F> AuthHeaderProvider for F
where
    F: Fn(Phase) -> crate::Result<Option<PhaseHeaders>> + Send + Sync,
{
    fn headers_for(&self, phase: Phase) -> crate::Result<Option<PhaseHeaders>> {
        self(phase)
    }
}

/// Fixed per-phase headers, e.g. a long-lived API key
#[derive(Debug, Clone, Default)]
pub struct StaticAuthHeaders {
    headers: HashMap<Phase, PhaseHeaders>,
}

impl StaticAuthHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header sent on requests for `phase`
    pub fn with_header(
        mut self,
        phase: Phase,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.headers
            .entry(phase)
            .or_default()
            .insert(name.into(), value.into());
        self
    }
}

impl AuthHeaderProvider for StaticAuthHeaders {
    fn headers_for(&self, phase: Phase) -> crate::Result<Option<PhaseHeaders>> {
        Ok(self.headers.get(&phase).cloned())
    }
}

/// Per-call timeout policy
pub type TimeoutFn = dyn Fn() -> Duration + Send + Sync;

/// Facilitator configuration
#[derive(Clone)]
pub struct FacilitatorConfig {
    /// Base URL of the facilitator service
    pub url: String,
    /// Timeout policy, resolved on every call
    pub timeout: Option<Arc<TimeoutFn>>,
    /// Provider of per-phase authentication headers
    pub auth_headers: Option<Arc<dyn AuthHeaderProvider>>,
}

impl fmt::Debug for FacilitatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacilitatorConfig")
            .field("url", &self.url)
            .field("timeout", &self.resolve_timeout())
            .field(
                "auth_headers",
                &self.auth_headers.as_ref().map(|_| "<provider>"),
            )
            .finish()
    }
}

impl FacilitatorConfig {
    /// Create a new facilitator config
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
            auth_headers: None,
        }
    }

    /// Validate the facilitator configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.url.is_empty() {
            return Err(crate::X402Error::config("Facilitator URL cannot be empty"));
        }

        let url = Url::parse(&self.url).map_err(|e| {
            crate::X402Error::config(format!("Invalid facilitator URL '{}': {}", self.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(crate::X402Error::config(
                "Facilitator URL must start with http:// or https://",
            ));
        }

        Ok(())
    }

    /// Use a fixed request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(Arc::new(move || timeout));
        self
    }

    /// Use a timeout policy evaluated on every call
    pub fn with_timeout_fn<F>(mut self, timeout: F) -> Self
    where
        F: Fn() -> Duration + Send + Sync + 'static,
    {
        self.timeout = Some(Arc::new(timeout));
        self
    }

    /// Set the auth header provider
    pub fn with_auth_headers<P>(mut self, provider: P) -> Self
    where
        P: AuthHeaderProvider + 'static,
    {
        self.auth_headers = Some(Arc::new(provider));
        self
    }

    /// The timeout for the next call
    pub fn resolve_timeout(&self) -> Duration {
        self.timeout
            .as_ref()
            .map(|timeout| timeout())
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

impl Default for FacilitatorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FACILITATOR_URL)
    }
}

/// Payment verification response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Whether the payment is valid
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    /// Reason for invalidity (if applicable)
    #[serde(rename = "invalidReason", skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    /// Payer's address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

/// Payment settlement response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettleResponse {
    /// Whether the settlement was successful
    pub success: bool,
    /// Error reason if settlement failed
    #[serde(rename = "errorReason", skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    /// Transaction hash, empty when nothing was submitted
    #[serde(default)]
    pub transaction: String,
    /// Network where the transaction was executed
    #[serde(default)]
    pub network: String,
    /// Payer address if applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_default_timeout_applies_when_unset() {
        let config = FacilitatorConfig::new("https://example.com/facilitator");
        assert_eq!(config.resolve_timeout(), DEFAULT_TIMEOUT);

        let config = config.with_timeout(Duration::from_millis(250));
        assert_eq!(config.resolve_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_timeout_fn_is_evaluated_per_call() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let config = FacilitatorConfig::default().with_timeout_fn(move || {
            Duration::from_secs(counter.fetch_add(1, Ordering::SeqCst) + 1)
        });

        assert_eq!(config.resolve_timeout(), Duration::from_secs(1));
        assert_eq!(config.resolve_timeout(), Duration::from_secs(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        assert!(FacilitatorConfig::new("").validate().is_err());
        assert!(FacilitatorConfig::new("not a url").validate().is_err());
        assert!(FacilitatorConfig::new("ftp://example.com").validate().is_err());
        assert!(FacilitatorConfig::new("http://localhost:8080")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_static_auth_headers_by_phase() {
        let provider = StaticAuthHeaders::new().with_header(
            Phase::Verify,
            "Authorization",
            "Bearer verify-token",
        );

        let verify = provider.headers_for(Phase::Verify).unwrap().unwrap();
        assert_eq!(verify["Authorization"], "Bearer verify-token");
        assert!(provider.headers_for(Phase::Settle).unwrap().is_none());
    }

    #[test]
    fn test_settle_response_tolerates_missing_transaction() {
        let response: SettleResponse = serde_json::from_value(json!({
            "success": false,
            "errorReason": "insufficient_funds"
        }))
        .unwrap();

        assert!(!response.success);
        assert_eq!(response.transaction, "");
        assert_eq!(response.error_reason.as_deref(), Some("insufficient_funds"));
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::Verify.as_str(), "verify");
        assert_eq!(Phase::Settle.to_string(), "settle");
    }
}
