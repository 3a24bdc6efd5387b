//! Service configuration from the environment

use crate::facilitator::cdp::CdpAuthHeaders;
use crate::types::{FacilitatorConfig, DEFAULT_FACILITATOR_URL};
use crate::{Result, X402Error};
use std::time::Duration;

pub const FACILITATOR_URL_VAR: &str = "FACILITATOR_URL";
pub const FACILITATOR_TIMEOUT_MS_VAR: &str = "FACILITATOR_TIMEOUT_MS";
pub const CDP_API_KEY_ID_VAR: &str = "CDP_API_KEY_ID";
pub const CDP_API_KEY_SECRET_VAR: &str = "CDP_API_KEY_SECRET";

/// Settings the payment service needs to reach its facilitator
#[derive(Clone, Default)]
pub struct ServiceConfig {
    pub facilitator_url: String,
    pub facilitator_timeout: Option<Duration>,
    pub cdp_api_key_id: Option<String>,
    pub cdp_api_key_secret: Option<String>,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("facilitator_url", &self.facilitator_url)
            .field("facilitator_timeout", &self.facilitator_timeout)
            .field("cdp_api_key_id", &self.cdp_api_key_id)
            .field(
                "cdp_api_key_secret",
                &self.cdp_api_key_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl ServiceConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let facilitator_url = non_empty(FACILITATOR_URL_VAR)
            .unwrap_or_else(|| DEFAULT_FACILITATOR_URL.to_string());

        let facilitator_timeout = match non_empty(FACILITATOR_TIMEOUT_MS_VAR) {
            Some(raw) => {
                let millis: u64 = raw.trim().parse().map_err(|e| {
                    X402Error::config(format!(
                        "{} must be a whole number of milliseconds, got '{}': {}",
                        FACILITATOR_TIMEOUT_MS_VAR, raw, e
                    ))
                })?;
                if millis == 0 {
                    return Err(X402Error::config(format!(
                        "{} must be greater than zero",
                        FACILITATOR_TIMEOUT_MS_VAR
                    )));
                }
                Some(Duration::from_millis(millis))
            }
            None => None,
        };

        Ok(Self {
            facilitator_url,
            facilitator_timeout,
            cdp_api_key_id: non_empty(CDP_API_KEY_ID_VAR),
            cdp_api_key_secret: non_empty(CDP_API_KEY_SECRET_VAR),
        })
    }

    /// Build and validate the facilitator client configuration
    pub fn facilitator_config(&self) -> Result<FacilitatorConfig> {
        let mut config = FacilitatorConfig::new(self.facilitator_url.clone());

        if let Some(timeout) = self.facilitator_timeout {
            config = config.with_timeout(timeout);
        }

        match (&self.cdp_api_key_id, &self.cdp_api_key_secret) {
            (Some(id), Some(secret)) => {
                config = config.with_auth_headers(CdpAuthHeaders::new(id.clone(), secret.clone()));
            }
            (None, None) => {}
            _ => {
                return Err(X402Error::config(format!(
                    "{} and {} must be set together",
                    CDP_API_KEY_ID_VAR, CDP_API_KEY_SECRET_VAR
                )))
            }
        }

        config.validate()?;
        Ok(config)
    }
}
