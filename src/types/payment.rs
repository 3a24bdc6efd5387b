//! Payment-related types

use super::constants::{networks, schemes};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// x402 protocol version
pub const X402_VERSION: u32 = 1;

/// Payment requirements a settlement must satisfy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequirements {
    /// Payment scheme identifier (e.g., "exact")
    pub scheme: String,
    /// Blockchain network identifier (e.g., "base-sepolia")
    pub network: String,
    /// Required payment amount in atomic token units
    #[serde(rename = "maxAmountRequired")]
    pub max_amount_required: String,
    /// URL of the protected resource
    pub resource: String,
    /// Human-readable description of the resource
    #[serde(default)]
    pub description: String,
    /// MIME type of the expected response
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    /// Recipient wallet address for the payment
    #[serde(rename = "payTo")]
    pub pay_to: String,
    /// Maximum time allowed for payment completion in seconds
    #[serde(rename = "maxTimeoutSeconds")]
    pub max_timeout_seconds: u32,
    /// Token contract address
    pub asset: String,
    /// JSON schema describing the response format
    #[serde(rename = "outputSchema", skip_serializing_if = "Option::is_none", default)]
    pub output_schema: Option<Value>,
    /// Scheme-specific additional information
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extra: Option<Value>,
}

impl PaymentRequirements {
    /// Create a new payment requirements instance
    pub fn new(
        scheme: impl Into<String>,
        network: impl Into<String>,
        max_amount_required: impl Into<String>,
        asset: impl Into<String>,
        pay_to: impl Into<String>,
        resource: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            network: network.into(),
            max_amount_required: max_amount_required.into(),
            resource: resource.into(),
            description: description.into(),
            mime_type: String::new(),
            pay_to: pay_to.into(),
            max_timeout_seconds: 60,
            asset: asset.into(),
            output_schema: None,
            extra: None,
        }
    }

    /// Set the MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Set the maximum timeout
    pub fn with_max_timeout_seconds(mut self, max_timeout_seconds: u32) -> Self {
        self.max_timeout_seconds = max_timeout_seconds;
        self
    }
}

/// Signed payment authorization, as sent by the payer
///
/// `scheme` and `network` select the concrete shape of `payload`. A pair this
/// crate does not know is kept verbatim in [`SchemePayload::Unrecognized`];
/// rejecting it is up to the facilitator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPaymentPayload")]
pub struct PaymentPayload {
    /// Protocol version identifier
    #[serde(rename = "x402Version")]
    pub x402_version: u32,
    /// Payment scheme identifier
    pub scheme: String,
    /// Blockchain network identifier
    pub network: String,
    /// Scheme-specific payment data
    pub payload: SchemePayload,
}

impl PaymentPayload {
    /// Create a new payment payload for the current protocol version.
    ///
    /// The payload shape must be the one `(scheme, network)` selects: an
    /// [`SchemePayload::ExactEvm`] is rejected for any other pair, and an
    /// [`SchemePayload::Unrecognized`] value is decoded when the pair is known.
    pub fn new(
        scheme: impl Into<String>,
        network: impl Into<String>,
        payload: SchemePayload,
    ) -> crate::Result<Self> {
        let scheme = scheme.into();
        let network = network.into();

        let payload = match payload {
            SchemePayload::ExactEvm(_) if !is_exact_evm(&scheme, &network) => {
                return Err(crate::X402Error::invalid_payment_payload(format!(
                    "exact EVM payload does not match scheme '{}' on network '{}'",
                    scheme, network
                )));
            }
            SchemePayload::ExactEvm(payload) => SchemePayload::ExactEvm(payload),
            SchemePayload::Unrecognized(value) => {
                SchemePayload::from_value(&scheme, &network, value).map_err(|e| {
                    crate::X402Error::invalid_payment_payload(format!(
                        "payload does not match scheme '{}' on network '{}': {}",
                        scheme, network, e
                    ))
                })?
            }
        };

        Ok(Self {
            x402_version: X402_VERSION,
            scheme,
            network,
            payload,
        })
    }

    /// Create an exact-scheme payload; `network` must be a known EVM network
    pub fn exact_evm(
        network: impl Into<String>,
        payload: ExactEvmPayload,
    ) -> crate::Result<Self> {
        Self::new(schemes::EXACT, network, SchemePayload::ExactEvm(payload))
    }

    /// The exact EVM payload, if that is the shape this payment carries
    pub fn as_exact_evm(&self) -> Option<&ExactEvmPayload> {
        match &self.payload {
            SchemePayload::ExactEvm(payload) => Some(payload),
            SchemePayload::Unrecognized(_) => None,
        }
    }

    /// Decode a base64-encoded payment payload (the `X-PAYMENT` header value)
    pub fn from_base64(encoded: &str) -> crate::Result<Self> {
        use base64::{engine::general_purpose, Engine as _};
        let decoded = general_purpose::STANDARD.decode(encoded.trim())?;
        let payload: PaymentPayload = serde_json::from_slice(&decoded)?;
        Ok(payload)
    }

    /// Encode the payment payload to base64
    pub fn to_base64(&self) -> crate::Result<String> {
        use base64::{engine::general_purpose, Engine as _};
        let json = serde_json::to_string(self)?;
        Ok(general_purpose::STANDARD.encode(json))
    }
}

/// Scheme-specific payload, keyed by `(scheme, network)`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SchemePayload {
    /// `exact` scheme on an EVM network (EIP-3009 transfer with authorization)
    ExactEvm(ExactEvmPayload),
    /// Any other scheme/network pair, passed through untouched
    Unrecognized(Value),
}

impl SchemePayload {
    /// Select the payload shape for a scheme/network pair.
    ///
    /// Known pairs must match their shape exactly; unknown pairs always succeed.
    pub fn from_value(scheme: &str, network: &str, value: Value) -> serde_json::Result<Self> {
        if is_exact_evm(scheme, network) {
            Ok(Self::ExactEvm(serde_json::from_value(value)?))
        } else {
            Ok(Self::Unrecognized(value))
        }
    }
}

fn is_exact_evm(scheme: &str, network: &str) -> bool {
    scheme == schemes::EXACT && networks::is_evm(network)
}

#[derive(Deserialize)]
struct RawPaymentPayload {
    #[serde(rename = "x402Version")]
    x402_version: u32,
    scheme: String,
    network: String,
    payload: Value,
}

impl TryFrom<RawPaymentPayload> for PaymentPayload {
    type Error = serde_json::Error;

    fn try_from(raw: RawPaymentPayload) -> Result<Self, Self::Error> {
        let payload = SchemePayload::from_value(&raw.scheme, &raw.network, raw.payload)?;
        Ok(Self {
            x402_version: raw.x402_version,
            scheme: raw.scheme,
            network: raw.network,
            payload,
        })
    }
}

/// Exact EVM payment payload (EIP-3009)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactEvmPayload {
    /// EIP-712 signature for authorization
    pub signature: String,
    /// EIP-3009 authorization parameters
    pub authorization: ExactEvmAuthorization,
}

/// EIP-3009 authorization parameters
///
/// Every field travels as a string and is forwarded byte-for-byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactEvmAuthorization {
    /// Payer's wallet address
    pub from: String,
    /// Recipient's wallet address
    pub to: String,
    /// Payment amount in atomic units
    pub value: String,
    /// Unix timestamp when authorization becomes valid
    #[serde(rename = "validAfter")]
    pub valid_after: String,
    /// Unix timestamp when authorization expires
    #[serde(rename = "validBefore")]
    pub valid_before: String,
    /// 32-byte random nonce to prevent replay attacks
    pub nonce: String,
}

impl ExactEvmAuthorization {
    /// Create a new authorization
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        value: impl Into<String>,
        valid_after: impl Into<String>,
        valid_before: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            value: value.into(),
            valid_after: valid_after.into(),
            valid_before: valid_before.into(),
            nonce: nonce.into(),
        }
    }

    /// Parse the `[validAfter, validBefore)` window as unix seconds
    pub fn validity_window(&self) -> crate::Result<(i64, i64)> {
        let valid_after: i64 = self.valid_after.parse().map_err(|_| {
            crate::X402Error::invalid_payment_payload("Invalid validAfter timestamp")
        })?;
        let valid_before: i64 = self.valid_before.parse().map_err(|_| {
            crate::X402Error::invalid_payment_payload("Invalid validBefore timestamp")
        })?;
        Ok((valid_after, valid_before))
    }

    /// Whether `now` (unix seconds) lies inside the authorization window
    pub fn is_active_at(&self, now: i64) -> crate::Result<bool> {
        let (valid_after, valid_before) = self.validity_window()?;
        Ok(valid_after <= now && now < valid_before)
    }
}
