//! JWT utilities for facilitator authentication

use crate::{Result, X402Error};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Lifetime of a minted token, in seconds
pub const TOKEN_TTL_SECS: u64 = 300;

/// JWT claims binding a token to one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub iat: u64,
    pub nbf: u64,
    pub exp: u64,
    /// `"{METHOD} {host}{path}"` of the request the token is valid for
    pub uri: String,
}

/// JWT options for authentication
#[derive(Debug, Clone)]
pub struct JwtOptions {
    pub key_id: String,
    pub key_secret: String,
    pub request_method: String,
    pub request_host: String,
    pub request_path: String,
}

impl JwtOptions {
    /// Create new JWT options
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        request_method: impl Into<String>,
        request_host: impl Into<String>,
        request_path: impl Into<String>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            request_method: request_method.into(),
            request_host: request_host.into(),
            request_path: request_path.into(),
        }
    }
}

/// Generate a short-lived JWT for one facilitator request
pub fn generate_jwt(options: JwtOptions) -> Result<String> {
    let request_host = options
        .request_host
        .trim_start_matches("https://")
        .trim_start_matches("http://");

    let now = chrono::Utc::now().timestamp().max(0) as u64;

    let claims = Claims {
        iss: options.key_id.clone(),
        sub: options.key_id,
        aud: request_host.to_string(),
        iat: now,
        nbf: now,
        exp: now + TOKEN_TTL_SECS,
        uri: format!(
            "{} {}{}",
            options.request_method.to_uppercase(),
            request_host,
            options.request_path
        ),
    };

    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(options.key_secret.as_bytes());
    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| X402Error::auth_headers(format!("JWT encoding failed: {}", e)))
}

/// Create a bearer `Authorization` value for a request
pub fn create_auth_header_with_method(
    api_key_id: &str,
    api_key_secret: &str,
    request_method: &str,
    request_host: &str,
    request_path: &str,
) -> Result<String> {
    let options = JwtOptions::new(
        api_key_id,
        api_key_secret,
        request_method,
        request_host,
        request_path,
    );

    let token = generate_jwt(options)?;
    Ok(format!("Bearer {}", token))
}
