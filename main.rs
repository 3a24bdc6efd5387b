//! x402 facilitator probe
//!
//! Sends one `verify` or `settle` call to the configured facilitator and prints
//! the JSON answer.
//!
//! ```text
//! x402-payment <verify|settle> <payment-payload.json> <payment-requirements.json>
//! ```
//!
//! The payload file holds either the payment payload JSON or its base64 form
//! (an `X-PAYMENT` header value). The facilitator is configured through
//! `FACILITATOR_URL`, `FACILITATOR_TIMEOUT_MS`, `CDP_API_KEY_ID` and
//! `CDP_API_KEY_SECRET`. Log verbosity follows `RUST_LOG`.

use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use x402_payment_service::{
    config::ServiceConfig,
    types::{PaymentPayload, PaymentRequirements, Phase},
    FacilitatorClient, Result, X402Error,
};

const USAGE: &str =
    "usage: x402-payment <verify|settle> <payment-payload.json> <payment-requirements.json>";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (phase, payload_path, requirements_path) = match args.as_slice() {
        [phase, payload, requirements] => match phase.as_str() {
            "verify" => (Phase::Verify, payload, requirements),
            "settle" => (Phase::Settle, payload, requirements),
            _ => {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            }
        },
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    match run(phase, Path::new(payload_path), Path::new(requirements_path)).await {
        Ok(output) => println!("{}", output),
        Err(error) => {
            tracing::error!(%phase, %error, "Facilitator call failed");
            std::process::exit(1);
        }
    }
}

async fn run(phase: Phase, payload_path: &Path, requirements_path: &Path) -> Result<String> {
    let config = ServiceConfig::from_env()?;
    tracing::info!(url = %config.facilitator_url, %phase, "Calling facilitator");

    let client = FacilitatorClient::new(config.facilitator_config()?)?;
    let payment_payload = read_payment_payload(payload_path)?;
    let payment_requirements: PaymentRequirements =
        serde_json::from_str(&read_file(requirements_path)?)?;

    let output = match phase {
        Phase::Verify => {
            let response = client.verify(&payment_payload, &payment_requirements).await?;
            serde_json::to_string_pretty(&response)?
        }
        Phase::Settle => {
            let response = client.settle(&payment_payload, &payment_requirements).await?;
            serde_json::to_string_pretty(&response)?
        }
    };
    Ok(output)
}

fn read_payment_payload(path: &Path) -> Result<PaymentPayload> {
    let contents = read_file(path)?;
    let trimmed = contents.trim();
    if trimmed.starts_with('{') {
        Ok(serde_json::from_str(trimmed)?)
    } else {
        PaymentPayload::from_base64(trimmed)
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| X402Error::config(format!("Failed to read {}: {}", path.display(), e)))
}
