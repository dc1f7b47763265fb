//! Synthesis provider boundary.
//!
//! The engine sees the provider as a single opaque operation: batched text in,
//! encoded audio out, or a failure. Provider failure handling is deliberately
//! coarse (any failure ends the session via the failure governor); the
//! `recoverable` flag is carried so a future retry policy has the signal,
//! but nothing acts on it today.

use crate::error::NarrationError;
use std::time::Duration;
use tracing::{debug, warn};

const API_BASE: &str = "https://api.elevenlabs.io/v1/text-to-speech";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Structured failure from the provider boundary.
#[derive(Debug, Clone)]
pub struct SynthesisFailure {
    pub recoverable: bool,
    pub message: String,
}

impl SynthesisFailure {
    fn fatal(message: impl Into<String>) -> Self {
        Self {
            recoverable: false,
            message: message.into(),
        }
    }
}

impl From<SynthesisFailure> for NarrationError {
    fn from(failure: SynthesisFailure) -> Self {
        NarrationError::Synthesis {
            recoverable: failure.recoverable,
            message: failure.message,
        }
    }
}

/// External collaborator converting batched text into playable audio bytes.
pub trait SynthesisGateway: Send + Sync {
    fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisFailure>;
}

/// ElevenLabs REST implementation.
pub struct ElevenLabsGateway {
    client: reqwest::blocking::Client,
    api_key: String,
    model_id: String,
}

impl ElevenLabsGateway {
    /// Fails with a configuration error before any request is attempted when
    /// the credential is missing.
    pub fn new(api_key: Option<String>, model_id: String) -> Result<Self, NarrationError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                NarrationError::Configuration(
                    "missing ElevenLabs API key (set ELEVENLABS_API_KEY or config api_key)".into(),
                )
            })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| NarrationError::Configuration(format!("building HTTP client: {err}")))?;

        Ok(Self {
            client,
            api_key,
            model_id,
        })
    }
}

impl SynthesisGateway for ElevenLabsGateway {
    fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SynthesisFailure> {
        debug!(voice, chars = text.chars().count(), "Requesting synthesis");

        let response = self
            .client
            .post(format!("{API_BASE}/{voice}"))
            .header("xi-api-key", &self.api_key)
            .json(&serde_json::json!({
                "text": text,
                "model_id": self.model_id,
                "output_format": "mp3_44100_128",
            }))
            .send()
            .map_err(|err| {
                warn!("Synthesis transport error: {err}");
                SynthesisFailure::fatal(format!("transport error: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(%status, "Synthesis provider returned non-success");
            return Err(SynthesisFailure::fatal(format!(
                "provider status {status}: {body}"
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|err| SynthesisFailure::fatal(format!("reading audio payload: {err}")))?;
        if bytes.is_empty() {
            return Err(SynthesisFailure::fatal("empty audio payload"));
        }

        debug!(bytes = bytes.len(), "Received synthesized audio");
        Ok(bytes.to_vec())
    }
}
