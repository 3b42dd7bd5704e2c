//! HTTP client for a character-timestamp TTS vendor.

use super::{SynthesisClient, SynthesisOutput};
use crate::alignment::Alignment;
use crate::{LectorError, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for `HttpSynthesisClient` loaded from environment variables.
#[derive(Debug, Clone)]
pub struct HttpSynthesisConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
    pub request_timeout_ms: u64,
}

impl Default for HttpSynthesisConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("LECTOR_TTS_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://api.elevenlabs.io".to_string()),
            api_key: std::env::var("LECTOR_TTS_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            voice_id: std::env::var("LECTOR_TTS_VOICE")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "21m00Tcm4TlvDq8ikWAM".to_string()),
            model_id: std::env::var("LECTOR_TTS_MODEL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "eleven_multilingual_v2".to_string()),
            output_format: std::env::var("LECTOR_TTS_OUTPUT_FORMAT")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "mp3_44100_128".to_string()),
            request_timeout_ms: std::env::var("LECTOR_TTS_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60_000),
        }
    }
}

/// Shape of the vendor's with-timestamps response.
#[derive(Debug, Deserialize)]
struct TimestampResponse {
    audio_base64: String,
    alignment: VendorAlignment,
}

#[derive(Debug, Deserialize)]
struct VendorAlignment {
    characters: Vec<String>,
    character_start_times_seconds: Vec<f64>,
    character_end_times_seconds: Vec<f64>,
}

/// HTTP client posting one paragraph per request and decoding the
/// base64 audio + character alignment from the response.
#[derive(Clone)]
pub struct HttpSynthesisClient {
    http: Client,
    cfg: HttpSynthesisConfig,
}

impl HttpSynthesisClient {
    /// Fails with a configuration error when no API key is present;
    /// that is fatal and never retried.
    pub fn new(cfg: HttpSynthesisConfig) -> Result<Self> {
        if cfg.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(LectorError::Configuration(
                "synthesis API key missing; set LECTOR_TTS_API_KEY".into(),
            ));
        }
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| LectorError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(HttpSynthesisConfig::default())
    }
}

#[async_trait]
impl SynthesisClient for HttpSynthesisClient {
    async fn synthesize(&self, text: &str) -> Result<SynthesisOutput> {
        let url = format!(
            "{}/v1/text-to-speech/{}/with-timestamps?output_format={}",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.voice_id,
            self.cfg.output_format,
        );
        debug!(target: "synthesis", chars = text.chars().count(), "POST {}", url);

        let body = json!({
            "text": text,
            "model_id": self.cfg.model_id,
        });
        let resp = self
            .http
            .post(&url)
            .header("xi-api-key", self.cfg.api_key.as_deref().unwrap_or(""))
            .json(&body)
            .send()
            .await
            .map_err(|e| LectorError::Synthesis(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(target: "synthesis", %status, body = %body, "vendor returned non-success");
            return Err(LectorError::Synthesis(format!(
                "vendor error: status={status} body={body}"
            )));
        }

        let payload: TimestampResponse = resp
            .json()
            .await
            .map_err(|e| LectorError::Synthesis(format!("malformed vendor payload: {e}")))?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(&payload.audio_base64)
            .map_err(|e| LectorError::Synthesis(format!("malformed audio payload: {e}")))?;

        let chars = payload
            .alignment
            .characters
            .iter()
            .map(|s| {
                let mut it = s.chars();
                match (it.next(), it.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(LectorError::Synthesis(format!(
                        "alignment entry is not a single character: {s:?}"
                    ))),
                }
            })
            .collect::<Result<Vec<char>>>()?;

        let alignment = Alignment::new(
            chars,
            payload.alignment.character_start_times_seconds,
            payload.alignment.character_end_times_seconds,
        )
        .map_err(|e| LectorError::Synthesis(format!("vendor alignment invalid: {e}")))?;

        Ok(SynthesisOutput { audio, alignment })
    }
}
