//! Google Cloud Text-to-Speech client.
//!
//! One blocking `text:synthesize` request per sentence. The response carries
//! the audio as base64 in `audioContent`.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use recital_core::config::{SynthesisConfig, VoiceConfig};
use recital_core::error::{RecitalError, Result, SynthesisError};
use recital_core::traits::SynthesisClient;
use recital_core::types::{AudioEncoding, Credentials};

const USER_PROJECT_HEADER: &str = "X-Goog-User-Project";

/// Longest slice of a non-JSON error body kept in a `Status` message.
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: AudioEncoding,
    speaking_rate: f64,
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    audio_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<ErrorFields>,
}

#[derive(Debug, Deserialize)]
struct ErrorFields {
    message: Option<String>,
}

#[derive(Debug)]
pub struct GoogleTtsClient {
    http: Client,
    endpoint: String,
    voice: VoiceConfig,
}

impl GoogleTtsClient {
    pub fn new(synthesis: &SynthesisConfig, voice: VoiceConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(synthesis.timeout_secs))
            .build()
            .map_err(|e| RecitalError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoint: synthesis.endpoint.clone(),
            voice,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn voice(&self) -> &VoiceConfig {
        &self.voice
    }

    pub fn build_request(&self, text: &str, credentials: &Credentials) -> RequestBuilder {
        let payload = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &self.voice.language_code,
                name: &self.voice.name,
            },
            audio_config: AudioConfig {
                audio_encoding: self.voice.audio_encoding,
                speaking_rate: self.voice.speaking_rate,
            },
        };
        self.http
            .post(&self.endpoint)
            .bearer_auth(&credentials.token)
            .header(USER_PROJECT_HEADER, &credentials.project_id)
            .json(&payload)
    }
}

impl SynthesisClient for GoogleTtsClient {
    fn synthesize(
        &self,
        text: &str,
        credentials: &Credentials,
    ) -> std::result::Result<Vec<u8>, SynthesisError> {
        debug!(chars = text.chars().count(), voice = %self.voice.name, "Sending synthesis request");
        let response = self
            .build_request(text, credentials)
            .send()
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport_error)?;

        let result = decode_response(status, &body);
        if let Err(e) = &result {
            warn!(status, error = %e, "Synthesis request failed");
        }
        result
    }
}

/// Turn a status code and response body into audio bytes or a typed failure.
pub fn decode_response(status: u16, body: &str) -> std::result::Result<Vec<u8>, SynthesisError> {
    match status {
        200..=299 => {}
        401 => return Err(SynthesisError::Unauthorized),
        403 => return Err(SynthesisError::PermissionDenied),
        _ => {
            return Err(SynthesisError::Status {
                status,
                message: error_message(body),
            })
        }
    }

    let response: SynthesizeResponse = serde_json::from_str(body)
        .map_err(|e| SynthesisError::MalformedResponse(e.to_string()))?;
    let encoded = response
        .audio_content
        .filter(|content| !content.is_empty())
        .ok_or(SynthesisError::MissingAudio)?;
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| SynthesisError::MalformedResponse(format!("audioContent: {}", e)))
}

fn error_message(body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = payload
            .error
            .and_then(|fields| fields.message)
            .filter(|m| !m.trim().is_empty())
        {
            return message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "request failed".to_string();
    }
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

fn transport_error(err: reqwest::Error) -> SynthesisError {
    if err.is_timeout() {
        SynthesisError::Timeout
    } else {
        SynthesisError::Transport(err.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
