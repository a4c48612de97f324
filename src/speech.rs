//! Speech synthesis via the content-generation endpoint
//!
//! Requests audio output with a prebuilt voice and decodes the inline
//! base64 payload into raw PCM samples. The service documents its output
//! as 16-bit little-endian PCM at 24 kHz, mono; [`SynthesizedAudio`] is
//! labelled accordingly so the transcoder receives matching parameters.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Sample rate of the synthesis service's inline PCM output
pub const SYNTHESIS_SAMPLE_RATE: u32 = 24_000;

/// Channel count of the synthesis service's inline PCM output
pub const SYNTHESIS_CHANNELS: u16 = 1;

/// Raw decoded audio, 16-bit little-endian PCM
///
/// Held only between synthesis and transcoding; the transcoder consumes it
/// and the raw form is never persisted beyond its scratch file.
#[derive(Debug)]
pub struct SynthesizedAudio {
    /// Samples per second
    pub sample_rate: u32,
    /// Interleaved channel count
    pub channels: u16,
    /// PCM16LE sample bytes
    pub bytes: Vec<u8>,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'a str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Deserialize)]
struct SpeechResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    #[serde(default)]
    data: Option<String>,
}

/// Synthesizes speech for an answer
#[derive(Debug)]
pub struct SpeechSynthesisClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    voice: String,
}

impl SpeechSynthesisClient {
    /// Create a new synthesis client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(
        api_key: String,
        model: String,
        voice: String,
        base_url: Option<&str>,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "generation API key required for speech synthesis".to_string(),
            ));
        }

        Ok(Self {
            client: crate::http_client()?,
            base_url: base_url
                .unwrap_or(crate::config::DEFAULT_GENERATION_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            model,
            voice,
        })
    }

    /// Synthesize the given text, returning decoded PCM audio
    ///
    /// # Errors
    ///
    /// Fails fast with [`Error::Synthesis`] (status code and body) on a
    /// non-success HTTP status, and with [`Error::MalformedResponse`] if
    /// the inline audio payload is absent or not valid base64.
    pub async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio> {
        tracing::debug!(voice = %self.voice, chars = text.len(), "requesting speech synthesis");

        let request = SpeechRequest {
            contents: vec![Content {
                parts: vec![TextPart { text }],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: &self.voice,
                        },
                    },
                },
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent?key={}",
                self.base_url, self.model, self.api_key
            ))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "speech synthesis rejected");
            return Err(Error::Synthesis(format!(
                "speech synthesis failed with {status}: {body}"
            )));
        }

        let body = response.text().await?;
        let bytes = decode_inline_audio(&body)?;

        tracing::info!(bytes = bytes.len(), "speech synthesis complete");
        Ok(SynthesizedAudio {
            sample_rate: SYNTHESIS_SAMPLE_RATE,
            channels: SYNTHESIS_CHANNELS,
            bytes,
        })
    }
}

/// Extract and decode `candidates[0].content.parts[0].inlineData.data`
fn decode_inline_audio(body: &str) -> Result<Vec<u8>> {
    let parsed: SpeechResponse = serde_json::from_str(body).map_err(|_| {
        Error::MalformedResponse(format!("synthesis response is not valid JSON: {body}"))
    })?;

    let data = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.inline_data)
        .and_then(|d| d.data)
        .ok_or_else(|| {
            Error::MalformedResponse(format!("inline audio payload absent from response: {body}"))
        })?;

    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| Error::MalformedResponse(format!("inline audio payload is not valid base64: {e}")))
}
