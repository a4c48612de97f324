//! Transcription via the content-generation endpoint
//!
//! Sends a fixed instruction plus a reference to the uploaded file and
//! extracts the transcript from the first candidate's first part.

use serde::{Deserialize, Serialize};

use crate::upload::RemoteFileHandle;
use crate::{Error, Result};

/// Instruction sent alongside the file reference
const TRANSCRIBE_INSTRUCTION: &str = "Transcribe the audio";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    FileData { file_data: FileData<'a> },
}

#[derive(Serialize)]
struct FileData<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
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
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Requests a transcript for an uploaded audio file
#[derive(Debug)]
pub struct TranscriptionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl TranscriptionClient {
    /// Create a new transcription client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String, base_url: Option<&str>) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "generation API key required for transcription".to_string(),
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
        })
    }

    /// Transcribe the uploaded file and return the transcript text
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyResponse`] when the expected field path is
    /// absent (safety filtering, empty candidates, error envelopes) — the
    /// failure is reported, never retried.
    pub async fn transcribe(&self, handle: &RemoteFileHandle, mime_type: &str) -> Result<String> {
        tracing::debug!(uri = %handle.uri, mime_type, "requesting transcription");

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: TRANSCRIBE_INSTRUCTION,
                    },
                    Part::FileData {
                        file_data: FileData {
                            mime_type,
                            file_uri: &handle.uri,
                        },
                    },
                ],
            }],
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

        let body = response.text().await?;
        let transcript = extract_candidate_text(&body)?;

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}

/// Extract `candidates[0].content.parts[0].text` from a generation response
fn extract_candidate_text(body: &str) -> Result<String> {
    let parsed: GenerateResponse = serde_json::from_str(body).map_err(|_| {
        Error::MalformedResponse(format!("generation response is not valid JSON: {body}"))
    })?;

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| Error::EmptyResponse(format!("no transcript in generation response: {body}")))
}
