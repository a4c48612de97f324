//! Resumable upload protocol for the generative-language file service
//!
//! Two phases: a start request that negotiates a session URL, then a single
//! transfer request that uploads and finalizes the full payload in one step.
//! No chunking or resume-on-failure — a failed transfer is terminal.

use serde::{Deserialize, Serialize};

use crate::{Error, MediaDescriptor, Result};

/// Display name attached to every uploaded file's metadata
const DISPLAY_NAME: &str = "AUDIO";

/// Reference to a file held by the remote service
#[derive(Debug, Clone)]
pub struct RemoteFileHandle {
    /// Service-side resource URI (e.g. `files/abc123`)
    pub uri: String,
}

/// Session negotiated by the start phase; consumed exactly once by the
/// transfer phase
#[derive(Debug)]
struct UploadSession {
    /// Session-specific upload URL from the `x-goog-upload-url` header
    upload_endpoint: String,
    /// Byte offset for the transfer request (always 0 — no chunking)
    bytes_sent: u64,
}

#[derive(Serialize)]
struct StartRequest<'a> {
    file: FileMetadata<'a>,
}

#[derive(Serialize)]
struct FileMetadata<'a> {
    display_name: &'a str,
}

#[derive(Deserialize)]
struct TransferResponse {
    #[serde(default)]
    file: Option<FileInfo>,
}

#[derive(Deserialize)]
struct FileInfo {
    #[serde(default)]
    uri: Option<String>,
}

/// Performs the two-phase resumable upload
#[derive(Debug)]
pub struct ResumableUploadClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ResumableUploadClient {
    /// Create a new upload client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, base_url: Option<&str>) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("generation API key required for upload".to_string()));
        }

        Ok(Self {
            client: crate::http_client()?,
            base_url: base_url
                .unwrap_or(crate::config::DEFAULT_GENERATION_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
        })
    }

    /// Upload a local file and return its remote handle
    ///
    /// Never leaves partial caller state behind: the session is an internal
    /// value consumed by the transfer phase and dropped on failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UploadInit`] or [`Error::UploadTransfer`] for
    /// protocol failures and [`Error::MalformedResponse`] if the file URI
    /// is absent from the transfer response.
    pub async fn upload(&self, media: &MediaDescriptor) -> Result<RemoteFileHandle> {
        let session = self.start(media).await?;
        self.transfer(session, media).await
    }

    /// Start phase: negotiate a session-specific upload URL
    async fn start(&self, media: &MediaDescriptor) -> Result<UploadSession> {
        tracing::debug!(
            path = %media.path.display(),
            bytes = media.byte_length,
            mime_type = %media.mime_type,
            "initiating resumable upload"
        );

        let response = self
            .client
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", media.byte_length.to_string())
            .header("X-Goog-Upload-Header-Content-Type", &media.mime_type)
            .json(&StartRequest {
                file: FileMetadata {
                    display_name: DISPLAY_NAME,
                },
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "upload start rejected");
            return Err(Error::UploadInit(format!(
                "upload start failed with {status}: {body}"
            )));
        }

        let upload_endpoint = response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
            .ok_or_else(|| {
                Error::UploadInit("x-goog-upload-url header absent from start response".to_string())
            })?;

        Ok(UploadSession {
            upload_endpoint,
            bytes_sent: 0,
        })
    }

    /// Transfer phase: upload and finalize the full payload in one request
    async fn transfer(
        &self,
        session: UploadSession,
        media: &MediaDescriptor,
    ) -> Result<RemoteFileHandle> {
        let bytes = tokio::fs::read(&media.path).await?;

        tracing::debug!(
            endpoint = %session.upload_endpoint,
            bytes = bytes.len(),
            "uploading file bytes"
        );

        let response = self
            .client
            .post(&session.upload_endpoint)
            .header("Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Offset", session.bytes_sent.to_string())
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "upload transfer rejected");
            return Err(Error::UploadTransfer(format!(
                "upload transfer failed with {status}: {body}"
            )));
        }

        let uri = parse_file_uri(&body)?;
        tracing::info!(uri = %uri, "upload complete");
        Ok(RemoteFileHandle { uri })
    }
}

/// Extract `file.uri` from the transfer response body
fn parse_file_uri(body: &str) -> Result<String> {
    let parsed: TransferResponse = serde_json::from_str(body).map_err(|_| {
        Error::MalformedResponse(format!("upload response is not valid JSON: {body}"))
    })?;

    parsed
        .file
        .and_then(|f| f.uri)
        .ok_or_else(|| Error::MalformedResponse(format!("file.uri absent from upload response: {body}")))
}
