//! Herald - Voice assistant request pipeline
//!
//! This library sequences a locally recorded audio file through three remote
//! services and back out as text (and optionally speech):
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌───────────────┐
//! │  Audio file  │──▶│ Resumable upload │──▶│ Transcription │
//! └──────────────┘   └──────────────────┘   └───────┬───────┘
//!                                                   │
//!                    ┌──────────────────┐   ┌───────▼───────┐
//!                    │   TextRenderer   │◀──│  Guardrailed  │
//!                    └──────────────────┘   │     chat      │
//!                    ┌──────────────────┐   └───────┬───────┘
//!                    │ ffmpeg transcode │◀──────────┘ (optional)
//!                    └──────────────────┘
//! ```
//!
//! Execution is strictly sequential; every component failure is caught at
//! the component boundary, logged with diagnostic context, and converted
//! into a graceful halt of the pipeline.

pub mod chat;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod speech;
pub mod transcode;
pub mod transcribe;
pub mod upload;

use std::time::Duration;

pub use chat::ChatClient;
pub use config::{Config, GuardrailPolicy};
pub use error::{Error, Result};
pub use media::MediaDescriptor;
pub use pipeline::{Pipeline, StdoutRenderer, TextRenderer};
pub use speech::{SpeechSynthesisClient, SynthesizedAudio};
pub use transcode::AudioTranscoder;
pub use transcribe::TranscriptionClient;
pub use upload::{RemoteFileHandle, ResumableUploadClient};

/// Bounded timeout applied to every remote request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the HTTP client shared by all service clients
pub(crate) fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}
