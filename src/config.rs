//! Configuration for the herald pipeline

use std::path::Path;

use crate::{Error, Result};

/// Default base URL for the generative-language services
/// (file upload, transcription, speech synthesis)
pub const DEFAULT_GENERATION_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default base URL for the chat-completion service
pub const DEFAULT_CHAT_BASE_URL: &str = "https://ollama.com";

/// Default transcription model
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "gemini-2.5-flash";

/// Default chat-completion model
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-flash-preview";

/// Default speech synthesis model
pub const DEFAULT_SYNTHESIS_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Default prebuilt synthesis voice
pub const DEFAULT_VOICE: &str = "Leda";

/// Guardrail policy text prepended as the system message of every chat
/// request. Loaded once at startup and treated as an opaque blob.
#[derive(Debug, Clone)]
pub struct GuardrailPolicy(String);

impl GuardrailPolicy {
    /// Wrap an already-loaded policy text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Load the policy from a file
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("guardrail policy file: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;
        Ok(Self(text))
    }

    /// The policy text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Herald pipeline configuration
///
/// Passed by value into the orchestrator; there is no process-wide state.
/// API keys may be empty here — each client validates its own key at
/// construction time.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the generation services (upload, transcription, synthesis)
    pub generation_api_key: String,

    /// API key for the chat-completion service
    pub chat_api_key: String,

    /// Guardrail policy applied to every chat request
    pub guardrail: GuardrailPolicy,

    /// Base URL of the generation services
    pub generation_base_url: String,

    /// Base URL of the chat-completion service
    pub chat_base_url: String,

    /// Transcription model identifier
    pub transcription_model: String,

    /// Chat-completion model identifier
    pub chat_model: String,

    /// Speech synthesis model identifier
    pub synthesis_model: String,

    /// Prebuilt voice for speech synthesis
    pub voice: String,

    /// Override path to the ffmpeg binary (resolved from `PATH` when unset)
    pub ffmpeg_path: Option<std::path::PathBuf>,
}

impl Config {
    /// Load configuration from the environment plus a guardrail policy file
    ///
    /// Reads `GEMINI_API_KEY` and `OLLAMA_API_KEY`; missing keys are left
    /// empty and rejected later by the client that needs them.
    ///
    /// # Errors
    ///
    /// Returns error if the guardrail policy file cannot be loaded
    pub fn load(guardrail_path: &Path) -> Result<Self> {
        let guardrail = GuardrailPolicy::load(guardrail_path)?;

        Ok(Self {
            generation_api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            chat_api_key: std::env::var("OLLAMA_API_KEY").unwrap_or_default(),
            guardrail,
            generation_base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            chat_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            synthesis_model: DEFAULT_SYNTHESIS_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            ffmpeg_path: None,
        })
    }
}
