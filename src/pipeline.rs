//! End-to-end pipeline orchestration
//!
//! Sequences media inspection, resumable upload, transcription, and chat
//! completion, then optionally the speech synthesis path. Every component
//! failure is logged with context and halts the remaining stages; the
//! renderer only ever sees a fully produced answer.

use std::path::Path;

use async_trait::async_trait;

use crate::chat::ChatClient;
use crate::config::Config;
use crate::media::MediaDescriptor;
use crate::speech::SpeechSynthesisClient;
use crate::transcode::AudioTranscoder;
use crate::transcribe::TranscriptionClient;
use crate::upload::ResumableUploadClient;
use crate::Result;

/// Sink for the final answer text
///
/// The production implementation writes to stdout; the physical display
/// driver is an external collaborator behind this seam.
#[async_trait]
pub trait TextRenderer: Send + Sync {
    /// Present the final answer to the user
    ///
    /// # Errors
    ///
    /// Returns error if presentation fails
    async fn render(&self, text: &str) -> Result<()>;
}

/// Renderer that prints the answer to stdout
pub struct StdoutRenderer;

#[async_trait]
impl TextRenderer for StdoutRenderer {
    async fn render(&self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }
}

/// Sequences the pipeline components end to end
pub struct Pipeline {
    config: Config,
    uploader: ResumableUploadClient,
    transcriber: TranscriptionClient,
    chat: ChatClient,
    renderer: Box<dyn TextRenderer>,
}

impl Pipeline {
    /// Create a pipeline from configuration and a renderer
    ///
    /// Both are injected explicitly; the pipeline holds no global state.
    ///
    /// # Errors
    ///
    /// Returns error if a required API key is missing
    pub fn new(config: Config, renderer: Box<dyn TextRenderer>) -> Result<Self> {
        let uploader = ResumableUploadClient::new(
            config.generation_api_key.clone(),
            Some(&config.generation_base_url),
        )?;
        let transcriber = TranscriptionClient::new(
            config.generation_api_key.clone(),
            config.transcription_model.clone(),
            Some(&config.generation_base_url),
        )?;
        let chat = ChatClient::new(
            config.chat_api_key.clone(),
            config.chat_model.clone(),
            Some(&config.chat_base_url),
        )?;

        Ok(Self {
            config,
            uploader,
            transcriber,
            chat,
            renderer,
        })
    }

    /// Run the pipeline on a local audio file
    ///
    /// Returns the answer text on full success of the text path, `None`
    /// when a component failure halted the pipeline (the failure has been
    /// logged). When `speech_output` is set, the answer is additionally
    /// synthesized and transcoded to that path; a failure there is logged
    /// but does not retract the already-rendered answer.
    ///
    /// # Errors
    ///
    /// Returns error only if the renderer itself fails
    pub async fn run(
        &self,
        audio_path: &Path,
        speech_output: Option<&Path>,
    ) -> Result<Option<String>> {
        let answer = match self.answer(audio_path).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(error = %e, "pipeline halted before an answer was produced");
                return Ok(None);
            }
        };

        self.renderer.render(&answer).await?;

        if let Some(output) = speech_output {
            if let Err(e) = self.speak(&answer, output).await {
                tracing::error!(error = %e, "speech output path failed");
            }
        }

        Ok(Some(answer))
    }

    /// Text path: media → upload → transcription → chat
    async fn answer(&self, audio_path: &Path) -> Result<String> {
        let media = MediaDescriptor::from_path(audio_path)?;
        tracing::info!(
            path = %media.path.display(),
            mime_type = %media.mime_type,
            bytes = media.byte_length,
            "starting pipeline"
        );

        let handle = self.uploader.upload(&media).await?;
        let transcript = self.transcriber.transcribe(&handle, &media.mime_type).await?;
        self.chat
            .complete(self.config.guardrail.as_str(), &transcript)
            .await
    }

    /// Speech path: synthesis → transcode
    async fn speak(&self, answer: &str, output: &Path) -> Result<()> {
        let synthesizer = SpeechSynthesisClient::new(
            self.config.generation_api_key.clone(),
            self.config.synthesis_model.clone(),
            self.config.voice.clone(),
            Some(&self.config.generation_base_url),
        )?;
        let transcoder = match &self.config.ffmpeg_path {
            Some(path) => AudioTranscoder::with_binary(path),
            None => AudioTranscoder::new()?,
        };

        let audio = synthesizer.synthesize(answer).await?;
        transcoder.transcode(&audio, output).await
    }
}
