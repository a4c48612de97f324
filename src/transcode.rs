//! Raw PCM to playable container conversion via ffmpeg
//!
//! The raw samples are staged in a uniquely named scratch file that is
//! removed on every exit path, success or failure, when it drops. Unique
//! names keep concurrent pipeline runs from colliding.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::speech::SynthesizedAudio;
use crate::{Error, Result};

/// Converts raw PCM samples into a playable file with an external ffmpeg
/// process
pub struct AudioTranscoder {
    ffmpeg: PathBuf,
}

impl AudioTranscoder {
    /// Create a transcoder, resolving `ffmpeg` from `PATH`
    ///
    /// # Errors
    ///
    /// Returns error if no ffmpeg binary can be found
    pub fn new() -> Result<Self> {
        let ffmpeg = which::which("ffmpeg")
            .map_err(|e| Error::Config(format!("ffmpeg not found on PATH: {e}")))?;
        Ok(Self { ffmpeg })
    }

    /// Create a transcoder with an explicit binary path
    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self { ffmpeg: path.into() }
    }

    /// Transcode raw PCM audio into the container implied by `output`'s
    /// extension
    ///
    /// The input format flags are taken from the [`SynthesizedAudio`]
    /// record so they always match what the synthesis service produced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transcode`] if ffmpeg exits non-zero; the scratch
    /// file is removed in every case.
    pub async fn transcode(&self, audio: &SynthesizedAudio, output: &Path) -> Result<()> {
        let mut scratch = tempfile::NamedTempFile::new()?;
        scratch.write_all(&audio.bytes)?;
        scratch.flush()?;

        tracing::debug!(
            scratch = %scratch.path().display(),
            output = %output.display(),
            bytes = audio.bytes.len(),
            sample_rate = audio.sample_rate,
            channels = audio.channels,
            "transcoding raw PCM"
        );

        // Scratch is dropped (and removed) whether ffmpeg succeeds or not.
        let result = tokio::process::Command::new(&self.ffmpeg)
            .arg("-y")
            .args(["-f", "s16le"])
            .args(["-ar", &audio.sample_rate.to_string()])
            .args(["-ac", &audio.channels.to_string()])
            .arg("-i")
            .arg(scratch.path())
            .arg(output)
            .output()
            .await;

        let process_output = result?;
        if !process_output.status.success() {
            let stderr = String::from_utf8_lossy(&process_output.stderr);
            tracing::error!(status = %process_output.status, stderr = %stderr, "ffmpeg failed");
            return Err(Error::Transcode(format!(
                "ffmpeg exited with {}: {stderr}",
                process_output.status
            )));
        }

        tracing::info!(output = %output.display(), "transcode complete");
        Ok(())
    }
}
