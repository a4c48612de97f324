use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use herald::{
    AudioTranscoder, Config, MediaDescriptor, Pipeline, ResumableUploadClient,
    SpeechSynthesisClient, StdoutRenderer, TranscriptionClient,
};

/// Herald - voice assistant request pipeline
#[derive(Parser)]
#[command(name = "herald", version, about)]
struct Cli {
    /// Path to the recorded audio file
    #[arg(short, long, env = "HERALD_AUDIO_FILE")]
    file: Option<PathBuf>,

    /// Path to the guardrail policy file
    #[arg(long, env = "HERALD_GUARDRAIL", default_value = "data/guardrail.yaml")]
    guardrail: PathBuf,

    /// Synthesize the answer to an audio file as well
    #[arg(long)]
    speak: bool,

    /// Output path for synthesized speech
    #[arg(long, default_value = "data/answer.wav")]
    output: PathBuf,

    /// Prebuilt voice for speech synthesis
    #[arg(long, default_value = herald::config::DEFAULT_VOICE)]
    voice: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Upload and transcribe an audio file, printing the transcript
    Transcribe {
        /// Path to the audio file
        file: PathBuf,
    },
    /// Synthesize text to an audio file
    Say {
        /// Text to speak
        text: String,
        /// Output path
        #[arg(long, default_value = "data/answer.wav")]
        output: PathBuf,
        /// Prebuilt voice
        #[arg(long, default_value = herald::config::DEFAULT_VOICE)]
        voice: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,herald=info",
        1 => "info,herald=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Transcribe { file } => transcribe_only(&file).await,
            Command::Say {
                text,
                output,
                voice,
            } => say_only(&text, &output, voice).await,
        };
    }

    let file = cli
        .file
        .ok_or_else(|| anyhow::anyhow!("no audio file given; pass --file or HERALD_AUDIO_FILE"))?;

    let mut config = Config::load(&cli.guardrail)?;
    config.voice = cli.voice;

    let pipeline = Pipeline::new(config, Box::new(StdoutRenderer))?;
    let speech_output = cli.speak.then_some(cli.output.as_path());

    match pipeline.run(&file, speech_output).await? {
        Some(_) => Ok(()),
        None => anyhow::bail!("pipeline halted without an answer (see log for diagnostics)"),
    }
}

/// Run only the upload and transcription stages
async fn transcribe_only(file: &PathBuf) -> anyhow::Result<()> {
    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    let media = MediaDescriptor::from_path(file)?;

    let uploader = ResumableUploadClient::new(api_key.clone(), None)?;
    let handle = uploader.upload(&media).await?;

    let transcriber = TranscriptionClient::new(
        api_key,
        herald::config::DEFAULT_TRANSCRIPTION_MODEL.to_string(),
        None,
    )?;
    let transcript = transcriber.transcribe(&handle, &media.mime_type).await?;

    println!("{transcript}");
    Ok(())
}

/// Run only the synthesis and transcode stages
async fn say_only(text: &str, output: &PathBuf, voice: String) -> anyhow::Result<()> {
    let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();

    let synthesizer = SpeechSynthesisClient::new(
        api_key,
        herald::config::DEFAULT_SYNTHESIS_MODEL.to_string(),
        voice,
        None,
    )?;
    let transcoder = AudioTranscoder::new()?;

    let audio = synthesizer.synthesize(text).await?;
    transcoder.transcode(&audio, output).await?;

    println!("saved to {}", output.display());
    Ok(())
}
