//! Shared test utilities
//!
//! Runs the three remote services (resumable upload, content generation,
//! chat completion) as a single in-process axum router on an ephemeral
//! port, recording what each handler observed.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path as UrlPath, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine as _;

use herald::{Config, GuardrailPolicy, Result, TextRenderer};

/// Everything the mock services observed
#[derive(Debug, Default)]
pub struct Recorded {
    pub start_content_length: Option<String>,
    pub start_content_type: Option<String>,
    pub transfer_calls: u32,
    pub transfer_offset: Option<String>,
    pub transfer_command: Option<String>,
    pub generate_bodies: Vec<serde_json::Value>,
    pub chat_body: Option<serde_json::Value>,
    pub chat_authorization: Option<String>,
}

/// Canned service responses for one test scenario
#[derive(Clone)]
pub struct Scenario {
    pub transcription: serde_json::Value,
    pub chat: serde_json::Value,
    pub speech: serde_json::Value,
}

impl Scenario {
    /// All three services answer normally
    pub fn happy() -> Self {
        Self {
            transcription: candidate_text("hello world"),
            chat: chat_answer("Hi there!"),
            speech: inline_audio(&[0u8; 64]),
        }
    }

    pub fn with_chat(mut self, chat: serde_json::Value) -> Self {
        self.chat = chat;
        self
    }

    pub fn with_speech(mut self, speech: serde_json::Value) -> Self {
        self.speech = speech;
        self
    }
}

/// Generation response carrying a single text part
pub fn candidate_text(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }]
    })
}

/// Chat response carrying an assistant message
pub fn chat_answer(text: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "test",
        "message": {"role": "assistant", "content": text},
        "done": true
    })
}

/// Generation response carrying a base64 inline audio payload
pub fn inline_audio(pcm: &[u8]) -> serde_json::Value {
    let data = base64::engine::general_purpose::STANDARD.encode(pcm);
    serde_json::json!({
        "candidates": [{
            "content": {"parts": [{
                "inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": data}
            }]}
        }]
    })
}

#[derive(Clone)]
struct MockState {
    base_url: String,
    recorded: Arc<Mutex<Recorded>>,
    scenario: Arc<Scenario>,
}

async fn upload_start(State(state): State<MockState>, headers: HeaderMap) -> impl IntoResponse {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.start_content_length = header("X-Goog-Upload-Header-Content-Length");
        recorded.start_content_type = header("X-Goog-Upload-Header-Content-Type");
    }

    (
        [(
            "x-goog-upload-url",
            format!("{}/resumable/session-1", state.base_url),
        )],
        Json(serde_json::json!({})),
    )
}

async fn upload_transfer(State(state): State<MockState>, headers: HeaderMap) -> Json<serde_json::Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.transfer_calls += 1;
        recorded.transfer_offset = header("X-Goog-Upload-Offset");
        recorded.transfer_command = header("X-Goog-Upload-Command");
    }

    Json(serde_json::json!({"file": {"uri": "files/abc123", "state": "ACTIVE"}}))
}

async fn generate(
    State(state): State<MockState>,
    UrlPath(model): UrlPath<String>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.recorded.lock().unwrap().generate_bodies.push(body);

    if model.contains("tts") {
        Json(state.scenario.speech.clone())
    } else {
        Json(state.scenario.transcription.clone())
    }
}

async fn chat(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.chat_authorization = headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        recorded.chat_body = Some(body);
    }

    Json(state.scenario.chat.clone())
}

/// Spawn an arbitrary router on an ephemeral port, returning its base URL
pub async fn spawn_router(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock listener");
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server failed");
    });

    base_url
}

/// Spawn the combined mock services, returning their base URL and the
/// recording handle
pub async fn spawn_mock(scenario: Scenario) -> (String, Arc<Mutex<Recorded>>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock listener");
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let state = MockState {
        base_url: base_url.clone(),
        recorded: recorded.clone(),
        scenario: Arc::new(scenario),
    };

    let app = Router::new()
        .route("/upload/v1beta/files", post(upload_start))
        .route("/resumable/session-1", post(upload_transfer))
        .route("/v1beta/models/{model}", post(generate))
        .route("/api/chat", post(chat))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server failed");
    });

    (base_url, recorded)
}

/// Renderer that records every call
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    pub calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl TextRenderer for RecordingRenderer {
    async fn render(&self, text: &str) -> Result<()> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Pipeline configuration pointing every client at the mock services
pub fn test_config(base_url: &str) -> Config {
    Config {
        generation_api_key: "test-key".to_string(),
        chat_api_key: "test-key".to_string(),
        guardrail: GuardrailPolicy::new("answer briefly"),
        generation_base_url: base_url.to_string(),
        chat_base_url: base_url.to_string(),
        transcription_model: herald::config::DEFAULT_TRANSCRIPTION_MODEL.to_string(),
        chat_model: herald::config::DEFAULT_CHAT_MODEL.to_string(),
        synthesis_model: herald::config::DEFAULT_SYNTHESIS_MODEL.to_string(),
        voice: herald::config::DEFAULT_VOICE.to_string(),
        ffmpeg_path: None,
    }
}

/// Write a mono 16 kHz sine-wave WAV file of the given duration
pub fn write_test_wav(dir: &Path, duration_secs: u32) -> PathBuf {
    let path = dir.join("question.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..(16_000 * duration_secs) {
        let t = i as f32 / 16_000.0;
        let sample = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.4;
        writer.write_sample((sample * f32::from(i16::MAX)) as i16).unwrap();
    }
    writer.finalize().unwrap();

    path
}

/// Write a stand-in ffmpeg script that records its arguments and the
/// scratch file's size, creates the output file on success, and exits with
/// the given code
#[cfg(unix)]
pub fn write_stub_ffmpeg(dir: &Path, exit_code: i32) -> (PathBuf, PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let record = dir.join("ffmpeg-args.txt");
    let stub = dir.join("ffmpeg-stub");

    let touch_output = if exit_code == 0 { ": > \"$out\"\n" } else { "" };
    let script = format!(
        "#!/bin/sh\n\
         printf '%s\\n' \"$@\" > {record}\n\
         prev=\"\"\nscratch=\"\"\nout=\"\"\n\
         for a in \"$@\"; do\n\
         \x20 if [ \"$prev\" = \"-i\" ]; then scratch=\"$a\"; fi\n\
         \x20 prev=\"$a\"\n\
         \x20 out=\"$a\"\n\
         done\n\
         wc -c < \"$scratch\" >> {record}\n\
         {touch_output}\
         exit {exit_code}\n",
        record = record.display(),
    );

    std::fs::write(&stub, script).unwrap();
    let mut perms = std::fs::metadata(&stub).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&stub, perms).unwrap();

    (stub, record)
}
