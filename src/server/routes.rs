//! Endpoint handlers.
//!
//! Every handler validates before touching a model, runs model work on a
//! blocking worker so health checks stay responsive, and maps failures
//! through the error taxonomy to a status code.

use crate::defaults;
use crate::engine::{RecognitionOptions, SynthesisOptions};
use crate::error::{Result, VoxError};
use crate::server::fetch;
use crate::server::multipart::MultipartForm;
use crate::server::ServerState;
use crate::synth::synthesize_text;
use crate::transcribe::{transcribe_file, Transcript};
use crate::{models::LoadState, sys};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

fn default_exaggeration() -> f32 {
    defaults::DEFAULT_EXAGGERATION
}
fn default_cfg_weight() -> f32 {
    defaults::DEFAULT_CFG_WEIGHT
}
fn default_tts_language() -> String {
    defaults::DEFAULT_TTS_LANGUAGE.to_string()
}
fn default_output_format() -> String {
    "wav".to_string()
}
fn default_true() -> bool {
    true
}
fn default_beam_size() -> usize {
    defaults::DEFAULT_BEAM_SIZE
}

/// `POST /tts` request body.
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    pub audio_prompt_url: Option<String>,
    #[serde(default = "default_exaggeration")]
    pub exaggeration: f32,
    #[serde(default = "default_cfg_weight")]
    pub cfg_weight: f32,
    #[serde(default = "default_tts_language")]
    pub language: String,
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

/// `POST /transcribe-url` request body.
#[derive(Debug, Deserialize)]
pub struct TranscribeUrlRequest {
    pub audio_url: String,
    pub language: Option<String>,
    #[serde(default = "default_true")]
    pub word_timestamps: bool,
    #[serde(default = "default_true")]
    pub vad_filter: bool,
    #[serde(default = "default_beam_size")]
    pub beam_size: usize,
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| VoxError::invalid_input(format!("malformed JSON body: {}", e)))
}

fn validate_tts_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(VoxError::invalid_input("text must not be empty"));
    }
    if text.chars().count() > defaults::MAX_TEXT_CHARS {
        return Err(VoxError::invalid_input(format!(
            "text exceeds {} characters",
            defaults::MAX_TEXT_CHARS
        )));
    }
    Ok(())
}

fn validate_unit_range(name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(VoxError::invalid_input(format!(
            "{} must be between 0.0 and 1.0, got {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_beam_size(beam_size: usize) -> Result<()> {
    if !(1..=defaults::MAX_BEAM_SIZE).contains(&beam_size) {
        return Err(VoxError::invalid_input(format!(
            "beam_size must be between 1 and {}, got {}",
            defaults::MAX_BEAM_SIZE,
            beam_size
        )));
    }
    Ok(())
}

/// Run synthesis on a blocking worker and package the audio response.
///
/// `voice_reference` may point into a temp file owned by the caller; the
/// caller keeps it alive across this await.
async fn run_synthesis(
    state: &Arc<ServerState>,
    text: String,
    voice_reference: Option<PathBuf>,
    exaggeration: f32,
    cfg_weight: f32,
) -> Result<Response<Full<Bytes>>> {
    let started = Instant::now();
    let lifecycle = Arc::clone(&state.lifecycle);
    let max_speech_tokens = state.config.max_speech_tokens;

    let options = SynthesisOptions {
        voice_reference,
        exaggeration,
        cfg_weight,
        temperature: defaults::DEFAULT_TEMPERATURE,
    };

    let audio = tokio::task::spawn_blocking(move || {
        let engine = lifecycle.acquire_synthesizer()?;
        synthesize_text(engine.as_ref(), &text, &options, max_speech_tokens)
    })
    .await
    .map_err(|e| VoxError::generation("synthesis", format!("worker failed: {}", e)))??;

    let duration = audio.duration_seconds();
    let sample_rate = audio.sample_rate;
    let bytes = crate::audio::wav::encode_wav_bytes(&audio)?;
    let elapsed_ms = started.elapsed().as_millis();

    log::info!(
        "synthesized {:.2}s of audio in {}ms",
        duration,
        elapsed_ms
    );

    Response::builder()
        .status(200)
        .header("Content-Type", "audio/wav")
        .header("X-Duration-Seconds", format!("{:.2}", duration))
        .header("X-Sample-Rate", sample_rate.to_string())
        .header("X-Generation-Time-Ms", elapsed_ms.to_string())
        .body(Full::new(Bytes::from(bytes)))
        .map_err(|e| VoxError::generation("synthesis", e.to_string()))
}

/// Run transcription on a blocking worker and package the JSON response.
async fn run_transcription(
    state: &Arc<ServerState>,
    audio_path: PathBuf,
    options: RecognitionOptions,
) -> Result<Response<Full<Bytes>>> {
    let started = Instant::now();
    let lifecycle = Arc::clone(&state.lifecycle);

    let transcript: Transcript = tokio::task::spawn_blocking(move || {
        let engine = lifecycle.acquire_recognizer()?;
        transcribe_file(engine.as_ref(), &audio_path, &options)
    })
    .await
    .map_err(|e| VoxError::generation("transcription", format!("worker failed: {}", e)))??;

    let elapsed_ms = started.elapsed().as_millis();
    log::info!(
        "transcribed {:.2}s of audio ({} segments) in {}ms",
        transcript.duration_seconds,
        transcript.segments.len(),
        elapsed_ms
    );

    let mut body = serde_json::to_value(&transcript)
        .map_err(|e| VoxError::generation("transcription", e.to_string()))?;
    body["success"] = json!(true);
    body["generation_time_ms"] = json!(elapsed_ms as u64);

    Ok(json_response(200, body))
}

/// `POST /tts`: synthesize from a JSON body, optionally cloning a voice
/// from a reference URL.
pub async fn handle_tts(
    state: &Arc<ServerState>,
    body: &[u8],
) -> Result<Response<Full<Bytes>>> {
    let request: TtsRequest = parse_json(body)?;
    validate_tts_text(&request.text)?;
    validate_unit_range("exaggeration", request.exaggeration)?;
    validate_unit_range("cfg_weight", request.cfg_weight)?;
    if request.output_format != "wav" {
        return Err(VoxError::invalid_input(format!(
            "unsupported output_format '{}', only 'wav' is available",
            request.output_format
        )));
    }
    if request.language != defaults::DEFAULT_TTS_LANGUAGE {
        log::warn!(
            "synthesis language '{}' requested; engine is English-trained",
            request.language
        );
    }

    // Keep the fetched reference alive until synthesis finishes.
    let reference = match &request.audio_prompt_url {
        Some(url) => Some(fetch::fetch_to_temp(&state.http, url).await?),
        None => None,
    };
    let reference_path = reference.as_ref().map(|f| f.path().to_path_buf());

    run_synthesis(
        state,
        request.text,
        reference_path,
        request.exaggeration,
        request.cfg_weight,
    )
    .await
}

/// `POST /tts-with-ref`: synthesize with an uploaded voice reference.
pub async fn handle_tts_with_ref(
    state: &Arc<ServerState>,
    body: &[u8],
    content_type: &str,
) -> Result<Response<Full<Bytes>>> {
    let form = MultipartForm::parse(body, content_type)?;
    let text = form
        .text_field("text")
        .ok_or_else(|| VoxError::invalid_input("missing form field 'text'"))?;
    validate_tts_text(&text)?;

    let exaggeration = parse_f32_field(&form, "exaggeration", defaults::DEFAULT_EXAGGERATION)?;
    let cfg_weight = parse_f32_field(&form, "cfg_weight", defaults::DEFAULT_CFG_WEIGHT)?;
    validate_unit_range("exaggeration", exaggeration)?;
    validate_unit_range("cfg_weight", cfg_weight)?;

    let audio = form.require("audio_prompt")?;
    let reference = fetch::spill_to_temp(&audio.data)?;
    let reference_path = reference.path().to_path_buf();

    run_synthesis(state, text, Some(reference_path), exaggeration, cfg_weight).await
}

/// `POST /transcribe`: transcribe an uploaded audio file.
pub async fn handle_transcribe(
    state: &Arc<ServerState>,
    body: &[u8],
    content_type: &str,
) -> Result<Response<Full<Bytes>>> {
    let form = MultipartForm::parse(body, content_type)?;
    let audio = form.require("audio")?;
    if audio.data.is_empty() {
        return Err(VoxError::invalid_input("uploaded audio file is empty"));
    }

    let beam_size = parse_usize_field(&form, "beam_size", defaults::DEFAULT_BEAM_SIZE)?;
    validate_beam_size(beam_size)?;

    let options = RecognitionOptions {
        language: form.text_field("language").filter(|l| !l.is_empty()),
        beam_size,
        word_timestamps: parse_bool_field(&form, "word_timestamps", true)?,
        vad_filter: parse_bool_field(&form, "vad_filter", true)?,
    };

    let spilled = fetch::spill_to_temp(&audio.data)?;
    run_transcription(state, spilled.path().to_path_buf(), options).await
}

/// `POST /transcribe-url`: transcribe audio fetched from a URL.
pub async fn handle_transcribe_url(
    state: &Arc<ServerState>,
    body: &[u8],
) -> Result<Response<Full<Bytes>>> {
    let request: TranscribeUrlRequest = parse_json(body)?;
    validate_beam_size(request.beam_size)?;

    let options = RecognitionOptions {
        language: request.language.filter(|l| !l.is_empty()),
        beam_size: request.beam_size,
        word_timestamps: request.word_timestamps,
        vad_filter: request.vad_filter,
    };

    let fetched = fetch::fetch_to_temp(&state.http, &request.audio_url).await?;
    run_transcription(state, fetched.path().to_path_buf(), options).await
}

/// `GET /health`: readiness snapshot plus device and GPU info. Never
/// blocks on a model load in progress.
pub fn handle_health(state: &Arc<ServerState>) -> Response<Full<Bytes>> {
    let snapshot = state.lifecycle.snapshot();
    // Empty object rather than null on CPU-only hosts.
    let gpu = sys::gpu_info()
        .map(|info| json!(info))
        .unwrap_or_else(|| json!({}));

    json_response(
        200,
        json!({
            "status": "ok",
            "device": sys::detect_device(),
            "models": {
                "tts": snapshot.synthesis == LoadState::Ready,
                "whisper": snapshot.recognition == LoadState::Ready,
            },
            "gpu": gpu,
        }),
    )
}

fn parse_f32_field(form: &MultipartForm, name: &str, default: f32) -> Result<f32> {
    match form.text_field(name) {
        Some(value) if !value.is_empty() => value.parse().map_err(|_| {
            VoxError::invalid_input(format!("field '{}' must be a number, got '{}'", name, value))
        }),
        _ => Ok(default),
    }
}

fn parse_usize_field(form: &MultipartForm, name: &str, default: usize) -> Result<usize> {
    match form.text_field(name) {
        Some(value) if !value.is_empty() => value.parse().map_err(|_| {
            VoxError::invalid_input(format!(
                "field '{}' must be an integer, got '{}'",
                name, value
            ))
        }),
        _ => Ok(default),
    }
}

fn parse_bool_field(form: &MultipartForm, name: &str, default: bool) -> Result<bool> {
    match form.text_field(name).as_deref() {
        None | Some("") => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(VoxError::invalid_input(format!(
            "field '{}' must be true or false, got '{}'",
            name, other
        ))),
    }
}

/// Build a JSON response with the given status.
pub fn json_response(status: u16, body: serde_json::Value) -> Response<Full<Bytes>> {
    let response = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())));
    match response {
        Ok(response) => response,
        // Only reachable with an invalid status code, which callers never pass.
        Err(_) => Response::new(Full::new(Bytes::from("{}"))),
    }
}

/// Map a pipeline error onto the wire.
pub fn error_response(err: &VoxError) -> Response<Full<Bytes>> {
    let status = err.status_code();
    if status >= 500 {
        log::error!("request failed: {}", err);
    } else {
        log::warn!("request rejected: {}", err);
    }
    json_response(status, json!({ "success": false, "error": err.to_string() }))
}
