//! Service configuration.
//!
//! Configuration is environment-driven with CLI overrides, matching how the
//! service is deployed (one container, one GPU, env vars from the scheduler).

use crate::defaults;
use crate::error::{Result, VoxError};
use serde::Serialize;
use std::path::PathBuf;

/// Runtime configuration for the service.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Root directory for model weight caching. Must be writable; the
    /// provisioning step populates it before or during first model use.
    pub models_dir: PathBuf,
    /// Command invoked for synthesis (the Chatterbox CLI adapter).
    pub synthesis_command: PathBuf,
    /// Whisper model name (e.g. "large-v3", "base").
    pub whisper_model: String,
    /// Maximum estimated speech tokens per synthesis batch.
    pub max_speech_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: defaults::DEFAULT_PORT,
            models_dir: default_models_dir(),
            synthesis_command: PathBuf::from("chatterbox-cli"),
            whisper_model: defaults::DEFAULT_WHISPER_MODEL.to_string(),
            max_speech_tokens: defaults::MAX_SPEECH_TOKENS,
        }
    }
}

/// Default model cache root: `MODELS_DIR` deployments mount a volume at
/// /data/models; local runs fall back to the user cache dir.
fn default_models_dir() -> PathBuf {
    if PathBuf::from("/data").is_dir() {
        return PathBuf::from("/data/models");
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("voxserve")
        .join("models")
}

impl Config {
    /// Build configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognized variables: `PORT`, `MODELS_DIR`, `SYNTHESIS_COMMAND`,
    /// `WHISPER_MODEL`, `MAX_SPEECH_TOKENS`.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(port) = std::env::var("PORT") {
            config.port = port.parse().map_err(|_| VoxError::Config {
                message: format!("PORT must be a number, got '{}'", port),
            })?;
        }
        if let Ok(dir) = std::env::var("MODELS_DIR") {
            config.models_dir = PathBuf::from(dir);
        }
        if let Ok(cmd) = std::env::var("SYNTHESIS_COMMAND") {
            config.synthesis_command = PathBuf::from(cmd);
        }
        if let Ok(model) = std::env::var("WHISPER_MODEL") {
            config.whisper_model = model;
        }
        if let Ok(tokens) = std::env::var("MAX_SPEECH_TOKENS") {
            config.max_speech_tokens = tokens.parse().map_err(|_| VoxError::Config {
                message: format!("MAX_SPEECH_TOKENS must be a number, got '{}'", tokens),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate constraints that would otherwise surface as confusing
    /// failures deep in the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.max_speech_tokens == 0 {
            return Err(VoxError::Config {
                message: "max_speech_tokens must be positive".to_string(),
            });
        }
        if self.whisper_model.is_empty() {
            return Err(VoxError::Config {
                message: "whisper_model must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Path the configured Whisper model file is expected at.
    pub fn whisper_model_path(&self) -> PathBuf {
        self.models_dir
            .join(format!("ggml-{}.bin", self.whisper_model))
    }
}
