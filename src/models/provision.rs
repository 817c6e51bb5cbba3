//! Model weight provisioning.
//!
//! Downloads Whisper weights into the configured models directory before
//! first model construction. Runs at startup; the lifecycle manager only
//! depends on the file being present when the factory runs.

use crate::config::Config;
use crate::error::{ModelKind, Result, VoxError};
use crate::models::catalog::get_model;
use futures_util::StreamExt;
use sha1::{Digest, Sha1};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn provision_error(message: impl Into<String>) -> VoxError {
    VoxError::ModelUnavailable {
        kind: ModelKind::Recognition,
        message: message.into(),
    }
}

/// Ensure the configured Whisper model exists on disk, downloading it if
/// missing. Returns the model file path.
pub async fn ensure_whisper_model(config: &Config) -> Result<PathBuf> {
    let path = config.whisper_model_path();
    if path.exists() {
        log::debug!("whisper model already present at {}", path.display());
        return Ok(path);
    }

    let info = get_model(&config.whisper_model).ok_or_else(|| {
        provision_error(format!(
            "unknown whisper model '{}'",
            config.whisper_model
        ))
    })?;

    log::info!(
        "downloading whisper model {} ({} MB) to {}",
        info.name,
        info.size_mb,
        path.display()
    );
    download_to_path(info.url, info.sha1, &path).await?;
    Ok(path)
}

/// Fetch `url` to `output_path`, streaming to disk. A partial download is
/// staged under a `.partial` suffix and renamed only once complete, so a
/// crashed download never leaves a truncated file at the final path.
async fn download_to_path(url: &str, sha1: &str, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let partial_path = output_path.with_extension("bin.partial");

    let response = reqwest::get(url)
        .await
        .map_err(|e| provision_error(format!("failed to start download: {}", e)))?;

    if !response.status().is_success() {
        return Err(provision_error(format!(
            "download failed with status {}",
            response.status()
        )));
    }

    let total = response.content_length().unwrap_or(0);
    let mut hasher = Sha1::new();
    let mut stream = response.bytes_stream();

    // Any failure from here on leaves a .partial file; remove it before
    // surfacing the error so a retry starts clean.
    let staged: Result<()> = async {
        let mut file = fs::File::create(&partial_path)?;
        let mut written: u64 = 0;
        let mut last_logged_pct: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| provision_error(format!("download interrupted: {}", e)))?;
            file.write_all(&chunk)?;
            hasher.update(&chunk);
            written += chunk.len() as u64;

            if total > 0 {
                let pct = written * 100 / total;
                if pct >= last_logged_pct + 10 {
                    last_logged_pct = pct;
                    log::info!("download progress: {}%", pct);
                }
            }
        }
        file.flush()?;
        drop(file);

        if !sha1.is_empty() {
            let calculated = format!("{:x}", hasher.finalize());
            if calculated != sha1 {
                return Err(provision_error(format!(
                    "checksum mismatch: expected {}, got {}",
                    sha1, calculated
                )));
            }
        }

        fs::rename(&partial_path, output_path)?;
        Ok(())
    }
    .await;

    if let Err(e) = staged {
        cleanup_partial(&partial_path);
        return Err(e);
    }

    log::info!("model installed at {}", output_path.display());
    Ok(())
}

fn cleanup_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("failed to remove partial download {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_existing_model_is_not_redownloaded() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            models_dir: dir.path().to_path_buf(),
            whisper_model: "base".to_string(),
            ..Config::default()
        };

        let path = config.whisper_model_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"weights").unwrap();

        let resolved = ensure_whisper_model(&config).await.unwrap();
        assert_eq!(resolved, path);
        assert_eq!(fs::read(&path).unwrap(), b"weights");
    }

    #[tokio::test]
    async fn test_unknown_model_is_rejected_before_any_network_call() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            models_dir: dir.path().to_path_buf(),
            whisper_model: "no-such-model".to_string(),
            ..Config::default()
        };

        let err = ensure_whisper_model(&config).await.unwrap_err();
        match err {
            VoxError::ModelUnavailable { kind, message } => {
                assert_eq!(kind, ModelKind::Recognition);
                assert!(message.contains("no-such-model"));
            }
            other => panic!("expected ModelUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_cleanup_partial_tolerates_missing_file() {
        cleanup_partial(Path::new("/nonexistent/file.partial"));
    }

    #[test]
    fn test_cleanup_partial_removes_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ggml-base.bin.partial");
        fs::write(&path, b"truncated weights").unwrap();

        cleanup_partial(&path);
        assert!(!path.exists());
    }
}
