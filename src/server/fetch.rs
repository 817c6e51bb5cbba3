//! Remote audio retrieval.
//!
//! `/tts` voice references and `/transcribe-url` inputs arrive as URLs.
//! Each fetch lands in a named temp file that lives exactly as long as the
//! request handling it.

use crate::error::{Result, VoxError};
use futures_util::StreamExt;
use std::io::Write;
use tempfile::NamedTempFile;

/// Refuse to buffer more than this from a remote URL (100 MB).
const MAX_FETCH_BYTES: u64 = 100 * 1024 * 1024;

fn fetch_error(url: &str, message: impl Into<String>) -> VoxError {
    VoxError::ResourceFetch {
        url: url.to_string(),
        message: message.into(),
    }
}

/// Download `url` into a temp file and return it. The file is deleted when
/// the returned handle drops.
pub async fn fetch_to_temp(client: &reqwest::Client, url: &str) -> Result<NamedTempFile> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(VoxError::invalid_input(format!(
            "audio URL must be http(s), got '{}'",
            url
        )));
    }

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| fetch_error(url, e.to_string()))?;

    if !response.status().is_success() {
        return Err(fetch_error(url, format!("status {}", response.status())));
    }
    if let Some(length) = response.content_length() {
        if length > MAX_FETCH_BYTES {
            return Err(fetch_error(url, format!("{} bytes exceeds fetch limit", length)));
        }
    }

    let mut file = NamedTempFile::with_suffix(".wav")?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| fetch_error(url, e.to_string()))?;
        written += chunk.len() as u64;
        if written > MAX_FETCH_BYTES {
            return Err(fetch_error(url, "response exceeds fetch limit"));
        }
        file.write_all(&chunk)?;
    }
    file.flush()?;

    log::debug!("fetched {} bytes from {}", written, url);
    Ok(file)
}

/// Spill uploaded bytes to a temp file, for engines that read from a path.
pub fn spill_to_temp(data: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::with_suffix(".wav")?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file)
}
