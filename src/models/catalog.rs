//! Whisper model metadata catalog.
//!
//! Maps model names to their HuggingFace download URLs and approximate
//! sizes, so provisioning can fetch a configured model by name alone.

/// Metadata for a Whisper GGML model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Model identifier (e.g., "base", "large-v3")
    pub name: &'static str,
    /// Model size in megabytes
    pub size_mb: u32,
    /// SHA-1 checksum for integrity verification; empty skips the check
    pub sha1: &'static str,
    /// Download URL from HuggingFace
    pub url: &'static str,
}

/// Catalog of supported Whisper models.
///
/// The service default is `large-v3`; the smaller entries exist for
/// CPU-only and development hosts.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "tiny",
        size_mb: 75,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.bin",
    },
    ModelInfo {
        name: "base",
        size_mb: 142,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin",
    },
    ModelInfo {
        name: "small",
        size_mb: 466,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin",
    },
    ModelInfo {
        name: "medium",
        size_mb: 1533,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-medium.bin",
    },
    ModelInfo {
        name: "large-v3",
        size_mb: 3094,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3.bin",
    },
    ModelInfo {
        name: "large-v3-turbo",
        size_mb: 1624,
        sha1: "",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3-turbo.bin",
    },
];

/// Find a model by name.
pub fn get_model(name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.name == name)
}

/// Get all catalog models.
pub fn list_models() -> &'static [ModelInfo] {
    MODELS
}
