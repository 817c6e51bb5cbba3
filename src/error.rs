//! Error types for voxserve.

use thiserror::Error;

/// Which model a failure relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Text-to-speech synthesis model.
    Synthesis,
    /// Speech recognition model.
    Recognition,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Synthesis => write!(f, "tts"),
            ModelKind::Recognition => write!(f, "whisper"),
        }
    }
}

#[derive(Error, Debug)]
pub enum VoxError {
    // Model lifecycle errors
    #[error("{kind} model not available: {message}")]
    ModelUnavailable { kind: ModelKind, message: String },

    // Engine call errors
    #[error("{stage} failed: {message}")]
    Generation { stage: &'static str, message: String },

    // Request errors, rejected before any model is touched
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    // Remote audio could not be retrieved
    #[error("failed to fetch {url}: {message}")]
    ResourceFetch { url: String, message: String },

    // Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoxError {
    /// HTTP status code this error maps to.
    ///
    /// `ResourceFetch` deliberately maps to 500 like `Generation`: the wire
    /// protocol does not distinguish them, only the error type does.
    pub fn status_code(&self) -> u16 {
        match self {
            VoxError::ModelUnavailable { .. } => 503,
            VoxError::InvalidInput { .. } => 400,
            VoxError::Generation { .. } | VoxError::ResourceFetch { .. } => 500,
            VoxError::Config { .. } | VoxError::Io(_) => 500,
        }
    }

    /// Shorthand for a generation failure in a named pipeline stage.
    pub fn generation(stage: &'static str, message: impl Into<String>) -> Self {
        VoxError::Generation {
            stage,
            message: message.into(),
        }
    }

    /// Shorthand for an input validation failure.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        VoxError::InvalidInput {
            message: message.into(),
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoxError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_model_unavailable_display() {
        let error = VoxError::ModelUnavailable {
            kind: ModelKind::Synthesis,
            message: "weights missing".to_string(),
        };
        assert_eq!(error.to_string(), "tts model not available: weights missing");
    }

    #[test]
    fn test_generation_display() {
        let error = VoxError::generation("synthesis", "engine exited with code 1");
        assert_eq!(
            error.to_string(),
            "synthesis failed: engine exited with code 1"
        );
    }

    #[test]
    fn test_invalid_input_display() {
        let error = VoxError::invalid_input("text exceeds 10000 characters");
        assert_eq!(
            error.to_string(),
            "invalid input: text exceeds 10000 characters"
        );
    }

    #[test]
    fn test_resource_fetch_display() {
        let error = VoxError::ResourceFetch {
            url: "http://example.com/ref.wav".to_string(),
            message: "404 Not Found".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "failed to fetch http://example.com/ref.wav: 404 Not Found"
        );
    }

    #[test]
    fn test_status_codes() {
        let unavailable = VoxError::ModelUnavailable {
            kind: ModelKind::Recognition,
            message: "load failed".to_string(),
        };
        assert_eq!(unavailable.status_code(), 503);
        assert_eq!(VoxError::invalid_input("bad").status_code(), 400);
        assert_eq!(
            VoxError::generation("transcription", "oom").status_code(),
            500
        );

        // ResourceFetch is not distinguished from Generation on the wire
        let fetch = VoxError::ResourceFetch {
            url: "http://x".to_string(),
            message: "refused".to_string(),
        };
        assert_eq!(fetch.status_code(), 500);
    }

    #[test]
    fn test_model_kind_display() {
        assert_eq!(ModelKind::Synthesis.to_string(), "tts");
        assert_eq!(ModelKind::Recognition.to_string(), "whisper");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: VoxError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<VoxError>();
        assert_sync::<VoxError>();
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: VoxError = io_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }
}
