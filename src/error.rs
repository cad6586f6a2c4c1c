//! Error types shared by the resolver, the backends and the fallback chain.
//!
//! Only [`InputError`] and [`SynthesisError`] ever reach the process exit code.
//! Everything a backend raises is folded into a [`BackendError`] at the adapter
//! boundary so the chain can move on.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::backends::{BackendKind, BackendResult};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("No text provided")]
    Empty,
    #[error("failed to read text: {0}")]
    Read(#[from] io::Error),
}

/// Failure of a single backend. Never fatal for the run.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Engine, library or executable is missing.
    #[error("{0} not installed")]
    Unavailable(String),
    /// Engine ran but failed internally.
    #[error("{backend} error: {message}")]
    Synthesis { backend: String, message: String },
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("{backend} timed out after {secs}s")]
    Timeout { backend: String, secs: u64 },
    #[error("{backend} I/O error: {source}")]
    Io {
        backend: String,
        #[source]
        source: io::Error,
    },
}

impl BackendError {
    pub fn synthesis(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Synthesis {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn io(backend: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            backend: backend.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{0} not installed")]
    Unavailable(String),
    #[error("conversion of {input} failed: {message}")]
    Failed { input: PathBuf, message: String },
    #[error("conversion I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("All TTS methods failed")]
    AllBackendsFailed {
        attempts: Vec<BackendResult>,
        skipped: Vec<BackendKind>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackendError::synthesis("espeak-ng", "unknown voice");
        assert_eq!(err.to_string(), "espeak-ng error: unknown voice");

        let err = BackendError::Unavailable("Piper".into());
        assert_eq!(err.to_string(), "Piper not installed");
    }

    #[test]
    fn test_missing_ffmpeg_reads_as_not_installed() {
        let err = BackendError::from(FormatError::Unavailable("ffmpeg".into()));
        assert!(matches!(err, BackendError::Format(FormatError::Unavailable(_))));
        assert_eq!(err.to_string(), "ffmpeg not installed");
    }
}
