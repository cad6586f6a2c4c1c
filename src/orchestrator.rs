//! The fallback chain: try each backend in order until one writes the file.

use crate::backends::{
    BackendKind, BackendResult, EspeakBackend, GttsBackend, PiperBackend, SpeechBackend,
    SynthesisRequest, XttsBackend,
};
use crate::config_loader::Settings;
use crate::error::{BackendError, SynthesisError};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// What a successful run did.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackOutcome {
    pub winner: BackendKind,
    pub result: BackendResult,
    /// Failed attempts before the winner, in order.
    pub failures: Vec<BackendResult>,
    /// Backends passed over without being invoked.
    pub skipped: Vec<BackendKind>,
}

pub struct Orchestrator {
    backends: Vec<Box<dyn SpeechBackend>>,
}

impl Orchestrator {
    pub fn new(backends: Vec<Box<dyn SpeechBackend>>) -> Self {
        Self { backends }
    }

    /// Build the configured chain. `model` is the CLI's `--model` value.
    pub fn from_settings(settings: &Settings, model: &str) -> Result<Self, config::ConfigError> {
        let backends = settings
            .backends()?
            .into_iter()
            .map(|kind| -> Box<dyn SpeechBackend> {
                match kind {
                    BackendKind::Xtts => Box::new(XttsBackend::new(settings).with_model(model)),
                    BackendKind::Piper => Box::new(PiperBackend::new(settings)),
                    BackendKind::Gtts => Box::new(GttsBackend::new(settings)),
                    BackendKind::Espeak => Box::new(EspeakBackend::new(settings)),
                }
            })
            .collect();
        Ok(Self::new(backends))
    }

    pub fn backends(&self) -> impl Iterator<Item = &dyn SpeechBackend> {
        self.backends.iter().map(|b| b.as_ref())
    }

    pub fn run(&self, request: &SynthesisRequest) -> Result<FallbackOutcome, SynthesisError> {
        ensure_parent_dir(&request.out)?;

        let mut failures = Vec::new();
        let mut skipped = Vec::new();

        for backend in &self.backends {
            let kind = backend.kind();

            if kind.requires_voice_sample() && request.usable_voice_sample().is_none() {
                info!("Skipping {}: no usable voice sample", kind);
                skipped.push(kind);
                continue;
            }

            let result = if backend.is_available() {
                info!("Trying {}...", kind);
                backend.attempt(request)
            } else {
                let err = BackendError::Unavailable(kind.display_name().to_string());
                BackendResult::failure(kind, &request.out, &err)
            };

            if result.succeeded {
                info!("{}", result.diagnostic);
                return Ok(FallbackOutcome {
                    winner: kind,
                    result,
                    failures,
                    skipped,
                });
            }

            warn!("{}", result.diagnostic);
            discard_partial(&request.out);
            failures.push(result);
        }

        Err(SynthesisError::AllBackendsFailed {
            attempts: failures,
            skipped,
        })
    }
}

fn ensure_parent_dir(out: &Path) -> Result<(), SynthesisError> {
    let parent = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };
    fs::create_dir_all(parent).map_err(|source| SynthesisError::OutputDir {
        path: parent.to_path_buf(),
        source,
    })
}

fn discard_partial(out: &Path) {
    if out.exists() {
        if let Err(e) = fs::remove_file(out) {
            warn!("Could not remove partial output {}: {}", out.display(), e);
        }
    }
}
