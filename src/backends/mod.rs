pub mod espeak;
pub mod gtts;
pub mod piper;
pub mod xtts;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{BackendError, InputError};
use crate::process::RunError;

pub use espeak::EspeakBackend;
pub use gtts::GttsBackend;
pub use piper::PiperBackend;
pub use xtts::XttsBackend;

/// One narration job: what to say, in which language, whose voice, and where
/// the audio must land.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub language: String,
    pub voice_sample: Option<PathBuf>,
    pub out: PathBuf,
}

impl SynthesisRequest {
    pub fn new(
        text: impl Into<String>,
        language: impl Into<String>,
        voice_sample: Option<PathBuf>,
        out: impl Into<PathBuf>,
    ) -> Result<Self, InputError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(InputError::Empty);
        }
        Ok(Self {
            text,
            language: language.into(),
            voice_sample,
            out: out.into(),
        })
    }

    /// The reference sample, if one was given and is present on disk.
    pub fn usable_voice_sample(&self) -> Option<&Path> {
        self.voice_sample.as_deref().filter(|p| p.exists())
    }
}

/// The engines this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Coqui XTTS v2, multilingual with voice cloning.
    Xtts,
    /// Piper, offline pre-trained voices.
    Piper,
    /// Google Translate speech endpoint.
    Gtts,
    /// eSpeak-NG, rule-based, always there.
    Espeak,
}

impl BackendKind {
    pub const DEFAULT_ORDER: [BackendKind; 4] = [
        BackendKind::Xtts,
        BackendKind::Piper,
        BackendKind::Gtts,
        BackendKind::Espeak,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Xtts => "xtts",
            Self::Piper => "piper",
            Self::Gtts => "gtts",
            Self::Espeak => "espeak-ng",
        }
    }

    /// Human name used in log lines.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Xtts => "XTTS v2",
            Self::Piper => "Piper",
            Self::Gtts => "gTTS",
            Self::Espeak => "espeak-ng",
        }
    }

    pub fn requires_voice_sample(&self) -> bool {
        matches!(self, Self::Xtts)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xtts" | "xtts_v2" => Ok(Self::Xtts),
            "piper" => Ok(Self::Piper),
            "gtts" => Ok(Self::Gtts),
            "espeak" | "espeak-ng" => Ok(Self::Espeak),
            other => Err(format!("Unknown TTS backend: {}", other)),
        }
    }
}

/// What one backend attempt amounted to.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResult {
    pub backend: BackendKind,
    pub succeeded: bool,
    pub produced_path: PathBuf,
    pub diagnostic: String,
}

impl BackendResult {
    pub fn success(backend: BackendKind, path: &Path) -> Self {
        Self {
            backend,
            succeeded: true,
            produced_path: path.to_path_buf(),
            diagnostic: format!(
                "Voice generated with {}: {}",
                backend.display_name(),
                path.display()
            ),
        }
    }

    pub fn failure(backend: BackendKind, path: &Path, error: &BackendError) -> Self {
        Self {
            backend,
            succeeded: false,
            produced_path: path.to_path_buf(),
            diagnostic: error.to_string(),
        }
    }
}

/// Trait that all speech synthesis backends must implement.
/// This allows us to plug in different engines (XTTS, Piper, gTTS, eSpeak)
/// behind one fallback chain.
pub trait SpeechBackend {
    fn kind(&self) -> BackendKind;

    /// Returns the unique ID of the backend (e.g., "espeak-ng")
    fn id(&self) -> &'static str {
        self.kind().id()
    }

    /// Whether the engine is installed at all.
    fn is_available(&self) -> bool;

    /// Write audio for `request.text` to `request.out`.
    fn synthesize(&self, request: &SynthesisRequest) -> Result<(), BackendError>;

    /// Run `synthesize` and fold the outcome into a [`BackendResult`].
    ///
    /// A clean exit only counts when the output file is actually there.
    fn attempt(&self, request: &SynthesisRequest) -> BackendResult {
        let outcome = self.synthesize(request).and_then(|()| {
            if request.out.exists() {
                Ok(())
            } else {
                Err(BackendError::synthesis(
                    self.kind().display_name(),
                    "no audio file was written",
                ))
            }
        });
        match outcome {
            Ok(()) => BackendResult::success(self.kind(), &request.out),
            Err(e) => BackendResult::failure(self.kind(), &request.out, &e),
        }
    }
}

/// Map a runner failure onto the backend taxonomy.
pub(crate) fn run_error(kind: BackendKind, err: RunError) -> BackendError {
    match err {
        RunError::NotFound => BackendError::Unavailable(kind.display_name().to_string()),
        RunError::TimedOut(limit) => BackendError::Timeout {
            backend: kind.display_name().to_string(),
            secs: limit.as_secs(),
        },
        RunError::Io(e) => BackendError::io(kind.display_name(), e),
    }
}
