//! Coqui XTTS v2 with voice cloning.
//!
//! XTTS only ships as a Python package, so the backend runs a short driver
//! program under the configured interpreter. The driver goes in with `-c`,
//! the text on stdin and everything else in argv. It exits with
//! [`EXIT_NOT_INSTALLED`] when `TTS` cannot be imported, which lets us tell a
//! missing engine from a failed synthesis.

use super::{run_error, BackendKind, SpeechBackend, SynthesisRequest};
use crate::config_loader::{Settings, DEFAULT_XTTS_MODEL};
use crate::error::BackendError;
use crate::process;
use std::process::Command;
use std::time::Duration;

const EXIT_NOT_INSTALLED: i32 = 3;

const DRIVER: &str = r#"
import sys
try:
    from TTS.api import TTS
except ImportError:
    sys.exit(3)
text = sys.stdin.buffer.read().decode("utf-8")
speaker_wav, language, file_path, model, speed = sys.argv[1:6]
TTS(model).tts_to_file(
    text=text,
    speaker_wav=speaker_wav,
    language=language,
    file_path=file_path,
    speed=float(speed),
)
"#;

pub struct XttsBackend {
    python: String,
    model: String,
    speed: f32,
    timeout: Option<Duration>,
}

impl XttsBackend {
    pub fn new(settings: &Settings) -> Self {
        Self {
            python: settings.python_binary.clone(),
            model: settings.xtts_model.clone(),
            speed: settings.xtts_speed,
            timeout: settings.backend_timeout(),
        }
    }

    /// Override the model from a CLI `--model` value.
    pub fn with_model(mut self, name: &str) -> Self {
        self.model = resolve_model(name, &self.model);
        self
    }
}

/// `xtts_v2` is shorthand for the full Coqui id; anything with a slash is
/// taken as a full id. Other names keep the configured model.
pub fn resolve_model(name: &str, configured: &str) -> String {
    match name {
        "xtts_v2" | "xtts" => DEFAULT_XTTS_MODEL.to_string(),
        full if full.contains('/') => full.to_string(),
        _ => configured.to_string(),
    }
}

impl SpeechBackend for XttsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Xtts
    }

    fn is_available(&self) -> bool {
        process::find_executable(&self.python).is_some()
    }

    fn synthesize(&self, request: &SynthesisRequest) -> Result<(), BackendError> {
        let sample = request.usable_voice_sample().ok_or_else(|| {
            BackendError::synthesis("XTTS", "voice sample is missing")
        })?;

        let mut cmd = Command::new(&self.python);
        cmd.arg("-c")
            .arg(DRIVER)
            .arg(sample)
            .arg(&request.language)
            .arg(&request.out)
            .arg(&self.model)
            .arg(self.speed.to_string());

        let finished = process::run(cmd, Some(request.text.as_bytes()), self.timeout)
            .map_err(|e| run_error(self.kind(), e))?;

        match finished.status.code() {
            Some(0) => Ok(()),
            Some(EXIT_NOT_INSTALLED) => {
                Err(BackendError::Unavailable("TTS library".to_string()))
            }
            _ => Err(BackendError::synthesis("XTTS", last_line(&finished.stderr))),
        }
    }
}

/// Python tracebacks end with the line that matters.
fn last_line(stderr: &str) -> String {
    stderr.lines().last().unwrap_or("").to_string()
}
