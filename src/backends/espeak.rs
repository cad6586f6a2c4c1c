use super::{run_error, BackendKind, SpeechBackend, SynthesisRequest};
use crate::config_loader::Settings;
use crate::error::BackendError;
use crate::process;

use std::process::Command;
use std::time::Duration;

/// eSpeak-NG: lowest quality, but installed nearly everywhere.
pub struct EspeakBackend {
    binary_path: String,
    rate: u32,
    timeout: Option<Duration>,
}

impl EspeakBackend {
    pub fn new(settings: &Settings) -> Self {
        Self {
            binary_path: settings.espeak_binary.clone(),
            rate: settings.espeak_rate,
            timeout: settings.backend_timeout(),
        }
    }
}

impl SpeechBackend for EspeakBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Espeak
    }

    fn is_available(&self) -> bool {
        process::find_executable(&self.binary_path).is_some()
    }

    fn synthesize(&self, request: &SynthesisRequest) -> Result<(), BackendError> {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("-v")
            .arg(&request.language)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-w")
            .arg(&request.out)
            .arg(&request.text);

        let finished =
            process::run(cmd, None, self.timeout).map_err(|e| run_error(self.kind(), e))?;

        if finished.success() {
            Ok(())
        } else {
            Err(BackendError::synthesis("espeak-ng", finished.stderr))
        }
    }
}
