use super::{run_error, BackendKind, SpeechBackend, SynthesisRequest};
use crate::config_loader::Settings;
use crate::error::BackendError;
use crate::process;
use std::process::Command;
use std::time::Duration;

/// Piper: fast offline voices, no cloning. Text goes in on stdin.
pub struct PiperBackend {
    binary_path: String,
    model: String,
    timeout: Option<Duration>,
}

impl PiperBackend {
    pub fn new(settings: &Settings) -> Self {
        Self {
            binary_path: settings.piper_binary.clone(),
            model: settings.piper_model.clone(),
            timeout: settings.backend_timeout(),
        }
    }

    fn command(&self, request: &SynthesisRequest) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("--model")
            .arg(&self.model)
            .arg("--output_file")
            .arg(&request.out);
        cmd
    }
}

impl SpeechBackend for PiperBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Piper
    }

    fn is_available(&self) -> bool {
        process::find_executable(&self.binary_path).is_some()
    }

    fn synthesize(&self, request: &SynthesisRequest) -> Result<(), BackendError> {
        let finished = process::run(
            self.command(request),
            Some(request.text.as_bytes()),
            self.timeout,
        )
        .map_err(|e| run_error(self.kind(), e))?;

        if finished.success() {
            Ok(())
        } else {
            Err(BackendError::synthesis("Piper", finished.stderr))
        }
    }
}
