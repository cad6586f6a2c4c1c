//! ffmpeg bridge from an engine's native container to the one the caller asked for.

use crate::config_loader::Settings;
use crate::error::FormatError;
use crate::process::{self, RunError};
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

pub struct Transcoder {
    binary_path: String,
    sample_rate: u32,
    timeout: Option<Duration>,
}

impl Transcoder {
    pub fn new(settings: &Settings) -> Self {
        Self {
            binary_path: settings.ffmpeg_binary.clone(),
            sample_rate: settings.output_sample_rate,
            timeout: settings.backend_timeout(),
        }
    }

    /// Convert `input` into `output`, then delete `input`.
    ///
    /// WAV targets get 16-bit signed little-endian PCM; every target is
    /// resampled to the configured rate. `input` is left alone on failure.
    pub fn convert(&self, input: &Path, output: &Path) -> Result<(), FormatError> {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(["-y", "-loglevel", "error", "-i"]).arg(input);
        if is_wav(output) {
            cmd.args(["-acodec", "pcm_s16le"]);
        }
        cmd.arg("-ar").arg(self.sample_rate.to_string()).arg(output);

        debug!("Transcoding {} -> {}", input.display(), output.display());
        let finished = process::run(cmd, None, self.timeout).map_err(|e| match e {
            RunError::NotFound => FormatError::Unavailable("ffmpeg".to_string()),
            RunError::TimedOut(limit) => FormatError::Failed {
                input: input.to_path_buf(),
                message: format!("timed out after {}s", limit.as_secs()),
            },
            RunError::Io(e) => FormatError::Io(e),
        })?;

        if !finished.success() {
            return Err(FormatError::Failed {
                input: input.to_path_buf(),
                message: finished.stderr,
            });
        }

        std::fs::remove_file(input)?;
        Ok(())
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}
