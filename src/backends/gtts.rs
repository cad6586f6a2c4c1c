//! Google Translate speech endpoint (the service behind gTTS).
//!
//! The service only ever answers with MP3, and only for short inputs, so text
//! is sent in chunks and the answers are concatenated into an intermediate
//! `.mp3` next to the requested output. The format bridge takes it from there.

use super::{BackendKind, SpeechBackend, SynthesisRequest};
use crate::config_loader::Settings;
use crate::error::BackendError;
use crate::transcode::Transcoder;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Longest chunk the endpoint accepts, in characters.
const MAX_CHUNK_CHARS: usize = 100;
const INTERMEDIATE_EXT: &str = "mp3";

pub struct GttsBackend {
    base_url: String,
    timeout: Duration,
    transcoder: Transcoder,
}

impl GttsBackend {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_url: settings.gtts_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(settings.gtts_timeout_secs),
            transcoder: Transcoder::new(settings),
        }
    }

    fn client(&self) -> Result<Client, BackendError> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
            .build()
            .map_err(|e| BackendError::Unavailable(format!("gTTS client ({})", e)))
    }

    fn download(&self, request: &SynthesisRequest, dest: &Path) -> Result<(), BackendError> {
        let client = self.client()?;
        let chunks = split_text(&request.text, MAX_CHUNK_CHARS);
        let total = chunks.len().to_string();
        let url = format!("{}/translate_tts", self.base_url);

        let mut file = File::create(dest).map_err(|e| BackendError::io("gTTS", e))?;
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("gTTS: chunk {}/{} ({} chars)", idx + 1, total, chunk.chars().count());
            let resp = client
                .get(&url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", request.language.as_str()),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.to_string().as_str()),
                    ("textlen", chunk.chars().count().to_string().as_str()),
                ])
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(|e| BackendError::synthesis("gTTS", e.to_string()))?;

            let body = resp
                .bytes()
                .map_err(|e| BackendError::synthesis("gTTS", e.to_string()))?;
            file.write_all(&body)
                .map_err(|e| BackendError::io("gTTS", e))?;
        }
        file.flush().map_err(|e| BackendError::io("gTTS", e))
    }

    /// An output with no extension has no container for ffmpeg to pick, so
    /// it keeps the MP3 as downloaded.
    fn finish(&self, intermediate: &Path, out: &Path) -> Result<(), BackendError> {
        if out.extension().is_none() || has_extension(out, INTERMEDIATE_EXT) {
            fs::rename(intermediate, out).map_err(|e| BackendError::io("gTTS", e))
        } else {
            self.transcoder.convert(intermediate, out)?;
            Ok(())
        }
    }
}

impl SpeechBackend for GttsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gtts
    }

    fn is_available(&self) -> bool {
        reqwest::Url::parse(&self.base_url).is_ok()
    }

    fn synthesize(&self, request: &SynthesisRequest) -> Result<(), BackendError> {
        let intermediate = intermediate_path(&request.out);
        let result = self
            .download(request, &intermediate)
            .and_then(|_| self.finish(&intermediate, &request.out));

        if result.is_err() && intermediate.exists() {
            let _ = fs::remove_file(&intermediate);
        }
        result
    }
}

/// `news.wav` -> `news.intermediate.mp3`. Never equal to the output itself.
pub fn intermediate_path(out: &Path) -> PathBuf {
    out.with_extension(format!("intermediate.{}", INTERMEDIATE_EXT))
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Split on whitespace into pieces of at most `max` characters. Words longer
/// than `max` are cut.
fn split_text(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            chunks.extend(chars.chunks(max).map(|c| c.iter().collect::<String>()));
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > max {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
