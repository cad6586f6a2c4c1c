use config::{Config, File};
use serde::Deserialize;

use crate::backends::BackendKind;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // Fallback chain
    pub backend_order: Vec<String>,
    pub default_language: String,
    pub backend_timeout_secs: u64, // 0 = wait forever
    // XTTS (voice cloning)
    pub python_binary: String,
    pub xtts_model: String,
    pub xtts_speed: f32,
    // Piper
    pub piper_binary: String,
    pub piper_model: String,
    // eSpeak-NG
    pub espeak_binary: String,
    pub espeak_rate: u32,
    // Google Translate TTS
    pub gtts_base_url: String,
    pub gtts_timeout_secs: u64,
    // Format bridge
    pub ffmpeg_binary: String,
    pub output_sample_rate: u32,
}

pub const DEFAULT_XTTS_MODEL: &str = "tts_models/multilingual/multi-dataset/xtts_v2";

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_order: BackendKind::DEFAULT_ORDER
                .iter()
                .map(|k| k.id().to_string())
                .collect(),
            default_language: "ar".to_string(),
            backend_timeout_secs: 0,
            python_binary: "python3".to_string(),
            xtts_model: DEFAULT_XTTS_MODEL.to_string(),
            xtts_speed: 0.95,
            piper_binary: "piper".to_string(),
            piper_model: "ar_JO-kareem-medium".to_string(),
            espeak_binary: "espeak-ng".to_string(),
            espeak_rate: 130,
            gtts_base_url: "https://translate.google.com".to_string(),
            gtts_timeout_secs: 30,
            ffmpeg_binary: "ffmpeg".to_string(),
            output_sample_rate: 22050,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = Settings::default();
        let builder = Config::builder()
            .set_default("backend_order", defaults.backend_order.clone())?
            .set_default("default_language", defaults.default_language.clone())?
            .set_default("backend_timeout_secs", defaults.backend_timeout_secs as i64)?
            .set_default("python_binary", defaults.python_binary.clone())?
            .set_default("xtts_model", defaults.xtts_model.clone())?
            .set_default("xtts_speed", defaults.xtts_speed as f64)?
            .set_default("piper_binary", defaults.piper_binary.clone())?
            .set_default("piper_model", defaults.piper_model.clone())?
            .set_default("espeak_binary", defaults.espeak_binary.clone())?
            .set_default("espeak_rate", defaults.espeak_rate as i64)?
            .set_default("gtts_base_url", defaults.gtts_base_url.clone())?
            .set_default("gtts_timeout_secs", defaults.gtts_timeout_secs as i64)?
            .set_default("ffmpeg_binary", defaults.ffmpeg_binary.clone())?
            .set_default("output_sample_rate", defaults.output_sample_rate as i64)?
            // Merge with local config file (if exists)
            .add_source(File::with_name("Voice").required(false));

        let builder = match dirs::config_dir() {
            Some(dir) => builder.add_source(
                File::from(dir.join("castvoice").join("Voice")).required(false),
            ),
            None => builder,
        };

        // Environment last (e.g. CASTVOICE_PIPER_BINARY)
        let builder = builder.add_source(
            config::Environment::with_prefix("CASTVOICE")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("backend_order"),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.backend_order.is_empty() {
            return Err(config::ConfigError::Message(
                "backend_order must name at least one backend".to_string(),
            ));
        }
        self.backends()?;
        if self.xtts_speed <= 0.0 {
            return Err(config::ConfigError::Message(format!(
                "Invalid xtts_speed: {}. Must be positive",
                self.xtts_speed
            )));
        }
        if self.espeak_rate == 0 {
            return Err(config::ConfigError::Message(
                "espeak_rate must be greater than 0".to_string(),
            ));
        }
        if self.output_sample_rate == 0 {
            return Err(config::ConfigError::Message(
                "output_sample_rate must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed `backend_order`.
    pub fn backends(&self) -> Result<Vec<BackendKind>, config::ConfigError> {
        self.backend_order
            .iter()
            .map(|id| {
                id.trim()
                    .parse::<BackendKind>()
                    .map_err(config::ConfigError::Message)
            })
            .collect()
    }

    pub fn backend_timeout(&self) -> Option<std::time::Duration> {
        match self.backend_timeout_secs {
            0 => None,
            secs => Some(std::time::Duration::from_secs(secs)),
        }
    }
}
