//! castvoice - narration tracks for news broadcasts.
//!
//! Text goes through a fallback chain of speech engines (XTTS v2 with voice
//! cloning, Piper, Google's translate speech endpoint, eSpeak-NG) until one of
//! them writes the requested audio file.

pub mod backends;
pub mod config_loader;
pub mod error;
pub mod input;
pub mod orchestrator;
pub mod process;
pub mod transcode;

pub use backends::{BackendKind, BackendResult, SpeechBackend, SynthesisRequest};
pub use config_loader::Settings;
pub use error::{BackendError, FormatError, InputError, SynthesisError};
pub use orchestrator::{FallbackOutcome, Orchestrator};
