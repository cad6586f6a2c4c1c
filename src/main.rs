//! castvoice - generate a narration track for a news broadcast.

use castvoice::config_loader::Settings;
use castvoice::input::resolve_text;
use castvoice::{Orchestrator, SpeechBackend, SynthesisError, SynthesisRequest};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Generate Arabic voice for news broadcast
#[derive(Parser)]
#[command(name = "castvoice")]
#[command(author = "StarTuz")]
#[command(version)]
#[command(about = "Generate a narration track, falling back across TTS engines", long_about = None)]
struct Cli {
    /// TTS model to use for voice cloning
    #[arg(long, default_value = "xtts_v2")]
    model: String,

    /// Path to voice sample WAV file
    #[arg(long)]
    voice: Option<PathBuf>,

    /// Path to text file or direct text (reads stdin when omitted)
    #[arg(long)]
    text: Option<String>,

    /// Output audio file path
    #[arg(long, required_unless_present = "check")]
    out: Option<PathBuf>,

    /// Language code (defaults to the configured language, "ar")
    #[arg(long)]
    lang: Option<String>,

    /// Report which configured backends are installed, then exit
    #[arg(long)]
    check: bool,
}

fn init_logging() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stdout().is_terminal())
        .with_writer(std::io::stdout)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let orchestrator = match Orchestrator::from_settings(&settings, &cli.model) {
        Ok(o) => o,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        for backend in orchestrator.backends() {
            let state = if backend.is_available() { "available" } else { "missing" };
            info!("{:<10} {}", backend.id(), state);
        }
        return ExitCode::SUCCESS;
    }

    let Some(out) = cli.out else {
        error!("Error: --out is required");
        return ExitCode::FAILURE;
    };

    let text = match resolve_text(cli.text.as_deref(), std::io::stdin().lock()) {
        Ok(t) => t,
        Err(e) => {
            error!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let language = cli.lang.unwrap_or_else(|| settings.default_language.clone());
    let request = match SynthesisRequest::new(text, language, cli.voice, out) {
        Ok(r) => r,
        Err(e) => {
            error!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match orchestrator.run(&request) {
        Ok(outcome) => {
            info!("Voice generation completed successfully ({})", outcome.winner);
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let SynthesisError::AllBackendsFailed { skipped, .. } = &e {
                for kind in skipped {
                    info!("{} was skipped", kind);
                }
            }
            error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
