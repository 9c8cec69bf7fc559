//! Recital application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize logging to the configured log file
//! 3. Wire SIGINT/SIGTERM to the session's interrupt flag
//! 4. Build the collaborators (terminal keys, TTS client, credentials, player)
//! 5. Prepare the session (position, credentials, text) and run it

mod cli;
mod logging;

use std::io::Stdout;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use recital_console::{CommandPlayer, TerminalKeyReader};
use recital_core::config::RecitalConfig;
use recital_core::error::{RecitalError, Result};
use recital_core::traits::CredentialProvider;
use recital_session::{
    AudioStore, Collaborators, Console, ExitReason, PositionStore, SentenceSource,
    SessionController, SessionStores, KEY_LEGEND,
};
use recital_synth::{EnvCredentialProvider, GcloudCredentialProvider, GoogleTtsClient};

use cli::CliArgs;
use logging::LogTarget;

const BANNER: &str = "--- Recital: sentence-by-sentence speech synthesis ---";
const SEPARATOR: &str =
    "------------------------------------------------------------------";

/// Pause between the startup summary and the first sentence screen.
const STARTUP_PAUSE: Duration = Duration::from_secs(1);

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_path = args.resolve_config_path();
    let (config, config_error) = match RecitalConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (RecitalConfig::default(), Some(e)),
    };

    let level = args.resolve_log_level(&config.general.log_level);
    if let LogTarget::Stderr(e) = logging::init(&level, &config.general.log_file) {
        eprintln!(
            "Warning: cannot open log file {}: {}",
            config.general.log_file.display(),
            e
        );
    }

    info!("Starting Recital v{}", env!("CARGO_PKG_VERSION"));
    match config_error {
        None => info!(path = %config_path.display(), "Configuration loaded"),
        Some(RecitalError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %config_path.display(), "No configuration file, using defaults")
        }
        Some(e) => {
            warn!(path = %config_path.display(), error = %e, "Invalid configuration, using defaults");
            eprintln!(
                "Warning: ignoring {}: {}",
                config_path.display(),
                e
            );
        }
    }

    match run(&config) {
        Ok(reason) => {
            info!(?reason, "Recital finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Fatal error");
            eprintln!("Error: {}", e);
            if matches!(e, RecitalError::Input(_) | RecitalError::EmptyInput) {
                eprintln!(
                    "Put the text to record in '{}' and start again.",
                    config.paths.text_file.display()
                );
            }
            ExitCode::FAILURE
        }
    }
}

fn run(config: &RecitalConfig) -> Result<ExitReason> {
    let interrupted = install_interrupt_flag()?;
    let mut session = build_session(config, Arc::clone(&interrupted))?;

    session.console_mut().line(BANNER)?;
    let summary = session.prepare()?;
    info!(
        persisted = summary.persisted,
        cursor = summary.cursor,
        total = summary.total,
        "Session prepared"
    );

    let console = session.console_mut();
    console.line(&format!(
        "Starting at Sentence {} / {}",
        summary.cursor + 1,
        summary.total
    ))?;
    console.line(SEPARATOR)?;
    console.line(KEY_LEGEND)?;
    console.line("  Ctrl+C exits without saving the position")?;
    console.line(SEPARATOR)?;
    std::thread::sleep(STARTUP_PAUSE);

    session.run()
}

/// SIGINT and SIGTERM set the flag instead of killing the process, so the
/// session can leave the terminal in a sane state.
fn install_interrupt_flag() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&flag))?;
    }
    Ok(flag)
}

fn build_session(
    config: &RecitalConfig,
    interrupted: Arc<AtomicBool>,
) -> Result<SessionController<Stdout>> {
    let stores = SessionStores {
        source: SentenceSource::new(&config.paths.text_file),
        positions: PositionStore::new(&config.paths.settings_file),
        audio: AudioStore::new(&config.paths.audio_dir, config.voice.audio_encoding.extension()),
    };

    let collaborators = Collaborators {
        keys: Box::new(TerminalKeyReader::new().with_interrupt_flag(Arc::clone(&interrupted))),
        synthesizer: Box::new(GoogleTtsClient::new(&config.synthesis, config.voice.clone())?),
        credentials: credential_provider(config),
        player: Box::new(CommandPlayer::from_config(&config.player)),
    };

    Ok(
        SessionController::new(stores, collaborators, Console::new(std::io::stdout()))
            .with_interrupt_flag(interrupted),
    )
}

/// Environment credentials when both variables are set, gcloud otherwise.
fn credential_provider(config: &RecitalConfig) -> Box<dyn CredentialProvider> {
    let env = EnvCredentialProvider::new();
    if env.is_configured() {
        info!("Using credentials from environment");
        Box::new(env)
    } else {
        info!(key_file = %config.paths.credentials_file.display(), "Using gcloud credentials");
        Box::new(GcloudCredentialProvider::new(&config.paths.credentials_file))
    }
}
