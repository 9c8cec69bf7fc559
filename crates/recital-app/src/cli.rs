//! CLI argument definitions for the Recital binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "RECITAL_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "recital.toml";

const AFTER_HELP: &str = "\
Keys (case-insensitive, no Enter needed):
  L        next sentence (saves position)
  J        previous sentence
  SPACE    synthesize, save and play the current sentence
  R        reload the text file
  Q        save position and quit
  Ctrl+C   quit without saving position

Setup:
  Put the text in texts/data.txt (see [paths] in recital.toml).
  Place a Google Cloud service account key with the Text-to-Speech role at
  credentials-tts.json and install the gcloud CLI, or export
  RECITAL_ACCESS_TOKEN and RECITAL_PROJECT_ID.
  Install ffplay (part of FFmpeg) or set [player] command.
  Sentences with a saved recording are shown with a leading '*'.";

/// Recital: step through a text sentence by sentence and record each one
/// with a speech synthesis service.
#[derive(Parser, Debug)]
#[command(name = "recital", version, about, after_help = AFTER_HELP)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > RECITAL_CONFIG env var > ./recital.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        config_path_from(self.config.as_ref(), std::env::var(CONFIG_ENV).ok())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn config_path_from(flag: Option<&PathBuf>, env: Option<String>) -> PathBuf {
    if let Some(p) = flag {
        return p.clone();
    }
    match env {
        Some(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}
