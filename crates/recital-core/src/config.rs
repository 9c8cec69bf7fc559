use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RecitalError, Result};
use crate::types::AudioEncoding;

/// Top-level configuration for Recital.
///
/// Loaded from `recital.toml` in the working directory by default. Every
/// section is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecitalConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

impl RecitalConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RecitalConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| RecitalError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// File that receives log output while the terminal is in use.
    pub log_file: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: PathBuf::from("recital.log"),
        }
    }
}

/// Locations of the input text, the audio artifacts and the settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// UTF-8 text that is split into sentences.
    pub text_file: PathBuf,
    /// Directory receiving `001.<ext>`, `002.<ext>`, ...
    pub audio_dir: PathBuf,
    /// JSON document holding the last processed sentence.
    pub settings_file: PathBuf,
    /// Service account key used to obtain access tokens.
    pub credentials_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            text_file: PathBuf::from("texts").join("data.txt"),
            audio_dir: PathBuf::from("texts").join("audio"),
            settings_file: PathBuf::from("settings.json"),
            credentials_file: PathBuf::from("credentials-tts.json"),
        }
    }
}

/// Voice selection sent with every synthesis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// BCP-47 language code, e.g. "en-GB".
    pub language_code: String,
    /// Voice name as listed by the service.
    pub name: String,
    /// Speaking rate, 1.0 is normal speed.
    pub speaking_rate: f64,
    pub audio_encoding: AudioEncoding,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language_code: "en-GB".to_string(),
            name: "en-GB-Chirp3-HD-Sadaltager".to_string(),
            speaking_rate: 0.9,
            audio_encoding: AudioEncoding::Linear16,
        }
    }
}

/// Synthesis endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://texttospeech.googleapis.com/v1/text:synthesize".to_string(),
            timeout_secs: 30,
        }
    }
}

/// External audio player invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Player executable, looked up on PATH.
    pub command: String,
    /// Arguments placed before the file path.
    pub args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let command = if cfg!(target_os = "windows") {
            "ffplay.exe"
        } else {
            "ffplay"
        };
        Self {
            command: command.to_string(),
            args: vec!["-nodisp".to_string(), "-autoexit".to_string()],
        }
    }
}
