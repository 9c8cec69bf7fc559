use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use recital_core::config::PlayerConfig;
use recital_core::error::PlaybackError;
use recital_core::traits::AudioPlayer;

/// Plays audio through an external command, `<command> <args...> <path>`.
///
/// Output of the player is discarded; the call returns when it exits.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    command: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl AudioPlayer for CommandPlayer {
    fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        debug!(command = %self.command, path = %path.display(), "Starting player");
        let status = Command::new(&self.command)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PlaybackError::PlayerNotFound(self.command.clone()),
                _ => PlaybackError::Launch(e.to_string()),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(PlaybackError::ExitStatus {
                code: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = PlayerConfig {
            command: "mpv".to_string(),
            args: vec!["--no-video".to_string()],
        };
        let player = CommandPlayer::from_config(&config);
        assert_eq!(player.command(), "mpv");
        assert_eq!(player.args, vec!["--no-video"]);
    }

    #[test]
    fn test_missing_player() {
        let player = CommandPlayer::new("recital-no-such-player", Vec::new());
        let err = player.play(Path::new("001.wav")).unwrap_err();
        assert_eq!(
            err,
            PlaybackError::PlayerNotFound("recital-no-such-player".to_string())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_player() {
        let player = CommandPlayer::new("true", Vec::new());
        assert!(player.play(Path::new("001.wav")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_player() {
        let player = CommandPlayer::new("false", Vec::new());
        assert_eq!(
            player.play(Path::new("001.wav")),
            Err(PlaybackError::ExitStatus { code: Some(1) })
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_path_is_last_argument() {
        // `test -f <path>` succeeds only when the path is passed last.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("003.wav");
        let player = CommandPlayer::new("test", vec!["-f".to_string()]);

        assert!(player.play(&path).is_err());
        std::fs::write(&path, b"RIFF").unwrap();
        assert!(player.play(&path).is_ok());
    }
}
