use thiserror::Error;

/// Top-level error type for Recital.
///
/// Variants follow the failure classes the session distinguishes: input
/// problems are fatal at startup but recoverable on reload, synthesis and
/// playback failures are always recovered locally, and everything else is a
/// fault that the interactive loop surfaces to the operator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecitalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Input is empty or contains no discernible sentences")]
    EmptyInput,

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failure of a single synthesis request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// HTTP 401: the bearer token was rejected.
    #[error("unauthorized (HTTP 401)")]
    Unauthorized,

    /// HTTP 403: the project or service account lacks the TTS role.
    #[error("permission denied (HTTP 403), check the Text-to-Speech role")]
    PermissionDenied,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no audio content received")]
    MissingAudio,
}

/// Failure to play an audio artifact through the external player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("'{0}' command not found, make sure it is installed and on PATH")]
    PlayerNotFound(String),

    #[error("player exited with status {}", exit_code_label(.code))]
    ExitStatus { code: Option<i32> },

    #[error("failed to launch player: {0}")]
    Launch(String),
}

fn exit_code_label(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl From<toml::de::Error> for RecitalError {
    fn from(err: toml::de::Error) -> Self {
        RecitalError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RecitalError {
    fn from(err: toml::ser::Error) -> Self {
        RecitalError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RecitalError {
    fn from(err: serde_json::Error) -> Self {
        RecitalError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Recital operations.
pub type Result<T> = std::result::Result<T, RecitalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RecitalError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_empty_input_display() {
        assert_eq!(
            RecitalError::EmptyInput.to_string(),
            "Input is empty or contains no discernible sentences"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RecitalError = io_err.into();
        assert!(matches!(err, RecitalError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_synthesis_error_conversion() {
        let err: RecitalError = SynthesisError::Unauthorized.into();
        assert!(matches!(
            err,
            RecitalError::Synthesis(SynthesisError::Unauthorized)
        ));
        assert_eq!(err.to_string(), "Synthesis error: unauthorized (HTTP 401)");
    }

    #[test]
    fn test_synthesis_status_display() {
        let err = SynthesisError::Status {
            status: 500,
            message: "backend unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: backend unavailable");
    }

    #[test]
    fn test_playback_error_display() {
        let err = PlaybackError::PlayerNotFound("ffplay".to_string());
        assert!(err.to_string().starts_with("'ffplay' command not found"));

        let err = PlaybackError::ExitStatus { code: Some(1) };
        assert_eq!(err.to_string(), "player exited with status 1");

        let err = PlaybackError::ExitStatus { code: None };
        assert_eq!(err.to_string(), "player exited with status unknown");
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: RecitalError = err.unwrap_err().into();
        assert!(matches!(err, RecitalError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: RecitalError = err.unwrap_err().into();
        assert!(matches!(err, RecitalError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }
}
