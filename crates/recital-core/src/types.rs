use std::fmt;

use serde::{Deserialize, Serialize};

/// Bearer token plus the project that is billed for synthesis requests.
///
/// Opaque to the session; only the synthesis client looks inside.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub project_id: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            project_id: project_id.into(),
        }
    }
}

// Never print the token.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// One keystroke read from the operator's terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    /// A printable (or at least decodable) character.
    Char(char),
    /// Ctrl+C or end of input: leave without saving.
    Interrupt,
}

/// Audio encoding requested from the synthesis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[serde(rename = "LINEAR16")]
    Linear16,
    Mp3,
    OggOpus,
    Mulaw,
    Alaw,
}

impl AudioEncoding {
    /// File extension of the container the service returns for this encoding.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 | AudioEncoding::Mulaw | AudioEncoding::Alaw => "wav",
            AudioEncoding::Mp3 => "mp3",
            AudioEncoding::OggOpus => "ogg",
        }
    }

    /// Name used on the wire.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::OggOpus => "OGG_OPUS",
            AudioEncoding::Mulaw => "MULAW",
            AudioEncoding::Alaw => "ALAW",
        }
    }
}

impl fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}
