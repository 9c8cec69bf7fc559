//! Capabilities the session consumes but does not implement.
//!
//! Each trait has one method and every call blocks until it completes. The
//! binary plugs in terminal, HTTP and process backed implementations; tests
//! plug in scripted doubles.

use std::path::Path;

use crate::error::{PlaybackError, Result, SynthesisError};
use crate::types::{Credentials, KeyPress};

/// Produces credentials for the synthesis service.
///
/// May be called again mid-session when a request is rejected as
/// unauthorized.
pub trait CredentialProvider {
    fn obtain(&self) -> Result<Credentials>;
}

/// Converts one sentence of text into encoded audio bytes.
pub trait SynthesisClient {
    fn synthesize(
        &self,
        text: &str,
        credentials: &Credentials,
    ) -> std::result::Result<Vec<u8>, SynthesisError>;
}

/// Plays an audio file and returns once playback has finished.
pub trait AudioPlayer {
    fn play(&self, path: &Path) -> std::result::Result<(), PlaybackError>;
}

/// Blocking single-key reader with no echo and no Enter required.
pub trait KeyReader {
    fn read_key(&mut self) -> Result<KeyPress>;
}
