pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::RecitalConfig;
pub use error::{PlaybackError, RecitalError, Result, SynthesisError};
pub use traits::{AudioPlayer, CredentialProvider, KeyReader, SynthesisClient};
pub use types::{AudioEncoding, Credentials, KeyPress};
