//! Recital synth crate - HTTP speech synthesis and credential providers.
//!
//! `GoogleTtsClient` implements `SynthesisClient` with a blocking `reqwest`
//! client. Credentials come either from the environment or from a service
//! account key plus the gcloud CLI.

pub mod credentials;
pub mod google;

pub use credentials::{
    read_project_id, EnvCredentialProvider, GcloudCredentialProvider, PROJECT_ENV, SETUP_GUIDANCE,
    TOKEN_ENV,
};
pub use google::{decode_response, GoogleTtsClient};
