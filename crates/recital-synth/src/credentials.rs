//! Credential providers for the synthesis service.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::{debug, info};

use recital_core::error::{RecitalError, Result};
use recital_core::traits::CredentialProvider;
use recital_core::types::Credentials;

pub const TOKEN_ENV: &str = "RECITAL_ACCESS_TOKEN";
pub const PROJECT_ENV: &str = "RECITAL_PROJECT_ID";

/// Printed when the service account key is missing.
pub const SETUP_GUIDANCE: &str = "\
To use Google Cloud Text-to-Speech you need a service account key file:
  1. Create or select a project in the Google Cloud console.
  2. Enable the Cloud Text-to-Speech API for it.
  3. Create a service account with the Cloud Text-to-Speech user role.
  4. Create a JSON key for that account and save it at the configured path.
  5. Install the gcloud CLI, or set RECITAL_ACCESS_TOKEN and RECITAL_PROJECT_ID.
Then restart recital.";

/// Reads a ready-made token and project from environment variables.
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    token_var: String,
    project_var: String,
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::with_vars(TOKEN_ENV, PROJECT_ENV)
    }
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vars(token_var: impl Into<String>, project_var: impl Into<String>) -> Self {
        Self {
            token_var: token_var.into(),
            project_var: project_var.into(),
        }
    }

    /// True when both variables are set and non-empty.
    pub fn is_configured(&self) -> bool {
        non_empty_var(&self.token_var).is_some() && non_empty_var(&self.project_var).is_some()
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn obtain(&self) -> Result<Credentials> {
        let token = non_empty_var(&self.token_var)
            .ok_or_else(|| RecitalError::Credential(format!("{} is not set", self.token_var)))?;
        let project = non_empty_var(&self.project_var)
            .ok_or_else(|| RecitalError::Credential(format!("{} is not set", self.project_var)))?;
        debug!(project = %project, "Credentials read from environment");
        Ok(Credentials::new(token, project))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    project_id: Option<String>,
}

/// Uses a service account key file and the gcloud CLI.
///
/// The project comes from the key's `project_id`. The token is minted by
/// `gcloud auth application-default print-access-token` with
/// `GOOGLE_APPLICATION_CREDENTIALS` pointing at the key, so every call to
/// [`obtain`](CredentialProvider::obtain) yields a fresh token.
#[derive(Debug, Clone)]
pub struct GcloudCredentialProvider {
    key_file: PathBuf,
    program: String,
}

impl GcloudCredentialProvider {
    pub fn new(key_file: impl Into<PathBuf>) -> Self {
        let program = if cfg!(target_os = "windows") {
            "gcloud.cmd"
        } else {
            "gcloud"
        };
        Self {
            key_file: key_file.into(),
            program: program.to_string(),
        }
    }

    /// Use a different executable in place of `gcloud`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn key_file(&self) -> &Path {
        &self.key_file
    }

    fn print_access_token(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(["auth", "application-default", "print-access-token"])
            .env("GOOGLE_APPLICATION_CREDENTIALS", &self.key_file)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => RecitalError::Credential(format!(
                    "'{}' not found, install the Google Cloud CLI or set {} and {}",
                    self.program, TOKEN_ENV, PROJECT_ENV
                )),
                _ => RecitalError::Credential(format!("failed to run '{}': {}", self.program, e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecitalError::Credential(format!(
                "'{}' failed ({}): {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(RecitalError::Credential(format!(
                "'{}' printed no access token",
                self.program
            )));
        }
        Ok(token)
    }
}

impl CredentialProvider for GcloudCredentialProvider {
    fn obtain(&self) -> Result<Credentials> {
        let project_id = read_project_id(&self.key_file)?;
        let token = self.print_access_token()?;
        info!(project = %project_id, "Access token obtained");
        Ok(Credentials::new(token, project_id))
    }
}

/// Read `project_id` from a service account key file.
pub fn read_project_id(path: &Path) -> Result<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RecitalError::Credential(format!(
                "'{}' not found.\n{}",
                path.display(),
                SETUP_GUIDANCE
            )));
        }
        Err(e) => {
            return Err(RecitalError::Credential(format!(
                "cannot read '{}': {}",
                path.display(),
                e
            )))
        }
    };

    let key: ServiceAccountKey = serde_json::from_str(&content).map_err(|e| {
        RecitalError::Credential(format!(
            "'{}' is not a valid service account key: {}",
            path.display(),
            e
        ))
    })?;
    key.project_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            RecitalError::Credential(format!("'{}' has no project_id", path.display()))
        })
}

// =============================================================================
// Tests
// =============================================================================
