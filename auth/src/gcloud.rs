//! Delegated-CLI credentials: reuse the token of an already-authenticated
//! gcloud installation.

use crate::{AuthError, BearerToken, TokenProvider};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

const TOKEN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct CliProvider {
    binary: String,
}

impl CliProvider {
    pub fn new() -> Self {
        CliProvider {
            binary: "gcloud".to_string(),
        }
    }

    /// Point at a different executable. Used by tests and by operators with
    /// a non-standard install.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        CliProvider {
            binary: binary.into(),
        }
    }
}

impl Default for CliProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenProvider for CliProvider {
    async fn obtain_token(&self) -> Result<BearerToken, AuthError> {
        let command = Command::new(&self.binary)
            .args(["auth", "print-access-token"])
            .kill_on_drop(true)
            .output();

        let output = timeout(TOKEN_TIMEOUT, command)
            .await
            .map_err(|_| AuthError::Cli(format!("{} timed out", self.binary)))?
            .map_err(|e| AuthError::Cli(format!("could not run {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!(status = ?output.status, "gcloud exited with an error");
            return Err(AuthError::Cli(if stderr.is_empty() {
                format!("{} exited with {}", self.binary, output.status)
            } else {
                stderr
            }));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(AuthError::Cli(format!(
                "{} produced an empty token; run `gcloud auth login` first",
                self.binary
            )));
        }

        Ok(BearerToken::new(token))
    }

    fn name(&self) -> &'static str {
        "gcloud CLI"
    }
}
