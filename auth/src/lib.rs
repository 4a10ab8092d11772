//! Bearer-token acquisition for the remote config service.
//!
//! Three interchangeable strategies produce the same thing: a short-lived
//! bearer token for the config-write scope. The deploy pipeline only ever
//! sees the [`TokenProvider`] trait.

use async_trait::async_trait;
use std::fmt;
use std::io;
use std::path::PathBuf;

pub mod assertion;
pub mod gcloud;
pub mod key;
pub mod sdk;

pub use assertion::AssertionProvider;
pub use gcloud::CliProvider;
pub use key::ServiceAccountKey;
pub use sdk::SdkProvider;

/// OAuth2 scope that allows reading and publishing remote config templates.
pub const REMOTE_CONFIG_SCOPE: &str = "https://www.googleapis.com/auth/firebase.remoteconfig";

/// A short-lived credential presented in the Authorization header.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(raw: impl Into<String>) -> Self {
        BearerToken(raw.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

// Tokens end up in debug output of whatever holds them; never print the
// secret itself.
impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken(..)")
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("no service account key found; searched {searched:?}")]
    MissingKeyFile { searched: Vec<PathBuf> },

    #[error("could not read service account key {path}: {source}")]
    KeyUnreadable { path: PathBuf, source: io::Error },

    #[error("service account key is not valid JSON: {0}")]
    KeyInvalid(#[from] serde_json::Error),

    #[error("could not sign the token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("token endpoint rejected the assertion: HTTP {status}: {body}")]
    ExchangeRejected { status: u16, body: String },

    #[error("could not reach the token endpoint: {0}")]
    ExchangeTransport(#[from] reqwest::Error),

    #[error("token endpoint returned no access token")]
    ExchangeEmpty,

    #[error("gcloud CLI token lookup failed: {0}")]
    Cli(String),

    #[error("auth library error: {0}")]
    Sdk(String),
}

/// A credential strategy. Exactly one is selected per run.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn obtain_token(&self) -> Result<BearerToken, AuthError>;

    /// Short human-readable label for status output.
    fn name(&self) -> &'static str;
}

/// Fixed-token provider for tests and dry runs against a mock service.
pub struct StaticProvider {
    token: String,
}

impl StaticProvider {
    pub fn new(token: impl Into<String>) -> Self {
        StaticProvider {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticProvider {
    async fn obtain_token(&self) -> Result<BearerToken, AuthError> {
        Ok(BearerToken::new(self.token.clone()))
    }

    fn name(&self) -> &'static str {
        "static token"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_the_secret() {
        let token = BearerToken::new("ya29.super-secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
    }

    #[tokio::test]
    async fn static_provider_returns_its_token() {
        let provider = StaticProvider::new("tok");
        let token = provider.obtain_token().await.unwrap();
        assert_eq!(token.secret(), "tok");
    }
}
