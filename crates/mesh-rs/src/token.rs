//! Platform token provider
//!
//! Reads the service account token mounted into the pod.

use async_trait::async_trait;
use mesh_pilot_core::{TokenError, TokenProvider};
use std::path::{Path, PathBuf};

/// Default mount path of the service account token
pub const SERVICE_ACCOUNT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Token provider reading a mounted service account token file
#[derive(Debug, Clone)]
pub struct ServiceAccountTokenProvider {
    path: PathBuf,
}

impl Default for ServiceAccountTokenProvider {
    fn default() -> Self {
        Self::new(SERVICE_ACCOUNT_TOKEN_PATH)
    }
}

impl ServiceAccountTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn platform_token(&self) -> Result<String, TokenError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| TokenError(format!("{}: {}", self.path.display(), e)))?;

        let token = raw.trim();
        if token.is_empty() {
            return Err(TokenError(format!("{} is empty", self.path.display())));
        }

        Ok(token.to_string())
    }
}
