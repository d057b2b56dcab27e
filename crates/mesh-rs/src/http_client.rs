//! HTTP client for addon reachability checks

use async_trait::async_trait;
use mesh_pilot_core::{AuthConfig, AuthType, HttpClient, HttpError, HttpResponse};
use std::time::Duration;

/// HTTP client built on reqwest
///
/// A client is built per request because TLS settings come from the
/// addon's auth config.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestHttpClient;

impl ReqwestHttpClient {
    async fn build_client(auth: &AuthConfig, timeout: Duration) -> Result<reqwest::Client, HttpError> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(auth.insecure_skip_verify);

        if let Some(ca_file) = &auth.ca_file {
            let pem = tokio::fs::read(ca_file)
                .await
                .map_err(|e| HttpError::Client(format!("{}: {}", ca_file.display(), e)))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| HttpError::Client(format!("{}: {}", ca_file.display(), e)))?;
            builder = builder.add_root_certificate(cert);
        }

        builder.build().map_err(|e| HttpError::Client(e.to_string()))
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, auth: &AuthConfig, timeout: Duration) -> Result<HttpResponse, HttpError> {
        let client = Self::build_client(auth, timeout).await?;

        let request = match auth.auth_type {
            AuthType::None => client.get(url),
            AuthType::Basic => client.get(url).basic_auth(&auth.username, Some(&auth.password)),
            AuthType::Bearer => client.get(url).bearer_auth(&auth.token),
        };

        let to_error = |e: reqwest::Error| {
            if e.is_timeout() {
                HttpError::Timeout {
                    url: url.to_string(),
                    secs: timeout.as_secs(),
                }
            } else {
                HttpError::Request {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let response = request.send().await.map_err(to_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(to_error)?.to_vec();

        tracing::debug!("GET {} -> {}", url, status);
        Ok(HttpResponse { status, body })
    }
}
