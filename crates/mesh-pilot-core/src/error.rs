//! Error types for mesh-pilot-core

use thiserror::Error;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    /// Failed to parse configuration
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    ConfigInvalid(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No config directory found
    #[error("Could not determine config directory")]
    NoConfigDirectory,
}

/// Errors returned by the cluster client and the namespace cache
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    /// K8s API error
    #[error("K8s API error: {0}")]
    Api(String),

    /// The cache for a namespace could not serve a read
    #[error("Cache for namespace {0} is unavailable")]
    CacheUnavailable(String),
}

/// Error fetching the platform-issued token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not read platform token: {0}")]
pub struct TokenError(pub String);

/// Errors returned by the HTTP client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Client could not be built (bad CA file, TLS setup)
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// Request failed before a status code was received
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// No response within the timeout
    #[error("Request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },
}
