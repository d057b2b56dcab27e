//! Error types for mesh-rs

use thiserror::Error;

/// Errors that can occur when setting up the K8s client
#[derive(Error, Debug)]
pub enum K8sError {
    /// Failed to read kubeconfig
    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(String),

    /// Failed to create the client from a valid config
    #[error("Failed to create K8s client: {0}")]
    ClientCreate(String),
}
