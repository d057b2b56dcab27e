//! Error types for the status engine

use mesh_pilot_core::ClusterError;
use thiserror::Error;

/// Errors that abort a status computation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// Listing workloads or control-plane pods failed
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// None of the configured components exist; the namespace is likely wrong
    #[error(
        "Unable to find any mesh deployment in namespace {namespace}. Is the control-plane namespace configured correctly?"
    )]
    NoComponentsFound { namespace: String },
}
