//! Collaborator interfaces consumed by the status engine
//!
//! Production implementations live in `mesh-rs`; tests substitute fakes.

use crate::config::AuthConfig;
use crate::error::{ClusterError, HttpError, TokenError};
use crate::types::{PodDescriptor, WorkloadDescriptor};
use async_trait::async_trait;
use std::time::Duration;

/// Read access to the cluster API
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// List deployments in a namespace
    async fn list_workloads(&self, namespace: &str) -> Result<Vec<WorkloadDescriptor>, ClusterError>;

    /// List pods in a namespace matching a label selector (e.g. `app=istiod`)
    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PodDescriptor>, ClusterError>;

    /// GET `path` on a pod port through the API server's pod proxy
    ///
    /// Fails on transport errors and on non-success responses.
    async fn proxy_get(
        &self,
        namespace: &str,
        pod: &str,
        port: u16,
        path: &str,
    ) -> Result<Vec<u8>, ClusterError>;
}

/// Namespace-level read cache of workloads
#[async_trait]
pub trait NamespaceCache: Send + Sync {
    fn is_namespace_cached(&self, namespace: &str) -> bool;

    async fn cached_workloads(&self, namespace: &str) -> Result<Vec<WorkloadDescriptor>, ClusterError>;
}

/// Source of the token the platform issued to this process
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn platform_token(&self) -> Result<String, TokenError>;
}

/// Response from an HTTP GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Plain HTTP GET with authentication and a timeout
///
/// Non-success status codes are returned as responses, not errors.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, auth: &AuthConfig, timeout: Duration) -> Result<HttpResponse, HttpError>;
}
