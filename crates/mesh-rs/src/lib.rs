//! mesh-rs: cluster, token and HTTP collaborators for mesh-pilot
//!
//! Implements the `mesh-pilot-core` collaborator traits on top of kube,
//! the mounted service account token and reqwest.

pub mod cache;
pub mod error;
pub mod http_client;
pub mod kube_cluster;
pub mod token;

pub use cache::{CACHE_SYNC_TIMEOUT, NoCache, WatchCache};
pub use error::K8sError;
pub use http_client::ReqwestHttpClient;
pub use kube_cluster::KubeCluster;
pub use token::{SERVICE_ACCOUNT_TOKEN_PATH, ServiceAccountTokenProvider};
