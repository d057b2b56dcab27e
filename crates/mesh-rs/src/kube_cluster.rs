//! Kubernetes-backed cluster client
//!
//! Lists deployments and pods, and reaches pods through the API server's
//! pod proxy so no direct route to pod IPs is needed.

use crate::error::K8sError;
use async_trait::async_trait;
use k8s_openapi::api::{apps::v1::Deployment, core::v1::Pod};
use kube::{
    Client, Config,
    api::{Api, ListParams},
    config::KubeConfigOptions,
};
use mesh_pilot_core::{ClusterClient, ClusterError, PodDescriptor, WorkloadDescriptor};

/// Label read from the pod template to identify a component
pub const APP_LABEL: &str = "app";

/// Cluster client over the K8s API
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the default kubeconfig or the in-cluster environment
    pub async fn try_default() -> Result<Self, K8sError> {
        let client = Client::try_default()
            .await
            .map_err(|e| K8sError::ClientCreate(e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Connect using a named context from the default kubeconfig
    pub async fn from_context(context: &str) -> Result<Self, K8sError> {
        let options = KubeConfigOptions {
            context: Some(context.to_string()),
            ..Default::default()
        };
        let config = Config::from_kubeconfig(&options)
            .await
            .map_err(|e| K8sError::Kubeconfig(e.to_string()))?;
        let client = Client::try_from(config).map_err(|e| K8sError::ClientCreate(e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Underlying client, shared with the watch cache
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ClusterClient for KubeCluster {
    async fn list_workloads(&self, namespace: &str) -> Result<Vec<WorkloadDescriptor>, ClusterError> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);

        let list = deployments
            .list(&ListParams::default())
            .await
            .map_err(|e| ClusterError::Api(e.to_string()))?;

        Ok(list.items.iter().map(workload_from_deployment).collect())
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PodDescriptor>, ClusterError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);

        let list = pods
            .list(&ListParams::default().labels(label_selector))
            .await
            .map_err(|e| ClusterError::Api(e.to_string()))?;

        Ok(list.items.iter().map(pod_descriptor).collect())
    }

    async fn proxy_get(
        &self,
        namespace: &str,
        pod: &str,
        port: u16,
        path: &str,
    ) -> Result<Vec<u8>, ClusterError> {
        let request = http::Request::get(pod_proxy_path(namespace, pod, port, path))
            .body(Vec::new())
            .map_err(|e| ClusterError::Api(e.to_string()))?;

        // request_text turns 4xx and 5xx answers into errors
        let body = self
            .client
            .request_text(request)
            .await
            .map_err(|e| ClusterError::Api(e.to_string()))?;

        Ok(body.into_bytes())
    }
}

/// API server path that proxies a GET to `port` on a pod
pub fn pod_proxy_path(namespace: &str, pod: &str, port: u16, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    format!(
        "/api/v1/namespaces/{}/pods/{}:{}/proxy{}",
        namespace, pod, port, path
    )
}

/// Map a deployment to the fields the status engine needs
pub fn workload_from_deployment(deployment: &Deployment) -> WorkloadDescriptor {
    let spec = deployment.spec.as_ref();
    let status = deployment.status.as_ref();

    let app_label = spec
        .and_then(|s| s.template.metadata.as_ref())
        .and_then(|m| m.labels.as_ref())
        .and_then(|labels| labels.get(APP_LABEL))
        .filter(|v| !v.is_empty())
        .cloned();

    WorkloadDescriptor {
        name: deployment.metadata.name.clone().unwrap_or_default(),
        namespace: deployment.metadata.namespace.clone().unwrap_or_default(),
        app_label,
        desired_replicas: spec.and_then(|s| s.replicas).unwrap_or(0),
        current_replicas: status.and_then(|s| s.replicas).unwrap_or(0),
        available_replicas: status.and_then(|s| s.available_replicas).unwrap_or(0),
    }
}

/// Map a pod to name, namespace and phase
pub fn pod_descriptor(pod: &Pod) -> PodDescriptor {
    let phase = pod
        .status
        .as_ref()
        .and_then(|s| s.phase.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    PodDescriptor {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        phase,
    }
}
