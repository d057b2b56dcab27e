//! Fake collaborators for engine tests

use async_trait::async_trait;
use mesh_pilot_core::{
    AuthConfig, ClusterClient, ClusterError, HttpClient, HttpError, HttpResponse, NamespaceCache,
    PodDescriptor, TokenError, TokenProvider, WorkloadDescriptor,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn workload(name: &str, app: &str, desired: i32, current: i32, available: i32) -> WorkloadDescriptor {
    WorkloadDescriptor {
        name: name.to_string(),
        namespace: String::new(),
        app_label: if app.is_empty() {
            None
        } else {
            Some(app.to_string())
        },
        desired_replicas: desired,
        current_replicas: current,
        available_replicas: available,
    }
}

pub fn pod(name: &str, phase: &str) -> PodDescriptor {
    PodDescriptor {
        name: name.to_string(),
        namespace: "istio-system".to_string(),
        phase: phase.to_string(),
    }
}

/// Cluster with canned answers; unknown namespaces have no workloads
pub struct FakeCluster {
    pub workloads: HashMap<String, Result<Vec<WorkloadDescriptor>, ClusterError>>,
    pub delays: HashMap<String, Duration>,
    pub pods: Result<Vec<PodDescriptor>, ClusterError>,
    pub unready_pods: HashSet<String>,
    pub proxy_delays: HashMap<String, Duration>,
    pub workload_calls: Mutex<Vec<String>>,
    pub completed_workload_calls: Mutex<Vec<String>>,
    pub pod_calls: Mutex<Vec<(String, String)>>,
    pub proxy_calls: Mutex<Vec<String>>,
    pub completed_proxy_calls: Mutex<Vec<String>>,
}

impl Default for FakeCluster {
    fn default() -> Self {
        Self {
            workloads: HashMap::new(),
            delays: HashMap::new(),
            pods: Ok(Vec::new()),
            unready_pods: HashSet::new(),
            proxy_delays: HashMap::new(),
            workload_calls: Mutex::new(Vec::new()),
            completed_workload_calls: Mutex::new(Vec::new()),
            pod_calls: Mutex::new(Vec::new()),
            proxy_calls: Mutex::new(Vec::new()),
            completed_proxy_calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeCluster {
    pub fn with_workloads(mut self, namespace: &str, workloads: Vec<WorkloadDescriptor>) -> Self {
        self.workloads.insert(namespace.to_string(), Ok(workloads));
        self
    }

    pub fn with_workload_error(mut self, namespace: &str, message: &str) -> Self {
        self.workloads
            .insert(namespace.to_string(), Err(ClusterError::Api(message.to_string())));
        self
    }

    pub fn with_delay(mut self, namespace: &str, delay: Duration) -> Self {
        self.delays.insert(namespace.to_string(), delay);
        self
    }

    pub fn with_pods(mut self, pods: Vec<PodDescriptor>) -> Self {
        self.pods = Ok(pods);
        self
    }

    pub fn with_unready_pod(mut self, name: &str) -> Self {
        self.unready_pods.insert(name.to_string());
        self
    }

    pub fn with_proxy_delay(mut self, pod: &str, delay: Duration) -> Self {
        self.proxy_delays.insert(pod.to_string(), delay);
        self
    }

    pub fn total_calls(&self) -> usize {
        self.workload_calls.lock().unwrap().len()
            + self.pod_calls.lock().unwrap().len()
            + self.proxy_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn list_workloads(&self, namespace: &str) -> Result<Vec<WorkloadDescriptor>, ClusterError> {
        self.workload_calls.lock().unwrap().push(namespace.to_string());
        if let Some(delay) = self.delays.get(namespace) {
            tokio::time::sleep(*delay).await;
        }
        self.completed_workload_calls
            .lock()
            .unwrap()
            .push(namespace.to_string());
        self.workloads
            .get(namespace)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PodDescriptor>, ClusterError> {
        self.pod_calls
            .lock()
            .unwrap()
            .push((namespace.to_string(), label_selector.to_string()));
        self.pods.clone()
    }

    async fn proxy_get(
        &self,
        _namespace: &str,
        pod: &str,
        port: u16,
        path: &str,
    ) -> Result<Vec<u8>, ClusterError> {
        self.proxy_calls
            .lock()
            .unwrap()
            .push(format!("{}:{}{}", pod, port, path));
        if let Some(delay) = self.proxy_delays.get(pod) {
            tokio::time::sleep(*delay).await;
        }
        self.completed_proxy_calls.lock().unwrap().push(pod.to_string());
        if self.unready_pods.contains(pod) {
            Err(ClusterError::Api("503 Service Unavailable".to_string()))
        } else {
            Ok(b"ready".to_vec())
        }
    }
}

/// Cache holding a fixed set of namespaces
#[derive(Default)]
pub struct FakeCache {
    pub cached: HashMap<String, Vec<WorkloadDescriptor>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCache {
    pub fn with_namespace(mut self, namespace: &str, workloads: Vec<WorkloadDescriptor>) -> Self {
        self.cached.insert(namespace.to_string(), workloads);
        self
    }
}

#[async_trait]
impl NamespaceCache for FakeCache {
    fn is_namespace_cached(&self, namespace: &str) -> bool {
        self.cached.contains_key(namespace)
    }

    async fn cached_workloads(&self, namespace: &str) -> Result<Vec<WorkloadDescriptor>, ClusterError> {
        self.calls.lock().unwrap().push(namespace.to_string());
        self.cached
            .get(namespace)
            .cloned()
            .ok_or_else(|| ClusterError::CacheUnavailable(namespace.to_string()))
    }
}

/// Token provider with a fixed answer
pub struct FakeTokens {
    pub token: Result<String, TokenError>,
    pub calls: AtomicUsize,
}

impl FakeTokens {
    pub fn ok(token: &str) -> Self {
        Self {
            token: Ok(token.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            token: Err(TokenError(message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for FakeTokens {
    async fn platform_token(&self) -> Result<String, TokenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token.clone()
    }
}

/// HTTP client answering 200 unless told otherwise
#[derive(Default)]
pub struct FakeHttp {
    pub responses: HashMap<String, Result<u16, HttpError>>,
    pub delays: HashMap<String, Duration>,
    pub requests: Mutex<Vec<(String, AuthConfig, Duration)>>,
}

impl FakeHttp {
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Ok(status));
        self
    }

    pub fn with_error(mut self, url: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            Err(HttpError::Request {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        );
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _, _)| url.clone())
            .collect()
    }

    pub fn auth_for(&self, url: &str) -> Option<AuthConfig> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _, _)| u == url)
            .map(|(_, auth, _)| auth.clone())
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn get(&self, url: &str, auth: &AuthConfig, timeout: Duration) -> Result<HttpResponse, HttpError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), auth.clone(), timeout));
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        let status = self.responses.get(url).cloned().unwrap_or(Ok(200))?;
        Ok(HttpResponse {
            status,
            body: Vec::new(),
        })
    }
}
