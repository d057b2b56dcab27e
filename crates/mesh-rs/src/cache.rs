//! Namespace caches for deployments
//!
//! `WatchCache` keeps a reflector per namespace so status checks read from
//! memory instead of listing through the API server every time.

use crate::kube_cluster::workload_from_deployment;
use async_trait::async_trait;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    Api, Client,
    runtime::{WatchStreamExt, reflector, reflector::Store, watcher},
};
use mesh_pilot_core::{ClusterError, NamespaceCache, WorkloadDescriptor};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Cache that holds nothing; every namespace goes to the API server
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl NamespaceCache for NoCache {
    fn is_namespace_cached(&self, _namespace: &str) -> bool {
        false
    }

    async fn cached_workloads(&self, namespace: &str) -> Result<Vec<WorkloadDescriptor>, ClusterError> {
        Err(ClusterError::CacheUnavailable(namespace.to_string()))
    }
}

/// How long a cache read waits for the initial deployment list
pub const CACHE_SYNC_TIMEOUT: Duration = Duration::from_secs(30);

struct NamespaceWatch {
    store: Store<Deployment>,
    /// Most recent watch error; only consulted until the store is ready
    last_error: watch::Receiver<Option<String>>,
}

/// Reflector-backed deployment cache for a fixed set of namespaces
pub struct WatchCache {
    namespaces: HashMap<String, NamespaceWatch>,
    watchers: Vec<JoinHandle<()>>,
    sync_timeout: Duration,
}

impl WatchCache {
    /// Start one watcher per distinct namespace
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(client: Client, namespaces: &[String]) -> Self {
        let mut watches = HashMap::new();
        let mut watchers = Vec::new();

        for namespace in namespaces {
            if watches.contains_key(namespace) {
                continue;
            }

            let api: Api<Deployment> = Api::namespaced(client.clone(), namespace);
            let (reader, writer) = reflector::store();
            let stream = reflector(writer, watcher(api, watcher::Config::default()))
                .default_backoff()
                .applied_objects();
            let (errors, last_error) = watch::channel(None);

            let ns = namespace.clone();
            watchers.push(tokio::spawn(async move {
                stream
                    .for_each(|event| {
                        if let Err(e) = event {
                            tracing::warn!("Deployment watch in {} failed: {}", ns, e);
                            errors.send_replace(Some(e.to_string()));
                        }
                        futures::future::ready(())
                    })
                    .await;
            }));

            tracing::debug!("Watching deployments in {}", namespace);
            watches.insert(
                namespace.clone(),
                NamespaceWatch {
                    store: reader,
                    last_error,
                },
            );
        }

        Self {
            namespaces: watches,
            watchers,
            sync_timeout: CACHE_SYNC_TIMEOUT,
        }
    }

    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }
}

impl Drop for WatchCache {
    fn drop(&mut self) {
        for handle in &self.watchers {
            handle.abort();
        }
    }
}

/// Resolves once the watcher has reported an error
///
/// `None` means the watcher task is gone without ever failing.
async fn first_error(mut errors: watch::Receiver<Option<String>>) -> Option<String> {
    let error = errors.wait_for(Option::is_some).await.ok()?;
    error.clone()
}

#[async_trait]
impl NamespaceCache for WatchCache {
    fn is_namespace_cached(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    async fn cached_workloads(&self, namespace: &str) -> Result<Vec<WorkloadDescriptor>, ClusterError> {
        let unavailable = || ClusterError::CacheUnavailable(namespace.to_string());
        let watch = self.namespaces.get(namespace).ok_or_else(unavailable)?;

        // A ready store wins over any error seen before it synced
        let synced = tokio::time::timeout(self.sync_timeout, async {
            tokio::select! {
                biased;
                ready = watch.store.wait_until_ready() => ready.map_err(|_| unavailable()),
                error = first_error(watch.last_error.clone()) => Err(match error {
                    Some(message) => ClusterError::Api(message),
                    None => unavailable(),
                }),
            }
        })
        .await;

        match synced {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    "Deployment cache for {} did not sync within {:?}",
                    namespace,
                    self.sync_timeout
                );
                return Err(unavailable());
            }
        }

        Ok(watch
            .store
            .state()
            .iter()
            .map(|d| workload_from_deployment(d))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const FORBIDDEN: &str = r#"{"kind":"Status","apiVersion":"v1","metadata":{},"status":"Failure","message":"deployments.apps is forbidden: User \"system:serviceaccount:mesh:viewer\" cannot list resource \"deployments\" in API group \"apps\" in the namespace \"istio-system\"","reason":"Forbidden","code":403}"#;

    fn client_for(addr: std::net::SocketAddr) -> Client {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let config = kube::Config::new(format!("http://{}", addr).parse().unwrap());
        Client::try_from(config).unwrap()
    }

    /// API server that refuses every request with 403
    async fn serve_forbidden() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 403 Forbidden\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        FORBIDDEN.len(),
                        FORBIDDEN
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        addr
    }

    /// API server that accepts connections and never answers
    async fn serve_silence() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_forbidden_namespace_returns_api_error() {
        let addr = serve_forbidden().await;
        let cache = WatchCache::start(client_for(addr), &["istio-system".to_string()]);

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            cache.cached_workloads("istio-system"),
        )
        .await
        .expect("cached_workloads hung on a forbidden namespace");

        match result {
            Err(ClusterError::Api(message)) => assert!(message.contains("forbidden"), "{}", message),
            other => panic!("expected an API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unsynced_cache_gives_up_after_timeout() {
        let addr = serve_silence().await;
        let cache = WatchCache::start(client_for(addr), &["istio-system".to_string()])
            .with_sync_timeout(Duration::from_millis(200));

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            cache.cached_workloads("istio-system"),
        )
        .await
        .expect("cached_workloads ignored its sync timeout");

        assert_eq!(
            result,
            Err(ClusterError::CacheUnavailable("istio-system".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unknown_namespace_is_not_cached() {
        let addr = serve_silence().await;
        let cache = WatchCache::start(
            client_for(addr),
            &["istio-system".to_string(), "istio-system".to_string()],
        );

        assert!(cache.is_namespace_cached("istio-system"));
        assert!(!cache.is_namespace_cached("default"));
        assert_eq!(
            cache.cached_workloads("default").await,
            Err(ClusterError::CacheUnavailable("default".to_string()))
        );
    }

    #[tokio::test]
    async fn test_no_cache_caches_nothing() {
        let cache = NoCache;
        assert!(!cache.is_namespace_cached("istio-system"));
        assert_eq!(
            cache.cached_workloads("istio-system").await,
            Err(ClusterError::CacheUnavailable("istio-system".to_string()))
        );
    }
}
