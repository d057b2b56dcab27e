//! Workload collection across namespaces
//!
//! One concurrent fetch per namespace. Every fetch runs to completion; only
//! then is any failure reported, and a single failure fails the whole
//! collection.

use crate::diagnostics::Diagnostic;
use futures::stream::{FuturesUnordered, StreamExt};
use mesh_pilot_core::{ClusterClient, ClusterError, NamespaceCache, WorkloadDescriptor};
use std::collections::BTreeSet;

/// Workloads from every namespace, flattened in arrival order
#[derive(Debug, Clone, Default)]
pub struct CollectedWorkloads {
    pub workloads: Vec<WorkloadDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

struct NamespaceFetch {
    result: Result<Vec<WorkloadDescriptor>, ClusterError>,
    diagnostic: Option<Diagnostic>,
}

async fn fetch_namespace(
    cluster: &dyn ClusterClient,
    cache: &dyn NamespaceCache,
    namespace: &str,
) -> NamespaceFetch {
    if cache.is_namespace_cached(namespace) {
        return NamespaceFetch {
            result: cache.cached_workloads(namespace).await,
            diagnostic: None,
        };
    }

    let diagnostic = Diagnostic::UncachedNamespace {
        namespace: namespace.to_string(),
    };
    tracing::warn!("{}", diagnostic);

    NamespaceFetch {
        result: cluster.list_workloads(namespace).await,
        diagnostic: Some(diagnostic),
    }
}

/// Fetch workloads from all namespaces concurrently
pub async fn collect_workloads(
    cluster: &dyn ClusterClient,
    cache: &dyn NamespaceCache,
    namespaces: &BTreeSet<String>,
) -> Result<CollectedWorkloads, ClusterError> {
    let fetches: FuturesUnordered<_> = namespaces
        .iter()
        .map(|ns| fetch_namespace(cluster, cache, ns))
        .collect();
    let fetched: Vec<NamespaceFetch> = fetches.collect().await;

    let mut collected = CollectedWorkloads::default();
    let mut first_error = None;

    for fetch in fetched {
        collected.diagnostics.extend(fetch.diagnostic);
        match fetch.result {
            Ok(workloads) => collected.workloads.extend(workloads),
            Err(e) => {
                tracing::error!("Failed to list workloads: {}", e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(collected),
    }
}
