//! Control-plane reachability through the API server pod proxy
//!
//! Replica counts say a control-plane pod exists; this asks the pod itself.
//! The request goes through the API server rather than to the pod IP, since
//! pod IPs are not routable from everywhere (private clusters) while the API
//! server is reachable whenever the cluster API is.

use futures::stream::{FuturesUnordered, StreamExt};
use mesh_pilot_core::{ClusterClient, ClusterError, ComponentStatus, ComponentStatusList, ControlPlaneProbeConfig};

/// Probe every Running control-plane pod; unreachable pods get a record
///
/// Pods in any other phase are not probed and produce no record.
pub async fn control_plane_reachability(
    cluster: &dyn ClusterClient,
    namespace: &str,
    probe: &ControlPlaneProbeConfig,
) -> Result<ComponentStatusList, ClusterError> {
    let pods = cluster.list_pods(namespace, &probe.label_selector()).await?;

    let running: Vec<_> = pods.iter().filter(|p| p.is_running()).collect();
    if running.len() < pods.len() {
        tracing::debug!(
            "Skipping {} control-plane pod(s) that are not Running",
            pods.len() - running.len()
        );
    }

    let checks: FuturesUnordered<_> = running
        .into_iter()
        .map(|pod| async move {
            match cluster
                .proxy_get(namespace, &pod.name, probe.readiness_port, &probe.readiness_path)
                .await
            {
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!("Control-plane pod {} is unreachable: {}", pod.name, e);
                    Some(ComponentStatus::unreachable(&pod.name, true))
                }
            }
        })
        .collect();

    let results: Vec<Option<ComponentStatus>> = checks.collect().await;
    Ok(results.into_iter().flatten().collect())
}
