//! Mesh status service
//!
//! Runs the phases in order and concatenates their results:
//! deployment status, then control-plane reachability, then addons.

use crate::addons::probe_addons;
use crate::control_plane::{configured_components, deployment_status};
use crate::diagnostics::Diagnostic;
use crate::error::StatusError;
use crate::namespaces::resolve_namespaces;
use crate::reachability::control_plane_reachability;
use crate::workloads::collect_workloads;
use chrono::{DateTime, Utc};
use mesh_pilot_core::{ClusterClient, ComponentStatusList, HttpClient, MeshConfig, NamespaceCache, TokenProvider};
use serde::Serialize;
use std::sync::Arc;

/// External services the status computation talks to
#[derive(Clone)]
pub struct Collaborators {
    pub cluster: Arc<dyn ClusterClient>,
    pub cache: Arc<dyn NamespaceCache>,
    pub tokens: Arc<dyn TokenProvider>,
    pub http: Arc<dyn HttpClient>,
}

/// A status snapshot with the diagnostics gathered while building it
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Components that are not healthy; absent components are healthy
    pub statuses: ComponentStatusList,
    pub diagnostics: Vec<Diagnostic>,
    pub generated_at: DateTime<Utc>,
}

impl StatusReport {
    fn empty() -> Self {
        Self {
            statuses: ComponentStatusList::new(),
            diagnostics: Vec::new(),
            generated_at: Utc::now(),
        }
    }
}

/// Computes point-in-time mesh status
pub struct MeshStatusService {
    config: MeshConfig,
    collaborators: Collaborators,
}

impl MeshStatusService {
    pub fn new(config: MeshConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Status of every configured component that is not healthy
    pub async fn compute_status(&self) -> Result<ComponentStatusList, StatusError> {
        Ok(self.compute_report().await?.statuses)
    }

    /// Status plus diagnostics
    ///
    /// Returns an empty report without touching any collaborator when
    /// component statuses are disabled.
    pub async fn compute_report(&self) -> Result<StatusReport, StatusError> {
        if !self.config.component_statuses.enabled {
            tracing::debug!("Component statuses disabled, skipping");
            return Ok(StatusReport::empty());
        }

        let mut report = StatusReport::empty();
        let control_plane_ns = &self.config.istio_namespace;

        let namespaces = resolve_namespaces(&self.config);
        tracing::debug!("Listing workloads in {} namespace(s)", namespaces.len());
        let collected = collect_workloads(
            self.collaborators.cluster.as_ref(),
            self.collaborators.cache.as_ref(),
            &namespaces,
        )
        .await?;
        report.diagnostics.extend(collected.diagnostics);

        let components = configured_components(&self.config.component_statuses.components);
        let deployments = deployment_status(&collected.workloads, &components, control_plane_ns)?;

        let control_plane = control_plane_reachability(
            self.collaborators.cluster.as_ref(),
            control_plane_ns,
            &self.config.control_plane,
        )
        .await?;

        let addons = probe_addons(
            self.collaborators.tokens.as_ref(),
            self.collaborators.http.as_ref(),
            &self.config.addons,
        )
        .await;
        report.diagnostics.extend(addons.diagnostics.iter().cloned());

        report.statuses = deployments.merge(control_plane).merge(addons.statuses());
        report.generated_at = Utc::now();

        tracing::info!(
            "Mesh status computed: {} problem(s), {} diagnostic(s)",
            report.statuses.len(),
            report.diagnostics.len()
        );
        Ok(report)
    }
}
