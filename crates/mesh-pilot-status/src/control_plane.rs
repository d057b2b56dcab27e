//! Control-plane deployment status
//!
//! Matches listed workloads to configured components by `app` label and
//! reports the ones that are unhealthy or missing.

use crate::classify::classify_workload;
use crate::error::StatusError;
use mesh_pilot_core::{ComponentDefinition, ComponentStatus, ComponentStatusList, WorkloadDescriptor};
use std::collections::{BTreeMap, BTreeSet};

/// Configured components keyed by app label, with their core flag
///
/// A repeated app label keeps the last definition's flag.
pub fn configured_components(components: &[ComponentDefinition]) -> BTreeMap<String, bool> {
    components
        .iter()
        .map(|c| (c.app_label.clone(), c.is_core))
        .collect()
}

/// Report unhealthy and missing components
///
/// Healthy components produce no record. Fails when not a single configured
/// component was found, which points at a wrong control-plane namespace
/// rather than a mesh that is entirely down.
pub fn deployment_status<'a>(
    workloads: impl IntoIterator<Item = &'a WorkloadDescriptor>,
    components: &BTreeMap<String, bool>,
    control_plane_namespace: &str,
) -> Result<ComponentStatusList, StatusError> {
    let mut statuses = ComponentStatusList::new();
    let mut found = BTreeSet::new();

    for workload in workloads {
        let Some(app) = workload.app_label.as_deref() else {
            continue;
        };
        let Some(&is_core) = components.get(app) else {
            continue;
        };

        found.insert(app);

        let status = classify_workload(workload);
        if !status.is_healthy() {
            statuses.push(ComponentStatus::new(&workload.name, status, is_core));
        }
    }

    let mut not_found = 0;
    for (app, &is_core) in components {
        if !found.contains(app.as_str()) {
            not_found += 1;
            statuses.push(ComponentStatus::not_found(app, is_core));
        }
    }

    if not_found == components.len() {
        return Err(StatusError::NoComponentsFound {
            namespace: control_plane_namespace.to_string(),
        });
    }

    Ok(statuses)
}
