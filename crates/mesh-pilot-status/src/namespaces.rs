//! Namespaces to list workloads from

use mesh_pilot_core::MeshConfig;
use std::collections::BTreeSet;

/// Control-plane namespace plus every component namespace override
pub fn resolve_namespaces(config: &MeshConfig) -> BTreeSet<String> {
    let mut namespaces = BTreeSet::new();
    namespaces.insert(config.istio_namespace.clone());

    for component in &config.component_statuses.components {
        if !component.namespace.is_empty() {
            namespaces.insert(component.namespace.clone());
        }
    }

    namespaces
}
