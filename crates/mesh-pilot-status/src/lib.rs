//! mesh-pilot-status: concurrent mesh component status aggregation
//!
//! Computes a point-in-time answer to "which configured mesh components are
//! not working?" for a dashboard.
//!
//! The report only lists problems. A component that is healthy has no
//! record at all, and a `Healthy` status is never emitted. Consumers must
//! treat absence as health.
//!
//! Architecture:
//! - `namespaces.rs` - Namespaces to list workloads from
//! - `classify.rs` - Replica-count classification
//! - `workloads.rs` - Concurrent per-namespace workload listing
//! - `control_plane.rs` - Matching workloads to configured components
//! - `reachability.rs` - Control-plane pod readiness via the pod proxy
//! - `addons.rs` - Addon reachability over HTTP
//! - `service.rs` - Phase ordering and merging

pub mod addons;
pub mod classify;
pub mod control_plane;
pub mod diagnostics;
pub mod error;
pub mod namespaces;
pub mod reachability;
pub mod service;
pub mod workloads;

#[cfg(test)]
mod testing;

pub use addons::{ADDON_PROBE_TIMEOUT, AddonOutcome, AddonProbe, AddonReport};
pub use classify::{classify_replicas, classify_workload};
pub use diagnostics::Diagnostic;
pub use error::StatusError;
pub use service::{Collaborators, MeshStatusService, StatusReport};
