//! Replica-count health classification

use mesh_pilot_core::{Status, WorkloadDescriptor};

/// Classify a workload from its replica counts
///
/// Never returns `NotFound`; that is decided by whoever looked for the
/// workload and did not find it.
pub fn classify_replicas(desired: i32, current: i32, available: i32) -> Status {
    if desired == 0 {
        Status::NotReady
    } else if desired == available && desired == current {
        Status::Healthy
    } else {
        Status::Unhealthy
    }
}

pub fn classify_workload(workload: &WorkloadDescriptor) -> Status {
    classify_replicas(
        workload.desired_replicas,
        workload.current_replicas,
        workload.available_replicas,
    )
}
