//! Domain types for mesh-pilot
//!
//! These types describe a single status snapshot of the mesh. They are
//! built fresh on every computation and never persisted.

use serde::{Deserialize, Serialize};

/// Health classification of a mesh component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Healthy,
    NotFound,
    NotReady,
    Unhealthy,
    Unreachable,
}

impl Status {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Status::Healthy)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Healthy => "●",
            Status::NotReady | Status::Unhealthy => "◐",
            Status::NotFound | Status::Unreachable => "○",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Healthy => write!(f, "Healthy"),
            Status::NotFound => write!(f, "NotFound"),
            Status::NotReady => write!(f, "NotReady"),
            Status::Unhealthy => write!(f, "Unhealthy"),
            Status::Unreachable => write!(f, "Unreachable"),
        }
    }
}

/// Status record for one component
///
/// Only problems are reported: a component with no record is healthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Workload name, app label or pod name of the component
    pub name: String,
    pub status: Status,
    /// Whether the mesh needs this component to function (false for addons)
    pub is_core: bool,
}

impl ComponentStatus {
    pub fn new(name: impl Into<String>, status: Status, is_core: bool) -> Self {
        Self {
            name: name.into(),
            status,
            is_core,
        }
    }

    pub fn not_found(name: impl Into<String>, is_core: bool) -> Self {
        Self::new(name, Status::NotFound, is_core)
    }

    pub fn unreachable(name: impl Into<String>, is_core: bool) -> Self {
        Self::new(name, Status::Unreachable, is_core)
    }
}

/// Ordered list of component problems
///
/// Order is discovery order and carries no meaning, but merging keeps it.
/// Entries are not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentStatusList(Vec<ComponentStatus>);

impl ComponentStatusList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append `other` to the end of this list
    pub fn merge(mut self, other: ComponentStatusList) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn push(&mut self, status: ComponentStatus) {
        self.0.push(status);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComponentStatus> {
        self.0.iter()
    }

    /// Find the first record for a component name
    pub fn get(&self, name: &str) -> Option<&ComponentStatus> {
        self.0.iter().find(|s| s.name == name)
    }

    pub fn into_vec(self) -> Vec<ComponentStatus> {
        self.0
    }
}

impl From<Vec<ComponentStatus>> for ComponentStatusList {
    fn from(statuses: Vec<ComponentStatus>) -> Self {
        Self(statuses)
    }
}

impl FromIterator<ComponentStatus> for ComponentStatusList {
    fn from_iter<I: IntoIterator<Item = ComponentStatus>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ComponentStatus> for ComponentStatusList {
    fn extend<I: IntoIterator<Item = ComponentStatus>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ComponentStatusList {
    type Item = ComponentStatus;
    type IntoIter = std::vec::IntoIter<ComponentStatus>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ComponentStatusList {
    type Item = &'a ComponentStatus;
    type IntoIter = std::slice::Iter<'a, ComponentStatus>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Minimal view of a deployment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkloadDescriptor {
    pub name: String,
    pub namespace: String,
    /// Value of the `app` label on the pod template
    pub app_label: Option<String>,
    pub desired_replicas: i32,
    pub current_replicas: i32,
    pub available_replicas: i32,
}

/// Minimal view of a pod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodDescriptor {
    pub name: String,
    pub namespace: String,
    /// Pod phase (Running, Pending, etc.)
    pub phase: String,
}

impl PodDescriptor {
    pub fn is_running(&self) -> bool {
        self.phase == "Running"
    }
}
