//! Configuration for mesh-pilot
//!
//! Loaded from YAML. Every field has a default so an empty file (or no file
//! at all) describes a stock Istio installation in `istio-system`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Namespace the control plane runs in
    pub istio_namespace: String,
    pub component_statuses: ComponentStatusesConfig,
    pub control_plane: ControlPlaneProbeConfig,
    /// Namespaces whose deployments are served from the watch cache
    pub cached_namespaces: Vec<String>,
    pub addons: AddonsConfig,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            istio_namespace: "istio-system".to_string(),
            component_statuses: ComponentStatusesConfig::default(),
            control_plane: ControlPlaneProbeConfig::default(),
            cached_namespaces: Vec::new(),
            addons: AddonsConfig::default(),
        }
    }
}

/// Which components to check, and whether to check at all
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentStatusesConfig {
    pub enabled: bool,
    pub components: Vec<ComponentDefinition>,
}

impl Default for ComponentStatusesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            components: vec![
                ComponentDefinition::new("istio-egressgateway", false),
                ComponentDefinition::new("istio-ingressgateway", true),
                ComponentDefinition::new("istiod", true),
            ],
        }
    }
}

/// A control-plane or gateway component, identified by its `app` label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub app_label: String,
    /// Empty means the control-plane namespace
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub is_core: bool,
}

impl ComponentDefinition {
    pub fn new(app_label: impl Into<String>, is_core: bool) -> Self {
        Self {
            app_label: app_label.into(),
            namespace: String::new(),
            is_core,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

/// Where to find control-plane pods and how to ask them for readiness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPlaneProbeConfig {
    /// Value of the `app` label on control-plane pods
    pub app_label: String,
    pub readiness_port: u16,
    pub readiness_path: String,
}

impl Default for ControlPlaneProbeConfig {
    fn default() -> Self {
        Self {
            app_label: "istiod".to_string(),
            readiness_port: 8080,
            readiness_path: "/ready".to_string(),
        }
    }
}

impl ControlPlaneProbeConfig {
    /// Label selector for control-plane pods
    pub fn label_selector(&self) -> String {
        format!("app={}", self.app_label)
    }
}

/// Optional services probed over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonsConfig {
    pub prometheus: PrometheusConfig,
    pub grafana: AddonConfig,
    pub tracing: AddonConfig,
    pub custom_dashboards: CustomDashboardsConfig,
}

impl Default for AddonsConfig {
    fn default() -> Self {
        Self {
            prometheus: PrometheusConfig::default(),
            grafana: AddonConfig::new("http://grafana.istio-system:3000"),
            tracing: AddonConfig::new("http://tracing.istio-system:16685/jaeger"),
            custom_dashboards: CustomDashboardsConfig::default(),
        }
    }
}

/// Metrics backend. Always probed and always core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrometheusConfig {
    pub url: String,
    pub auth: AuthConfig,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            url: "http://prometheus.istio-system:9090".to_string(),
            auth: AuthConfig::default(),
        }
    }
}

/// Grafana or tracing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonConfig {
    pub enabled: bool,
    pub in_cluster_url: String,
    pub is_core: bool,
    pub auth: AuthConfig,
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self::new("")
    }
}

impl AddonConfig {
    fn new(in_cluster_url: &str) -> Self {
        Self {
            enabled: true,
            in_cluster_url: in_cluster_url.to_string(),
            is_core: false,
            auth: AuthConfig::default(),
        }
    }
}

/// Custom dashboards, backed by their own Prometheus or the main one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomDashboardsConfig {
    pub enabled: bool,
    pub is_core: bool,
    pub prometheus: PrometheusConfig,
}

impl Default for CustomDashboardsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            is_core: false,
            prometheus: PrometheusConfig {
                url: String::new(),
                auth: AuthConfig::default(),
            },
        }
    }
}

/// Authentication scheme for an addon endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    None,
    Basic,
    Bearer,
}

/// Credentials and TLS settings for an addon endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(rename = "type")]
    pub auth_type: AuthType,
    pub username: String,
    pub password: String,
    pub token: String,
    /// Replace `token` with the token issued to this process by the platform
    pub use_platform_token: bool,
    pub insecure_skip_verify: bool,
    pub ca_file: Option<PathBuf>,
}

impl MeshConfig {
    /// Load configuration from an explicit path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load from the default location, or fall back to built-in defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Default config path (~/.config/mesh-pilot/config.yaml on Linux)
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs_next::config_dir().ok_or(ConfigError::NoConfigDirectory)?;
        Ok(dir.join("mesh-pilot").join("config.yaml"))
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a map
        let config: MeshConfig = if yaml.trim().is_empty() {
            MeshConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.istio_namespace.trim().is_empty() {
            return Err(ConfigError::ConfigInvalid(
                "istio_namespace must not be empty".to_string(),
            ));
        }

        if let Some(c) = self
            .component_statuses
            .components
            .iter()
            .find(|c| c.app_label.trim().is_empty())
        {
            return Err(ConfigError::ConfigInvalid(format!(
                "component with namespace '{}' has an empty app_label",
                c.namespace
            )));
        }

        if self.control_plane.readiness_port == 0 {
            return Err(ConfigError::ConfigInvalid(
                "control_plane.readiness_port must not be 0".to_string(),
            ));
        }

        Ok(())
    }
}
