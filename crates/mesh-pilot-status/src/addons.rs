//! Addon reachability over HTTP
//!
//! Four addons are always checked concurrently: prometheus, grafana,
//! tracing and custom dashboards. A disabled addon is skipped inside its own
//! task so every run produces exactly four outcomes.

use crate::diagnostics::Diagnostic;
use futures::stream::{FuturesUnordered, StreamExt};
use mesh_pilot_core::{AddonsConfig, AuthConfig, ComponentStatus, ComponentStatusList, HttpClient, TokenProvider};
use std::time::Duration;

/// Timeout for each addon request
pub const ADDON_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to probe one addon
#[derive(Debug, Clone, PartialEq)]
pub struct AddonProbe {
    pub name: &'static str,
    pub enabled: bool,
    pub url: String,
    pub auth: AuthConfig,
    pub is_core: bool,
}

/// Result of probing one addon
#[derive(Debug, Clone, PartialEq)]
pub enum AddonOutcome {
    /// Disabled; nothing was called
    Skipped(&'static str),
    Reachable(&'static str),
    Unreachable(ComponentStatus),
}

impl AddonOutcome {
    pub fn into_status(self) -> Option<ComponentStatus> {
        match self {
            AddonOutcome::Unreachable(status) => Some(status),
            AddonOutcome::Skipped(_) | AddonOutcome::Reachable(_) => None,
        }
    }
}

/// Outcomes of one addon fan-out, in arrival order
#[derive(Debug, Clone, Default)]
pub struct AddonReport {
    pub outcomes: Vec<AddonOutcome>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AddonReport {
    pub fn statuses(&self) -> ComponentStatusList {
        self.outcomes
            .iter()
            .cloned()
            .filter_map(AddonOutcome::into_status)
            .collect()
    }
}

/// The four addon probes described by the configuration
///
/// Prometheus is always enabled and core. Custom dashboards reuse the main
/// Prometheus URL and auth unless they have a URL of their own.
pub fn addon_probes(addons: &AddonsConfig) -> [AddonProbe; 4] {
    let custom_prometheus = if addons.custom_dashboards.prometheus.url.is_empty() {
        &addons.prometheus
    } else {
        &addons.custom_dashboards.prometheus
    };

    [
        AddonProbe {
            name: "prometheus",
            enabled: true,
            url: addons.prometheus.url.clone(),
            auth: addons.prometheus.auth.clone(),
            is_core: true,
        },
        AddonProbe {
            name: "grafana",
            enabled: addons.grafana.enabled,
            url: addons.grafana.in_cluster_url.clone(),
            auth: addons.grafana.auth.clone(),
            is_core: addons.grafana.is_core,
        },
        AddonProbe {
            name: "jaeger",
            enabled: addons.tracing.enabled,
            url: addons.tracing.in_cluster_url.clone(),
            auth: addons.tracing.auth.clone(),
            is_core: addons.tracing.is_core,
        },
        AddonProbe {
            name: "custom dashboards",
            enabled: addons.custom_dashboards.enabled,
            url: custom_prometheus.url.clone(),
            auth: custom_prometheus.auth.clone(),
            is_core: addons.custom_dashboards.is_core,
        },
    ]
}

async fn probe_addon(
    tokens: &dyn TokenProvider,
    http: &dyn HttpClient,
    probe: AddonProbe,
) -> (AddonOutcome, Option<Diagnostic>) {
    if !probe.enabled {
        return (AddonOutcome::Skipped(probe.name), None);
    }

    let mut auth = probe.auth;
    let mut diagnostic = None;

    if auth.use_platform_token {
        match tokens.platform_token().await {
            Ok(token) => auth.token = token,
            Err(e) => {
                tracing::error!("Could not read the platform token for {}: {}", probe.name, e);
                auth.token = String::new();
                diagnostic = Some(Diagnostic::TokenUnavailable {
                    addon: probe.name.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    let reachable = match http.get(&probe.url, &auth, ADDON_PROBE_TIMEOUT).await {
        Ok(response) if response.status > 399 => {
            tracing::warn!("Addon {} answered {} at {}", probe.name, response.status, probe.url);
            false
        }
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Addon {} is unreachable: {}", probe.name, e);
            false
        }
    };

    let outcome = if reachable {
        AddonOutcome::Reachable(probe.name)
    } else {
        AddonOutcome::Unreachable(ComponentStatus::unreachable(probe.name, probe.is_core))
    };

    (outcome, diagnostic)
}

/// Probe all addons concurrently and wait for every one of them
pub async fn probe_addons(
    tokens: &dyn TokenProvider,
    http: &dyn HttpClient,
    addons: &AddonsConfig,
) -> AddonReport {
    let probes: FuturesUnordered<_> = addon_probes(addons)
        .into_iter()
        .map(|probe| probe_addon(tokens, http, probe))
        .collect();
    let results: Vec<_> = probes.collect().await;

    let mut report = AddonReport::default();
    for (outcome, diagnostic) in results {
        report.outcomes.push(outcome);
        report.diagnostics.extend(diagnostic);
    }
    report
}
