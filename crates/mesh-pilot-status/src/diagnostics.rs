//! Non-fatal findings reported next to the status list

use serde::Serialize;

/// Something worth telling an operator that did not change the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Workloads were listed straight from the API server
    UncachedNamespace { namespace: String },
    /// The platform token could not be fetched; the probe ran without it
    TokenUnavailable { addon: String, error: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UncachedNamespace { namespace } => write!(
                f,
                "Namespace {} is not cached; listing deployments directly is expensive and \
                 yields an incomplete status if access to it is denied",
                namespace
            ),
            Diagnostic::TokenUnavailable { addon, error } => {
                write!(f, "Probing {} without platform token: {}", addon, error)
            }
        }
    }
}
