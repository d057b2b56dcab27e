//! mesh-pilot-core: domain model and configuration for mesh-pilot
//!
//! Also defines the collaborator traits the status engine is built against.

pub mod config;
pub mod error;
pub mod ports;
pub mod types;

pub use config::*;
pub use error::{ClusterError, ConfigError, HttpError, TokenError};
pub use ports::{ClusterClient, HttpClient, HttpResponse, NamespaceCache, TokenProvider};
pub use types::*;
