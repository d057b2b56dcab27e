//! mesh-pilot: point-in-time health of a service-mesh control plane and its addons

use clap::{Parser, ValueEnum};
use color_eyre::Result;
use mesh_pilot_core::{MeshConfig, NamespaceCache};
use mesh_pilot_status::{Collaborators, MeshStatusService, StatusReport};
use mesh_rs::{KubeCluster, NoCache, ReqwestHttpClient, ServiceAccountTokenProvider, WatchCache};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt::writer::BoxMakeWriter, prelude::*};

/// mesh-pilot: mesh control plane and addon status
#[derive(Parser, Debug)]
#[command(name = "mesh-pilot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: <config dir>/mesh-pilot/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Kubeconfig context to use (default: current context or in-cluster)
    #[arg(short = 'c', long)]
    kubeconfig_context: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log file path (default: stderr)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Output::Json)]
    output: Output,

    /// Also print diagnostics in text output
    #[arg(long)]
    show_diagnostics: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    color_eyre::install()?;

    init_logging(cli.debug, cli.log_file.as_ref())?;

    tracing::info!("Starting mesh-pilot");

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Using config: {}", path.display());
            MeshConfig::load(path)?
        }
        None => MeshConfig::load_default()?,
    };

    // Install crypto provider (needed for rustls)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cluster = match &cli.kubeconfig_context {
        Some(ctx) => {
            tracing::info!("Using context: {}", ctx);
            KubeCluster::from_context(ctx).await?
        }
        None => KubeCluster::try_default().await?,
    };

    let cache: Arc<dyn NamespaceCache> = if config.cached_namespaces.is_empty() {
        Arc::new(NoCache)
    } else {
        Arc::new(WatchCache::start(
            cluster.client().clone(),
            &config.cached_namespaces,
        ))
    };

    let service = MeshStatusService::new(
        config,
        Collaborators {
            cluster: Arc::new(cluster),
            cache,
            tokens: Arc::new(ServiceAccountTokenProvider::default()),
            http: Arc::new(ReqwestHttpClient),
        },
    );

    let report = service.compute_report().await?;

    match cli.output {
        Output::Json => println!("{}", serde_json::to_string_pretty(&report.statuses)?),
        Output::Text => print!("{}", render_text(&report, cli.show_diagnostics)),
    }

    tracing::info!("Done");
    Ok(())
}

/// Log to a file when given, otherwise to stderr so stdout stays clean
fn init_logging(debug: bool, log_file: Option<&PathBuf>) -> Result<()> {
    // Build filter: set base level, but quiet down noisy HTTP/K8s libraries
    let filter = if debug {
        EnvFilter::from_default_env()
            .add_directive(Level::DEBUG.into())
            .add_directive("h2=info".parse()?)
            .add_directive("hyper=info".parse()?)
            .add_directive("hyper_util=info".parse()?)
            .add_directive("tower=info".parse()?)
            .add_directive("rustls=info".parse()?)
            .add_directive("kube_client=info".parse()?)
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    let (writer, ansi) = match log_file {
        Some(path) => (BoxMakeWriter::new(File::create(path)?), false),
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(false),
        )
        .with(filter)
        .init();

    Ok(())
}

/// One line per problem, then optional diagnostics
fn render_text(report: &StatusReport, show_diagnostics: bool) -> String {
    let mut out = String::new();

    if report.statuses.is_empty() {
        out.push_str("● All mesh components healthy\n");
    }

    for status in &report.statuses {
        out.push_str(&format!(
            "{} {:<32} {:<12} {}\n",
            status.status.symbol(),
            status.name,
            status.status.to_string(),
            if status.is_core { "core" } else { "addon" }
        ));
    }

    if show_diagnostics {
        for diagnostic in &report.diagnostics {
            out.push_str(&format!("! {}\n", diagnostic));
        }
    }

    out
}
