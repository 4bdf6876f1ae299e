//! WireGuard Prometheus Exporter
//!
//! Serves WireGuard peer statistics on an HTTP metrics endpoint.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};
use wireguard_exporter::{
    config::FileConfig,
    metrics::{MetricsServer, WireguardCollector},
};

/// Command-line arguments. Flags override values from the config file.
#[derive(Debug, Parser)]
#[command(name = "wireguard-exporter", version, about)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to serve metrics on.
    #[arg(short, long)]
    listen_address: Option<SocketAddr>,

    /// Path or name of the `wg` binary.
    #[arg(long)]
    wg_binary: Option<String>,

    /// Timeout for a single `wg` invocation, in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl Args {
    fn load_config(&self) -> Result<FileConfig, wireguard_exporter::ConfigError> {
        let mut config = match &self.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };

        if let Some(addr) = self.listen_address {
            config.server.listen_addr = addr;
        }
        if let Some(program) = &self.wg_binary {
            config.command.program = program.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.command.timeout_ms = timeout_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("WireGuard Exporter v{}", wireguard_exporter::VERSION);
    info!(
        program = %config.command.program,
        timeout_ms = config.command.timeout_ms,
        skip_first_line = config.command.skip_first_line,
        "Collecting from wg"
    );

    let collector = WireguardCollector::new(config.wg_command(), config.dump_options());
    let server = MetricsServer::new(config.server_config(), collector);

    if let Err(e) = server.run(shutdown_signal()).await {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Shut down");
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
