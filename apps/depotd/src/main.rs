//! depotd entry point.

mod config;

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use depot_server::{DepotServer, ServerConfig, samples};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// depotd - serve a directory of files over the depot protocol.
#[derive(Debug, Parser)]
#[command(name = "depotd", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short = 'b', long = "bind")]
    bind: Option<IpAddr>,

    /// Port to listen on (0 = OS-assigned)
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,

    /// Directory of served files
    #[arg(long = "root", value_name = "DIR")]
    root: Option<PathBuf>,

    /// Maximum bytes per chunk
    #[arg(long = "chunk-size", value_name = "BYTES")]
    chunk_size: Option<u64>,

    /// Create sample files in the serve root before starting
    #[arg(long = "seed")]
    seed: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting depotd");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config, cli.seed))?;

    tracing::info!("depotd shut down cleanly");
    Ok(())
}

async fn run(config: Config, seed: bool) -> anyhow::Result<()> {
    if seed {
        let created = samples::seed(&config.root).await?;
        if !created.is_empty() {
            tracing::info!(count = created.len(), "seeded sample files");
        }
    }

    let server = Arc::new(
        DepotServer::bind(ServerConfig {
            bind: config.bind,
            port: config.port,
            root: config.root,
            chunk_size: config.chunk_size,
            buffer_size: config.buffer_size,
        })
        .await?,
    );

    let runner = Arc::clone(&server);
    let handle = tokio::spawn(async move { runner.run().await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, shutting down");
    server.shutdown();

    handle.await??;
    Ok(())
}
