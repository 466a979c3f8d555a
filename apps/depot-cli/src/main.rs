//! depot command-line client.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use depot_client::DepotClient;
use depot_protocol::FileEntry;
use tracing_subscriber::EnvFilter;

/// depot - list and download files from a depot server.
#[derive(Debug, Parser)]
#[command(name = "depot", version, about)]
struct Cli {
    /// Server address
    #[arg(short = 'a', long = "addr", default_value = "127.0.0.1:8888")]
    addr: SocketAddr,

    /// Download directory
    #[arg(short = 'o', long = "out", default_value = "downloads")]
    out: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List files available on the server
    List,
    /// Download one or more files
    Get {
        /// File names to download, in order
        #[arg(required = true, value_name = "FILES")]
        files: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let mut client = DepotClient::connect(cli.addr).await?;

    let result = match cli.command {
        Command::List => list(&mut client).await,
        Command::Get { files } => get(&mut client, &files, &cli.out).await,
    };

    match result {
        Ok(()) => {
            client.disconnect().await?;
            Ok(())
        }
        Err(e) => {
            // The connection may already be dead; the command error is
            // the one worth reporting.
            let _ = client.disconnect().await;
            Err(e)
        }
    }
}

async fn list(client: &mut DepotClient) -> anyhow::Result<()> {
    let files = client.list_files().await?;
    if files.is_empty() {
        println!("No files available on the server");
        return Ok(());
    }

    println!("\nAvailable files on server:");
    print_rule();
    println!(
        "{:<3} {:<30} {:<10} {:<15}",
        "#", "Filename", "Size (MB)", "Size (bytes)"
    );
    print_rule();
    for (i, FileEntry { name, size, size_mb }) in files.iter().enumerate() {
        println!("{:<3} {name:<30} {size_mb:<10} {size:<15}", i + 1);
    }
    print_rule();
    Ok(())
}

async fn get(client: &mut DepotClient, files: &[String], out: &PathBuf) -> anyhow::Result<()> {
    let report = if let [file] = files {
        let outcome = client
            .download(file, out, |p| {
                println!(
                    "Downloading {file} part {} .... {:.1}%",
                    p.chunk_number,
                    p.percent()
                );
            })
            .await?;
        depot_client::BatchReport {
            files: vec![outcome],
        }
    } else {
        client
            .download_all(files, out, |name, p| {
                println!(
                    "Downloading {name} part {} .... {:.1}%",
                    p.chunk_number,
                    p.percent()
                );
            })
            .await?
    };

    println!();
    for outcome in &report.files {
        match &outcome.error {
            None => println!("ok    {} ({} bytes)", outcome.name, outcome.bytes),
            Some(message) => println!("FAIL  {}: {message}", outcome.name),
        }
    }

    if !report.all_ok() {
        let failed = report.files.iter().filter(|f| !f.is_ok()).count();
        bail!("{failed} of {} files failed", report.files.len());
    }
    println!("All {} files downloaded to {}", report.files.len(), out.display());
    Ok(())
}

fn print_rule() {
    println!("{}", "-".repeat(60));
}
