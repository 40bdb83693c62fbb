//! Package Extract CLI
//!
//! Extracts registry metadata from an extracted package directory and prints
//! it as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use registry_metadata::config::OutputFormat;
use registry_metadata::{DirectoryArchive, MetadataConfig, MetadataExtractor};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "package-extract")]
#[command(about = "Extract registry metadata from a package directory")]
#[command(version)]
struct Cli {
    /// Path to the extracted package directory
    package: PathBuf,

    /// Config file to layer over the default locations
    #[arg(short, long)]
    config: Option<String>,

    /// Print compact JSON regardless of configuration
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = MetadataConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    let archive = DirectoryArchive::open(&cli.package, config.max_package_size_bytes())
        .with_context(|| format!("opening package {}", cli.package.display()))?;

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling extraction");
            on_interrupt.cancel();
        }
    });

    let package = MetadataExtractor::new()
        .extract(&archive, &cancellation)
        .await
        .with_context(|| format!("extracting {}", cli.package.display()))?;

    let format = if cli.compact {
        OutputFormat::Compact
    } else {
        config.output.format
    };

    let json = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(&package)?,
        OutputFormat::Compact => serde_json::to_string(&package)?,
    };
    println!("{}", json);

    Ok(())
}
