//! vrm-export - VRM buffer export tool
//!
//! Packs raw little-endian attribute streams (positions, morph target deltas,
//! indices, ...) described by a TOML manifest into a GLB, writing mostly-zero
//! float VEC3 streams as sparse accessors.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vrm_export::{load_manifest, pack_manifest, validate, write_glb};

#[derive(Parser)]
#[command(name = "vrm-export")]
#[command(about = "VRM buffer/accessor export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack all streams of a manifest into a GLB
    Pack {
        /// Path to streams.toml manifest
        #[arg(default_value = "streams.toml")]
        manifest: PathBuf,

        /// Output GLB file (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without packing
    Check {
        /// Path to streams.toml manifest
        #[arg(default_value = "streams.toml")]
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match &cli.command {
        Commands::Pack { verbose: true, .. } => tracing::Level::DEBUG,
        _ => tracing::Level::INFO,
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Commands::Pack {
            manifest, output, ..
        } => {
            tracing::info!("Packing streams from {:?}", manifest);
            let config = load_manifest(&manifest)?;
            let report = pack_manifest(&config)?;
            let output = output.unwrap_or_else(|| config.output.path.clone());
            write_glb(&report.session, &output, &config.output.generator)?;

            let sparse = report
                .streams
                .iter()
                .filter(|s| s.sparse_count.is_some())
                .count();
            tracing::info!(
                "Pack complete: {} accessors ({} sparse)",
                report.streams.len(),
                sparse
            );
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = load_manifest(&manifest)?;
            validate(&config)?;
            tracing::info!("Manifest is valid!");
        }
    }

    Ok(())
}
