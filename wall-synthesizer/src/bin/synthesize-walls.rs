// Add interior walls, exterior wall and building outline to a GeoJSON floorplan
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use wall_synthesizer::{synthesize_file, ItemOutcome, WallConfig};

#[derive(Debug, Parser)]
#[command(name = "synthesize-walls", about = "Derive wall rings and building outline from room polygons")]
struct Args {
    /// GeoJSON feature collection with room polygons
    #[arg(long, short)]
    input: PathBuf,

    /// Where to write the augmented collection
    #[arg(long, short)]
    output: PathBuf,

    /// JSON file with wall settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `interior_thickness` from the config
    #[arg(long)]
    interior_thickness: Option<f64>,

    /// Overrides `exterior_thickness` from the config
    #[arg(long)]
    exterior_thickness: Option<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WallConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => WallConfig::default(),
    };
    if let Some(thickness) = args.interior_thickness {
        config.interior_thickness = thickness;
    }
    if let Some(thickness) = args.exterior_thickness {
        config.exterior_thickness = thickness;
    }

    let report = synthesize_file(&args.input, &args.output, &config)
        .with_context(|| format!("Wall synthesis failed for {}", args.input.display()))?;

    for room in &report.rooms {
        if let ItemOutcome::Failed(reason) = &room.outcome {
            warn!("Room feature {} has no wall: {}", room.feature_index, reason);
        }
    }

    info!(
        "Done: {} walls added, outline {:?}, {} failures",
        report.walls_added(),
        report.outline,
        report.failures()
    );
    Ok(())
}
