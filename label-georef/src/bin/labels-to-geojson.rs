// Convert YOLO segmentation + bounding-box labels for one image into GeoJSON
use anyhow::{Context, Result};
use clap::Parser;
use label_georef::{convert_files, ConverterConfig};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "labels-to-geojson", about = "Georeference YOLO labels as GeoJSON features")]
struct Args {
    /// Source image; only its pixel dimensions are read
    #[arg(long)]
    image: PathBuf,

    /// Segmentation label file (`class x1 y1 ... xn yn`)
    #[arg(long)]
    segmentation: PathBuf,

    /// Bounding-box label file (`class cx cy w h`)
    #[arg(long)]
    boxes: PathBuf,

    /// Output GeoJSON path
    #[arg(long, short)]
    output: PathBuf,

    /// JSON file overriding the class map or anchor constants
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConverterConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConverterConfig::default(),
    };

    let report = convert_files(
        &args.segmentation,
        &args.boxes,
        &args.image,
        &args.output,
        &config,
    )
    .context("Label conversion failed")?;

    for parse in [&report.segmentation, &report.boxes] {
        for skipped in &parse.skipped {
            if skipped.reason != label_georef::SkipReason::Blank {
                warn!(
                    "{} line {}: {}",
                    parse.kind.name(),
                    skipped.line_number,
                    skipped.reason
                );
            }
        }
    }

    info!(
        "Done: {} features, {} malformed lines",
        report.features_emitted(),
        report.malformed_lines()
    );
    Ok(())
}
