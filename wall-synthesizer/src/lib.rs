//! Derives wall geometry from the room polygons of a feature collection:
//! one wall ring per room, a building outline (union of all rooms) and an
//! exterior wall ring around that outline.

use floorplan_features::{FeatureCollection, FeatureError};
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub mod config;
pub mod engine;
pub mod synth;

pub use config::WallConfig;
pub use engine::{GeoEngine, GeometryEngine};
pub use synth::{ItemOutcome, RoomOutcome, SynthesisReport, WallSynthesizer};

/// Failure of a single geometry operation. Recoverable: the synthesizer turns
/// it into a [`ItemOutcome::Failed`] entry and carries on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("invalid geometry: {0}")]
    InvalidInput(String),

    #[error("non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[error("non-finite buffer distance {0}")]
    InvalidDistance(f64),
}

/// Hard failures: the collection could not be read or written, or the
/// configuration is unusable
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Load `input`, append walls and outline, write the result to `output`
pub fn synthesize_file(
    input: &Path,
    output: &Path,
    config: &WallConfig,
) -> Result<SynthesisReport, SynthesisError> {
    config.validate()?;

    let mut collection = FeatureCollection::load(input)?;
    let before = collection.len();

    let report = WallSynthesizer::new(config.clone()).synthesize(&mut collection);
    collection.save(output)?;

    info!(
        "Wrote {} features ({} added) to {}",
        collection.len(),
        collection.len() - before,
        output.display()
    );
    Ok(report)
}
