//! GeoJSON-compatible feature model shared by the label georeferencing and
//! wall synthesis tools.
//!
//! The two tools never share in-process state: one writes a
//! [`FeatureCollection`] to disk, the other reads it back. This crate owns that
//! file format.

use std::path::PathBuf;
use thiserror::Error;

pub mod geometry;
pub mod model;

pub use geometry::{multi_polygon_from_geometry, polygon_from_geometry};
pub use model::{Feature, FeatureClass, FeatureCollection, Geometry, Position, Properties};

/// Errors raised while reading, writing or converting feature collections
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GeoJSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported geometry type {found}, expected {expected}")]
    UnsupportedGeometry {
        found: String,
        expected: &'static str,
    },

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
}
