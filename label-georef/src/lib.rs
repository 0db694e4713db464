//! Converts YOLO-style detection labels (normalized segmentation polygons and
//! bounding boxes) into a geo-referenced feature collection.
//!
//! Pixel coordinates are anchored to a synthetic geographic rectangle whose
//! aspect ratio matches the source image. The anchor is not a real geodetic
//! reference; it only gives downstream GIS tooling a consistent frame.

use floorplan_features::FeatureError;
use std::path::PathBuf;
use thiserror::Error;

pub mod config;
pub mod converter;
pub mod frame;
pub mod parser;
pub mod simplify;

pub use config::{AnchorConfig, ClassMap, ConverterConfig};
pub use converter::{convert, convert_files, read_label_source, ConversionReport};
pub use frame::{pixel_to_lonlat, GeoAnchorBox, ImageFrame};
pub use parser::{
    parse_bounding_boxes, parse_segmentation, LabelKind, ParseOutcome, ParseReport, SkipReason,
    SkippedLine,
};
pub use simplify::orthogonalize;

/// Hard failures of a conversion run. Malformed label lines never end up here;
/// they are reported through [`ParseReport`].
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read image dimensions from {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid image frame {width}x{height}: dimensions must be positive")]
    InvalidFrame { width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Feature(#[from] FeatureError),
}
