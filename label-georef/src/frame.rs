use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::AnchorConfig;
use crate::ConvertError;
use floorplan_features::Position;

/// Pixel dimensions of the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
}

impl ImageFrame {
    pub fn new(width: u32, height: u32) -> Result<Self, ConvertError> {
        if width == 0 || height == 0 {
            return Err(ConvertError::InvalidFrame { width, height });
        }
        Ok(Self { width, height })
    }

    /// Read dimensions from the image header. Pixel data is never decoded.
    pub fn from_image_path(path: &Path) -> Result<Self, ConvertError> {
        let (width, height) =
            image::image_dimensions(path).map_err(|source| ConvertError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(width, height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Scale a normalized `[0, 1]` coordinate pair to pixel space
    pub fn denormalize(&self, u: f64, v: f64) -> (f64, f64) {
        (u * self.width as f64, v * self.height as f64)
    }
}

/// Synthetic geographic rectangle that pixel space is stretched onto
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoAnchorBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl GeoAnchorBox {
    /// Anchor with the configured height and a width that keeps the image
    /// aspect ratio
    pub fn for_frame(frame: &ImageFrame, config: &AnchorConfig) -> Self {
        Self {
            left: config.left,
            top: config.top,
            width: config.height * frame.aspect_ratio(),
            height: config.height,
        }
    }
}

/// Map a pixel coordinate (origin top-left, y down) to `[lon, lat]`.
///
/// Latitude grows upward, so the y term is subtracted from the top edge.
pub fn pixel_to_lonlat(x: f64, y: f64, frame: &ImageFrame, anchor: &GeoAnchorBox) -> Position {
    let lon = anchor.left + (x / frame.width as f64) * anchor.width;
    let lat = anchor.top - (y / frame.height as f64) * anchor.height;
    [lon, lat]
}
