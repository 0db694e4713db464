use floorplan_features::FeatureClass;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::SynthesisError;

/// Wall synthesis parameters. Thicknesses are in the same units as the
/// feature coordinates (anchor-box degrees).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    /// Buffer distance for the ring around each room
    pub interior_thickness: f64,
    /// Buffer distance for the ring around the building outline
    pub exterior_thickness: f64,
    pub room_class: String,
    pub wall_class: String,
    pub outline_class: String,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            interior_thickness: 0.0001,
            exterior_thickness: 0.0002,
            room_class: FeatureClass::Room.as_str().to_string(),
            wall_class: FeatureClass::Wall.as_str().to_string(),
            outline_class: FeatureClass::Outline.as_str().to_string(),
        }
    }
}

impl WallConfig {
    /// Load a JSON config file; omitted fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, SynthesisError> {
        let text = std::fs::read_to_string(path).map_err(|source| SynthesisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| SynthesisError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SynthesisError> {
        for (name, value) in [
            ("interior_thickness", self.interior_thickness),
            ("exterior_thickness", self.exterior_thickness),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SynthesisError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
