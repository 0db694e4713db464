use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::ConvertError;

/// Detector class id to feature class name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassMap(BTreeMap<u32, String>);

impl ClassMap {
    pub fn new(entries: impl IntoIterator<Item = (u32, String)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, class_id: u32) -> Option<&str> {
        self.0.get(&class_id).map(String::as_str)
    }
}

impl Default for ClassMap {
    fn default() -> Self {
        Self::new([
            (0, "room".to_string()),
            (1, "door".to_string()),
            (2, "window".to_string()),
        ])
    }
}

/// Fixed constants the anchor box is derived from. Width is not configurable:
/// it always follows the image aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Longitude of the left edge (degrees)
    pub left: f64,
    /// Latitude of the top edge (degrees)
    pub top: f64,
    /// Height of the anchor box (degrees)
    pub height: f64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            left: -0.01,
            top: 0.01,
            height: 0.02,
        }
    }
}

/// Label conversion configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub class_map: ClassMap,
    pub anchor: AnchorConfig,
}

impl ConverterConfig {
    /// Load a JSON config file; omitted fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConvertError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConvertError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| ConvertError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConvertError> {
        let anchor = &self.anchor;
        if !(anchor.height.is_finite() && anchor.height > 0.0) {
            return Err(ConvertError::Config(format!(
                "anchor height must be positive, got {}",
                anchor.height
            )));
        }
        if !anchor.left.is_finite() || !anchor.top.is_finite() {
            return Err(ConvertError::Config(
                "anchor left/top must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
