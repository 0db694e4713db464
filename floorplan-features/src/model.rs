use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::FeatureError;

/// `[longitude, latitude]`
pub type Position = [f64; 2];

/// Well-known values of the `class` property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureClass {
    Room,
    Door,
    Window,
    Wall,
    Outline,
}

impl FeatureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Room => "room",
            Self::Door => "door",
            Self::Window => "window",
            Self::Wall => "wall",
            Self::Outline => "outline",
        }
    }
}

impl std::fmt::Display for FeatureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GeoJSON geometry object, serialized as `{"type": ..., "coordinates": ...}`.
///
/// Geometries with planar `[lon, lat]` positions are typed. Anything else
/// (`GeometryCollection`, positions with altitude, members beyond
/// `coordinates`) is kept verbatim in [`Geometry::Other`] and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
    Other(Value),
}

impl Geometry {
    pub fn type_name(&self) -> &str {
        match self {
            Self::Point(_) => "Point",
            Self::MultiPoint(_) => "MultiPoint",
            Self::LineString(_) => "LineString",
            Self::MultiLineString(_) => "MultiLineString",
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
            Self::Other(value) => value.get("type").and_then(Value::as_str).unwrap_or("unknown"),
        }
    }
}

/// Wire form of the typed variants
#[derive(Deserialize)]
#[serde(tag = "type", content = "coordinates", deny_unknown_fields)]
enum PlanarGeometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

impl From<PlanarGeometry> for Geometry {
    fn from(geometry: PlanarGeometry) -> Self {
        match geometry {
            PlanarGeometry::Point(c) => Self::Point(c),
            PlanarGeometry::MultiPoint(c) => Self::MultiPoint(c),
            PlanarGeometry::LineString(c) => Self::LineString(c),
            PlanarGeometry::MultiLineString(c) => Self::MultiLineString(c),
            PlanarGeometry::Polygon(c) => Self::Polygon(c),
            PlanarGeometry::MultiPolygon(c) => Self::MultiPolygon(c),
        }
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        fn tagged<S: Serializer, C: Serialize>(
            serializer: S,
            type_name: &'static str,
            coordinates: &C,
        ) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("Geometry", 2)?;
            state.serialize_field("type", type_name)?;
            state.serialize_field("coordinates", coordinates)?;
            state.end()
        }

        match self {
            Self::Point(c) => tagged(serializer, "Point", c),
            Self::MultiPoint(c) => tagged(serializer, "MultiPoint", c),
            Self::LineString(c) => tagged(serializer, "LineString", c),
            Self::MultiLineString(c) => tagged(serializer, "MultiLineString", c),
            Self::Polygon(c) => tagged(serializer, "Polygon", c),
            Self::MultiPolygon(c) => tagged(serializer, "MultiPolygon", c),
            Self::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match PlanarGeometry::deserialize(&value) {
            Ok(planar) => planar.into(),
            Err(_) => Self::Other(value),
        })
    }
}

/// Feature properties: the `class` tag plus whatever else the input carried
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Properties {
    pub fn with_class(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum CollectionTag {
    #[default]
    FeatureCollection,
}

/// A tagged geometry. Members other than `type`, `properties` and
/// `geometry` (`id`, `bbox`, ...) are carried through load/save untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    tag: FeatureTag,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Properties,
    pub geometry: Option<Geometry>,
    #[serde(flatten)]
    pub foreign_members: Map<String, Value>,
}

impl Feature {
    pub fn new(class: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            tag: FeatureTag::Feature,
            properties: Properties::with_class(class),
            geometry: Some(geometry),
            foreign_members: Map::new(),
        }
    }

    pub fn class(&self) -> Option<&str> {
        self.properties.class.as_deref()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class() == Some(class)
    }

    /// Polygon geometry of this feature, if it has one
    pub fn polygon_rings(&self) -> Option<&Vec<Vec<Position>>> {
        match &self.geometry {
            Some(Geometry::Polygon(rings)) => Some(rings),
            _ => None,
        }
    }
}

/// Ordered collection of features. Unknown top-level members (`name`, `crs`,
/// ...) are carried through load/save untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    tag: CollectionTag,
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub foreign_members: Map<String, Value>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            tag: CollectionTag::FeatureCollection,
            features,
            foreign_members: Map::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features whose `class` property equals `class`
    pub fn with_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Feature> + 'a {
        self.features.iter().filter(move |f| f.has_class(class))
    }

    pub fn from_json_str(json: &str) -> Result<Self, FeatureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty JSON with 2-space indentation
    pub fn to_json_string(&self) -> Result<String, FeatureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, FeatureError> {
        let json = fs::read_to_string(path).map_err(|source| FeatureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let collection = Self::from_json_str(&json)?;
        debug!(
            "Loaded {} features from {}",
            collection.len(),
            path.display()
        );
        Ok(collection)
    }

    pub fn save(&self, path: &Path) -> Result<(), FeatureError> {
        let json = self.to_json_string()?;
        fs::write(path, json).map_err(|source| FeatureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote {} features to {}", self.len(), path.display());
        Ok(())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
