//! Conversions between GeoJSON geometries and `geo` types.

use geo::{Coord, LineString, MultiPolygon, Point, Polygon};

use crate::model::{Geometry, Position};
use crate::FeatureError;

fn position(coord: Coord<f64>) -> Position {
    [coord.x, coord.y]
}

fn ring_positions(ring: &LineString<f64>) -> Vec<Position> {
    ring.coords().map(|c| position(*c)).collect()
}

fn polygon_positions(polygon: &Polygon<f64>) -> Vec<Vec<Position>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_positions)
        .collect()
}

impl From<&Point<f64>> for Geometry {
    fn from(point: &Point<f64>) -> Self {
        Geometry::Point(position(point.0))
    }
}

impl From<&Polygon<f64>> for Geometry {
    fn from(polygon: &Polygon<f64>) -> Self {
        Geometry::Polygon(polygon_positions(polygon))
    }
}

/// Single-part results are written as `Polygon`, anything else as `MultiPolygon`
impl From<&MultiPolygon<f64>> for Geometry {
    fn from(multi: &MultiPolygon<f64>) -> Self {
        match multi.0.as_slice() {
            [single] => Geometry::from(single),
            parts => Geometry::MultiPolygon(parts.iter().map(polygon_positions).collect()),
        }
    }
}

fn ring_from_positions(positions: &[Position]) -> Result<LineString<f64>, FeatureError> {
    if positions.is_empty() {
        return Err(FeatureError::InvalidCoordinates("empty ring".to_string()));
    }
    if let Some(bad) = positions.iter().find(|p| !p[0].is_finite() || !p[1].is_finite()) {
        return Err(FeatureError::InvalidCoordinates(format!(
            "non-finite position [{}, {}]",
            bad[0], bad[1]
        )));
    }

    Ok(positions
        .iter()
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect())
}

fn polygon_from_rings(rings: &[Vec<Position>]) -> Result<Polygon<f64>, FeatureError> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| FeatureError::InvalidCoordinates("polygon has no rings".to_string()))?;

    let interiors = interiors
        .iter()
        .map(|ring| ring_from_positions(ring))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(ring_from_positions(exterior)?, interiors))
}

/// Read a `Polygon` geometry into a `geo::Polygon`
pub fn polygon_from_geometry(geometry: &Geometry) -> Result<Polygon<f64>, FeatureError> {
    match geometry {
        Geometry::Polygon(rings) => polygon_from_rings(rings),
        other => Err(FeatureError::UnsupportedGeometry {
            found: other.type_name().to_string(),
            expected: "Polygon",
        }),
    }
}

/// Read a `Polygon` or `MultiPolygon` geometry into a `geo::MultiPolygon`
pub fn multi_polygon_from_geometry(geometry: &Geometry) -> Result<MultiPolygon<f64>, FeatureError> {
    match geometry {
        Geometry::Polygon(rings) => Ok(MultiPolygon::new(vec![polygon_from_rings(rings)?])),
        Geometry::MultiPolygon(parts) => Ok(MultiPolygon::new(
            parts
                .iter()
                .map(|rings| polygon_from_rings(rings))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        other => Err(FeatureError::UnsupportedGeometry {
            found: other.type_name().to_string(),
            expected: "Polygon or MultiPolygon",
        }),
    }
}
