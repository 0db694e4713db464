//! Geometry engine seam used by wall synthesis.
//!
//! The synthesizer only needs buffer, union, difference and an emptiness
//! check. [`GeoEngine`] provides them with the `geo` crate and rejects invalid
//! input up front so that one broken room polygon surfaces as an error instead
//! of a garbage ring.

use geo::{Area, BooleanOps, Buffer, Coord, Intersects, Line, LineString, MultiPolygon, Polygon};
use tracing::debug;

use crate::GeometryError;

pub trait GeometryEngine {
    /// Grow (or shrink, for negative distances) a shape by `distance`
    fn buffer(&self, shape: &MultiPolygon<f64>, distance: f64)
        -> Result<MultiPolygon<f64>, GeometryError>;

    /// Merge shapes into the minimal region covering all of them. Vertices of
    /// the result may differ from the input coordinates by rounding error.
    fn union(&self, shapes: &[MultiPolygon<f64>]) -> Result<MultiPolygon<f64>, GeometryError>;

    /// `minuend` with the area of `subtrahend` removed
    fn difference(
        &self,
        minuend: &MultiPolygon<f64>,
        subtrahend: &MultiPolygon<f64>,
    ) -> Result<MultiPolygon<f64>, GeometryError>;

    fn is_empty(&self, shape: &MultiPolygon<f64>) -> bool;
}

/// [`GeometryEngine`] backed by `geo`'s buffer and boolean operations
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoEngine;

impl GeometryEngine for GeoEngine {
    fn buffer(
        &self,
        shape: &MultiPolygon<f64>,
        distance: f64,
    ) -> Result<MultiPolygon<f64>, GeometryError> {
        if !distance.is_finite() {
            return Err(GeometryError::InvalidDistance(distance));
        }
        validate_multi_polygon(shape)?;
        Ok(shape.buffer(distance))
    }

    /// `geo`'s overlay snaps coordinates to an internal grid, so outline
    /// vertices land within about 1e-12 of the room corners rather than on them
    fn union(&self, shapes: &[MultiPolygon<f64>]) -> Result<MultiPolygon<f64>, GeometryError> {
        for shape in shapes {
            validate_multi_polygon(shape)?;
        }
        debug!("Union of {} shapes", shapes.len());
        Ok(geo::unary_union(shapes))
    }

    fn difference(
        &self,
        minuend: &MultiPolygon<f64>,
        subtrahend: &MultiPolygon<f64>,
    ) -> Result<MultiPolygon<f64>, GeometryError> {
        validate_multi_polygon(minuend)?;
        validate_multi_polygon(subtrahend)?;
        Ok(minuend.difference(subtrahend))
    }

    fn is_empty(&self, shape: &MultiPolygon<f64>) -> bool {
        shape.0.is_empty() || shape.unsigned_area() == 0.0
    }
}

fn validate_multi_polygon(shape: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    shape.0.iter().try_for_each(validate_polygon)
}

/// Finite coordinates, closed rings of at least four positions, non-zero
/// area and no self-intersecting rings
pub fn validate_polygon(polygon: &Polygon<f64>) -> Result<(), GeometryError> {
    validate_ring(polygon.exterior(), "exterior")?;
    for interior in polygon.interiors() {
        validate_ring(interior, "interior")?;
    }
    if polygon.unsigned_area() == 0.0 {
        return Err(GeometryError::InvalidInput("polygon has zero area".to_string()));
    }
    Ok(())
}

fn validate_ring(ring: &LineString<f64>, which: &str) -> Result<(), GeometryError> {
    if let Some(bad) = ring.coords().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(GeometryError::NonFiniteCoordinate { x: bad.x, y: bad.y });
    }
    if ring.0.len() < 4 {
        return Err(GeometryError::InvalidInput(format!(
            "{} ring has {} positions, need at least 4",
            which,
            ring.0.len()
        )));
    }
    if !ring.is_closed() {
        return Err(GeometryError::InvalidInput(format!("{} ring is not closed", which)));
    }
    if let Some(at) = self_intersection(ring) {
        return Err(GeometryError::InvalidInput(format!(
            "{} ring self-intersects near ({}, {})",
            which, at.x, at.y
        )));
    }
    Ok(())
}

/// First point where two non-adjacent edges of a closed ring touch
fn self_intersection(ring: &LineString<f64>) -> Option<Coord<f64>> {
    let edges: Vec<Line<f64>> = ring.lines().filter(|l| l.start != l.end).collect();
    let n = edges.len();

    for i in 0..n {
        for j in (i + 2)..n {
            // First and last edges share the closing vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            if edges[i].intersects(&edges[j]) {
                return Some(edges[i].start);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::polygon;

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ]])
    }

    fn bowtie() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 1.0, y: 0.0),
            (x: 0.0, y: 1.0),
        ]])
    }

    #[test]
    fn test_buffer_grows_area() {
        let engine = GeoEngine;
        let grown = engine.buffer(&square(0.0, 0.0, 1.0), 0.1).unwrap();

        let area = grown.unsigned_area();
        // Between the edge-only growth and the square-corner result
        assert!(area > 1.0 + 4.0 * 0.1 + 0.01);
        assert!(area <= 1.2 * 1.2 + 1e-9);
    }

    #[test]
    fn test_union_of_overlapping_squares() {
        let engine = GeoEngine;
        let merged = engine
            .union(&[square(0.0, 0.0, 2.0), square(1.0, 0.0, 2.0)])
            .unwrap();

        assert_eq!(merged.0.len(), 1);
        assert_relative_eq!(merged.unsigned_area(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_union_of_disjoint_squares_is_multi_part() {
        let engine = GeoEngine;
        let merged = engine
            .union(&[square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)])
            .unwrap();

        assert_eq!(merged.0.len(), 2);
    }

    #[test]
    fn test_union_vertices_stay_near_room_corners() {
        let engine = GeoEngine;
        let merged = engine
            .union(&[square(0.0, 0.0, 0.002), square(0.002, 0.002, 0.002)])
            .unwrap();

        let corners: Vec<Coord<f64>> = [0.0, 0.002, 0.004]
            .iter()
            .flat_map(|&x| [0.0, 0.002, 0.004].map(|y| Coord { x, y }))
            .collect();
        for vertex in merged.0.iter().flat_map(|p| p.exterior().coords()) {
            let nearest = corners
                .iter()
                .map(|c| (c.x - vertex.x).hypot(c.y - vertex.y))
                .fold(f64::INFINITY, f64::min);
            assert!(nearest < 1e-9, "vertex {:?} drifted {}", vertex, nearest);
        }
        assert_relative_eq!(merged.unsigned_area(), 2.0 * 0.002 * 0.002, max_relative = 1e-6);
    }

    #[test]
    fn test_union_of_nothing_is_empty() {
        let engine = GeoEngine;
        let merged = engine.union(&[]).unwrap();
        assert!(engine.is_empty(&merged));
    }

    #[test]
    fn test_difference_leaves_ring() {
        let engine = GeoEngine;
        let ring = engine
            .difference(&square(0.0, 0.0, 4.0), &square(1.0, 1.0, 2.0))
            .unwrap();

        assert_relative_eq!(ring.unsigned_area(), 12.0, epsilon = 1e-9);
        assert!(!engine.is_empty(&ring));
    }

    #[test]
    fn test_difference_of_identical_shapes_is_empty() {
        let engine = GeoEngine;
        let nothing = engine
            .difference(&square(0.0, 0.0, 1.0), &square(0.0, 0.0, 1.0))
            .unwrap();
        assert!(engine.is_empty(&nothing));
    }

    #[test]
    fn test_self_intersecting_input_rejected() {
        let engine = GeoEngine;
        assert!(matches!(
            engine.buffer(&bowtie(), 0.1),
            Err(GeometryError::InvalidInput(_))
        ));
        assert!(engine.union(&[square(0.0, 0.0, 1.0), bowtie()]).is_err());
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let engine = GeoEngine;
        let bad = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: f64::NAN, y: 0.0),
            (x: 1.0, y: 1.0),
        ]]);

        assert!(matches!(
            engine.buffer(&bad, 0.1),
            Err(GeometryError::NonFiniteCoordinate { .. })
        ));
        assert!(matches!(
            engine.buffer(&square(0.0, 0.0, 1.0), f64::INFINITY),
            Err(GeometryError::InvalidDistance(_))
        ));
    }

    #[test]
    fn test_zero_area_rejected() {
        let flat = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 2.0, y: 0.0),
        ];
        assert!(validate_polygon(&flat).is_err());
    }

    #[test]
    fn test_valid_square_accepted() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];
        assert!(validate_polygon(&square).is_ok());
    }
}
