use geo::{BoundingRect, LineString, Polygon};

/// Replace a polygon with its axis-aligned bounding rectangle.
///
/// This is deliberately lossy: concavities and rotation of the detected outline
/// are discarded so that wall synthesis downstream works on rectilinear rooms.
/// A polygon with zero width or height yields a zero-area rectangle, which
/// callers must reject. Returns `None` for a polygon without coordinates.
///
/// The ring starts at `(max_x, min_y)` and runs counter-clockwise in a y-up
/// frame, so the same bounds always produce the same ring.
pub fn orthogonalize(polygon: &Polygon<f64>) -> Option<Polygon<f64>> {
    let rect = polygon.bounding_rect()?;
    let (min, max) = (rect.min(), rect.max());

    let ring = LineString::from(vec![
        (max.x, min.y),
        (max.x, max.y),
        (min.x, max.y),
        (min.x, min.y),
        (max.x, min.y),
    ]);
    Some(Polygon::new(ring, vec![]))
}
