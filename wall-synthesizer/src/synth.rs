use geo::MultiPolygon;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::WallConfig;
use crate::engine::{GeoEngine, GeometryEngine};
use floorplan_features::{multi_polygon_from_geometry, Feature, FeatureCollection, Geometry};

/// Result of one synthesis step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ItemOutcome {
    Added,
    /// Nothing to add (empty result or missing prerequisite)
    Skipped(String),
    /// The geometry engine rejected the input
    Failed(String),
}

impl ItemOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Interior wall outcome for one room
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomOutcome {
    /// Index of the room feature in the input collection
    pub feature_index: usize,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisReport {
    pub rooms: Vec<RoomOutcome>,
    pub outline: ItemOutcome,
    pub exterior_wall: ItemOutcome,
}

impl SynthesisReport {
    /// Interior plus exterior wall features added
    pub fn walls_added(&self) -> usize {
        self.rooms.iter().filter(|r| r.outcome.is_added()).count()
            + usize::from(self.exterior_wall.is_added())
    }

    pub fn failures(&self) -> usize {
        self.rooms.iter().filter(|r| r.outcome.is_failed()).count()
            + usize::from(self.outline.is_failed())
            + usize::from(self.exterior_wall.is_failed())
    }
}

/// Best-effort wall synthesis: per-room failures are isolated, a failed union
/// only costs the outline and exterior wall, and nothing already computed is
/// rolled back.
pub struct WallSynthesizer<E = GeoEngine> {
    engine: E,
    config: WallConfig,
}

impl WallSynthesizer<GeoEngine> {
    pub fn new(config: WallConfig) -> Self {
        Self::with_engine(GeoEngine, config)
    }
}

impl<E: GeometryEngine> WallSynthesizer<E> {
    pub fn with_engine(engine: E, config: WallConfig) -> Self {
        Self { engine, config }
    }

    /// Append the outline and wall features to `collection`. Existing
    /// features are left untouched and in order.
    pub fn synthesize(&self, collection: &mut FeatureCollection) -> SynthesisReport {
        let (added, report) = self.synthesize_features(&collection.features);
        collection.features.extend(added);
        report
    }

    /// Compute the features to append: the outline (if any) first, then the
    /// interior walls in room order, then the exterior wall.
    pub fn synthesize_features(&self, features: &[Feature]) -> (Vec<Feature>, SynthesisReport) {
        let rooms = self.room_shapes(features);
        debug!("Found {} room polygons", rooms.len());

        let mut walls = Vec::new();
        let mut room_outcomes = Vec::with_capacity(rooms.len());
        let mut union_inputs = Vec::with_capacity(rooms.len());

        for (feature_index, shape) in rooms {
            let outcome = match shape {
                Ok(room) => {
                    let outcome =
                        self.ring_around(&room, self.config.interior_thickness, &mut walls);
                    if let ItemOutcome::Failed(reason) = &outcome {
                        warn!(
                            "Skipped invalid room geometry (feature {}): {}",
                            feature_index, reason
                        );
                    }
                    union_inputs.push(room);
                    outcome
                }
                Err(reason) => {
                    warn!(
                        "Skipped unreadable room geometry (feature {}): {}",
                        feature_index, reason
                    );
                    ItemOutcome::Failed(reason)
                }
            };
            room_outcomes.push(RoomOutcome {
                feature_index,
                outcome,
            });
        }

        info!("Added {} wall rings around individual rooms", walls.len());

        let mut added = Vec::new();
        let (outline, exterior_wall) = match self.engine.union(&union_inputs) {
            Ok(union) if self.engine.is_empty(&union) => {
                warn!("No room polygons to outline; skipping building outline and exterior wall");
                let reason = "no room polygons".to_string();
                (ItemOutcome::Skipped(reason.clone()), ItemOutcome::Skipped(reason))
            }
            Ok(union) => {
                added.push(Feature::new(
                    self.config.outline_class.as_str(),
                    Geometry::from(&union),
                ));
                info!("Added building outline feature");

                let exterior =
                    self.ring_around(&union, self.config.exterior_thickness, &mut walls);
                match &exterior {
                    ItemOutcome::Added => info!("Added exterior wall ring around entire building"),
                    ItemOutcome::Skipped(reason) => debug!("No exterior wall: {}", reason),
                    ItemOutcome::Failed(reason) => {
                        warn!("Failed to generate exterior wall: {}", reason)
                    }
                }
                (ItemOutcome::Added, exterior)
            }
            Err(e) => {
                warn!("Failed to generate building exterior: {}", e);
                (
                    ItemOutcome::Failed(e.to_string()),
                    ItemOutcome::Skipped("building outline unavailable".to_string()),
                )
            }
        };

        added.extend(walls);
        let report = SynthesisReport {
            rooms: room_outcomes,
            outline,
            exterior_wall,
        };
        (added, report)
    }

    /// Room polygons by input index; conversion failures are kept so they can
    /// be reported per room
    fn room_shapes(&self, features: &[Feature]) -> Vec<(usize, Result<MultiPolygon<f64>, String>)> {
        features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.has_class(&self.config.room_class))
            .filter_map(|(index, f)| match &f.geometry {
                Some(geometry @ Geometry::Polygon(_)) => Some((
                    index,
                    multi_polygon_from_geometry(geometry).map_err(|e| e.to_string()),
                )),
                _ => None,
            })
            .collect()
    }

    /// `buffer(shape, distance) - shape`, pushed onto `walls` when non-empty
    fn ring_around(
        &self,
        shape: &MultiPolygon<f64>,
        distance: f64,
        walls: &mut Vec<Feature>,
    ) -> ItemOutcome {
        let ring = self
            .engine
            .buffer(shape, distance)
            .and_then(|outer| self.engine.difference(&outer, shape));

        match ring {
            Ok(ring) if self.engine.is_empty(&ring) => {
                ItemOutcome::Skipped("empty wall ring".to_string())
            }
            Ok(ring) => {
                walls.push(Feature::new(
                    self.config.wall_class.as_str(),
                    Geometry::from(&ring),
                ));
                ItemOutcome::Added
            }
            Err(e) => ItemOutcome::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeometryError;
    use approx::assert_relative_eq;
    use floorplan_features::polygon_from_geometry;
    use geo::Area;

    fn rect_feature(class: &str, x: f64, y: f64, w: f64, h: f64) -> Feature {
        Feature::new(
            class,
            Geometry::Polygon(vec![vec![
                [x + w, y],
                [x + w, y + h],
                [x, y + h],
                [x, y],
                [x + w, y],
            ]]),
        )
    }

    fn bowtie_room() -> Feature {
        Feature::new(
            "room",
            Geometry::Polygon(vec![vec![
                [0.0, 0.0],
                [0.01, 0.01],
                [0.01, 0.0],
                [0.0, 0.01],
                [0.0, 0.0],
            ]]),
        )
    }

    fn area_of(feature: &Feature) -> f64 {
        multi_polygon_from_geometry(feature.geometry.as_ref().unwrap())
            .unwrap()
            .unsigned_area()
    }

    /// Engine whose union always fails
    struct NoUnionEngine;

    impl GeometryEngine for NoUnionEngine {
        fn buffer(
            &self,
            shape: &MultiPolygon<f64>,
            distance: f64,
        ) -> Result<MultiPolygon<f64>, GeometryError> {
            GeoEngine.buffer(shape, distance)
        }

        fn union(&self, _: &[MultiPolygon<f64>]) -> Result<MultiPolygon<f64>, GeometryError> {
            Err(GeometryError::InvalidInput("topology exception".to_string()))
        }

        fn difference(
            &self,
            minuend: &MultiPolygon<f64>,
            subtrahend: &MultiPolygon<f64>,
        ) -> Result<MultiPolygon<f64>, GeometryError> {
            GeoEngine.difference(minuend, subtrahend)
        }

        fn is_empty(&self, shape: &MultiPolygon<f64>) -> bool {
            GeoEngine.is_empty(shape)
        }
    }

    #[test]
    fn test_single_room_wall_ring_area() {
        let (w, h) = (0.008, 0.005);
        let d = WallConfig::default().interior_thickness;
        let features = vec![rect_feature("room", -0.005, -0.002, w, h)];

        let (added, report) = WallSynthesizer::new(WallConfig::default()).synthesize_features(&features);

        assert_eq!(report.rooms.len(), 1);
        assert_eq!(report.rooms[0].outcome, ItemOutcome::Added);
        assert_eq!(report.outline, ItemOutcome::Added);
        assert_eq!(report.exterior_wall, ItemOutcome::Added);

        // outline, interior wall, exterior wall
        assert_eq!(added.len(), 3);
        assert_eq!(added[0].class(), Some("outline"));
        assert_eq!(added[1].class(), Some("wall"));
        assert_eq!(added[2].class(), Some("wall"));

        let expected = (w + 2.0 * d) * (h + 2.0 * d) - w * h;
        assert_relative_eq!(area_of(&added[1]), expected, max_relative = 0.01);
    }

    #[test]
    fn test_outline_matches_room_union() {
        let features = vec![
            rect_feature("room", 0.0, 0.0, 0.004, 0.004),
            rect_feature("room", 0.004, 0.0, 0.004, 0.004),
        ];

        let (added, _) = WallSynthesizer::new(WallConfig::default()).synthesize_features(&features);

        let outline = &added[0];
        assert_eq!(outline.class(), Some("outline"));
        assert!(matches!(outline.geometry, Some(Geometry::Polygon(_))));
        assert_relative_eq!(area_of(outline), 0.008 * 0.004, max_relative = 1e-9);
    }

    #[test]
    fn test_adjoining_rooms_each_get_a_ring() {
        let features = vec![
            rect_feature("room", 0.0, 0.0, 0.004, 0.004),
            rect_feature("room", 0.004, 0.0, 0.004, 0.004),
        ];

        let (_, report) = WallSynthesizer::new(WallConfig::default()).synthesize_features(&features);

        assert_eq!(report.walls_added(), 3);
        assert_eq!(report.failures(), 0);
    }

    #[test]
    fn test_disjoint_rooms_give_multi_part_outline() {
        let features = vec![
            rect_feature("room", 0.0, 0.0, 0.002, 0.002),
            rect_feature("room", 0.006, 0.006, 0.002, 0.002),
        ];

        let (added, _) = WallSynthesizer::new(WallConfig::default()).synthesize_features(&features);

        assert!(matches!(added[0].geometry, Some(Geometry::MultiPolygon(ref parts)) if parts.len() == 2));
    }

    #[test]
    fn test_no_rooms_no_outline() {
        let features = vec![Feature::new("door", Geometry::Point([0.0, 0.0]))];

        let (added, report) = WallSynthesizer::new(WallConfig::default()).synthesize_features(&features);

        assert!(added.is_empty());
        assert!(report.rooms.is_empty());
        assert!(matches!(report.outline, ItemOutcome::Skipped(_)));
        assert!(matches!(report.exterior_wall, ItemOutcome::Skipped(_)));
        assert_eq!(report.walls_added(), 0);
    }

    #[test]
    fn test_non_polygon_and_non_room_features_ignored() {
        let features = vec![
            Feature::new("room", Geometry::Point([0.0, 0.0])),
            rect_feature("window", 0.0, 0.0, 0.001, 0.001),
            rect_feature("room", 0.0, 0.0, 0.003, 0.003),
        ];

        let (_, report) = WallSynthesizer::new(WallConfig::default()).synthesize_features(&features);

        assert_eq!(report.rooms.len(), 1);
        assert_eq!(report.rooms[0].feature_index, 2);
    }

    #[test]
    fn test_invalid_room_is_isolated() {
        let features = vec![
            rect_feature("room", 0.02, 0.02, 0.004, 0.004),
            bowtie_room(),
            rect_feature("room", 0.03, 0.02, 0.004, 0.004),
        ];

        let (added, report) = WallSynthesizer::new(WallConfig::default()).synthesize_features(&features);

        assert_eq!(report.rooms[0].outcome, ItemOutcome::Added);
        assert!(report.rooms[1].outcome.is_failed());
        assert_eq!(report.rooms[2].outcome, ItemOutcome::Added);

        // The invalid room also poisons the union, so only interior walls remain
        assert!(report.outline.is_failed());
        assert!(matches!(report.exterior_wall, ItemOutcome::Skipped(_)));
        assert_eq!(added.len(), 2);
        assert!(added.iter().all(|f| f.has_class("wall")));
    }

    #[test]
    fn test_union_failure_keeps_interior_walls() {
        let features = vec![rect_feature("room", 0.0, 0.0, 0.004, 0.004)];
        let synthesizer = WallSynthesizer::with_engine(NoUnionEngine, WallConfig::default());

        let (added, report) = synthesizer.synthesize_features(&features);

        assert_eq!(added.len(), 1);
        assert_eq!(added[0].class(), Some("wall"));
        assert_eq!(
            report.outline,
            ItemOutcome::Failed("invalid geometry: topology exception".to_string())
        );
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn test_synthesize_appends_after_existing_features() {
        let mut collection = FeatureCollection::new(vec![
            rect_feature("room", 0.0, 0.0, 0.004, 0.004),
            Feature::new("door", Geometry::Point([0.002, 0.0])),
        ]);

        WallSynthesizer::new(WallConfig::default()).synthesize(&mut collection);

        let classes: Vec<_> = collection.features.iter().filter_map(|f| f.class()).collect();
        assert_eq!(classes, vec!["room", "door", "outline", "wall", "wall"]);
    }

    #[test]
    fn test_wall_ring_encloses_room() {
        let features = vec![rect_feature("room", 0.0, 0.0, 0.004, 0.004)];

        let (added, _) = WallSynthesizer::new(WallConfig::default()).synthesize_features(&features);

        let wall = polygon_from_geometry(added[1].geometry.as_ref().unwrap()).unwrap();
        assert_eq!(wall.interiors().len(), 1, "interior wall should have the room as a hole");
    }

    #[test]
    fn test_custom_class_names() {
        let config = WallConfig {
            room_class: "space".to_string(),
            wall_class: "partition".to_string(),
            outline_class: "footprint".to_string(),
            ..WallConfig::default()
        };
        let features = vec![rect_feature("space", 0.0, 0.0, 0.004, 0.004)];

        let (added, _) = WallSynthesizer::new(config).synthesize_features(&features);

        let classes: Vec<_> = added.iter().filter_map(|f| f.class()).collect();
        assert_eq!(classes, vec!["footprint", "partition", "partition"]);
    }
}
