//! YOLO label parsing.
//!
//! Two line formats are understood, both whitespace separated with
//! coordinates normalized to the image size:
//!
//! * segmentation: `class_id x1 y1 x2 y2 ... xn yn`
//! * bounding box: `class_id cx cy w h`
//!
//! Structurally invalid lines are never fatal. Each one is dropped and
//! recorded in the [`ParseReport`] so callers can see what was lost.

use geo::{Area, Coord, LineString, Polygon};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ClassMap;
use crate::frame::{pixel_to_lonlat, GeoAnchorBox, ImageFrame};
use crate::simplify::orthogonalize;
use floorplan_features::{Feature, Geometry, Position};

const MIN_SEGMENTATION_TOKENS: usize = 3;
const BOX_TOKENS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabelKind {
    Segmentation,
    BoundingBox,
}

impl LabelKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Segmentation => "segmentation",
            Self::BoundingBox => "bounding-box",
        }
    }
}

/// Why a label line produced no feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SkipReason {
    Blank,
    TooFewTokens { found: usize },
    WrongTokenCount { expected: usize, found: usize },
    OddCoordinateCount,
    InvalidClassId(String),
    InvalidNumber(String),
    UnknownClass(u32),
    DegenerateGeometry,
    /// Finite label values that overflow once scaled to pixels or degrees
    CoordinateOverflow,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "blank line"),
            Self::TooFewTokens { found } => write!(f, "too few tokens ({})", found),
            Self::WrongTokenCount { expected, found } => {
                write!(f, "expected {} tokens, found {}", expected, found)
            }
            Self::OddCoordinateCount => write!(f, "odd number of coordinate values"),
            Self::InvalidClassId(token) => write!(f, "invalid class id '{}'", token),
            Self::InvalidNumber(token) => write!(f, "invalid number '{}'", token),
            Self::UnknownClass(id) => write!(f, "unknown class id {}", id),
            Self::DegenerateGeometry => write!(f, "empty or zero-area geometry"),
            Self::CoordinateOverflow => write!(f, "coordinates out of range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedLine {
    /// 1-based
    pub line_number: usize,
    pub reason: SkipReason,
}

/// Diagnostics for one label source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseReport {
    pub kind: LabelKind,
    pub source_missing: bool,
    pub lines_read: usize,
    pub features_emitted: usize,
    pub skipped: Vec<SkippedLine>,
}

impl ParseReport {
    fn new(kind: LabelKind) -> Self {
        Self {
            kind,
            source_missing: false,
            lines_read: 0,
            features_emitted: 0,
            skipped: Vec::new(),
        }
    }

    /// Report for a label file that does not exist
    pub fn missing(kind: LabelKind) -> Self {
        Self {
            source_missing: true,
            ..Self::new(kind)
        }
    }

    /// Skipped lines, not counting blank ones
    pub fn malformed_count(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason != SkipReason::Blank)
            .count()
    }

    fn skip(&mut self, line_number: usize, reason: SkipReason) {
        debug!(
            "Skipping {} label line {}: {}",
            self.kind.name(),
            line_number,
            reason
        );
        self.skipped.push(SkippedLine {
            line_number,
            reason,
        });
    }

    fn log_summary(&self) {
        info!(
            "Parsed {} labels: {} lines, {} features, {} skipped",
            self.kind.name(),
            self.lines_read,
            self.features_emitted,
            self.malformed_count()
        );
    }
}

/// Features parsed from one label source plus the diagnostics
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub features: Vec<Feature>,
    pub report: ParseReport,
}

fn parse_class<'a>(token: &str, class_map: &'a ClassMap) -> Result<&'a str, SkipReason> {
    let class_id: u32 = token
        .parse()
        .map_err(|_| SkipReason::InvalidClassId(token.to_string()))?;
    class_map
        .get(class_id)
        .ok_or(SkipReason::UnknownClass(class_id))
}

fn parse_numbers(tokens: &[&str]) -> Result<Vec<f64>, SkipReason> {
    tokens
        .iter()
        .map(|token| match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(SkipReason::InvalidNumber(token.to_string())),
        })
        .collect()
}

fn finite_pixel(frame: &ImageFrame, x: f64, y: f64) -> Result<Coord<f64>, SkipReason> {
    let (x, y) = frame.denormalize(x, y);
    if x.is_finite() && y.is_finite() {
        Ok(Coord { x, y })
    } else {
        Err(SkipReason::CoordinateOverflow)
    }
}

fn finite_lonlat(
    pixel: Coord<f64>,
    frame: &ImageFrame,
    anchor: &GeoAnchorBox,
) -> Result<Position, SkipReason> {
    let position = pixel_to_lonlat(pixel.x, pixel.y, frame, anchor);
    if position.iter().all(|v| v.is_finite()) {
        Ok(position)
    } else {
        Err(SkipReason::CoordinateOverflow)
    }
}

/// Run `parse_line` over every line, collecting features and skip reasons
fn parse_lines<F>(text: &str, kind: LabelKind, mut parse_line: F) -> ParseOutcome
where
    F: FnMut(&[&str]) -> Result<Feature, SkipReason>,
{
    let mut report = ParseReport::new(kind);
    let mut features = Vec::new();

    for (index, line) in text.lines().enumerate() {
        report.lines_read += 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let result = if tokens.is_empty() {
            Err(SkipReason::Blank)
        } else {
            parse_line(&tokens)
        };

        match result {
            Ok(feature) => features.push(feature),
            Err(reason) => report.skip(index + 1, reason),
        }
    }

    report.features_emitted = features.len();
    report.log_summary();
    ParseOutcome { features, report }
}

fn segmentation_feature(
    tokens: &[&str],
    frame: &ImageFrame,
    anchor: &GeoAnchorBox,
    class_map: &ClassMap,
) -> Result<Feature, SkipReason> {
    if tokens.len() < MIN_SEGMENTATION_TOKENS {
        return Err(SkipReason::TooFewTokens {
            found: tokens.len(),
        });
    }

    let class = parse_class(tokens[0], class_map)?;
    let values = parse_numbers(&tokens[1..])?;
    if values.len() % 2 != 0 {
        return Err(SkipReason::OddCoordinateCount);
    }

    let pixels = values
        .chunks_exact(2)
        .map(|pair| finite_pixel(frame, pair[0], pair[1]))
        .collect::<Result<Vec<_>, _>>()?;

    let outline = Polygon::new(LineString::from(pixels), vec![]);
    let rect = orthogonalize(&outline).ok_or(SkipReason::DegenerateGeometry)?;
    if rect.unsigned_area() == 0.0 {
        return Err(SkipReason::DegenerateGeometry);
    }

    let ring = rect
        .exterior()
        .coords()
        .map(|c| finite_lonlat(*c, frame, anchor))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Feature::new(class, Geometry::Polygon(vec![ring])))
}

fn bounding_box_feature(
    tokens: &[&str],
    frame: &ImageFrame,
    anchor: &GeoAnchorBox,
    class_map: &ClassMap,
) -> Result<Feature, SkipReason> {
    if tokens.len() != BOX_TOKENS {
        return Err(SkipReason::WrongTokenCount {
            expected: BOX_TOKENS,
            found: tokens.len(),
        });
    }

    let class = parse_class(tokens[0], class_map)?;
    // Width and height are validated but only the center survives
    let values = parse_numbers(&tokens[1..])?;
    let center = finite_pixel(frame, values[0], values[1])?;

    Ok(Feature::new(
        class,
        Geometry::Point(finite_lonlat(center, frame, anchor)?),
    ))
}

/// Parse segmentation labels into rectangular polygon features.
///
/// Each outline is scaled to pixel space, replaced by its bounding rectangle,
/// then mapped through the anchor box. Lines with unknown class ids are
/// dropped, the same as for bounding boxes.
pub fn parse_segmentation(
    text: &str,
    frame: &ImageFrame,
    anchor: &GeoAnchorBox,
    class_map: &ClassMap,
) -> ParseOutcome {
    parse_lines(text, LabelKind::Segmentation, |tokens| {
        segmentation_feature(tokens, frame, anchor, class_map)
    })
}

/// Parse bounding-box labels into point features at the box centers
pub fn parse_bounding_boxes(
    text: &str,
    frame: &ImageFrame,
    anchor: &GeoAnchorBox,
    class_map: &ClassMap,
) -> ParseOutcome {
    parse_lines(text, LabelKind::BoundingBox, |tokens| {
        bounding_box_feature(tokens, frame, anchor, class_map)
    })
}
