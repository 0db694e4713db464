use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

use crate::config::ConverterConfig;
use crate::frame::{GeoAnchorBox, ImageFrame};
use crate::parser::{parse_bounding_boxes, parse_segmentation, LabelKind, ParseOutcome, ParseReport};
use crate::ConvertError;
use floorplan_features::FeatureCollection;

/// Everything a caller needs to audit one conversion run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub frame: ImageFrame,
    pub anchor: GeoAnchorBox,
    pub segmentation: ParseReport,
    pub boxes: ParseReport,
}

impl ConversionReport {
    pub fn features_emitted(&self) -> usize {
        self.segmentation.features_emitted + self.boxes.features_emitted
    }

    pub fn malformed_lines(&self) -> usize {
        self.segmentation.malformed_count() + self.boxes.malformed_count()
    }
}

/// Read a label file. A file that does not exist is an empty source (`None`),
/// any other read failure is an error.
pub fn read_label_source(path: &Path) -> Result<Option<String>, ConvertError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Label file not found, treating as empty: {}", path.display());
            Ok(None)
        }
        Err(source) => Err(ConvertError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_source<F>(source: Option<&str>, kind: LabelKind, parse: F) -> ParseOutcome
where
    F: FnOnce(&str) -> ParseOutcome,
{
    match source {
        Some(text) => parse(text),
        None => ParseOutcome {
            features: Vec::new(),
            report: ParseReport::missing(kind),
        },
    }
}

/// Convert both label sources of one image into a feature collection.
///
/// A single anchor box is derived from the frame so that segmentation and
/// bounding-box features share one georeference. Segmentation features come
/// first, then bounding-box features, each in line order.
pub fn convert(
    segmentation: Option<&str>,
    boxes: Option<&str>,
    frame: ImageFrame,
    config: &ConverterConfig,
) -> (FeatureCollection, ConversionReport) {
    let anchor = GeoAnchorBox::for_frame(&frame, &config.anchor);
    let class_map = &config.class_map;

    let seg = parse_source(segmentation, LabelKind::Segmentation, |text| {
        parse_segmentation(text, &frame, &anchor, class_map)
    });
    let bbox = parse_source(boxes, LabelKind::BoundingBox, |text| {
        parse_bounding_boxes(text, &frame, &anchor, class_map)
    });

    let mut features = seg.features;
    features.extend(bbox.features);

    let report = ConversionReport {
        frame,
        anchor,
        segmentation: seg.report,
        boxes: bbox.report,
    };
    (FeatureCollection::new(features), report)
}

/// File-level conversion: probe the image size, read both label files,
/// convert and write the collection to `output`.
pub fn convert_files(
    segmentation_path: &Path,
    boxes_path: &Path,
    image_path: &Path,
    output: &Path,
    config: &ConverterConfig,
) -> Result<ConversionReport, ConvertError> {
    let frame = ImageFrame::from_image_path(image_path)?;
    info!(
        "Image {} is {}x{} pixels",
        image_path.display(),
        frame.width,
        frame.height
    );

    let segmentation = read_label_source(segmentation_path)?;
    let boxes = read_label_source(boxes_path)?;

    let (collection, report) = convert(segmentation.as_deref(), boxes.as_deref(), frame, config);
    collection.save(output)?;

    info!(
        "Wrote {} features to {} ({} malformed label lines skipped)",
        collection.len(),
        output.display(),
        report.malformed_lines()
    );
    Ok(report)
}
