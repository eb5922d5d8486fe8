use geo::{BooleanOps, MultiPolygon};
use tracing::{debug, warn};

use crate::{
    crs::{CoordinateSystem, Projections},
    feature::{Feature, FeatureCollection},
    geom::{guarded, has_finite_coords},
    units::feet_to_meters,
};

/// Why a single feature contributed no buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferSkip {
    MissingGeometry,
    NonFiniteCoordinates,
    Projection(String),
    EmptyBuffer,
    Panicked(String),
}

/// Result of buffering one input feature.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferOutcome {
    Buffered,
    Skipped(BufferSkip),
}

/// Result of one step of the union fold.
#[derive(Debug, Clone, PartialEq)]
pub enum UnionOutcome {
    Merged,
    /// The step failed; the running union was left unchanged and this
    /// buffer's area is missing from the final polygon.
    Skipped(String),
}

/// Output of the buffer stage: the unified polygon plus per-item outcomes.
#[derive(Debug, Clone, Default)]
pub struct BufferReport {
    /// `None` when no feature could be buffered.
    pub polygon: Option<MultiPolygon<f64>>,
    /// One outcome per input feature, in input order.
    pub features: Vec<BufferOutcome>,
    /// One outcome per union step (buffers after the first).
    pub unions: Vec<UnionOutcome>,
}

impl BufferReport {
    /// Number of features that produced a buffer.
    pub fn buffered(&self) -> usize {
        self.features.iter().filter(|o| matches!(o, BufferOutcome::Buffered)).count()
    }

    /// Number of features that were skipped.
    pub fn skipped(&self) -> usize { self.features.len() - self.buffered() }

    /// Number of union steps that failed.
    pub fn failed_unions(&self) -> usize {
        self.unions.iter().filter(|o| matches!(o, UnionOutcome::Skipped(_))).count()
    }
}

/// Build the union of `radius_ft`-foot buffers around every feature of `layers`.
pub fn unified_buffer<'a>(
    layers: impl IntoIterator<Item = &'a FeatureCollection>,
    radius_ft: u32,
    crs: &CoordinateSystem,
) -> BufferReport {
    let radius_m = feet_to_meters(radius_ft as f64);
    let mut projections = Projections::default();

    let mut buffers = Vec::new();
    let mut features = Vec::new();
    for (i, feature) in layers.into_iter().flat_map(|layer| layer.iter()).enumerate() {
        match buffer_feature(feature, radius_m, crs, &mut projections) {
            Ok(buffer) => {
                buffers.push(buffer);
                features.push(BufferOutcome::Buffered);
            }
            Err(skip) => {
                warn!(feature = i, reason = ?skip, "buffer failed, skipping feature");
                features.push(BufferOutcome::Skipped(skip));
            }
        }
    }
    debug!(buffers = buffers.len(), zones = projections.len(), radius_ft, "created buffers");

    let (polygon, unions) = fold_union(buffers, |a, b| a.union(b));
    BufferReport { polygon, features, unions }
}

/// Buffer a single feature by `radius_m` meters.
pub(crate) fn buffer_feature(
    feature: &Feature,
    radius_m: f64,
    crs: &CoordinateSystem,
    projections: &mut Projections,
) -> Result<MultiPolygon<f64>, BufferSkip> {
    let geometry = feature.geometry.as_ref().ok_or(BufferSkip::MissingGeometry)?;
    if !has_finite_coords(geometry) {
        return Err(BufferSkip::NonFiniteCoordinates);
    }

    let buffer = guarded(|| crs.buffer(geometry, radius_m, projections))
        .map_err(BufferSkip::Panicked)?
        .map_err(|e| BufferSkip::Projection(format!("{e:#}")))?;

    if buffer.0.is_empty() { Err(BufferSkip::EmptyBuffer) } else { Ok(buffer) }
}

/// Union `buffers` left to right. A step that panics, or that loses everything
/// from two non-empty inputs, is skipped and the running union kept as is.
pub(crate) fn fold_union(
    buffers: Vec<MultiPolygon<f64>>,
    union: impl Fn(&MultiPolygon<f64>, &MultiPolygon<f64>) -> MultiPolygon<f64>,
) -> (Option<MultiPolygon<f64>>, Vec<UnionOutcome>) {
    let mut buffers = buffers.into_iter();
    let Some(mut unified) = buffers.next() else { return (None, Vec::new()) };

    let mut outcomes = Vec::with_capacity(buffers.len());
    for (step, buffer) in buffers.enumerate() {
        match guarded(|| union(&unified, &buffer)) {
            Ok(merged) if !merged.0.is_empty() => {
                unified = merged;
                outcomes.push(UnionOutcome::Merged);
            }
            Ok(_) => {
                warn!(step = step + 1, "union produced an empty polygon, skipping");
                outcomes.push(UnionOutcome::Skipped("empty union".to_string()));
            }
            Err(message) => {
                warn!(step = step + 1, %message, "union failed, skipping");
                outcomes.push(UnionOutcome::Skipped(message));
            }
        }
    }

    (Some(unified), outcomes)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::{line_string, point, polygon, Area, Contains, Point};

    use super::*;

    /// One unit is one foot.
    const FEET: CoordinateSystem = CoordinateSystem::Planar { meters_per_unit: 0.3048 };

    fn stops(points: &[(f64, f64)]) -> FeatureCollection {
        points.iter().map(|&(x, y)| Feature::new(point!(x: x, y: y))).collect()
    }

    fn square(x0: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![(x: x0, y: 0.0), (x: x0 + 1.0, y: 0.0), (x: x0 + 1.0, y: 1.0), (x: x0, y: 1.0)]])
    }

    #[test]
    fn no_features_means_no_buffer() {
        let report = unified_buffer([&FeatureCollection::default()], 1320, &FEET);
        assert!(report.polygon.is_none());
        assert!(report.features.is_empty());
    }

    #[test]
    fn single_stop_yields_disc() {
        let report = unified_buffer([&stops(&[(0.0, 0.0)])], 100, &FEET);
        let disc = report.polygon.unwrap();
        assert_relative_eq!(disc.unsigned_area(), std::f64::consts::PI * 100.0 * 100.0, max_relative = 0.02);
        assert!(disc.contains(&Point::new(95.0, 0.0)));
        assert!(!disc.contains(&Point::new(101.0, 0.0)));
    }

    #[test]
    fn overlapping_discs_union_to_less_than_sum() {
        let report = unified_buffer([&stops(&[(0.0, 0.0), (100.0, 0.0)])], 100, &FEET);
        assert_eq!(report.buffered(), 2);
        assert_eq!(report.unions, vec![UnionOutcome::Merged]);
        let area = report.polygon.unwrap().unsigned_area();
        let disc = std::f64::consts::PI * 100.0 * 100.0;
        assert!(area > disc * 1.1 && area < disc * 2.0);
    }

    #[test]
    fn lines_and_stops_from_several_layers() {
        let lines: FeatureCollection = vec![Feature::new(line_string![(x: 0.0, y: 1000.0), (x: 1000.0, y: 1000.0)])]
            .into_iter()
            .collect();
        let report = unified_buffer([&stops(&[(0.0, 0.0)]), &lines], 50, &FEET);
        assert_eq!(report.buffered(), 2);
        let unified = report.polygon.unwrap();
        assert!(unified.contains(&Point::new(500.0, 1040.0)));
        assert!(unified.contains(&Point::new(0.0, 40.0)));
        assert!(!unified.contains(&Point::new(500.0, 500.0)));
    }

    #[test]
    fn degenerate_features_are_skipped() {
        let mut layer = stops(&[(0.0, 0.0), (f64::NAN, 0.0), (500.0, 0.0)]);
        layer.push(Feature::default());
        let report = unified_buffer([&layer], 100, &FEET);

        assert_eq!(report.buffered(), 2);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.features[1], BufferOutcome::Skipped(BufferSkip::NonFiniteCoordinates));
        assert_eq!(report.features[3], BufferOutcome::Skipped(BufferSkip::MissingGeometry));

        let unified = report.polygon.unwrap();
        assert!(unified.contains(&Point::new(0.0, 0.0)));
        assert!(unified.contains(&Point::new(500.0, 0.0)));
    }

    #[test]
    fn all_degenerate_means_no_buffer() {
        let report = unified_buffer([&stops(&[(f64::INFINITY, 0.0)])], 100, &FEET);
        assert!(report.polygon.is_none());
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn failed_union_step_keeps_running_result() {
        let buffers = vec![square(0.0), square(2.0), square(4.0)];
        let calls = std::cell::Cell::new(0);
        let (unified, outcomes) = fold_union(buffers, |a, b| {
            calls.set(calls.get() + 1);
            if calls.get() == 1 { panic!("degenerate edge") }
            a.union(b)
        });

        assert_eq!(calls.get(), 2);
        assert_eq!(outcomes, vec![UnionOutcome::Skipped("degenerate edge".to_string()), UnionOutcome::Merged]);
        // The second square never made it in.
        let unified = unified.unwrap();
        assert_relative_eq!(unified.unsigned_area(), 2.0, epsilon = 1e-9);
        assert!(!unified.contains(&Point::new(2.5, 0.5)));
    }

    #[test]
    fn empty_union_step_is_skipped() {
        let (unified, outcomes) = fold_union(vec![square(0.0), square(2.0)], |_, _| MultiPolygon(vec![]));
        assert_eq!(outcomes, vec![UnionOutcome::Skipped("empty union".to_string())]);
        assert_relative_eq!(unified.unwrap().unsigned_area(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn report_counts() {
        let report = BufferReport {
            polygon: None,
            features: vec![BufferOutcome::Buffered, BufferOutcome::Skipped(BufferSkip::EmptyBuffer)],
            unions: vec![UnionOutcome::Skipped("x".into())],
        };
        assert_eq!(report.buffered(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed_unions(), 1);
    }
}
