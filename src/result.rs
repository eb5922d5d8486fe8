use geo::MultiPolygon;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    buffer::BufferReport,
    clip::{ClipOutcome, ClipSkip},
    feature::{Feature, FeatureCollection, Properties},
    io::{feature_collection_to_geojson, multipolygon_to_geojson},
    units::round_to,
};

/// Attribute names attached to every clipped tract.
pub const CLIPPED_POPULATION: &str = "clipped_population";
pub const CLIPPED_AREA_SQMI: &str = "clipped_area_sqmi";
pub const DENSITY: &str = "density";

/// One tract's share of a walkshed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedTract {
    /// Position of the tract in the input collection.
    pub index: usize,
    /// Part of the tract inside the buffer.
    pub geometry: MultiPolygon<f64>,
    /// Apportioned population, rounded.
    pub population: u64,
    /// Clipped area in square miles, rounded to 4 decimals.
    pub area_sqmi: f64,
    /// People per square mile, rounded.
    pub density: u64,
    /// The tract's original attributes.
    pub properties: Properties,
}

impl ClippedTract {
    /// The clipped tract as a feature: original attributes plus the derived ones.
    pub fn to_feature(&self) -> Feature {
        let mut properties = self.properties.clone();
        properties.insert(CLIPPED_POPULATION.to_string(), json!(self.population));
        properties.insert(CLIPPED_AREA_SQMI.to_string(), json!(self.area_sqmi));
        properties.insert(DENSITY.to_string(), json!(self.density));
        Feature { geometry: Some(self.geometry.clone().into()), properties }
    }
}

/// Counts of per-item outcomes, for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub features_buffered: usize,
    pub features_skipped: usize,
    pub unions_failed: usize,
    pub tracts_clipped: usize,
    pub tracts_missing_geometry: usize,
    pub tracts_outside_bounds: usize,
    pub tracts_disjoint: usize,
    pub tracts_empty_intersection: usize,
    pub tracts_failed: usize,
}

impl Diagnostics {
    /// Record the buffer stage's outcomes.
    pub(crate) fn record_buffers(&mut self, report: &BufferReport) {
        self.features_buffered = report.buffered();
        self.features_skipped = report.skipped();
        self.unions_failed = report.failed_unions();
    }

    /// Record one tract's clip outcome.
    pub(crate) fn record_clip(&mut self, outcome: &ClipOutcome) {
        let counter = match outcome {
            ClipOutcome::Clipped => &mut self.tracts_clipped,
            ClipOutcome::Skipped(ClipSkip::MissingGeometry) => &mut self.tracts_missing_geometry,
            ClipOutcome::Skipped(ClipSkip::OutsideBounds) => &mut self.tracts_outside_bounds,
            ClipOutcome::Skipped(ClipSkip::Disjoint) => &mut self.tracts_disjoint,
            ClipOutcome::Skipped(ClipSkip::EmptyIntersection) => &mut self.tracts_empty_intersection,
            ClipOutcome::Skipped(ClipSkip::Panicked(_)) => &mut self.tracts_failed,
        };
        *counter += 1;
    }

    /// Number of tracts that were looked at and contributed nothing.
    pub fn tracts_skipped(&self) -> usize {
        self.tracts_missing_geometry + self.tracts_outside_bounds + self.tracts_disjoint
            + self.tracts_empty_intersection + self.tracts_failed
    }
}

/// The outcome of one walkshed computation. Never mutated once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkshedResult {
    /// Tracts intersecting the buffer, in input order.
    pub tracts: Vec<ClippedTract>,
    /// Sum of apportioned populations.
    pub total_population: u64,
    /// Area of the buffer polygon itself in square miles (not the sum of
    /// clipped tract areas; the buffer may reach beyond census coverage).
    pub total_area_sqmi: f64,
    /// The unified buffer, if any.
    pub buffer: Option<MultiPolygon<f64>>,
    pub diagnostics: Diagnostics,
}

impl WalkshedResult {
    /// The neutral result: no tracts, no population, no area, no buffer.
    pub fn empty() -> Self { Self::default() }

    /// True when no tract contributed.
    #[inline] pub fn is_empty(&self) -> bool { self.tracts.is_empty() }

    /// Clipped tracts as features carrying the derived attributes.
    pub fn features(&self) -> FeatureCollection {
        self.tracts.iter().map(ClippedTract::to_feature).collect()
    }

    /// Clipped tracts as a GeoJSON FeatureCollection, for the choropleth.
    pub fn to_geojson(&self) -> Value {
        feature_collection_to_geojson(&self.features())
    }

    /// Buffer outline as a GeoJSON FeatureCollection (empty when there is no buffer).
    pub fn buffer_geojson(&self) -> Value {
        let features = self.buffer.iter()
            .map(|shape| json!({
                "type": "Feature",
                "geometry": multipolygon_to_geojson(shape),
                "properties": {},
            }))
            .collect::<Vec<_>>();

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }

    /// Figures for the statistics panel, relative to `baseline_population`.
    pub fn summary(&self, baseline_population: u64) -> WalkshedSummary {
        let percent_of_baseline = if baseline_population > 0 {
            round_to(self.total_population as f64 / baseline_population as f64 * 100.0, 1)
        } else {
            0.0
        };

        WalkshedSummary {
            total_population: self.total_population,
            total_area_sqmi: round_to(self.total_area_sqmi, 2),
            percent_of_baseline,
            has_coverage: self.total_population > 0,
        }
    }
}

/// Headline numbers for a statistics display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WalkshedSummary {
    pub total_population: u64,
    /// Rounded to 2 decimals.
    pub total_area_sqmi: f64,
    /// Rounded to 1 decimal.
    pub percent_of_baseline: f64,
    /// False when nothing was captured; displays show a "no selection" state.
    pub has_coverage: bool,
}

#[cfg(test)]
mod tests {
    use geo::polygon;
    use serde_json::json;

    use super::*;

    fn tract(population: u64) -> ClippedTract {
        let mut properties = Properties::new();
        properties.insert("GEOID".to_string(), json!("53033005100"));
        ClippedTract {
            index: 0,
            geometry: MultiPolygon(vec![polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]]),
            population,
            area_sqmi: 0.25,
            density: population * 4,
            properties,
        }
    }

    #[test]
    fn feature_carries_original_and_derived_attributes() {
        let feature = tract(120).to_feature();
        assert_eq!(feature.properties["GEOID"], json!("53033005100"));
        assert_eq!(feature.properties[CLIPPED_POPULATION], json!(120));
        assert_eq!(feature.properties[CLIPPED_AREA_SQMI], json!(0.25));
        assert_eq!(feature.properties[DENSITY], json!(480));
    }

    #[test]
    fn empty_result_has_empty_outline() {
        let result = WalkshedResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.buffer_geojson(), json!({ "type": "FeatureCollection", "features": [] }));
        assert_eq!(result.to_geojson()["features"], json!([]));
    }

    #[test]
    fn geojson_export() {
        let result = WalkshedResult {
            tracts: vec![tract(10)],
            total_population: 10,
            total_area_sqmi: 0.3,
            buffer: Some(tract(0).geometry),
            diagnostics: Diagnostics::default(),
        };
        let geojson = result.to_geojson();
        assert_eq!(geojson["features"][0]["geometry"]["type"], json!("MultiPolygon"));
        assert_eq!(geojson["features"][0]["properties"][CLIPPED_POPULATION], json!(10));
        assert_eq!(result.buffer_geojson()["features"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn summary_percentages() {
        let result = WalkshedResult { total_population: 1234, total_area_sqmi: 3.14159, ..Default::default() };
        let summary = result.summary(10_000);
        assert_eq!(summary.percent_of_baseline, 12.3);
        assert_eq!(summary.total_area_sqmi, 3.14);
        assert!(summary.has_coverage);

        let summary = WalkshedResult::empty().summary(0);
        assert_eq!(summary.percent_of_baseline, 0.0);
        assert!(!summary.has_coverage);
    }

    #[test]
    fn diagnostics_count_skips() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record_clip(&ClipOutcome::Clipped);
        diagnostics.record_clip(&ClipOutcome::Skipped(ClipSkip::Disjoint));
        diagnostics.record_clip(&ClipOutcome::Skipped(ClipSkip::Panicked("x".into())));
        assert_eq!(diagnostics.tracts_clipped, 1);
        assert_eq!(diagnostics.tracts_skipped(), 2);
    }
}
