use geo::{BooleanOps, BoundingRect, Intersects, MultiPolygon};
use tracing::{debug, warn};

use crate::{
    config::WalkshedConfig,
    crs::CoordinateSystem,
    feature::FeatureCollection,
    geom::{guarded, TractGeometries},
    result::{ClippedTract, Diagnostics, WalkshedResult},
    units::{round_to, sq_meters_to_sq_miles},
};

/// Why a tract contributed nothing to a walkshed.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipSkip {
    MissingGeometry,
    OutsideBounds,
    Disjoint,
    EmptyIntersection,
    Panicked(String),
}

/// Result of clipping one tract.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipOutcome {
    Clipped,
    Skipped(ClipSkip),
}

/// Population of a tract scaled by the share of its area that was kept.
/// Population is assumed to be spread uniformly across the tract.
pub fn apportion(population: f64, clipped_area_m2: f64, tract_area_m2: f64) -> u64 {
    if tract_area_m2 <= 0.0 || population <= 0.0 {
        return 0;
    }
    let ratio = (clipped_area_m2 / tract_area_m2).clamp(0.0, 1.0);
    (population * ratio).round() as u64
}

/// People per square mile, rounded; 0 for zero area.
pub fn density(population: u64, area_sqmi: f64) -> u64 {
    if area_sqmi > 0.0 { (population as f64 / area_sqmi).round() as u64 } else { 0 }
}

/// Clips census tracts against a buffer polygon and apportions population.
pub(crate) struct TractClipper<'a> {
    tracts: &'a FeatureCollection,
    geoms: &'a TractGeometries,
    crs: CoordinateSystem,
    population_field: &'a str,
}

impl<'a> TractClipper<'a> {
    pub(crate) fn new(
        tracts: &'a FeatureCollection,
        geoms: &'a TractGeometries,
        config: &'a WalkshedConfig,
    ) -> Self {
        Self { tracts, geoms, crs: config.crs, population_field: &config.population_field }
    }

    /// Clip every tract against `buffer`. A missing or empty buffer gives the empty result.
    pub(crate) fn clip(&self, buffer: Option<&MultiPolygon<f64>>) -> WalkshedResult {
        let Some(buffer) = buffer.filter(|buffer| !buffer.0.is_empty()) else {
            return WalkshedResult::empty();
        };
        let Some(buffer_bbox) = buffer.bounding_rect() else {
            return WalkshedResult::empty();
        };

        let candidates = self.geoms.overlapping(&buffer_bbox);
        let mut diagnostics = Diagnostics::default();
        let mut tracts = Vec::new();
        let mut total_population = 0;

        for (idx, candidate) in candidates.into_iter().enumerate() {
            let outcome = match self.clip_tract(idx, candidate, buffer) {
                Ok(tract) => {
                    total_population += tract.population;
                    tracts.push(tract);
                    ClipOutcome::Clipped
                }
                Err(skip) => {
                    if let ClipSkip::Panicked(message) = &skip {
                        warn!(tract = idx, %message, "clipping failed, skipping tract");
                    }
                    ClipOutcome::Skipped(skip)
                }
            };
            diagnostics.record_clip(&outcome);
        }

        let total_area_sqmi = sq_meters_to_sq_miles(self.crs.area_m2(buffer));
        debug!(
            clipped = diagnostics.tracts_clipped,
            skipped = diagnostics.tracts_skipped(),
            total_population,
            total_area_sqmi,
            "clipped tracts to buffer"
        );

        WalkshedResult {
            tracts,
            total_population,
            total_area_sqmi,
            buffer: Some(buffer.clone()),
            diagnostics,
        }
    }

    /// Clip a single tract. `candidate` is the bounding-box prefilter verdict.
    fn clip_tract(&self, idx: usize, candidate: bool, buffer: &MultiPolygon<f64>) -> Result<ClippedTract, ClipSkip> {
        let shape = self.geoms.shape(idx).ok_or(ClipSkip::MissingGeometry)?;
        if !candidate {
            return Err(ClipSkip::OutsideBounds);
        }

        let clipped = guarded(|| {
            if !shape.intersects(buffer) {
                return None;
            }
            Some(shape.intersection(buffer))
        }).map_err(ClipSkip::Panicked)?.ok_or(ClipSkip::Disjoint)?;

        if clipped.0.is_empty() {
            return Err(ClipSkip::EmptyIntersection);
        }

        let clipped_area_m2 = self.crs.area_m2(&clipped);
        if clipped_area_m2 <= 0.0 {
            return Err(ClipSkip::EmptyIntersection);
        }

        let tract = &self.tracts.features[idx];
        let population = apportion(tract.population(self.population_field), clipped_area_m2, self.geoms.area_m2(idx));
        let area_sqmi = sq_meters_to_sq_miles(clipped_area_m2);

        Ok(ClippedTract {
            index: idx,
            geometry: clipped,
            population,
            area_sqmi: round_to(area_sqmi, 4),
            density: density(population, area_sqmi),
            properties: tract.properties.clone(),
        })
    }
}

/// Clip `tracts` against `buffer` in one go, preparing the tract index on the fly.
/// Sessions keep the prepared index across computations instead.
pub fn clip_tracts(
    tracts: &FeatureCollection,
    buffer: Option<&MultiPolygon<f64>>,
    config: &WalkshedConfig,
) -> WalkshedResult {
    let geoms = TractGeometries::new(tracts, &config.crs);
    TractClipper::new(tracts, &geoms, config).clip(buffer)
}
