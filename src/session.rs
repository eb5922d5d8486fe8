use std::sync::Arc;

use tracing::{debug, info, info_span};

use crate::{
    buffer::unified_buffer,
    cache::WalkshedCache,
    clip::{density, TractClipper},
    config::{EmptySelectionPolicy, WalkshedConfig},
    error::{Result, WalkshedError},
    feature::FeatureCollection,
    geom::{guarded, TractGeometries},
    progress::{NoProgress, Progress, Stage},
    result::{ClippedTract, Diagnostics, WalkshedResult, WalkshedSummary},
    selection::{CacheKey, Categories, Selection, TransitCategory},
    units::{round_to, sq_meters_to_sq_miles},
};

/// Region-wide figures computed once when a session is built.
#[derive(Debug, Clone)]
pub struct Baseline {
    /// Sum of population across every tract, rounded.
    pub total_population: u64,
    /// Sum of tract areas in square miles.
    pub total_area_sqmi: f64,
    /// Every tract unclipped, with its own population, area and density.
    pub full_region: Arc<WalkshedResult>,
}

impl Baseline {
    fn compute(tracts: &FeatureCollection, geoms: &TractGeometries, population_field: &str) -> Self {
        let mut diagnostics = Diagnostics::default();
        let mut clipped = Vec::new();

        for (idx, tract) in tracts.iter().enumerate() {
            let Some(shape) = geoms.shape(idx) else {
                diagnostics.tracts_missing_geometry += 1;
                continue;
            };
            let population = tract.population(population_field).round() as u64;
            let area_sqmi = sq_meters_to_sq_miles(geoms.area_m2(idx));
            clipped.push(ClippedTract {
                index: idx,
                geometry: shape.clone(),
                population,
                area_sqmi: round_to(area_sqmi, 4),
                density: density(population, area_sqmi),
                properties: tract.properties.clone(),
            });
            diagnostics.tracts_clipped += 1;
        }

        let total_population = tracts.iter()
            .map(|tract| tract.population(population_field))
            .sum::<f64>()
            .round() as u64;
        let total_area_sqmi = sq_meters_to_sq_miles(geoms.total_area_m2());

        Self {
            total_population,
            total_area_sqmi,
            full_region: Arc::new(WalkshedResult {
                tracts: clipped,
                total_population,
                total_area_sqmi,
                buffer: None,
                diagnostics,
            }),
        }
    }
}

/// Owns everything a walkshed computation needs: tract inputs, transit
/// categories, configuration, the baseline and the result cache.
///
/// Inputs are read-only once computations start; `walkshed` can be called
/// from several threads at once.
pub struct Session {
    config: WalkshedConfig,
    tracts: FeatureCollection,
    geoms: TractGeometries,
    categories: Categories,
    baseline: Baseline,
    cache: WalkshedCache,
}

impl Session {
    /// Prepare a session over `tracts`: index their geometry and compute the baseline.
    pub fn new(tracts: FeatureCollection, config: WalkshedConfig) -> Result<Self> {
        config.crs.validate()?;

        let geoms = TractGeometries::new(&tracts, &config.crs);
        let baseline = Baseline::compute(&tracts, &geoms, &config.population_field);
        info!(
            tracts = tracts.len(),
            population = baseline.total_population,
            area_sqmi = baseline.total_area_sqmi,
            bounds = ?geoms.bounds(),
            "prepared tracts"
        );

        Ok(Self {
            config,
            tracts,
            geoms,
            categories: Categories::default(),
            baseline,
            cache: WalkshedCache::new(),
        })
    }

    /// Register a transit category. Categories keep their registration order.
    pub fn register(&mut self, category: TransitCategory) -> Result<()> {
        debug!(code = %category.code(), name = category.name(), geometries = category.len(), "registered category");
        self.categories.register(category)
    }

    /// Builder-style `register`.
    pub fn with_category(mut self, category: TransitCategory) -> Result<Self> {
        self.register(category)?;
        Ok(self)
    }

    #[inline] pub fn config(&self) -> &WalkshedConfig { &self.config }

    #[inline] pub fn tracts(&self) -> &FeatureCollection { &self.tracts }

    #[inline] pub fn categories(&self) -> &[TransitCategory] { self.categories.as_slice() }

    #[inline] pub fn baseline(&self) -> &Baseline { &self.baseline }

    #[inline] pub fn cache(&self) -> &WalkshedCache { &self.cache }

    /// The cache key of a selection, after validating its radius and categories.
    pub fn key(&self, selection: &Selection) -> Result<CacheKey> {
        self.config.validate_radius(selection.radius_ft())?;
        self.categories.key(selection)
    }

    /// Walkshed for the selection, served from the cache when possible.
    pub fn walkshed(&self, selection: &Selection) -> Result<Arc<WalkshedResult>> {
        self.walkshed_with_progress(selection, &NoProgress)
    }

    /// As `walkshed`, notifying `progress` around each stage of a fresh computation.
    pub fn walkshed_with_progress(&self, selection: &Selection, progress: &dyn Progress) -> Result<Arc<WalkshedResult>> {
        let key = self.key(selection)?;
        let label = key.label(self.categories.as_slice());
        let _span = info_span!("walkshed", key = %label).entered();

        if let Some(hit) = self.cache.get(&key) {
            debug!("cache hit");
            return Ok(hit);
        }

        let layers = self.categories.active(key)
            .flat_map(|category| [category.stops(), category.lines()])
            .filter(|layer| !layer.is_empty())
            .collect::<Vec<_>>();

        if layers.is_empty() {
            debug!(policy = ?self.config.empty_selection, "no input geometries");
            let neutral = match self.config.empty_selection {
                EmptySelectionPolicy::Empty => Arc::new(WalkshedResult::empty()),
                EmptySelectionPolicy::Baseline => Arc::clone(&self.baseline.full_region),
            };
            return Ok(self.cache.insert(key, neutral));
        }

        let result = guarded(|| self.compute(&layers, key.radius_ft(), progress))
            .map_err(WalkshedError::Computation)?;
        info!(
            population = result.total_population,
            area_sqmi = result.total_area_sqmi,
            tracts = result.tracts.len(),
            "computed walkshed"
        );
        Ok(self.cache.insert(key, result))
    }

    /// Headline figures for `result` relative to the baseline population.
    pub fn summary(&self, result: &WalkshedResult) -> WalkshedSummary {
        result.summary(self.baseline.total_population)
    }

    fn compute(&self, layers: &[&FeatureCollection], radius_ft: u32, progress: &dyn Progress) -> WalkshedResult {
        progress.started(Stage::Buffering);
        let report = unified_buffer(layers.iter().copied(), radius_ft, &self.config.crs);
        progress.finished(Stage::Buffering);

        progress.started(Stage::Clipping);
        let mut result = TractClipper::new(&self.tracts, &self.geoms, &self.config).clip(report.polygon.as_ref());
        progress.finished(Stage::Clipping);

        result.diagnostics.record_buffers(&report);
        result
    }
}
