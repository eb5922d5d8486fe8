use serde::{Deserialize, Serialize};

use crate::{crs::CoordinateSystem, error::{Result, WalkshedError}};

/// Default attribute holding a tract's population.
pub const DEFAULT_POPULATION_FIELD: &str = "TOTAL_POPULATION";

/// Default buffer radius: a quarter mile.
pub const DEFAULT_RADIUS_FT: u32 = 1320;

/// What a selection with no input geometries resolves to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySelectionPolicy {
    /// No tracts, zero population, zero area, no buffer outline.
    #[default]
    Empty,
    /// Every tract unclipped, as if nothing were excluded.
    Baseline,
}

/// Session-wide settings supplied by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkshedConfig {
    /// Tract attribute read as population (e.g. `TOTAL_POPULATION`, `pop50`).
    pub population_field: String,

    /// Coordinate system of every input geometry.
    pub crs: CoordinateSystem,

    /// Discrete radius choices in feet. Empty accepts any positive radius.
    pub allowed_radii_ft: Vec<u32>,

    pub empty_selection: EmptySelectionPolicy,
}

impl Default for WalkshedConfig {
    fn default() -> Self {
        Self {
            population_field: DEFAULT_POPULATION_FIELD.to_string(),
            crs: CoordinateSystem::default(),
            allowed_radii_ft: Vec::new(),
            empty_selection: EmptySelectionPolicy::default(),
        }
    }
}

impl WalkshedConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder-style setter for the population attribute.
    pub fn with_population_field(mut self, field: impl Into<String>) -> Self {
        self.population_field = field.into();
        self
    }

    /// Builder-style setter for the coordinate system.
    pub fn with_crs(mut self, crs: CoordinateSystem) -> Self {
        self.crs = crs;
        self
    }

    /// Builder-style setter for the allowed radius choices.
    pub fn with_allowed_radii(mut self, radii_ft: impl IntoIterator<Item = u32>) -> Self {
        self.allowed_radii_ft = radii_ft.into_iter().collect();
        self
    }

    /// Builder-style setter for the empty-selection policy.
    pub fn with_empty_selection(mut self, policy: EmptySelectionPolicy) -> Self {
        self.empty_selection = policy;
        self
    }

    /// Check that `radius_ft` is positive and one of the allowed choices.
    pub fn validate_radius(&self, radius_ft: u32) -> Result<()> {
        if radius_ft == 0 {
            return Err(WalkshedError::InvalidRadius(radius_ft));
        }
        if !self.allowed_radii_ft.is_empty() && !self.allowed_radii_ft.contains(&radius_ft) {
            return Err(WalkshedError::RadiusNotAllowed {
                radius: radius_ft,
                allowed: self.allowed_radii_ft.clone(),
            });
        }
        Ok(())
    }
}
