use geo::Geometry;
use serde_json::{Map, Value};

/// Attribute map carried by a feature, as it would appear in GeoJSON `properties`.
pub type Properties = Map<String, Value>;

/// A geographic shape with named attributes.
///
/// The geometry is optional because source datasets routinely contain
/// features without one; those are skipped rather than rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    pub properties: Properties,
}

impl Feature {
    /// Construct a feature with the given geometry and no attributes.
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self { geometry: Some(geometry.into()), properties: Properties::new() }
    }

    /// Construct a feature that has attributes but no geometry.
    pub fn without_geometry(properties: Properties) -> Self {
        Self { geometry: None, properties }
    }

    /// Builder-style attribute setter.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Read a numeric attribute. Numeric strings are accepted.
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.properties.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Population stored under `field`; absent, non-numeric or negative values count as 0.
    pub fn population(&self, field: &str) -> f64 {
        self.number(field)
            .filter(|pop| pop.is_finite() && *pop > 0.0)
            .unwrap_or(0.0)
    }
}

/// An ordered sequence of features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self { Self { features } }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    #[inline] pub fn iter(&self) -> std::slice::Iter<'_, Feature> { self.features.iter() }

    pub fn push(&mut self, feature: Feature) { self.features.push(feature) }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self { features: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter { self.features.iter() }
}
