mod proj;

use anyhow::{anyhow, ensure, Result};
use geo::{Area, Buffer, ChamberlainDuquetteArea, Geometry, MultiPolygon};
use serde::{Deserialize, Serialize};

pub(crate) use proj::Projections;

/// Coordinate system shared by every input geometry of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSystem {
    /// WGS84 longitude/latitude in degrees. Buffers are built in the local
    /// UTM zone and areas are computed on the sphere.
    #[default]
    LonLat,
    /// Cartesian coordinates; one unit spans `meters_per_unit` meters.
    Planar { meters_per_unit: f64 },
}

impl CoordinateSystem {
    /// Reject planar systems with a non-positive or non-finite unit scale.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Self::Planar { meters_per_unit } = *self {
            ensure!(
                meters_per_unit.is_finite() && meters_per_unit > 0.0,
                "meters_per_unit must be positive and finite, got {meters_per_unit}"
            );
        }
        Ok(())
    }

    /// Area of `shape` in square meters.
    pub(crate) fn area_m2(&self, shape: &MultiPolygon<f64>) -> f64 {
        match *self {
            Self::LonLat => shape.chamberlain_duquette_unsigned_area(),
            Self::Planar { meters_per_unit } => shape.unsigned_area() * meters_per_unit * meters_per_unit,
        }
    }

    /// Buffer `geometry` by `radius_m` meters, returning the polygon in this
    /// coordinate system's native units.
    pub(crate) fn buffer(
        &self,
        geometry: &Geometry<f64>,
        radius_m: f64,
        projections: &mut Projections,
    ) -> Result<MultiPolygon<f64>> {
        let buffered = match *self {
            Self::LonLat => {
                let projector = projections.for_geometry(geometry)?;
                let metric = projector.to_metric(geometry)?;
                projector.to_geographic(&metric.buffer(radius_m))?
            }
            Self::Planar { meters_per_unit } => geometry.buffer(radius_m / meters_per_unit),
        };

        if buffered.0.is_empty() {
            return Err(anyhow!("buffer produced no polygons"));
        }
        Ok(buffered)
    }
}
