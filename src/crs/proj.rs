use ahash::AHashMap;
use anyhow::{anyhow, Context, Result};
use geo::{BoundingRect, Centroid, Coord, Geometry, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// PROJ.4 string for the source geographic CRS (degrees → radians handled in code).
const GEOGRAPHIC_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// A UTM zone, identified by number and hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct UtmZone {
    zone: u32,
    south: bool,
}

impl UtmZone {
    /// The zone containing the given lon/lat position.
    pub(crate) fn containing(center: Coord<f64>) -> Self {
        let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
        Self { zone, south: center.y < 0.0 }
    }

    /// Build PROJ.4 string for this UTM zone on the WGS84 datum.
    fn proj4(&self) -> String {
        let south = if self.south { " +south" } else { "" };
        format!("+proj=utm +zone={}{south} +datum=WGS84 +units=m +no_defs +type=crs", self.zone)
    }
}

/// Forward/inverse projection pair between lon/lat and one UTM zone.
pub(crate) struct Projector {
    geographic: Proj4,
    utm: Proj4,
}

impl Projector {
    fn new(zone: UtmZone) -> Result<Self> {
        let geographic = Proj4::from_proj_string(GEOGRAPHIC_PROJ4)
            .with_context(|| anyhow!("failed to build source PROJ.4: {GEOGRAPHIC_PROJ4}"))?;

        let utm = {
            let proj_string = zone.proj4();
            Proj4::from_proj_string(&proj_string)
                .with_context(|| anyhow!("failed to build target PROJ.4: {proj_string}"))?
        };

        Ok(Self { geographic, utm })
    }

    /// Reproject a lon/lat geometry into UTM meters.
    pub(crate) fn to_metric(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        geometry.try_map_coords(|coord: Coord<f64>| {
            let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
            transform(&self.geographic, &self.utm, &mut point)
                .with_context(|| anyhow!("CRS transform failed at ({}, {})", coord.x, coord.y))?;
            Ok(Coord { x: point.0, y: point.1 })
        })
    }

    /// Reproject a UTM polygon back into lon/lat degrees.
    pub(crate) fn to_geographic(&self, shape: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        shape.try_map_coords(|coord: Coord<f64>| {
            let mut point = (coord.x, coord.y, 0.0);
            transform(&self.utm, &self.geographic, &mut point)
                .with_context(|| anyhow!("inverse CRS transform failed at ({}, {})", coord.x, coord.y))?;
            Ok(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
        })
    }
}

/// Lazily built projectors, one per UTM zone touched by a computation.
#[derive(Default)]
pub(crate) struct Projections {
    zones: AHashMap<UtmZone, Projector>,
}

impl Projections {
    /// The projector for the zone containing `geometry`'s centroid.
    pub(crate) fn for_geometry(&mut self, geometry: &Geometry<f64>) -> Result<&Projector> {
        let center = geometry.centroid()
            .map(|point| point.0)
            .or_else(|| geometry.bounding_rect().map(|rect| rect.center()))
            .ok_or_else(|| anyhow!("geometry is empty"))?;

        let zone = UtmZone::containing(center);
        if !self.zones.contains_key(&zone) {
            self.zones.insert(zone, Projector::new(zone)?);
        }
        self.zones.get(&zone).ok_or_else(|| anyhow!("projector for {zone:?} missing"))
    }

    #[inline] pub(crate) fn len(&self) -> usize { self.zones.len() }
}
