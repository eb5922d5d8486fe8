use geo::{BoundingRect, Coord, MultiPolygon, Rect};
use rstar::RTree;

use crate::{crs::CoordinateSystem, feature::FeatureCollection};

use super::{bbox::{envelope, TractBox}, has_finite_coords, to_multipolygon};

/// Tract polygons prepared for clipping: usable shapes, their ground areas,
/// and an R-tree over their bounding boxes. Indexed by tract position.
#[derive(Debug, Clone)]
pub(crate) struct TractGeometries {
    shapes: Vec<Option<MultiPolygon<f64>>>,
    areas_m2: Vec<f64>,
    rtree: RTree<TractBox>,
}

impl TractGeometries {
    /// Prepare the tracts of a collection. Tracts with missing, non-areal or
    /// non-finite geometry are kept as `None` so indices stay aligned.
    pub(crate) fn new(tracts: &FeatureCollection, crs: &CoordinateSystem) -> Self {
        let shapes = tracts.iter()
            .map(|tract| tract.geometry.as_ref()
                .filter(|geometry| has_finite_coords(geometry))
                .and_then(to_multipolygon))
            .collect::<Vec<_>>();

        let areas_m2 = shapes.iter()
            .map(|shape| shape.as_ref().map_or(0.0, |shape| crs.area_m2(shape)))
            .collect();

        let rtree = RTree::bulk_load(
            shapes.iter().enumerate()
                .filter_map(|(i, shape)| Some(TractBox::new(i, shape.as_ref()?.bounding_rect()?)))
                .collect()
        );

        Self { shapes, areas_m2, rtree }
    }

    /// Get the number of tracts, usable or not.
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// Get the usable shape of a tract, if any.
    #[inline] pub(crate) fn shape(&self, idx: usize) -> Option<&MultiPolygon<f64>> { self.shapes[idx].as_ref() }

    /// Get the ground area of a tract in m² (0 for unusable tracts).
    #[inline] pub(crate) fn area_m2(&self, idx: usize) -> f64 { self.areas_m2[idx] }

    /// Sum of all tract areas in m².
    #[inline] pub(crate) fn total_area_m2(&self) -> f64 { self.areas_m2.iter().sum() }

    /// Flag every tract whose bounding box overlaps `rect`.
    pub(crate) fn overlapping(&self, rect: &Rect<f64>) -> Vec<bool> {
        let mut hits = vec![false; self.len()];
        for candidate in self.rtree.locate_in_envelope_intersecting(&envelope(rect)) {
            hits[candidate.idx()] = true;
        }
        hits
    }

    /// Compute the bounding rectangle of all usable tracts.
    pub(crate) fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|shape| shape.as_ref()?.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }
}
