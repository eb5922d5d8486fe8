use geo::Rect;
use rstar::{RTreeObject, AABB};

/// Envelope of a rectangle, for R-tree queries and entries alike.
#[inline]
pub(super) fn envelope(rect: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners(rect.min().into(), rect.max().into())
}

/// R-tree entry for one usable tract: its extent and its position in the
/// tract collection, so a hit maps straight back to population and shape.
#[derive(Debug, Clone)]
pub(super) struct TractBox {
    tract: usize,
    extent: Rect<f64>,
}

impl TractBox {
    pub(super) fn new(tract: usize, extent: Rect<f64>) -> Self {
        Self { tract, extent }
    }

    /// Position of the tract in its collection.
    pub(super) fn idx(&self) -> usize { self.tract }
}

impl RTreeObject for TractBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { envelope(&self.extent) }
}
