mod bbox;
mod geom;

use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::{CoordsIter, Geometry, MultiPolygon};

pub(crate) use geom::TractGeometries;

/// Run a geometry-kernel operation, turning a panic into an error message.
/// Boolean operations on near-degenerate input may panic deep inside the kernel;
/// callers treat that as a per-item failure.
pub(crate) fn guarded<T>(op: impl FnOnce() -> T) -> Result<T, String> {
    catch_unwind(AssertUnwindSafe(op)).map_err(|payload| {
        payload.downcast_ref::<&str>().map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "geometry kernel panicked".to_string())
    })
}

/// Check that a geometry has at least one coordinate and all coordinates are finite.
pub(crate) fn has_finite_coords(geometry: &Geometry<f64>) -> bool {
    let mut coords = geometry.coords_iter().peekable();
    coords.peek().is_some() && coords.all(|c| c.x.is_finite() && c.y.is_finite())
}

/// Convert an areal geometry into a MultiPolygon. Non-areal geometries yield `None`.
pub(crate) fn to_multipolygon(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    let shape = match geometry {
        Geometry::Polygon(polygon) => MultiPolygon(vec![polygon.clone()]),
        Geometry::MultiPolygon(shape) => shape.clone(),
        Geometry::Rect(rect) => MultiPolygon(vec![rect.to_polygon()]),
        Geometry::Triangle(triangle) => MultiPolygon(vec![triangle.to_polygon()]),
        Geometry::GeometryCollection(collection) => MultiPolygon(
            collection.0.iter()
                .filter_map(to_multipolygon)
                .flat_map(|shape| shape.0)
                .collect()
        ),
        _ => return None,
    };
    (!shape.0.is_empty()).then_some(shape)
}

#[cfg(test)]
mod tests {
    use geo::{line_string, point, polygon, Rect};

    use super::*;

    #[test]
    fn guarded_catches_panics() {
        assert_eq!(guarded(|| 2 + 2), Ok(4));
        let err = guarded(|| -> i32 { panic!("boom") }).unwrap_err();
        assert_eq!(err, "boom");
    }

    #[test]
    fn finite_coordinate_check() {
        assert!(has_finite_coords(&point!(x: 1.0, y: 2.0).into()));
        assert!(!has_finite_coords(&point!(x: f64::NAN, y: 2.0).into()));
        assert!(!has_finite_coords(&Geometry::LineString(line_string![])));
    }

    #[test]
    fn areal_geometries_convert() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        assert_eq!(to_multipolygon(&square.clone().into()).unwrap().0.len(), 1);

        let rect = Rect::new((0.0, 0.0), (2.0, 2.0));
        assert_eq!(to_multipolygon(&rect.into()).unwrap().0.len(), 1);

        assert!(to_multipolygon(&point!(x: 0.0, y: 0.0).into()).is_none());
        assert!(to_multipolygon(&MultiPolygon::<f64>(vec![]).into()).is_none());
    }
}
