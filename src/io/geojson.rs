use geo::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use serde_json::{json, Value};

use crate::feature::FeatureCollection;

/// Convert a feature collection to a GeoJSON FeatureCollection value.
/// Features without geometry are written with a `null` geometry.
pub(crate) fn feature_collection_to_geojson(collection: &FeatureCollection) -> Value {
    let features = collection.iter()
        .map(|feature| json!({
            "type": "Feature",
            "geometry": feature.geometry.as_ref().map_or(Value::Null, geometry_to_geojson),
            "properties": feature.properties,
        }))
        .collect::<Vec<_>>();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Helper to convert a MultiPolygon to a serde_json::Value representing GeoJSON Geometry.
pub(crate) fn multipolygon_to_geojson(mp: &MultiPolygon<f64>) -> Value {
    json!({
        "type": "MultiPolygon",
        "coordinates": mp.0.iter().map(polygon_coords).collect::<Vec<_>>(),
    })
}

/// Convert any geometry to a GeoJSON Geometry value.
pub(crate) fn geometry_to_geojson(geometry: &Geometry<f64>) -> Value {
    match geometry {
        Geometry::Point(p) => json!({ "type": "Point", "coordinates": position(&p.0) }),
        Geometry::Line(line) => json!({
            "type": "LineString",
            "coordinates": [position(&line.start), position(&line.end)],
        }),
        Geometry::LineString(ls) => json!({ "type": "LineString", "coordinates": ring_coords(ls) }),
        Geometry::Polygon(polygon) => json!({ "type": "Polygon", "coordinates": polygon_coords(polygon) }),
        Geometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": mp.0.iter().map(|p| position(&p.0)).collect::<Vec<_>>(),
        }),
        Geometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": mls.0.iter().map(ring_coords).collect::<Vec<_>>(),
        }),
        Geometry::MultiPolygon(mp) => multipolygon_to_geojson(mp),
        Geometry::GeometryCollection(gc) => json!({
            "type": "GeometryCollection",
            "geometries": gc.0.iter().map(geometry_to_geojson).collect::<Vec<_>>(),
        }),
        Geometry::Rect(rect) => json!({ "type": "Polygon", "coordinates": polygon_coords(&rect.to_polygon()) }),
        Geometry::Triangle(tri) => json!({ "type": "Polygon", "coordinates": polygon_coords(&tri.to_polygon()) }),
    }
}

#[inline]
fn position(c: &Coord<f64>) -> [f64; 2] { [c.x, c.y] }

/// Exterior ring followed by holes.
fn polygon_coords(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_coords)
        .collect()
}

fn ring_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(position).collect()
}

#[cfg(test)]
mod tests {
    use geo::{point, polygon};
    use serde_json::json;

    use super::*;
    use crate::feature::Feature;

    #[test]
    fn polygon_with_hole() {
        let shape = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0)]],
        );
        let value = multipolygon_to_geojson(&MultiPolygon(vec![shape]));
        assert_eq!(value["type"], json!("MultiPolygon"));
        let rings = value["coordinates"][0].as_array().unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0][0], json!([0.0, 0.0]));
        assert_eq!(rings[0].as_array().unwrap().len(), 5);
    }

    #[test]
    fn collection_keeps_properties_and_null_geometry() {
        let collection = FeatureCollection::new(vec![
            Feature::new(point!(x: -122.33, y: 47.62)).with_property("name", "Westlake"),
            Feature::default(),
        ]);
        let value = feature_collection_to_geojson(&collection);
        assert_eq!(value["features"][0]["geometry"], json!({ "type": "Point", "coordinates": [-122.33, 47.62] }));
        assert_eq!(value["features"][0]["properties"]["name"], json!("Westlake"));
        assert_eq!(value["features"][1]["geometry"], Value::Null);
    }
}
