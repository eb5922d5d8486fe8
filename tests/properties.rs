// Property tests for apportionment and walkshed totals:
//   clipped figures never exceed the tract they came from, and
//   widening the radius never loses population.

use geo::{point, polygon, MultiPolygon};
use proptest::prelude::*;
use walkshed::{
    apportion, clip_tracts, CoordinateSystem, Feature, FeatureCollection, Selection, Session, TransitCategory,
    WalkshedConfig,
};

fn miles() -> WalkshedConfig {
    WalkshedConfig::default()
        .with_population_field("pop")
        .with_crs(CoordinateSystem::Planar { meters_per_unit: 1609.344 })
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]])
}

/// A 3x3 grid of one-square-mile tracts with uneven populations.
fn grid() -> FeatureCollection {
    (0..9)
        .map(|i| Feature::new(rect((i % 3) as f64, (i / 3) as f64, (i % 3) as f64 + 1.0, (i / 3) as f64 + 1.0))
            .with_property("pop", 137 * (i + 1) + 11))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn apportioned_population_is_bounded(
        population in 0.0f64..1.0e6,
        tract_area in 1.0e-3f64..1.0e9,
        share in 0.0f64..1.5,
    ) {
        let clipped = apportion(population, tract_area * share, tract_area);
        prop_assert!(clipped as f64 <= population.round());
    }

    #[test]
    fn clipped_tracts_never_exceed_their_source(
        x0 in -1.0f64..3.0,
        y0 in -1.0f64..3.0,
        width in 0.01f64..3.0,
        height in 0.01f64..3.0,
    ) {
        let tracts = grid();
        let result = clip_tracts(&tracts, Some(&rect(x0, y0, x0 + width, y0 + height)), &miles());

        for tract in &result.tracts {
            let source = &tracts.features[tract.index];
            prop_assert!(tract.population as f64 <= source.population("pop"));
            prop_assert!(tract.area_sqmi <= 1.0 + 1e-4);
        }
        let baseline: u64 = (0..9).map(|i| 137 * (i + 1) + 11).sum();
        prop_assert!(result.total_population <= baseline);
        prop_assert_eq!(result.total_population, result.tracts.iter().map(|t| t.population).sum::<u64>());
    }

    #[test]
    fn wider_radius_never_loses_population(
        x in 0.0f64..3.0,
        y in 0.0f64..3.0,
        radii in prop::sample::subsequence(vec![330u32, 660, 1320, 2640, 5280], 2),
    ) {
        let session = Session::new(grid(), miles()).unwrap()
            .with_category(TransitCategory::new('S', "Stop")
                .with_stops(FeatureCollection::new(vec![Feature::new(point!(x: x, y: y))])))
            .unwrap();

        let narrow = session.walkshed(&Selection::new(radii[0]).with('S')).unwrap();
        let wide = session.walkshed(&Selection::new(radii[1]).with('S')).unwrap();

        // Each tract rounds independently, so allow one person of slack per tract.
        prop_assert!(narrow.total_population <= wide.total_population + wide.tracts.len() as u64);
        prop_assert!(narrow.total_area_sqmi <= wide.total_area_sqmi);
    }
}
