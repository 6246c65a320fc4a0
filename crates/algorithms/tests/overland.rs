//! Overland flow planes from a raster DEM

use approx::assert_relative_eq;
use geo_types::{Coord, LineString, Polygon};
use hydrodiv_algorithms::delineation::{delineate, DelineationParams, OutletSources};
use hydrodiv_algorithms::geometry::{geodesic_distance_km, multipolygon_centroid, FlowlineIndex};
use hydrodiv_algorithms::overland::{overland_segment, Catchment, FlowPlaneEstimator, OverlandParams};
use hydrodiv_core::{Comid, DemSampler, ElevationSample, FlowlineNode, FlowlineShape, GeoTransform, Network, Raster};

/// 10x10 DEM over [0, 0.1]², rising 10 m per column eastward from 100 m
fn dem() -> DemSampler<f64> {
    let data: Vec<f64> = (0..100).map(|i| 100.0 + 10.0 * (i % 10) as f64).collect();
    let mut raster = Raster::from_vec(data, 10, 10).unwrap();
    raster.set_transform(GeoTransform::new(0.0, 0.1, 0.01, -0.01));
    DemSampler::new(raster)
}

fn square(x0: f64, y0: f64, side: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (x0, y0),
            (x0 + side, y0),
            (x0 + side, y0 + side),
            (x0, y0 + side),
            (x0, y0),
        ]),
        vec![],
    )
}

/// Flowline down the western column of cell centers
fn western_flowline(sampler: &DemSampler<f64>) -> FlowlineShape {
    let coords = (0..10).map(|row| sampler.raster().pixel_to_geo(0, row)).collect();
    FlowlineShape::new(1, coords)
}

#[test]
fn test_geodesic_reference_values() {
    let origin = Coord { x: 0.0, y: 0.0 };
    assert_eq!(geodesic_distance_km(origin, origin), 0.0);
    let d = geodesic_distance_km(origin, Coord { x: 1.0, y: 0.0 });
    assert!((d - 111.19).abs() < 0.5, "{d}");
}

#[test]
fn test_clamp_ignores_elevation_difference() {
    let params = OverlandParams::default();
    let a = ElevationSample::new(0.0, 0.0, 2000.0);
    let b = ElevationSample::new(0.01 / 111.32, 0.0, 0.0);
    assert_eq!(overland_segment(&a, &b, &params), (0.1, 1e-5));
}

#[test]
fn test_unit_square_centroid() {
    let c = multipolygon_centroid(&vec![square(0.0, 0.0, 1.0)].into()).unwrap();
    assert_relative_eq!(c.x, 0.5);
    assert_relative_eq!(c.y, 0.5);
}

#[test]
fn test_estimate_from_dem() {
    let sampler = dem();
    let flowlines = FlowlineIndex::new(vec![western_flowline(&sampler)]);
    let catchment = Catchment {
        comid: Comid(1),
        polygon: square(0.0, 0.0, 0.1),
        area_km2: 123.0,
    };

    let estimator = FlowPlaneEstimator::new(&sampler);
    let plane = estimator.estimate(Comid(1), &[&catchment], &flowlines).unwrap();

    assert_eq!(plane.catchments, 1);
    assert_relative_eq!(plane.area_km2, 123.0);
    assert_relative_eq!(plane.elevation_m, 145.0, epsilon = 1e-9);
    assert_relative_eq!(plane.centroid.x, 0.05, epsilon = 1e-9);
    assert_relative_eq!(plane.centroid.y, 0.05, epsilon = 1e-9);

    // 10 m per ~1.11 km column, diluted by the clamped western column
    let per_column = 10.0 / (geodesic_distance_km(Coord { x: 0.0, y: 0.05 }, Coord { x: 0.01, y: 0.05 }) * 1000.0);
    assert_relative_eq!(plane.slope, (9.0 * per_column + 1e-5) / 10.0, max_relative = 1e-4);
    assert!(plane.length_m > 100.0);

    assert_eq!(estimator.cache().len(), 1);
    let cached = estimator.estimate(Comid(1), &[], &flowlines).unwrap();
    assert_eq!(cached, plane);
}

#[test]
fn test_estimate_all_over_watershed() {
    let sampler = dem();
    let network = Network::from_records(vec![
        FlowlineNode::new(1, 1, None, None, 123.0),
    ])
    .unwrap();
    let flowlines = FlowlineIndex::new(vec![western_flowline(&sampler)]);
    let watershed = delineate(&network, &OutletSources::default(), &DelineationParams::default()).unwrap();

    let catchments = vec![
        Catchment {
            comid: Comid(1),
            polygon: square(0.0, 0.0, 0.1),
            area_km2: 123.0,
        },
    ];
    let estimator = FlowPlaneEstimator::new(&sampler).with_cache_capacity(4);
    let planes = estimator.estimate_all(&watershed, &catchments, &flowlines).unwrap();
    assert_eq!(planes.len(), 1);
    assert_eq!(planes[0].outlet, Comid(1));

    // a catchment outside the DEM has no samples and its subbasin is skipped
    let outside = vec![Catchment {
        comid: Comid(1),
        polygon: square(5.0, 5.0, 0.1),
        area_km2: 10.0,
    }];
    let fresh = FlowPlaneEstimator::new(&sampler).with_params(OverlandParams::default());
    assert!(fresh.estimate_all(&watershed, &outside, &flowlines).unwrap().is_empty());
}
