//! Tests for coordinate transformations

extern crate std;

use crate::coordinate::{CoordinateSystem, CoordinateTransformer, Point};

#[test]
fn test_web_mercator_round_trip() {
    let transformer = CoordinateTransformer;
    let original = Point::new(-4.25, 55.86);

    let projected = transformer.wgs84_to_web_mercator(original.x, original.y);
    let restored = transformer.web_mercator_to_wgs84(projected.x, projected.y);

    std::assert!((restored.x - original.x).abs() < 1e-9);
    std::assert!((restored.y - original.y).abs() < 1e-9);
}

#[test]
fn test_identity_transform() {
    let transformer = CoordinateTransformer;
    let point = Point::new(-4.25, 55.86);
    let result = transformer
        .transform_point(&point, &CoordinateSystem::WGS84, &CoordinateSystem::WGS84)
        .unwrap();
    std::assert_eq!(result, point);
}

#[test]
fn test_unsupported_pair_is_an_error() {
    let transformer = CoordinateTransformer;
    let point = Point::new(300_000.0, 700_000.0);
    let result = transformer.transform_point(
        &point,
        &CoordinateSystem::Other(27700),
        &CoordinateSystem::WGS84,
    );
    std::assert!(result.is_err());
}

#[test]
fn test_reproject_corners_orders_bounds() {
    let transformer = CoordinateTransformer;
    // Corners deliberately out of order; the envelope must still come
    // back sorted
    let corners = [
        Point::new(1.0, 52.0),
        Point::new(-1.0, 52.0),
        Point::new(1.0, 50.0),
        Point::new(-1.0, 50.0),
    ];
    let bounds = transformer
        .reproject_corners(&corners, &CoordinateSystem::WGS84, &CoordinateSystem::WGS84)
        .unwrap();
    std::assert_eq!(bounds.lon_min, -1.0);
    std::assert_eq!(bounds.lon_max, 1.0);
    std::assert_eq!(bounds.lat_min, 50.0);
    std::assert_eq!(bounds.lat_max, 52.0);
}
