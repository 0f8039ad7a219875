//! Tests for geographic and pixel bounding boxes

extern crate std;

use crate::coordinate::{GeoBounds, PixelBounds, Point};

#[test]
fn test_geo_bounds_center() {
    let bounds = GeoBounds::new(-1.0, 1.0, 50.0, 52.0);
    let (lon, lat) = bounds.center();
    std::assert_eq!(lon, 0.0);
    std::assert_eq!(lat, 51.0);
}

#[test]
fn test_geo_bounds_tuple_round_trip() {
    let bounds = GeoBounds::new(-4.83, -4.21, 55.8, 56.1);
    let text = bounds.to_tuple_string();
    let parsed = GeoBounds::from_string(&text).unwrap();
    std::assert_eq!(parsed, bounds);
}

#[test]
fn test_geo_bounds_from_string_without_parens() {
    let parsed = GeoBounds::from_string("-1.0, 1.0, 50.0, 52.0").unwrap();
    std::assert_eq!(parsed, GeoBounds::new(-1.0, 1.0, 50.0, 52.0));
}

#[test]
fn test_geo_bounds_rejects_short_tuple() {
    std::assert!(GeoBounds::from_string("(1.0, 2.0, 3.0)").is_err());
}

#[test]
fn test_geo_bounds_contains() {
    let bounds = GeoBounds::new(-1.0, 1.0, 50.0, 52.0);
    std::assert!(bounds.contains(&Point::new(0.0, 51.0)));
    std::assert!(!bounds.contains(&Point::new(2.0, 51.0)));
}

#[test]
fn test_pixel_bounds_dimensions() {
    let bounds = PixelBounds::new(100, 200, 150, 260);
    std::assert_eq!(bounds.width(), 50);
    std::assert_eq!(bounds.height(), 60);
}

#[test]
fn test_pixel_bounds_validation() {
    std::assert!(PixelBounds::new(0, 0, 10, 10).validate().is_ok());
    std::assert!(PixelBounds::new(10, 0, 10, 10).validate().is_err());
    std::assert!(PixelBounds::new(0, 12, 10, 10).validate().is_err());
}

#[test]
fn test_pixel_bounds_fits_within() {
    let bounds = PixelBounds::new(50, 50, 100, 100);
    std::assert!(bounds.fits_within(100, 100));
    std::assert!(!bounds.fits_within(99, 100));
}
