//! Tests for raster header parsing

extern crate std;

use std::io::Cursor;

use crate::coordinate::CoordinateSystem;
use crate::tiff::RasterHeader;
use super::test_utils::{build_geotiff_bytes, GeoFixture};

#[test]
fn test_plain_tiff_header() {
    let bytes = build_geotiff_bytes(200, 100, 3, None);
    let mut cursor = Cursor::new(bytes);

    let header = RasterHeader::read(&mut cursor).unwrap();
    std::assert_eq!(header.width, 200);
    std::assert_eq!(header.height, 100);
    std::assert_eq!(header.channels, 3);
    std::assert!(!header.is_big_tiff);
    std::assert!(header.crs.is_none());
    std::assert!(header.pixel_scale.is_none());
}

#[test]
fn test_geotiff_header() {
    let bytes = build_geotiff_bytes(
        100,
        200,
        3,
        Some(GeoFixture {
            epsg: 4326,
            origin_x: -1.0,
            origin_y: 52.0,
            scale_x: 0.02,
            scale_y: 0.01,
        }),
    );
    let mut cursor = Cursor::new(bytes);

    let header = RasterHeader::read(&mut cursor).unwrap();
    std::assert_eq!(header.crs, Some(CoordinateSystem::WGS84));
    std::assert_eq!(header.pixel_scale, Some((0.02, 0.01)));
    std::assert_eq!(header.shape(), (200, 100, 3));

    let tiepoint = header.tiepoint.unwrap();
    std::assert_eq!(tiepoint[3], -1.0);
    std::assert_eq!(tiepoint[4], 52.0);
}

#[test]
fn test_native_corners_from_geotransform() {
    let bytes = build_geotiff_bytes(
        100,
        200,
        3,
        Some(GeoFixture {
            epsg: 4326,
            origin_x: -1.0,
            origin_y: 52.0,
            scale_x: 0.02,
            scale_y: 0.01,
        }),
    );
    let mut cursor = Cursor::new(bytes);
    let header = RasterHeader::read(&mut cursor).unwrap();

    let corners = header.native_corners().unwrap();
    // top-left
    std::assert_eq!(corners[0].x, -1.0);
    std::assert_eq!(corners[0].y, 52.0);
    // bottom-right: left + 100 * 0.02, top - 200 * 0.01
    std::assert!((corners[3].x - 1.0).abs() < 1e-12);
    std::assert!((corners[3].y - 50.0).abs() < 1e-12);
}

#[test]
fn test_native_corners_need_geotransform() {
    let bytes = build_geotiff_bytes(10, 10, 1, None);
    let mut cursor = Cursor::new(bytes);
    let header = RasterHeader::read(&mut cursor).unwrap();
    std::assert!(header.native_corners().is_err());
}

#[test]
fn test_rejects_non_tiff_input() {
    let mut cursor = Cursor::new(vec![0x50, 0x4E, 0x47, 0x00, 0x00, 0x00]);
    std::assert!(RasterHeader::read(&mut cursor).is_err());
}
