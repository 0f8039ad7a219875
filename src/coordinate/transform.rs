//! Coordinate transformation functionality

use std::f64::consts::PI;

use crate::errors::{PatchError, PatchResult};
use super::bounds::GeoBounds;
use super::crs::CoordinateSystem;
use super::point::Point;

/// Transformer for converting between coordinate systems
pub struct CoordinateTransformer;

impl CoordinateTransformer {
    /// Earth radius in meters (WGS84 semi-major axis)
    const EARTH_RADIUS: f64 = 6378137.0;

    /// Convert from WGS84 (EPSG:4326) to Web Mercator (EPSG:3857)
    pub fn wgs84_to_web_mercator(&self, lon: f64, lat: f64) -> Point {
        // Web Mercator is undefined at the poles - constrain latitude
        // to its valid range (~85.05 degrees)
        let lat = lat.clamp(-85.05, 85.05);

        let x = lon * Self::EARTH_RADIUS * PI / 180.0;
        let y = f64::ln(f64::tan((90.0 + lat) * PI / 360.0)) * Self::EARTH_RADIUS;

        Point::new(x, y)
    }

    /// Convert from Web Mercator (EPSG:3857) to WGS84 (EPSG:4326)
    pub fn web_mercator_to_wgs84(&self, x: f64, y: f64) -> Point {
        let lon = x * 180.0 / (Self::EARTH_RADIUS * PI);
        let lat = 180.0 / PI * (2.0 * f64::atan(f64::exp(y / Self::EARTH_RADIUS)) - PI / 2.0);

        Point::new(lon, lat)
    }

    /// Transform a point between coordinate systems
    ///
    /// # Arguments
    /// * `point` - The point to transform
    /// * `from_crs` - Source coordinate system
    /// * `to_crs` - Target coordinate system
    ///
    /// # Returns
    /// The transformed point, or an error for unsupported pairs
    pub fn transform_point(
        &self,
        point: &Point,
        from_crs: &CoordinateSystem,
        to_crs: &CoordinateSystem,
    ) -> PatchResult<Point> {
        if from_crs == to_crs {
            return Ok(*point);
        }

        match (from_crs, to_crs) {
            (CoordinateSystem::WGS84, CoordinateSystem::WebMercator) => {
                Ok(self.wgs84_to_web_mercator(point.x, point.y))
            }
            (CoordinateSystem::WebMercator, CoordinateSystem::WGS84) => {
                Ok(self.web_mercator_to_wgs84(point.x, point.y))
            }
            _ => Err(PatchError::GenericError(format!(
                "Unsupported coordinate transformation from {} to {}",
                from_crs.description(),
                to_crs.description()
            ))),
        }
    }

    /// Reproject corner points into a geographic bounding box
    ///
    /// Transforms every corner and takes the envelope, so a projection
    /// that flips or skews an axis still yields ordered bounds. The
    /// result follows the fixed (lon_min, lon_max, lat_min, lat_max)
    /// field order.
    ///
    /// # Arguments
    /// * `corners` - Corner points in the source system
    /// * `from_crs` - Source coordinate system
    /// * `to_crs` - Target geographic coordinate system
    ///
    /// # Returns
    /// The geographic envelope of the transformed corners
    pub fn reproject_corners(
        &self,
        corners: &[Point],
        from_crs: &CoordinateSystem,
        to_crs: &CoordinateSystem,
    ) -> PatchResult<GeoBounds> {
        if corners.is_empty() {
            return Err(PatchError::GenericError(
                "No corner points to reproject".to_string(),
            ));
        }

        let mut lon_min = f64::INFINITY;
        let mut lon_max = f64::NEG_INFINITY;
        let mut lat_min = f64::INFINITY;
        let mut lat_max = f64::NEG_INFINITY;

        for corner in corners {
            let transformed = self.transform_point(corner, from_crs, to_crs)?;
            lon_min = lon_min.min(transformed.x);
            lon_max = lon_max.max(transformed.x);
            lat_min = lat_min.min(transformed.y);
            lat_max = lat_max.max(transformed.y);
        }

        Ok(GeoBounds::new(lon_min, lon_max, lat_min, lat_max))
    }
}
