//! Bounding box structures for geographic and pixel space

use crate::errors::{PatchError, PatchResult};
use super::point::Point;

/// A geographic bounding box in degrees
///
/// Field order is `(lon_min, lon_max, lat_min, lat_max)` — the longitude
/// pair before the latitude pair. This ordering is a fixed external
/// contract shared with the tabular export and metadata import; consumers
/// must not assume an alphabetical layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    /// Western edge, degrees longitude
    pub lon_min: f64,
    /// Eastern edge, degrees longitude
    pub lon_max: f64,
    /// Southern edge, degrees latitude
    pub lat_min: f64,
    /// Northern edge, degrees latitude
    pub lat_max: f64,
}

impl GeoBounds {
    /// Create a new geographic bounding box
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        GeoBounds {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    /// Parse a bounding box from its literal tuple text
    ///
    /// Accepts the serialized form written by the tabular export,
    /// e.g. `(-4.83, -4.21, 55.8, 56.1)`, with or without parentheses.
    ///
    /// # Arguments
    /// * `text` - Literal tuple representation in (lon_min, lon_max, lat_min, lat_max) order
    ///
    /// # Returns
    /// A GeoBounds or an error when the text does not hold four numbers
    pub fn from_string(text: &str) -> PatchResult<Self> {
        let trimmed = text.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = trimmed.split(',').collect();
        if parts.len() != 4 {
            return Err(PatchError::GenericError(format!(
                "Geo bounds must have 4 comma-separated values: {}",
                text
            )));
        }

        let mut values = [0.0f64; 4];
        for (i, part) in parts.iter().enumerate() {
            values[i] = part.trim().parse::<f64>().map_err(|_| {
                PatchError::GenericError(format!("Invalid geo bounds value: {}", part.trim()))
            })?;
        }

        Ok(GeoBounds::new(values[0], values[1], values[2], values[3]))
    }

    /// Longitude span in degrees
    pub fn lon_span(&self) -> f64 {
        (self.lon_max - self.lon_min).abs()
    }

    /// Latitude span in degrees
    pub fn lat_span(&self) -> f64 {
        (self.lat_max - self.lat_min).abs()
    }

    /// Midpoint of the box as (center_lon, center_lat)
    pub fn center(&self) -> (f64, f64) {
        (
            (self.lon_min + self.lon_max) / 2.0,
            (self.lat_min + self.lat_max) / 2.0,
        )
    }

    /// Check if this box contains a point
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.lon_min
            && point.x <= self.lon_max
            && point.y >= self.lat_min
            && point.y <= self.lat_max
    }

    /// Serialize in the fixed tuple order used by the tabular export
    pub fn to_tuple_string(&self) -> String {
        format!(
            "({}, {}, {}, {})",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

/// A patch bounding box in the parent's pixel coordinate space
///
/// Half-open on both axes: the patch covers `[min_x, max_x) x [min_y, max_y)`
/// with (0,0) at the parent's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelBounds {
    /// Leftmost column (inclusive)
    pub min_x: u32,
    /// Topmost row (inclusive)
    pub min_y: u32,
    /// Rightmost column (exclusive)
    pub max_x: u32,
    /// Bottommost row (exclusive)
    pub max_y: u32,
}

impl PixelBounds {
    /// Create a new pixel bounding box
    pub fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        PixelBounds {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Patch width in pixels
    pub fn width(&self) -> u32 {
        self.max_x.saturating_sub(self.min_x)
    }

    /// Patch height in pixels
    pub fn height(&self) -> u32 {
        self.max_y.saturating_sub(self.min_y)
    }

    /// Check that mins precede maxes on both axes
    ///
    /// The file-name codec performs no ordering checks, so owners of
    /// decoded bounds call this before trusting them.
    pub fn validate(&self) -> PatchResult<()> {
        if self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(PatchError::GenericError(format!(
                "Degenerate pixel bounds: ({}, {}, {}, {})",
                self.min_x, self.min_y, self.max_x, self.max_y
            )));
        }
        Ok(())
    }

    /// Check that the box fits inside a parent raster of the given size
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.max_x <= width && self.max_y <= height
    }
}
