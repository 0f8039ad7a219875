//! Georeferencing map sheets and patches
//!
//! Attaches real-world coordinates to pixel positions: geographic
//! bounding boxes from raster headers, per-pixel angular increments,
//! center coordinates at both tree levels, and physical pixel sizes in
//! meters.

mod referencer;

#[cfg(test)]
mod tests;

pub use referencer::GeoReferencer;
