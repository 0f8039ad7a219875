//! Header-only TIFF/GeoTIFF reading
//!
//! Map sheets arrive as GeoTIFFs whose geographic metadata lives entirely
//! in the header: dimensions, pixel scale, tiepoint and the GeoKey
//! directory. This module reads exactly that and never touches pixel
//! data — decoding is the image crate's job elsewhere.

pub mod constants;
pub mod header;
pub mod geo_keys;

#[cfg(test)]
mod tests;

pub use header::{HeaderEntry, RasterHeader};
pub use geo_keys::GeoKeyEntry;

/// BigTIFF version number in the header
pub const BIGTIFF_VERSION: u16 = 43;
/// Classic TIFF version number in the header
pub const CLASSIC_VERSION: u16 = 42;
