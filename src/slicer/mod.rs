//! Slicing map sheets into patches
//!
//! A parent raster is partitioned into a grid of rectangular patches
//! under a chosen sizing policy, each written to disk under a
//! self-describing file name and reported back for registration.

mod grid;
mod patchifier;

#[cfg(test)]
mod tests;

pub use grid::pixel_grid;
pub use patchifier::{Patchifier, SliceMethod, SliceOptions, SlicedPatch};
