//! Patch grid computation
//!
//! The grid originates at (0,0) and steps by the tile size in both axes.
//! A trailing partial tile keeps its true (smaller) extent, unless square
//! cuts are requested: then the final row/column starts at
//! `dimension - tile_size`, overlapping its neighbor, so that every tile
//! has the full size. The overlap near edges is deliberate, observed
//! behavior that downstream consumers rely on.

use crate::coordinate::PixelBounds;
use crate::errors::{PatchError, PatchResult};

/// Compute the patch grid for a raster of the given dimensions
///
/// # Arguments
/// * `width` - Raster width in pixels
/// * `height` - Raster height in pixels
/// * `tile_size` - Patch edge length in pixels
/// * `square_cuts` - Force every patch to the full tile size
///
/// # Returns
/// Patch bounds in row-major order, or `InvalidRange` for a zero tile
/// size
pub fn pixel_grid(
    width: u32,
    height: u32,
    tile_size: u32,
    square_cuts: bool,
) -> PatchResult<Vec<PixelBounds>> {
    if tile_size == 0 {
        return Err(PatchError::InvalidRange(
            "tile size must be positive".to_string(),
        ));
    }
    if width == 0 || height == 0 {
        return Err(PatchError::InvalidRange(format!(
            "cannot slice an empty raster ({}x{})",
            width, height
        )));
    }

    let mut bounds = Vec::new();
    let mut y = 0;
    while y < height {
        let max_y = (y + tile_size).min(height);
        // Square cuts shift a short tile backward instead of shrinking it;
        // saturation covers rasters smaller than one tile
        let min_y = if square_cuts {
            max_y.saturating_sub(tile_size)
        } else {
            y
        };

        let mut x = 0;
        while x < width {
            let max_x = (x + tile_size).min(width);
            let min_x = if square_cuts {
                max_x.saturating_sub(tile_size)
            } else {
                x
            };
            bounds.push(PixelBounds::new(min_x, min_y, max_x, max_y));
            x += tile_size;
        }
        y += tile_size;
    }
    Ok(bounds)
}
