//! Patch file-name encoding and decoding
//!
//! A patch file name carries its parent's id and its pixel bounding box,
//! so a directory of patches is self-describing: re-scanning it rebuilds
//! the exact child records that slicing registered. The canonical
//! template is
//!
//! `patch#<parent_id>#-<min_x>-<min_y>-<max_x>-<max_y>-.<ext>`
//!
//! Decoding splits purely by delimiter position, not by semantic
//! parsing; a name following a different layout yields wrong values
//! silently unless a field fails to parse as an integer.

use crate::coordinate::PixelBounds;
use crate::errors::{PatchError, PatchResult};

#[cfg(test)]
mod tests;

/// Default delimiter fencing the parent id
pub const PARENT_DELIMITER: &str = "#";
/// Default delimiter separating the bounds fields
pub const BOUNDS_DELIMITER: &str = "-";
/// Leading token of every generated patch name
pub const PATCH_PREFIX: &str = "patch";

/// Encode a patch file name from its parent id and pixel bounds
///
/// # Arguments
/// * `parent_id` - Id (base name) of the parent image
/// * `bounds` - Patch bounds in the parent's pixel space
/// * `output_format` - File extension without the dot, e.g. "png"
///
/// # Returns
/// The canonical file name, decodable by `decode_patch_name`
pub fn encode_patch_name(parent_id: &str, bounds: &PixelBounds, output_format: &str) -> String {
    format!(
        "{prefix}{pd}{parent}{pd}{bd}{min_x}{bd}{min_y}{bd}{max_x}{bd}{max_y}{bd}.{ext}",
        prefix = PATCH_PREFIX,
        pd = PARENT_DELIMITER,
        bd = BOUNDS_DELIMITER,
        parent = parent_id,
        min_x = bounds.min_x,
        min_y = bounds.min_y,
        max_x = bounds.max_x,
        max_y = bounds.max_y,
        ext = output_format,
    )
}

/// Decode a patch file name into its parent id and pixel bounds
///
/// Splitting is positional: the parent id is the second field of the
/// parent-delimiter split, the bounds are fields 1 through 4 of the
/// bounds-delimiter split. No ordering validation happens here — owners
/// of the result call `PixelBounds::validate` before trusting it.
///
/// # Arguments
/// * `file_name` - Patch file name (base name, not a full path)
/// * `parent_delimiter` - Delimiter fencing the parent id
/// * `bounds_delimiter` - Delimiter separating the bounds fields
///
/// # Returns
/// The parent id and bounds, or `MalformedNameError` when the name does
/// not yield enough integer fields
pub fn decode_patch_name(
    file_name: &str,
    parent_delimiter: &str,
    bounds_delimiter: &str,
) -> PatchResult<(String, PixelBounds)> {
    let parent_id = file_name
        .split(parent_delimiter)
        .nth(1)
        .filter(|field| !field.is_empty())
        .ok_or_else(|| PatchError::MalformedName(file_name.to_string()))?
        .to_string();

    let fields: Vec<&str> = file_name.split(bounds_delimiter).collect();
    if fields.len() < 5 {
        return Err(PatchError::MalformedName(file_name.to_string()));
    }

    let mut values = [0u32; 4];
    for (slot, field) in values.iter_mut().zip(&fields[1..5]) {
        *slot = field
            .parse::<u32>()
            .map_err(|_| PatchError::MalformedName(file_name.to_string()))?;
    }

    Ok((
        parent_id,
        PixelBounds::new(values[0], values[1], values[2], values[3]),
    ))
}
