//! GeoKey directory parsing
//!
//! GeoTIFF stores its geographic metadata as a directory of key entries
//! inside one SHORT-array tag. Each entry is four shorts: key id, tag
//! location, count and value/offset. A location of 0 means the value sits
//! directly in the entry.

use std::io::{Seek, SeekFrom};

use log::debug;

use crate::errors::{PatchError, PatchResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::geo_keys;
use crate::tiff::header::HeaderEntry;

/// One entry of the GeoKey directory
#[derive(Debug, Clone, Copy)]
pub struct GeoKeyEntry {
    /// GeoKey identifier
    pub key_id: u16,
    /// TIFF tag holding the value, or 0 for an inline value
    pub tag_location: u16,
    /// Number of values
    pub count: u16,
    /// Inline value or offset into the located tag
    pub value_offset: u16,
}

/// Parse the GeoKey directory referenced by a header entry
///
/// # Arguments
/// * `reader` - Source positioned anywhere; this function seeks
/// * `handler` - Byte order handler for the file
/// * `entry` - The GEO_KEY_DIRECTORY header entry
///
/// # Returns
/// All key entries, or an error when the directory header is truncated
pub fn parse_directory(
    reader: &mut dyn SeekableReader,
    handler: &Box<dyn ByteOrderHandler>,
    entry: &HeaderEntry,
) -> PatchResult<Vec<GeoKeyEntry>> {
    // The directory header itself is 4 shorts
    if entry.count < 4 {
        return Err(PatchError::GenericError(
            "Invalid GeoKey directory header".to_string(),
        ));
    }

    reader.seek(SeekFrom::Start(entry.value_offset))?;

    let _version = handler.read_u16(reader)?;
    let _revision = handler.read_u16(reader)?;
    let _minor_revision = handler.read_u16(reader)?;
    let num_keys = handler.read_u16(reader)?;

    debug!("GeoKey directory with {} keys", num_keys);

    let mut keys = Vec::with_capacity(num_keys as usize);
    for _ in 0..num_keys {
        let key_id = handler.read_u16(reader)?;
        let tag_location = handler.read_u16(reader)?;
        let count = handler.read_u16(reader)?;
        let value_offset = handler.read_u16(reader)?;
        keys.push(GeoKeyEntry {
            key_id,
            tag_location,
            count,
            value_offset,
        });
    }

    Ok(keys)
}

/// Extract the EPSG code declared by a GeoKey directory
///
/// Follows the model type key: geographic models carry their code in
/// GEOGRAPHIC_TYPE, projected models in PROJECTED_CS_TYPE. User-defined
/// systems (code 32767) carry no EPSG code and yield None.
pub fn epsg_from_keys(keys: &[GeoKeyEntry]) -> Option<u32> {
    let inline_value = |key_id: u16| {
        keys.iter()
            .find(|k| k.key_id == key_id && k.tag_location == 0)
            .map(|k| k.value_offset)
    };

    let model_type = inline_value(geo_keys::GT_MODEL_TYPE);

    let code = match model_type {
        Some(geo_keys::MODEL_TYPE_GEOGRAPHIC) => inline_value(geo_keys::GEOGRAPHIC_TYPE),
        Some(geo_keys::MODEL_TYPE_PROJECTED) => inline_value(geo_keys::PROJECTED_CS_TYPE),
        // No or unknown model type: accept either code key
        _ => inline_value(geo_keys::GEOGRAPHIC_TYPE)
            .or_else(|| inline_value(geo_keys::PROJECTED_CS_TYPE)),
    }?;

    if code == geo_keys::USER_DEFINED || code == 0 {
        None
    } else {
        Some(code as u32)
    }
}

/// Read the double array a header entry points at
///
/// Model pixel scale and tiepoint values are always stored out of line
/// (3 and 6 doubles), so the entry's value field is an offset.
pub fn read_entry_doubles(
    reader: &mut dyn SeekableReader,
    handler: &Box<dyn ByteOrderHandler>,
    entry: &HeaderEntry,
) -> PatchResult<Vec<f64>> {
    reader.seek(SeekFrom::Start(entry.value_offset))?;

    let mut values = Vec::with_capacity(entry.count as usize);
    for _ in 0..entry.count {
        values.push(handler.read_f64(reader)?);
    }
    Ok(values)
}
