//! Helpers for crafting raster headers in memory

/// Build a minimal little-endian GeoTIFF header
///
/// Layout: classic TIFF header, one IFD with dimensions, samples per
/// pixel and (optionally) pixel scale, tiepoint and a GeoKey directory
/// declaring a geographic EPSG code.
pub fn build_geotiff_bytes(
    width: u32,
    height: u32,
    channels: u16,
    geo: Option<GeoFixture>,
) -> Vec<u8> {
    let mut buffer = Vec::new();

    let entry_count: u16 = if geo.is_some() { 6 } else { 3 };
    // header (8) + count (2) + entries (12 each) + next-IFD offset (4)
    let data_start = 8 + 2 + entry_count as u32 * 12 + 4;

    // TIFF header
    buffer.extend_from_slice(&[0x49, 0x49]); // "II"
    buffer.extend_from_slice(&42u16.to_le_bytes());
    buffer.extend_from_slice(&8u32.to_le_bytes()); // first IFD offset

    // IFD
    buffer.extend_from_slice(&entry_count.to_le_bytes());
    push_entry_long(&mut buffer, 256, width);
    push_entry_long(&mut buffer, 257, height);
    push_entry_short(&mut buffer, 277, channels);

    if let Some(ref fixture) = geo {
        let scale_offset = data_start;
        let tiepoint_offset = scale_offset + 24;
        let keys_offset = tiepoint_offset + 48;

        push_entry_array(&mut buffer, 33550, 12, 3, scale_offset);
        push_entry_array(&mut buffer, 33922, 12, 6, tiepoint_offset);
        push_entry_array(&mut buffer, 34735, 3, 16, keys_offset);

        buffer.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

        // Pixel scale (x, y, z)
        for value in [fixture.scale_x, fixture.scale_y, 0.0] {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
        // Tiepoint (i, j, k, x, y, z)
        for value in [0.0, 0.0, 0.0, fixture.origin_x, fixture.origin_y, 0.0] {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
        // GeoKey directory: header + 3 keys
        for value in [
            1u16, 1, 0, 3, // version, revision, minor, key count
            1024, 0, 1, 2, // geographic model
            1025, 0, 1, 1, // raster type, pixel-is-area
            2048, 0, 1, fixture.epsg,
        ] {
            buffer.extend_from_slice(&value.to_le_bytes());
        }
    } else {
        buffer.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    }

    buffer
}

/// Geographic parameters for the crafted header
pub struct GeoFixture {
    pub epsg: u16,
    pub origin_x: f64,
    pub origin_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

fn push_entry_long(buffer: &mut Vec<u8>, tag: u16, value: u32) {
    buffer.extend_from_slice(&tag.to_le_bytes());
    buffer.extend_from_slice(&4u16.to_le_bytes()); // LONG
    buffer.extend_from_slice(&1u32.to_le_bytes());
    buffer.extend_from_slice(&value.to_le_bytes());
}

fn push_entry_short(buffer: &mut Vec<u8>, tag: u16, value: u16) {
    buffer.extend_from_slice(&tag.to_le_bytes());
    buffer.extend_from_slice(&3u16.to_le_bytes()); // SHORT
    buffer.extend_from_slice(&1u32.to_le_bytes());
    buffer.extend_from_slice(&value.to_le_bytes());
    buffer.extend_from_slice(&[0u8, 0]); // padding to 4 bytes
}

fn push_entry_array(buffer: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, offset: u32) {
    buffer.extend_from_slice(&tag.to_le_bytes());
    buffer.extend_from_slice(&field_type.to_le_bytes());
    buffer.extend_from_slice(&count.to_le_bytes());
    buffer.extend_from_slice(&offset.to_le_bytes());
}
