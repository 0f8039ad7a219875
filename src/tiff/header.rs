//! Raster header reading
//!
//! Parses the first IFD of a TIFF or BigTIFF file, in either byte order,
//! and extracts the handful of tags the georeferencer needs. Inline
//! values are decoded per field type; array values stay as offsets until
//! a caller asks for them.

use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::io::Seek;
use std::path::Path;

use log::debug;

use crate::coordinate::{CoordinateSystem, Point};
use crate::errors::{PatchError, PatchResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{field_types, tags};
use crate::tiff::geo_keys;
use crate::tiff::{BIGTIFF_VERSION, CLASSIC_VERSION};

/// One entry of the first IFD
#[derive(Debug, Clone, Copy)]
pub struct HeaderEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Inline value, or offset to the values when they do not fit inline
    pub value_offset: u64,
}

/// The header metadata of one map sheet raster
#[derive(Debug, Clone)]
pub struct RasterHeader {
    /// Raster width in pixels
    pub width: u32,
    /// Raster height in pixels
    pub height: u32,
    /// Samples per pixel
    pub channels: u8,
    /// Coordinate system declared by the GeoKey directory, if any
    pub crs: Option<CoordinateSystem>,
    /// Model pixel scale (x, y) in native units per pixel
    pub pixel_scale: Option<(f64, f64)>,
    /// First model tiepoint (i, j, k, x, y, z)
    pub tiepoint: Option<[f64; 6]>,
    /// Whether the file is a BigTIFF
    pub is_big_tiff: bool,
}

impl RasterHeader {
    /// Read the header of a raster file
    ///
    /// # Arguments
    /// * `path` - Path to a TIFF/GeoTIFF file
    ///
    /// # Returns
    /// The parsed header, or an error for unreadable/non-TIFF input
    pub fn read_file(path: &Path) -> PatchResult<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read(&mut reader)
    }

    /// Read the header from any seekable source
    pub fn read(reader: &mut dyn SeekableReader) -> PatchResult<Self> {
        let byte_order = ByteOrder::detect(reader)?;
        let handler = byte_order.create_handler();

        let version = handler.read_u16(reader)?;
        let is_big_tiff = match version {
            CLASSIC_VERSION => false,
            BIGTIFF_VERSION => true,
            other => {
                return Err(PatchError::GenericError(format!(
                    "Unsupported TIFF version: {}",
                    other
                )))
            }
        };

        let first_ifd_offset = if is_big_tiff {
            // BigTIFF header continues with offset size (8) and a
            // reserved word before the IFD offset
            let offset_size = handler.read_u16(reader)?;
            if offset_size != 8 {
                return Err(PatchError::GenericError(format!(
                    "Invalid BigTIFF offset size: {}",
                    offset_size
                )));
            }
            let _reserved = handler.read_u16(reader)?;
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        debug!(
            "Raster header: {}, {}, first IFD at {}",
            byte_order.name(),
            if is_big_tiff { "BigTIFF" } else { "TIFF" },
            first_ifd_offset
        );

        let entries = Self::read_ifd_entries(reader, &handler, first_ifd_offset, is_big_tiff)?;

        let width = Self::required_value(&entries, tags::IMAGE_WIDTH, "image width")? as u32;
        let height = Self::required_value(&entries, tags::IMAGE_LENGTH, "image height")? as u32;
        let channels = Self::find_entry(&entries, tags::SAMPLES_PER_PIXEL)
            .map(|e| e.value_offset as u8)
            .unwrap_or(1);

        let pixel_scale = match Self::find_entry(&entries, tags::MODEL_PIXEL_SCALE) {
            Some(entry) => {
                let values = geo_keys::read_entry_doubles(reader, &handler, &entry)?;
                if values.len() >= 2 {
                    Some((values[0], values[1]))
                } else {
                    None
                }
            }
            None => None,
        };

        let tiepoint = match Self::find_entry(&entries, tags::MODEL_TIEPOINT) {
            Some(entry) => {
                let values = geo_keys::read_entry_doubles(reader, &handler, &entry)?;
                if values.len() >= 6 {
                    let mut point = [0.0f64; 6];
                    point.copy_from_slice(&values[..6]);
                    Some(point)
                } else {
                    None
                }
            }
            None => None,
        };

        let crs = match Self::find_entry(&entries, tags::GEO_KEY_DIRECTORY) {
            Some(entry) => {
                let keys = geo_keys::parse_directory(reader, &handler, &entry)?;
                geo_keys::epsg_from_keys(&keys).map(|code| {
                    crate::coordinate::CoordinateSystemFactory::from_epsg(code)
                })
            }
            None => None,
        };

        Ok(RasterHeader {
            width,
            height,
            channels,
            crs,
            pixel_scale,
            tiepoint,
            is_big_tiff,
        })
    }

    /// Read all entries of the IFD at the given offset
    fn read_ifd_entries(
        reader: &mut dyn SeekableReader,
        handler: &Box<dyn ByteOrderHandler>,
        offset: u64,
        is_big_tiff: bool,
    ) -> PatchResult<Vec<HeaderEntry>> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = if is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };

        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            entries.push(Self::read_entry(reader, handler, is_big_tiff)?);
        }
        Ok(entries)
    }

    /// Read one IFD entry, decoding inline scalars per field type
    ///
    /// The value field of an entry is 4 bytes in classic TIFF and 8 in
    /// BigTIFF. A scalar SHORT or LONG occupies only the leading bytes of
    /// that field, so it must be read at its own width — reading the
    /// whole field as an offset would garble big-endian scalars.
    fn read_entry(
        reader: &mut dyn SeekableReader,
        handler: &Box<dyn ByteOrderHandler>,
        is_big_tiff: bool,
    ) -> PatchResult<HeaderEntry> {
        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let value_field_size: u64 = if is_big_tiff { 8 } else { 4 };
        let value_pos = reader.stream_position()?;

        let value_offset = match (field_type, count) {
            (field_types::SHORT, 1) => handler.read_u16(reader)? as u64,
            (field_types::LONG, 1) => handler.read_u32(reader)? as u64,
            (field_types::LONG8, 1) if is_big_tiff => handler.read_u64(reader)?,
            _ => {
                if is_big_tiff {
                    handler.read_u64(reader)?
                } else {
                    handler.read_u32(reader)? as u64
                }
            }
        };

        reader.seek(SeekFrom::Start(value_pos + value_field_size))?;

        Ok(HeaderEntry {
            tag,
            field_type,
            count,
            value_offset,
        })
    }

    /// Find an entry by tag
    fn find_entry(entries: &[HeaderEntry], tag: u16) -> Option<HeaderEntry> {
        entries.iter().find(|e| e.tag == tag).copied()
    }

    /// Find an entry by tag or fail with a descriptive error
    fn required_value(entries: &[HeaderEntry], tag: u16, what: &str) -> PatchResult<u64> {
        Self::find_entry(entries, tag)
            .map(|e| e.value_offset)
            .ok_or_else(|| PatchError::GenericError(format!("Header is missing {}", what)))
    }

    /// Shape of the raster as (height, width, channels)
    pub fn shape(&self) -> (u32, u32, u8) {
        (self.height, self.width, self.channels)
    }

    /// The four corner coordinates in the native coordinate system
    ///
    /// Derived from the model tiepoint and pixel scale. The tiepoint
    /// anchors a raster position (i, j) to a native position (x, y);
    /// rows grow downward while native y grows upward.
    ///
    /// # Returns
    /// Corners as [top-left, top-right, bottom-left, bottom-right], or
    /// `MissingGeoDataError` when the header carries no geotransform
    pub fn native_corners(&self) -> PatchResult<[Point; 4]> {
        let (scale_x, scale_y) = self.pixel_scale.ok_or_else(|| {
            PatchError::MissingGeoData("header has no model pixel scale".to_string())
        })?;
        let tiepoint = self.tiepoint.ok_or_else(|| {
            PatchError::MissingGeoData("header has no model tiepoint".to_string())
        })?;

        let origin_x = tiepoint[3] - tiepoint[0] * scale_x;
        let origin_y = tiepoint[4] + tiepoint[1] * scale_y;

        let left = origin_x;
        let top = origin_y;
        let right = origin_x + self.width as f64 * scale_x;
        let bottom = origin_y - self.height as f64 * scale_y;

        Ok([
            Point::new(left, top),
            Point::new(right, top),
            Point::new(left, bottom),
            Point::new(right, bottom),
        ])
    }
}
