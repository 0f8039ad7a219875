//! Image record types
//!
//! One `ImageRecord` per raster, at either tree level. Fields that are
//! derived (shape, coordinates, statistics) are `Option`-typed caches:
//! absent until computed, then kept until a caller explicitly forces a
//! recomputation. Unrecognized metadata columns ride along in an open
//! side-table so external tables survive a round-trip.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::coordinate::{GeoBounds, PixelBounds};
use crate::errors::{PatchError, PatchResult};

/// Whether a record is a full map sheet or a patch cut from one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeLevel {
    /// A full source raster
    Parent,
    /// A rectangular sub-image of a parent, in parent pixel coordinates
    Child,
}

impl TreeLevel {
    /// Parse a level name at a text boundary (CLI, tables)
    pub fn parse(name: &str) -> PatchResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "parent" => Ok(TreeLevel::Parent),
            "child" | "patch" => Ok(TreeLevel::Child),
            other => Err(PatchError::UnknownLevel(other.to_string())),
        }
    }

    /// Name used in logs and tables
    pub fn name(&self) -> &'static str {
        match self {
            TreeLevel::Parent => "parent",
            TreeLevel::Child => "child",
        }
    }
}

/// Raster shape as (height, width, channels)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub height: u32,
    pub width: u32,
    pub channels: u8,
}

impl Shape {
    pub fn new(height: u32, width: u32, channels: u8) -> Self {
        Shape {
            height,
            width,
            channels,
        }
    }

    /// Serialize as literal tuple text
    pub fn to_tuple_string(&self) -> String {
        format!("({}, {}, {})", self.height, self.width, self.channels)
    }

    /// Parse from literal tuple text, e.g. `(11400, 7500, 3)`
    pub fn from_string(text: &str) -> PatchResult<Self> {
        let trimmed = text.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = trimmed.split(',').collect();
        if parts.len() != 3 {
            return Err(PatchError::GenericError(format!(
                "Shape must have 3 comma-separated values: {}",
                text
            )));
        }
        let parse = |s: &str| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| PatchError::GenericError(format!("Invalid shape value: {}", s)))
        };
        Ok(Shape {
            height: parse(parts[0])?,
            width: parse(parts[1])?,
            channels: parse(parts[2])? as u8,
        })
    }
}

/// Physical lengths in meters of a raster's four edges
///
/// Stored in the fixed (bottom, top, left, right) order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLengths {
    pub bottom: f64,
    pub top: f64,
    pub left: f64,
    pub right: f64,
}

impl EdgeLengths {
    pub fn new(bottom: f64, top: f64, left: f64, right: f64) -> Self {
        EdgeLengths {
            bottom,
            top,
            left,
            right,
        }
    }

    /// Serialize as literal tuple text in (bottom, top, left, right) order
    pub fn to_tuple_string(&self) -> String {
        format!(
            "({}, {}, {}, {})",
            self.bottom, self.top, self.left, self.right
        )
    }
}

/// Mean or standard deviation of pixel intensities, per channel
///
/// Intensities are normalized to [0, 1]. The `rgb` field aggregates the
/// three color channels; `alpha` is present only for 4-channel rasters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub rgb: f64,
    pub alpha: Option<f64>,
}

/// Pixel statistics of one patch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelStats {
    pub mean: ChannelStats,
    pub std_dev: ChannelStats,
}

/// One image at either tree level
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Unique id within the level: the raster file's base name
    pub id: String,
    /// Tree level of this record
    pub level: TreeLevel,
    /// Absolute file location; None for a placeholder parent
    pub path: Option<PathBuf>,
    /// Owning parent's id; child records only
    pub parent_id: Option<String>,
    /// Bounds in the parent's pixel space; child records only
    pub pixel_bounds: Option<PixelBounds>,
    /// Raster shape, populated lazily from the file
    pub shape: Option<Shape>,
    /// Geographic bounding box in (lon_min, lon_max, lat_min, lat_max) order
    pub geo_bounds: Option<GeoBounds>,
    /// Derived (center_lon, center_lat)
    pub center: Option<(f64, f64)>,
    /// Derived per-pixel angular increments (dlon, dlat); parents only
    pub pixel_deg: Option<(f64, f64)>,
    /// Derived physical edge lengths in meters; parents only
    pub pixel_size_m: Option<EdgeLengths>,
    /// Ids of the children cut from this parent
    pub children: BTreeSet<String>,
    /// Derived pixel statistics; children only
    pub pixel_stats: Option<PixelStats>,
    /// Unrecognized metadata columns, merged verbatim
    pub extra: BTreeMap<String, String>,
}

impl ImageRecord {
    fn empty(id: String, level: TreeLevel) -> Self {
        ImageRecord {
            id,
            level,
            path: None,
            parent_id: None,
            pixel_bounds: None,
            shape: None,
            geo_bounds: None,
            center: None,
            pixel_deg: None,
            pixel_size_m: None,
            children: BTreeSet::new(),
            pixel_stats: None,
            extra: BTreeMap::new(),
        }
    }

    /// Create a parent record for a raster file
    pub fn parent(id: impl Into<String>, path: PathBuf) -> Self {
        let mut record = Self::empty(id.into(), TreeLevel::Parent);
        record.path = Some(path);
        record
    }

    /// Create a placeholder parent known only by id
    ///
    /// Used when a child references a parent the tree has not seen yet;
    /// the path is backfilled once the parent itself is registered.
    pub fn placeholder_parent(id: impl Into<String>) -> Self {
        Self::empty(id.into(), TreeLevel::Parent)
    }

    /// Create a child record for a patch file
    pub fn child(
        id: impl Into<String>,
        path: PathBuf,
        parent_id: impl Into<String>,
        pixel_bounds: PixelBounds,
    ) -> Self {
        let mut record = Self::empty(id.into(), TreeLevel::Child);
        record.path = Some(path);
        record.parent_id = Some(parent_id.into());
        record.pixel_bounds = Some(pixel_bounds);
        record
    }

    /// Fold a re-registration of the same id into this record
    ///
    /// Identity fields from the incoming record win when present; derived
    /// caches survive unless the incoming record carries fresher ones.
    pub fn absorb(&mut self, incoming: ImageRecord) {
        if incoming.path.is_some() {
            self.path = incoming.path;
        }
        if incoming.parent_id.is_some() {
            self.parent_id = incoming.parent_id;
        }
        if incoming.pixel_bounds.is_some() {
            self.pixel_bounds = incoming.pixel_bounds;
        }
        if incoming.shape.is_some() {
            self.shape = incoming.shape;
        }
        if incoming.geo_bounds.is_some() {
            self.geo_bounds = incoming.geo_bounds;
        }
        if incoming.center.is_some() {
            self.center = incoming.center;
        }
        if incoming.pixel_deg.is_some() {
            self.pixel_deg = incoming.pixel_deg;
        }
        if incoming.pixel_size_m.is_some() {
            self.pixel_size_m = incoming.pixel_size_m;
        }
        if incoming.pixel_stats.is_some() {
            self.pixel_stats = incoming.pixel_stats;
        }
        self.extra.extend(incoming.extra);
    }

    /// Read the raster shape from disk, caching it on the record
    ///
    /// Decodes the image, so callers prefer the cached value; pass
    /// `force` to re-read after a file changed on disk.
    pub fn fetch_shape(&mut self, force: bool) -> PatchResult<Shape> {
        if !force {
            if let Some(shape) = self.shape {
                return Ok(shape);
            }
        }
        let path = self.path.as_ref().ok_or_else(|| {
            PatchError::GenericError(format!("Record {} has no file path", self.id))
        })?;
        let img = image::open(path)?;
        let shape = Shape::new(img.height(), img.width(), img.color().channel_count());
        self.shape = Some(shape);
        Ok(shape)
    }
}
