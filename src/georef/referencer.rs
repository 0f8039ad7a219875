//! The georeferencer
//!
//! All derived geographic quantities are compute-or-fetch: present values
//! are returned as-is and only an explicit `force` recomputes them. The
//! formulas mirror the pixel coordinate system — columns grow eastward
//! from lon_min, rows grow *southward* from lat_max, which is why child
//! center latitudes subtract from the northern edge.

use log::{debug, info};

use crate::coordinate::{
    surface_distance, CoordinateSystem, CoordinateTransformer, DistanceMethod, GeoBounds, Point,
};
use crate::errors::{PatchError, PatchResult};
use crate::tiff::RasterHeader;
use crate::tree::{EdgeLengths, ImageRecord, Shape, TreeLevel};

/// Derives geographic metadata for image records
pub struct GeoReferencer {
    /// Coordinate system geographic bounds are expressed in
    pub target_crs: CoordinateSystem,
}

impl Default for GeoReferencer {
    fn default() -> Self {
        GeoReferencer {
            target_crs: CoordinateSystem::WGS84,
        }
    }
}

impl GeoReferencer {
    /// Create a georeferencer targeting the given coordinate system
    pub fn new(target_crs: CoordinateSystem) -> Self {
        GeoReferencer { target_crs }
    }

    /// Read a parent's header and derive its geographic bounding box
    ///
    /// Reads the raster header only — no pixel decode. The shape is
    /// always populated; the geographic bounds require a declared
    /// coordinate system, otherwise `NoGeoReferenceError` is returned and
    /// the record keeps whatever bounds it had (callers may proceed
    /// degraded, e.g. with bounds merged from metadata).
    ///
    /// # Arguments
    /// * `record` - Parent record backed by a GeoTIFF file
    ///
    /// # Returns
    /// The derived bounds, or an error
    pub fn georeference(&self, record: &mut ImageRecord) -> PatchResult<GeoBounds> {
        let path = record.path.as_ref().ok_or_else(|| {
            PatchError::GenericError(format!("Record {} has no file path", record.id))
        })?;

        let header = RasterHeader::read_file(path)?;
        let (height, width, channels) = header.shape();
        record.shape = Some(Shape::new(height, width, channels));

        let native_crs = match header.crs {
            Some(crs) => crs,
            None => {
                return Err(PatchError::NoGeoReference(record.id.clone()));
            }
        };

        let corners = header.native_corners().map_err(|_| {
            // A CRS without a geotransform still cannot place pixels
            PatchError::NoGeoReference(record.id.clone())
        })?;

        let transformer = CoordinateTransformer;
        let bounds = transformer.reproject_corners(&corners, &native_crs, &self.target_crs)?;

        debug!(
            "Georeferenced {} from {} to {}: {}",
            record.id,
            native_crs.description(),
            self.target_crs.description(),
            bounds.to_tuple_string()
        );
        record.geo_bounds = Some(bounds);
        Ok(bounds)
    }

    /// Per-pixel angular increments (dlon, dlat) of a parent
    ///
    /// Compute-or-fetch: a cached value is returned unless `force` is
    /// set. Needs the parent's geographic bounds and shape; the shape is
    /// read from the raster on demand when a path is available.
    ///
    /// # Returns
    /// (dlon, dlat) in degrees per pixel, or `MissingGeoDataError`
    pub fn pixel_increments(
        &self,
        record: &mut ImageRecord,
        force: bool,
    ) -> PatchResult<(f64, f64)> {
        if !force {
            if let Some(increments) = record.pixel_deg {
                return Ok(increments);
            }
        }

        let bounds = record.geo_bounds.ok_or_else(|| {
            PatchError::MissingGeoData(format!(
                "no geographic bounds for {}; merge metadata or georeference first",
                record.id
            ))
        })?;
        let shape = record.fetch_shape(false).map_err(|_| {
            PatchError::MissingGeoData(format!("shape of {} is not known", record.id))
        })?;

        let dlon = bounds.lon_span() / shape.width as f64;
        let dlat = bounds.lat_span() / shape.height as f64;
        record.pixel_deg = Some((dlon, dlat));
        Ok((dlon, dlat))
    }

    /// Center coordinates of a parent: the midpoint of its bounds
    pub fn parent_center(&self, record: &mut ImageRecord, force: bool) -> PatchResult<(f64, f64)> {
        if !force {
            if let Some(center) = record.center {
                return Ok(center);
            }
        }
        let bounds = record.geo_bounds.ok_or_else(|| {
            PatchError::MissingGeoData(format!(
                "no geographic bounds for {}; merge metadata or georeference first",
                record.id
            ))
        })?;
        let center = bounds.center();
        record.center = Some(center);
        Ok(center)
    }

    /// Center coordinates of a child from its parent's increments
    ///
    /// The pixel offset scales by the parent's per-pixel increments;
    /// longitude grows from the western edge while latitude *shrinks*
    /// from the northern edge, because rows count downward.
    ///
    /// # Arguments
    /// * `child` - Child record with pixel bounds
    /// * `parent` - Its parent; increments are computed on demand
    pub fn child_center(
        &self,
        child: &mut ImageRecord,
        parent: &mut ImageRecord,
        force: bool,
    ) -> PatchResult<(f64, f64)> {
        if !force {
            if let Some(center) = child.center {
                return Ok(center);
            }
        }

        let bounds = child.pixel_bounds.ok_or_else(|| {
            PatchError::MissingGeoData(format!("child {} has no pixel bounds", child.id))
        })?;
        let (dlon, dlat) = self.pixel_increments(parent, false)?;
        let geo = parent.geo_bounds.ok_or_else(|| {
            PatchError::MissingGeoData(format!(
                "no geographic bounds for parent of {}",
                child.id
            ))
        })?;

        let min_lon_offset = bounds.min_x as f64 * dlon;
        let max_lon_offset = bounds.max_x as f64 * dlon;
        let min_lat_offset = bounds.min_y as f64 * dlat;
        let max_lat_offset = bounds.max_y as f64 * dlat;

        let center = (
            geo.lon_min + (min_lon_offset + max_lon_offset) / 2.0,
            geo.lat_max - (min_lat_offset + max_lat_offset) / 2.0,
        );
        child.center = Some(center);
        Ok(center)
    }

    /// Center coordinates of a record at either level
    ///
    /// Parents only need themselves; children borrow their parent's
    /// increments, so the parent record travels along.
    pub fn center(
        &self,
        record: &mut ImageRecord,
        parent: Option<&mut ImageRecord>,
        force: bool,
    ) -> PatchResult<(f64, f64)> {
        match record.level {
            TreeLevel::Parent => self.parent_center(record, force),
            TreeLevel::Child => {
                let parent = parent.ok_or_else(|| {
                    PatchError::MissingGeoData(format!(
                        "child {} needs its parent record for center coordinates",
                        record.id
                    ))
                })?;
                self.child_center(record, parent, force)
            }
        }
    }

    /// Physical edge lengths of a parent's bounding box, in meters
    ///
    /// The four edges are measured with the chosen distance formula and
    /// stored as (bottom, top, left, right). Compute-or-fetch like the
    /// other derived fields.
    ///
    /// # Arguments
    /// * `record` - Parent record with geographic bounds
    /// * `method` - Distance formula, trading accuracy for speed
    pub fn physical_pixel_size(
        &self,
        record: &mut ImageRecord,
        method: DistanceMethod,
        force: bool,
    ) -> PatchResult<EdgeLengths> {
        if !force {
            if let Some(edges) = record.pixel_size_m {
                return Ok(edges);
            }
        }

        let bounds = record.geo_bounds.ok_or_else(|| {
            PatchError::MissingGeoData(format!(
                "no geographic bounds for {}; merge metadata or georeference first",
                record.id
            ))
        })?;

        let south_west = Point::new(bounds.lon_min, bounds.lat_min);
        let south_east = Point::new(bounds.lon_max, bounds.lat_min);
        let north_west = Point::new(bounds.lon_min, bounds.lat_max);
        let north_east = Point::new(bounds.lon_max, bounds.lat_max);

        let edges = EdgeLengths::new(
            surface_distance(method, &south_west, &south_east),
            surface_distance(method, &north_east, &north_west),
            surface_distance(method, &north_west, &south_west),
            surface_distance(method, &south_east, &north_east),
        );

        info!(
            "{} edge lengths ({}): bottom/top/left/right = {:.2}/{:.2}/{:.2}/{:.2} m",
            record.id,
            method.name(),
            edges.bottom,
            edges.top,
            edges.left,
            edges.right
        );
        record.pixel_size_m = Some(edges);
        Ok(edges)
    }

    /// Mean physical pixel size (width, height) in meters
    ///
    /// Each dimension averages its two parallel edges divided by the
    /// pixel count.
    pub fn mean_pixel_size(
        &self,
        record: &mut ImageRecord,
        method: DistanceMethod,
    ) -> PatchResult<(f64, f64)> {
        let edges = self.physical_pixel_size(record, method, false)?;
        let shape = record.fetch_shape(false).map_err(|_| {
            PatchError::MissingGeoData(format!("shape of {} is not known", record.id))
        })?;

        let mean_width = (edges.bottom / shape.width as f64 + edges.top / shape.width as f64) / 2.0;
        let mean_height =
            (edges.left / shape.height as f64 + edges.right / shape.height as f64) / 2.0;
        Ok((mean_width, mean_height))
    }
}
