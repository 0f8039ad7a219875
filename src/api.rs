//! Main interface to the PatchKit library
//!
//! The facade owns the image tree and orchestrates batch operations over
//! it: loading, slicing, georeferencing, statistics and export. The
//! batch error policy lives here — missing optional geographic data
//! degrades with a warning and the batch continues, while I/O failures
//! propagate immediately.

use std::collections::BTreeSet;
use std::path::Path;

use log::{info, warn};
use regex::Regex;

use crate::coordinate::{CoordinateSystem, DistanceMethod};
use crate::errors::{PatchError, PatchResult};
use crate::georef::GeoReferencer;
use crate::slicer::{Patchifier, SliceMethod, SliceOptions};
use crate::stats::StatsComputer;
use crate::tree::{ImageTree, Table, TreeLevel};

/// High-level entry point for building and augmenting an image tree
pub struct PatchKit {
    tree: ImageTree,
    referencer: GeoReferencer,
}

impl Default for PatchKit {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchKit {
    /// Create an instance with an empty tree, targeting EPSG:4326
    pub fn new() -> Self {
        PatchKit {
            tree: ImageTree::new(),
            referencer: GeoReferencer::default(),
        }
    }

    /// Create an instance targeting a different geographic system
    pub fn with_target_crs(target_crs: CoordinateSystem) -> Self {
        PatchKit {
            tree: ImageTree::new(),
            referencer: GeoReferencer::new(target_crs),
        }
    }

    /// The underlying tree, read-only
    pub fn tree(&self) -> &ImageTree {
        &self.tree
    }

    /// Scan a directory for parent rasters
    ///
    /// # Arguments
    /// * `dir` - Directory to scan recursively
    /// * `pattern` - Optional file-name regex; common raster extensions
    ///   are accepted without one
    ///
    /// # Returns
    /// Number of parents registered
    pub fn load_parents(&mut self, dir: &Path, pattern: Option<&str>) -> PatchResult<usize> {
        let regex = compile_pattern(pattern)?;
        self.tree.scan_parents(dir, regex.as_ref())
    }

    /// Scan a directory for patch files, decoding their names
    pub fn load_patches(&mut self, dir: &Path, pattern: Option<&str>) -> PatchResult<usize> {
        let regex = compile_pattern(pattern)?;
        self.tree.scan_patches(dir, regex.as_ref())
    }

    /// Rebuild the tree from previously exported table files
    ///
    /// # Arguments
    /// * `parent_path` - Exported parent table, if any
    /// * `child_path` - Exported child table, if any
    /// * `delimiter` - Column delimiter of the files
    /// * `clear` - Drop current records first
    pub fn load_table_files(
        &mut self,
        parent_path: Option<&Path>,
        child_path: Option<&Path>,
        delimiter: char,
        clear: bool,
    ) -> PatchResult<()> {
        let parent_table = parent_path
            .map(|p| Table::read_delimited(p, delimiter))
            .transpose()?;
        let child_table = child_path
            .map(|p| Table::read_delimited(p, delimiter))
            .transpose()?;
        self.tree
            .load_tables(parent_table.as_ref(), child_table.as_ref(), clear)
    }

    /// Merge a metadata table file onto records at one level
    ///
    /// # Returns
    /// Number of rows that matched an existing record
    pub fn add_metadata(
        &mut self,
        path: &Path,
        level: TreeLevel,
        delimiter: char,
        columns: Option<&[String]>,
    ) -> PatchResult<usize> {
        let table = Table::read_delimited(path, delimiter)?;
        self.tree.merge_metadata(&table, level, columns)
    }

    /// Read raster shapes for every record at one level
    pub fn add_shapes(&mut self, level: TreeLevel) -> PatchResult<usize> {
        info!("Adding shapes, tree level: {}", level.name());
        let ids: Vec<String> = match level {
            TreeLevel::Parent => self.tree.list_parents(),
            TreeLevel::Child => self.tree.list_children(),
        };
        let mut updated = 0;
        for id in ids {
            let record = match self.tree.record_mut(level, &id) {
                Some(record) => record,
                None => continue,
            };
            match record.fetch_shape(false) {
                Ok(_) => updated += 1,
                Err(e) if is_fatal(&e) => return Err(e),
                Err(e) => warn!("Could not read shape of {}: {}", id, e),
            }
        }
        Ok(updated)
    }

    /// Georeference every parent from its raster header
    ///
    /// Adds shape, geographic bounds and physical pixel size. Parents
    /// without a coordinate system keep going with whatever bounds their
    /// metadata supplied; the feature is simply absent otherwise.
    ///
    /// # Arguments
    /// * `method` - Distance formula for the physical pixel sizes
    ///
    /// # Returns
    /// Number of parents that ended up with geographic bounds
    pub fn add_geo_info(&mut self, method: DistanceMethod) -> PatchResult<usize> {
        info!("Adding geographic info, tree level: parent");
        let mut georeferenced = 0;
        for id in self.tree.list_parents() {
            let record = match self.tree.parent_mut(&id) {
                Some(record) => record,
                None => continue,
            };
            match self.referencer.georeference(record) {
                Ok(_) => {}
                Err(e) if is_fatal(&e) => return Err(e),
                Err(e) => warn!(
                    "No geo reference for {} ({}); add metadata coordinates instead",
                    id, e
                ),
            }
            if record.geo_bounds.is_some() {
                georeferenced += 1;
                if let Err(e) = self.referencer.physical_pixel_size(record, method, false) {
                    if is_fatal(&e) {
                        return Err(e);
                    }
                    warn!("Could not compute pixel size for {}: {}", id, e);
                }
            }
        }
        Ok(georeferenced)
    }

    /// Derive per-pixel angular increments for every parent
    pub fn add_coord_increments(&mut self) -> PatchResult<usize> {
        info!("Adding coordinate increments, tree level: parent");
        let mut updated = 0;
        for id in self.tree.list_parents() {
            let record = match self.tree.parent_mut(&id) {
                Some(record) => record,
                None => continue,
            };
            match self.referencer.pixel_increments(record, false) {
                Ok(_) => updated += 1,
                Err(e) if is_fatal(&e) => return Err(e),
                Err(e) => warn!(
                    "No coordinates found for {} ({}); run add_metadata or add_geo_info first",
                    id, e
                ),
            }
        }
        Ok(updated)
    }

    /// Derive center coordinates for every record at one level
    ///
    /// Children borrow their parent's increments; a parent lacking
    /// coordinates is warned about once, not per child.
    pub fn add_center_coords(&mut self, level: TreeLevel) -> PatchResult<usize> {
        info!("Adding center coordinates, tree level: {}", level.name());
        match level {
            TreeLevel::Parent => {
                let mut updated = 0;
                for id in self.tree.list_parents() {
                    let record = match self.tree.parent_mut(&id) {
                        Some(record) => record,
                        None => continue,
                    };
                    match self.referencer.parent_center(record, false) {
                        Ok(_) => updated += 1,
                        Err(e) if is_fatal(&e) => return Err(e),
                        Err(e) => warn!("No center coordinates for {}: {}", id, e),
                    }
                }
                Ok(updated)
            }
            TreeLevel::Child => self.add_child_centers(),
        }
    }

    fn add_child_centers(&mut self) -> PatchResult<usize> {
        let mut updated = 0;
        let mut warned_parents: BTreeSet<String> = BTreeSet::new();

        for id in self.tree.list_children() {
            let parent_id = match self.tree.get_child(&id).and_then(|c| c.parent_id.clone()) {
                Some(parent_id) => parent_id,
                None => continue,
            };
            // The parent is cloned so the child can be borrowed mutably;
            // increments computed on the clone are written back below
            let mut parent = match self.tree.get_parent(&parent_id).cloned() {
                Some(parent) => parent,
                None => continue,
            };
            let child = match self.tree.child_mut(&id) {
                Some(child) => child,
                None => continue,
            };
            match self.referencer.child_center(child, &mut parent, false) {
                Ok(_) => {
                    updated += 1;
                    let pixel_deg = parent.pixel_deg;
                    let shape = parent.shape;
                    if let Some(stored) = self.tree.parent_mut(&parent_id) {
                        if stored.pixel_deg.is_none() {
                            stored.pixel_deg = pixel_deg;
                        }
                        if stored.shape.is_none() {
                            stored.shape = shape;
                        }
                    }
                }
                Err(e) if is_fatal(&e) => return Err(e),
                Err(e) => {
                    if warned_parents.insert(parent_id.clone()) {
                        warn!(
                            "No center coordinates for patches of {}: {}",
                            parent_id, e
                        );
                    }
                }
            }
        }
        Ok(updated)
    }

    /// Compute pixel statistics for children, optionally of one parent
    ///
    /// # Arguments
    /// * `parent_id` - Restrict to one parent's children; None means all
    ///
    /// # Returns
    /// Number of children whose statistics were computed or cached
    pub fn calc_pixel_stats(&mut self, parent_id: Option<&str>) -> PatchResult<usize> {
        let parent_ids: Vec<String> = match parent_id {
            Some(id) => vec![id.to_string()],
            None => self.tree.list_parents(),
        };

        let mut updated = 0;
        for pid in parent_ids {
            info!("Calculating pixel stats for children of {}", pid);
            let child_ids: Vec<String> = match self.tree.get_parent(&pid) {
                Some(parent) if !parent.children.is_empty() => {
                    parent.children.iter().cloned().collect()
                }
                Some(_) => {
                    warn!("No children found for {}", pid);
                    continue;
                }
                None => {
                    warn!("Unknown parent: {}", pid);
                    continue;
                }
            };
            for child_id in child_ids {
                let child = match self.tree.child_mut(&child_id) {
                    Some(child) => child,
                    None => continue,
                };
                match StatsComputer::compute(child) {
                    Ok(_) => updated += 1,
                    Err(e) if is_fatal(&e) => return Err(e),
                    Err(e) => warn!("Could not compute stats for {}: {}", child_id, e),
                }
            }
        }
        Ok(updated)
    }

    /// Slice a range of parents into patches and register the children
    ///
    /// For the meters method, physical pixel sizes are derived first for
    /// any parent still missing them.
    ///
    /// # Arguments
    /// * `options` - Slicing policy
    /// * `distance_method` - Formula backing the meters conversion
    /// * `id_start` / `id_end` - Parent position range; a negative end
    ///   means all remaining
    ///
    /// # Returns
    /// Number of child records registered
    pub fn slice_all(
        &mut self,
        options: SliceOptions,
        distance_method: DistanceMethod,
        id_start: usize,
        id_end: i64,
    ) -> PatchResult<usize> {
        if options.method == SliceMethod::Meters {
            for id in self.tree.list_parents() {
                let record = match self.tree.parent_mut(&id) {
                    Some(record) => record,
                    None => continue,
                };
                if record.pixel_size_m.is_some() {
                    continue;
                }
                if let Err(e) = self
                    .referencer
                    .physical_pixel_size(record, distance_method, false)
                {
                    if is_fatal(&e) {
                        return Err(e);
                    }
                    // slice_all skips such parents with its own warning
                }
                let _ = record.fetch_shape(false);
            }
        }

        let patchifier = Patchifier::new(options)?;
        patchifier.slice_all(&mut self.tree, id_start, id_end)
    }

    /// Flatten both levels to tables
    pub fn export(&self) -> (Table, Table) {
        self.tree.export()
    }

    /// Write both levels to delimited table files
    pub fn export_to_files(
        &self,
        parent_path: &Path,
        child_path: &Path,
        delimiter: char,
    ) -> PatchResult<()> {
        let (parents, children) = self.tree.export();
        parents.write_delimited(parent_path, delimiter)?;
        children.write_delimited(child_path, delimiter)?;
        info!(
            "Exported {} parents to {} and {} children to {}",
            parents.len(),
            parent_path.display(),
            children.len(),
            child_path.display()
        );
        Ok(())
    }

    /// Printable summary of the tree
    pub fn summary(&self) -> String {
        self.tree.to_string()
    }
}

/// Compile an optional file-name pattern
fn compile_pattern(pattern: Option<&str>) -> PatchResult<Option<Regex>> {
    pattern
        .map(|p| {
            Regex::new(p)
                .map_err(|e| PatchError::GenericError(format!("Invalid pattern {}: {}", p, e)))
        })
        .transpose()
}

/// Errors that must abort a batch instead of degrading it
fn is_fatal(error: &PatchError) -> bool {
    matches!(error, PatchError::IoError(_) | PatchError::ImageError(_))
}
