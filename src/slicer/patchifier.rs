//! Patch extraction and registration
//!
//! One `Patchifier` carries the slicing policy; `slice_parent` cuts a
//! single sheet and `slice_all` fans out over the tree's parents with a
//! worker pool, feeding results back through the tree's single
//! registration path.

use std::fs;
use std::path::PathBuf;

use image::imageops::FilterType;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::coordinate::PixelBounds;
use crate::errors::{PatchError, PatchResult};
use crate::naming;
use crate::slicer::grid::pixel_grid;
use crate::tree::{ImageRecord, ImageTree};
use crate::utils::progress::SliceProgress;

/// How the tile size is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceMethod {
    /// Tile size is a pixel count
    Pixels,
    /// Tile size is a physical length in meters
    Meters,
}

impl SliceMethod {
    /// Parse a method name ("pixel" or "meters")
    pub fn parse(name: &str) -> PatchResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "pixel" | "pixels" => Ok(SliceMethod::Pixels),
            "meter" | "meters" => Ok(SliceMethod::Meters),
            other => Err(PatchError::GenericError(format!(
                "Unknown slice method: {}",
                other
            ))),
        }
    }

    /// Name used in logs and CLI help
    pub fn name(&self) -> &'static str {
        match self {
            SliceMethod::Pixels => "pixel",
            SliceMethod::Meters => "meters",
        }
    }
}

/// Slicing policy for one batch
#[derive(Debug, Clone)]
pub struct SliceOptions {
    /// Interpretation of `tile_size`
    pub method: SliceMethod,
    /// Patch edge length, pixels or meters per `method`
    pub tile_size: f64,
    /// Directory receiving the patch files
    pub output_dir: PathBuf,
    /// Force every patch to the full tile size
    pub square_cuts: bool,
    /// Scale factor applied to the written patch rasters
    pub resize_factor: Option<f64>,
    /// File extension for patch files
    pub output_format: String,
    /// Rewrite patch files that already exist
    pub rewrite: bool,
}

impl Default for SliceOptions {
    fn default() -> Self {
        SliceOptions {
            method: SliceMethod::Pixels,
            tile_size: 100.0,
            output_dir: PathBuf::from("sliced_images"),
            square_cuts: false,
            resize_factor: None,
            output_format: "png".to_string(),
            rewrite: false,
        }
    }
}

/// One patch produced by slicing
#[derive(Debug, Clone)]
pub struct SlicedPatch {
    /// Where the patch file lives
    pub path: PathBuf,
    /// Patch bounds in the parent's original pixel space
    pub bounds: PixelBounds,
}

/// Cuts parent rasters into patch grids
pub struct Patchifier {
    options: SliceOptions,
}

impl Patchifier {
    /// Create a patchifier with the given policy
    ///
    /// # Returns
    /// The patchifier, or `InvalidRange` for a non-positive tile size or
    /// resize factor
    pub fn new(options: SliceOptions) -> PatchResult<Self> {
        if options.tile_size <= 0.0 {
            return Err(PatchError::InvalidRange(format!(
                "tile size must be positive, got {}",
                options.tile_size
            )));
        }
        if let Some(factor) = options.resize_factor {
            if factor <= 0.0 {
                return Err(PatchError::InvalidRange(format!(
                    "resize factor must be positive, got {}",
                    factor
                )));
            }
        }
        Ok(Patchifier { options })
    }

    /// Slice one parent raster into patches
    ///
    /// The grid is computed on the original dimensions, so recorded
    /// bounds stay in original-resolution pixel space even when a resize
    /// factor scales the written rasters. With `rewrite` off an existing
    /// patch file is left untouched but still reported, which keeps
    /// repeated runs idempotent.
    ///
    /// # Arguments
    /// * `parent` - Parent record; must have a file path, and for the
    ///   meters method a computed shape and physical pixel size
    ///
    /// # Returns
    /// Every patch of the grid with its output path and bounds
    pub fn slice_parent(&self, parent: &ImageRecord) -> PatchResult<Vec<SlicedPatch>> {
        let path = parent.path.as_ref().ok_or_else(|| {
            PatchError::GenericError(format!("Parent {} has no file path", parent.id))
        })?;

        let tile_size = self.tile_size_pixels(parent)?;
        let img = image::open(path)?;
        let grid = pixel_grid(img.width(), img.height(), tile_size, self.options.square_cuts)?;

        fs::create_dir_all(&self.options.output_dir)?;

        info!(
            "Slicing {} into {} patches of {}px",
            parent.id,
            grid.len(),
            tile_size
        );

        let mut patches = Vec::with_capacity(grid.len());
        for bounds in grid {
            let name =
                naming::encode_patch_name(&parent.id, &bounds, &self.options.output_format);
            let out_path = self.options.output_dir.join(&name);

            if out_path.exists() && !self.options.rewrite {
                debug!("Keeping existing patch: {}", name);
            } else {
                self.write_patch(&img, &bounds, &out_path)?;
            }
            patches.push(SlicedPatch {
                path: out_path,
                bounds,
            });
        }
        Ok(patches)
    }

    /// Crop one patch out of the source and write it
    fn write_patch(
        &self,
        img: &image::DynamicImage,
        bounds: &PixelBounds,
        out_path: &std::path::Path,
    ) -> PatchResult<()> {
        let mut patch = img.crop_imm(bounds.min_x, bounds.min_y, bounds.width(), bounds.height());
        if let Some(factor) = self.options.resize_factor {
            let new_width = ((patch.width() as f64 * factor).round() as u32).max(1);
            let new_height = ((patch.height() as f64 * factor).round() as u32).max(1);
            patch = patch.resize_exact(new_width, new_height, FilterType::Lanczos3);
        }
        patch.save(out_path)?;
        Ok(())
    }

    /// Slice a range of the tree's parents and register the results
    ///
    /// Parents are processed by a worker pool — each slice touches only
    /// its own raster — and registration happens afterwards on the single
    /// writer, so a failure in one parent never corrupts the records of
    /// another. Parents missing the geo data the meters method needs are
    /// logged and skipped.
    ///
    /// # Arguments
    /// * `tree` - The registry to read parents from and register into
    /// * `id_start` - Position of the first parent to slice
    /// * `id_end` - Position past the last parent, or negative for all
    ///   remaining
    ///
    /// # Returns
    /// Number of child records registered
    pub fn slice_all(
        &self,
        tree: &mut ImageTree,
        id_start: usize,
        id_end: i64,
    ) -> PatchResult<usize> {
        let ids = tree.list_parents();
        let selected = select_range(&ids, id_start, id_end)?;

        let parents: Vec<ImageRecord> = selected
            .iter()
            .filter_map(|id| tree.get_parent(id).cloned())
            .collect();

        let progress = SliceProgress::new(parents.len() as u64, "Slicing parents");
        let outcomes: Vec<(String, PatchResult<Vec<SlicedPatch>>)> = parents
            .par_iter()
            .map(|parent| {
                let outcome = self.slice_parent(parent);
                progress.advance(&parent.id);
                (parent.id.clone(), outcome)
            })
            .collect();
        progress.finish();

        let mut registered = 0;
        for (parent_id, outcome) in outcomes {
            match outcome {
                Ok(patches) => {
                    for patch in patches {
                        let id = patch
                            .path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| {
                                naming::encode_patch_name(
                                    &parent_id,
                                    &patch.bounds,
                                    &self.options.output_format,
                                )
                            });
                        tree.register(ImageRecord::child(
                            id,
                            patch.path,
                            parent_id.clone(),
                            patch.bounds,
                        ))?;
                        registered += 1;
                    }
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping parent {}: {}", parent_id, e);
                }
                Err(e) => return Err(e),
            }
        }
        tree.link_children();
        Ok(registered)
    }

    /// Effective tile size in pixels for one parent
    fn tile_size_pixels(&self, parent: &ImageRecord) -> PatchResult<u32> {
        match self.options.method {
            SliceMethod::Pixels => Ok((self.options.tile_size as u32).max(1)),
            SliceMethod::Meters => {
                let edges = parent.pixel_size_m.ok_or_else(|| {
                    PatchError::MissingGeoData(format!(
                        "physical pixel size not computed for {}",
                        parent.id
                    ))
                })?;
                let shape = parent.shape.ok_or_else(|| {
                    PatchError::MissingGeoData(format!("shape not known for {}", parent.id))
                })?;
                // Vertical pixel size, averaged over the two vertical edges
                let pixel_height = (edges.left + edges.right) / 2.0 / shape.height as f64;
                Ok(((self.options.tile_size / pixel_height) as u32).max(1))
            }
        }
    }
}

/// Select a position range of parent ids
///
/// A negative end means "through the last id". An end before the start
/// is a range error.
pub(crate) fn select_range(ids: &[String], id_start: usize, id_end: i64) -> PatchResult<&[String]> {
    if id_end < 0 {
        Ok(&ids[id_start.min(ids.len())..])
    } else if (id_end as usize) < id_start {
        Err(PatchError::InvalidRange(format!(
            "range end {} precedes start {}",
            id_end, id_start
        )))
    } else {
        let end = (id_end as usize).min(ids.len());
        Ok(&ids[id_start.min(end)..end])
    }
}
