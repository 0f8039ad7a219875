//! The two-level image registry
//!
//! Two ordered maps keyed by id, one per tree level. All mutation goes
//! through `register` and `link_children`; external collaborators only
//! ever receive exported copies.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use log::{debug, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::errors::{PatchError, PatchResult};
use crate::naming;
use crate::tree::record::{ImageRecord, TreeLevel};

/// File extensions treated as rasters when no filter is given
const RASTER_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "tif", "tiff"];

/// The authoritative registry of parent and child image records
#[derive(Debug, Default)]
pub struct ImageTree {
    parents: BTreeMap<String, ImageRecord>,
    children: BTreeMap<String, ImageRecord>,
}

impl ImageTree {
    /// Create an empty tree
    pub fn new() -> Self {
        ImageTree::default()
    }

    /// Total number of records at both levels
    pub fn len(&self) -> usize {
        self.parents.len() + self.children.len()
    }

    /// True when neither level holds a record
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty() && self.children.is_empty()
    }

    /// Number of records at one level
    pub fn count(&self, level: TreeLevel) -> usize {
        match level {
            TreeLevel::Parent => self.parents.len(),
            TreeLevel::Child => self.children.len(),
        }
    }

    /// Ids of all parents, in map order
    pub fn list_parents(&self) -> Vec<String> {
        self.parents.keys().cloned().collect()
    }

    /// Ids of all children, in map order
    pub fn list_children(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }

    /// Look up a record by level and id
    pub fn get(&self, level: TreeLevel, id: &str) -> Option<&ImageRecord> {
        match level {
            TreeLevel::Parent => self.parents.get(id),
            TreeLevel::Child => self.children.get(id),
        }
    }

    /// Look up a parent record
    pub fn get_parent(&self, id: &str) -> Option<&ImageRecord> {
        self.parents.get(id)
    }

    /// Look up a child record
    pub fn get_child(&self, id: &str) -> Option<&ImageRecord> {
        self.children.get(id)
    }

    pub(crate) fn parent_mut(&mut self, id: &str) -> Option<&mut ImageRecord> {
        self.parents.get_mut(id)
    }

    pub(crate) fn child_mut(&mut self, id: &str) -> Option<&mut ImageRecord> {
        self.children.get_mut(id)
    }

    pub(crate) fn record_mut(&mut self, level: TreeLevel, id: &str) -> Option<&mut ImageRecord> {
        match level {
            TreeLevel::Parent => self.parents.get_mut(id),
            TreeLevel::Child => self.children.get_mut(id),
        }
    }

    /// Iterate over all records at one level
    pub fn records(&self, level: TreeLevel) -> impl Iterator<Item = &ImageRecord> {
        match level {
            TreeLevel::Parent => self.parents.values(),
            TreeLevel::Child => self.children.values(),
        }
    }

    /// Insert or update a record at its level
    ///
    /// Re-registering an existing id folds the new identity fields into
    /// the stored record and keeps its derived caches. A child whose
    /// parent is unknown causes a placeholder parent (no path) to be
    /// created, so the linkage invariant never dangles.
    pub fn register(&mut self, record: ImageRecord) -> PatchResult<()> {
        match record.level {
            TreeLevel::Parent => {
                match self.parents.get_mut(&record.id) {
                    Some(existing) => existing.absorb(record),
                    None => {
                        self.parents.insert(record.id.clone(), record);
                    }
                }
            }
            TreeLevel::Child => {
                let parent_id = record.parent_id.clone().ok_or_else(|| {
                    PatchError::GenericError(format!(
                        "Child record {} has no parent id",
                        record.id
                    ))
                })?;
                if !self.parents.contains_key(&parent_id) {
                    debug!("Creating placeholder parent: {}", parent_id);
                    self.parents.insert(
                        parent_id.clone(),
                        ImageRecord::placeholder_parent(parent_id),
                    );
                }
                match self.children.get_mut(&record.id) {
                    Some(existing) => existing.absorb(record),
                    None => {
                        self.children.insert(record.id.clone(), record);
                    }
                }
            }
        }
        Ok(())
    }

    /// Rebuild every parent's children set from the current child records
    ///
    /// This is the single authority on parent/child linkage; run it after
    /// any bulk child import. Sets are rebuilt from scratch, so repeated
    /// invocations converge to the same state.
    pub fn link_children(&mut self) {
        for parent in self.parents.values_mut() {
            parent.children.clear();
        }
        let links: Vec<(String, String)> = self
            .children
            .values()
            .filter_map(|child| {
                child
                    .parent_id
                    .as_ref()
                    .map(|pid| (pid.clone(), child.id.clone()))
            })
            .collect();
        for (parent_id, child_id) in links {
            if !self.parents.contains_key(&parent_id) {
                self.parents.insert(
                    parent_id.clone(),
                    ImageRecord::placeholder_parent(parent_id.clone()),
                );
            }
            if let Some(parent) = self.parents.get_mut(&parent_id) {
                parent.children.insert(child_id);
            }
        }
    }

    /// Drop all records at both levels
    pub fn clear(&mut self) {
        self.parents.clear();
        self.children.clear();
    }

    /// Scan a directory for parent rasters and register them
    ///
    /// # Arguments
    /// * `dir` - Directory to walk recursively
    /// * `pattern` - Optional file-name filter; without one, common
    ///   raster extensions are accepted
    ///
    /// # Returns
    /// Number of parents registered
    pub fn scan_parents(&mut self, dir: &Path, pattern: Option<&Regex>) -> PatchResult<usize> {
        let mut registered = 0;
        for path in walk_raster_files(dir, pattern)? {
            let id = file_base_name(&path)?;
            self.register(ImageRecord::parent(id, path))?;
            registered += 1;
        }
        debug!("Scanned {} parents from {}", registered, dir.display());
        Ok(registered)
    }

    /// Scan a directory for patch files and register them as children
    ///
    /// File names are decoded through the patch name codec; names that do
    /// not decode are logged and skipped, and parents referenced by the
    /// decoded names appear as placeholders until registered themselves.
    ///
    /// # Arguments
    /// * `dir` - Directory to walk recursively
    /// * `pattern` - Optional file-name filter
    ///
    /// # Returns
    /// Number of children registered
    pub fn scan_patches(&mut self, dir: &Path, pattern: Option<&Regex>) -> PatchResult<usize> {
        let mut registered = 0;
        for path in walk_raster_files(dir, pattern)? {
            let id = file_base_name(&path)?;
            let decoded = naming::decode_patch_name(
                &id,
                naming::PARENT_DELIMITER,
                naming::BOUNDS_DELIMITER,
            );
            match decoded {
                Ok((parent_id, bounds)) => {
                    if let Err(e) = bounds.validate() {
                        warn!("Skipping patch {}: {}", id, e);
                        continue;
                    }
                    self.register(ImageRecord::child(id, path, parent_id, bounds))?;
                    registered += 1;
                }
                Err(e) => {
                    warn!("Skipping file with undecodable name {}: {}", id, e);
                }
            }
        }
        self.link_children();
        debug!("Scanned {} patches from {}", registered, dir.display());
        Ok(registered)
    }
}

impl fmt::Display for ImageTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#images: {}", self.len())?;
        writeln!(f, "#parents: {}", self.parents.len())?;
        for id in self.parents.keys().take(10) {
            writeln!(f, "  {}", id)?;
        }
        if self.parents.len() > 10 {
            writeln!(f, "  ...")?;
        }
        writeln!(f, "#children: {}", self.children.len())?;
        for id in self.children.keys().take(10) {
            writeln!(f, "  {}", id)?;
        }
        if self.children.len() > 10 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

/// Collect raster files under a directory, sorted for determinism
fn walk_raster_files(
    dir: &Path,
    pattern: Option<&Regex>,
) -> PatchResult<Vec<std::path::PathBuf>> {
    if !dir.is_dir() {
        return Err(PatchError::GenericError(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| PatchError::GenericError(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let keep = match pattern {
            Some(regex) => regex.is_match(&name),
            None => entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| RASTER_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false),
        };
        if keep {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Base name of a path as the record id
fn file_base_name(path: &Path) -> PatchResult<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| PatchError::GenericError(format!("No file name in {}", path.display())))
}
