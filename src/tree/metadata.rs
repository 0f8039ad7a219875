//! Metadata merging and table import
//!
//! External metadata arrives as delimited tables keyed by `name` or
//! `image_id`. Rows join onto existing records only — an unmatched key is
//! skipped, never inserted. Tuple-valued columns (`coord`, polygon-like)
//! are parsed from their literal text; everything else merges verbatim
//! into the record's open side-table.

use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;

use crate::coordinate::{GeoBounds, PixelBounds};
use crate::errors::{PatchError, PatchResult};
use crate::tree::record::{ChannelStats, EdgeLengths, ImageRecord, PixelStats, Shape, TreeLevel};
use crate::tree::registry::ImageTree;
use crate::tree::table::Table;

lazy_static! {
    /// Numbers inside a literal tuple/list representation
    static ref TUPLE_NUMBER: Regex = Regex::new(r"-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?").unwrap();
}

/// Columns the import maps onto typed record fields
const STRUCTURED_COLUMNS: [&str; 13] = [
    "image_path",
    "parent_id",
    "shape",
    "coord",
    "center_lon",
    "center_lat",
    "min_x",
    "min_y",
    "max_x",
    "max_y",
    "pixel_deg",
    "pixel_size_m",
    "children",
];

/// Exported statistics column names
const STATS_COLUMNS: [&str; 10] = [
    "mean_pixel_R",
    "mean_pixel_G",
    "mean_pixel_B",
    "mean_pixel_RGB",
    "mean_pixel_A",
    "std_pixel_R",
    "std_pixel_G",
    "std_pixel_B",
    "std_pixel_RGB",
    "std_pixel_A",
];

/// Pick the identity column of a metadata table
///
/// `name` is preferred when both `name` and `image_id` are present.
fn key_column(table: &Table) -> PatchResult<usize> {
    let name_idx = table.column_index("name");
    let image_id_idx = table.column_index("image_id");
    if name_idx.is_some() && image_id_idx.is_some() {
        info!("Both 'name' and 'image_id' columns exist, using 'name'");
    }
    name_idx.or(image_id_idx).ok_or_else(|| {
        PatchError::GenericError(
            "'name' or 'image_id' should be one of the columns".to_string(),
        )
    })
}

/// Non-empty cell of a row by column name
fn cell_value<'t>(table: &Table, row: &'t [String], name: &str) -> Option<&'t str> {
    table
        .column_index(name)
        .map(|i| row[i].as_str())
        .filter(|v| !v.is_empty())
}

/// Normalize a polygon-like literal into canonical tuple text
///
/// Keeps only the numbers, re-serialized as `(a, b, c, ...)`, so the
/// textual form survives round-trips regardless of the source's bracket
/// and whitespace habits.
fn normalize_tuple_text(text: &str) -> String {
    let numbers: Vec<&str> = TUPLE_NUMBER.find_iter(text).map(|m| m.as_str()).collect();
    format!("({})", numbers.join(", "))
}

/// True for columns holding polygon-like tuple literals
fn is_polygon_column(column: &str) -> bool {
    column.to_lowercase().starts_with("polygon")
}

impl ImageTree {
    /// Merge an external metadata table onto existing records
    ///
    /// # Arguments
    /// * `table` - Metadata rows keyed by `name` or `image_id`
    /// * `level` - Tree level the rows describe
    /// * `columns` - Columns to merge; None merges every column
    ///
    /// # Returns
    /// Number of rows that matched an existing record
    pub fn merge_metadata(
        &mut self,
        table: &Table,
        level: TreeLevel,
        columns: Option<&[String]>,
    ) -> PatchResult<usize> {
        let key_idx = key_column(table)?;
        let selected: Vec<(usize, String)> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(i, name)| {
                *i != key_idx
                    && columns
                        .map(|wanted| wanted.iter().any(|w| &w == name))
                        .unwrap_or(true)
            })
            .map(|(i, name)| (i, name.clone()))
            .collect();

        let mut matched = 0;
        for row in &table.rows {
            let key = row[key_idx].as_str();
            let record = match self.record_mut(level, key) {
                Some(record) => record,
                // Unknown keys are skipped, never inserted
                None => continue,
            };
            matched += 1;

            for (idx, column) in &selected {
                let value = row[*idx].as_str();
                if value.is_empty() {
                    continue;
                }
                apply_metadata_value(record, column, value);
            }
        }
        info!(
            "Merged metadata onto {} of {} {} rows",
            matched,
            table.len(),
            level.name()
        );
        Ok(matched)
    }

    /// Rebuild the tree from previously exported tables
    ///
    /// Inverse of `export`: typed columns are re-parsed, unknown columns
    /// land in the side-table, and linkage is rebuilt from the imported
    /// child records (the exported `children` column is ignored — the
    /// rebuild is authoritative).
    ///
    /// # Arguments
    /// * `parent_table` - Exported parent rows, if any
    /// * `child_table` - Exported child rows, if any
    /// * `clear` - Drop all current records first
    pub fn load_tables(
        &mut self,
        parent_table: Option<&Table>,
        child_table: Option<&Table>,
        clear: bool,
    ) -> PatchResult<()> {
        if clear {
            self.clear();
        }
        if let Some(table) = parent_table {
            let key_idx = key_column(table)?;
            for row in &table.rows {
                let record = parent_from_row(table, row, key_idx)?;
                self.register(record)?;
            }
        }
        if let Some(table) = child_table {
            let key_idx = key_column(table)?;
            for row in &table.rows {
                match child_from_row(table, row, key_idx) {
                    Ok(record) => self.register(record)?,
                    Err(e) => warn!("Skipping child row: {}", e),
                }
            }
        }
        self.link_children();
        Ok(())
    }
}

/// Apply one metadata cell to a record
fn apply_metadata_value(record: &mut ImageRecord, column: &str, value: &str) {
    if column == "coord" {
        match GeoBounds::from_string(value) {
            Ok(bounds) => record.geo_bounds = Some(bounds),
            Err(e) => warn!("Bad coord value for {}: {}", record.id, e),
        }
    } else if is_polygon_column(column) {
        record
            .extra
            .insert(column.to_string(), normalize_tuple_text(value));
    } else {
        record.extra.insert(column.to_string(), value.to_string());
    }
}

/// Rebuild a parent record from an exported table row
fn parent_from_row(table: &Table, row: &[String], key_idx: usize) -> PatchResult<ImageRecord> {
    let id = row[key_idx].clone();
    let mut record = ImageRecord::placeholder_parent(id);

    if let Some(path) = cell_value(table, row, "image_path") {
        record.path = Some(path.into());
    }
    if let Some(text) = cell_value(table, row, "shape") {
        record.shape = Some(Shape::from_string(text)?);
    }
    if let Some(text) = cell_value(table, row, "coord") {
        record.geo_bounds = Some(GeoBounds::from_string(text)?);
    }
    if let (Some(lon), Some(lat)) = (
        cell_value(table, row, "center_lon"),
        cell_value(table, row, "center_lat"),
    ) {
        record.center = Some((parse_float(lon)?, parse_float(lat)?));
    }
    if let Some(text) = cell_value(table, row, "pixel_deg") {
        let values = parse_float_tuple(text, 2)?;
        record.pixel_deg = Some((values[0], values[1]));
    }
    if let Some(text) = cell_value(table, row, "pixel_size_m") {
        let values = parse_float_tuple(text, 4)?;
        record.pixel_size_m = Some(EdgeLengths::new(values[0], values[1], values[2], values[3]));
    }
    absorb_extra_columns(&mut record, table, row, key_idx);
    Ok(record)
}

/// Rebuild a child record from an exported table row
fn child_from_row(table: &Table, row: &[String], key_idx: usize) -> PatchResult<ImageRecord> {
    let id = row[key_idx].clone();

    let parent_id = cell_value(table, row, "parent_id").ok_or_else(|| {
        PatchError::GenericError(format!("Child row {} has no parent_id", id))
    })?;
    let bounds = PixelBounds::new(
        parse_bounds_cell(table, row, "min_x", &id)?,
        parse_bounds_cell(table, row, "min_y", &id)?,
        parse_bounds_cell(table, row, "max_x", &id)?,
        parse_bounds_cell(table, row, "max_y", &id)?,
    );

    let mut record = ImageRecord::child(id, Default::default(), parent_id, bounds);
    record.path = cell_value(table, row, "image_path").map(Into::into);

    if let Some(text) = cell_value(table, row, "shape") {
        record.shape = Some(Shape::from_string(text)?);
    }
    if let (Some(lon), Some(lat)) = (
        cell_value(table, row, "center_lon"),
        cell_value(table, row, "center_lat"),
    ) {
        record.center = Some((parse_float(lon)?, parse_float(lat)?));
    }
    record.pixel_stats = stats_from_row(table, row);

    absorb_extra_columns(&mut record, table, row, key_idx);
    Ok(record)
}

/// Reassemble pixel statistics from their exported columns
fn stats_from_row(table: &Table, row: &[String]) -> Option<PixelStats> {
    let channel = |prefix: &str| -> Option<ChannelStats> {
        let number = |suffix: &str| -> Option<f64> {
            cell_value(table, row, &format!("{}_pixel_{}", prefix, suffix))?
                .parse()
                .ok()
        };
        Some(ChannelStats {
            red: number("R")?,
            green: number("G")?,
            blue: number("B")?,
            rgb: number("RGB")?,
            alpha: number("A"),
        })
    };
    Some(PixelStats {
        mean: channel("mean")?,
        std_dev: channel("std")?,
    })
}

/// Move unrecognized, non-empty columns into the record's side-table
fn absorb_extra_columns(record: &mut ImageRecord, table: &Table, row: &[String], key_idx: usize) {
    for (i, column) in table.columns.iter().enumerate() {
        if i == key_idx || row[i].is_empty() {
            continue;
        }
        if STRUCTURED_COLUMNS.contains(&column.as_str())
            || STATS_COLUMNS.contains(&column.as_str())
        {
            continue;
        }
        record.extra.insert(column.clone(), row[i].clone());
    }
}

fn parse_float(text: &str) -> PatchResult<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| PatchError::GenericError(format!("Invalid number: {}", text)))
}

fn parse_bounds_cell(table: &Table, row: &[String], name: &str, id: &str) -> PatchResult<u32> {
    let text = cell_value(table, row, name).ok_or_else(|| {
        PatchError::GenericError(format!("Child row {} is missing column {}", id, name))
    })?;
    text.trim()
        .parse::<u32>()
        .map_err(|_| PatchError::GenericError(format!("Invalid bounds value: {}", text)))
}

/// Parse a fixed-arity float tuple from its literal text
fn parse_float_tuple(text: &str, arity: usize) -> PatchResult<Vec<f64>> {
    let values: Vec<f64> = TUPLE_NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    if values.len() != arity {
        return Err(PatchError::GenericError(format!(
            "Expected {} values in tuple: {}",
            arity, text
        )));
    }
    Ok(values)
}
