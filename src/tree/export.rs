//! Tabular export
//!
//! Flattens both tree levels into independent tables, one row per
//! record. Columns are the union of attributes present across the level,
//! so sparse metadata shows up as empty cells rather than lost data.
//! Geographic tuples keep the fixed (lon_min, lon_max, lat_min, lat_max)
//! order.

use std::collections::BTreeSet;

use crate::tree::record::{ImageRecord, TreeLevel};
use crate::tree::registry::ImageTree;
use crate::tree::table::Table;

/// Fixed leading columns of a parent row
const PARENT_COLUMNS: [&str; 9] = [
    "image_id",
    "image_path",
    "parent_id",
    "shape",
    "coord",
    "center_lon",
    "center_lat",
    "pixel_deg",
    "pixel_size_m",
];

/// Fixed leading columns of a child row
const CHILD_COLUMNS: [&str; 10] = [
    "image_id",
    "image_path",
    "parent_id",
    "min_x",
    "min_y",
    "max_x",
    "max_y",
    "shape",
    "center_lon",
    "center_lat",
];

impl ImageTree {
    /// Flatten both levels into (parent_table, child_table)
    ///
    /// The returned tables are copies; mutating them never touches the
    /// tree.
    pub fn export(&self) -> (Table, Table) {
        (self.export_parents(), self.export_children())
    }

    fn export_parents(&self) -> Table {
        let extra = extra_columns(self.records(TreeLevel::Parent));

        let mut columns: Vec<String> = PARENT_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.push("children".to_string());
        columns.extend(extra.iter().cloned());

        let mut table = Table::new(columns);
        for record in self.records(TreeLevel::Parent) {
            let mut row = vec![
                record.id.clone(),
                path_cell(record),
                String::new(), // parents have no parent
                record
                    .shape
                    .map(|s| s.to_tuple_string())
                    .unwrap_or_default(),
                record
                    .geo_bounds
                    .map(|b| b.to_tuple_string())
                    .unwrap_or_default(),
                record
                    .center
                    .map(|(lon, _)| lon.to_string())
                    .unwrap_or_default(),
                record
                    .center
                    .map(|(_, lat)| lat.to_string())
                    .unwrap_or_default(),
                record
                    .pixel_deg
                    .map(|(dlon, dlat)| format!("({}, {})", dlon, dlat))
                    .unwrap_or_default(),
                record
                    .pixel_size_m
                    .map(|e| e.to_tuple_string())
                    .unwrap_or_default(),
            ];
            let children: Vec<&str> = record.children.iter().map(|s| s.as_str()).collect();
            row.push(format!("[{}]", children.join(", ")));
            push_extra_cells(&mut row, record, &extra);
            table.push_row(row);
        }
        table
    }

    fn export_children(&self) -> Table {
        let extra = extra_columns(self.records(TreeLevel::Child));
        let with_alpha = self
            .records(TreeLevel::Child)
            .any(|r| r.pixel_stats.map_or(false, |s| s.mean.alpha.is_some()));
        let with_stats = self
            .records(TreeLevel::Child)
            .any(|r| r.pixel_stats.is_some());

        let mut columns: Vec<String> = CHILD_COLUMNS.iter().map(|c| c.to_string()).collect();
        if with_stats {
            for prefix in ["mean", "std"] {
                for suffix in ["R", "G", "B", "RGB"] {
                    columns.push(format!("{}_pixel_{}", prefix, suffix));
                }
                if with_alpha {
                    columns.push(format!("{}_pixel_A", prefix));
                }
            }
        }
        columns.extend(extra.iter().cloned());

        let mut table = Table::new(columns);
        for record in self.records(TreeLevel::Child) {
            let bounds = record.pixel_bounds;
            let mut row = vec![
                record.id.clone(),
                path_cell(record),
                record.parent_id.clone().unwrap_or_default(),
                bounds.map(|b| b.min_x.to_string()).unwrap_or_default(),
                bounds.map(|b| b.min_y.to_string()).unwrap_or_default(),
                bounds.map(|b| b.max_x.to_string()).unwrap_or_default(),
                bounds.map(|b| b.max_y.to_string()).unwrap_or_default(),
                record
                    .shape
                    .map(|s| s.to_tuple_string())
                    .unwrap_or_default(),
                record
                    .center
                    .map(|(lon, _)| lon.to_string())
                    .unwrap_or_default(),
                record
                    .center
                    .map(|(_, lat)| lat.to_string())
                    .unwrap_or_default(),
            ];
            if with_stats {
                for channel in stats_cells(record, with_alpha) {
                    row.push(channel);
                }
            }
            push_extra_cells(&mut row, record, &extra);
            table.push_row(row);
        }
        table
    }
}

/// Union of side-table column names across records, sorted
fn extra_columns<'a>(records: impl Iterator<Item = &'a ImageRecord>) -> Vec<String> {
    let mut names = BTreeSet::new();
    for record in records {
        for key in record.extra.keys() {
            names.insert(key.clone());
        }
    }
    names.into_iter().collect()
}

fn path_cell(record: &ImageRecord) -> String {
    record
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn push_extra_cells(row: &mut Vec<String>, record: &ImageRecord, extra: &[String]) {
    for name in extra {
        row.push(record.extra.get(name).cloned().unwrap_or_default());
    }
}

/// Statistics cells in column order, empty when absent
fn stats_cells(record: &ImageRecord, with_alpha: bool) -> Vec<String> {
    let mut cells = Vec::new();
    match record.pixel_stats {
        Some(stats) => {
            for channel in [stats.mean, stats.std_dev] {
                cells.push(channel.red.to_string());
                cells.push(channel.green.to_string());
                cells.push(channel.blue.to_string());
                cells.push(channel.rgb.to_string());
                if with_alpha {
                    cells.push(
                        channel
                            .alpha
                            .map(|a| a.to_string())
                            .unwrap_or_default(),
                    );
                }
            }
        }
        None => {
            let per_channel = if with_alpha { 5 } else { 4 };
            cells.resize(per_channel * 2, String::new());
        }
    }
    cells
}
