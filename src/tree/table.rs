//! Delimited text tables
//!
//! The tree's import/export format is a flat delimited table, pipe by
//! default, one header line and one row per record. Values are plain
//! text; tuple-valued columns carry their literal `(a, b, c)` form and
//! are re-parsed on import.

use std::fs;
use std::path::Path;

use crate::errors::{PatchError, PatchResult};

/// Default column delimiter for table files
pub const DEFAULT_DELIMITER: char = '|';

/// A flat table of text cells with named columns
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Column names, in order
    pub columns: Vec<String>,
    /// Rows of cells; each row has exactly one cell per column
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row, padding or truncating to the column count
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Cell value by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Read a delimited table from a file
    ///
    /// The first line names the columns. Short rows are padded with
    /// empty cells, long rows rejected.
    ///
    /// # Arguments
    /// * `path` - File to read
    /// * `delimiter` - Column delimiter
    pub fn read_delimited(path: &Path, delimiter: char) -> PatchResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut lines = content.lines();

        let header = lines.next().ok_or_else(|| {
            PatchError::GenericError(format!("Empty table file: {}", path.display()))
        })?;
        let columns: Vec<String> = header
            .split(delimiter)
            .map(|c| c.trim().to_string())
            .collect();

        let mut table = Table::new(columns);
        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<String> = line
                .split(delimiter)
                .map(|c| c.trim().to_string())
                .collect();
            if cells.len() > table.columns.len() {
                return Err(PatchError::GenericError(format!(
                    "Row {} of {} has {} cells but the table has {} columns",
                    line_no + 2,
                    path.display(),
                    cells.len(),
                    table.columns.len()
                )));
            }
            table.push_row(cells);
        }
        Ok(table)
    }

    /// Write the table to a delimited file
    pub fn write_delimited(&self, path: &Path, delimiter: char) -> PatchResult<()> {
        let mut out = String::new();
        out.push_str(&self.columns.join(&delimiter.to_string()));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join(&delimiter.to_string()));
            out.push('\n');
        }
        fs::write(path, out)?;
        Ok(())
    }
}
