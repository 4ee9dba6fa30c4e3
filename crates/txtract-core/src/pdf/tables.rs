//! Table reconstruction from column-aligned page text.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref COLUMN_GAP: Regex = Regex::new(r"\s{2,}").unwrap();
}

/// Minimum number of cells for a line to count as a table row.
const MIN_CELLS: usize = 3;

/// A run of consecutive column-aligned lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Rows of cell text, left to right.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Widest row.
    pub fn num_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Split a line into cells on tabs, pipes, or runs of two or more spaces.
pub fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let cells: Vec<&str> = if trimmed.contains('\t') || trimmed.contains('|') {
        trimmed.split(['\t', '|']).collect()
    } else {
        COLUMN_GAP.split(trimmed).collect()
    };

    cells
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Group consecutive multi-column lines into tables.
pub fn detect_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current = Table::default();

    for line in text.lines() {
        let cells = split_cells(line);
        if cells.len() >= MIN_CELLS {
            current.rows.push(cells);
        } else if !current.rows.is_empty() {
            tables.push(std::mem::take(&mut current));
        }
    }

    if !current.rows.is_empty() {
        tables.push(current);
    }

    tables
}
