//! Dense per-cell feature tables.
//!
//! A [`FeatureTable`] is rectangular: every row holds a value for every
//! column, zero where nothing was observed.

mod accumulator;
mod neighbours;

pub use accumulator::Accumulator;
pub use neighbours::{
    NEIGHBOUR_SUFFIX, add_neighbour_counts, is_neighbour_column, neighbour_column,
};

use crate::attribute::Contribution;
use crate::cell::CellId;
use std::collections::HashMap;

/// Rows keyed by cell, columns keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: HashMap<CellId, Vec<f64>>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    // Callers guarantee every row has `columns.len()` values.
    pub(crate) fn from_parts(columns: Vec<String>, rows: HashMap<CellId, Vec<f64>>) -> Self {
        debug_assert!(rows.values().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, cell: &CellId) -> bool {
        self.rows.contains_key(cell)
    }

    pub fn row(&self, cell: &CellId) -> Option<&[f64]> {
        self.rows.get(cell).map(Vec::as_slice)
    }

    /// Value at `(cell, column)`; `None` if either is absent from the table.
    pub fn get(&self, cell: &CellId, column: &str) -> Option<f64> {
        let i = self.column_index(column)?;
        self.rows.get(cell).map(|row| row[i])
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellId> {
        self.rows.keys()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&CellId, &[f64])> {
        self.rows.iter().map(|(cell, row)| (cell, row.as_slice()))
    }

    /// Cells ordered by their string form, the row order of every export.
    pub fn sorted_cells(&self) -> Vec<CellId> {
        let mut keyed: Vec<(String, CellId)> =
            self.rows.keys().map(|c| (c.to_string(), *c)).collect();
        keyed.sort();
        keyed.into_iter().map(|(_, c)| c).collect()
    }

    /// Sum of one column over all rows.
    pub fn column_total(&self, column: &str) -> Option<f64> {
        let i = self.column_index(column)?;
        Some(self.rows.values().map(|row| row[i]).sum())
    }
}

/// Groups contributions by `(cell, column)`, sums them and pivots to a table.
pub fn assemble(contributions: impl IntoIterator<Item = Contribution>) -> FeatureTable {
    let mut acc = Accumulator::new();
    acc.extend(contributions);
    acc.into_table()
}

/// Outer-joins tables on cell id.
///
/// Columns keep first-seen order across `tables`. Where two tables hold a
/// value for the same `(cell, column)` the earlier table's value is kept, so
/// merging a table with itself returns it unchanged.
pub fn merge(tables: &[FeatureTable]) -> FeatureTable {
    outer_join(tables, |slot, value| {
        slot.get_or_insert(value);
    })
}

/// Outer-joins tables on cell id, summing values that meet in the same
/// `(cell, column)`.
///
/// Used for tables built from disjoint feature sets, where a shared column
/// name means both tables contributed to the same total.
pub fn merge_summed(tables: &[FeatureTable]) -> FeatureTable {
    outer_join(tables, |slot, value| {
        *slot = Some(slot.unwrap_or(0.0) + value);
    })
}

/// Column names present in more than one of `tables`.
pub fn shared_columns(tables: &[FeatureTable]) -> Vec<String> {
    let mut seen: Vec<&str> = Vec::new();
    let mut shared: Vec<String> = Vec::new();
    for table in tables {
        for column in &table.columns {
            if seen.contains(&column.as_str()) {
                if !shared.contains(column) {
                    shared.push(column.clone());
                }
            } else {
                seen.push(column);
            }
        }
    }
    shared
}

fn outer_join(tables: &[FeatureTable], combine: impl Fn(&mut Option<f64>, f64)) -> FeatureTable {
    let mut columns: Vec<String> = Vec::new();
    for table in tables {
        for column in &table.columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }
    let index: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut joined: HashMap<CellId, Vec<Option<f64>>> = HashMap::new();
    for table in tables {
        let targets: Vec<usize> = table
            .columns
            .iter()
            .filter_map(|c| index.get(c.as_str()).copied())
            .collect();
        for (cell, row) in &table.rows {
            let slots = joined
                .entry(*cell)
                .or_insert_with(|| vec![None; columns.len()]);
            for (&target, &value) in targets.iter().zip(row) {
                combine(&mut slots[target], value);
            }
        }
    }

    let rows: HashMap<CellId, Vec<f64>> = joined
        .into_iter()
        .map(|(cell, slots)| (cell, slots.into_iter().map(|v| v.unwrap_or(0.0)).collect()))
        .collect();

    log::debug!(
        "Merged {} tables into {} rows x {} columns",
        tables.len(),
        rows.len(),
        columns.len()
    );
    FeatureTable::from_parts(columns, rows)
}
