use super::FeatureTable;
use crate::attribute::Contribution;
use crate::cell::CellId;
use std::collections::HashMap;

/// Sparse running totals keyed by `(cell, column)`.
///
/// Totals only grow: negative and non-finite contributions are dropped with a
/// warning. Two accumulators merge by summing, so partial accumulators built
/// on separate workers can be combined in any order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    totals: HashMap<(CellId, String), f64>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, contribution: Contribution) {
        let Contribution {
            cell,
            column,
            value,
        } = contribution;
        if !value.is_finite() || value < 0.0 {
            log::warn!(
                "Dropping contribution {} to {}/{}: totals cannot decrease",
                value,
                cell,
                column
            );
            return;
        }
        *self.totals.entry((cell, column)).or_insert(0.0) += value;
    }

    pub fn extend(&mut self, contributions: impl IntoIterator<Item = Contribution>) {
        for contribution in contributions {
            self.add(contribution);
        }
    }

    /// Sums `other` into `self`.
    pub fn merge(mut self, other: Accumulator) -> Self {
        if self.totals.len() < other.totals.len() {
            return other.merge(self);
        }
        for (key, value) in other.totals {
            *self.totals.entry(key).or_insert(0.0) += value;
        }
        self
    }

    pub fn get(&self, cell: &CellId, column: &str) -> Option<f64> {
        self.totals.get(&(*cell, column.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Pivots the totals into a dense table with lexicographically sorted columns.
    pub fn into_table(self) -> FeatureTable {
        let mut columns: Vec<String> = self
            .totals
            .keys()
            .map(|(_, column)| column.clone())
            .collect();
        columns.sort();
        columns.dedup();

        let index: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut rows: HashMap<CellId, Vec<f64>> = HashMap::new();
        for ((cell, column), value) in &self.totals {
            let row = rows
                .entry(*cell)
                .or_insert_with(|| vec![0.0; columns.len()]);
            if let Some(&i) = index.get(column.as_str()) {
                row[i] = *value;
            }
        }

        FeatureTable::from_parts(columns, rows)
    }
}
