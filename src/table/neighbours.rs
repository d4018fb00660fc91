use super::FeatureTable;
use crate::cell::CellId;
use crate::error::HexAggError;
use crate::index::{HexGrid, NEIGHBOUR_RING};
use rayon::prelude::*;
use std::collections::HashMap;

pub const NEIGHBOUR_SUFFIX: &str = "_neighbour_count";

pub fn neighbour_column(base: &str) -> String {
    format!("{}{}", base, NEIGHBOUR_SUFFIX)
}

pub fn is_neighbour_column(column: &str) -> bool {
    column.ends_with(NEIGHBOUR_SUFFIX)
}

/// Appends a `<column>_neighbour_count` column for every base column.
///
/// Each present cell pushes its values onto its present 1-ring neighbours;
/// a cell never adds to itself. Values are read from `table` and written to a
/// new table, so no source value changes during the pass. Existing neighbour
/// columns are carried over unchanged and never aggregated again.
///
/// Fails with `InvalidCell` if the table holds cells of another resolution
/// than `grid`.
pub fn add_neighbour_counts(
    table: &FeatureTable,
    grid: &HexGrid,
) -> Result<FeatureTable, HexAggError> {
    let bases: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| !is_neighbour_column(c))
        .filter(|(_, c)| !table.columns.contains(&neighbour_column(c)))
        .map(|(i, _)| i)
        .collect();

    let mut columns = table.columns.clone();
    let offset = columns.len();
    columns.extend(bases.iter().map(|&i| neighbour_column(&table.columns[i])));

    let cells: Vec<CellId> = table.rows.keys().copied().collect();
    let neighbours: Vec<Vec<CellId>> = cells
        .par_iter()
        .map(|cell| {
            grid.neighbors(cell, NEIGHBOUR_RING)
                .map(|set| set.into_iter().filter(|n| table.contains(n)).collect())
        })
        .collect::<Result<_, _>>()?;

    let mut rows: HashMap<CellId, Vec<f64>> = table
        .rows
        .iter()
        .map(|(cell, row)| {
            let mut extended = row.clone();
            extended.resize(columns.len(), 0.0);
            (*cell, extended)
        })
        .collect();

    for (cell, targets) in cells.iter().zip(&neighbours) {
        let Some(source) = table.rows.get(cell) else {
            continue;
        };
        for target in targets {
            if let Some(row) = rows.get_mut(target) {
                for (k, &base) in bases.iter().enumerate() {
                    row[offset + k] += source[base];
                }
            }
        }
    }

    log::debug!(
        "Added {} neighbour columns over {} cells",
        bases.len(),
        rows.len()
    );
    Ok(FeatureTable::from_parts(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Contribution;
    use crate::feature::GeoPoint;
    use crate::table::assemble;

    fn grid_and_cell() -> Result<(HexGrid, CellId), HexAggError> {
        let grid = HexGrid::new(9)?;
        let cell = grid.cell_for(&GeoPoint::new(52.2297, 21.0122))?;
        Ok((grid, cell))
    }

    #[test]
    fn test_lone_cell_has_zero_neighbour_count() -> Result<(), HexAggError> {
        let (grid, cell) = grid_and_cell()?;
        let table = assemble([Contribution::new(cell, "amenity", 3.0)]);

        let augmented = add_neighbour_counts(&table, &grid)?;

        assert_eq!(augmented.columns(), &["amenity", "amenity_neighbour_count"]);
        assert_eq!(augmented.get(&cell, "amenity"), Some(3.0));
        assert_eq!(augmented.get(&cell, "amenity_neighbour_count"), Some(0.0));
        Ok(())
    }

    #[test]
    fn test_push_to_present_neighbours_only() -> Result<(), HexAggError> {
        let (grid, center) = grid_and_cell()?;
        let ring: Vec<CellId> = grid.neighbors(&center, 1)?.into_iter().collect();
        let a = ring[0];
        let touching_a = grid.neighbors(&a, 1)?;
        let b = ring
            .iter()
            .copied()
            .find(|c| *c != a && !touching_a.contains(c))
            .ok_or_else(|| HexAggError::InvalidCell("no opposite ring cell".into()))?;
        let far = grid.cell_for(&GeoPoint::new(52.30, 21.20))?;

        let table = assemble([
            Contribution::new(center, "amenity", 5.0),
            Contribution::new(a, "amenity", 1.0),
            Contribution::new(b, "area_building", 40.0),
            Contribution::new(far, "amenity", 7.0),
        ]);

        let augmented = add_neighbour_counts(&table, &grid)?;

        assert_eq!(augmented.len(), 4);
        assert_eq!(augmented.get(&a, "amenity_neighbour_count"), Some(5.0));
        assert_eq!(augmented.get(&b, "amenity_neighbour_count"), Some(5.0));
        assert_eq!(augmented.get(&a, "area_building_neighbour_count"), Some(0.0));
        assert_eq!(augmented.get(&far, "amenity_neighbour_count"), Some(0.0));
        assert_eq!(augmented.get(&center, "amenity_neighbour_count"), Some(1.0));
        assert_eq!(
            augmented.get(&center, "area_building_neighbour_count"),
            Some(40.0)
        );
        // originals untouched
        assert_eq!(augmented.get(&center, "amenity"), Some(5.0));
        assert_eq!(augmented.get(&far, "amenity"), Some(7.0));
        Ok(())
    }

    #[test]
    fn test_neighbour_equivalence() -> Result<(), HexAggError> {
        let (grid, center) = grid_and_cell()?;
        let mut present: Vec<CellId> = grid.neighbors(&center, 2)?.into_iter().collect();
        present.push(center);
        let table = assemble(
            present
                .iter()
                .enumerate()
                .map(|(i, c)| Contribution::new(*c, "amenity", i as f64 + 1.0)),
        );

        let augmented = add_neighbour_counts(&table, &grid)?;

        for cell in &present {
            let expected: f64 = grid
                .neighbors(cell, 1)?
                .iter()
                .filter_map(|n| table.get(n, "amenity"))
                .sum();
            assert_eq!(augmented.get(cell, "amenity_neighbour_count"), Some(expected));
        }
        Ok(())
    }

    #[test]
    fn test_no_second_order_columns() -> Result<(), HexAggError> {
        let (grid, cell) = grid_and_cell()?;
        let table = assemble([Contribution::new(cell, "amenity", 1.0)]);

        let once = add_neighbour_counts(&table, &grid)?;
        let twice = add_neighbour_counts(&once, &grid)?;

        assert_eq!(once, twice);
        assert!(!twice
            .columns()
            .iter()
            .any(|c| c.ends_with("_neighbour_count_neighbour_count")));
        Ok(())
    }

    #[test]
    fn test_wrong_resolution_is_fatal() -> Result<(), HexAggError> {
        let (_, cell) = grid_and_cell()?;
        let table = assemble([Contribution::new(cell, "amenity", 1.0)]);

        let result = add_neighbour_counts(&table, &HexGrid::new(7)?);
        assert!(matches!(result, Err(HexAggError::InvalidCell(_))));
        Ok(())
    }
}
