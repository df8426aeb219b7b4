use std::collections::HashMap;

use common::naming::{AliasEntry, AliasTable, normalize_country_name};

use crate::gateway::sql::COUNTRY;
use crate::models::{Cell, Column, Table};

/// Post-processes raw tabular results before they reach consumers:
/// canonicalizes the country column and collapses rows that map to the
/// same canonical name by summing their numeric cells.
pub struct SchemaNormalizer {
    aliases: AliasTable,
}

impl SchemaNormalizer {
    pub fn new(entries: &[AliasEntry]) -> Self {
        Self {
            aliases: AliasTable::new(entries),
        }
    }

    /// Canonical name for a raw country string: normalized, then mapped
    /// through the alias table.
    pub fn canonical(&self, raw: &str) -> String {
        self.aliases.canonical(raw)
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize_country_name(raw)
    }

    /// Groups rows by canonical country name and sums numeric cells for
    /// every group with more than one member. First-seen row order is
    /// preserved. Idempotent: a table without duplicate groups comes back
    /// equivalent.
    pub fn merge_aliases(&self, table: &Table) -> Table {
        let Some(country_column) = table.column(COUNTRY) else {
            return table.clone();
        };

        // canonical name -> merged row index
        let mut groups: HashMap<String, usize> = HashMap::new();
        let mut countries: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<Cell>> = Vec::new();

        let value_columns: Vec<&Column> = table
            .columns()
            .iter()
            .filter(|c| c.name != COUNTRY)
            .collect();

        for (row_idx, cell) in country_column.cells.iter().enumerate() {
            let raw = cell.as_str().unwrap_or_default();
            let canonical = self.canonical(raw);
            let values: Vec<Cell> = value_columns
                .iter()
                .map(|c| c.cells[row_idx].clone())
                .collect();

            match groups.get(&canonical) {
                Some(&merged_idx) => {
                    let merged = &mut rows[merged_idx];
                    for (slot, value) in merged.iter_mut().zip(values) {
                        *slot = add_cells(slot, &value);
                    }
                }
                None => {
                    groups.insert(canonical.clone(), rows.len());
                    countries.push(canonical);
                    rows.push(values);
                }
            }
        }

        let mut columns = Vec::with_capacity(table.num_columns());
        columns.push(Column::new(
            COUNTRY,
            countries.into_iter().map(Cell::Str).collect(),
        ));
        for (col_idx, column) in value_columns.iter().enumerate() {
            columns.push(Column::new(
                column.name.clone(),
                rows.iter().map(|r| r[col_idx].clone()).collect(),
            ));
        }
        Table::new(columns)
    }
}

/// Numeric addition with null treated as zero; non-numeric cells keep the
/// first-seen value.
fn add_cells(a: &Cell, b: &Cell) -> Cell {
    match (a, b) {
        (Cell::Null, other) => other.clone(),
        (other, Cell::Null) => other.clone(),
        (Cell::Int(x), Cell::Int(y)) => Cell::Int(x + y),
        (Cell::Float(x), Cell::Float(y)) => Cell::Float(x + y),
        (Cell::Int(x), Cell::Float(y)) | (Cell::Float(y), Cell::Int(x)) => {
            Cell::Float(*x as f64 + y)
        }
        (first, _) => first.clone(),
    }
}
