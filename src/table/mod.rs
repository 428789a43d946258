//! Tabular rows as returned by the stats API and stored in the CSV files.
//!
//! Every cell is kept as text. The fetch loop never interprets values except for the
//! natural-key columns used for deduplication and the event date used for sorting.

pub mod csv_io;
pub mod dedup;
pub mod sort;

use std::collections::HashMap;

pub use csv_io::{read_csv_file, table_from_reader, table_to_csv_bytes, write_csv_atomic};
pub use dedup::dedup_by_key;
pub use sort::{normalize_dates, parse_event_date, sort_chronologically};

/// Marker for a cell that has no value (serialised as an empty CSV field)
pub const ABSENT: &str = "";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a table from a header and rows. Rows are normalised to the header width.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row, padding missing trailing cells with [`ABSENT`].
    /// Callers validate widths before building rows; surplus cells are cut to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), ABSENT.to_string());
        self.rows.push(row);
    }

    /// Finds a column by exact name, falling back to an ASCII case-insensitive match.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(name)))
    }

    /// Returns the cell at `row` in the named column.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Sets every row's value in `name`, appending the column if the table lacks it.
    /// An existing column with the exact same name is overwritten.
    pub fn set_column(&mut self, name: &str, value: &str) {
        let idx = match self.columns.iter().position(|c| c == name) {
            Some(idx) => idx,
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(ABSENT.to_string());
                }
                self.columns.len() - 1
            }
        };
        for row in &mut self.rows {
            row[idx] = value.to_string();
        }
    }

    /// Mutable access to one column's cells, in row order.
    pub(crate) fn column_cells_mut(&mut self, idx: usize) -> impl Iterator<Item = &mut String> {
        self.rows.iter_mut().map(move |r| &mut r[idx])
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.columns, self.rows)
    }

    /// Concatenates tables in order. The header is the union of all headers in
    /// first-seen order; cells a table does not have are filled with [`ABSENT`].
    pub fn concat(tables: impl IntoIterator<Item = Table>) -> Table {
        let tables: Vec<Table> = tables.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for table in &tables {
            for column in &table.columns {
                if !positions.contains_key(column) {
                    positions.insert(column.clone(), columns.len());
                    columns.push(column.clone());
                }
            }
        }

        let width = columns.len();
        let mut out = Table::new(columns);
        for table in tables {
            let mapping: Vec<usize> = table.columns.iter().map(|c| positions[c]).collect();
            for row in table.rows {
                let mut merged = vec![ABSENT.to_string(); width];
                for (cell, &target) in row.into_iter().zip(&mapping) {
                    merged[target] = cell;
                }
                out.rows.push(merged);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut table = Table::new(strings(&["A", "B", "C"]));
        table.push_row(strings(&["1"]));
        assert_eq!(table.rows()[0], strings(&["1", "", ""]));
    }

    #[test]
    fn test_column_lookup_falls_back_to_case_insensitive() {
        let table = Table::from_rows(
            strings(&["Game_ID", "GAME_DATE"]),
            vec![strings(&["0022300001", "OCT 25, 2023"])],
        );
        assert_eq!(table.column_index("GAME_ID"), Some(0));
        assert_eq!(table.get(0, "game_date"), Some("OCT 25, 2023"));
        assert_eq!(table.column_index("MISSING"), None);
    }

    #[test]
    fn test_column_lookup_prefers_exact_match() {
        let table = Table::new(strings(&["Player_ID", "PLAYER_ID"]));
        assert_eq!(table.column_index("PLAYER_ID"), Some(1));
        assert_eq!(table.column_index("Player_ID"), Some(0));
    }

    #[test]
    fn test_set_column_appends_and_overwrites() {
        let mut table = Table::from_rows(
            strings(&["GAME_ID", "TEAM_ID"]),
            vec![strings(&["1", "999"]), strings(&["2", "999"])],
        );
        table.set_column("SEASON", "2023-24");
        table.set_column("TEAM_ID", "1610612756");

        assert_eq!(table.columns(), strings(&["GAME_ID", "TEAM_ID", "SEASON"]).as_slice());
        assert!(table.rows().iter().all(|r| r[1] == "1610612756"));
        assert!(table.rows().iter().all(|r| r[2] == "2023-24"));
    }

    #[test]
    fn test_concat_unions_schema_without_dropping_values() {
        let first = Table::from_rows(strings(&["GAME_ID", "PTS"]), vec![strings(&["1", "110"])]);
        let second = Table::from_rows(
            strings(&["GAME_ID", "PLUS_MINUS"]),
            vec![strings(&["2", "-4"])],
        );

        let merged = Table::concat([first, second]);

        assert_eq!(
            merged.columns(),
            strings(&["GAME_ID", "PTS", "PLUS_MINUS"]).as_slice()
        );
        assert_eq!(merged.rows()[0], strings(&["1", "110", ""]));
        assert_eq!(merged.rows()[1], strings(&["2", "", "-4"]));
    }

    #[test]
    fn test_concat_of_nothing_is_empty() {
        let merged = Table::concat(Vec::new());
        assert!(merged.is_empty());
        assert!(merged.columns().is_empty());
    }
}
