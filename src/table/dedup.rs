//! Natural-key deduplication.
//!
//! The stats API occasionally repeats rows, and unit files written by different runs may
//! overlap. The first row seen for a key wins; later rows with the same key are dropped.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::{ABSENT, Table};

/// Removes rows whose natural key was already seen, keeping the first occurrence.
///
/// Returns the deduplicated table and the number of rows dropped. When one of the key
/// columns is missing from the table, or a row has no value in a key column, whole-row
/// equality is used as the key instead so distinct rows are never merged by accident.
pub fn dedup_by_key(table: Table, key_columns: &[&str]) -> (Table, usize) {
    let key_indices: Option<Vec<usize>> = key_columns
        .iter()
        .map(|name| table.column_index(name))
        .collect();

    if key_indices.is_none() && !table.is_empty() {
        warn!(
            "Natural key {:?} not present in table; deduplicating on whole rows",
            key_columns
        );
    }

    let (columns, rows) = table.into_parts();
    let total = rows.len();
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(total);
    let mut kept = Vec::with_capacity(total);

    for row in rows {
        let key = match &key_indices {
            Some(indices) if indices.iter().all(|&i| row[i] != ABSENT) => {
                // Tag the key kind so a natural key never collides with a whole-row key
                let mut key = vec!["k".to_string()];
                key.extend(indices.iter().map(|&i| row[i].clone()));
                key
            }
            _ => {
                let mut key = vec!["r".to_string()];
                key.extend(row.iter().cloned());
                key
            }
        };
        if seen.insert(key) {
            kept.push(row);
        }
    }

    let dropped = total - kept.len();
    if dropped > 0 {
        debug!("Dropped {dropped} duplicate rows on key {:?}", key_columns);
    }
    (Table::from_rows(columns, kept), dropped)
}
