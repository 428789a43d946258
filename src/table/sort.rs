//! Chronological ordering of game rows.

use chrono::{NaiveDate, NaiveDateTime};

use super::Table;
use crate::constants::columns;

/// Date layouts seen in the stats API and in previously written CSV files.
/// The game finder uses ISO dates, the player game log uses `OCT 25, 2023`.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parses an event date cell. Returns `None` for anything unrecognised, never panics.
pub fn parse_event_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Sorts rows ascending by `GAME_DATE`.
///
/// Rows whose date does not parse go last. Ties keep their arrival order. Tables without
/// a date column are ordered by `SEASON` then `GAME_ID` instead, and left untouched when
/// neither exists.
pub fn sort_chronologically(table: Table) -> Table {
    if let Some(date_idx) = table.column_index(columns::GAME_DATE) {
        let (header, mut rows) = table.into_parts();
        // sort_by_cached_key is stable, so equal dates keep arrival order
        rows.sort_by_cached_key(|row| {
            let date = parse_event_date(&row[date_idx]);
            (date.is_none(), date)
        });
        return Table::from_rows(header, rows);
    }

    let season_idx = table.column_index(columns::SEASON);
    let game_idx = table.column_index(columns::GAME_ID);
    if season_idx.is_none() && game_idx.is_none() {
        return table;
    }

    let (header, mut rows) = table.into_parts();
    rows.sort_by_cached_key(|row| {
        (
            season_idx.map(|i| row[i].clone()),
            game_idx.map(|i| row[i].clone()),
        )
    });
    Table::from_rows(header, rows)
}

/// Rewrites parseable `GAME_DATE` cells as `YYYY-MM-DD`. Unparseable cells are left as they are.
/// Returns the number of cells that could not be parsed.
pub fn normalize_dates(table: &mut Table) -> usize {
    let Some(idx) = table.column_index(columns::GAME_DATE) else {
        return 0;
    };

    let mut unparsed = 0;
    for cell in table.column_cells_mut(idx) {
        match parse_event_date(cell) {
            Some(date) => *cell = date.format("%Y-%m-%d").to_string(),
            None => unparsed += 1,
        }
    }
    unparsed
}
