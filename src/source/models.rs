use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::table::{ABSENT, Table};

/// Envelope returned by the stats endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(rename = "resultSets")]
    pub result_sets: Vec<ResultSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSet {
    pub name: String,
    pub headers: Vec<String>,
    #[serde(rename = "rowSet")]
    pub row_set: Vec<Vec<Value>>,
}

impl StatsResponse {
    /// Converts the first result set into a table. Endpoints used here put the game rows first.
    pub fn into_table(self, url: &str) -> Result<Table, AppError> {
        let set = self
            .result_sets
            .into_iter()
            .next()
            .ok_or_else(|| AppError::api_unexpected_structure("resultSets is empty", url))?;
        set.into_table(url)
    }
}

impl ResultSet {
    pub fn into_table(self, url: &str) -> Result<Table, AppError> {
        let width = self.headers.len();
        let mut table = Table::new(self.headers);
        for (i, row) in self.row_set.into_iter().enumerate() {
            if row.len() != width {
                return Err(AppError::api_unexpected_structure(
                    format!(
                        "row {i} of '{}' has {} cells, expected {width}",
                        self.name,
                        row.len()
                    ),
                    url,
                ));
            }
            table.push_row(row.into_iter().map(cell_text).collect());
        }
        Ok(table)
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::Null => ABSENT.to_string(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_result_set_becomes_table() {
        let json = r#"{
            "resource": "leaguegamefinderresults",
            "resultSets": [
                {
                    "name": "LeagueGameFinderResults",
                    "headers": ["TEAM_ID", "GAME_ID", "GAME_DATE", "PTS", "PLUS_MINUS"],
                    "rowSet": [
                        [1610612756, "0022300061", "2023-10-24", 108, null],
                        [1610612756, "0022300077", "2023-10-26", 100, -5.0]
                    ]
                },
                {"name": "Other", "headers": ["X"], "rowSet": []}
            ]
        }"#;

        let response: StatsResponse = serde_json::from_str(json).unwrap();
        let table = response.into_table("url").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "TEAM_ID"), Some("1610612756"));
        assert_eq!(table.get(0, "GAME_ID"), Some("0022300061"));
        assert_eq!(table.get(0, "PLUS_MINUS"), Some(""));
        assert_eq!(table.get(1, "PLUS_MINUS"), Some("-5.0"));
    }

    #[test]
    fn test_empty_row_set_is_valid() {
        let json = r#"{"resultSets": [{"name": "PlayerGameLog", "headers": ["Game_ID"], "rowSet": []}]}"#;
        let response: StatsResponse = serde_json::from_str(json).unwrap();
        let table = response.into_table("url").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns(), ["Game_ID"]);
    }

    #[test]
    fn test_missing_result_set_is_unexpected_structure() {
        let response: StatsResponse = serde_json::from_str(r#"{"resultSets": []}"#).unwrap();
        let err = response.into_table("url").unwrap_err();
        assert!(matches!(err, AppError::ApiUnexpectedStructure { .. }));
    }

    #[test]
    fn test_ragged_row_is_unexpected_structure() {
        let json = r#"{"resultSets": [{"name": "R", "headers": ["A", "B"], "rowSet": [[1]]}]}"#;
        let response: StatsResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            response.into_table("url"),
            Err(AppError::ApiUnexpectedStructure { .. })
        ));
    }
}
