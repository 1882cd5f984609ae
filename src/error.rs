//! Error types for the dashboard.
//!
//! `DataError` is fatal: without a table no page can render.
//! `ColumnMissing` is not an error for the user, it travels inside
//! [`Outcome::Skipped`](crate::data::query::Outcome) and is shown in place of
//! the chart whose columns are absent.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce the pitch table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("Dataset unavailable ({}): {reason}", .path.display())]
    DataUnavailable { path: PathBuf, reason: String },
}

/// Columns a query needs that the loaded table does not have.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColumnMissing {
    #[error("The column '{0}' is not available in the dataset.")]
    Column(String),

    #[error("Columns {} are not available in the dataset.", quoted_alternatives(.0))]
    Columns(Vec<String>),

    #[error("No investor presence columns are available in the dataset.")]
    NoInvestors,
}

impl ColumnMissing {
    /// Build the placeholder for a list of required columns.
    pub fn for_columns(columns: &[&str]) -> Self {
        match columns {
            [single] => ColumnMissing::Column(single.to_string()),
            many => ColumnMissing::Columns(many.iter().map(|c| c.to_string()).collect()),
        }
    }
}

fn quoted_alternatives(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(" and/or ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_column_message() {
        let err = ColumnMissing::for_columns(&["season_number"]);
        assert_eq!(
            err.to_string(),
            "The column 'season_number' is not available in the dataset."
        );
    }

    #[test]
    fn test_multi_column_message() {
        let err = ColumnMissing::for_columns(&["season_number", "industry"]);
        assert_eq!(
            err.to_string(),
            "Columns 'season_number' and/or 'industry' are not available in the dataset."
        );
    }

    #[test]
    fn test_no_investors_message() {
        assert_eq!(
            ColumnMissing::NoInvestors.to_string(),
            "No investor presence columns are available in the dataset."
        );
    }

    #[test]
    fn test_data_unavailable_mentions_path() {
        let err = DataError::DataUnavailable {
            path: PathBuf::from("missing.csv"),
            reason: "opening CSV: not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing.csv"));
        assert!(msg.contains("not found"));
    }
}
