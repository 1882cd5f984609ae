use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::schema::{ColumnSchema, DEFAULT_INVESTOR_COLUMNS};

/// Name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "shark-dash.json";

/// Dataset read when no configuration overrides it.
pub const DEFAULT_DATASET: &str = "Shark Tank India.csv";

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Settings read from `shark-dash.json`. Every field is optional:
///
/// ```json
/// {
///   "dataset_path": "data/pitches.csv",
///   "investor_columns": ["Namita Present", "Aman Present"],
///   "window_size": [1280.0, 860.0]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub dataset_path: PathBuf,
    pub investor_columns: Vec<String>,
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            investor_columns: DEFAULT_INVESTOR_COLUMNS.iter().map(|c| c.to_string()).collect(),
            window_size: [1200.0, 800.0],
        }
    }
}

impl DashboardConfig {
    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load `path` if it exists, otherwise defaults. A broken file is logged
    /// and replaced by defaults so the dashboard still opens.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No {} found, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring configuration: {e:#}");
                Self::default()
            }
        }
    }

    pub fn schema(&self) -> ColumnSchema {
        ColumnSchema::new(&self.investor_columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_or_default(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.schema(), ColumnSchema::default());
    }

    #[test]
    fn test_partial_file_overrides_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"investor_columns": ["Aman Present"]}"#).unwrap();

        let config = DashboardConfig::load_or_default(&path);
        assert_eq!(config.dataset_path, PathBuf::from(DEFAULT_DATASET));
        assert_eq!(config.schema().investor_columns(), &["aman_present".to_string()]);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"dataset": 3}"#).unwrap();

        assert!(DashboardConfig::from_file(&path).is_err());
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
    }
}
