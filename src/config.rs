//! Dashboard configuration.
//!
//! Read from an optional TOML file; every field has a default so partial
//! files work. Command-line flags override the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::series::Truncation;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub defaults: DefaultsConfig,
    pub window: WindowConfig,
}

/// Where the dataset lives and how it is cleaned on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Dataset file (`.csv`, `.parquet`). `None` means pick one in the UI.
    pub path: Option<PathBuf>,

    /// Rows whose `iso_code` contains this string are continent/world totals.
    pub aggregate_prefix: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: None,
            aggregate_prefix: "OWID".to_string(),
        }
    }
}

/// Initial control values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Initial population range `[low, high]`.
    pub population: [f64; 2],

    /// Initial GDP-per-capita range `[low, high]`.
    pub gdp_per_capita: [f64; 2],

    /// Maximum bars in the worldwide new-cases chart.
    pub top_n: usize,

    pub truncation: Truncation,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            population: [120_000_000.0, 400_000_000.0],
            gdp_per_capita: [2_000.0, 12_000.0],
            top_n: 7,
            truncation: Truncation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 900.0,
        }
    }
}

impl DashboardConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: DashboardConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[data]
path = "data/raw/owid-covid-data.csv"

[defaults]
top_n = 5
truncation = "first_encountered"
"#
        )
        .unwrap();

        let config = DashboardConfig::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.data.path.as_deref(),
            Some(Path::new("data/raw/owid-covid-data.csv"))
        );
        assert_eq!(config.data.aggregate_prefix, "OWID");
        assert_eq!(config.defaults.top_n, 5);
        assert_eq!(config.defaults.truncation, Truncation::FirstEncountered);
        assert_eq!(config.defaults.population, [120_000_000.0, 400_000_000.0]);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DashboardConfig::load_from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config file"));
    }

    #[test]
    fn no_path_means_defaults() {
        let config = DashboardConfig::load_or_default(None).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }
}
