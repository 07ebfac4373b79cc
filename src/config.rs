use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::data::mjd::default_anchor;

/// One reference dataset shown at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Heading used in tables and logs.
    pub title: String,
    /// Input file, relative to `data_dir`.
    pub file: PathBuf,
    /// File name used when exporting.
    pub export_file: PathBuf,
}

/// Runtime configuration, read from JSON.  Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub datasets: Vec<DatasetConfig>,
    /// First timestamp of the synthetic time axis.
    pub anchor: NaiveDateTime,
    /// Decimals for MJD cells.
    pub mjd_precision: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            datasets: vec![
                DatasetConfig {
                    title: "Test Suite Data".to_string(),
                    file: PathBuf::from("tst_suit.txt"),
                    export_file: PathBuf::from("test_suite_data.csv"),
                },
                DatasetConfig {
                    title: "NBS Data".to_string(),
                    file: PathBuf::from("nbs.txt"),
                    export_file: PathBuf::from("nbs_data.csv"),
                },
            ],
            anchor: default_anchor(),
            mjd_precision: 10,
        }
    }
}

impl DashboardConfig {
    /// Read `path`, or fall back to the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::debug!("No config file given, using defaults");
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!(
            "Loaded config from {} ({} datasets)",
            path.display(),
            config.datasets.len()
        );
        Ok(config)
    }

    pub fn dataset_path(&self, dataset: &DatasetConfig) -> PathBuf {
        self.data_dir.join(&dataset.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_name_the_reference_datasets() {
        let config = DashboardConfig::default();
        let files: Vec<_> = config.datasets.iter().map(|d| config.dataset_path(d)).collect();
        assert_eq!(
            files,
            vec![PathBuf::from("data/tst_suit.txt"), PathBuf::from("data/nbs.txt")]
        );
        assert_eq!(config.mjd_precision, 10);
        assert_eq!(config.anchor, default_anchor());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{ "mjd_precision": 6, "anchor": "2001-05-01T00:00:00" }"#)
                .unwrap();
        assert_eq!(config.mjd_precision, 6);
        assert_eq!(config.anchor.to_string(), "2001-05-01 00:00:00");
        assert_eq!(config.datasets.len(), 2);
    }

    #[test]
    fn json_round_trip() {
        let config = DashboardConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back: DashboardConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn load_without_path_uses_defaults() {
        assert_eq!(DashboardConfig::load(None).unwrap(), DashboardConfig::default());
    }

    #[test]
    fn load_reports_bad_json() {
        let path = std::env::temp_dir().join(format!("mjd-panda-config-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = DashboardConfig::load(Some(&path)).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().starts_with("parsing config"));
    }
}
