use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::config::DashboardConfig;
use crate::data::error::TimeError;
use crate::data::export;
use crate::data::loader::load_file;
use crate::data::mjd::{to_julian_dates, Clock, SystemClock, TimeConverter};
use crate::data::model::{FrequencyDataset, TIME_COLUMN};

// ---------------------------------------------------------------------------
// One dataset card
// ---------------------------------------------------------------------------

/// A loaded dataset plus what the user sees about it.
#[derive(Debug, Clone)]
pub struct DatasetPanel {
    pub title: String,
    pub export_file: PathBuf,
    pub dataset: FrequencyDataset,
    /// Status / error message from the last action.
    pub status_message: Option<String>,
}

impl DatasetPanel {
    /// Convert this panel's time axis to MJD, recording the outcome.
    pub fn convert_to_mjd<C: Clock>(&mut self, converter: &TimeConverter<C>) -> Result<(), TimeError> {
        match converter.convert_to_mjd(&mut self.dataset) {
            Ok(()) => {
                self.status_message = Some("Time converted to MJD".to_string());
                Ok(())
            }
            Err(e) => {
                log::warn!("{}: {e}", self.title);
                self.status_message = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Write the dataset as CSV under `out_dir`.
    pub fn export(&self, out_dir: &Path, precision: usize) -> Result<PathBuf> {
        let path = out_dir.join(&self.export_file);
        export::export_file(&self.dataset, &path, precision)
            .with_context(|| format!("exporting {}", self.title))?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Every dataset loaded at startup, each owned by its panel.
pub struct Session<C = SystemClock> {
    pub panels: Vec<DatasetPanel>,
    pub converter: TimeConverter<C>,
    pub mjd_precision: usize,
}

impl Session<SystemClock> {
    /// Load and populate every configured dataset.
    pub fn init(config: &DashboardConfig) -> Result<Self> {
        Self::init_with_clock(config, SystemClock)
    }
}

impl<C: Clock> Session<C> {
    pub fn init_with_clock(config: &DashboardConfig, clock: C) -> Result<Self> {
        let converter = TimeConverter::with_clock(clock).with_anchor(config.anchor);

        let mut panels = Vec::with_capacity(config.datasets.len());
        for entry in &config.datasets {
            let path = config.dataset_path(entry);
            let mut dataset =
                load_file(&path).with_context(|| format!("loading {}", entry.title))?;
            if dataset.is_empty() {
                log::warn!("{} has no rows", entry.title);
            }
            converter
                .populate(&mut dataset)
                .with_context(|| format!("populating {}", entry.title))?;
            panels.push(DatasetPanel {
                title: entry.title.clone(),
                export_file: entry.export_file.clone(),
                dataset,
                status_message: None,
            });
        }

        log::info!("Session ready with {} datasets", panels.len());
        Ok(Session {
            panels,
            converter,
            mjd_precision: config.mjd_precision,
        })
    }

    /// Convert every panel's time axis to MJD.
    ///
    /// Each panel is attempted independently; failures are collected and
    /// reported together once every panel has been tried.
    pub fn convert_all(&mut self) -> Result<()> {
        let mut failures = Vec::new();
        for panel in &mut self.panels {
            if let Err(e) = panel.convert_to_mjd(&self.converter) {
                failures.push(format!("{}: {e}", panel.title));
            }
        }
        if !failures.is_empty() {
            bail!(
                "{} of {} datasets failed to convert: {}",
                failures.len(),
                self.panels.len(),
                failures.join("; ")
            );
        }
        Ok(())
    }

    /// Julian Dates of every panel's time axis, in panel order.
    pub fn julian_dates(&self) -> Result<Vec<Vec<f64>>> {
        self.panels
            .iter()
            .map(|panel| {
                let series = panel
                    .dataset
                    .column(TIME_COLUMN)
                    .ok_or_else(|| TimeError::MissingColumn(TIME_COLUMN.to_string()))?;
                to_julian_dates(TIME_COLUMN, series)
                    .with_context(|| format!("julian dates of {}", panel.title))
            })
            .collect()
    }

    /// Export every panel under `out_dir`, returning the written paths.
    pub fn export_all(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        self.panels
            .iter()
            .map(|panel| panel.export(out_dir, self.mjd_precision))
            .collect()
    }
}
