use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::DashboardConfig;
use crate::data::export::render_table;
use crate::data::loader::load_file;
use crate::data::mjd::TimeConverter;
use crate::state::{DatasetPanel, Session};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "mjd-panda")]
#[command(about = "Frequency datasets with a Modified Julian Date time axis")]
#[command(version)]
pub struct Cli {
    /// JSON config file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every reference dataset as a table
    Show {
        /// Convert the time axis to MJD first
        #[arg(long)]
        mjd: bool,
    },
    /// Write every reference dataset to CSV
    Export {
        /// Convert the time axis to MJD first
        #[arg(long)]
        mjd: bool,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Print the Julian Date of every timestamp on the time axis
    Julian,
    /// Print today's MJD
    Today,
    /// Report whether a file's values are already MJD
    Classify { file: PathBuf },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(cli: Cli) -> Result<()> {
    let config = DashboardConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Show { mjd } => {
            let session = open_session(&config, mjd)?;
            for panel in &session.panels {
                println!("{}", heading(panel));
                println!("{}\n", render_table(&panel.dataset, session.mjd_precision));
            }
        }
        Commands::Export { mjd, out_dir } => {
            let session = open_session(&config, mjd)?;
            for (panel, path) in session.panels.iter().zip(session.export_all(&out_dir)?) {
                println!("{} -> {}", heading(panel), path.display());
            }
        }
        Commands::Julian => {
            let session = open_session(&config, false)?;
            for (panel, dates) in session.panels.iter().zip(session.julian_dates()?) {
                println!("{}", heading(panel));
                for (row, jd) in dates.iter().enumerate() {
                    println!("{row:>6}  {jd:.prec$}", prec = session.mjd_precision);
                }
                println!();
            }
        }
        Commands::Today => {
            println!("{}", TimeConverter::new().today_mjd());
        }
        Commands::Classify { file } => {
            let dataset = load_file(&file)?;
            let first = dataset
                .columns
                .first()
                .with_context(|| format!("{} has no columns", file.display()))?;
            let verdict = if TimeConverter::new().is_mjd(&first.values) {
                "MJD"
            } else {
                "not MJD"
            };
            println!("{}: {} ({} values)", file.display(), verdict, first.values.len());
        }
    }
    Ok(())
}

/// Panel title, row count and the outcome of its last action.
fn heading(panel: &DatasetPanel) -> String {
    let mut line = format!("== {} ({} rows)", panel.title, panel.dataset.len());
    if let Some(status) = &panel.status_message {
        line.push_str(&format!(" [{status}]"));
    }
    line
}

fn open_session(config: &DashboardConfig, mjd: bool) -> Result<Session> {
    let mut session = Session::init(config)?;
    if mjd {
        session.convert_all()?;
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_export_flags() {
        let cli = Cli::try_parse_from(["mjd-panda", "export", "--mjd", "-o", "out"]).unwrap();
        match cli.command {
            Commands::Export { mjd, out_dir } => {
                assert!(mjd);
                assert_eq!(out_dir, PathBuf::from("out"));
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["mjd-panda", "show", "--config", "c.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(matches!(cli.command, Commands::Show { mjd: false }));
    }

    #[test]
    fn heading_shows_status() {
        use crate::data::model::FrequencyDataset;

        let mut panel = DatasetPanel {
            title: "NBS Data".into(),
            export_file: "nbs_data.csv".into(),
            dataset: FrequencyDataset::from_frequencies(vec![1.0, 2.0]),
            status_message: None,
        };
        assert_eq!(heading(&panel), "== NBS Data (2 rows)");

        panel.status_message = Some("Time converted to MJD".into());
        assert_eq!(heading(&panel), "== NBS Data (2 rows) [Time converted to MJD]");
    }

    #[test]
    fn parses_julian_command() {
        let cli = Cli::try_parse_from(["mjd-panda", "julian"]).unwrap();
        assert!(matches!(cli.command, Commands::Julian));
    }

    #[test]
    fn classify_reports_missing_file() {
        let cli = Cli::try_parse_from(["mjd-panda", "classify", "/nonexistent/freq.txt"]).unwrap();
        assert!(run(cli).is_err());
    }
}
