use std::process::ExitCode;

use clap::Parser;
use mjd_panda::app::{self, Cli};

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match app::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
