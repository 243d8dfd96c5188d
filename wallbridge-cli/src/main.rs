use std::process::ExitCode;

use clap::Parser;
use wallbridge_cli::{run, Cli};

fn main() -> ExitCode {
    wallbridge_core::logging::init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
