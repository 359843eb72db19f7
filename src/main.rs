use std::env::consts::{ARCH, FAMILY, OS};

use anyhow::{Context, Error};
use tracing::trace;

use crate::fetcher::{init_logger, AppConfig};
use crate::program::Program;

mod fetcher;
mod program;
mod tui;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = AppConfig::default();

    // The download directory must exist before anything else can run.
    config
        .ensure_directories()
        .context("Unable to prepare the image directories")?;

    // Keep the guard alive for the whole session so buffered logs are flushed on exit.
    let _logger = match init_logger(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logger: {}. Continuing without file logging.", e);
            None
        }
    };
    log_system_information();

    let program = Program::new(&config)?;
    program.run().await
}

/// Logs important information about the system being used.
fn log_system_information() {
    trace!("Printing system information out into log for debug purposes...");
    trace!("ARCH:           \"{}\"", ARCH);
    trace!("FAMILY:         \"{}\"", FAMILY);
    trace!("OS:             \"{}\"", OS);
}
