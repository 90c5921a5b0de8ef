//! Dump built-in classification tables.

use std::io::Write;

use clap::Parser;

use crate::tbl::tables::Classification;

/// Command line arguments for `dump-tables` sub command.
#[derive(Parser, Debug)]
#[command(about = "Dump built-in biotype classification tables as YAML", long_about = None)]
pub struct Args {}

/// Write the built-in tables to `writer`.
pub fn run_with_write<W: Write>(writer: W) -> Result<(), anyhow::Error> {
    serde_yaml::to_writer(writer, &Classification::default())?;
    Ok(())
}

/// Main entry point for `dump-tables` sub command.
pub fn run(_common: &crate::common::Args, _args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Dumping classification tables ...");
    run_with_write(std::io::stdout())?;
    tracing::info!("... done");

    Ok(())
}
