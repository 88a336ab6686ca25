//! `ipptransform`: converts a print-ready PDF or JPEG document into a
//! PWG-Raster or HP PCL device stream, written for invocation as a
//! per-job filter by a parent print spooler.

mod band;
mod capabilities;
mod cli;
mod engine;
mod error;
mod geometry;
mod media;
mod options;
mod pipeline;
mod progress;
mod pwg;
mod sink;
mod source;
mod transform;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    progress::init_logging(capabilities::PrinterCapabilities::from_env_and_cli(&cli).verbosity);

    match engine::run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            ExitCode::FAILURE
        }
    }
}
