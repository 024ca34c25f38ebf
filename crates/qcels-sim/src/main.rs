use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    estimate::{self, EstimateArgs},
    version::{self, VersionArgs},
};
use qcels_est::EstimatorConfig;

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "qcels-sim", about = "Multi-level QCELS ground-state energy estimation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Multi-level QCELS on raw Hadamard-test samples.
    LargeOverlap(EstimateArgs),
    /// Rough CDF estimate followed by filtered multi-level QCELS.
    SmallOverlap(EstimateArgs),
    /// Fejér-kernel QPE baseline.
    Qpe(EstimateArgs),
    /// Print the tool version.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init_tracing()?;
    let cli = Cli::parse();
    match cli.command {
        Command::LargeOverlap(args) => estimate::run(&args, |config| {
            matches!(config, EstimatorConfig::LargeOverlap(_))
        }),
        Command::SmallOverlap(args) => estimate::run(&args, |config| {
            matches!(config, EstimatorConfig::SmallOverlap(_))
        }),
        Command::Qpe(args) => estimate::run(&args, |config| matches!(config, EstimatorConfig::Qpe(_))),
        Command::Version(args) => version::run(&args),
    }
}
