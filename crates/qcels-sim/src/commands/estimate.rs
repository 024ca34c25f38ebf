use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use qcels_est::serde::{from_yaml_str, to_canonical_json_bytes, to_yaml_string};
use qcels_est::{run as run_estimation, EstimatorConfig, RunSpec};
use tracing::info;

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Output directory for the report.
    #[arg(long)]
    pub out: PathBuf,
    /// Overrides the master seed from the configuration.
    #[arg(long)]
    pub seed: Option<u64>,
}

fn load_spec(path: &Path) -> Result<RunSpec, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    Ok(from_yaml_str(&text)?)
}

pub fn run<F>(args: &EstimateArgs, accepts: F) -> Result<(), Box<dyn Error>>
where
    F: Fn(&EstimatorConfig) -> bool,
{
    let mut spec = load_spec(&args.config)?;
    if !accepts(&spec.estimator) {
        return Err(format!(
            "configuration selects mode '{}', which this subcommand does not run",
            spec.estimator.label()
        )
        .into());
    }
    if let Some(seed) = args.seed {
        spec.seed_policy.master_seed = seed;
    }
    fs::create_dir_all(&args.out)?;

    let report = run_estimation(&spec)?;
    let report_path = args.out.join("report.json");
    fs::write(&report_path, to_canonical_json_bytes(&report)?)?;
    // The saved config is the effective one, seed override included.
    fs::write(args.out.join("config.yaml"), to_yaml_string(&spec)?)?;

    info!(
        path = %report_path.display(),
        ground_energy = report.ground_energy(),
        "report written"
    );
    println!("{}", report.ground_energy());
    Ok(())
}
