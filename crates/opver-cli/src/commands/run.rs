use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use opver_engine::{load_config, verify, Verdict};
use tracing::info;

use crate::render::render_report;
use crate::scenarios::{self, Scenario};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Built-in scenario: newton-sqrt, largest-eigenvalue or shifted-square.
    #[arg(long)]
    pub scenario: String,
    /// YAML configuration replacing the scenario's defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory receiving `verification_report.json`.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let scenario = Scenario::lookup(&args.scenario).ok_or_else(|| {
        format!(
            "unknown scenario '{}', expected one of: {}",
            args.scenario,
            scenarios::NAMES.join(", ")
        )
    })?;
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => scenario.default_config(),
    };
    info!(scenario = scenario.name, "starting verification");
    let report = verify(&config, &scenario.inputs());

    println!("scenario: {} ({})", scenario.name, scenario.summary);
    print!("{}", render_report(&report)?);

    if let Some(out) = &args.out {
        fs::create_dir_all(out)?;
        let path = out.join("verification_report.json");
        fs::write(&path, report.to_bytes()?)?;
        info!(path = %path.display(), "report written");
    }

    match report.verdict {
        Verdict::Confirmed => Ok(()),
        Verdict::DiscrepancyDetected => Err("evaluators disagree".into()),
        Verdict::Failed(err) => Err(format!("verification failed: {err}").into()),
    }
}
