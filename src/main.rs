//! emcoform CLI - converts CAM G-code into EMCO controller programs

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use emcoform::{
    convert_files, init_logging, ConversionJob, Dialect, MeasurementSystem, Settings,
};
use emcoform_core::get_unit_label;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")");

#[derive(Parser)]
#[command(name = "emcoform")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Convert Aspire, Mastercam and Kiri:Moto G-code for EMCO controllers", long_about = None)]
struct Cli {
    /// G-code files to convert
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Source dialect (aspire, mastercam, kirimoto)
    #[arg(short, long)]
    dialect: Option<Dialect>,

    /// Spindle speed in RPM
    #[arg(short, long)]
    spindle_speed: Option<u32>,

    /// Feed rate in units/min
    #[arg(short, long)]
    feed_rate: Option<f64>,

    /// Unit system (mm or inch)
    #[arg(short, long)]
    units: Option<MeasurementSystem>,

    /// Directory for converted programs (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Suffix appended to the input file stem
    #[arg(long)]
    suffix: Option<String>,

    /// Settings file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store the effective settings back to the settings file
    #[arg(long)]
    save_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config_path = match cli.config.clone() {
        Some(path) => Some(path),
        None => Settings::default_path().ok(),
    };
    let mut settings = match &config_path {
        Some(path) => Settings::load_or_default(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    apply_overrides(&mut settings, &cli);
    settings.validate().context("Invalid settings")?;

    if cli.save_config {
        let Some(path) = &config_path else {
            bail!("No settings file location available; pass --config");
        };
        settings
            .save_to_file(path)
            .with_context(|| format!("Failed to save settings to {}", path.display()))?;
        tracing::info!("Saved settings to {}", path.display());
    }

    let jobs: Vec<ConversionJob> = cli
        .inputs
        .iter()
        .map(|input| ConversionJob::new(input, &settings.output))
        .collect();

    tracing::info!(
        "Converting {} file(s) from {} at S{} F{} {}/min",
        jobs.len(),
        settings.conversion.dialect,
        settings.conversion.spindle_speed,
        settings.conversion.feed_rate,
        get_unit_label(settings.conversion.units)
    );

    let outcomes = convert_files(
        &jobs,
        settings.conversion.dialect,
        settings.conversion.parameters(),
        None,
    )?;

    let mut failures = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(summary) => tracing::info!(
                "{} -> {}: {} blocks, {} lines rejected",
                outcome.job.input.display(),
                outcome.job.output.display(),
                summary.blocks_written,
                summary.lines_rejected
            ),
            Err(e) => {
                failures += 1;
                tracing::error!("{}: {}", outcome.job.input.display(), e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} file(s) failed to convert", failures, outcomes.len());
    }
    Ok(())
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    let conversion = &mut settings.conversion;
    if let Some(dialect) = cli.dialect {
        conversion.dialect = dialect;
    }
    if let Some(speed) = cli.spindle_speed {
        conversion.spindle_speed = speed;
    }
    if let Some(feed) = cli.feed_rate {
        conversion.feed_rate = feed;
    }
    if let Some(units) = cli.units {
        conversion.units = units;
    }
    if let Some(directory) = &cli.output_dir {
        settings.output.directory = Some(directory.clone());
    }
    if let Some(suffix) = &cli.suffix {
        settings.output.suffix = suffix.clone();
    }
}
