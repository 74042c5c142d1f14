//! # emcoform
//!
//! Converts G-code produced by CAM tools into programs for EMCO controllers
//! (Sinumerik style block numbering, `CR` radius arcs, fixed spindle speed
//! and feed rate).
//!
//! ## Architecture
//!
//! emcoform is organized as a workspace with multiple crates:
//!
//! 1. **emcoform-core** - Errors, dialect selector, units, machine parameters
//! 2. **emcoform-converter** - Tokenizer, dialect profiles, line pipeline, program driver
//! 3. **emcoform-settings** - Persisted settings and output file naming
//! 4. **emcoform** - Command-line binary that converts files in parallel
//!
//! ## Supported source dialects
//!
//! - **Aspire**: Vectric post-processor output
//! - **Mastercam**: Mastercam-style post output
//! - **Kiri:Moto**: slicer-style output

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

pub use emcoform_converter::{ConversionSummary, Converter};
pub use emcoform_core::{
    ConversionError, ConversionParameters, ConversionResult, Dialect, MeasurementSystem,
};
pub use emcoform_settings::{ConversionSettings, OutputSettings, Settings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// One file to convert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// Source program
    pub input: PathBuf,
    /// Destination program
    pub output: PathBuf,
}

impl ConversionJob {
    /// Job writing to the location the output settings derive from `input`
    pub fn new(input: impl Into<PathBuf>, output_settings: &OutputSettings) -> Self {
        let input = input.into();
        let output = output_settings.output_path_for(&input);
        Self { input, output }
    }
}

/// Result of one file conversion
#[derive(Debug)]
pub struct JobOutcome {
    pub job: ConversionJob,
    pub result: ConversionResult<ConversionSummary>,
}

/// Convert several files, one thread and one independent pipeline per file
///
/// Outcomes are returned in job order. A failing file does not stop the
/// others; raising `cancel` stops every run still in progress.
///
/// # Errors
/// Returns `InvalidParameter` before any file is touched if `params` is out
/// of range.
pub fn convert_files(
    jobs: &[ConversionJob],
    dialect: Dialect,
    params: ConversionParameters,
    cancel: Option<Arc<AtomicBool>>,
) -> ConversionResult<Vec<JobOutcome>> {
    params.validate()?;

    let outcomes = thread::scope(|scope| {
        let handles: Vec<_> = jobs
            .iter()
            .map(|job| {
                let cancel = cancel.clone();
                scope.spawn(move || {
                    let result = Converter::new(dialect, params).and_then(|converter| {
                        let converter = match cancel {
                            Some(flag) => converter.with_cancel_flag(flag),
                            None => converter,
                        };
                        tracing::debug!(
                            "{}: {} stages for {}: {:?}",
                            job.input.display(),
                            converter.pipeline().processor_count(),
                            converter.profile().dialect,
                            converter
                                .pipeline()
                                .list_processors()
                                .iter()
                                .map(|(name, _)| *name)
                                .collect::<Vec<_>>()
                        );
                        converter.convert_file(&job.input, &job.output)
                    });
                    JobOutcome {
                        job: job.clone(),
                        result,
                    }
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    });

    Ok(outcomes)
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, so converted programs can be piped
/// - RUST_LOG environment variable support (defaults to `info`)
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
