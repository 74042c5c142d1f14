//! # emcoform Core
//!
//! Core types shared by the emcoform crates: the error type every conversion
//! reports through, the source dialect selector, the unit system and the
//! machine parameters a run forces onto its output.

pub mod dialect;
pub mod error;
pub mod parameters;
pub mod units;

pub use dialect::Dialect;
pub use error::{ConversionError, ConversionResult};
pub use parameters::{ConversionParameters, DEFAULT_SEQUENCE_STEP};
pub use units::{get_unit_label, MeasurementSystem};
