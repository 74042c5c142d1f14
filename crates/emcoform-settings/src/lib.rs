//! emcoform Settings Crate
//!
//! Handles persisted conversion settings and output file naming.

pub mod config;
pub mod error;

pub use config::{
    ConversionSettings, OutputSettings, Settings, APP_DIR_NAME, DEFAULT_OUTPUT_SUFFIX,
    SETTINGS_FILE_NAME,
};
pub use error::{SettingsError, SettingsResult};
