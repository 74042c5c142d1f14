//! Persisted conversion settings
//!
//! Settings are organized into two sections:
//! - Conversion settings (dialect, spindle speed, feed rate, units)
//! - Output settings (file name suffix, output directory)
//!
//! Files may be JSON or TOML, chosen by extension. The default file lives in
//! the platform configuration directory.

use emcoform_core::{ConversionParameters, Dialect, MeasurementSystem, DEFAULT_SEQUENCE_STEP};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Directory name under the platform config directory
pub const APP_DIR_NAME: &str = "emcoform";

/// File name of the default settings file
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Suffix appended to the input file stem to name the converted program
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_FOR_EMCO.SPF";

/// Values forced onto every converted program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Source dialect
    pub dialect: Dialect,
    /// Spindle speed in RPM
    pub spindle_speed: u32,
    /// Feed rate in units/min
    pub feed_rate: f64,
    /// Unit system announced in the program header
    pub units: MeasurementSystem,
    /// Block numbering step
    pub sequence_step: u32,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        let params = ConversionParameters::default();
        Self {
            dialect: Dialect::Aspire,
            spindle_speed: params.spindle_speed,
            feed_rate: params.feed_rate,
            units: params.units,
            sequence_step: DEFAULT_SEQUENCE_STEP,
        }
    }
}

impl ConversionSettings {
    /// Machine parameters for a conversion run
    pub fn parameters(&self) -> ConversionParameters {
        ConversionParameters::new(self.spindle_speed, self.feed_rate, self.units)
            .with_sequence_step(self.sequence_step)
    }
}

/// Where converted programs are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Appended to the input file stem
    pub suffix: String,
    /// Output directory; next to the input file when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            directory: None,
        }
    }
}

impl OutputSettings {
    /// Destination path for a converted copy of `input`
    ///
    /// `parts/bracket.nc` becomes `parts/bracket_FOR_EMCO.SPF`, or the same
    /// name inside the configured output directory.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "program".to_string());
        let directory = match &self.directory {
            Some(directory) => directory.clone(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        directory.join(format!("{}{}", stem, self.suffix))
    }
}

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Conversion settings
    pub conversion: ConversionSettings,
    /// Output settings
    pub output: OutputSettings,
}

#[derive(Clone, Copy)]
enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or_default().to_string(),
        )),
    }
}

impl Settings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of the default settings file
    pub fn default_path() -> SettingsResult<PathBuf> {
        let mut path = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })?;
        path.push(APP_DIR_NAME);
        path.push(SETTINGS_FILE_NAME);
        Ok(path)
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let settings: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save settings to file (JSON or TOML), creating its directory
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        if let Err(emcoform_core::ConversionError::InvalidParameter { name, reason }) =
            self.conversion.parameters().validate()
        {
            return Err(SettingsError::InvalidSetting {
                key: format!("conversion.{}", name),
                reason,
            });
        }

        if self.output.suffix.trim().is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "output.suffix".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.output.suffix.contains(['/', '\\']) {
            return Err(SettingsError::InvalidSetting {
                key: "output.suffix".to_string(),
                reason: "must not contain path separators".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.output.suffix, "_FOR_EMCO.SPF");
        assert_eq!(settings.conversion.sequence_step, 10);
    }

    #[test]
    fn test_parameters_from_settings() {
        let conversion = ConversionSettings {
            dialect: Dialect::KiriMoto,
            spindle_speed: 3000,
            feed_rate: 45.5,
            units: MeasurementSystem::Imperial,
            sequence_step: 5,
        };
        let params = conversion.parameters();
        assert_eq!(params.spindle_speed, 3000);
        assert_eq!(params.feed_rate, 45.5);
        assert_eq!(params.units, MeasurementSystem::Imperial);
        assert_eq!(params.sequence_step, 5);
    }

    #[test]
    fn test_output_path_next_to_input() {
        let output = OutputSettings::default();
        assert_eq!(
            output.output_path_for(Path::new("parts/bracket.nc")),
            PathBuf::from("parts/bracket_FOR_EMCO.SPF")
        );
        assert_eq!(
            output.output_path_for(Path::new("bracket")),
            PathBuf::from("bracket_FOR_EMCO.SPF")
        );
    }

    #[test]
    fn test_output_path_in_directory() {
        let output = OutputSettings {
            suffix: ".SPF".to_string(),
            directory: Some(PathBuf::from("/mnt/emco")),
        };
        assert_eq!(
            output.output_path_for(Path::new("parts/bracket.nc")),
            PathBuf::from("/mnt/emco/bracket.SPF")
        );
    }

    #[test]
    fn test_validate_rejects_zero_feed() {
        let mut settings = Settings::default();
        settings.conversion.feed_rate = 0.0;
        match settings.validate() {
            Err(SettingsError::InvalidSetting { key, .. }) => {
                assert_eq!(key, "conversion.feed_rate")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_suffix() {
        let mut settings = Settings::default();
        settings.output.suffix = "../x".to_string();
        assert!(settings.validate().is_err());

        settings.output.suffix = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let result = Settings::default().save_to_file(Path::new("settings.yaml"));
        assert!(matches!(result, Err(SettingsError::UnsupportedFormat(ext)) if ext == "yaml"));
    }

    #[test]
    fn test_default_path_layout() {
        if let Ok(path) = Settings::default_path() {
            assert!(path.ends_with("emcoform/settings.toml"));
        }
    }
}
