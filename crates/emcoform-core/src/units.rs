//! Unit system selection
//!
//! The target controller is told the unit system once, in the program header.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConversionError;

/// Measurement system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    #[default]
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl MeasurementSystem {
    /// Unit-setting block emitted in the program header (`G71` mm, `G70` inch)
    pub fn header_code(&self) -> &'static str {
        match self {
            Self::Metric => "G71",
            Self::Imperial => "G70",
        }
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "inches" | "in" => Ok(Self::Imperial),
            _ => Err(ConversionError::InvalidParameter {
                name: "units".to_string(),
                reason: format!("unknown measurement system '{}'", s),
            }),
        }
    }
}

/// Get the unit label for the given system ("mm" or "in")
pub fn get_unit_label(system: MeasurementSystem) -> &'static str {
    match system {
        MeasurementSystem::Metric => "mm",
        MeasurementSystem::Imperial => "in",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_codes() {
        assert_eq!(MeasurementSystem::Metric.header_code(), "G71");
        assert_eq!(MeasurementSystem::Imperial.header_code(), "G70");
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("mm".parse::<MeasurementSystem>().unwrap(), MeasurementSystem::Metric);
        assert_eq!(" Metric ".parse::<MeasurementSystem>().unwrap(), MeasurementSystem::Metric);
        assert_eq!("inches".parse::<MeasurementSystem>().unwrap(), MeasurementSystem::Imperial);
        assert_eq!("in".parse::<MeasurementSystem>().unwrap(), MeasurementSystem::Imperial);
        assert!("furlongs".parse::<MeasurementSystem>().is_err());
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(get_unit_label(MeasurementSystem::Metric), "mm");
        assert_eq!(get_unit_label(MeasurementSystem::Imperial), "in");
    }
}
