//! Machine parameters forced onto every converted program

use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, ConversionResult};
use crate::units::MeasurementSystem;

/// Default spacing between block sequence numbers
pub const DEFAULT_SEQUENCE_STEP: u32 = 10;

/// Values supplied by the caller for one conversion run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionParameters {
    /// Spindle speed (RPM) used in the header and after tool changes
    pub spindle_speed: u32,
    /// Feed rate written on every feed move
    pub feed_rate: f64,
    /// Unit system announced in the header
    pub units: MeasurementSystem,
    /// Increment between consecutive block numbers
    pub sequence_step: u32,
}

impl ConversionParameters {
    /// Create parameters with the default sequence step
    pub fn new(spindle_speed: u32, feed_rate: f64, units: MeasurementSystem) -> Self {
        Self {
            spindle_speed,
            feed_rate,
            units,
            sequence_step: DEFAULT_SEQUENCE_STEP,
        }
    }

    /// Override the block numbering step
    pub fn with_sequence_step(mut self, step: u32) -> Self {
        self.sequence_step = step;
        self
    }

    /// Reject values the controller cannot run with
    pub fn validate(&self) -> ConversionResult<()> {
        if self.spindle_speed == 0 {
            return Err(invalid("spindle_speed", "must be a positive integer"));
        }
        if !self.feed_rate.is_finite() || self.feed_rate <= 0.0 {
            return Err(invalid("feed_rate", "must be a positive number"));
        }
        if self.sequence_step == 0 {
            return Err(invalid("sequence_step", "must be a positive integer"));
        }
        Ok(())
    }

    /// Feed rate as written into a block (`100`, `12.5`)
    pub fn feed_text(&self) -> String {
        format!("{}", self.feed_rate)
    }
}

impl Default for ConversionParameters {
    fn default() -> Self {
        Self::new(1000, 100.0, MeasurementSystem::Metric)
    }
}

fn invalid(name: &str, reason: &str) -> ConversionError {
    ConversionError::InvalidParameter {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = ConversionParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.sequence_step, DEFAULT_SEQUENCE_STEP);
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let params = ConversionParameters::new(0, 100.0, MeasurementSystem::Metric);
        assert!(matches!(
            params.validate(),
            Err(ConversionError::InvalidParameter { ref name, .. }) if name == "spindle_speed"
        ));

        let params = ConversionParameters::new(1000, -5.0, MeasurementSystem::Metric);
        assert!(params.validate().is_err());

        let params = ConversionParameters::new(1000, f64::NAN, MeasurementSystem::Metric);
        assert!(params.validate().is_err());

        let params = ConversionParameters::default().with_sequence_step(0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_feed_text() {
        assert_eq!(ConversionParameters::default().feed_text(), "100");
        let params = ConversionParameters::new(1000, 12.5, MeasurementSystem::Imperial);
        assert_eq!(params.feed_text(), "12.5");
    }
}
