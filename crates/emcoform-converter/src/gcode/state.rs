//! Per-run conversion state

use emcoform_core::{ConversionError, ConversionResult};

use super::line::ParsedFields;

/// State carried from one accepted line to the next
///
/// Owned by a single conversion run and never shared. It starts with no Z
/// history, both milling flags cleared and the counter at the first step.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionState {
    /// Z of the most recent line that carried one
    pub last_z: Option<f64>,
    /// The tool went down and has not come back up
    pub z_milling: bool,
    /// The previous accepted line moved in X or Y
    pub xy_milling: bool,
    /// Last motion code seen (0-3)
    pub last_motion_code: Option<u8>,
    /// Next block number; `None` once the counter has run past `u32::MAX`
    sequence: Option<u32>,
    last_sequence: u32,
    step: u32,
}

impl ConversionState {
    /// Fresh state numbering blocks by `step`
    pub fn new(step: u32) -> Self {
        Self {
            last_z: None,
            z_milling: false,
            xy_milling: false,
            last_motion_code: None,
            sequence: Some(step),
            last_sequence: 0,
            step,
        }
    }

    /// Take the next block number
    ///
    /// # Errors
    /// Returns `SequenceOverflow` once numbering would wrap around.
    pub fn next_sequence(&mut self) -> ConversionResult<u32> {
        let current = self.sequence.ok_or(ConversionError::SequenceOverflow {
            last: self.last_sequence,
            step: self.step,
        })?;
        self.last_sequence = current;
        self.sequence = current.checked_add(self.step);
        Ok(current)
    }

    /// Fold an accepted line's motion code into the state
    pub fn observe(&mut self, fields: &ParsedFields) {
        if let Some(motion) = fields.motion {
            self.last_motion_code = Some(motion.code());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::line::MotionCode;

    #[test]
    fn test_initial_state() {
        let state = ConversionState::new(10);
        assert_eq!(state.last_z, None);
        assert!(!state.z_milling);
        assert!(!state.xy_milling);
        assert_eq!(state.last_motion_code, None);
        assert_eq!(ConversionState::new(10).next_sequence().unwrap(), 10);
    }

    #[test]
    fn test_sequence_advances_by_step() {
        let mut state = ConversionState::new(5);
        assert_eq!(state.next_sequence().unwrap(), 5);
        assert_eq!(state.next_sequence().unwrap(), 10);
        assert_eq!(state.next_sequence().unwrap(), 15);
    }

    #[test]
    fn test_sequence_never_wraps() {
        let mut state = ConversionState::new(1_500_000_000);
        assert_eq!(state.next_sequence().unwrap(), 1_500_000_000);
        assert_eq!(state.next_sequence().unwrap(), 3_000_000_000);
        match state.next_sequence() {
            Err(ConversionError::SequenceOverflow { last, step }) => {
                assert_eq!(last, 3_000_000_000);
                assert_eq!(step, 1_500_000_000);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(state.next_sequence().is_err());
    }

    #[test]
    fn test_last_representable_number_is_handed_out() {
        let mut state = ConversionState::new(u32::MAX);
        assert_eq!(state.next_sequence().unwrap(), u32::MAX);
        assert!(state.next_sequence().is_err());
    }

    #[test]
    fn test_observe_keeps_last_motion() {
        let mut state = ConversionState::new(10);
        state.observe(&ParsedFields {
            motion: Some(MotionCode::ArcCounterClockwise),
            ..Default::default()
        });
        state.observe(&ParsedFields::default());
        assert_eq!(state.last_motion_code, Some(3));
    }
}
