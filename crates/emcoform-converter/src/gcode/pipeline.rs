//! Line processor pipeline

use std::sync::Arc;

use emcoform_core::{ConversionParameters, ConversionResult};

use super::processors::{
    ArcNotationConverter, CommentStripper, DialectFilter, FeedSpeedNormalizer, LineTokenizer,
    MotionCodeInheritor, MotionReclassifier, NumericValidator, SequenceNumberStripper,
    ToolChangeNormalizer,
};
use super::{ConversionState, DialectProfile, SourceLine};

/// What happens to a line after a stage has run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDisposition {
    /// Hand the line to the next stage
    Keep,
    /// Drop the line; later stages do not see it and it leaves no trace in the state
    Reject,
}

/// Trait for line processing stages
///
/// A stage rewrites a [`SourceLine`] in place and decides whether the line
/// continues. Stages that track motion also update the [`ConversionState`].
pub trait LineProcessor: Send + Sync {
    /// Get the name/identifier of this processor
    fn name(&self) -> &str;

    /// Get a description of what this processor does
    fn description(&self) -> &str;

    /// Process a single line
    fn process(
        &self,
        line: &mut SourceLine,
        state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition>;
}

/// Arc-wrapped processor for thread-safe sharing
pub type ProcessorHandle = Arc<dyn LineProcessor>;

/// Ordered sequence of line processors
///
/// # Example
/// ```ignore
/// let pipeline = ProcessorPipeline::for_profile(&DialectProfile::kirimoto(), &params);
/// let mut state = ConversionState::new(params.sequence_step);
/// let disposition = pipeline.process_line(&mut line, &mut state)?;
/// ```
pub struct ProcessorPipeline {
    processors: Vec<ProcessorHandle>,
}

impl ProcessorPipeline {
    /// Create a new empty processor pipeline
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    /// Build the stage sequence a dialect profile asks for
    pub fn for_profile(profile: &DialectProfile, params: &ConversionParameters) -> Self {
        let mut pipeline = Self::new();

        pipeline.register(Arc::new(CommentStripper::new(profile.comment_syntax)));
        pipeline.register(Arc::new(LineTokenizer));
        if profile.strip_sequence_numbers {
            pipeline.register(Arc::new(SequenceNumberStripper));
        }
        if profile.normalize_tool_change {
            pipeline.register(Arc::new(ToolChangeNormalizer));
        }
        pipeline.register(Arc::new(DialectFilter::from_profile(profile)));
        pipeline.register(Arc::new(NumericValidator));
        if profile.inherit_motion_code {
            pipeline.register(Arc::new(MotionCodeInheritor));
        }
        if profile.reclassify_motion {
            pipeline.register(Arc::new(MotionReclassifier));
        }
        pipeline.register(Arc::new(ArcNotationConverter::from_profile(profile)));
        pipeline.register(Arc::new(FeedSpeedNormalizer::new(profile, params)));

        pipeline
    }

    /// Register a processor in the pipeline
    ///
    /// Processors are applied in the order they are registered.
    pub fn register(&mut self, processor: ProcessorHandle) -> &mut Self {
        self.processors.push(processor);
        self
    }

    /// Get the number of registered processors
    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    /// List all registered processors as `(name, description)`
    pub fn list_processors(&self) -> Vec<(&str, &str)> {
        self.processors
            .iter()
            .map(|p| (p.name(), p.description()))
            .collect()
    }

    /// Run one line through every stage, stopping at the first rejection
    pub fn process_line(
        &self,
        line: &mut SourceLine,
        state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition> {
        for processor in &self.processors {
            if processor.process(line, state)? == LineDisposition::Reject {
                tracing::debug!(
                    "Processor '{}' rejected line {}: {}",
                    processor.name(),
                    line.line_number,
                    line.original.trim()
                );
                return Ok(LineDisposition::Reject);
            }
        }

        state.observe(&line.fields());
        Ok(LineDisposition::Keep)
    }
}

impl Default for ProcessorPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pipeline: &ProcessorPipeline) -> Vec<&str> {
        pipeline.list_processors().into_iter().map(|(n, _)| n).collect()
    }

    #[test]
    fn test_kirimoto_stage_order() {
        let pipeline =
            ProcessorPipeline::for_profile(&DialectProfile::kirimoto(), &Default::default());
        assert_eq!(
            names(&pipeline),
            vec![
                "comment_stripper",
                "tokenizer",
                "dialect_filter",
                "numeric_validator",
                "motion_reclassifier",
                "arc_notation",
                "feed_speed",
            ]
        );
    }

    #[test]
    fn test_mastercam_stage_order() {
        let pipeline =
            ProcessorPipeline::for_profile(&DialectProfile::mastercam(), &Default::default());
        assert_eq!(pipeline.processor_count(), 9);
        let names = names(&pipeline);
        assert!(names.contains(&"motion_inheritor"));
        assert!(!names.contains(&"motion_reclassifier"));
    }

    #[test]
    fn test_rejected_line_leaves_state_untouched() {
        let pipeline =
            ProcessorPipeline::for_profile(&DialectProfile::kirimoto(), &Default::default());
        let mut state = ConversionState::new(10);
        let mut line = SourceLine::new(1, "G90 G0 Z5");

        let disposition = pipeline.process_line(&mut line, &mut state).unwrap();

        assert_eq!(disposition, LineDisposition::Reject);
        assert_eq!(state, ConversionState::new(10));
    }

    #[test]
    fn test_kept_line_updates_last_motion() {
        let pipeline =
            ProcessorPipeline::for_profile(&DialectProfile::aspire(), &Default::default());
        let mut state = ConversionState::new(10);
        let mut line = SourceLine::new(1, "G1 X1 Y1");

        pipeline.process_line(&mut line, &mut state).unwrap();

        assert_eq!(state.last_motion_code, Some(1));
    }
}
