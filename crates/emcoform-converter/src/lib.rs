//! # emcoform converter
//!
//! Rewrites CAM-generated G-code for EMCO controllers.
//! Includes the tokenizer, dialect profiles, the line processor pipeline and
//! the program-level driver that frames and numbers the output.

pub mod converter;
pub mod gcode;

pub use converter::{ConversionSummary, Converter};

pub use gcode::{
    ArcNotationConverter, ArcStrategy, CommentStripper, CommentSyntax, ConversionState,
    DialectFilter, DialectProfile, FeedSpeedNormalizer, LineDisposition, LineProcessor,
    LineTokenizer, MotionCode, MotionCodeInheritor, MotionReclassifier, NumericValidator,
    ParsedFields, ProcessorHandle, ProcessorPipeline, SequenceNumberStripper, SourceLine, Token,
    ToolChangeNormalizer, ToolChangePolicy,
};

pub use emcoform_core::{
    ConversionError, ConversionParameters, ConversionResult, Dialect, MeasurementSystem,
};
