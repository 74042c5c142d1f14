//! G-Code line model and rewriting stages
//!
//! This module provides:
//! - Tokenizing and rendering of single lines
//! - A parsed field view over a line's words
//! - Dialect profiles describing what each source dialect needs
//! - The line processor pipeline and its stages
//! - Per-run conversion state

pub mod line;
pub mod pipeline;
pub mod processors;
pub mod profile;
pub mod state;
pub mod token;

pub use line::{MotionCode, ParsedFields, SourceLine};
pub use pipeline::{LineDisposition, LineProcessor, ProcessorHandle, ProcessorPipeline};
pub use processors::*;
pub use profile::{
    ArcStrategy, CommentSyntax, DialectProfile, ToolChangePolicy, RADIUS_PRECISION, RADIUS_PREFIX,
};
pub use state::ConversionState;
pub use token::{pad_decimal, render, tokenize, Token};
