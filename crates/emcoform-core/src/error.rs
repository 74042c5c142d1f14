//! Error handling for emcoform
//!
//! Every failure of a conversion run is reported through [`ConversionError`].
//! There is no local recovery: a run that hits any of these errors produces no
//! program at all, because a partially rewritten program drives real machinery.
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::io;
use thiserror::Error;

fn at_line(line_number: &Option<usize>) -> String {
    match line_number {
        Some(n) => format!(" at line {}", n),
        None => String::new(),
    }
}

/// Conversion error type
///
/// Identifies the kind of failure and, where applicable, the 1-based line
/// number of the source program that caused it.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The source program could not be opened or read
    #[error("Source program unreadable{}: {source}", at_line(.line_number))]
    SourceUnreadable {
        /// Line being read when the failure happened, if reading had started.
        line_number: Option<usize>,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The destination program could not be created or written
    #[error("Destination program unwritable: {source}")]
    DestinationUnwritable {
        /// The underlying I/O error.
        source: io::Error,
    },

    /// A word that must carry a number does not parse as one
    #[error("Malformed numeric token '{token}' at line {line_number}: {line}")]
    MalformedNumericToken {
        /// 1-based line number in the source program.
        line_number: usize,
        /// The original, unmodified source line.
        line: String,
        /// The offending token.
        token: String,
    },

    /// No dialect profile matches the requested source dialect
    #[error("Unknown G-code dialect: {0}")]
    UnknownDialect(String),

    /// A conversion parameter is out of its valid range
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Block numbers ran past the largest representable sequence number
    #[error("Sequence numbers exhausted after N{last} with step {step}")]
    SequenceOverflow {
        /// Last block number handed out.
        last: u32,
        /// Numbering step in use.
        step: u32,
    },

    /// The run was cancelled before it completed
    #[error("Conversion cancelled")]
    Cancelled,
}

impl ConversionError {
    /// Wrap a read failure
    pub fn source_unreadable(line_number: Option<usize>, source: io::Error) -> Self {
        Self::SourceUnreadable {
            line_number,
            source,
        }
    }

    /// Wrap a write failure
    pub fn destination_unwritable(source: io::Error) -> Self {
        Self::DestinationUnwritable { source }
    }

    /// Source line number associated with this error, if any
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::SourceUnreadable { line_number, .. } => *line_number,
            Self::MalformedNumericToken { line_number, .. } => Some(*line_number),
            _ => None,
        }
    }
}

/// Result type alias for conversion operations.
pub type ConversionResult<T> = Result<T, ConversionError>;
