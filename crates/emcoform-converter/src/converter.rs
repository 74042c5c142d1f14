//! Program conversion
//!
//! Drives a [`ProcessorPipeline`] over a whole source program. Output is
//! framed by the controller's header and footer, and tool changes get
//! spindle stop/start blocks around them.
//!
//! File-level conversion writes to a temporary file next to the destination
//! and only moves it into place once the run has finished, so a failed or
//! cancelled run never leaves a half-written program behind.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use emcoform_core::{ConversionError, ConversionParameters, ConversionResult, Dialect};
use tempfile::NamedTempFile;

use crate::gcode::{
    ConversionState, DialectProfile, LineDisposition, ProcessorPipeline, SourceLine,
    ToolChangePolicy,
};

/// Buffer size for reading and writing programs (64 KB)
const IO_BUFFER_SIZE: usize = 64 * 1024;

/// Counters collected during one conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Source lines read
    pub lines_read: usize,
    /// Source lines dropped by the dialect filter
    pub lines_rejected: usize,
    /// Numbered blocks written, header and footer included
    pub blocks_written: usize,
    /// Rapid moves rewritten as feed moves
    pub moves_reclassified: usize,
    /// Lines whose arc parameters were rewritten
    pub arcs_converted: usize,
    /// Tool change blocks encountered
    pub tool_changes: usize,
}

/// Numbers blocks and writes the fixed program frame into memory
struct ProgramWriter<'a> {
    out: Vec<u8>,
    state: &'a mut ConversionState,
    spindle_on: String,
    blocks: usize,
}

impl<'a> ProgramWriter<'a> {
    fn new(state: &'a mut ConversionState, params: &ConversionParameters) -> Self {
        Self {
            out: Vec::with_capacity(IO_BUFFER_SIZE),
            state,
            spindle_on: format!("M03 S{}", params.spindle_speed),
            blocks: 0,
        }
    }

    fn block(&mut self, code: &str) -> ConversionResult<()> {
        let sequence = self.state.next_sequence()?;
        writeln!(self.out, "N{} {}", sequence, code)
            .map_err(ConversionError::destination_unwritable)?;
        self.blocks += 1;
        Ok(())
    }

    fn header(&mut self, params: &ConversionParameters) -> ConversionResult<()> {
        self.block("G90")?;
        self.block(params.units.header_code())?;
        let spindle_on = self.spindle_on.clone();
        self.block(&spindle_on)
    }

    fn tool_change(&mut self, code: &str, policy: ToolChangePolicy) -> ConversionResult<()> {
        self.block("M05")?;
        self.block(code)?;
        if policy == ToolChangePolicy::StopAndRestart {
            let spindle_on = self.spindle_on.clone();
            self.block(&spindle_on)?;
        }
        Ok(())
    }

    fn footer(&mut self) -> ConversionResult<()> {
        self.block("M05")?;
        self.block("M30")
    }

    /// Copy the finished program to `output`
    fn finish<W: Write>(self, mut output: W) -> ConversionResult<usize> {
        output
            .write_all(&self.out)
            .and_then(|()| output.flush())
            .map_err(ConversionError::destination_unwritable)?;
        Ok(self.blocks)
    }
}

/// Converts programs of one source dialect for the EMCO controller
pub struct Converter {
    profile: DialectProfile,
    params: ConversionParameters,
    pipeline: ProcessorPipeline,
    cancel: Option<Arc<AtomicBool>>,
}

impl Converter {
    /// Create a converter for a dialect
    ///
    /// # Errors
    /// Returns `InvalidParameter` if the parameters are out of range
    pub fn new(dialect: Dialect, params: ConversionParameters) -> ConversionResult<Self> {
        Self::with_profile(DialectProfile::for_dialect(dialect), params)
    }

    /// Create a converter from an explicit profile
    pub fn with_profile(
        profile: DialectProfile,
        params: ConversionParameters,
    ) -> ConversionResult<Self> {
        params.validate()?;
        let pipeline = ProcessorPipeline::for_profile(&profile, &params);
        Ok(Self {
            profile,
            params,
            pipeline,
            cancel: None,
        })
    }

    /// Stop between lines once the flag is raised
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Profile in use
    pub fn profile(&self) -> &DialectProfile {
        &self.profile
    }

    /// Stage pipeline in use
    pub fn pipeline(&self) -> &ProcessorPipeline {
        &self.pipeline
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Convert a program read from `input`, writing the result to `output`
    ///
    /// # Errors
    /// Fails on the first unreadable line, malformed numeric word, exhausted
    /// block numbering or cancellation. The program is assembled in memory and
    /// `output` receives nothing unless the footer was written.
    pub fn convert<R: BufRead, W: Write>(
        &self,
        input: R,
        output: W,
    ) -> ConversionResult<ConversionSummary> {
        let started = Instant::now();
        let mut state = ConversionState::new(self.params.sequence_step);
        let mut summary = ConversionSummary::default();
        let mut writer = ProgramWriter::new(&mut state, &self.params);

        writer.header(&self.params)?;

        for (index, raw) in input.lines().enumerate() {
            if self.is_cancelled() {
                tracing::info!("Conversion cancelled after {} lines", summary.lines_read);
                return Err(ConversionError::Cancelled);
            }

            let line_number = index + 1;
            let raw = raw.map_err(|e| ConversionError::source_unreadable(Some(line_number), e))?;
            summary.lines_read += 1;

            let mut line = SourceLine::new(line_number, raw);
            if self.pipeline.process_line(&mut line, writer.state)? == LineDisposition::Reject {
                summary.lines_rejected += 1;
                continue;
            }

            summary.moves_reclassified += usize::from(line.reclassified);
            summary.arcs_converted += usize::from(line.arc_converted);

            let code = line.render();
            if code.is_empty() {
                continue;
            }

            let fields = line.fields();
            if fields.tool_change {
                summary.tool_changes += 1;
                tracing::debug!("Line {}: tool change to T{:?}", line_number, fields.tool);
                writer.tool_change(&code, self.profile.tool_change)?;
            } else {
                writer.block(&code)?;
            }
        }

        writer.footer()?;
        summary.blocks_written = writer.finish(output)?;

        tracing::info!(
            "Converted {} program: {} lines read, {} rejected, {} blocks written in {:?}",
            self.profile.dialect,
            summary.lines_read,
            summary.lines_rejected,
            summary.blocks_written,
            started.elapsed()
        );
        Ok(summary)
    }

    /// Convert an in-memory program, returning the output blocks
    pub fn convert_str(&self, program: &str) -> ConversionResult<Vec<String>> {
        let mut output = Vec::new();
        self.convert(program.as_bytes(), &mut output)?;
        let text = String::from_utf8_lossy(&output);
        Ok(text.lines().map(str::to_string).collect())
    }

    /// Convert the program at `source` into `destination`
    ///
    /// The destination only appears once the whole program converted.
    pub fn convert_file(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
    ) -> ConversionResult<ConversionSummary> {
        let source = source.as_ref();
        let destination = destination.as_ref();

        let input = File::open(source).map_err(|e| ConversionError::source_unreadable(None, e))?;
        let reader = BufReader::with_capacity(IO_BUFFER_SIZE, input);

        let directory = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp =
            NamedTempFile::new_in(directory).map_err(ConversionError::destination_unwritable)?;

        let summary = {
            let writer = BufWriter::with_capacity(IO_BUFFER_SIZE, temp.as_file_mut());
            self.convert(reader, writer)?
        };

        temp.persist(destination)
            .map_err(|e| ConversionError::destination_unwritable(e.error))?;

        tracing::info!(
            "Wrote {} ({} blocks)",
            destination.display(),
            summary.blocks_written
        );
        Ok(summary)
    }
}
