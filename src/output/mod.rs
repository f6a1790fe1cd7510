//! Report rendering.
//!
//! The report is plain, line-oriented text:
//!
//! ```text
//! Computer Name: WS-0042
//! Output Path:   C:\Reports
//! Architecture:  64-bit
//! ----------------------------------------------------
//!
//! Install Date        Program Name
//!
//! 20200101            7-Zip 19.00 (x64) -- 19.00
//! N/A                 Microsoft Visual C++ 2015 Redistributable -- N/A
//! ```
//!
//! `Output Path` only appears when the report is written to a file.

mod report;

pub use report::{render_report, DATE_COLUMN_WIDTH, SEPARATOR};

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::context::{OutputMode, RunContext};

/// Opens the destination selected by the run context.
///
/// In file mode this creates the report file and returns its path along
/// with the writer. The writer is flushed and closed when dropped.
///
/// # Errors
///
/// Returns an error if the report file cannot be created.
pub fn open_output(context: &RunContext) -> Result<(Box<dyn Write>, Option<PathBuf>)> {
    match &context.output {
        OutputMode::Stream => {
            let writer: Box<dyn Write> = Box::new(BufWriter::new(io::stdout().lock()));
            Ok((writer, None))
        }
        OutputMode::File { .. } => {
            let path = context
                .report_path()
                .context("File output requested without an output directory")?;
            let file = File::create(&path).with_context(|| {
                format!("Unable to open output file for writing: {}", path.display())
            })?;
            let writer: Box<dyn Write> = Box::new(BufWriter::new(file));
            Ok((writer, Some(path)))
        }
    }
}
