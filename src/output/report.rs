use std::io::{self, Write};

use crate::context::RunContext;
use crate::inventory::Inventory;

/// Width the install date column is padded to.
pub const DATE_COLUMN_WIDTH: usize = 20;

pub const SEPARATOR: &str = "----------------------------------------------------";

/// Writes the report for `inventory` to `out`.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn render_report<W: Write + ?Sized>(
    out: &mut W,
    context: &RunContext,
    inventory: &Inventory,
) -> io::Result<()> {
    writeln!(out, "Computer Name: {}", context.host)?;
    if let Some(dir) = context.output_dir() {
        writeln!(out, "Output Path:   {}", dir.display())?;
    }
    writeln!(out, "Architecture:  {}", context.architecture)?;
    writeln!(out, "{}", SEPARATOR)?;
    writeln!(out)?;
    writeln!(out, "{:<width$}Program Name", "Install Date", width = DATE_COLUMN_WIDTH)?;
    writeln!(out)?;

    for record in inventory.records() {
        writeln!(
            out,
            "{:<width$}{} -- {}",
            record.install_date,
            record.display_name,
            record.display_version,
            width = DATE_COLUMN_WIDTH
        )?;
    }

    out.flush()
}
