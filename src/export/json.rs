//! JSON array writer

use super::{ExportRow, RecordFields, RecordWriter};
use crate::error::Result;
use std::io::Write;

/// Streams `[ {...}, {...} ]` one record at a time
pub struct JsonWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }
}

impl<W: Write> RecordWriter for JsonWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        write!(self.out, "[")?;
        Ok(())
    }

    fn write_batch(&mut self, rows: &[ExportRow<'_>]) -> Result<()> {
        for row in rows {
            if self.written > 0 {
                write!(self.out, ",")?;
            }
            writeln!(self.out)?;
            serde_json::to_writer_pretty(&mut self.out, &RecordFields::from_row(row))?;
            self.written += 1;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.written > 0 {
            writeln!(self.out)?;
        }
        writeln!(self.out, "]")?;
        self.out.flush()?;
        Ok(())
    }
}
