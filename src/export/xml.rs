//! XML writer

use super::{ExportRow, RecordFields, RecordWriter};
use crate::error::Result;
use std::io::Write;

pub struct XmlWriter<W: Write> {
    out: W,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RecordWriter for XmlWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        writeln!(self.out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(self.out, "<mft_records>")?;
        Ok(())
    }

    fn write_batch(&mut self, rows: &[ExportRow<'_>]) -> Result<()> {
        for row in rows {
            writeln!(self.out, "  <record>")?;
            for (name, value) in RecordFields::from_row(row).pairs() {
                writeln!(self.out, "    <{0}>{1}</{0}>", name, escape(&value))?;
            }
            writeln!(self.out, "  </record>")?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.out, "</mft_records>")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Escape text content; control characters XML 1.0 cannot carry are dropped
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if (c as u32) < 0x20 => {}
            c => escaped.push(c),
        }
    }
    escaped
}
