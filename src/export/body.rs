//! mactime body file writer
//!
//! `md5|name|inode|mode|uid|gid|size|atime|mtime|ctime|crtime`, one line for
//! the `$STANDARD_INFORMATION` times and one for the `$FILE_NAME` times.

use super::{unix_seconds, ExportRow, RecordWriter};
use crate::error::Result;
use crate::ntfs::attributes::TimestampSet;
use crate::ntfs::MftRecord;
use std::io::Write;

pub const FILE_NAME_SUFFIX: &str = " ($FILE_NAME)";

pub struct BodyWriter<W: Write> {
    out: W,
}

impl<W: Write> BodyWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_line(&mut self, record: &MftRecord, name: &str, times: &TimestampSet) -> Result<()> {
        let md5 = record.hashes.as_ref().map(|h| h.md5.as_str()).unwrap_or("0");
        writeln!(
            self.out,
            "{}|{}|{}|{}|0|0|{}|{}|{}|{}|{}",
            md5,
            name,
            record.header.record_number,
            record.header.flags,
            record.file_size(),
            unix_seconds(times.access),
            unix_seconds(times.modification),
            unix_seconds(times.entry),
            unix_seconds(times.creation),
        )?;
        Ok(())
    }
}

impl<W: Write> RecordWriter for BodyWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_batch(&mut self, rows: &[ExportRow<'_>]) -> Result<()> {
        for row in rows {
            let record = row.record;
            if let Some(ref si) = record.standard_information {
                self.write_line(record, row.path, &si.times)?;
            }
            if let Some(fname) = record.primary_file_name() {
                let name = format!("{}{}", row.path, FILE_NAME_SUFFIX);
                self.write_line(record, &name, &fname.times)?;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::{named_record, SharedBuffer};

    // 2020-01-01T00:00:00Z
    const TICKS_2020: u64 = 132_223_104_000_000_000;

    #[test]
    fn test_si_and_fn_lines() {
        let record = named_record(40, "test.txt", TICKS_2020);
        let sink = SharedBuffer::default();
        let mut writer = BodyWriter::new(sink.clone());
        writer.write_header().unwrap();
        writer.write_batch(&[ExportRow { record: &record, path: "\\test.txt" }]).unwrap();
        writer.finish().unwrap();

        let out = sink.contents();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "0|\\test.txt|40|1|0|0|1234|1577836800|1577836800|1577836800|1577836800"
        );
        assert_eq!(lines[1], "0|\\test.txt ($FILE_NAME)|40|1|0|0|1234|0|0|0|0");
    }
}
