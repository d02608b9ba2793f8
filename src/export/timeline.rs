//! Pipe-delimited event timeline from `$FILE_NAME` times

use super::{unix_seconds, ExportRow, RecordWriter};
use crate::error::Result;
use std::io::Write;

pub struct TimelineWriter<W: Write> {
    out: W,
}

impl<W: Write> TimelineWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RecordWriter for TimelineWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_batch(&mut self, rows: &[ExportRow<'_>]) -> Result<()> {
        for row in rows {
            let times = row.record.fn_times();
            let events = [
                (times.creation, "CREATE"),
                (times.modification, "MODIFY"),
                (times.access, "ACCESS"),
                (times.entry, "CHANGE"),
            ];
            for (time, event) in events {
                if !time.is_set() {
                    continue;
                }
                writeln!(
                    self.out,
                    "{}|MFT|{}|||||{}|{}||||",
                    unix_seconds(time),
                    event,
                    row.path,
                    row.record.header.record_number
                )?;
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
    use crate::ntfs::structs::WindowsTime;

    #[test]
    fn test_events_for_set_times_only() {
        let mut record = named_record(40, "test.txt", 0);
        let fname = &mut record.file_names[0];
        fname.times.creation = WindowsTime(132_223_104_000_000_000);
        fname.times.access = WindowsTime(132_223_104_010_000_000);

        let sink = SharedBuffer::default();
        let mut writer = TimelineWriter::new(sink.clone());
        writer.write_batch(&[ExportRow { record: &record, path: "\\test.txt" }]).unwrap();
        writer.finish().unwrap();

        let out = sink.contents();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "1577836800|MFT|CREATE|||||\\test.txt|40||||",
                "1577836801|MFT|ACCESS|||||\\test.txt|40||||",
            ]
        );
    }
}
