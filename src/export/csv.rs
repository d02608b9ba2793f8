//! CSV writer with the canonical column set

use super::{ExportRow, RecordWriter};
use crate::error::Result;
use crate::ntfs::structs::AttributeType;
use crate::ntfs::MftRecord;
use std::io::Write;

pub const CSV_HEADER: [&str; 50] = [
    "Record Number",
    "Record Status",
    "Record Type",
    "File Type",
    "Sequence Number",
    "Parent Record Number",
    "Parent Record Sequence Number",
    "Filename",
    "Filepath",
    "SI Creation Time",
    "SI Modification Time",
    "SI Access Time",
    "SI Entry Time",
    "FN Creation Time",
    "FN Modification Time",
    "FN Access Time",
    "FN Entry Time",
    "Object ID",
    "Birth Volume ID",
    "Birth Object ID",
    "Birth Domain ID",
    "Has Standard Information",
    "Has Attribute List",
    "Has File Name",
    "Has Volume Name",
    "Has Volume Information",
    "Has Data",
    "Has Index Root",
    "Has Index Allocation",
    "Has Bitmap",
    "Has Reparse Point",
    "Has EA Information",
    "Has EA",
    "Has Logged Utility Stream",
    "Attribute List Details",
    "Security Descriptor",
    "Volume Name",
    "Volume Information",
    "Data Attribute",
    "Index Root",
    "Index Allocation",
    "Bitmap",
    "Reparse Point",
    "EA Information",
    "EA",
    "Logged Utility Stream",
    "MD5",
    "SHA256",
    "SHA512",
    "CRC32",
];

/// Attribute types reported in the "Has ..." columns, in column order
const PRESENCE_COLUMNS: [AttributeType; 13] = [
    AttributeType::StandardInformation,
    AttributeType::AttributeList,
    AttributeType::FileName,
    AttributeType::VolumeName,
    AttributeType::VolumeInformation,
    AttributeType::Data,
    AttributeType::IndexRoot,
    AttributeType::IndexAllocation,
    AttributeType::Bitmap,
    AttributeType::ReparsePoint,
    AttributeType::EaInformation,
    AttributeType::Ea,
    AttributeType::LoggedUtilityStream,
];

pub struct CsvWriter<W: Write> {
    out: W,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_line<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        let line: Vec<String> = fields.iter().map(|f| quote(f.as_ref())).collect();
        writeln!(self.out, "{}", line.join(","))?;
        Ok(())
    }
}

impl<W: Write> RecordWriter for CsvWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        self.write_line(&CSV_HEADER)
    }

    fn write_batch(&mut self, rows: &[ExportRow<'_>]) -> Result<()> {
        for row in rows {
            let fields = project(row.record, row.path);
            self.write_line(&fields)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Quote a field only when it holds a delimiter, quote or line break
pub fn quote(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn flag(present: bool) -> String {
    if present { "True" } else { "False" }.to_string()
}

fn detail<T>(value: &Option<T>, summary: impl Fn(&T) -> String) -> String {
    value.as_ref().map(summary).unwrap_or_default()
}

/// The 50 column values of one record
pub fn project(record: &MftRecord, path: &str) -> Vec<String> {
    let si = record.si_times();
    let fname = record.fn_times();
    let oid = record.object_id.as_ref();

    let mut fields = Vec::with_capacity(CSV_HEADER.len());
    fields.push(record.header.record_number.to_string());
    fields.push(if record.is_valid() { "Valid" } else { "Invalid" }.to_string());
    fields.push(if record.is_in_use() { "In Use" } else { "Not in Use" }.to_string());
    fields.push(record.file_type().to_string());
    fields.push(record.header.sequence_number.to_string());
    fields.push(record.parent_record_number().to_string());
    fields.push(record.parent_sequence_number().to_string());
    fields.push(record.filename().to_string());
    fields.push(path.to_string());

    for time in [si.creation, si.modification, si.access, si.entry] {
        fields.push(time.to_string());
    }
    for time in [fname.creation, fname.modification, fname.access, fname.entry] {
        fields.push(time.to_string());
    }

    fields.push(oid.map(|o| o.object_id.to_string()).unwrap_or_default());
    fields.push(oid.map(|o| o.birth_volume_id.to_string()).unwrap_or_default());
    fields.push(oid.map(|o| o.birth_object_id.to_string()).unwrap_or_default());
    fields.push(oid.map(|o| o.birth_domain_id.to_string()).unwrap_or_default());

    fields.extend(PRESENCE_COLUMNS.iter().map(|t| flag(record.has_attribute(*t))));

    fields.push(detail(&record.attribute_list, |a| a.summary()));
    fields.push(detail(&record.security_descriptor, |s| s.summary()));
    fields.push(detail(&record.volume_name, |v| v.name.clone()));
    fields.push(detail(&record.volume_information, |v| v.summary()));
    fields.push(data_detail(record));
    fields.push(detail(&record.index_root, |i| i.summary()));
    fields.push(detail(&record.index_allocation, |i| i.summary()));
    fields.push(detail(&record.bitmap, |b| b.summary()));
    fields.push(detail(&record.reparse_point, |r| r.summary()));
    fields.push(detail(&record.ea_information, |e| e.summary()));
    fields.push(detail(&record.ea, |e| e.summary()));
    fields.push(detail(&record.logged_utility_stream, |l| l.summary()));

    match record.hashes {
        Some(ref h) => fields.extend([h.md5.clone(), h.sha256.clone(), h.sha512.clone(), h.crc32.clone()]),
        None => fields.extend(std::iter::repeat(String::new()).take(4)),
    }

    fields
}

/// Unnamed stream first, then any alternate streams
fn data_detail(record: &MftRecord) -> String {
    let mut parts: Vec<String> = record.data.iter().map(|d| d.summary()).collect();
    parts.extend(record.alternate_streams.iter().map(|d| d.summary()));
    parts.join("; ")
}
