//! Output writers
//!
//! Every writer receives records batch by batch, each paired with its
//! resolved path, and streams them straight to its sink.

pub mod body;
pub mod csv;
pub mod json;
pub mod timeline;
pub mod xml;

use crate::error::Result;
use crate::ntfs::structs::WindowsTime;
use crate::ntfs::MftRecord;
use clap::ValueEnum;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub use self::body::BodyWriter;
pub use self::csv::{CsvWriter, CSV_HEADER};
pub use self::json::JsonWriter;
pub use self::timeline::TimelineWriter;
pub use self::xml::XmlWriter;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Xml,
    /// mactime body file
    Body,
    /// Pipe-delimited event timeline
    Timeline,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Body => "body",
            Self::Timeline => "txt",
        }
    }
}

/// One record as handed to a writer
#[derive(Debug, Clone, Copy)]
pub struct ExportRow<'a> {
    pub record: &'a MftRecord,
    pub path: &'a str,
}

pub trait RecordWriter {
    fn write_header(&mut self) -> Result<()>;
    fn write_batch(&mut self, rows: &[ExportRow<'_>]) -> Result<()>;
    /// Close any open structure and flush
    fn finish(&mut self) -> Result<()>;
}

/// Build a writer for `format` over an arbitrary sink
pub fn writer_for<W: Write + 'static>(format: ExportFormat, sink: W) -> Box<dyn RecordWriter> {
    match format {
        ExportFormat::Csv => Box::new(CsvWriter::new(sink)),
        ExportFormat::Json => Box::new(JsonWriter::new(sink)),
        ExportFormat::Xml => Box::new(XmlWriter::new(sink)),
        ExportFormat::Body => Box::new(BodyWriter::new(sink)),
        ExportFormat::Timeline => Box::new(TimelineWriter::new(sink)),
    }
}

/// Create `output` and build a buffered writer for it
pub fn create_writer(format: ExportFormat, output: &Path) -> Result<Box<dyn RecordWriter>> {
    let file = File::create(output)?;
    log::info!(target: "export", "writing {:?} to {}", format, output.display());
    Ok(writer_for(format, BufWriter::new(file)))
}

/// Flat projection shared by the JSON and XML writers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFields {
    pub record_number: u64,
    pub filename: String,
    pub filepath: String,
    pub filesize: u64,
    pub sequence_number: u16,
    pub parent_record_number: u64,
    pub flags: u16,
    pub file_type: String,
    pub si_creation_time: String,
    pub si_modification_time: String,
    pub si_access_time: String,
    pub si_entry_time: String,
    pub fn_creation_time: String,
    pub fn_modification_time: String,
    pub fn_access_time: String,
    pub fn_entry_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_volume_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_object_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_domain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha512: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crc32: Option<String>,
}

impl RecordFields {
    pub fn from_row(row: &ExportRow<'_>) -> Self {
        let record = row.record;
        let si = record.si_times();
        let fname = record.fn_times();
        let oid = record.object_id.as_ref();
        let hashes = record.hashes.as_ref();

        Self {
            record_number: record.header.record_number as u64,
            filename: record.filename().to_string(),
            filepath: row.path.to_string(),
            filesize: record.file_size(),
            sequence_number: record.header.sequence_number,
            parent_record_number: record.parent_record_number(),
            flags: record.header.flags,
            file_type: record.file_type().to_string(),
            si_creation_time: si.creation.to_string(),
            si_modification_time: si.modification.to_string(),
            si_access_time: si.access.to_string(),
            si_entry_time: si.entry.to_string(),
            fn_creation_time: fname.creation.to_string(),
            fn_modification_time: fname.modification.to_string(),
            fn_access_time: fname.access.to_string(),
            fn_entry_time: fname.entry.to_string(),
            object_id: oid.map(|o| o.object_id.to_string()),
            birth_volume_id: oid.map(|o| o.birth_volume_id.to_string()),
            birth_object_id: oid.map(|o| o.birth_object_id.to_string()),
            birth_domain_id: oid.map(|o| o.birth_domain_id.to_string()),
            md5: hashes.map(|h| h.md5.clone()),
            sha256: hashes.map(|h| h.sha256.clone()),
            sha512: hashes.map(|h| h.sha512.clone()),
            crc32: hashes.map(|h| h.crc32.clone()),
        }
    }

    /// Field names and values in output order, skipping absent optionals
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("recordNumber", self.record_number.to_string()),
            ("filename", self.filename.clone()),
            ("filepath", self.filepath.clone()),
            ("filesize", self.filesize.to_string()),
            ("sequenceNumber", self.sequence_number.to_string()),
            ("parentRecordNumber", self.parent_record_number.to_string()),
            ("flags", self.flags.to_string()),
            ("fileType", self.file_type.clone()),
            ("siCreationTime", self.si_creation_time.clone()),
            ("siModificationTime", self.si_modification_time.clone()),
            ("siAccessTime", self.si_access_time.clone()),
            ("siEntryTime", self.si_entry_time.clone()),
            ("fnCreationTime", self.fn_creation_time.clone()),
            ("fnModificationTime", self.fn_modification_time.clone()),
            ("fnAccessTime", self.fn_access_time.clone()),
            ("fnEntryTime", self.fn_entry_time.clone()),
        ];
        let optional = [
            ("objectId", &self.object_id),
            ("birthVolumeId", &self.birth_volume_id),
            ("birthObjectId", &self.birth_object_id),
            ("birthDomainId", &self.birth_domain_id),
            ("md5", &self.md5),
            ("sha256", &self.sha256),
            ("sha512", &self.sha512),
            ("crc32", &self.crc32),
        ];
        pairs.extend(
            optional
                .iter()
                .filter_map(|(name, value)| value.as_ref().map(|v| (*name, v.clone()))),
        );
        pairs
    }
}

/// Unix seconds for body and timeline output; 0 when unset
pub(crate) fn unix_seconds(time: WindowsTime) -> i64 {
    time.to_unix_seconds().unwrap_or(0)
}
