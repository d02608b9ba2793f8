//! `$ATTRIBUTE_LIST` (0x20)
//!
//! Lists the attributes of a file that spill over into extension records.

use crate::error::AttrResult;
use crate::ntfs::attribute::AttributeHeader;
use crate::ntfs::bounds::ByteReader;
use crate::ntfs::structs::{attribute_type_name, FileReference, MAX_ATTRIBUTE_LIST_ENTRIES, MAX_FILENAME_LENGTH};
use crate::ntfs::validation::{validate_file_reference, DecodeContext};
use serde::Serialize;

/// Smallest entry: fixed fields with no name
pub const ATTRIBUTE_LIST_ENTRY_MIN_SIZE: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeListEntry {
    pub attribute_type: u32,
    pub record_length: u16,
    pub name: Option<String>,
    pub starting_vcn: u64,
    pub reference: FileReference,
    /// Absent in minimum-size (24-byte) entries
    pub attribute_id: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AttributeList {
    /// Content lives outside the record and was not walked
    pub non_resident: bool,
    pub entries: Vec<AttributeListEntry>,
}

impl AttributeList {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        if !header.is_resident() {
            ctx.trace("non-resident attribute list left unwalked");
            return Ok(Self {
                non_resident: true,
                entries: Vec::new(),
            });
        }

        let value = header.value_reader(reader, "$ATTRIBUTE_LIST")?;
        let mut entries = Vec::new();
        let mut offset = 0;

        while offset + ATTRIBUTE_LIST_ENTRY_MIN_SIZE <= value.len() {
            if entries.len() >= MAX_ATTRIBUTE_LIST_ENTRIES {
                ctx.warn(format_args!(
                    "attribute list truncated at {} entries",
                    MAX_ATTRIBUTE_LIST_ENTRIES
                ));
                break;
            }

            let record_length = value.u16_at(offset + 4)?;
            if (record_length as usize) < ATTRIBUTE_LIST_ENTRY_MIN_SIZE
                || offset + record_length as usize > value.len()
            {
                ctx.warn(format_args!(
                    "attribute list entry at {} has bad length {}",
                    offset, record_length
                ));
                break;
            }

            let entry = ByteReader::new(value.slice(offset, record_length as usize)?);
            let name_length = entry.u8_at(6)? as usize;
            let name_offset = entry.u8_at(7)? as usize;
            let name = if name_length > 0 {
                match entry.utf16_at(name_offset, name_length, MAX_FILENAME_LENGTH) {
                    Ok(name) => Some(name),
                    Err(e) => {
                        ctx.warn(format_args!("attribute list entry name: {}", e));
                        None
                    }
                }
            } else {
                None
            };

            let reference = FileReference(entry.u64_at(16)?);
            ctx.report("attribute list reference", &validate_file_reference(reference));

            entries.push(AttributeListEntry {
                attribute_type: entry.u32_at(0)?,
                record_length,
                name,
                starting_vcn: entry.u64_at(8)?,
                reference,
                attribute_id: entry.u16_at(24).ok(),
            });

            offset += record_length as usize;
        }

        Ok(Self {
            non_resident: false,
            entries,
        })
    }

    /// Compact one-line rendering used by the CSV exporter
    pub fn summary(&self) -> String {
        if self.non_resident {
            return "Non-resident".to_string();
        }
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "{}@{}/vcn{}",
                    attribute_type_name(e.attribute_type),
                    e.reference.record_number(),
                    e.starting_vcn
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
