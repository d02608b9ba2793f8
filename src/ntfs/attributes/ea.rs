//! `$EA_INFORMATION` (0xD0) and `$EA` (0xE0)

use crate::error::{AttrResult, AttributeError};
use crate::ntfs::attribute::{AttributeForm, AttributeHeader};
use crate::ntfs::bounds::ByteReader;
use crate::ntfs::validation::DecodeContext;
use serde::Serialize;

pub const EA_INFORMATION_SIZE: usize = 8;

/// next entry offset (4), flags (1), name length (1), value length (2)
pub const EA_ENTRY_HEADER_SIZE: usize = 8;

pub const EA_FLAG_NEED_EA: u8 = 0x80;

/// Upper bound on entries walked in one `$EA`
const MAX_EA_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EaInformation {
    /// Size of the packed EAs
    pub packed_size: u16,
    /// Number of EAs flagged NEED_EA
    pub need_ea_count: u16,
    pub unpacked_size: u32,
}

impl EaInformation {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, _ctx: &DecodeContext) -> AttrResult<Self> {
        let value = header.value_reader(reader, "$EA_INFORMATION")?;
        if value.len() != EA_INFORMATION_SIZE {
            return Err(AttributeError::Malformed(format!(
                "$EA_INFORMATION must be {} bytes, got {}",
                EA_INFORMATION_SIZE,
                value.len()
            )));
        }

        Ok(Self {
            packed_size: value.u16_at(0)?,
            need_ea_count: value.u16_at(2)?,
            unpacked_size: value.u32_at(4)?,
        })
    }

    pub fn summary(&self) -> String {
        format!(
            "{} bytes packed, {} unpacked, {} required",
            self.packed_size, self.unpacked_size, self.need_ea_count
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EaEntry {
    pub flags: u8,
    pub name: String,
    pub value: Vec<u8>,
}

impl EaEntry {
    pub fn needs_ea(&self) -> bool {
        self.flags & EA_FLAG_NEED_EA != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedAttributes {
    pub resident: bool,
    pub size: u64,
    /// Only walked for resident `$EA`
    pub entries: Vec<EaEntry>,
}

impl ExtendedAttributes {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        let value = match header.form {
            AttributeForm::Resident(_) => header.value_reader(reader, "$EA")?,
            AttributeForm::NonResident(ref nr) => {
                return Ok(Self {
                    resident: false,
                    size: nr.actual_size,
                    entries: Vec::new(),
                })
            }
        };

        let mut entries = Vec::new();
        let mut pos = 0usize;

        while pos + EA_ENTRY_HEADER_SIZE <= value.len() && entries.len() < MAX_EA_ENTRIES {
            let next = value.u32_at(pos)? as usize;
            let flags = value.u8_at(pos + 4)?;
            let name_length = value.u8_at(pos + 5)? as usize;
            let value_length = value.u16_at(pos + 6)? as usize;

            let name_bytes = match value.slice(pos + EA_ENTRY_HEADER_SIZE, name_length) {
                Ok(bytes) => bytes,
                Err(e) => {
                    ctx.warn(format_args!("EA name at {}: {}", pos, e));
                    break;
                }
            };
            let name = String::from_utf8_lossy(name_bytes).into_owned();

            // Name is NUL terminated
            let value_start = pos + EA_ENTRY_HEADER_SIZE + name_length + 1;
            let data = match value.slice(value_start, value_length) {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    ctx.warn(format_args!("EA {:?} value: {}", name, e));
                    Vec::new()
                }
            };

            entries.push(EaEntry { flags, name, value: data });

            if next == 0 {
                break;
            }
            pos += next;
        }

        Ok(Self {
            resident: true,
            size: value.len() as u64,
            entries,
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn summary(&self) -> String {
        if self.resident {
            format!("{} entries: {}", self.entries.len(), self.names().join(", "))
        } else {
            format!("{} bytes (non-resident)", self.size)
        }
    }
}
