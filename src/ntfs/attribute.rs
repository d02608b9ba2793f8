//! Common attribute header decoder
//!
//! Layout of the shared part (offsets relative to the attribute start):
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0x00 | 4 | type code |
//! | 0x04 | 4 | total length |
//! | 0x08 | 1 | non-resident flag |
//! | 0x09 | 1 | name length (UTF-16 units) |
//! | 0x0A | 2 | name offset |
//! | 0x0C | 2 | flags |
//! | 0x0E | 2 | attribute id |
//!
//! Resident attributes continue with value length (u32 at 0x10), value offset
//! (u16 at 0x14) and the indexed flag (u8 at 0x16). Non-resident attributes
//! carry a 48-byte block from 0x10 read by [`NonResidentHeader::decode`].

use super::bounds::ByteReader;
use super::structs::{ATTRIBUTE_END_MARKER, MAX_FILENAME_LENGTH};
use super::validation::{
    validate_attribute_length, validate_non_resident_sizes, validate_resident_value, DecodeContext,
};
use crate::error::{AttrResult, AttributeError};
use serde::Serialize;

pub const ATTRIBUTE_FLAG_COMPRESSED: u16 = 0x0001;
pub const ATTRIBUTE_FLAG_ENCRYPTED: u16 = 0x4000;
pub const ATTRIBUTE_FLAG_SPARSE: u16 = 0x8000;

/// Size of the non-resident block that follows the common header
pub const NON_RESIDENT_BLOCK_SIZE: usize = 48;

/// Value fields of a resident attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResidentValue {
    pub value_length: u32,
    pub value_offset: u16,
    pub indexed_flag: u8,
}

/// Run-list metadata of a non-resident attribute
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NonResidentHeader {
    pub start_vcn: u64,
    pub last_vcn: u64,
    pub data_runs_offset: u16,
    pub compression_unit: u16,
    pub allocated_size: u64,
    pub actual_size: u64,
    pub initialized_size: u64,
    /// Present only for compressed attributes
    pub compressed_size: Option<u64>,
}

impl NonResidentHeader {
    /// Decode the 48-byte block at `attr_offset + 0x10`.
    ///
    /// Bounds failures are errors. Inconsistent sizes are reported through
    /// `ctx` and the values are kept.
    pub fn decode(
        reader: &ByteReader<'_>,
        attr_offset: usize,
        attr_length: usize,
        ctx: &DecodeContext,
    ) -> AttrResult<Self> {
        let base = attr_offset + 0x10;
        if attr_length < 0x10 + NON_RESIDENT_BLOCK_SIZE {
            return Err(AttributeError::TooShort {
                what: "non-resident header",
                need: 0x10 + NON_RESIDENT_BLOCK_SIZE,
                got: attr_length,
            });
        }
        reader.check(base, NON_RESIDENT_BLOCK_SIZE)?;

        let start_vcn = reader.u64_at(base)?;
        let last_vcn = reader.u64_at(base + 8)?;
        let data_runs_offset = reader.u16_at(base + 16)?;
        let compression_unit = reader.u16_at(base + 18)?;
        // 4 bytes padding at base + 20
        let allocated_size = reader.u64_at(base + 24)?;
        let actual_size = reader.u64_at(base + 32)?;
        let initialized_size = reader.u64_at(base + 40)?;

        let compressed_size = if compression_unit != 0 && attr_length >= 0x48 {
            Some(reader.u64_at(base + 48)?)
        } else {
            None
        };

        if data_runs_offset as usize > attr_length {
            return Err(AttributeError::Malformed(format!(
                "data runs offset {} beyond attribute length {}",
                data_runs_offset, attr_length
            )));
        }

        ctx.report(
            "non-resident header",
            &validate_non_resident_sizes(start_vcn, last_vcn, allocated_size, actual_size, initialized_size),
        );

        Ok(Self {
            start_vcn,
            last_vcn,
            data_runs_offset,
            compression_unit,
            allocated_size,
            actual_size,
            initialized_size,
            compressed_size,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttributeForm {
    Resident(ResidentValue),
    NonResident(NonResidentHeader),
}

/// A validated attribute header, positioned within its record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeHeader {
    /// Offset of the attribute from the start of the record
    pub offset: usize,
    pub type_code: u32,
    pub length: u32,
    pub name_length: u8,
    pub name_offset: u16,
    pub flags: u16,
    pub attribute_id: u16,
    pub name: Option<String>,
    pub form: AttributeForm,
}

impl AttributeHeader {
    /// Decode the header at `offset`.
    ///
    /// Returns `Ok(None)` on the end-of-attributes marker.
    pub fn decode(reader: &ByteReader<'_>, offset: usize, ctx: &DecodeContext) -> AttrResult<Option<Self>> {
        let type_code = reader.u32_at(offset)?;
        if type_code == ATTRIBUTE_END_MARKER {
            return Ok(None);
        }

        let length = reader.u32_at(offset + 4)?;
        validate_attribute_length(reader, offset, length as usize).into_result()?;

        let non_resident = reader.u8_at(offset + 0x08)? != 0;
        let name_length = reader.u8_at(offset + 0x09)?;
        let name_offset = reader.u16_at(offset + 0x0A)?;
        let flags = reader.u16_at(offset + 0x0C)?;
        let attribute_id = reader.u16_at(offset + 0x0E)?;

        let form = if non_resident {
            AttributeForm::NonResident(NonResidentHeader::decode(reader, offset, length as usize, ctx)?)
        } else {
            let value_length = reader.u32_at(offset + 0x10)?;
            let value_offset = reader.u16_at(offset + 0x14)?;
            let indexed_flag = reader.u8_at(offset + 0x16)?;
            validate_resident_value(length as usize, value_offset as usize, value_length as usize)
                .into_result()?;
            AttributeForm::Resident(ResidentValue {
                value_length,
                value_offset,
                indexed_flag,
            })
        };

        let name = if name_length > 0 {
            let name_start = name_offset as usize;
            let name_end = name_start + name_length as usize * 2;
            if name_start >= length as usize || name_end > length as usize {
                return Err(AttributeError::Malformed(format!(
                    "attribute name at {} ({} units) outside attribute of length {}",
                    name_offset, name_length, length
                )));
            }
            Some(reader.utf16_at(offset + name_start, name_length as usize, MAX_FILENAME_LENGTH)?)
        } else {
            None
        };

        let header = Self {
            offset,
            type_code,
            length,
            name_length,
            name_offset,
            flags,
            attribute_id,
            name,
            form,
        };
        ctx.trace(format_args!(
            "attribute 0x{:X} at {} len {} {}",
            type_code,
            offset,
            length,
            if header.is_resident() { "resident" } else { "non-resident" }
        ));
        Ok(Some(header))
    }

    pub fn is_resident(&self) -> bool {
        matches!(self.form, AttributeForm::Resident(_))
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & ATTRIBUTE_FLAG_COMPRESSED != 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & ATTRIBUTE_FLAG_ENCRYPTED != 0
    }

    pub fn is_sparse(&self) -> bool {
        self.flags & ATTRIBUTE_FLAG_SPARSE != 0
    }

    /// Resident value fields, or an error naming `what`
    pub fn resident(&self, what: &'static str) -> AttrResult<&ResidentValue> {
        match self.form {
            AttributeForm::Resident(ref value) => Ok(value),
            AttributeForm::NonResident(_) => Err(AttributeError::NotResident(what)),
        }
    }

    /// Non-resident header, or an error naming `what`
    pub fn non_resident(&self, what: &'static str) -> AttrResult<&NonResidentHeader> {
        match self.form {
            AttributeForm::NonResident(ref header) => Ok(header),
            AttributeForm::Resident(_) => Err(AttributeError::NotNonResident(what)),
        }
    }

    /// Absolute offset of a resident value within the record
    pub fn value_start(&self) -> Option<usize> {
        match self.form {
            AttributeForm::Resident(ref value) => Some(self.offset + value.value_offset as usize),
            AttributeForm::NonResident(_) => None,
        }
    }

    /// Reader over the resident value bytes only
    pub fn value_reader<'a>(&self, reader: &ByteReader<'a>, what: &'static str) -> AttrResult<ByteReader<'a>> {
        let value = self.resident(what)?;
        reader.sub(
            self.offset + value.value_offset as usize,
            value.value_length as usize,
        )
    }

    /// Reader over the encoded run list of a non-resident attribute
    pub fn runs_reader<'a>(&self, reader: &ByteReader<'a>, what: &'static str) -> AttrResult<ByteReader<'a>> {
        let header = self.non_resident(what)?;
        let start = header.data_runs_offset as usize;
        let len = (self.length as usize).saturating_sub(start);
        reader.sub(self.offset + start, len)
    }
}
