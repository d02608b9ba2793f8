//! Per-type attribute decoders
//!
//! Each decoder is a pure function over the record bytes and an already
//! validated [`AttributeHeader`]. [`decode`] is the single dispatch point and
//! returns an [`Attribute`] tagged by type.

pub mod attribute_list;
pub mod bitmap;
pub mod data;
pub mod ea;
pub mod file_name;
pub mod index;
pub mod object_id;
pub mod reparse;
pub mod security;
pub mod standard_info;
pub mod volume;

pub use attribute_list::{AttributeList, AttributeListEntry};
pub use bitmap::Bitmap;
pub use data::{DataAttribute, DataContent, LoggedUtilityStream};
pub use ea::{EaEntry, EaInformation, ExtendedAttributes};
pub use file_name::FileName;
pub use index::{CollationRule, IndexAllocation, IndexEntry, IndexRoot};
pub use object_id::ObjectId;
pub use reparse::{ReparsePoint, ReparseTag};
pub use security::{Ace, Acl, SecurityDescriptor};
pub use standard_info::StandardInformation;
pub use volume::{VolumeInformation, VolumeName};

use super::attribute::AttributeHeader;
use super::bounds::ByteReader;
use super::structs::{AttributeType, WindowsTime};
use super::validation::{validate_timestamp, DecodeContext};
use crate::error::{AttrResult, AttributeError};
use serde::Serialize;

/// A decoded attribute payload, one variant per known type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Attribute {
    StandardInformation(StandardInformation),
    AttributeList(AttributeList),
    FileName(FileName),
    ObjectId(ObjectId),
    SecurityDescriptor(SecurityDescriptor),
    VolumeName(VolumeName),
    VolumeInformation(VolumeInformation),
    Data(DataAttribute),
    IndexRoot(IndexRoot),
    IndexAllocation(IndexAllocation),
    Bitmap(Bitmap),
    ReparsePoint(ReparsePoint),
    EaInformation(EaInformation),
    Ea(ExtendedAttributes),
    LoggedUtilityStream(LoggedUtilityStream),
}

impl Attribute {
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::StandardInformation(_) => AttributeType::StandardInformation,
            Self::AttributeList(_) => AttributeType::AttributeList,
            Self::FileName(_) => AttributeType::FileName,
            Self::ObjectId(_) => AttributeType::ObjectId,
            Self::SecurityDescriptor(_) => AttributeType::SecurityDescriptor,
            Self::VolumeName(_) => AttributeType::VolumeName,
            Self::VolumeInformation(_) => AttributeType::VolumeInformation,
            Self::Data(_) => AttributeType::Data,
            Self::IndexRoot(_) => AttributeType::IndexRoot,
            Self::IndexAllocation(_) => AttributeType::IndexAllocation,
            Self::Bitmap(_) => AttributeType::Bitmap,
            Self::ReparsePoint(_) => AttributeType::ReparsePoint,
            Self::EaInformation(_) => AttributeType::EaInformation,
            Self::Ea(_) => AttributeType::Ea,
            Self::LoggedUtilityStream(_) => AttributeType::LoggedUtilityStream,
        }
    }
}

/// Decode the attribute described by `header`
pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Attribute> {
    let attribute_type = AttributeType::from_u32(header.type_code).ok_or_else(|| {
        AttributeError::Malformed(format!("unknown attribute type 0x{:X}", header.type_code))
    })?;

    let attribute = match attribute_type {
        AttributeType::StandardInformation => {
            Attribute::StandardInformation(StandardInformation::decode(reader, header, ctx)?)
        }
        AttributeType::AttributeList => Attribute::AttributeList(AttributeList::decode(reader, header, ctx)?),
        AttributeType::FileName => Attribute::FileName(FileName::decode(reader, header, ctx)?),
        AttributeType::ObjectId => Attribute::ObjectId(ObjectId::decode(reader, header, ctx)?),
        AttributeType::SecurityDescriptor => {
            Attribute::SecurityDescriptor(SecurityDescriptor::decode(reader, header, ctx)?)
        }
        AttributeType::VolumeName => Attribute::VolumeName(VolumeName::decode(reader, header, ctx)?),
        AttributeType::VolumeInformation => {
            Attribute::VolumeInformation(VolumeInformation::decode(reader, header, ctx)?)
        }
        AttributeType::Data => Attribute::Data(DataAttribute::decode(reader, header, ctx)?),
        AttributeType::IndexRoot => Attribute::IndexRoot(IndexRoot::decode(reader, header, ctx)?),
        AttributeType::IndexAllocation => {
            Attribute::IndexAllocation(IndexAllocation::decode(reader, header, ctx)?)
        }
        AttributeType::Bitmap => Attribute::Bitmap(Bitmap::decode(reader, header, ctx)?),
        AttributeType::ReparsePoint => Attribute::ReparsePoint(ReparsePoint::decode(reader, header, ctx)?),
        AttributeType::EaInformation => Attribute::EaInformation(EaInformation::decode(reader, header, ctx)?),
        AttributeType::Ea => Attribute::Ea(ExtendedAttributes::decode(reader, header, ctx)?),
        AttributeType::LoggedUtilityStream => {
            Attribute::LoggedUtilityStream(LoggedUtilityStream::decode(reader, header, ctx)?)
        }
    };

    Ok(attribute)
}

/// Resident value reader with a minimum length check
pub(crate) fn resident_value<'a>(
    reader: &ByteReader<'a>,
    header: &AttributeHeader,
    what: &'static str,
    min_len: usize,
) -> AttrResult<ByteReader<'a>> {
    let value = header.value_reader(reader, what)?;
    if value.len() < min_len {
        return Err(AttributeError::TooShort {
            what,
            need: min_len,
            got: value.len(),
        });
    }
    Ok(value)
}

/// The four MACE timestamps shared by `$STANDARD_INFORMATION` and `$FILE_NAME`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimestampSet {
    pub creation: WindowsTime,
    pub modification: WindowsTime,
    /// MFT entry change time
    pub entry: WindowsTime,
    pub access: WindowsTime,
}

impl TimestampSet {
    /// Read creation, modification, entry change and access times, in that
    /// on-disk order, starting at `offset`
    pub(crate) fn read(reader: &ByteReader<'_>, offset: usize, ctx: &DecodeContext, what: &str) -> AttrResult<Self> {
        let read = |at: usize, label: &str| -> AttrResult<WindowsTime> {
            let time = WindowsTime(reader.u64_at(at)?);
            if ctx.debug_level > 0 {
                ctx.report(&format!("{} {} time", what, label), &validate_timestamp(time));
            }
            Ok(time)
        };

        Ok(Self {
            creation: read(offset, "creation")?,
            modification: read(offset + 8, "modification")?,
            entry: read(offset + 16, "entry")?,
            access: read(offset + 24, "access")?,
        })
    }
}
