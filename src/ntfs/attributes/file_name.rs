//! `$FILE_NAME` (0x30)

use super::{resident_value, TimestampSet};
use crate::error::{AttrResult, AttributeError};
use crate::ntfs::attribute::AttributeHeader;
use crate::ntfs::bounds::ByteReader;
use crate::ntfs::structs::{FileReference, FilenameNamespace, MAX_FILENAME_LENGTH};
use crate::ntfs::validation::{validate_file_reference, validate_filename, DecodeContext};
use serde::Serialize;

/// Fixed part before the name
pub const FILE_NAME_MIN_SIZE: usize = 66;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileName {
    pub parent: FileReference,
    pub times: TimestampSet,
    pub allocated_size: u64,
    pub real_size: u64,
    pub flags: u32,
    pub reparse_value: u32,
    pub namespace: FilenameNamespace,
    pub name: String,
}

impl FileName {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        let value = resident_value(reader, header, "$FILE_NAME", FILE_NAME_MIN_SIZE)?;
        Self::from_value(&value, ctx)
    }

    /// Decode a `$FILE_NAME` body. Index entries embed the same structure
    /// as their key, so this is shared with the index decoders.
    pub fn from_value(value: &ByteReader<'_>, ctx: &DecodeContext) -> AttrResult<Self> {
        value.check(0, FILE_NAME_MIN_SIZE)?;

        let parent = FileReference(value.u64_at(0)?);
        ctx.report("FN parent reference", &validate_file_reference(parent));

        let times = TimestampSet::read(value, 8, ctx, "FN")?;
        let allocated_size = value.u64_at(40)?;
        let real_size = value.u64_at(48)?;
        if real_size > allocated_size {
            ctx.warn(format_args!(
                "FN real size {} exceeds allocated size {}",
                real_size, allocated_size
            ));
        }
        let flags = value.u32_at(56)?;
        let reparse_value = value.u32_at(60)?;
        let name_length = value.u8_at(64)? as usize;
        let namespace = FilenameNamespace::from_u8(value.u8_at(65)?);

        if name_length == 0 {
            return Err(AttributeError::Malformed("zero-length file name".into()));
        }
        if let FilenameNamespace::Unknown(raw) = namespace {
            ctx.warn(format_args!("unknown file name namespace {}", raw));
        }

        let name = value.utf16_at(FILE_NAME_MIN_SIZE, name_length, MAX_FILENAME_LENGTH)?;
        ctx.report("FN name", &validate_filename(&name));

        Ok(Self {
            parent,
            times,
            allocated_size,
            real_size,
            flags,
            reparse_value,
            namespace,
            name,
        })
    }

    pub fn parent_record_number(&self) -> u64 {
        self.parent.record_number()
    }
}

#[cfg(test)]
pub(crate) fn file_name_value(name: &str, parent: u64, namespace: u8) -> Vec<u8> {
    let units: Vec<u16> = name.encode_utf16().collect();
    let mut value = vec![0u8; FILE_NAME_MIN_SIZE + units.len() * 2];
    value[0..8].copy_from_slice(&parent.to_le_bytes());
    value[40..48].copy_from_slice(&4096u64.to_le_bytes());
    value[48..56].copy_from_slice(&1234u64.to_le_bytes());
    value[64] = units.len() as u8;
    value[65] = namespace;
    for (i, unit) in units.iter().enumerate() {
        value[66 + i * 2..68 + i * 2].copy_from_slice(&unit.to_le_bytes());
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ntfs::attribute::test_support::resident;

    fn decode_value(value: &[u8]) -> AttrResult<FileName> {
        let attr = resident(0x30, None, value);
        let reader = ByteReader::new(&attr);
        let ctx = DecodeContext::default();
        let header = AttributeHeader::decode(&reader, 0, &ctx).unwrap().unwrap();
        FileName::decode(&reader, &header, &ctx)
    }

    #[test]
    fn test_decode_name() {
        let fname = decode_value(&file_name_value("test.txt", 0x0001_0000_0000_0005, 1)).unwrap();
        assert_eq!(fname.name, "test.txt");
        assert_eq!(fname.parent_record_number(), 5);
        assert_eq!(fname.parent.sequence_number(), 1);
        assert_eq!(fname.namespace, FilenameNamespace::Win32);
        assert_eq!(fname.allocated_size, 4096);
        assert_eq!(fname.real_size, 1234);
    }

    #[test]
    fn test_unicode_name() {
        let fname = decode_value(&file_name_value("résumé 😀.pdf", 5, 0)).unwrap();
        assert_eq!(fname.name, "résumé 😀.pdf");
        assert_eq!(fname.namespace, FilenameNamespace::Posix);
    }

    #[test]
    fn test_zero_length_name_rejected() {
        let mut value = file_name_value("a", 5, 1);
        value[64] = 0;
        assert!(matches!(decode_value(&value), Err(AttributeError::Malformed(_))));
    }

    #[test]
    fn test_name_overrunning_value_rejected() {
        let mut value = file_name_value("abc", 5, 1);
        value[64] = 40;
        assert!(matches!(decode_value(&value), Err(AttributeError::OutOfBounds { .. })));
    }

    #[test]
    fn test_illegal_characters_still_decode() {
        let fname = decode_value(&file_name_value("a|b?", 5, 0)).unwrap();
        assert_eq!(fname.name, "a|b?");
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            decode_value(&[0u8; 60]),
            Err(AttributeError::TooShort { need: 66, .. })
        ));
    }
}
