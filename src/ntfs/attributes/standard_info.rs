//! `$STANDARD_INFORMATION` (0x10)

use super::{resident_value, TimestampSet};
use crate::error::AttrResult;
use crate::ntfs::attribute::AttributeHeader;
use crate::ntfs::bounds::ByteReader;
use crate::ntfs::structs::file_attributes;
use crate::ntfs::validation::DecodeContext;
use serde::Serialize;

/// Minimum size (NTFS 1.2 layout)
pub const STANDARD_INFORMATION_MIN_SIZE: usize = 48;

/// Size once the NTFS 3.0 owner/security/quota/USN fields are present
pub const STANDARD_INFORMATION_V3_SIZE: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StandardInformation {
    pub times: TimestampSet,
    pub file_attributes: u32,
    pub max_versions: u32,
    pub version_number: u32,
    pub class_id: u32,
    pub owner_id: Option<u32>,
    pub security_id: Option<u32>,
    pub quota_charged: Option<u64>,
    pub usn: Option<u64>,
}

impl StandardInformation {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        let value = resident_value(reader, header, "$STANDARD_INFORMATION", STANDARD_INFORMATION_MIN_SIZE)?;

        let times = TimestampSet::read(&value, 0, ctx, "SI")?;
        let file_attributes = value.u32_at(32)?;

        let unknown = file_attributes & !file_attributes::KNOWN_MASK;
        if unknown != 0 {
            ctx.warn(format_args!("unknown file attribute bits 0x{:08X}", unknown));
        }

        let mut info = Self {
            times,
            file_attributes,
            max_versions: value.u32_at(36)?,
            version_number: value.u32_at(40)?,
            class_id: value.u32_at(44)?,
            ..Default::default()
        };

        // Extended fields (NTFS 3.0+)
        if value.len() >= STANDARD_INFORMATION_V3_SIZE {
            info.owner_id = Some(value.u32_at(48)?);
            info.security_id = Some(value.u32_at(52)?);
            info.quota_charged = Some(value.u64_at(56)?);
            info.usn = Some(value.u64_at(64)?);
        }

        Ok(info)
    }

    pub fn attribute_names(&self) -> Vec<&'static str> {
        file_attributes::describe(self.file_attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttributeError;
    use crate::ntfs::attribute::test_support::{non_resident, resident};
    use crate::ntfs::structs::WindowsTime;

    fn decode_value(value: &[u8]) -> AttrResult<StandardInformation> {
        let attr = resident(0x10, None, value);
        let reader = ByteReader::new(&attr);
        let ctx = DecodeContext::default();
        let header = AttributeHeader::decode(&reader, 0, &ctx).unwrap().unwrap();
        StandardInformation::decode(&reader, &header, &ctx)
    }

    #[test]
    fn test_v1_layout() {
        let mut value = vec![0u8; 48];
        value[0..8].copy_from_slice(&132_223_104_000_000_000u64.to_le_bytes());
        value[32..36].copy_from_slice(&(file_attributes::HIDDEN | file_attributes::ARCHIVE).to_le_bytes());

        let info = decode_value(&value).unwrap();
        assert_eq!(info.times.creation, WindowsTime(132_223_104_000_000_000));
        assert_eq!(info.times.access, WindowsTime(0));
        assert_eq!(info.attribute_names(), vec!["HIDDEN", "ARCHIVE"]);
        assert_eq!(info.usn, None);
    }

    #[test]
    fn test_v3_layout() {
        let mut value = vec![0u8; 72];
        value[52..56].copy_from_slice(&0x105u32.to_le_bytes());
        value[64..72].copy_from_slice(&0xDEAD_BEEFu64.to_le_bytes());

        let info = decode_value(&value).unwrap();
        assert_eq!(info.security_id, Some(0x105));
        assert_eq!(info.usn, Some(0xDEAD_BEEF));
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            decode_value(&[0u8; 40]),
            Err(AttributeError::TooShort { need: 48, got: 40, .. })
        ));
    }

    #[test]
    fn test_non_resident_rejected() {
        let attr = non_resident(0x10, 0, 48, &[]);
        let reader = ByteReader::new(&attr);
        let ctx = DecodeContext::default();
        let header = AttributeHeader::decode(&reader, 0, &ctx).unwrap().unwrap();
        assert_eq!(
            StandardInformation::decode(&reader, &header, &ctx),
            Err(AttributeError::NotResident("$STANDARD_INFORMATION"))
        );
    }
}
