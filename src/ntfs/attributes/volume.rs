//! `$VOLUME_NAME` (0x60) and `$VOLUME_INFORMATION` (0x70)

use crate::error::{AttrResult, AttributeError};
use crate::ntfs::attribute::AttributeHeader;
use crate::ntfs::bounds::ByteReader;
use crate::ntfs::structs::MAX_VOLUME_NAME_LENGTH;
use crate::ntfs::validation::DecodeContext;
use serde::Serialize;

pub const VOLUME_INFORMATION_SIZE: usize = 12;

const VOLUME_FLAGS: &[(u16, &str)] = &[
    (0x0001, "DIRTY"),
    (0x0002, "RESIZE_LOG_FILE"),
    (0x0004, "UPGRADE_ON_MOUNT"),
    (0x0008, "MOUNTED_ON_NT4"),
    (0x0010, "DELETE_USN_UNDERWAY"),
    (0x0020, "REPAIR_OBJECT_ID"),
    (0x4000, "CHKDSK_UNDERWAY"),
    (0x8000, "MODIFIED_BY_CHKDSK"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeName {
    pub name: String,
}

impl VolumeName {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        let value = header.value_reader(reader, "$VOLUME_NAME")?;
        if value.is_empty() {
            return Ok(Self { name: String::new() });
        }
        if value.len() > MAX_VOLUME_NAME_LENGTH * 2 {
            return Err(AttributeError::Malformed(format!(
                "volume name of {} bytes exceeds {} characters",
                value.len(),
                MAX_VOLUME_NAME_LENGTH
            )));
        }
        if value.len() % 2 != 0 {
            ctx.warn(format_args!("volume name has odd byte length {}", value.len()));
        }

        let name = value.utf16_at(0, value.len() / 2, MAX_VOLUME_NAME_LENGTH)?;
        Ok(Self { name })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VolumeInformation {
    pub major_version: u8,
    pub minor_version: u8,
    pub flags: u16,
}

impl VolumeInformation {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        let value = header.value_reader(reader, "$VOLUME_INFORMATION")?;
        if value.len() != VOLUME_INFORMATION_SIZE {
            return Err(AttributeError::Malformed(format!(
                "$VOLUME_INFORMATION must be {} bytes, got {}",
                VOLUME_INFORMATION_SIZE,
                value.len()
            )));
        }

        // 8 reserved bytes first
        let info = Self {
            major_version: value.u8_at(8)?,
            minor_version: value.u8_at(9)?,
            flags: value.u16_at(10)?,
        };

        if !(1..=10).contains(&info.major_version) {
            ctx.warn(format_args!("unusual NTFS major version {}", info.major_version));
        }
        Ok(info)
    }

    pub fn version(&self) -> String {
        format!("{}.{}", self.major_version, self.minor_version)
    }

    pub fn flag_names(&self) -> Vec<&'static str> {
        VOLUME_FLAGS
            .iter()
            .filter(|(bit, _)| self.flags & bit != 0)
            .map(|(_, name)| *name)
            .collect()
    }

    pub fn summary(&self) -> String {
        let flags = self.flag_names();
        if flags.is_empty() {
            format!("NTFS {}", self.version())
        } else {
            format!("NTFS {} [{}]", self.version(), flags.join("|"))
        }
    }
}
