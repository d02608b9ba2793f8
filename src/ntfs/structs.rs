//! NTFS on-disk structures and constants

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::Cursor;

// ============================================================================
// NTFS Constants
// ============================================================================

/// MFT record signature "FILE"
pub const MFT_RECORD_SIGNATURE: u32 = 0x454C4946; // "FILE" in little-endian

/// Bad MFT record signature "BAAD"
pub const MFT_RECORD_BAD_SIGNATURE: u32 = 0x44414142; // "BAAD"

/// End of attributes marker
pub const ATTRIBUTE_END_MARKER: u32 = 0xFFFFFFFF;

/// MFT record size handled by the decoder
pub const MFT_RECORD_SIZE: usize = 1024;

/// Standard sector size
pub const SECTOR_SIZE: usize = 512;

/// Size of the fixed record header, including the embedded record number
pub const RECORD_HEADER_SIZE: usize = 48;

/// Smallest legal first-attribute offset; also the fallback when the header lies
pub const MIN_FIRST_ATTRIBUTE_OFFSET: usize = 56;

/// Record number of the root directory
pub const ROOT_RECORD_NUMBER: u64 = 5;

/// Hard cap on attributes walked per record
pub const MAX_ATTRIBUTES_PER_RECORD: usize = 100;

/// Hard cap on attribute list entries walked per attribute
pub const MAX_ATTRIBUTE_LIST_ENTRIES: usize = 1000;

/// Hop budget for parent-chain walks
pub const MAX_PATH_DEPTH: usize = 255;

/// Longest file name, in UTF-16 code units
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Longest volume label, in UTF-16 code units
pub const MAX_VOLUME_NAME_LENGTH: usize = 128;

/// Mask applied to file references to extract the record number
pub const FILE_REFERENCE_MASK: u64 = 0x0000_FFFF_FFFF_FFFF;

// MFT Record Flags
pub const MFT_RECORD_IN_USE: u16 = 0x0001;
pub const MFT_RECORD_IS_DIRECTORY: u16 = 0x0002;
pub const MFT_RECORD_IS_EXTENSION: u16 = 0x0004;
pub const MFT_RECORD_HAS_SPECIAL_INDEX: u16 = 0x0008;

// ============================================================================
// Attribute Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u32)]
pub enum AttributeType {
    StandardInformation = 0x10,
    AttributeList = 0x20,
    FileName = 0x30,
    ObjectId = 0x40,
    SecurityDescriptor = 0x50,
    VolumeName = 0x60,
    VolumeInformation = 0x70,
    Data = 0x80,
    IndexRoot = 0x90,
    IndexAllocation = 0xA0,
    Bitmap = 0xB0,
    ReparsePoint = 0xC0,
    EaInformation = 0xD0,
    Ea = 0xE0,
    LoggedUtilityStream = 0x100,
}

impl AttributeType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0x10 => Some(Self::StandardInformation),
            0x20 => Some(Self::AttributeList),
            0x30 => Some(Self::FileName),
            0x40 => Some(Self::ObjectId),
            0x50 => Some(Self::SecurityDescriptor),
            0x60 => Some(Self::VolumeName),
            0x70 => Some(Self::VolumeInformation),
            0x80 => Some(Self::Data),
            0x90 => Some(Self::IndexRoot),
            0xA0 => Some(Self::IndexAllocation),
            0xB0 => Some(Self::Bitmap),
            0xC0 => Some(Self::ReparsePoint),
            0xD0 => Some(Self::EaInformation),
            0xE0 => Some(Self::Ea),
            0x100 => Some(Self::LoggedUtilityStream),
            _ => None,
        }
    }

    /// On-disk type code
    pub fn code(self) -> u32 {
        self as u32
    }

    /// The `$NAME` used by NTFS tooling
    pub fn name(self) -> &'static str {
        match self {
            Self::StandardInformation => "$STANDARD_INFORMATION",
            Self::AttributeList => "$ATTRIBUTE_LIST",
            Self::FileName => "$FILE_NAME",
            Self::ObjectId => "$OBJECT_ID",
            Self::SecurityDescriptor => "$SECURITY_DESCRIPTOR",
            Self::VolumeName => "$VOLUME_NAME",
            Self::VolumeInformation => "$VOLUME_INFORMATION",
            Self::Data => "$DATA",
            Self::IndexRoot => "$INDEX_ROOT",
            Self::IndexAllocation => "$INDEX_ALLOCATION",
            Self::Bitmap => "$BITMAP",
            Self::ReparsePoint => "$REPARSE_POINT",
            Self::EaInformation => "$EA_INFORMATION",
            Self::Ea => "$EA",
            Self::LoggedUtilityStream => "$LOGGED_UTILITY_STREAM",
        }
    }
}

/// Name for any type code, including ones outside the known set
pub fn attribute_type_name(code: u32) -> String {
    match AttributeType::from_u32(code) {
        Some(t) => t.name().to_string(),
        None => format!("UNKNOWN(0x{:X})", code),
    }
}

// ============================================================================
// Filename Namespace
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilenameNamespace {
    Posix,
    Win32,
    Dos,
    Win32AndDos,
    Unknown(u8),
}

impl FilenameNamespace {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Posix,
            1 => Self::Win32,
            2 => Self::Dos,
            3 => Self::Win32AndDos,
            other => Self::Unknown(other),
        }
    }

    /// Rank used to pick the primary name; higher wins
    pub fn preference(&self) -> u8 {
        match self {
            Self::Win32 => 4,
            Self::Win32AndDos => 3,
            Self::Posix => 2,
            Self::Dos => 1,
            Self::Unknown(_) => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posix => "POSIX",
            Self::Win32 => "WIN32",
            Self::Dos => "DOS",
            Self::Win32AndDos => "WIN32_AND_DOS",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

// ============================================================================
// File Reference
// ============================================================================

/// 48-bit record number plus 16-bit sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileReference(pub u64);

impl FileReference {
    pub fn record_number(&self) -> u64 {
        self.0 & FILE_REFERENCE_MASK
    }

    pub fn sequence_number(&self) -> u16 {
        (self.0 >> 48) as u16
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.record_number(), self.sequence_number())
    }
}

impl Serialize for FileReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("FileReference", 2)?;
        s.serialize_field("record_number", &self.record_number())?;
        s.serialize_field("sequence_number", &self.sequence_number())?;
        s.end()
    }
}

// ============================================================================
// Windows Timestamps
// ============================================================================

/// Seconds between 1601-01-01 and 1970-01-01
pub const WINDOWS_TO_UNIX_EPOCH_SECS: i64 = 11_644_473_600;

/// 100ns ticks per second
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Text used for a zero timestamp
pub const UNSET_TIMESTAMP: &str = "Not defined";

/// A FILETIME: 100ns ticks since 1601-01-01 UTC. Zero means "not set".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct WindowsTime(pub u64);

impl WindowsTime {
    pub fn from_parts(low: u32, high: u32) -> Self {
        Self(((high as u64) << 32) | low as u64)
    }

    pub fn ticks(&self) -> u64 {
        self.0
    }

    pub fn is_set(&self) -> bool {
        self.0 != 0
    }

    /// Unix seconds, or `None` for the unset sentinel
    pub fn to_unix_seconds(&self) -> Option<i64> {
        if !self.is_set() {
            return None;
        }
        Some((self.0 / TICKS_PER_SECOND) as i64 - WINDOWS_TO_UNIX_EPOCH_SECS)
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.to_unix_seconds()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

impl fmt::Display for WindowsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_set() {
            return f.write_str(UNSET_TIMESTAMP);
        }
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            None => write!(f, "Invalid timestamp ({})", self.0),
        }
    }
}

impl Serialize for WindowsTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// GUID
// ============================================================================

/// 16 raw bytes in on-disk (mixed-endian) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid(pub [u8; 16]);

impl Guid {
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let bytes: [u8; 16] = data.get(..16)?.try_into().ok()?;
        Some(Self(bytes))
    }

    pub fn is_nil(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            b[3], b[2], b[1], b[0],
            b[5], b[4],
            b[7], b[6],
            b[8], b[9],
            b[10], b[11], b[12], b[13], b[14], b[15]
        )
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// MFT Record Header
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RecordHeader {
    pub signature: u32,
    pub update_sequence_offset: u16,
    pub update_sequence_count: u16,
    pub log_sequence_number: u64,
    pub sequence_number: u16,
    pub hard_link_count: u16,
    pub first_attribute_offset: u16,
    pub flags: u16,
    pub used_size: u32,
    pub allocated_size: u32,
    pub base_reference: FileReference,
    pub next_attribute_id: u16,
    pub record_number: u32,
}

impl RecordHeader {
    /// Parse the fixed record header from raw bytes
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < RECORD_HEADER_SIZE {
            return None;
        }

        let mut cursor = Cursor::new(data);

        let signature = cursor.read_u32::<LittleEndian>().ok()?;
        let update_sequence_offset = cursor.read_u16::<LittleEndian>().ok()?;
        let update_sequence_count = cursor.read_u16::<LittleEndian>().ok()?;
        let log_sequence_number = cursor.read_u64::<LittleEndian>().ok()?;
        let sequence_number = cursor.read_u16::<LittleEndian>().ok()?;
        let hard_link_count = cursor.read_u16::<LittleEndian>().ok()?;
        let first_attribute_offset = cursor.read_u16::<LittleEndian>().ok()?;
        let flags = cursor.read_u16::<LittleEndian>().ok()?;
        let used_size = cursor.read_u32::<LittleEndian>().ok()?;
        let allocated_size = cursor.read_u32::<LittleEndian>().ok()?;
        let base_reference = FileReference(cursor.read_u64::<LittleEndian>().ok()?);
        let next_attribute_id = cursor.read_u16::<LittleEndian>().ok()?;
        let _padding = cursor.read_u16::<LittleEndian>().ok()?;
        let record_number = cursor.read_u32::<LittleEndian>().ok()?;

        Some(Self {
            signature,
            update_sequence_offset,
            update_sequence_count,
            log_sequence_number,
            sequence_number,
            hard_link_count,
            first_attribute_offset,
            flags,
            used_size,
            allocated_size,
            base_reference,
            next_attribute_id,
            record_number,
        })
    }

    /// Check the "FILE" magic
    pub fn is_valid(&self) -> bool {
        self.signature == MFT_RECORD_SIGNATURE
    }

    /// Torn multi-sector write detected by chkdsk
    pub fn is_bad(&self) -> bool {
        self.signature == MFT_RECORD_BAD_SIGNATURE
    }

    pub fn is_in_use(&self) -> bool {
        (self.flags & MFT_RECORD_IN_USE) != 0
    }

    pub fn is_directory(&self) -> bool {
        (self.flags & MFT_RECORD_IS_DIRECTORY) != 0
    }

    pub fn is_extension(&self) -> bool {
        (self.flags & MFT_RECORD_IS_EXTENSION) != 0
    }

    pub fn has_special_index(&self) -> bool {
        (self.flags & MFT_RECORD_HAS_SPECIAL_INDEX) != 0
    }

    /// Check if this is a base record (not an extension)
    pub fn is_base_record(&self) -> bool {
        self.base_reference.is_zero()
    }

    /// Label used by the exporters
    pub fn file_type(&self) -> &'static str {
        if self.is_directory() {
            "Directory"
        } else if self.is_extension() {
            "Extension"
        } else if self.has_special_index() {
            "Special Index"
        } else {
            "File"
        }
    }
}

// ============================================================================
// File Attributes
// ============================================================================

pub mod file_attributes {
    pub const READONLY: u32 = 0x00000001;
    pub const HIDDEN: u32 = 0x00000002;
    pub const SYSTEM: u32 = 0x00000004;
    pub const DIRECTORY: u32 = 0x00000010;
    pub const ARCHIVE: u32 = 0x00000020;
    pub const DEVICE: u32 = 0x00000040;
    pub const NORMAL: u32 = 0x00000080;
    pub const TEMPORARY: u32 = 0x00000100;
    pub const SPARSE_FILE: u32 = 0x00000200;
    pub const REPARSE_POINT: u32 = 0x00000400;
    pub const COMPRESSED: u32 = 0x00000800;
    pub const OFFLINE: u32 = 0x00001000;
    pub const NOT_CONTENT_INDEXED: u32 = 0x00002000;
    pub const ENCRYPTED: u32 = 0x00004000;

    /// Bits a `$STANDARD_INFORMATION` is expected to carry
    pub const KNOWN_MASK: u32 = 0x7FF7;

    const NAMES: &[(u32, &str)] = &[
        (READONLY, "READONLY"),
        (HIDDEN, "HIDDEN"),
        (SYSTEM, "SYSTEM"),
        (DIRECTORY, "DIRECTORY"),
        (ARCHIVE, "ARCHIVE"),
        (DEVICE, "DEVICE"),
        (NORMAL, "NORMAL"),
        (TEMPORARY, "TEMPORARY"),
        (SPARSE_FILE, "SPARSE_FILE"),
        (REPARSE_POINT, "REPARSE_POINT"),
        (COMPRESSED, "COMPRESSED"),
        (OFFLINE, "OFFLINE"),
        (NOT_CONTENT_INDEXED, "NOT_CONTENT_INDEXED"),
        (ENCRYPTED, "ENCRYPTED"),
    ];

    /// Names of the set bits, lowest first
    pub fn describe(flags: u32) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(bit, _)| flags & bit != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_reference_split() {
        let reference = FileReference(0x0003_0000_0000_0005);
        assert_eq!(reference.record_number(), 5);
        assert_eq!(reference.sequence_number(), 3);
        assert_eq!(reference.to_string(), "5-3");
    }

    #[test]
    fn test_base_and_extension_records() {
        let mut header = RecordHeader::default();
        assert!(header.is_base_record());
        header.base_reference = FileReference(0x0001_0000_0000_0024);
        assert!(!header.is_base_record());
    }

    #[test]
    fn test_unset_timestamp() {
        let t = WindowsTime::from_parts(0, 0);
        assert_eq!(t.to_unix_seconds(), None);
        assert_eq!(t.to_string(), "Not defined");
    }

    #[test]
    fn test_timestamp_conversion() {
        // 2020-01-01T00:00:00Z
        let t = WindowsTime(132_223_104_000_000_000);
        assert_eq!(t.to_unix_seconds(), Some(1_577_836_800));
        assert_eq!(t.to_string(), "2020-01-01T00:00:00Z");

        let split = WindowsTime::from_parts(t.0 as u32, (t.0 >> 32) as u32);
        assert_eq!(split, t);
    }

    #[test]
    fn test_timestamp_monotonic() {
        let mut last = i64::MIN;
        let mut ticks = 1u64;
        while ticks < u64::MAX / 3 {
            let secs = WindowsTime(ticks).to_unix_seconds().unwrap();
            assert!(secs >= last);
            last = secs;
            ticks = ticks.saturating_mul(3).saturating_add(7);
        }
    }

    #[test]
    fn test_guid_format() {
        let guid = Guid([
            0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD,
            0xEE, 0xFF,
        ]);
        assert_eq!(guid.to_string(), "00112233-4455-6677-8899-AABBCCDDEEFF");
    }

    #[test]
    fn test_guid_shape_is_total() {
        for seed in 0u8..=255 {
            let bytes: [u8; 16] = std::array::from_fn(|i| seed.wrapping_mul(i as u8 + 1));
            let text = Guid(bytes).to_string();
            let groups: Vec<usize> = text.split('-').map(str::len).collect();
            assert_eq!(groups, vec![8, 4, 4, 4, 12]);
            assert!(text.chars().all(|c| c == '-' || c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_guid_from_short_slice() {
        assert!(Guid::from_slice(&[0u8; 15]).is_none());
        assert!(Guid::from_slice(&[0u8; 16]).unwrap().is_nil());
    }

    #[test]
    fn test_header_parse() {
        let mut data = vec![0u8; 64];
        data[0..4].copy_from_slice(b"FILE");
        data[22..24].copy_from_slice(&(MFT_RECORD_IN_USE | MFT_RECORD_IS_DIRECTORY).to_le_bytes());
        data[44..48].copy_from_slice(&42u32.to_le_bytes());

        let header = RecordHeader::from_bytes(&data).unwrap();
        assert!(header.is_valid());
        assert!(header.is_in_use());
        assert_eq!(header.file_type(), "Directory");
        assert_eq!(header.record_number, 42);
        assert!(RecordHeader::from_bytes(&data[..47]).is_none());
    }

    #[test]
    fn test_attribute_type_names() {
        assert_eq!(AttributeType::from_u32(0x80), Some(AttributeType::Data));
        assert_eq!(AttributeType::Data.code(), 0x80);
        assert_eq!(attribute_type_name(0x100), "$LOGGED_UTILITY_STREAM");
        assert_eq!(attribute_type_name(0x1234), "UNKNOWN(0x1234)");
    }

    #[test]
    fn test_describe_file_attributes() {
        let names = file_attributes::describe(file_attributes::HIDDEN | file_attributes::ARCHIVE);
        assert_eq!(names, vec!["HIDDEN", "ARCHIVE"]);
    }
}
