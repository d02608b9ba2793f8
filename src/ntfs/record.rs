//! MFT record decoding
//!
//! A record goes through four linear steps: size check, header read, fixup
//! repair and the attribute dispatch loop. Only the size check can fail the
//! whole record; everything after it degrades to flags and absent attributes.

use super::attribute::AttributeHeader;
use super::attributes::{
    self, Attribute, AttributeList, Bitmap, DataAttribute, EaInformation, ExtendedAttributes, FileName,
    IndexAllocation, IndexRoot, LoggedUtilityStream, ObjectId, ReparsePoint, SecurityDescriptor,
    StandardInformation, TimestampSet, VolumeInformation, VolumeName,
};
use super::bounds::ByteReader;
use super::structs::*;
use super::validation::{validate_record_number, DecodeContext, MIN_ATTRIBUTE_LENGTH};
use crate::error::{MftError, Result};
use crate::hashing::{self, RecordHashes};
use serde::Serialize;
use std::collections::BTreeSet;

// ============================================================================
// Raw record
// ============================================================================

/// One 1024-byte record exactly as read from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    bytes: Vec<u8>,
}

impl TryFrom<&[u8]> for RawRecord {
    type Error = MftError;

    /// Takes the first 1024 bytes; shorter buffers are rejected
    fn try_from(data: &[u8]) -> Result<Self> {
        if data.len() < MFT_RECORD_SIZE {
            return Err(MftError::BufferTooSmall {
                needed: MFT_RECORD_SIZE,
                got: data.len(),
            });
        }
        Ok(Self {
            bytes: data[..MFT_RECORD_SIZE].to_vec(),
        })
    }
}

impl RawRecord {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Digests of the bytes as read, before fixup
    pub fn hashes(&self) -> RecordHashes {
        hashing::compute(&self.bytes)
    }

    /// Repair and decode. Never fails: problems are recorded on the result.
    pub fn decode(mut self, ctx: &DecodeContext) -> MftRecord {
        let header = RecordHeader::from_bytes(&self.bytes).unwrap_or_default();
        let mut record = MftRecord::new(ctx.record_number.unwrap_or(header.record_number as u64), header);

        if !record.header.is_valid() {
            ctx.warn(format_args!(
                "bad record signature 0x{:08X}{}",
                record.header.signature,
                if record.header.is_bad() { " (BAAD)" } else { "" }
            ));
        }
        if record.header.allocated_size as usize != MFT_RECORD_SIZE && record.header.is_valid() {
            ctx.warn(format_args!(
                "allocated size {} differs from {}",
                record.header.allocated_size, MFT_RECORD_SIZE
            ));
        }
        if let Some(position) = ctx.record_number {
            if record.header.is_valid() && position != record.header.record_number as u64 {
                log::debug!(
                    target: "record",
                    "record {} carries embedded number {}",
                    position,
                    record.header.record_number
                );
            }
        }
        ctx.report("record number", &validate_record_number(record.header.record_number as u64));

        record.fixup = apply_fixup(
            &mut self.bytes,
            record.header.update_sequence_offset as usize,
            record.header.update_sequence_count as usize,
        );
        match record.fixup {
            FixupStatus::Applied | FixupStatus::NotPresent => {}
            ref failed => ctx.warn(format_args!("fixup {}", failed)),
        }

        record.decode_attributes(&ByteReader::new(&self.bytes), ctx);
        record
    }
}

// ============================================================================
// Fixup
// ============================================================================

/// Outcome of update-sequence repair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FixupStatus {
    /// Every sector matched and was restored
    Applied,
    /// The record carries no update sequence array
    NotPresent,
    /// Sector `sector` (0-based) did not end with the sequence number
    Mismatch { sector: usize },
    /// The array does not fit the buffer
    InvalidArray,
}

impl FixupStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Applied | Self::NotPresent)
    }
}

impl std::fmt::Display for FixupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Applied => f.write_str("applied"),
            Self::NotPresent => f.write_str("not present"),
            Self::Mismatch { sector } => write!(f, "mismatch in sector {}", sector),
            Self::InvalidArray => f.write_str("invalid update sequence array"),
        }
    }
}

/// Restore the last two bytes of every sector from the update sequence array.
///
/// The first array entry is the update sequence number that each sector end
/// must currently hold. Sectors before a mismatch stay repaired; nothing at or
/// after the mismatching sector is touched.
pub fn apply_fixup(data: &mut [u8], usa_offset: usize, usa_count: usize) -> FixupStatus {
    if usa_count == 0 || usa_offset == 0 {
        return FixupStatus::NotPresent;
    }
    let sectors = usa_count - 1;
    if usa_offset + usa_count * 2 > data.len() || sectors * SECTOR_SIZE > data.len() {
        return FixupStatus::InvalidArray;
    }

    let usn = [data[usa_offset], data[usa_offset + 1]];

    for i in 1..usa_count {
        let sector_end = i * SECTOR_SIZE - 2;
        let fixup_offset = usa_offset + i * 2;

        if data[sector_end..sector_end + 2] != usn {
            return FixupStatus::Mismatch { sector: i - 1 };
        }

        data[sector_end] = data[fixup_offset];
        data[sector_end + 1] = data[fixup_offset + 1];
    }

    FixupStatus::Applied
}

// ============================================================================
// Decoded record
// ============================================================================

/// A decoded MFT record. Every attribute slot is independently optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MftRecord {
    /// Position in the input; the table key
    pub record_number: u64,
    pub header: RecordHeader,
    pub fixup: FixupStatus,
    /// Type codes seen in the attribute stream, decoded or not
    pub attribute_types: BTreeSet<u32>,

    pub standard_information: Option<StandardInformation>,
    pub attribute_list: Option<AttributeList>,
    /// All names, in record order
    pub file_names: Vec<FileName>,
    pub object_id: Option<ObjectId>,
    pub security_descriptor: Option<SecurityDescriptor>,
    pub volume_name: Option<VolumeName>,
    pub volume_information: Option<VolumeInformation>,
    /// The unnamed stream
    pub data: Option<DataAttribute>,
    /// Named streams
    pub alternate_streams: Vec<DataAttribute>,
    pub index_root: Option<IndexRoot>,
    pub index_allocation: Option<IndexAllocation>,
    pub bitmap: Option<Bitmap>,
    pub reparse_point: Option<ReparsePoint>,
    pub ea_information: Option<EaInformation>,
    pub ea: Option<ExtendedAttributes>,
    pub logged_utility_stream: Option<LoggedUtilityStream>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashes: Option<RecordHashes>,
}

impl MftRecord {
    fn new(record_number: u64, header: RecordHeader) -> Self {
        Self {
            record_number,
            header,
            fixup: FixupStatus::NotPresent,
            attribute_types: BTreeSet::new(),
            standard_information: None,
            attribute_list: None,
            file_names: Vec::new(),
            object_id: None,
            security_descriptor: None,
            volume_name: None,
            volume_information: None,
            data: None,
            alternate_streams: Vec::new(),
            index_root: None,
            index_allocation: None,
            bitmap: None,
            reparse_point: None,
            ea_information: None,
            ea: None,
            logged_utility_stream: None,
            hashes: None,
        }
    }

    /// Decode a record from the front of `data`
    pub fn from_bytes(data: &[u8], ctx: &DecodeContext) -> Result<Self> {
        Ok(RawRecord::try_from(data)?.decode(ctx))
    }

    /// Walk the attribute stream and fill the slots
    fn decode_attributes(&mut self, reader: &ByteReader<'_>, ctx: &DecodeContext) {
        let mut offset = self.header.first_attribute_offset as usize;
        if offset < MIN_FIRST_ATTRIBUTE_OFFSET || offset >= self.header.used_size as usize {
            if self.header.is_valid() {
                ctx.warn(format_args!(
                    "first attribute offset {} outside [{}, {}), using {}",
                    offset, MIN_FIRST_ATTRIBUTE_OFFSET, self.header.used_size, MIN_FIRST_ATTRIBUTE_OFFSET
                ));
            }
            offset = MIN_FIRST_ATTRIBUTE_OFFSET;
        }

        let mut count = 0;
        while offset + 8 <= reader.len() && count < MAX_ATTRIBUTES_PER_RECORD {
            count += 1;

            let (type_code, length) = match (reader.u32_at(offset), reader.u32_at(offset + 4)) {
                (Ok(t), Ok(l)) => (t, l as usize),
                _ => break,
            };
            if type_code == ATTRIBUTE_END_MARKER || length == 0 {
                break;
            }
            let remaining = reader.len() - offset;
            if length < MIN_ATTRIBUTE_LENGTH || length > remaining {
                ctx.warn(format_args!(
                    "attribute 0x{:X} at {} has length {} outside [{}, {}]",
                    type_code, offset, length, MIN_ATTRIBUTE_LENGTH, remaining
                ));
                break;
            }

            self.attribute_types.insert(type_code);

            let decoded = AttributeHeader::decode(reader, offset, ctx).and_then(|header| match header {
                Some(header) => attributes::decode(reader, &header, ctx).map(Some),
                None => Ok(None),
            });
            match decoded {
                Ok(Some(attribute)) => self.store(attribute, ctx),
                Ok(None) => break,
                Err(e) => ctx.warn(format_args!(
                    "{} at {}: {}",
                    attribute_type_name(type_code),
                    offset,
                    e
                )),
            }

            offset += length;
        }

        if count >= MAX_ATTRIBUTES_PER_RECORD {
            ctx.warn(format_args!("stopped after {} attributes", MAX_ATTRIBUTES_PER_RECORD));
        }
    }

    fn store(&mut self, attribute: Attribute, ctx: &DecodeContext) {
        fn keep_first<T>(slot: &mut Option<T>, value: T, what: &str, ctx: &DecodeContext) {
            if slot.is_some() {
                ctx.trace(format_args!("ignoring additional {}", what));
            } else {
                *slot = Some(value);
            }
        }

        match attribute {
            Attribute::StandardInformation(v) => {
                keep_first(&mut self.standard_information, v, "$STANDARD_INFORMATION", ctx)
            }
            Attribute::AttributeList(v) => keep_first(&mut self.attribute_list, v, "$ATTRIBUTE_LIST", ctx),
            Attribute::FileName(v) => self.file_names.push(v),
            Attribute::ObjectId(v) => keep_first(&mut self.object_id, v, "$OBJECT_ID", ctx),
            Attribute::SecurityDescriptor(v) => {
                keep_first(&mut self.security_descriptor, v, "$SECURITY_DESCRIPTOR", ctx)
            }
            Attribute::VolumeName(v) => keep_first(&mut self.volume_name, v, "$VOLUME_NAME", ctx),
            Attribute::VolumeInformation(v) => {
                keep_first(&mut self.volume_information, v, "$VOLUME_INFORMATION", ctx)
            }
            Attribute::Data(v) if v.is_named() => self.alternate_streams.push(v),
            Attribute::Data(v) => keep_first(&mut self.data, v, "unnamed $DATA", ctx),
            Attribute::IndexRoot(v) => keep_first(&mut self.index_root, v, "$INDEX_ROOT", ctx),
            Attribute::IndexAllocation(v) => keep_first(&mut self.index_allocation, v, "$INDEX_ALLOCATION", ctx),
            Attribute::Bitmap(v) => keep_first(&mut self.bitmap, v, "$BITMAP", ctx),
            Attribute::ReparsePoint(v) => keep_first(&mut self.reparse_point, v, "$REPARSE_POINT", ctx),
            Attribute::EaInformation(v) => keep_first(&mut self.ea_information, v, "$EA_INFORMATION", ctx),
            Attribute::Ea(v) => keep_first(&mut self.ea, v, "$EA", ctx),
            Attribute::LoggedUtilityStream(v) => {
                keep_first(&mut self.logged_utility_stream, v, "$LOGGED_UTILITY_STREAM", ctx)
            }
        }
    }

    // ========================================================================
    // Accessors used by the table and the exporters
    // ========================================================================

    /// The "FILE" signature was present
    pub fn is_valid(&self) -> bool {
        self.header.is_valid()
    }

    pub fn is_in_use(&self) -> bool {
        self.header.is_in_use()
    }

    pub fn is_directory(&self) -> bool {
        self.header.is_directory()
    }

    pub fn has_attribute(&self, attribute_type: AttributeType) -> bool {
        self.attribute_types.contains(&attribute_type.code())
    }

    /// Preferred name: Win32, then Win32+DOS, then POSIX, then DOS
    pub fn primary_file_name(&self) -> Option<&FileName> {
        self.file_names
            .iter()
            .rev()
            .max_by_key(|f| f.namespace.preference())
    }

    pub fn filename(&self) -> &str {
        self.primary_file_name().map(|f| f.name.as_str()).unwrap_or("")
    }

    /// Parent record number from the primary name, 0 when unnamed
    pub fn parent_record_number(&self) -> u64 {
        self.primary_file_name()
            .map(|f| f.parent_record_number())
            .unwrap_or(0)
    }

    pub fn parent_sequence_number(&self) -> u16 {
        self.primary_file_name()
            .map(|f| f.parent.sequence_number())
            .unwrap_or(0)
    }

    pub fn si_times(&self) -> TimestampSet {
        self.standard_information
            .as_ref()
            .map(|si| si.times)
            .unwrap_or_default()
    }

    pub fn fn_times(&self) -> TimestampSet {
        self.primary_file_name().map(|f| f.times).unwrap_or_default()
    }

    /// Size of the unnamed stream, falling back to the name's real size
    pub fn file_size(&self) -> u64 {
        match (&self.data, self.primary_file_name()) {
            (Some(data), _) => data.size(),
            (None, Some(fname)) => fname.real_size,
            (None, None) => 0,
        }
    }

    pub fn file_type(&self) -> &'static str {
        self.header.file_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ntfs::attribute::test_support::resident;
    use crate::ntfs::attributes::file_name::file_name_value;

    /// Build a 1024-byte record with a valid fixup and the given attributes
    fn build_record(record_number: u32, flags: u16, attrs: &[Vec<u8>]) -> Vec<u8> {
        let mut buf = vec![0u8; MFT_RECORD_SIZE];
        buf[0..4].copy_from_slice(&MFT_RECORD_SIGNATURE.to_le_bytes());
        buf[4..6].copy_from_slice(&48u16.to_le_bytes());
        buf[6..8].copy_from_slice(&3u16.to_le_bytes());
        buf[16..18].copy_from_slice(&1u16.to_le_bytes());
        buf[20..22].copy_from_slice(&56u16.to_le_bytes());
        buf[22..24].copy_from_slice(&flags.to_le_bytes());
        buf[28..32].copy_from_slice(&(MFT_RECORD_SIZE as u32).to_le_bytes());
        buf[44..48].copy_from_slice(&record_number.to_le_bytes());

        let mut offset = 56;
        for attr in attrs {
            buf[offset..offset + attr.len()].copy_from_slice(attr);
            offset += attr.len();
        }
        buf[offset..offset + 4].copy_from_slice(&ATTRIBUTE_END_MARKER.to_le_bytes());
        let used = (offset + 8) as u32;
        buf[24..28].copy_from_slice(&used.to_le_bytes());

        // Protect sector ends with USN 0x0001, saving the originals
        buf[48..50].copy_from_slice(&1u16.to_le_bytes());
        for i in 1..3 {
            let end = i * SECTOR_SIZE - 2;
            let saved = [buf[end], buf[end + 1]];
            buf[48 + i * 2..50 + i * 2].copy_from_slice(&saved);
            buf[end..end + 2].copy_from_slice(&1u16.to_le_bytes());
        }
        buf
    }

    fn decode(buf: &[u8]) -> MftRecord {
        MftRecord::from_bytes(buf, &DecodeContext::default()).unwrap()
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = MftRecord::from_bytes(&[0u8; 512], &DecodeContext::default()).unwrap_err();
        assert!(matches!(err, MftError::BufferTooSmall { needed: 1024, got: 512 }));
    }

    #[test]
    fn test_record_number_from_header() {
        for n in [0u32, 5, 12345, u32::MAX] {
            let record = decode(&build_record(n, 1, &[]));
            assert_eq!(record.header.record_number, n);
            assert_eq!(record.record_number, n as u64);
        }
    }

    #[test]
    fn test_positional_key_wins() {
        let buf = build_record(7, 1, &[]);
        let record = RawRecord::try_from(buf.as_slice())
            .unwrap()
            .decode(&DecodeContext::for_record(0, 99));
        assert_eq!(record.record_number, 99);
        assert_eq!(record.header.record_number, 7);
    }

    #[test]
    fn test_fixup_restores_sector_ends() {
        let mut buf = vec![0u8; 1024];
        buf[48..50].copy_from_slice(&[0xAB, 0xCD]);
        buf[50..52].copy_from_slice(&[0x11, 0x22]);
        buf[52..54].copy_from_slice(&[0x33, 0x44]);
        buf[510..512].copy_from_slice(&[0xAB, 0xCD]);
        buf[1022..1024].copy_from_slice(&[0xAB, 0xCD]);

        assert_eq!(apply_fixup(&mut buf, 48, 3), FixupStatus::Applied);
        assert_eq!(&buf[510..512], &[0x11, 0x22]);
        assert_eq!(&buf[1022..1024], &[0x33, 0x44]);
    }

    #[test]
    fn test_fixup_mismatch_stops() {
        let mut buf = vec![0u8; 1024];
        buf[48..50].copy_from_slice(&[0xAB, 0xCD]);
        buf[50..52].copy_from_slice(&[0x11, 0x22]);
        buf[52..54].copy_from_slice(&[0x33, 0x44]);
        buf[510..512].copy_from_slice(&[0xAB, 0xCD]);
        buf[1022..1024].copy_from_slice(&[0xEE, 0xEE]);

        assert_eq!(apply_fixup(&mut buf, 48, 3), FixupStatus::Mismatch { sector: 1 });
        assert_eq!(&buf[510..512], &[0x11, 0x22]);
        assert_eq!(&buf[1022..1024], &[0xEE, 0xEE]);
    }

    #[test]
    fn test_fixup_geometry() {
        let mut buf = vec![0u8; 1024];
        assert_eq!(apply_fixup(&mut buf, 0, 3), FixupStatus::NotPresent);
        assert_eq!(apply_fixup(&mut buf, 48, 0), FixupStatus::NotPresent);
        assert_eq!(apply_fixup(&mut buf, 1020, 3), FixupStatus::InvalidArray);
        assert_eq!(apply_fixup(&mut buf, 48, 4), FixupStatus::InvalidArray);
    }

    #[test]
    fn test_fixup_failure_keeps_record() {
        let mut buf = build_record(3, 1, &[resident(0x30, None, &file_name_value("a.txt", 5, 1))]);
        buf[1022] ^= 0xFF;
        let record = decode(&buf);
        assert_eq!(record.fixup, FixupStatus::Mismatch { sector: 1 });
        assert_eq!(record.filename(), "a.txt");
    }

    #[test]
    fn test_decodes_file_name_and_si() {
        let si = resident(0x10, None, &[0u8; 72]);
        let fname = resident(0x30, None, &file_name_value("test.txt", 5, 1));
        let record = decode(&build_record(42, 1, &[si, fname]));

        assert!(record.is_valid());
        assert!(record.is_in_use());
        assert_eq!(record.fixup, FixupStatus::Applied);
        assert_eq!(record.filename(), "test.txt");
        assert_eq!(record.parent_record_number(), 5);
        assert!(record.has_attribute(AttributeType::StandardInformation));
        assert!(record.has_attribute(AttributeType::FileName));
        assert!(!record.si_times().creation.is_set());
        assert_eq!(record.file_size(), 1234);
    }

    #[test]
    fn test_primary_name_preference() {
        let dos = resident(0x30, None, &file_name_value("LONGFI~1.TXT", 5, 2));
        let win32 = resident(0x30, None, &file_name_value("long file name.txt", 5, 1));
        let record = decode(&build_record(40, 1, &[dos, win32]));
        assert_eq!(record.file_names.len(), 2);
        assert_eq!(record.filename(), "long file name.txt");
    }

    #[test]
    fn test_named_streams_kept_apart() {
        let data = resident(0x80, None, b"main");
        let ads = resident(0x80, Some("Zone.Identifier"), b"[ZoneTransfer]");
        let record = decode(&build_record(41, 1, &[data, ads]));
        assert_eq!(record.data.as_ref().map(|d| d.size()), Some(4));
        assert_eq!(record.alternate_streams.len(), 1);
        assert_eq!(record.file_size(), 4);
    }

    #[test]
    fn test_failed_attribute_still_observed() {
        let bad_fn = resident(0x30, None, &[0u8; 20]);
        let record = decode(&build_record(9, 1, &[bad_fn]));
        assert!(record.has_attribute(AttributeType::FileName));
        assert!(record.file_names.is_empty());
        assert_eq!(record.filename(), "");
    }

    #[test]
    fn test_bad_magic_is_not_fatal() {
        let mut buf = build_record(9, 1, &[resident(0x30, None, &file_name_value("x", 5, 1))]);
        buf[0..4].copy_from_slice(b"BAAD");
        let record = decode(&buf);
        assert!(!record.is_valid());
        assert!(record.header.is_bad());
        assert_eq!(record.filename(), "x");
    }

    #[test]
    fn test_zeroed_record() {
        let record = decode(&[0u8; 1024]);
        assert!(!record.is_valid());
        assert_eq!(record.fixup, FixupStatus::NotPresent);
        assert!(record.attribute_types.is_empty());
    }

    #[test]
    fn test_attribute_offset_clamped() {
        let mut buf = build_record(9, 1, &[resident(0x30, None, &file_name_value("y", 5, 1))]);
        buf[20..22].copy_from_slice(&8u16.to_le_bytes());
        assert_eq!(decode(&buf).filename(), "y");
    }

    #[test]
    fn test_loop_terminates_without_sentinel() {
        let mut buf = build_record(9, 1, &[]);
        let mut offset = 56;
        while offset + 16 <= 1024 {
            buf[offset..offset + 4].copy_from_slice(&0x1234u32.to_le_bytes());
            buf[offset + 4..offset + 8].copy_from_slice(&16u32.to_le_bytes());
            offset += 16;
        }
        buf[24..28].copy_from_slice(&1024u32.to_le_bytes());
        let record = decode(&buf);
        assert_eq!(record.attribute_types.len(), 1);
        assert!(record.attribute_types.contains(&0x1234));
    }

    #[test]
    fn test_attribute_cap_stops_long_stream() {
        // A stream longer than one record, so only the cap can end the walk
        let mut buf = vec![0u8; 4096];
        let mut offset = MIN_FIRST_ATTRIBUTE_OFFSET;
        let mut written = 0u32;
        while offset + 16 <= buf.len() {
            buf[offset..offset + 4].copy_from_slice(&(0x1000 + written).to_le_bytes());
            buf[offset + 4..offset + 8].copy_from_slice(&16u32.to_le_bytes());
            offset += 16;
            written += 1;
        }
        assert!(written as usize > MAX_ATTRIBUTES_PER_RECORD);

        let header = RecordHeader {
            signature: MFT_RECORD_SIGNATURE,
            first_attribute_offset: MIN_FIRST_ATTRIBUTE_OFFSET as u16,
            used_size: buf.len() as u32,
            ..Default::default()
        };
        let mut record = MftRecord::new(0, header);
        record.decode_attributes(&ByteReader::new(&buf), &DecodeContext::default());

        assert_eq!(record.attribute_types.len(), MAX_ATTRIBUTES_PER_RECORD);
        assert!(record.attribute_types.contains(&0x1000));
        assert!(!record.attribute_types.contains(&(0x1000 + MAX_ATTRIBUTES_PER_RECORD as u32)));
    }

    #[test]
    fn test_records_compare_by_value() {
        let buf = build_record(12, 1, &[resident(0x30, None, &file_name_value("same.txt", 5, 1))]);
        let first = decode(&buf);
        assert_eq!(first, decode(&buf));

        let mut other = first.clone();
        other.header.flags = 0;
        assert_ne!(first, other);
    }

    #[test]
    fn test_oversized_length_stops_loop() {
        let mut buf = build_record(9, 1, &[resident(0x30, None, &file_name_value("z", 5, 1))]);
        buf[60..64].copy_from_slice(&4096u32.to_le_bytes());
        let record = decode(&buf);
        assert!(record.attribute_types.is_empty());
    }
}
