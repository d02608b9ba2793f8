//! `$INDEX_ROOT` (0x90) and `$INDEX_ALLOCATION` (0xA0)

use super::data::decode_runs_lenient;
use super::file_name::{FileName, FILE_NAME_MIN_SIZE};
use super::resident_value;
use crate::error::AttrResult;
use crate::ntfs::attribute::AttributeHeader;
use crate::ntfs::bounds::ByteReader;
use crate::ntfs::data_runs::{total_clusters, DataRun};
use crate::ntfs::structs::{AttributeType, FileReference};
use crate::ntfs::validation::DecodeContext;
use serde::Serialize;

/// Index root header (16) plus index node header (16)
pub const INDEX_ROOT_MIN_SIZE: usize = 32;

/// Fixed part of an index entry
pub const INDEX_ENTRY_HEADER_SIZE: usize = 16;

pub const INDEX_ENTRY_NODE: u32 = 0x01;
pub const INDEX_ENTRY_END: u32 = 0x02;

/// Index node header flag: children live in `$INDEX_ALLOCATION`
pub const INDEX_NODE_LARGE: u32 = 0x01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollationRule {
    Binary,
    FileName,
    UnicodeString,
    NtofsUlong,
    NtofsSid,
    NtofsSecurityHash,
    NtofsUlongs,
    Unknown(u32),
}

impl CollationRule {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x00 => Self::Binary,
            0x01 => Self::FileName,
            0x02 => Self::UnicodeString,
            0x10 => Self::NtofsUlong,
            0x11 => Self::NtofsSid,
            0x12 => Self::NtofsSecurityHash,
            0x13 => Self::NtofsUlongs,
            other => Self::Unknown(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "BINARY",
            Self::FileName => "FILENAME",
            Self::UnicodeString => "UNICODE_STRING",
            Self::NtofsUlong => "NTOFS_ULONG",
            Self::NtofsSid => "NTOFS_SID",
            Self::NtofsSecurityHash => "NTOFS_SECURITY_HASH",
            Self::NtofsUlongs => "NTOFS_ULONGS",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub reference: FileReference,
    pub length: u16,
    pub key_length: u16,
    pub flags: u32,
    /// Set when the key is a `$FILE_NAME`
    pub file_name: Option<String>,
    pub sub_node_vcn: Option<u64>,
}

impl IndexEntry {
    pub fn has_sub_node(&self) -> bool {
        self.flags & INDEX_ENTRY_NODE != 0
    }

    pub fn is_last(&self) -> bool {
        self.flags & INDEX_ENTRY_END != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRoot {
    pub name: Option<String>,
    pub indexed_type: u32,
    pub collation: CollationRule,
    pub index_record_size: u32,
    pub clusters_per_index_record: u8,
    pub first_entry_offset: u32,
    pub total_size: u32,
    pub allocated_size: u32,
    pub node_flags: u32,
    pub entries: Vec<IndexEntry>,
}

impl IndexRoot {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        let value = resident_value(reader, header, "$INDEX_ROOT", INDEX_ROOT_MIN_SIZE)?;

        let indexed_type = value.u32_at(0)?;
        let collation = CollationRule::from_u32(value.u32_at(4)?);
        let index_record_size = value.u32_at(8)?;
        let clusters_per_index_record = value.u8_at(12)?;

        // Index node header; its offsets are relative to its own start
        let node = 16;
        let first_entry_offset = value.u32_at(node)?;
        let total_size = value.u32_at(node + 4)?;
        let allocated_size = value.u32_at(node + 8)?;
        let node_flags = value.u32_at(node + 12)?;

        if let CollationRule::Unknown(raw) = collation {
            ctx.warn(format_args!("unknown collation rule 0x{:X}", raw));
        }

        let entries_end = (node + total_size as usize).min(value.len());
        let entries = walk_entries(
            &value,
            node + first_entry_offset as usize,
            entries_end,
            indexed_type == AttributeType::FileName.code(),
            ctx,
        );

        Ok(Self {
            name: header.name.clone(),
            indexed_type,
            collation,
            index_record_size,
            clusters_per_index_record,
            first_entry_offset,
            total_size,
            allocated_size,
            node_flags,
            entries,
        })
    }

    pub fn is_large(&self) -> bool {
        self.node_flags & INDEX_NODE_LARGE != 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} {}, {} entries{}",
            self.name.as_deref().unwrap_or("index"),
            self.collation.as_str(),
            self.entries.iter().filter(|e| !e.is_last()).count(),
            if self.is_large() { ", large" } else { "" }
        )
    }
}

/// Walk index entries in `[start, end)` until the last-entry flag
fn walk_entries(
    value: &ByteReader<'_>,
    start: usize,
    end: usize,
    file_name_keys: bool,
    ctx: &DecodeContext,
) -> Vec<IndexEntry> {
    let mut entries = Vec::new();
    let mut pos = start;

    while pos + INDEX_ENTRY_HEADER_SIZE <= end {
        let read = || -> AttrResult<(u64, u16, u16, u32)> {
            Ok((
                value.u64_at(pos)?,
                value.u16_at(pos + 8)?,
                value.u16_at(pos + 10)?,
                value.u32_at(pos + 12)?,
            ))
        };
        let (reference, length, key_length, flags) = match read() {
            Ok(fields) => fields,
            Err(e) => {
                ctx.warn(format_args!("index entry at {}: {}", pos, e));
                break;
            }
        };

        if (length as usize) < INDEX_ENTRY_HEADER_SIZE || pos + length as usize > end {
            ctx.warn(format_args!("index entry at {} has bad length {}", pos, length));
            break;
        }

        let is_last = flags & INDEX_ENTRY_END != 0;

        let file_name = if file_name_keys && !is_last && key_length as usize >= FILE_NAME_MIN_SIZE {
            value
                .sub(pos + INDEX_ENTRY_HEADER_SIZE, key_length as usize)
                .and_then(|key| FileName::from_value(&key, ctx))
                .map(|fname| fname.name)
                .ok()
        } else {
            None
        };

        let sub_node_vcn = if flags & INDEX_ENTRY_NODE != 0 && length >= 24 {
            value.u64_at(pos + length as usize - 8).ok()
        } else {
            None
        };

        entries.push(IndexEntry {
            reference: FileReference(reference),
            length,
            key_length,
            flags,
            file_name,
            sub_node_vcn,
        });

        if is_last {
            break;
        }
        pos += length as usize;
    }

    entries
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexAllocation {
    pub name: Option<String>,
    pub start_vcn: u64,
    pub last_vcn: u64,
    pub allocated_size: u64,
    pub runs: Vec<DataRun>,
}

impl IndexAllocation {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        let nr = header.non_resident("$INDEX_ALLOCATION")?;
        let runs = decode_runs_lenient(reader, header, ctx, "$INDEX_ALLOCATION")?;

        Ok(Self {
            name: header.name.clone(),
            start_vcn: nr.start_vcn,
            last_vcn: nr.last_vcn,
            allocated_size: nr.allocated_size,
            runs,
        })
    }

    pub fn summary(&self) -> String {
        format!(
            "VCN {}-{}, {} runs, {} clusters",
            self.start_vcn,
            self.last_vcn,
            self.runs.len(),
            total_clusters(&self.runs)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ntfs::attribute::test_support::{non_resident, resident};
    use crate::ntfs::attributes::file_name::file_name_value;

    fn index_entry(reference: u64, key: &[u8], flags: u32, sub_node: Option<u64>) -> Vec<u8> {
        let mut length = INDEX_ENTRY_HEADER_SIZE + key.len();
        length = (length + 7) & !7;
        if sub_node.is_some() {
            length += 8;
        }
        let mut e = vec![0u8; length];
        e[0..8].copy_from_slice(&reference.to_le_bytes());
        e[8..10].copy_from_slice(&(length as u16).to_le_bytes());
        e[10..12].copy_from_slice(&(key.len() as u16).to_le_bytes());
        e[12..16].copy_from_slice(&flags.to_le_bytes());
        e[16..16 + key.len()].copy_from_slice(key);
        if let Some(vcn) = sub_node {
            e[length - 8..].copy_from_slice(&vcn.to_le_bytes());
        }
        e
    }

    fn index_root_value(entries: &[Vec<u8>], node_flags: u32) -> Vec<u8> {
        let body: Vec<u8> = entries.concat();
        let mut value = vec![0u8; 32];
        value[0..4].copy_from_slice(&0x30u32.to_le_bytes());
        value[4..8].copy_from_slice(&1u32.to_le_bytes());
        value[8..12].copy_from_slice(&4096u32.to_le_bytes());
        value[12] = 1;
        value[16..20].copy_from_slice(&16u32.to_le_bytes());
        value[20..24].copy_from_slice(&((16 + body.len()) as u32).to_le_bytes());
        value[24..28].copy_from_slice(&((16 + body.len()) as u32).to_le_bytes());
        value[28..32].copy_from_slice(&node_flags.to_le_bytes());
        value.extend(body);
        value
    }

    fn decode_root(value: &[u8]) -> IndexRoot {
        let attr = resident(0x90, Some("$I30"), value);
        let reader = ByteReader::new(&attr);
        let ctx = DecodeContext::default();
        let header = AttributeHeader::decode(&reader, 0, &ctx).unwrap().unwrap();
        IndexRoot::decode(&reader, &header, &ctx).unwrap()
    }

    #[test]
    fn test_small_directory_index() {
        let value = index_root_value(
            &[
                index_entry(0x0001_0000_0000_0040, &file_name_value("a.txt", 5, 1), 0, None),
                index_entry(0x0001_0000_0000_0041, &file_name_value("b.txt", 5, 1), 0, None),
                index_entry(0, &[], INDEX_ENTRY_END, None),
            ],
            0,
        );
        let root = decode_root(&value);

        assert_eq!(root.name.as_deref(), Some("$I30"));
        assert_eq!(root.collation, CollationRule::FileName);
        assert_eq!(root.clusters_per_index_record, 1);
        assert_eq!(root.entries.len(), 3);
        assert_eq!(root.entries[0].file_name.as_deref(), Some("a.txt"));
        assert_eq!(root.entries[1].reference.record_number(), 0x41);
        assert!(root.entries[2].is_last());
        assert_eq!(root.summary(), "$I30 FILENAME, 2 entries");
    }

    #[test]
    fn test_large_index_sub_nodes() {
        let value = index_root_value(&[index_entry(0, &[], INDEX_ENTRY_END | INDEX_ENTRY_NODE, Some(7))], 1);
        let root = decode_root(&value);
        assert!(root.is_large());
        assert_eq!(root.entries.len(), 1);
        assert!(root.entries[0].has_sub_node());
        assert_eq!(root.entries[0].sub_node_vcn, Some(7));
    }

    #[test]
    fn test_zero_length_entry_stops() {
        let mut bad = index_entry(0x40, &[], 0, None);
        bad[8..10].copy_from_slice(&0u16.to_le_bytes());
        let root = decode_root(&index_root_value(&[bad], 0));
        assert!(root.entries.is_empty());
    }

    #[test]
    fn test_index_allocation() {
        let attr = non_resident(0xA0, 3, 16384, &[0x11, 0x04, 0x30, 0x00]);
        let reader = ByteReader::new(&attr);
        let ctx = DecodeContext::default();
        let header = AttributeHeader::decode(&reader, 0, &ctx).unwrap().unwrap();
        let alloc = IndexAllocation::decode(&reader, &header, &ctx).unwrap();
        assert_eq!(alloc.last_vcn, 3);
        assert_eq!(alloc.runs.len(), 1);
        assert_eq!(alloc.summary(), "VCN 0-3, 1 runs, 4 clusters");

        let attr = resident(0xA0, None, &[0u8; 8]);
        let reader = ByteReader::new(&attr);
        let header = AttributeHeader::decode(&reader, 0, &ctx).unwrap().unwrap();
        assert!(IndexAllocation::decode(&reader, &header, &ctx).is_err());
    }
}
