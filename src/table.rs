//! Record table and path resolution
//!
//! The table owns decoded records until the caller drains them for export.
//! A small name/parent link per record outlives the drain, so paths keep
//! resolving through parents that were exported in an earlier batch.

use crate::ntfs::structs::{MAX_PATH_DEPTH, ROOT_RECORD_NUMBER};
use crate::ntfs::MftRecord;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Separator placed between path segments
pub const PATH_SEPARATOR: &str = "\\";

pub const ORPHAN_SEGMENT: &str = "OrphanedFiles";
pub const DEEP_PATH_SEGMENT: &str = "DeepPath";

/// What path resolution needs to know about a record
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathLink {
    name: String,
    parent: u64,
}

/// Decoded records keyed by record number
#[derive(Debug, Default)]
pub struct RecordTable {
    records: BTreeMap<u64, MftRecord>,
    links: HashMap<u64, PathLink>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under `record.record_number`, returning any record it replaces
    pub fn insert(&mut self, record: MftRecord) -> Option<MftRecord> {
        self.links.insert(
            record.record_number,
            PathLink {
                name: record.filename().to_string(),
                parent: record.parent_record_number(),
            },
        );
        self.records.insert(record.record_number, record)
    }

    pub fn get(&self, record_number: u64) -> Option<&MftRecord> {
        self.records.get(&record_number)
    }

    /// Records currently held (not yet drained)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Has this record number ever been inserted?
    pub fn contains(&self, record_number: u64) -> bool {
        self.links.contains_key(&record_number)
    }

    /// Held records in ascending record-number order
    pub fn iter(&self) -> impl Iterator<Item = &MftRecord> + '_ {
        self.records.values()
    }

    /// Remove and return every held record, sorted by record number.
    /// Path links stay behind.
    pub fn drain(&mut self) -> Vec<MftRecord> {
        std::mem::take(&mut self.records).into_values().collect()
    }

    /// Drop records and links
    pub fn clear(&mut self) {
        self.records.clear();
        self.links.clear();
    }

    /// Resolve the full path of `record_number` by walking parent links.
    ///
    /// Stops at the root (empty leading segment), a self-parent
    /// (`OrphanedFiles`), a parent never seen (`UnknownParent_<n>`) or after
    /// 255 hops (`DeepPath`).
    pub fn build_path(&self, record_number: u64) -> String {
        let mut segments: VecDeque<String> = VecDeque::new();
        let mut current = record_number;
        let mut terminated = false;

        for _ in 0..MAX_PATH_DEPTH {
            if current == ROOT_RECORD_NUMBER {
                segments.push_front(String::new());
                terminated = true;
                break;
            }

            let (name, parent) = match self.links.get(&current) {
                Some(link) => (link.name.as_str(), link.parent),
                None => {
                    segments.push_front(format!("UnknownParent_{}", current));
                    terminated = true;
                    break;
                }
            };

            if name.is_empty() {
                segments.push_front(format!("Unknown_{}", current));
            } else {
                segments.push_front(name.to_string());
            }

            if parent == current {
                segments.push_front(ORPHAN_SEGMENT.to_string());
                terminated = true;
                break;
            }
            if parent != ROOT_RECORD_NUMBER && !self.links.contains_key(&parent) {
                segments.push_front(format!("UnknownParent_{}", parent));
                terminated = true;
                break;
            }
            current = parent;
        }

        if !terminated {
            segments.push_front(DEEP_PATH_SEGMENT.to_string());
        }

        // The root alone
        if segments.len() == 1 && segments[0].is_empty() {
            return PATH_SEPARATOR.to_string();
        }

        Vec::from(segments).join(PATH_SEPARATOR)
    }
}
