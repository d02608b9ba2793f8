//! Data run (mapping pairs) decoding
//!
//! Each run starts with a control byte: the low nibble is the byte width of
//! the cluster count, the high nibble the byte width of the signed LCN delta.
//! A zero control byte ends the list. A run with no delta bytes is sparse.

use crate::error::{AttrResult, AttributeError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataRun {
    pub cluster_count: u64,
    /// Relative to the previous non-sparse run; 0 for sparse runs
    pub lcn_delta: i64,
    pub is_sparse: bool,
}

/// A run resolved to absolute cluster numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extent {
    pub vcn: u64,
    /// `None` for sparse extents
    pub lcn: Option<i64>,
    pub cluster_count: u64,
}

/// Iterator over encoded runs.
///
/// Ends at the terminator or when the remaining bytes cannot hold the next
/// run. A malformed control byte yields one `Err` and then ends.
pub struct DataRunDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> DataRunDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            done: false,
        }
    }

    /// Bytes consumed so far, including control bytes
    pub fn position(&self) -> usize {
        self.pos
    }

    fn read_unsigned(&self, at: usize, width: usize) -> u64 {
        self.data[at..at + width]
            .iter()
            .rev()
            .fold(0u64, |acc, &b| (acc << 8) | b as u64)
    }

    fn read_signed(&self, at: usize, width: usize) -> i64 {
        let raw = self.read_unsigned(at, width);
        if width < 8 && self.data[at + width - 1] & 0x80 != 0 {
            (raw | (u64::MAX << (width * 8))) as i64
        } else {
            raw as i64
        }
    }
}

impl Iterator for DataRunDecoder<'_> {
    type Item = AttrResult<DataRun>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let control = match self.data.get(self.pos) {
            Some(&0) | None => {
                self.done = true;
                return None;
            }
            Some(&b) => b,
        };

        let length_bytes = (control & 0x0F) as usize;
        let offset_bytes = (control >> 4) as usize;

        if length_bytes == 0 || length_bytes > 8 || offset_bytes > 8 {
            self.done = true;
            return Some(Err(AttributeError::Malformed(format!(
                "invalid data run control byte 0x{:02X} at {}",
                control, self.pos
            ))));
        }

        let body = self.pos + 1;
        if body + length_bytes + offset_bytes > self.data.len() {
            self.done = true;
            return None;
        }

        let cluster_count = self.read_unsigned(body, length_bytes);
        let is_sparse = offset_bytes == 0;
        let lcn_delta = if is_sparse {
            0
        } else {
            self.read_signed(body + length_bytes, offset_bytes)
        };

        self.pos = body + length_bytes + offset_bytes;

        Some(Ok(DataRun {
            cluster_count,
            lcn_delta,
            is_sparse,
        }))
    }
}

/// Decode a whole run list, failing on the first malformed run
pub fn decode_runs(data: &[u8]) -> AttrResult<Vec<DataRun>> {
    DataRunDecoder::new(data).collect()
}

/// Accumulate deltas into absolute extents
pub fn resolve_extents(runs: &[DataRun], start_vcn: u64) -> Vec<Extent> {
    let mut vcn = start_vcn;
    let mut lcn = 0i64;
    runs.iter()
        .map(|run| {
            let extent_lcn = if run.is_sparse {
                None
            } else {
                lcn = lcn.wrapping_add(run.lcn_delta);
                Some(lcn)
            };
            let extent = Extent {
                vcn,
                lcn: extent_lcn,
                cluster_count: run.cluster_count,
            };
            vcn = vcn.saturating_add(run.cluster_count);
            extent
        })
        .collect()
}

/// Total clusters covered by a run list
pub fn total_clusters(runs: &[DataRun]) -> u64 {
    runs.iter().map(|r| r.cluster_count).sum()
}

#[cfg(test)]
pub(crate) fn encode_runs(runs: &[DataRun]) -> Vec<u8> {
    fn min_unsigned(v: u64) -> usize {
        (1..=8).find(|&n| n == 8 || v >> (n * 8) == 0).unwrap_or(8)
    }
    fn min_signed(v: i64) -> usize {
        (1..=8)
            .find(|&n| {
                let shift = 64 - n * 8;
                n == 8 || (v << shift) >> shift == v
            })
            .unwrap_or(8)
    }

    let mut out = Vec::new();
    for run in runs {
        let len_bytes = min_unsigned(run.cluster_count);
        let off_bytes = if run.is_sparse { 0 } else { min_signed(run.lcn_delta) };
        out.push(((off_bytes << 4) | len_bytes) as u8);
        out.extend_from_slice(&run.cluster_count.to_le_bytes()[..len_bytes]);
        out.extend_from_slice(&run.lcn_delta.to_le_bytes()[..off_bytes]);
    }
    out.push(0);
    out
}
