//! `$DATA` (0x80) and `$LOGGED_UTILITY_STREAM` (0x100)

use crate::error::AttrResult;
use crate::ntfs::attribute::{AttributeForm, AttributeHeader, NonResidentHeader};
use crate::ntfs::bounds::ByteReader;
use crate::ntfs::data_runs::{resolve_extents, total_clusters, DataRun, DataRunDecoder, Extent};
use crate::ntfs::validation::DecodeContext;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DataContent {
    /// Content lives inside the record
    Resident { size: u32, offset: u16 },
    /// Content lives in clusters described by `runs`
    NonResident {
        header: NonResidentHeader,
        runs: Vec<DataRun>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataAttribute {
    /// `None` for the unnamed (default) stream
    pub name: Option<String>,
    pub compressed: bool,
    pub encrypted: bool,
    pub sparse: bool,
    pub content: DataContent,
}

impl DataAttribute {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        let content = match header.form {
            AttributeForm::Resident(ref value) => {
                // Make sure the declared content really is inside the record
                header.value_reader(reader, "$DATA")?;
                DataContent::Resident {
                    size: value.value_length,
                    offset: value.value_offset,
                }
            }
            AttributeForm::NonResident(ref nr) => DataContent::NonResident {
                header: nr.clone(),
                runs: decode_runs_lenient(reader, header, ctx, "$DATA")?,
            },
        };

        Ok(Self {
            name: header.name.clone(),
            compressed: header.is_compressed(),
            encrypted: header.is_encrypted(),
            sparse: header.is_sparse(),
            content,
        })
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    pub fn is_resident(&self) -> bool {
        matches!(self.content, DataContent::Resident { .. })
    }

    /// Logical size of the stream
    pub fn size(&self) -> u64 {
        match self.content {
            DataContent::Resident { size, .. } => size as u64,
            DataContent::NonResident { ref header, .. } => header.actual_size,
        }
    }

    /// Absolute cluster extents; empty for resident content
    pub fn extents(&self) -> Vec<Extent> {
        match self.content {
            DataContent::Resident { .. } => Vec::new(),
            DataContent::NonResident { ref header, ref runs } => resolve_extents(runs, header.start_vcn),
        }
    }

    pub fn summary(&self) -> String {
        let stream = self.name.as_deref().unwrap_or("");
        match self.content {
            DataContent::Resident { size, .. } => format!("{}resident {} bytes", label(stream), size),
            DataContent::NonResident { ref header, ref runs } => format!(
                "{}non-resident {} bytes, {} runs, {} clusters",
                label(stream),
                header.actual_size,
                runs.len(),
                total_clusters(runs)
            ),
        }
    }
}

fn label(stream: &str) -> String {
    if stream.is_empty() {
        String::new()
    } else {
        format!("{}: ", stream)
    }
}

/// Decode a run list, keeping the runs before a malformed control byte
pub(crate) fn decode_runs_lenient(
    reader: &ByteReader<'_>,
    header: &AttributeHeader,
    ctx: &DecodeContext,
    what: &'static str,
) -> AttrResult<Vec<DataRun>> {
    let encoded = header.runs_reader(reader, what)?;
    let mut runs = Vec::new();
    for run in DataRunDecoder::new(encoded.as_slice()) {
        match run {
            Ok(run) => runs.push(run),
            Err(e) => {
                ctx.warn(format_args!("{} run list: {}", what, e));
                break;
            }
        }
    }
    Ok(runs)
}

/// `$LOGGED_UTILITY_STREAM`: opaque bytes owned by EFS or TxF
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggedUtilityStream {
    pub name: Option<String>,
    pub resident: bool,
    pub size: u64,
    /// Raw bytes when resident
    pub data: Vec<u8>,
}

impl LoggedUtilityStream {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, _ctx: &DecodeContext) -> AttrResult<Self> {
        match header.form {
            AttributeForm::Resident(_) => {
                let value = header.value_reader(reader, "$LOGGED_UTILITY_STREAM")?;
                Ok(Self {
                    name: header.name.clone(),
                    resident: true,
                    size: value.len() as u64,
                    data: value.as_slice().to_vec(),
                })
            }
            AttributeForm::NonResident(ref nr) => Ok(Self {
                name: header.name.clone(),
                resident: false,
                size: nr.actual_size,
                data: Vec::new(),
            }),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}{} bytes{}",
            self.name.as_deref().map(|n| format!("{}: ", n)).unwrap_or_default(),
            self.size,
            if self.resident { "" } else { " (non-resident)" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ntfs::attribute::test_support::{non_resident, resident};

    fn decode(attr: &[u8]) -> DataAttribute {
        let reader = ByteReader::new(attr);
        let ctx = DecodeContext::default();
        let header = AttributeHeader::decode(&reader, 0, &ctx).unwrap().unwrap();
        DataAttribute::decode(&reader, &header, &ctx).unwrap()
    }

    #[test]
    fn test_resident_data() {
        let data = decode(&resident(0x80, None, b"0123456789"));
        assert!(data.is_resident());
        assert!(!data.is_named());
        assert_eq!(data.size(), 10);
        assert_eq!(data.summary(), "resident 10 bytes");
    }

    #[test]
    fn test_named_stream() {
        let data = decode(&resident(0x80, Some("Zone.Identifier"), b"[ZoneTransfer]"));
        assert_eq!(data.name.as_deref(), Some("Zone.Identifier"));
        assert_eq!(data.summary(), "Zone.Identifier: resident 14 bytes");
    }

    #[test]
    fn test_non_resident_runs() {
        let data = decode(&non_resident(0x80, 9, 40000, &[0x21, 0x0A, 0x00, 0x10, 0x00]));
        assert_eq!(data.size(), 40000);
        match data.content {
            DataContent::NonResident { ref runs, ref header } => {
                assert_eq!(header.last_vcn, 9);
                assert_eq!(runs.len(), 1);
                assert_eq!(runs[0].cluster_count, 10);
                assert_eq!(runs[0].lcn_delta, 0x1000);
            }
            _ => panic!("expected non-resident content"),
        }
        assert_eq!(data.summary(), "non-resident 40000 bytes, 1 runs, 10 clusters");
        assert_eq!(
            data.extents(),
            vec![Extent { vcn: 0, lcn: Some(0x1000), cluster_count: 10 }]
        );
    }

    #[test]
    fn test_sparse_extent() {
        // 4 clusters at LCN 0x20, then 6 sparse clusters
        let data = decode(&non_resident(0x80, 9, 40960, &[0x11, 0x04, 0x20, 0x01, 0x06, 0x00]));
        let extents = data.extents();
        assert_eq!(extents.len(), 2);
        assert_eq!(extents[1], Extent { vcn: 4, lcn: None, cluster_count: 6 });
        assert!(decode(&resident(0x80, None, b"x")).extents().is_empty());
    }

    #[test]
    fn test_bad_run_keeps_earlier_runs() {
        let data = decode(&non_resident(0x80, 9, 40000, &[0x11, 0x05, 0x20, 0x40, 0x00]));
        match data.content {
            DataContent::NonResident { ref runs, .. } => assert_eq!(runs.len(), 1),
            _ => panic!("expected non-resident content"),
        }
    }

    #[test]
    fn test_logged_utility_stream() {
        let attr = resident(0x100, Some("$EFS"), &[7u8; 20]);
        let reader = ByteReader::new(&attr);
        let ctx = DecodeContext::default();
        let header = AttributeHeader::decode(&reader, 0, &ctx).unwrap().unwrap();
        let lus = LoggedUtilityStream::decode(&reader, &header, &ctx).unwrap();
        assert_eq!(lus.size, 20);
        assert_eq!(lus.data.len(), 20);
        assert_eq!(lus.summary(), "$EFS: 20 bytes");

        let attr = non_resident(0x100, 1, 5000, &[0x11, 0x02, 0x05, 0x00]);
        let reader = ByteReader::new(&attr);
        let header = AttributeHeader::decode(&reader, 0, &ctx).unwrap().unwrap();
        let lus = LoggedUtilityStream::decode(&reader, &header, &ctx).unwrap();
        assert!(!lus.resident);
        assert_eq!(lus.size, 5000);
    }
}
