//! `$BITMAP` (0xB0)

use crate::error::AttrResult;
use crate::ntfs::attribute::{AttributeForm, AttributeHeader};
use crate::ntfs::bounds::ByteReader;
use crate::ntfs::validation::DecodeContext;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitCounts {
    pub total: u64,
    pub set: u64,
    pub clear: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bitmap {
    pub name: Option<String>,
    /// Logical size in bytes
    pub size: u64,
    /// Only known for resident bitmaps
    pub bits: Option<BitCounts>,
}

impl Bitmap {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, _ctx: &DecodeContext) -> AttrResult<Self> {
        match header.form {
            AttributeForm::Resident(_) => {
                let value = header.value_reader(reader, "$BITMAP")?;
                let set: u64 = value.as_slice().iter().map(|b| b.count_ones() as u64).sum();
                let total = value.len() as u64 * 8;
                Ok(Self {
                    name: header.name.clone(),
                    size: value.len() as u64,
                    bits: Some(BitCounts {
                        total,
                        set,
                        clear: total - set,
                    }),
                })
            }
            AttributeForm::NonResident(ref nr) => Ok(Self {
                name: header.name.clone(),
                size: nr.actual_size,
                bits: None,
            }),
        }
    }

    pub fn summary(&self) -> String {
        match self.bits {
            Some(bits) => format!("{} of {} bits set", bits.set, bits.total),
            None => format!("{} bytes (non-resident)", self.size),
        }
    }
}
