//! `$OBJECT_ID` (0x40)

use crate::error::{AttrResult, AttributeError};
use crate::ntfs::attribute::AttributeHeader;
use crate::ntfs::bounds::ByteReader;
use crate::ntfs::structs::Guid;
use crate::ntfs::validation::{validate_guid, DecodeContext};
use serde::Serialize;

/// Object id, birth volume id, birth object id, birth domain id
pub const OBJECT_ID_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectId {
    pub object_id: Guid,
    pub birth_volume_id: Guid,
    pub birth_object_id: Guid,
    pub birth_domain_id: Guid,
}

impl ObjectId {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        let value = header.value_reader(reader, "$OBJECT_ID")?;
        if value.len() != OBJECT_ID_SIZE {
            return Err(AttributeError::Malformed(format!(
                "$OBJECT_ID must be {} bytes, got {}",
                OBJECT_ID_SIZE,
                value.len()
            )));
        }

        let guid_at = |offset: usize| -> AttrResult<Guid> {
            validate_guid(&value, offset).into_result()?;
            Guid::from_slice(value.slice(offset, 16)?)
                .ok_or_else(|| AttributeError::Malformed(format!("GUID at {} unreadable", offset)))
        };

        let object_id = Self {
            object_id: guid_at(0)?,
            birth_volume_id: guid_at(16)?,
            birth_object_id: guid_at(32)?,
            birth_domain_id: guid_at(48)?,
        };
        ctx.trace(format_args!("object id {}", object_id.object_id));
        Ok(object_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ntfs::attribute::test_support::resident;

    fn decode_value(value: &[u8]) -> AttrResult<ObjectId> {
        let attr = resident(0x40, None, value);
        let reader = ByteReader::new(&attr);
        let ctx = DecodeContext::default();
        let header = AttributeHeader::decode(&reader, 0, &ctx).unwrap().unwrap();
        ObjectId::decode(&reader, &header, &ctx)
    }

    #[test]
    fn test_four_guids() {
        let value: Vec<u8> = (0u8..64).collect();
        let oid = decode_value(&value).unwrap();
        assert_eq!(oid.object_id.to_string(), "03020100-0504-0706-0809-0A0B0C0D0E0F");
        assert_eq!(oid.birth_domain_id.to_string(), "33323130-3534-3736-3839-3A3B3C3D3E3F");
    }

    #[test]
    fn test_wrong_size_rejected() {
        assert!(decode_value(&[0u8; 16]).is_err());
        assert!(decode_value(&[0u8; 72]).is_err());
    }
}
