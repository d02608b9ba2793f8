//! `$SECURITY_DESCRIPTOR` (0x50)
//!
//! A self-relative security descriptor: a 20-byte header followed by the
//! owner SID, group SID, SACL and DACL at header-given offsets. Every offset
//! is checked against the attribute's own value length.

use super::resident_value;
use crate::error::{AttrResult, AttributeError};
use crate::ntfs::attribute::AttributeHeader;
use crate::ntfs::bounds::ByteReader;
use crate::ntfs::validation::DecodeContext;
use serde::Serialize;

pub const SECURITY_DESCRIPTOR_HEADER_SIZE: usize = 20;

/// Largest sub-authority count a SID may declare
pub const SID_MAX_SUB_AUTHORITIES: u8 = 15;

pub const ACE_ACCESS_ALLOWED: u8 = 0;
pub const ACE_ACCESS_DENIED: u8 = 1;
pub const ACE_SYSTEM_AUDIT: u8 = 2;
pub const ACE_SYSTEM_ALARM: u8 = 3;

const CONTROL_FLAGS: &[(u16, &str)] = &[
    (0x0001, "OWNER_DEFAULTED"),
    (0x0002, "GROUP_DEFAULTED"),
    (0x0004, "DACL_PRESENT"),
    (0x0008, "DACL_DEFAULTED"),
    (0x0010, "SACL_PRESENT"),
    (0x0020, "SACL_DEFAULTED"),
    (0x0100, "DACL_AUTO_INHERIT_REQ"),
    (0x0200, "SACL_AUTO_INHERIT_REQ"),
    (0x0400, "DACL_AUTO_INHERITED"),
    (0x0800, "SACL_AUTO_INHERITED"),
    (0x1000, "DACL_PROTECTED"),
    (0x2000, "SACL_PROTECTED"),
    (0x4000, "RM_CONTROL_VALID"),
    (0x8000, "SELF_RELATIVE"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ace {
    pub ace_type: u8,
    pub flags: u8,
    pub size: u16,
    pub access_mask: u32,
    pub sid: Option<String>,
}

impl Ace {
    pub fn type_name(&self) -> &'static str {
        match self.ace_type {
            ACE_ACCESS_ALLOWED => "ALLOW",
            ACE_ACCESS_DENIED => "DENY",
            ACE_SYSTEM_AUDIT => "AUDIT",
            ACE_SYSTEM_ALARM => "ALARM",
            _ => "OTHER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Acl {
    pub revision: u8,
    pub size: u16,
    pub ace_count: u16,
    pub aces: Vec<Ace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityDescriptor {
    pub revision: u8,
    pub control: u16,
    pub owner_offset: u32,
    pub group_offset: u32,
    pub sacl_offset: u32,
    pub dacl_offset: u32,
    pub owner_sid: Option<String>,
    pub group_sid: Option<String>,
    pub sacl: Option<Acl>,
    pub dacl: Option<Acl>,
}

impl SecurityDescriptor {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        let value = resident_value(
            reader,
            header,
            "$SECURITY_DESCRIPTOR",
            SECURITY_DESCRIPTOR_HEADER_SIZE,
        )?;
        let len = value.len();

        let revision = value.u8_at(0)?;
        let control = value.u16_at(2)?;
        let owner_offset = value.u32_at(4)?;
        let group_offset = value.u32_at(8)?;
        let sacl_offset = value.u32_at(12)?;
        let dacl_offset = value.u32_at(16)?;

        if revision != 1 {
            ctx.warn(format_args!("security descriptor revision {}", revision));
        }

        for (label, offset) in [
            ("owner", owner_offset),
            ("group", group_offset),
            ("SACL", sacl_offset),
            ("DACL", dacl_offset),
        ] {
            if offset as usize >= len {
                return Err(AttributeError::Malformed(format!(
                    "{} offset {} outside descriptor of {} bytes",
                    label, offset, len
                )));
            }
        }

        let sid_at = |offset: u32, label: &str| -> Option<String> {
            if offset == 0 {
                return None;
            }
            match parse_sid(&value, offset as usize) {
                Ok((sid, _)) => Some(sid),
                Err(e) => {
                    ctx.warn(format_args!("{} SID: {}", label, e));
                    None
                }
            }
        };
        let acl_at = |offset: u32, label: &str| -> Option<Acl> {
            if offset == 0 {
                return None;
            }
            match parse_acl(&value, offset as usize, ctx) {
                Ok(acl) => Some(acl),
                Err(e) => {
                    ctx.warn(format_args!("{}: {}", label, e));
                    None
                }
            }
        };

        Ok(Self {
            revision,
            control,
            owner_offset,
            group_offset,
            sacl_offset,
            dacl_offset,
            owner_sid: sid_at(owner_offset, "owner"),
            group_sid: sid_at(group_offset, "group"),
            sacl: acl_at(sacl_offset, "SACL"),
            dacl: acl_at(dacl_offset, "DACL"),
        })
    }

    pub fn control_names(&self) -> Vec<&'static str> {
        CONTROL_FLAGS
            .iter()
            .filter(|(bit, _)| self.control & bit != 0)
            .map(|(_, name)| *name)
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "Owner: {}, Group: {}, DACL ACEs: {}, SACL ACEs: {}",
            self.owner_sid.as_deref().unwrap_or("-"),
            self.group_sid.as_deref().unwrap_or("-"),
            self.dacl.as_ref().map_or(0, |a| a.aces.len()),
            self.sacl.as_ref().map_or(0, |a| a.aces.len())
        )
    }
}

/// Parse a SID into `S-R-A-S1-...` form; returns the text and its byte size
pub fn parse_sid(reader: &ByteReader<'_>, offset: usize) -> AttrResult<(String, usize)> {
    let revision = reader.u8_at(offset)?;
    let count = reader.u8_at(offset + 1)?;
    if count > SID_MAX_SUB_AUTHORITIES {
        return Err(AttributeError::Malformed(format!(
            "SID declares {} sub-authorities (max {})",
            count, SID_MAX_SUB_AUTHORITIES
        )));
    }

    let size = 8 + count as usize * 4;
    reader.check(offset, size)?;

    let authority = reader
        .slice(offset + 2, 6)?
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64);

    let mut sid = format!("S-{}-{}", revision, authority);
    for i in 0..count as usize {
        sid.push('-');
        sid.push_str(&reader.u32_at(offset + 8 + i * 4)?.to_string());
    }
    Ok((sid, size))
}

/// Parse an ACL and walk its ACEs
pub fn parse_acl(reader: &ByteReader<'_>, offset: usize, ctx: &DecodeContext) -> AttrResult<Acl> {
    let revision = reader.u8_at(offset)?;
    let size = reader.u16_at(offset + 2)?;
    let ace_count = reader.u16_at(offset + 4)?;

    if (size as usize) < 8 {
        return Err(AttributeError::Malformed(format!("ACL size {} below header size", size)));
    }
    let acl_end = (offset + size as usize).min(reader.len());

    let mut aces = Vec::new();
    let mut pos = offset + 8;
    for _ in 0..ace_count {
        if pos + 8 > acl_end {
            break;
        }
        let ace_type = reader.u8_at(pos)?;
        let flags = reader.u8_at(pos + 1)?;
        let ace_size = reader.u16_at(pos + 2)?;
        if (ace_size as usize) < 8 || pos + ace_size as usize > acl_end {
            ctx.warn(format_args!("ACE at {} has bad size {}", pos, ace_size));
            break;
        }
        let access_mask = reader.u32_at(pos + 4)?;

        let sid = if ace_type <= ACE_SYSTEM_ALARM && ace_size as usize > 8 {
            let ace = reader.sub(pos, ace_size as usize)?;
            parse_sid(&ace, 8).ok().map(|(sid, _)| sid)
        } else {
            None
        };

        aces.push(Ace {
            ace_type,
            flags,
            size: ace_size,
            access_mask,
            sid,
        });
        pos += ace_size as usize;
    }

    if aces.len() < ace_count as usize {
        ctx.warn(format_args!("ACL declares {} ACEs, decoded {}", ace_count, aces.len()));
    }

    Ok(Acl {
        revision,
        size,
        ace_count,
        aces,
    })
}
