//! `$REPARSE_POINT` (0xC0)

use super::resident_value;
use crate::error::{AttrResult, AttributeError};
use crate::ntfs::attribute::AttributeHeader;
use crate::ntfs::bounds::ByteReader;
use crate::ntfs::validation::DecodeContext;
use serde::Serialize;

/// Tag (4), data length (2), reserved (2)
pub const REPARSE_HEADER_SIZE: usize = 8;

pub const REPARSE_TAG_MICROSOFT: u32 = 0x8000_0000;
pub const REPARSE_TAG_NAME_SURROGATE: u32 = 0x2000_0000;

/// Symlinks carry a flags word before the path buffer
const SYMLINK_PATH_BUFFER: usize = 12;
const MOUNT_POINT_PATH_BUFFER: usize = 8;

/// Path names in reparse buffers are bounded by the UNICODE_STRING limit
const MAX_REPARSE_PATH_UNITS: usize = 32767;

macro_rules! reparse_tags {
    ($($variant:ident = $value:expr => $name:expr,)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        pub enum ReparseTag {
            $($variant,)*
            Unknown(u32),
        }

        impl ReparseTag {
            pub fn from_u32(value: u32) -> Self {
                match value {
                    $($value => Self::$variant,)*
                    other => Self::Unknown(other),
                }
            }

            pub fn code(&self) -> u32 {
                match self {
                    $(Self::$variant => $value,)*
                    Self::Unknown(raw) => *raw,
                }
            }

            pub fn name(&self) -> String {
                match self {
                    $(Self::$variant => $name.to_string(),)*
                    Self::Unknown(raw) => format!("UNKNOWN (0x{:08X})", raw),
                }
            }
        }
    };
}

reparse_tags! {
    MountPoint = 0xA000_0003 => "MOUNT_POINT",
    Hsm = 0xC000_0004 => "HSM",
    DriveExtender = 0x8000_0005 => "DRIVE_EXTENDER",
    Hsm2 = 0x8000_0006 => "HSM2",
    Sis = 0x8000_0007 => "SIS",
    Wim = 0x8000_0008 => "WIM",
    Csv = 0x8000_0009 => "CSV",
    Dfs = 0x8000_000A => "DFS",
    FilterManager = 0x8000_000B => "FILTER_MANAGER",
    Symlink = 0xA000_000C => "SYMLINK",
    IisCache = 0xA000_0010 => "IIS_CACHE",
    Dfsr = 0x8000_0012 => "DFSR",
    Dedup = 0x8000_0013 => "DEDUP",
    AppxStream = 0xC000_0014 => "APPXSTRM",
    Nfs = 0x8000_0014 => "NFS",
    FilePlaceholder = 0x8000_0015 => "FILE_PLACEHOLDER",
    Wof = 0x8000_0017 => "WOF",
    Wci = 0x8000_0018 => "WCI",
    Wci1 = 0x9000_1018 => "WCI_1",
    GlobalReparse = 0xA000_0019 => "GLOBAL_REPARSE",
    Cloud = 0x9000_001A => "CLOUD",
    AppExecLink = 0x8000_001B => "APPEXECLINK",
    ProjFs = 0x9000_001C => "PROJFS",
    LxSymlink = 0xA000_001D => "LX_SYMLINK",
    StorageSync = 0x8000_001E => "STORAGE_SYNC",
    WciTombstone = 0xA000_001F => "WCI_TOMBSTONE",
    Unhandled = 0x8000_0020 => "UNHANDLED",
    OneDrive = 0x8000_0021 => "ONEDRIVE",
    ProjFsTombstone = 0xA000_0022 => "PROJFS_TOMBSTONE",
    AfUnix = 0x8000_0023 => "AF_UNIX",
}

impl ReparseTag {
    pub fn is_microsoft(&self) -> bool {
        self.code() & REPARSE_TAG_MICROSOFT != 0
    }

    pub fn is_name_surrogate(&self) -> bool {
        self.code() & REPARSE_TAG_NAME_SURROGATE != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReparsePoint {
    pub tag: ReparseTag,
    pub data_length: u16,
    /// Raw payload after the 8-byte header
    pub data: Vec<u8>,
    /// Substitute name, for symlinks and mount points
    pub target: Option<String>,
    pub print_name: Option<String>,
    /// Symlink flags (1 = relative)
    pub symlink_flags: Option<u32>,
}

impl ReparsePoint {
    pub fn decode(reader: &ByteReader<'_>, header: &AttributeHeader, ctx: &DecodeContext) -> AttrResult<Self> {
        let value = resident_value(reader, header, "$REPARSE_POINT", REPARSE_HEADER_SIZE)?;

        let tag = ReparseTag::from_u32(value.u32_at(0)?);
        let data_length = value.u16_at(4)?;
        if data_length as usize > value.len() - REPARSE_HEADER_SIZE {
            return Err(AttributeError::Malformed(format!(
                "reparse data length {} exceeds the {} bytes available",
                data_length,
                value.len() - REPARSE_HEADER_SIZE
            )));
        }
        let payload = value.sub(REPARSE_HEADER_SIZE, data_length as usize)?;

        if let ReparseTag::Unknown(raw) = tag {
            ctx.trace(format_args!("unknown reparse tag 0x{:08X}", raw));
        }

        let mut point = Self {
            tag,
            data_length,
            data: payload.as_slice().to_vec(),
            target: None,
            print_name: None,
            symlink_flags: None,
        };

        match tag {
            ReparseTag::Symlink if payload.len() >= SYMLINK_PATH_BUFFER => {
                point.symlink_flags = Some(payload.u32_at(8)?);
                point.read_names(&payload, SYMLINK_PATH_BUFFER, ctx)?;
            }
            ReparseTag::MountPoint if payload.len() >= MOUNT_POINT_PATH_BUFFER => {
                point.read_names(&payload, MOUNT_POINT_PATH_BUFFER, ctx)?;
            }
            _ => {}
        }

        Ok(point)
    }

    /// Substitute and print names: (offset, length) pairs in bytes relative
    /// to the path buffer. Names that fall outside the payload are skipped.
    fn read_names(&mut self, payload: &ByteReader<'_>, path_buffer: usize, ctx: &DecodeContext) -> AttrResult<()> {
        let substitute = (payload.u16_at(0)? as usize, payload.u16_at(2)? as usize);
        let print = (payload.u16_at(4)? as usize, payload.u16_at(6)? as usize);

        let read = |(offset, length): (usize, usize), label: &str| -> Option<String> {
            let start = path_buffer + offset;
            if start + length > payload.len() {
                ctx.warn(format_args!("reparse {} name outside payload", label));
                return None;
            }
            match payload.utf16_at(start, length / 2, MAX_REPARSE_PATH_UNITS) {
                Ok(name) => Some(name),
                Err(e) => {
                    ctx.warn(format_args!("reparse {} name: {}", label, e));
                    None
                }
            }
        };

        self.target = read(substitute, "substitute");
        self.print_name = read(print, "print");
        Ok(())
    }

    pub fn is_relative_symlink(&self) -> bool {
        self.symlink_flags.map(|f| f & 1 != 0).unwrap_or(false)
    }

    pub fn summary(&self) -> String {
        match (&self.print_name, &self.target) {
            (Some(print), _) if !print.is_empty() => format!("{} -> {}", self.tag.name(), print),
            (_, Some(target)) => format!("{} -> {}", self.tag.name(), target),
            _ => self.tag.name(),
        }
    }
}
