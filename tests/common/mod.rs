//! Synthetic record builders shared by the integration tests

#![allow(dead_code)]

pub const RECORD_SIZE: usize = 1024;
pub const SECTOR_SIZE: usize = 512;

pub const FLAG_IN_USE: u16 = 0x0001;
pub const FLAG_DIRECTORY: u16 = 0x0002;

/// Root directory reference, sequence 5
pub const ROOT_REFERENCE: u64 = 5 | (5 << 48);

/// A resident attribute, value at 0x18, length 8-byte aligned
pub fn resident(type_code: u32, value: &[u8]) -> Vec<u8> {
    let value_offset = 0x18usize;
    let length = (value_offset + value.len() + 7) & !7;

    let mut buf = vec![0u8; length];
    buf[0..4].copy_from_slice(&type_code.to_le_bytes());
    buf[4..8].copy_from_slice(&(length as u32).to_le_bytes());
    buf[0x10..0x14].copy_from_slice(&(value.len() as u32).to_le_bytes());
    buf[0x14..0x16].copy_from_slice(&(value_offset as u16).to_le_bytes());
    buf[value_offset..value_offset + value.len()].copy_from_slice(value);
    buf
}

/// `$STANDARD_INFORMATION` with all four times set to `ticks`
pub fn standard_information(ticks: u64) -> Vec<u8> {
    let mut value = vec![0u8; 48];
    for i in 0..4 {
        value[i * 8..i * 8 + 8].copy_from_slice(&ticks.to_le_bytes());
    }
    resident(0x10, &value)
}

/// Win32 `$FILE_NAME` under `parent`
pub fn file_name(name: &str, parent: u64) -> Vec<u8> {
    let units: Vec<u16> = name.encode_utf16().collect();
    let mut value = vec![0u8; 66 + units.len() * 2];
    value[0..8].copy_from_slice(&parent.to_le_bytes());
    value[48..56].copy_from_slice(&(name.len() as u64).to_le_bytes());
    value[64] = units.len() as u8;
    value[65] = 1;
    for (i, unit) in units.iter().enumerate() {
        value[66 + i * 2..68 + i * 2].copy_from_slice(&unit.to_le_bytes());
    }
    resident(0x30, &value)
}

/// Build a 1024-byte record: header, attributes from offset 56, end
/// marker, and an update sequence array protecting both sector ends
pub fn build_record(record_number: u32, flags: u16, attrs: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = vec![0u8; RECORD_SIZE];
    buf[0..4].copy_from_slice(b"FILE");
    buf[4..6].copy_from_slice(&48u16.to_le_bytes());
    buf[6..8].copy_from_slice(&3u16.to_le_bytes());
    buf[16..18].copy_from_slice(&1u16.to_le_bytes());
    buf[18..20].copy_from_slice(&1u16.to_le_bytes());
    buf[20..22].copy_from_slice(&56u16.to_le_bytes());
    buf[22..24].copy_from_slice(&flags.to_le_bytes());
    buf[28..32].copy_from_slice(&(RECORD_SIZE as u32).to_le_bytes());
    buf[44..48].copy_from_slice(&record_number.to_le_bytes());

    let mut offset = 56;
    for attr in attrs {
        buf[offset..offset + attr.len()].copy_from_slice(attr);
        offset += attr.len();
    }
    buf[offset..offset + 4].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    buf[24..28].copy_from_slice(&((offset + 8) as u32).to_le_bytes());

    protect_sectors(&mut buf, 0x0001);
    buf
}

/// Move each sector's last two bytes into the update sequence array and
/// stamp the sector end with `usn`
pub fn protect_sectors(buf: &mut [u8], usn: u16) {
    buf[48..50].copy_from_slice(&usn.to_le_bytes());
    for i in 1..=RECORD_SIZE / SECTOR_SIZE {
        let end = i * SECTOR_SIZE - 2;
        let saved = [buf[end], buf[end + 1]];
        buf[48 + i * 2..50 + i * 2].copy_from_slice(&saved);
        buf[end..end + 2].copy_from_slice(&usn.to_le_bytes());
    }
}

/// A directory record named `name` under `parent`
pub fn directory(record_number: u32, name: &str, parent: u64) -> Vec<u8> {
    build_record(
        record_number,
        FLAG_IN_USE | FLAG_DIRECTORY,
        &[standard_information(0), file_name(name, parent)],
    )
}

/// A file record named `name` under `parent`
pub fn file(record_number: u32, name: &str, parent: u64) -> Vec<u8> {
    build_record(
        record_number,
        FLAG_IN_USE,
        &[standard_information(0), file_name(name, parent)],
    )
}

/// Reference to `record_number` with sequence 1
pub fn reference(record_number: u64) -> u64 {
    record_number | (1 << 48)
}
