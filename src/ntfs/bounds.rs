//! Bounds-checked primitive readers
//!
//! Every read names its width and fails with `AttributeError::OutOfBounds`
//! unless `offset + width <= len`. Nothing here returns zero-filled data for a
//! field that is not actually in the buffer.

use crate::error::{AttrResult, AttributeError};
use byteorder::{ByteOrder, LittleEndian};

/// Little-endian reader over a borrowed record buffer
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Fail unless `width` bytes are available at `offset`
    pub fn check(&self, offset: usize, width: usize) -> AttrResult<()> {
        match offset.checked_add(width) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(AttributeError::OutOfBounds {
                offset,
                width,
                len: self.data.len(),
            }),
        }
    }

    pub fn slice(&self, offset: usize, width: usize) -> AttrResult<&'a [u8]> {
        self.check(offset, width)?;
        Ok(&self.data[offset..offset + width])
    }

    /// Narrow the reader to a sub-span; offsets then become span-relative
    pub fn sub(&self, offset: usize, width: usize) -> AttrResult<ByteReader<'a>> {
        Ok(ByteReader::new(self.slice(offset, width)?))
    }

    pub fn u8_at(&self, offset: usize) -> AttrResult<u8> {
        Ok(self.slice(offset, 1)?[0])
    }

    pub fn u16_at(&self, offset: usize) -> AttrResult<u16> {
        Ok(LittleEndian::read_u16(self.slice(offset, 2)?))
    }

    pub fn u32_at(&self, offset: usize) -> AttrResult<u32> {
        Ok(LittleEndian::read_u32(self.slice(offset, 4)?))
    }

    pub fn u64_at(&self, offset: usize) -> AttrResult<u64> {
        Ok(LittleEndian::read_u64(self.slice(offset, 8)?))
    }

    /// Read `units` UTF-16LE code units at `offset`.
    ///
    /// Rejects spans longer than `max_units`, unpaired surrogates, and reads
    /// past the end. Decoding stops at the first NUL.
    pub fn utf16_at(&self, offset: usize, units: usize, max_units: usize) -> AttrResult<String> {
        if units > max_units {
            return Err(AttributeError::Malformed(format!(
                "string of {} UTF-16 units exceeds limit of {}",
                units, max_units
            )));
        }

        let bytes = self.slice(offset, units * 2)?;
        let mut code_units: Vec<u16> = bytes.chunks_exact(2).map(LittleEndian::read_u16).collect();
        if let Some(nul) = code_units.iter().position(|&u| u == 0) {
            code_units.truncate(nul);
        }

        check_surrogates(&code_units).map_err(AttributeError::InvalidUtf16)?;
        String::from_utf16(&code_units).map_err(|e| AttributeError::InvalidUtf16(e.to_string()))
    }
}

/// Verify that every high surrogate is followed by a low one and no low
/// surrogate appears on its own
pub fn check_surrogates(units: &[u16]) -> Result<(), String> {
    let mut i = 0;
    while i < units.len() {
        match units[i] {
            0xD800..=0xDBFF => match units.get(i + 1) {
                Some(0xDC00..=0xDFFF) => i += 2,
                _ => {
                    return Err(format!(
                        "high surrogate 0x{:04X} at unit {} is not followed by a low surrogate",
                        units[i], i
                    ))
                }
            },
            0xDC00..=0xDFFF => {
                return Err(format!(
                    "unpaired low surrogate 0x{:04X} at unit {}",
                    units[i], i
                ))
            }
            _ => i += 1,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn test_reads_in_bounds() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let reader = ByteReader::new(&data);
        assert_eq!(reader.u8_at(7).unwrap(), 0x08);
        assert_eq!(reader.u16_at(0).unwrap(), 0x0201);
        assert_eq!(reader.u32_at(4).unwrap(), 0x08070605);
        assert_eq!(reader.u64_at(0).unwrap(), 0x0807060504030201);
    }

    #[test]
    fn test_reads_out_of_bounds() {
        let data = [0u8; 8];
        let reader = ByteReader::new(&data);
        assert_eq!(
            reader.u32_at(5),
            Err(AttributeError::OutOfBounds { offset: 5, width: 4, len: 8 })
        );
        assert!(reader.u64_at(1).is_err());
        assert!(reader.u8_at(8).is_err());
        assert!(reader.slice(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_sub_reader_is_relative() {
        let data = [0xAA, 0xBB, 0x34, 0x12, 0xCC];
        let reader = ByteReader::new(&data).sub(2, 2).unwrap();
        assert_eq!(reader.u16_at(0).unwrap(), 0x1234);
        assert!(reader.u8_at(2).is_err());
    }

    #[test]
    fn test_utf16_decode() {
        let bytes = utf16le("test.txt");
        let reader = ByteReader::new(&bytes);
        assert_eq!(reader.utf16_at(0, 8, 255).unwrap(), "test.txt");
        assert!(reader.utf16_at(0, 9, 255).is_err());
        assert!(reader.utf16_at(0, 8, 4).is_err());
    }

    #[test]
    fn test_utf16_stops_at_nul() {
        let mut bytes = utf16le("abc");
        bytes.extend_from_slice(&[0, 0, b'x', 0]);
        assert_eq!(ByteReader::new(&bytes).utf16_at(0, 5, 255).unwrap(), "abc");
    }

    #[test]
    fn test_surrogate_pairing() {
        assert!(check_surrogates(&[0xD83D, 0xDE00]).is_ok());
        assert!(check_surrogates(&[0xD83D, 0x0041]).is_err());
        assert!(check_surrogates(&[0xD83D]).is_err());
        assert!(check_surrogates(&[0x0041, 0xDE00]).is_err());

        let bytes = [0x3D, 0xD8, 0x41, 0x00];
        assert!(matches!(
            ByteReader::new(&bytes).utf16_at(0, 2, 255),
            Err(AttributeError::InvalidUtf16(_))
        ));
    }
}
