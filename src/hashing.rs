//! Digests of raw record bytes

use md5::Md5;
use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};

/// Lowercase hex digests of one record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RecordHashes {
    pub md5: String,
    pub sha256: String,
    pub sha512: String,
    pub crc32: String,
}

/// Hash `bytes` with all four algorithms
pub fn compute(bytes: &[u8]) -> RecordHashes {
    RecordHashes {
        md5: hex::encode(Md5::digest(bytes)),
        sha256: hex::encode(Sha256::digest(bytes)),
        sha512: hex::encode(Sha512::digest(bytes)),
        crc32: format!("{:08x}", crc32fast::hash(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests() {
        let hashes = compute(b"abc");
        assert_eq!(hashes.md5, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            hashes.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(hashes.sha512.starts_with("ddaf35a193617aba"));
        assert_eq!(hashes.sha512.len(), 128);
        assert_eq!(hashes.crc32, "352441c2");
    }

    #[test]
    fn test_crc32_is_zero_padded() {
        assert_eq!(compute(b"").crc32, "00000000");
    }
}
