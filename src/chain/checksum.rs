//! CRC32 checksums for catalog files
//!
//! Format: `crc32:XXXXXXXX` (lowercase hex, zero-padded). Checksums are
//! recorded in the chain manifest when a catalog is written and verified
//! before the catalog is parsed.

use crc32fast::Hasher;

use super::errors::{ChainError, ChainResult};

/// Computes a CRC32 checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Formats a CRC32 checksum.
///
/// ```
/// use chainrestore::chain::format_checksum;
/// assert_eq!(format_checksum(0xDEADBEEF), "crc32:deadbeef");
/// ```
pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}

/// Parses a formatted checksum string back to u32.
pub fn parse_checksum(value: &str) -> ChainResult<u32> {
    let hex = value
        .strip_prefix("crc32:")
        .filter(|hex| hex.len() == 8)
        .ok_or_else(|| ChainError::checksum_format(value))?;

    u32::from_str_radix(hex, 16).map_err(|_| ChainError::checksum_format(value))
}

/// Checks `data` against a formatted checksum.
pub fn verify_checksum(data: &[u8], expected: &str) -> ChainResult<bool> {
    Ok(compute_checksum(data) == parse_checksum(expected)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_deterministic() {
        assert_eq!(compute_checksum(b"catalog"), compute_checksum(b"catalog"));
        assert_ne!(compute_checksum(b"catalog"), compute_checksum(b"catalog!"));
    }

    #[test]
    fn test_format_then_parse() {
        let formatted = format_checksum(0x0000_00ff);
        assert_eq!(formatted, "crc32:000000ff");
        assert_eq!(parse_checksum(&formatted).unwrap(), 0xff);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_checksum("md5:00000000").is_err());
        assert!(parse_checksum("crc32:123").is_err());
        assert!(parse_checksum("crc32:zzzzzzzz").is_err());
    }

    #[test]
    fn test_verify_checksum() {
        let data = br#"{"entries":{}}"#;
        let expected = format_checksum(compute_checksum(data));
        assert!(verify_checksum(data, &expected).unwrap());
        assert!(!verify_checksum(b"tampered", &expected).unwrap());
    }
}
