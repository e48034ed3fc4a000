//! Blob header.
//!
//! Every paged-subtree blob starts with a [`BlobHeader`] containing:
//! - format version
//! - payload length
//! - CRC32 checksum of the payload

use crate::common::{Error, Result};

/// Current on-disk format. Blobs are scratch space, so there is no
/// migration path: anything else is rejected.
pub const FORMAT_VERSION: u8 = 2;

/// Metadata stored at the beginning of every blob.
///
/// # Layout (9 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     version
/// 1       4     payload_len (little-endian)
/// 5       4     checksum (CRC32 of the payload, little-endian)
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlobHeader {
    /// Format version of the payload.
    pub version: u8,
    /// Number of payload bytes following the header.
    pub payload_len: u32,
    /// CRC32 checksum of the payload.
    pub checksum: u32,
}

impl BlobHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 9;

    /// Offset of each field within the header.
    pub const OFFSET_VERSION: usize = 0;
    pub const OFFSET_PAYLOAD_LEN: usize = 1;
    pub const OFFSET_CHECKSUM: usize = 5;

    /// Build the header describing `payload`.
    ///
    /// # Errors
    /// Returns `Error::BlobTooLarge` if the length does not fit the header.
    pub fn for_payload(payload: &[u8]) -> Result<Self> {
        Ok(Self {
            version: FORMAT_VERSION,
            payload_len: Self::encode_len(payload.len())?,
            checksum: Self::compute_checksum(payload),
        })
    }

    /// The header's `payload_len` field for a payload of `len` bytes.
    pub fn encode_len(len: usize) -> Result<u32> {
        u32::try_from(len).map_err(|_| Error::BlobTooLarge(len))
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < BlobHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for BlobHeader");

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&data[Self::OFFSET_PAYLOAD_LEN..Self::OFFSET_PAYLOAD_LEN + 4]);

        let mut checksum_bytes = [0u8; 4];
        checksum_bytes.copy_from_slice(&data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]);

        Self {
            version: data[Self::OFFSET_VERSION],
            payload_len: u32::from_le_bytes(len_bytes),
            checksum: u32::from_le_bytes(checksum_bytes),
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < BlobHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for BlobHeader");

        data[Self::OFFSET_VERSION] = self.version;
        data[Self::OFFSET_PAYLOAD_LEN..Self::OFFSET_PAYLOAD_LEN + 4]
            .copy_from_slice(&self.payload_len.to_le_bytes());
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&self.checksum.to_le_bytes());
    }

    /// Compute the CRC32 checksum of a payload.
    pub fn compute_checksum(payload: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(payload);
        hasher.finalize()
    }

    /// Verify that the stored checksum matches the payload.
    pub fn verify_checksum(&self, payload: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_for_payload() {
        let header = BlobHeader::for_payload(b"subtree").unwrap();
        assert_eq!(header.version, FORMAT_VERSION);
        assert_eq!(header.payload_len, 7);
        assert!(header.verify_checksum(b"subtree"));
    }

    #[test]
    fn test_encode_len_bounds() {
        assert_eq!(BlobHeader::encode_len(0).unwrap(), 0);
        assert_eq!(BlobHeader::encode_len(u32::MAX as usize).unwrap(), u32::MAX);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_encode_len_rejects_oversized_payload() {
        let len = u32::MAX as usize + 1;
        assert!(matches!(BlobHeader::encode_len(len), Err(Error::BlobTooLarge(n)) if n == len));
    }

    #[test]
    fn test_header_default() {
        let header = BlobHeader::default();
        assert_eq!(header.version, 0);
        assert_eq!(header.payload_len, 0);
        assert_eq!(header.checksum, 0);
    }

    #[test]
    fn test_header_byte_layout() {
        let header = BlobHeader {
            version: 1,
            payload_len: 0x04030201,
            checksum: 0x08070605,
        };

        let mut buffer = [0u8; BlobHeader::SIZE];
        header.write_to(&mut buffer);

        assert_eq!(buffer, [1, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(BlobHeader::from_bytes(&buffer), header);
    }

    #[test]
    #[should_panic(expected = "buffer too small")]
    fn test_header_short_buffer() {
        BlobHeader::from_bytes(&[1, 2, 3]);
    }

    #[test]
    fn test_checksum_changes_with_data() {
        let checksum1 = BlobHeader::compute_checksum(b"abc");
        let checksum2 = BlobHeader::compute_checksum(b"abd");
        assert_ne!(checksum1, checksum2);
    }

    #[test]
    fn test_checksum_verify_detects_corruption() {
        let mut payload = vec![0u8; 64];
        payload[10] = 0xAB;
        let header = BlobHeader::for_payload(&payload).unwrap();

        assert!(header.verify_checksum(&payload));

        payload[10] = 0xFF;
        assert!(!header.verify_checksum(&payload));
    }
}
