//! Payload compression hook.
//!
//! Large binary fields of a record (observation images in particular) can be
//! passed through a codec before storage and after retrieval. The memory
//! treats compressed bytes as opaque; it never inspects them and shape checks
//! always run against the raw, pre-compression payload.

use crate::ReplayMemoryError;

/// Compress/decompress pair applied to record payloads at the storage boundary.
pub trait PayloadCodec {
    /// Compresses a raw payload for storage.
    fn compress(&self, raw: &[u8]) -> Vec<u8>;

    /// Decompresses a stored payload back to its raw form.
    fn decompress(&self, stored: &[u8]) -> Result<Vec<u8>, ReplayMemoryError>;
}

/// LZ4 codec with the uncompressed size prepended to the stored bytes.
#[derive(Clone, Debug, Default)]
pub struct Lz4Codec;

impl PayloadCodec for Lz4Codec {
    fn compress(&self, raw: &[u8]) -> Vec<u8> {
        lz4_flex::compress_prepend_size(raw)
    }

    fn decompress(&self, stored: &[u8]) -> Result<Vec<u8>, ReplayMemoryError> {
        lz4_flex::decompress_size_prepended(stored)
            .map_err(|e| ReplayMemoryError::Decompression(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Lz4Codec, PayloadCodec};

    #[test]
    fn test_lz4_roundtrip() {
        let codec = Lz4Codec;
        let raw = vec![7u8; 4096];
        let stored = codec.compress(&raw);
        assert!(stored.len() < raw.len());
        assert_eq!(codec.decompress(&stored).unwrap(), raw);
    }

    #[test]
    fn test_lz4_rejects_garbage() {
        let codec = Lz4Codec;
        assert!(codec.decompress(&[0xff, 0xff]).is_err());
    }
}
