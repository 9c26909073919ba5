use {
    crate::{
        error::{Error, Result},
        MAX_CHUNK_SIZE,
    },
    byteorder::{ByteOrder, LittleEndian},
};

/// Stream format version emitted and accepted by this crate.
pub(crate) const VERSION: u8 = 1;

/// Size of the little-endian length prefix carried by every frame.
pub(crate) const LEN_PREFIX: usize = 4;

/// Size of the fixed header fields: version, flags, chunk size.
pub(crate) const FIXED_LEN: usize = 1 + 1 + 4;

/// Size of the header as the read side consumes it: the fixed fields
/// followed by the first frame's length prefix.
pub(crate) const FULL_LEN: usize = FIXED_LEN + LEN_PREFIX;

/// Plaintext byte sealed into the terminal chunk.
pub(crate) const EOF_MARKER: u8 = 1;

/// The decoded stream header.
///
/// The write side emits only the fixed fields up front; the first frame's
/// length reaches the wire as that frame's own prefix. The read side pulls
/// both in one go, so it always knows how many bytes the next fill needs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Header {
    /// Maximum plaintext bytes per chunk.
    pub chunk_size: u32,
    /// Length of the first sealed chunk.
    pub first_len: u32,
}

impl Header {
    /// Encodes the fixed header fields written at the start of a stream.
    pub fn encode(chunk_size: u32) -> [u8; FIXED_LEN] {
        let mut b = [0u8; FIXED_LEN];
        b[0] = VERSION;
        b[1] = 0; // flags, reserved
        LittleEndian::write_u32(&mut b[2..], chunk_size);
        b
    }

    /// Decodes the header bytes consumed by the read side.
    pub fn decode(b: &[u8; FULL_LEN]) -> Result<Self> {
        if b[0] != VERSION {
            return Err(Error::InvalidVersion(b[0]));
        }
        let _ = b[1]; // flags, reserved
        let chunk_size = LittleEndian::read_u32(&b[2..6]);
        if chunk_size >= MAX_CHUNK_SIZE {
            return Err(Error::InvalidChunkSize(chunk_size as u64));
        }
        let first_len = LittleEndian::read_u32(&b[6..10]);
        Ok(Self {
            chunk_size,
            first_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(fixed: [u8; FIXED_LEN], first_len: u32) -> [u8; FULL_LEN] {
        let mut b = [0u8; FULL_LEN];
        b[..FIXED_LEN].copy_from_slice(&fixed);
        LittleEndian::write_u32(&mut b[FIXED_LEN..], first_len);
        b
    }

    #[test]
    fn test_header_round_trip() {
        let hdr = Header::decode(&full(Header::encode(65536), 17)).unwrap();
        assert_eq!(
            hdr,
            Header {
                chunk_size: 65536,
                first_len: 17,
            }
        );
    }

    #[test]
    fn test_header_layout() {
        let b = Header::encode(0x01020304);
        assert_eq!(b, [1, 0, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_header_rejects_unknown_version() {
        let mut b = full(Header::encode(16), 17);
        b[0] = 2;
        assert!(matches!(
            Header::decode(&b),
            Err(Error::InvalidVersion(2))
        ));
    }

    #[test]
    fn test_header_rejects_huge_chunk_size() {
        let b = full(Header::encode(MAX_CHUNK_SIZE), 17);
        assert!(matches!(
            Header::decode(&b),
            Err(Error::InvalidChunkSize(_))
        ));

        let b = full(Header::encode(MAX_CHUNK_SIZE - 1), 17);
        assert!(Header::decode(&b).is_ok());
    }

    #[test]
    fn test_header_ignores_flags() {
        let mut b = full(Header::encode(16), 17);
        b[1] = 0xff;
        assert!(Header::decode(&b).is_ok());
    }
}
