use {
    crate::NONCE_SIZE,
    byteorder::{ByteOrder, LittleEndian},
};

/// First byte of the counter region.
const COUNTER_START: usize = NONCE_SIZE;

/// Width of the counter region.
const COUNTER_LEN: usize = 8;

/// Terminal marker: the high bit of the final nonce byte.
const TERMINAL_BIT: u8 = 0x80;

/// Copies `base` into the prefix of `nonce` and zeroes the counter region.
///
/// The caller's base nonce is never touched again; the working copy is
/// owned by the component and wiped on close.
pub(crate) fn init(nonce: &mut [u8], base: &[u8; NONCE_SIZE]) {
    nonce[..NONCE_SIZE].copy_from_slice(base);
    nonce[NONCE_SIZE..].fill(0);
}

/// Advances the counter region by one.
///
/// The counter is an 8-byte little-endian integer, so a stream can carry
/// up to 2^64 chunks under one base nonce.
pub(crate) fn advance(nonce: &mut [u8]) {
    let ctr = &mut nonce[COUNTER_START..COUNTER_START + COUNTER_LEN];
    let n = LittleEndian::read_u64(ctr).wrapping_add(1);
    LittleEndian::write_u64(ctr, n);
}

/// Marks the nonce as belonging to the terminal chunk.
///
/// Sealing the final chunk under a marked nonce means truncating a stream
/// at a chunk boundary cannot pass authentication.
pub(crate) fn mark_terminal(nonce: &mut [u8]) {
    nonce[COUNTER_START + COUNTER_LEN - 1] |= TERMINAL_BIT;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_zeroes_counter() {
        let base = [0xab; NONCE_SIZE];
        let mut nonce = [0xff; 24];
        init(&mut nonce, &base);
        assert_eq!(&nonce[..16], &base);
        assert_eq!(&nonce[16..], &[0; 8]);
    }

    #[test]
    fn test_advance_is_little_endian() {
        let mut nonce = [0u8; 24];
        advance(&mut nonce);
        assert_eq!(&nonce[16..], &[1, 0, 0, 0, 0, 0, 0, 0]);
        advance(&mut nonce);
        assert_eq!(&nonce[16..], &[2, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_advance_carries() {
        let mut nonce = [0u8; 24];
        nonce[16..].copy_from_slice(&[0xff, 0xff, 0, 0, 0, 0, 0, 0]);
        advance(&mut nonce);
        assert_eq!(&nonce[16..], &[0, 0, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_advance_leaves_prefix_alone() {
        let base = [7u8; NONCE_SIZE];
        let mut nonce = [0u8; 24];
        init(&mut nonce, &base);
        for _ in 0..300 {
            advance(&mut nonce);
        }
        assert_eq!(&nonce[..16], &base);
        assert_eq!(&nonce[16..18], &[44, 1]);
    }

    #[test]
    fn test_mark_terminal_sets_high_bit() {
        let mut nonce = [0u8; 24];
        nonce[23] = 3;
        mark_terminal(&mut nonce);
        assert_eq!(nonce[23], 0x83);
        mark_terminal(&mut nonce);
        assert_eq!(nonce[23], 0x83);
    }
}
