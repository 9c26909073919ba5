extern crate alloc;

use {
    crate::{
        error::Result,
        io::{Read, Write},
    },
    alloc::{vec, vec::Vec},
    core::cmp::min,
    zeroize::Zeroize,
};

/// A fixed-capacity buffer with separate read and write cursors.
///
/// The capacity is chosen at run time because the chunk size travels in
/// the stream header rather than in the type.
#[derive(Clone, Debug)]
pub(crate) struct Buf {
    /// Contents are data[read..write].
    /// Read at data[read], write at data[write].
    data: Vec<u8>,
    /// Read offset.
    read: usize,
    /// Write offset.
    write: usize,
}

impl Buf {
    /// Creates a zeroed buffer holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            read: 0,
            write: 0,
        }
    }

    /// Reports whether all bytes have been read.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reports whether the buffer is full and no more data can
    /// be written.
    pub fn is_full(&self) -> bool {
        self.len() == self.data.len()
    }

    /// Returns the number of unread bytes in the buffer.
    pub fn len(&self) -> usize {
        self.write - self.read
    }

    /// Resets the buffer to empty.
    pub fn reset(&mut self) {
        self.read = 0;
        self.write = 0;
    }

    /// Returns the buffer's remaining capacity.
    pub fn remaining_capacity_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.write..]
    }

    /// Returns the unread portion of the buffer.
    pub fn remaining_slice(&self) -> &[u8] {
        &self.data[self.read..self.write]
    }
}

impl Zeroize for Buf {
    fn zeroize(&mut self) {
        self.data.zeroize();
        self.read = 0;
        self.write = 0;
    }
}

impl Drop for Buf {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Read for Buf {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let src = self.remaining_slice();
        let n = min(src.len(), buf.len());
        buf[..n].copy_from_slice(&src[..n]);
        self.read += n;
        Ok(n)
    }
}

impl Write for Buf {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let dst = self.remaining_capacity_mut();
        let n = min(dst.len(), buf.len());
        (dst[..n]).copy_from_slice(&buf[..n]);
        self.write += n;
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buf_write_then_read() {
        const CONTENT: &[u8] = b"hello, world!";
        let mut b = Buf::new(64);
        assert_eq!(b.write(CONTENT).unwrap(), CONTENT.len());
        assert_eq!(b.len(), CONTENT.len());

        let mut got = [0u8; 64];
        let n = b.read(&mut got).unwrap();
        assert_eq!(&got[..n], CONTENT);
        assert!(b.is_empty());
        assert_eq!(b.read(&mut got).unwrap(), 0);
    }

    #[test]
    fn test_buf_small_reads() {
        let mut b = Buf::new(16);
        b.write(&[1, 2, 3, 4, 5]).unwrap();

        let mut got = Vec::new();
        let mut one = [0u8; 2];
        loop {
            let n = b.read(&mut one).unwrap();
            if n == 0 {
                break;
            }
            got.extend_from_slice(&one[..n]);
        }
        assert_eq!(got, &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_buf_fills_to_capacity() {
        let mut b = Buf::new(4);
        assert!(!b.is_full());
        assert_eq!(b.write(&[0u8; 10]).unwrap(), 4);
        assert!(b.is_full());
        assert_eq!(b.write(&[0u8; 10]).unwrap(), 0);

        b.reset();
        assert!(b.is_empty());
        assert_eq!(b.write(&[7u8; 2]).unwrap(), 2);
        assert_eq!(b.remaining_slice(), &[7, 7]);
    }

    #[test]
    fn test_buf_zeroize_clears_cursors() {
        let mut b = Buf::new(8);
        b.write(&[0xau8; 8]).unwrap();
        b.zeroize();
        assert!(b.is_empty());
    }
}
