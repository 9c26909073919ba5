use crate::error::{Error, Result};

/// Read is the byte-source side of the codec, equivalent to
/// [`std::io::Read`] but usable without `std`.
///
/// When the `std` feature is enabled, every [`std::io::Read`]
/// implementor is a [`Read`], so files, sockets, and byte slices can be
/// handed to a [`Decryptor`][crate::Decryptor] directly.
pub trait Read {
    /// Pulls at most `buf.len()` bytes from the source.
    ///
    /// A return of zero means the source is exhausted. Implementations
    /// may return [`Error::Interrupted`] for operations worth retrying;
    /// the codec's read loops retry those instead of latching them.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Fills `buf` completely or fails with [`Error::UnexpectedEof`]
    /// carrying the number of bytes obtained.
    ///
    /// Only the stream header is read this way. Frame reads are allowed
    /// to come up short, since a short count is how the terminal chunk
    /// announces itself.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = read_full(self, buf)?;
        if n < buf.len() {
            return Err(Error::UnexpectedEof(n));
        }
        Ok(())
    }
}

/// Reads until `buf` is full or the source is exhausted, returning the
/// number of bytes obtained.
///
/// Short counts are not an error here: each frame read asks for the
/// frame plus the next length prefix, and the terminal frame is
/// recognized precisely by the source running dry early. Interrupted
/// reads are retried rather than surfaced, so a spurious wakeup never
/// poisons a stream's latched error state.
pub(crate) fn read_full<R: Read + ?Sized>(
    r: &mut R,
    buf: &mut [u8],
) -> Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match r.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(m) => n += m,
            Err(Error::Interrupted) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(n)
}

/// Write is the byte-sink side of the codec, equivalent to
/// [`std::io::Write`] but usable without `std`.
///
/// When the `std` feature is enabled, every [`std::io::Write`]
/// implementor is a [`Write`].
pub trait Write {
    /// Pushes bytes from `buf` into the sink, returning how many were
    /// accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Writes the whole of `buf`, failing with [`Error::ShortWrite`]
    /// carrying the number of bytes written if the sink stops accepting
    /// data.
    ///
    /// Frames must land on the sink whole; once a frame write fails,
    /// the error latches and the stream cannot be resumed. Interrupted
    /// writes are retried, not latched.
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut n = 0;
        while n < buf.len() {
            match self.write(&buf[n..]) {
                Ok(0) => return Err(Error::ShortWrite(n)),
                Ok(m) => n += m,
                Err(Error::Interrupted) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Equivalent to [`std::io::Write::flush`].
    fn flush(&mut self) -> Result<()>;
}

#[cfg(feature = "std")]
mod std_io {
    use crate::{Read, Result, Write};

    // Thin conversions only. Retry and latching decisions belong to the
    // codec's own read and write loops, which see std's Interrupted as
    // [`Error::Interrupted`] through the error conversion.
    impl<T: std::io::Read> Read for T {
        #[inline]
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            Ok(std::io::Read::read(self, buf)?)
        }
    }

    impl<T: std::io::Write> Write for T {
        #[inline]
        fn write(&mut self, buf: &[u8]) -> Result<usize> {
            Ok(std::io::Write::write(self, buf)?)
        }

        fn flush(&mut self) -> Result<()> {
            Ok(std::io::Write::flush(self)?)
        }
    }
}

#[cfg(not(feature = "std"))]
mod no_std_io {
    extern crate alloc;

    use {
        crate::{Read, Result, Write},
        alloc::vec::Vec,
    };

    impl Read for &[u8] {
        #[inline]
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            let s = *self;
            let n = s.len().min(buf.len());
            buf[..n].copy_from_slice(&s[..n]);
            *self = &s[n..];
            Ok(n)
        }
    }

    impl Write for Vec<u8> {
        #[inline]
        fn write(&mut self, buf: &[u8]) -> Result<usize> {
            self.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }
}
