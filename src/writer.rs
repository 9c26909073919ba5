extern crate alloc;

use {
    crate::{
        buf::Buf,
        error::{Error, Result},
        header::{Header, EOF_MARKER, LEN_PREFIX},
        io::Write,
        nonce, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, NONCE_SIZE,
    },
    aead::{AeadCore, AeadInPlace, Key, KeyInit, KeySizeUser, Nonce},
    alloc::{vec, vec::Vec},
    byteorder::{ByteOrder, LittleEndian},
    crypto_secretbox::XSalsa20Poly1305,
    typenum::{Unsigned, U16, U24},
    zeroize::Zeroize,
};

/// Encrypts a byte stream into length-prefixed sealed chunks.
///
/// Writes are buffered until a full chunk accumulates, then sealed under
/// the current working nonce and framed onto the sink. Nothing reaches the
/// sink for a partially filled chunk until [`close`](Encryptor::close),
/// which also seals the terminal chunk; an unclosed `Encryptor` leaves the
/// stream unreadable past its last full chunk.
///
/// The sink is borrowed and never closed by the `Encryptor`.
pub struct Encryptor<'a, W, A = XSalsa20Poly1305>
where
    A: AeadCore + KeySizeUser,
{
    /// The underlying ciphertext sink.
    stream: &'a mut W,
    /// Working nonce; the counter region advances once per chunk.
    nonce: Nonce<A>,
    /// Owned copy of the session key, wiped on close.
    key: Key<A>,
    /// Plaintext accumulated for the next chunk.
    buf: Buf,
    /// Scratch for one framed chunk: length prefix, tag, ciphertext.
    out: Vec<u8>,
    /// First failure, or `AlreadyClosed`; returned by every later call.
    err: Option<Error>,
}

impl<W, A> Encryptor<'_, W, A>
where
    A: AeadCore + KeySizeUser,
{
    const TAG_SIZE: usize = <A as AeadCore>::TagSize::USIZE;

    fn wipe(&mut self) {
        self.buf.zeroize();
        self.out.zeroize();
        self.key.as_mut_slice().zeroize();
        self.nonce.as_mut_slice().zeroize();
    }
}

impl<'a, W, A> Encryptor<'a, W, A>
where
    W: Write + 'a,
    A: KeyInit + AeadCore<NonceSize = U24, TagSize = U16>,
{
    /// Creates an `Encryptor` that writes sealed chunks to `stream`, using
    /// the default chunk size of 64 KiB.
    ///
    /// The stream header is written before this returns, so a broken sink
    /// fails construction rather than the first write.
    pub fn new(
        stream: &'a mut W,
        base_nonce: &[u8; NONCE_SIZE],
        key: &Key<A>,
    ) -> Result<Self> {
        Self::with_chunk_size(stream, base_nonce, key, DEFAULT_CHUNK_SIZE)
    }

    /// Creates an `Encryptor` with the given maximum chunk size.
    ///
    /// `chunk_size` must be in `1..=MAX_CHUNK_SIZE`; anything else returns
    /// [`Error::InvalidChunkSize`].
    pub fn with_chunk_size(
        stream: &'a mut W,
        base_nonce: &[u8; NONCE_SIZE],
        key: &Key<A>,
        chunk_size: usize,
    ) -> Result<Self> {
        if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE as usize {
            return Err(Error::InvalidChunkSize(chunk_size as u64));
        }
        stream.write_all(&Header::encode(chunk_size as u32))?;

        // Save the allocations until the sink has taken the header.
        let mut nonce = Nonce::<A>::default();
        nonce::init(&mut nonce, base_nonce);
        Ok(Encryptor {
            stream,
            nonce,
            key: key.clone(),
            buf: Buf::new(chunk_size),
            out: vec![0u8; LEN_PREFIX + Self::TAG_SIZE + chunk_size],
            err: None,
        })
    }
}

impl<W, A> Encryptor<'_, W, A>
where
    W: Write,
    A: AeadInPlace + KeyInit + AeadCore<NonceSize = U24, TagSize = U16>,
{
    fn do_write(&mut self, buf: &[u8]) -> Result<usize> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let mut n = 0;
        while n < buf.len() {
            n += self.buf.write(&buf[n..])?;
            if self.buf.is_full() {
                self.flush_chunk()?;
            }
        }
        Ok(n)
    }

    /// Seals the buffered plaintext and frames it onto the sink.
    fn flush_chunk(&mut self) -> Result<()> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let sealed_len = Self::TAG_SIZE + self.buf.len();
        LittleEndian::write_u32(
            &mut self.out[..LEN_PREFIX],
            sealed_len as u32,
        );
        let (tag_dst, body) = self.out[LEN_PREFIX..LEN_PREFIX + sealed_len]
            .split_at_mut(Self::TAG_SIZE);
        body.copy_from_slice(self.buf.remaining_slice());

        let res = match A::new(&self.key)
            .encrypt_in_place_detached(&self.nonce, &[], body)
        {
            Ok(tag) => {
                tag_dst.copy_from_slice(&tag);
                self.stream
                    .write_all(&self.out[..LEN_PREFIX + sealed_len])
            }
            Err(err) => Err(Error::Encryption(err)),
        };
        // The counter moves whether or not the sink took the frame; a
        // failed write latches the error and the stream is done.
        self.buf.reset();
        nonce::advance(&mut self.nonce);
        if let Err(err) = &res {
            self.err = Some(err.clone());
        }
        res
    }

    fn do_flush(&mut self) -> Result<()> {
        if let Some(err) = &self.err {
            return Err(err.clone());
        }
        let res = loop {
            match self.stream.flush() {
                Err(Error::Interrupted) => {}
                res => break res,
            }
        };
        if let Err(err) = &res {
            self.err = Some(err.clone());
        }
        res
    }

    /// Flushes any buffered plaintext, seals the terminal chunk, and wipes
    /// the key, nonce, and buffers.
    ///
    /// The terminal chunk holds a single marker byte under a nonce with
    /// its terminal bit set, so the read side can tell an authenticated
    /// end of stream from truncation.
    ///
    /// The underlying sink is not closed. Calling `close` again returns
    /// [`Error::AlreadyClosed`].
    pub fn close(&mut self) -> Result<()> {
        if matches!(self.err, Some(Error::AlreadyClosed)) {
            return Err(Error::AlreadyClosed);
        }
        let res = self.finish();
        self.wipe();
        self.err = Some(Error::AlreadyClosed);
        res
    }

    fn finish(&mut self) -> Result<()> {
        if !self.buf.is_empty() {
            self.flush_chunk()?;
        }
        nonce::mark_terminal(&mut self.nonce);
        self.buf.write(&[EOF_MARKER])?;
        self.flush_chunk()
    }
}

impl<W, A> Drop for Encryptor<'_, W, A>
where
    A: AeadCore + KeySizeUser,
{
    fn drop(&mut self) {
        self.wipe();
    }
}

#[cfg(not(feature = "std"))]
impl<W, A> Write for Encryptor<'_, W, A>
where
    W: Write,
    A: AeadInPlace + KeyInit + AeadCore<NonceSize = U24, TagSize = U16>,
{
    #[inline]
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.do_write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.do_flush()
    }
}

#[cfg(feature = "std")]
impl<W, A> std::io::Write for Encryptor<'_, W, A>
where
    W: Write,
    A: AeadInPlace + KeyInit + AeadCore<NonceSize = U24, TagSize = U16>,
{
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        crate::error::map_res(self.do_write(buf))
    }

    /// Flushes the underlying sink.
    ///
    /// Buffered plaintext is deliberately left in place: a chunk reaches
    /// the wire only when it fills or on [`close`](Encryptor::close).
    fn flush(&mut self) -> std::io::Result<()> {
        crate::error::map_res(self.do_flush())
    }
}
