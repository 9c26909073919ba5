extern crate alloc;

use {
    crate::{
        buf::Buf,
        error::{Error, Result},
        header::{self, Header, EOF_MARKER, LEN_PREFIX},
        io::{read_full, Read, Write},
        nonce, NONCE_SIZE,
    },
    aead::{AeadCore, AeadInPlace, Key, KeyInit, KeySizeUser, Nonce, Tag},
    alloc::{vec, vec::Vec},
    byteorder::{ByteOrder, LittleEndian},
    crypto_secretbox::XSalsa20Poly1305,
    typenum::{Unsigned, U16, U24},
    zeroize::Zeroize,
};

/// Decrypts a stream produced by an [`Encryptor`][crate::Encryptor].
///
/// One sealed chunk is pulled from the source and opened at a time;
/// plaintext is then served across however many reads the caller makes.
/// Reading past the terminal chunk yields a clean EOF only if that chunk
/// authenticated, so truncation is never mistaken for the end of the
/// stream.
///
/// The base nonce and key must match the values the stream was written
/// with. The source is borrowed and never closed by the `Decryptor`.
pub struct Decryptor<'a, R, A = XSalsa20Poly1305>
where
    A: AeadCore + KeySizeUser,
{
    /// The underlying ciphertext source.
    stream: &'a mut R,
    /// Working nonce; the counter region advances once per chunk.
    nonce: Nonce<A>,
    /// Owned copy of the session key, wiped on close.
    key: Key<A>,
    /// Sealed-frame scratch; one frame plus the trailing length prefix.
    frame: Vec<u8>,
    /// Opened plaintext being served to the caller.
    buf: Buf,
    /// Maximum plaintext bytes per chunk, from the header.
    size: u32,
    /// Expected length of the next sealed chunk.
    next: u32,
    /// First failure, `EndOfStream`, or `AlreadyClosed`.
    err: Option<Error>,
}

impl<R, A> Decryptor<'_, R, A>
where
    A: AeadCore + KeySizeUser,
{
    const TAG_SIZE: usize = <A as AeadCore>::TagSize::USIZE;

    fn wipe(&mut self) {
        self.frame.zeroize();
        self.buf.zeroize();
        self.key.as_mut_slice().zeroize();
        self.nonce.as_mut_slice().zeroize();
    }
}

impl<'a, R, A> Decryptor<'a, R, A>
where
    R: Read + 'a,
    A: KeyInit + AeadCore<NonceSize = U24, TagSize = U16>,
{
    /// Creates a `Decryptor` that reads plaintext out of `stream`.
    ///
    /// The stream header is consumed before this returns; a source that
    /// cannot produce it, an unknown version byte, or an out-of-range
    /// chunk size all fail construction.
    pub fn new(
        stream: &'a mut R,
        base_nonce: &[u8; NONCE_SIZE],
        key: &Key<A>,
    ) -> Result<Self> {
        let mut b = [0u8; header::FULL_LEN];
        stream.read_exact(&mut b)?;
        let hdr = Header::decode(&b)?;

        let mut nonce = Nonce::<A>::default();
        nonce::init(&mut nonce, base_nonce);
        Ok(Decryptor {
            stream,
            nonce,
            key: key.clone(),
            frame: vec![
                0u8;
                LEN_PREFIX + Self::TAG_SIZE + hdr.chunk_size as usize
            ],
            buf: Buf::new(hdr.chunk_size as usize),
            size: hdr.chunk_size,
            next: hdr.first_len,
            err: None,
        })
    }
}

impl<R, A> Decryptor<'_, R, A>
where
    R: Read,
    A: AeadInPlace + KeyInit + AeadCore<NonceSize = U24, TagSize = U16>,
{
    fn do_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match &self.err {
            Some(Error::EndOfStream) => return Ok(0),
            Some(err) => return Err(err.clone()),
            None => {}
        }
        let mut n = 0;
        while n < buf.len() {
            if self.buf.is_empty() {
                if let Err(err) = self.fill() {
                    self.err = Some(err);
                    break;
                }
            }
            n += self.buf.read(&mut buf[n..])?;
        }
        if n > 0 {
            return Ok(n);
        }
        match &self.err {
            Some(Error::EndOfStream) | None => Ok(0),
            Some(err) => Err(err.clone()),
        }
    }

    /// Pulls the next frame from the source and opens it.
    ///
    /// Returns `EndOfStream` once the terminal chunk authenticates and
    /// its marker byte checks out.
    fn fill(&mut self) -> Result<()> {
        // The first expected length comes straight from the header; the
        // rest are checked below as they are parsed.
        let want = self.next as usize;
        if want == 0 || want > self.size as usize + Self::TAG_SIZE {
            return Err(Error::InvalidData);
        }
        let eb = read_full(self.stream, &mut self.frame[..want + LEN_PREFIX])?;

        // A full read picks up the current frame plus the next frame's
        // length prefix. Anything shorter than a tag and a prefix can
        // only be the terminal frame:
        // [ x x x x x x x x x x x x x x x x 1 ]
        //   |                             | |
        //   |_____________________________| |_ EOF byte
        //                  |
        //        16 bytes of authenticator
        let mut last = false;
        let sealed_len = if eb < Self::TAG_SIZE + LEN_PREFIX {
            last = true;
            nonce::mark_terminal(&mut self.nonce);
            eb
        } else {
            self.next = LittleEndian::read_u32(&self.frame[eb - LEN_PREFIX..eb]);
            if self.next == 0
                || self.next as usize > self.size as usize + Self::TAG_SIZE
            {
                return Err(Error::InvalidData);
            }
            eb - LEN_PREFIX
        };
        if sealed_len < Self::TAG_SIZE {
            return Err(Error::InvalidData);
        }

        let (tag, body) = self.frame[..sealed_len].split_at_mut(Self::TAG_SIZE);
        A::new(&self.key)
            .decrypt_in_place_detached(
                &self.nonce,
                &[],
                body,
                Tag::<A>::from_slice(tag),
            )
            .map_err(|_| Error::InvalidData)?;

        if last {
            if body.len() != 1 || body[0] != EOF_MARKER {
                return Err(Error::InvalidData);
            }
            return Err(Error::EndOfStream);
        }
        self.buf.reset();
        self.buf.write(body)?;
        nonce::advance(&mut self.nonce);
        Ok(())
    }

    /// Wipes the key, nonce, and buffers.
    ///
    /// The underlying source is not closed. Calling `close` again returns
    /// [`Error::AlreadyClosed`].
    pub fn close(&mut self) -> Result<()> {
        if matches!(self.err, Some(Error::AlreadyClosed)) {
            return Err(Error::AlreadyClosed);
        }
        self.wipe();
        self.err = Some(Error::AlreadyClosed);
        Ok(())
    }
}

impl<R, A> Drop for Decryptor<'_, R, A>
where
    A: AeadCore + KeySizeUser,
{
    fn drop(&mut self) {
        self.wipe();
    }
}

#[cfg(not(feature = "std"))]
impl<R, A> Read for Decryptor<'_, R, A>
where
    R: Read,
    A: AeadInPlace + KeyInit + AeadCore<NonceSize = U24, TagSize = U16>,
{
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.do_read(buf)
    }
}

#[cfg(feature = "std")]
impl<R, A> std::io::Read for Decryptor<'_, R, A>
where
    R: Read,
    A: AeadInPlace + KeyInit + AeadCore<NonceSize = U24, TagSize = U16>,
{
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        crate::error::map_res(self.do_read(buf))
    }
}
