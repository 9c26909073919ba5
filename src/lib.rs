//! **chunkbox** packages a byte stream into independently authenticated,
//! length-prefixed encrypted chunks.
//!
//! The construction follows the streaming-encryption pattern described by
//! Adam Langley ([imperialviolet]): a secret-box style AEAD seals bounded
//! chunks of plaintext, and a counter nonce ties the chunks together so
//! that reordering, duplication, or omission of any chunk fails
//! authentication. A marked terminal chunk carrying a known marker byte
//! turns truncation into a decryption failure instead of a silent early
//! EOF.
//!
//! A stream looks like:
//!
//! ```text
//! version | flags | chunk size | len 0 | sealed 0 | len 1 | sealed 1 | ..
//!    1        1        4           4       var        4       var
//! ```
//!
//! The read side always knows the next frame's length before it needs it:
//! the first length arrives with the header, and each later length is
//! picked up by the same read as the frame before it. Each `sealed` is a
//! 16-byte authenticator followed by the ciphertext.
//!
//! The working nonce is the caller's 16-byte base nonce followed by an
//! 8-byte little-endian counter that advances once per chunk. The final
//! chunk is sealed with the top bit of the last nonce byte set and a
//! plaintext of exactly one marker byte, so the end of the stream is as
//! strongly authenticated as its contents. Reusing a `(key, base nonce)`
//! pair across two streams produces identical nonces for identical chunk
//! positions; callers must ensure base nonces are unique per key.
//!
//! [`Encryptor`] and [`Decryptor`] both take a defensive copy of the key
//! and nonce and wipe those copies, along with their buffers, on close
//! and on drop. Neither closes the sink or source it borrows.
//!
//! [imperialviolet]: https://www.imperialviolet.org/2014/06/27/streamingencryption.html

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(not(any(feature = "std", test)), no_std)]

mod buf;
mod error;
mod header;
mod io;
mod nonce;
mod reader;
mod writer;

pub use error::*;
pub use io::*;
pub use reader::*;
pub use writer::*;

/// The default chunk size used by [`Encryptor`].
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 16;

/// The largest chunk size an [`Encryptor`] accepts.
pub const MAX_CHUNK_SIZE: u32 = (1 << 31) - 1;

/// Size in bytes of the caller-supplied base nonce.
pub const NONCE_SIZE: usize = 16;

/// Bytes of overhead the authenticator adds to each chunk.
pub const OVERHEAD: usize = 16;

/// Returns the exact number of ciphertext bytes produced for
/// `plaintext_len` bytes of plaintext at the given chunk size.
///
/// Accounts for the stream header, one frame per full chunk, a short
/// frame for any remainder, and the terminal frame. `chunk_size` must be
/// nonzero.
pub const fn encrypted_len(plaintext_len: u64, chunk_size: u32) -> u64 {
    const FRAME_OVERHEAD: u64 = 4 + OVERHEAD as u64;
    let size = chunk_size as u64;
    let full = plaintext_len / size;
    let rem = plaintext_len % size;
    let mut n = 6 + full * (size + FRAME_OVERHEAD) + (1 + FRAME_OVERHEAD);
    if rem > 0 {
        n += rem + FRAME_OVERHEAD;
    }
    n
}
