extern crate alloc;

use alloc::{boxed::Box, sync::Arc};

use core::{error, fmt, result};

/// Result is a specialized [`result::Result`] for this crate.
pub type Result<T> = result::Result<T, Error>;

#[cfg(feature = "std")]
pub(crate) fn map_res<T>(res: Result<T>) -> std::io::Result<T> {
    res.map_err(|err| match err {
        Error::UnexpectedEof(_) => {
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, err)
        }
        Error::ShortWrite(_) => {
            std::io::Error::new(std::io::ErrorKind::WriteZero, err)
        }
        Error::Interrupted => {
            std::io::Error::new(std::io::ErrorKind::Interrupted, err)
        }
        Error::InvalidData
        | Error::InvalidVersion(_)
        | Error::InvalidChunkSize(_) => {
            std::io::Error::new(std::io::ErrorKind::InvalidData, err)
        }
        err => std::io::Error::new(std::io::ErrorKind::Other, err),
    })
}

/// An error surfaced by the underlying byte sink or source.
///
/// The inner error is shared so that a failed component can hand the same
/// error back from every operation attempted after the failure.
#[derive(Clone, Debug)]
pub struct IoError {
    inner: Arc<dyn error::Error + Send + Sync>,
}

impl IoError {
    /// Wraps an arbitrary error.
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self {
            inner: Arc::from(err.into()),
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl error::Error for IoError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.inner.source()
    }
}

/// Error is the error type returned by this crate.
///
/// The first error an [`Encryptor`][crate::Encryptor] or
/// [`Decryptor`][crate::Decryptor] encounters is latched: every later
/// operation on the component returns a clone of it.
#[derive(Clone, Debug)]
pub enum Error {
    /// The version byte in the stream header is unknown.
    InvalidVersion(u8),
    /// The chunk size is outside the supported range.
    InvalidChunkSize(u64),
    /// A chunk failed authentication or the framing is malformed.
    InvalidData,
    /// The component has already been closed.
    AlreadyClosed,
    /// The terminal chunk authenticated and the stream is over.
    EndOfStream,
    /// The plaintext could not be encrypted.
    Encryption(aead::Error),
    /// The underlying sink or source was interrupted.
    ///
    /// The codec's read and write loops retry on this instead of
    /// latching it; it only escapes to callers driving a sink or source
    /// directly.
    Interrupted,
    /// The entire buffer could not be written.
    ///
    /// It contains the number of bytes written.
    ShortWrite(usize),
    /// Unexpected EOF while reading.
    ///
    /// It contains the number of bytes read.
    UnexpectedEof(usize),
    /// An error surfaced by the underlying sink or source.
    Io(IoError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidVersion(v) => write!(f, "invalid version: {}", v),
            Error::InvalidChunkSize(n) => {
                write!(f, "invalid chunk size: {}", n)
            }
            Error::InvalidData => write!(f, "invalid encrypted data"),
            Error::AlreadyClosed => write!(f, "already closed"),
            Error::EndOfStream => write!(f, "end of stream"),
            Error::Encryption(err) => write!(f, "encryption error: {}", err),
            Error::Interrupted => write!(f, "operation interrupted"),
            Error::ShortWrite(n) => write!(f, "short write of {} bytes", n),
            Error::UnexpectedEof(n) => {
                write!(f, "unexpected EOF after {} bytes", n)
            }
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<aead::Error> for Error {
    fn from(value: aead::Error) -> Self {
        Error::Encryption(value)
    }
}

impl From<IoError> for Error {
    fn from(value: IoError) -> Self {
        Error::Io(value)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        match value.kind() {
            std::io::ErrorKind::Interrupted => Error::Interrupted,
            std::io::ErrorKind::UnexpectedEof => Error::UnexpectedEof(0),
            std::io::ErrorKind::WriteZero => Error::ShortWrite(0),
            _ => Error::Io(IoError::new(value)),
        }
    }
}
