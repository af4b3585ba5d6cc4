//! Compression Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::io;

/// A compression error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for compression operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// The first three are configuration errors: they come from static input the
/// caller controls, so fix the configuration instead of retrying.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested algorithm is not one of the supported codecs.
    #[display("unsupported compression algorithm: {_0}")]
    UnsupportedAlgorithm(#[error(not(source))] String),
    /// The requested level is not one of the abstract compression levels.
    #[display("unsupported compression level: {_0}")]
    UnsupportedLevel(#[error(not(source))] String),
    /// The codec library refused to initialize an encoder/decoder.
    #[display("failed to initialize codec")]
    Encoder,
    /// Data is corrupt, truncated or not in the selected format. Don't retry
    /// with the same input.
    #[display("invalid or corrupted data")]
    InvalidData,
    /// The bound sink or source failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }

    /// Returns `true` for errors caused by caller misconfiguration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ErrorKind::UnsupportedAlgorithm(_) | ErrorKind::UnsupportedLevel(_) | ErrorKind::Encoder
        )
    }

    /// Classify an I/O error surfaced while reading from a [`Decoder`]. Only
    /// errors the decoder marked as [`Corrupt`] are decode failures; anything
    /// else came from the source, whatever its kind.
    ///
    /// [`Decoder`]: crate::Decoder
    pub(crate) fn from_read(err: &io::Error) -> Self {
        match err.get_ref() {
            Some(inner) if inner.is::<Corrupt>() => ErrorKind::InvalidData,
            _ => ErrorKind::Io,
        }
    }
}

/// A decoding failure raised by a codec rather than by the source it reads
/// from. Carried inside an [`io::Error`] of kind `InvalidData`.
#[derive(Debug, Display, Error)]
#[display("invalid compressed data")]
pub(crate) struct Corrupt(#[error(source)] io::Error);

impl Corrupt {
    pub(crate) fn wrap(err: io::Error) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, Corrupt(err))
    }
}
