//! Interchangeable compression middleware for byte-stream buffers.
//!
//! This crate binds six compression codecs behind a single [`Codec`]
//! adapter so that a buffering system can switch formats without touching
//! its own code:
//!
//! - **Selection** via the closed [`Algorithm`] enum and an abstract
//!   [`Level`], translated into each codec's native scale at wrap time
//! - **Streaming** via [`Codec::wrap_writer`] and [`Codec::wrap_reader`],
//!   which return an [`Encoder`] that must be [finished](Encoder::finish)
//!   and a [`Decoder`] that should be [released](Decoder::release)
//! - **Composition** with other transforms (encryption, etc.) through the
//!   object-safe [`Middleware`] trait, stacked in order by a [`Pipeline`]
//! - **In-memory** and **stream-to-stream** helpers ([`Codec::compress`],
//!   [`Codec::decompress`], [`Codec::compress_stream`],
//!   [`Codec::decompress_stream`])
//!
//! Every codec writes its standard container format, untouched: gzip
//! members, zstd frames, zlib streams, raw deflate, the Snappy framing
//! format and the S2 stream format.
//!
//! ```
//! use spill_compress::{Algorithm, Codec, Level};
//! use std::io::{Read, Write};
//!
//! let codec = Codec::new(Algorithm::Zstd).with_level(Level::Better);
//!
//! let mut writer = codec.wrap_writer(Vec::new()).unwrap();
//! writer.write_all(b"Hello, world!").unwrap();
//! let compressed = writer.finish().unwrap();
//!
//! let mut reader = codec.wrap_reader(compressed.as_slice()).unwrap();
//! let mut decompressed = Vec::new();
//! reader.read_to_end(&mut decompressed).unwrap();
//! reader.release();
//! assert_eq!(decompressed, b"Hello, world!");
//! ```

mod construct;
mod decoder;
mod encoder;
pub mod error;
mod level;
mod middleware;
mod ops;
mod s2;
mod util;

pub use crate::decoder::Decoder;
pub use crate::encoder::Encoder;
pub use crate::middleware::{FinishWrite, Flushing, Middleware, Pipeline};

/// A supported compression codec.
///
/// The set is closed: every factory matches it exhaustively, so there is no
/// fallback path for an unknown codec. Values that arrive from outside the
/// type system (strings, numeric tags) are checked when parsed, see
/// [`FromStr`](std::str::FromStr) and [`TryFrom<u8>`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Gzip members (.gz)
    Gzip,
    /// Zstandard frames (.zst)
    Zstd,
    /// S2 stream format (.s2)
    S2,
    /// Snappy framing format (.sz)
    Snappy,
    /// Zlib streams (.zz)
    Zlib,
    /// Raw deflate, no header or trailer (.deflate)
    Deflate,
}

/// Abstract speed/ratio trade-off.
///
/// Translated per codec when a stream is wrapped. S2 and Snappy have a single
/// mode and ignore it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    /// Fastest compression with least CPU usage
    Fastest,
    /// Balanced compression
    #[default]
    Default,
    /// Better compression with more CPU usage
    Better,
    /// Best compression with most CPU usage
    Best,
}

/// A bound `{algorithm, level}` configuration.
///
/// Cheap to copy and immutable; each call to [`wrap_writer`](Self::wrap_writer)
/// or [`wrap_reader`](Self::wrap_reader) opens an independent session that
/// shares no state with any other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Codec {
    algorithm: Algorithm,
    level: Level,
}

impl Codec {
    /// Create a codec adapter using the [`Default`](Level::Default) level.
    #[must_use]
    pub const fn new(algorithm: Algorithm) -> Self {
        Self { algorithm, level: Level::Default }
    }

    /// Set the compression level.
    #[must_use]
    pub const fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }
}

impl From<Algorithm> for Codec {
    fn from(algorithm: Algorithm) -> Self {
        Self::new(algorithm)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Algorithm, Codec, Level};

    #[test]
    fn level_default() {
        assert_eq!(Level::default(), Level::Default);
    }

    #[test]
    fn codec_default_level() {
        let codec = Codec::new(Algorithm::Gzip);
        assert_eq!(codec.level(), Level::Default);
        assert_eq!(codec.algorithm(), Algorithm::Gzip);
    }

    #[test]
    fn codec_custom_level() {
        let codec = Codec::new(Algorithm::Gzip).with_level(Level::Best);
        assert_eq!(codec.level(), Level::Best);
        assert_eq!(Codec::from(Algorithm::Zstd), Codec::new(Algorithm::Zstd));
    }

    #[test]
    fn codec_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Copy>() {}
        assert_send_sync::<Codec>();
    }
}
