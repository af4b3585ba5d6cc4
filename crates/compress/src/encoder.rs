//! Compression sessions.

use crate::error::{ErrorKind, Result};
use crate::{Algorithm, Codec, s2};
use exn::ResultExt;
use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
use snap::write::FrameEncoder as SnappyEncoder;
use std::io::{self, Write};
use zstd::stream::write::Encoder as ZstdEncoder;

/// An open compression stream bound to one sink.
///
/// Returned by [`Codec::wrap_writer`]. Write uncompressed bytes into it, then
/// call [`finish`](Self::finish): gzip, zstd, zlib and deflate only write
/// their trailers (and checksums) when finished, so an unfinished stream is
/// truncated and unreadable. S2 and Snappy write complete chunks as they go,
/// but still hold the final partial block until finished.
///
/// Dropping an encoder releases every codec resource. Some codecs make a
/// best-effort attempt to complete the stream when dropped, but any error is
/// lost, so always finish explicitly.
pub struct Encoder<W: Write> {
    inner: Inner<W>,
}

enum Inner<W: Write> {
    Gzip(GzEncoder<W>),
    Zstd(ZstdEncoder<'static, W>),
    S2(s2::Writer<W>),
    Snappy(SnappyEncoder<W>),
    Zlib(ZlibEncoder<W>),
    Deflate(DeflateEncoder<W>),
}

impl Codec {
    /// Wrap a sink with a fresh compression stream.
    ///
    /// The level is translated into the codec's own scale here; S2 and
    /// Snappy ignore it. Fails with [`ErrorKind::Encoder`] if the codec
    /// library refuses the configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use spill_compress::{Algorithm, Codec};
    /// use std::io::Write;
    ///
    /// let mut writer = Codec::new(Algorithm::Gzip).wrap_writer(Vec::new()).unwrap();
    /// writer.write_all(b"Hello, world!").unwrap();
    /// let compressed: Vec<u8> = writer.finish().unwrap();
    /// assert!(compressed.starts_with(&[0x1F, 0x8B]));
    /// ```
    pub fn wrap_writer<W: Write>(&self, sink: W) -> Result<Encoder<W>> {
        let inner = match self.algorithm {
            Algorithm::Gzip => Inner::Gzip(GzEncoder::new(sink, self.level.flate())),
            Algorithm::Zstd => {
                Inner::Zstd(ZstdEncoder::new(sink, self.level.zstd()).or_raise(|| ErrorKind::Encoder)?)
            },
            Algorithm::S2 => Inner::S2(s2::writer(sink)),
            Algorithm::Snappy => Inner::Snappy(SnappyEncoder::new(sink)),
            Algorithm::Zlib => Inner::Zlib(ZlibEncoder::new(sink, self.level.flate())),
            Algorithm::Deflate => Inner::Deflate(DeflateEncoder::new(sink, self.level.flate())),
        };
        tracing::debug!(codec = %self, "opened compression stream");
        Ok(Encoder { inner })
    }
}

impl<W: Write> Encoder<W> {
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        match self.inner {
            Inner::Gzip(_) => Algorithm::Gzip,
            Inner::Zstd(_) => Algorithm::Zstd,
            Inner::S2(_) => Algorithm::S2,
            Inner::Snappy(_) => Algorithm::Snappy,
            Inner::Zlib(_) => Algorithm::Zlib,
            Inner::Deflate(_) => Algorithm::Deflate,
        }
    }

    /// Complete the stream and hand back the sink.
    ///
    /// Writes any buffered data along with the codec's trailer, then flushes
    /// the sink. The encoder is consumed, so nothing can be written after the
    /// trailer.
    pub fn finish(self) -> Result<W> {
        let algorithm = self.algorithm();
        let sink = match self.inner {
            Inner::Gzip(encoder) => encoder.finish(),
            Inner::Zstd(encoder) => encoder.finish(),
            Inner::S2(writer) => s2::finish(writer),
            Inner::Snappy(encoder) => encoder.into_inner().map_err(|err| err.into_error()),
            Inner::Zlib(encoder) => encoder.finish(),
            Inner::Deflate(encoder) => encoder.finish(),
        }
        .or_raise(|| ErrorKind::Io)?;
        tracing::debug!(%algorithm, "finished compression stream");
        Ok(sink)
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Gzip(encoder) => encoder.write(buf),
            Inner::Zstd(encoder) => encoder.write(buf),
            Inner::S2(writer) => writer.write(buf),
            Inner::Snappy(encoder) => encoder.write(buf),
            Inner::Zlib(encoder) => encoder.write(buf),
            Inner::Deflate(encoder) => encoder.write(buf),
        }
    }

    /// Pushes buffered data to the sink as far as the format allows. This
    /// does not complete the stream; only [`finish`](Encoder::finish) does.
    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            Inner::Gzip(encoder) => encoder.flush(),
            Inner::Zstd(encoder) => encoder.flush(),
            Inner::S2(writer) => writer.flush(),
            Inner::Snappy(encoder) => encoder.flush(),
            Inner::Zlib(encoder) => encoder.flush(),
            Inner::Deflate(encoder) => encoder.flush(),
        }
    }
}
