//! Decompression sessions.

use crate::construct::{is_gzip_header, is_zlib_header};
use crate::error::{Corrupt, ErrorKind, Result};
use crate::{Algorithm, Codec, s2};
use exn::ResultExt;
use flate2::bufread::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use snap::read::FrameDecoder as SnappyDecoder;
use std::io::{self, BufReader, Chain, Cursor, Read};
use zstd::stream::read::Decoder as ZstdDecoder;

/// Header bytes consumed from the source to validate gzip and zlib streams
/// before the decoder is built, then replayed into it.
type Replay<R, const N: usize> = Chain<Cursor<[u8; N]>, Source<R>>;

const GZIP_HEADER_LEN: usize = 4;
const ZLIB_HEADER_LEN: usize = 2;

/// An open decompression stream bound to one source.
///
/// Returned by [`Codec::wrap_reader`]. Read decompressed bytes out of it,
/// then call [`release`](Self::release) to free the codec's internal
/// buffers (and, for zstd, its native decoding context) and take the source
/// back. Dropping the decoder frees the same resources.
///
/// Malformed input (corrupt header, truncated frame, checksum mismatch) is
/// reported as [`io::ErrorKind::InvalidData`] by every codec. Errors raised
/// by the source itself are passed through untouched, even when their kind
/// is `InvalidData` or `UnexpectedEof`.
pub struct Decoder<R: Read> {
    inner: Inner<R>,
}

enum Inner<R: Read> {
    Gzip(MultiGzDecoder<BufReader<Replay<R, GZIP_HEADER_LEN>>>),
    Zstd(ZstdDecoder<'static, BufReader<Source<R>>>),
    S2(s2::Reader<Source<R>>),
    Snappy(SnappyDecoder<Source<R>>),
    Zlib(ZlibDecoder<BufReader<Replay<R, ZLIB_HEADER_LEN>>>),
    Deflate(DeflateDecoder<BufReader<Source<R>>>),
}

/// Remembers whether the most recent read from the source failed, so that a
/// decoder error can be told apart from a source error.
struct Source<R> {
    inner: R,
    failed: bool,
}

impl<R: Read> Read for Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = self.inner.read(buf);
        self.failed = result.is_err();
        result
    }
}

impl<R: Read> Source<R> {
    fn new(inner: R) -> Self {
        Self { inner, failed: false }
    }

    /// Read and check the fixed leading header bytes of a gzip or zlib stream.
    fn validate<const N: usize>(mut self, algorithm: Algorithm, valid: fn(&[u8; N]) -> bool) -> Result<Replay<R, N>> {
        let mut header = [0u8; N];
        if let Err(err) = self.read_exact(&mut header) {
            let kind = if self.failed { ErrorKind::Io } else { ErrorKind::InvalidData };
            return Err(exn::Exn::new(err).raise(kind));
        }
        if !valid(&header) {
            tracing::debug!(%algorithm, ?header, "rejected stream header");
            exn::bail!(ErrorKind::InvalidData);
        }
        Ok(Cursor::new(header).chain(self))
    }
}

impl Codec {
    /// Wrap a source with a fresh decompression stream.
    ///
    /// Decoders learn their parameters from the stream itself, so the level
    /// is ignored. Gzip (magic, method and flags) and zlib read and validate
    /// their header here, failing
    /// with [`ErrorKind::InvalidData`] if it is missing or wrong; the other
    /// codecs validate lazily on the first read.
    ///
    /// # Examples
    ///
    /// ```
    /// use spill_compress::{Algorithm, Codec};
    /// use std::io::Read;
    ///
    /// let codec = Codec::new(Algorithm::Zlib);
    /// let compressed = codec.compress(b"Hello, world!").unwrap();
    ///
    /// let mut reader = codec.wrap_reader(compressed.as_slice()).unwrap();
    /// let mut decompressed = String::new();
    /// reader.read_to_string(&mut decompressed).unwrap();
    /// reader.release();
    /// assert_eq!(decompressed, "Hello, world!");
    ///
    /// assert!(codec.wrap_reader(&b"not zlib"[..]).is_err());
    /// ```
    pub fn wrap_reader<R: Read>(&self, source: R) -> Result<Decoder<R>> {
        let source = Source::new(source);
        let inner = match self.algorithm {
            Algorithm::Gzip => {
                let replay = source.validate::<GZIP_HEADER_LEN>(Algorithm::Gzip, is_gzip_header)?;
                Inner::Gzip(MultiGzDecoder::new(BufReader::new(replay)))
            },
            Algorithm::Zstd => {
                Inner::Zstd(ZstdDecoder::new(source).or_raise(|| ErrorKind::Encoder)?)
            },
            Algorithm::S2 => Inner::S2(s2::reader(source)),
            Algorithm::Snappy => Inner::Snappy(SnappyDecoder::new(source)),
            Algorithm::Zlib => {
                let replay = source.validate::<ZLIB_HEADER_LEN>(Algorithm::Zlib, |&[cmf, flg]| is_zlib_header(cmf, flg))?;
                Inner::Zlib(ZlibDecoder::new(BufReader::new(replay)))
            },
            Algorithm::Deflate => Inner::Deflate(DeflateDecoder::new(BufReader::new(source))),
        };
        tracing::debug!(codec = %self, "opened decompression stream");
        Ok(Decoder { inner })
    }
}

impl<R: Read> Decoder<R> {
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

    /// Free the codec's resources and hand back the source.
    ///
    /// The decoder reads ahead, so the returned source may be positioned
    /// past the end of the compressed stream.
    pub fn release(self) -> R {
        let algorithm = self.algorithm();
        let source = match self.inner {
            Inner::Gzip(decoder) => decoder.into_inner().into_inner().into_inner().1,
            Inner::Zstd(decoder) => decoder.finish().into_inner(),
            Inner::S2(mut reader) => reader
                .get_mut()
                .take()
                .expect("s2 source stays attached until the decoder is released"),
            Inner::Snappy(decoder) => decoder.into_inner(),
            Inner::Zlib(decoder) => decoder.into_inner().into_inner().into_inner().1,
            Inner::Deflate(decoder) => decoder.into_inner().into_inner(),
        };
        tracing::debug!(%algorithm, "released decompression stream");
        source.inner
    }

    fn source(&self) -> Option<&Source<R>> {
        match &self.inner {
            Inner::Gzip(decoder) => Some(decoder.get_ref().get_ref().get_ref().1),
            Inner::Zstd(decoder) => Some(decoder.get_ref().get_ref()),
            Inner::S2(reader) => reader.get_ref().get(),
            Inner::Snappy(decoder) => Some(decoder.get_ref()),
            Inner::Zlib(decoder) => Some(decoder.get_ref().get_ref().get_ref().1),
            Inner::Deflate(decoder) => Some(decoder.get_ref().get_ref()),
        }
    }
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = match &mut self.inner {
            Inner::Gzip(decoder) => decoder.read(buf),
            Inner::Zstd(decoder) => decoder.read(buf),
            Inner::S2(reader) => reader.read(buf),
            Inner::Snappy(decoder) => decoder.read(buf),
            Inner::Zlib(decoder) => decoder.read(buf),
            Inner::Deflate(decoder) => decoder.read(buf),
        };
        result.map_err(|err| {
            // Codecs disagree on error kinds (zstd reports everything as
            // `Other`, truncation surfaces as `UnexpectedEof`). Anything the
            // source didn't raise is a decoding failure.
            if self.source().is_some_and(|source| source.failed) {
                err
            } else {
                Corrupt::wrap(err)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::{Algorithm, Codec};
    use rstest::rstest;
    use std::io::{self, Cursor, Read};

    /// A source that yields some bytes, then fails.
    struct Failing<'a> {
        data: &'a [u8],
        kind: io::ErrorKind,
    }

    impl<'a> Failing<'a> {
        fn new(data: &'a [u8]) -> Self {
            Self { data, kind: io::ErrorKind::ConnectionReset }
        }
    }

    impl Read for Failing<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(self.kind, "source closed"));
            }
            let n = self.data.read(buf)?;
            Ok(n)
        }
    }

    #[rstest]
    #[case(Algorithm::Gzip)]
    #[case(Algorithm::Zstd)]
    #[case(Algorithm::S2)]
    #[case(Algorithm::Snappy)]
    #[case(Algorithm::Zlib)]
    #[case(Algorithm::Deflate)]
    fn test_wrap_reader(#[case] algorithm: Algorithm) {
        let codec = Codec::new(algorithm);
        let original = b"Hello, world!";
        let compressed = codec.compress(original).unwrap();
        let mut reader = codec.wrap_reader(Cursor::new(compressed)).expect("decoder to initialize");
        assert_eq!(reader.algorithm(), algorithm);
        let mut decompressed = Vec::new();
        reader.read_to_end(&mut decompressed).unwrap();
        assert_eq!(decompressed, original);
        let source = reader.release();
        assert!(source.position() > 0);
    }

    #[rstest]
    #[case(Algorithm::Gzip)]
    #[case(Algorithm::Zlib)]
    fn test_header_validated_on_wrap(#[case] algorithm: Algorithm) {
        let codec = Codec::new(algorithm);
        let err = codec.wrap_reader(&b"This is not compressed data"[..]).err().unwrap();
        assert_eq!(*err, ErrorKind::InvalidData);
        let err = codec.wrap_reader(&b""[..]).err().unwrap();
        assert_eq!(*err, ErrorKind::InvalidData);
    }

    #[rstest]
    #[case::bad_method(2, 0x07)]
    #[case::reserved_flag(3, 0x20)]
    fn test_gzip_member_header_validated_on_wrap(#[case] offset: usize, #[case] value: u8) {
        let codec = Codec::new(Algorithm::Gzip);
        let mut stream = codec.compress(b"Hello, world!").unwrap();
        stream[offset] = value;
        let err = codec.wrap_reader(stream.as_slice()).err().unwrap();
        assert_eq!(*err, ErrorKind::InvalidData);
        // Only the magic, with nothing after it.
        let err = codec.wrap_reader(&[0x1F, 0x8B][..]).err().unwrap();
        assert_eq!(*err, ErrorKind::InvalidData);
    }

    #[rstest]
    #[case(Algorithm::Zstd)]
    #[case(Algorithm::S2)]
    #[case(Algorithm::Snappy)]
    fn test_invalid_data_on_read(#[case] algorithm: Algorithm) {
        let mut reader = Codec::new(algorithm).wrap_reader(&b"This is not compressed data"[..]).unwrap();
        let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[rstest]
    #[case(Algorithm::Gzip)]
    #[case(Algorithm::Zstd)]
    #[case(Algorithm::S2)]
    #[case(Algorithm::Snappy)]
    // Zlib and raw deflate truncation is only caught when the cut lands
    // inside a deflate block; flate2 reports a clean end otherwise.
    fn test_truncated_stream(#[case] algorithm: Algorithm) {
        let codec = Codec::new(algorithm);
        let original: Vec<u8> = (0..4096u32).map(|i| (i % 97) as u8).collect();
        let compressed = codec.compress(&original).unwrap();
        let truncated = &compressed[..compressed.len() - 5];
        let mut reader = codec.wrap_reader(truncated).unwrap();
        let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[rstest]
    #[case(Algorithm::Gzip)]
    #[case(Algorithm::Zstd)]
    #[case(Algorithm::S2)]
    #[case(Algorithm::Snappy)]
    #[case(Algorithm::Zlib)]
    #[case(Algorithm::Deflate)]
    fn test_source_failure_passes_through(#[case] algorithm: Algorithm) {
        let codec = Codec::new(algorithm);
        let original: Vec<u8> = (0..64 * 1024u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 9) as u8).collect();
        let compressed = codec.compress(&original).unwrap();
        let source = Failing::new(&compressed[..compressed.len() / 2]);
        let mut reader = codec.wrap_reader(source).unwrap();
        let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[rstest]
    #[case(Algorithm::Gzip)]
    #[case(Algorithm::Zstd)]
    #[case(Algorithm::S2)]
    #[case(Algorithm::Snappy)]
    #[case(Algorithm::Zlib)]
    #[case(Algorithm::Deflate)]
    fn test_source_decode_like_errors_stay_io(
        #[case] algorithm: Algorithm,
        #[values(io::ErrorKind::UnexpectedEof, io::ErrorKind::InvalidData)] kind: io::ErrorKind,
    ) {
        let codec = Codec::new(algorithm);
        let original: Vec<u8> = (0..64 * 1024u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 9) as u8).collect();
        let compressed = codec.compress(&original).unwrap();
        let source = Failing { data: &compressed[..compressed.len() / 2], kind };
        let err = codec.decompress_stream(source, io::sink()).unwrap_err();
        assert_eq!(*err, ErrorKind::Io);
    }

    #[test]
    fn test_gzip_reads_all_members() {
        let codec = Codec::new(Algorithm::Gzip);
        let mut stream = codec.compress(b"first member, ").unwrap();
        stream.extend(codec.compress(b"second member").unwrap());
        assert_eq!(codec.decompress(&stream).unwrap(), b"first member, second member");
    }

    #[test]
    fn test_gzip_source_failure_on_wrap() {
        let err = Codec::new(Algorithm::Gzip).wrap_reader(Failing::new(&[])).err().unwrap();
        assert_eq!(*err, ErrorKind::Io);
    }
}
