//! Compression Operations

use crate::Codec;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{Read, Write};
use tracing::instrument;

impl Codec {
    /// Compress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use spill_compress::{Algorithm, Codec};
    ///
    /// let data = b"Hello, world!";
    /// let compressed = Codec::new(Algorithm::S2).compress(data).unwrap();
    /// assert_ne!(compressed, data);
    /// ```
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.compress_into(input, &mut output)?;
        Ok(output)
    }

    /// Decompress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spill_compress::{Algorithm, Codec};
    ///
    /// let codec = Codec::new(Algorithm::Snappy);
    /// let original = b"Hello, world!";
    /// let compressed = codec.compress(original).unwrap();
    /// let decompressed = codec.decompress(&compressed).unwrap();
    /// assert_eq!(decompressed, original);
    /// ```
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.decompress_into(input, &mut output)?;
        Ok(output)
    }

    /// Compress `input`, appending to `output`. Returns the number of bytes
    /// appended. On error `output` is left as it was.
    #[instrument(skip(input, output), fields(
        codec = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn compress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let before = output.len();
        if let Err(err) = self.encode_all(input, output) {
            output.truncate(before);
            return Err(err);
        }
        let size = output.len() - before;
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }

    fn encode_all(&self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
        let mut encoder = self.wrap_writer(output)?;
        encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
        encoder.finish()?;
        Ok(())
    }

    /// Decompress `input`, appending to `output`. Returns the number of bytes
    /// appended. On error `output` is left as it was, even if part of the
    /// input decoded.
    #[instrument(skip(input, output), fields(
        codec = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn decompress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let before = output.len();
        let size = self.decode_all(input, output).inspect_err(|_| output.truncate(before))?;
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }

    fn decode_all(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let mut decoder = self.wrap_reader(input)?;
        let size = decoder.read_to_end(output).map_err(|err| {
            let kind = ErrorKind::from_read(&err);
            exn::Exn::new(err).raise(kind)
        })?;
        decoder.release();
        Ok(size)
    }

    /// Compress from a reader to a writer, returning the number of
    /// uncompressed bytes read.
    ///
    /// Streams without buffering the entire input in memory, and finishes
    /// the compressed stream before returning.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use spill_compress::{Algorithm, Codec};
    ///
    /// let input = Cursor::new(b"Hello, world!");
    /// let mut output = Vec::new();
    /// let bytes = Codec::new(Algorithm::Gzip).compress_stream(input, &mut output).unwrap();
    /// assert_eq!(bytes, 13);
    /// ```
    pub fn compress_stream<R: Read, W: Write>(&self, mut reader: R, writer: W) -> Result<u64> {
        let mut encoder = self.wrap_writer(writer)?;
        let bytes = std::io::copy(&mut reader, &mut encoder).or_raise(|| ErrorKind::Io)?;
        encoder.finish()?;
        Ok(bytes)
    }

    /// Decompress from a reader to a writer, returning the number of
    /// decompressed bytes written.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use spill_compress::{Algorithm, Codec};
    ///
    /// let codec = Codec::new(Algorithm::Zstd);
    /// let original = b"Hello, world!";
    /// let compressed = codec.compress(original).unwrap();
    ///
    /// let input = Cursor::new(compressed);
    /// let mut output = Vec::new();
    /// let bytes = codec.decompress_stream(input, &mut output).unwrap();
    /// assert_eq!(output, original);
    /// assert_eq!(bytes, original.len() as u64);
    /// ```
    pub fn decompress_stream<R: Read, W: Write>(&self, reader: R, mut writer: W) -> Result<u64> {
        let mut decoder = self.wrap_reader(reader)?;
        let mut buffer = vec![0u8; STREAM_BUFFER_SIZE];
        let mut total = 0u64;
        loop {
            let n = match decoder.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    let kind = ErrorKind::from_read(&err);
                    return Err(exn::Exn::new(err).raise(kind));
                },
            };
            writer.write_all(&buffer[..n]).or_raise(|| ErrorKind::Io)?;
            total += n as u64;
        }
        writer.flush().or_raise(|| ErrorKind::Io)?;
        decoder.release();
        Ok(total)
    }
}

/// Chunk size used when copying decompressed data to a writer; matches
/// the default buffer size of [`std::io::copy`].
const STREAM_BUFFER_SIZE: usize = 8 * 1024;
