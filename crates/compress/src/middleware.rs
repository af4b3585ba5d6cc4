//! Stream transform contract shared with the other buffer middlewares.

use crate::error::{ErrorKind, Result};
use crate::{Codec, Encoder};
use exn::ResultExt;
use std::io::{self, Read, Write};

/// A writer that must be explicitly completed.
///
/// Finishing a layer also finishes the layer beneath it, so completing the
/// outermost writer of a stack completes all of them, innermost last.
pub trait FinishWrite: Write {
    /// Complete the stream, consuming the writer.
    fn finish(self: Box<Self>) -> Result<()>;
}

/// A byte-stream transform that can be stacked with others (compression,
/// encryption, ...) without any of them knowing about each other.
pub trait Middleware: Send + Sync {
    /// Wrap a sink, returning a writer that transforms everything written
    /// to it.
    fn writer<'a>(&self, sink: Box<dyn FinishWrite + Send + 'a>) -> Result<Box<dyn FinishWrite + Send + 'a>>;

    /// Wrap a source, returning a reader that reverses the transform.
    fn reader<'a>(&self, source: Box<dyn Read + Send + 'a>) -> Result<Box<dyn Read + Send + 'a>>;
}

/// The bottom of a stack: a plain sink, which only needs flushing.
pub struct Flushing<W>(pub W);

impl<W: Write> Write for Flushing<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write> FinishWrite for Flushing<W> {
    fn finish(mut self: Box<Self>) -> Result<()> {
        self.0.flush().or_raise(|| ErrorKind::Io)
    }
}

impl<W: FinishWrite + ?Sized> FinishWrite for Encoder<Box<W>> {
    fn finish(self: Box<Self>) -> Result<()> {
        let sink = Encoder::finish(*self)?;
        sink.finish()
    }
}

impl Middleware for Codec {
    fn writer<'a>(&self, sink: Box<dyn FinishWrite + Send + 'a>) -> Result<Box<dyn FinishWrite + Send + 'a>> {
        Ok(Box::new(self.wrap_writer(sink)?))
    }

    fn reader<'a>(&self, source: Box<dyn Read + Send + 'a>) -> Result<Box<dyn Read + Send + 'a>> {
        Ok(Box::new(self.wrap_reader(source)?))
    }
}

/// An ordered stack of middlewares, itself usable as one middleware.
///
/// Written data passes through the layers in the order they were pushed, so
/// the last layer pushed is the one closest to the sink. Reading undoes them
/// in reverse.
///
/// # Examples
///
/// ```
/// use spill_compress::{Algorithm, Codec, Flushing, Middleware, Pipeline};
/// use std::io::{Read, Write};
///
/// let pipeline = Pipeline::new()
///     .push(Codec::new(Algorithm::Zstd))
///     .push(Codec::new(Algorithm::S2));
///
/// let mut stored = Vec::new();
/// let mut writer = pipeline.writer(Box::new(Flushing(&mut stored))).unwrap();
/// writer.write_all(b"Hello, world!").unwrap();
/// writer.finish().unwrap();
///
/// let mut reader = pipeline.reader(Box::new(stored.as_slice())).unwrap();
/// let mut output = Vec::new();
/// reader.read_to_end(&mut output).unwrap();
/// assert_eq!(output, b"Hello, world!");
/// ```
#[derive(Default)]
pub struct Pipeline {
    layers: Vec<Box<dyn Middleware>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn push(mut self, layer: impl Middleware + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Middleware for Pipeline {
    fn writer<'a>(&self, sink: Box<dyn FinishWrite + Send + 'a>) -> Result<Box<dyn FinishWrite + Send + 'a>> {
        self.layers.iter().rev().try_fold(sink, |sink, layer| layer.writer(sink))
    }

    fn reader<'a>(&self, source: Box<dyn Read + Send + 'a>) -> Result<Box<dyn Read + Send + 'a>> {
        self.layers.iter().rev().try_fold(source, |source, layer| layer.reader(source))
    }
}
