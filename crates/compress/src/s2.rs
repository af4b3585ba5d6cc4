//! S2 streams on top of `minlz`.
//!
//! `minlz::Writer` completes its stream when dropped, and neither it nor
//! `minlz::Reader` hands the wrapped sink or source back. Both are bound to a
//! [`Slot`] instead, which lends the value to the stream until it is detached.

use std::io::{self, Read, Write};

/// Stream identifier chunk that opens every S2 stream.
pub(crate) const STREAM_IDENTIFIER: &[u8; 10] = b"\xff\x06\x00\x00S2sTwO";

pub(crate) type Writer<W> = minlz::Writer<Slot<W>>;
pub(crate) type Reader<R> = minlz::Reader<Slot<R>>;

pub(crate) struct Slot<T> {
    inner: Option<T>,
    written: u64,
}

impl<T> Slot<T> {
    fn new(inner: T) -> Self {
        Self { inner: Some(inner), written: 0 }
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.inner.as_ref()
    }

    pub(crate) fn take(&mut self) -> Option<T> {
        self.inner.take()
    }
}

fn detached() -> io::Error {
    io::Error::other("s2 stream is detached")
}

impl<W: Write> Write for Slot<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.as_mut().ok_or_else(detached)?.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    /// A detached slot has nothing left to flush.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.as_mut().map_or(Ok(()), Write::flush)
    }
}

impl<R: Read> Read for Slot<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.as_mut().ok_or_else(detached)?.read(buf)
    }
}

pub(crate) fn writer<W: Write>(sink: W) -> Writer<W> {
    minlz::Writer::new(Slot::new(sink))
}

pub(crate) fn reader<R: Read>(source: R) -> Reader<R> {
    minlz::Reader::new(Slot::new(source))
}

/// Write the final block and detach the sink.
///
/// `minlz` only writes the stream identifier along with the first block, so
/// an empty stream gets it here; otherwise it would read back as truncated.
pub(crate) fn finish<W: Write>(mut writer: Writer<W>) -> io::Result<W> {
    writer.flush()?;
    let slot = writer.get_mut();
    if slot.written == 0 {
        slot.write_all(STREAM_IDENTIFIER)?;
        slot.flush()?;
    }
    // The buffer is empty and the slot detached, so the drop-time flush
    // writes nothing.
    slot.take().ok_or_else(detached)
}
