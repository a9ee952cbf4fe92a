//! Memory-mapped and owned byte-stream primitives.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use snafu::ResultExt;

use crate::endian::{f32_get, f64_get, u16_rw, u32_rw};
use crate::error::{Error, OutOfRangeSpanSnafu, UnexpectedEofSnafu};
use crate::tag::Tag;

/// The owner of a stream's backing bytes.
///
/// A [`Source`] is always exclusively owned by exactly one root [`Stream`];
/// everything else (sub-streams, byte views) shares it through an [`Arc`]
/// clone rather than copying bytes.
enum Source {
    Mapped(Mmap),
    Owned(Vec<u8>),
    /// A borrowed buffer with a caller-guaranteed `'static` lifetime. In
    /// practice this is used for bytes the caller keeps alive for at least
    /// as long as the resulting data set.
    Borrowed(&'static [u8]),
}

impl AsRef<[u8]> for Source {
    fn as_ref(&self) -> &[u8] {
        match self {
            Source::Mapped(m) => m.as_ref(),
            Source::Owned(v) => v.as_slice(),
            Source::Borrowed(b) => b,
        }
    }
}

/// A cheap, reference-counted view into a region of a [`Stream`]'s backing
/// bytes. Cloning a `ByteView` never copies the underlying data.
#[derive(Clone)]
pub struct ByteView {
    source: Arc<Source>,
    offset: u64,
    len: u64,
}

impl ByteView {
    fn empty() -> ByteView {
        ByteView {
            source: Arc::new(Source::Borrowed(&[])),
            offset: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        let all = self.source.as_ref().as_ref();
        let start = self.offset as usize;
        let end = start + self.len as usize;
        &all[start..end]
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }
}

impl std::fmt::Debug for ByteView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ByteView(offset={}, len={})", self.offset, self.len)
    }
}

/// A memory-mapped-file or in-memory byte stream with a bounded cursor.
///
/// `Stream` is the unit of ownership: a root stream owns its `Source`
/// exclusively, while a sub-stream shares it through a cloned `Arc` and is
/// bounded to a sub-range. Dropping the root while sub-streams/byte-views
/// from it are alive is safe (the `Arc` keeps the bytes alive) but is a
/// logic error the caller should avoid relying on.
#[derive(Clone)]
pub struct Stream {
    source: Arc<Source>,
    /// Absolute start offset of this stream's window within `source`.
    start: u64,
    /// Absolute end offset (exclusive) of this stream's window.
    end: u64,
    /// Absolute cursor position, always within `[start, end]`.
    cursor: u64,
}

impl Stream {
    /// Opens a file and memory-maps it read-only.
    pub fn map_file(path: impl AsRef<Path>) -> std::io::Result<Stream> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and the file is not expected to
        // be mutated concurrently by this process; this is the standard
        // caveat of memory-mapped I/O.
        let mmap = unsafe { Mmap::map(&file)? };
        let len = mmap.len() as u64;
        Ok(Stream {
            source: Arc::new(Source::Mapped(mmap)),
            start: 0,
            end: len,
            cursor: 0,
        })
    }

    /// Wraps an owned byte buffer.
    pub fn from_owned(bytes: Vec<u8>) -> Stream {
        let len = bytes.len() as u64;
        Stream {
            source: Arc::new(Source::Owned(bytes)),
            start: 0,
            end: len,
            cursor: 0,
        }
    }

    /// Wraps a borrowed buffer the caller guarantees outlives the stream.
    pub fn from_borrowed(bytes: &'static [u8]) -> Stream {
        let len = bytes.len() as u64;
        Stream {
            source: Arc::new(Source::Borrowed(bytes)),
            start: 0,
            end: len,
            cursor: 0,
        }
    }

    #[inline]
    pub fn tell(&self) -> u64 {
        self.cursor
    }

    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.end - self.cursor
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.end
    }

    fn view_at(&self, offset: u64, n: u64) -> ByteView {
        if n == 0 {
            return ByteView::empty();
        }
        ByteView {
            source: self.source.clone(),
            offset,
            len: n,
        }
    }

    /// Reads `n` bytes from the cursor and advances it. Never partial:
    /// returns an empty view if fewer than `n` bytes remain.
    pub fn read(&mut self, n: u64) -> ByteView {
        if self.remaining() < n {
            return ByteView::empty();
        }
        let view = self.view_at(self.cursor, n);
        self.cursor += n;
        view
    }

    /// Same as [`Stream::read`] but does not advance the cursor.
    pub fn peek(&self, n: u64) -> ByteView {
        if self.remaining() < n {
            return ByteView::empty();
        }
        self.view_at(self.cursor, n)
    }

    /// Tries to read exactly `n` bytes, surfacing [`Error::UnexpectedEof`]
    /// on a short stream instead of returning an empty view.
    pub fn try_read(&mut self, n: u64) -> Result<ByteView, Error> {
        if self.remaining() < n {
            return UnexpectedEofSnafu {
                wanted: n as usize,
                available: self.remaining() as usize,
            }
            .fail();
        }
        Ok(self.read(n))
    }

    pub fn read_into(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len() as u64;
        if self.remaining() < n {
            return 0;
        }
        dst.copy_from_slice(self.view_at(self.cursor, n).as_slice());
        self.cursor += n;
        dst.len()
    }

    /// Advances the cursor by `n` bytes, failing if that would run past the
    /// stream's end.
    pub fn skip(&mut self, n: u64) -> Result<(), Error> {
        if self.remaining() < n {
            return UnexpectedEofSnafu {
                wanted: n as usize,
                available: self.remaining() as usize,
            }
            .fail();
        }
        self.cursor += n;
        Ok(())
    }

    /// A random-access view, independent of the cursor.
    pub fn get_span(&self, offset: u64, n: u64) -> Result<ByteView, Error> {
        let abs_offset = self.start + offset;
        let abs_end = abs_offset.checked_add(n).unwrap_or(u64::MAX);
        if abs_end > self.end {
            return OutOfRangeSpanSnafu {
                offset,
                length: n,
                end: self.end - self.start,
            }
            .fail();
        }
        Ok(self.view_at(abs_offset, n))
    }

    pub fn seek(&mut self, pos: u64) -> Result<(), Error> {
        let abs = self.start + pos;
        if abs > self.end {
            return OutOfRangeSpanSnafu {
                offset: pos,
                length: 0u64,
                end: self.end - self.start,
            }
            .fail();
        }
        self.cursor = abs;
        Ok(())
    }

    pub fn rewind(&mut self) {
        self.cursor = self.start;
    }

    /// Moves the cursor back by `n` bytes (bounded at `start`).
    pub fn unread(&mut self, n: u64) {
        self.cursor = self.cursor.saturating_sub(n).max(self.start);
    }

    /// Produces a non-owning sub-stream over `[self.tell(), self.tell()+n)`,
    /// clamped to `self`'s own end.
    pub fn sub_stream(&self, n: u64) -> Stream {
        let start = self.cursor;
        let end = (start + n).min(self.end);
        Stream {
            source: self.source.clone(),
            start,
            end,
            cursor: start,
        }
    }

    /// A sub-stream over an explicit absolute range, clamped to `self`.
    pub fn sub_stream_at(&self, start: u64, n: u64) -> Stream {
        let abs_start = (self.start + start).min(self.end);
        let abs_end = (abs_start + n).min(self.end);
        Stream {
            source: self.source.clone(),
            start: abs_start,
            end: abs_end,
            cursor: abs_start,
        }
    }

    // -- typed convenience readers --

    pub fn get_u16(&mut self, little_endian: bool) -> Result<u16, Error> {
        let v = self.try_read(2)?;
        Ok(u16_rw::get(v.as_slice(), little_endian))
    }

    pub fn get_u32(&mut self, little_endian: bool) -> Result<u32, Error> {
        let v = self.try_read(4)?;
        Ok(u32_rw::get(v.as_slice(), little_endian))
    }

    pub fn get_f32(&mut self, little_endian: bool) -> Result<f32, Error> {
        let v = self.try_read(4)?;
        Ok(f32_get(v.as_slice(), little_endian))
    }

    pub fn get_f64(&mut self, little_endian: bool) -> Result<f64, Error> {
        let v = self.try_read(8)?;
        Ok(f64_get(v.as_slice(), little_endian))
    }

    /// Reads a `(group, element)` tag header pair, honoring dataset
    /// endianness for the header itself: headers always follow the
    /// dataset endianness, never the value endianness.
    pub fn get_tag(&mut self, little_endian: bool) -> Result<Tag, Error> {
        let group = self.get_u16(little_endian)?;
        let element = self.get_u16(little_endian)?;
        Ok(Tag::from((group, element)))
    }
}

impl std::io::Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = (buf.len() as u64).min(self.remaining());
        if n == 0 {
            return Ok(0);
        }
        let view = self.view_at(self.cursor, n);
        buf[..n as usize].copy_from_slice(view.as_slice());
        self.cursor += n;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Stream {
        Stream::from_owned((0u8..32).collect())
    }

    #[test]
    fn read_advances_cursor_and_never_partial() {
        let mut s = sample();
        let v = s.read(4);
        assert_eq!(v.as_slice(), &[0, 1, 2, 3]);
        assert_eq!(s.tell(), 4);

        let mut tail = s.sub_stream(2);
        let short = tail.read(100);
        assert!(short.is_empty());
    }

    #[test]
    fn peek_does_not_advance() {
        let mut s = sample();
        let v = s.peek(4);
        assert_eq!(v.as_slice(), &[0, 1, 2, 3]);
        assert_eq!(s.tell(), 0);
    }

    #[test]
    fn sub_stream_is_clamped_and_shares_data() {
        let mut s = sample();
        s.seek(10).unwrap();
        let mut sub = s.sub_stream(1000);
        assert_eq!(sub.end(), s.end());
        let v = sub.read(4);
        assert_eq!(v.as_slice(), &[10, 11, 12, 13]);
    }

    #[test]
    fn get_span_rejects_out_of_range() {
        let s = sample();
        assert!(s.get_span(0, 32).is_ok());
        assert!(s.get_span(0, 33).is_err());
        assert!(s.get_span(30, 4).is_err());
    }

    #[test]
    fn unread_is_bounded_at_start() {
        let mut s = sample();
        s.seek(4).unwrap();
        s.unread(100);
        assert_eq!(s.tell(), s.start());
    }
}
