//! Encapsulated pixel data: fragments, frames, and the pixel sequence that
//! groups them.

use std::sync::Mutex;

use crate::stream::{ByteView, Stream};

/// One fragment item inside an encapsulated `PixelSequence`.
#[derive(Debug, Clone, Copy)]
pub struct PixelFragment {
    /// Byte offset of this fragment's value, relative to the start of the
    /// first pixel item's value (i.e. comparable to Basic Offset Table
    /// entries).
    pub offset: u64,
    pub length: u64,
}

/// A single encoded frame: an ordered list of fragments, plus a lazily
/// coalesced, cacheable contiguous buffer for codecs that need one.
pub struct PixelFrame {
    fragments: Vec<PixelFragment>,
    coalesced: Mutex<Option<Vec<u8>>>,
}

impl PixelFrame {
    pub fn new(fragments: Vec<PixelFragment>) -> PixelFrame {
        PixelFrame {
            fragments,
            coalesced: Mutex::new(None),
        }
    }

    pub fn fragments(&self) -> &[PixelFragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn total_length(&self) -> u64 {
        self.fragments.iter().map(|f| f.length).sum()
    }

    /// Returns this frame's encoded bytes. A single-fragment frame returns a
    /// zero-copy [`ByteView`] directly into the pixel sequence's stream;
    /// otherwise fragments are coalesced into an owned buffer once and
    /// cached.
    pub fn encoded_bytes(&self, stream: &Stream) -> EncodedFrame {
        if let [only] = self.fragments.as_slice() {
            let view = stream
                .get_span(only.offset, only.length)
                .expect("fragment offsets are validated at reconstruction time");
            return EncodedFrame::View(view);
        }

        if self.coalesced.lock().unwrap().is_none() {
            let mut buf = Vec::with_capacity(self.total_length() as usize);
            for frag in &self.fragments {
                let view = stream
                    .get_span(frag.offset, frag.length)
                    .expect("fragment offsets are validated at reconstruction time");
                buf.extend_from_slice(view.as_slice());
            }
            *self.coalesced.lock().unwrap() = Some(buf);
        }

        EncodedFrame::Owned(self.coalesced.lock().unwrap().as_ref().unwrap().clone())
    }

    /// Discards the cached coalesced buffer to free memory.
    pub fn release_cache(&self) {
        *self.coalesced.lock().unwrap() = None;
    }
}

/// The result of [`PixelFrame::encoded_bytes`]: either a zero-copy view or
/// an owned, coalesced buffer.
pub enum EncodedFrame {
    View(ByteView),
    Owned(Vec<u8>),
}

impl EncodedFrame {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            EncodedFrame::View(v) => v.as_slice(),
            EncodedFrame::Owned(b) => b.as_slice(),
        }
    }
}

/// Encapsulated `PixelData` (or `FloatPixelData`/`DoubleFloatPixelData`):
/// an optional Basic Offset Table, the reconstructed per-frame fragment
/// groupings, and the sub-stream covering the pixel-data item scope.
pub struct PixelSequence {
    /// Per-frame byte offsets from the start of the first item's value, if a
    /// non-empty Basic Offset Table item was present.
    basic_offset_table: Option<Vec<u32>>,
    frames: Vec<PixelFrame>,
    stream: Stream,
}

impl PixelSequence {
    pub fn new(basic_offset_table: Option<Vec<u32>>, frames: Vec<PixelFrame>, stream: Stream) -> PixelSequence {
        PixelSequence {
            basic_offset_table,
            frames,
            stream,
        }
    }

    pub fn basic_offset_table(&self) -> Option<&[u32]> {
        self.basic_offset_table.as_deref()
    }

    pub fn number_of_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&PixelFrame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[PixelFrame] {
        &self.frames
    }

    pub fn stream(&self) -> &Stream {
        &self.stream
    }
}
