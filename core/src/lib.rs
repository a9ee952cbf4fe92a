//! Core value types, byte-stream primitives and the in-memory data model
//! for DICOM Part 10 files.
//!
//! This crate has no knowledge of how bytes are parsed into a [`DataSet`];
//! that is `dcm-parser`'s job. It only defines the vocabulary: [`Tag`],
//! [`Vr`], [`Uid`], [`DataElement`], [`DataSet`], [`Sequence`] and the
//! pixel-sequence types, plus the byte-stream primitives ([`Stream`]) they
//! are built from.

pub mod dataelement;
pub mod dataset;
pub mod dictionary;
pub mod endian;
pub mod error;
pub mod pixel;
pub mod sequence;
pub mod stream;
pub mod tag;
pub mod uid;
pub mod value;
pub mod vr;

pub use dataelement::{DataElement, Storage};
pub use dataset::DataSet;
pub use error::{Error, Result};
pub use pixel::{EncodedFrame, PixelFragment, PixelFrame, PixelSequence};
pub use sequence::{Sequence, SequenceItem};
pub use stream::{ByteView, Stream};
pub use tag::Tag;
pub use uid::{TsFlags, Uid, UidDictionary, UidEntry, UidType};
pub use vr::{Vr, VrClass};

/// Convenience re-exports for application code.
pub mod prelude {
    pub use crate::dataelement::DataElement;
    pub use crate::dataset::DataSet;
    pub use crate::tag::Tag;
    pub use crate::uid::Uid;
    pub use crate::vr::Vr;
}
