//! A single DICOM attribute.

use once_cell::sync::Lazy;

use crate::error::Error;
use crate::sequence::Sequence;
use crate::stream::ByteView;
use crate::tag::Tag;
use crate::value::primitive;
use crate::value::person_name::PersonName;
use crate::vr::{Vr, VrClass};
use crate::pixel::PixelSequence;

/// Where a [`DataElement`]'s bytes actually live.
///
/// Exactly one of these holds for any given element: a byte view or
/// owned buffer for leaf values, a [`Sequence`]
/// when `vr == SQ`, a [`PixelSequence`] when `vr == PX`, or `Missing` for
/// the shared null-element sentinel.
pub enum Storage {
    /// Bytes borrowed (zero-copy, ref-counted) from the owning data set's stream.
    View(ByteView),
    /// Bytes owned by the element itself (built in memory, not stream-backed).
    Owned(Vec<u8>),
    Sequence(Box<Sequence>),
    Pixels(Box<PixelSequence>),
    Missing,
}

/// A DICOM data element: tag, VR, declared length, stream offset, and value.
pub struct DataElement {
    tag: Tag,
    vr: Vr,
    /// Declared value length in bytes, as read from the header. `u32::MAX`
    /// is preserved verbatim for undefined-length SQ/PX elements.
    length: u32,
    /// Absolute byte offset of the value field within the owning data set's
    /// root stream. Only meaningful when `storage` is `View`.
    offset: u64,
    storage: Storage,
}

static NULL_ELEMENT: Lazy<DataElement> = Lazy::new(|| DataElement {
    tag: Tag::from(0u32),
    vr: Vr::UN,
    length: 0,
    offset: 0,
    storage: Storage::Missing,
});

impl DataElement {
    pub fn new(tag: Tag, vr: Vr, length: u32, offset: u64, storage: Storage) -> DataElement {
        DataElement {
            tag,
            vr,
            length,
            offset,
            storage,
        }
    }

    /// The shared null-element sentinel returned for missing lookups.
    pub fn missing() -> &'static DataElement {
        &NULL_ELEMENT
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.storage, Storage::Missing)
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    pub fn vr(&self) -> Vr {
        self.vr
    }

    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn sequence(&self) -> Option<&Sequence> {
        match &self.storage {
            Storage::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn sequence_mut(&mut self) -> Option<&mut Sequence> {
        match &mut self.storage {
            Storage::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn pixel_sequence(&self) -> Option<&PixelSequence> {
        match &self.storage {
            Storage::Pixels(p) => Some(p),
            _ => None,
        }
    }

    /// The raw value bytes. Empty for `SQ`/`PX` elements and for the
    /// missing sentinel.
    pub fn value_span(&self) -> &[u8] {
        match &self.storage {
            Storage::View(v) => v.as_slice(),
            Storage::Owned(b) => b.as_slice(),
            Storage::Sequence(_) | Storage::Pixels(_) | Storage::Missing => &[],
        }
    }

    pub fn value_multiplicity(&self) -> usize {
        primitive::vm_of(self.value_span(), self.vr)
    }

    pub fn to_i64_vector(&self, little_endian: bool) -> Result<Vec<i64>, Error> {
        Ok(primitive::to_i64_vector(self.tag, self.value_span(), self.vr, little_endian)?.into_vec())
    }

    pub fn to_i64(&self, little_endian: bool) -> Result<i64, Error> {
        first_or_out_of_range(self.tag, self.to_i64_vector(little_endian)?)
    }

    pub fn to_i32_vector(&self, little_endian: bool) -> Result<Vec<i32>, Error> {
        Ok(primitive::to_i32_vector(self.tag, self.value_span(), self.vr, little_endian)?.into_vec())
    }

    pub fn to_i32(&self, little_endian: bool) -> Result<i32, Error> {
        first_or_out_of_range(self.tag, self.to_i32_vector(little_endian)?)
    }

    pub fn to_i16_vector(&self, little_endian: bool) -> Result<Vec<i16>, Error> {
        Ok(primitive::to_i16_vector(self.tag, self.value_span(), self.vr, little_endian)?.into_vec())
    }

    pub fn to_i16(&self, little_endian: bool) -> Result<i16, Error> {
        first_or_out_of_range(self.tag, self.to_i16_vector(little_endian)?)
    }

    pub fn to_f64_vector(&self, little_endian: bool) -> Result<Vec<f64>, Error> {
        Ok(primitive::to_f64_vector(self.tag, self.value_span(), self.vr, little_endian)?.into_vec())
    }

    pub fn to_f64(&self, little_endian: bool) -> Result<f64, Error> {
        first_or_out_of_range(self.tag, self.to_f64_vector(little_endian)?)
    }

    pub fn to_tag_vector(&self, little_endian: bool) -> Result<Vec<Tag>, Error> {
        Ok(primitive::to_tag_vector(self.tag, self.value_span(), little_endian)?.into_vec())
    }

    pub fn to_tag(&self, little_endian: bool) -> Result<Tag, Error> {
        first_or_out_of_range(self.tag, self.to_tag_vector(little_endian)?)
    }

    pub fn to_string_views(&self) -> Result<Vec<String>, Error> {
        primitive::string_views(self.value_span(), self.vr)
    }

    pub fn to_string_view(&self) -> Result<String, Error> {
        Ok(self.to_string_views()?.into_iter().next().unwrap_or_default())
    }

    pub fn to_uid_string(&self) -> String {
        primitive::uid_string(self.value_span())
    }

    pub fn to_person_name(&self) -> Result<PersonName, Error> {
        Ok(PersonName::parse(&self.to_string_view()?))
    }

    /// Whether this element, given `vr == SQ`/`PX`, satisfies the
    /// storage/VR mutual-exclusion invariant.
    pub fn check_storage_invariant(&self) -> bool {
        match (self.vr.classification(), &self.storage) {
            (VrClass::Sequence, Storage::Sequence(_)) => true,
            (VrClass::Sequence, Storage::Missing) => true,
            (VrClass::PixelSequence, Storage::Pixels(_)) => true,
            (VrClass::PixelSequence, Storage::Missing) => true,
            (VrClass::String | VrClass::Binary, Storage::View(_) | Storage::Owned(_) | Storage::Missing) => {
                true
            }
            _ => false,
        }
    }
}

fn first_or_out_of_range<T>(tag: Tag, mut v: Vec<T>) -> Result<T, Error> {
    if v.is_empty() {
        Err(Error::OutOfRange { tag })
    } else {
        Ok(v.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_element_has_empty_span() {
        let e = DataElement::missing();
        assert!(e.is_missing());
        assert_eq!(e.value_span().len(), 0);
        assert_eq!(e.value_span().len() as u32, e.length());
    }

    #[test]
    fn value_span_len_matches_declared_length_for_leaf_values() {
        let e = DataElement::new(
            Tag::from((0x0010, 0x0010)),
            Vr::PN,
            8,
            128,
            Storage::Owned(b"DOE^JOHN".to_vec()),
        );
        assert_eq!(e.value_span().len(), e.length() as usize);
    }
}
