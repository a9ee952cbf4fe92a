//! Element header decoding: explicit-VR and implicit-VR
//! layouts, dispatched per the dataset's declared VR mode.

use dcm_core::dictionary::{DataDictionary, DictionaryEntry};
use dcm_core::{tag, Stream, Tag, Vr};

use crate::error::{BadVrSnafu, Result};

/// Value length `0xFFFFFFFF`, DICOM's "undefined length" sentinel.
pub const UNDEFINED_LENGTH: u32 = 0xFFFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    pub tag: Tag,
    pub vr: Vr,
    pub length: u32,
}

impl ElementHeader {
    pub fn is_delimiter(&self) -> bool {
        self.tag == tag::ITEM_DELIMITATION || self.tag == tag::SEQUENCE_DELIMITATION
    }
}

/// Reads one element header, honoring the dataset's declared endianness and
/// VR mode. Item/sequence delimiter pseudo-headers (tag + 4-byte zero
/// length, no VR) are recognized ahead of the VR-dependent layouts since
/// they can appear wherever an element header is expected inside a
/// sequence item or pixel data scope.
pub fn read_element_header<D: DataDictionary>(
    cursor: &mut Stream,
    dict: &D,
    little_endian: bool,
    explicit_vr: bool,
) -> Result<ElementHeader> {
    let tag = cursor.get_tag(little_endian)?;

    if tag == tag::ITEM || tag == tag::ITEM_DELIMITATION || tag == tag::SEQUENCE_DELIMITATION {
        let length = cursor.get_u32(little_endian)?;
        return Ok(ElementHeader { tag, vr: Vr::UN, length });
    }

    if explicit_vr {
        read_explicit_vr_tail(cursor, tag, little_endian)
    } else {
        let length = cursor.get_u32(little_endian)?;
        let vr = dict.by_tag(tag).map(DictionaryEntry::vr).unwrap_or(Vr::UN);
        Ok(ElementHeader { tag, vr, length })
    }
}

fn read_explicit_vr_tail(cursor: &mut Stream, tag: Tag, little_endian: bool) -> Result<ElementHeader> {
    let vr_bytes = cursor.try_read(2)?;
    let raw = vr_bytes.as_slice();
    let (a, b) = (raw[0], raw[1]);
    if !a.is_ascii_uppercase() || !b.is_ascii_uppercase() {
        return BadVrSnafu { tag, bytes: [a, b] }.fail();
    }
    let vr = Vr::from_chars(a, b);

    let length = if vr.uses_32bit_length() {
        cursor.skip(2)?; // reserved
        cursor.get_u32(little_endian)?
    } else {
        cursor.get_u16(little_endian)? as u32
    };

    Ok(ElementHeader { tag, vr, length })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcm_core::dictionary::DataDictionary;

    struct EmptyDict;
    impl DataDictionary for EmptyDict {
        type Entry = dcm_dictionary::DictEntry;
        fn by_name(&self, _: &str) -> Option<&Self::Entry> {
            None
        }
        fn by_tag(&self, _: Tag) -> Option<&Self::Entry> {
            None
        }
    }

    #[test]
    fn reads_explicit_vr_short_form() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0010u16.to_le_bytes());
        bytes.extend_from_slice(&0x0010u16.to_le_bytes());
        bytes.extend_from_slice(b"PN");
        bytes.extend_from_slice(&8u16.to_le_bytes());
        bytes.extend_from_slice(b"DOE^JOHN");

        let mut stream = Stream::from_owned(bytes);
        let header = read_element_header(&mut stream, &EmptyDict, true, true).unwrap();
        assert_eq!(header.tag, Tag::from((0x0010, 0x0010)));
        assert_eq!(header.vr, Vr::PN);
        assert_eq!(header.length, 8);
    }

    #[test]
    fn reads_explicit_vr_long_form_with_reserved_bytes() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x7FE0u16.to_le_bytes());
        bytes.extend_from_slice(&0x0010u16.to_le_bytes());
        bytes.extend_from_slice(b"OB");
        bytes.extend_from_slice(&[0, 0]); // reserved
        bytes.extend_from_slice(&4u32.to_le_bytes());

        let mut stream = Stream::from_owned(bytes);
        let header = read_element_header(&mut stream, &EmptyDict, true, true).unwrap();
        assert_eq!(header.vr, Vr::OB);
        assert_eq!(header.length, 4);
    }

    #[test]
    fn reads_implicit_vr_with_dictionary_fallback() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0xAAAAu16.to_le_bytes());
        bytes.extend_from_slice(&0xAAAAu16.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        let mut stream = Stream::from_owned(bytes);
        let header = read_element_header(&mut stream, &EmptyDict, true, false).unwrap();
        assert_eq!(header.vr, Vr::UN);
    }

    #[test]
    fn rejects_non_alphabetic_vr_bytes() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0010u16.to_le_bytes());
        bytes.extend_from_slice(&0x0010u16.to_le_bytes());
        bytes.extend_from_slice(&[0x00, 0x01]);
        bytes.extend_from_slice(&0u16.to_le_bytes());

        let mut stream = Stream::from_owned(bytes);
        assert!(read_element_header(&mut stream, &EmptyDict, true, true).is_err());
    }
}
