//! Compile-time perfect-hash dictionaries: attribute tags, UIDs and
//! character sets.

pub mod charset;
pub mod tags;
pub mod uids;

use dcm_core::dictionary::DataDictionary;
use dcm_core::uid::UidDictionary;
use dcm_core::Tag;

pub use tags::DictEntry;
pub use uids::UidEntry;

/// Generic Group Length entries (`gggg,0000`) exist for every group but are
/// not individually generated; synthesized on miss instead.
const GROUP_LENGTH_ENTRY: DictEntry = DictEntry {
    tag: 0,
    keyword: "GenericGroupLength",
    vr: dcm_core::Vr::UL,
};

/// Private Creator elements (odd group, element in `0010..=00FF`) exist for
/// every private group.
const PRIVATE_CREATOR_ENTRY: DictEntry = DictEntry {
    tag: 0,
    keyword: "PrivateCreator",
    vr: dcm_core::Vr::LO,
};

/// The standard DICOM attribute dictionary: a zero-sized handle over the
/// process-static perfect-hash tables in [`tags`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StandardDataDictionary;

impl StandardDataDictionary {
    fn lookup_tag(tag: Tag) -> Option<&'static DictEntry> {
        if let Some(entry) = tags::TAG_MAP.get(&tag.0) {
            return Some(entry);
        }
        // repeating-group (wildcard) fallback, after the exact-tag miss
        //
        if let Some(entry) = tags::lookup_wildcard(tag) {
            return Some(entry);
        }
        if tag.is_private() && (0x0010..=0x00FF).contains(&tag.element()) {
            return Some(&PRIVATE_CREATOR_ENTRY);
        }
        if tag.is_group_length() {
            return Some(&GROUP_LENGTH_ENTRY);
        }
        None
    }
}

impl DataDictionary for StandardDataDictionary {
    type Entry = DictEntry;

    fn by_name(&self, keyword: &str) -> Option<&DictEntry> {
        tags::KEYWORD_MAP.get(keyword)
    }

    fn by_tag(&self, tag: Tag) -> Option<&DictEntry> {
        StandardDataDictionary::lookup_tag(tag)
    }
}

/// The standard UID registry: transfer syntaxes, SOP classes and well-known
/// SOP instances.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StandardUidDictionary;

impl UidDictionary for StandardUidDictionary {
    type Entry = UidEntry;

    fn by_value(&self, value: &str) -> Option<&UidEntry> {
        uids::VALUE_MAP.get(value)
    }

    fn by_keyword(&self, keyword: &str) -> Option<&UidEntry> {
        uids::KEYWORD_MAP.get(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_roundtrip_keyword_and_tag() {
        let dict = StandardDataDictionary;
        let entry = dict.by_name("PatientName").expect("PatientName exists");
        assert_eq!(entry.tag, 0x0010_0010);

        let by_tag = dict.by_tag(Tag::from(0x0010_0010u32)).expect("tag exists");
        assert_eq!(by_tag.keyword, "PatientName");
    }

    #[test]
    fn repeating_overlay_group_resolves_via_wildcard() {
        let dict = StandardDataDictionary;
        let entry = dict
            .by_tag(Tag::from(0x60EE_3000u32))
            .expect("repeating overlay data group resolves");
        assert_eq!(entry.keyword, "OverlayData");
    }

    #[test]
    fn private_creator_and_group_length_are_synthesized() {
        let dict = StandardDataDictionary;
        let pc = dict.by_tag(Tag::from(0x0009_0010u32)).unwrap();
        assert_eq!(pc.keyword, "PrivateCreator");

        let gl = dict.by_tag(Tag::from(0x7FE0_0000u32)).unwrap();
        assert_eq!(gl.keyword, "GenericGroupLength");
    }

    #[test]
    fn unknown_tag_misses() {
        let dict = StandardDataDictionary;
        assert!(dict.by_tag(Tag::from(0xAAAA_AAAAu32)).is_none());
        assert!(dict.by_name("NotARealKeyword").is_none());
    }
}
