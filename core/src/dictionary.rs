//! The dictionary trait contract (C2's consumer-facing interface).
//!
//! `dcm-core` only defines *how* a dictionary is queried; the actual static
//! tables live in `dcm-dictionary` so that this crate stays free of any
//! generated data.

use crate::tag::Tag;
use crate::vr::Vr;

/// One dictionary entry: an attribute's canonical keyword and typical VR.
pub trait DictionaryEntry {
    fn tag(&self) -> Tag;
    fn keyword(&self) -> &str;
    fn vr(&self) -> Vr;
}

/// A read-only attribute dictionary.
///
/// Implementations are expected to be allocation-free after construction
/// and safe to share across threads.
pub trait DataDictionary {
    type Entry: DictionaryEntry;

    fn by_name(&self, keyword: &str) -> Option<&Self::Entry>;
    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry>;
}

impl<D: DataDictionary> DataDictionary for &D {
    type Entry = D::Entry;

    fn by_name(&self, keyword: &str) -> Option<&Self::Entry> {
        (**self).by_name(keyword)
    }

    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry> {
        (**self).by_tag(tag)
    }
}
