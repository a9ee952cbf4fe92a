//! An ordered `Tag -> DataElement` container.

use std::collections::{BTreeMap, HashSet};

use crate::dataelement::DataElement;
use crate::dictionary::{DataDictionary, DictionaryEntry};
use crate::stream::Stream;
use crate::tag::Tag;
use crate::uid::Uid;

/// An ordered, keyed container of [`DataElement`]s.
///
/// Elements inserted in ascending-tag order (the common case while parsing
/// a well-formed stream) are appended to a flat vector with amortized O(1)
/// cost. Out-of-order insertions and re-insertions after removal fall back
/// to a sorted overflow map, which always takes precedence over a
/// same-tag entry recorded earlier in the vector. Iteration merges both by
/// tag, so it is always strictly increasing regardless of insertion order.
pub struct DataSet {
    ordered: Vec<DataElement>,
    overflow: BTreeMap<Tag, DataElement>,
    /// Tags that were physically appended to `ordered` but have since been
    /// removed or superseded by an `overflow` entry.
    shadowed: HashSet<Tag>,
    stream: Stream,
    little_endian: bool,
    explicit_vr: bool,
    transfer_syntax: Option<Uid>,
    /// The highest tag whose parsing has completed so far; drives lazy
    /// materialization continuation in the parser/object layers.
    last_tag_loaded: Tag,
}

impl DataSet {
    pub fn new(stream: Stream, little_endian: bool, explicit_vr: bool) -> DataSet {
        DataSet {
            ordered: Vec::new(),
            overflow: BTreeMap::new(),
            shadowed: HashSet::new(),
            stream,
            little_endian,
            explicit_vr,
            transfer_syntax: None,
            last_tag_loaded: Tag::from(0u32),
        }
    }

    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    /// Swaps the backing stream (e.g. after deflate inflation). Callers are
    /// responsible for invalidating any cache
    /// that depends on the prior stream.
    pub fn set_stream(&mut self, stream: Stream) {
        self.stream = stream;
    }

    pub fn is_little_endian(&self) -> bool {
        self.little_endian
    }

    pub fn is_explicit_vr(&self) -> bool {
        self.explicit_vr
    }

    pub fn transfer_syntax(&self) -> Option<&Uid> {
        self.transfer_syntax.as_ref()
    }

    pub fn set_transfer_syntax(&mut self, uid: Uid) {
        self.transfer_syntax = Some(uid);
    }

    pub fn last_tag_loaded(&self) -> Tag {
        self.last_tag_loaded
    }

    pub fn set_last_tag_loaded(&mut self, tag: Tag) {
        if tag > self.last_tag_loaded {
            self.last_tag_loaded = tag;
        }
    }

    pub fn len(&self) -> usize {
        self.ordered.len() - self.shadowed.len() + self.overflow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ordered_index_of(&self, tag: Tag) -> Option<usize> {
        self.ordered.binary_search_by_key(&tag, |e| e.tag()).ok()
    }

    /// Inserts or replaces an element, preserving ascending-tag append order
    /// when possible.
    pub fn insert(&mut self, element: DataElement) {
        let tag = element.tag();
        self.shadowed.remove(&tag);

        let appends_in_order = match self.ordered.last() {
            None => true,
            Some(last) => tag > last.tag(),
        };

        if appends_in_order && self.ordered_index_of(tag).is_none() {
            self.ordered.push(element);
        } else {
            if self.ordered_index_of(tag).is_some() {
                self.shadowed.insert(tag);
            }
            self.overflow.insert(tag, element);
        }
        self.set_last_tag_loaded(tag);
    }

    /// Tombstones `tag`. A subsequent [`DataSet::insert`] for the same tag
    /// restores its (sorted) position.
    pub fn remove(&mut self, tag: Tag) -> bool {
        let had_overflow = self.overflow.remove(&tag).is_some();
        let had_ordered = self.ordered_index_of(tag).is_some() && !self.shadowed.contains(&tag);
        if had_ordered {
            self.shadowed.insert(tag);
        }
        had_overflow || had_ordered
    }

    /// Looks up an element by tag. Never returns `None`: misses resolve to
    /// the shared null-element sentinel.
    pub fn get(&self, tag: Tag) -> &DataElement {
        if let Some(e) = self.overflow.get(&tag) {
            return e;
        }
        if !self.shadowed.contains(&tag) {
            if let Some(idx) = self.ordered_index_of(tag) {
                return &self.ordered[idx];
            }
        }
        DataElement::missing()
    }

    pub fn contains(&self, tag: Tag) -> bool {
        !self.get(tag).is_missing()
    }

    /// Looks up an element by its dictionary keyword.
    pub fn get_by_keyword<D: DataDictionary>(&self, dict: &D, keyword: &str) -> &DataElement {
        match dict.by_name(keyword) {
            Some(entry) => self.get(entry.tag()),
            None => DataElement::missing(),
        }
    }

    /// Iterates elements in strictly increasing tag order.
    pub fn iter(&self) -> impl Iterator<Item = &DataElement> {
        DataSetIter {
            ordered: &self.ordered,
            shadowed: &self.shadowed,
            overflow_iter: self.overflow.values().peekable(),
            ordered_pos: 0,
        }
    }
}

struct DataSetIter<'a> {
    ordered: &'a [DataElement],
    shadowed: &'a HashSet<Tag>,
    overflow_iter: std::iter::Peekable<std::collections::btree_map::Values<'a, Tag, DataElement>>,
    ordered_pos: usize,
}

impl<'a> Iterator for DataSetIter<'a> {
    type Item = &'a DataElement;

    fn next(&mut self) -> Option<&'a DataElement> {
        loop {
            while self.ordered_pos < self.ordered.len()
                && self.shadowed.contains(&self.ordered[self.ordered_pos].tag())
            {
                self.ordered_pos += 1;
            }
            let next_ordered = self.ordered.get(self.ordered_pos);
            let next_overflow = self.overflow_iter.peek().copied();

            return match (next_ordered, next_overflow) {
                (None, None) => None,
                (Some(o), None) => {
                    self.ordered_pos += 1;
                    Some(o)
                }
                (None, Some(_)) => self.overflow_iter.next(),
                (Some(o), Some(ov)) => {
                    if o.tag() <= ov.tag() {
                        self.ordered_pos += 1;
                        Some(o)
                    } else {
                        self.overflow_iter.next()
                    }
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataelement::Storage;
    use crate::vr::Vr;

    fn elem(tag: u32) -> DataElement {
        DataElement::new(Tag::from(tag), Vr::US, 2, 0, Storage::Owned(vec![1, 0]))
    }

    fn dataset() -> DataSet {
        DataSet::new(Stream::from_owned(vec![]), true, true)
    }

    #[test]
    fn iteration_is_strictly_increasing() {
        let mut ds = dataset();
        ds.insert(elem(0x0010_0010));
        ds.insert(elem(0x0008_0060));
        ds.insert(elem(0x0008_0020));
        ds.insert(elem(0x0020_000D));

        let tags: Vec<Tag> = ds.iter().map(|e| e.tag()).collect();
        let mut sorted = tags.clone();
        sorted.sort();
        assert_eq!(tags, sorted);
        assert_eq!(tags.len(), 4);
    }

    #[test]
    fn tombstone_then_reinsert_restores_position() {
        let mut ds = dataset();
        ds.insert(elem(0x0008_0020));
        ds.insert(elem(0x0008_0060));
        ds.insert(elem(0x0010_0010));

        assert!(ds.remove(Tag::from(0x0008_0060u32)));
        assert!(ds.get(Tag::from(0x0008_0060u32)).is_missing());
        assert_eq!(ds.len(), 2);

        ds.insert(elem(0x0008_0060));
        assert!(!ds.get(Tag::from(0x0008_0060u32)).is_missing());
        let tags: Vec<Tag> = ds.iter().map(|e| e.tag()).collect();
        assert_eq!(
            tags,
            vec![
                Tag::from(0x0008_0020u32),
                Tag::from(0x0008_0060u32),
                Tag::from(0x0010_0010u32)
            ]
        );
    }

    #[test]
    fn get_on_miss_returns_shared_null_sentinel() {
        let ds = dataset();
        let e = ds.get(Tag::from(0x0010_0010u32));
        assert!(e.is_missing());
    }
}
