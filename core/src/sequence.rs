//! Sequences of nested data sets.

use crate::dataset::DataSet;

/// One item of a [`Sequence`]: a nested data set plus the item's originally
/// declared length (`None` for undefined-length items terminated by an item
/// delimiter).
pub struct SequenceItem {
    pub data_set: DataSet,
    pub declared_length: Option<u32>,
}

/// An ordered list of item data sets. Items are stored in the
/// order they were parsed/appended; DICOM sequences are intrinsically
/// ordered (no tag-based reordering applies at this level).
#[derive(Default)]
pub struct Sequence {
    items: Vec<SequenceItem>,
}

impl Sequence {
    pub fn new() -> Sequence {
        Sequence { items: Vec::new() }
    }

    pub fn push(&mut self, data_set: DataSet, declared_length: Option<u32>) {
        self.items.push(SequenceItem {
            data_set,
            declared_length,
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&DataSet> {
        self.items.get(index).map(|i| &i.data_set)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut DataSet> {
        self.items.get_mut(index).map(|i| &mut i.data_set)
    }

    pub fn items(&self) -> impl Iterator<Item = &DataSet> {
        self.items.iter().map(|i| &i.data_set)
    }
}
