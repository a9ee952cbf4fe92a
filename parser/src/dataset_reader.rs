//! The stateful element walker: reads elements
//! from a [`DataSet`]'s backing stream, lazily resuming from
//! `last_tag_loaded` on demand, and eagerly materializes sequences.

use dcm_core::dataelement::{DataElement, Storage};
use dcm_core::dictionary::DataDictionary;
use dcm_core::sequence::Sequence;
use dcm_core::vr::VrClass;
use dcm_core::{tag, DataSet, Stream, Tag, TsFlags, Vr};

use crate::error::{Result, UndefinedLengthNotAllowedSnafu};
use crate::header::{read_element_header, ElementHeader, UNDEFINED_LENGTH};
use crate::pixel_sequence::reconstruct_pixel_sequence;

/// Fully parses `dataset` from its current stream position to the end of
/// its scope. Used for sequence items and pixel data scopes, which are
/// always eagerly materialized.
pub fn parse_dataset<D: DataDictionary>(dataset: &mut DataSet, dict: &D, ts_flags: TsFlags) -> Result<()> {
    read_elements(dataset, dict, ts_flags, None, None)
}

/// Resumes parsing `dataset` from `last_tag_loaded` until `target` (or the
/// dataset's end) has been reached. A no-op if `target` is already covered.
pub fn ensure_loaded<D: DataDictionary>(
    dataset: &mut DataSet,
    dict: &D,
    ts_flags: TsFlags,
    target: Tag,
) -> Result<()> {
    if dataset.contains(target) || dataset.last_tag_loaded() >= target {
        return Ok(());
    }
    read_elements(dataset, dict, ts_flags, Some(target), None)
}

/// The shared element loop. `stop_tag` ends the loop once an element at or
/// past that tag has been inserted (lazy resumption). `extra_delimiter`
/// additionally ends the loop, without inserting anything, when that exact
/// tag is read as a header (used for undefined-length sequence items,
/// which are closed by an item delimiter rather than a scope length).
fn read_elements<D: DataDictionary>(
    dataset: &mut DataSet,
    dict: &D,
    ts_flags: TsFlags,
    stop_tag: Option<Tag>,
    extra_delimiter: Option<Tag>,
) -> Result<()> {
    let mut cursor = dataset.stream().clone();
    let little_endian = dataset.is_little_endian();
    let explicit_vr = dataset.is_explicit_vr();

    loop {
        if cursor.is_at_end() {
            break;
        }

        let header = read_element_header(&mut cursor, dict, little_endian, explicit_vr)?;

        if header.tag == tag::SEQUENCE_DELIMITATION {
            break;
        }
        if Some(header.tag) == extra_delimiter {
            break;
        }
        if header.tag == tag::ITEM_DELIMITATION {
            // Stray delimiter outside of an undefined-length item scope;
            // tolerate it as an end-of-scope signal rather than erroring.
            break;
        }

        let value_offset = cursor.tell();
        let element = build_element(&mut cursor, dict, &header, value_offset, little_endian, explicit_vr, ts_flags)?;
        let inserted_tag = header.tag;
        dataset.insert(element);

        if let Some(stop) = stop_tag {
            if inserted_tag >= stop {
                break;
            }
        }
    }

    dataset.set_stream(cursor);
    Ok(())
}

fn build_element<D: DataDictionary>(
    cursor: &mut Stream,
    dict: &D,
    header: &ElementHeader,
    value_offset: u64,
    little_endian: bool,
    explicit_vr: bool,
    ts_flags: TsFlags,
) -> Result<DataElement> {
    if header.vr.classification() == VrClass::Sequence {
        let seq = parse_sequence(cursor, dict, little_endian, explicit_vr, header.length, ts_flags)?;
        return Ok(DataElement::new(
            header.tag,
            header.vr,
            header.length,
            value_offset,
            Storage::Sequence(Box::new(seq)),
        ));
    }

    if header.length == UNDEFINED_LENGTH {
        if !matches!(header.vr, Vr::OB | Vr::OW | Vr::UN) && header.vr.is_known() {
            return UndefinedLengthNotAllowedSnafu {
                tag: header.tag,
                vr: format!("{}", header.vr),
            }
            .fail();
        }
        let pixels = reconstruct_pixel_sequence(cursor, little_endian, ts_flags)?;
        return Ok(DataElement::new(
            header.tag,
            Vr::PX,
            header.length,
            value_offset,
            Storage::Pixels(Box::new(pixels)),
        ));
    }

    let view = cursor.try_read(header.length as u64)?;
    Ok(DataElement::new(header.tag, header.vr, header.length, value_offset, Storage::View(view)))
}

/// Parses an SQ element's items.
fn parse_sequence<D: DataDictionary>(
    cursor: &mut Stream,
    dict: &D,
    little_endian: bool,
    explicit_vr: bool,
    length: u32,
    ts_flags: TsFlags,
) -> Result<Sequence> {
    let mut seq = Sequence::new();
    let scope_end = (length != UNDEFINED_LENGTH).then(|| cursor.tell() + length as u64);

    loop {
        match scope_end {
            Some(end) if cursor.tell() >= end => break,
            None if cursor.is_at_end() => break,
            _ => {}
        }

        let item_tag = cursor.get_tag(little_endian)?;
        let item_len = cursor.get_u32(little_endian)?;

        if item_tag == tag::SEQUENCE_DELIMITATION {
            break;
        }
        if item_tag != tag::ITEM {
            tracing::warn!(tag = %item_tag, "invalid item tag in sequence, stopping sequence parse");
            break;
        }

        if item_len == UNDEFINED_LENGTH {
            let mut item_dataset = DataSet::new(cursor.sub_stream(cursor.remaining()), little_endian, explicit_vr);
            read_elements(&mut item_dataset, dict, ts_flags, None, Some(tag::ITEM_DELIMITATION))?;
            *cursor = item_dataset.stream().clone();
            seq.push(item_dataset, None);
        } else {
            let mut item_dataset = DataSet::new(cursor.sub_stream(item_len as u64), little_endian, explicit_vr);
            parse_dataset(&mut item_dataset, dict, ts_flags)?;
            cursor.skip(item_len as u64)?;
            seq.push(item_dataset, Some(item_len));
        }
    }

    Ok(seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcm_dictionary::StandardDataDictionary;

    fn explicit_le_element(group: u16, element: u16, vr: &[u8; 2], value: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&group.to_le_bytes());
        bytes.extend_from_slice(&element.to_le_bytes());
        bytes.extend_from_slice(vr);
        bytes.extend_from_slice(&(value.len() as u16).to_le_bytes());
        bytes.extend_from_slice(value);
        bytes
    }

    #[test]
    fn parses_two_leaf_elements_in_order() {
        let mut bytes = Vec::new();
        bytes.extend(explicit_le_element(0x0008, 0x0060, b"CS", b"CT"));
        bytes.extend(explicit_le_element(0x0010, 0x0010, b"PN", b"DOE^JOHN"));

        let mut dataset = DataSet::new(Stream::from_owned(bytes), true, true);
        parse_dataset(&mut dataset, &StandardDataDictionary, TsFlags::empty()).unwrap();

        assert_eq!(dataset.len(), 2);
        let modality = dataset.get(Tag::from((0x0008, 0x0060)));
        assert_eq!(modality.to_string_view().unwrap(), "CT");
    }

    #[test]
    fn lazy_ensure_loaded_resumes_from_saved_cursor() {
        let mut bytes = Vec::new();
        bytes.extend(explicit_le_element(0x0008, 0x0060, b"CS", b"CT"));
        bytes.extend(explicit_le_element(0x0010, 0x0010, b"PN", b"DOE^JOHN"));
        bytes.extend(explicit_le_element(0x0020, 0x000D, b"UI", b"1.2.3\0"));

        let mut dataset = DataSet::new(Stream::from_owned(bytes), true, true);
        ensure_loaded(&mut dataset, &StandardDataDictionary, TsFlags::empty(), Tag::from((0x0010, 0x0010))).unwrap();

        assert!(dataset.contains(Tag::from((0x0008, 0x0060))));
        assert!(dataset.contains(Tag::from((0x0010, 0x0010))));
        assert!(!dataset.contains(Tag::from((0x0020, 0x000D))));

        ensure_loaded(&mut dataset, &StandardDataDictionary, TsFlags::empty(), Tag::from((0x0020, 0x000D))).unwrap();
        assert!(dataset.contains(Tag::from((0x0020, 0x000D))));
    }

    #[test]
    fn parses_defined_length_sequence_with_one_item() {
        let mut item_bytes = Vec::new();
        item_bytes.extend(explicit_le_element(0x0008, 0x0060, b"CS", b"CT"));

        let mut item = Vec::new();
        item.extend_from_slice(&0xFFFEu16.to_le_bytes());
        item.extend_from_slice(&0xE000u16.to_le_bytes());
        item.extend_from_slice(&(item_bytes.len() as u32).to_le_bytes());
        item.extend_from_slice(&item_bytes);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0008u16.to_le_bytes());
        bytes.extend_from_slice(&0x1111u16.to_le_bytes());
        bytes.extend_from_slice(b"SQ");
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&(item.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&item);

        let mut dataset = DataSet::new(Stream::from_owned(bytes), true, true);
        parse_dataset(&mut dataset, &StandardDataDictionary, TsFlags::empty()).unwrap();

        let seq_element = dataset.get(Tag::from((0x0008, 0x1111)));
        let seq = seq_element.sequence().unwrap();
        assert_eq!(seq.len(), 1);
        let item_ds = seq.item(0).unwrap();
        assert_eq!(item_ds.get(Tag::from((0x0008, 0x0060))).to_string_view().unwrap(), "CT");
    }
}
