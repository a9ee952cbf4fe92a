//! File Meta Information group parsing.
//!
//! The file-meta group is always explicit-VR little-endian, regardless of
//! the dataset transfer syntax that follows it.

use dcm_core::{Stream, Tag};
use snafu::{OptionExt, ResultExt, Snafu};

const GROUP_LENGTH_TAG: Tag = Tag::from_value(0x0002_0000);
const INFORMATION_VERSION_TAG: Tag = Tag::from_value(0x0002_0001);
const MEDIA_STORAGE_SOP_CLASS_UID_TAG: Tag = Tag::from_value(0x0002_0002);
const MEDIA_STORAGE_SOP_INSTANCE_UID_TAG: Tag = Tag::from_value(0x0002_0003);
const TRANSFER_SYNTAX_UID_TAG: Tag = Tag::from_value(0x0002_0010);
const IMPLEMENTATION_CLASS_UID_TAG: Tag = Tag::from_value(0x0002_0012);
const IMPLEMENTATION_VERSION_NAME_TAG: Tag = Tag::from_value(0x0002_0013);
const SOURCE_APPLICATION_ENTITY_TITLE_TAG: Tag = Tag::from_value(0x0002_0016);

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("{source}"))]
    Core { source: dcm_core::Error },

    #[snafu(display("file meta group is missing mandatory element {tag}"))]
    MissingElement { tag: Tag },

    #[snafu(display("file meta group length {declared} runs past the available {available} bytes"))]
    GroupLengthOutOfRange { declared: u32, available: u64 },
}

impl From<dcm_core::Error> for Error {
    fn from(source: dcm_core::Error) -> Error {
        Error::Core { source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The subset of the File Meta Information table this reader needs to
/// resolve the dataset's transfer syntax and identify the stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetaTable {
    pub information_group_length: u32,
    pub information_version: Vec<u8>,
    pub media_storage_sop_class_uid: Option<String>,
    pub media_storage_sop_instance_uid: Option<String>,
    pub transfer_syntax_uid: String,
    pub implementation_class_uid: Option<String>,
    pub implementation_version_name: Option<String>,
    pub source_application_entity_title: Option<String>,
}

/// Reads the file-meta group from `cursor`, which must be positioned right
/// after the preamble and `DICM` magic (or at byte 0 for a headerless
/// stream that is nonetheless believed to carry a meta group).
pub fn read_file_meta(cursor: &mut Stream) -> Result<FileMetaTable> {
    let group_length_tag = cursor.get_tag(true)?;
    if group_length_tag != GROUP_LENGTH_TAG {
        return MissingElementSnafu { tag: GROUP_LENGTH_TAG }.fail();
    }
    cursor.skip(2)?; // "UL"
    let vl = cursor.get_u16(true)? as u32;
    let group_length = cursor.get_u32(true)?;
    debug_assert_eq!(vl, 4);

    let meta_end = cursor.tell() + group_length as u64;
    if meta_end > cursor.end() {
        return GroupLengthOutOfRangeSnafu {
            declared: group_length,
            available: cursor.remaining(),
        }
        .fail();
    }

    let mut information_version = Vec::new();
    let mut media_storage_sop_class_uid = None;
    let mut media_storage_sop_instance_uid = None;
    let mut transfer_syntax_uid = None;
    let mut implementation_class_uid = None;
    let mut implementation_version_name = None;
    let mut source_application_entity_title = None;

    while cursor.tell() < meta_end {
        let elem_tag = cursor.get_tag(true)?;
        let vr = cursor.try_read(2)?;
        let length = if matches!(vr.as_slice(), b"OB" | b"OW" | b"OF" | b"SQ" | b"UT" | b"UN") {
            cursor.skip(2)?;
            cursor.get_u32(true)?
        } else {
            cursor.get_u16(true)? as u32
        };
        let value = cursor.try_read(length as u64)?;

        match elem_tag {
            t if t == INFORMATION_VERSION_TAG => information_version = value.to_vec(),
            t if t == MEDIA_STORAGE_SOP_CLASS_UID_TAG => media_storage_sop_class_uid = Some(trimmed_string(&value)),
            t if t == MEDIA_STORAGE_SOP_INSTANCE_UID_TAG => media_storage_sop_instance_uid = Some(trimmed_string(&value)),
            t if t == TRANSFER_SYNTAX_UID_TAG => transfer_syntax_uid = Some(trimmed_string(&value)),
            t if t == IMPLEMENTATION_CLASS_UID_TAG => implementation_class_uid = Some(trimmed_string(&value)),
            t if t == IMPLEMENTATION_VERSION_NAME_TAG => implementation_version_name = Some(trimmed_string(&value)),
            t if t == SOURCE_APPLICATION_ENTITY_TITLE_TAG => source_application_entity_title = Some(trimmed_string(&value)),
            _ => {
                tracing::debug!(tag = %elem_tag, "ignoring unrecognized file meta element");
            }
        }
    }

    Ok(FileMetaTable {
        information_group_length: group_length,
        information_version,
        media_storage_sop_class_uid,
        media_storage_sop_instance_uid,
        transfer_syntax_uid: transfer_syntax_uid.context(MissingElementSnafu { tag: TRANSFER_SYNTAX_UID_TAG })?,
        implementation_class_uid,
        implementation_version_name,
        source_application_entity_title,
    })
}

fn trimmed_string(view: &dcm_core::ByteView) -> String {
    let bytes = view.as_slice();
    let end = bytes
        .iter()
        .rposition(|&b| b != 0x00 && b != b' ')
        .map(|i| i + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Whether `stream` starts with the Part 10 preamble and `DICM` magic.
pub fn has_preamble(stream: &Stream) -> bool {
    if stream.remaining() < 132 {
        return false;
    }
    match stream.get_span(128, 4) {
        Ok(view) => view.as_slice() == b"DICM",
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit_le_element(group: u16, element: u16, vr: &[u8; 2], value: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&group.to_le_bytes());
        bytes.extend_from_slice(&element.to_le_bytes());
        bytes.extend_from_slice(vr);
        bytes.extend_from_slice(&(value.len() as u16).to_le_bytes());
        bytes.extend_from_slice(value);
        bytes
    }

    fn sample_meta_bytes() -> Vec<u8> {
        let mut elements = Vec::new();
        elements.extend(explicit_le_element(0x0002, 0x0002, b"UI", b"1.2.840.10008.5.1.4.1.1.7\0"));
        elements.extend(explicit_le_element(0x0002, 0x0010, b"UI", b"1.2.840.10008.1.2.1\0"));
        elements.extend(explicit_le_element(0x0002, 0x0012, b"UI", b"1.2.3.4\0"));

        let mut bytes = Vec::new();
        bytes.extend(explicit_le_element(0x0002, 0x0000, b"UL", &(elements.len() as u32).to_le_bytes()));
        bytes.extend(elements);
        bytes
    }

    #[test]
    fn reads_transfer_syntax_and_optional_fields() {
        let mut cursor = Stream::from_owned(sample_meta_bytes());
        let meta = read_file_meta(&mut cursor).unwrap();

        assert_eq!(meta.transfer_syntax_uid, "1.2.840.10008.1.2.1");
        assert_eq!(meta.media_storage_sop_class_uid.as_deref(), Some("1.2.840.10008.5.1.4.1.1.7"));
        assert_eq!(meta.implementation_class_uid.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn missing_transfer_syntax_fails() {
        let mut elements = Vec::new();
        elements.extend(explicit_le_element(0x0002, 0x0002, b"UI", b"1.2.3\0"));
        let mut bytes = Vec::new();
        bytes.extend(explicit_le_element(0x0002, 0x0000, b"UL", &(elements.len() as u32).to_le_bytes()));
        bytes.extend(elements);

        let mut cursor = Stream::from_owned(bytes);
        assert!(read_file_meta(&mut cursor).is_err());
    }

    #[test]
    fn detects_preamble_and_magic() {
        let mut bytes = vec![0u8; 128];
        bytes.extend_from_slice(b"DICM");
        assert!(has_preamble(&Stream::from_owned(bytes)));
        assert!(!has_preamble(&Stream::from_owned(vec![0u8; 10])));
    }
}
