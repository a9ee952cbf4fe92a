//! Headerless transfer-syntax detection: used when a stream
//! lacks the 128-byte preamble and `DICM` magic, so the VR mode and
//! endianness have to be inferred from the first element instead of read
//! from a file-meta group.

use dcm_core::dictionary::DataDictionary;
use dcm_core::Stream;

use crate::error::{HeaderlessDetectionFailedSnafu, Result};
use crate::header::read_element_header;

/// One of the four transfer syntaxes every decoder must recognize, as
/// plain VR-mode/endianness flags rather than a UID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderlessSyntax {
    ExplicitLittleEndian,
    ExplicitBigEndian,
    ImplicitLittleEndian,
    ImplicitBigEndian,
}

impl HeaderlessSyntax {
    pub fn little_endian(self) -> bool {
        matches!(self, HeaderlessSyntax::ExplicitLittleEndian | HeaderlessSyntax::ImplicitLittleEndian)
    }

    pub fn explicit_vr(self) -> bool {
        matches!(self, HeaderlessSyntax::ExplicitLittleEndian | HeaderlessSyntax::ExplicitBigEndian)
    }
}

/// The probing order: explicit-VR little endian is tried first and wins
/// ties, since it is by far the most common transfer syntax in the wild.
const PROBE_ORDER: [HeaderlessSyntax; 4] = [
    HeaderlessSyntax::ExplicitLittleEndian,
    HeaderlessSyntax::ExplicitBigEndian,
    HeaderlessSyntax::ImplicitLittleEndian,
    HeaderlessSyntax::ImplicitBigEndian,
];

/// Probes all four modes against the first element of `stream` and returns
/// the most plausible one.
pub fn detect_headerless_syntax<D: DataDictionary>(stream: &Stream, dict: &D) -> Result<HeaderlessSyntax> {
    let mut best: Option<(HeaderlessSyntax, i32)> = None;

    for &candidate in &PROBE_ORDER {
        let score = score_candidate(stream, dict, candidate);
        if best.map(|(_, best_score)| score > best_score).unwrap_or(true) {
            best = Some((candidate, score));
        }
    }

    match best {
        Some((syntax, score)) if score > 0 => Ok(syntax),
        _ => HeaderlessDetectionFailedSnafu.fail(),
    }
}

fn score_candidate<D: DataDictionary>(stream: &Stream, dict: &D, candidate: HeaderlessSyntax) -> i32 {
    let mut cursor = stream.clone();
    let header = match read_element_header(&mut cursor, dict, candidate.little_endian(), candidate.explicit_vr()) {
        Ok(h) => h,
        Err(_) => return -1,
    };

    let mut score = 0;
    if (header.length as u64) <= cursor.remaining() {
        score += 1;
    }
    if header.tag.group() != 0 && header.tag.group() != 0xFFFF {
        score += 1;
    }

    if candidate.explicit_vr() {
        if header.vr.is_known() {
            score += 2;
        } else {
            score -= 2;
        }
    } else if dict.by_tag(header.tag).is_some() {
        score += 1;
    }

    score
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
    fn detects_explicit_vr_little_endian() {
        let bytes = explicit_le_element(0x0008, 0x0060, b"CS", b"CT");
        let stream = Stream::from_owned(bytes);
        let syntax = detect_headerless_syntax(&stream, &StandardDataDictionary).unwrap();
        assert_eq!(syntax, HeaderlessSyntax::ExplicitLittleEndian);
    }

    #[test]
    fn detects_implicit_vr_little_endian_via_dictionary_hit() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0008u16.to_le_bytes());
        bytes.extend_from_slice(&0x0060u16.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(b"CT");

        let stream = Stream::from_owned(bytes);
        let syntax = detect_headerless_syntax(&stream, &StandardDataDictionary).unwrap();
        assert_eq!(syntax, HeaderlessSyntax::ImplicitLittleEndian);
    }

    #[test]
    fn fails_on_implausible_stream() {
        let stream = Stream::from_owned(vec![0xFF; 3]);
        assert!(detect_headerless_syntax(&stream, &StandardDataDictionary).is_err());
    }
}
