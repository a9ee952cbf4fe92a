//! The transfer syntax registry: a thin, queryable wrapper
//! around `dcm-dictionary`'s UID table, plus byte-order decoder selection.

use byteordered::Endianness;
use dcm_core::uid::UidDictionary;
use dcm_core::TsFlags;
use dcm_dictionary::uids::UidEntry;
use dcm_dictionary::StandardUidDictionary;
use dcm_encoding::BasicDecoder;

/// A resolved transfer syntax: its UID, name and classification flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSyntax {
    entry: &'static UidEntry,
}

impl TransferSyntax {
    pub fn uid(&self) -> &'static str {
        self.entry.value
    }

    pub fn name(&self) -> &'static str {
        self.entry.name
    }

    pub fn flags(&self) -> TsFlags {
        self.entry.ts_flags
    }

    pub fn is_little_endian(&self) -> bool {
        self.flags().is_little_endian()
    }

    pub fn is_explicit_vr(&self) -> bool {
        self.flags().contains(TsFlags::EXPLICIT_VR)
    }

    pub fn is_deflated(&self) -> bool {
        self.flags().contains(TsFlags::DEFLATED)
    }

    pub fn is_encapsulated(&self) -> bool {
        self.flags().contains(TsFlags::ENCAPSULATED)
    }

    pub fn endianness(&self) -> Endianness {
        if self.is_little_endian() {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    pub fn basic_decoder(&self) -> BasicDecoder {
        BasicDecoder::new(self.endianness())
    }
}

/// Looks up a transfer syntax by UID, tolerating trailing NUL/space padding
/// the way file-meta and attribute values commonly carry it on the wire.
pub fn lookup(uid: &str) -> Option<TransferSyntax> {
    let trimmed = dcm_core::uid::trim_uid(uid);
    StandardUidDictionary
        .by_value(trimmed)
        .filter(|e| e.uid_type == dcm_core::UidType::TransferSyntax)
        .map(|entry| TransferSyntax { entry })
}

/// The four transfer syntaxes a decoder must always recognize during
/// headerless-detection probing (Implicit VR LE is tried last among the
/// four, and is also the fallback default).
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";
pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_implicit_vr_little_endian() {
        let ts = lookup(IMPLICIT_VR_LITTLE_ENDIAN).unwrap();
        assert!(!ts.is_explicit_vr());
        assert!(ts.is_little_endian());
        assert!(!ts.is_encapsulated());
    }

    #[test]
    fn looks_up_explicit_vr_big_endian() {
        let ts = lookup(EXPLICIT_VR_BIG_ENDIAN).unwrap();
        assert!(ts.is_explicit_vr());
        assert!(!ts.is_little_endian());
        assert_eq!(ts.endianness(), Endianness::Big);
    }

    #[test]
    fn tolerates_trailing_padding() {
        assert!(lookup("1.2.840.10008.1.2.1\0").is_some());
        assert!(lookup("1.2.840.10008.1.2.1 ").is_some());
    }

    #[test]
    fn unknown_uid_misses() {
        assert!(lookup("9.9.9.9").is_none());
    }

    #[test]
    fn rle_lossless_is_encapsulated_and_little_endian() {
        let ts = lookup("1.2.840.10008.1.2.5").unwrap();
        assert!(ts.is_encapsulated());
        assert!(ts.is_little_endian());
    }
}
