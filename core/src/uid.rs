//! Well-known UID identifiers and transfer-syntax classification.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Classification flags attached to a transfer-syntax UID.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TsFlags: u32 {
        const BIG_ENDIAN       = 1 << 0;
        const EXPLICIT_VR      = 1 << 1;
        const DEFLATED         = 1 << 2;
        const ENCAPSULATED     = 1 << 3;
        const RLE              = 1 << 4;
        const JPEG_BASELINE    = 1 << 5;
        const JPEG_LOSSLESS    = 1 << 6;
        const JPEG_LS          = 1 << 7;
        const JPEG_2000        = 1 << 8;
        const HTJ2K            = 1 << 9;
        const JPEG_XL          = 1 << 10;
        const VIDEO_MPEG2      = 1 << 11;
        const VIDEO_H264       = 1 << 12;
        const VIDEO_HEVC       = 1 << 13;
        /// Fragments of this family are terminated by an `FF D9` (EOI) marker.
        const FFD9_TERMINATED  = 1 << 14;
        /// This UID's codestream is constrained to mathematically lossless
        /// compression, as opposed to a sibling UID in the same codec family
        /// that also permits lossy encoding.
        const LOSSLESS_ONLY    = 1 << 15;
    }
}

impl TsFlags {
    #[inline]
    pub fn is_little_endian(self) -> bool {
        !self.contains(TsFlags::BIG_ENDIAN)
    }

    #[inline]
    pub fn is_jpeg_family(self) -> bool {
        self.intersects(
            TsFlags::JPEG_BASELINE
                | TsFlags::JPEG_LOSSLESS
                | TsFlags::JPEG_LS
                | TsFlags::JPEG_2000
                | TsFlags::HTJ2K
                | TsFlags::JPEG_XL,
        )
    }

    #[inline]
    pub fn is_lossless_only(self) -> bool {
        self.contains(TsFlags::LOSSLESS_ONLY)
    }

    #[inline]
    pub fn is_video(self) -> bool {
        self.intersects(TsFlags::VIDEO_MPEG2 | TsFlags::VIDEO_H264 | TsFlags::VIDEO_HEVC)
    }
}

/// The category a UID registry entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidType {
    TransferSyntax,
    SopClass,
    MetaSopClass,
    WellKnownSopInstance,
    ApplicationContextName,
    CodingScheme,
    ServiceClass,
    Other,
}

/// An entry in the UID registry.
pub trait UidEntry {
    fn value(&self) -> &str;
    fn keyword(&self) -> &str;
    fn name(&self) -> &str;
    fn uid_type(&self) -> UidType;
    /// Only meaningful for `uid_type() == TransferSyntax`.
    fn ts_flags(&self) -> TsFlags;
}

/// A read-only UID registry, implemented by `dcm-dictionary`.
pub trait UidDictionary {
    type Entry: UidEntry;

    fn by_value(&self, value: &str) -> Option<&Self::Entry>;
    fn by_keyword(&self, keyword: &str) -> Option<&Self::Entry>;
}

/// A well-known UID: either resolved against the registry, or an unknown
/// UID retaining only its raw text and no classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Uid {
    Known(String),
    Unknown(String),
}

impl Uid {
    /// Looks up `text` first as a keyword, then as a raw UID value.
    pub fn lookup<D: UidDictionary>(dict: &D, text: &str) -> Uid {
        let trimmed = trim_uid(text);
        if let Some(entry) = dict.by_keyword(trimmed).or_else(|| dict.by_value(trimmed)) {
            Uid::Known(entry.value().to_owned())
        } else {
            Uid::Unknown(trimmed.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Uid::Known(s) | Uid::Unknown(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Uid::Known(_))
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trims trailing NUL/space padding from a UID string, the way file-meta and
/// attribute values commonly carry it on the wire. Grounded on
/// `examples/original_source/src/uid_utils.cpp`'s `trim_uid` helper.
pub fn trim_uid(text: &str) -> &str {
    text.trim_end_matches(['\0', ' '])
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeEntry {
        value: &'static str,
        keyword: &'static str,
        flags: TsFlags,
    }

    impl UidEntry for FakeEntry {
        fn value(&self) -> &str {
            self.value
        }
        fn keyword(&self) -> &str {
            self.keyword
        }
        fn name(&self) -> &str {
            self.keyword
        }
        fn uid_type(&self) -> UidType {
            UidType::TransferSyntax
        }
        fn ts_flags(&self) -> TsFlags {
            self.flags
        }
    }

    struct FakeDict(Vec<FakeEntry>);

    impl UidDictionary for FakeDict {
        type Entry = FakeEntry;

        fn by_value(&self, value: &str) -> Option<&FakeEntry> {
            self.0.iter().find(|e| e.value == value)
        }

        fn by_keyword(&self, keyword: &str) -> Option<&FakeEntry> {
            self.0.iter().find(|e| e.keyword == keyword)
        }
    }

    #[test]
    fn lookup_by_value_and_keyword_agree() {
        let dict = FakeDict(vec![FakeEntry {
            value: "1.2.840.10008.1.2.1",
            keyword: "ExplicitVRLittleEndian",
            flags: TsFlags::EXPLICIT_VR,
        }]);

        let by_val = Uid::lookup(&dict, "1.2.840.10008.1.2.1\0");
        let by_kw = Uid::lookup(&dict, "ExplicitVRLittleEndian");
        assert_eq!(by_val, by_kw);
        assert!(by_val.is_known());
        assert_eq!(by_val.as_str(), "1.2.840.10008.1.2.1");
    }

    #[test]
    fn unknown_uid_keeps_raw_text() {
        let dict = FakeDict(vec![]);
        let uid = Uid::lookup(&dict, "1.2.3.4.5 ");
        assert!(!uid.is_known());
        assert_eq!(uid.as_str(), "1.2.3.4.5");
    }
}
