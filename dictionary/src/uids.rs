//! Transfer-syntax, SOP class and well-known UID registry, generated the
//! same way as [`crate::tags`]: a `phf` perfect-hash map keyed on both the
//! dotted UID value and its keyword.

use dcm_core::{TsFlags, UidType};

/// One UID registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UidEntry {
    pub value: &'static str,
    pub keyword: &'static str,
    pub name: &'static str,
    pub uid_type: UidType,
    pub ts_flags: TsFlags,
}

impl dcm_core::uid::UidEntry for UidEntry {
    fn value(&self) -> &str {
        self.value
    }
    fn keyword(&self) -> &str {
        self.keyword
    }
    fn name(&self) -> &str {
        self.name
    }
    fn uid_type(&self) -> UidType {
        self.uid_type
    }
    fn ts_flags(&self) -> TsFlags {
        self.ts_flags
    }
}

macro_rules! uids {
    ($(($value:literal, $keyword:literal, $name:literal, $uty:expr, $flags:expr)),* $(,)?) => {
        pub static VALUE_MAP: phf::Map<&'static str, UidEntry> = phf::phf_map! {
            $( $value => UidEntry { value: $value, keyword: $keyword, name: $name, uid_type: $uty, ts_flags: $flags } ),*
        };

        pub static KEYWORD_MAP: phf::Map<&'static str, UidEntry> = phf::phf_map! {
            $( $keyword => UidEntry { value: $value, keyword: $keyword, name: $name, uid_type: $uty, ts_flags: $flags } ),*
        };
    };
}

const NONE: TsFlags = TsFlags::empty();

uids! {
    // Uncompressed / native pixel data transfer syntaxes
    ("1.2.840.10008.1.2", "ImplicitVRLittleEndian", "Implicit VR Little Endian",
        UidType::TransferSyntax, NONE),
    ("1.2.840.10008.1.2.1", "ExplicitVRLittleEndian", "Explicit VR Little Endian",
        UidType::TransferSyntax, TsFlags::EXPLICIT_VR),
    ("1.2.840.10008.1.2.1.99", "DeflatedExplicitVRLittleEndian", "Deflated Explicit VR Little Endian",
        UidType::TransferSyntax, TsFlags::from_bits_truncate(TsFlags::EXPLICIT_VR.bits() | TsFlags::DEFLATED.bits())),
    ("1.2.840.10008.1.2.2", "ExplicitVRBigEndian", "Explicit VR Big Endian",
        UidType::TransferSyntax, TsFlags::from_bits_truncate(TsFlags::EXPLICIT_VR.bits() | TsFlags::BIG_ENDIAN.bits())),

    // JPEG baseline / extended / lossless (encapsulated, explicit VR LE)
    ("1.2.840.10008.1.2.4.50", "JPEGBaseline8Bit", "JPEG Baseline (Process 1)",
        UidType::TransferSyntax, enc_flags(TsFlags::JPEG_BASELINE)),
    ("1.2.840.10008.1.2.4.51", "JPEGExtended12Bit", "JPEG Extended (Process 2 & 4)",
        UidType::TransferSyntax, enc_flags(TsFlags::JPEG_BASELINE)),
    ("1.2.840.10008.1.2.4.57", "JPEGLossless", "JPEG Lossless, Non-Hierarchical (Process 14)",
        UidType::TransferSyntax, enc_flags_lossless(TsFlags::JPEG_LOSSLESS)),
    ("1.2.840.10008.1.2.4.70", "JPEGLosslessSV1", "JPEG Lossless, Non-Hierarchical, First-Order Prediction",
        UidType::TransferSyntax, enc_flags_lossless(TsFlags::JPEG_LOSSLESS)),

    // JPEG-LS
    ("1.2.840.10008.1.2.4.80", "JPEGLSLossless", "JPEG-LS Lossless Image Compression",
        UidType::TransferSyntax, enc_flags_lossless(TsFlags::JPEG_LS)),
    ("1.2.840.10008.1.2.4.81", "JPEGLSNearLossless", "JPEG-LS Lossy (Near-Lossless) Image Compression",
        UidType::TransferSyntax, enc_flags(TsFlags::JPEG_LS)),

    // JPEG 2000
    ("1.2.840.10008.1.2.4.90", "JPEG2000Lossless", "JPEG 2000 Image Compression (Lossless Only)",
        UidType::TransferSyntax, enc_flags_lossless(TsFlags::JPEG_2000)),
    ("1.2.840.10008.1.2.4.91", "JPEG2000", "JPEG 2000 Image Compression",
        UidType::TransferSyntax, enc_flags(TsFlags::JPEG_2000)),
    ("1.2.840.10008.1.2.4.92", "JPEG2000MCLossless", "JPEG 2000 Part 2 Multi-component Image Compression (Lossless Only)",
        UidType::TransferSyntax, enc_flags_lossless(TsFlags::JPEG_2000)),
    ("1.2.840.10008.1.2.4.93", "JPEG2000MC", "JPEG 2000 Part 2 Multi-component Image Compression",
        UidType::TransferSyntax, enc_flags(TsFlags::JPEG_2000)),

    // High-Throughput JPEG 2000
    ("1.2.840.10008.1.2.4.201", "HTJ2KLossless", "High-Throughput JPEG 2000 Image Compression (Lossless Only)",
        UidType::TransferSyntax, enc_flags_lossless(TsFlags::HTJ2K)),
    ("1.2.840.10008.1.2.4.202", "HTJ2KLosslessRPCL", "High-Throughput JPEG 2000 with RPCL Options (Lossless Only)",
        UidType::TransferSyntax, enc_flags_lossless(TsFlags::HTJ2K)),
    ("1.2.840.10008.1.2.4.203", "HTJ2K", "High-Throughput JPEG 2000 Image Compression",
        UidType::TransferSyntax, enc_flags(TsFlags::HTJ2K)),

    // JPEG XL
    ("1.2.840.10008.1.2.4.215", "JPEGXLLossless", "JPEG XL Lossless",
        UidType::TransferSyntax, enc_flags_lossless(TsFlags::JPEG_XL)),
    ("1.2.840.10008.1.2.4.216", "JPEGXL", "JPEG XL",
        UidType::TransferSyntax, enc_flags(TsFlags::JPEG_XL)),
    ("1.2.840.10008.1.2.4.217", "JPEGXLJPEGRecompression", "JPEG XL (JPEG Recompression)",
        UidType::TransferSyntax, enc_flags(TsFlags::JPEG_XL)),

    // RLE
    ("1.2.840.10008.1.2.5", "RLELossless", "RLE Lossless",
        UidType::TransferSyntax, enc_flags(TsFlags::RLE)),

    // Video
    ("1.2.840.10008.1.2.4.100", "MPEG2MPML", "MPEG2 Main Profile / Main Level",
        UidType::TransferSyntax, enc_flags(TsFlags::VIDEO_MPEG2)),
    ("1.2.840.10008.1.2.4.102", "MPEG4HP41", "MPEG-4 AVC/H.264 High Profile / Level 4.1",
        UidType::TransferSyntax, enc_flags(TsFlags::VIDEO_H264)),
    ("1.2.840.10008.1.2.4.103", "MPEG4HP41BD", "MPEG-4 AVC/H.264 BD-Compatible High Profile",
        UidType::TransferSyntax, enc_flags(TsFlags::VIDEO_H264)),
    ("1.2.840.10008.1.2.4.107", "HEVCMP51", "HEVC/H.265 Main Profile / Level 5.1",
        UidType::TransferSyntax, enc_flags(TsFlags::VIDEO_HEVC)),

    // SOP classes commonly carried in MediaStorageSOPClassUID
    ("1.2.840.10008.5.1.4.1.1.7", "SecondaryCaptureImageStorage", "Secondary Capture Image Storage",
        UidType::SopClass, NONE),
    ("1.2.840.10008.5.1.4.1.1.2", "CTImageStorage", "CT Image Storage",
        UidType::SopClass, NONE),
    ("1.2.840.10008.5.1.4.1.1.4", "MRImageStorage", "MR Image Storage",
        UidType::SopClass, NONE),
    ("1.2.840.10008.5.1.4.1.1.6.1", "UltrasoundImageStorage", "Ultrasound Image Storage",
        UidType::SopClass, NONE),
    ("1.2.840.10008.5.1.4.1.1.1", "ComputedRadiographyImageStorage", "Computed Radiography Image Storage",
        UidType::SopClass, NONE),

    // Well-known SOP instances
    ("1.2.840.10008.1.1", "VerificationSOPClass", "Verification SOP Class",
        UidType::SopClass, NONE),
}

/// JPEG-family codecs whose fragments end on an `FF D9` EOI marker rather
/// than a BOT-derived length.
const FFD9_FAMILY: u32 = TsFlags::JPEG_BASELINE.bits()
    | TsFlags::JPEG_LOSSLESS.bits()
    | TsFlags::JPEG_LS.bits()
    | TsFlags::JPEG_2000.bits()
    | TsFlags::HTJ2K.bits();

const fn enc_flags(codec: TsFlags) -> TsFlags {
    let mut bits = TsFlags::EXPLICIT_VR.bits() | TsFlags::ENCAPSULATED.bits() | codec.bits();
    if codec.bits() & FFD9_FAMILY != 0 {
        bits |= TsFlags::FFD9_TERMINATED.bits();
    }
    TsFlags::from_bits_truncate(bits)
}

/// Like [`enc_flags`], for the sibling UID in a codec family that is
/// constrained to a lossless codestream (e.g. JPEG 2000 Lossless vs. JPEG
/// 2000, JPEG-LS Lossless vs. JPEG-LS Near-Lossless).
const fn enc_flags_lossless(codec: TsFlags) -> TsFlags {
    TsFlags::from_bits_truncate(enc_flags(codec).bits() | TsFlags::LOSSLESS_ONLY.bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_vr_le_has_no_flags() {
        let e = VALUE_MAP.get("1.2.840.10008.1.2").unwrap();
        assert_eq!(e.ts_flags, TsFlags::empty());
    }

    #[test]
    fn explicit_vr_be_is_big_endian_and_explicit() {
        let e = VALUE_MAP.get("1.2.840.10008.1.2.2").unwrap();
        assert!(e.ts_flags.contains(TsFlags::BIG_ENDIAN));
        assert!(e.ts_flags.contains(TsFlags::EXPLICIT_VR));
    }

    #[test]
    fn rle_lossless_is_encapsulated() {
        let e = VALUE_MAP.get("1.2.840.10008.1.2.5").unwrap();
        assert!(e.ts_flags.contains(TsFlags::ENCAPSULATED));
        assert!(e.ts_flags.contains(TsFlags::RLE));
    }

    #[test]
    fn value_and_keyword_maps_agree() {
        let by_value = VALUE_MAP.get("1.2.840.10008.1.2.4.90").unwrap();
        let by_keyword = KEYWORD_MAP.get("JPEG2000Lossless").unwrap();
        assert_eq!(by_value, by_keyword);
    }

    #[test]
    fn jpeg2000_lossless_sibling_uids_are_distinguished() {
        let lossless = VALUE_MAP.get("1.2.840.10008.1.2.4.90").unwrap();
        let lossy = VALUE_MAP.get("1.2.840.10008.1.2.4.91").unwrap();
        assert!(lossless.ts_flags.contains(TsFlags::LOSSLESS_ONLY));
        assert!(!lossy.ts_flags.contains(TsFlags::LOSSLESS_ONLY));
        assert!(lossless.ts_flags.contains(TsFlags::JPEG_2000));
        assert!(lossy.ts_flags.contains(TsFlags::JPEG_2000));
    }

    #[test]
    fn jpegls_lossless_sibling_uids_are_distinguished() {
        let lossless = VALUE_MAP.get("1.2.840.10008.1.2.4.80").unwrap();
        let near_lossless = VALUE_MAP.get("1.2.840.10008.1.2.4.81").unwrap();
        assert!(lossless.ts_flags.contains(TsFlags::LOSSLESS_ONLY));
        assert!(!near_lossless.ts_flags.contains(TsFlags::LOSSLESS_ONLY));
    }
}
