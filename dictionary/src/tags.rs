//! The standard attribute dictionary: a compile-time perfect-hash lookup
//! from keyword or tag to its VR, generated by the `phf` crate's build-time
//! macro, using its compile-time perfect hashing rather than a hand-rolled
//! splitmix/displacement table — see `DESIGN.md`.

use dcm_core::{Tag, Vr};

/// One dictionary entry: a standard attribute's tag, keyword and typical VR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictEntry {
    pub tag: u32,
    pub keyword: &'static str,
    pub vr: Vr,
}

impl DictEntry {
    pub fn tag(&self) -> Tag {
        Tag::from_value(self.tag)
    }
}

impl dcm_core::dictionary::DictionaryEntry for DictEntry {
    fn tag(&self) -> Tag {
        DictEntry::tag(self)
    }
    fn keyword(&self) -> &str {
        self.keyword
    }
    fn vr(&self) -> Vr {
        self.vr
    }
}

macro_rules! entries {
    ($(($tag:expr, $keyword:literal, $vr:ident)),* $(,)?) => {
        pub static ENTRIES: &[DictEntry] = &[
            $( DictEntry { tag: $tag, keyword: $keyword, vr: Vr::$vr } ),*
        ];

        pub static TAG_MAP: phf::Map<u32, DictEntry> = phf::phf_map! {
            $( $tag => DictEntry { tag: $tag, keyword: $keyword, vr: Vr::$vr } ),*
        };

        pub static KEYWORD_MAP: phf::Map<&'static str, DictEntry> = phf::phf_map! {
            $( $keyword => DictEntry { tag: $tag, keyword: $keyword, vr: Vr::$vr } ),*
        };
    };
}

entries! {
    // File meta group (always explicit VR little endian)
    (0x0002_0000u32, "FileMetaInformationGroupLength", UL),
    (0x0002_0001u32, "FileMetaInformationVersion", OB),
    (0x0002_0002u32, "MediaStorageSOPClassUID", UI),
    (0x0002_0003u32, "MediaStorageSOPInstanceUID", UI),
    (0x0002_0010u32, "TransferSyntaxUID", UI),
    (0x0002_0012u32, "ImplementationClassUID", UI),
    (0x0002_0013u32, "ImplementationVersionName", SH),
    (0x0002_0016u32, "SourceApplicationEntityTitle", AE),

    // Command group (DIMSE, accepted by the parser though out of scope
    // for the decode pipeline itself)
    (0x0000_0000u32, "CommandGroupLength", UL),
    (0x0000_0900u32, "Status", US),

    // Identification / SOP common
    (0x0008_0016u32, "SOPClassUID", UI),
    (0x0008_0018u32, "SOPInstanceUID", UI),
    (0x0008_0020u32, "StudyDate", DA),
    (0x0008_0021u32, "SeriesDate", DA),
    (0x0008_0023u32, "ContentDate", DA),
    (0x0008_0030u32, "StudyTime", TM),
    (0x0008_0031u32, "SeriesTime", TM),
    (0x0008_0050u32, "AccessionNumber", SH),
    (0x0008_0060u32, "Modality", CS),
    (0x0008_0070u32, "Manufacturer", LO),
    (0x0008_0090u32, "ReferringPhysicianName", PN),
    (0x0008_1030u32, "StudyDescription", LO),
    (0x0008_103Eu32, "SeriesDescription", LO),
    (0x0008_1090u32, "ManufacturerModelName", LO),
    (0x0008_1111u32, "ReferencedPerformedProcedureStepSequence", SQ),
    (0x0008_1140u32, "ReferencedImageSequence", SQ),

    // Patient
    (0x0010_0010u32, "PatientName", PN),
    (0x0010_0020u32, "PatientID", LO),
    (0x0010_0021u32, "IssuerOfPatientID", LO),
    (0x0010_0030u32, "PatientBirthDate", DA),
    (0x0010_0040u32, "PatientSex", CS),
    (0x0010_1010u32, "PatientAge", AS),
    (0x0010_1030u32, "PatientWeight", DS),
    (0x0010_21C0u32, "PregnancyStatus", US),

    // Acquisition / equipment
    (0x0018_0050u32, "SliceThickness", DS),
    (0x0018_0060u32, "KVP", DS),
    (0x0018_1000u32, "DeviceSerialNumber", LO),
    (0x0018_1020u32, "SoftwareVersions", LO),
    (0x0018_1151u32, "XRayTubeCurrent", IS),
    (0x0018_1160u32, "FilterType", SH),

    // Relationship / series-study identifiers
    (0x0020_000Du32, "StudyInstanceUID", UI),
    (0x0020_000Eu32, "SeriesInstanceUID", UI),
    (0x0020_0010u32, "StudyID", SH),
    (0x0020_0011u32, "SeriesNumber", IS),
    (0x0020_0013u32, "InstanceNumber", IS),
    (0x0020_0032u32, "ImagePositionPatient", DS),
    (0x0020_0037u32, "ImageOrientationPatient", DS),
    (0x0020_0052u32, "FrameOfReferenceUID", UI),
    (0x0020_1041u32, "SliceLocation", DS),

    // Image pixel module
    (0x0028_0002u32, "SamplesPerPixel", US),
    (0x0028_0004u32, "PhotometricInterpretation", CS),
    (0x0028_0006u32, "PlanarConfiguration", US),
    (0x0028_0008u32, "NumberOfFrames", IS),
    (0x0028_0010u32, "Rows", US),
    (0x0028_0011u32, "Columns", US),
    (0x0028_0030u32, "PixelSpacing", DS),
    (0x0028_0100u32, "BitsAllocated", US),
    (0x0028_0101u32, "BitsStored", US),
    (0x0028_0102u32, "HighBit", US),
    (0x0028_0103u32, "PixelRepresentation", US),
    (0x0028_0106u32, "SmallestImagePixelValue", US),
    (0x0028_0107u32, "LargestImagePixelValue", US),
    (0x0028_1050u32, "WindowCenter", DS),
    (0x0028_1051u32, "WindowWidth", DS),
    (0x0028_1052u32, "RescaleIntercept", DS),
    (0x0028_1053u32, "RescaleSlope", DS),
    (0x0028_1054u32, "RescaleType", LO),
    (0x0028_3000u32, "ModalityLUTSequence", SQ),
    (0x0028_3002u32, "LUTDescriptor", US),
    (0x0028_3003u32, "LUTExplanation", LO),
    (0x0028_3006u32, "LUTData", OW),

    // SOP common
    (0x0008_0008u32, "ImageType", CS),
    (0x0008_0005u32, "SpecificCharacterSet", CS),

    // Pixel data itself
    (0x7FE0_0008u32, "FloatPixelData", OF),
    (0x7FE0_0009u32, "DoubleFloatPixelData", OD),
    (0x7FE0_0010u32, "PixelData", OW),

    // Concept/content (used by attribute-selector style lookups, e.g. SR)
    (0x0040_A168u32, "ConceptCodeSequence", SQ),
    (0x0040_A730u32, "ContentSequence", SQ),
    (0x0008_0100u32, "CodeValue", SH),
}

/// A `60xx`-style repeating group entry: the group's high byte is fixed,
/// its low byte varies across overlay/curve planes. Kept to a handful of
/// entries, so a linear scan after
/// the exact-match miss is fine.
pub struct WildcardEntry {
    pub mask: u32,
    pub value: u32,
    pub entry: DictEntry,
}

pub static WILDCARD_ENTRIES: &[WildcardEntry] = &[
    WildcardEntry {
        mask: 0xFF00_FFFF,
        value: 0x6000_3000,
        entry: DictEntry {
            tag: 0x6000_3000,
            keyword: "OverlayData",
            vr: Vr::OW,
        },
    },
    WildcardEntry {
        mask: 0xFF00_FFFF,
        value: 0x6000_0050,
        entry: DictEntry {
            tag: 0x6000_0050,
            keyword: "OverlayOrigin",
            vr: Vr::SS,
        },
    },
    WildcardEntry {
        mask: 0xFF00_FFFF,
        value: 0x6000_0100,
        entry: DictEntry {
            tag: 0x6000_0100,
            keyword: "OverlayBitsAllocated",
            vr: Vr::US,
        },
    },
    WildcardEntry {
        mask: 0xFF00_FFFF,
        value: 0x5000_0030,
        entry: DictEntry {
            tag: 0x5000_0030,
            keyword: "CurveDimensions",
            vr: Vr::US,
        },
    },
];

pub fn lookup_wildcard(tag: Tag) -> Option<&'static DictEntry> {
    WILDCARD_ENTRIES
        .iter()
        .find(|w| (tag.0 & w.mask) == w.value)
        .map(|w| &w.entry)
}
