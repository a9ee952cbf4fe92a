//! Pixel metadata extraction.

use dcm_core::{DataSet, Tag};
use dcm_transfer_syntax::registry::TransferSyntax;

use crate::error::{MissingElementSnafu, Result};

pub(crate) const ROWS: Tag = Tag::from_value(0x0028_0010);
pub(crate) const COLUMNS: Tag = Tag::from_value(0x0028_0011);
pub(crate) const SAMPLES_PER_PIXEL: Tag = Tag::from_value(0x0028_0002);
pub(crate) const BITS_ALLOCATED: Tag = Tag::from_value(0x0028_0100);
pub(crate) const BITS_STORED: Tag = Tag::from_value(0x0028_0101);
pub(crate) const HIGH_BIT: Tag = Tag::from_value(0x0028_0102);
pub(crate) const PIXEL_REPRESENTATION: Tag = Tag::from_value(0x0028_0103);
const PLANAR_CONFIGURATION: Tag = Tag::from_value(0x0028_0006);
const NUMBER_OF_FRAMES: Tag = Tag::from_value(0x0028_0008);
const PHOTOMETRIC_INTERPRETATION: Tag = Tag::from_value(0x0028_0004);
pub(crate) const PIXEL_DATA: Tag = Tag::from_value(0x7FE0_0010);
pub(crate) const FLOAT_PIXEL_DATA: Tag = Tag::from_value(0x7FE0_0008);
pub(crate) const DOUBLE_FLOAT_PIXEL_DATA: Tag = Tag::from_value(0x7FE0_0009);
pub(crate) const RESCALE_SLOPE: Tag = Tag::from_value(0x0028_1053);
pub(crate) const RESCALE_INTERCEPT: Tag = Tag::from_value(0x0028_1052);
pub(crate) const MODALITY_LUT_SEQUENCE: Tag = Tag::from_value(0x0028_3000);
pub(crate) const LUT_DESCRIPTOR: Tag = Tag::from_value(0x0028_3002);
pub(crate) const LUT_DATA: Tag = Tag::from_value(0x0028_3006);

/// The stored-value numeric type a pixel sample decodes to before any
/// rescale/Modality LUT is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvDtype {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SvDtype {
    pub fn is_integral(self) -> bool {
        !matches!(self, SvDtype::F32 | SvDtype::F64)
    }

    pub fn is_signed(self) -> bool {
        matches!(self, SvDtype::I8 | SvDtype::I16 | SvDtype::I32 | SvDtype::F32 | SvDtype::F64)
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            SvDtype::U8 | SvDtype::I8 => 1,
            SvDtype::U16 | SvDtype::I16 => 2,
            SvDtype::U32 | SvDtype::I32 | SvDtype::F32 => 4,
            SvDtype::F64 => 8,
        }
    }

    /// How a source sample's raw bytes should be reinterpreted: floats need
    /// an IEEE-754 bit-pattern decode rather than sign-extended integer
    /// decode.
    pub fn sample_kind(self) -> SampleKind {
        match self {
            SvDtype::F32 | SvDtype::F64 => SampleKind::Float,
            SvDtype::I8 | SvDtype::I16 | SvDtype::I32 => SampleKind::SignedInt,
            SvDtype::U8 | SvDtype::U16 | SvDtype::U32 => SampleKind::UnsignedInt,
        }
    }
}

/// How [`crate::raw::SourceSamples`] should reinterpret a sample's raw
/// bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    UnsignedInt,
    SignedInt,
    Float,
}

/// Cached imaging metadata a `DataSet` needs before any frame can be
/// decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelInfo {
    pub rows: u16,
    pub columns: u16,
    pub samples_per_pixel: u16,
    pub bits_allocated: u16,
    pub bits_stored: u16,
    pub high_bit: u16,
    pub pixel_representation: u16,
    pub planar_configuration: u16,
    pub number_of_frames: u32,
    pub photometric_interpretation: String,
    pub sv_dtype: SvDtype,
    pub transfer_syntax: TransferSyntax,
    pub source_tag: Tag,
}

impl PixelInfo {
    pub fn signed(&self) -> bool {
        self.pixel_representation != 0
    }
}

/// Extracts and classifies the metadata needed to decode `dataset`'s pixel
/// data. Callers that hold a `DataSet` across multiple decode calls should
/// cache the result and invalidate it when the backing stream is replaced.
pub fn extract(dataset: &DataSet) -> Result<PixelInfo> {
    let uid = dataset
        .transfer_syntax()
        .map(|u| u.as_str().to_owned())
        .unwrap_or_default();
    let transfer_syntax = dcm_transfer_syntax::lookup(&uid)
        .ok_or_else(|| crate::error::Error::UnsupportedTransferSyntax { uid: uid.clone() })?;

    let little_endian = dataset.is_little_endian();

    let float_present = dataset.contains(FLOAT_PIXEL_DATA);
    let double_present = dataset.contains(DOUBLE_FLOAT_PIXEL_DATA);
    let source_tag = if double_present {
        DOUBLE_FLOAT_PIXEL_DATA
    } else if float_present {
        FLOAT_PIXEL_DATA
    } else {
        PIXEL_DATA
    };

    let rows = required_u16(dataset, ROWS, little_endian)?;
    let columns = required_u16(dataset, COLUMNS, little_endian)?;
    let samples_per_pixel = optional_u16(dataset, SAMPLES_PER_PIXEL, little_endian, 1);
    let bits_allocated = if double_present {
        64
    } else if float_present {
        32
    } else {
        required_u16(dataset, BITS_ALLOCATED, little_endian)?
    };
    let bits_stored = optional_u16(dataset, BITS_STORED, little_endian, bits_allocated);
    let high_bit = optional_u16(dataset, HIGH_BIT, little_endian, bits_stored.saturating_sub(1));
    let pixel_representation = optional_u16(dataset, PIXEL_REPRESENTATION, little_endian, 0);
    let planar_configuration = optional_u16(dataset, PLANAR_CONFIGURATION, little_endian, 0);
    let number_of_frames = dataset
        .get(NUMBER_OF_FRAMES)
        .to_i64(little_endian)
        .map(|v| v.max(1) as u32)
        .unwrap_or(1);
    let photometric_interpretation = dataset
        .get(PHOTOMETRIC_INTERPRETATION)
        .to_string_view()
        .unwrap_or_default();

    let sv_dtype = if double_present {
        SvDtype::F64
    } else if float_present {
        SvDtype::F32
    } else {
        classify_integral(bits_allocated, pixel_representation != 0)
    };

    Ok(PixelInfo {
        rows,
        columns,
        samples_per_pixel,
        bits_allocated,
        bits_stored,
        high_bit,
        pixel_representation,
        planar_configuration,
        number_of_frames,
        photometric_interpretation,
        sv_dtype,
        transfer_syntax,
        source_tag,
    })
}

fn classify_integral(bits_allocated: u16, signed: bool) -> SvDtype {
    match (bits_allocated, signed) {
        (1..=8, false) => SvDtype::U8,
        (1..=8, true) => SvDtype::I8,
        (9..=16, false) => SvDtype::U16,
        (9..=16, true) => SvDtype::I16,
        (_, false) => SvDtype::U32,
        (_, true) => SvDtype::I32,
    }
}

fn required_u16(dataset: &DataSet, tag: Tag, little_endian: bool) -> Result<u16> {
    let element = dataset.get(tag);
    if element.is_missing() {
        return MissingElementSnafu { tag }.fail();
    }
    Ok(element.to_i64(little_endian)? as u16)
}

fn optional_u16(dataset: &DataSet, tag: Tag, little_endian: bool, default: u16) -> u16 {
    dataset.get(tag).to_i64(little_endian).map(|v| v as u16).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcm_core::{DataElement, Storage, Stream, Vr};

    fn explicit_le_element(group: u16, element: u16, vr: &[u8; 2], value: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&group.to_le_bytes());
        bytes.extend_from_slice(&element.to_le_bytes());
        bytes.extend_from_slice(vr);
        bytes.extend_from_slice(&(value.len() as u16).to_le_bytes());
        bytes.extend_from_slice(value);
        bytes
    }

    fn u16_element(tag: Tag, value: u16) -> DataElement {
        DataElement::new(tag, Vr::US, 2, 0, Storage::Owned(value.to_le_bytes().to_vec()))
    }

    fn cs_element(tag: Tag, value: &str) -> DataElement {
        DataElement::new(tag, Vr::CS, value.len() as u32, 0, Storage::Owned(value.as_bytes().to_vec()))
    }

    fn sample_dataset() -> DataSet {
        let mut ds = DataSet::new(Stream::from_owned(explicit_le_element(0x0008, 0x0060, b"CS", b"CT")), true, true);
        ds.insert(u16_element(ROWS, 4));
        ds.insert(u16_element(COLUMNS, 4));
        ds.insert(u16_element(SAMPLES_PER_PIXEL, 1));
        ds.insert(u16_element(BITS_ALLOCATED, 16));
        ds.insert(u16_element(BITS_STORED, 16));
        ds.insert(u16_element(HIGH_BIT, 15));
        ds.insert(u16_element(PIXEL_REPRESENTATION, 0));
        ds.insert(cs_element(PHOTOMETRIC_INTERPRETATION, "MONOCHROME2"));
        ds.set_transfer_syntax(dcm_core::Uid::Known("1.2.840.10008.1.2.1".to_owned()));
        ds
    }

    #[test]
    fn extracts_monochrome_u16_metadata() {
        let ds = sample_dataset();
        let info = extract(&ds).unwrap();
        assert_eq!(info.rows, 4);
        assert_eq!(info.columns, 4);
        assert_eq!(info.sv_dtype, SvDtype::U16);
        assert_eq!(info.number_of_frames, 1);
        assert_eq!(info.photometric_interpretation, "MONOCHROME2");
    }

    #[test]
    fn missing_rows_is_surfaced() {
        let mut ds = sample_dataset();
        ds.remove(ROWS);
        assert!(extract(&ds).is_err());
    }
}
