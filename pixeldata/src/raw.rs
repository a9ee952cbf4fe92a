//! Per-sample planar/byte-order/format transform shared by the raw and RLE
//! decode paths.

use crate::format::{EffectiveLayout, ResolvedFormat};
use crate::pixel_info::{PixelInfo, SampleKind};
use crate::rescale::Scaling;

/// How one frame's samples are laid out in the source bytes handed to
/// [`transform_frame`]: either interleaved per pixel (`i`) or grouped by
/// sample plane (`p`), matching the `{interleaved,planar}` source/output
/// composition the transform loop supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayout {
    Interleaved,
    Planar,
}

pub struct SourceSamples<'a> {
    pub bytes: &'a [u8],
    pub bytes_per_sample: usize,
    pub kind: SampleKind,
    pub little_endian: bool,
    pub layout: SourceLayout,
}

/// A single decoded sample, before output-format conversion: either an
/// integer stored value or a float sample's native-precision value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Int(i64),
    Float(f64),
}

impl SourceSamples<'_> {
    fn sample_at(&self, pixel_index: usize, sample: usize, samples_per_pixel: usize, pixel_count: usize) -> SampleValue {
        let sample_index = match self.layout {
            SourceLayout::Interleaved => pixel_index * samples_per_pixel + sample,
            SourceLayout::Planar => sample * pixel_count + pixel_index,
        };
        let start = sample_index * self.bytes_per_sample;
        let raw = &self.bytes[start..start + self.bytes_per_sample];
        match self.kind {
            SampleKind::Float => SampleValue::Float(decode_float(raw, self.bytes_per_sample, self.little_endian)),
            SampleKind::SignedInt => SampleValue::Int(decode_integer(raw, self.bytes_per_sample, true, self.little_endian)),
            SampleKind::UnsignedInt => SampleValue::Int(decode_integer(raw, self.bytes_per_sample, false, self.little_endian)),
        }
    }
}

fn to_native_endian_bytes(raw: &[u8], bytes_per_sample: usize, little_endian: bool) -> [u8; 8] {
    let mut buf = [0u8; 8];
    if little_endian {
        buf[..bytes_per_sample].copy_from_slice(raw);
    } else {
        for (i, b) in raw.iter().rev().enumerate() {
            buf[i] = *b;
        }
    }
    buf
}

fn decode_integer(raw: &[u8], bytes_per_sample: usize, signed: bool, little_endian: bool) -> i64 {
    let buf = to_native_endian_bytes(raw, bytes_per_sample, little_endian);
    let unsigned = u64::from_le_bytes(buf);
    if !signed {
        return unsigned as i64;
    }
    let shift = 64 - bytes_per_sample * 8;
    ((unsigned << shift) as i64) >> shift
}

/// Reinterprets `raw` as an IEEE-754 float (`FloatPixelData`'s 32-bit or
/// `DoubleFloatPixelData`'s 64-bit samples), honoring the transfer syntax's
/// byte order.
fn decode_float(raw: &[u8], bytes_per_sample: usize, little_endian: bool) -> f64 {
    let buf = to_native_endian_bytes(raw, bytes_per_sample, little_endian);
    match bytes_per_sample {
        4 => f32::from_le_bytes(buf[..4].try_into().expect("4-byte slice")) as f64,
        8 => f64::from_le_bytes(buf),
        other => panic!("unsupported float sample width: {other} bytes"),
    }
}

/// Transforms one frame's worth of raw samples into the destination buffer
/// at `dst`, applying layout conversion, the resolved output format, and an
/// optional monochrome scaling function.
pub fn transform_frame(
    source: &SourceSamples,
    info: &PixelInfo,
    resolved: ResolvedFormat,
    out_layout: EffectiveLayout,
    row_bytes: usize,
    scaling: Option<&Scaling>,
    dst: &mut [u8],
) {
    let rows = info.rows as usize;
    let cols = info.columns as usize;
    let spp = info.samples_per_pixel as usize;
    let pixel_count = rows * cols;
    let out_bytes = resolved.bytes_per_sample();

    for row in 0..rows {
        for col in 0..cols {
            let pixel_index = row * cols + col;
            for sample in 0..spp {
                let sv = source.sample_at(pixel_index, sample, spp, pixel_count);

                let dst_offset = match out_layout {
                    EffectiveLayout::Interleaved => row * row_bytes + (col * spp + sample) * out_bytes,
                    EffectiveLayout::Planar => sample * (row_bytes * rows) + row * row_bytes + col * out_bytes,
                };
                write_sample(&mut dst[dst_offset..dst_offset + out_bytes], sv, resolved, scaling);
            }
        }
    }
}

fn write_sample(dst: &mut [u8], sv: SampleValue, format: ResolvedFormat, scaling: Option<&Scaling>) {
    match format {
        ResolvedFormat::U8 => {
            dst[0] = match sv {
                SampleValue::Int(i) => i as u8,
                SampleValue::Float(f) => f as u8,
            }
        }
        ResolvedFormat::I16 => {
            let v = match sv {
                SampleValue::Int(i) => i as i16,
                SampleValue::Float(f) => f as i16,
            };
            dst.copy_from_slice(&v.to_le_bytes());
        }
        ResolvedFormat::I32 => {
            let v = match sv {
                SampleValue::Int(i) => i as i32,
                SampleValue::Float(f) => f as i32,
            };
            dst.copy_from_slice(&v.to_le_bytes());
        }
        ResolvedFormat::F32 => {
            let value = match sv {
                SampleValue::Int(i) => match scaling {
                    Some(s) => s.map(i),
                    None => i as f32,
                },
                SampleValue::Float(f) => f as f32,
            };
            dst.copy_from_slice(&value.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_info::{SampleKind, SvDtype};
    use dcm_transfer_syntax::registry::lookup;

    fn sample_info() -> PixelInfo {
        PixelInfo {
            rows: 1,
            columns: 2,
            samples_per_pixel: 1,
            bits_allocated: 16,
            bits_stored: 16,
            high_bit: 15,
            pixel_representation: 0,
            planar_configuration: 0,
            number_of_frames: 1,
            photometric_interpretation: "MONOCHROME2".to_owned(),
            sv_dtype: SvDtype::U16,
            transfer_syntax: lookup("1.2.840.10008.1.2.1").unwrap(),
            source_tag: dcm_core::Tag::from_value(0x7FE0_0010),
        }
    }

    #[test]
    fn memcpy_equivalent_for_matching_layout() {
        let src_bytes = [0x34u8, 0x12, 0xCD, 0xAB]; // 0x1234, 0xABCD little-endian u16s
        let source = SourceSamples {
            bytes: &src_bytes,
            bytes_per_sample: 2,
            kind: SampleKind::UnsignedInt,
            little_endian: true,
            layout: SourceLayout::Interleaved,
        };
        let info = sample_info();
        let mut dst = [0u8; 4];
        transform_frame(&source, &info, ResolvedFormat::I16, EffectiveLayout::Interleaved, 4, None, &mut dst);
        assert_eq!(dst, [0x34, 0x12, 0xCD, 0xAB]);
    }

    #[test]
    fn big_endian_source_is_byte_swapped() {
        let src_bytes = [0x12u8, 0x34]; // 0x1234 big-endian
        let source = SourceSamples {
            bytes: &src_bytes,
            bytes_per_sample: 2,
            kind: SampleKind::UnsignedInt,
            little_endian: false,
            layout: SourceLayout::Interleaved,
        };
        let info = PixelInfo { columns: 1, ..sample_info() };
        let mut dst = [0u8; 2];
        transform_frame(&source, &info, ResolvedFormat::I16, EffectiveLayout::Interleaved, 2, None, &mut dst);
        assert_eq!(u16::from_le_bytes(dst), 0x1234);
    }

    #[test]
    fn float32_source_reinterprets_bits_instead_of_sign_extending() {
        // IEEE-754 f32 for 98.6 is 0x42C53333.
        let src_bytes = 98.6f32.to_le_bytes();
        let source = SourceSamples {
            bytes: &src_bytes,
            bytes_per_sample: 4,
            kind: SampleKind::Float,
            little_endian: true,
            layout: SourceLayout::Interleaved,
        };
        let info = PixelInfo {
            columns: 1,
            bits_allocated: 32,
            bits_stored: 32,
            high_bit: 31,
            sv_dtype: SvDtype::F32,
            ..sample_info()
        };
        let mut dst = [0u8; 4];
        transform_frame(&source, &info, ResolvedFormat::F32, EffectiveLayout::Interleaved, 4, None, &mut dst);
        assert_eq!(f32::from_le_bytes(dst), 98.6f32);
    }

    #[test]
    fn float64_source_reinterprets_bits_on_big_endian_transfer_syntax() {
        let src_bytes = {
            let mut be = 98.6f64.to_le_bytes();
            be.reverse();
            be
        };
        let source = SourceSamples {
            bytes: &src_bytes,
            bytes_per_sample: 8,
            kind: SampleKind::Float,
            little_endian: false,
            layout: SourceLayout::Interleaved,
        };
        let info = PixelInfo {
            columns: 1,
            bits_allocated: 64,
            bits_stored: 64,
            high_bit: 63,
            sv_dtype: SvDtype::F64,
            ..sample_info()
        };
        let mut dst = [0u8; 4];
        transform_frame(&source, &info, ResolvedFormat::F32, EffectiveLayout::Interleaved, 4, None, &mut dst);
        assert_eq!(f32::from_le_bytes(dst), 98.6f64 as f32);
    }
}
