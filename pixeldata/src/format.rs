//! Output format and stride resolution.

use dcm_core::DataSet;

use crate::options::{DecodeOptions, OutputFormat, OutputLayout};
use crate::pixel_info::PixelInfo;
use crate::rescale::resolve_scaling;

/// The concrete sample arrangement after resolving `OutputLayout::KeepConfig`
/// against the source's declared `PlanarConfiguration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveLayout {
    Interleaved,
    Planar,
}

pub fn effective_layout(info: &PixelInfo, requested: OutputLayout) -> EffectiveLayout {
    match requested {
        OutputLayout::Interleaved => EffectiveLayout::Interleaved,
        OutputLayout::Planar => EffectiveLayout::Planar,
        OutputLayout::KeepConfig => {
            if info.planar_configuration == 0 {
                EffectiveLayout::Interleaved
            } else {
                EffectiveLayout::Planar
            }
        }
    }
}

/// A concrete (non-`auto`) output sample format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFormat {
    U8,
    I16,
    I32,
    F32,
}

impl ResolvedFormat {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            ResolvedFormat::U8 => 1,
            ResolvedFormat::I16 => 2,
            ResolvedFormat::I32 | ResolvedFormat::F32 => 4,
        }
    }
}

/// The resolved output format plus whether scaled (Modality LUT/rescale)
/// output should actually be applied, after the scaled-output degradation rule.
pub struct ResolvedOutput {
    pub format: ResolvedFormat,
    pub scaled: bool,
}

/// Implements `resolve_output_format` plus the scaled-output
/// constraint.
pub fn resolve_output_format(info: &PixelInfo, dataset: &DataSet, opts: &DecodeOptions) -> ResolvedOutput {
    let little_endian = dataset.is_little_endian();
    let scaled = opts.apply_rescale
        && info.samples_per_pixel == 1
        && info.sv_dtype.is_integral()
        && resolve_scaling(dataset, little_endian).is_some();

    let format = match opts.output_format {
        OutputFormat::U8 => ResolvedFormat::U8,
        OutputFormat::I16 => ResolvedFormat::I16,
        OutputFormat::I32 => ResolvedFormat::I32,
        OutputFormat::F32 => ResolvedFormat::F32,
        OutputFormat::Auto => {
            if scaled {
                resolve_scaled_auto_format(dataset, little_endian, info.bits_allocated)
            } else if !info.sv_dtype.is_integral() {
                ResolvedFormat::F32
            } else if info.bits_allocated <= 8 {
                ResolvedFormat::U8
            } else {
                ResolvedFormat::I16
            }
        }
    };

    ResolvedOutput { format, scaled }
}

fn resolve_scaled_auto_format(dataset: &DataSet, little_endian: bool, bits_allocated: u16) -> ResolvedFormat {
    let Some(crate::rescale::Scaling::Linear(rescale)) = resolve_scaling(dataset, little_endian) else {
        // A Modality LUT output range cannot be losslessly narrowed without
        // inspecting every table entry; always widen to f32.
        return ResolvedFormat::F32;
    };

    let intercept_is_small_int =
        (rescale.intercept - rescale.intercept.round()).abs() < 1e-9 && (-10000.0..=10000.0).contains(&rescale.intercept);

    if rescale.slope == 1.0 && intercept_is_small_int && bits_allocated <= 8 && rescale.intercept == 0.0 {
        ResolvedFormat::U8
    } else if rescale.slope == 1.0 && intercept_is_small_int {
        ResolvedFormat::I16
    } else {
        ResolvedFormat::F32
    }
}

/// Computes row/frame byte strides for `info` at `format`/`layout`.
/// `opts.output_stride` overrides the computed row stride when
/// nonzero. For planar output, `row_bytes` is the per-plane row width and
/// `frame_bytes` spans all `samples_per_pixel` planes.
pub fn compute_strides(info: &PixelInfo, format: ResolvedFormat, layout: EffectiveLayout, opts: &DecodeOptions) -> (usize, usize) {
    let bytes_per_sample = format.bytes_per_sample();
    let samples_per_row_component = match layout {
        EffectiveLayout::Interleaved => info.samples_per_pixel as usize,
        EffectiveLayout::Planar => 1,
    };
    let tight_row_bytes = info.columns as usize * samples_per_row_component * bytes_per_sample;
    let alignment = opts.output_alignment.max(1);
    let row_bytes = if opts.output_stride != 0 {
        opts.output_stride
    } else {
        align_up(tight_row_bytes, alignment)
    };
    let frame_bytes = match layout {
        EffectiveLayout::Interleaved => row_bytes * info.rows as usize,
        EffectiveLayout::Planar => row_bytes * info.rows as usize * info.samples_per_pixel as usize,
    };
    (row_bytes, frame_bytes)
}

fn align_up(value: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return value;
    }
    (value + alignment - 1) / alignment * alignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_info::SvDtype;
    use dcm_transfer_syntax::registry::lookup;

    fn info(bits_allocated: u16, spp: u16) -> PixelInfo {
        PixelInfo {
            rows: 2,
            columns: 2,
            samples_per_pixel: spp,
            bits_allocated,
            bits_stored: bits_allocated,
            high_bit: bits_allocated - 1,
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
    fn defaults_to_u8_below_9_bits_allocated() {
        let dataset = DataSet::new(dcm_core::Stream::from_owned(vec![]), true, true);
        let resolved = resolve_output_format(&info(8, 1), &dataset, &DecodeOptions::default());
        assert_eq!(resolved.format, ResolvedFormat::U8);
        assert!(!resolved.scaled);
    }

    #[test]
    fn defaults_to_i16_above_8_bits_allocated() {
        let dataset = DataSet::new(dcm_core::Stream::from_owned(vec![]), true, true);
        let resolved = resolve_output_format(&info(16, 1), &dataset, &DecodeOptions::default());
        assert_eq!(resolved.format, ResolvedFormat::I16);
    }

    #[test]
    fn float_pixel_data_defaults_to_f32_not_i16() {
        let dataset = DataSet::new(dcm_core::Stream::from_owned(vec![]), true, true);
        let float_info = PixelInfo {
            bits_allocated: 32,
            bits_stored: 32,
            high_bit: 31,
            sv_dtype: SvDtype::F32,
            ..info(32, 1)
        };
        let resolved = resolve_output_format(&float_info, &dataset, &DecodeOptions::default());
        assert_eq!(resolved.format, ResolvedFormat::F32);
        assert!(!resolved.scaled);
    }

    #[test]
    fn computes_tight_stride_with_alignment() {
        let opts = DecodeOptions {
            output_alignment: 4,
            ..DecodeOptions::default()
        };
        let (row_bytes, frame_bytes) = compute_strides(&info(16, 1), ResolvedFormat::I16, EffectiveLayout::Interleaved, &opts);
        assert_eq!(row_bytes, 4); // 2 cols * 2 bytes = 4, already aligned
        assert_eq!(frame_bytes, 8);
    }
}
