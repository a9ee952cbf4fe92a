//! The pixel decoder orchestrator: backend selection, raw/RLE/JPEG-family
//! decode paths and destination-buffer assembly.

use dcm_core::{DataSet, TsFlags};
use dcm_encoding::adapter::{DeclaredPixelInfo, DecodeOutputOpts};
use dcm_transfer_syntax::adapters::adapter_for;

use crate::error::{
    CorruptStreamSnafu, InsufficientBufferSnafu, InvalidFrameSnafu, MissingElementSnafu, Result, UnsupportedTransferSyntaxSnafu,
};
use crate::format::{compute_strides, effective_layout, resolve_output_format, EffectiveLayout, ResolvedFormat};
use crate::options::{DecodeOptions, HtJ2kBackend};
use crate::pixel_info::{self, PixelInfo};
use crate::raw::{transform_frame, SourceLayout, SourceSamples};
use crate::rescale::{resolve_scaling, Scaling};

/// Decodes `frame_index` from `dataset` into a freshly allocated buffer.
pub fn decode_pixels(dataset: &DataSet, frame_index: usize, opts: &DecodeOptions) -> Result<Vec<u8>> {
    let info = pixel_info::extract(dataset)?;
    let resolved = resolve_output_format(&info, dataset, opts);
    let layout = effective_layout(&info, opts.output_layout);
    let (row_bytes, frame_bytes) = compute_strides(&info, resolved.format, layout, opts);

    let mut dst = vec![0u8; frame_bytes];
    let scaling = if resolved.scaled {
        resolve_scaling(dataset, dataset.is_little_endian())
    } else {
        None
    };
    dispatch(dataset, &info, frame_index, opts, resolved.format, layout, row_bytes, scaling.as_ref(), &mut dst)?;
    Ok(dst)
}

/// Decodes `frame_index` from `dataset` into the caller-supplied `dst`.
pub fn decode_into(dataset: &DataSet, dst: &mut [u8], frame_index: usize, opts: &DecodeOptions) -> Result<()> {
    let info = pixel_info::extract(dataset)?;
    let resolved = resolve_output_format(&info, dataset, opts);
    let layout = effective_layout(&info, opts.output_layout);
    let (row_bytes, frame_bytes) = compute_strides(&info, resolved.format, layout, opts);

    if dst.len() < frame_bytes {
        return InsufficientBufferSnafu {
            needed: frame_bytes,
            available: dst.len(),
            alignment: opts.output_alignment.max(1),
        }
        .fail();
    }

    let scaling = if resolved.scaled {
        resolve_scaling(dataset, dataset.is_little_endian())
    } else {
        None
    };
    dispatch(dataset, &info, frame_index, opts, resolved.format, layout, row_bytes, scaling.as_ref(), dst)
}

#[allow(clippy::too_many_arguments)]
fn dispatch(
    dataset: &DataSet,
    info: &PixelInfo,
    frame_index: usize,
    opts: &DecodeOptions,
    format: ResolvedFormat,
    layout: EffectiveLayout,
    row_bytes: usize,
    scaling: Option<&Scaling>,
    dst: &mut [u8],
) -> Result<()> {
    if frame_index >= info.number_of_frames as usize {
        return InvalidFrameSnafu {
            index: frame_index,
            frame_count: info.number_of_frames as usize,
        }
        .fail();
    }

    let flags = info.transfer_syntax.flags();
    if !flags.contains(TsFlags::ENCAPSULATED) {
        decode_raw(dataset, info, frame_index, format, layout, row_bytes, scaling, dst)
    } else if flags.contains(TsFlags::RLE) {
        decode_rle(dataset, info, frame_index, format, layout, row_bytes, scaling, dst)
    } else if flags.is_jpeg_family() {
        decode_jpeg_family(dataset, info, frame_index, opts, format, layout, row_bytes, scaling, dst)
    } else {
        UnsupportedTransferSyntaxSnafu {
            uid: info.transfer_syntax.uid().to_owned(),
        }
        .fail()
    }
}

#[allow(clippy::too_many_arguments)]
fn decode_raw(
    dataset: &DataSet,
    info: &PixelInfo,
    frame_index: usize,
    format: ResolvedFormat,
    layout: EffectiveLayout,
    row_bytes: usize,
    scaling: Option<&Scaling>,
    dst: &mut [u8],
) -> Result<()> {
    let element = dataset.get(info.source_tag);
    if element.is_missing() {
        return MissingElementSnafu { tag: info.source_tag }.fail();
    }

    let bytes_per_sample = info.sv_dtype.bytes_per_sample();
    let src_frame_bytes = info.rows as usize * info.columns as usize * info.samples_per_pixel as usize * bytes_per_sample;
    let span = element.value_span();
    let start = frame_index * src_frame_bytes;
    let end = start + src_frame_bytes;
    if end > span.len() {
        return CorruptStreamSnafu {
            reason: format!(
                "pixel data element has {} bytes, frame {frame_index} needs bytes [{start}, {end})",
                span.len()
            ),
        }
        .fail();
    }

    let source = SourceSamples {
        bytes: &span[start..end],
        bytes_per_sample,
        kind: info.sv_dtype.sample_kind(),
        little_endian: dataset.is_little_endian(),
        layout: if info.planar_configuration == 0 {
            SourceLayout::Interleaved
        } else {
            SourceLayout::Planar
        },
    };
    transform_frame(&source, info, format, layout, row_bytes, scaling, dst);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn decode_rle(
    dataset: &DataSet,
    info: &PixelInfo,
    frame_index: usize,
    format: ResolvedFormat,
    layout: EffectiveLayout,
    row_bytes: usize,
    scaling: Option<&Scaling>,
    dst: &mut [u8],
) -> Result<()> {
    let element = dataset.get(info.source_tag);
    let sequence = element
        .pixel_sequence()
        .ok_or_else(|| crate::error::Error::MissingElement { tag: info.source_tag })?;
    let frame = sequence
        .frame(frame_index)
        .ok_or_else(|| crate::error::Error::InvalidFrame {
            index: frame_index,
            frame_count: sequence.number_of_frames(),
        })?;
    let encoded = frame.encoded_bytes(sequence.stream());

    let declared = declared_pixel_info(info);
    let adapter = adapter_for(TsFlags::RLE).ok_or(crate::error::Error::UnsupportedTransferSyntax {
        uid: info.transfer_syntax.uid().to_owned(),
    })?;
    let decoded = adapter
        .decode(encoded.as_slice(), &declared, &DecodeOutputOpts::default())
        .map_err(|e| crate::error::Error::CodecFailure {
            frame: frame_index,
            message: e.to_string(),
        })?;

    // RLE byte-planes reconstruct in the host's big-endian-style MSB-first
    // order regardless of transfer-syntax endianness.
    let source = SourceSamples {
        bytes: &decoded.bytes,
        bytes_per_sample: info.sv_dtype.bytes_per_sample(),
        kind: info.sv_dtype.sample_kind(),
        little_endian: false,
        layout: SourceLayout::Planar,
    };
    transform_frame(&source, info, format, layout, row_bytes, scaling, dst);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn decode_jpeg_family(
    dataset: &DataSet,
    info: &PixelInfo,
    frame_index: usize,
    opts: &DecodeOptions,
    format: ResolvedFormat,
    layout: EffectiveLayout,
    row_bytes: usize,
    scaling: Option<&Scaling>,
    dst: &mut [u8],
) -> Result<()> {
    let element = dataset.get(info.source_tag);
    let sequence = element
        .pixel_sequence()
        .ok_or_else(|| crate::error::Error::MissingElement { tag: info.source_tag })?;
    let frame = sequence
        .frame(frame_index)
        .ok_or_else(|| crate::error::Error::InvalidFrame {
            index: frame_index,
            frame_count: sequence.number_of_frames(),
        })?;
    let encoded = frame.encoded_bytes(sequence.stream());
    let patched = patch_jpeg_se_quirk(encoded.as_slice());

    let declared = declared_pixel_info(info);
    let decode_opts = DecodeOutputOpts::default();
    let flags = info.transfer_syntax.flags();

    let decoded = if flags.contains(TsFlags::HTJ2K) {
        decode_htj2k_with_fallback(patched.as_ref(), &declared, &decode_opts, opts.htj2k_backend, frame_index)?
    } else {
        let adapter = adapter_for(flags).ok_or(crate::error::Error::UnsupportedTransferSyntax {
            uid: info.transfer_syntax.uid().to_owned(),
        })?;
        adapter
            .decode(patched.as_ref(), &declared, &decode_opts)
            .map_err(|e| crate::error::Error::CodecFailure {
                frame: frame_index,
                message: e.to_string(),
            })?
    };

    let source = SourceSamples {
        bytes: &decoded.bytes,
        bytes_per_sample: info.sv_dtype.bytes_per_sample(),
        kind: info.sv_dtype.sample_kind(),
        little_endian: cfg!(target_endian = "little"),
        layout: if decoded.planar_configuration == 0 {
            SourceLayout::Interleaved
        } else {
            SourceLayout::Planar
        },
    };
    transform_frame(&source, info, format, layout, row_bytes, scaling, dst);
    Ok(())
}

/// The JPEG 2000/HT-J2K adapter itself tries `hayro-jpeg2000` then the
/// `jpeg2k` openjp2 bindings, reporting a combined message if both fail.
/// `backend` lets a caller express a decoder preference, but the adapter
/// does not currently expose a way to reorder its internal attempt
/// sequence, so it has no effect yet; it is accepted here so the option
/// survives a future adapter that does honor it.
fn decode_htj2k_with_fallback(
    encoded: &[u8],
    declared: &DeclaredPixelInfo,
    opts: &DecodeOutputOpts,
    backend: HtJ2kBackend,
    frame_index: usize,
) -> Result<dcm_encoding::adapter::DecodedFrameView> {
    let flags = TsFlags::HTJ2K;
    let adapter = adapter_for(flags).ok_or(crate::error::Error::UnsupportedTransferSyntax {
        uid: "HT-J2K".to_owned(),
    })?;
    let _ = backend;
    adapter.decode(encoded, declared, opts).map_err(|e| crate::error::Error::CodecFailure {
        frame: frame_index,
        message: e.to_string(),
    })
}

fn declared_pixel_info(info: &PixelInfo) -> DeclaredPixelInfo {
    DeclaredPixelInfo {
        rows: info.rows,
        columns: info.columns,
        samples_per_pixel: info.samples_per_pixel,
        bits_allocated: info.bits_allocated,
        bits_stored: info.bits_stored,
        high_bit: info.high_bit,
        pixel_representation: info.pixel_representation,
        planar_configuration: info.planar_configuration,
        photometric_interpretation: info.photometric_interpretation.clone(),
        lossless_transfer_syntax: info.transfer_syntax.flags().is_lossless_only(),
    }
}

/// Detects the legacy SOF1-with-SOS-Se=0 pattern some DICOM producers emit
/// for JPEG extended-sequential and patches `Se` to `0x3F` in a private
/// copy, leaving the caller's bytes untouched.
fn patch_jpeg_se_quirk(encoded: &[u8]) -> std::borrow::Cow<'_, [u8]> {
    const SOF1: [u8; 2] = [0xFF, 0xC1];
    const SOS: [u8; 2] = [0xFF, 0xDA];

    if !has_marker(encoded, &SOF1) {
        return std::borrow::Cow::Borrowed(encoded);
    }
    let Some(sos_marker) = find_marker(encoded, &SOS) else {
        return std::borrow::Cow::Borrowed(encoded);
    };
    // SOS segment: marker(2) + length(2) + Ns(1) + 2*Ns scan components + Ss(1) + Se(1) + Ah/Al(1)
    let ns_offset = sos_marker + 4;
    if ns_offset >= encoded.len() {
        return std::borrow::Cow::Borrowed(encoded);
    }
    let ns = encoded[ns_offset] as usize;
    let se_offset = ns_offset + 1 + 2 * ns + 1;
    if se_offset >= encoded.len() || encoded[se_offset] != 0 {
        return std::borrow::Cow::Borrowed(encoded);
    }

    let mut patched = encoded.to_vec();
    patched[se_offset] = 0x3F;
    std::borrow::Cow::Owned(patched)
}

fn has_marker(encoded: &[u8], marker: &[u8; 2]) -> bool {
    find_marker(encoded, marker).is_some()
}

fn find_marker(encoded: &[u8], marker: &[u8; 2]) -> Option<usize> {
    encoded.windows(2).position(|w| w == marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OutputFormat;
    use crate::pixel_info::PIXEL_DATA;
    use dcm_core::{DataElement, Storage, Stream, Vr};

    fn u16_element(tag: dcm_core::Tag, value: u16) -> DataElement {
        DataElement::new(tag, Vr::US, 2, 0, Storage::Owned(value.to_le_bytes().to_vec()))
    }

    fn sample_dataset() -> DataSet {
        use crate::pixel_info::{BITS_ALLOCATED, BITS_STORED, COLUMNS, HIGH_BIT, PIXEL_REPRESENTATION, ROWS, SAMPLES_PER_PIXEL};
        let mut ds = DataSet::new(Stream::from_owned(vec![]), true, true);
        ds.insert(u16_element(ROWS, 1));
        ds.insert(u16_element(COLUMNS, 2));
        ds.insert(u16_element(SAMPLES_PER_PIXEL, 1));
        ds.insert(u16_element(BITS_ALLOCATED, 16));
        ds.insert(u16_element(BITS_STORED, 16));
        ds.insert(u16_element(HIGH_BIT, 15));
        ds.insert(u16_element(PIXEL_REPRESENTATION, 0));
        ds.insert(DataElement::new(
            PIXEL_DATA,
            Vr::OW,
            4,
            0,
            Storage::Owned(vec![0x34, 0x12, 0xCD, 0xAB]),
        ));
        ds.set_transfer_syntax(dcm_core::Uid::Known("1.2.840.10008.1.2.1".to_owned()));
        ds
    }

    #[test]
    fn decodes_raw_single_frame_u16() {
        let ds = sample_dataset();
        let opts = DecodeOptions {
            output_format: OutputFormat::I16,
            ..DecodeOptions::default()
        };
        let bytes = decode_pixels(&ds, 0, &opts).unwrap();
        assert_eq!(bytes, vec![0x34, 0x12, 0xCD, 0xAB]);
    }

    #[test]
    fn rejects_out_of_range_frame_index() {
        let ds = sample_dataset();
        let err = decode_pixels(&ds, 5, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidFrame { .. }));
    }

    #[test]
    fn jpeg_se_quirk_only_patches_sof1_extended_sequential() {
        // SOF0 (baseline) must never be patched, even with Se=0.
        let mut baseline = vec![0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x0B, 0x08];
        baseline.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(patch_jpeg_se_quirk(&baseline), std::borrow::Cow::Borrowed(_)));
    }
}
