//! RLE Lossless codec adapter (transfer syntax 1.2.840.10008.1.2.5),
//! wiring `dcm_encoding::rle`'s PackBits primitives into the
//! [`CodecAdapter`] contract.
#![cfg(feature = "rle")]

use dcm_encoding::adapter::{
    CodecAdapter, CodecSnafu, DecodeOutputOpts, DecodeResult, DecodedFrameView, DeclaredPixelInfo,
    UnsupportedSnafu,
};
use dcm_encoding::rle::{read_segment_offsets, unpack_packbits};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RleAdapter;

impl CodecAdapter for RleAdapter {
    fn name(&self) -> &'static str {
        "RLE Lossless"
    }

    fn decode(
        &self,
        encoded_bytes: &[u8],
        declared: &DeclaredPixelInfo,
        _opts: &DecodeOutputOpts,
    ) -> DecodeResult<DecodedFrameView> {
        let bits_allocated = declared.bits_allocated;
        if bits_allocated != 8 && bits_allocated != 16 {
            return UnsupportedSnafu {
                reason: format!("RLE Lossless only supports 8 or 16 BitsAllocated, got {bits_allocated}"),
            }
            .fail();
        }
        let bytes_per_sample = (bits_allocated / 8) as usize;
        let rows = declared.rows as usize;
        let cols = declared.columns as usize;
        let samples_per_pixel = declared.samples_per_pixel as usize;
        let stride = bytes_per_sample * cols * rows;

        let spans = read_segment_offsets(encoded_bytes)
            .map_err(|e| CodecSnafu { message: e.to_string() }.build())?;
        let expected_segments = samples_per_pixel * bytes_per_sample;
        if spans.len() != expected_segments {
            return UnsupportedSnafu {
                reason: format!(
                    "RLE fragment carries {} segments, expected {expected_segments} for {samples_per_pixel} samples x {bytes_per_sample} bytes",
                    spans.len()
                ),
            }
            .fail();
        }

        // Segments are ordered MSB-first per sample plane; interleave them
        // into planar-configuration-1, little-endian byte order, matching the
        // layout produced by the raw decode path.
        let mut out = vec![0u8; samples_per_pixel * stride];
        for sample_number in 0..samples_per_pixel {
            for byte_offset in (0..bytes_per_sample).rev() {
                let segment_index = sample_number * bytes_per_sample + (bytes_per_sample - 1 - byte_offset);
                let (start, end) = spans[segment_index];
                let decoded = unpack_packbits(&encoded_bytes[start..end], rows * cols)
                    .map_err(|e| CodecSnafu { message: e.to_string() }.build())?;

                let dst_byte_offset = bytes_per_sample - byte_offset - 1;
                let base = sample_number * stride + dst_byte_offset;
                for (i, byte) in decoded.into_iter().enumerate() {
                    out[base + i * bytes_per_sample] = byte;
                }
            }
        }

        Ok(DecodedFrameView {
            bytes: out,
            bits_allocated,
            samples_per_pixel: declared.samples_per_pixel,
            planar_configuration: 1,
            photometric_interpretation: declared.photometric_interpretation.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packbits_literal(bytes: &[u8]) -> Vec<u8> {
        let mut out = vec![(bytes.len() - 1) as u8];
        out.extend_from_slice(bytes);
        out
    }

    #[test]
    fn decodes_single_channel_u8_frame() {
        // 2x2 single-sample u8 image, values [10, 20, 30, 40].
        let segment = packbits_literal(&[10, 20, 30, 40]);
        let mut fragment = Vec::new();
        fragment.extend_from_slice(&1u32.to_le_bytes());
        fragment.extend_from_slice(&8u32.to_le_bytes());
        fragment.extend_from_slice(&segment);

        let declared = DeclaredPixelInfo {
            rows: 2,
            columns: 2,
            samples_per_pixel: 1,
            bits_allocated: 8,
            bits_stored: 8,
            high_bit: 7,
            pixel_representation: 0,
            planar_configuration: 0,
            photometric_interpretation: "MONOCHROME2".to_owned(),
            lossless_transfer_syntax: true,
        };

        let frame = RleAdapter
            .decode(&fragment, &declared, &DecodeOutputOpts::default())
            .unwrap();
        assert_eq!(frame.bytes, vec![10, 20, 30, 40]);
    }
}
