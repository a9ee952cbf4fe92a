//! JPEG Baseline/Extended codec adapter (transfer syntaxes
//! 1.2.840.10008.1.2.4.50/.51), backed by the pure-Rust `jpeg-decoder`
//! crate. JPEG Lossless (Process 14, SV1) is not decodable through this
//! crate and is reported as unsupported rather than silently mis-decoded.
#![cfg(feature = "jpeg")]

use jpeg_decoder::{Decoder, PixelFormat};

use dcm_encoding::adapter::{
    CodecAdapter, CodecSnafu, DecodeOutputOpts, DecodeResult, DecodedFrameView, DeclaredPixelInfo,
    HeaderMismatchSnafu, LosslessMismatchSnafu, PrecisionOutOfRangeSnafu, SignednessMismatchSnafu,
};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct JpegAdapter;

impl CodecAdapter for JpegAdapter {
    fn name(&self) -> &'static str {
        "JPEG Baseline/Extended"
    }

    fn decode(
        &self,
        encoded_bytes: &[u8],
        declared: &DeclaredPixelInfo,
        _opts: &DecodeOutputOpts,
    ) -> DecodeResult<DecodedFrameView> {
        let mut decoder = Decoder::new(encoded_bytes);
        let pixels = decoder
            .decode()
            .map_err(|e| CodecSnafu { message: e.to_string() }.build())?;
        let info = decoder
            .info()
            .ok_or_else(|| CodecSnafu { message: "decoder produced no frame info".to_owned() }.build())?;

        if info.width as u16 != declared.columns {
            return HeaderMismatchSnafu {
                field: "Columns",
                declared: declared.columns as u32,
                actual: info.width as u32,
            }
            .fail();
        }
        if info.height as u16 != declared.rows {
            return HeaderMismatchSnafu {
                field: "Rows",
                declared: declared.rows as u32,
                actual: info.height as u32,
            }
            .fail();
        }

        let samples_per_pixel = match info.pixel_format {
            PixelFormat::L8 | PixelFormat::L16 => 1,
            PixelFormat::RGB24 => 3,
            PixelFormat::CMYK32 => 4,
        };
        if samples_per_pixel != declared.samples_per_pixel {
            return HeaderMismatchSnafu {
                field: "SamplesPerPixel",
                declared: declared.samples_per_pixel as u32,
                actual: samples_per_pixel as u32,
            }
            .fail();
        }

        let bits_allocated = if matches!(info.pixel_format, PixelFormat::L16) { 16 } else { 8 };
        if bits_allocated > declared.bits_allocated {
            return PrecisionOutOfRangeSnafu {
                declared_bits: declared.bits_allocated,
                actual_bits: bits_allocated,
            }
            .fail();
        }

        // Baseline/Extended JPEG's DCT coefficients always decode to
        // unsigned samples, regardless of PixelRepresentation.
        if declared.pixel_representation != 0 {
            return SignednessMismatchSnafu {
                declared_signed: true,
                codec_signed: false,
            }
            .fail();
        }

        // Process 1/2/4 is a lossy DCT transform; it can never satisfy a
        // transfer syntax that requires a lossless codestream.
        if declared.lossless_transfer_syntax {
            return LosslessMismatchSnafu {
                expected_lossless: true,
                codestream_lossless: false,
            }
            .fail();
        }

        Ok(DecodedFrameView {
            bytes: pixels,
            bits_allocated,
            samples_per_pixel,
            planar_configuration: 0,
            photometric_interpretation: declared.photometric_interpretation.clone(),
        })
    }
}
