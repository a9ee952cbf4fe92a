//! JPEG-LS codec adapter (transfer syntaxes 1.2.840.10008.1.2.4.80/.81),
//! backed by the `charls` bindings to the reference CharLS implementation.
#![cfg(feature = "jpegls")]

use charls::CharLSError;

use dcm_encoding::adapter::{
    CodecAdapter, CodecSnafu, DecodeOutputOpts, DecodeResult, DecodedFrameView, DeclaredPixelInfo,
    HeaderMismatchSnafu, LosslessMismatchSnafu, PrecisionOutOfRangeSnafu, SignednessMismatchSnafu,
};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct JpegLsAdapter;

impl CodecAdapter for JpegLsAdapter {
    fn name(&self) -> &'static str {
        "JPEG-LS"
    }

    fn decode(
        &self,
        encoded_bytes: &[u8],
        declared: &DeclaredPixelInfo,
        _opts: &DecodeOutputOpts,
    ) -> DecodeResult<DecodedFrameView> {
        let decoded = charls::decode(encoded_bytes).map_err(|e: CharLSError| {
            CodecSnafu { message: e.to_string() }.build()
        })?;
        let frame_info = decoded.frame_info();

        if frame_info.width as u16 != declared.columns {
            return HeaderMismatchSnafu {
                field: "Columns",
                declared: declared.columns as u32,
                actual: frame_info.width as u32,
            }
            .fail();
        }
        if frame_info.height as u16 != declared.rows {
            return HeaderMismatchSnafu {
                field: "Rows",
                declared: declared.rows as u32,
                actual: frame_info.height as u32,
            }
            .fail();
        }

        if frame_info.component_count as u16 != declared.samples_per_pixel {
            return HeaderMismatchSnafu {
                field: "SamplesPerPixel",
                declared: declared.samples_per_pixel as u32,
                actual: frame_info.component_count as u32,
            }
            .fail();
        }

        let bits_allocated = if frame_info.bits_per_sample > 8 { 16 } else { 8 };
        if frame_info.bits_per_sample as u16 > declared.bits_allocated {
            return PrecisionOutOfRangeSnafu {
                declared_bits: declared.bits_allocated,
                actual_bits: frame_info.bits_per_sample as u16,
            }
            .fail();
        }

        // ISO/IEC 14495-1 samples are always unsigned, regardless of
        // PixelRepresentation.
        if declared.pixel_representation != 0 {
            return SignednessMismatchSnafu {
                declared_signed: true,
                codec_signed: false,
            }
            .fail();
        }

        if declared.lossless_transfer_syntax {
            if let Some(near) = scan_near_lossless(encoded_bytes) {
                if near != 0 {
                    return LosslessMismatchSnafu {
                        expected_lossless: true,
                        codestream_lossless: false,
                    }
                    .fail();
                }
            }
        }

        Ok(DecodedFrameView {
            bytes: decoded.into_bytes(),
            bits_allocated,
            samples_per_pixel: frame_info.component_count as u16,
            planar_configuration: 0,
            photometric_interpretation: declared.photometric_interpretation.clone(),
        })
    }
}

/// Reads the NEAR parameter (the near-lossless error bound, 0 for a
/// mathematically lossless scan) out of the first JPEG-LS scan header
/// (ISO/IEC 14495-1 Annex C.2.3). Returns `None` if no scan header is found
/// or the codestream is too short to hold one, in which case the caller
/// skips the lossless check rather than reject a file it can't parse.
fn scan_near_lossless(encoded: &[u8]) -> Option<u8> {
    const SOS: [u8; 2] = [0xFF, 0xDA];
    let sos_marker = encoded.windows(2).position(|w| w == SOS)?;
    // Scan header: marker(2) + Lsc(2) + Ns(1) + Ns * (Cs, Tm) + NEAR(1) + ILV(1)
    let ns_offset = sos_marker + 4;
    let ns = *encoded.get(ns_offset)? as usize;
    let near_offset = ns_offset + 1 + 2 * ns;
    encoded.get(near_offset).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_near_lossless_reads_zero_for_lossless_scan() {
        let mut encoded = vec![0xFFu8, 0xF7]; // SOF55 placeholder, not parsed
        encoded.extend_from_slice(&[0xFF, 0xDA]); // SOS marker
        encoded.extend_from_slice(&[0x00, 0x08]); // Lsc
        encoded.push(0x01); // Ns = 1
        encoded.extend_from_slice(&[0x01, 0x00]); // Cs, Tm
        encoded.push(0x00); // NEAR = 0 (lossless)
        encoded.push(0x00); // ILV
        assert_eq!(scan_near_lossless(&encoded), Some(0));
    }

    #[test]
    fn scan_near_lossless_reads_nonzero_for_near_lossless_scan() {
        let mut encoded = vec![0xFFu8, 0xDA]; // SOS marker
        encoded.extend_from_slice(&[0x00, 0x08]); // Lsc
        encoded.push(0x01); // Ns = 1
        encoded.extend_from_slice(&[0x01, 0x00]); // Cs, Tm
        encoded.push(0x03); // NEAR = 3
        encoded.push(0x00); // ILV
        assert_eq!(scan_near_lossless(&encoded), Some(3));
    }

    #[test]
    fn scan_near_lossless_returns_none_without_a_scan_header() {
        assert_eq!(scan_near_lossless(&[0xFF, 0xD8, 0x00, 0x01]), None);
    }
}
