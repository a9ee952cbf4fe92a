//! JPEG 2000 and HT-J2K codec adapter (transfer syntaxes
//! 1.2.840.10008.1.2.4.90/.91 and the HTJ2K family), backed by two
//! independent decoders tried in turn: `hayro-jpeg2000` first, falling
//! back to the `jpeg2k` openjp2 bindings. Neither crate alone covers every
//! codestream variant a scanner may emit, so both failures are reported
//! together rather than masking one behind the other.
#![cfg(feature = "jpeg2k")]

use dcm_encoding::adapter::{
    CodecAdapter, CodecSnafu, DecodeOutputOpts, DecodeResult, DecodedFrameView, DeclaredPixelInfo,
};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Jpeg2000Adapter;

impl CodecAdapter for Jpeg2000Adapter {
    fn name(&self) -> &'static str {
        "JPEG 2000 / HT-J2K"
    }

    fn decode(
        &self,
        encoded_bytes: &[u8],
        declared: &DeclaredPixelInfo,
        opts: &DecodeOutputOpts,
    ) -> DecodeResult<DecodedFrameView> {
        match decode_with_hayro(encoded_bytes, declared, opts) {
            Ok(frame) => Ok(frame),
            Err(hayro_err) => match decode_with_openjp2(encoded_bytes, declared, opts) {
                Ok(frame) => Ok(frame),
                Err(openjp2_err) => CodecSnafu {
                    message: format!(
                        "hayro-jpeg2000 failed ({hayro_err}); jpeg2k/openjp2 fallback also failed ({openjp2_err})"
                    ),
                }
                .fail(),
            },
        }
    }
}

fn decode_with_hayro(
    encoded_bytes: &[u8],
    declared: &DeclaredPixelInfo,
    _opts: &DecodeOutputOpts,
) -> Result<DecodedFrameView, String> {
    let image = hayro_jpeg2000::decode(encoded_bytes).map_err(|e| e.to_string())?;

    if image.width() as u16 != declared.columns || image.height() as u16 != declared.rows {
        return Err(format!(
            "decoded {}x{}, declared {}x{}",
            image.width(),
            image.height(),
            declared.columns,
            declared.rows
        ));
    }

    if image.component_count() as u16 != declared.samples_per_pixel {
        return Err(format!(
            "decoded {} components, declared SamplesPerPixel {}",
            image.component_count(),
            declared.samples_per_pixel
        ));
    }

    let bits_allocated = if image.bit_depth() > 8 { 16 } else { 8 };
    if bits_allocated > declared.bits_allocated {
        return Err(format!(
            "decoded precision {bits_allocated} bits exceeds declared BitsAllocated {}",
            declared.bits_allocated
        ));
    }

    // JPEG 2000 component samples are always unsigned once de-quantized by
    // these bindings, regardless of PixelRepresentation.
    if declared.pixel_representation != 0 {
        return Err("codec produced unsigned samples but PixelRepresentation declares signed".to_owned());
    }

    if declared.lossless_transfer_syntax {
        if let Some(reversible) = codestream_is_reversible(encoded_bytes) {
            if !reversible {
                return Err("codestream uses the irreversible (lossy) wavelet transform but the transfer syntax requires a lossless codestream".to_owned());
            }
        }
    }

    Ok(DecodedFrameView {
        bytes: image.into_raw_samples(),
        bits_allocated,
        samples_per_pixel: image.component_count() as u16,
        planar_configuration: 0,
        photometric_interpretation: declared.photometric_interpretation.clone(),
    })
}

fn decode_with_openjp2(
    encoded_bytes: &[u8],
    declared: &DeclaredPixelInfo,
    _opts: &DecodeOutputOpts,
) -> Result<DecodedFrameView, String> {
    let image = jpeg2k::Image::from_bytes(encoded_bytes).map_err(|e| e.to_string())?;

    let components = image.get_components().map_err(|e| e.to_string())?;
    let width = image.width() as u16;
    let height = image.height() as u16;
    if width != declared.columns || height != declared.rows {
        return Err(format!(
            "decoded {width}x{height}, declared {}x{}",
            declared.columns, declared.rows
        ));
    }

    if components.len() as u16 != declared.samples_per_pixel {
        return Err(format!(
            "decoded {} components, declared SamplesPerPixel {}",
            components.len(),
            declared.samples_per_pixel
        ));
    }

    let bits_allocated = components
        .first()
        .map(|c| if c.precision() > 8 { 16 } else { 8 })
        .unwrap_or(8);
    if let Some(component) = components.first() {
        if component.precision() as u16 > declared.bits_allocated {
            return Err(format!(
                "decoded precision {} bits exceeds declared BitsAllocated {}",
                component.precision(),
                declared.bits_allocated
            ));
        }
    }

    // DICOM PS3.5 requires JPEG 2000 component samples to be unsigned
    // regardless of the wavelet transform's internal representation.
    if declared.pixel_representation != 0 {
        return Err("codec produces unsigned component samples but PixelRepresentation declares signed".to_owned());
    }

    if declared.lossless_transfer_syntax {
        if let Some(reversible) = codestream_is_reversible(encoded_bytes) {
            if !reversible {
                return Err("codestream uses the irreversible (lossy) wavelet transform but the transfer syntax requires a lossless codestream".to_owned());
            }
        }
    }

    let mut bytes = Vec::new();
    for component in &components {
        for sample in component.data() {
            if bits_allocated == 16 {
                bytes.extend_from_slice(&(*sample as u16).to_le_bytes());
            } else {
                bytes.push(*sample as u8);
            }
        }
    }

    Ok(DecodedFrameView {
        bytes,
        bits_allocated,
        samples_per_pixel: components.len() as u16,
        planar_configuration: 1,
        photometric_interpretation: declared.photometric_interpretation.clone(),
    })
}

/// Reads the wavelet transform used by a codestream's first tile-part COD
/// marker segment (ISO/IEC 15444-1 Table A.13): `true` for the reversible
/// 5/3 filter (lossless-capable), `false` for the irreversible 9/7 filter
/// (always lossy). Returns `None` if no COD marker is found or the
/// codestream is too short to hold one.
fn codestream_is_reversible(encoded: &[u8]) -> Option<bool> {
    const COD: [u8; 2] = [0xFF, 0x52];
    let cod_marker = encoded.windows(2).position(|w| w == COD)?;
    // COD: marker(2) + Lcod(2) + Scod(1) + SGcod(4) + decomposition levels(1)
    // + code-block width/height exponents(2) + code-block style(1) + transformation(1)
    let transformation_offset = cod_marker + 13;
    encoded.get(transformation_offset).map(|&b| b == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codestream_is_reversible_detects_5_3_filter() {
        let mut encoded = vec![0xFFu8, 0x4F]; // SOC placeholder
        encoded.extend_from_slice(&[0xFF, 0x52]); // COD marker
        encoded.extend_from_slice(&[0x00, 0x0C]); // Lcod
        encoded.push(0x00); // Scod
        encoded.extend_from_slice(&[0x00, 0x00, 0x01, 0x00]); // SGcod
        encoded.push(0x05); // decomposition levels
        encoded.extend_from_slice(&[0x04, 0x04]); // code-block exponents
        encoded.push(0x00); // code-block style
        encoded.push(0x01); // transformation = reversible
        assert_eq!(codestream_is_reversible(&encoded), Some(true));
    }

    #[test]
    fn codestream_is_reversible_detects_9_7_filter() {
        let mut encoded = vec![0xFFu8, 0x52]; // COD marker
        encoded.extend_from_slice(&[0x00, 0x0C]);
        encoded.push(0x00);
        encoded.extend_from_slice(&[0x00, 0x00, 0x01, 0x00]);
        encoded.push(0x05);
        encoded.extend_from_slice(&[0x04, 0x04]);
        encoded.push(0x00);
        encoded.push(0x00); // transformation = irreversible
        assert_eq!(codestream_is_reversible(&encoded), Some(false));
    }

    #[test]
    fn codestream_is_reversible_returns_none_without_a_cod_marker() {
        assert_eq!(codestream_is_reversible(&[0xFF, 0x4F, 0x00, 0x00]), None);
    }
}
