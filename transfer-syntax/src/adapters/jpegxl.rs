//! JPEG XL codec adapter (transfer syntax 1.2.840.10008.1.2.4.110-ish
//! draft UID family), backed by the pure-Rust `jxl-oxide` decoder.
#![cfg(feature = "jpegxl")]

use jxl_oxide::{JxlImage, PixelFormat};

use dcm_encoding::adapter::{
    CodecAdapter, CodecSnafu, DecodeOutputOpts, DecodeResult, DecodedFrameView, DeclaredPixelInfo,
    HeaderMismatchSnafu, UnsupportedSnafu,
};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct JpegXlAdapter;

impl CodecAdapter for JpegXlAdapter {
    fn name(&self) -> &'static str {
        "JPEG XL"
    }

    fn decode(
        &self,
        encoded_bytes: &[u8],
        declared: &DeclaredPixelInfo,
        _opts: &DecodeOutputOpts,
    ) -> DecodeResult<DecodedFrameView> {
        let image = JxlImage::builder()
            .read(encoded_bytes)
            .map_err(|e| CodecSnafu { message: e.to_string() }.build())?;

        let header = image.image_header();
        let width = header.size.width;
        let height = header.size.height;
        if width as u16 != declared.columns {
            return HeaderMismatchSnafu {
                field: "Columns",
                declared: declared.columns as u32,
                actual: width,
            }
            .fail();
        }
        if height as u16 != declared.rows {
            return HeaderMismatchSnafu {
                field: "Rows",
                declared: declared.rows as u32,
                actual: height,
            }
            .fail();
        }

        let render = image
            .render_frame(0)
            .map_err(|e| CodecSnafu { message: e.to_string() }.build())?;
        let stream = render.stream();

        let samples_per_pixel = match stream.pixel_format() {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb => 3,
            other => {
                return UnsupportedSnafu {
                    reason: format!("JPEG XL pixel format {other:?} is not supported, only grayscale and RGB"),
                }
                .fail();
            }
        };

        let mut floats = vec![0f32; stream.width() as usize * stream.height() as usize * samples_per_pixel as usize];
        stream.write_to_buffer(&mut floats);
        let bytes: Vec<u8> = floats
            .into_iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();

        Ok(DecodedFrameView {
            bytes,
            bits_allocated: 8,
            samples_per_pixel,
            planar_configuration: 0,
            photometric_interpretation: declared.photometric_interpretation.clone(),
        })
    }
}
