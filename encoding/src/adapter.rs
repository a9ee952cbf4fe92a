//! The pixel codec adapter contract.
//!
//! Each compressed transfer syntax family (JPEG, JPEG-LS, JPEG 2000,
//! HT-J2K, ...) is backed by one [`CodecAdapter`] implementation, registered
//! against its transfer syntax in `dcm-transfer-syntax`. An adapter decodes
//! one frame at a time and keeps no state across calls.

use snafu::Snafu;

/// Metadata declared by the DICOM object, handed to the adapter so it can
/// validate what it decoded against what was promised.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredPixelInfo {
    pub rows: u16,
    pub columns: u16,
    pub samples_per_pixel: u16,
    pub bits_allocated: u16,
    pub bits_stored: u16,
    pub high_bit: u16,
    pub pixel_representation: u16,
    pub planar_configuration: u16,
    pub photometric_interpretation: String,
    /// Whether the transfer syntax under which this frame was encoded
    /// constrains the codestream to lossless compression (e.g. JPEG 2000
    /// Lossless as opposed to its lossy-capable `.91` sibling).
    pub lossless_transfer_syntax: bool,
}

/// Per-call knobs an adapter may honor; the richer user-facing
/// `DecodeOptions` lives in `dcm-pixeldata` and is narrowed to this before
/// reaching an adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOutputOpts {
    /// Request a best-effort conversion to RGB for color inputs, rather
    /// than the codec's native photometric interpretation.
    pub prefer_rgb: bool,
}

/// One successfully decoded frame, native-endian and ready for the raw
/// pixel assembly stage to apply planar/byte-swap/rescale transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrameView {
    pub bytes: Vec<u8>,
    pub bits_allocated: u16,
    pub samples_per_pixel: u16,
    pub planar_configuration: u16,
    pub photometric_interpretation: String,
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum DecodeError {
    #[snafu(display("codec reported an error: {message}"))]
    Codec { message: String },
    #[snafu(display("decoded header mismatch: {field} declared {declared} but codec produced {actual}"))]
    HeaderMismatch {
        field: &'static str,
        declared: u32,
        actual: u32,
    },
    #[snafu(display("decoded sample precision {actual_bits} bits exceeds the declared BitsAllocated {declared_bits}"))]
    PrecisionOutOfRange { declared_bits: u16, actual_bits: u16 },
    #[snafu(display(
        "decoded sample signedness (signed = {codec_signed}) does not match declared PixelRepresentation (signed = {declared_signed})"
    ))]
    SignednessMismatch { declared_signed: bool, codec_signed: bool },
    #[snafu(display(
        "codestream losslessness (lossless = {codestream_lossless}) does not match what the transfer syntax requires (lossless = {expected_lossless})"
    ))]
    LosslessMismatch { expected_lossless: bool, codestream_lossless: bool },
    #[snafu(display("unsupported pixel encoding: {reason}"))]
    Unsupported { reason: String },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// A stateless, single-frame pixel codec.
pub trait CodecAdapter: Send + Sync {
    /// Human-readable name, used in diagnostics and the HT-J2K
    /// dual-adapter combined failure message.
    fn name(&self) -> &'static str;

    fn decode(
        &self,
        encoded_bytes: &[u8],
        declared: &DeclaredPixelInfo,
        opts: &DecodeOutputOpts,
    ) -> DecodeResult<DecodedFrameView>;
}
