//! Codec adapter wiring: one [`CodecAdapter`] per encapsulated transfer
//! syntax family, selected by [`adapter_for`] from the transfer syntax's
//! flags.

#[cfg(feature = "rle")]
pub mod rle;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "jpegls")]
pub mod jpegls;
#[cfg(feature = "jpeg2k")]
pub mod jpeg2000;
#[cfg(feature = "jpegxl")]
pub mod jpegxl;

use dcm_core::TsFlags;
use dcm_encoding::adapter::CodecAdapter;

/// Resolves the codec adapter for an encapsulated transfer syntax's flags,
/// or `None` if no adapter is compiled in (feature disabled) or the
/// transfer syntax carries a family this crate does not decode (e.g.
/// MPEG-2/H.264/HEVC video streams, which are out of scope for this
/// workspace's pixel decoder).
pub fn adapter_for(flags: TsFlags) -> Option<Box<dyn CodecAdapter>> {
    #[cfg(feature = "rle")]
    if flags.contains(TsFlags::RLE) {
        return Some(Box::new(rle::RleAdapter));
    }
    #[cfg(feature = "jpeg")]
    if flags.contains(TsFlags::JPEG_BASELINE) {
        return Some(Box::new(jpeg::JpegAdapter));
    }
    #[cfg(feature = "jpegls")]
    if flags.contains(TsFlags::JPEG_LS) {
        return Some(Box::new(jpegls::JpegLsAdapter));
    }
    #[cfg(feature = "jpeg2k")]
    if flags.intersects(TsFlags::JPEG_2000 | TsFlags::HTJ2K) {
        return Some(Box::new(jpeg2000::Jpeg2000Adapter));
    }
    #[cfg(feature = "jpegxl")]
    if flags.contains(TsFlags::JPEG_XL) {
        return Some(Box::new(jpegxl::JpegXlAdapter));
    }

    let _ = flags;
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "rle")]
    fn resolves_rle_adapter() {
        let adapter = adapter_for(TsFlags::RLE).unwrap();
        assert_eq!(adapter.name(), "RLE Lossless");
    }

    #[test]
    fn video_families_have_no_adapter() {
        assert!(adapter_for(TsFlags::VIDEO_HEVC).is_none());
    }
}
