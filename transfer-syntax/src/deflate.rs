//! Deflated Explicit VR Little Endian stream inflation.
//!
//! The transfer syntax uses raw DEFLATE (RFC 1951), not the zlib or gzip
//! wrapper, so `flate2`'s `DeflateDecoder` is used rather than `ZlibDecoder`.
#![cfg(feature = "deflate")]

use std::io::Read;

use flate2::read::DeflateDecoder;
use snafu::{ResultExt, Snafu};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InflateError {
    #[snafu(display("failed to inflate deflated transfer syntax stream: {source}"))]
    Inflate { source: std::io::Error },
}

/// Inflates everything after the file-meta group, returning the
/// decompressed dataset bytes.
pub fn inflate(compressed: &[u8]) -> Result<Vec<u8>, InflateError> {
    let mut decoder = DeflateDecoder::new(compressed);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).context(InflateSnafu)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn roundtrips_through_raw_deflate() {
        let original = b"\x08\x00\x00\x00\x02\x00\x00\x00CT\0";
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(original).unwrap();
        let compressed = encoder.finish().unwrap();

        let inflated = inflate(&compressed).unwrap();
        assert_eq!(inflated, original);
    }
}
