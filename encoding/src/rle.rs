//! PackBits decoding for DICOM RLE Lossless (transfer syntax
//! 1.2.840.10008.1.2.5), grounded on the segment/offset-table layout used
//! by `adapters/rle_lossless.rs`'s implementation (itself taken from
//! pydicom's RLE handler).

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RleError {
    #[snafu(display("RLE segment offset table claims {claimed} segments but only {available} bytes of fragment remain for the offset table"))]
    TruncatedOffsetTable { claimed: u32, available: usize },
    #[snafu(display("RLE segment {index} offset {offset} exceeds fragment length {len}"))]
    SegmentOutOfBounds { index: usize, offset: u32, len: usize },
    #[snafu(display("RLE control byte {control} requires a literal-run byte that is missing"))]
    TruncatedLiteralRun { control: i8 },
    #[snafu(display("RLE control byte {control} requires a replicate byte that is missing"))]
    TruncatedReplicateRun { control: i8 },
}

type Result<T> = std::result::Result<T, RleError>;

/// Reads the 16-entry RLE segment header (a 32-bit segment count followed
/// by up to 15 32-bit little-endian byte offsets) and returns the segment
/// boundaries as `(start, end)` pairs.
pub fn read_segment_offsets(fragment: &[u8]) -> Result<Vec<(usize, usize)>> {
    if fragment.len() < 4 {
        return TruncatedOffsetTableSnafu {
            claimed: 0u32,
            available: fragment.len(),
        }
        .fail();
    }
    let nr_segments = u32::from_le_bytes(fragment[0..4].try_into().unwrap());
    let header_bytes = 4 * (nr_segments as usize + 1);
    if fragment.len() < header_bytes {
        return TruncatedOffsetTableSnafu {
            claimed: nr_segments,
            available: fragment.len(),
        }
        .fail();
    }

    let mut offsets = Vec::with_capacity(nr_segments as usize + 1);
    for i in 0..nr_segments as usize {
        let raw = u32::from_le_bytes(fragment[4 + 4 * i..8 + 4 * i].try_into().unwrap());
        offsets.push(raw);
    }
    offsets.push(fragment.len() as u32);

    let mut spans = Vec::with_capacity(nr_segments as usize);
    for i in 0..nr_segments as usize {
        let start = offsets[i] as usize;
        let end = offsets[i + 1] as usize;
        if start > fragment.len() || end > fragment.len() {
            return SegmentOutOfBoundsSnafu {
                index: i,
                offset: offsets[i],
                len: fragment.len(),
            }
            .fail();
        }
        spans.push((start, end));
    }
    Ok(spans)
}

/// Decodes one PackBits-compressed byte plane.
///
/// Control byte semantics: `0..=127` copies the next `n+1`
/// literal bytes; `-1..=-127` repeats the following byte `1-n` times;
/// `-128` is a no-op.
pub fn unpack_packbits(encoded: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut pos = 0usize;
    while pos < encoded.len() && out.len() < expected_len {
        let control = encoded[pos] as i8;
        pos += 1;
        if control >= 0 {
            let count = control as usize + 1;
            let end = pos + count;
            if end > encoded.len() {
                return TruncatedLiteralRunSnafu { control }.fail();
            }
            out.extend_from_slice(&encoded[pos..end]);
            pos = end;
        } else if control != -128 {
            let count = (1 - control as i32) as usize;
            if pos >= encoded.len() {
                return TruncatedReplicateRunSnafu { control }.fail();
            }
            let byte = encoded[pos];
            pos += 1;
            out.resize(out.len() + count, byte);
        }
        // control == -128 is a no-op: consume the byte and continue.
    }
    out.truncate(expected_len);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packbits_matches_reference_vector() {
        let encoded = [
            0xFEu8, 0xAA, 0x02, 0x80, 0x00, 0x2A, 0xFD, 0xAA, 0x03, 0x80, 0x00, 0x2A, 0x22, 0xF7,
            0xAA,
        ];
        let decoded = unpack_packbits(&encoded, 24).unwrap();
        let expected = [
            0xAAu8, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0xAA, 0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0x22,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
        ];
        assert_eq!(decoded, expected);
    }

    #[test]
    fn literal_run_copies_n_plus_one_bytes() {
        let encoded = [0x02u8, 0x01, 0x02, 0x03];
        assert_eq!(unpack_packbits(&encoded, 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn no_op_control_byte_is_skipped() {
        let encoded = [0x80u8, 0x02, 0x05, 0x06];
        assert_eq!(unpack_packbits(&encoded, 2).unwrap(), vec![5, 6]);
    }

    #[test]
    fn segment_offsets_cover_whole_fragment() {
        // header: 2 segments, then their starting offsets (12, 14), then
        // 2 bytes of segment-0 data and 2 bytes of segment-1 data.
        let mut fragment = vec![];
        fragment.extend_from_slice(&2u32.to_le_bytes());
        fragment.extend_from_slice(&12u32.to_le_bytes());
        fragment.extend_from_slice(&14u32.to_le_bytes());
        fragment.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);

        let spans = read_segment_offsets(&fragment).unwrap();
        assert_eq!(spans, vec![(12, 14), (14, 16)]);
    }
}
