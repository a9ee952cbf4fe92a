//! Encapsulated pixel data reconstruction: Basic Offset
//! Table parsing, fragment collection, and BOT-driven or marker-inferred
//! frame assembly.

use dcm_core::pixel::{PixelFragment, PixelFrame, PixelSequence};
use dcm_core::{tag, Stream, TsFlags};

use crate::error::{Result, UndefinedFragmentLengthSnafu};
use crate::header::UNDEFINED_LENGTH;

struct RawFragment {
    /// Offset relative to the start of the first fragment item's value,
    /// comparable to Basic Offset Table entries.
    offset: u64,
    length: u64,
}

/// Reconstructs a [`PixelSequence`] starting right after an encapsulated
/// PixelData element's header (cursor positioned at the first item).
pub fn reconstruct_pixel_sequence(cursor: &mut Stream, little_endian: bool, ts_flags: TsFlags) -> Result<PixelSequence> {
    let bot_tag = cursor.get_tag(little_endian)?;
    if bot_tag != tag::ITEM {
        tracing::warn!(tag = %bot_tag, "pixel data scope does not start with a Basic Offset Table item");
        return Ok(PixelSequence::new(None, Vec::new(), cursor.sub_stream(0)));
    }
    let bot_len = cursor.get_u32(little_endian)?;

    let basic_offset_table = if bot_len == 0 {
        None
    } else {
        let bytes = cursor.try_read(bot_len as u64)?;
        Some(
            bytes
                .as_slice()
                .chunks_exact(4)
                .map(|c| {
                    let arr = [c[0], c[1], c[2], c[3]];
                    if little_endian {
                        u32::from_le_bytes(arr)
                    } else {
                        u32::from_be_bytes(arr)
                    }
                })
                .collect::<Vec<u32>>(),
        )
    };

    let frame_stream = cursor.sub_stream(cursor.remaining());
    let first_fragment_base = cursor.tell();

    let mut fragments = Vec::new();
    loop {
        if cursor.is_at_end() {
            break;
        }
        let item_tag = cursor.get_tag(little_endian)?;
        let item_len = cursor.get_u32(little_endian)?;

        if item_tag == tag::SEQUENCE_DELIMITATION {
            break;
        }
        if item_tag != tag::ITEM {
            tracing::warn!(tag = %item_tag, "invalid item tag in pixel data scope, stopping fragment collection");
            break;
        }
        if item_len == UNDEFINED_LENGTH {
            return UndefinedFragmentLengthSnafu { tag: item_tag }.fail();
        }

        let absolute_start = cursor.tell();
        cursor.skip(item_len as u64)?;
        fragments.push(RawFragment {
            offset: absolute_start - first_fragment_base,
            length: item_len as u64,
        });
    }

    let total_len = fragments.last().map(|f| f.offset + f.length).unwrap_or(0);

    let frames = match &basic_offset_table {
        Some(bot) if !bot.is_empty() => assemble_bot_driven(bot, &fragments, total_len),
        _ => assemble_marker_inferred(&fragments, &frame_stream, ts_flags),
    };

    Ok(PixelSequence::new(basic_offset_table, frames, frame_stream))
}

fn assemble_bot_driven(bot: &[u32], fragments: &[RawFragment], total_len: u64) -> Vec<PixelFrame> {
    let mut by_offset: Vec<(usize, u64)> = bot.iter().enumerate().map(|(i, &o)| (i, o as u64)).collect();
    by_offset.sort_by_key(|&(_, o)| o);

    let mut frames: Vec<Option<PixelFrame>> = (0..bot.len()).map(|_| None).collect();
    for (i, &(orig_index, start)) in by_offset.iter().enumerate() {
        let end = by_offset.get(i + 1).map(|&(_, o)| o).unwrap_or(total_len);
        let frags = fragments
            .iter()
            .filter(|f| f.offset >= start && f.offset < end)
            .map(|f| PixelFragment { offset: f.offset, length: f.length })
            .collect();
        frames[orig_index] = Some(PixelFrame::new(frags));
    }

    frames.into_iter().map(|f| f.unwrap_or_else(|| PixelFrame::new(Vec::new()))).collect()
}

fn assemble_marker_inferred(fragments: &[RawFragment], frame_stream: &Stream, flags: TsFlags) -> Vec<PixelFrame> {
    let mut frames: Vec<Vec<PixelFragment>> = Vec::new();
    let mut current: Vec<PixelFragment> = Vec::new();
    let mut force_new_on_next = false;

    for frag in fragments {
        let bytes = frame_stream.get_span(frag.offset, frag.length).ok();
        let slice = bytes.as_ref().map(|b| b.as_slice()).unwrap_or(&[]);

        let starts_new = if flags.contains(TsFlags::FFD9_TERMINATED) {
            force_new_on_next
        } else if flags.contains(TsFlags::JPEG_XL) {
            starts_with_ff0a(slice)
        } else if flags.contains(TsFlags::VIDEO_H264) {
            h264_starts_new_frame(slice)
        } else if flags.contains(TsFlags::VIDEO_HEVC) {
            hevc_starts_new_frame(slice)
        } else if flags.contains(TsFlags::VIDEO_MPEG2) {
            mpeg2_starts_new_frame(slice)
        } else {
            true
        };

        if starts_new && !current.is_empty() {
            frames.push(std::mem::take(&mut current));
        }
        current.push(PixelFragment { offset: frag.offset, length: frag.length });

        if flags.contains(TsFlags::FFD9_TERMINATED) {
            force_new_on_next = ends_with_ffd9(slice);
        }
    }

    if !current.is_empty() {
        frames.push(current);
    }

    frames.into_iter().map(PixelFrame::new).collect()
}

fn ends_with_ffd9(bytes: &[u8]) -> bool {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == 0x00 {
        end -= 1;
    }
    end >= 2 && bytes[end - 2] == 0xFF && bytes[end - 1] == 0xD9
}

fn starts_with_ff0a(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0x0A
}

fn find_annex_b_start_code(data: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            return Some(i + 3);
        }
        i += 1;
    }
    None
}

fn h264_starts_new_frame(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(16 * 1024)];
    match find_annex_b_start_code(window) {
        Some(pos) => match bytes.get(pos) {
            Some(&nal_byte) => matches!(nal_byte & 0x1F, 1 | 5 | 9),
            None => false,
        },
        None => false,
    }
}

fn hevc_starts_new_frame(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(16 * 1024)];
    match find_annex_b_start_code(window) {
        Some(pos) => match bytes.get(pos) {
            Some(&nal_byte) => {
                let nal_type = (nal_byte >> 1) & 0x3F;
                nal_type <= 31 || nal_type == 35
            }
            None => false,
        },
        None => false,
    }
}

fn mpeg2_starts_new_frame(bytes: &[u8]) -> bool {
    match find_annex_b_start_code(bytes) {
        Some(pos) => match bytes.get(pos) {
            Some(&marker) => matches!(marker, 0x00 | 0xB3 | 0xB8),
            None => false,
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xFFFEu16.to_le_bytes());
        out.extend_from_slice(&0xE000u16.to_le_bytes());
        out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(bytes);
        out
    }

    #[test]
    fn reconstructs_single_frame_without_bot() {
        let mut bytes = Vec::new();
        bytes.extend(item(&[])); // empty BOT
        bytes.extend(item(&[1, 2, 3, 4]));

        let mut cursor = Stream::from_owned(bytes);
        let seq = reconstruct_pixel_sequence(&mut cursor, true, TsFlags::empty()).unwrap();
        assert_eq!(seq.number_of_frames(), 1);
        assert_eq!(seq.frame(0).unwrap().fragments().len(), 1);
    }

    #[test]
    fn bot_driven_assembly_groups_fragments_by_offset_span() {
        let frag_a = vec![0xAAu8; 4];
        let frag_b = vec![0xBBu8; 4];
        let frag_c = vec![0xCCu8; 4];

        let mut bot_bytes = Vec::new();
        bot_bytes.extend_from_slice(&0u32.to_le_bytes());
        bot_bytes.extend_from_slice(&8u32.to_le_bytes());

        let mut bytes = Vec::new();
        bytes.extend(item(&bot_bytes));
        bytes.extend(item(&frag_a));
        bytes.extend(item(&frag_b));
        bytes.extend(item(&frag_c));

        let mut cursor = Stream::from_owned(bytes);
        let seq = reconstruct_pixel_sequence(&mut cursor, true, TsFlags::empty()).unwrap();
        assert_eq!(seq.number_of_frames(), 2);
        assert_eq!(seq.frame(0).unwrap().fragments().len(), 1);
        assert_eq!(seq.frame(1).unwrap().fragments().len(), 2);
    }

    #[test]
    fn ffd9_terminated_marker_inference_splits_on_eoi() {
        let mut frag1 = vec![0xFF, 0xD8, 0x00, 0x00];
        frag1.extend_from_slice(&[0xFF, 0xD9]);
        let frag2 = vec![0xFF, 0xD8, 0xFF, 0xD9];

        let mut bytes = Vec::new();
        bytes.extend(item(&[])); // no BOT
        bytes.extend(item(&frag1));
        bytes.extend(item(&frag2));

        let mut cursor = Stream::from_owned(bytes);
        let seq = reconstruct_pixel_sequence(&mut cursor, true, TsFlags::JPEG_BASELINE | TsFlags::FFD9_TERMINATED).unwrap();
        assert_eq!(seq.number_of_frames(), 2);
    }
}
