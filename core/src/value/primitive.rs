//! VR-dispatched scalar/vector/string conversions.

use smallvec::SmallVec;

use crate::endian::{f32_get, f64_get, u16_rw, u32_rw, u64_rw};
use crate::error::{Error, LengthMismatchSnafu};
use crate::tag::Tag;
use crate::vr::Vr;

/// How a string VR's value is trimmed and (optionally) split on `\`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringTrim {
    pub trim_leading: bool,
    pub trim_trailing: bool,
    pub splits: bool,
}

/// Resolves the trimming/splitting rule for a string VR. Returns `None` for
/// VRs that are not string VRs (callers should check
/// `vr.classification()` first).
pub fn string_trim_class(vr: Vr) -> Option<StringTrim> {
    match &vr.code() {
        b"AE" | b"AS" | b"CS" | b"DA" | b"DS" | b"DT" | b"IS" | b"LO" | b"PN" | b"SH" | b"TM"
        | b"UI" => Some(StringTrim {
            trim_leading: true,
            trim_trailing: true,
            splits: true,
        }),
        b"UR" => Some(StringTrim {
            trim_leading: true,
            trim_trailing: true,
            splits: false,
        }),
        b"UC" => Some(StringTrim {
            trim_leading: false,
            trim_trailing: true,
            splits: true,
        }),
        b"LT" | b"ST" | b"UT" => Some(StringTrim {
            trim_leading: false,
            trim_trailing: true,
            splits: false,
        }),
        _ => None,
    }
}

fn is_pad(b: u8) -> bool {
    b == b' ' || b == 0
}

fn trim_bytes(bytes: &[u8], trim: StringTrim) -> &[u8] {
    let mut start = 0;
    let mut end = bytes.len();
    if trim.trim_leading {
        while start < end && is_pad(bytes[start]) {
            start += 1;
        }
    }
    if trim.trim_trailing {
        while end > start && is_pad(bytes[end - 1]) {
            end -= 1;
        }
    }
    &bytes[start..end]
}

/// Splits and trims a string-VR value into its component views.
///
/// Zero-length values produce an empty vector (VM=0).
pub fn string_views(bytes: &[u8], vr: Vr) -> Result<Vec<String>, Error> {
    let Some(trim) = string_trim_class(vr) else {
        let text = String::from_utf8_lossy(trim_bytes(bytes, StringTrim {
            trim_leading: false,
            trim_trailing: true,
            splits: false,
        }))
        .into_owned();
        return Ok(if text.is_empty() { vec![] } else { vec![text] });
    };

    if bytes.is_empty() {
        return Ok(vec![]);
    }

    let trimmed = trim_bytes(bytes, trim);
    if trimmed.is_empty() {
        return Ok(vec![]);
    }

    let text = String::from_utf8_lossy(trimmed);
    if trim.splits {
        Ok(text.split('\\').map(|s| s.to_owned()).collect())
    } else {
        Ok(vec![text.into_owned()])
    }
}

/// Trims a `UI` value's trailing NUL/space padding.
pub fn uid_string(bytes: &[u8]) -> String {
    let trimmed = trim_bytes(
        bytes,
        StringTrim {
            trim_leading: false,
            trim_trailing: true,
            splits: false,
        },
    );
    String::from_utf8_lossy(trimmed).into_owned()
}

/// Value multiplicity.
pub fn vm_of(bytes: &[u8], vr: Vr) -> usize {
    let fixed = vr.fixed_element_size();
    if fixed > 0 {
        return if bytes.is_empty() { 0 } else { bytes.len() / fixed };
    }
    match &vr.code() {
        b"LT" | b"ST" | b"UT" | b"UR" | b"OB" | b"OW" | b"OD" | b"OL" | b"OF" | b"SQ" | b"UN" => {
            if bytes.is_empty() {
                0
            } else {
                1
            }
        }
        _ => {
            if bytes.is_empty() {
                0
            } else {
                let trimmed = trim_bytes(
                    bytes,
                    StringTrim {
                        trim_leading: true,
                        trim_trailing: true,
                        splits: true,
                    },
                );
                if trimmed.is_empty() {
                    0
                } else {
                    trimmed.iter().filter(|&&b| b == b'\\').count() + 1
                }
            }
        }
    }
}

/// Parses an `IS` (integer string) token: optional sign, decimal digits,
/// strict full-token parse.
fn parse_is_token(token: &str) -> Option<i64> {
    let t = token.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<i64>().ok()
}

/// Parses a `DS` (decimal string) token with a libc-`strtod`-like grammar:
/// the full token must be consumed, no trailing garbage tolerated.
fn parse_ds_token(token: &str) -> Option<f64> {
    let t = token.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok()
}

/// DS→integer coercion succeeds only when the value is within `1e-9` of its
/// nearest integer.
fn ds_to_integer(value: f64) -> Option<i64> {
    let rounded = value.round();
    if (value - rounded).abs() <= 1e-9 {
        Some(rounded as i64)
    } else {
        None
    }
}

fn numeric_tokens(bytes: &[u8]) -> Vec<String> {
    let trimmed = trim_bytes(
        bytes,
        StringTrim {
            trim_leading: true,
            trim_trailing: true,
            splits: true,
        },
    );
    if trimmed.is_empty() {
        return vec![];
    }
    String::from_utf8_lossy(trimmed)
        .split('\\')
        .map(|s| s.to_owned())
        .collect()
}

/// Decodes the full value multiplicity of an integral scalar VR into `i64`.
pub fn to_i64_vector(
    tag: Tag,
    bytes: &[u8],
    vr: Vr,
    little_endian: bool,
) -> Result<SmallVec<[i64; 4]>, Error> {
    match &vr.code() {
        b"SS" => fixed_width_vector(tag, bytes, 2, |b| i16_rw_get(b, little_endian) as i64),
        b"US" => fixed_width_vector(tag, bytes, 2, |b| u16_rw::get(b, little_endian) as i64),
        b"SL" => fixed_width_vector(tag, bytes, 4, |b| i32_rw_get(b, little_endian) as i64),
        b"UL" => fixed_width_vector(tag, bytes, 4, |b| u32_rw::get(b, little_endian) as i64),
        b"SV" => fixed_width_vector(tag, bytes, 8, |b| i64_rw_get(b, little_endian)),
        b"UV" => fixed_width_vector(tag, bytes, 8, |b| u64_rw::get(b, little_endian) as i64),
        b"IS" => {
            let mut out = SmallVec::new();
            for tok in numeric_tokens(bytes) {
                if tok.is_empty() {
                    continue;
                }
                let v = parse_is_token(&tok).context_tag(tag, "malformed IS token")?;
                out.push(v);
            }
            Ok(out)
        }
        b"DS" => {
            let mut out = SmallVec::new();
            for tok in numeric_tokens(bytes) {
                if tok.is_empty() {
                    continue;
                }
                let v = parse_ds_token(&tok).context_tag(tag, "malformed DS token")?;
                let i = ds_to_integer(v).context_tag(tag, "DS value is not integer-valued")?;
                out.push(i);
            }
            Ok(out)
        }
        _ => LengthMismatchSnafu {
            tag,
            reason: format!("VR {vr} has no integral scalar interpretation"),
        }
        .fail(),
    }
}

pub fn to_i32_vector(tag: Tag, bytes: &[u8], vr: Vr, le: bool) -> Result<SmallVec<[i32; 4]>, Error> {
    let wide = to_i64_vector(tag, bytes, vr, le)?;
    wide.into_iter()
        .map(|v| i32::try_from(v).map_err(|_| Error::OutOfRange { tag }))
        .collect()
}

pub fn to_i16_vector(tag: Tag, bytes: &[u8], vr: Vr, le: bool) -> Result<SmallVec<[i16; 4]>, Error> {
    let wide = to_i64_vector(tag, bytes, vr, le)?;
    wide.into_iter()
        .map(|v| i16::try_from(v).map_err(|_| Error::OutOfRange { tag }))
        .collect()
}

/// Decodes the full value multiplicity of a numeric VR into `f64`. `FL`/`FD`
/// are native, `DS` parses decimals, `IS` yields exact integers as doubles.
pub fn to_f64_vector(tag: Tag, bytes: &[u8], vr: Vr, little_endian: bool) -> Result<SmallVec<[f64; 4]>, Error> {
    match &vr.code() {
        b"FL" => fixed_width_vector(tag, bytes, 4, |b| f32_get(b, little_endian) as f64),
        b"FD" => fixed_width_vector(tag, bytes, 8, |b| f64_get(b, little_endian)),
        b"DS" => {
            let mut out = SmallVec::new();
            for tok in numeric_tokens(bytes) {
                if tok.is_empty() {
                    continue;
                }
                out.push(parse_ds_token(&tok).context_tag(tag, "malformed DS token")?);
            }
            Ok(out)
        }
        b"IS" => Ok(to_i64_vector(tag, bytes, vr, little_endian)?
            .into_iter()
            .map(|v| v as f64)
            .collect()),
        _ => LengthMismatchSnafu {
            tag,
            reason: format!("VR {vr} has no floating-point interpretation"),
        }
        .fail(),
    }
}

/// Decodes `AT`: groups of 4 bytes as `(u16, u16)` tag pairs, in dataset
/// endianness.
pub fn to_tag_vector(tag: Tag, bytes: &[u8], little_endian: bool) -> Result<SmallVec<[Tag; 2]>, Error> {
    if bytes.len() % 4 != 0 {
        return LengthMismatchSnafu {
            tag,
            reason: "AT value length is not a multiple of 4",
        }
        .fail();
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| {
            let g = u16_rw::get(&c[0..2], little_endian);
            let e = u16_rw::get(&c[2..4], little_endian);
            Tag::from((g, e))
        })
        .collect())
}

fn fixed_width_vector<T, F>(
    tag: Tag,
    bytes: &[u8],
    width: usize,
    mut decode: F,
) -> Result<SmallVec<[T; 4]>, Error>
where
    F: FnMut(&[u8]) -> T,
{
    if bytes.len() % width != 0 {
        return LengthMismatchSnafu {
            tag,
            reason: format!("value length {} is not a multiple of {}", bytes.len(), width),
        }
        .fail();
    }
    Ok(bytes.chunks_exact(width).map(|c| decode(c)).collect())
}

fn i16_rw_get(bytes: &[u8], le: bool) -> i16 {
    let u = u16_rw::get(bytes, le);
    u as i16
}

fn i32_rw_get(bytes: &[u8], le: bool) -> i32 {
    let u = u32_rw::get(bytes, le);
    u as i32
}

fn i64_rw_get(bytes: &[u8], le: bool) -> i64 {
    let u = u64_rw::get(bytes, le);
    u as i64
}

trait OptionContextTag<T> {
    fn context_tag(self, tag: Tag, reason: &str) -> Result<T, Error>;
}

impl<T> OptionContextTag<T> for Option<T> {
    fn context_tag(self, tag: Tag, reason: &str) -> Result<T, Error> {
        self.ok_or_else(|| Error::LengthMismatch {
            tag,
            reason: reason.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_split_rules_by_vr_class() {
        assert_eq!(
            string_views(b"DOE^JOHN ", Vr::PN).unwrap(),
            vec!["DOE^JOHN"]
        );
        assert_eq!(
            string_views(b" A \\B\\ C ", Vr::LO).unwrap(),
            vec![" A ", "B", " C"].into_iter().map(String::from).collect::<Vec<_>>()
        );
    }

    #[test]
    fn empty_string_value_has_vm_zero() {
        assert_eq!(vm_of(b"", Vr::LO), 0);
        assert_eq!(string_views(b"", Vr::LO).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn ds_parsing_scientific_and_padding() {
        let tag = Tag::from((0x0010, 0x0000));
        let v = to_f64_vector(tag, b"1.0e2", Vr::DS, true).unwrap();
        assert_eq!(v.as_slice(), &[100.0]);

        let v = to_f64_vector(tag, b" 100 ", Vr::DS, true).unwrap();
        assert_eq!(v.as_slice(), &[100.0]);

        let v = to_f64_vector(tag, b"100\\200", Vr::DS, true).unwrap();
        assert_eq!(v.as_slice(), &[100.0, 200.0]);
    }

    #[test]
    fn ds_integer_coercion_tolerance() {
        assert_eq!(ds_to_integer(100.0), Some(100));
        assert_eq!(ds_to_integer(100.0000000001), Some(100));
        assert_eq!(ds_to_integer(100.1), None);
    }

    #[test]
    fn at_decodes_tag_pairs() {
        let tag = Tag::from((0x0008, 0x1170));
        let bytes = [0x10, 0x00, 0x20, 0x00, 0x10, 0x00, 0x21, 0x00];
        let v = to_tag_vector(tag, &bytes, true).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0], Tag::from((0x0010, 0x0020)));
        assert_eq!(v[1], Tag::from((0x0010, 0x0021)));
    }

    #[test]
    fn vm_counts_fixed_width_elements() {
        let bytes = [1u8, 0, 2, 0, 3, 0];
        assert_eq!(vm_of(&bytes, Vr::US), 3);
    }
}
