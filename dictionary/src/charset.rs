//! Specific Character Set registry, grounded on
//! `specific_character_set_registry.hpp`'s defined-term table.

/// A single member of a `SpecificCharacterSet` (0008,0005) value, i.e. one
/// defined term and the code extension behavior it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterRepertoire {
    /// The default repertoire (ISO 646 / ISO IR 6), used when the attribute
    /// is absent or empty.
    Default,
    IsoIr6,
    IsoIr100,
    IsoIr101,
    IsoIr109,
    IsoIr110,
    IsoIr144,
    IsoIr127,
    IsoIr126,
    IsoIr138,
    IsoIr148,
    IsoIr203,
    IsoIr13,
    IsoIr166,
    Iso2022Ir6,
    Iso2022Ir100,
    Iso2022Ir101,
    Iso2022Ir109,
    Iso2022Ir110,
    Iso2022Ir144,
    Iso2022Ir127,
    Iso2022Ir126,
    Iso2022Ir138,
    Iso2022Ir148,
    Iso2022Ir203,
    Iso2022Ir13,
    Iso2022Ir166,
    Iso2022Ir87,
    Iso2022Ir159,
    Iso2022Ir149,
    Iso2022Ir58,
    IsoIr192,
    Gb18030,
    Gbk,
}

impl CharacterRepertoire {
    /// Whether this repertoire is one of the `ISO 2022 IR *` code-extension
    /// variants, which may appear as a non-first term and switch code pages
    /// mid-value via escape sequences.
    pub fn uses_code_extension(self) -> bool {
        matches!(
            self,
            CharacterRepertoire::Iso2022Ir6
                | CharacterRepertoire::Iso2022Ir100
                | CharacterRepertoire::Iso2022Ir101
                | CharacterRepertoire::Iso2022Ir109
                | CharacterRepertoire::Iso2022Ir110
                | CharacterRepertoire::Iso2022Ir144
                | CharacterRepertoire::Iso2022Ir127
                | CharacterRepertoire::Iso2022Ir126
                | CharacterRepertoire::Iso2022Ir138
                | CharacterRepertoire::Iso2022Ir148
                | CharacterRepertoire::Iso2022Ir203
                | CharacterRepertoire::Iso2022Ir13
                | CharacterRepertoire::Iso2022Ir166
                | CharacterRepertoire::Iso2022Ir87
                | CharacterRepertoire::Iso2022Ir159
                | CharacterRepertoire::Iso2022Ir149
                | CharacterRepertoire::Iso2022Ir58
        )
    }

    /// Whether this repertoire is natively UTF-8 (no 8-bit code page
    /// translation needed once trailing padding is trimmed).
    pub fn is_utf8_native(self) -> bool {
        matches!(self, CharacterRepertoire::IsoIr192 | CharacterRepertoire::Gb18030)
    }

    pub fn defined_term(self) -> &'static str {
        match self {
            CharacterRepertoire::Default | CharacterRepertoire::IsoIr6 => "ISO_IR 6",
            CharacterRepertoire::IsoIr100 => "ISO_IR 100",
            CharacterRepertoire::IsoIr101 => "ISO_IR 101",
            CharacterRepertoire::IsoIr109 => "ISO_IR 109",
            CharacterRepertoire::IsoIr110 => "ISO_IR 110",
            CharacterRepertoire::IsoIr144 => "ISO_IR 144",
            CharacterRepertoire::IsoIr127 => "ISO_IR 127",
            CharacterRepertoire::IsoIr126 => "ISO_IR 126",
            CharacterRepertoire::IsoIr138 => "ISO_IR 138",
            CharacterRepertoire::IsoIr148 => "ISO_IR 148",
            CharacterRepertoire::IsoIr203 => "ISO_IR 203",
            CharacterRepertoire::IsoIr13 => "ISO_IR 13",
            CharacterRepertoire::IsoIr166 => "ISO_IR 166",
            CharacterRepertoire::Iso2022Ir6 => "ISO 2022 IR 6",
            CharacterRepertoire::Iso2022Ir100 => "ISO 2022 IR 100",
            CharacterRepertoire::Iso2022Ir101 => "ISO 2022 IR 101",
            CharacterRepertoire::Iso2022Ir109 => "ISO 2022 IR 109",
            CharacterRepertoire::Iso2022Ir110 => "ISO 2022 IR 110",
            CharacterRepertoire::Iso2022Ir144 => "ISO 2022 IR 144",
            CharacterRepertoire::Iso2022Ir127 => "ISO 2022 IR 127",
            CharacterRepertoire::Iso2022Ir126 => "ISO 2022 IR 126",
            CharacterRepertoire::Iso2022Ir138 => "ISO 2022 IR 138",
            CharacterRepertoire::Iso2022Ir148 => "ISO 2022 IR 148",
            CharacterRepertoire::Iso2022Ir203 => "ISO 2022 IR 203",
            CharacterRepertoire::Iso2022Ir13 => "ISO 2022 IR 13",
            CharacterRepertoire::Iso2022Ir166 => "ISO 2022 IR 166",
            CharacterRepertoire::Iso2022Ir87 => "ISO 2022 IR 87",
            CharacterRepertoire::Iso2022Ir159 => "ISO 2022 IR 159",
            CharacterRepertoire::Iso2022Ir149 => "ISO 2022 IR 149",
            CharacterRepertoire::Iso2022Ir58 => "ISO 2022 IR 58",
            CharacterRepertoire::IsoIr192 => "ISO_IR 192",
            CharacterRepertoire::Gb18030 => "GB18030",
            CharacterRepertoire::Gbk => "GBK",
        }
    }
}

static DEFINED_TERMS: phf::Map<&'static str, CharacterRepertoire> = phf::phf_map! {
    "" => CharacterRepertoire::Default,
    "ISO_IR 6" => CharacterRepertoire::IsoIr6,
    "ISO_IR 100" => CharacterRepertoire::IsoIr100,
    "ISO_IR 101" => CharacterRepertoire::IsoIr101,
    "ISO_IR 109" => CharacterRepertoire::IsoIr109,
    "ISO_IR 110" => CharacterRepertoire::IsoIr110,
    "ISO_IR 144" => CharacterRepertoire::IsoIr144,
    "ISO_IR 127" => CharacterRepertoire::IsoIr127,
    "ISO_IR 126" => CharacterRepertoire::IsoIr126,
    "ISO_IR 138" => CharacterRepertoire::IsoIr138,
    "ISO_IR 148" => CharacterRepertoire::IsoIr148,
    "ISO_IR 203" => CharacterRepertoire::IsoIr203,
    "ISO_IR 13" => CharacterRepertoire::IsoIr13,
    "ISO_IR 166" => CharacterRepertoire::IsoIr166,
    "ISO 2022 IR 6" => CharacterRepertoire::Iso2022Ir6,
    "ISO 2022 IR 100" => CharacterRepertoire::Iso2022Ir100,
    "ISO 2022 IR 101" => CharacterRepertoire::Iso2022Ir101,
    "ISO 2022 IR 109" => CharacterRepertoire::Iso2022Ir109,
    "ISO 2022 IR 110" => CharacterRepertoire::Iso2022Ir110,
    "ISO 2022 IR 144" => CharacterRepertoire::Iso2022Ir144,
    "ISO 2022 IR 127" => CharacterRepertoire::Iso2022Ir127,
    "ISO 2022 IR 126" => CharacterRepertoire::Iso2022Ir126,
    "ISO 2022 IR 138" => CharacterRepertoire::Iso2022Ir138,
    "ISO 2022 IR 148" => CharacterRepertoire::Iso2022Ir148,
    "ISO 2022 IR 203" => CharacterRepertoire::Iso2022Ir203,
    "ISO 2022 IR 13" => CharacterRepertoire::Iso2022Ir13,
    "ISO 2022 IR 166" => CharacterRepertoire::Iso2022Ir166,
    "ISO 2022 IR 87" => CharacterRepertoire::Iso2022Ir87,
    "ISO 2022 IR 159" => CharacterRepertoire::Iso2022Ir159,
    "ISO 2022 IR 149" => CharacterRepertoire::Iso2022Ir149,
    "ISO 2022 IR 58" => CharacterRepertoire::Iso2022Ir58,
    "ISO_IR 192" => CharacterRepertoire::IsoIr192,
    "GB18030" => CharacterRepertoire::Gb18030,
    "GBK" => CharacterRepertoire::Gbk,
};

/// Resolves one `\`-separated term of a (0008,0005) value. The defined term
/// is matched after trimming trailing space padding; an unrecognized term
/// yields `None` rather than falling back silently (callers decide whether
/// to treat that as fatal).
pub fn from_defined_term(term: &str) -> Option<CharacterRepertoire> {
    DEFINED_TERMS.get(term.trim_end_matches(' ')).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_term_is_default_repertoire() {
        assert_eq!(from_defined_term(""), Some(CharacterRepertoire::Default));
    }

    #[test]
    fn latin1_and_code_extension_variants_resolve() {
        assert_eq!(from_defined_term("ISO_IR 100"), Some(CharacterRepertoire::IsoIr100));
        assert_eq!(from_defined_term("ISO 2022 IR 100"), Some(CharacterRepertoire::Iso2022Ir100));
        assert!(CharacterRepertoire::Iso2022Ir100.uses_code_extension());
        assert!(!CharacterRepertoire::IsoIr100.uses_code_extension());
    }

    #[test]
    fn utf8_repertoires_are_flagged() {
        assert!(CharacterRepertoire::IsoIr192.is_utf8_native());
        assert!(!CharacterRepertoire::IsoIr6.is_utf8_native());
    }

    #[test]
    fn unknown_term_is_none() {
        assert_eq!(from_defined_term("ISO_IR 999"), None);
    }

    #[test]
    fn trailing_padding_is_trimmed() {
        assert_eq!(from_defined_term("ISO_IR 100 "), Some(CharacterRepertoire::IsoIr100));
    }
}
