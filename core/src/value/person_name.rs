//! `PN` (Person Name) component splitting.
//!
//! A `PN` value has up to three `=`-separated component groups (alphabetic,
//! ideographic, phonetic), each of which may further split on `^` into
//! (family, given, middle, prefix, suffix).

/// The alphabetic, ideographic and phonetic component groups of a `PN`
/// value, already trimmed per the component string trimming rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonName {
    pub alphabetic: String,
    pub ideographic: Option<String>,
    pub phonetic: Option<String>,
}

impl PersonName {
    pub fn parse(value: &str) -> PersonName {
        let mut groups = value.splitn(3, '=');
        PersonName {
            alphabetic: groups.next().unwrap_or("").to_owned(),
            ideographic: groups.next().filter(|s| !s.is_empty()).map(String::from),
            phonetic: groups.next().filter(|s| !s.is_empty()).map(String::from),
        }
    }

    /// The five `^`-separated components of the alphabetic group: family,
    /// given, middle, prefix, suffix. Missing trailing components are empty.
    pub fn alphabetic_components(&self) -> [&str; 5] {
        let mut parts = self.alphabetic.split('^');
        [
            parts.next().unwrap_or(""),
            parts.next().unwrap_or(""),
            parts.next().unwrap_or(""),
            parts.next().unwrap_or(""),
            parts.next().unwrap_or(""),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_family_and_given_name() {
        let pn = PersonName::parse("DOE^JOHN");
        assert_eq!(pn.alphabetic, "DOE^JOHN");
        let [family, given, ..] = pn.alphabetic_components();
        assert_eq!(family, "DOE");
        assert_eq!(given, "JOHN");
        assert!(pn.ideographic.is_none());
    }

    #[test]
    fn handles_ideographic_component() {
        let pn = PersonName::parse("Yamada^Tarou=山田^太郎=やまだ^たろう");
        assert_eq!(pn.alphabetic, "Yamada^Tarou");
        assert_eq!(pn.ideographic.as_deref(), Some("山田^太郎"));
        assert_eq!(pn.phonetic.as_deref(), Some("やまだ^たろう"));
    }
}
