//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html)
//!
//! Only the references that show up in ordinary documents are known by name.
//! Anything else is left in the text as written.

/// Named references the tokenizer decodes, without the `&` and `;`.
const NAMED_CHARACTER_REFERENCES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
    ("copy", '\u{00A9}'),
    ("reg", '\u{00AE}'),
    ("hellip", '\u{2026}'),
    ("mdash", '\u{2014}'),
    ("ndash", '\u{2013}'),
];

/// Look up a named reference such as `amp`.
#[must_use]
pub fn lookup_named(name: &str) -> Option<char> {
    NAMED_CHARACTER_REFERENCES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|&(_, c)| c)
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is 0x00 ... greater than 0x10FFFF ... a surrogate ...
/// set the character reference code to 0xFFFD."
#[must_use]
pub fn numeric_to_char(code: u32) -> char {
    if code == 0 {
        return char::REPLACEMENT_CHARACTER;
    }
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_lookup() {
        assert_eq!(lookup_named("amp"), Some('&'));
        assert_eq!(lookup_named("nbsp"), Some('\u{00A0}'));
        assert_eq!(lookup_named("bogus"), None);
    }

    #[test]
    fn test_numeric_out_of_range_is_replacement() {
        assert_eq!(numeric_to_char(0x41), 'A');
        assert_eq!(numeric_to_char(0), '\u{FFFD}');
        assert_eq!(numeric_to_char(0xD800), '\u{FFFD}');
        assert_eq!(numeric_to_char(0x0011_0000), '\u{FFFD}');
    }
}
