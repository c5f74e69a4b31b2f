//! CSS selector parsing
//!
//! This module parses the selector subset that
//! [`query_selector_all`](crate::query_selector_all) understands, following
//! the vocabulary of [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
//!
//! A selector is a flat chain of units joined by combinators:
//!
//! ```text
//! #tree > li[class~='list'] ul, .other_list
//! [#tree] --(Child)--> [li + predicate] --(Descendant)--> [ul] --(Union)--> [.other_list]
//! ```
//!
//! Each unit is a tag name, `.class`, `#id` or `*`, optionally followed by a
//! single attribute predicate. Compound units such as `li.list` are rejected.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// Evaluation of parsed selectors against a tree.
pub mod matching;

/// What a selector unit selects before any attribute predicate applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitKind {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    ///
    /// Compared with the element's tag name exactly.
    Tag(String),

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// "The class selector is given as a full stop (. U+002E) immediately
    /// followed by an identifier."
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// "An ID selector is a hash (#, U+0023) immediately followed by the
    /// ID value, which is an identifier."
    ///
    /// Answered from the document's id index.
    Id(String),

    /// `*`: the start node and its element children, not the whole subtree.
    Universal,
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Values are compared against the literal attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributePredicate {
    /// `[attr]`: the attribute is present, with any value.
    Exists(String),

    /// `[attr=value]`: exact equality.
    Equals(String, String),

    /// `[attr~=value]`: one of the whitespace-separated words equals `value`.
    ///
    /// Example: `[class~='list']` matches `class="list fishes_list"` but
    /// `[class~='ani']` does not match `class="list animals_list"`.
    Includes(String, String),

    /// `[attr|=value]`: a plain prefix test, exactly like `^=`.
    ///
    /// No hyphen boundary is required: `[lang|=en]` matches `lang="english"`.
    DashMatch(String, String),

    /// `[attr^=value]`: the value starts with `value`.
    Prefix(String, String),

    /// `[attr$=value]`: the value ends with `value`.
    Suffix(String, String),

    /// `[attr*=value]`: the value contains `value`.
    Substring(String, String),
}

impl AttributePredicate {
    /// Name of the attribute the predicate reads.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Exists(name)
            | Self::Equals(name, _)
            | Self::Includes(name, _)
            | Self::DashMatch(name, _)
            | Self::Prefix(name, _)
            | Self::Suffix(name, _)
            | Self::Substring(name, _) => name,
        }
    }

    /// Test an attribute value; `None` means the attribute is absent.
    #[must_use]
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(actual) = value else {
            return false;
        };
        match self {
            Self::Exists(_) => true,
            Self::Equals(_, expected) => actual == expected,
            Self::Includes(_, expected) => actual.split_ascii_whitespace().any(|w| w == expected),
            Self::DashMatch(_, expected) | Self::Prefix(_, expected) => {
                actual.starts_with(expected.as_str())
            }
            Self::Suffix(_, expected) => actual.ends_with(expected.as_str()),
            Self::Substring(_, expected) => actual.contains(expected.as_str()),
        }
    }

    const fn operator(&self) -> &'static str {
        match self {
            Self::Exists(_) => "",
            Self::Equals(..) => "=",
            Self::Includes(..) => "~=",
            Self::DashMatch(..) => "|=",
            Self::Prefix(..) => "^=",
            Self::Suffix(..) => "$=",
            Self::Substring(..) => "*=",
        }
    }
}

impl fmt::Display for AttributePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists(name) => write!(f, "[{name}]"),
            Self::Equals(name, value)
            | Self::Includes(name, value)
            | Self::DashMatch(name, value)
            | Self::Prefix(name, value)
            | Self::Suffix(name, value)
            | Self::Substring(name, value) => {
                write!(f, "[{name}{}{value:?}]", self.operator())
            }
        }
    }
}

/// The smallest selectable clause: one matcher plus an optional predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorUnit {
    /// The tag, class, id or universal matcher.
    pub kind: UnitKind,
    /// Extra filter applied to whatever `kind` selected.
    pub attribute: Option<AttributePredicate>,
}

impl fmt::Display for SelectorUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            UnitKind::Tag(name) => write!(f, "{name}")?,
            UnitKind::Class(name) => write!(f, ".{name}")?,
            UnitKind::Id(name) => write!(f, "#{name}")?,
            UnitKind::Universal => write!(f, "*")?,
        }
        if let Some(predicate) = &self.attribute {
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// "A combinator is punctuation that represents a particular kind of
/// relationship between the selectors on either side."
///
/// Displays as the separator written between two units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Combinator {
    /// [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// "A selector of the form 'A B' represents an element B that is an
    /// arbitrary descendant of some ancestor element A."
    #[strum(serialize = " ")]
    Descendant,

    /// [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// "A selector of the form 'A > B' represents an element B that is a
    /// direct child of element A."
    #[strum(serialize = " > ")]
    Child,

    /// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    ///
    /// The node immediately before B, text included, must be A. Whitespace-only
    /// text never makes it into the tree, so in practice this is element
    /// adjacency unless real text sits between the two.
    #[strum(serialize = " + ")]
    NextSibling,

    /// [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// "A selector of the form 'A ~ B' represents an element B that follows
    /// element A (not necessarily immediately), where A and B share the same
    /// parent."
    #[strum(serialize = " ~ ")]
    SubsequentSibling,

    /// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
    ///
    /// Ends the current group. The next unit starts over from the query root
    /// and its matches are added to the result.
    #[strum(serialize = ", ")]
    Union,
}

impl Combinator {
    /// The combinator written as `c`, if any. Whitespace is not included:
    /// a descendant combinator is only recognized by what surrounds it.
    #[must_use]
    pub const fn from_symbol(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::Child),
            '+' => Some(Self::NextSibling),
            '~' => Some(Self::SubsequentSibling),
            ',' => Some(Self::Union),
            _ => None,
        }
    }
}

/// A parsed selector: the first unit and the `(combinator, unit)` steps that
/// follow it, left to right.
///
/// Displays in a normalized form, which is also the key results are cached
/// under, so `li>ul` and `li  >  ul` share one cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelector {
    /// Leftmost unit.
    pub first: SelectorUnit,
    /// Remaining steps in source order.
    pub rest: Vec<(Combinator, SelectorUnit)>,
}

impl ParsedSelector {
    /// Number of units in the selector.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rest.len() + 1
    }

    /// Always false; a selector has at least one unit.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether the selector is a single unit.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.rest.is_empty()
    }

    /// Iterate over every unit, left to right.
    pub fn units(&self) -> impl Iterator<Item = &SelectorUnit> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, unit)| unit))
    }
}

impl fmt::Display for ParsedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (combinator, unit) in &self.rest {
            write!(f, "{combinator}{unit}")?;
        }
        Ok(())
    }
}

/// Why a selector string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Nothing but whitespace.
    #[error("selector is empty")]
    Empty,

    /// `.` or `#` without a name after it.
    #[error("'{prefix}' at offset {position} is not followed by an identifier")]
    MissingIdentifier {
        /// The prefix character.
        prefix: char,
        /// Byte offset of the prefix.
        position: usize,
    },

    /// A combinator with no unit on one side.
    #[error("combinator '{combinator}' at offset {position} has no selector on one side")]
    DanglingCombinator {
        /// The combinator character.
        combinator: char,
        /// Byte offset of the combinator.
        position: usize,
    },

    /// `[` without its closing `]`, or an unterminated quoted value.
    #[error("attribute selector opened at offset {position} is not closed")]
    UnterminatedAttribute {
        /// Byte offset of the `[`.
        position: usize,
    },

    /// A character that cannot appear where it was found.
    #[error("unexpected '{found}' at offset {position}")]
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// Its byte offset.
        position: usize,
    },
}

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

/// Hand-written recursive descent over the selector text.
struct SelectorParser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> SelectorParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.peek().map(|(_, c)| c)
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    /// Returns whether anything was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek_char().is_some_and(|c| c.is_ascii_whitespace()) {
            let _ = self.bump();
            skipped = true;
        }
        skipped
    }

    fn parse(mut self) -> Result<ParsedSelector, SelectorError> {
        let _ = self.skip_whitespace();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }

        let first = self.parse_unit()?;
        let mut rest = Vec::new();
        loop {
            let had_whitespace = self.skip_whitespace();
            let Some((position, c)) = self.peek() else {
                break;
            };
            let combinator = match Combinator::from_symbol(c) {
                Some(explicit) => {
                    let _ = self.bump();
                    let _ = self.skip_whitespace();
                    if self.peek().is_none() {
                        return Err(SelectorError::DanglingCombinator {
                            combinator: c,
                            position,
                        });
                    }
                    explicit
                }
                None if had_whitespace => Combinator::Descendant,
                None => return Err(SelectorError::UnexpectedCharacter { found: c, position }),
            };
            rest.push((combinator, self.parse_unit()?));
        }
        Ok(ParsedSelector { first, rest })
    }

    fn parse_unit(&mut self) -> Result<SelectorUnit, SelectorError> {
        let Some((position, c)) = self.peek() else {
            return Err(SelectorError::Empty);
        };

        let kind = match c {
            // [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
            '*' => {
                let _ = self.bump();
                UnitKind::Universal
            }
            '.' | '#' => {
                let _ = self.bump();
                let name = self
                    .parse_identifier()
                    .ok_or(SelectorError::MissingIdentifier {
                        prefix: c,
                        position,
                    })?;
                if c == '.' {
                    UnitKind::Class(name)
                } else {
                    UnitKind::Id(name)
                }
            }
            _ if Combinator::from_symbol(c).is_some() => {
                return Err(SelectorError::DanglingCombinator {
                    combinator: c,
                    position,
                });
            }
            _ => UnitKind::Tag(
                self.parse_identifier()
                    .ok_or(SelectorError::UnexpectedCharacter { found: c, position })?,
            ),
        };

        let attribute = if self.peek_char() == Some('[') {
            Some(self.parse_attribute()?)
        } else {
            None
        };
        Ok(SelectorUnit { kind, attribute })
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// An optional leading hyphen, an ident-start code point, then ident code
    /// points. Escapes are not supported.
    fn parse_identifier(&mut self) -> Option<String> {
        let mut ident = String::new();
        if self.peek_char() == Some('-') {
            let _ = self.bump();
            ident.push('-');
        }
        match self.peek_char() {
            Some(c) if is_ident_start_char(c) => {
                let _ = self.bump();
                ident.push(c);
            }
            _ => return None,
        }
        while let Some(c) = self.peek_char().filter(|&c| is_ident_char(c)) {
            let _ = self.bump();
            ident.push(c);
        }
        Some(ident)
    }

    /// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    ///
    /// `[name]` or `[name op value]`, whitespace allowed inside the brackets.
    fn parse_attribute(&mut self) -> Result<AttributePredicate, SelectorError> {
        let start = self.bump().map_or(0, |(i, _)| i);
        let unterminated = SelectorError::UnterminatedAttribute { position: start };

        let _ = self.skip_whitespace();
        let name = match self.peek() {
            None => return Err(unterminated),
            Some((position, found)) => self
                .parse_identifier()
                .ok_or(SelectorError::UnexpectedCharacter { found, position })?,
        };
        let _ = self.skip_whitespace();

        let build: fn(String, String) -> AttributePredicate = match self.bump() {
            None => return Err(unterminated),
            Some((_, ']')) => return Ok(AttributePredicate::Exists(name)),
            Some((_, '=')) => AttributePredicate::Equals,
            Some((position, c @ ('~' | '|' | '^' | '$' | '*'))) => {
                match self.bump() {
                    Some((_, '=')) => {}
                    None => return Err(unterminated),
                    Some(_) => return Err(SelectorError::UnexpectedCharacter { found: c, position }),
                }
                match c {
                    '~' => AttributePredicate::Includes,
                    '|' => AttributePredicate::DashMatch,
                    '^' => AttributePredicate::Prefix,
                    '$' => AttributePredicate::Suffix,
                    _ => AttributePredicate::Substring,
                }
            }
            Some((position, found)) => {
                return Err(SelectorError::UnexpectedCharacter { found, position });
            }
        };

        let _ = self.skip_whitespace();
        let value = self.parse_attribute_value(start)?;
        let _ = self.skip_whitespace();

        match self.bump() {
            Some((_, ']')) => Ok(build(name, value)),
            None => Err(unterminated),
            Some((position, found)) => Err(SelectorError::UnexpectedCharacter { found, position }),
        }
    }

    /// Quoted (`"val"`, `'val'`) or unquoted identifier-like value.
    fn parse_attribute_value(&mut self, start: usize) -> Result<String, SelectorError> {
        let unterminated = SelectorError::UnterminatedAttribute { position: start };
        match self.peek() {
            None => Err(unterminated),
            Some((_, quote @ ('"' | '\''))) => {
                let _ = self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some((_, c)) if c == quote => return Ok(value),
                        Some((_, c)) => value.push(c),
                        None => return Err(unterminated),
                    }
                }
            }
            Some((position, found)) => {
                let mut value = String::new();
                while let Some(c) = self.peek_char().filter(|&c| is_ident_char(c) || c == '.') {
                    let _ = self.bump();
                    value.push(c);
                }
                if value.is_empty() {
                    Err(SelectorError::UnexpectedCharacter { found, position })
                } else {
                    Ok(value)
                }
            }
        }
    }
}

/// Parse a raw selector string into a [`ParsedSelector`].
///
/// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
///
/// Supports:
/// - Type selectors: `div`, `li`
/// - Class selectors: `.list`
/// - ID selectors: `#tree`
/// - Universal selector: `*`
/// - One attribute predicate per unit: `li[name]`, `li[class~='list']`,
///   `a[href^="https"]`, and `=`, `|=`, `$=`, `*=`
/// - Combinators: `ul li`, `ul > li`, `li + li`, `li ~ li`, `ul, ol`
///
/// Compound selectors (`li.list`, `ul#tree`) are not supported.
///
/// # Errors
///
/// Returns a [`SelectorError`] describing the first problem found.
pub fn parse_selector(raw: &str) -> Result<ParsedSelector, SelectorError> {
    SelectorParser::new(raw).parse()
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn tag(name: &str) -> SelectorUnit {
        SelectorUnit {
            kind: UnitKind::Tag(name.to_string()),
            attribute: None,
        }
    }

    #[test]
    fn test_combinator_symbols_round_trip() {
        for combinator in Combinator::iter() {
            let symbol = combinator.to_string();
            match symbol.trim().chars().next() {
                Some(c) => assert_eq!(Combinator::from_symbol(c), Some(combinator)),
                None => assert_eq!(combinator, Combinator::Descendant),
            }
        }
    }

    #[test]
    fn test_whitespace_around_explicit_combinator_is_not_descendant() {
        let selector = parse_selector("li  >\tul").unwrap();
        assert_eq!(selector.rest, vec![(Combinator::Child, tag("ul"))]);
        assert_eq!(parse_selector("li>ul").unwrap(), selector);
    }

    #[test]
    fn test_compound_unit_is_rejected() {
        assert_eq!(
            parse_selector("  ul#x li").unwrap_err(),
            SelectorError::UnexpectedCharacter {
                found: '#',
                position: 4,
            }
        );
    }

    #[test]
    fn test_normalized_display() {
        let selector = parse_selector("  ul  li[ class ~= list ]+li,*[href] ").unwrap();
        assert_eq!(
            selector.to_string(),
            "ul li[class~=\"list\"] + li, *[href]"
        );
        assert_eq!(selector.len(), 4);
    }

    #[test]
    fn test_predicate_matching() {
        let dash = AttributePredicate::DashMatch("lang".into(), "en".into());
        assert!(dash.matches(Some("en-US")));
        assert!(dash.matches(Some("english")));
        assert!(!dash.matches(None));

        let includes = AttributePredicate::Includes("class".into(), "b".into());
        assert!(includes.matches(Some("a  b\tc")));
        assert!(!includes.matches(Some("ab")));

        assert!(AttributePredicate::Exists("x".into()).matches(Some("")));
        assert!(AttributePredicate::Suffix("src".into(), ".png".into()).matches(Some("a.png")));
        assert!(AttributePredicate::Substring("t".into(), "ar".into()).matches(Some("dark")));
        assert!(!AttributePredicate::Equals("t".into(), "a".into()).matches(Some("A")));
    }
}
