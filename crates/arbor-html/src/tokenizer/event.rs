//! Events handed from the tokenizer to the tree builder.

/// A `name="value"` pair on a start tag, in source order.
///
/// An attribute written without a value has an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, ASCII-lowercased by the tokenizer.
    pub name: String,
    /// Attribute value with character references decoded.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One step of tree construction.
///
/// The builder applies events strictly in order: tree shape and sibling order
/// both depend on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// `<name attr=...>`
    StartTag {
        /// Tag name.
        name: String,
        /// Attributes in source order, duplicates included.
        attributes: Vec<Attribute>,
    },
    /// `</name>`
    EndTag {
        /// Tag name.
        name: String,
    },
    /// `<name attr=... />`
    StartEndTag {
        /// Tag name.
        name: String,
        /// Attributes in source order, duplicates included.
        attributes: Vec<Attribute>,
    },
    /// A run of text between tags.
    CharacterData {
        /// The text, untrimmed.
        text: String,
    },
}

impl TreeEvent {
    /// Start tag with the given `(name, value)` attribute pairs.
    #[must_use]
    pub fn start(name: &str, attributes: &[(&str, &str)]) -> Self {
        Self::StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|&(name, value)| Attribute::new(name, value))
                .collect(),
        }
    }

    /// End tag.
    #[must_use]
    pub fn end(name: &str) -> Self {
        Self::EndTag {
            name: name.to_string(),
        }
    }

    /// Self-closing tag with the given `(name, value)` attribute pairs.
    #[must_use]
    pub fn start_end(name: &str, attributes: &[(&str, &str)]) -> Self {
        Self::StartEndTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|&(name, value)| Attribute::new(name, value))
                .collect(),
        }
    }

    /// Character data.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self::CharacterData {
            text: text.to_string(),
        }
    }
}
