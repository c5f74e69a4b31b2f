use strum_macros::Display;

use super::character_reference::{lookup_named, numeric_to_char};
use super::event::{Attribute, TreeEvent};

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The subset of tokenizer states this tokenizer moves through. Comments,
/// DOCTYPEs and other declarations are skipped wholesale rather than
/// tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    /// Used for `script` and `style` content.
    RawText,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
}

/// A tag being assembled.
#[derive(Debug)]
struct PendingTag {
    name: String,
    attributes: Vec<Attribute>,
    is_end: bool,
    self_closing: bool,
}

impl PendingTag {
    const fn new(is_end: bool) -> Self {
        Self {
            name: String::new(),
            attributes: Vec::new(),
            is_end,
            self_closing: false,
        }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// Converts markup into [`TreeEvent`]s. Text between tags is coalesced into a
/// single `CharacterData` event.
pub struct HTMLTokenizer {
    state: TokenizerState,
    input: String,
    current_pos: usize,
    text_buffer: String,
    current_tag: Option<PendingTag>,
    current_attribute: Option<Attribute>,
    /// Name of the element whose raw text content is being read.
    raw_text_end_tag: Option<String>,
    events: Vec<TreeEvent>,
}

impl HTMLTokenizer {
    /// Create a tokenizer over `input`.
    ///
    /// [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
    /// CR LF pairs and lone CRs are turned into LF first.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            state: TokenizerState::Data,
            input: normalize_newlines(input.into()),
            current_pos: 0,
            text_buffer: String::new(),
            current_tag: None,
            current_attribute: None,
            raw_text_end_tag: None,
            events: Vec::new(),
        }
    }

    /// Tokenize `input` in one go.
    #[must_use]
    pub fn tokenize(input: &str) -> Vec<TreeEvent> {
        let mut tokenizer = Self::new(input);
        tokenizer.run();
        tokenizer.into_events()
    }

    /// Consume the whole input.
    ///
    /// A tag cut off by the end of input is dropped; pending text is emitted.
    pub fn run(&mut self) {
        while self.step() {}
        self.flush_text();
    }

    /// The state the tokenizer stopped in.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    /// Events produced so far.
    #[must_use]
    pub fn events(&self) -> &[TreeEvent] {
        &self.events
    }

    /// Take the produced events.
    #[must_use]
    pub fn into_events(self) -> Vec<TreeEvent> {
        self.events
    }

    /// Run one transition. Returns `false` once input is exhausted.
    fn step(&mut self) -> bool {
        match self.state {
            TokenizerState::Data => match self.consume() {
                Some('<') => self.switch_to(TokenizerState::TagOpen),
                Some('&') => {
                    let decoded = self.consume_character_reference();
                    self.text_buffer.push_str(&decoded);
                }
                Some(c) => self.text_buffer.push(c),
                None => return false,
            },

            TokenizerState::RawText => self.consume_raw_text(),

            // "<" followed by anything that cannot start a tag is literal text
            TokenizerState::TagOpen => match self.peek() {
                Some('!') => {
                    self.advance();
                    self.switch_to(TokenizerState::MarkupDeclarationOpen);
                }
                Some('/') => {
                    self.advance();
                    self.switch_to(TokenizerState::EndTagOpen);
                }
                Some('?') => self.switch_to(TokenizerState::BogusComment),
                Some(c) if c.is_ascii_alphabetic() => {
                    self.current_tag = Some(PendingTag::new(false));
                    self.switch_to(TokenizerState::TagName);
                }
                _ => {
                    self.text_buffer.push('<');
                    self.switch_to(TokenizerState::Data);
                }
            },

            TokenizerState::EndTagOpen => match self.peek() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.current_tag = Some(PendingTag::new(true));
                    self.switch_to(TokenizerState::TagName);
                }
                // "</>" is dropped
                Some('>') => {
                    self.advance();
                    self.switch_to(TokenizerState::Data);
                }
                Some(_) => self.switch_to(TokenizerState::BogusComment),
                None => {
                    self.text_buffer.push_str("</");
                    self.switch_to(TokenizerState::Data);
                }
            },

            TokenizerState::TagName => match self.consume() {
                Some(c) if is_whitespace(c) => self.switch_to(TokenizerState::BeforeAttributeName),
                Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
                Some('>') => self.emit_current_tag(),
                Some(c) => self.tag_mut().name.push(c.to_ascii_lowercase()),
                None => return false,
            },

            TokenizerState::BeforeAttributeName => match self.peek() {
                Some(c) if is_whitespace(c) => self.advance(),
                Some('/') => {
                    self.advance();
                    self.switch_to(TokenizerState::SelfClosingStartTag);
                }
                Some('>') => {
                    self.advance();
                    self.emit_current_tag();
                }
                Some(_) => self.start_attribute(),
                None => return false,
            },

            TokenizerState::AttributeName => match self.peek() {
                Some(c) if is_whitespace(c) => {
                    self.advance();
                    self.switch_to(TokenizerState::AfterAttributeName);
                }
                Some('/' | '>') | None => self.switch_to(TokenizerState::AfterAttributeName),
                Some('=') => {
                    self.advance();
                    self.switch_to(TokenizerState::BeforeAttributeValue);
                }
                Some(c) => {
                    self.advance();
                    self.attribute_mut().name.push(c.to_ascii_lowercase());
                }
            },

            TokenizerState::AfterAttributeName => match self.peek() {
                Some(c) if is_whitespace(c) => self.advance(),
                Some('/') => {
                    self.advance();
                    self.finish_attribute();
                    self.switch_to(TokenizerState::SelfClosingStartTag);
                }
                Some('=') => {
                    self.advance();
                    self.switch_to(TokenizerState::BeforeAttributeValue);
                }
                Some('>') => {
                    self.advance();
                    self.emit_current_tag();
                }
                Some(_) => {
                    self.finish_attribute();
                    self.start_attribute();
                }
                None => return false,
            },

            TokenizerState::BeforeAttributeValue => match self.peek() {
                Some(c) if is_whitespace(c) => self.advance(),
                Some('"') => {
                    self.advance();
                    self.switch_to(TokenizerState::AttributeValueDoubleQuoted);
                }
                Some('\'') => {
                    self.advance();
                    self.switch_to(TokenizerState::AttributeValueSingleQuoted);
                }
                Some('>') => {
                    self.advance();
                    self.emit_current_tag();
                }
                _ => self.switch_to(TokenizerState::AttributeValueUnquoted),
            },

            TokenizerState::AttributeValueDoubleQuoted => return self.attribute_value_quoted('"'),
            TokenizerState::AttributeValueSingleQuoted => return self.attribute_value_quoted('\''),

            TokenizerState::AttributeValueUnquoted => match self.consume() {
                Some(c) if is_whitespace(c) => {
                    self.finish_attribute();
                    self.switch_to(TokenizerState::BeforeAttributeName);
                }
                Some('&') => {
                    let decoded = self.consume_character_reference();
                    self.attribute_mut().value.push_str(&decoded);
                }
                Some('>') => self.emit_current_tag(),
                Some(c) => self.attribute_mut().value.push(c),
                None => return false,
            },

            TokenizerState::AfterAttributeValueQuoted => match self.peek() {
                Some(c) if is_whitespace(c) => {
                    self.advance();
                    self.switch_to(TokenizerState::BeforeAttributeName);
                }
                Some('/') => {
                    self.advance();
                    self.switch_to(TokenizerState::SelfClosingStartTag);
                }
                Some('>') => {
                    self.advance();
                    self.emit_current_tag();
                }
                Some(_) => self.switch_to(TokenizerState::BeforeAttributeName),
                None => return false,
            },

            TokenizerState::SelfClosingStartTag => match self.peek() {
                Some('>') => {
                    self.advance();
                    self.tag_mut().self_closing = true;
                    self.emit_current_tag();
                }
                Some(_) => self.switch_to(TokenizerState::BeforeAttributeName),
                None => return false,
            },

            // DOCTYPE, comments and CDATA carry nothing the tree keeps
            TokenizerState::MarkupDeclarationOpen => {
                if self.next_few_characters_are("--") {
                    self.current_pos += 2;
                    self.skip_past("-->");
                } else {
                    self.skip_past(">");
                }
                self.switch_to(TokenizerState::Data);
            }

            TokenizerState::BogusComment => {
                self.skip_past(">");
                self.switch_to(TokenizerState::Data);
            }
        }
        true
    }

    const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    fn peek(&self) -> Option<char> {
        self.input[self.current_pos..].chars().next()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    fn advance(&mut self) {
        let _ = self.consume();
    }

    fn next_few_characters_are(&self, target: &str) -> bool {
        self.input[self.current_pos..].starts_with(target)
    }

    /// Move past the next occurrence of `target`, or to the end of input.
    fn skip_past(&mut self, target: &str) {
        self.current_pos = self.input[self.current_pos..]
            .find(target)
            .map_or(self.input.len(), |offset| {
                self.current_pos + offset + target.len()
            });
    }

    fn tag_mut(&mut self) -> &mut PendingTag {
        self.current_tag.get_or_insert_with(|| PendingTag::new(false))
    }

    fn attribute_mut(&mut self) -> &mut Attribute {
        self.current_attribute
            .get_or_insert_with(|| Attribute::new(String::new(), String::new()))
    }

    /// Begin a new attribute whose name starts at the current character.
    ///
    /// [§ 13.2.5.32](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    /// An "=" here is part of the name.
    fn start_attribute(&mut self) {
        let mut attribute = Attribute::new(String::new(), String::new());
        if self.peek() == Some('=') {
            self.advance();
            attribute.name.push('=');
        }
        self.current_attribute = Some(attribute);
        self.switch_to(TokenizerState::AttributeName);
    }

    /// Move the current attribute onto the current tag. Duplicates are kept;
    /// resolving them is the tree builder's job.
    fn finish_attribute(&mut self) {
        if let Some(attribute) = self.current_attribute.take()
            && !attribute.name.is_empty()
        {
            self.tag_mut().attributes.push(attribute);
        }
    }

    fn attribute_value_quoted(&mut self, quote: char) -> bool {
        match self.consume() {
            Some(c) if c == quote => {
                self.finish_attribute();
                self.switch_to(TokenizerState::AfterAttributeValueQuoted);
            }
            Some('&') => {
                let decoded = self.consume_character_reference();
                self.attribute_mut().value.push_str(&decoded);
            }
            Some(c) => self.attribute_mut().value.push(c),
            None => return false,
        }
        true
    }

    fn flush_text(&mut self) {
        if !self.text_buffer.is_empty() {
            let text = std::mem::take(&mut self.text_buffer);
            self.events.push(TreeEvent::CharacterData { text });
        }
    }

    fn emit_current_tag(&mut self) {
        self.finish_attribute();
        self.switch_to(TokenizerState::Data);
        let Some(tag) = self.current_tag.take() else {
            return;
        };
        self.flush_text();

        let event = if tag.is_end {
            TreeEvent::EndTag { name: tag.name }
        } else if tag.self_closing {
            TreeEvent::StartEndTag {
                name: tag.name,
                attributes: tag.attributes,
            }
        } else {
            if RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) {
                self.raw_text_end_tag = Some(tag.name.clone());
                self.switch_to(TokenizerState::RawText);
            }
            TreeEvent::StartTag {
                name: tag.name,
                attributes: tag.attributes,
            }
        };
        self.events.push(event);
    }

    /// Everything up to the matching end tag is one run of text.
    fn consume_raw_text(&mut self) {
        let name = self.raw_text_end_tag.take().unwrap_or_default();
        let rest = &self.input[self.current_pos..];
        let end = find_raw_text_end(rest, &name).unwrap_or(rest.len());
        self.text_buffer.push_str(&rest[..end]);
        self.current_pos += end;
        self.flush_text();
        self.switch_to(TokenizerState::Data);
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Called with the "&" already consumed. Returns the decoded text, or a
    /// bare "&" (leaving the rest of the input in place) when nothing known
    /// follows.
    fn consume_character_reference(&mut self) -> String {
        let rest = &self.input[self.current_pos..];

        if let Some(numeric) = rest.strip_prefix('#') {
            let (digits_source, radix, prefix_len) = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => (hex, 16, 2),
                None => (numeric, 10, 1),
            };
            let digit_count = digits_source
                .chars()
                .take_while(|c| c.is_digit(radix))
                .count();
            if digit_count == 0 {
                return "&".to_string();
            }
            let decoded = u32::from_str_radix(&digits_source[..digit_count], radix)
                .map_or(char::REPLACEMENT_CHARACTER, numeric_to_char);
            let mut consumed = prefix_len + digit_count;
            if digits_source[digit_count..].starts_with(';') {
                consumed += 1;
            }
            self.current_pos += consumed;
            return decoded.to_string();
        }

        let name_len = rest
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .count();
        if name_len > 0
            && rest[name_len..].starts_with(';')
            && let Some(decoded) = lookup_named(&rest[..name_len])
        {
            self.current_pos += name_len + 1;
            return decoded.to_string();
        }
        "&".to_string()
    }
}

/// [§ 13.2.5.1](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
/// ASCII whitespace as the tokenizer sees it.
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\u{000C}' | '\r' | ' ')
}

/// [§ 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
/// Replace every CR LF pair, then every remaining CR, with a single LF.
fn normalize_newlines(input: String) -> String {
    if input.contains('\r') {
        input.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        input
    }
}

/// Byte offset of the `</name` that ends a raw text element, if any.
fn find_raw_text_end(haystack: &str, name: &str) -> Option<usize> {
    haystack.match_indices("</").map(|(i, _)| i).find(|&i| {
        let after = &haystack[i + 2..];
        after
            .get(..name.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
            && matches!(
                after[name.len()..].chars().next(),
                None | Some('/' | '>' | '\t' | '\n' | '\u{000C}' | '\r' | ' ')
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_event() {
        assert_eq!(
            HTMLTokenizer::tokenize("hello world"),
            vec![TreeEvent::text("hello world")]
        );
    }

    #[test]
    fn test_lone_less_than_is_text() {
        assert_eq!(
            HTMLTokenizer::tokenize("a < b"),
            vec![TreeEvent::text("a < b")]
        );
    }

    #[test]
    fn test_truncated_tag_is_dropped() {
        let mut tokenizer = HTMLTokenizer::new("text<div class=");
        tokenizer.run();
        assert_eq!(tokenizer.state().to_string(), "AttributeValueUnquoted");
        assert_eq!(tokenizer.events(), &[TreeEvent::text("text")]);
    }

    #[test]
    fn test_raw_text_end_search_is_case_insensitive() {
        assert_eq!(find_raw_text_end("a</b></SCRIPT>", "script"), Some(5));
        assert_eq!(find_raw_text_end("</scripts>", "script"), None);
        assert_eq!(find_raw_text_end("no end", "style"), None);
    }

    #[test]
    fn test_newline_normalization() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n\r\n".to_string()), "a\nb\nc\n\n");
        assert_eq!(normalize_newlines("plain\n".to_string()), "plain\n");
    }
}
