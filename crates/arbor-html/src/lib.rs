//! Markup tokenizer and tree builder for the arbor document tree.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RAWTEXT (`script`, `style`) and tag states
//!   - Quoted, unquoted and valueless attributes
//!   - Numeric and common named character references
//!   - Comments, DOCTYPE and processing instructions are skipped
//!
//! - **Tree builder**
//!   - A plain stack of open elements seeded with the document
//!   - Void elements and self-closing tags are closed on sight
//!   - Sibling links wired after the last event
//!
//! # Not Implemented
//!
//! - Insertion modes and implied end tags
//! - End tag name matching (an end tag closes the innermost open element)
//! - The full named character reference table

/// Tree construction from tokenizer events.
pub mod builder;
/// Debug dumps of a built tree.
pub mod dump;
/// Markup tokenizer producing tree events.
pub mod tokenizer;

pub use builder::{
    BuildError, TreeBuilder, VoidElement, parse_document, parse_document_with_cache_capacity,
};
pub use dump::{dump_tree, print_tree};
pub use tokenizer::{Attribute, HTMLTokenizer, TokenizerState, TreeEvent};
