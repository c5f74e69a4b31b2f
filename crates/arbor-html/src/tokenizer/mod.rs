//! Markup tokenizer.
//!
//! Turns a markup string into the [`TreeEvent`] stream the tree builder
//! consumes. It follows the shape of the WHATWG tokenizer states closely
//! enough for well-formed documents and never fails: input it cannot make
//! sense of becomes text.

/// Character reference decoding.
pub mod character_reference;
/// Events produced by the tokenizer.
pub mod event;
/// HTML tokenizer state machine.
pub mod machine;

pub use event::{Attribute, TreeEvent};
pub use machine::{HTMLTokenizer, TokenizerState};
