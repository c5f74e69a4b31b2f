//! Tree construction from tokenizer events.
//!
//! A stack of open elements starts out holding the document. Start tags push,
//! end tags pop, and text is attached to whatever is on top. Once every event
//! has been applied, the sibling links are wired in one pass over the finished
//! child lists.

use std::str::FromStr;

use arbor_dom::{DomTree, ElementData, NodeId, NodeType};
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::tokenizer::{Attribute, HTMLTokenizer, TreeEvent};

/// Elements that never have children.
///
/// A start tag for one of these is closed as soon as it is opened, so the
/// element never sits on the stack of open elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum VoidElement {
    /// `<area>`, an image-map region.
    Area,
    /// `<base>`, the document base URL.
    Base,
    /// `<basefont>`, obsolete font default.
    Basefont,
    /// `<br>`, a line break.
    Br,
    /// `<col>`, a table column.
    Col,
    /// `<frame>`, obsolete frameset pane.
    Frame,
    /// `<hr>`, a thematic break.
    Hr,
    /// `<img>`, an image.
    Img,
    /// `<input>`, a form control.
    Input,
    /// `<isindex>`, obsolete search prompt.
    Isindex,
    /// `<link>`, an external resource link.
    Link,
    /// `<meta>`, document metadata.
    Meta,
    /// `<param>`, an object parameter.
    Param,
}

impl VoidElement {
    /// Whether `tag_name` names a void element.
    #[must_use]
    pub fn is_void(tag_name: &str) -> bool {
        Self::from_str(tag_name).is_ok()
    }
}

/// Construction failed and no tree was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// An end tag arrived when only the document was open.
    #[error("unbalanced end tag </{name}> at event {event_index}: no element is open")]
    UnbalancedEndTag {
        /// Name carried by the offending end tag.
        name: String,
        /// Zero-based position of the event in the input stream.
        event_index: usize,
    },
}

/// Applies [`TreeEvent`]s in order to grow a [`DomTree`].
///
/// End tag names are not checked against the element they close: an end tag
/// pops whatever is on top of the stack.
#[derive(Debug)]
pub struct TreeBuilder {
    tree: DomTree,

    /// Open elements, innermost last. The document is at the bottom and is
    /// never popped.
    stack_of_open_elements: Vec<NodeId>,

    /// Number of events processed so far.
    event_index: usize,
}

impl TreeBuilder {
    /// Create a builder holding an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tree(DomTree::new())
    }

    /// Create a builder that grows `tree`, which must hold only its document.
    #[must_use]
    pub fn with_tree(tree: DomTree) -> Self {
        Self {
            tree,
            stack_of_open_elements: vec![NodeId::ROOT],
            event_index: 0,
        }
    }

    /// The node new children are appended to.
    fn current_node(&self) -> NodeId {
        self.stack_of_open_elements
            .last()
            .copied()
            .unwrap_or(NodeId::ROOT)
    }

    /// Apply one event.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnbalancedEndTag`] when an end tag would pop the
    /// document.
    pub fn process(&mut self, event: TreeEvent) -> Result<(), BuildError> {
        let index = self.event_index;
        self.event_index += 1;

        match event {
            TreeEvent::StartTag { name, attributes } => {
                let is_void = VoidElement::is_void(&name);
                let element = self.insert_element(name, attributes);
                if !is_void {
                    self.stack_of_open_elements.push(element);
                }
            }
            // Same as a void start tag: appended, never opened
            TreeEvent::StartEndTag { name, attributes } => {
                let _ = self.insert_element(name, attributes);
            }
            TreeEvent::EndTag { name } => {
                if self.stack_of_open_elements.len() <= 1 {
                    return Err(BuildError::UnbalancedEndTag {
                        name,
                        event_index: index,
                    });
                }
                let _ = self.stack_of_open_elements.pop();
            }
            TreeEvent::CharacterData { text } => self.insert_text(&text),
        }
        Ok(())
    }

    /// Create an element for a start tag and append it to the current node.
    ///
    /// Attributes are resolved here: the last value for a repeated name wins,
    /// the class list comes from `class`, and a non-empty `id` is indexed.
    fn insert_element(&mut self, tag_name: String, attributes: Vec<Attribute>) -> NodeId {
        let data = ElementData::new(
            tag_name,
            attributes.into_iter().map(|attr| (attr.name, attr.value)),
        );
        let id = data.id().map(str::to_string);

        let parent = self.current_node();
        let element = self.tree.alloc(NodeType::Element(data));
        self.tree.append_child(parent, element);
        if let Some(id) = id {
            let _ = self.tree.register_id(&id, element);
        }
        element
    }

    /// Text is trimmed of spaces, tabs and newlines; nothing is left of a
    /// run that was only those.
    fn insert_text(&mut self, text: &str) {
        let trimmed = text.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n'));
        if trimmed.is_empty() {
            return;
        }
        let parent = self.current_node();
        let node = self.tree.alloc(NodeType::Text(trimmed.to_string()));
        self.tree.append_child(parent, node);
    }

    /// Close anything still open, link siblings and hand out the tree.
    #[must_use]
    pub fn finish(mut self) -> DomTree {
        self.stack_of_open_elements.truncate(1);
        self.tree.link_siblings();
        self.tree
    }

    /// Build a tree from a complete event stream.
    ///
    /// # Errors
    ///
    /// Stops at the first [`BuildError`]; no partial tree is returned.
    pub fn build(events: impl IntoIterator<Item = TreeEvent>) -> Result<DomTree, BuildError> {
        Self::build_into(DomTree::new(), events)
    }

    /// Like [`Self::build`], growing a caller-supplied empty tree.
    ///
    /// # Errors
    ///
    /// Stops at the first [`BuildError`].
    pub fn build_into(
        tree: DomTree,
        events: impl IntoIterator<Item = TreeEvent>,
    ) -> Result<DomTree, BuildError> {
        let mut builder = Self::with_tree(tree);
        for event in events {
            builder.process(event)?;
        }
        Ok(builder.finish())
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenize `html` and build its tree.
///
/// # Errors
///
/// Returns a [`BuildError`] when the markup closes more elements than it opens.
pub fn parse_document(html: &str) -> Result<DomTree, BuildError> {
    TreeBuilder::build(HTMLTokenizer::tokenize(html))
}

/// [`parse_document`] into a tree whose query cache holds `cache_capacity`
/// results.
///
/// # Errors
///
/// Same as [`parse_document`].
pub fn parse_document_with_cache_capacity(
    html: &str,
    cache_capacity: usize,
) -> Result<DomTree, BuildError> {
    TreeBuilder::build_into(
        DomTree::with_cache_capacity(cache_capacity),
        HTMLTokenizer::tokenize(html),
    )
}
