//! DOM tree for the arbor document model.
//!
//! This crate provides an arena-based DOM tree following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! All nodes live in one vector owned by [`DomTree`] and refer to each other
//! through [`NodeId`] indices, so parent and sibling links never own anything
//! and there are no reference cycles. Dropping the tree drops every node.
//!
//! Each node carries four navigation axes:
//! - parent
//! - children (every node) and element children (elements only, same order)
//! - previous/next sibling over all nodes
//! - previous/next element sibling over element children only
//!
//! The tree is assembled once by a tree builder and is read-only afterwards.
//! The only exception is the class list editing surface
//! ([`DomTree::class_list_mut`]), which needs `&mut DomTree` and clears the
//! query cache.

pub mod cache;
pub mod class_list;
pub mod iter;

use std::collections::HashMap;
use std::fmt;

use arbor_common::warning::warn_once;
use serde::Serialize;

pub use cache::{Lookup, QueryCache};
pub use class_list::ClassList;
pub use iter::{AncestorIterator, ElementIterator, PrecedingElementSiblings};

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// Tag name reported for the document node.
pub const DOCUMENT_TAG: &str = "document";

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// Two `NodeId`s are equal exactly when they name the same node, which is
/// the identity used for result-set deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.2.6 children](https://dom.spec.whatwg.org/#dom-parentnode-children)
    /// "The children getter steps are to return an HTMLCollection collection
    /// rooted at this matching only element children."
    ///
    /// Kept in step with `children` while the tree is built, never filtered
    /// on access.
    pub element_children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    /// "An object A's next sibling is the object immediately following A
    /// in the children of A's parent."
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    /// "An object A's previous sibling is the object immediately preceding A
    /// in the children of A's parent."
    pub prev_sibling: Option<NodeId>,

    /// Next entry in the parent's `element_children`. Only set on elements.
    pub next_element_sibling: Option<NodeId>,

    /// Previous entry in the parent's `element_children`. Only set on elements.
    pub prev_element_sibling: Option<NodeId>,
}

impl Node {
    fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            element_children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            next_element_sibling: None,
            prev_element_sibling: None,
        }
    }

    /// Whether this node takes part in the element axes.
    ///
    /// The document counts as an element: it has element children and can be
    /// the parent element of the root element.
    #[must_use]
    pub const fn is_element(&self) -> bool {
        matches!(self.node_type, NodeType::Document | NodeType::Element(_))
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// "Text nodes are known as text."
    Text(String),
}

/// Element-specific data.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
    /// Tokens of the `class` attribute at creation time.
    pub class_list: ClassList,
}

impl ElementData {
    /// Create element data from attribute pairs in source order.
    ///
    /// A repeated attribute name keeps the value written last. The class list
    /// is derived from the resulting `class` value.
    #[must_use]
    pub fn new<I>(tag_name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let attrs: AttributesMap = attributes.into_iter().collect();
        let class_list = attrs
            .get("class")
            .map(|value| ClassList::from_attribute(value))
            .unwrap_or_default();
        Self {
            tag_name: tag_name.into(),
            attrs,
            class_list,
        }
    }

    /// Returns the element's id attribute value if present and non-empty.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs
            .get("id")
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}

/// A non-fatal problem noticed while the tree was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeDiagnostic {
    /// A second element claimed an id that was already indexed.
    /// The first element stays reachable through the id index.
    DuplicateId {
        /// The id value.
        id: String,
        /// The element the id index points at.
        kept: NodeId,
        /// The later element that was not indexed.
        rejected: NodeId,
    },
}

impl fmt::Display for TreeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id, kept, rejected } => write!(
                f,
                "id '{id}' is not unique: keeping node {}, ignoring node {}",
                kept.0, rejected.0
            ),
        }
    }
}

/// Serializable view of a node for dumps and tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    /// Arena index of the node.
    pub node_id: NodeId,
    /// Tag name; empty for text.
    pub tag: String,
    /// Non-empty `id` attribute, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Classes, sorted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// Concatenated descendant text.
    pub text: String,
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// Besides the nodes, the tree owns the id index filled in during
/// construction and the cache used by tag, class and selector lookups.
#[derive(Debug)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,

    /// id attribute value to the first element that carried it.
    id_index: HashMap<String, NodeId>,

    /// Diagnostics recorded during construction, in order.
    diagnostics: Vec<TreeDiagnostic>,

    query_cache: QueryCache,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cache_capacity(QueryCache::DEFAULT_CAPACITY)
    }

    /// Create a new DOM tree whose query cache keeps at most `capacity` results.
    #[must_use]
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            nodes: vec![Node::new(NodeType::Document)],
            id_index: HashMap::new(),
            diagnostics: Vec::new(),
            query_cache: QueryCache::with_capacity(capacity),
        }
    }

    // ========== Construction ==========
    //
    // Used by the tree builder. Nothing calls these once the tree is handed out.

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(node_type));
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Appends `child` as the last child of `parent`, and as the last element
    /// child too when `child` is an element. Sibling links are not touched;
    /// [`Self::link_siblings`] wires them once the tree is complete.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let is_element = self.nodes[child.0].is_element();
        let parent_node = &mut self.nodes[parent.0];
        parent_node.children.push(child);
        if is_element {
            parent_node.element_children.push(child);
        }
        self.nodes[child.0].parent = Some(parent);
    }

    /// Index `node` under `id` unless another element got there first.
    ///
    /// Returns `true` if the entry was added. A collision is recorded as a
    /// [`TreeDiagnostic::DuplicateId`] and reported once on stderr.
    pub fn register_id(&mut self, id: &str, node: NodeId) -> bool {
        if id.is_empty() {
            return false;
        }
        if let Some(&kept) = self.id_index.get(id) {
            let diagnostic = TreeDiagnostic::DuplicateId {
                id: id.to_string(),
                kept,
                rejected: node,
            };
            let _ = warn_once("DOM", &format!("malformed HTML, id '{id}' is not unique"));
            self.diagnostics.push(diagnostic);
            return false;
        }
        let _ = self.id_index.insert(id.to_string(), node);
        true
    }

    /// Wire previous/next links between consecutive children, then between
    /// consecutive element children.
    ///
    /// Must run after the last node is appended: the links are derived from
    /// the final child lists. Both passes walk the tree with an explicit stack.
    pub fn link_siblings(&mut self) {
        let mut pending = vec![NodeId::ROOT];
        while let Some(id) = pending.pop() {
            let children = std::mem::take(&mut self.nodes[id.0].children);
            for pair in children.windows(2) {
                self.nodes[pair[0].0].next_sibling = Some(pair[1]);
                self.nodes[pair[1].0].prev_sibling = Some(pair[0]);
            }
            pending.extend(children.iter().rev());
            self.nodes[id.0].children = children;
        }

        let mut pending = vec![NodeId::ROOT];
        while let Some(id) = pending.pop() {
            let children = std::mem::take(&mut self.nodes[id.0].element_children);
            for pair in children.windows(2) {
                self.nodes[pair[0].0].next_element_sibling = Some(pair[1]);
                self.nodes[pair[1].0].prev_element_sibling = Some(pair[0]);
            }
            pending.extend(children.iter().rev());
            self.nodes[id.0].element_children = children;
        }
    }

    // ========== Node access ==========

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get the number of nodes in the tree, the document included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node exists from the start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the node is the document or an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Tag name: the element's, `"document"` for the document, `""` for text
    /// and for unknown ids.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> &str {
        match self.get(id).map(|n| &n.node_type) {
            Some(NodeType::Document) => DOCUMENT_TAG,
            Some(NodeType::Element(data)) => &data.tag_name,
            Some(NodeType::Text(_)) | None => "",
        }
    }

    /// Text payload of a text node; `""` for everything else.
    #[must_use]
    pub fn text(&self, id: NodeId) -> &str {
        self.as_text(id).unwrap_or("")
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// Concatenation of the text of all text descendants, in tree order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            match self.get(current).map(|n| &n.node_type) {
                Some(NodeType::Text(data)) => result.push_str(data),
                Some(_) => pending.extend(self.child_nodes(current).iter().rev()),
                None => {}
            }
        }
        result
    }

    // ========== Attributes ==========

    /// Attribute value, or `None` if the node has no such attribute.
    #[must_use]
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.as_element(id)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    /// Whether the node carries the attribute, with any value.
    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.as_element(id)
            .is_some_and(|e| e.attrs.contains_key(name))
    }

    /// The element's class list; `None` for the document and text.
    #[must_use]
    pub fn class_list(&self, id: NodeId) -> Option<&ClassList> {
        self.as_element(id).map(|e| &e.class_list)
    }

    /// Mutable class list for `add`/`remove`/`toggle`.
    ///
    /// Clears the query cache, since cached class and selector results may
    /// no longer hold.
    pub fn class_list_mut(&mut self, id: NodeId) -> Option<&mut ClassList> {
        self.query_cache.clear();
        match self.nodes.get_mut(id.0).map(|n| &mut n.node_type) {
            Some(NodeType::Element(data)) => Some(&mut data.class_list),
            _ => None,
        }
    }

    // ========== Navigation ==========

    /// [§ 4.4 parentNode](https://dom.spec.whatwg.org/#dom-node-parentnode)
    #[must_use]
    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// [§ 4.4 parentElement](https://dom.spec.whatwg.org/#dom-node-parentelement)
    ///
    /// Nearest ancestor that is an element (the document counts).
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|&ancestor| self.is_element(ancestor))
    }

    /// [§ 4.4 childNodes](https://dom.spec.whatwg.org/#dom-node-childnodes)
    #[must_use]
    pub fn child_nodes(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// [§ 4.2.6 children](https://dom.spec.whatwg.org/#dom-parentnode-children)
    ///
    /// Element children only, in the same relative order as [`Self::child_nodes`].
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.element_children.as_slice())
    }

    /// [§ 4.4 firstChild](https://dom.spec.whatwg.org/#dom-node-firstchild)
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.child_nodes(id).first().copied()
    }

    /// [§ 4.4 lastChild](https://dom.spec.whatwg.org/#dom-node-lastchild)
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.child_nodes(id).last().copied()
    }

    /// [§ 4.2.6 firstElementChild](https://dom.spec.whatwg.org/#dom-parentnode-firstelementchild)
    #[must_use]
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// [§ 4.2.6 lastElementChild](https://dom.spec.whatwg.org/#dom-parentnode-lastelementchild)
    #[must_use]
    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// [§ 4.4 nextSibling](https://dom.spec.whatwg.org/#dom-node-nextsibling)
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// [§ 4.4 previousSibling](https://dom.spec.whatwg.org/#dom-node-previoussibling)
    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.7 nextElementSibling](https://dom.spec.whatwg.org/#dom-nondocumenttypechildnode-nextelementsibling)
    ///
    /// Elements read their own link; a text node walks its sibling chain.
    #[must_use]
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        if node.is_element() {
            return node.next_element_sibling;
        }
        let mut current = node.next_sibling;
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    /// [§ 4.2.7 previousElementSibling](https://dom.spec.whatwg.org/#dom-nondocumenttypechildnode-previouselementsibling)
    #[must_use]
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        if node.is_element() {
            return node.prev_element_sibling;
        }
        let mut current = node.prev_sibling;
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.previous_sibling(sibling);
        }
        None
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent_node(id),
        }
    }

    /// Iterate over the element siblings before `id`, nearest first.
    #[must_use]
    pub fn preceding_element_siblings(&self, id: NodeId) -> PrecedingElementSiblings<'_> {
        PrecedingElementSiblings {
            tree: self,
            current: self.previous_element_sibling(id),
        }
    }

    /// Whether `node` is `ancestor` or lies below it.
    #[must_use]
    pub fn is_inclusive_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|id| id == ancestor)
    }

    /// Pre-order walk of `start` followed by every element below it.
    #[must_use]
    pub const fn elements(&self, start: NodeId) -> ElementIterator<'_> {
        ElementIterator::new(self, start)
    }

    // ========== Lookups ==========

    /// [§ 4.2.4 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    ///
    /// Answered from the id index: the first element built with this id.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    /// [§ 4.2.6 getElementsByTagName](https://dom.spec.whatwg.org/#dom-document-getelementsbytagname)
    ///
    /// Every element under `root` (and `root` itself) whose tag name equals
    /// `tag_name` exactly, in pre-order.
    #[must_use]
    pub fn get_elements_by_tag_name(&self, root: NodeId, tag_name: &str) -> Vec<NodeId> {
        self.query_cache
            .get_or_insert_with(root, Lookup::TagName(tag_name.to_string()), || {
                self.elements(root)
                    .filter(|&id| self.tag_name(id) == tag_name)
                    .collect()
            })
    }

    /// [§ 4.2.6 getElementsByClassName](https://dom.spec.whatwg.org/#dom-document-getelementsbyclassname)
    ///
    /// Every element under `root` (and `root` itself) whose class list
    /// contains `class_name`, in pre-order.
    #[must_use]
    pub fn get_elements_by_class_name(&self, root: NodeId, class_name: &str) -> Vec<NodeId> {
        self.query_cache
            .get_or_insert_with(root, Lookup::ClassName(class_name.to_string()), || {
                self.elements(root)
                    .filter(|&id| self.class_list(id).is_some_and(|c| c.contains(class_name)))
                    .collect()
            })
    }

    /// Number of ids in the id index.
    #[must_use]
    pub fn id_index_len(&self) -> usize {
        self.id_index.len()
    }

    /// Diagnostics recorded while the tree was built.
    #[must_use]
    pub fn diagnostics(&self) -> &[TreeDiagnostic] {
        &self.diagnostics
    }

    /// The cache shared by tag, class and selector lookups.
    #[must_use]
    pub const fn query_cache(&self) -> &QueryCache {
        &self.query_cache
    }

    /// Serializable summary of a node.
    #[must_use]
    pub fn summarize(&self, id: NodeId) -> NodeSummary {
        let element = self.as_element(id);
        NodeSummary {
            node_id: id,
            tag: self.tag_name(id).to_string(),
            id: element.and_then(ElementData::id).map(str::to_string),
            classes: element
                .map(|e| e.class_list.sorted().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
            text: self.text_content(id),
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let data = ElementData::new(
            tag,
            attrs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        );
        let id = data.id().map(str::to_string);
        let node = tree.alloc(NodeType::Element(data));
        tree.append_child(parent, node);
        if let Some(id) = id {
            let _ = tree.register_id(&id, node);
        }
        node
    }

    fn text(tree: &mut DomTree, parent: NodeId, data: &str) -> NodeId {
        let node = tree.alloc(NodeType::Text(data.to_string()));
        tree.append_child(parent, node);
        node
    }

    #[test]
    fn test_duplicate_attribute_last_write_wins() {
        let data = ElementData::new(
            "li",
            vec![
                ("name".to_string(), "first".to_string()),
                ("name".to_string(), "second".to_string()),
            ],
        );
        assert_eq!(data.attrs.get("name").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_attribute_keys_are_case_sensitive() {
        let data = ElementData::new("a", vec![("Href".to_string(), "x".to_string())]);
        assert!(data.attrs.contains_key("Href"));
        assert!(!data.attrs.contains_key("href"));
    }

    #[test]
    fn test_empty_id_is_not_an_id() {
        let data = ElementData::new("div", vec![("id".to_string(), String::new())]);
        assert_eq!(data.id(), None);
    }

    #[test]
    fn test_element_children_track_child_nodes() {
        let mut tree = DomTree::new();
        let p = element(&mut tree, NodeId::ROOT, "p", &[]);
        let t1 = text(&mut tree, p, "a");
        let b = element(&mut tree, p, "b", &[]);
        let t2 = text(&mut tree, p, "c");
        let i = element(&mut tree, p, "i", &[]);
        tree.link_siblings();

        assert_eq!(tree.child_nodes(p), &[t1, b, t2, i]);
        assert_eq!(tree.children(p), &[b, i]);
        assert_eq!(tree.first_child(p), Some(t1));
        assert_eq!(tree.first_element_child(p), Some(b));
        assert_eq!(tree.last_element_child(p), Some(i));
    }

    #[test]
    fn test_sibling_links_both_chains() {
        let mut tree = DomTree::new();
        let p = element(&mut tree, NodeId::ROOT, "p", &[]);
        let b = element(&mut tree, p, "b", &[]);
        let t = text(&mut tree, p, "between");
        let i = element(&mut tree, p, "i", &[]);
        tree.link_siblings();

        assert_eq!(tree.next_sibling(b), Some(t));
        assert_eq!(tree.previous_sibling(t), Some(b));
        assert_eq!(tree.next_sibling(t), Some(i));
        assert_eq!(tree.next_element_sibling(b), Some(i));
        assert_eq!(tree.previous_element_sibling(i), Some(b));
        assert_eq!(tree.previous_sibling(b), None);
        assert_eq!(tree.next_sibling(i), None);

        // Text nodes find element siblings by walking the full chain
        assert_eq!(tree.next_element_sibling(t), Some(i));
        assert_eq!(tree.previous_element_sibling(t), Some(b));
    }

    #[test]
    fn test_parent_element_of_root_element_is_document() {
        let mut tree = DomTree::new();
        let html = element(&mut tree, NodeId::ROOT, "html", &[]);
        tree.link_siblings();
        assert_eq!(tree.parent_node(html), Some(NodeId::ROOT));
        assert_eq!(tree.parent_element(html), Some(NodeId::ROOT));
        assert_eq!(tree.parent_element(NodeId::ROOT), None);
    }

    #[test]
    fn test_first_id_wins_and_collision_is_recorded() {
        let mut tree = DomTree::new();
        let first = element(&mut tree, NodeId::ROOT, "div", &[("id", "dup")]);
        let second = element(&mut tree, NodeId::ROOT, "div", &[("id", "dup")]);

        assert_eq!(tree.get_element_by_id("dup"), Some(first));
        assert_eq!(
            tree.diagnostics(),
            &[TreeDiagnostic::DuplicateId {
                id: "dup".to_string(),
                kept: first,
                rejected: second,
            }]
        );
        assert_eq!(tree.id_index_len(), 1);
    }

    #[test]
    fn test_tag_and_text_of_each_kind() {
        let mut tree = DomTree::new();
        let p = element(&mut tree, NodeId::ROOT, "p", &[]);
        let t = text(&mut tree, p, "hello");
        assert_eq!(tree.tag_name(NodeId::ROOT), "document");
        assert_eq!(tree.tag_name(p), "p");
        assert_eq!(tree.tag_name(t), "");
        assert_eq!(tree.text(t), "hello");
        assert_eq!(tree.text(p), "");
        assert_eq!(tree.text_content(NodeId::ROOT), "hello");
    }

    #[test]
    fn test_class_list_mut_clears_cache() {
        let mut tree = DomTree::new();
        let li = element(&mut tree, NodeId::ROOT, "li", &[("class", "a")]);
        tree.link_siblings();

        assert_eq!(tree.get_elements_by_class_name(NodeId::ROOT, "a"), vec![li]);
        assert!(!tree.query_cache().is_empty());

        let toggled = tree.class_list_mut(li).map(|c| c.toggle("a"));
        assert_eq!(toggled, Some(false));
        assert!(tree.query_cache().is_empty());
        assert!(tree.get_elements_by_class_name(NodeId::ROOT, "a").is_empty());
    }

    #[test]
    fn test_summary_serializes() {
        let mut tree = DomTree::new();
        let li = element(&mut tree, NodeId::ROOT, "li", &[("id", "x"), ("class", "b a")]);
        let _ = text(&mut tree, li, "Dogs");
        let json = serde_json::to_value(tree.summarize(li)).unwrap();
        assert_eq!(json["tag"], "li");
        assert_eq!(json["id"], "x");
        assert_eq!(json["classes"], serde_json::json!(["a", "b"]));
        assert_eq!(json["text"], "Dogs");
    }

    #[test]
    fn test_tree_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DomTree>();
    }
}
