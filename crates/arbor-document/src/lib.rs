//! Document loading and queries for the arbor document tree.
//!
//! # Scope
//!
//! This crate provides:
//! - **Document Loading** - markup from a string, a file or a URL
//! - **Lookups** - `getElementById`, `getElementsByTagName`, `getElementsByClassName`
//! - **Selector Queries** - `querySelector` / `querySelectorAll`
//!
//! Navigation (`parentNode`, `children`, `nextElementSibling`, ...) is done on
//! the underlying [`DomTree`], reachable through [`Document::tree`].
//!
//! # Not Yet Implemented
//!
//! - Character encodings other than UTF-8
//! - Relative URL resolution against the document's address

use std::fmt;
use std::fs;
use std::path::PathBuf;

use arbor_common::net::{FetchError, fetch_text};
use arbor_common::warning::clear_warnings;
use arbor_css::SelectorError;
use arbor_html::{BuildError, parse_document_with_cache_capacity};

pub use arbor_css as css;
pub use arbor_dom as dom;
pub use arbor_html as html;

pub use arbor_dom::{DomTree, NodeId, QueryCache};

/// Where the markup of a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Markup already in memory.
    Raw(String),
    /// A local file, read as UTF-8.
    File(PathBuf),
    /// An `http://` or `https://` address, fetched with a blocking GET.
    Url(String),
}

impl Source {
    /// Interpret a command-line style argument: anything starting with
    /// `http://` or `https://` is a URL, everything else a file path.
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(_) => f.write_str("<inline markup>"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Failure to produce a [`Document`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The URL could not be fetched.
    #[error(transparent)]
    Network(#[from] FetchError),
    /// The markup did not form a tree.
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Tuning for document construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Results kept by the tree's query cache. Zero disables caching.
    pub cache_capacity: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            cache_capacity: QueryCache::DEFAULT_CAPACITY,
        }
    }
}

/// A parsed document.
///
/// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
///
/// The tree is immutable once built, so a `&Document` can be queried from
/// any number of threads.
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    source_path: Option<String>,
}

impl Document {
    /// Parse markup with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Build`] if an end tag arrives with no element open.
    pub fn parse(html: &str) -> Result<Self, LoadError> {
        Self::parse_with_config(html, DocumentConfig::default())
    }

    /// Parse markup with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Build`] if an end tag arrives with no element open.
    pub fn parse_with_config(html: &str, config: DocumentConfig) -> Result<Self, LoadError> {
        // Each document reports its own duplicate ids
        clear_warnings();
        let tree = parse_document_with_cache_capacity(html, config.cache_capacity)?;
        Ok(Self {
            tree,
            source_path: None,
        })
    }

    /// Load a document from `source` with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::load_with_config`].
    pub fn load(source: Source) -> Result<Self, LoadError> {
        Self::load_with_config(source, DocumentConfig::default())
    }

    /// Read or fetch the markup named by `source`, then parse it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if a file cannot be read,
    /// [`LoadError::Network`] if a URL cannot be fetched and
    /// [`LoadError::Build`] if the markup is unbalanced.
    pub fn load_with_config(source: Source, config: DocumentConfig) -> Result<Self, LoadError> {
        let (html, source_path) = match source {
            Source::Raw(html) => (html, None),
            Source::File(path) => {
                let html = fs::read_to_string(&path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                (html, Some(path.display().to_string()))
            }
            Source::Url(url) => (fetch_text(&url)?, Some(url)),
        };

        let mut document = Self::parse_with_config(&html, config)?;
        document.source_path = source_path;
        Ok(document)
    }

    /// The underlying tree, for navigation.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Mutable access to the tree, for `classList` edits.
    pub const fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// The file path or URL the document was loaded from; `None` for
    /// markup parsed from a string.
    #[must_use]
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// The document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// [§ 4.2.4 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.get_element_by_id(id)
    }

    /// [§ 4.5 getElementsByTagName](https://dom.spec.whatwg.org/#dom-document-getelementsbytagname)
    #[must_use]
    pub fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId> {
        self.tree.get_elements_by_tag_name(self.root(), tag_name)
    }

    /// [§ 4.5 getElementsByClassName](https://dom.spec.whatwg.org/#dom-document-getelementsbyclassname)
    #[must_use]
    pub fn get_elements_by_class_name(&self, class_name: &str) -> Vec<NodeId> {
        self.tree.get_elements_by_class_name(self.root(), class_name)
    }

    /// [§ 4.2.6 querySelector](https://dom.spec.whatwg.org/#dom-parentnode-queryselector)
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] if `selector` does not parse.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        arbor_css::query_selector(&self.tree, self.root(), selector)
    }

    /// [§ 4.2.6 querySelectorAll](https://dom.spec.whatwg.org/#dom-parentnode-queryselectorall)
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] if `selector` does not parse.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        arbor_css::query_selector_all(&self.tree, self.root(), selector)
    }

    /// `querySelectorAll` scoped to the subtree at `element`.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] if `selector` does not parse.
    pub fn query_selector_all_from(
        &self,
        element: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorError> {
        arbor_css::query_selector_all(&self.tree, element, selector)
    }
}
