//! CSS selector queries over the arbor document tree.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector parsing** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, class, ID and universal units
//!   - One attribute predicate per unit: `[a]`, `=`, `~=`, `|=`, `^=`, `$=`, `*=`
//!   - Descendant, child, next-sibling, subsequent-sibling and list (`,`) combinators
//!
//! - **Selector evaluation**
//!   - `querySelectorAll` / `querySelector` from any start node
//!   - Results memoized in the tree's bounded query cache
//!
//! # Not Implemented
//!
//! - Compound selectors (`li.list`)
//! - Pseudo-classes and pseudo-elements
//! - Namespaces and escapes in identifiers
//! - Specificity

/// CSS selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;

pub use selector::matching::{query_selector, query_selector_all};
pub use selector::{
    AttributePredicate, Combinator, ParsedSelector, SelectorError, SelectorUnit, UnitKind,
    parse_selector,
};
