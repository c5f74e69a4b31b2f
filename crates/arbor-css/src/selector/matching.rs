//! Selector evaluation.
//!
//! Units are evaluated left to right. The first unit of each group selects
//! from the query root's subtree; every later unit selects its own candidates
//! the same way and keeps those that stand in the combinator's relation to
//! something already matched. A union ends the group: its matches are set
//! aside and the next unit starts over from the root.

use std::collections::HashSet;

use arbor_dom::{DomTree, Lookup, NodeId};

use super::{Combinator, ParsedSelector, SelectorError, SelectorUnit, UnitKind, parse_selector};

impl SelectorUnit {
    /// Candidates under `root` (and `root` itself), before any combinator
    /// applies. Always in tree order.
    #[must_use]
    pub fn select(&self, tree: &DomTree, root: NodeId) -> Vec<NodeId> {
        let selected = match &self.kind {
            UnitKind::Tag(name) => tree.get_elements_by_tag_name(root, name),
            UnitKind::Class(name) => tree.get_elements_by_class_name(root, name),
            UnitKind::Id(id) => tree
                .get_element_by_id(id)
                .filter(|&found| tree.is_inclusive_descendant_of(found, root))
                .into_iter()
                .collect(),
            // Only one level deep
            UnitKind::Universal => std::iter::once(root)
                .chain(tree.children(root).iter().copied())
                .collect(),
        };

        match &self.attribute {
            None => selected,
            Some(predicate) => selected
                .into_iter()
                .filter(|&id| predicate.matches(tree.get_attribute(id, predicate.name())))
                .collect(),
        }
    }
}

impl Combinator {
    /// Whether `candidate` stands in this relation to a member of `matched`.
    ///
    /// [`Combinator::Union`] never relates anything; it is handled by the
    /// evaluator.
    #[must_use]
    pub fn relates(self, tree: &DomTree, matched: &HashSet<NodeId>, candidate: NodeId) -> bool {
        match self {
            Self::Descendant => tree.ancestors(candidate).any(|a| matched.contains(&a)),
            Self::Child => tree
                .parent_element(candidate)
                .is_some_and(|parent| matched.contains(&parent)),
            Self::NextSibling => tree
                .previous_sibling(candidate)
                .is_some_and(|previous| matched.contains(&previous)),
            Self::SubsequentSibling => tree
                .preceding_element_siblings(candidate)
                .any(|sibling| matched.contains(&sibling)),
            Self::Union => false,
        }
    }
}

/// Append `group` to `result`, skipping nodes already present.
fn merge_group(result: &mut Vec<NodeId>, seen: &mut HashSet<NodeId>, group: Vec<NodeId>) {
    for id in group {
        if seen.insert(id) {
            result.push(id);
        }
    }
}

impl ParsedSelector {
    /// Evaluate against the subtree at `root`, bypassing the cache.
    ///
    /// Each group's matches are in tree order; groups follow one another in
    /// source order, so the overall result is not necessarily in tree order.
    /// No node appears twice.
    #[must_use]
    pub fn evaluate(&self, tree: &DomTree, root: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.first.select(tree, root);

        for (combinator, unit) in &self.rest {
            let candidates = unit.select(tree, root);
            if *combinator == Combinator::Union {
                merge_group(&mut result, &mut seen, std::mem::replace(&mut current, candidates));
                continue;
            }
            let matched: HashSet<NodeId> = current.iter().copied().collect();
            current = candidates
                .into_iter()
                .filter(|&candidate| combinator.relates(tree, &matched, candidate))
                .collect();
        }

        merge_group(&mut result, &mut seen, current);
        result
    }
}

/// [§ 4.2.6 querySelectorAll](https://dom.spec.whatwg.org/#dom-parentnode-queryselectorall)
///
/// Every element under `root` (and `root` itself) matched by `selector`.
///
/// Results are memoized in the tree's query cache under the normalized
/// selector text.
///
/// # Errors
///
/// Returns a [`SelectorError`] if `selector` does not parse. Nothing is
/// cached in that case.
pub fn query_selector_all(
    tree: &DomTree,
    root: NodeId,
    selector: &str,
) -> Result<Vec<NodeId>, SelectorError> {
    let parsed = parse_selector(selector)?;
    Ok(tree
        .query_cache()
        .get_or_insert_with(root, Lookup::Selector(parsed.to_string()), || {
            parsed.evaluate(tree, root)
        }))
}

/// [§ 4.2.6 querySelector](https://dom.spec.whatwg.org/#dom-parentnode-queryselector)
///
/// The first node [`query_selector_all`] would return.
///
/// # Errors
///
/// Returns a [`SelectorError`] if `selector` does not parse.
pub fn query_selector(
    tree: &DomTree,
    root: NodeId,
    selector: &str,
) -> Result<Option<NodeId>, SelectorError> {
    Ok(query_selector_all(tree, root, selector)?.first().copied())
}
