//! [§ 7.1 Interface DOMTokenList](https://dom.spec.whatwg.org/#interface-domtokenlist)
//!
//! The set of class tokens an element carries, derived once from its `class`
//! attribute when the element is created.

use std::collections::HashSet;

/// "A DOMTokenList object has an associated token set (a set)."
///
/// Unordered and duplicate-free. Empty tokens never enter the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    classes: HashSet<String>,
}

impl ClassList {
    /// Create an empty class list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the token set from a raw `class` attribute value.
    ///
    /// [§ 2.3.8 Space-separated tokens](https://html.spec.whatwg.org/multipage/common-microsyntaxes.html#space-separated-tokens)
    /// "A set of space-separated tokens is a string containing zero or more
    /// words separated by one or more ASCII whitespace"
    #[must_use]
    pub fn from_attribute(value: &str) -> Self {
        Self {
            classes: value
                .split_ascii_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Add a class. Adding a class that is already present is a no-op.
    pub fn add(&mut self, class_name: &str) -> &mut Self {
        if !class_name.is_empty() {
            let _ = self.classes.insert(class_name.to_string());
        }
        self
    }

    /// Remove a class, returning whether it was present.
    pub fn remove(&mut self, class_name: &str) -> bool {
        self.classes.remove(class_name)
    }

    /// Whether the class is in the set.
    #[must_use]
    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains(class_name)
    }

    /// Remove the class if present, add it otherwise.
    ///
    /// Returns `true` if the class is present afterwards.
    pub fn toggle(&mut self, class_name: &str) -> bool {
        if self.remove(class_name) {
            false
        } else {
            let _ = self.add(class_name);
            self.contains(class_name)
        }
    }

    /// Number of distinct classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the element carries no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate the classes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// The classes sorted, for stable output.
    #[must_use]
    pub fn sorted(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.iter().collect();
        classes.sort_unstable();
        classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_attribute_collapses_whitespace_and_duplicates() {
        let list = ClassList::from_attribute("  list   other_list\tlist\n");
        assert_eq!(list.len(), 2);
        assert!(list.contains("list"));
        assert!(list.contains("other_list"));
        assert!(!list.contains(""));
    }

    #[test]
    fn test_empty_attribute_gives_empty_list() {
        assert!(ClassList::from_attribute("").is_empty());
        assert!(ClassList::from_attribute("   ").is_empty());
    }

    #[test]
    fn test_add_remove_contains() {
        let mut list = ClassList::new();
        let _ = list.add("a").add("b").add("a");
        assert_eq!(list.sorted(), vec!["a", "b"]);
        assert!(list.remove("a"));
        assert!(!list.remove("a"));
        assert!(!list.contains("a"));
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut list = ClassList::from_attribute("open");
        assert!(!list.toggle("open"));
        assert!(!list.contains("open"));
        assert!(list.toggle("open"));
        assert!(list.contains("open"));
    }

    #[test]
    fn test_add_ignores_empty_token() {
        let mut list = ClassList::new();
        let _ = list.add("");
        assert!(list.is_empty());
    }
}
