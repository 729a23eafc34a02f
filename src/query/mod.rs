//! Selecting elements from a tree.
//!
//! [`Selector`] matches tag nodes by local name, optionally by namespace
//! and by attribute values. `match_*` methods look at direct children
//! only; `find*` methods search all descendants in depth-first pre-order,
//! bounded by the selector's depth or by [`RECURSION_LIMIT`].
//!
//! Misses are never errors: an empty `Vec` or `None` comes back instead.

mod prune;
mod walk;

pub use walk::Descendants;

use crate::scope::Name;
use crate::tree::{Element, RECURSION_LIMIT};

/// A description of the tag nodes to select.
///
/// # Examples
///
/// ```
/// use xmlscope::parser::parse_str;
/// use xmlscope::query::Selector;
///
/// let root = parse_str(r#"<r><item id="1"/><item id="2"/><other/></r>"#).unwrap();
/// let second = root.match_one(&Selector::new("item").attr("id", "2")).unwrap();
/// assert_eq!(second.attr("", "id"), "2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    /// Local name to match.
    pub label: String,
    /// Namespace to match; empty matches any namespace.
    pub space: String,
    /// How many levels below the starting element `find` searches. Zero
    /// means [`RECURSION_LIMIT`].
    pub depth: usize,
    /// Attributes that must be present with exactly these values.
    pub attrs: Vec<(Name, String)>,
}

impl Selector {
    /// Selects tags with local name `label` in any namespace.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Restricts matches to the namespace `space`.
    #[must_use]
    pub fn space(mut self, space: impl Into<String>) -> Self {
        self.space = space.into();
        self
    }

    /// Limits `find` to `depth` levels below the starting element.
    #[must_use]
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Requires an attribute named `local`, in any namespace, with `value`.
    #[must_use]
    pub fn attr(self, local: impl Into<String>, value: impl Into<String>) -> Self {
        self.attr_ns("", local, value)
    }

    /// Requires an attribute `{space}local` with `value`.
    #[must_use]
    pub fn attr_ns(
        mut self,
        space: impl Into<String>,
        local: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attrs.push((Name::new(space, local), value.into()));
        self
    }

    /// Returns `true` if `el` is a tag node satisfying every constraint.
    #[must_use]
    pub fn matches(&self, el: &Element) -> bool {
        el.is_tag()
            && el.name.local == self.label
            && (self.space.is_empty() || el.name.space == self.space)
            && self.attrs.iter().all(|(name, value)| {
                el.lookup_attr(&name.space, &name.local) == Some(value.as_str())
            })
    }

    fn search_limit(&self) -> usize {
        if self.depth > 0 {
            self.depth
        } else {
            RECURSION_LIMIT
        }
    }
}

impl Element {
    /// Returns the direct children matching `selector`, in document order.
    #[must_use]
    pub fn match_elements(&self, selector: &Selector) -> Vec<&Element> {
        self.children.iter().filter(|c| selector.matches(c)).collect()
    }

    /// Returns the first direct child matching `selector`.
    #[must_use]
    pub fn match_one(&self, selector: &Selector) -> Option<&Element> {
        self.children.iter().find(|c| selector.matches(c))
    }

    /// Mutable form of [`match_one`](Self::match_one).
    pub fn match_one_mut(&mut self, selector: &Selector) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| selector.matches(c))
    }

    /// Returns every descendant matching `selector`, depth-first. Without
    /// a selector depth the search stops [`RECURSION_LIMIT`] levels down
    /// and deeper tags are never reported.
    #[must_use]
    pub fn find(&self, selector: &Selector) -> Vec<&Element> {
        self.descendants_bounded(selector.search_limit())
            .filter(|el| selector.matches(el))
            .collect()
    }

    /// Returns the first descendant matching `selector` in depth-first
    /// pre-order, searching no deeper than [`find`](Self::find) does.
    #[must_use]
    pub fn find_one(&self, selector: &Selector) -> Option<&Element> {
        self.descendants_bounded(selector.search_limit())
            .find(|el| selector.matches(el))
    }

    /// Mutable form of [`find_one`](Self::find_one).
    pub fn find_one_mut(&mut self, selector: &Selector) -> Option<&mut Element> {
        self.find_first_mut(selector.search_limit(), |el| selector.matches(el))
    }

    /// Returns every descendant tag for which `predicate` returns `true`,
    /// depth-first. Tags below [`RECURSION_LIMIT`] levels are not checked.
    pub fn find_func(&self, mut predicate: impl FnMut(&Element) -> bool) -> Vec<&Element> {
        self.descendants().filter(|el| predicate(*el)).collect()
    }

    /// Lists all descendant tags in depth-first pre-order, down to
    /// [`RECURSION_LIMIT`] levels.
    #[must_use]
    pub fn flatten(&self) -> Vec<&Element> {
        self.descendants().collect()
    }

    /// Returns the first child of any kind.
    #[must_use]
    pub fn first(&self) -> Option<&Element> {
        self.children.first()
    }

    /// Returns the last child of any kind.
    #[must_use]
    pub fn last(&self) -> Option<&Element> {
        self.children.last()
    }

    /// Mutable form of [`first`](Self::first).
    pub fn first_mut(&mut self) -> Option<&mut Element> {
        self.children.first_mut()
    }

    /// Mutable form of [`last`](Self::last).
    pub fn last_mut(&mut self) -> Option<&mut Element> {
        self.children.last_mut()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use crate::tree::NodeKind;
    use pretty_assertions::assert_eq;

    fn ids(elements: &[&Element]) -> Vec<String> {
        elements
            .iter()
            .map(|el| el.attr("", "id").to_owned())
            .collect()
    }

    const DOC: &str = r#"<r xmlns:p="urn:p">
        <a id="1"><x id="1.1"/><p:x id="1.2" k="v"/></a>
        <x id="2" k="v"/>
        <p:x id="3"><x id="3.1"/></p:x>
    </r>"#;

    #[test]
    fn test_match_children_in_document_order() {
        let root = parse_str(DOC).unwrap();
        let found = root.match_elements(&Selector::new("x"));
        assert_eq!(ids(&found), vec!["2", "3"]);
    }

    #[test]
    fn test_match_by_namespace() {
        let root = parse_str(DOC).unwrap();
        let found = root.match_elements(&Selector::new("x").space("urn:p"));
        assert_eq!(ids(&found), vec!["3"]);
    }

    #[test]
    fn test_match_one_with_attribute() {
        let root = parse_str(DOC).unwrap();
        let el = root.match_one(&Selector::new("x").attr("k", "v")).unwrap();
        assert_eq!(el.attr("", "id"), "2");
    }

    #[test]
    fn test_unmet_attribute_constraint_matches_nothing() {
        let root = parse_str(DOC).unwrap();
        let sel = Selector::new("x").attr("k", "v").attr("id", "3");
        assert!(root.match_elements(&sel).is_empty());
        assert!(root.find(&sel).is_empty());
        assert!(root.find_one(&sel).is_none());
    }

    #[test]
    fn test_missing_attribute_does_not_match_empty_constraint() {
        let root = parse_str(r#"<r><x/><x flag=""/></r>"#).unwrap();
        let found = root.match_elements(&Selector::new("x").attr("flag", ""));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].lookup_attr("", "flag"), Some(""));
    }

    #[test]
    fn test_find_depth_first() {
        let root = parse_str(DOC).unwrap();
        let found = root.find(&Selector::new("x"));
        assert_eq!(ids(&found), vec!["1.1", "1.2", "2", "3", "3.1"]);
    }

    #[test]
    fn test_find_respects_depth() {
        let root = parse_str(DOC).unwrap();
        let found = root.find(&Selector::new("x").depth(1));
        assert_eq!(ids(&found), vec!["2", "3"]);
    }

    #[test]
    fn test_find_one_is_preorder() {
        let root = parse_str(DOC).unwrap();
        let el = root.find_one(&Selector::new("x")).unwrap();
        assert_eq!(el.attr("", "id"), "1.1");
        let el = root.find_one(&Selector::new("x").attr("k", "v")).unwrap();
        assert_eq!(el.attr("", "id"), "1.2");
    }

    #[test]
    fn test_find_one_mut_edits_in_place() {
        let mut root = parse_str(DOC).unwrap();
        let sel = Selector::new("x").attr("id", "3.1");
        root.find_one_mut(&sel).unwrap().set_attr("", "seen", "yes");
        assert_eq!(root.find_one(&sel).unwrap().attr("", "seen"), "yes");
    }

    #[test]
    fn test_match_one_mut() {
        let mut root = parse_str(DOC).unwrap();
        root.match_one_mut(&Selector::new("a")).unwrap().add_class("hit");
        assert!(root.children[0].has_class("hit"));
        assert!(root.match_one_mut(&Selector::new("zzz")).is_none());
    }

    #[test]
    fn test_find_func_and_flatten() {
        let root = parse_str(DOC).unwrap();
        let with_k = root.find_func(|el| el.lookup_attr("", "k").is_some());
        assert_eq!(ids(&with_k), vec!["1.2", "2"]);
        assert_eq!(
            ids(&root.flatten()),
            vec!["1", "1.1", "1.2", "2", "3", "3.1"]
        );
    }

    #[test]
    fn test_first_and_last_any_kind() {
        let opts = crate::parser::ParseOptions::default().comments(true);
        let mut root =
            crate::parser::parse_str_with_options("<r><a/><!--tail--></r>", &opts).unwrap();
        assert_eq!(root.first().unwrap().name.local, "a");
        assert_eq!(root.last().unwrap().kind, NodeKind::Comment);
        root.last_mut().unwrap().set_content("changed");
        assert_eq!(root.children[1].content, "changed");
        root.first_mut().unwrap().set_attr("", "n", "1");
        assert_eq!(root.children[0].attr("", "n"), "1");
    }

    #[test]
    fn test_first_on_leaf() {
        let root = parse_str("<r/>").unwrap();
        assert!(root.first().is_none());
        assert!(root.last().is_none());
    }
}
