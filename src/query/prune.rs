//! Removal of empty subtrees.

use std::collections::HashSet;

use crate::tree::{Element, RECURSION_LIMIT};

impl Element {
    /// Drops every descendant that ends up with no content, no children
    /// and no attributes once its own children have been pruned.
    ///
    /// The element itself is never removed, only its descendants. Running
    /// it a second time changes nothing. Only the top [`RECURSION_LIMIT`]
    /// levels are pruned.
    ///
    /// ```
    /// use xmlscope::parser::parse_str;
    ///
    /// let mut root = parse_str(r#"<r><a><b/></a><c id="1"/></r>"#).unwrap();
    /// root.remove_empty();
    /// assert_eq!(root.children.len(), 1);
    /// assert_eq!(root.children[0].name.local, "c");
    /// ```
    pub fn remove_empty(&mut self) {
        self.remove_empty_bounded(RECURSION_LIMIT);
    }

    /// Like [`remove_empty`](Self::remove_empty), but only prunes inside
    /// the top `limit` levels. Deeper nodes are kept as they are.
    pub fn remove_empty_bounded(&mut self, limit: usize) {
        let mut seen = HashSet::new();
        prune(self, limit, &mut seen);
    }
}

/// Post-order prune. `seen` holds the address of every node entered, so a
/// node reached twice is left alone the second time.
fn prune(el: &mut Element, levels: usize, seen: &mut HashSet<*const Element>) {
    let key: *const Element = &*el;
    if levels == 0 || !seen.insert(key) {
        return;
    }
    for child in &mut el.children {
        prune(child, levels - 1, seen);
    }
    el.children.retain(|child| !child.is_empty());
}
