//! Depth-first traversal over tag nodes.
//!
//! All walks keep their own stack of child iterators instead of recursing,
//! and stop descending once they are `limit` levels below the starting
//! element. Level 1 is the starting element's children. The plain variants
//! use [`RECURSION_LIMIT`], which is also the deepest tree the parser will
//! build.

use std::slice;

use crate::tree::{Element, RECURSION_LIMIT};

/// Iterator over the descendant tags of an element in depth-first
/// pre-order. Created by [`Element::descendants`].
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    stack: Vec<slice::Iter<'a, Element>>,
    limit: usize,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            let Some(child) = iter.next() else {
                self.stack.pop();
                continue;
            };
            if !child.is_tag() {
                continue;
            }
            if self.stack.len() < self.limit {
                self.stack.push(child.children.iter());
            }
            return Some(child);
        }
    }
}

impl Element {
    /// Iterates over all descendant tags in depth-first pre-order.
    ///
    /// Tags more than [`RECURSION_LIMIT`] levels below `self` are skipped
    /// silently. Trees parsed under the default depth limit never reach it.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        self.descendants_bounded(RECURSION_LIMIT)
    }

    /// Like [`descendants`](Self::descendants), but goes at most `limit`
    /// levels deep. A limit of 1 yields the direct tag children only.
    #[must_use]
    pub fn descendants_bounded(&self, limit: usize) -> Descendants<'_> {
        let stack = if limit == 0 {
            Vec::new()
        } else {
            vec![self.children.iter()]
        };
        Descendants { stack, limit }
    }

    /// Calls `visit` on each direct tag child, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `visit`.
    pub fn each<'a, E>(
        &'a self,
        mut visit: impl FnMut(&'a Element) -> Result<(), E>,
    ) -> Result<(), E> {
        self.children.iter().filter(|c| c.is_tag()).try_for_each(|c| visit(c))
    }

    /// Mutable form of [`each`](Self::each).
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `visit`.
    pub fn each_mut<E>(
        &mut self,
        mut visit: impl FnMut(&mut Element) -> Result<(), E>,
    ) -> Result<(), E> {
        self.children
            .iter_mut()
            .filter(|c| c.is_tag())
            .try_for_each(|c| visit(c))
    }

    /// Calls `visit` on every descendant tag in depth-first pre-order,
    /// stopping at the first error.
    ///
    /// Tags more than [`RECURSION_LIMIT`] levels below `self` are skipped
    /// silently. Trees parsed under the default depth limit never reach it.
    ///
    /// ```
    /// use xmlscope::parser::parse_str;
    ///
    /// let root = parse_str("<a><b><c/></b><d/></a>").unwrap();
    /// let mut names = Vec::new();
    /// root.walk(|el| {
    ///     names.push(el.name.local.as_str());
    ///     Ok::<(), ()>(())
    /// })
    /// .unwrap();
    /// assert_eq!(names, ["b", "c", "d"]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `visit`.
    pub fn walk<'a, E>(&'a self, visit: impl FnMut(&'a Element) -> Result<(), E>) -> Result<(), E> {
        self.walk_bounded(RECURSION_LIMIT, visit)
    }

    /// Like [`walk`](Self::walk), but goes at most `limit` levels deep.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `visit`.
    pub fn walk_bounded<'a, E>(
        &'a self,
        limit: usize,
        mut visit: impl FnMut(&'a Element) -> Result<(), E>,
    ) -> Result<(), E> {
        self.descendants_bounded(limit).try_for_each(|el| visit(el))
    }

    /// Mutable form of [`walk`](Self::walk). Children are visited after
    /// their parent's visit returns, so `visit` may add or remove them.
    /// Stops [`RECURSION_LIMIT`] levels below `self` without error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `visit`.
    pub fn walk_mut<E>(
        &mut self,
        mut visit: impl FnMut(&mut Element) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut stack = vec![self.children.iter_mut()];
        while let Some(iter) = stack.last_mut() {
            let Some(child) = iter.next() else {
                stack.pop();
                continue;
            };
            if !child.is_tag() {
                continue;
            }
            visit(child)?;
            if stack.len() < RECURSION_LIMIT {
                stack.push(child.children.iter_mut());
            }
        }
        Ok(())
    }

    /// Calls `visit` on descendant tags in depth-first pre-order. When
    /// `visit` returns `false` the node's children are skipped; its
    /// siblings are still visited.
    ///
    /// Tags more than [`RECURSION_LIMIT`] levels below `self` are skipped
    /// silently. Trees parsed under the default depth limit never reach it.
    pub fn walk_depth<'a>(&'a self, visit: impl FnMut(&'a Element) -> bool) {
        self.walk_depth_bounded(RECURSION_LIMIT, visit);
    }

    /// Like [`walk_depth`](Self::walk_depth), but goes at most `limit`
    /// levels deep.
    pub fn walk_depth_bounded<'a>(
        &'a self,
        limit: usize,
        mut visit: impl FnMut(&'a Element) -> bool,
    ) {
        if limit == 0 {
            return;
        }
        let mut stack = vec![self.children.iter()];
        while let Some(iter) = stack.last_mut() {
            let Some(child) = iter.next() else {
                stack.pop();
                continue;
            };
            if child.is_tag() && visit(child) && stack.len() < limit {
                stack.push(child.children.iter());
            }
        }
    }

    /// Mutable form of [`walk_depth`](Self::walk_depth), with the same
    /// [`RECURSION_LIMIT`] cutoff.
    pub fn walk_depth_mut(&mut self, mut visit: impl FnMut(&mut Element) -> bool) {
        let mut stack = vec![self.children.iter_mut()];
        while let Some(iter) = stack.last_mut() {
            let Some(child) = iter.next() else {
                stack.pop();
                continue;
            };
            if child.is_tag() && visit(child) && stack.len() < RECURSION_LIMIT {
                stack.push(child.children.iter_mut());
            }
        }
    }

    /// Returns the first descendant tag, at most `limit` levels deep, for
    /// which `predicate` holds.
    pub(crate) fn find_first_mut(
        &mut self,
        limit: usize,
        mut predicate: impl FnMut(&Element) -> bool,
    ) -> Option<&mut Element> {
        if limit == 0 {
            return None;
        }
        let mut stack = vec![self.children.iter_mut()];
        while let Some(iter) = stack.last_mut() {
            let Some(child) = iter.next() else {
                stack.pop();
                continue;
            };
            if !child.is_tag() {
                continue;
            }
            if predicate(child) {
                return Some(child);
            }
            if stack.len() < limit {
                stack.push(child.children.iter_mut());
            }
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::parser::{parse_str, parse_str_with_options, ParseOptions};
    use crate::tree::Element;
    use pretty_assertions::assert_eq;

    fn names<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Vec<&'a str> {
        elements
            .into_iter()
            .map(|el| el.name.local.as_str())
            .collect()
    }

    const DOC: &str = "<r><a><a1><a11/></a1></a><b><b1/></b><c/></r>";

    #[test]
    fn test_descendants_preorder() {
        let root = parse_str(DOC).unwrap();
        assert_eq!(
            names(root.descendants()),
            vec!["a", "a1", "a11", "b", "b1", "c"]
        );
    }

    #[test]
    fn test_descendants_bounded() {
        let root = parse_str(DOC).unwrap();
        assert_eq!(names(root.descendants_bounded(1)), vec!["a", "b", "c"]);
        assert_eq!(
            names(root.descendants_bounded(2)),
            vec!["a", "a1", "b", "b1", "c"]
        );
        assert_eq!(root.descendants_bounded(0).count(), 0);
    }

    #[test]
    fn test_walks_skip_non_tags() {
        let opts = ParseOptions::default().char_data(true).comments(true);
        let root = parse_str_with_options("<r>x<!--c--><a>y<b/></a></r>", &opts).unwrap();
        assert_eq!(names(root.descendants()), vec!["a", "b"]);
        let mut seen = Vec::new();
        root.each(|el| {
            seen.push(el.name.local.clone());
            Ok::<(), ()>(())
        })
        .unwrap();
        assert_eq!(seen, vec!["a"]);
    }

    #[test]
    fn test_each_stops_on_error() {
        let root = parse_str(DOC).unwrap();
        let mut count = 0;
        let result = root.each(|el| {
            count += 1;
            if el.name.local == "b" {
                Err(el.name.local.clone())
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("b".to_string()));
        assert_eq!(count, 2);
    }

    #[test]
    fn test_walk_collects_references() {
        let root = parse_str(DOC).unwrap();
        let mut leaves: Vec<&Element> = Vec::new();
        root.walk(|el| {
            if el.children.is_empty() {
                leaves.push(el);
            }
            Ok::<(), ()>(())
        })
        .unwrap();
        assert_eq!(names(leaves), vec!["a11", "b1", "c"]);
    }

    #[test]
    fn test_walk_stops_on_error() {
        let root = parse_str(DOC).unwrap();
        let mut seen = Vec::new();
        let result = root.walk(|el| {
            seen.push(el.name.local.clone());
            if el.name.local == "a11" {
                Err(())
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
        assert_eq!(seen, vec!["a", "a1", "a11"]);
    }

    #[test]
    fn test_walk_depth_prunes_children_only() {
        let root = parse_str(DOC).unwrap();
        let mut seen = Vec::new();
        root.walk_depth(|el| {
            seen.push(el.name.local.as_str());
            el.name.local != "a"
        });
        assert_eq!(seen, vec!["a", "b", "b1", "c"]);
    }

    #[test]
    fn test_walk_depth_bounded() {
        let root = parse_str(DOC).unwrap();
        let mut seen = Vec::new();
        root.walk_depth_bounded(2, |el| {
            seen.push(el.name.local.as_str());
            true
        });
        assert_eq!(seen, vec!["a", "a1", "b", "b1", "c"]);
    }

    #[test]
    fn test_walk_mut_sees_added_children() {
        let mut root = parse_str("<r><a/><b/></r>").unwrap();
        let mut seen = Vec::new();
        root.walk_mut(|el| {
            seen.push(el.name.local.clone());
            if el.name.local == "a" {
                el.append_child(Element::new(crate::scope::Name::local("added")));
            }
            Ok::<(), ()>(())
        })
        .unwrap();
        assert_eq!(seen, vec!["a", "added", "b"]);
    }

    #[test]
    fn test_walk_depth_mut_and_each_mut() {
        let mut root = parse_str(DOC).unwrap();
        root.walk_depth_mut(|el| {
            el.set_attr("", "seen", "1");
            el.name.local != "b"
        });
        root.each_mut(|el| {
            el.add_class("top");
            Ok::<(), ()>(())
        })
        .unwrap();
        let marked = root.find_func(|el| el.attr("", "seen") == "1");
        assert_eq!(names(marked), vec!["a", "a1", "a11", "b", "c"]);
        assert_eq!(root.find_func(|el| el.has_class("top")).len(), 3);
    }
}
