//! Attribute and `class` token helpers.
//!
//! Lookups match on local name, and on namespace only when one is given:
//! an empty `space` argument matches an attribute in any namespace. The
//! first matching attribute wins.

use super::{Attr, Element};
use crate::scope::Name;

fn attr_matches(attr: &Attr, space: &str, local: &str) -> bool {
    attr.name.local == local && (space.is_empty() || attr.name.space == space)
}

impl Element {
    /// Returns the value of the first matching attribute, or `""` if there
    /// is none.
    #[must_use]
    pub fn attr(&self, space: &str, local: &str) -> &str {
        self.lookup_attr(space, local).unwrap_or_default()
    }

    /// Returns the value of the first matching attribute, distinguishing a
    /// missing attribute from an empty one.
    #[must_use]
    pub fn lookup_attr(&self, space: &str, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| attr_matches(a, space, local))
            .map(|a| a.value.as_str())
    }

    /// Sets the value of the first matching attribute, or appends a new
    /// attribute named `{space}local` if none matches.
    pub fn set_attr(&mut self, space: &str, local: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|a| attr_matches(a, space, local)) {
            Some(attr) => attr.value = value,
            None => self.attrs.push(Attr::new(Name::new(space, local), value)),
        }
    }

    /// Removes the first matching attribute and returns it.
    pub fn remove_attr(&mut self, space: &str, local: &str) -> Option<Attr> {
        let index = self
            .attrs
            .iter()
            .position(|a| attr_matches(a, space, local))?;
        Some(self.attrs.remove(index))
    }

    fn class_attr_mut(&mut self) -> Option<&mut Attr> {
        self.attrs
            .iter_mut()
            .find(|a| a.name.space.is_empty() && a.name.local == "class")
    }

    /// Returns `true` if the `class` attribute contains `class` as a token.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("", "class")
            .split_ascii_whitespace()
            .any(|token| token == class)
    }

    /// Adds the space-separated tokens of `class` to the `class` attribute.
    ///
    /// Tokens already present are not repeated, empty tokens are dropped,
    /// and the order of first occurrence is kept. The attribute is created
    /// if it does not exist yet.
    pub fn add_class(&mut self, class: &str) {
        if let Some(attr) = self.class_attr_mut() {
            let merged = clean_tokens(
                attr.value
                    .split_ascii_whitespace()
                    .chain(class.split_ascii_whitespace()),
                &[],
            );
            attr.value = merged;
            return;
        }
        let value = clean_tokens(class.split_ascii_whitespace(), &[]);
        if !value.is_empty() {
            self.attrs.push(Attr::new(Name::local("class"), value));
        }
    }

    /// Removes the space-separated tokens of `class` from the `class`
    /// attribute, if it exists.
    pub fn remove_class(&mut self, class: &str) {
        let omit: Vec<&str> = class.split_ascii_whitespace().collect();
        if let Some(attr) = self.class_attr_mut() {
            attr.value = clean_tokens(attr.value.split_ascii_whitespace(), &omit);
        }
    }
}

fn clean_tokens<'a>(tokens: impl Iterator<Item = &'a str>, omit: &[&str]) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for token in tokens {
        if token.is_empty() || omit.contains(&token) || kept.contains(&token) {
            continue;
        }
        kept.push(token);
    }
    kept.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element_with(attrs: &[(&str, &str, &str)]) -> Element {
        let mut el = Element::new(Name::local("div"));
        for &(space, local, value) in attrs {
            el.attrs.push(Attr::new(Name::new(space, local), value));
        }
        el
    }

    #[test]
    fn test_attr_any_namespace() {
        let el = element_with(&[("urn:a", "id", "1"), ("", "id", "2")]);
        assert_eq!(el.attr("", "id"), "1");
        assert_eq!(el.attr("urn:b", "id"), "");
    }

    #[test]
    fn test_attr_specific_namespace() {
        let el = element_with(&[("urn:a", "id", "1"), ("", "id", "2")]);
        assert_eq!(el.attr("urn:a", "id"), "1");
        assert_eq!(el.lookup_attr("urn:b", "id"), None);
    }

    #[test]
    fn test_lookup_attr_distinguishes_empty_value() {
        let el = element_with(&[("", "flag", "")]);
        assert_eq!(el.lookup_attr("", "flag"), Some(""));
        assert_eq!(el.lookup_attr("", "other"), None);
        assert_eq!(el.attr("", "other"), "");
    }

    #[test]
    fn test_set_attr_replaces_then_appends() {
        let mut el = element_with(&[("", "id", "1")]);
        el.set_attr("", "id", "2");
        el.set_attr("urn:x", "kind", "k");
        assert_eq!(
            el.attrs,
            vec![
                Attr::new(Name::local("id"), "2"),
                Attr::new(Name::new("urn:x", "kind"), "k"),
            ]
        );
    }

    #[test]
    fn test_remove_attr() {
        let mut el = element_with(&[("", "a", "1"), ("", "b", "2")]);
        let removed = el.remove_attr("", "a");
        assert_eq!(removed, Some(Attr::new(Name::local("a"), "1")));
        assert_eq!(el.remove_attr("", "missing"), None);
        assert_eq!(el.attrs.len(), 1);
    }

    #[test]
    fn test_add_existing_class_is_noop() {
        let mut el = element_with(&[("", "class", "foo bar")]);
        el.add_class("foo");
        assert_eq!(el.attr("", "class"), "foo bar");
    }

    #[test]
    fn test_add_class_appends() {
        let mut el = element_with(&[("", "class", "foo bar")]);
        el.add_class("baz");
        assert_eq!(el.attr("", "class"), "foo bar baz");
    }

    #[test]
    fn test_remove_class() {
        let mut el = element_with(&[("", "class", "foo bar baz")]);
        el.remove_class("bar");
        assert_eq!(el.attr("", "class"), "foo baz");
    }

    #[test]
    fn test_add_class_creates_attribute_and_dedupes() {
        let mut el = element_with(&[]);
        el.add_class("a  b a");
        assert_eq!(el.attr("", "class"), "a b");
        assert!(el.has_class("b"));
        assert!(!el.has_class("c"));
    }

    #[test]
    fn test_add_class_cleans_existing_value() {
        let mut el = element_with(&[("", "class", " x  x y ")]);
        el.add_class("z x");
        assert_eq!(el.attr("", "class"), "x y z");
    }

    #[test]
    fn test_remove_class_without_attribute() {
        let mut el = element_with(&[]);
        el.remove_class("foo");
        assert!(el.attrs.is_empty());
    }

    #[test]
    fn test_add_blank_class_adds_nothing() {
        let mut el = element_with(&[]);
        el.add_class("   ");
        assert!(el.attrs.is_empty());
    }
}
