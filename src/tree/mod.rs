//! Owned XML element trees.
//!
//! An [`Element`] owns its children directly, in document order. There are
//! no parent links and no shared nodes, so a tree is dropped by ordinary
//! scope exit and every reference handed out by the query API is tied to a
//! borrow of the element it came from.
//!
//! Each tag node also carries the namespace [`Scope`] in effect at its
//! position, which is what lets arbitrary `QName`s found in attribute values
//! or content be resolved long after parsing has finished.

mod attrs;
mod node;

pub use node::NodeKind;

use std::borrow::Cow;

use crate::scope::{Name, Scope};

/// Default ceiling on element nesting for parsing and traversal.
pub const RECURSION_LIMIT: usize = 3000;

/// An attribute on a tag: a resolved name and its unescaped value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attr {
    /// The attribute name. Unprefixed attributes are in no namespace.
    pub name: Name,
    /// The attribute value with entity references expanded.
    pub value: String,
}

impl Attr {
    /// Creates an attribute.
    pub fn new(name: Name, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// A node in an element tree.
///
/// # Examples
///
/// ```
/// use xmlscope::parser::parse_str;
///
/// let root = parse_str(r#"<a xmlns="urn:x"><b xmlns:y="urn:y"><y:c/></b></a>"#).unwrap();
/// let b = root.first().unwrap();
/// assert_eq!(b.scope.resolve("y:c").space, "urn:y");
/// assert_eq!(b.scope.resolve("c").space, "urn:x");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// What kind of node this is.
    pub kind: NodeKind,
    /// The resolved tag name. Empty for non-tag nodes.
    pub name: Name,
    /// Ordinary attributes in document order. `xmlns` declarations are
    /// not listed here; they live in `scope`.
    pub attrs: Vec<Attr>,
    /// The namespace bindings visible at this element.
    pub scope: Scope,
    /// Raw markup between the start and end tag when the element has no
    /// retained children, or the text of a non-tag node.
    pub content: String,
    /// Child nodes in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an empty tag node with no namespace bindings.
    #[must_use]
    pub fn new(name: Name) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Creates a non-tag node (character data, comment, ...) holding
    /// `content` verbatim.
    #[must_use]
    pub fn with_kind(kind: NodeKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            ..Self::default()
        }
    }

    /// Returns `true` for tag nodes.
    #[must_use]
    pub fn is_tag(&self) -> bool {
        self.kind == NodeKind::Tag
    }

    /// Returns `true` if the node has no content, no children and no
    /// attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.children.is_empty() && self.attrs.is_empty()
    }

    /// Appends a child and returns it for further editing.
    pub fn append_child(&mut self, child: Self) -> &mut Self {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Returns the raw content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replaces the raw content. The text is written out verbatim when the
    /// tree is marshalled, so it must already be valid markup.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Returns the content with entity and character references expanded.
    ///
    /// Content holding a reference that cannot be expanded is returned
    /// as is.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        quick_xml::escape::unescape(&self.content).unwrap_or(Cow::Borrowed(&self.content))
    }

    /// Replaces the content with `text`, escaping `&`, `<` and `>`.
    pub fn set_text(&mut self, text: &str) {
        self.content = quick_xml::escape::partial_escape(text).into_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_element_is_empty_tag() {
        let el = Element::new(Name::local("a"));
        assert!(el.is_tag());
        assert!(el.is_empty());
        assert!(el.scope.is_empty());
    }

    #[test]
    fn test_with_kind() {
        let el = Element::with_kind(NodeKind::Comment, " note ");
        assert_eq!(el.kind, NodeKind::Comment);
        assert!(!el.is_tag());
        assert_eq!(el.content(), " note ");
        assert!(!el.is_empty());
    }

    #[test]
    fn test_append_child_returns_child() {
        let mut root = Element::new(Name::local("root"));
        root.append_child(Element::new(Name::local("a")))
            .set_content("x");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].content(), "x");
        assert!(!root.is_empty());
    }

    #[test]
    fn test_text_unescapes() {
        let mut el = Element::new(Name::local("a"));
        el.set_content("1 &lt; 2 &amp;&#x41;");
        assert_eq!(el.text(), "1 < 2 &A");
    }

    #[test]
    fn test_text_keeps_unknown_reference() {
        let mut el = Element::new(Name::local("a"));
        el.set_content("&custom;");
        assert_eq!(el.text(), "&custom;");
    }

    #[test]
    fn test_set_text_escapes() {
        let mut el = Element::new(Name::local("a"));
        el.set_text("<b> & \"c\"");
        assert_eq!(el.content(), "&lt;b&gt; &amp; \"c\"");
        assert_eq!(el.text(), "<b> & \"c\"");
    }
}
