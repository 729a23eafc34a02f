//! Namespace scopes and prefix resolution.
//!
//! A [`Scope`] is the ordered list of `xmlns` bindings visible at one
//! position in a document, outermost first. Every element carries its own
//! scope snapshot. Snapshots share storage through an `Arc`, and any change
//! (a push while parsing, or a rewrite by the namespace normalizer) goes
//! through `Arc::make_mut`, so growing or editing one element's scope never
//! leaks into a sibling or parent that shares the same backing vector.
//!
//! Lookups scan from the innermost binding outwards; the first binding for
//! a prefix wins.

use std::fmt;
use std::sync::Arc;

use crate::util::qname::{join_qname, split_qname};

/// The namespace URI permanently bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The namespace URI permanently bound to the `xmlns` prefix.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A namespace-resolved name: a local part plus a namespace URI.
///
/// An empty `space` means the name is in no namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    /// Namespace URI (or, for an unresolvable prefix, the prefix itself).
    pub space: String,
    /// Local part.
    pub local: String,
}

impl Name {
    /// Creates a name in the given namespace.
    pub fn new(space: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            space: space.into(),
            local: local.into(),
        }
    }

    /// Creates a name in no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(String::new(), local)
    }
}

/// Clark notation: `{space}local`, or `local` when there is no namespace.
impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.space.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{{{}}}{}", self.space, self.local)
        }
    }
}

/// One `xmlns` declaration. The default namespace has an empty prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Binding {
    /// The declared prefix, empty for `xmlns="..."`.
    pub prefix: String,
    /// The namespace URI the prefix maps to.
    pub uri: String,
}

impl Binding {
    /// Creates a binding of `prefix` to `uri`.
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// Returns `true` for a default-namespace binding.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Bindings declared on one tag are ordered by namespace, then prefix,
    /// compared as a single concatenated key.
    fn sort_key(&self) -> impl Iterator<Item = u8> + '_ {
        self.uri.bytes().chain(self.prefix.bytes())
    }
}

/// The namespace bindings visible at a point in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    ns: Arc<Vec<Binding>>,
}

impl Scope {
    /// Creates an empty scope (only `xml` and `xmlns` resolve).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope from bindings listed outermost first.
    #[must_use]
    pub fn from_bindings(bindings: Vec<Binding>) -> Self {
        Self {
            ns: Arc::new(bindings),
        }
    }

    /// Returns all bindings, outermost first.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.ns
    }

    /// Returns `true` if no bindings are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ns.is_empty()
    }

    /// Returns `true` if both scopes share the same backing storage.
    #[must_use]
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ns, &other.ns)
    }

    /// Mutable access to the bindings, copying them first if the storage
    /// is shared with another scope.
    pub(crate) fn bindings_mut(&mut self) -> &mut Vec<Binding> {
        Arc::make_mut(&mut self.ns)
    }

    /// Appends one binding as the innermost declaration.
    pub fn declare(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.bindings_mut().push(Binding::new(prefix, uri));
    }

    /// Returns `true` if the innermost binding is a default-namespace
    /// binding, meaning the element owning this scope sets its own default.
    #[must_use]
    pub fn has_local_default(&self) -> bool {
        self.ns.last().is_some_and(Binding::is_default)
    }

    /// Returns the default namespace in effect, if one is declared.
    #[must_use]
    pub fn default_namespace(&self) -> Option<&str> {
        self.lookup_prefix("")
    }

    /// Returns the URI bound to `prefix`, innermost binding first.
    #[must_use]
    pub fn lookup_prefix(&self, prefix: &str) -> Option<&str> {
        self.ns
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
    }

    /// Splits a start tag's raw attributes into namespace declarations and
    /// ordinary attributes.
    ///
    /// `xmlns="uri"` becomes a default binding and `xmlns:p="uri"` binds
    /// `p`. The declarations from one tag are sorted, then appended to this
    /// scope. Returns the ordinary attributes in their original order and
    /// the bindings that were pushed.
    pub fn push_ns(
        &mut self,
        attrs: Vec<(String, String)>,
    ) -> (Vec<(String, String)>, Vec<Binding>) {
        let mut declared = Vec::new();
        let mut remaining = Vec::with_capacity(attrs.len());
        for (qname, value) in attrs {
            if qname == "xmlns" {
                declared.push(Binding::new("", value));
            } else if let Some(prefix) = qname.strip_prefix("xmlns:") {
                declared.push(Binding::new(prefix, value));
            } else {
                remaining.push((qname, value));
            }
        }
        declared.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
        if !declared.is_empty() {
            self.bindings_mut().extend(declared.iter().cloned());
        }
        (remaining, declared)
    }

    /// Resolves a `QName` to a namespace-qualified [`Name`].
    ///
    /// An unprefixed name takes the default namespace, if any. The `xml`
    /// and `xmlns` prefixes always resolve to their reserved URIs. If the
    /// prefix is not bound, the returned name's `space` is the prefix
    /// itself; use [`resolve_ns`](Self::resolve_ns) to detect that.
    ///
    /// ```
    /// use xmlscope::scope::{Name, Scope};
    ///
    /// let mut scope = Scope::new();
    /// scope.declare("y", "urn:y");
    /// assert_eq!(scope.resolve("y:c"), Name::new("urn:y", "c"));
    /// assert_eq!(scope.resolve("z:c"), Name::new("z", "c"));
    /// ```
    #[must_use]
    pub fn resolve(&self, qname: &str) -> Name {
        self.resolve_ns(qname).0
    }

    /// Like [`resolve`](Self::resolve), but also reports whether a binding
    /// for the prefix was found. An unprefixed name counts as found only
    /// when a default namespace is declared (`xmlns=""` included).
    #[must_use]
    pub fn resolve_ns(&self, qname: &str) -> (Name, bool) {
        let (prefix, local) = split_qname(qname);
        match prefix {
            "xml" => return (Name::new(XML_NAMESPACE, local), true),
            "xmlns" => return (Name::new(XMLNS_NAMESPACE, local), true),
            _ => {}
        }
        match self.lookup_prefix(prefix) {
            Some(uri) => (Name::new(uri, local), true),
            None => (Name::new(prefix, local), false),
        }
    }

    /// Like [`resolve`](Self::resolve), but an unprefixed name is placed in
    /// `default_ns` instead of the default namespace in scope. An empty
    /// `default_ns` falls back to normal resolution.
    #[must_use]
    pub fn resolve_default(&self, qname: &str, default_ns: &str) -> Name {
        if default_ns.is_empty() || qname.contains(':') {
            return self.resolve(qname);
        }
        Name::new(default_ns, qname)
    }

    /// The inverse of [`resolve`](Self::resolve): writes `name` as a `QName`
    /// using the closest binding for its namespace.
    ///
    /// A default binding for the namespace is preferred over a prefixed
    /// one, giving an unqualified name. Bindings shadowed by an inner
    /// redeclaration of the same prefix are ignored. Names in no namespace,
    /// and names whose namespace has no binding, come back unqualified.
    ///
    /// ```
    /// use xmlscope::scope::{Name, Scope};
    ///
    /// let mut scope = Scope::new();
    /// scope.declare("a", "urn:a");
    /// assert_eq!(scope.prefix(&Name::new("urn:a", "x")), "a:x");
    /// scope.declare("", "urn:a");
    /// assert_eq!(scope.prefix(&Name::new("urn:a", "x")), "x");
    /// ```
    #[must_use]
    pub fn prefix(&self, name: &Name) -> String {
        self.lookup_namespace(&name.space, true)
            .map_or_else(|| name.local.clone(), |prefix| join_qname(prefix, &name.local))
    }

    /// Finds the prefix to write a name in namespace `space` with.
    ///
    /// Returns `Some("")` when the namespace is the visible default and
    /// `allow_default` is set, `Some(prefix)` for the innermost visible
    /// prefixed binding, and `None` when the namespace is not bound.
    pub(crate) fn lookup_namespace(&self, space: &str, allow_default: bool) -> Option<&str> {
        match space {
            "" => return Some(""),
            XML_NAMESPACE => return Some("xml"),
            XMLNS_NAMESPACE => return Some("xmlns"),
            _ => {}
        }
        let mut qualified = None;
        for (index, binding) in self.ns.iter().enumerate().rev() {
            if binding.uri != space || self.is_shadowed(index) {
                continue;
            }
            if binding.is_default() {
                if allow_default {
                    return Some("");
                }
            } else if qualified.is_none() {
                qualified = Some(binding.prefix.as_str());
            }
        }
        qualified
    }

    fn is_shadowed(&self, index: usize) -> bool {
        let prefix = &self.ns[index].prefix;
        self.ns[index + 1..].iter().any(|b| &b.prefix == prefix)
    }

    /// Returns the innermost binding for each prefix, in declaration order.
    #[must_use]
    pub fn visible_bindings(&self) -> Vec<&Binding> {
        self.ns
            .iter()
            .enumerate()
            .filter(|&(index, _)| !self.is_shadowed(index))
            .map(|(_, binding)| binding)
            .collect()
    }

    /// Joins two scopes. When resolving with the result, the bindings of
    /// `inner` are searched before those of `self`.
    #[must_use]
    pub fn join_scope(&self, inner: &Self) -> Self {
        let mut ns = Vec::with_capacity(self.ns.len() + inner.ns.len());
        ns.extend_from_slice(&self.ns);
        ns.extend_from_slice(&inner.ns);
        Self::from_bindings(ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn test_push_ns_splits_declarations() {
        let mut scope = Scope::new();
        let (rest, pushed) = scope.push_ns(attrs(&[
            ("id", "1"),
            ("xmlns", "urn:x"),
            ("xmlns:y", "urn:y"),
            ("y:kind", "z"),
        ]));
        assert_eq!(rest, attrs(&[("id", "1"), ("y:kind", "z")]));
        assert_eq!(
            pushed,
            vec![Binding::new("", "urn:x"), Binding::new("y", "urn:y")]
        );
        assert_eq!(scope.bindings(), pushed.as_slice());
    }

    #[test]
    fn test_push_ns_sorts_declarations_of_one_tag() {
        let mut forward = Scope::new();
        forward.push_ns(attrs(&[("xmlns:b", "urn:b"), ("xmlns:a", "urn:a")]));
        let mut reverse = Scope::new();
        reverse.push_ns(attrs(&[("xmlns:a", "urn:a"), ("xmlns:b", "urn:b")]));
        assert_eq!(forward, reverse);
        assert_eq!(forward.bindings()[0], Binding::new("a", "urn:a"));
    }

    #[test]
    fn test_push_ns_sort_key_is_uri_then_prefix() {
        let mut scope = Scope::new();
        scope.push_ns(attrs(&[("xmlns:a", "urn:z"), ("xmlns:z", "urn:a")]));
        assert_eq!(scope.bindings()[0], Binding::new("z", "urn:a"));
    }

    #[test]
    fn test_push_copies_shared_storage() {
        let mut parent = Scope::new();
        parent.declare("a", "urn:a");
        let mut first = parent.clone();
        let mut second = parent.clone();
        assert!(first.shares_storage(&parent));

        first.push_ns(attrs(&[("xmlns:b", "urn:b")]));
        second.push_ns(attrs(&[("xmlns:c", "urn:c")]));

        assert_eq!(parent.bindings().len(), 1);
        assert_eq!(first.lookup_prefix("c"), None);
        assert_eq!(second.lookup_prefix("b"), None);
        assert!(!first.shares_storage(&parent));
    }

    #[test]
    fn test_push_without_declarations_keeps_sharing() {
        let mut parent = Scope::new();
        parent.declare("a", "urn:a");
        let mut child = parent.clone();
        child.push_ns(attrs(&[("id", "1")]));
        assert!(child.shares_storage(&parent));
    }

    #[test]
    fn test_resolve_reserved_prefixes() {
        let mut scope = Scope::new();
        scope.declare("xml", "urn:bogus");
        assert_eq!(scope.resolve("xml:lang"), Name::new(XML_NAMESPACE, "lang"));
        assert_eq!(scope.resolve("xmlns:p"), Name::new(XMLNS_NAMESPACE, "p"));
    }

    #[test]
    fn test_resolve_innermost_wins() {
        let mut scope = Scope::new();
        scope.declare("p", "urn:outer");
        scope.declare("p", "urn:inner");
        assert_eq!(scope.resolve("p:x"), Name::new("urn:inner", "x"));
    }

    #[test]
    fn test_resolve_ns_reports_unbound_prefix() {
        let scope = Scope::new();
        assert_eq!(scope.resolve_ns("q:x"), (Name::new("q", "x"), false));
        assert_eq!(scope.resolve_ns("x"), (Name::local("x"), false));
    }

    #[test]
    fn test_resolve_ns_unprefixed_found_through_default() {
        let mut scope = Scope::new();
        scope.declare("p", "urn:p");
        assert_eq!(scope.resolve_ns("x"), (Name::local("x"), false));
        scope.declare("", "urn:d");
        assert_eq!(scope.resolve_ns("x"), (Name::new("urn:d", "x"), true));
        scope.declare("", "");
        assert_eq!(scope.resolve_ns("x"), (Name::local("x"), true));
    }

    #[test]
    fn test_resolve_unprefixed_uses_default() {
        let mut scope = Scope::new();
        scope.declare("", "urn:d");
        assert_eq!(scope.resolve("x"), Name::new("urn:d", "x"));
    }

    #[test]
    fn test_resolve_default_overrides() {
        let mut scope = Scope::new();
        scope.declare("", "urn:d");
        scope.declare("p", "urn:p");
        assert_eq!(
            scope.resolve_default("x", "urn:other"),
            Name::new("urn:other", "x")
        );
        assert_eq!(scope.resolve_default("p:x", "urn:other"), Name::new("urn:p", "x"));
        assert_eq!(scope.resolve_default("x", ""), Name::new("urn:d", "x"));
    }

    #[test]
    fn test_prefix_prefers_default() {
        let mut scope = Scope::new();
        scope.declare("", "urn:a");
        scope.declare("a", "urn:a");
        assert_eq!(scope.prefix(&Name::new("urn:a", "x")), "x");
    }

    #[test]
    fn test_prefix_reserved_and_empty() {
        let scope = Scope::new();
        assert_eq!(scope.prefix(&Name::local("x")), "x");
        assert_eq!(scope.prefix(&Name::new(XML_NAMESPACE, "lang")), "xml:lang");
        assert_eq!(scope.prefix(&Name::new(XMLNS_NAMESPACE, "p")), "xmlns:p");
    }

    #[test]
    fn test_prefix_uses_innermost_prefix() {
        let mut scope = Scope::new();
        scope.declare("outer", "urn:a");
        scope.declare("inner", "urn:a");
        assert_eq!(scope.prefix(&Name::new("urn:a", "x")), "inner:x");
    }

    #[test]
    fn test_prefix_ignores_shadowed_bindings() {
        let mut scope = Scope::new();
        scope.declare("", "urn:a");
        scope.declare("p", "urn:a");
        scope.declare("", "urn:b");
        assert_eq!(scope.prefix(&Name::new("urn:a", "x")), "p:x");
        assert_eq!(scope.prefix(&Name::new("urn:b", "x")), "x");
    }

    #[test]
    fn test_prefix_unbound_namespace_is_unqualified() {
        let scope = Scope::new();
        assert_eq!(scope.prefix(&Name::new("urn:nowhere", "x")), "x");
    }

    #[test]
    fn test_prefix_inverts_resolve() {
        let mut scope = Scope::new();
        scope.push_ns(attrs(&[("xmlns", "urn:d"), ("xmlns:p", "urn:p")]));
        for qname in ["x", "p:x", "xml:lang"] {
            assert_eq!(scope.prefix(&scope.resolve(qname)), qname);
        }
    }

    #[test]
    fn test_join_scope_inner_first() {
        let mut outer = Scope::new();
        outer.declare("p", "urn:outer");
        outer.declare("q", "urn:q");
        let mut inner = Scope::new();
        inner.declare("p", "urn:inner");

        let joined = outer.join_scope(&inner);
        assert_eq!(joined.resolve("p:x"), Name::new("urn:inner", "x"));
        assert_eq!(joined.resolve("q:x"), Name::new("urn:q", "x"));
        assert_eq!(outer.resolve("p:x"), Name::new("urn:outer", "x"));
    }

    #[test]
    fn test_local_default_and_visible_bindings() {
        let mut scope = Scope::new();
        scope.declare("", "urn:a");
        assert!(scope.has_local_default());
        scope.declare("p", "urn:p");
        assert!(!scope.has_local_default());
        scope.declare("", "urn:b");
        let visible: Vec<_> = scope.visible_bindings().into_iter().cloned().collect();
        assert_eq!(
            visible,
            vec![Binding::new("p", "urn:p"), Binding::new("", "urn:b")]
        );
        assert_eq!(scope.default_namespace(), Some("urn:b"));
    }

    #[test]
    fn test_name_display() {
        assert_eq!(Name::new("urn:a", "x").to_string(), "{urn:a}x");
        assert_eq!(Name::local("x").to_string(), "x");
    }
}
