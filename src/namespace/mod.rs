//! Namespace normalization.
//!
//! These passes rewrite the scopes attached to a subtree so that names are
//! written with fewer prefixes. They never change the namespace an element
//! or attribute name resolves to in the tree itself; they only change the
//! declarations a later [`marshal`](crate::serial::marshal) will emit.
//!
//! An element is said to set its own default namespace when the innermost
//! binding of its scope has an empty prefix.

use crate::error::NamespaceError;
use crate::scope::{Binding, Scope};
use crate::tree::Element;

const LOG_TARGET: &str = "xmlscope::namespace";

/// What [`Element::simplify_ns`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimplifyOutcome {
    /// The element's namespace became the default for the subtree.
    Promoted,
    /// The element's namespace dominates and is already its own default.
    AlreadyDefault,
    /// A redundant local default declaration was dropped.
    Collapsed,
    /// Nothing was changed.
    Unchanged(NamespaceError),
}

impl Element {
    /// Drops this element's own default namespace declaration when an
    /// enclosing binding already carries the element's namespace.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceError::NoLocalDefault`] if the element does not
    /// set its own default namespace, and
    /// [`NamespaceError::NoMatchingNamespace`] if no enclosing binding has
    /// the element's namespace. The scope is left untouched in both cases.
    pub fn remove_local_ns(&mut self) -> Result<(), NamespaceError> {
        if !self.scope.has_local_default() {
            return Err(NamespaceError::NoLocalDefault);
        }
        let Some((_, outer)) = self.scope.bindings().split_last() else {
            return Err(NamespaceError::NoLocalDefault);
        };
        if !outer.iter().rev().any(|b| b.uri == self.name.space) {
            return Err(NamespaceError::NoMatchingNamespace);
        }
        self.scope.bindings_mut().pop();
        Ok(())
    }

    /// Makes the element's namespace the default for its subtree when most
    /// descendants share it, or otherwise tries
    /// [`remove_local_ns`](Self::remove_local_ns).
    ///
    /// Descendants are counted in depth-first order, skipping any subtree
    /// whose root sets its own default namespace. When the element's
    /// namespace wins the vote:
    ///
    /// - if the element already sets its own default, nothing changes;
    /// - otherwise every default binding in the element's scope is pointed
    ///   at its namespace (one is added as the outermost binding if there
    ///   is none), and each counted descendant gets the same treatment on
    ///   its first default binding.
    ///
    /// This is a best-effort tidy-up. Names in no namespace, or in a
    /// namespace that loses its only prefix, may end up needing `xmlns=""`
    /// or extra declarations when marshalled.
    ///
    /// ```
    /// use xmlscope::namespace::SimplifyOutcome;
    /// use xmlscope::parser::parse_str;
    ///
    /// let mut root = parse_str(r#"<p:r xmlns:p="urn:p"><p:a/><p:b/></p:r>"#).unwrap();
    /// assert_eq!(root.simplify_ns(), SimplifyOutcome::Promoted);
    /// let a = &root.children[0];
    /// assert_eq!(a.scope.prefix(&a.name), "a");
    /// ```
    pub fn simplify_ns(&mut self) -> SimplifyOutcome {
        let space = self.name.space.clone();
        let (mut same, mut other) = (0usize, 0usize);
        self.walk_depth(|e| {
            if e.scope.has_local_default() {
                return false;
            }
            if e.name.space == space {
                same += 1;
            } else {
                other += 1;
            }
            true
        });
        log::debug!(target: LOG_TARGET, "simplify {}: {same} same, {other} other", self.name);

        if same <= other {
            return match self.remove_local_ns() {
                Ok(()) => {
                    log::debug!(target: LOG_TARGET, "collapsed local default on {}", self.name);
                    SimplifyOutcome::Collapsed
                }
                Err(err) => SimplifyOutcome::Unchanged(err),
            };
        }
        if self.scope.has_local_default() {
            return SimplifyOutcome::AlreadyDefault;
        }

        set_default(&mut self.scope, &space, true);
        self.walk_depth_mut(|e| {
            if e.scope.has_local_default() {
                return false;
            }
            set_default(&mut e.scope, &space, false);
            true
        });
        log::debug!(target: LOG_TARGET, "promoted {space} to default under {}", self.name);
        SimplifyOutcome::Promoted
    }
}

/// Points default bindings at `space`: all of them, or only the outermost.
/// With no default binding, one is inserted as the outermost binding.
fn set_default(scope: &mut Scope, space: &str, all: bool) {
    let bindings = scope.bindings_mut();
    let mut found = false;
    for binding in bindings.iter_mut().filter(|b| b.is_default()) {
        space.clone_into(&mut binding.uri);
        found = true;
        if !all {
            break;
        }
    }
    if !found {
        bindings.insert(0, Binding::new("", space));
    }
}
