//! Node kind definitions.

use std::fmt;

/// The kind of a node in an element tree.
///
/// Only [`Tag`](NodeKind::Tag) nodes carry a name, attributes, a namespace
/// scope and children. The other kinds hold their raw markup text in the
/// element's `content` field and are only produced when the parser is asked
/// to retain them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An element, e.g. `<item id="x">`.
    #[default]
    Tag,
    /// Character data between tags, stored escaped.
    CharData,
    /// A comment; content is the text between `<!--` and `-->`.
    Comment,
    /// A processing instruction; content is the text between `<?` and `?>`.
    ProcInst,
    /// A markup declaration; content is the text between `<!` and `>`.
    Directive,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tag => "tag",
            Self::CharData => "character data",
            Self::Comment => "comment",
            Self::ProcInst => "processing instruction",
            Self::Directive => "directive",
        })
    }
}
