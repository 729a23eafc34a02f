//! # xmlscope
//!
//! XML element trees that remember their namespace scope. Every tag in a
//! parsed tree carries the `xmlns` bindings visible at its position, so
//! prefixed names found anywhere (in attribute values, in text, in tags
//! grafted in later) can be resolved after parsing. On top of the tree sit
//! a selector-based query engine and a heuristic that rewrites prefixes
//! into default namespaces.
//!
//! ## Quick Start
//!
//! ```
//! use xmlscope::{parse_str, Selector};
//!
//! let root = parse_str(r#"<a xmlns="urn:x"><b xmlns:y="urn:y"><y:c/></b></a>"#).unwrap();
//! let b = root.match_one(&Selector::new("b")).unwrap();
//! assert_eq!(b.scope.resolve("y:c").space, "urn:y");
//! assert_eq!(b.scope.resolve("c").space, "urn:x");
//! assert_eq!(root.find(&Selector::new("c").space("urn:y")).len(), 1);
//! ```

pub mod encoding;
pub mod error;
pub mod namespace;
pub mod parser;
pub mod query;
pub mod scope;
pub mod serial;
pub mod tree;
pub mod util;

// Re-export primary types at the crate root for convenience.
pub use error::{NamespaceError, ParseError, ParseErrorKind};
pub use namespace::SimplifyOutcome;
pub use parser::{parse_bytes, parse_reader, parse_str, parse_str_with_options, ParseOptions};
pub use query::Selector;
pub use scope::{Binding, Name, Scope};
pub use serial::{marshal, unmarshal};
pub use tree::{Attr, Element, NodeKind, RECURSION_LIMIT};
