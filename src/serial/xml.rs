//! XML writer for element trees.
//!
//! Output is compact: no XML declaration, no added whitespace. Content is
//! written verbatim because it already holds escaped markup.

use crate::scope::{Binding, Scope, XMLNS_NAMESPACE, XML_NAMESPACE};
use crate::tree::{Element, NodeKind};
use crate::util::qname::join_qname;

/// Serializes `el` and its subtree to an XML string.
///
/// Each element's names are written through its own scope, and each start
/// tag declares only the bindings that differ from what its ancestors in
/// the output already declared.
///
/// # Examples
///
/// ```
/// use xmlscope::parser::parse_str;
/// use xmlscope::serial::marshal;
///
/// let root = parse_str(r#"<a xmlns="urn:x"><b xmlns:y="urn:y"><y:c/></b></a>"#).unwrap();
/// let b = root.first().unwrap();
/// assert_eq!(marshal(b), r#"<b xmlns="urn:x" xmlns:y="urn:y"><y:c/></b>"#);
/// ```
#[must_use]
pub fn marshal(el: &Element) -> String {
    let mut out = String::new();
    marshal_into(&mut out, el);
    out
}

/// Appends the serialization of `el` to `out`.
pub fn marshal_into(out: &mut String, el: &Element) {
    Writer {
        out,
        context: Scope::new(),
    }
    .write(el);
}

enum Step<'a> {
    Enter(&'a Element),
    Leave { qname: String, mark: usize },
}

struct Writer<'o> {
    out: &'o mut String,
    /// Bindings declared by the open elements in the output so far.
    context: Scope,
}

impl Writer<'_> {
    fn write(&mut self, root: &Element) {
        let mut steps = vec![Step::Enter(root)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Enter(el) if !el.is_tag() => self.write_node(el),
                Step::Enter(el) => {
                    let mark = self.context.bindings().len();
                    let qname = self.write_start_tag(el);
                    if el.content.is_empty() && el.children.is_empty() {
                        self.out.push_str("/>");
                        self.context.bindings_mut().truncate(mark);
                        continue;
                    }
                    self.out.push('>');
                    self.out.push_str(&el.content);
                    steps.push(Step::Leave { qname, mark });
                    steps.extend(el.children.iter().rev().map(Step::Enter));
                }
                Step::Leave { qname, mark } => {
                    self.out.push_str("</");
                    self.out.push_str(&qname);
                    self.out.push('>');
                    self.context.bindings_mut().truncate(mark);
                }
            }
        }
    }

    fn write_node(&mut self, el: &Element) {
        let (open, close) = match el.kind {
            NodeKind::CharData | NodeKind::Tag => ("", ""),
            NodeKind::Comment => ("<!--", "-->"),
            NodeKind::ProcInst => ("<?", "?>"),
            NodeKind::Directive => ("<!", ">"),
        };
        self.out.push_str(open);
        self.out.push_str(&el.content);
        self.out.push_str(close);
    }

    /// Writes `<name`, the needed declarations and the attributes, and
    /// returns the name as written.
    fn write_start_tag(&mut self, el: &Element) -> String {
        let mut declared: Vec<Binding> = Vec::new();

        let default_ns = desired_default(el);
        if self.context.default_namespace().unwrap_or_default() != default_ns {
            self.declare(&mut declared, "", default_ns);
        }
        for binding in el.scope.visible_bindings() {
            if binding.is_default()
                || binding.uri.is_empty()
                || binding.prefix == "xml"
                || binding.prefix == "xmlns"
            {
                continue;
            }
            if self.context.lookup_prefix(&binding.prefix) != Some(binding.uri.as_str()) {
                self.declare(&mut declared, &binding.prefix, &binding.uri);
            }
        }

        let qname = self
            .context
            .lookup_namespace(&el.name.space, true)
            .map_or_else(|| el.name.local.clone(), |p| join_qname(p, &el.name.local));

        let mut attrs = Vec::with_capacity(el.attrs.len());
        for attr in &el.attrs {
            let prefix = match self.context.lookup_namespace(&attr.name.space, false) {
                Some(prefix) => prefix.to_owned(),
                None => {
                    let prefix = self.unused_prefix();
                    self.declare(&mut declared, &prefix, &attr.name.space);
                    prefix
                }
            };
            attrs.push((join_qname(&prefix, &attr.name.local), attr.value.as_str()));
        }

        self.out.push('<');
        self.out.push_str(&qname);
        for binding in &declared {
            self.out.push_str(" xmlns");
            if !binding.is_default() {
                self.out.push(':');
                self.out.push_str(&binding.prefix);
            }
            self.out.push_str("=\"");
            write_escaped_attr(self.out, &binding.uri);
            self.out.push('"');
        }
        for (name, value) in attrs {
            self.out.push(' ');
            self.out.push_str(&name);
            self.out.push_str("=\"");
            write_escaped_attr(self.out, value);
            self.out.push('"');
        }
        qname
    }

    fn declare(&mut self, declared: &mut Vec<Binding>, prefix: &str, uri: &str) {
        self.context.declare(prefix, uri);
        declared.push(Binding::new(prefix, uri));
    }

    /// Picks the first `nsN` prefix not bound in the output.
    fn unused_prefix(&self) -> String {
        (0..)
            .map(|n| format!("ns{n}"))
            .find(|p| self.context.lookup_prefix(p).is_none())
            .unwrap_or_default()
    }
}

/// The default namespace the start tag of `el` must leave in effect: empty
/// for a name in no namespace, the name's own namespace when the scope has
/// no binding for it, and the scope's default otherwise.
fn desired_default(el: &Element) -> &str {
    let space = el.name.space.as_str();
    if space.is_empty() {
        return "";
    }
    if space != XML_NAMESPACE
        && space != XMLNS_NAMESPACE
        && el.scope.lookup_namespace(space, true).is_none()
    {
        return space;
    }
    el.scope.default_namespace().unwrap_or_default()
}

/// Writes a hexadecimal character reference (`&#xHH;`) for a code point.
fn write_hex_char_ref(out: &mut String, ch: char) {
    out.push_str(&format!("&#x{:X};", u32::from(ch)));
}

/// Escapes an attribute value for a double-quoted attribute.
fn write_escaped_attr(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c if (c as u32) < 0x20 => write_hex_char_ref(out, c),
            _ => out.push(ch),
        }
    }
}
