//! Tree construction on top of the `quick-xml` token stream.
//!
//! Open elements live on an explicit stack, so document depth never turns
//! into call-stack depth. The byte span of each open element's content is
//! tracked so leaf elements can keep their raw markup.

use std::fmt;
use std::mem;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ParseError, ParseErrorKind, SourceLocation};
use crate::scope::{Name, Scope};
use crate::tree::{Attr, Element, NodeKind};

use super::ParseOptions;

const LOG_TARGET: &str = "xmlscope::parser";

/// An element whose end tag has not been seen yet.
struct Frame {
    element: Element,
    /// Offset just past the start tag.
    begin: usize,
    /// Offset just past the last token read inside the element.
    end: usize,
    /// Character data not yet turned into a node.
    pending: String,
}

pub(crate) struct TreeBuilder<'a> {
    input: &'a str,
    reader: Reader<&'a [u8]>,
    options: &'a ParseOptions,
    stack: Vec<Frame>,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(input: &'a str, options: &'a ParseOptions) -> Self {
        let mut reader = Reader::from_str(input);
        // End tags are matched by resolved name here, not by raw text.
        reader.config_mut().check_end_names = false;
        Self {
            input,
            reader,
            options,
            stack: Vec::new(),
        }
    }

    pub(crate) fn build(mut self) -> Result<Element, ParseError> {
        loop {
            let event = self
                .reader
                .read_event()
                .map_err(|err| self.error(ParseErrorKind::Malformed, err))?;
            match event {
                Event::Start(start) => {
                    self.flush_char_data();
                    let element = self.open(&start)?;
                    let pos = self.position();
                    log::trace!(target: LOG_TARGET, "open {} at depth {}", element.name, self.stack.len());
                    self.stack.push(Frame {
                        element,
                        begin: pos,
                        end: pos,
                        pending: String::new(),
                    });
                }
                Event::Empty(start) => {
                    self.flush_char_data();
                    let element = self.open(&start)?;
                    if let Some(root) = self.attach(element) {
                        return Ok(root);
                    }
                }
                Event::End(end) => {
                    self.flush_char_data();
                    let qname = lossy(end.name().as_ref());
                    let element = self.close(&qname)?;
                    if let Some(root) = self.attach(element) {
                        return Ok(root);
                    }
                }
                Event::Text(text) => self.char_data(&lossy(&text)),
                Event::CData(cdata) => {
                    let raw = lossy(&cdata);
                    self.char_data(&partial_escape(raw.as_str()));
                }
                Event::Comment(text) => {
                    if self.options.comments {
                        self.push_node(NodeKind::Comment, lossy(&text));
                    }
                }
                Event::PI(pi) => {
                    if self.options.proc_inst {
                        self.push_node(NodeKind::ProcInst, lossy(&pi));
                    }
                }
                Event::DocType(text) => {
                    if self.options.directives {
                        let body = lossy(&text);
                        self.push_node(
                            NodeKind::Directive,
                            format!("DOCTYPE {}", body.trim_start()),
                        );
                    }
                }
                Event::Decl(_) => {}
                Event::Eof => return Err(self.unexpected_eof()),
            }
            let pos = self.position();
            if let Some(top) = self.stack.last_mut() {
                top.end = pos;
            }
        }
    }

    fn position(&self) -> usize {
        usize::try_from(self.reader.buffer_position()).unwrap_or(usize::MAX)
    }

    fn error(&self, kind: ParseErrorKind, message: impl fmt::Display) -> ParseError {
        let location = SourceLocation::from_offset(self.input, self.position());
        log::debug!(target: LOG_TARGET, "parse failed at {location}: {message}");
        ParseError::new(kind, message.to_string(), location)
    }

    /// Builds the element for a start tag, resolving names against the
    /// parent's scope plus the tag's own declarations.
    fn open(&self, start: &BytesStart<'_>) -> Result<Element, ParseError> {
        let limit = self.options.max_depth;
        if self.stack.len() >= limit {
            return Err(self.error(
                ParseErrorKind::TooDeep { limit },
                format!("elements nested deeper than {limit} levels"),
            ));
        }

        let mut raw = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| self.error(ParseErrorKind::Malformed, err))?;
            let value = attr
                .unescape_value()
                .map_err(|err| self.error(ParseErrorKind::Malformed, err))?;
            raw.push((lossy(attr.key.as_ref()), value.into_owned()));
        }

        let mut scope = self
            .stack
            .last()
            .map(|frame| frame.element.scope.clone())
            .unwrap_or_default();
        let (plain, _) = scope.push_ns(raw);

        let name = scope.resolve(&lossy(start.name().as_ref()));
        let attrs = plain
            .into_iter()
            .map(|(qname, value)| Attr::new(resolve_attr(&scope, &qname), value))
            .collect();

        Ok(Element {
            kind: NodeKind::Tag,
            name,
            attrs,
            scope,
            content: String::new(),
            children: Vec::new(),
        })
    }

    fn close(&mut self, qname: &str) -> Result<Element, ParseError> {
        let Some(frame) = self.stack.pop() else {
            return Err(self.error(
                ParseErrorKind::Malformed,
                format!("unexpected end tag </{qname}>"),
            ));
        };

        let found = frame.element.scope.resolve(qname);
        if found != frame.element.name {
            let expected = frame.element.scope.prefix(&frame.element.name);
            let message = format!("expecting </{expected}>, got </{qname}>");
            return Err(self.error(
                ParseErrorKind::MismatchedEndTag {
                    expected,
                    found: qname.to_owned(),
                },
                message,
            ));
        }

        log::trace!(target: LOG_TARGET, "close {} at depth {}", frame.element.name, self.stack.len());
        Ok(self.seal(frame))
    }

    /// Decides what a closed element keeps as content: the raw markup of a
    /// leaf, the text of a sole character data child, or nothing.
    fn seal(&self, frame: Frame) -> Element {
        let Frame {
            mut element,
            begin,
            end,
            ..
        } = frame;
        if element.children.is_empty() {
            element.content = self.input.get(begin..end).unwrap_or_default().to_owned();
        } else if element.children.len() == 1 && element.children[0].kind == NodeKind::CharData {
            if let Some(text) = element.children.pop() {
                element.content = text.content;
            }
        }
        element
    }

    /// Hands a finished element to its parent, or returns it if it is the
    /// root.
    fn attach(&mut self, element: Element) -> Option<Element> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.element.children.push(element);
                None
            }
            None => {
                log::debug!(target: LOG_TARGET, "parsed root {}", element.name);
                Some(element)
            }
        }
    }

    fn char_data(&mut self, raw: &str) {
        if !self.options.char_data {
            return;
        }
        if let Some(top) = self.stack.last_mut() {
            top.pending.push_str(raw);
        }
    }

    fn flush_char_data(&mut self) {
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        if top.pending.is_empty() {
            return;
        }
        let raw = mem::take(&mut top.pending);
        top.element
            .children
            .push(Element::with_kind(NodeKind::CharData, normalize_space(&raw)));
    }

    /// Adds a comment, processing instruction or directive to the open
    /// element. Nodes outside the root are dropped.
    fn push_node(&mut self, kind: NodeKind, content: String) {
        self.flush_char_data();
        if let Some(top) = self.stack.last_mut() {
            top.element.children.push(Element::with_kind(kind, content));
        }
    }

    fn unexpected_eof(&self) -> ParseError {
        let message = match self.stack.last() {
            Some(frame) => format!(
                "unexpected end of input: <{}> is not closed",
                frame.element.scope.prefix(&frame.element.name)
            ),
            None => "no root element found".to_owned(),
        };
        self.error(ParseErrorKind::Malformed, message)
    }
}

/// Unprefixed attributes are in no namespace; the default namespace does
/// not apply to them.
fn resolve_attr(scope: &Scope, qname: &str) -> Name {
    if qname.contains(':') {
        scope.resolve(qname)
    } else {
        Name::local(qname)
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Shrinks leading and trailing whitespace runs to one space each. A
/// whitespace-only run becomes a single space.
fn normalize_space(raw: &str) -> String {
    let trimmed = raw.trim_matches(is_xml_space);
    if trimmed.is_empty() {
        return " ".to_owned();
    }
    let mut text = String::with_capacity(trimmed.len() + 2);
    if raw.starts_with(is_xml_space) {
        text.push(' ');
    }
    text.push_str(trimmed);
    if raw.ends_with(is_xml_space) {
        text.push(' ');
    }
    text
}

fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}
