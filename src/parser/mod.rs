//! Streaming XML parser that builds [`Element`] trees.
//!
//! Tokens come from `quick-xml`; this module owns everything above the
//! token level. While building the tree it keeps a stack of open elements,
//! and each open element carries the namespace [`Scope`](crate::scope::Scope)
//! in effect at its start tag. A child's scope starts as a copy of its
//! parent's and is extended with the child's own `xmlns` declarations.
//!
//! Markup before the root element (XML declaration, DOCTYPE, comments) is
//! skipped, and the parser stops as soon as the root element closes.
//!
//! Character data, comments, processing instructions and directives are
//! only kept as child nodes when the matching [`ParseOptions`] flag is set.

mod builder;

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use crate::encoding::{decode_with, EncodingRsTranscoder, Transcoder};
use crate::error::ParseError;
use crate::tree::{Element, RECURSION_LIMIT};

use builder::TreeBuilder;

/// Options controlling which nodes the parser retains and how deep it will
/// nest.
///
/// Use the builder pattern to configure options:
///
/// ```
/// use xmlscope::parser::{parse_str_with_options, ParseOptions};
///
/// let opts = ParseOptions::default().char_data(true).max_depth(64);
/// let root = parse_str_with_options("<a><b>hi</b><c/></a>", &opts).unwrap();
/// assert_eq!(root.children[0].content, "hi");
/// ```
#[derive(Clone)]
pub struct ParseOptions {
    /// Keep character data as child nodes, with whitespace runs collapsed.
    pub char_data: bool,
    /// Keep comments as child nodes.
    pub comments: bool,
    /// Keep processing instructions as child nodes.
    pub proc_inst: bool,
    /// Keep `<!...>` directives found inside the root as child nodes.
    pub directives: bool,
    /// Maximum element nesting depth (default: [`RECURSION_LIMIT`]).
    pub max_depth: usize,
    /// Charset converter for non-UTF-8 byte input. `None` uses
    /// `encoding_rs`.
    pub transcoder: Option<Arc<dyn Transcoder + Send + Sync>>,
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("char_data", &self.char_data)
            .field("comments", &self.comments)
            .field("proc_inst", &self.proc_inst)
            .field("directives", &self.directives)
            .field("max_depth", &self.max_depth)
            .field("transcoder", &self.transcoder.as_ref().map(|_| "..."))
            .finish()
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            char_data: false,
            comments: false,
            proc_inst: false,
            directives: false,
            max_depth: RECURSION_LIMIT,
            transcoder: None,
        }
    }
}

impl ParseOptions {
    /// Keeps or drops character data nodes.
    #[must_use]
    pub fn char_data(mut self, yes: bool) -> Self {
        self.char_data = yes;
        self
    }

    /// Keeps or drops comment nodes.
    #[must_use]
    pub fn comments(mut self, yes: bool) -> Self {
        self.comments = yes;
        self
    }

    /// Keeps or drops processing instruction nodes.
    #[must_use]
    pub fn proc_inst(mut self, yes: bool) -> Self {
        self.proc_inst = yes;
        self
    }

    /// Keeps or drops directive nodes.
    #[must_use]
    pub fn directives(mut self, yes: bool) -> Self {
        self.directives = yes;
        self
    }

    /// Sets the maximum element nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    /// Sets the charset converter used by the byte and reader entry points.
    #[must_use]
    pub fn transcoder(mut self, transcoder: impl Transcoder + Send + Sync + 'static) -> Self {
        self.transcoder = Some(Arc::new(transcoder));
        self
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, ParseError> {
        let text = match &self.transcoder {
            Some(transcoder) => decode_with(bytes, transcoder.as_ref())?,
            None => decode_with(bytes, &EncodingRsTranscoder)?,
        };
        Ok(text)
    }
}

/// Parses an XML string with default options.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed, an end tag does
/// not match its start tag, or elements nest deeper than
/// [`RECURSION_LIMIT`].
pub fn parse_str(input: &str) -> Result<Element, ParseError> {
    parse_str_with_options(input, &ParseOptions::default())
}

/// Parses an XML string with the given options.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed, an end tag does
/// not match its start tag, or elements nest deeper than
/// `options.max_depth`.
pub fn parse_str_with_options(input: &str, options: &ParseOptions) -> Result<Element, ParseError> {
    TreeBuilder::new(input, options).build()
}

/// Parses raw bytes with default options, detecting the character set from
/// the BOM and the XML declaration.
///
/// # Errors
///
/// Returns `ParseError` if the bytes cannot be decoded or the decoded text
/// does not parse.
pub fn parse_bytes(bytes: &[u8]) -> Result<Element, ParseError> {
    parse_bytes_with_options(bytes, &ParseOptions::default())
}

/// Parses raw bytes with the given options.
///
/// # Errors
///
/// Returns `ParseError` if the bytes cannot be decoded or the decoded text
/// does not parse.
pub fn parse_bytes_with_options(
    bytes: &[u8],
    options: &ParseOptions,
) -> Result<Element, ParseError> {
    let text = options.decode(bytes)?;
    parse_str_with_options(&text, options)
}

/// Reads `reader` to the end and parses the result.
///
/// # Errors
///
/// Returns `ParseError` if reading fails, the bytes cannot be decoded, or
/// the decoded text does not parse.
pub fn parse_reader<R: Read>(mut reader: R, options: &ParseOptions) -> Result<Element, ParseError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_bytes_with_options(&bytes, options)
}
