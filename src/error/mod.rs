//! Error types for parsing and namespace normalization.
//!
//! Parse errors are fatal: the parser never hands back a partially built
//! tree. Each error carries a [`ParseErrorKind`] so callers can tell a
//! malformed document apart from a tripped resource guard, plus the source
//! location where the tokenizer stopped.
//!
//! Namespace normalization failures are reported through
//! [`NamespaceError`]; they leave the tree untouched and are safe to ignore.

use std::fmt;

use crate::encoding::EncodingError;

/// Source location within the decoded XML text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the decoded input.
    pub byte_offset: usize,
}

impl SourceLocation {
    /// Computes the line and column of `offset` within `input`.
    ///
    /// Offsets past the end of the input are clamped to its length.
    #[must_use]
    pub fn from_offset(input: &str, offset: usize) -> Self {
        let mut offset = offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &input[..offset];
        let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
        let line = before.matches('\n').count() + 1;
        let column = before[line_start..].chars().count() + 1;
        Self {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
            byte_offset: offset,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The category of a [`ParseError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The token stream is not well-formed: a tokenizer error, a missing
    /// root element, an end tag with nothing open, or input ending inside
    /// an element.
    Malformed,
    /// The input stream could not be read.
    Io,
    /// The input bytes could not be transcoded to UTF-8.
    Encoding,
    /// An end tag did not match the element currently open.
    MismatchedEndTag {
        /// The open element's name, written through its own scope.
        expected: String,
        /// The end tag's name as it appeared in the document.
        found: String,
    },
    /// Elements were nested deeper than the configured ceiling.
    TooDeep {
        /// The ceiling that was exceeded.
        limit: usize,
    },
}

/// The error type returned when parsing fails.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Where in the decoded input the error was detected.
    pub location: SourceLocation,
}

impl ParseError {
    pub(crate) fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }

    /// Returns `true` if the document exceeded the nesting ceiling.
    #[must_use]
    pub fn is_too_deep(&self) -> bool {
        matches!(self.kind, ParseErrorKind::TooDeep { .. })
    }

    /// Returns `true` if an end tag did not match its start tag.
    #[must_use]
    pub fn is_mismatch(&self) -> bool {
        matches!(self.kind, ParseErrorKind::MismatchedEndTag { .. })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at {}: {}", self.location, self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ParseErrorKind::Io, err.to_string(), SourceLocation::default())
    }
}

impl From<EncodingError> for ParseError {
    fn from(err: EncodingError) -> Self {
        Self::new(
            ParseErrorKind::Encoding,
            err.message,
            SourceLocation::default(),
        )
    }
}

/// Why a namespace normalization step left the tree unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceError {
    /// The element does not declare a default namespace of its own.
    NoLocalDefault,
    /// No enclosing binding carries the element's namespace.
    NoMatchingNamespace,
}

impl fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLocalDefault => write!(f, "no local default namespace, nothing done"),
            Self::NoMatchingNamespace => {
                write!(f, "could not find an enclosing namespace to fall back on")
            }
        }
    }
}

impl std::error::Error for NamespaceError {}
