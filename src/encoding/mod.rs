//! Character-set detection and transcoding.
//!
//! The tree builder works on UTF-8 text only. Raw bytes are turned into
//! UTF-8 here before any tokenization happens, so byte offsets recorded by
//! the parser always index into the decoded text.
//!
//! Detection order:
//!
//! 1. A Byte Order Mark, if present, picks the initial encoding.
//! 2. Without a BOM the input is assumed to be UTF-8.
//! 3. The `encoding=` label of the XML declaration overrides the guess
//!    when it names a different encoding.
//!
//! The conversion itself goes through the [`Transcoder`] trait so callers
//! can plug in their own tables; [`EncodingRsTranscoder`] is the default.

use std::fmt;

/// An error that occurs during encoding detection or transcoding.
#[derive(Debug, Clone)]
pub struct EncodingError {
    /// A human-readable description of the encoding error.
    pub message: String,
}

impl EncodingError {
    /// Creates a new `EncodingError` with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "encoding error: {}", self.message)
    }
}

impl std::error::Error for EncodingError {}

/// Converts bytes in a labelled character set to UTF-8.
pub trait Transcoder {
    /// Decodes `bytes`, which are encoded as `label` (an IANA charset name,
    /// matched case-insensitively).
    ///
    /// # Errors
    ///
    /// Returns `EncodingError` if the label is unknown or the bytes are not
    /// valid in that encoding.
    fn transcode(&self, bytes: &[u8], label: &str) -> Result<String, EncodingError>;
}

/// The default [`Transcoder`], backed by `encoding_rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingRsTranscoder;

impl Transcoder for EncodingRsTranscoder {
    fn transcode(&self, bytes: &[u8], label: &str) -> Result<String, EncodingError> {
        transcode(bytes, label)
    }
}

/// Detects the encoding of an XML byte stream by inspecting the Byte Order Mark.
///
/// Returns a tuple of (encoding label, number of BOM bytes to skip).
///
/// # Examples
///
/// ```
/// use xmlscope::encoding::detect_encoding;
///
/// assert_eq!(detect_encoding(b"\xEF\xBB\xBF<a/>"), ("UTF-8", 3));
/// assert_eq!(detect_encoding(b"\xFF\xFE<\x00"), ("UTF-16LE", 2));
/// assert_eq!(detect_encoding(b"<a/>"), ("UTF-8", 0));
/// ```
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> (&'static str, usize) {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => ("UTF-8", 3),
        [0xFE, 0xFF, ..] => ("UTF-16BE", 2),
        [0xFF, 0xFE, ..] => ("UTF-16LE", 2),
        _ => ("UTF-8", 0),
    }
}

/// Transcodes a byte slice from the named encoding into a UTF-8 `String`
/// using `encoding_rs`.
///
/// # Errors
///
/// Returns `EncodingError` if the encoding name is not recognized or if
/// the input contains malformed byte sequences.
///
/// # Examples
///
/// ```
/// use xmlscope::encoding::transcode;
///
/// assert_eq!(transcode(b"caf\xE9", "ISO-8859-1").unwrap(), "caf\u{e9}");
/// ```
pub fn transcode(bytes: &[u8], label: &str) -> Result<String, EncodingError> {
    let encoding = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| EncodingError::new(format!("unsupported encoding: {label}")))?;

    let (result, _used_encoding, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(EncodingError::new(format!(
            "malformed byte sequence for encoding {label}"
        )));
    }
    Ok(result.into_owned())
}

/// Decodes raw XML bytes into UTF-8 with the default transcoder.
///
/// # Errors
///
/// Returns `EncodingError` if the bytes are invalid for the detected
/// encoding or the declared encoding is unsupported.
///
/// # Examples
///
/// ```
/// use xmlscope::encoding::decode_to_utf8;
///
/// let text = decode_to_utf8(b"<?xml version=\"1.0\"?><root/>").unwrap();
/// assert!(text.ends_with("<root/>"));
/// ```
pub fn decode_to_utf8(bytes: &[u8]) -> Result<String, EncodingError> {
    decode_with(bytes, &EncodingRsTranscoder)
}

/// Decodes raw XML bytes into UTF-8, delegating charset conversion to
/// `transcoder`. The returned text never starts with a BOM.
///
/// # Errors
///
/// Returns `EncodingError` if the transcoder rejects the input or the
/// input is neither valid UTF-8 nor labelled with another encoding.
pub fn decode_with(bytes: &[u8], transcoder: &dyn Transcoder) -> Result<String, EncodingError> {
    let (bom_label, bom_len) = detect_encoding(bytes);
    let content = &bytes[bom_len..];

    if bom_label == "UTF-8" {
        if let Ok(text) = std::str::from_utf8(content) {
            return match declared_encoding(text.as_bytes()) {
                Some(label) if !is_utf8_label(&label) => transcoder.transcode(content, &label),
                _ => Ok(text.to_owned()),
            };
        }
        // The declaration is ASCII-compatible, so it can still be read from
        // the raw bytes when the body is in a single-byte charset.
        return match declared_encoding(content) {
            Some(label) => transcoder.transcode(content, &label),
            None => Err(EncodingError::new("input is not valid UTF-8")),
        };
    }

    let text = transcoder.transcode(content, bom_label)?;
    match declared_encoding(text.as_bytes()) {
        Some(label) if !same_encoding(&label, bom_label) => transcoder.transcode(content, &label),
        _ => Ok(text),
    }
}

/// Extracts the `encoding` pseudo-attribute from an XML declaration at the
/// very start of `bytes`.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let scan = &bytes[..bytes.len().min(200)];
    if !scan.starts_with(b"<?xml") {
        return None;
    }
    let decl_end = scan.windows(2).position(|w| w == b"?>")?;
    let decl = &scan[..decl_end];

    let needle = b"encoding";
    let pos = decl.windows(needle.len()).position(|w| w == needle)?;
    let rest = skip_ascii_whitespace(&decl[pos + needle.len()..]);
    let rest = skip_ascii_whitespace(rest.strip_prefix(b"=")?);

    let quote = *rest.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value = &rest[1..];
    let end = value.iter().position(|&b| b == quote)?;
    let label = &value[..end];
    if label.is_ascii() {
        Some(String::from_utf8_lossy(label).into_owned())
    } else {
        None
    }
}

fn skip_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|&&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        .count();
    &bytes[skip..]
}

fn is_utf8_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("UTF-8") || label.eq_ignore_ascii_case("UTF8")
}

/// "UTF-16" in a declaration is satisfied by either BOM byte order.
fn same_encoding(declared: &str, bom: &str) -> bool {
    declared.eq_ignore_ascii_case(bom)
        || (declared.eq_ignore_ascii_case("UTF-16") && bom.starts_with("UTF-16"))
}
