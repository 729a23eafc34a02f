//! `QName` (qualified name) text handling.
//!
//! A `QName` is written `prefix:local` or just `local`. Only the first colon
//! separates the two parts.
//!
//! See <https://www.w3.org/TR/xml-names/#NT-QName>

/// Splits a `QName` into its prefix and local part.
///
/// An unprefixed name yields an empty prefix, which is also how the
/// default namespace binding is keyed.
///
/// ```
/// use xmlscope::util::qname::split_qname;
///
/// assert_eq!(split_qname("svg:rect"), ("svg", "rect"));
/// assert_eq!(split_qname("div"), ("", "div"));
/// ```
#[must_use]
pub fn split_qname(qname: &str) -> (&str, &str) {
    qname.split_once(':').unwrap_or(("", qname))
}

/// Writes `prefix:local`, or `local` alone when the prefix is empty.
#[must_use]
pub fn join_qname(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_owned()
    } else {
        format!("{prefix}:{local}")
    }
}
