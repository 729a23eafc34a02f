//! Serialization of element trees back to XML text.
//!
//! [`marshal`] writes a subtree as a standalone document fragment, adding
//! whatever namespace declarations the fragment needs to mean the same
//! thing outside its original document. [`unmarshal`] goes one step
//! further and decodes that fragment into a serde type.

pub mod xml;

pub use xml::{marshal, marshal_into};

use serde::de::DeserializeOwned;

use crate::tree::Element;

/// Decodes the subtree rooted at `el` into `T` with `quick-xml`'s serde
/// deserializer.
///
/// Attributes map to fields renamed with an `@` prefix, and child elements
/// map to fields by local name.
///
/// ```
/// use serde::Deserialize;
/// use xmlscope::parser::parse_str;
/// use xmlscope::serial::unmarshal;
///
/// #[derive(Deserialize)]
/// struct Item {
///     #[serde(rename = "@id")]
///     id: u32,
///     name: String,
/// }
///
/// let root = parse_str(r#"<list><item id="7"><name>widget</name></item></list>"#).unwrap();
/// let item: Item = unmarshal(root.first().unwrap()).unwrap();
/// assert_eq!(item.id, 7);
/// assert_eq!(item.name, "widget");
/// ```
///
/// # Errors
///
/// Returns `DeError` if the marshalled XML does not fit `T`.
pub fn unmarshal<T: DeserializeOwned>(el: &Element) -> Result<T, quick_xml::DeError> {
    quick_xml::de::from_str(&marshal(el))
}
