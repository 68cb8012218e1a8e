//! Type-level metadata consumed by the graph builder and the serializer.

use crate::error::Result;

use super::types::TypeCandidate;

/// Source of per-type field metadata.
///
/// Implementations only describe types; they never see live instances.
/// Errors are propagated unchanged by the builder and serializer, tagged with
/// the type and field being processed.
pub trait MetadataSource {
    /// Declared fields of the type, in declaration order.
    fn list_fields(&self, type_name: &str) -> Result<Vec<String>>;

    /// Raw type candidates for one field, most authoritative first.
    fn type_candidates(&self, type_name: &str, field: &str) -> Result<Vec<TypeCandidate>>;

    /// Declared display name of the type, if any.
    fn declared_name(&self, type_name: &str) -> Result<Option<String>>;

    /// Declared path of the type, if any.
    fn declared_path(&self, _type_name: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Camel-case form of a type identifier: `app::BookAuthor` -> `appBookAuthor`.
///
/// Used as the display name when a type declares none.
pub fn camel_case(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len());
    for (i, word) in identifier
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Kebab-case form of a type identifier: `app::BookAuthor` -> `app-book-author`.
///
/// Used as the path when a type declares none.
pub fn kebab_case(identifier: &str) -> String {
    let camel = camel_case(identifier);
    let mut out = String::with_capacity(camel.len() + 4);
    let mut prev: Option<char> = None;
    for c in camel.chars() {
        if let Some(p) = prev {
            let boundary = (p.is_lowercase() && c.is_uppercase())
                || (p.is_ascii_digit() && c.is_alphabetic())
                || (p.is_alphabetic() && c.is_ascii_digit());
            if boundary {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
        prev = Some(c);
    }
    out
}
