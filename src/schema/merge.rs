//
//  merge.rs
//  Trellis
//
//  Created by hak (tharun)
//

use std::slice;

use super::types::{FieldType, TypeCandidate};

/// Merge the type candidates reported for one field into a single [`FieldType`].
///
/// Candidates are ordered most authoritative first. Each attribute is resolved
/// on its own: the first candidate that supplies it wins, later candidates
/// never override it. Returns `None` when no candidate supplies a builtin kind.
///
/// `nullable` and `collection` use the same first-supplied rule as the other
/// attributes and only fall back to `false` when no candidate mentions them.
pub fn merge_candidates(candidates: &[TypeCandidate]) -> Option<FieldType> {
    let mut builtin = None;
    let mut nullable = None;
    let mut class_name: Option<&str> = None;
    let mut collection = None;
    let mut key_type: Option<&TypeCandidate> = None;
    let mut value_type: Option<&TypeCandidate> = None;

    for candidate in candidates {
        builtin = builtin.or(candidate.builtin);
        nullable = nullable.or(candidate.nullable);
        class_name = class_name.or(candidate.class_name.as_deref());
        collection = collection.or(candidate.collection);
        key_type = key_type.or(candidate.key_type.as_deref());
        value_type = value_type.or(candidate.value_type.as_deref());
    }

    Some(FieldType {
        builtin: builtin?,
        nullable: nullable.unwrap_or(false),
        class_name: class_name.map(str::to_string),
        collection: collection.unwrap_or(false),
        key_type: key_type.and_then(merge_nested),
        value_type: value_type.and_then(merge_nested),
    })
}

fn merge_nested(candidate: &TypeCandidate) -> Option<Box<FieldType>> {
    merge_candidates(slice::from_ref(candidate)).map(Box::new)
}
