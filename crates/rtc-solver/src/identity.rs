//! Invariant type equality (`is-same-type`).
//!
//! Used wherever subtyping would be unsound: function signatures and the
//! member types of nominal objects. Two interned descriptors are the same
//! type when they share an id; arrays additionally compare equal when their
//! element chains do, regardless of size state.

use crate::db::TypeDatabase;
use crate::types::{TypeData, TypeId};

pub fn is_same_type(db: &dyn TypeDatabase, source: TypeId, target: TypeId) -> bool {
    if source == target {
        return true;
    }
    match (db.lookup(source), db.lookup(target)) {
        (Some(TypeData::Array(source)), Some(TypeData::Array(target))) => {
            same_element_chain(db, source.element, target.element)
        }
        // Interned maps are equal exactly when their ids are.
        (Some(TypeData::Map(source)), Some(TypeData::Map(target))) => source == target,
        _ => false,
    }
}

/// Walk nested array element types in lockstep.
fn same_element_chain(db: &dyn TypeDatabase, mut actual: TypeId, mut expected: TypeId) -> bool {
    loop {
        if actual == expected {
            return true;
        }
        match (db.lookup(actual), db.lookup(expected)) {
            (Some(TypeData::Array(a)), Some(TypeData::Array(e))) => {
                actual = a.element;
                expected = e.element;
            }
            _ => return false,
        }
    }
}

/// Pairwise `is-same-type` over two lists of equal length.
pub fn same_type_lists(db: &dyn TypeDatabase, source: &[TypeId], target: &[TypeId]) -> bool {
    source.len() == target.len()
        && source
            .iter()
            .zip(target)
            .all(|(&s, &t)| is_same_type(db, s, t))
}

#[cfg(test)]
#[path = "../tests/identity_tests.rs"]
mod tests;
