//! Constrained and sequence containers: `map`, `future`, `table`, arrays and
//! tuples. All of them are covariant in their element or constraint types.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{ArrayType, TypeData, TypeId, TypeListId};

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_map(&mut self, source: TypeId, constraint: TypeId) -> SubtypeResult {
        match self.interner.lookup(source) {
            Some(TypeData::Map(source_constraint)) => {
                self.check_subtype(source_constraint, constraint)
            }
            _ => SubtypeResult::False,
        }
    }

    pub(crate) fn check_future(&mut self, source: TypeId, constraint: TypeId) -> SubtypeResult {
        match self.interner.lookup(source) {
            Some(TypeData::Future(source_constraint)) => {
                self.check_subtype(source_constraint, constraint)
            }
            _ => SubtypeResult::False,
        }
    }

    /// A missing constraint on either side stands for `any`.
    pub(crate) fn check_table(
        &mut self,
        source: TypeId,
        constraint: Option<TypeId>,
    ) -> SubtypeResult {
        match self.interner.lookup(source) {
            Some(TypeData::Table(source_constraint)) => self.check_subtype(
                source_constraint.unwrap_or(TypeId::ANY),
                constraint.unwrap_or(TypeId::ANY),
            ),
            _ => SubtypeResult::False,
        }
    }

    /// Size state must match exactly: a fixed array is not an open one, nor
    /// the reverse.
    pub(crate) fn check_array(&mut self, source: TypeId, target: ArrayType) -> SubtypeResult {
        let Some(TypeData::Array(source)) = self.interner.lookup(source) else {
            return SubtypeResult::False;
        };
        if source.size != target.size {
            return SubtypeResult::False;
        }
        self.check_subtype(source.element, target.element)
    }

    pub(crate) fn check_tuple(&mut self, source: TypeId, target: TypeListId) -> SubtypeResult {
        let Some(TypeData::Tuple(source)) = self.interner.lookup(source) else {
            return SubtypeResult::False;
        };
        let source = self.interner.type_list(source);
        let target = self.interner.type_list(target);
        if source.len() != target.len() {
            return SubtypeResult::False;
        }
        self.all_related(source.iter().copied().zip(target.iter().copied()))
    }
}
