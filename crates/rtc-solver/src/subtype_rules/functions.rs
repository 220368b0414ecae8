//! Function targets.
//!
//! Function descriptors are neither co- nor contravariant here: parameters
//! and returns are compared with invariant `is-same-type`.

use crate::identity::same_type_lists;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{FunctionShapeId, TypeData, TypeId};

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_function(&mut self, source: TypeId, target: FunctionShapeId) -> SubtypeResult {
        let Some(TypeData::Function(source)) = self.interner.lookup(source) else {
            return SubtypeResult::False;
        };
        let source = self.interner.function_shape(source);
        let target = self.interner.function_shape(target);
        (same_type_lists(self.interner, &source.params, &target.params)
            && same_type_lists(self.interner, &source.returns, &target.returns))
        .into()
    }
}
