//! Finite targets.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{LiteralSetId, TypeData, TypeId};
use rustc_hash::FxHashSet;

impl<'a> SubtypeChecker<'a> {
    /// The source must be finite over a value space of the same size whose
    /// members all appear in the target. The size test comes first, so a
    /// strictly smaller value space is rejected even when it is a subset.
    pub(crate) fn check_finite(&mut self, source: TypeId, target: LiteralSetId) -> SubtypeResult {
        let Some(TypeData::Finite(source)) = self.interner.lookup(source) else {
            return SubtypeResult::False;
        };
        let source = self.interner.literal_set(source);
        let target = self.interner.literal_set(target);
        if source.len() != target.len() {
            return SubtypeResult::False;
        }
        let target: FxHashSet<_> = target.iter().collect();
        source.iter().all(|value| target.contains(value)).into()
    }
}
