//! Union targets.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{TypeId, TypeListId};

impl<'a> SubtypeChecker<'a> {
    /// The source only has to fit one member. A union source is not split
    /// into its members first, so `int|string` is only related to a union
    /// that contains that exact union (or to `any`).
    pub(crate) fn check_union_target(
        &mut self,
        source: TypeId,
        members: TypeListId,
    ) -> SubtypeResult {
        let members = self.interner.type_list(members);
        let mut exceeded = false;
        for &member in members.iter() {
            match self.check_subtype(source, member) {
                result if result.is_true() => return result,
                SubtypeResult::DepthExceeded => exceeded = true,
                _ => {}
            }
        }
        if exceeded {
            SubtypeResult::DepthExceeded
        } else {
            SubtypeResult::False
        }
    }
}
