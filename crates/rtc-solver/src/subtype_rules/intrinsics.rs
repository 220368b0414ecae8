//! Targets that are intrinsic descriptors.
//!
//! Identity has already been ruled out by the caller, so a simple-value,
//! `xml` or `service` target only accepts itself and answers false here.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::{IntrinsicKind, TypeData, TypeId};
use tracing::trace;

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_intrinsic_target(
        &mut self,
        source: TypeId,
        kind: IntrinsicKind,
    ) -> SubtypeResult {
        match kind {
            IntrinsicKind::Any => SubtypeResult::True,
            IntrinsicKind::Json => self.check_json_target(source),
            IntrinsicKind::Anydata => {
                trace!(source = source.0, "anydata target is not supported");
                SubtypeResult::False
            }
            _ => SubtypeResult::False,
        }
    }

    /// `json` holds the JSON scalars, `json` itself, and arrays and maps
    /// whose element or constraint is again `json`.
    fn check_json_target(&mut self, source: TypeId) -> SubtypeResult {
        match self.interner.lookup(source) {
            Some(TypeData::Intrinsic(
                IntrinsicKind::String
                | IntrinsicKind::Int
                | IntrinsicKind::Float
                | IntrinsicKind::Decimal
                | IntrinsicKind::Boolean
                | IntrinsicKind::Null
                | IntrinsicKind::Json,
            )) => SubtypeResult::True,
            Some(TypeData::Array(array)) => self.check_subtype(array.element, TypeId::JSON),
            Some(TypeData::Map(constraint)) => self.check_subtype(constraint, TypeId::JSON),
            _ => SubtypeResult::False,
        }
    }
}
