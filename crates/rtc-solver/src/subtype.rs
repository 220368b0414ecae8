//! Structural is-type checking.
//!
//! `SubtypeChecker` answers "is every value of `source` a value of `target`"
//! over interned descriptors. Dispatch is on the target descriptor; the
//! individual rules live in `subtype_rules/`.
//!
//! Records and objects are the only descriptors that can form cycles. Their
//! rules enter the (source, target) pair into a `RecursionGuard`, and a pair
//! met again while still in progress is assumed to hold (coinduction).

use crate::db::TypeDatabase;
use crate::recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
use crate::relation_queries::RelationPolicy;
use crate::types::{TypeData, TypeId};
use rtc_common::limits;
use tracing::trace;

/// Outcome of a single is-type step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtypeResult {
    True,
    False,
    /// A pair already in progress was reached again; treated as related.
    CycleDetected,
    /// A depth or iteration budget ran out; treated as unrelated.
    DepthExceeded,
}

impl SubtypeResult {
    #[inline]
    pub fn is_true(self) -> bool {
        matches!(self, SubtypeResult::True | SubtypeResult::CycleDetected)
    }

    #[inline]
    pub fn is_false(self) -> bool {
        !self.is_true()
    }
}

impl From<bool> for SubtypeResult {
    fn from(related: bool) -> Self {
        if related {
            SubtypeResult::True
        } else {
            SubtypeResult::False
        }
    }
}

/// Stateful is-type checker.
///
/// One checker may answer many queries; the guard is empty between them.
pub struct SubtypeChecker<'a> {
    pub(crate) interner: &'a dyn TypeDatabase,
    pub(crate) guard: RecursionGuard<(TypeId, TypeId)>,
    pub(crate) depth: DepthCounter,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(interner: &'a dyn TypeDatabase) -> Self {
        SubtypeChecker {
            interner,
            guard: RecursionGuard::with_profile(RecursionProfile::SubtypeCheck),
            depth: DepthCounter::with_profile(RecursionProfile::SubtypeCheck),
        }
    }

    pub fn with_policy(interner: &'a dyn TypeDatabase, policy: &RelationPolicy) -> Self {
        let profile = policy.subtype_profile();
        SubtypeChecker {
            interner,
            guard: RecursionGuard::with_profile(profile),
            depth: DepthCounter::with_profile(profile),
        }
    }

    /// Whether every value of `source` belongs to `target`.
    pub fn is_type(&mut self, source: TypeId, target: TypeId) -> bool {
        self.check_subtype(source, target).is_true()
    }

    /// Whether any budget was hit by a query this checker answered.
    pub fn depth_exceeded(&self) -> bool {
        self.guard.is_exceeded() || self.depth.is_exceeded()
    }

    pub fn check_subtype(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        if source == target {
            return SubtypeResult::True;
        }
        if !self.depth.enter() {
            trace!(source = source.0, target = target.0, "is-type depth exceeded");
            return SubtypeResult::DepthExceeded;
        }
        let result = stacker::maybe_grow(limits::STACK_RED_ZONE, limits::STACK_GROWTH_SIZE, || {
            self.check_subtype_inner(source, target)
        });
        self.depth.leave();
        result
    }

    fn check_subtype_inner(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        let Some(target_data) = self.interner.lookup(target) else {
            return SubtypeResult::False;
        };
        match target_data {
            TypeData::Intrinsic(kind) => self.check_intrinsic_target(source, kind),
            TypeData::Map(constraint) => self.check_map(source, constraint),
            TypeData::Future(constraint) => self.check_future(source, constraint),
            TypeData::Table(constraint) => self.check_table(source, constraint),
            TypeData::Array(array) => self.check_array(source, array),
            TypeData::Tuple(members) => self.check_tuple(source, members),
            TypeData::Union(members) => self.check_union_target(source, members),
            TypeData::Finite(values) => self.check_finite(source, values),
            TypeData::Function(shape) => self.check_function(source, shape),
            TypeData::Record(shape) => self.check_record(source, target, shape),
            TypeData::Object(shape) => self.check_object_equivalency(source, target, shape),
        }
    }

    /// Run `check` with the pair (source, target) in progress.
    pub(crate) fn guarded(
        &mut self,
        source: TypeId,
        target: TypeId,
        check: impl FnOnce(&mut Self) -> SubtypeResult,
    ) -> SubtypeResult {
        let key = (source, target);
        match self.guard.enter(key) {
            RecursionResult::Entered => {
                let result = check(self);
                self.guard.leave(key);
                result
            }
            RecursionResult::Cycle => {
                trace!(source = source.0, target = target.0, "is-type cycle assumed related");
                SubtypeResult::CycleDetected
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                trace!(source = source.0, target = target.0, "is-type budget exceeded");
                SubtypeResult::DepthExceeded
            }
        }
    }

    /// Every (source, target) pair must be related; stops at the first one
    /// that is not.
    pub(crate) fn all_related(
        &mut self,
        pairs: impl IntoIterator<Item = (TypeId, TypeId)>,
    ) -> SubtypeResult {
        for (source, target) in pairs {
            let result = self.check_subtype(source, target);
            if result.is_false() {
                return result;
            }
        }
        SubtypeResult::True
    }
}

/// One-shot is-type query with default limits.
pub fn is_type(interner: &dyn TypeDatabase, source: TypeId, target: TypeId) -> bool {
    SubtypeChecker::new(interner).is_type(source, target)
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
