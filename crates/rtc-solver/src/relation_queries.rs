//! Unified relation query entry points.
//!
//! Runtime callers (casts, `is` tests, data conversion) go through
//! `query_relation` or the thin wrappers below instead of building checkers
//! themselves. Every call builds fresh checkers, so queries share no state
//! and may run on any number of threads at once.

use crate::db::TypeDatabase;
use crate::identity::is_same_type;
use crate::query_trace;
use crate::recursion::RecursionProfile;
use crate::shape::ShapeChecker;
use crate::subtype::SubtypeChecker;
use crate::types::{TypeData, TypeId};
use crate::values::{Value, ValueStore, is_mutable, type_of};
use rtc_common::limits;
use serde::Deserialize;
use tracing::warn;

/// Relation categories supported by the unified query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Descriptor subtyping.
    IsType,
    /// Invariant descriptor equality.
    SameType,
    /// Record-shaped descriptor against an object surface.
    ObjectEquivalent,
    /// Live contents of a value against a descriptor.
    IsLikeType,
    /// Top-level value check: frozen values by declared type, mutable ones
    /// by shape.
    ValueIsType,
}

impl RelationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            RelationKind::IsType => "is_type",
            RelationKind::SameType => "same_type",
            RelationKind::ObjectEquivalent => "object_equivalent",
            RelationKind::IsLikeType => "is_like_type",
            RelationKind::ValueIsType => "value_is_type",
        }
    }
}

/// Recursion budgets for relation checks.
///
/// Deserializes from any serde format with missing keys taking their
/// defaults, e.g. `{"max_subtype_depth": 64}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelationPolicy {
    pub max_subtype_depth: u32,
    pub max_subtype_iterations: u32,
    pub max_shape_depth: u32,
}

impl Default for RelationPolicy {
    fn default() -> Self {
        Self {
            max_subtype_depth: limits::MAX_SUBTYPE_DEPTH,
            max_subtype_iterations: limits::MAX_SUBTYPE_ITERATIONS,
            max_shape_depth: limits::MAX_SHAPE_DEPTH,
        }
    }
}

impl RelationPolicy {
    /// Defaults overridden by `RTC_MAX_SUBTYPE_DEPTH`,
    /// `RTC_MAX_SUBTYPE_ITERATIONS` and `RTC_MAX_SHAPE_DEPTH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, reading variables through `lookup`. Unparsable
    /// values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut policy = Self::default();
        let read = |key: &str, slot: &mut u32| {
            let Some(raw) = lookup(key) else {
                return;
            };
            match raw.trim().parse() {
                Ok(value) => *slot = value,
                Err(err) => warn!(key, value = %raw, %err, "ignoring invalid relation limit"),
            }
        };
        read("RTC_MAX_SUBTYPE_DEPTH", &mut policy.max_subtype_depth);
        read("RTC_MAX_SUBTYPE_ITERATIONS", &mut policy.max_subtype_iterations);
        read("RTC_MAX_SHAPE_DEPTH", &mut policy.max_shape_depth);
        policy
    }

    pub fn with_max_subtype_depth(mut self, depth: u32) -> Self {
        self.max_subtype_depth = depth;
        self
    }

    pub fn with_max_shape_depth(mut self, depth: u32) -> Self {
        self.max_shape_depth = depth;
        self
    }

    pub(crate) fn subtype_profile(&self) -> RecursionProfile {
        RecursionProfile::Custom {
            max_depth: self.max_subtype_depth,
            max_iterations: self.max_subtype_iterations,
        }
    }

    pub(crate) fn shape_profile(&self) -> RecursionProfile {
        RecursionProfile::Custom {
            max_depth: self.max_shape_depth,
            max_iterations: RecursionProfile::ShapeCheck.max_iterations(),
        }
    }
}

/// A relation to decide.
#[derive(Clone, Copy)]
pub enum RelationQuery<'v> {
    IsType {
        source: TypeId,
        target: TypeId,
    },
    SameType {
        source: TypeId,
        target: TypeId,
    },
    ObjectEquivalent {
        source: TypeId,
        target: TypeId,
    },
    IsLikeType {
        store: &'v dyn ValueStore,
        value: &'v Value,
        target: TypeId,
    },
    ValueIsType {
        store: &'v dyn ValueStore,
        value: &'v Value,
        target: TypeId,
    },
}

impl RelationQuery<'_> {
    pub fn kind(&self) -> RelationKind {
        match self {
            RelationQuery::IsType { .. } => RelationKind::IsType,
            RelationQuery::SameType { .. } => RelationKind::SameType,
            RelationQuery::ObjectEquivalent { .. } => RelationKind::ObjectEquivalent,
            RelationQuery::IsLikeType { .. } => RelationKind::IsLikeType,
            RelationQuery::ValueIsType { .. } => RelationKind::ValueIsType,
        }
    }

    fn source_type(&self) -> Option<TypeId> {
        match *self {
            RelationQuery::IsType { source, .. }
            | RelationQuery::SameType { source, .. }
            | RelationQuery::ObjectEquivalent { source, .. } => Some(source),
            RelationQuery::IsLikeType { store, value, .. }
            | RelationQuery::ValueIsType { store, value, .. } => type_of(value, store),
        }
    }

    fn target(&self) -> TypeId {
        match *self {
            RelationQuery::IsType { target, .. }
            | RelationQuery::SameType { target, .. }
            | RelationQuery::ObjectEquivalent { target, .. }
            | RelationQuery::IsLikeType { target, .. }
            | RelationQuery::ValueIsType { target, .. } => target,
        }
    }
}

/// Result of a relation check.
///
/// `depth_exceeded` is set when a budget ran out somewhere during the check;
/// the answer is then conservative and may be a false negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationResult {
    pub kind: RelationKind,
    pub related: bool,
    pub depth_exceeded: bool,
}

impl RelationResult {
    #[inline]
    pub fn is_related(self) -> bool {
        self.related
    }
}

pub fn query_relation(
    interner: &dyn TypeDatabase,
    query: RelationQuery<'_>,
    policy: RelationPolicy,
) -> RelationResult {
    let kind = query.kind();
    let trace_query_id = if query_trace::enabled() {
        let query_id = query_trace::next_query_id();
        query_trace::relation_start(query_id, kind.as_str(), query.source_type(), query.target());
        Some(query_id)
    } else {
        None
    };

    let (related, depth_exceeded) = match query {
        RelationQuery::IsType { source, target } => {
            let mut checker = SubtypeChecker::with_policy(interner, &policy);
            let related = checker.is_type(source, target);
            (related, checker.depth_exceeded())
        }
        RelationQuery::SameType { source, target } => {
            (is_same_type(interner, source, target), false)
        }
        RelationQuery::ObjectEquivalent { source, target } => {
            if matches!(interner.lookup(target), Some(TypeData::Object(_))) {
                let mut checker = SubtypeChecker::with_policy(interner, &policy);
                let related = checker.is_type(source, target);
                (related, checker.depth_exceeded())
            } else {
                (false, false)
            }
        }
        RelationQuery::IsLikeType {
            store,
            value,
            target,
        } => {
            let mut checker = ShapeChecker::with_policy(interner, store, policy);
            let related = checker.is_like_type(value, target);
            (related, checker.depth_exceeded())
        }
        RelationQuery::ValueIsType {
            store,
            value,
            target,
        } => {
            if is_mutable(value, store) {
                let mut checker = ShapeChecker::with_policy(interner, store, policy);
                let related = checker.is_like_type(value, target);
                (related, checker.depth_exceeded())
            } else {
                match type_of(value, store) {
                    Some(source) => {
                        let mut checker = SubtypeChecker::with_policy(interner, &policy);
                        let related = checker.is_type(source, target);
                        (related, checker.depth_exceeded())
                    }
                    None => (false, false),
                }
            }
        }
    };

    if let Some(query_id) = trace_query_id {
        query_trace::relation_end(query_id, kind.as_str(), related, depth_exceeded);
    }

    RelationResult {
        kind,
        related,
        depth_exceeded,
    }
}

/// Top-level compatibility check of a runtime value.
///
/// Frozen containers and simple values are judged by their declared type;
/// mutable containers by their current contents.
pub fn check_is_type(
    interner: &dyn TypeDatabase,
    store: &dyn ValueStore,
    value: &Value,
    target: TypeId,
) -> bool {
    query_relation(
        interner,
        RelationQuery::ValueIsType {
            store,
            value,
            target,
        },
        RelationPolicy::default(),
    )
    .is_related()
}

pub fn check_is_like_type(
    interner: &dyn TypeDatabase,
    store: &dyn ValueStore,
    value: &Value,
    target: TypeId,
) -> bool {
    query_relation(
        interner,
        RelationQuery::IsLikeType {
            store,
            value,
            target,
        },
        RelationPolicy::default(),
    )
    .is_related()
}

#[cfg(test)]
#[path = "../tests/relation_queries_tests.rs"]
mod tests;
